//! Entity structs for all Lerni domain objects.
//!
//! Each entity maps to a table in the libSQL database (see
//! `lerni-db/migrations/001_initial.sql`). All structs derive `Serialize`,
//! `Deserialize`, and `JsonSchema` for JSON output and schema export.

mod answer;
mod concept;
mod question;
mod review;

pub use answer::{Answer, AnswerFields};
pub use concept::{Concept, ConceptEdge};
pub use question::{Question, ScheduleState};
pub use review::Review;
