mod concept;
mod review;

pub use concept::ConceptCommands;
pub use review::ReviewCommands;
