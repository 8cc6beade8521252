//! Service layer owning the database handle, the clock, and review policy.
//!
//! `LerniService` wraps `LerniDb` (raw database access) and an injected
//! [`Clock`]. All repo methods are implemented as `impl LerniService` blocks
//! in `repos/`.

use std::sync::Arc;

use chrono::{DateTime, Duration, SubsecRound, Utc};
use lerni_core::clock::{Clock, SystemClock};

use crate::LerniDb;
use crate::error::DatabaseError;

/// Tunables for the review orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewPolicy {
    /// How far a skipped question is pushed back.
    pub skip_delay: Duration,
}

impl Default for ReviewPolicy {
    fn default() -> Self {
        Self {
            skip_delay: Duration::hours(24),
        }
    }
}

/// Orchestrates all reads and mutations of Lerni state.
///
/// Every multi-row mutation follows this protocol:
/// 1. Begin an immediate transaction
/// 2. Re-read whatever the decision depends on
/// 3. Execute SQL
/// 4. Commit, or roll back on any error
pub struct LerniService {
    db: LerniDb,
    clock: Arc<dyn Clock>,
    policy: ReviewPolicy,
}

impl LerniService {
    /// Open a service on a local database file, using the system clock.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened.
    pub async fn new_local(db_path: &str, policy: ReviewPolicy) -> Result<Self, DatabaseError> {
        let db = LerniDb::open_local(db_path).await?;
        Ok(Self::from_db(db, Arc::new(SystemClock), policy))
    }

    /// Create from an existing `LerniDb` and clock.
    #[must_use]
    pub fn from_db(db: LerniDb, clock: Arc<dyn Clock>, policy: ReviewPolicy) -> Self {
        Self { db, clock, policy }
    }

    /// Access the underlying database handle.
    #[must_use]
    pub const fn db(&self) -> &LerniDb {
        &self.db
    }

    #[must_use]
    pub const fn policy(&self) -> &ReviewPolicy {
        &self.policy
    }

    /// Current time, truncated to the precision timestamps are stored with.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now().trunc_subsecs(6)
    }
}
