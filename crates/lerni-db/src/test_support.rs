//! Shared test utilities for lerni-db unit tests.

pub(crate) mod helpers {
    use std::sync::Arc;

    use chrono::{DateTime, TimeZone, Utc};
    use lerni_core::clock::FixedClock;

    use crate::LerniDb;
    use crate::service::{LerniService, ReviewPolicy};

    /// 2026-03-01 09:00 UTC, the instant every test service starts at.
    pub fn start_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
    }

    /// Create an in-memory service with a frozen clock.
    pub async fn test_service() -> LerniService {
        test_service_with_clock().await.0
    }

    /// Create an in-memory service and hand back the clock to advance it.
    pub async fn test_service_with_clock() -> (LerniService, Arc<FixedClock>) {
        let db = LerniDb::open_local(":memory:").await.unwrap();
        let clock = Arc::new(FixedClock::new(start_time()));
        let svc = LerniService::from_db(db, clock.clone(), ReviewPolicy::default());
        (svc, clock)
    }

    /// Create a question with the given prompt and notes, returning its id.
    pub async fn seed_question(svc: &LerniService, prompt: &str) -> String {
        let new = crate::updates::question::NewQuestion::new(prompt, format!("notes for {prompt}"));
        svc.create_question(&new).await.unwrap().0.id
    }

    /// Create a concept with no aliases, returning its id.
    pub async fn seed_concept(svc: &LerniService, name: &str) -> String {
        svc.create_concept(name, None, &[]).await.unwrap().id
    }
}
