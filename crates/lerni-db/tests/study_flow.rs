//! End-to-end scenarios over a file-backed database with a controlled clock.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use lerni_core::clock::FixedClock;
use lerni_core::entities::AnswerFields;
use lerni_core::enums::{Relationship, ReviewStatus};
use lerni_core::errors::CoreError;
use lerni_core::sm2::MAX_INTERVAL_DAYS;
use lerni_db::LerniDb;
use lerni_db::service::{LerniService, ReviewPolicy};
use lerni_db::updates::question::NewQuestion;
use pretty_assertions::assert_eq;

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
}

async fn open(path: &str, clock: Arc<FixedClock>) -> LerniService {
    let db = LerniDb::open_local(path).await.unwrap();
    LerniService::from_db(db, clock, ReviewPolicy::default())
}

async fn review_with(svc: &LerniService, question_id: &str, grade: u8) {
    let session = svc.start_review(question_id).await.unwrap();
    if grade >= 3 {
        svc.recall(&session.review.id, "explained it").await.unwrap();
    } else {
        svc.forget(&session.review.id, None, Some("forgot the details"))
            .await
            .unwrap();
    }
    svc.grade(&session.review.id, grade, None).await.unwrap();
}

#[tokio::test]
async fn perfect_recalls_grow_the_interval() {
    let clock = Arc::new(FixedClock::new(start()));
    let svc = open(":memory:", clock.clone()).await;
    let (question, _) = svc
        .create_question(&NewQuestion::new("What is ownership?", "each value has one owner"))
        .await
        .unwrap();

    let mut intervals = Vec::new();
    for _ in 0..3 {
        review_with(&svc, &question.id, 5).await;
        let state = svc.get_question(&question.id).await.unwrap().schedule_state;
        intervals.push(state.interval);
        clock.set(state.next_review_at);
    }

    assert_eq!(intervals, vec![1, 6, 17]);
    let state = svc.get_question(&question.id).await.unwrap().schedule_state;
    assert!((state.easiness_factor - 2.8).abs() < 1e-9);
    assert_eq!(state.repetitions, 3);
    assert_eq!(svc.reviews_for(&question.id).await.unwrap().len(), 3);
}

#[tokio::test]
async fn lapse_resets_repetitions() {
    let clock = Arc::new(FixedClock::new(start()));
    let svc = open(":memory:", clock.clone()).await;
    let (question, _) = svc
        .create_question(&NewQuestion::new("What is a borrow?", "a reference"))
        .await
        .unwrap();

    review_with(&svc, &question.id, 5).await;
    clock.advance(Duration::days(1));
    review_with(&svc, &question.id, 4).await;
    clock.advance(Duration::days(6));
    review_with(&svc, &question.id, 1).await;

    let state = svc.get_question(&question.id).await.unwrap().schedule_state;
    assert_eq!(state.repetitions, 0);
    assert_eq!(state.interval, 1);
    assert_eq!(state.next_review_at, start() + Duration::days(8));
}

#[tokio::test]
async fn skip_defers_without_touching_progress() {
    let clock = Arc::new(FixedClock::new(start()));
    let svc = open(":memory:", clock).await;
    let (question, _) = svc
        .create_question(&NewQuestion::new("What is Pin?", "it pins"))
        .await
        .unwrap();
    let before = svc.get_question(&question.id).await.unwrap().schedule_state;

    let skipped = svc.skip(&question.id).await.unwrap();
    assert_eq!(skipped.review.status, ReviewStatus::Skipped);

    let after = svc.get_question(&question.id).await.unwrap().schedule_state;
    assert_eq!(after.next_review_at, start() + Duration::hours(24));
    assert_eq!(after.interval, before.interval);
    assert_eq!(after.repetitions, before.repetitions);
    assert!((after.easiness_factor - before.easiness_factor).abs() < f64::EPSILON);

    assert!(svc.due(start(), None).await.unwrap().is_empty());
    let later = start() + Duration::hours(24);
    assert_eq!(svc.due(later, None).await.unwrap().len(), 1);
}

#[tokio::test]
async fn due_questions_scoped_to_a_concept_subtree() {
    let clock = Arc::new(FixedClock::new(start()));
    let svc = open(":memory:", clock).await;

    let python = svc.create_concept("Python", None, &[]).await.unwrap();
    let decorators = svc.create_concept("Decorators", None, &[]).await.unwrap();
    let closures = svc.create_concept("Closures", None, &[]).await.unwrap();
    let rust = svc.create_concept("Rust", None, &[]).await.unwrap();
    svc.add_edge(&decorators.id, &python.id, Relationship::Parent)
        .await
        .unwrap();
    svc.add_edge(&closures.id, &decorators.id, Relationship::Parent)
        .await
        .unwrap();

    let mut in_subtree = Vec::new();
    for (prompt, concept) in [
        ("What is a decorator?", &decorators.id),
        ("What does a closure capture?", &closures.id),
        ("Why is the GIL there?", &python.id),
    ] {
        let new = NewQuestion::new(prompt, "notes").concept(concept);
        in_subtree.push(svc.create_question(&new).await.unwrap().0.id);
    }
    let outside = NewQuestion::new("What is a trait object?", "notes").concept(&rust.id);
    svc.create_question(&outside).await.unwrap();
    svc.create_question(&NewQuestion::new("Uncategorized", "notes"))
        .await
        .unwrap();

    let mut due: Vec<String> = svc
        .due(start(), Some(&python.id))
        .await
        .unwrap()
        .into_iter()
        .map(|q| q.id)
        .collect();
    due.sort();
    in_subtree.sort();
    assert_eq!(due, in_subtree);

    assert_eq!(svc.due(start(), None).await.unwrap().len(), 5);
}

#[tokio::test]
async fn state_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(lerni_db::DB_FILE_NAME);
    let path = path.to_str().unwrap();
    let clock = Arc::new(FixedClock::new(start()));

    let (question_id, review_id) = {
        let svc = open(path, clock.clone()).await;
        let (question, _) = svc
            .create_question(&NewQuestion::new("What is Send?", "thread-safe transfer"))
            .await
            .unwrap();
        let session = svc.start_review(&question.id).await.unwrap();
        svc.recall(&session.review.id, "moves between threads")
            .await
            .unwrap();
        (question.id, session.review.id)
    };

    let svc = open(path, clock).await;
    let session = svc.start_review(&question_id).await.unwrap();
    assert!(session.resumed);
    assert_eq!(session.review.id, review_id);

    let err = svc.grade(&review_id, 2, None).await.unwrap_err();
    assert!(matches!(err.as_core(), Some(CoreError::GradeMismatch { .. })));
    svc.grade(&review_id, 5, None).await.unwrap();
}

#[tokio::test]
async fn history_is_append_only_across_reviews() {
    let clock = Arc::new(FixedClock::new(start()));
    let svc = open(":memory:", clock.clone()).await;
    let (question, first) = svc
        .create_question(&NewQuestion::new("What is a lifetime?", "scope of a borrow"))
        .await
        .unwrap();

    review_with(&svc, &question.id, 3).await;

    let mut fields = AnswerFields::default();
    fields.simple_explanation = Some("how long a reference is valid".into());
    clock.advance(Duration::days(1));
    let outcome = svc.edit(&question.id, &fields).await.unwrap();
    assert!(outcome.forked);

    let history = svc.history(&question.id).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0], first);
    assert_eq!(history[1], outcome.answer);

    let reviews = svc.reviews_for(&question.id).await.unwrap();
    assert_eq!(reviews[0].answer_id, first.id);
}

#[tokio::test]
async fn long_perfect_streak_stays_readable() {
    let clock = Arc::new(FixedClock::new(start()));
    let svc = open(":memory:", clock.clone()).await;
    let (question, _) = svc
        .create_question(&NewQuestion::new("What is Send?", "safe to move across threads"))
        .await
        .unwrap();

    let mut previous = 0;
    for _ in 0..30 {
        review_with(&svc, &question.id, 5).await;
        let state = svc.get_question(&question.id).await.unwrap().schedule_state;
        assert!(state.interval >= previous);
        previous = state.interval;
    }

    let state = svc.get_question(&question.id).await.unwrap().schedule_state;
    assert_eq!(state.interval, MAX_INTERVAL_DAYS);
    assert_eq!(
        state.next_review_at,
        start() + Duration::days(i64::from(MAX_INTERVAL_DAYS))
    );
    assert!(svc.due(start(), None).await.unwrap().is_empty());
    assert_eq!(svc.today(start(), 7).await.unwrap().stats.total, 1);
    assert_eq!(svc.reviews_for(&question.id).await.unwrap().len(), 30);

    clock.set(state.next_review_at);
    let due = svc.due(state.next_review_at, None).await.unwrap();
    assert_eq!(due.len(), 1);
    review_with(&svc, &question.id, 5).await;
}
