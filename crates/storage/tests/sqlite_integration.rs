use chrono::Duration;
use storage::repository::{
    PlayerRepository, QuestionStats, QuestionStatsRepository, SessionSummaryRepository,
    StorageError,
};
use storage::sqlite::SqliteRepository;
use trivia_core::model::{PlayerId, QuestionId, SessionMode, SessionSummary};
use trivia_core::time::fixed_now;

async fn connect(name: &str) -> SqliteRepository {
    let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
    let repo = SqliteRepository::connect(&url).await.expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let repo = connect("memdb_migrate_twice").await;
    repo.migrate().await.expect("second migrate");
}

#[tokio::test]
async fn sqlite_accumulates_question_stats() {
    let repo = connect("memdb_stats").await;
    let id = QuestionId::new("rd-001");

    repo.record_answer(&id, true).await.unwrap();
    repo.record_answer(&id, false).await.unwrap();
    repo.record_answer(&QuestionId::new("kn-001"), true)
        .await
        .unwrap();

    assert_eq!(
        repo.get_stats(&id).await.unwrap(),
        QuestionStats { shown: 2, correct: 1 }
    );
    assert_eq!(
        repo.get_stats(&QuestionId::new("th-404")).await.unwrap(),
        QuestionStats::default()
    );

    let all = repo.all_stats().await.unwrap();
    let ids: Vec<_> = all.iter().map(|(id, _)| id.as_str()).collect();
    assert_eq!(ids, vec!["kn-001", "rd-001"]);
}

#[tokio::test]
async fn sqlite_persists_ratings_and_seen_sets() {
    let repo = connect("memdb_players").await;
    let player = PlayerId::new("local");
    let today = fixed_now().date_naive();

    assert_eq!(repo.get_rating(&player).await.unwrap(), None);
    repo.set_rating(&player, 1510, fixed_now()).await.unwrap();
    repo.set_rating(&player, 1496, fixed_now()).await.unwrap();
    assert_eq!(repo.get_rating(&player).await.unwrap(), Some(1496));

    let id = QuestionId::new("rd-003");
    repo.mark_seen(&player, today, &id).await.unwrap();
    repo.mark_seen(&player, today, &id).await.unwrap();
    repo.mark_seen(&player, today, &QuestionId::new("th-001"))
        .await
        .unwrap();

    let seen = repo.seen_on(&player, today).await.unwrap();
    assert_eq!(seen.len(), 2);
    assert!(seen.contains(&id));

    let tomorrow = today.succ_opt().unwrap();
    assert!(repo.seen_on(&player, tomorrow).await.unwrap().is_empty());
    assert!(
        repo.seen_on(&PlayerId::new("guest"), today)
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn sqlite_round_trips_session_summaries() {
    let repo = connect("memdb_summaries").await;
    let player = PlayerId::new("local");
    let started = fixed_now();

    let first = SessionSummary::from_persisted(
        player.clone(),
        SessionMode::Standard,
        started,
        started + Duration::minutes(3),
        5,
        4,
        1500,
        1522,
    )
    .unwrap();
    let second = SessionSummary::from_persisted(
        player.clone(),
        SessionMode::Daily,
        started + Duration::hours(1),
        started + Duration::hours(1) + Duration::minutes(2),
        5,
        1,
        1522,
        1480,
    )
    .unwrap();

    let first_id = repo.append_summary(&first).await.unwrap();
    let second_id = repo.append_summary(&second).await.unwrap();

    assert_eq!(repo.get_summary(first_id).await.unwrap(), first);

    let rows = repo.list_summaries(&player, 10).await.unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].id, second_id);
    assert_eq!(rows[0].summary.mode(), SessionMode::Daily);
    assert_eq!(rows[1].summary, first);

    assert_eq!(repo.list_summaries(&player, 1).await.unwrap().len(), 1);
    assert!(matches!(
        repo.get_summary(first_id + 100).await.unwrap_err(),
        StorageError::NotFound
    ));
}
