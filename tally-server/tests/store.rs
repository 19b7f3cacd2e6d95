mod common;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use tally_server::{
    app::AppErrorKind,
    store::{options, schema, users},
};

use common::TestApp;

#[tokio::test]
async fn registering_a_taken_username_conflicts() {
    let app = TestApp::new().await;

    users::register(&app.state.db, "alice", "digest").await.unwrap();
    let err = users::register(&app.state.db, "alice", "other")
        .await
        .unwrap_err();

    assert!(matches!(err.kind(), AppErrorKind::Conflict(name) if name == "alice"));
}

#[tokio::test]
async fn registered_users_can_be_found() {
    let app = TestApp::new().await;

    let user = users::register(&app.state.db, "alice", "digest").await.unwrap();
    assert!(user.logged_in);
    assert!(!user.is_master);
    assert_eq!(user.vote, None);

    let by_id = users::find_by_id(&app.state.db, user.id).await.unwrap();
    assert_eq!(by_id.map(|user| user.username).as_deref(), Some("alice"));

    assert!(
        users::find_by_username(&app.state.db, "Alice")
            .await
            .unwrap()
            .is_none()
    );
    assert!(users::find_by_id(&app.state.db, user.id + 1).await.unwrap().is_none());
}

#[tokio::test]
async fn unset_flag_is_hidden_while_votes_are_pending() {
    let app = TestApp::new().await;
    let mut conn = app.state.db.acquire().await.unwrap();

    users::register(&mut *conn, "alice", "digest").await.unwrap();

    assert!(!options::show_votes(&mut conn, None).await.unwrap());
    assert!(options::show_votes(&mut conn, Some(true)).await.unwrap());
    // an explicit reveal sticks even while votes are pending
    assert!(options::show_votes(&mut conn, None).await.unwrap());
    assert!(!options::show_votes(&mut conn, Some(false)).await.unwrap());
    assert!(!options::show_votes(&mut conn, None).await.unwrap());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_first_reads_share_one_flag() {
    let dir = tempfile::tempdir().unwrap();
    let options = SqliteConnectOptions::new()
        .filename(dir.path().join("tally.db"))
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(8)
        .connect_with(options)
        .await
        .unwrap();
    schema::create_all(&pool).await.unwrap();

    // one pending vote keeps the flag unset
    users::register(&pool, "alice", "digest").await.unwrap();

    let tasks = (0..8)
        .map(|_| {
            let pool = pool.clone();
            tokio::spawn(async move {
                let mut conn = pool.acquire().await?;
                options::show_votes(&mut conn, None).await
            })
        })
        .collect::<Vec<_>>();

    for task in tasks {
        assert!(!task.await.unwrap().unwrap());
    }

    let (rows,) = sqlx::query_as::<_, (i64,)>("SELECT COUNT(*) FROM option")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(rows, 1);

    let mut conn = pool.acquire().await.unwrap();
    assert!(options::show_votes(&mut conn, Some(true)).await.unwrap());
    assert!(options::show_votes(&mut conn, None).await.unwrap());
}

#[tokio::test]
async fn flag_reveals_once_everyone_voted() {
    let app = TestApp::new().await;
    let mut conn = app.state.db.acquire().await.unwrap();

    let alice = users::register(&mut *conn, "alice", "digest").await.unwrap();
    assert!(!options::show_votes(&mut conn, Some(false)).await.unwrap());

    users::set_vote(&mut *conn, alice.id, Some("3")).await.unwrap();

    assert!(options::show_votes(&mut conn, None).await.unwrap());
}

#[tokio::test]
async fn clearing_votes_only_touches_logged_in_users() {
    let app = TestApp::new().await;
    let db = &app.state.db;

    let alice = users::register(db, "alice", "digest").await.unwrap();
    let bob = users::register(db, "bob", "digest").await.unwrap();
    users::set_vote(db, alice.id, Some("1")).await.unwrap();
    users::set_vote(db, bob.id, Some("2")).await.unwrap();
    users::set_login_state(db, bob.id, false, false).await.unwrap();

    assert_eq!(users::clear_votes(db).await.unwrap(), 1);

    assert_eq!(app.user("alice").await.vote, None);
    assert_eq!(app.user("bob").await.vote.as_deref(), Some("2"));
}

#[tokio::test]
async fn logout_all_empties_the_scoreboard() {
    let app = TestApp::new().await;
    let db = &app.state.db;

    users::register(db, "alice", "digest").await.unwrap();
    users::register(db, "bob", "digest").await.unwrap();

    assert_eq!(users::logout_all(db).await.unwrap(), 2);
    assert!(users::logged_in(db).await.unwrap().is_empty());
}
