mod common;

use http::StatusCode;

use tally_server::{
    routes::login::{MISSING_USERNAME, WRONG_PASSWORD},
    store::users,
};

use common::{TestApp, assert_redirect, body_string, session_cookie};

#[tokio::test]
async fn first_login_registers_the_user() {
    let app = TestApp::new().await;

    app.login("alice", "secret", false).await;

    let all = users::all(&app.state.db).await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].username, "alice");
    assert!(all[0].logged_in);
    assert!(!all[0].is_master);
    assert_ne!(all[0].password_digest, "secret");
}

#[tokio::test]
async fn returning_user_logs_in_with_the_same_password() {
    let app = TestApp::new().await;

    let session = app.login("alice", "secret", false).await;
    app.get("/logout", Some(&session)).await;
    assert!(!app.user("alice").await.logged_in);

    app.login("alice", "secret", false).await;
    assert!(app.user("alice").await.logged_in);
    assert_eq!(users::all(&app.state.db).await.unwrap().len(), 1);
}

#[tokio::test]
async fn login_without_a_username_is_rejected() {
    let app = TestApp::new().await;

    let res = app.post("/login", None, "password=x").await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(session_cookie(&res).is_none());

    assert!(users::all(&app.state.db).await.unwrap().is_empty());
}

#[tokio::test]
async fn blank_usernames_are_not_registered() {
    let app = TestApp::new().await;

    for form in ["username=&password=x", "username=%20%09&password=x"] {
        let res = app.post("/login", None, form).await;

        assert_eq!(res.status(), StatusCode::OK);
        assert!(session_cookie(&res).is_none());
        assert!(body_string(res).await.contains(MISSING_USERNAME));
    }

    assert!(users::all(&app.state.db).await.unwrap().is_empty());
}

#[tokio::test]
async fn wrong_password_renders_an_error() {
    let app = TestApp::new().await;
    app.login("alice", "secret", false).await;

    let res = app
        .post("/login", None, "username=alice&password=guess&is_master=1")
        .await;

    assert_eq!(res.status(), StatusCode::OK);
    assert!(session_cookie(&res).is_none());
    assert!(body_string(res).await.contains(WRONG_PASSWORD));

    let alice = app.user("alice").await;
    assert!(!alice.logged_in);
    assert!(!alice.is_master);
}

#[tokio::test]
async fn master_is_only_granted_on_request() {
    let app = TestApp::new().await;

    app.login("alice", "secret", true).await;
    app.login("bob", "secret", false).await;

    assert!(app.user("alice").await.is_master);
    assert!(!app.user("bob").await.is_master);
}

#[tokio::test]
async fn logout_is_idempotent() {
    let app = TestApp::new().await;
    let session = app.login("alice", "secret", false).await;

    let res = app.get("/logout", Some(&session)).await;
    assert_redirect(&res, "/login");
    assert!(!app.user("alice").await.logged_in);

    let res = app.get("/logout", Some(&session)).await;
    assert_redirect(&res, "/login");
    assert!(!app.user("alice").await.logged_in);
}

#[tokio::test]
async fn logged_out_session_no_longer_authenticates() {
    let app = TestApp::new().await;
    let session = app.login("alice", "secret", false).await;

    app.get("/logout", Some(&session)).await;

    assert_redirect(&app.get("/scoreboard", Some(&session)).await, "/login");
}

#[tokio::test]
async fn gate_redirects_unauthenticated_requests() {
    let app = TestApp::new().await;

    for path in ["/", "/scoreboard", "/vote", "/api/scoreboard", "/logout"] {
        assert_redirect(&app.get(path, None).await, "/login");
    }

    let res = app.post("/vote", None, "vote=3").await;
    assert_redirect(&res, "/login");
}

#[tokio::test]
async fn gate_lets_public_routes_through() {
    let app = TestApp::new().await;

    assert_eq!(app.get("/login", None).await.status(), StatusCode::OK);

    let res = app.get("/css/style.css", None).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(
        res.headers()[http::header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/css")
    );
}

#[tokio::test]
async fn tampered_sessions_are_ignored() {
    let app = TestApp::new().await;
    let session = app.login("alice", "secret", false).await;

    let forged = format!("{}x", session);
    assert_redirect(&app.get("/scoreboard", Some(&forged)).await, "/login");

    let garbage = "tally_session=not-a-token";
    assert_redirect(&app.get("/scoreboard", Some(garbage)).await, "/login");
}

#[tokio::test]
async fn index_redirects_to_the_scoreboard() {
    let app = TestApp::new().await;
    let session = app.login("alice", "secret", false).await;

    assert_redirect(&app.get("/", Some(&session)).await, "/scoreboard");
}

#[tokio::test]
async fn responses_carry_security_headers() {
    let app = TestApp::new().await;
    let res = app.get("/login", None).await;

    assert_eq!(res.headers()[http::header::CACHE_CONTROL], "no-store");
    assert_eq!(res.headers()[http::header::X_FRAME_OPTIONS], "DENY");
    assert_eq!(res.headers()[http::header::X_CONTENT_TYPE_OPTIONS], "nosniff");
}
