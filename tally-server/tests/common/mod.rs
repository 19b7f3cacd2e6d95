#![allow(dead_code)]

use axum::{
    Router,
    body::{Body, to_bytes},
    response::Response,
};

use http::{Method, Request, StatusCode, header};

use sqlx::sqlite::SqlitePoolOptions;

use tally_model::scoreboard::Scoreboard;
use tally_server::{
    app::AppState,
    auth::session::SESSION_COOKIE,
    config::ServerConfig,
    store::users::{self, UserRecord},
};

use tower::ServiceExt as _;

/// A router over a fresh in-memory database.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

impl TestApp {
    pub async fn new() -> TestApp {
        // a single connection keeps the in-memory database alive and shared
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .expect("in-memory database");

        let state = AppState::with_pool(ServerConfig::default(), pool)
            .await
            .expect("app state");

        TestApp {
            router: tally_server::router(state.clone()),
            state,
        }
    }

    pub async fn request(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("infallible router")
    }

    pub async fn get(&self, path: &str, session: Option<&str>) -> Response {
        let mut request = Request::builder().method(Method::GET).uri(path);
        if let Some(session) = session {
            request = request.header(header::COOKIE, session);
        }

        self.request(request.body(Body::empty()).unwrap()).await
    }

    pub async fn post(&self, path: &str, session: Option<&str>, form: &str) -> Response {
        let mut request = Request::builder()
            .method(Method::POST)
            .uri(path)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(session) = session {
            request = request.header(header::COOKIE, session);
        }

        self.request(request.body(Body::from(form.to_owned())).unwrap())
            .await
    }

    /// Logs in and returns the session cookie.
    pub async fn login(&self, username: &str, password: &str, master: bool) -> String {
        let mut form = format!("username={}&password={}", username, password);
        if master {
            form.push_str("&is_master=1");
        }

        let res = self.post("/login", None, &form).await;
        assert_redirect(&res, "/");

        session_cookie(&res).expect("session cookie")
    }

    pub async fn vote(&self, session: &str, vote: &str) {
        let res = self
            .post("/vote", Some(session), &format!("vote={}", vote))
            .await;
        assert_redirect(&res, "/scoreboard");
    }

    pub async fn scoreboard(&self, session: &str) -> Scoreboard {
        let res = self.get("/api/scoreboard", Some(session)).await;
        assert_eq!(res.status(), StatusCode::OK);

        serde_json::from_str(&body_string(res).await).expect("scoreboard json")
    }

    pub async fn user(&self, username: &str) -> UserRecord {
        users::find_by_username(&self.state.db, username)
            .await
            .unwrap()
            .expect("user exists")
    }
}

/// Gets the `name=value` pair of the session cookie, if one was set.
pub fn session_cookie(res: &Response) -> Option<String> {
    res.headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| value.split(';').next())
        .find(|pair| pair.starts_with(&format!("{}=", SESSION_COOKIE)))
        .map(str::to_owned)
}

pub fn assert_redirect(res: &Response, location: &str) {
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        res.headers()
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok()),
        Some(location)
    );
}

pub async fn body_string(res: Response) -> String {
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
