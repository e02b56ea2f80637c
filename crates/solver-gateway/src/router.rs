use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::Router;
use axum::body::Body;
use axum::extract::{ConnectInfo, DefaultBodyLimit};
use axum::http::{Request, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use subtle::ConstantTimeEq;
use tokio::sync::Mutex;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use super::handlers::{answer_handler, health_handler};
use super::server::AppState;

/// Digest of the expected bearer token, computed once when the router is built.
#[derive(Clone)]
struct AuthConfig {
    expected: Option<blake3::Hash>,
}

const MAX_RATE_LIMIT_ENTRIES: usize = 10_000;
const RATE_WINDOW: Duration = Duration::from_secs(60);

/// Requests seen from one client address in the current fixed window.
#[derive(Clone, Copy)]
struct Window {
    count: u32,
    started: Instant,
}

#[derive(Clone)]
struct RateLimitState {
    limit: u32,
    windows: Arc<Mutex<HashMap<IpAddr, Window>>>,
}

impl RateLimitState {
    /// Record one request from `ip` at `now`; `false` when it exceeds the limit.
    async fn admit(&self, ip: IpAddr, now: Instant) -> bool {
        let mut windows = self.windows.lock().await;
        if windows.len() >= MAX_RATE_LIMIT_ENTRIES && !windows.contains_key(&ip) {
            windows.retain(|_, w| now.duration_since(w.started) < RATE_WINDOW);
        }

        let window = windows.entry(ip).or_insert(Window {
            count: 0,
            started: now,
        });
        if now.duration_since(window.started) >= RATE_WINDOW {
            *window = Window {
                count: 1,
                started: now,
            };
            return true;
        }
        window.count += 1;
        window.count <= self.limit
    }
}

/// Middleware knobs for the `/api` routes. A `rate_limit` of zero disables limiting.
#[derive(Debug, Clone)]
pub(crate) struct RouterSettings {
    pub auth_token: Option<String>,
    pub rate_limit: u32,
    pub max_body_size: usize,
}

impl Default for RouterSettings {
    fn default() -> Self {
        Self {
            auth_token: None,
            rate_limit: 120,
            max_body_size: 10 * 1024 * 1024,
        }
    }
}

pub(crate) fn build_router(state: AppState, settings: &RouterSettings) -> Router {
    let auth_cfg = AuthConfig {
        expected: settings
            .auth_token
            .as_deref()
            .map(|t| blake3::hash(t.as_bytes())),
    };
    let rate_state = RateLimitState {
        limit: settings.rate_limit,
        windows: Arc::new(Mutex::new(HashMap::new())),
    };

    let api = Router::new()
        .route("/api/", post(answer_handler))
        .route("/api", post(answer_handler))
        .layer(middleware::from_fn_with_state(
            rate_state,
            rate_limit_middleware,
        ))
        .layer(middleware::from_fn_with_state(auth_cfg, auth_middleware))
        // multipart reads honour axum's 2 MiB default unless it is lifted here
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(settings.max_body_size));

    Router::new()
        .route("/health", get(health_handler))
        .merge(api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn auth_middleware(
    axum::extract::State(cfg): axum::extract::State<AuthConfig>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let Some(expected) = cfg.expected else {
        return next.run(req).await;
    };

    let presented = req
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .unwrap_or("");

    // compare digests so timing does not depend on the token length
    let presented = blake3::hash(presented.as_bytes());
    if !bool::from(presented.as_bytes().ct_eq(expected.as_bytes())) {
        tracing::debug!("rejecting request with invalid bearer token");
        return StatusCode::UNAUTHORIZED.into_response();
    }

    next.run(req).await
}

async fn rate_limit_middleware(
    axum::extract::State(state): axum::extract::State<RateLimitState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    if state.limit == 0 {
        return next.run(req).await;
    }

    let ip = req
        .extensions()
        .get::<ConnectInfo<std::net::SocketAddr>>()
        .map_or(IpAddr::V4(std::net::Ipv4Addr::UNSPECIFIED), |ci| ci.0.ip());

    if !state.admit(ip, Instant::now()).await {
        tracing::debug!(%ip, "rate limit exceeded");
        return StatusCode::TOO_MANY_REQUESTS.into_response();
    }

    next.run(req).await
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use http_body_util::BodyExt;
    use solver_bank::PatternBank;
    use solver_core::{Ingestor, Orchestrator};
    use solver_llm::mock::MockProvider;
    use solver_llm::{AnyProvider, BackendSet};
    use solver_sandbox::{CodeRunner, SandboxConfig};
    use tower::ServiceExt;

    use super::*;

    const BOUNDARY: &str = "solver-test-boundary";

    enum Part<'a> {
        Text(&'a str, &'a str),
        File(&'a str, &'a [u8]),
    }

    fn multipart(parts: &[Part<'_>]) -> Vec<u8> {
        let mut body = Vec::new();
        for part in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match part {
                Part::Text(name, value) => {
                    body.extend_from_slice(
                        format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}")
                            .as_bytes(),
                    );
                }
                Part::File(filename, data) => {
                    body.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
                             Content-Type: application/octet-stream\r\n\r\n"
                        )
                        .as_bytes(),
                    );
                    body.extend_from_slice(data);
                }
            }
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn api_request(parts: &[Part<'_>]) -> Request<Body> {
        let body = multipart(parts);
        Request::builder()
            .method("POST")
            .uri("/api/")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .header("content-length", body.len())
            .body(Body::from(body))
            .unwrap()
    }

    fn test_state(backends: BackendSet) -> AppState {
        AppState::new(
            Arc::new(Orchestrator::new(
                PatternBank::default(),
                backends,
                CodeRunner::new(&SandboxConfig::default()),
            )),
            Ingestor::default(),
        )
    }

    fn settings(auth_token: Option<String>, rate_limit: u32, max_body_size: usize) -> RouterSettings {
        RouterSettings {
            auth_token,
            rate_limit,
            max_body_size,
        }
    }

    fn make_router(auth: Option<String>, rate_limit: u32) -> Router {
        build_router(
            test_state(BackendSet::new()),
            &settings(auth, rate_limit, 1_048_576),
        )
    }

    async fn json_body(resp: Response) -> serde_json::Value {
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn health_returns_ok() {
        let app = make_router(None, 0);
        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), 200);
        let json = json_body(resp).await;
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn bank_question_answered() {
        let app = make_router(None, 0);
        let resp = app
            .oneshot(api_request(&[Part::Text(
                "question",
                "What is the factorial of 5?",
            )]))
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        assert_eq!(json_body(resp).await["answer"], "120");
    }

    #[tokio::test]
    async fn missing_question_is_bad_request() {
        let app = make_router(None, 0);
        let resp = app
            .oneshot(api_request(&[Part::File("a.txt", b"hello")]))
            .await
            .unwrap();
        assert_eq!(resp.status(), 400);
        assert_eq!(json_body(resp).await["error"], "No question provided");
    }

    #[tokio::test]
    async fn blank_question_is_bad_request() {
        let app = make_router(None, 0);
        let resp = app
            .oneshot(api_request(&[Part::Text("question", "   ")]))
            .await
            .unwrap();
        assert_eq!(resp.status(), 400);
    }

    #[tokio::test]
    async fn no_backends_is_still_an_answer() {
        let app = make_router(None, 0);
        let resp = app
            .oneshot(api_request(&[Part::Text("question", "Who wrote Hamlet?")]))
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        assert_eq!(
            json_body(resp).await["answer"],
            "Error: No AI models are available"
        );
    }

    #[tokio::test]
    async fn uploaded_files_reach_the_model() {
        let mock = MockProvider::with_responses(vec!["Answer: 7".into()]);
        let backends = BackendSet::new().with_gemini(AnyProvider::Mock(mock.clone()));
        let app = build_router(test_state(backends), &settings(None, 0, 1_048_576));

        let resp = app
            .oneshot(api_request(&[
                Part::Text("question", "What is the value in the answer column?"),
                Part::File("data.csv", b"answer\n7\n"),
            ]))
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        assert_eq!(json_body(resp).await["answer"], "7");

        let received = mock.received();
        assert_eq!(received.len(), 1);
        assert!(
            received[0][1]
                .content
                .contains("File: data.csv\nThe value in the 'answer' column is: 7")
        );
    }

    #[tokio::test]
    async fn non_multipart_body_rejected() {
        let app = make_router(None, 0);
        let req = Request::builder()
            .method("POST")
            .uri("/api/")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"question":"hi"}"#))
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert!(resp.status().is_client_error());
    }

    #[tokio::test]
    async fn auth_rejects_missing_token() {
        let app = make_router(Some("secret".into()), 0);
        let resp = app
            .oneshot(api_request(&[Part::Text("question", "q")]))
            .await
            .unwrap();
        assert_eq!(resp.status(), 401);
    }

    #[tokio::test]
    async fn auth_accepts_valid_token() {
        let app = make_router(Some("secret".into()), 0);
        let mut req = api_request(&[Part::Text("question", "What is the factorial of 5?")]);
        req.headers_mut()
            .insert("authorization", "Bearer secret".parse().unwrap());
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), 200);
    }

    #[tokio::test]
    async fn auth_rejects_wrong_token() {
        let app = make_router(Some("secret".into()), 0);
        let mut req = api_request(&[Part::Text("question", "q")]);
        req.headers_mut()
            .insert("authorization", "Bearer wrong".parse().unwrap());
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), 401);
    }

    #[tokio::test]
    async fn health_skips_auth() {
        let app = make_router(Some("secret".into()), 0);
        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), 200);
    }

    #[tokio::test]
    async fn rate_limit_enforced() {
        use tower::Service;

        let mut app = make_router(None, 2);
        let make_req = || api_request(&[Part::Text("question", "What is the factorial of 5?")]);

        let resp = app.call(make_req()).await.unwrap();
        assert_eq!(resp.status(), 200);
        let resp = app.call(make_req()).await.unwrap();
        assert_eq!(resp.status(), 200);
        let resp = app.call(make_req()).await.unwrap();
        assert_eq!(resp.status(), 429);
    }

    #[tokio::test]
    async fn rate_window_resets() {
        let state = RateLimitState {
            limit: 1,
            windows: Arc::new(Mutex::new(HashMap::new())),
        };
        let ip = IpAddr::V4(std::net::Ipv4Addr::LOCALHOST);
        let t0 = Instant::now();
        assert!(state.admit(ip, t0).await);
        assert!(!state.admit(ip, t0).await);
        assert!(state.admit(ip, t0 + RATE_WINDOW).await);
    }

    #[tokio::test]
    async fn body_size_limit() {
        let app = build_router(test_state(BackendSet::new()), &settings(None, 0, 64));
        let oversized = vec![b'a'; 128];
        let resp = app
            .oneshot(api_request(&[
                Part::Text("question", "q"),
                Part::File("big.txt", &oversized),
            ]))
            .await
            .unwrap();
        assert_eq!(resp.status(), 413);
    }
}
