//! The execution service: a stateless HTTP face over the engine.
//!
//! `POST /run` executes one `(code, inputs)` pair from scratch and reports
//! output, an error, or the first unanswered input request. No session state
//! survives a request; interactive programs are replayed by the client.

use std::path::PathBuf;

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{debug, info, warn};

use crate::interp;
use crate::protocol::{ExampleResponse, ExecutionRequest, ExecutionResponse, WireResponse};

#[derive(Clone)]
pub struct AppState {
    pub examples_dir: PathBuf,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/run", post(run_program))
        .route("/examples/:name", get(get_example))
        .route("/health", get(health))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
        .with_state(state)
}

pub async fn serve(addr: &str, examples_dir: PathBuf) -> anyhow::Result<()> {
    let app = create_router(AppState { examples_dir });
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("execution service listening on {}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}

async fn run_program(Json(request): Json<ExecutionRequest>) -> Json<WireResponse> {
    debug!(
        "run request: {} bytes of code, {} inputs",
        request.source.len(),
        request.inputs.len()
    );
    // the engine is synchronous; keep the runtime's workers free
    let result = tokio::task::spawn_blocking(move || interp::execute_request(&request)).await;
    let response = match result {
        Ok(response) => response,
        Err(e) => {
            warn!("execution task failed: {}", e);
            ExecutionResponse::Error("Runtime Error: execution aborted".into())
        }
    };
    Json(response.into())
}

async fn get_example(
    Path(name): Path<String>,
    State(state): State<AppState>,
) -> Json<ExampleResponse> {
    if !is_safe_name(&name) {
        return Json(not_found(&name));
    }
    let path = state.examples_dir.join(format!("{}.vs", name));
    match tokio::fs::read_to_string(&path).await {
        Ok(code) => Json(ExampleResponse {
            code: Some(code),
            error: None,
        }),
        Err(e) => {
            warn!("example '{}' unavailable: {}", name, e);
            Json(not_found(&name))
        }
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Example names are single path components; everything else is rejected
/// before it reaches the filesystem.
fn is_safe_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

fn not_found(name: &str) -> ExampleResponse {
    ExampleResponse {
        code: None,
        error: Some(format!("Example '{}' not found", name)),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tempfile::TempDir;

    use super::*;
    use crate::client::ServiceClient;
    use crate::protocol::{InputMap, RunError};
    use crate::run::{drive, ExecutionBackend, InputSource, RunOutcome};

    async fn spawn_service(examples_dir: PathBuf) -> String {
        let app = create_router(AppState { examples_dir });
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn client(base_url: &str) -> ServiceClient {
        ServiceClient::new(base_url, Duration::from_secs(5)).unwrap()
    }

    fn request(source: &str, inputs: InputMap) -> ExecutionRequest {
        ExecutionRequest {
            source: source.into(),
            inputs,
        }
    }

    #[tokio::test]
    async fn run_round_trips_over_the_wire() {
        let base = spawn_service(PathBuf::from(".")).await;
        let response = client(&base)
            .execute(&request("spill_the_tea(\"Hello, World!\");", InputMap::new()))
            .await
            .unwrap();
        assert_eq!(response, ExecutionResponse::Output("Hello, World!".into()));
    }

    #[tokio::test]
    async fn input_requests_carry_the_variable_name() {
        let base = spawn_service(PathBuf::from(".")).await;
        let c = client(&base);
        let source = "tea name; vibe_check name; spill_the_tea(\"hi \" + name);";

        let first = c.execute(&request(source, InputMap::new())).await.unwrap();
        assert_eq!(first, ExecutionResponse::InputRequested("name".into()));

        let inputs: InputMap = [("name", "sam")].into_iter().collect();
        let second = c.execute(&request(source, inputs)).await.unwrap();
        assert_eq!(second, ExecutionResponse::Output("hi sam".into()));
    }

    #[tokio::test]
    async fn engine_errors_surface_verbatim() {
        let base = spawn_service(PathBuf::from(".")).await;
        let response = client(&base)
            .execute(&request("lit = ;", InputMap::new()))
            .await
            .unwrap();
        match response {
            ExecutionResponse::Error(message) => {
                assert!(message.starts_with("Syntax Error: "), "{}", message)
            }
            other => panic!("expected an error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn blank_code_gets_the_stock_message() {
        let base = spawn_service(PathBuf::from(".")).await;
        let response = client(&base)
            .execute(&request("", InputMap::new()))
            .await
            .unwrap();
        assert_eq!(
            response,
            ExecutionResponse::Output("No code to execute!".into())
        );
    }

    #[tokio::test]
    async fn examples_are_served_from_disk() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("greeting.vs"), "spill_the_tea(\"hey\");").unwrap();
        let base = spawn_service(dir.path().to_path_buf()).await;
        let c = client(&base);

        let code = c.fetch_example("greeting").await.unwrap();
        assert_eq!(code, "spill_the_tea(\"hey\");");

        let err = c.fetch_example("no_such_example").await.unwrap_err();
        assert_eq!(err.to_string(), "Example 'no_such_example' not found");
    }

    #[test]
    fn safe_names_are_single_path_components() {
        assert!(is_safe_name("hello_world"));
        assert!(is_safe_name("loops-2"));
        assert!(!is_safe_name(""));
        assert!(!is_safe_name("../etc/passwd"));
        assert!(!is_safe_name("a/b"));
        assert!(!is_safe_name("a.vs"));
    }

    struct Preset(Vec<(&'static str, &'static str)>);

    impl InputSource for Preset {
        fn request(&mut self, variable: &str) -> anyhow::Result<Option<String>> {
            if self.0.is_empty() {
                return Ok(None);
            }
            let (expected, value) = self.0.remove(0);
            assert_eq!(variable, expected);
            Ok(Some(value.to_string()))
        }
    }

    #[tokio::test]
    async fn interactive_drive_against_the_live_service() {
        let base = spawn_service(PathBuf::from(".")).await;
        let c = client(&base);
        let source = "tea a; tea b;\n\
                      vibe_check a; vibe_check b;\n\
                      spill_the_tea(a + \" and \" + b);";
        let mut inputs = Preset(vec![("a", "tea"), ("b", "mood")]);
        let outcome = drive(&c, source, &mut inputs).await.unwrap();
        assert_eq!(outcome, RunOutcome::Output("tea and mood".into()));
    }

    #[tokio::test]
    async fn unreachable_service_is_a_transport_failure() {
        // nothing listens on this port
        let c = client("http://127.0.0.1:9");
        let err = c
            .execute(&request("spill_the_tea(1);", InputMap::new()))
            .await
            .unwrap_err();
        assert!(matches!(err, RunError::Transport(_)));
    }
}
