#![forbid(unsafe_code)]

use std::sync::Arc;

use poem::http::Method;
use poem::{Endpoint, IntoResponse, Request, Response};
use poem_openapi::{ OpenApi, payload::Json, Object, param::Query, ApiResponse };
use log::info;

use crate::utils::eligibility::is_eligible;
use crate::utils::errors::GreeterError;
use crate::utils::greeter_utils::{self, RequestDebug};

// ***************************************************************************
//                                Constants
// ***************************************************************************
pub const HELLO_WORLD_PATH : &str = "/hello-world";
const GREETING_PREFIX      : &str = "Hello ";

// ***************************************************************************
//                          Request/Response Definiions
// ***************************************************************************
pub struct HelloWorldApi;

struct ReqHelloWorld
{
    name: String,
}

#[derive(Object, Debug, PartialEq)]
pub struct RespHelloWorld
{
    message: String,
}

#[derive(Object, Debug, PartialEq)]
pub struct RespError
{
    error: String,
}

// Implement the debug record trait for logging.
impl RequestDebug for ReqHelloWorld {
    fn get_request_info(&self) -> String {
        let mut s = String::with_capacity(255);
        s.push_str("  Request parameters:");
        s.push_str("\n    name: ");
        s.push_str(&self.name);
        s
    }
}

// ------------------- HTTP Status Codes -------------------
#[derive(Debug, ApiResponse)]
pub enum GreeterResponse {
    #[oai(status = 200)]
    Http200(Json<RespHelloWorld>),
    #[oai(status = 400)]
    Http400(Json<RespError>),
    #[oai(status = 405)]
    Http405(Json<RespError>),
}

fn make_http_200(resp: RespHelloWorld) -> GreeterResponse {
    GreeterResponse::Http200(Json(resp))
}

impl From<GreeterError> for GreeterResponse {
    fn from(e: GreeterError) -> Self {
        let body = Json(RespError {error: e.to_string()});
        match e {
            GreeterError::InvalidInput => GreeterResponse::Http400(body),
            GreeterError::MethodNotAllowed => GreeterResponse::Http405(body),
        }
    }
}

// ***************************************************************************
//                             OpenAPI Endpoint
// ***************************************************************************
#[OpenApi]
impl HelloWorldApi {
    /// Greet a name whose first letter falls between A and M.
    #[oai(path = "/hello-world", method = "get")]
    async fn hello_world_api(&self, http_req: &Request, name: Query<Option<String>>) -> GreeterResponse {
        // A missing parameter is treated as empty.
        let req = ReqHelloWorld {name: name.0.unwrap_or_default()};
        greeter_utils::debug_request(http_req, &req);

        match RespHelloWorld::process(&req) {
            Ok(r) => make_http_200(r),
            Err(e) => {
                info!("Rejecting name {:?} with {}: {}", req.name, e.status(), e);
                e.into()
            }
        }
    }
}

// ***************************************************************************
//                          Request/Response Methods
// ***************************************************************************
impl RespHelloWorld {
    fn new(name: &str) -> Self {
        Self {message: format!("{}{}", GREETING_PREFIX, name)}
    }

    /// Trim the name, check it and build the greeting from the trimmed form.
    fn process(req: &ReqHelloWorld) -> Result<RespHelloWorld, GreeterError> {
        let name = req.name.trim();
        if name.is_empty() || !is_eligible(name) {
            return Err(GreeterError::InvalidInput);
        }
        Ok(Self::new(name))
    }
}

// ***************************************************************************
//                              Method Guard
// ***************************************************************************
// ---------------------------------------------------------------------------
// require_get:
// ---------------------------------------------------------------------------
/** Reject every method other than GET before the request reaches the
 * endpoint.  HEAD is rejected too rather than being served from GET.
 */
pub async fn require_get<E: Endpoint>(ep: Arc<E>, req: Request) -> poem::Result<Response> {
    if req.method() != Method::GET {
        info!("Rejecting {} request for {}", req.method(), req.uri().path());
        return Ok(GreeterResponse::from(GreeterError::MethodNotAllowed).into_response());
    }
    ep.call(req).await.map(IntoResponse::into_response)
}

// ***************************************************************************
//                                  Tests
// ***************************************************************************
#[cfg(test)]
mod tests {
    use poem::http::StatusCode;
    use poem::test::TestClient;
    use serde_json::json;

    use crate::api::make_app;

    const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

    async fn check_get(name: &str, status: StatusCode, body: serde_json::Value) {
        let cli = TestClient::new(make_app());
        let resp = cli.get("/hello-world").query("name", &name).send().await;
        resp.assert_status(status);
        resp.assert_content_type(JSON_CONTENT_TYPE);
        resp.assert_json(body).await;
    }

    fn hello(name: &str) -> serde_json::Value {
        json!({"message": format!("Hello {}", name)})
    }

    fn invalid() -> serde_json::Value {
        json!({"error": "Invalid Input"})
    }

    #[tokio::test]
    async fn valid_names() {
        check_get("Alice", StatusCode::OK, hello("Alice")).await;
        check_get("Mary", StatusCode::OK, hello("Mary")).await;
        check_get("A", StatusCode::OK, hello("A")).await;
    }

    #[tokio::test]
    async fn lowercase_name_keeps_its_case() {
        check_get("bob", StatusCode::OK, hello("bob")).await;
    }

    #[tokio::test]
    async fn name_is_trimmed_before_greeting() {
        check_get("  Alice  ", StatusCode::OK, hello("Alice")).await;
        check_get("\tcarol\n", StatusCode::OK, hello("carol")).await;
    }

    #[tokio::test]
    async fn second_half_names_are_rejected() {
        check_get("Nancy", StatusCode::BAD_REQUEST, invalid()).await;
        check_get("Zane", StatusCode::BAD_REQUEST, invalid()).await;
        check_get("oscar", StatusCode::BAD_REQUEST, invalid()).await;
        check_get("Z", StatusCode::BAD_REQUEST, invalid()).await;
    }

    #[tokio::test]
    async fn empty_and_blank_names_are_rejected() {
        check_get("", StatusCode::BAD_REQUEST, invalid()).await;
        check_get("   ", StatusCode::BAD_REQUEST, invalid()).await;
    }

    #[tokio::test]
    async fn non_letter_initial_is_rejected() {
        check_get("123John", StatusCode::BAD_REQUEST, invalid()).await;
        check_get("@name", StatusCode::BAD_REQUEST, invalid()).await;
    }

    #[tokio::test]
    async fn missing_name_is_rejected() {
        let cli = TestClient::new(make_app());
        let resp = cli.get("/hello-world").send().await;
        resp.assert_status(StatusCode::BAD_REQUEST);
        resp.assert_content_type(JSON_CONTENT_TYPE);
        resp.assert_json(invalid()).await;
    }

    #[tokio::test]
    async fn other_methods_are_not_allowed() {
        let cli = TestClient::new(make_app());
        let requests = [
            cli.post("/hello-world"),
            cli.put("/hello-world"),
            cli.delete("/hello-world"),
            cli.patch("/hello-world"),
        ];
        for req in requests {
            let resp = req.query("name", &"Alice").send().await;
            resp.assert_status(StatusCode::METHOD_NOT_ALLOWED);
            resp.assert_content_type(JSON_CONTENT_TYPE);
            resp.assert_json(json!({"error": "Method not allowed"})).await;
        }
    }

    #[tokio::test]
    async fn method_is_checked_before_name() {
        let cli = TestClient::new(make_app());
        let resp = cli.post("/hello-world").query("name", &"Zane").send().await;
        resp.assert_status(StatusCode::METHOD_NOT_ALLOWED);
        resp.assert_json(json!({"error": "Method not allowed"})).await;

        let resp = cli.head("/hello-world").query("name", &"Alice").send().await;
        resp.assert_status(StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn repeated_requests_are_byte_identical() {
        let cli = TestClient::new(make_app());
        let mut bodies = Vec::new();
        for _ in 0..3 {
            let resp = cli.get("/hello-world").query("name", &"Mallory").send().await;
            resp.assert_status_is_ok();
            bodies.push(resp.0.into_body().into_string().await.unwrap());
        }
        assert_eq!(bodies[0], r#"{"message":"Hello Mallory"}"#);
        assert!(bodies.iter().all(|b| b == &bodies[0]));
    }

    #[tokio::test]
    async fn unknown_path_is_not_found() {
        let cli = TestClient::new(make_app());
        let resp = cli.get("/hello").query("name", &"Alice").send().await;
        resp.assert_status(StatusCode::NOT_FOUND);
    }
}
