#![forbid(unsafe_code)]

use poem::{Endpoint, EndpointExt, IntoEndpoint, Route};
use poem_openapi::OpenApiService;

use crate::api::hello_world::{require_get, HelloWorldApi, HELLO_WORLD_PATH};

pub mod hello_world;

// ***************************************************************************
//                                Constants
// ***************************************************************************
const API_TITLE   : &str = "Greeter Server";
const API_VERSION : &str = env!("CARGO_PKG_VERSION");

// ---------------------------------------------------------------------------
// make_api_service:
// ---------------------------------------------------------------------------
/** Create the OpenAPI service for all greeter endpoints. */
pub fn make_api_service() -> OpenApiService<HelloWorldApi, ()> {
    OpenApiService::new(HelloWorldApi, API_TITLE, API_VERSION)
}

// ---------------------------------------------------------------------------
// make_app:
// ---------------------------------------------------------------------------
/** Assemble the routes served by the process.  Only the greeting path is
 * routed and every method other than GET is answered by the method guard.
 */
pub fn make_app() -> impl Endpoint {
    let greeter = make_api_service()
        .into_endpoint()
        .around(|ep, req| require_get(ep, req));

    Route::new().at(HELLO_WORLD_PATH, greeter)
}
