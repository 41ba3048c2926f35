#![forbid(unsafe_code)]

use std::time::Duration;

use anyhow::Result;
use lazy_static::lazy_static;
use log::{info, error};
use poem::listener::TcpListener;

// Greeter Utilities
use crate::api::{make_api_service, make_app};
use crate::utils::config::{init_log, init_runtime_context, RuntimeCtx};
use crate::utils::errors::Errors;

// Modules
mod api;
mod utils;

// ***************************************************************************
//                                Constants
// ***************************************************************************
const SERVER_NAME : &str = "GreeterServer"; // for poem logging

// ***************************************************************************
//                             Static Variables
// ***************************************************************************
// Lazily initialize the parameters variable so that is has a 'static lifetime.
// We exit if we can't read our parameters.
lazy_static! {
    static ref RUNTIME_CTX: RuntimeCtx = match init_runtime_context() {
        Ok(ctx) => ctx,
        Err(e) => {
            error!("{}", e);
            panic!("FAILED to read configuration file: {}", e);
        }
    };
}

// ---------------------------------------------------------------------------
// main:
// ---------------------------------------------------------------------------
#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    // --------------- Initialize Greeter -------------
    // Announce ourselves.
    println!("Starting greeter_server!");

    // Initialize the server.
    greeter_init().map_err(|e| std::io::Error::other(e.to_string()))?;

    // Dump the api definition instead of serving it.
    if RUNTIME_CTX.greeter_args.print_openapi {
        println!("{}", make_api_service().spec_yaml());
        return Ok(());
    }

    // --------------- Main Loop Set Up ---------------
    let config = &RUNTIME_CTX.parms.config;
    let addr = config.listen_addr();
    let shutdown_timeout = Duration::from_secs(config.shutdown_timeout_secs);
    info!("{} listening on {}", config.title, addr);

    // ------------------ Main Loop -------------------
    poem::Server::new(TcpListener::bind(addr))
        .name(SERVER_NAME)
        .run_with_graceful_shutdown(make_app(), shutdown_signal(), Some(shutdown_timeout))
        .await
}

// ***************************************************************************
//                             Private Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// greeter_init:
// ---------------------------------------------------------------------------
/** Initialize logging and force the reading of input parameters. */
fn greeter_init() -> Result<()> {
    // Configure our log.
    init_log()?;

    info!("{}", Errors::InputParms(format!("{:#?}", *RUNTIME_CTX)));

    // Log build info.
    print_version_info();
    Ok(())
}

// ---------------------------------------------------------------------------
// print_version_info:
// ---------------------------------------------------------------------------
fn print_version_info() {
    info!("\n*** Running {}={}",
          env!("CARGO_PKG_NAME"),
          option_env!("CARGO_PKG_VERSION").unwrap_or("unknown"));
}

// ---------------------------------------------------------------------------
// shutdown_signal:
// ---------------------------------------------------------------------------
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received, draining connections."),
        Err(e) => {
            // Keep serving without signal handling.
            error!("Unable to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await
        },
    }
}
