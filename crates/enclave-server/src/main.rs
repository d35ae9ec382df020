//! Enclave greeting HTTP server
//!
//! No CLI surface: fixed port 8888, catch-all greeter, fail-fast startup.
//! The core returns bind errors as values; this binary is where they become
//! a fatal log line and a non-zero exit.

use std::sync::Arc;

use enclave_core::{Greeter, Server, ServerConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    if let Err(err) = run().await {
        error!(error = %err, "server failed");
        std::process::exit(1);
    }
}

async fn run() -> enclave_core::Result<()> {
    let config = ServerConfig::default();
    let greeter = Arc::new(Greeter::new());

    let server = Server::bind(&config)?;
    info!("listening on {}", server.local_addr());
    server.serve(greeter).await
}
