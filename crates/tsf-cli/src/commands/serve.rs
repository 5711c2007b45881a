//! Serve command: the language server on stdin/stdout.

use anyhow::{Context, Result};

use crate::{Config, Service, lsp};

/// Blocks until the client sends `exit` or closes stdin.
pub fn run(service: Service, config: &Config) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    let result = runtime.block_on(lsp::run(tokio::io::stdin(), tokio::io::stdout(), service, config));
    // a blocking stdin read may still be parked after `exit`
    runtime.shutdown_background();
    result
}
