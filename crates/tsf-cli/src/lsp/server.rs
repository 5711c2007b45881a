//! Stdio transport: a read loop feeding the controller and a writer task.

use anyhow::Result;
use serde_json::Value;
use tokio::io::{AsyncRead, AsyncWrite, BufReader};
use tokio::sync::mpsc;

use super::controller::{Controller, Flow};
use super::rpc;
use crate::{Config, Service};

/// Serves the protocol until `exit` or end of input.
pub async fn run<R, W>(reader: R, mut writer: W, service: Service, config: &Config) -> Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, mut rx) = mpsc::unbounded_channel::<Value>();

    let writer_task = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            if let Err(err) = rpc::write_message(&mut writer, &message).await {
                tracing::error!(error = %err, "failed to write message");
                break;
            }
        }
    });

    let mut controller = Controller::new(service, config, tx);
    let mut reader = BufReader::new(reader);
    tracing::info!("language server started");

    loop {
        match rpc::read_message(&mut reader).await {
            Ok(Some(message)) => {
                if controller.handle(message) == Flow::Exit {
                    tracing::info!("exit requested");
                    break;
                }
            }
            Ok(None) => {
                tracing::info!("input closed");
                break;
            }
            Err(err) => tracing::warn!(error = %err, "skipping malformed message"),
        }
    }

    controller.flush_pending();
    drop(controller);
    writer_task.await?;
    Ok(())
}
