//! Request and notification dispatch for the language server.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tokio::sync::mpsc::UnboundedSender;
use tsf_core::{Day, SemanticType, WriteMode, semantic};
use url::Url;

use super::content::ContentStore;
use super::debounce::Debouncer;
use super::lock;
use super::protocol::{
    Diagnostic, DidChangeParams, DidOpenParams, DidSaveParams, DocumentParams, PositionParams, Range, format_edits,
    utf16_len, utf16_tokens,
};
use super::rpc::{self, INTERNAL_ERROR, INVALID_PARAMS, INVALID_REQUEST, METHOD_NOT_FOUND, Message};
use crate::{Config, Service, diagnostics, util};

/// Completion is offered while the cursor is within this many columns.
const COMPLETION_COLUMNS: u32 = 5;

/// Protocol `CompletionItemKind.Class`.
const COMPLETION_KIND_CLASS: u8 = 7;

/// Protocol `DiagnosticSeverity.Error`.
const SEVERITY_ERROR: u8 = 1;

/// Whether the read loop should keep going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// State shared with debounced cycles.
struct State {
    service: Mutex<Service>,
    content: Mutex<ContentStore>,
    debouncer: Debouncer,
    project_root: Option<PathBuf>,
    report_dir: PathBuf,
}

impl State {
    fn day(&self, uri: &str) -> Option<Day> {
        match util::day_from_uri(uri, self.project_root.as_deref()) {
            Ok(day) => Some(day),
            Err(err) => {
                tracing::debug!(%uri, error = %err, "not a day file");
                None
            }
        }
    }
}

struct RequestError {
    code: i64,
    message: String,
}

impl RequestError {
    fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

pub struct Controller {
    state: Arc<State>,
    outgoing: UnboundedSender<Value>,
    shutdown_requested: bool,
}

impl Controller {
    /// Creates a controller whose replies and notifications go to `outgoing`.
    pub fn new(service: Service, config: &Config, outgoing: UnboundedSender<Value>) -> Self {
        let debouncer = Debouncer::new(
            Duration::from_millis(config.debounce.window_ms),
            config.debounce.scope,
        );
        Self {
            state: Arc::new(State {
                service: Mutex::new(service),
                content: Mutex::new(ContentStore::default()),
                debouncer,
                project_root: config.project_root.clone(),
                report_dir: config.report_dir.clone(),
            }),
            outgoing,
            shutdown_requested: false,
        }
    }

    /// Handles one incoming message. Must run inside a tokio runtime.
    pub fn handle(&mut self, message: Message) -> Flow {
        if message.method.is_empty() {
            tracing::trace!(id = ?message.id, "ignoring client response");
            return Flow::Continue;
        }
        tracing::debug!(method = %message.method, "received");

        match message.id {
            Some(id) => {
                let reply = match self.request(&message.method, message.params) {
                    Ok(result) => rpc::response(id, result),
                    Err(err) => {
                        tracing::warn!(method = %message.method, code = err.code, error = %err.message, "request failed");
                        rpc::error_response(id, err.code, &err.message)
                    }
                };
                send(&self.outgoing, reply);
                Flow::Continue
            }
            None => self.notify(&message.method, message.params),
        }
    }

    /// Runs every waiting debounced cycle now so no edit is lost.
    pub fn flush_pending(&self) {
        self.state.debouncer.flush_all();
    }

    fn request(&mut self, method: &str, params: Value) -> Result<Value, RequestError> {
        if self.shutdown_requested {
            return Err(RequestError::new(INVALID_REQUEST, "server is shutting down"));
        }
        match method {
            "initialize" => Ok(initialize_result()),
            "shutdown" => {
                self.shutdown_requested = true;
                self.flush_pending();
                Ok(Value::Null)
            }
            "textDocument/semanticTokens/full" => Ok(self.semantic_tokens(&parse(params)?)),
            "textDocument/hover" => self.hover(&parse(params)?),
            "textDocument/definition" => self.definition(&parse(params)?),
            "textDocument/completion" => Ok(self.completion(&parse(params)?)),
            "textDocument/formatting" => Ok(self.formatting(&parse(params)?)),
            other => Err(RequestError::new(
                METHOD_NOT_FOUND,
                format!("method not found: {other}"),
            )),
        }
    }

    fn notify(&self, method: &str, params: Value) -> Flow {
        let handled = match method {
            "exit" => return Flow::Exit,
            "textDocument/didOpen" => parse(params).map(|p: DidOpenParams| {
                lock(&self.state.content).set(&p.text_document.uri, p.text_document.text);
            }),
            "textDocument/didChange" => parse(params).map(|p: DidChangeParams| {
                let uri = p.text_document.uri;
                if let Some(change) = p.content_changes.into_iter().last() {
                    lock(&self.state.content).set(&uri, change.text);
                }
                self.schedule("change", &uri, WriteMode::Draft);
            }),
            "textDocument/didSave" => parse(params).map(|p: DidSaveParams| {
                let uri = p.text_document.uri;
                if let Some(text) = p.text {
                    lock(&self.state.content).set(&uri, text);
                }
                self.schedule("save", &uri, WriteMode::Save);
            }),
            "textDocument/didClose" => parse(params).map(|p: DocumentParams| {
                lock(&self.state.content).remove(&p.text_document.uri);
            }),
            _ => {
                tracing::trace!(%method, "unhandled notification");
                Ok(())
            }
        };
        if let Err(err) = handled {
            tracing::warn!(%method, error = %err.message, "bad notification");
        }
        Flow::Continue
    }

    fn schedule(&self, kind: &str, uri: &str, mode: WriteMode) {
        let state = Arc::clone(&self.state);
        let outgoing = self.outgoing.clone();
        let target = uri.to_string();
        self.state
            .debouncer
            .schedule(kind, uri, move || run_cycle(&state, &outgoing, &target, mode));
    }

    fn semantic_tokens(&self, params: &DocumentParams) -> Value {
        let uri = &params.text_document.uri;
        let Some(day) = self.state.day(uri) else {
            return json!({ "data": [] });
        };
        let lines = lock(&self.state.content).lines(uri);
        let tokens = lock(&self.state.service).semantic_tokens(&lines, day);
        json!({ "data": semantic::encode(&utf16_tokens(&tokens, &lines)) })
    }

    fn hover(&self, params: &PositionParams) -> Result<Value, RequestError> {
        let Some(day) = self.state.day(&params.text_document.uri) else {
            return Ok(Value::Null);
        };
        let text = lock(&self.state.service)
            .hover(day)
            .map_err(|err| RequestError::new(INTERNAL_ERROR, err.to_string()))?;
        Ok(json!({ "contents": { "kind": "plaintext", "value": text } }))
    }

    fn definition(&self, params: &PositionParams) -> Result<Value, RequestError> {
        let Some(day) = self.state.day(&params.text_document.uri) else {
            return Ok(Value::Null);
        };
        let path = lock(&self.state.service)
            .write_report(day, &self.state.report_dir)
            .map_err(|err| RequestError::new(INTERNAL_ERROR, err.to_string()))?;
        let uri = Url::from_file_path(&path)
            .map_err(|()| RequestError::new(INTERNAL_ERROR, format!("{} is not absolute", path.display())))?;
        Ok(json!({
            "uri": uri.as_str(),
            "range": Range::default(),
        }))
    }

    fn completion(&self, params: &PositionParams) -> Value {
        if params.position.character > COMPLETION_COLUMNS {
            return json!([]);
        }
        let items: Vec<Value> = lock(&self.state.service)
            .possible_categories()
            .into_iter()
            .map(|category| json!({ "label": category, "kind": COMPLETION_KIND_CLASS, "detail": "Category" }))
            .collect();
        Value::Array(items)
    }

    fn formatting(&self, params: &DocumentParams) -> Value {
        let content = lock(&self.state.content);
        let edits = content.get(&params.text_document.uri).map(format_edits).unwrap_or_default();
        json!(edits)
    }
}

fn initialize_result() -> Value {
    json!({
        "capabilities": {
            "textDocumentSync": {
                "openClose": true,
                "change": 1,
                "save": { "includeText": true },
            },
            "hoverProvider": true,
            "definitionProvider": true,
            "completionProvider": {},
            "documentFormattingProvider": true,
            "semanticTokensProvider": {
                "legend": {
                    "tokenTypes": SemanticType::legend(),
                    "tokenModifiers": [],
                },
                "full": true,
            },
        },
        "serverInfo": {
            "name": "tsf",
            "version": env!("CARGO_PKG_VERSION"),
        },
    })
}

fn parse<T: DeserializeOwned>(params: Value) -> Result<T, RequestError> {
    serde_json::from_value(params).map_err(|err| RequestError::new(INVALID_PARAMS, err.to_string()))
}

fn send(outgoing: &UnboundedSender<Value>, message: Value) {
    if outgoing.send(message).is_err() {
        tracing::debug!("output closed, dropping message");
    }
}

/// Parses and persists the document, then publishes its diagnostics.
fn run_cycle(state: &State, outgoing: &UnboundedSender<Value>, uri: &str, mode: WriteMode) {
    let Some(day) = state.day(uri) else {
        return;
    };
    let Some(text) = lock(&state.content).get(uri).map(ToString::to_string) else {
        return;
    };

    let (processed, categories) = {
        let mut service = lock(&state.service);
        match service.process(&text, day, mode) {
            Ok(processed) => (processed, service.possible_categories()),
            Err(err) => {
                tracing::error!(%uri, %mode, error = %err, "failed to persist timesheet");
                return;
            }
        }
    };

    let lines: Vec<&str> = text.split('\n').collect();
    let diagnostics: Vec<Diagnostic> = processed
        .errors
        .iter()
        .filter_map(|error| {
            let message = diagnostics::message(&error.error, &categories)?;
            let line = lines.get(error.line_number).copied().unwrap_or_default();
            Some(Diagnostic {
                range: Range::on_line(
                    u32::try_from(error.line_number).unwrap_or(u32::MAX),
                    0,
                    utf16_len(line),
                ),
                severity: SEVERITY_ERROR,
                source: "tsf",
                message,
            })
        })
        .collect();

    tracing::debug!(%uri, %mode, diagnostics = diagnostics.len(), "publishing diagnostics");
    send(
        outgoing,
        rpc::notification(
            "textDocument/publishDiagnostics",
            json!({ "uri": uri, "diagnostics": diagnostics }),
        ),
    );
}
