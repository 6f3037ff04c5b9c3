//! Reasoner backends: a local executable or a remote HTTP endpoint.

use std::process::Stdio;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use deduct_core::{Document, GatewayError, ParseError, Reasoner};
use deduct_store::{ReasonerConfig, ReasonerKind};
use serde::Serialize;

/// Runs an executable over the documents, written to a scratch directory.
///
/// The command line is `command args... path...`; stdout is the closure and
/// stderr is kept for diagnostics. The child is killed if the call is
/// dropped or times out.
#[derive(Debug, Clone)]
pub struct ProcessReasoner {
    command: String,
    args: Vec<String>,
    timeout: Duration,
}

impl ProcessReasoner {
    pub fn new(command: impl Into<String>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            command: command.into(),
            args,
            timeout,
        }
    }
}

/// File name for the `index`th document. Keeps the extension engines sniff.
fn file_name(index: usize, name: &str) -> String {
    let name: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
        .collect();
    format!("{index:02}-{name}")
}

impl Reasoner for ProcessReasoner {
    async fn reason(&self, inputs: &[Document]) -> Result<String, GatewayError> {
        let dir = tempfile::tempdir()
            .map_err(|e| GatewayError::Unavailable(format!("failed to create scratch dir: {e}")))?;
        let mut paths = Vec::with_capacity(inputs.len());
        for (i, doc) in inputs.iter().enumerate() {
            let path = dir.path().join(file_name(i, &doc.name));
            tokio::fs::write(&path, &doc.text).await.map_err(|e| {
                GatewayError::Unavailable(format!("failed to write {}: {e}", path.display()))
            })?;
            paths.push(path);
        }

        let mut cmd = tokio::process::Command::new(&self.command);
        cmd.args(&self.args)
            .args(&paths)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let started = Instant::now();
        let output = match tokio::time::timeout(self.timeout, cmd.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(GatewayError::Unavailable(format!(
                    "failed to run {}: {e}",
                    self.command
                )));
            }
            Err(_) => return Err(GatewayError::Timeout(self.timeout)),
        };
        tracing::debug!(
            command = %self.command,
            elapsed_ms = started.elapsed().as_millis() as u64,
            stdout = output.stdout.len(),
            "reasoner finished"
        );

        if !output.status.success() {
            return Err(GatewayError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        String::from_utf8(output.stdout).map_err(|e| {
            GatewayError::MalformedClosure(ParseError::Syntax(format!("closure is not UTF-8: {e}")))
        })
    }
}

#[derive(Serialize)]
struct Payload<'a> {
    inputs: Vec<Input<'a>>,
}

#[derive(Serialize)]
struct Input<'a> {
    name: &'a str,
    text: &'a str,
}

/// POSTs `{"inputs": [{"name", "text"}, ...]}` and reads the closure from
/// the response body.
#[derive(Debug, Clone)]
pub struct HttpReasoner {
    client: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl HttpReasoner {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            client,
            url: url.into(),
            timeout,
        })
    }

    fn transport(&self, e: reqwest::Error) -> GatewayError {
        if e.is_timeout() {
            GatewayError::Timeout(self.timeout)
        } else {
            GatewayError::Unavailable(format!("{}: {e}", self.url))
        }
    }
}

impl Reasoner for HttpReasoner {
    async fn reason(&self, inputs: &[Document]) -> Result<String, GatewayError> {
        let payload = Payload {
            inputs: inputs
                .iter()
                .map(|d| Input {
                    name: &d.name,
                    text: &d.text,
                })
                .collect(),
        };
        let response = self
            .client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| self.transport(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Failed {
                status: status.to_string(),
                stderr: body.trim().to_string(),
            });
        }
        response.text().await.map_err(|e| self.transport(e))
    }
}

/// The configured backend.
#[derive(Debug, Clone)]
pub enum Gateway {
    Process(ProcessReasoner),
    Http(HttpReasoner),
}

impl Gateway {
    pub fn from_config(config: &ReasonerConfig) -> Result<Self> {
        Ok(match config.kind {
            ReasonerKind::Process => {
                let command = config
                    .command
                    .clone()
                    .context("reasoner command is not configured")?;
                Gateway::Process(ProcessReasoner::new(
                    command,
                    config.args.clone(),
                    config.timeout(),
                ))
            }
            ReasonerKind::Http => {
                let url = config.url.clone().context("reasoner url is not configured")?;
                Gateway::Http(HttpReasoner::new(url, config.timeout())?)
            }
        })
    }
}

impl Reasoner for Gateway {
    async fn reason(&self, inputs: &[Document]) -> Result<String, GatewayError> {
        match self {
            Gateway::Process(r) => r.reason(inputs).await,
            Gateway::Http(r) => r.reason(inputs).await,
        }
    }
}
