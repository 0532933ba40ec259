//! rsql 交互式客户端
//!
//! A psql-style shell over a running gateway. Every statement is posted to
//! the gateway together with the target database URL, and results print as
//! a table followed by `(N rows)`.
//!
//! ```text
//! rsql [DATABASE_URL]
//! ```
//!
//! Without an argument the URL comes from `DATABASE_URL` (environment or
//! `.env`). `GATEWAY_URL` names the gateway (default
//! `http://localhost:9876`). Input accumulates over lines until one ends in
//! `;`; `exit` leaves the shell.

use std::fmt;

use anyhow::{bail, Context};
use common::config::DEFAULT_PORT;
use common::models::{QueryRequest, QueryResult};
use common::response::ErrorResponse;
use dialoguer::theme::Theme;
use dialoguer::{BasicHistory, Input};
use prettytable::{format, Cell, Row, Table};
use regex::Regex;
use serde_json::Value;
use url::Url;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let db_url = match std::env::args().nth(1) {
        Some(url) => url,
        None => std::env::var("DATABASE_URL").context("需要 DATABASE_URL 参数或环境变量")?,
    };
    let gateway = std::env::var("GATEWAY_URL")
        .unwrap_or_else(|_| format!("http://localhost:{DEFAULT_PORT}"));

    let db_name = database_name(&db_url);
    let client = GatewayClient::new(gateway, db_url);
    println!("Connected to database {db_name}");

    let mut history = BasicHistory::new().no_duplicates(true);
    let mut buffer = StatementBuffer::new()?;

    loop {
        let prompt = buffer.prompt(&db_name);
        let input = match Input::<String>::with_theme(&CliTheme)
            .with_prompt(prompt)
            .history_with(&mut history)
            .allow_empty(true)
            .interact_text()
        {
            Ok(input) => input,
            // Ctrl+D, Ctrl+C or a closed terminal
            Err(_) => break,
        };

        match buffer.push(&input) {
            Line::Empty | Line::Pending => {}
            Line::Exit => break,
            Line::Complete(statement) => match client.execute(&statement).await {
                Ok(result) => {
                    if let Some(output) = render(&result) {
                        println!("{output}");
                    }
                }
                Err(err) => eprintln!("ERROR: {err:#}"),
            },
        }
    }

    Ok(())
}

/// Client half of the gateway contract.
struct GatewayClient {
    http: reqwest::Client,
    endpoint: String,
    url: String,
}

impl GatewayClient {
    fn new(endpoint: String, url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint,
            url,
        }
    }

    async fn execute(&self, query: &str) -> anyhow::Result<QueryResult> {
        let request = QueryRequest {
            url: self.url.clone(),
            query: query.to_string(),
        };
        let response = self
            .http
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .with_context(|| format!("无法连接到网关: {}", self.endpoint))?;

        if response.status().is_success() {
            return response.json().await.context("网关返回无效响应");
        }

        let status = response.status();
        match response.json::<ErrorResponse>().await {
            Ok(body) => bail!(body.error),
            Err(_) => bail!("网关返回 {status}"),
        }
    }
}

/// Outcome of feeding one input line to a [`StatementBuffer`].
#[derive(Debug, PartialEq, Eq)]
enum Line {
    Empty,
    Exit,
    Pending,
    /// A full statement, trailing semicolons removed.
    Complete(String),
}

/// Collects input lines until a statement is terminated by `;`.
struct StatementBuffer {
    lines: Vec<String>,
    exit: Regex,
    trailing_semicolons: Regex,
}

impl StatementBuffer {
    fn new() -> anyhow::Result<Self> {
        Ok(Self {
            lines: Vec::new(),
            exit: Regex::new(r"(?i)^exit\s*;*$")?,
            trailing_semicolons: Regex::new(r"[;\s]*$")?,
        })
    }

    fn prompt(&self, db_name: &str) -> String {
        if self.lines.is_empty() {
            format!("{db_name}=#")
        } else {
            format!("{db_name}-#")
        }
    }

    fn push(&mut self, input: &str) -> Line {
        let input = input.trim();
        if input.is_empty() {
            return Line::Empty;
        }
        if self.exit.is_match(input) {
            self.lines.clear();
            return Line::Exit;
        }
        if !input.ends_with(';') {
            self.lines.push(input.to_string());
            return Line::Pending;
        }

        let last = self.trailing_semicolons.replace(input, "");
        if !last.is_empty() {
            self.lines.push(last.into_owned());
        }
        let statement = self.lines.join("\n");
        self.lines.clear();
        if statement.is_empty() {
            Line::Empty
        } else {
            Line::Complete(statement)
        }
    }
}

/// Last path segment of the URL, shown in the prompt.
fn database_name(db_url: &str) -> String {
    Url::parse(db_url)
        .ok()
        .and_then(|url| {
            url.path_segments()
                .and_then(|mut segments| segments.next_back().map(str::to_string))
        })
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "rsql".to_string())
}

/// Table plus row count, or `None` for statements without a result shape.
fn render(result: &QueryResult) -> Option<String> {
    if result.columns.is_empty() {
        return None;
    }

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_NO_BORDER_LINE_SEPARATOR);
    table.set_titles(Row::new(
        result.columns.iter().map(|c| Cell::new(&c.name)).collect(),
    ));
    for row in &result.rows {
        table.add_row(Row::new(
            result
                .columns
                .iter()
                .map(|c| Cell::new(&cell_text(row.get(&c.name))))
                .collect(),
        ));
    }

    let noun = if result.row_count() == 1 { "row" } else { "rows" };
    Some(format!("{table}({} {noun})", result.row_count()))
}

fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

struct CliTheme;

impl Theme for CliTheme {
    fn format_input_prompt(
        &self,
        f: &mut dyn fmt::Write,
        prompt: &str,
        default: Option<&str>,
    ) -> fmt::Result {
        match default {
            Some(default) if prompt.is_empty() => write!(f, "[{default}] "),
            Some(default) => write!(f, "{prompt} [{default}] "),
            None => write!(f, "{prompt} "),
        }
    }

    fn format_input_prompt_selection(
        &self,
        f: &mut dyn fmt::Write,
        prompt: &str,
        sel: &str,
    ) -> fmt::Result {
        write!(f, "{prompt} {sel}")
    }
}
