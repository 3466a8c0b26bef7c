use std::fs;
use std::io::Read;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use chat_answers::answer::{AnswerView, RenderedAnswer};
use chat_answers::models::AskResponse;
use chat_answers::parse_answer;

#[derive(Parser, Debug)]
#[command(name = "parse-answer")]
#[command(about = "Rewrite citation tokens in an answer payload and print the result as JSON")]
struct Cli {
    /// AskResponse JSON file; stdin when omitted
    #[arg(long)]
    file: Option<String>,
    /// Print the full answer view (enumerated citations and reference labels)
    #[arg(long, default_value_t = false)]
    view: bool,
    #[arg(long, default_value_t = false)]
    pretty: bool,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let raw = read_input(cli.file.as_deref())?;
    let response: AskResponse = serde_json::from_str(&raw).with_context(|| {
        format!(
            "invalid AskResponse JSON in {}",
            cli.file.as_deref().unwrap_or("stdin")
        )
    })?;

    println!("{}", render_output(&response, cli.view, cli.pretty)?);
    Ok(())
}

fn render_output(response: &AskResponse, view: bool, pretty: bool) -> Result<String> {
    let output = if view {
        serde_json::to_value(AnswerView::from_response(response).map(RenderedAnswer::from))?
    } else {
        serde_json::to_value(parse_answer(response))?
    };

    if output.is_null() {
        tracing::warn!("answer text missing; nothing to render");
    }

    let rendered = if pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    Ok(rendered)
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => fs::read_to_string(path).with_context(|| format!("failed opening {}", path)),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed reading stdin")?;
            Ok(buf)
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
