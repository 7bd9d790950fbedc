use clap::Args;
use colored::Colorize;
use serde_json::{json, Map, Value};
use std::io::{self, BufRead};
use tracing::warn;

use channel_profit_core::state::{CalculatorState, Field};
use channel_profit_core::ChannelProfitError;

use crate::input;
use crate::output;
use crate::OutputFormat;

/// Arguments for an interactive calculator session
///
/// Each stdin line is one edit:
///   `<field-id> <text>`   commit text to a field
///   `focus <field-id>`    `input <field-id> <text>`    `blur <field-id>`
///   `show`                recompute without editing
#[derive(Args)]
pub struct SessionArgs {
    /// Skip the recompute the page performs on load
    #[arg(long)]
    pub skip_initial: bool,
}

enum Edit {
    Focus(Field),
    Input(Field, String),
    Blur(Field),
    Commit(Field, String),
    Show,
}

fn parse_edit(line: &str) -> Result<Edit, ChannelProfitError> {
    let (head, rest) = split_word(line);
    match head {
        "show" => Ok(Edit::Show),
        "focus" => Ok(Edit::Focus(rest.parse()?)),
        "blur" => Ok(Edit::Blur(rest.parse()?)),
        "input" => {
            let (id, text) = split_word(rest);
            Ok(Edit::Input(id.parse()?, text.to_string()))
        }
        id => Ok(Edit::Commit(id.parse()?, rest.to_string())),
    }
}

fn split_word(line: &str) -> (&str, &str) {
    let line = line.trim();
    match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    }
}

pub fn run_session(
    args: SessionArgs,
    format: &OutputFormat,
) -> Result<Value, Box<dyn std::error::Error>> {
    let mut state = CalculatorState::new();

    let listener_format = format.clone();
    state.subscribe(move |recomputed| {
        let value = json!({
            "sequence": recomputed.sequence,
            "result": recomputed.display,
        });
        output::format_output(&listener_format, &value);
    });

    if !args.skip_initial {
        state.recompute();
    }

    if !input::stdin::is_piped() {
        eprintln!(
            "{} one edit per line, e.g. `direct-amazon-sales 1500000`; Ctrl-D to finish",
            "session:".cyan().bold()
        );
    }

    let stdin = io::stdin();
    for (lineno, line) in stdin.lock().lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        match parse_edit(trimmed) {
            Ok(Edit::Focus(field)) => state.focus(field),
            Ok(Edit::Input(field, text)) => state.input(field, &text),
            Ok(Edit::Blur(field)) => {
                state.blur(field);
            }
            Ok(Edit::Commit(field, text)) => {
                state.commit(field, &text);
            }
            Ok(Edit::Show) => {
                state.recompute();
            }
            Err(e) => {
                warn!(line = lineno + 1, error = %e, "skipping session command");
                eprintln!("{}: line {}: {}", "warning".yellow().bold(), lineno + 1, e);
            }
        }
    }

    let mut fields = Map::new();
    for field in Field::ALL {
        fields.insert(field.id().to_string(), json!(state.value(field)));
    }
    Ok(json!({
        "result": {
            "recomputes": state.last().map(|r| r.sequence).unwrap_or(0),
            "fields": fields,
        }
    }))
}
