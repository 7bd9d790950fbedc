use clap::{Args, Subcommand};
use rust_decimal::Decimal;
use serde_json::{json, Value};

use channel_profit_core::formatter;

/// Arguments for running a single formatter
#[derive(Args)]
pub struct FormatArgs {
    #[command(subcommand)]
    pub kind: FormatKind,
}

#[derive(Subcommand)]
pub enum FormatKind {
    /// Render an amount as whole currency units ("$1,234")
    Currency {
        #[arg(allow_hyphen_values = true)]
        amount: Decimal,
    },
    /// Render a decimal rate as a percentage ("12.5%")
    Percent {
        #[arg(allow_hyphen_values = true)]
        rate: Decimal,
    },
    /// Group an integer with thousands separators ("1,234")
    Integer {
        #[arg(allow_hyphen_values = true)]
        text: String,
    },
    /// Keep only the digits of some text
    Strip {
        #[arg(allow_hyphen_values = true)]
        text: String,
    },
    /// Convert typed percentage text into a decimal rate ("15%" -> 0.15)
    ParsePercent {
        #[arg(allow_hyphen_values = true)]
        text: String,
    },
}

pub fn run_format(args: FormatArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let (input, display) = match args.kind {
        FormatKind::Currency { amount } => {
            (amount.to_string(), formatter::format_currency_display(amount))
        }
        FormatKind::Percent { rate } => (rate.to_string(), formatter::format_percent_display(rate)),
        FormatKind::Integer { text } => {
            let shown = formatter::format_integer(&text);
            (text, shown)
        }
        FormatKind::Strip { text } => {
            let shown = formatter::strip_non_digits(&text);
            (text, shown)
        }
        FormatKind::ParsePercent { text } => {
            let rate = formatter::parse_percent_to_decimal(&text);
            (text, rate.to_string())
        }
    };
    Ok(json!({ "result": { "input": input, "display": display } }))
}
