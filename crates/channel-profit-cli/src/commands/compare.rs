use clap::Args;
use serde_json::{json, Value};

use channel_profit_core::calculator::{self, CalculationInput};
use channel_profit_core::display;
use channel_profit_core::formatter::{parse_currency_amount, strip_non_digits, try_parse_percent};
use channel_profit_core::state::Field;
use channel_profit_core::{ChannelProfitError, Rate};

use crate::input;

/// Sales and cost rates of both channels, typed the way the page accepts
/// them. Omitted flags fall back to the page defaults.
#[derive(Args)]
pub struct ChannelArgs {
    /// Gross Amazon sales, e.g. "$2,000,000" or 2000000
    #[arg(long, allow_negative_numbers = true)]
    pub sales: Option<String>,

    /// Amazon commission percentage (e.g. 15 for 15%)
    #[arg(long, allow_negative_numbers = true)]
    pub commission: Option<String>,

    /// FBA fee percentage
    #[arg(long, allow_negative_numbers = true)]
    pub fba: Option<String>,

    /// Direct advertising percentage
    #[arg(long, allow_negative_numbers = true)]
    pub ads: Option<String>,

    /// Account management fee percentage
    #[arg(long, allow_negative_numbers = true)]
    pub mgmt: Option<String>,

    /// Returns percentage
    #[arg(long, allow_negative_numbers = true)]
    pub returns: Option<String>,

    /// Other direct costs percentage
    #[arg(long, allow_negative_numbers = true)]
    pub other_direct: Option<String>,

    /// Wholesale percentage of gross sales paid by the distributor
    #[arg(long, allow_negative_numbers = true)]
    pub wholesale: Option<String>,

    /// Distributor-channel advertising percentage
    #[arg(long, allow_negative_numbers = true)]
    pub ads_dist: Option<String>,

    /// Other distributor costs percentage
    #[arg(long, allow_negative_numbers = true)]
    pub other_dist: Option<String>,

    /// Reject unreadable values instead of treating them as zero
    #[arg(long)]
    pub strict: bool,

    /// Path to JSON/YAML input file with decimal rates (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_compare(args: ChannelArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let calc_input = resolve_input(&args)?;
    let result = calculator::analyze_channels(&calc_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_render(args: ChannelArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let calc_input = resolve_input(&args)?;
    let result = calculator::calculate(&calc_input);
    let report = display::render(&calc_input, &result);
    Ok(json!({ "result": report }))
}

fn resolve_input(args: &ChannelArgs) -> Result<CalculationInput, Box<dyn std::error::Error>> {
    if let Some(ref path) = args.input {
        return input::file::read_input(path);
    }
    if let Some(data) = input::stdin::read_stdin()? {
        return Ok(serde_json::from_value(data)?);
    }
    Ok(from_flags(args)?)
}

fn from_flags(args: &ChannelArgs) -> Result<CalculationInput, ChannelProfitError> {
    let sales_text = text_or_default(&args.sales, Field::DirectAmazonSales);
    if args.strict && strip_non_digits(sales_text).is_empty() {
        return Err(ChannelProfitError::InvalidInput {
            field: Field::DirectAmazonSales.id().into(),
            reason: format!("'{sales_text}' contains no digits"),
        });
    }

    let rate = |value: &Option<String>, field: Field| -> Result<Rate, ChannelProfitError> {
        let text = text_or_default(value, field);
        match try_parse_percent(text) {
            Some(r) => Ok(r),
            None if args.strict => Err(ChannelProfitError::InvalidInput {
                field: field.id().into(),
                reason: format!("'{text}' is not a percentage"),
            }),
            None => Ok(Rate::ZERO),
        }
    };

    Ok(CalculationInput {
        sales_amount: parse_currency_amount(sales_text),
        commission_rate: rate(&args.commission, Field::DirectCommissionPct)?,
        fba_rate: rate(&args.fba, Field::DirectFbaPct)?,
        ad_rate: rate(&args.ads, Field::DirectAdPct)?,
        mgmt_rate: rate(&args.mgmt, Field::DirectMgmtPct)?,
        returns_rate: rate(&args.returns, Field::DirectReturnsPct)?,
        other_rate_direct: rate(&args.other_direct, Field::DirectOtherPct)?,
        wholesale_rate: rate(&args.wholesale, Field::DistWholesalePct)?,
        ad_rate_dist: rate(&args.ads_dist, Field::DistAdPct)?,
        other_rate_dist: rate(&args.other_dist, Field::DistOtherPct)?,
    })
}

fn text_or_default(value: &Option<String>, field: Field) -> &str {
    value.as_deref().unwrap_or(field.default_text())
}
