use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;
use std::str::FromStr;

use channel_profit_core::calculator::{self, CalculationInput};
use channel_profit_core::{display, formatter};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

fn parse_decimal(text: &str) -> NapiResult<Decimal> {
    Decimal::from_str(text.trim()).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Calculation
// ---------------------------------------------------------------------------

#[napi]
pub fn compare_channels(input_json: String) -> NapiResult<String> {
    let input: CalculationInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = calculator::analyze_channels(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn render_display(input_json: String) -> NapiResult<String> {
    let input: CalculationInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let result = calculator::calculate(&input);
    let report = display::render(&input, &result);
    serde_json::to_string(&report).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Formatting
// ---------------------------------------------------------------------------

#[napi]
pub fn strip_non_digits(text: String) -> String {
    formatter::strip_non_digits(&text)
}

/// Decimal rate as a string, so no precision is lost crossing into JS.
#[napi]
pub fn parse_percent_to_decimal(text: String) -> String {
    formatter::parse_percent_to_decimal(&text).to_string()
}

#[napi]
pub fn format_integer(text: String) -> String {
    formatter::format_integer(&text)
}

#[napi]
pub fn format_currency_display(amount: String) -> NapiResult<String> {
    Ok(formatter::format_currency_display(parse_decimal(&amount)?))
}

#[napi]
pub fn format_percent_display(rate: String) -> NapiResult<String> {
    Ok(formatter::format_percent_display(parse_decimal(&rate)?))
}
