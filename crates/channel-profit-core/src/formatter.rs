use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

use crate::types::{DisplayText, Money, Rate};

/// Symbol prefixed to every committed currency value.
pub const CURRENCY_SYMBOL: &str = "$";

const THOUSANDS_SEPARATOR: char = ',';

/// Rounding rule for every displayed figure: half away from zero, as en-US
/// number formatting does.
const DISPLAY_ROUNDING: RoundingStrategy = RoundingStrategy::MidpointAwayFromZero;

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Remove every character that is not an ASCII decimal digit.
pub fn strip_non_digits(text: &str) -> String {
    text.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Whole-unit currency amount typed into a sales field. Anything without
/// digits reads as zero.
pub fn parse_currency_amount(text: &str) -> Money {
    let digits = strip_non_digits(text);
    if digits.is_empty() {
        return Decimal::ZERO;
    }
    Decimal::from_str(&digits).unwrap_or(Decimal::ZERO)
}

/// Parse a percentage as typed ("15", "15%", " 7.5 ") into a decimal rate.
///
/// Reads the longest numeric prefix after leading whitespace; text with no
/// numeric prefix yields zero.
pub fn parse_percent_to_decimal(text: &str) -> Rate {
    try_parse_percent(text).unwrap_or(Decimal::ZERO)
}

/// Like [`parse_percent_to_decimal`] but reports text without a numeric
/// prefix as `None` instead of zero.
pub fn try_parse_percent(text: &str) -> Option<Rate> {
    parse_float_prefix(text).map(|value| value / Decimal::ONE_HUNDRED)
}

/// Longest prefix of `text` that reads as a decimal number with an optional
/// sign, fraction and exponent.
fn parse_float_prefix(text: &str) -> Option<Decimal> {
    let bytes = text.trim_start().as_bytes();
    let mut pos = 0;

    let mut mantissa = String::new();
    match bytes.first() {
        Some(b'-') => {
            mantissa.push('-');
            pos += 1;
        }
        Some(b'+') => pos += 1,
        _ => {}
    }

    let int_start = pos;
    while pos < bytes.len() && bytes[pos].is_ascii_digit() {
        pos += 1;
    }
    let int_digits = &bytes[int_start..pos];

    let mut frac_digits: &[u8] = &[];
    if pos < bytes.len() && bytes[pos] == b'.' {
        let frac_start = pos + 1;
        let mut end = frac_start;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
        frac_digits = &bytes[frac_start..end];
        if !int_digits.is_empty() || !frac_digits.is_empty() {
            pos = end;
        }
    }

    if int_digits.is_empty() && frac_digits.is_empty() {
        return None;
    }

    if int_digits.is_empty() {
        mantissa.push('0');
    } else {
        mantissa.push_str(std::str::from_utf8(int_digits).ok()?);
    }
    if !frac_digits.is_empty() {
        mantissa.push('.');
        mantissa.push_str(std::str::from_utf8(frac_digits).ok()?);
    }

    // Exponent is only consumed when at least one digit follows it.
    let mut exponent: Option<String> = None;
    if pos < bytes.len() && (bytes[pos] == b'e' || bytes[pos] == b'E') {
        let mut end = pos + 1;
        let negative = end < bytes.len() && bytes[end] == b'-';
        if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
            end += 1;
        }
        let digits_start = end;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
        if end > digits_start {
            let digits = std::str::from_utf8(&bytes[digits_start..end]).ok()?;
            exponent = Some(if negative {
                format!("-{digits}")
            } else {
                digits.to_string()
            });
        }
    }

    let parsed = match &exponent {
        Some(exp) => Decimal::from_scientific(&format!("{mantissa}e{exp}")),
        None => Decimal::from_str(&mantissa),
    };
    match parsed {
        Ok(value) => Some(value),
        Err(_) => Some(out_of_range(&mantissa, int_digits, exponent.as_deref())),
    }
}

/// Nearest representable value for a well-formed number Decimal cannot
/// hold: a bound when the magnitude is too large, zero when too small.
fn out_of_range(mantissa: &str, int_digits: &[u8], exponent: Option<&str>) -> Decimal {
    let significant = int_digits.iter().skip_while(|&&d| d == b'0').count() as i64;
    let shift = match exponent {
        Some(exp) => exp.parse::<i64>().unwrap_or(if exp.starts_with('-') {
            i64::MIN
        } else {
            i64::MAX
        }),
        None => 0,
    };
    if significant.saturating_add(shift) <= 0 {
        Decimal::ZERO
    } else if mantissa.starts_with('-') {
        Decimal::MIN
    } else {
        Decimal::MAX
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Insert en-US thousands separators into a run of ASCII digits.
fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(THOUSANDS_SEPARATOR);
        }
        out.push(ch);
    }
    out
}

/// Read `text` as an integer (optional sign, then leading digits) and
/// render it with thousands separators. Unparseable text renders as "0".
pub fn format_integer(text: &str) -> DisplayText {
    let trimmed = text.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let digits: &str = {
        let end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        rest[..end].trim_start_matches('0')
    };
    if digits.is_empty() {
        return "0".to_string();
    }
    let grouped = group_thousands(digits);
    if negative {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// Render an amount as whole currency units, e.g. `$1,180,000`.
///
/// Negative amounts keep the sign after the symbol (`$-520,000`). Anything
/// that rounds to zero renders as `$0`.
pub fn format_currency_display(amount: Money) -> DisplayText {
    let mut rounded = amount.round_dp_with_strategy(0, DISPLAY_ROUNDING);
    if rounded.is_zero() {
        return format!("{CURRENCY_SYMBOL}0");
    }
    let sign = if rounded.is_sign_negative() { "-" } else { "" };
    rounded.set_sign_positive(true);
    rounded.rescale(0);
    format!(
        "{CURRENCY_SYMBOL}{sign}{}",
        group_thousands(&rounded.to_string())
    )
}

/// Render a decimal fraction as a percentage with one decimal place,
/// e.g. 0.59 → `59.0%`.
pub fn format_percent_display(fraction: Rate) -> DisplayText {
    let mut pct = fraction
        .saturating_mul(Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(1, DISPLAY_ROUNDING);
    if pct.is_zero() {
        return "0.0%".to_string();
    }
    pct.rescale(1);
    if pct.scale() == 0 {
        // No room left in the mantissa for the tenths digit.
        return format!("{pct}.0%");
    }
    format!("{pct}%")
}

// ---------------------------------------------------------------------------
// Currency input mask
// ---------------------------------------------------------------------------

/// Editing behaviour of a currency-style input field.
///
/// While focused the user edits raw digits, grouped on every keystroke;
/// on blur the symbol is added back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrencyMask {
    pub symbol: &'static str,
}

impl Default for CurrencyMask {
    fn default() -> Self {
        Self {
            symbol: CURRENCY_SYMBOL,
        }
    }
}

impl CurrencyMask {
    /// Text shown when the field gains focus: digits only.
    pub fn on_focus(&self, text: &str) -> String {
        strip_non_digits(text)
    }

    /// Text shown after each keystroke: grouped digits, no symbol.
    pub fn on_input(&self, text: &str) -> String {
        format_integer(&strip_non_digits(text))
    }

    /// Text shown when the field loses focus, or empty when no digits remain.
    pub fn on_blur(&self, text: &str) -> String {
        let digits = strip_non_digits(text);
        if digits.is_empty() {
            String::new()
        } else {
            format!("{}{}", self.symbol, format_integer(&digits))
        }
    }

    /// Formatting applied to a pre-filled value; text without digits is kept.
    pub fn initial(&self, text: &str) -> String {
        if strip_non_digits(text).is_empty() {
            text.to_string()
        } else {
            self.on_blur(text)
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
