use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::types::{with_metadata, Channel, ComputationOutput, Money, Rate};
use crate::ChannelProfitResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Gross sales plus the nine cost rates of both selling models.
///
/// Rates are independent decimal fractions. Nothing ties them together:
/// they may sum above 1, which simply yields a negative profit. Missing
/// fields deserialize as zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalculationInput {
    /// Gross Amazon sales for the product
    #[serde(alias = "salesAmount", alias = "amazonSales")]
    pub sales_amount: Money,
    /// Amazon referral commission
    #[serde(alias = "commissionRate")]
    pub commission_rate: Rate,
    /// Fulfilment by Amazon fees
    #[serde(alias = "fbaRate")]
    pub fba_rate: Rate,
    /// Direct advertising spend
    #[serde(alias = "adRate")]
    pub ad_rate: Rate,
    /// Account management fee
    #[serde(alias = "mgmtRate")]
    pub mgmt_rate: Rate,
    /// Returns and refunds
    #[serde(alias = "returnsRate")]
    pub returns_rate: Rate,
    /// Any other direct-channel cost
    #[serde(alias = "otherRateDirect")]
    pub other_rate_direct: Rate,
    /// Share of gross sales the brand receives from the distributor
    #[serde(alias = "wholesaleRate")]
    pub wholesale_rate: Rate,
    /// Advertising co-funded by the brand under the distributor model
    #[serde(alias = "adRateDist")]
    pub ad_rate_dist: Rate,
    /// Any other distributor-channel cost
    #[serde(alias = "otherRateDist")]
    pub other_rate_dist: Rate,
}

/// The fourteen derived figures. Always recomputed as a whole.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationResult {
    // Direct
    pub commission_amt: Money,
    pub fba_fees_amt: Money,
    /// sales - commission - FBA
    pub net_revenue: Money,
    pub ad_expenses: Money,
    pub mgmt_fee: Money,
    pub returns_amt: Money,
    pub other_fees_amt: Money,
    /// Sum of the six direct-side rates
    pub total_fees_rate: Rate,
    /// net revenue - ads - management - returns - other
    pub brand_profit_direct: Money,

    // Distributor
    pub wholesale_amt: Money,
    pub ad_expenses_dist: Money,
    pub other_fees_amt_dist: Money,
    /// wholesale - ads - other
    pub brand_profit_dist: Money,

    /// brand_profit_direct - brand_profit_dist
    pub difference: Money,
}

/// Net profit of each model as a fraction of gross sales.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfitMargins {
    /// 1 - total direct fee rate
    pub direct_net_profit_rate: Rate,
    /// brand_profit_dist / sales, zero when sales is zero
    pub distributor_net_profit_rate: Rate,
}

/// Full comparison of both selling models.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelComparison {
    #[serde(flatten)]
    pub figures: CalculationResult,
    pub margins: ProfitMargins,
    /// Wholesale rate at which the distributor model matches direct profit
    pub break_even_wholesale_rate: Rate,
    pub preferred_channel: Channel,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Share of sales, saturating at the Decimal bounds instead of overflowing.
fn share(sales: Money, rate: Rate) -> Money {
    sales.saturating_mul(rate)
}

/// Ratio that yields zero for a zero denominator and saturates on overflow.
fn safe_ratio(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator.is_zero() {
        return Decimal::ZERO;
    }
    numerator.checked_div(denominator).unwrap_or_else(|| {
        if numerator.is_sign_negative() != denominator.is_sign_negative() {
            Decimal::MIN
        } else {
            Decimal::MAX
        }
    })
}

// ---------------------------------------------------------------------------
// Core calculation
// ---------------------------------------------------------------------------

/// Derive every figure of both selling models from gross sales and rates.
///
/// Pure and total: no clamping, no branching on sign, and identical inputs
/// always produce identical outputs.
pub fn calculate(input: &CalculationInput) -> CalculationResult {
    let s = input.sales_amount;

    let commission_amt = share(s, input.commission_rate);
    let fba_fees_amt = share(s, input.fba_rate);
    let net_revenue = s
        .saturating_sub(commission_amt)
        .saturating_sub(fba_fees_amt);
    let ad_expenses = share(s, input.ad_rate);
    let mgmt_fee = share(s, input.mgmt_rate);
    let returns_amt = share(s, input.returns_rate);
    let other_fees_amt = share(s, input.other_rate_direct);
    let total_fees_rate = [
        input.commission_rate,
        input.fba_rate,
        input.ad_rate,
        input.mgmt_rate,
        input.returns_rate,
        input.other_rate_direct,
    ]
    .iter()
    .fold(Decimal::ZERO, |acc, r| acc.saturating_add(*r));
    let brand_profit_direct = net_revenue
        .saturating_sub(ad_expenses)
        .saturating_sub(mgmt_fee)
        .saturating_sub(returns_amt)
        .saturating_sub(other_fees_amt);

    let wholesale_amt = share(s, input.wholesale_rate);
    let ad_expenses_dist = share(s, input.ad_rate_dist);
    let other_fees_amt_dist = share(s, input.other_rate_dist);
    let brand_profit_dist = wholesale_amt
        .saturating_sub(ad_expenses_dist)
        .saturating_sub(other_fees_amt_dist);

    let difference = brand_profit_direct.saturating_sub(brand_profit_dist);

    CalculationResult {
        commission_amt,
        fba_fees_amt,
        net_revenue,
        ad_expenses,
        mgmt_fee,
        returns_amt,
        other_fees_amt,
        total_fees_rate,
        brand_profit_direct,
        wholesale_amt,
        ad_expenses_dist,
        other_fees_amt_dist,
        brand_profit_dist,
        difference,
    }
}

/// Net profit rates of both models. The distributor rate is zero when there
/// are no sales to divide by.
pub fn margins(input: &CalculationInput, result: &CalculationResult) -> ProfitMargins {
    ProfitMargins {
        direct_net_profit_rate: Decimal::ONE.saturating_sub(result.total_fees_rate),
        distributor_net_profit_rate: safe_ratio(result.brand_profit_dist, input.sales_amount),
    }
}

/// Wholesale rate at which distributor brand profit equals direct brand profit.
pub fn break_even_wholesale_rate(input: &CalculationInput, result: &CalculationResult) -> Rate {
    let required = result
        .brand_profit_direct
        .saturating_add(result.ad_expenses_dist)
        .saturating_add(result.other_fees_amt_dist);
    safe_ratio(required, input.sales_amount)
}

/// Compare both selling models and wrap the figures in the standard envelope.
///
/// Implausible inputs never fail; they are reported as warnings.
pub fn analyze_channels(
    input: &CalculationInput,
) -> ChannelProfitResult<ComputationOutput<ChannelComparison>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.sales_amount < Decimal::ZERO {
        warnings.push(format!(
            "Sales amount {} is negative; figures are mirrored accordingly",
            input.sales_amount
        ));
    }
    if input.sales_amount.is_zero() {
        warnings.push("Sales amount is zero; all monetary figures are zero".into());
    }

    let rates = [
        ("commission_rate", input.commission_rate),
        ("fba_rate", input.fba_rate),
        ("ad_rate", input.ad_rate),
        ("mgmt_rate", input.mgmt_rate),
        ("returns_rate", input.returns_rate),
        ("other_rate_direct", input.other_rate_direct),
        ("wholesale_rate", input.wholesale_rate),
        ("ad_rate_dist", input.ad_rate_dist),
        ("other_rate_dist", input.other_rate_dist),
    ];
    for (name, rate) in rates {
        if rate < Decimal::ZERO || rate > Decimal::ONE {
            warnings.push(format!("{name} = {rate} lies outside [0, 1]"));
        }
    }

    let figures = calculate(input);

    if figures.total_fees_rate > Decimal::ONE {
        warnings.push(format!(
            "Direct fee rates sum to {} (above 100%); direct profit is negative",
            figures.total_fees_rate
        ));
    }
    let dist_deductions = figures
        .ad_expenses_dist
        .saturating_add(figures.other_fees_amt_dist);
    if dist_deductions > figures.wholesale_amt {
        warnings.push(format!(
            "Distributor deductions ({dist_deductions}) exceed the wholesale amount ({})",
            figures.wholesale_amt
        ));
    }

    let preferred_channel = if figures.difference > Decimal::ZERO {
        Channel::Direct
    } else if figures.difference < Decimal::ZERO {
        Channel::Distributor
    } else {
        Channel::Tie
    };

    let comparison = ChannelComparison {
        margins: margins(input, &figures),
        break_even_wholesale_rate: break_even_wholesale_rate(input, &figures),
        preferred_channel,
        figures,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Direct vs Distributor channel profitability (rates applied to gross sales)",
        input,
        warnings,
        elapsed,
        comparison,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_input() -> CalculationInput {
        CalculationInput {
            sales_amount: dec!(2_000_000),
            commission_rate: dec!(0.15),
            fba_rate: dec!(0.10),
            ad_rate: dec!(0.08),
            mgmt_rate: dec!(0.05),
            returns_rate: dec!(0.02),
            other_rate_direct: dec!(0.01),
            wholesale_rate: dec!(0.40),
            ad_rate_dist: dec!(0.05),
            other_rate_dist: dec!(0.02),
        }
    }

    #[test]
    fn test_direct_figures() {
        let r = calculate(&sample_input());
        assert_eq!(r.commission_amt, dec!(300_000));
        assert_eq!(r.fba_fees_amt, dec!(200_000));
        assert_eq!(r.net_revenue, dec!(1_500_000));
        assert_eq!(r.ad_expenses, dec!(160_000));
        assert_eq!(r.mgmt_fee, dec!(100_000));
        assert_eq!(r.returns_amt, dec!(40_000));
        assert_eq!(r.other_fees_amt, dec!(20_000));
        assert_eq!(r.total_fees_rate, dec!(0.41));
        assert_eq!(r.brand_profit_direct, dec!(1_180_000));
    }

    #[test]
    fn test_distributor_figures_and_difference() {
        let r = calculate(&sample_input());
        assert_eq!(r.wholesale_amt, dec!(800_000));
        assert_eq!(r.ad_expenses_dist, dec!(100_000));
        assert_eq!(r.other_fees_amt_dist, dec!(40_000));
        assert_eq!(r.brand_profit_dist, dec!(660_000));
        assert_eq!(r.difference, dec!(520_000));
    }

    #[test]
    fn test_rates_above_one_give_negative_profit() {
        let input = CalculationInput {
            sales_amount: dec!(1000),
            commission_rate: dec!(0.7),
            fba_rate: dec!(0.5),
            ..Default::default()
        };
        let r = calculate(&input);
        assert_eq!(r.net_revenue, dec!(-200));
        assert_eq!(r.brand_profit_direct, dec!(-200));
        assert_eq!(r.total_fees_rate, dec!(1.2));
    }

    #[test]
    fn test_margins_zero_sales_guard() {
        let input = CalculationInput {
            wholesale_rate: dec!(0.4),
            ..Default::default()
        };
        let r = calculate(&input);
        let m = margins(&input, &r);
        assert_eq!(m.distributor_net_profit_rate, Decimal::ZERO);
        assert_eq!(m.direct_net_profit_rate, Decimal::ONE);
    }

    #[test]
    fn test_margins_sample() {
        let input = sample_input();
        let m = margins(&input, &calculate(&input));
        assert_eq!(m.direct_net_profit_rate, dec!(0.59));
        assert_eq!(m.distributor_net_profit_rate, dec!(0.33));
    }

    #[test]
    fn test_break_even_wholesale_rate() {
        let input = sample_input();
        let r = calculate(&input);
        // (1,180,000 + 100,000 + 40,000) / 2,000,000 = 0.66
        let rate = break_even_wholesale_rate(&input, &r);
        assert_eq!(rate, dec!(0.66));

        let balanced = CalculationInput {
            wholesale_rate: rate,
            ..input.clone()
        };
        assert_eq!(calculate(&balanced).difference, Decimal::ZERO);
    }

    #[test]
    fn test_analyze_prefers_direct_for_sample() {
        let out = analyze_channels(&sample_input()).unwrap();
        assert_eq!(out.result.preferred_channel, Channel::Direct);
        assert!(out.warnings.is_empty(), "unexpected warnings: {:?}", out.warnings);
    }

    #[test]
    fn test_analyze_warns_on_out_of_range_rates() {
        let input = CalculationInput {
            commission_rate: dec!(1.5),
            ..sample_input()
        };
        let out = analyze_channels(&input).unwrap();
        assert!(out.warnings.iter().any(|w| w.contains("commission_rate")));
        assert!(out.warnings.iter().any(|w| w.contains("above 100%")));
    }

    #[test]
    fn test_analyze_tie_on_zero_sales() {
        let out = analyze_channels(&CalculationInput::default()).unwrap();
        assert_eq!(out.result.preferred_channel, Channel::Tie);
        assert!(out.warnings.iter().any(|w| w.contains("zero")));
    }

    #[test]
    fn test_huge_inputs_saturate_instead_of_panicking() {
        let input = CalculationInput {
            sales_amount: Decimal::MAX,
            commission_rate: dec!(10),
            ..Default::default()
        };
        let r = calculate(&input);
        assert_eq!(r.commission_amt, Decimal::MAX);
        assert_eq!(r.net_revenue, Decimal::ZERO);
    }

    #[test]
    fn test_camel_case_aliases_and_defaults() {
        let input: CalculationInput =
            serde_json::from_str(r#"{"amazonSales": 1000, "commissionRate": "0.15"}"#).unwrap();
        assert_eq!(input.sales_amount, dec!(1000));
        assert_eq!(input.commission_rate, dec!(0.15));
        assert_eq!(input.wholesale_rate, Decimal::ZERO);
    }
}
