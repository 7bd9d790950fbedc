use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculator::{margins, CalculationInput, CalculationResult};
use crate::formatter::{format_currency_display, format_percent_display};
use crate::types::DisplayText;

/// Formatted text of every output region of both panels.
///
/// Field names follow the element ids the page renders into; see
/// [`DisplayReport::entries`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DisplayReport {
    pub direct_commission_amount: DisplayText,
    pub direct_fba_fees_amt: DisplayText,
    pub direct_net_revenue: DisplayText,
    pub direct_ad_expenses: DisplayText,
    pub direct_mgmt_fee: DisplayText,
    pub direct_returns_amt: DisplayText,
    pub direct_other_fees_amt: DisplayText,
    pub direct_brand_profit: DisplayText,
    pub direct_net_profit_pct: DisplayText,

    pub dist_wholesale_amt: DisplayText,
    pub dist_ad_expenses: DisplayText,
    pub dist_other_fees_amt: DisplayText,
    pub dist_brand_profit: DisplayText,
    pub dist_net_profit_pct: DisplayText,
    pub dist_difference: DisplayText,
}

impl DisplayReport {
    /// `(element_id, text)` pairs in page order, Direct panel first.
    pub fn entries(&self) -> [(&'static str, &str); 15] {
        [
            ("direct-commission-amount", self.direct_commission_amount.as_str()),
            ("direct-fba-fees-amt", self.direct_fba_fees_amt.as_str()),
            ("direct-net-revenue", self.direct_net_revenue.as_str()),
            ("direct-ad-expenses", self.direct_ad_expenses.as_str()),
            ("direct-mgmt-fee", self.direct_mgmt_fee.as_str()),
            ("direct-returns-amt", self.direct_returns_amt.as_str()),
            ("direct-other-fees-amt", self.direct_other_fees_amt.as_str()),
            ("direct-brand-profit", self.direct_brand_profit.as_str()),
            ("direct-net-profit-pct", self.direct_net_profit_pct.as_str()),
            ("dist-wholesale-amt", self.dist_wholesale_amt.as_str()),
            ("dist-ad-expenses", self.dist_ad_expenses.as_str()),
            ("dist-other-fees-amt", self.dist_other_fees_amt.as_str()),
            ("dist-brand-profit", self.dist_brand_profit.as_str()),
            ("dist-net-profit-pct", self.dist_net_profit_pct.as_str()),
            ("dist-difference", self.dist_difference.as_str()),
        ]
    }

    /// Text of a single output region by element id.
    pub fn get(&self, element_id: &str) -> Option<&str> {
        self.entries()
            .into_iter()
            .find(|(id, _)| *id == element_id)
            .map(|(_, text)| text)
    }
}

/// Format a calculation result for display.
pub fn render(input: &CalculationInput, result: &CalculationResult) -> DisplayReport {
    let m = margins(input, result);
    let dist_net_profit_pct = if input.sales_amount == Decimal::ZERO {
        "0.0%".to_string()
    } else {
        format_percent_display(m.distributor_net_profit_rate)
    };

    DisplayReport {
        direct_commission_amount: format_currency_display(result.commission_amt),
        direct_fba_fees_amt: format_currency_display(result.fba_fees_amt),
        direct_net_revenue: format_currency_display(result.net_revenue),
        direct_ad_expenses: format_currency_display(result.ad_expenses),
        direct_mgmt_fee: format_currency_display(result.mgmt_fee),
        direct_returns_amt: format_currency_display(result.returns_amt),
        direct_other_fees_amt: format_currency_display(result.other_fees_amt),
        direct_brand_profit: format_currency_display(result.brand_profit_direct),
        direct_net_profit_pct: format_percent_display(m.direct_net_profit_rate),
        dist_wholesale_amt: format_currency_display(result.wholesale_amt),
        dist_ad_expenses: format_currency_display(result.ad_expenses_dist),
        dist_other_fees_amt: format_currency_display(result.other_fees_amt_dist),
        dist_brand_profit: format_currency_display(result.brand_profit_dist),
        dist_net_profit_pct,
        dist_difference: format_currency_display(result.difference),
    }
}
