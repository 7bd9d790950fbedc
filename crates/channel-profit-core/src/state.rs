use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, trace};

use crate::calculator::{CalculationInput, CalculationResult};
use crate::compute::{Compute, LatestWins, SyncCompute};
use crate::display::{render, DisplayReport};
use crate::error::ChannelProfitError;
use crate::formatter::{
    parse_currency_amount, parse_percent_to_decimal, strip_non_digits, CurrencyMask,
};

// ---------------------------------------------------------------------------
// Fields
// ---------------------------------------------------------------------------

/// Every editable input of both panels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Field {
    DirectAmazonSales,
    DistAmazonSales,
    DirectCommissionPct,
    DirectFbaPct,
    DirectAdPct,
    DirectMgmtPct,
    DirectReturnsPct,
    DirectOtherPct,
    DistWholesalePct,
    DistAdPct,
    DistOtherPct,
}

impl Field {
    pub const ALL: [Field; 11] = [
        Field::DirectAmazonSales,
        Field::DistAmazonSales,
        Field::DirectCommissionPct,
        Field::DirectFbaPct,
        Field::DirectAdPct,
        Field::DirectMgmtPct,
        Field::DirectReturnsPct,
        Field::DirectOtherPct,
        Field::DistWholesalePct,
        Field::DistAdPct,
        Field::DistOtherPct,
    ];

    /// Element id of the input on the page.
    pub fn id(&self) -> &'static str {
        match self {
            Field::DirectAmazonSales => "direct-amazon-sales",
            Field::DistAmazonSales => "dist-amazon-sales",
            Field::DirectCommissionPct => "direct-commission-pct",
            Field::DirectFbaPct => "direct-fba-pct",
            Field::DirectAdPct => "direct-ad-pct",
            Field::DirectMgmtPct => "direct-mgmt-pct",
            Field::DirectReturnsPct => "direct-returns-pct",
            Field::DirectOtherPct => "direct-other-pct",
            Field::DistWholesalePct => "dist-wholesale-pct",
            Field::DistAdPct => "dist-ad-pct",
            Field::DistOtherPct => "dist-other-pct",
        }
    }

    pub fn from_id(id: &str) -> Result<Field, ChannelProfitError> {
        Field::ALL
            .into_iter()
            .find(|f| f.id() == id)
            .ok_or_else(|| ChannelProfitError::UnknownField(id.to_string()))
    }

    /// Sales fields carry the currency mask and mirror each other.
    pub fn is_sales(&self) -> bool {
        matches!(self, Field::DirectAmazonSales | Field::DistAmazonSales)
    }

    /// The other panel's sales field, for sales fields only.
    pub fn mirror(&self) -> Option<Field> {
        match self {
            Field::DirectAmazonSales => Some(Field::DistAmazonSales),
            Field::DistAmazonSales => Some(Field::DirectAmazonSales),
            _ => None,
        }
    }

    /// Value the page is pre-filled with.
    pub fn default_text(&self) -> &'static str {
        match self {
            Field::DirectAmazonSales | Field::DistAmazonSales => "2000000",
            Field::DirectCommissionPct => "15",
            Field::DirectFbaPct => "10",
            Field::DirectAdPct => "8",
            Field::DirectMgmtPct => "5",
            Field::DirectReturnsPct => "2",
            Field::DirectOtherPct => "1",
            Field::DistWholesalePct => "40",
            Field::DistAdPct => "5",
            Field::DistOtherPct => "2",
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Field {
    type Err = ChannelProfitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::from_id(s.trim())
    }
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Outcome of one full recompute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recomputed {
    pub sequence: u64,
    pub input: CalculationInput,
    pub result: CalculationResult,
    pub display: DisplayReport,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&Recomputed)>;

/// Current text of every input field plus the listeners to notify on
/// recompute.
///
/// Field edits follow the page's event order: `focus`, any number of
/// `input`s, then `blur`. A blur (or [`commit`](Self::commit)) recomputes
/// everything from the current field texts.
pub struct CalculatorState<C: Compute = SyncCompute> {
    values: [String; 11],
    mask: CurrencyMask,
    engine: C,
    sequencer: LatestWins,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
    last: Option<Recomputed>,
}

impl Default for CalculatorState<SyncCompute> {
    fn default() -> Self {
        Self::with_compute(SyncCompute)
    }
}

impl CalculatorState<SyncCompute> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C: Compute> CalculatorState<C> {
    /// Pre-filled state whose figures come from `engine`.
    pub fn with_compute(engine: C) -> Self {
        let mask = CurrencyMask::default();
        let values = Field::ALL.map(|f| {
            if f.is_sales() {
                mask.initial(f.default_text())
            } else {
                f.default_text().to_string()
            }
        });
        Self {
            values,
            mask,
            engine,
            sequencer: LatestWins::new(),
            listeners: Vec::new(),
            next_subscription: 0,
            last: None,
        }
    }

    pub fn value(&self, field: Field) -> &str {
        &self.values[field.index()]
    }

    /// Most recent recompute, if any happened yet.
    pub fn last(&self) -> Option<&Recomputed> {
        self.last.as_ref()
    }

    /// Call `listener` after every recompute, in subscription order.
    pub fn subscribe(&mut self, listener: impl FnMut(&Recomputed) + 'static) -> SubscriptionId {
        self.next_subscription += 1;
        let id = SubscriptionId(self.next_subscription);
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns false when `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    pub fn focus(&mut self, field: Field) {
        if field.is_sales() {
            let raw = self.mask.on_focus(self.value(field));
            self.values[field.index()] = raw;
        }
        trace!(field = field.id(), value = self.value(field), "focus");
    }

    pub fn input(&mut self, field: Field, text: &str) {
        self.values[field.index()] = if field.is_sales() {
            self.mask.on_input(text)
        } else {
            text.to_string()
        };
        trace!(field = field.id(), value = self.value(field), "input");
    }

    /// Leave `field`, mirroring sales into the other panel, and recompute.
    pub fn blur(&mut self, field: Field) -> Recomputed {
        if let Some(other) = field.mirror() {
            let shown = self.mask.on_blur(self.value(field));
            self.values[other.index()] = shown.clone();
            self.values[field.index()] = shown;
        }
        trace!(field = field.id(), value = self.value(field), "blur");
        self.recompute()
    }

    /// Replace the text of `field` as a complete edit and recompute.
    ///
    /// A sales commit without digits empties both sales fields.
    pub fn commit(&mut self, field: Field, text: &str) -> Recomputed {
        self.focus(field);
        if field.is_sales() && strip_non_digits(text).is_empty() {
            self.values[field.index()].clear();
        } else {
            self.input(field, text);
        }
        self.blur(field)
    }

    /// Read every field through the formatter. Unreadable text counts as 0.
    pub fn snapshot(&self) -> CalculationInput {
        let pct = |f: Field| parse_percent_to_decimal(self.value(f));
        CalculationInput {
            sales_amount: parse_currency_amount(self.value(Field::DirectAmazonSales)),
            commission_rate: pct(Field::DirectCommissionPct),
            fba_rate: pct(Field::DirectFbaPct),
            ad_rate: pct(Field::DirectAdPct),
            mgmt_rate: pct(Field::DirectMgmtPct),
            returns_rate: pct(Field::DirectReturnsPct),
            other_rate_direct: pct(Field::DirectOtherPct),
            wholesale_rate: pct(Field::DistWholesalePct),
            ad_rate_dist: pct(Field::DistAdPct),
            other_rate_dist: pct(Field::DistOtherPct),
        }
    }

    /// Rebuild every figure from the current field texts and notify listeners.
    pub fn recompute(&mut self) -> Recomputed {
        let ticket = self.sequencer.begin();
        let input = self.snapshot();
        let result = self.engine.compute(&input);

        debug!(
            sequence = ticket.sequence(),
            sales = %input.sales_amount,
            difference = %result.difference,
            "recompute"
        );

        let display = render(&input, &result);
        let recomputed = Recomputed {
            sequence: ticket.sequence(),
            input,
            result,
            display,
        };

        if let Some(current) = self.sequencer.complete(ticket, recomputed.clone()) {
            for (_, listener) in self.listeners.iter_mut() {
                listener(&current);
            }
            self.last = Some(current);
        }
        recomputed
    }
}

impl<C: Compute> fmt::Debug for CalculatorState<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CalculatorState")
            .field("values", &self.values)
            .field("listeners", &self.listeners.len())
            .field("last", &self.last.as_ref().map(|r| r.sequence))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_defaults_are_masked() {
        let state = CalculatorState::new();
        assert_eq!(state.value(Field::DirectAmazonSales), "$2,000,000");
        assert_eq!(state.value(Field::DistAmazonSales), "$2,000,000");
        assert_eq!(state.value(Field::DistWholesalePct), "40");
        assert!(state.last().is_none());
    }

    #[test]
    fn test_default_snapshot() {
        let input = CalculatorState::new().snapshot();
        assert_eq!(input.sales_amount, dec!(2_000_000));
        assert_eq!(input.commission_rate, dec!(0.15));
        assert_eq!(input.other_rate_dist, dec!(0.02));
    }

    #[test]
    fn test_field_ids_round_trip() {
        for field in Field::ALL {
            assert_eq!(Field::from_id(field.id()).unwrap(), field);
            assert_eq!(field.to_string().parse::<Field>().unwrap(), field);
        }
        assert!(matches!(
            Field::from_id("direct-bogus"),
            Err(ChannelProfitError::UnknownField(_))
        ));
    }

    #[test]
    fn test_focus_input_blur_cycle() {
        let mut state = CalculatorState::new();
        state.focus(Field::DirectAmazonSales);
        assert_eq!(state.value(Field::DirectAmazonSales), "2000000");
        state.input(Field::DirectAmazonSales, "15000001");
        assert_eq!(state.value(Field::DirectAmazonSales), "15,000,001");
        let out = state.blur(Field::DirectAmazonSales);
        assert_eq!(state.value(Field::DirectAmazonSales), "$15,000,001");
        assert_eq!(out.input.sales_amount, dec!(15_000_001));
    }

    #[test]
    fn test_sales_mirror_both_directions() {
        let mut state = CalculatorState::new();
        state.commit(Field::DistAmazonSales, "750000");
        assert_eq!(state.value(Field::DirectAmazonSales), "$750,000");
        assert_eq!(state.value(Field::DistAmazonSales), "$750,000");

        state.commit(Field::DirectAmazonSales, "$1,000");
        assert_eq!(state.value(Field::DistAmazonSales), "$1,000");
    }

    #[test]
    fn test_cleared_sales_reads_as_zero() {
        let mut state = CalculatorState::new();
        let out = state.commit(Field::DirectAmazonSales, "");
        assert_eq!(state.value(Field::DirectAmazonSales), "");
        assert_eq!(state.value(Field::DistAmazonSales), "");
        assert_eq!(out.input.sales_amount, dec!(0));
        assert_eq!(out.display.dist_net_profit_pct, "0.0%");
    }

    #[test]
    fn test_clearing_either_sales_field_empties_both() {
        let mut state = CalculatorState::new();
        let out = state.commit(Field::DistAmazonSales, "$");
        assert_eq!(state.value(Field::DirectAmazonSales), "");
        assert_eq!(state.value(Field::DistAmazonSales), "");
        assert_eq!(out.input.sales_amount, dec!(0));

        state.commit(Field::DirectAmazonSales, "1200");
        assert_eq!(state.value(Field::DistAmazonSales), "$1,200");
        state.commit(Field::DirectAmazonSales, "  ");
        assert_eq!(state.value(Field::DirectAmazonSales), "");
        assert_eq!(state.value(Field::DistAmazonSales), "");
    }

    #[test]
    fn test_keystroke_clear_still_shows_zero() {
        let mut state = CalculatorState::new();
        state.focus(Field::DirectAmazonSales);
        state.input(Field::DirectAmazonSales, "");
        assert_eq!(state.value(Field::DirectAmazonSales), "0");
        state.blur(Field::DirectAmazonSales);
        assert_eq!(state.value(Field::DistAmazonSales), "$0");
    }

    #[test]
    fn test_percent_fields_stored_verbatim() {
        let mut state = CalculatorState::new();
        let out = state.commit(Field::DirectCommissionPct, "abc");
        assert_eq!(state.value(Field::DirectCommissionPct), "abc");
        assert_eq!(out.input.commission_rate, dec!(0));
    }

    #[test]
    fn test_listeners_notified_in_order() {
        let mut state = CalculatorState::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let a = Rc::clone(&seen);
        state.subscribe(move |r| a.borrow_mut().push(("a", r.sequence)));
        let b = Rc::clone(&seen);
        let id_b = state.subscribe(move |r| b.borrow_mut().push(("b", r.sequence)));

        state.recompute();
        assert!(state.unsubscribe(id_b));
        assert!(!state.unsubscribe(id_b));
        state.recompute();

        assert_eq!(*seen.borrow(), vec![("a", 1), ("b", 1), ("a", 2)]);
        assert_eq!(state.last().map(|r| r.sequence), Some(2));
    }

    #[test]
    fn test_custom_compute_engine() {
        struct Zeroes;
        impl Compute for Zeroes {
            fn compute(&self, _input: &CalculationInput) -> CalculationResult {
                CalculationResult::default()
            }
        }

        let mut state = CalculatorState::with_compute(Zeroes);
        let out = state.recompute();
        assert_eq!(out.display.direct_brand_profit, "$0");
    }
}
