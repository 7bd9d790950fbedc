use channel_profit_core::state::{CalculatorState, Field, Recomputed};
use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;
use std::cell::RefCell;
use std::rc::Rc;

#[test]
fn test_initial_recompute_matches_reference_page() {
    let mut state = CalculatorState::new();
    let out = state.recompute();

    assert_eq!(out.display.get("direct-commission-amount"), Some("$300,000"));
    assert_eq!(out.display.get("direct-brand-profit"), Some("$1,180,000"));
    assert_eq!(out.display.get("direct-net-profit-pct"), Some("59.0%"));
    assert_eq!(out.display.get("dist-brand-profit"), Some("$660,000"));
    assert_eq!(out.display.get("dist-net-profit-pct"), Some("33.0%"));
    assert_eq!(out.display.get("dist-difference"), Some("$520,000"));
}

#[test]
fn test_editing_either_sales_field_gives_identical_recompute() {
    let mut via_direct = CalculatorState::new();
    let mut via_dist = CalculatorState::new();

    let a = via_direct.commit(Field::DirectAmazonSales, "3,250,000");
    let b = via_dist.commit(Field::DistAmazonSales, "$3250000");

    assert_eq!(a.input, b.input);
    assert_eq!(a.result, b.result);
    assert_eq!(a.display, b.display);
    for state in [&via_direct, &via_dist] {
        assert_eq!(state.value(Field::DirectAmazonSales), "$3,250,000");
        assert_eq!(state.value(Field::DistAmazonSales), "$3,250,000");
    }
}

#[test]
fn test_every_commit_is_a_full_recompute() {
    let mut state = CalculatorState::new();
    let log: Rc<RefCell<Vec<Recomputed>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    state.subscribe(move |r| sink.borrow_mut().push(r.clone()));

    state.commit(Field::DirectCommissionPct, "20");
    state.commit(Field::DistWholesalePct, "50%");
    state.commit(Field::DirectAmazonSales, "1000000");

    let log = log.borrow();
    assert_eq!(log.len(), 3);
    assert_eq!(
        log.iter().map(|r| r.sequence).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );

    let last = &log[2];
    assert_eq!(last.input.sales_amount, dec!(1_000_000));
    assert_eq!(last.input.commission_rate, dec!(0.20));
    assert_eq!(last.input.wholesale_rate, dec!(0.50));
    // 1,000,000 * (1 - 0.20 - 0.10 - 0.08 - 0.05 - 0.02 - 0.01)
    assert_eq!(last.result.brand_profit_direct, dec!(540_000));
    // 1,000,000 * (0.50 - 0.05 - 0.02)
    assert_eq!(last.result.brand_profit_dist, dec!(430_000));
    assert_eq!(last.display.dist_net_profit_pct, "43.0%");
}

#[test]
fn test_focus_and_input_alone_do_not_recompute() {
    let mut state = CalculatorState::new();
    let count = Rc::new(RefCell::new(0));
    let c = Rc::clone(&count);
    state.subscribe(move |_| *c.borrow_mut() += 1);

    state.focus(Field::DirectAmazonSales);
    state.input(Field::DirectAmazonSales, "12");
    assert_eq!(*count.borrow(), 0);
    assert_eq!(state.value(Field::DistAmazonSales), "$2,000,000");

    state.blur(Field::DirectAmazonSales);
    assert_eq!(*count.borrow(), 1);
    assert_eq!(state.value(Field::DistAmazonSales), "$12");
}
