use bigdecimal::{BigDecimal, Zero};
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use replenish_planner::models::{InvoiceRecord, NothingToPlan, StockSnapshot, StockSource};
use replenish_planner::{PlanOutcome, PlanReport, PlannerConfig, PlannerService};
use std::collections::HashSet;
use std::str::FromStr;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn dec(s: &str) -> BigDecimal {
    BigDecimal::from_str(s).unwrap()
}

/// Six weekly shops from Tuesday 2025-01-07 to Tuesday 2025-02-11
fn weekly_history() -> Vec<InvoiceRecord> {
    (0..6)
        .map(|week| {
            let date = d(2025, 1, 7) + Duration::weeks(week);
            let coffee_price = if week % 2 == 1 { "9.00" } else { "12.00" };
            let mut invoice = InvoiceRecord::new(date)
                .with_item("Milk Full Cream 2L", dec("2"), dec("3.10"))
                .with_item("Bread Wholemeal", dec("1"), dec("4.00"))
                .with_item("Coffee Beans 1kg", dec("1"), dec(coffee_price));
            if week % 2 == 0 {
                invoice.add_item("Eggs Free Range 12pk", dec("1"), dec("6.50"));
            }
            invoice
        })
        .collect()
}

fn plan(invoices: &[InvoiceRecord], stock: Option<&StockSnapshot>, as_of: NaiveDate) -> PlanReport {
    PlannerService::new(PlannerConfig::default())
        .plan(invoices, stock, as_of)
        .into_report()
        .expect("expected a plan")
}

#[test]
fn weekly_history_produces_consistent_plan() {
    let config = PlannerConfig::default();
    let report = plan(&weekly_history(), None, d(2025, 2, 12));

    assert_eq!(report.last_invoice_date, d(2025, 2, 11));
    assert_eq!(report.prediction_start, d(2025, 2, 12));
    assert_eq!(report.horizon_end, d(2025, 3, 13));
    assert_eq!(report.product_stats.len(), 4);

    let mut previous: Option<NaiveDate> = None;
    for order in &report.orders {
        assert!(order.date >= report.prediction_start && order.date <= report.horizon_end);
        assert!(matches!(order.date.weekday(), Weekday::Tue | Weekday::Sat));
        if let Some(prev) = previous {
            assert!(order.date > prev);
        }
        previous = Some(order.date);

        if order.skipped {
            assert!(order.items.is_empty());
            continue;
        }
        let mut products = HashSet::new();
        for item in &order.items {
            assert!(item.qty >= 1);
            assert_eq!(item.total_price, &item.unit_price * BigDecimal::from(item.qty));
            assert!(products.insert(item.product.as_str()), "duplicate line in order");
        }
        assert_eq!(order.items_total, order.sum_items());
        if order.is_empty() {
            assert_eq!(order.total_with_delivery, BigDecimal::zero());
        } else {
            assert_eq!(order.total_with_delivery, &order.items_total + &config.delivery_fee);
        }
        assert_eq!(order.meets_minimum, order.items_total >= config.minimum_order_value);
    }

    let placed: Vec<_> = report.orders.iter().filter(|o| o.is_placed()).collect();
    assert!(!placed.is_empty());
    assert_eq!(report.summary.orders_placed, placed.len());
    let total = placed
        .iter()
        .fold(BigDecimal::zero(), |acc, o| acc + &o.total_with_delivery);
    assert_eq!(report.summary.total_spend, total);
    let monthly = report
        .summary
        .monthly_spend
        .values()
        .fold(BigDecimal::zero(), |acc, v| acc + v);
    assert_eq!(monthly, total);
}

#[test]
fn retained_products_have_positive_rates() {
    let report = plan(&weekly_history(), None, d(2025, 2, 12));

    for (product, stats) in &report.product_stats {
        assert!(stats.daily_rate > 0.0, "{product}");
        assert!(stats.estimated_stock >= 0.0, "{product}");
        assert_eq!(stats.days_until_empty, stats.estimated_stock / stats.daily_rate);
        assert!(stats.max_per_order >= 1);
    }

    let milk = &report.product_stats["Milk Full Cream 2L"];
    assert!((milk.daily_rate - 2.0 / 7.0).abs() < 1e-9);
    assert!(milk.frequent);
    assert_eq!(milk.stock_source, StockSource::Estimated);

    let coffee = &report.product_stats["Coffee Beans 1kg"];
    assert!(coffee.has_promo());
    assert_eq!(coffee.min_price(), &dec("9.00"));
    assert_eq!(coffee.unit_price, dec("9.00"));
    assert_eq!(coffee.max_per_order, 2);
    assert_eq!(report.summary.promo_products, 1);
}

#[test]
fn two_purchases_ten_days_apart() {
    let invoices = vec![
        InvoiceRecord::new(d(2025, 3, 1)).with_item("Yoghurt", dec("10"), dec("2")),
        InvoiceRecord::new(d(2025, 3, 11)).with_item("Yoghurt", dec("10"), dec("2")),
    ];
    let report = plan(&invoices, None, d(2025, 3, 16));

    let yoghurt = &report.product_stats["Yoghurt"];
    assert!((yoghurt.daily_rate - 1.0).abs() < 1e-9);
    assert!((yoghurt.estimated_stock - 5.0).abs() < 1e-9);
    assert!((yoghurt.days_until_empty - 5.0).abs() < 1e-9);
}

#[test]
fn stock_snapshot_overrides_estimate() {
    let snapshot = StockSnapshot::new(d(2025, 2, 11))
        .with_item("milk full cream", 6.0)
        .with_item("tea bags", 3.0);
    let report = plan(&weekly_history(), Some(&snapshot), d(2025, 2, 12));

    let milk = &report.product_stats["Milk Full Cream 2L"];
    assert_eq!(milk.stock_source, StockSource::Snapshot);
    assert!((milk.estimated_stock - (6.0 - 2.0 / 7.0)).abs() < 1e-9);
    assert_eq!(report.product_stats["Bread Wholemeal"].stock_source, StockSource::Estimated);
}

#[test]
fn nothing_to_plan_outcomes() {
    let service = PlannerService::new(PlannerConfig::default());
    assert_eq!(
        service.plan(&[], None, d(2025, 1, 1)),
        PlanOutcome::NothingToPlan(NothingToPlan::NoInvoices)
    );

    let zero_qty = vec![InvoiceRecord::new(d(2025, 1, 1)).with_item("Milk", dec("0"), dec("3"))];
    assert_eq!(
        service.plan(&zero_qty, None, d(2025, 1, 2)),
        PlanOutcome::NothingToPlan(NothingToPlan::NoProducts)
    );

    let unpriced = vec![InvoiceRecord::new(d(2025, 1, 1)).with_item("Free sample", dec("1"), dec("0"))];
    assert_eq!(
        service.plan(&unpriced, None, d(2025, 1, 2)),
        PlanOutcome::NothingToPlan(NothingToPlan::NoMeasurableDemand)
    );

    assert_eq!(
        service.plan(&weekly_history(), None, d(2025, 6, 1)),
        PlanOutcome::NothingToPlan(NothingToPlan::HorizonElapsed)
    );
}

#[test]
fn short_horizon_without_cadence_day() {
    let config = PlannerConfig {
        planning_horizon_days: 2,
        ..PlannerConfig::default()
    };
    let service = PlannerService::new(config);
    // Last invoice on a Tuesday; Wednesday and Thursday hold no cadence day
    assert_eq!(
        service.plan(&weekly_history(), None, d(2025, 2, 12)),
        PlanOutcome::NothingToPlan(NothingToPlan::NoOrderDates)
    );
}

#[test]
fn planning_is_deterministic() {
    let history = weekly_history();
    let first = plan(&history, None, d(2025, 2, 12));
    let second = plan(&history, None, d(2025, 2, 12));
    assert_eq!(first, second);
}
