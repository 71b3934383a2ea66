mod common;

use common::{asset, credit, dec, market, tracked_asset, ScriptedSource};
use moneta_backend::models::{Category, Currency};
use moneta_backend::services::portfolio_service::{group_by_category, summarize};

#[tokio::test]
async fn test_grouping_buckets_by_category_with_totals() {
    let (_, market) = market(
        ScriptedSource::new()
            .with_stock("AAPL", "200")
            .with_rate(Currency::Eur, Currency::Usd, "1.1"),
    );

    let holdings = vec![
        asset(Category::Cash, Currency::Usd, "500"),
        asset(Category::Cash, Currency::Eur, "100"),
        tracked_asset(Category::Stock, Currency::Usd, "100", "AAPL", "2"),
    ];

    let groups = group_by_category(&market, &holdings, Currency::Usd, 4).await;

    assert_eq!(groups.len(), 2);

    let cash = &groups[&Category::Cash];
    assert_eq!(cash.count, 2);
    assert_eq!(cash.items.len(), 2);
    assert_eq!(cash.total_amount, dec("610")); // 500 + 100 × 1.1

    let stocks = &groups[&Category::Stock];
    assert_eq!(stocks.count, 1);
    assert_eq!(stocks.total_amount, dec("400")); // 2 × 200
}

#[tokio::test]
async fn test_unpriceable_holding_is_still_aggregated() {
    let (_, market) = market(ScriptedSource::new());

    let holdings = vec![
        tracked_asset(Category::Stock, Currency::Usd, "1000", "GHOST", "3"),
        asset(Category::Cash, Currency::Usd, "50"),
    ];

    let groups = group_by_category(&market, &holdings, Currency::Usd, 4).await;

    // the failed lookup degrades to the stored amount; nothing is dropped
    let stocks = &groups[&Category::Stock];
    assert_eq!(stocks.count, 1);
    assert_eq!(stocks.total_amount, dec("1000"));
    assert_eq!(groups[&Category::Cash].total_amount, dec("50"));
}

#[tokio::test]
async fn test_net_worth_is_assets_minus_credits() {
    let (_, market) = market(ScriptedSource::new());

    // post-conversion totals: assets 41022.90, credits 18174.30
    let assets = vec![
        asset(Category::Cash, Currency::Usd, "15022.90"),
        asset(Category::Stock, Currency::Usd, "20000"),
        asset(Category::Bond, Currency::Usd, "6000"),
    ];
    let credits = vec![credit(Category::Loan, Currency::Usd, "18174.30")];

    let summary = summarize(&market, &assets, &credits, Currency::Usd, 4).await;

    assert_eq!(summary.total_assets, dec("41022.90"));
    assert_eq!(summary.total_credits, dec("18174.30"));
    assert_eq!(summary.net_worth, dec("22848.60"));
    assert_eq!(summary.base_currency, Currency::Usd);

    assert_eq!(summary.asset_summary.len(), 3);
    assert_eq!(summary.asset_summary[&Category::Cash].count, 1);
    assert_eq!(
        summary.asset_summary[&Category::Cash].total_amount,
        dec("15022.90")
    );
    assert_eq!(summary.credit_summary[&Category::Loan].count, 1);
}

#[tokio::test]
async fn test_summary_converts_mixed_currencies() {
    let (_, market) = market(
        ScriptedSource::new()
            .with_stock("AAPL", "200")
            .with_rate(Currency::Usd, Currency::Cny, "7.0")
            .with_rate(Currency::Eur, Currency::Cny, "8.0"),
    );

    let assets = vec![
        tracked_asset(Category::Stock, Currency::Usd, "1000", "AAPL", "3"),
        asset(Category::Cash, Currency::Eur, "100"),
    ];
    let credits = vec![credit(Category::Loan, Currency::Cny, "1000")];

    let summary = summarize(&market, &assets, &credits, Currency::Cny, 4).await;

    // 3 × 200 × 7.0 + 100 × 8.0 = 5000
    assert_eq!(summary.total_assets, dec("5000"));
    assert_eq!(summary.total_credits, dec("1000"));
    assert_eq!(summary.net_worth, dec("4000"));
}

#[tokio::test]
async fn test_summary_is_order_independent() {
    let build = |flip: bool| {
        let mut assets = vec![
            asset(Category::Cash, Currency::Usd, "0.1"),
            asset(Category::Cash, Currency::Usd, "0.2"),
            asset(Category::Bond, Currency::Usd, "99.7"),
        ];
        if flip {
            assets.reverse();
        }
        assets
    };

    let (_, market_a) = market(ScriptedSource::new());
    let (_, market_b) = market(ScriptedSource::new());

    let a = summarize(&market_a, &build(false), &[], Currency::Usd, 4).await;
    let b = summarize(&market_b, &build(true), &[], Currency::Usd, 2).await;

    assert_eq!(a.total_assets, b.total_assets);
    assert_eq!(a.net_worth, b.net_worth);
    assert_eq!(
        a.asset_summary[&Category::Cash].total_amount,
        b.asset_summary[&Category::Cash].total_amount
    );
}

#[tokio::test]
async fn test_summary_with_unavailable_fx_stays_complete() {
    let (_, market) = market(ScriptedSource::new()); // no rates at all

    let assets = vec![asset(Category::Cash, Currency::Eur, "100")];
    let credits = vec![credit(Category::CreditCard, Currency::Jpy, "40")];

    let summary = summarize(&market, &assets, &credits, Currency::Usd, 4).await;

    // fail-open: amounts pass through at rate 1.0 rather than dropping out
    assert_eq!(summary.total_assets, dec("100"));
    assert_eq!(summary.total_credits, dec("40"));
    assert_eq!(summary.net_worth, dec("60"));
}

#[tokio::test]
async fn test_repeated_summary_within_ttl_is_bit_exact() {
    let (source, market) = market(
        ScriptedSource::new()
            .with_stock("AAPL", "200.14")
            .with_rate(Currency::Usd, Currency::Cny, "7.1234"),
    );

    let assets = vec![tracked_asset(
        Category::Stock,
        Currency::Usd,
        "1000",
        "AAPL",
        "3",
    )];

    let first = summarize(&market, &assets, &[], Currency::Cny, 4).await;
    let calls_after_first = source.call_count();
    let second = summarize(&market, &assets, &[], Currency::Cny, 4).await;

    assert_eq!(first.total_assets, second.total_assets);
    assert_eq!(first.net_worth, second.net_worth);
    assert_eq!(source.call_count(), calls_after_first);
}
