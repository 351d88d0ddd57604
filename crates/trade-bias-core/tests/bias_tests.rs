use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use trade_bias_core::engine::{analyze_trading_biases, BiasAnalysisInput, BiasEngine};
use trade_bias_core::report::Priority;
use trade_bias_core::trade_log::parse_timestamp;
use trade_bias_core::{Bias, Severity, Trade, TradeBiasError, TradeLog, TradeSide};

// ===========================================================================
// Fixtures
// ===========================================================================

fn input(rows: Value) -> BiasAnalysisInput {
    serde_json::from_value(json!({ "trades": rows })).unwrap()
}

/// 25 winning trades one minute apart on a single day.
fn burst_day() -> BiasAnalysisInput {
    let rows: Vec<Value> = (0..25)
        .map(|i| {
            json!({
                "timestamp": format!("2025-03-10 10:{:02}:00", i),
                "side": if i % 2 == 0 { "Buy" } else { "Sell" },
                "asset": "ES",
                "pnl": 12.5
            })
        })
        .collect();
    input(Value::Array(rows))
}

/// Small wins, large losses, and quick re-entries after each loss.
fn tilted_session() -> BiasAnalysisInput {
    input(json!([
        {"timestamp": "2025-03-11 09:00:00", "side": "Buy", "asset": "NQ", "pnl": 50},
        {"timestamp": "2025-03-11 11:00:00", "side": "Sell", "asset": "NQ", "pnl": -100},
        {"timestamp": "2025-03-11 11:02:00", "side": "Buy", "asset": "NQ", "pnl": -200},
        {"timestamp": "2025-03-11 11:04:00", "side": "Sell", "asset": "NQ", "pnl": -150},
        {"timestamp": "2025-03-11 11:06:00", "side": "Buy", "asset": "ES", "pnl": 40},
        {"timestamp": "2025-03-11 13:06:00", "side": "Sell", "asset": "ES", "pnl": 60}
    ]))
}

fn steady_swing() -> BiasAnalysisInput {
    input(json!([
        {"timestamp": "2025-03-03T14:30:00Z", "side": "long", "asset": "AAPL", "pnl": "410.50"},
        {"timestamp": "2025-03-04T15:00:00Z", "side": "short", "asset": "AAPL", "pnl": "-120"},
        {"timestamp": "2025-03-06T14:45:00Z", "side": "long", "asset": "MSFT", "pnl": "380"},
        {"timestamp": "2025-03-07T16:10:00Z", "side": "long", "asset": "NVDA", "pnl": "-95.25"},
        {"timestamp": "2025-03-10T14:35:00Z", "side": "short", "asset": "TSLA", "pnl": "265"}
    ]))
}

// ===========================================================================
// Overtrading
// ===========================================================================

#[test]
fn test_burst_day_overtrading_high() {
    let out = analyze_trading_biases(&burst_day()).unwrap();
    let ot = &out.result.detections.overtrading;

    // 40 (avg 25/day capped) + 18.75 (peak 25) + 30 (96% rapid, capped)
    assert_eq!(ot.score, dec!(88.8));
    assert!(ot.score >= dec!(70));
    assert!(ot.detected);
    assert_eq!(ot.severity, Severity::High);

    let m = ot.metrics.as_ref().unwrap();
    assert_eq!(m.avg_trades_per_day, dec!(25));
    assert_eq!(m.max_trades_per_day, 25);
    assert_eq!(m.rapid_trade_percentage, dec!(96));
    assert_eq!(m.avg_minutes_between_trades, dec!(1));
    assert!(ot.description.starts_with("You're averaging 25.0 trades per day with 96.0%"));
}

#[test]
fn test_burst_day_other_detectors_lack_data() {
    let out = analyze_trading_biases(&burst_day()).unwrap();
    let r = &out.result.detections;
    assert_eq!(
        r.loss_aversion.description,
        "Insufficient data to detect loss aversion patterns."
    );
    assert!(r.loss_aversion.metrics.is_none());
    assert_eq!(
        r.revenge_trading.description,
        "No consecutive loss patterns detected."
    );
    assert_eq!(out.result.summary.biases_detected, vec![Bias::Overtrading]);
    assert_eq!(
        out.result.recommendations[0].recommendation,
        "Set a daily trade limit of 12 trades per day"
    );
    assert_eq!(out.result.recommendations[0].priority, Priority::High);
}

// ===========================================================================
// Tilted session: loss aversion and revenge trading
// ===========================================================================

#[test]
fn test_tilted_session_revenge_trading_capped() {
    let out = analyze_trading_biases(&tilted_session()).unwrap();
    let rt = &out.result.detections.revenge_trading;

    // 40 + 30 + 20 + 20 = 110, clamped
    assert_eq!(rt.score, dec!(100));
    assert_eq!(rt.severity, Severity::High);

    let m = rt.metrics.as_ref().unwrap();
    assert_eq!(m.avg_minutes_after_loss, dec!(2));
    assert_eq!(m.avg_minutes_after_non_loss, dec!(120));
    assert_eq!(m.rapid_trade_after_loss_pct, dec!(100));
    assert_eq!(m.win_rate_after_loss, dec!(33.3));
    assert_eq!(m.avg_abs_pl_after_loss, dec!(130));
    assert_eq!(m.avg_abs_pl_after_non_loss, dec!(80));
}

#[test]
fn test_tilted_session_loss_aversion_high() {
    let out = analyze_trading_biases(&tilted_session()).unwrap();
    let la = &out.result.detections.loss_aversion;

    // RR 50 / 150 => +40, largest loss 200 > 2 x 60 => +30
    assert_eq!(la.score, dec!(70));
    assert_eq!(la.severity, Severity::High);
    assert!(la.description.contains("(0.33)"));
    assert!(la.description.contains("50.0% win rate"));
}

#[test]
fn test_tilted_session_overtrading_sits_on_threshold() {
    let out = analyze_trading_biases(&tilted_session()).unwrap();
    let ot = &out.result.detections.overtrading;
    // Half the trades are rapid: 50 / 30 x 15 = 25, which is not above the threshold
    assert_eq!(ot.score, dec!(25));
    assert!(!ot.detected);
    assert_eq!(ot.severity, Severity::Low);
}

#[test]
fn test_tilted_session_report() {
    let out = analyze_trading_biases(&tilted_session()).unwrap();
    let r = &out.result;

    assert_eq!(
        r.summary.biases_detected,
        vec![Bias::LossAversion, Bias::RevengeTrading]
    );
    assert_eq!(r.summary.bias_count, 2);
    assert_eq!(r.summary.total_pnl, dec!(-300));
    assert_eq!(r.summary.win_rate, dec!(50));

    let texts: Vec<&str> = r
        .recommendations
        .iter()
        .map(|rec| rec.recommendation.as_str())
        .collect();
    assert_eq!(
        texts,
        vec![
            "Set stop-loss orders at 2% and take-profit at 3% to improve risk-reward ratio",
            "Use trailing stop-losses to let winners run while protecting gains",
            "Implement a mandatory 2-hour break after any losing trade",
            "Reduce position size by 50% for the next 3 trades after a loss",
        ]
    );

    let s = &r.statistics;
    assert_eq!(s.max_drawdown, dec!(450));
    assert_eq!(s.max_consecutive_losses, 3);
    assert_eq!(s.max_consecutive_wins, 2);
    assert_eq!(s.profit_factor, Some(dec!(0.33)));
    assert_eq!(s.unique_assets, 2);
}

// ===========================================================================
// Invariants
// ===========================================================================

#[test]
fn test_scores_bounded_and_detected_matches_threshold() {
    for case in [burst_day(), tilted_session(), steady_swing()] {
        let d = BiasEngine::new(&case.trades).unwrap().detect_all();
        let scored = [
            (d.overtrading.score, d.overtrading.detected),
            (d.loss_aversion.score, d.loss_aversion.detected),
            (d.revenge_trading.score, d.revenge_trading.detected),
        ];
        for (score, detected) in scored {
            assert!(score >= Decimal::ZERO && score <= dec!(100));
            assert_eq!(detected, score > dec!(25));
        }
    }
}

#[test]
fn test_repeated_analysis_is_identical() {
    let input = tilted_session();
    let first = analyze_trading_biases(&input).unwrap();
    let second = analyze_trading_biases(&input).unwrap();
    assert_eq!(first.result, second.result);
}

#[test]
fn test_input_order_does_not_matter() {
    let forward = tilted_session();
    let mut reversed = forward.clone();
    reversed.trades.reverse();
    assert_eq!(
        analyze_trading_biases(&forward).unwrap().result,
        analyze_trading_biases(&reversed).unwrap().result
    );
}

#[test]
fn test_steady_swing_trader_is_clean() {
    let out = analyze_trading_biases(&steady_swing()).unwrap();
    let r = &out.result;
    assert!(r.summary.biases_detected.is_empty());
    assert!(r.recommendations.iter().all(|rec| rec.bias == "General"));
    assert_eq!(r.statistics.trading_days, 5);
    assert_eq!(r.summary.total_pnl, dec!(840.25));
}

// ===========================================================================
// Boundaries
// ===========================================================================

#[test]
fn test_single_trade() {
    let out = analyze_trading_biases(&input(json!([
        {"timestamp": "2025-03-10 10:00:00", "side": "Buy", "asset": "ES", "pnl": -40}
    ])))
    .unwrap();
    let d = &out.result.detections;
    assert_eq!(d.overtrading.score, Decimal::ZERO);
    assert_eq!(
        d.revenge_trading.description,
        "Insufficient data to detect revenge trading patterns."
    );
    assert!(!d.loss_aversion.detected);
    assert_eq!(out.result.statistics.max_drawdown, dec!(40));
}

#[test]
fn test_spreadsheet_headings_accepted() {
    let out = analyze_trading_biases(&input(json!([
        {"Timestamp": "2025-03-10 10:00:00", "Buy/sell": "Buy", "Asset": "ES", "P/L": "15"},
        {"Timestamp": "2025-03-10 12:00:00", "Buy/sell": "Sell", "Asset": "ES", "P/L": "-5"}
    ])))
    .unwrap();
    assert_eq!(out.result.summary.total_trades, 2);
    assert_eq!(out.result.summary.total_pnl, dec!(10));
}

#[test]
fn test_oversized_pnl_row_dropped() {
    let out = analyze_trading_biases(&input(json!([
        {"timestamp": "2025-03-10 10:00:00", "side": "Buy", "asset": "ES", "pnl": "50000000000000000000000000000"},
        {"timestamp": "2025-03-10 10:05:00", "side": "Sell", "asset": "ES", "pnl": "-1"}
    ])))
    .unwrap();
    assert_eq!(out.result.summary.total_trades, 1);
    assert_eq!(out.result.summary.total_pnl, dec!(-1));
    assert_eq!(
        out.warnings,
        vec!["Dropped 1 of 2 rows with an unparseable timestamp or pnl (rows 0)".to_string()]
    );
}

#[test]
fn test_extreme_accepted_pnl_completes() {
    // Largest accepted wins against the smallest representable loss
    let out = analyze_trading_biases(&input(json!([
        {"timestamp": "2025-03-10 10:00:00", "side": "Buy", "asset": "ES", "pnl": "1000000000000000"},
        {"timestamp": "2025-03-10 10:01:00", "side": "Buy", "asset": "ES", "pnl": "1000000000000000"},
        {"timestamp": "2025-03-10 10:02:00", "side": "Sell", "asset": "ES", "pnl": "-0.00000001"}
    ])))
    .unwrap();
    let r = &out.result;
    assert_eq!(r.summary.total_pnl, dec!(2000000000000000));
    let m = r.detections.loss_aversion.metrics.as_ref().unwrap();
    assert_eq!(m.risk_reward_ratio, dec!(100000000000000000000000));
    assert_eq!(r.statistics.profit_factor, Some(dec!(200000000000000000000000)));
}

#[test]
fn test_many_bound_sized_trades_complete() {
    let rows: Vec<Value> = (0..500)
        .map(|i| {
            // 100 trades a day, one minute apart from 08:00
            let k = i % 100;
            json!({
                "timestamp": format!("2025-03-{:02} {:02}:{:02}:00", 10 + i / 100, 8 + k / 60, k % 60),
                "side": "Buy",
                "asset": "ES",
                "pnl": if i % 5 == 0 { "-1000000000000000" } else { "1000000000000000" }
            })
        })
        .collect();
    let out = analyze_trading_biases(&input(Value::Array(rows))).unwrap();
    assert!(out.warnings.is_empty());
    assert_eq!(out.result.summary.total_trades, 500);
    // 400 wins, 100 losses
    assert_eq!(out.result.summary.total_pnl, dec!(300000000000000000));
}

#[test]
fn test_engine_from_validated_trades_matches_raw_path() {
    let trades: Vec<Trade> = [
        ("2025-03-11 09:00:00", TradeSide::Buy, "NQ", dec!(50)),
        ("2025-03-11 11:00:00", TradeSide::Sell, "NQ", dec!(-100)),
        ("2025-03-11 11:02:00", TradeSide::Buy, "NQ", dec!(-200)),
        ("2025-03-11 11:04:00", TradeSide::Sell, "NQ", dec!(-150)),
        ("2025-03-11 11:06:00", TradeSide::Buy, "ES", dec!(40)),
        ("2025-03-11 13:06:00", TradeSide::Sell, "ES", dec!(60)),
    ]
    .into_iter()
    .map(|(ts, side, asset, pnl)| Trade {
        timestamp: parse_timestamp(ts).unwrap(),
        side,
        asset: Some(asset.to_string()),
        pnl,
    })
    .collect();

    let engine = BiasEngine::from_log(TradeLog::from_trades(trades).unwrap());
    assert_eq!(engine.log().len(), 6);
    assert!(engine.log().dropped_rows().is_empty());
    assert_eq!(
        engine.analyze(),
        analyze_trading_biases(&tilted_session()).unwrap().result
    );
}

// ===========================================================================
// Errors
// ===========================================================================

#[test]
fn test_empty_input_rejected() {
    let err = analyze_trading_biases(&BiasAnalysisInput::default()).unwrap_err();
    match err {
        TradeBiasError::InvalidInput { reason, .. } => {
            assert_eq!(reason, "No trading data provided")
        }
        other => panic!("Expected InvalidInput, got {other}"),
    }
}

#[test]
fn test_missing_fields_listed() {
    let err = analyze_trading_biases(&input(json!([
        {"timestamp": "2025-03-10 10:00:00", "side": "Buy"}
    ])))
    .unwrap_err();
    match err {
        TradeBiasError::InvalidInput { field, reason } => {
            assert_eq!(field, "asset, pnl");
            assert_eq!(reason, "Missing required fields: asset, pnl");
        }
        other => panic!("Expected InvalidInput, got {other}"),
    }
}

#[test]
fn test_all_rows_unparseable_rejected() {
    let err = analyze_trading_biases(&input(json!([
        {"timestamp": "not a time", "side": "Buy", "asset": "ES", "pnl": 5},
        {"timestamp": "2025-03-10 10:00:00", "side": "Buy", "asset": "ES", "pnl": "five"}
    ])))
    .unwrap_err();
    assert!(err
        .to_string()
        .contains("No valid trading data found after processing"));
}

// ===========================================================================
// Serialized shape
// ===========================================================================

#[test]
fn test_json_shape() {
    let out = analyze_trading_biases(&tilted_session()).unwrap();
    let v = serde_json::to_value(&out.result).unwrap();

    assert_eq!(
        v["summary"]["biases_detected"],
        json!(["Loss Aversion", "Revenge Trading"])
    );
    assert_eq!(v["loss_aversion"]["severity"], json!("High"));
    assert_eq!(v["loss_aversion"]["score"], json!("70"));
    assert_eq!(v["recommendations"][0]["priority"], json!("High"));
    assert_eq!(v["recommendations"][1]["priority"], json!("Medium"));
}

#[test]
fn test_insufficient_data_metrics_serialize_null() {
    let out = analyze_trading_biases(&burst_day()).unwrap();
    let v = serde_json::to_value(&out.result).unwrap();
    assert_eq!(v["loss_aversion"]["metrics"], Value::Null);
    assert_eq!(v["loss_aversion"]["detected"], json!(false));
}
