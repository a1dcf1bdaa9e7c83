//! Pipeline driver: normalize → reconcile → aggregate.
//!
//! The one contract callers rely on: a run never fails. Whatever goes wrong
//! with the inputs, the caller gets back a well-formed (possibly all-empty)
//! `PipelineResult` it can render or serialize as-is.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::aggregate::{
    analyze_by_hour, analyze_by_side, analyze_by_symbol, analyze_by_trader, analyze_by_weekday,
    compute_summary, equity_curve, EquityCurvePoint, HourStats, PerformanceSummary, SideStats,
    SymbolStats, TraderStats, WeekdayStats,
};
use crate::loader;
use crate::reconcile::{reconcile, ReconciledOrder};
use crate::records::{RawExecution, RawFeeTicket, RawOrder};

/// Everything one reconciliation run produces. Plain serializable data,
/// ready for a template renderer, a JSON API, or a cache layer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineResult {
    pub summary: PerformanceSummary,
    pub by_symbol: Vec<SymbolStats>,
    pub by_hour: Vec<HourStats>,
    pub by_side: Vec<SideStats>,
    pub by_weekday: Vec<WeekdayStats>,
    #[serde(rename = "traderPerformance")]
    pub by_trader: Vec<TraderStats>,
    pub equity_curve: Vec<EquityCurvePoint>,
    pub reconciled_orders: Vec<ReconciledOrder>,
    /// Raw orders that had no executions and were excluded from every aggregate.
    pub unmatched_order_count: usize,
}

impl PipelineResult {
    /// Canonical all-empty result handed back when inputs are missing or corrupt.
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Reconcile the three record streams and compute every aggregate.
///
/// Pure function of its inputs (no clock reads, no shared state); reconciling
/// the same inputs twice yields an identical result.
pub fn run_pipeline(
    orders: &[RawOrder],
    executions: &[RawExecution],
    tickets: &[RawFeeTicket],
) -> PipelineResult {
    let outcome = reconcile(orders, executions, tickets);
    info!(
        reconciled = outcome.orders.len(),
        unmatched = outcome.unmatched_order_count,
        "reconciliation complete"
    );

    PipelineResult {
        summary: compute_summary(&outcome.orders),
        by_symbol: analyze_by_symbol(&outcome.orders),
        by_hour: analyze_by_hour(&outcome.orders),
        by_side: analyze_by_side(&outcome.orders),
        by_weekday: analyze_by_weekday(&outcome.orders),
        by_trader: analyze_by_trader(&outcome.orders),
        equity_curve: equity_curve(&outcome.orders),
        reconciled_orders: outcome.orders,
        unmatched_order_count: outcome.unmatched_order_count,
    }
}

/// Load the three CSV exports and run the pipeline over them.
///
/// A missing or unreadable file degrades to the canonical empty result;
/// the error never reaches the caller.
pub fn run_pipeline_files(
    orders_path: &Path,
    executions_path: &Path,
    tickets_path: &Path,
) -> PipelineResult {
    let loaded = (|| -> anyhow::Result<_> {
        Ok((
            loader::read_orders_file(orders_path)?,
            loader::read_executions_file(executions_path)?,
            loader::read_tickets_file(tickets_path)?,
        ))
    })();

    match loaded {
        Ok((orders, executions, tickets)) => run_pipeline(&orders, &executions, &tickets),
        Err(err) => {
            warn!("failed to load input CSVs, returning empty result: {:#}", err);
            PipelineResult::empty()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::Side;

    fn order(id: &str, side: Side, qty: i64, price: f64, symbol: &str, time: &str) -> RawOrder {
        RawOrder {
            order_id: id.to_string(),
            trader: "JDOE".to_string(),
            account: "555".to_string(),
            branch: "MAIN".to_string(),
            route: "ARCA".to_string(),
            side,
            symbol: symbol.to_string(),
            quantity: qty,
            price,
            stop_price: 0.0,
            trail_price: 0.0,
            time: time.to_string(),
        }
    }

    fn execution(trade_id: &str, order_id: &str, qty: i64, price: f64) -> RawExecution {
        RawExecution {
            trade_id: trade_id.to_string(),
            order_id: order_id.to_string(),
            side: Side::Buy,
            symbol: "AAPL".to_string(),
            quantity: qty,
            price,
            time: "03/04/24 09:31:01".to_string(),
        }
    }

    fn ticket(id: &str, trade_id: &str, commission: f64, route_fee: f64) -> RawFeeTicket {
        RawFeeTicket {
            ticket_id: id.to_string(),
            trade_id: trade_id.to_string(),
            commission,
            route_fee,
        }
    }

    /// The three inputs for the worked reference scenario:
    /// - A: Buy 100 @ 10.00, filled @ 9.50, commission 1.00 -> pnl 49.00
    /// - B: Sell 50 @ 20.00, filled @ 20.50, no fees -> pnl 25.00
    /// - C: Buy 10 @ 5.00, never filled -> excluded
    fn reference_inputs() -> (Vec<RawOrder>, Vec<RawExecution>, Vec<RawFeeTicket>) {
        let orders = vec![
            order("A", Side::Buy, 100, 10.00, "AAPL", "03/04/24 09:31:00"),
            order("B", Side::Sell, 50, 20.00, "TSLA", "03/04/24 10:02:00"),
            order("C", Side::Buy, 10, 5.00, "MSFT", "03/04/24 11:15:00"),
        ];
        let executions = vec![execution("e1", "A", 100, 9.50), execution("e2", "B", 50, 20.50)];
        let tickets = vec![ticket("t1", "e1", 1.00, 0.0)];
        (orders, executions, tickets)
    }

    #[test]
    fn test_reference_scenario() {
        let (orders, executions, tickets) = reference_inputs();
        let result = run_pipeline(&orders, &executions, &tickets);

        assert_eq!(result.summary.total_trades, 2);
        assert_eq!(result.summary.winning_trades, 2);
        assert_eq!(result.summary.losing_trades, 0);
        assert!((result.summary.total_pl - 74.00).abs() < 1e-9);
        assert!((result.summary.win_rate - 100.0).abs() < 1e-9);
        assert!((result.summary.profit_factor - 74.00).abs() < 1e-9);
        assert_eq!(result.unmatched_order_count, 1);

        assert_eq!(result.reconciled_orders.len(), 2);
        assert_eq!(result.by_symbol.len(), 2);
        assert_eq!(result.by_symbol[0].symbol, "AAPL");
        assert_eq!(result.by_side.len(), 2);
        assert_eq!(result.equity_curve.len(), 2);
        let last = result.equity_curve.last().unwrap();
        assert!((last.equity - result.summary.total_pl).abs() < 1e-9);
    }

    #[test]
    fn test_empty_inputs_yield_empty_shape() {
        let result = run_pipeline(&[], &[], &[]);
        assert_eq!(result.summary.total_trades, 0);
        assert_eq!(result.summary.total_pl, 0.0);
        assert!(result.by_symbol.is_empty());
        assert!(result.by_hour.is_empty());
        assert!(result.by_side.is_empty());
        assert!(result.by_weekday.is_empty());
        assert!(result.by_trader.is_empty());
        assert!(result.equity_curve.is_empty());
        assert!(result.reconciled_orders.is_empty());
        assert_eq!(result.unmatched_order_count, 0);
    }

    #[test]
    fn test_determinism() {
        let (orders, executions, tickets) = reference_inputs();
        let first = run_pipeline(&orders, &executions, &tickets);
        let second = run_pipeline(&orders, &executions, &tickets);

        let a = serde_json::to_string(&first).unwrap();
        let b = serde_json::to_string(&second).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_missing_files_degrade_to_empty_result() {
        let result = run_pipeline_files(
            Path::new("/nonexistent/Orders.csv"),
            Path::new("/nonexistent/Trades.csv"),
            Path::new("/nonexistent/Tickets.csv"),
        );
        assert_eq!(result.summary.total_trades, 0);
        assert!(result.reconciled_orders.is_empty());
        assert!(result.by_side.is_empty());
    }

    #[test]
    fn test_json_key_names() {
        let (orders, executions, tickets) = reference_inputs();
        let result = run_pipeline(&orders, &executions, &tickets);
        let json = serde_json::to_value(&result).unwrap();

        assert!(json.get("summary").is_some());
        assert!(json.get("bySymbol").is_some());
        assert!(json.get("byHour").is_some());
        assert!(json.get("bySide").is_some());
        assert!(json.get("byWeekday").is_some());
        assert!(json.get("traderPerformance").is_some());
        assert!(json.get("equityCurve").is_some());
        assert!(json.get("reconciledOrders").is_some());
        assert!(json.get("unmatchedOrderCount").is_some());

        let summary = json.get("summary").unwrap();
        assert!(summary.get("totalPL").is_some());
        assert!(summary.get("winRate").is_some());
        assert!(summary.get("profitFactor").is_some());
        assert!(summary.get("maxDrawdown").is_some());

        let curve_point = &json["equityCurve"][0];
        assert!(curve_point.get("tradeNumber").is_some());
        assert!(curve_point.get("equity").is_some());
    }

    #[test]
    fn test_result_round_trips_through_json() {
        let (orders, executions, tickets) = reference_inputs();
        let result = run_pipeline(&orders, &executions, &tickets);
        let json = serde_json::to_string(&result).unwrap();
        let restored: PipelineResult = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.summary, result.summary);
        assert_eq!(restored.reconciled_orders.len(), result.reconciled_orders.len());
    }
}
