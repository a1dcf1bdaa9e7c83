//! Joins the three record streams into per-order positions.
//!
//! Executions are matched to orders by `OrderID` (one-to-many), fee tickets
//! to executions by `TradeID`. Orders that never filled are excluded from
//! every downstream aggregate; the count of those is surfaced so callers
//! can report pending/unmatched orders.

use std::collections::HashMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::normalize::TradeTime;
use crate::records::{RawExecution, RawFeeTicket, RawOrder, Side};

/// One order merged with all of its executions and fees into a single
/// P&L-bearing record. Immutable after construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciledOrder {
    pub order_id: String,
    pub trader: String,
    pub symbol: String,
    pub side: Side,
    /// Quantity as stated on the order.
    pub quantity: i64,
    /// The order's stated limit/reference price.
    pub price: f64,
    /// Sum of execution quantities.
    pub total_qty: i64,
    /// Quantity-weighted mean of execution fill prices.
    pub avg_price: f64,
    pub total_commission: f64,
    pub total_route_fee: f64,
    /// Side-signed difference between the order price and the average fill
    /// price, times filled quantity, net of commission and route fees.
    pub pnl: f64,
    /// Raw timestamp string as exported.
    pub time: String,
    /// Canonical parsed timestamp; None when the raw string matched no format.
    pub parsed_time: Option<NaiveDateTime>,
    pub hour: u32,
    pub date: String,
    /// Days from Monday (0..=6), None when the timestamp never parsed.
    pub weekday: Option<u32>,
}

/// Result of one reconciliation pass.
#[derive(Debug, Default)]
pub struct ReconcileOutcome {
    pub orders: Vec<ReconciledOrder>,
    /// Raw orders dropped for having no executions.
    pub unmatched_order_count: usize,
}

/// Join orders, executions, and fee tickets into reconciled orders.
///
/// Never fails: bad joins degrade row-locally (missing ticket reads as zero
/// fees, an unfilled order is dropped and counted).
pub fn reconcile(
    orders: &[RawOrder],
    executions: &[RawExecution],
    tickets: &[RawFeeTicket],
) -> ReconcileOutcome {
    let mut execs_by_order: HashMap<&str, Vec<&RawExecution>> = HashMap::new();
    for exec in executions {
        execs_by_order
            .entry(exec.order_id.as_str())
            .or_default()
            .push(exec);
    }

    // One ticket per execution is expected, but duplicates are summed
    // rather than overwritten.
    let mut fees_by_exec: HashMap<&str, (f64, f64)> = HashMap::new();
    for ticket in tickets {
        let entry = fees_by_exec
            .entry(ticket.trade_id.as_str())
            .or_insert((0.0, 0.0));
        entry.0 += ticket.commission;
        entry.1 += ticket.route_fee;
    }

    let mut outcome = ReconcileOutcome::default();
    for order in orders {
        let Some(execs) = execs_by_order.get(order.order_id.as_str()) else {
            debug!("order {} has no executions, excluded", order.order_id);
            outcome.unmatched_order_count += 1;
            continue;
        };

        let total_qty: i64 = execs.iter().map(|e| e.quantity).sum();
        let avg_price = if total_qty > 0 {
            execs
                .iter()
                .map(|e| e.quantity as f64 * e.price)
                .sum::<f64>()
                / total_qty as f64
        } else {
            0.0
        };

        let mut total_commission = 0.0;
        let mut total_route_fee = 0.0;
        for exec in execs {
            if let Some(&(commission, route_fee)) = fees_by_exec.get(exec.trade_id.as_str()) {
                total_commission += commission;
                total_route_fee += route_fee;
            } else {
                debug!(
                    "execution {} has no fee ticket, fees read as zero",
                    exec.trade_id
                );
            }
        }

        // P&L compares the order's stated price against the average fill
        // price. This is the system's defined semantics, not entry-vs-exit.
        let gross = match order.side {
            Side::Buy => (order.price - avg_price) * total_qty as f64,
            Side::Sell => (avg_price - order.price) * total_qty as f64,
        };
        let pnl = gross - total_commission - total_route_fee;

        // Time parts come from the order's own timestamp, not the executions'.
        let trade_time = TradeTime::parse(&order.time);

        outcome.orders.push(ReconciledOrder {
            order_id: order.order_id.clone(),
            trader: order.trader.clone(),
            symbol: order.symbol.clone(),
            side: order.side,
            quantity: order.quantity,
            price: order.price,
            total_qty,
            avg_price,
            total_commission,
            total_route_fee,
            pnl,
            time: order.time.clone(),
            parsed_time: trade_time.parsed,
            hour: trade_time.hour,
            date: trade_time.date,
            weekday: trade_time.weekday,
        });
    }

    outcome
}
