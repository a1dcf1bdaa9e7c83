//! Aggregates over reconciled orders: the top-level performance summary,
//! the per-key breakdowns, and the chronological equity curve.
//!
//! All aggregates are recomputed fully from the order list on every run;
//! nothing here is incremental or mutated in place.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::records::Side;
use crate::reconcile::ReconciledOrder;

const WEEKDAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Top-level performance metrics for one reconciliation run.
///
/// Boundary semantics: a zero-P&L order counts as a loser, and when there
/// are no losses the profit factor collapses to the raw total gain.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceSummary {
    #[serde(rename = "totalPL")]
    pub total_pl: f64,
    /// Percentage of orders with positive P&L (0 when there are no orders).
    pub win_rate: f64,
    pub profit_factor: f64,
    pub avg_win: f64,
    pub avg_loss: f64,
    /// Largest peak-to-trough decline of cumulative P&L in chronological order.
    pub max_drawdown: f64,
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
}

impl fmt::Display for PerformanceSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Performance Summary")?;
        writeln!(f, "------------------------------------")?;
        writeln!(f, "{:<20} {:>12.2}", "Total P&L", self.total_pl)?;
        writeln!(f, "{:<20} {:>11.1}%", "Win Rate", self.win_rate)?;
        writeln!(f, "{:<20} {:>12.2}", "Profit Factor", self.profit_factor)?;
        writeln!(f, "{:<20} {:>12.2}", "Avg Win", self.avg_win)?;
        writeln!(f, "{:<20} {:>12.2}", "Avg Loss", self.avg_loss)?;
        writeln!(f, "{:<20} {:>12.2}", "Max Drawdown", self.max_drawdown)?;
        writeln!(f, "{:<20} {:>12}", "Total Trades", self.total_trades)?;
        writeln!(f, "{:<20} {:>12}", "Winners", self.winning_trades)?;
        writeln!(f, "{:<20} {:>12}", "Losers", self.losing_trades)?;
        write!(f, "------------------------------------")
    }
}

/// Per-symbol totals, sorted descending by total P&L.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolStats {
    pub symbol: String,
    #[serde(rename = "totalPL")]
    pub total_pl: f64,
    pub total_trades: usize,
    pub win_rate: f64,
}

/// Per-hour-of-day totals (0-23), sorted ascending by hour.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HourStats {
    pub hour: u32,
    #[serde(rename = "totalPL")]
    pub total_pl: f64,
    pub total_trades: usize,
    pub win_rate: f64,
}

/// Buy vs sell totals. Always two entries, buys first.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SideStats {
    #[serde(rename = "type")]
    pub side: Side,
    #[serde(rename = "totalPL")]
    pub total_pl: f64,
    pub total_trades: usize,
    pub win_rate: f64,
}

/// Per-weekday totals, sorted Monday (0) through Sunday (6).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekdayStats {
    pub weekday: String,
    pub weekday_num: u32,
    #[serde(rename = "totalPL")]
    pub total_pl: f64,
    pub total_trades: usize,
    pub winning_trades: usize,
    pub win_rate: f64,
    #[serde(rename = "avgPL")]
    pub avg_pl: f64,
}

/// Per-trader totals including fee attribution, sorted descending by total P&L.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraderStats {
    pub trader: String,
    pub total_trades: usize,
    #[serde(rename = "totalPL")]
    pub total_pl: f64,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub win_rate: f64,
    #[serde(rename = "avgPL")]
    pub avg_pl: f64,
    pub total_commission: f64,
    pub total_route_fee: f64,
}

/// One point of the chronological equity curve.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquityCurvePoint {
    pub trade_number: usize,
    pub time: String,
    pub date: String,
    pub symbol: String,
    pub pnl: f64,
    pub equity: f64,
}

#[derive(Debug, Default)]
struct GroupAcc {
    total_pl: f64,
    trades: usize,
    winners: usize,
}

impl GroupAcc {
    fn add(&mut self, pnl: f64) {
        self.total_pl += pnl;
        self.trades += 1;
        if pnl > 0.0 {
            self.winners += 1;
        }
    }

    fn win_rate(&self) -> f64 {
        if self.trades > 0 {
            self.winners as f64 / self.trades as f64 * 100.0
        } else {
            0.0
        }
    }
}

/// Chronological view: the timestamp parsed during normalization orders the
/// walk (unparsed records sort first), the raw string breaks ties. Stable,
/// so input order is preserved among true duplicates.
fn chronological(orders: &[ReconciledOrder]) -> Vec<&ReconciledOrder> {
    let mut sorted: Vec<&ReconciledOrder> = orders.iter().collect();
    sorted.sort_by(|a, b| (a.parsed_time, a.time.as_str()).cmp(&(b.parsed_time, b.time.as_str())));
    sorted
}

/// Compute the top-level summary over all reconciled orders.
pub fn compute_summary(orders: &[ReconciledOrder]) -> PerformanceSummary {
    if orders.is_empty() {
        return PerformanceSummary::default();
    }

    let total_trades = orders.len();
    let winning_trades = orders.iter().filter(|o| o.pnl > 0.0).count();
    // pnl <= 0 counts as a loss; there is no neutral bucket.
    let losing_trades = total_trades - winning_trades;

    let total_pl: f64 = orders.iter().map(|o| o.pnl).sum();
    let win_rate = winning_trades as f64 / total_trades as f64 * 100.0;

    let total_gain: f64 = orders.iter().filter(|o| o.pnl > 0.0).map(|o| o.pnl).sum();
    let total_loss: f64 = orders
        .iter()
        .filter(|o| o.pnl <= 0.0)
        .map(|o| o.pnl)
        .sum::<f64>()
        .abs();

    // With no losses the ratio collapses to the raw total gain, never to
    // infinity or a division by zero.
    let profit_factor = if total_loss > 0.0 {
        total_gain / total_loss
    } else {
        total_gain
    };

    let avg_win = if winning_trades > 0 {
        total_gain / winning_trades as f64
    } else {
        0.0
    };
    let avg_loss = if losing_trades > 0 {
        total_loss / losing_trades as f64
    } else {
        0.0
    };

    let mut peak = 0.0_f64;
    let mut running = 0.0_f64;
    let mut max_drawdown = 0.0_f64;
    for order in chronological(orders) {
        running += order.pnl;
        if running > peak {
            peak = running;
        }
        let drawdown = peak - running;
        if drawdown > max_drawdown {
            max_drawdown = drawdown;
        }
    }

    PerformanceSummary {
        total_pl,
        win_rate,
        profit_factor,
        avg_win,
        avg_loss,
        max_drawdown,
        total_trades,
        winning_trades,
        losing_trades,
    }
}

pub fn analyze_by_symbol(orders: &[ReconciledOrder]) -> Vec<SymbolStats> {
    let mut groups: HashMap<&str, GroupAcc> = HashMap::new();
    for order in orders {
        groups.entry(order.symbol.as_str()).or_default().add(order.pnl);
    }

    let mut stats: Vec<SymbolStats> = groups
        .into_iter()
        .map(|(symbol, acc)| SymbolStats {
            symbol: symbol.to_string(),
            total_pl: acc.total_pl,
            total_trades: acc.trades,
            win_rate: acc.win_rate(),
        })
        .collect();
    stats.sort_by(|a, b| {
        b.total_pl
            .partial_cmp(&a.total_pl)
            .unwrap_or(Ordering::Equal)
    });
    stats
}

pub fn analyze_by_hour(orders: &[ReconciledOrder]) -> Vec<HourStats> {
    let mut groups: HashMap<u32, GroupAcc> = HashMap::new();
    for order in orders {
        groups.entry(order.hour).or_default().add(order.pnl);
    }

    let mut stats: Vec<HourStats> = groups
        .into_iter()
        .map(|(hour, acc)| HourStats {
            hour,
            total_pl: acc.total_pl,
            total_trades: acc.trades,
            win_rate: acc.win_rate(),
        })
        .collect();
    stats.sort_by_key(|s| s.hour);
    stats
}

/// Fixed two-entry breakdown, buys first then sells, regardless of totals.
/// Empty order list yields an empty list.
pub fn analyze_by_side(orders: &[ReconciledOrder]) -> Vec<SideStats> {
    if orders.is_empty() {
        return Vec::new();
    }

    [Side::Buy, Side::Sell]
        .iter()
        .map(|&side| {
            let mut acc = GroupAcc::default();
            for order in orders.iter().filter(|o| o.side == side) {
                acc.add(order.pnl);
            }
            SideStats {
                side,
                total_pl: acc.total_pl,
                total_trades: acc.trades,
                win_rate: acc.win_rate(),
            }
        })
        .collect()
}

/// Orders whose timestamp never parsed carry no weekday and are left out here.
pub fn analyze_by_weekday(orders: &[ReconciledOrder]) -> Vec<WeekdayStats> {
    let mut groups: HashMap<u32, GroupAcc> = HashMap::new();
    for order in orders {
        if let Some(weekday) = order.weekday {
            groups.entry(weekday).or_default().add(order.pnl);
        }
    }

    let mut stats: Vec<WeekdayStats> = groups
        .into_iter()
        .map(|(num, acc)| WeekdayStats {
            weekday: WEEKDAY_NAMES
                .get(num as usize)
                .copied()
                .unwrap_or("Unknown")
                .to_string(),
            weekday_num: num,
            total_pl: acc.total_pl,
            total_trades: acc.trades,
            winning_trades: acc.winners,
            win_rate: acc.win_rate(),
            avg_pl: acc.total_pl / acc.trades as f64,
        })
        .collect();
    stats.sort_by_key(|s| s.weekday_num);
    stats
}

pub fn analyze_by_trader(orders: &[ReconciledOrder]) -> Vec<TraderStats> {
    #[derive(Default)]
    struct TraderAcc {
        pl: GroupAcc,
        commission: f64,
        route_fee: f64,
    }

    let mut groups: HashMap<&str, TraderAcc> = HashMap::new();
    for order in orders {
        let acc = groups.entry(order.trader.as_str()).or_default();
        acc.pl.add(order.pnl);
        acc.commission += order.total_commission;
        acc.route_fee += order.total_route_fee;
    }

    let mut stats: Vec<TraderStats> = groups
        .into_iter()
        .map(|(trader, acc)| TraderStats {
            trader: trader.to_string(),
            total_trades: acc.pl.trades,
            total_pl: acc.pl.total_pl,
            winning_trades: acc.pl.winners,
            losing_trades: acc.pl.trades - acc.pl.winners,
            win_rate: acc.pl.win_rate(),
            avg_pl: acc.pl.total_pl / acc.pl.trades as f64,
            total_commission: acc.commission,
            total_route_fee: acc.route_fee,
        })
        .collect();
    stats.sort_by(|a, b| {
        b.total_pl
            .partial_cmp(&a.total_pl)
            .unwrap_or(Ordering::Equal)
    });
    stats
}

/// Prefix-sum equity curve over the chronological order sequence.
pub fn equity_curve(orders: &[ReconciledOrder]) -> Vec<EquityCurvePoint> {
    let mut running = 0.0_f64;
    chronological(orders)
        .into_iter()
        .enumerate()
        .map(|(i, order)| {
            running += order.pnl;
            EquityCurvePoint {
                trade_number: i + 1,
                time: order.time.clone(),
                date: order.date.clone(),
                symbol: order.symbol.clone(),
                pnl: order.pnl,
                equity: running,
            }
        })
        .collect()
}
