use serde::{Deserialize, Serialize};

/// Buy/sell indicator from the DAS `B/S` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// DAS exports mark buys as `B`; every other code (`S`, `SS` for short
    /// sells, blanks) settles as a sell.
    pub fn parse(code: &str) -> Self {
        match code.trim() {
            "B" | "Buy" | "buy" => Side::Buy,
            _ => Side::Sell,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Buy => write!(f, "Buy"),
            Side::Sell => write!(f, "Sell"),
        }
    }
}

/// One row of the orders export. Immutable input; numeric fields have
/// already been coerced (unparsable values read as 0 / 0.0).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawOrder {
    pub order_id: String,
    pub trader: String,
    pub account: String,
    pub branch: String,
    pub route: String,
    pub side: Side,
    pub symbol: String,
    pub quantity: i64,
    /// The order's stated limit/reference price. P&L is measured against this.
    pub price: f64,
    pub stop_price: f64,
    pub trail_price: f64,
    /// Raw timestamp string as exported; parsed lazily during reconciliation.
    pub time: String,
}

/// One fill (partial or full) of an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawExecution {
    /// DAS calls executions "trades"; `TradeID` is the execution id.
    pub trade_id: String,
    pub order_id: String,
    pub side: Side,
    pub symbol: String,
    pub quantity: i64,
    pub price: f64,
    pub time: String,
}

/// Commission/routing-fee record attached to one execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFeeTicket {
    pub ticket_id: String,
    pub trade_id: String,
    pub commission: f64,
    pub route_fee: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_parse() {
        assert_eq!(Side::parse("B"), Side::Buy);
        assert_eq!(Side::parse(" B "), Side::Buy);
        assert_eq!(Side::parse("Buy"), Side::Buy);
        assert_eq!(Side::parse("S"), Side::Sell);
        assert_eq!(Side::parse("SS"), Side::Sell);
        assert_eq!(Side::parse(""), Side::Sell);
    }
}
