//! Lenient CSV readers for the three DAS export files.
//!
//! Fields are looked up by header name, so column order and extra columns
//! don't matter. A row that fails to read is logged and skipped; only a
//! missing or unreadable file is an error (the pipeline driver turns that
//! into the empty result).

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use crate::normalize::{safe_f64, safe_i64};
use crate::records::{RawExecution, RawFeeTicket, RawOrder, Side};

/// Header-name to column-index map. A column absent from the file reads as "".
struct HeaderIndex(HashMap<String, usize>);

impl HeaderIndex {
    fn new(headers: &csv::StringRecord) -> Self {
        HeaderIndex(
            headers
                .iter()
                .enumerate()
                .map(|(i, name)| (name.trim().to_string(), i))
                .collect(),
        )
    }

    fn field<'r>(&self, record: &'r csv::StringRecord, name: &str) -> &'r str {
        self.0
            .get(name)
            .and_then(|&i| record.get(i))
            .unwrap_or("")
    }
}

fn csv_reader<R: Read>(input: R) -> csv::Reader<R> {
    // flexible: rows with too few/many fields still yield a record.
    csv::ReaderBuilder::new().flexible(true).from_reader(input)
}

/// Read the orders export. Expected columns: OrderID, Trader, Account,
/// Branch, route, B/S, symb, qty, price, stopprice, trailprice, time.
pub fn read_orders<R: Read>(input: R) -> Result<Vec<RawOrder>> {
    let mut reader = csv_reader(input);
    let headers = HeaderIndex::new(reader.headers().context("orders CSV has no header row")?);

    let mut orders = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(err) => {
                debug!("skipping unreadable orders row {}: {}", row + 1, err);
                continue;
            }
        };
        orders.push(RawOrder {
            order_id: headers.field(&record, "OrderID").trim().to_string(),
            trader: headers.field(&record, "Trader").trim().to_string(),
            account: headers.field(&record, "Account").trim().to_string(),
            branch: headers.field(&record, "Branch").trim().to_string(),
            route: headers.field(&record, "route").trim().to_string(),
            side: Side::parse(headers.field(&record, "B/S")),
            symbol: headers.field(&record, "symb").trim().to_string(),
            quantity: safe_i64(headers.field(&record, "qty")),
            price: safe_f64(headers.field(&record, "price")),
            stop_price: safe_f64(headers.field(&record, "stopprice")),
            trail_price: safe_f64(headers.field(&record, "trailprice")),
            time: headers.field(&record, "time").trim().to_string(),
        });
    }
    Ok(orders)
}

/// Read the executions (trades) export. Expected columns: TradeID, OrderID,
/// B/S, symb, qty, price, time.
pub fn read_executions<R: Read>(input: R) -> Result<Vec<RawExecution>> {
    let mut reader = csv_reader(input);
    let headers = HeaderIndex::new(reader.headers().context("executions CSV has no header row")?);

    let mut executions = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(err) => {
                debug!("skipping unreadable executions row {}: {}", row + 1, err);
                continue;
            }
        };
        executions.push(RawExecution {
            trade_id: headers.field(&record, "TradeID").trim().to_string(),
            order_id: headers.field(&record, "OrderID").trim().to_string(),
            side: Side::parse(headers.field(&record, "B/S")),
            symbol: headers.field(&record, "symb").trim().to_string(),
            quantity: safe_i64(headers.field(&record, "qty")),
            price: safe_f64(headers.field(&record, "price")),
            time: headers.field(&record, "time").trim().to_string(),
        });
    }
    Ok(executions)
}

/// Read the fee tickets export. Expected columns: TicketID, TradeID,
/// commission, RouteFee.
pub fn read_tickets<R: Read>(input: R) -> Result<Vec<RawFeeTicket>> {
    let mut reader = csv_reader(input);
    let headers = HeaderIndex::new(reader.headers().context("tickets CSV has no header row")?);

    let mut tickets = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(err) => {
                debug!("skipping unreadable tickets row {}: {}", row + 1, err);
                continue;
            }
        };
        tickets.push(RawFeeTicket {
            ticket_id: headers.field(&record, "TicketID").trim().to_string(),
            trade_id: headers.field(&record, "TradeID").trim().to_string(),
            commission: safe_f64(headers.field(&record, "commission")),
            route_fee: safe_f64(headers.field(&record, "RouteFee")),
        });
    }
    Ok(tickets)
}

pub fn read_orders_file(path: &Path) -> Result<Vec<RawOrder>> {
    let file =
        File::open(path).with_context(|| format!("failed to open orders CSV: {:?}", path))?;
    read_orders(BufReader::new(file))
}

pub fn read_executions_file(path: &Path) -> Result<Vec<RawExecution>> {
    let file =
        File::open(path).with_context(|| format!("failed to open executions CSV: {:?}", path))?;
    read_executions(BufReader::new(file))
}

pub fn read_tickets_file(path: &Path) -> Result<Vec<RawFeeTicket>> {
    let file =
        File::open(path).with_context(|| format!("failed to open tickets CSV: {:?}", path))?;
    read_tickets(BufReader::new(file))
}
