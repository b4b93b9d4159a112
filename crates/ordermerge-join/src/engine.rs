use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use ordermerge_core::{Address, LineItem, OrderRecord, OrderTotals, SnapshotTable};

use crate::book::OrderBook;
use crate::columns::{header, item, reader, ColumnIndex, DOCUMENT_NUMBER};
use crate::error::JoinError;
use crate::parse::{net_amount_or_default, parse_amount, quantity_or_default};

const HEADER_INPUT: &str = "header export";
const ITEM_INPUT: &str = "item export";

/// Row counts gathered while joining, logged at the end of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JoinStats {
    /// Header rows that produced (or replaced) an order.
    pub headers_read: usize,
    /// Header rows dropped because their total was zero or negative.
    pub headers_filtered: usize,
    /// Header rows dropped because their total could not be parsed.
    pub headers_malformed: usize,
    /// Header rows whose document number had already been seen.
    pub headers_replaced: usize,
    pub items_attached: usize,
    pub discount_lines_skipped: usize,
    pub orphan_items_dropped: usize,
    /// Attached items whose SKU is not in the snapshot.
    pub unresolved_skus: usize,
}

/// Result of a complete join.
#[derive(Debug)]
pub struct JoinOutcome {
    pub orders: Vec<OrderRecord>,
    pub stats: JoinStats,
}

/// Reads the header export into `book`, one order per qualifying row.
///
/// Rows whose total is not strictly positive are skipped silently; rows whose
/// total cannot be parsed are skipped with a warning. A repeated document
/// number replaces the earlier order.
///
/// # Errors
///
/// Returns [`JoinError::MissingColumn`] if the document number or total
/// column is absent, or [`JoinError::Csv`] if the input is not valid CSV.
pub fn read_headers<R: Read>(
    input: R,
    book: &mut OrderBook,
    stats: &mut JoinStats,
) -> Result<(), JoinError> {
    read_headers_named(input, HEADER_INPUT, book, stats)
}

/// Attaches every item row of the item export to its order in `book`.
///
/// # Errors
///
/// Returns [`JoinError::MissingColumn`] if the document number column is
/// absent, or [`JoinError::Csv`] if the input is not valid CSV.
pub fn attach_items<R: Read>(
    input: R,
    book: &mut OrderBook,
    table: &SnapshotTable,
    stats: &mut JoinStats,
) -> Result<(), JoinError> {
    attach_items_named(input, ITEM_INPUT, book, table, stats)
}

/// Joins a header export and an item export held in memory or any other
/// reader.
///
/// # Errors
///
/// Propagates errors from [`read_headers`] and [`attach_items`].
pub fn join_orders<H: Read, I: Read>(
    headers: H,
    items: I,
    table: &SnapshotTable,
) -> Result<JoinOutcome, JoinError> {
    join_named((headers, HEADER_INPUT), (items, ITEM_INPUT), table)
}

/// Joins the header and item exports at the given paths.
///
/// # Errors
///
/// Returns [`JoinError::Io`] if either file cannot be opened, otherwise the
/// same errors as [`join_orders`].
pub fn join_files(
    headers_path: &Path,
    items_path: &Path,
    table: &SnapshotTable,
) -> Result<JoinOutcome, JoinError> {
    let headers = open(headers_path)?;
    let items = open(items_path)?;
    join_named(
        (headers, &headers_path.display().to_string()),
        (items, &items_path.display().to_string()),
        table,
    )
}

fn open(path: &Path) -> Result<File, JoinError> {
    File::open(path).map_err(|source| JoinError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn join_named<H: Read, I: Read>(
    (headers, headers_name): (H, &str),
    (items, items_name): (I, &str),
    table: &SnapshotTable,
) -> Result<JoinOutcome, JoinError> {
    let mut book = OrderBook::new();
    let mut stats = JoinStats::default();

    read_headers_named(headers, headers_name, &mut book, &mut stats)?;
    attach_items_named(items, items_name, &mut book, table, &mut stats)?;

    tracing::info!(
        orders = book.len(),
        headers_read = stats.headers_read,
        headers_filtered = stats.headers_filtered,
        headers_malformed = stats.headers_malformed,
        headers_replaced = stats.headers_replaced,
        items_attached = stats.items_attached,
        discount_lines_skipped = stats.discount_lines_skipped,
        orphan_items_dropped = stats.orphan_items_dropped,
        unresolved_skus = stats.unresolved_skus,
        "order join complete"
    );

    Ok(JoinOutcome {
        orders: book.into_orders(),
        stats,
    })
}

fn read_headers_named<R: Read>(
    input: R,
    name: &str,
    book: &mut OrderBook,
    stats: &mut JoinStats,
) -> Result<(), JoinError> {
    let mut rows = reader(input);
    let columns = ColumnIndex::from_reader(&mut rows, name)?;
    columns.require(DOCUMENT_NUMBER)?;
    columns.require(header::TOTAL)?;

    for record in rows.records() {
        let record = record.map_err(|e| JoinError::csv(name, e))?;
        let document_number = columns.get(&record, DOCUMENT_NUMBER);
        let raw_total = columns.get(&record, header::TOTAL);

        let Some(total) = parse_amount(raw_total) else {
            tracing::warn!(
                document_number,
                total = raw_total,
                line = line_of(&record),
                "skipping order with malformed total"
            );
            stats.headers_malformed += 1;
            continue;
        };
        if total <= 0.0 {
            stats.headers_filtered += 1;
            continue;
        }

        let order = OrderRecord {
            document_number: document_number.to_string(),
            date: columns.get(&record, header::DATE).to_string(),
            customer: columns.get(&record, header::CUSTOMER).to_string(),
            order_number: columns.get(&record, header::ORDER_NUMBER).to_string(),
            billing_to: columns.get(&record, header::BILL_TO).to_string(),
            shipping_to: columns.get(&record, header::SHIP_TO).to_string(),
            email: columns.get(&record, header::EMAIL).to_string(),
            phone: columns.get(&record, header::PHONE).to_string(),
            totals: OrderTotals {
                tax: amount_or_zero(&columns, &record, header::TAX),
                subtotal: amount_or_zero(&columns, &record, header::SUBTOTAL),
                total,
            },
            shipping_address: address(&columns, &record, header::SHIPPING_ADDRESS),
            billing_address: address(&columns, &record, header::BILLING_ADDRESS),
            items: Vec::new(),
        };

        stats.headers_read += 1;
        if book.upsert(order).is_some() {
            tracing::debug!(document_number, "duplicate header row replaces earlier order");
            stats.headers_replaced += 1;
        }
    }

    Ok(())
}

fn attach_items_named<R: Read>(
    input: R,
    name: &str,
    book: &mut OrderBook,
    table: &SnapshotTable,
    stats: &mut JoinStats,
) -> Result<(), JoinError> {
    let mut rows = reader(input);
    let columns = ColumnIndex::from_reader(&mut rows, name)?;
    columns.require(DOCUMENT_NUMBER)?;

    for record in rows.records() {
        let record = record.map_err(|e| JoinError::csv(name, e))?;
        let document_number = columns.get(&record, DOCUMENT_NUMBER);
        let sku = columns.get(&record, item::NAME);
        let display_name = match columns.get(&record, item::DISPLAY_NAME) {
            "" => sku,
            display => display,
        };

        if display_name.eq_ignore_ascii_case(item::DISCOUNT_SENTINEL) {
            tracing::debug!(document_number, "skipping discount line");
            stats.discount_lines_skipped += 1;
            continue;
        }

        let line = LineItem {
            sku: sku.to_string(),
            variant_id: table.resolve(sku).unwrap_or_default().to_string(),
            name: display_name.to_string(),
            quantity: item_quantity(&columns, &record),
            net_amount: item_net_amount(&columns, &record),
        };
        let resolved = line.is_resolved();

        match book.attach(document_number, line) {
            Ok(()) => {
                stats.items_attached += 1;
                if !resolved {
                    stats.unresolved_skus += 1;
                }
            }
            Err(dropped) => {
                tracing::warn!(
                    document_number,
                    sku = %dropped.sku,
                    "skipped item with unknown document number"
                );
                stats.orphan_items_dropped += 1;
            }
        }
    }

    Ok(())
}

/// Tax and subtotal are informational, so a bad cell becomes `0.0`.
fn amount_or_zero(columns: &ColumnIndex, record: &StringRecord, column: &str) -> f64 {
    let raw = columns.get(record, column);
    if raw.is_empty() {
        return 0.0;
    }
    parse_amount(raw).unwrap_or_else(|| {
        tracing::warn!(
            column,
            value = raw,
            line = line_of(record),
            "malformed amount, using 0.0"
        );
        0.0
    })
}

fn item_quantity(columns: &ColumnIndex, record: &StringRecord) -> u32 {
    let raw = columns.get(record, item::QUANTITY);
    if !raw.is_empty() && raw.parse::<u32>().is_err() {
        tracing::warn!(value = raw, line = line_of(record), "malformed quantity, using default");
    }
    quantity_or_default(raw)
}

fn item_net_amount(columns: &ColumnIndex, record: &StringRecord) -> f64 {
    let raw = columns.get(record, item::NET_AMOUNT);
    if !raw.is_empty() && parse_amount(raw).is_none() {
        tracing::warn!(value = raw, line = line_of(record), "malformed net amount, using default");
    }
    net_amount_or_default(raw)
}

fn address(columns: &ColumnIndex, record: &StringRecord, prefix: &str) -> Address {
    let component = |suffix: &str| columns.get(record, &format!("{prefix} {suffix}")).to_string();
    Address {
        line1: component(header::ADDRESS_LINE1),
        line2: component(header::ADDRESS_LINE2),
        city: component(header::ADDRESS_CITY),
        state: component(header::ADDRESS_STATE),
        zip: component(header::ADDRESS_ZIP),
        country: component(header::ADDRESS_COUNTRY),
    }
}

fn line_of(record: &StringRecord) -> u64 {
    record.position().map_or(0, csv::Position::line)
}

#[cfg(test)]
#[path = "engine_test.rs"]
mod tests;
