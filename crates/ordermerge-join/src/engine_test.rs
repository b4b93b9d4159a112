use ordermerge_core::{SnapshotEntry, SnapshotTable};

use super::*;

const HEADER_COLUMNS: &str = "Document Number,Date,Customer,SFCC Order Number,\
SFCC Bill to Customer,SFCC Ship to Customer,SFCC Customer Email,SFCC Customer Phone,\
SFCC Tax Total,SFCC Total,SFCC Transaction Total,\
Address: Shipping Address Line 1,Address: Shipping Address Line 2,Address: Shipping Address City,\
Address: Shipping Address State,Address: Shipping Address Zip Code,Address: Shipping Address Country,\
Address: Billing Address Line 1,Address: Billing Address Line 2,Address: Billing Address City,\
Address: Billing Address State,Address: Billing Address Zip Code,Address: Billing Address Country";

const ITEM_COLUMNS: &str = "Document Number,Item: Display Name,Item: Name,Quantity,Amount (Net)";

/// A header row with fixed contact and address cells.
fn header_row(document_number: &str, customer: &str, total: &str) -> String {
    format!(
        "{document_number},5/14/2025,{customer},0001{document_number},{customer},{customer},\
jane@example.com,555-0100,7.50,100.00,\"{total}\",\
1 Harbor Way,Suite 2,Kennebunkport,ME,04046,US,\
PO Box 9,,Portland,ME,04101,US"
    )
}

fn headers_csv(rows: &[String]) -> String {
    let mut csv = String::from(HEADER_COLUMNS);
    for row in rows {
        csv.push('\n');
        csv.push_str(row);
    }
    csv.push('\n');
    csv
}

fn items_csv(rows: &[&str]) -> String {
    let mut csv = String::from(ITEM_COLUMNS);
    for row in rows {
        csv.push('\n');
        csv.push_str(row);
    }
    csv.push('\n');
    csv
}

fn table() -> SnapshotTable {
    [
        ("SKU-42", "gid://shopify/ProductVariant/1234"),
        ("SKU-43", "gid://shopify/ProductVariant/5678"),
    ]
    .into_iter()
    .map(|(sku, id)| SnapshotEntry {
        sku: sku.to_string(),
        id: id.to_string(),
    })
    .collect()
}

fn join(headers: &str, items: &str) -> JoinOutcome {
    join_orders(headers.as_bytes(), items.as_bytes(), &table()).unwrap()
}

// ---------------------------------------------------------------------------
// headers
// ---------------------------------------------------------------------------

#[test]
fn header_row_maps_every_field() {
    let outcome = join(&headers_csv(&[header_row("SO-1", "Jane Doe", "107.50")]), ITEM_COLUMNS);

    assert_eq!(outcome.orders.len(), 1);
    let order = &outcome.orders[0];
    assert_eq!(order.document_number, "SO-1");
    assert_eq!(order.date, "5/14/2025");
    assert_eq!(order.customer, "Jane Doe");
    assert_eq!(order.order_number, "0001SO-1");
    assert_eq!(order.billing_to, "Jane Doe");
    assert_eq!(order.shipping_to, "Jane Doe");
    assert_eq!(order.email, "jane@example.com");
    assert_eq!(order.phone, "555-0100");
    assert_eq!(
        order.totals,
        OrderTotals {
            tax: 7.5,
            subtotal: 100.0,
            total: 107.5
        }
    );
    assert_eq!(order.shipping_address.line1, "1 Harbor Way");
    assert_eq!(order.shipping_address.line2, "Suite 2");
    assert_eq!(order.shipping_address.city, "Kennebunkport");
    assert_eq!(order.shipping_address.zip, "04046");
    assert_eq!(order.billing_address.line1, "PO Box 9");
    assert_eq!(order.billing_address.line2, "");
    assert_eq!(order.billing_address.city, "Portland");
    assert_eq!(order.billing_address.country, "US");
    assert!(order.items.is_empty());
}

#[test]
fn total_with_thousands_separator_is_kept() {
    let outcome = join(&headers_csv(&[header_row("SO-1", "Jane", "1,250.00")]), ITEM_COLUMNS);

    assert_eq!(outcome.orders.len(), 1);
    assert_eq!(outcome.orders[0].totals.total, 1250.0);
}

#[test]
fn non_positive_totals_are_filtered_silently() {
    let headers = headers_csv(&[
        header_row("SO-1", "Zero", "0"),
        header_row("SO-2", "Refund", "-12.00"),
        header_row("SO-3", "Kept", "0.01"),
    ]);
    let outcome = join(&headers, ITEM_COLUMNS);

    let kept: Vec<_> = outcome
        .orders
        .iter()
        .map(|o| o.document_number.as_str())
        .collect();
    assert_eq!(kept, vec!["SO-3"]);
    assert_eq!(outcome.stats.headers_read, 1);
    assert_eq!(outcome.stats.headers_filtered, 2);
    assert_eq!(outcome.stats.headers_malformed, 0);
}

#[test]
fn malformed_total_excludes_row() {
    let headers = headers_csv(&[
        header_row("SO-1", "Bad", "n/a"),
        header_row("SO-2", "Empty", ""),
        header_row("SO-3", "Good", "10"),
    ]);
    let outcome = join(&headers, ITEM_COLUMNS);

    assert_eq!(outcome.orders.len(), 1);
    assert_eq!(outcome.orders[0].document_number, "SO-3");
    assert_eq!(outcome.stats.headers_malformed, 2);
}

#[test]
fn malformed_tax_defaults_to_zero() {
    let headers = "Document Number,SFCC Tax Total,SFCC Total,SFCC Transaction Total\n\
                   SO-1,abc,\"1,000.00\",\"1,080.00\"\n";
    let outcome = join(headers, ITEM_COLUMNS);

    assert_eq!(
        outcome.orders[0].totals,
        OrderTotals {
            tax: 0.0,
            subtotal: 1000.0,
            total: 1080.0
        }
    );
}

#[test]
fn headers_and_cells_are_trimmed() {
    let headers = " Document Number , Customer ,SFCC Transaction Total \n  SO-1  ,  Jane Doe  , 5.00 \n";
    let outcome = join(headers, ITEM_COLUMNS);

    assert_eq!(outcome.orders[0].document_number, "SO-1");
    assert_eq!(outcome.orders[0].customer, "Jane Doe");
    assert_eq!(outcome.orders[0].totals.total, 5.0);
}

#[test]
fn missing_optional_columns_read_as_empty() {
    let headers = "Document Number,SFCC Transaction Total\nSO-1,5\n";
    let outcome = join(headers, ITEM_COLUMNS);

    let order = &outcome.orders[0];
    assert_eq!(order.email, "");
    assert_eq!(order.totals.tax, 0.0);
    assert_eq!(order.shipping_address, Address::default());
}

#[test]
fn duplicate_document_number_replaces_in_place() {
    let headers = headers_csv(&[
        header_row("SO-1", "First", "10"),
        header_row("SO-2", "Second", "20"),
        header_row("SO-1", "Replacement", "30"),
    ]);
    let outcome = join(&headers, ITEM_COLUMNS);

    let summary: Vec<_> = outcome
        .orders
        .iter()
        .map(|o| (o.document_number.as_str(), o.customer.as_str()))
        .collect();
    assert_eq!(summary, vec![("SO-1", "Replacement"), ("SO-2", "Second")]);
    assert_eq!(outcome.stats.headers_read, 3);
    assert_eq!(outcome.stats.headers_replaced, 1);
}

#[test]
fn missing_total_column_is_an_error() {
    let err = join_orders(
        "Document Number,Customer\nSO-1,Jane\n".as_bytes(),
        ITEM_COLUMNS.as_bytes(),
        &table(),
    )
    .unwrap_err();

    assert!(
        matches!(err, JoinError::MissingColumn { column: "SFCC Transaction Total", .. }),
        "expected MissingColumn, got: {err:?}"
    );
}

#[test]
fn empty_header_input_is_missing_column() {
    let err = join_orders("".as_bytes(), ITEM_COLUMNS.as_bytes(), &table()).unwrap_err();
    assert!(matches!(
        err,
        JoinError::MissingColumn {
            column: "Document Number",
            ..
        }
    ));
}

// ---------------------------------------------------------------------------
// items
// ---------------------------------------------------------------------------

#[test]
fn items_attach_in_encounter_order_with_resolved_variants() {
    let headers = headers_csv(&[header_row("SO-1", "A", "10"), header_row("SO-2", "B", "10")]);
    let items = items_csv(&[
        "SO-2,Keychain,SKU-43,1,5.00",
        "SO-1,Tote Bag,SKU-42,2,80.00",
        "SO-1,Mystery,SKU-99,1,1.00",
    ]);
    let outcome = join(&headers, &items);

    let first = &outcome.orders[0];
    assert_eq!(first.items.len(), 2);
    assert_eq!(first.items[0].sku, "SKU-42");
    assert_eq!(first.items[0].variant_id, "gid://shopify/ProductVariant/1234");
    assert_eq!(first.items[0].name, "Tote Bag");
    assert_eq!(first.items[0].quantity, 2);
    assert_eq!(first.items[0].net_amount, 80.0);
    assert_eq!(first.items[1].sku, "SKU-99");
    assert_eq!(first.items[1].variant_id, "");

    let second = &outcome.orders[1];
    assert_eq!(second.items.len(), 1);
    assert_eq!(second.items[0].variant_id, "gid://shopify/ProductVariant/5678");

    assert_eq!(outcome.stats.items_attached, 3);
    assert_eq!(outcome.stats.unresolved_skus, 1);
}

#[test]
fn display_name_falls_back_to_item_name() {
    let headers = headers_csv(&[header_row("SO-1", "A", "10")]);
    let items = items_csv(&["SO-1,,SKU-42,1,1.00"]);
    let outcome = join(&headers, &items);

    assert_eq!(outcome.orders[0].items[0].name, "SKU-42");
    assert_eq!(outcome.orders[0].items[0].sku, "SKU-42");
}

#[test]
fn discount_lines_are_skipped_in_any_case() {
    let headers = headers_csv(&[header_row("SO-1", "A", "10")]);
    let items = items_csv(&[
        "SO-1,SFCC Order Discount,DISC,1,-5.00",
        "SO-1,sfcc order discount,DISC,1,-5.00",
        "SO-1,,SFCC ORDER DISCOUNT,1,-5.00",
        "SO-1,Tote Bag,SKU-42,1,10.00",
    ]);
    let outcome = join(&headers, &items);

    let skus: Vec<_> = outcome.orders[0]
        .items
        .iter()
        .map(|i| i.sku.as_str())
        .collect();
    assert_eq!(skus, vec!["SKU-42"]);
    assert_eq!(outcome.stats.discount_lines_skipped, 3);
}

#[test]
fn unparsable_quantity_and_amount_use_defaults() {
    let headers = headers_csv(&[header_row("SO-1", "A", "10")]);
    let items = items_csv(&[
        "SO-1,Tote,SKU-42,lots,free",
        "SO-1,Tote,SKU-42,,",
        "SO-1,Tote,SKU-42,0,\"1,200.50\"",
    ]);
    let outcome = join(&headers, &items);

    let parsed: Vec<_> = outcome.orders[0]
        .items
        .iter()
        .map(|i| (i.quantity, i.net_amount))
        .collect();
    assert_eq!(parsed, vec![(1, 0.0), (1, 0.0), (0, 1200.5)]);
}

#[test]
fn orphan_items_are_dropped() {
    let headers = headers_csv(&[header_row("SO-1", "A", "10"), header_row("SO-2", "Zero", "0")]);
    let items = items_csv(&[
        "SO-404,Tote,SKU-42,1,1.00",
        "SO-2,Tote,SKU-42,1,1.00",
        "SO-1,Keychain,SKU-43,1,1.00",
    ]);
    let outcome = join(&headers, &items);

    assert_eq!(outcome.orders.len(), 1);
    assert_eq!(outcome.orders[0].items.len(), 1);
    assert_eq!(outcome.orders[0].items[0].sku, "SKU-43");
    assert_eq!(outcome.stats.orphan_items_dropped, 2);
    assert_eq!(outcome.stats.items_attached, 1);
}

#[test]
fn items_follow_replaced_header() {
    let headers = headers_csv(&[header_row("SO-1", "Old", "10"), header_row("SO-1", "New", "10")]);
    let items = items_csv(&["SO-1,Tote,SKU-42,1,1.00"]);
    let outcome = join(&headers, &items);

    assert_eq!(outcome.orders.len(), 1);
    assert_eq!(outcome.orders[0].customer, "New");
    assert_eq!(outcome.orders[0].items.len(), 1);
}

#[test]
fn missing_document_number_in_items_is_an_error() {
    let err = join_orders(
        headers_csv(&[header_row("SO-1", "A", "10")]).as_bytes(),
        "Item: Name,Quantity\nSKU-42,1\n".as_bytes(),
        &table(),
    )
    .unwrap_err();

    assert!(matches!(
        err,
        JoinError::MissingColumn {
            column: "Document Number",
            ..
        }
    ));
}

#[test]
fn short_item_rows_read_missing_cells_as_empty() {
    let headers = headers_csv(&[header_row("SO-1", "A", "10")]);
    let items = items_csv(&["SO-1,Tote,SKU-42"]);
    let outcome = join(&headers, &items);

    let line = &outcome.orders[0].items[0];
    assert_eq!(line.quantity, 1);
    assert_eq!(line.net_amount, 0.0);
}

// ---------------------------------------------------------------------------
// whole join
// ---------------------------------------------------------------------------

#[test]
fn join_is_deterministic() {
    let headers = headers_csv(&[
        header_row("SO-3", "C", "30"),
        header_row("SO-1", "A", "10"),
        header_row("SO-2", "B", "20"),
    ]);
    let items = items_csv(&[
        "SO-2,Keychain,SKU-43,1,5.00",
        "SO-1,Tote Bag,SKU-42,2,80.00",
        "SO-3,Tote Bag,SKU-42,1,40.00",
    ]);

    let first = serde_json::to_string_pretty(&join(&headers, &items).orders).unwrap();
    let second = serde_json::to_string_pretty(&join(&headers, &items).orders).unwrap();
    assert_eq!(first, second);
    assert!(first.find("SO-3").unwrap() < first.find("SO-1").unwrap());
}

#[test]
fn join_files_reads_from_disk() {
    let dir = std::env::temp_dir().join(format!("ordermerge-join-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    let headers_path = dir.join("headers.csv");
    let items_path = dir.join("items.csv");
    std::fs::write(&headers_path, headers_csv(&[header_row("SO-1", "A", "10")])).unwrap();
    std::fs::write(&items_path, items_csv(&["SO-1,Tote Bag,SKU-42,2,80.00"])).unwrap();

    let outcome = join_files(&headers_path, &items_path, &table()).unwrap();

    assert_eq!(outcome.orders.len(), 1);
    assert_eq!(outcome.orders[0].items[0].variant_id, "gid://shopify/ProductVariant/1234");
}

#[test]
fn join_files_reports_missing_input() {
    let missing = std::env::temp_dir().join(format!("ordermerge-missing-{}.csv", uuid::Uuid::new_v4()));
    let err = join_files(&missing, &missing, &table()).unwrap_err();

    assert!(matches!(err, JoinError::Io { ref path, .. } if *path == missing));
}

#[test]
fn unresolved_count_matches_items_without_variant_id() {
    let headers = headers_csv(&[header_row("SO-1", "A", "10")]);
    let items = items_csv(&[
        "SO-1,Tote Bag,SKU-42,1,1.00",
        "SO-1,Mystery,SKU-99,1,1.00",
        "SO-1,Blank,,1,1.00",
    ]);
    let outcome = join(&headers, &items);

    let unresolved = outcome.orders[0]
        .items
        .iter()
        .filter(|line| !line.is_resolved())
        .count();
    assert_eq!(unresolved, 2);
    assert_eq!(outcome.stats.unresolved_skus, unresolved);
}
