//! Column names of the header and item exports.
//!
//! Names are compared after surrounding whitespace has been trimmed from the
//! header row.

use std::collections::HashMap;
use std::io::Read;

use csv::StringRecord;

use crate::error::JoinError;

pub const DOCUMENT_NUMBER: &str = "Document Number";

pub mod header {
    pub const DATE: &str = "Date";
    pub const CUSTOMER: &str = "Customer";
    pub const ORDER_NUMBER: &str = "SFCC Order Number";
    pub const BILL_TO: &str = "SFCC Bill to Customer";
    pub const SHIP_TO: &str = "SFCC Ship to Customer";
    pub const EMAIL: &str = "SFCC Customer Email";
    pub const PHONE: &str = "SFCC Customer Phone";
    pub const TAX: &str = "SFCC Tax Total";
    pub const SUBTOTAL: &str = "SFCC Total";
    pub const TOTAL: &str = "SFCC Transaction Total";

    /// Address column prefixes; the component name is appended.
    pub const SHIPPING_ADDRESS: &str = "Address: Shipping Address";
    pub const BILLING_ADDRESS: &str = "Address: Billing Address";

    pub const ADDRESS_LINE1: &str = "Line 1";
    pub const ADDRESS_LINE2: &str = "Line 2";
    pub const ADDRESS_CITY: &str = "City";
    pub const ADDRESS_STATE: &str = "State";
    pub const ADDRESS_ZIP: &str = "Zip Code";
    pub const ADDRESS_COUNTRY: &str = "Country";
}

pub mod item {
    pub const DISPLAY_NAME: &str = "Item: Display Name";
    /// Generic item name; doubles as the SKU.
    pub const NAME: &str = "Item: Name";
    pub const QUANTITY: &str = "Quantity";
    pub const NET_AMOUNT: &str = "Amount (Net)";

    /// Display name of the order-level discount line in the item export.
    pub const DISCOUNT_SENTINEL: &str = "sfcc order discount";
}

/// Maps trimmed header names to field positions for one CSV input.
pub(crate) struct ColumnIndex {
    input: String,
    positions: HashMap<String, usize>,
}

impl ColumnIndex {
    pub(crate) fn from_reader<R: Read>(
        reader: &mut csv::Reader<R>,
        input: &str,
    ) -> Result<Self, JoinError> {
        let headers = reader.headers().map_err(|e| JoinError::csv(input, e))?;
        let positions = headers
            .iter()
            .enumerate()
            .map(|(position, name)| (name.to_string(), position))
            .collect();
        Ok(Self {
            input: input.to_string(),
            positions,
        })
    }

    pub(crate) fn require(&self, column: &'static str) -> Result<(), JoinError> {
        if self.positions.contains_key(column) {
            Ok(())
        } else {
            Err(JoinError::MissingColumn {
                input: self.input.clone(),
                column,
            })
        }
    }

    /// The cell under `column`, or `""` if the column or cell is absent.
    pub(crate) fn get<'r>(&self, record: &'r StringRecord, column: &str) -> &'r str {
        self.positions
            .get(column)
            .and_then(|&position| record.get(position))
            .unwrap_or_default()
    }
}

/// CSV reader with headers, ragged rows allowed and every cell trimmed.
pub(crate) fn reader<R: Read>(input: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input)
}
