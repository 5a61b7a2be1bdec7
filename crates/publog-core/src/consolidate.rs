//! Consolidation of decoded catalog tables into import-ready records.
//!
//! The [`Consolidator`] joins the item master, part cross-reference, and
//! CAGE address tables by NIIN and CAGE code. It owns its lookup maps for
//! exactly one pass: build it, feed it the table rows, then call
//! [`Consolidator::consolidate`] to consume it and obtain the output rows.
//!
//! The only structural filter on items is the 13-character NSN check; rows
//! that fail it are dropped, everything else degrades to empty fields.

use crate::error::{Error, Result};
use crate::table::{CageRecord, ItemRecord, PartRecord};
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// Header row of the consolidated CSV output
pub const OUTPUT_HEADER: [&str; 10] = [
    "NSN",
    "LIN",
    "ITEM_NAME",
    "DESCRIPTION",
    "CATEGORY",
    "MANUFACTURER",
    "PART_NUMBER",
    "UNIT_ISSUE",
    "UNIT_PRICE",
    "AAC",
];

/// One import-ready output row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConsolidatedRecord {
    /// 13-character National Stock Number
    #[serde(rename = "NSN")]
    pub nsn: String,
    /// Line Item Number; no source table populates it
    #[serde(rename = "LIN")]
    pub lin: String,
    /// Item name from the item master
    #[serde(rename = "ITEM_NAME")]
    pub item_name: String,
    /// Free-text description; no source table populates it
    #[serde(rename = "DESCRIPTION")]
    pub description: String,
    /// Federal Supply Class of the item
    #[serde(rename = "CATEGORY")]
    pub category: String,
    /// Vendor name resolved through the CAGE table, or the raw CAGE code
    /// when unresolved; empty when the item has no part match
    #[serde(rename = "MANUFACTURER")]
    pub manufacturer: String,
    /// Part number of the first cross-reference for the item's NIIN
    #[serde(rename = "PART_NUMBER")]
    pub part_number: String,
    /// Unit of issue
    #[serde(rename = "UNIT_ISSUE")]
    pub unit_issue: String,
    /// Unit price in dollars with two fractional digits
    #[serde(rename = "UNIT_PRICE")]
    pub unit_price: String,
    /// Acquisition advice code
    #[serde(rename = "AAC")]
    pub aac: String,
}

/// Joins the three catalog tables for a single consolidation pass
#[derive(Debug, Default)]
pub struct Consolidator {
    items: Vec<ItemRecord>,
    parts_by_niin: HashMap<String, Vec<PartRecord>>,
    vendors_by_cage: HashMap<String, String>,
}

impl Consolidator {
    /// Creates an empty consolidator
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds item-master records; output order follows insertion order
    pub fn add_items(&mut self, items: impl IntoIterator<Item = ItemRecord>) {
        self.items.extend(items);
    }

    /// Adds part cross-references.
    ///
    /// A NIIN may map to many parts; the first one added wins the join.
    pub fn add_parts(&mut self, parts: impl IntoIterator<Item = PartRecord>) {
        for part in parts {
            self.parts_by_niin
                .entry(part.niin.clone())
                .or_default()
                .push(part);
        }
    }

    /// Adds CAGE vendor names; the last name added per code wins
    pub fn add_cages(&mut self, cages: impl IntoIterator<Item = CageRecord>) {
        for cage in cages {
            self.vendors_by_cage.insert(cage.cage_code, cage.vendor_name);
        }
    }

    /// Consumes the consolidator and emits one record per valid item.
    ///
    /// Items whose FSC + NIIN concatenation is not exactly 13 characters
    /// are excluded; that is the only structural filter applied. Output
    /// order matches the order items were added.
    pub fn consolidate(self) -> Vec<ConsolidatedRecord> {
        let mut records = Vec::with_capacity(self.items.len());
        let mut skipped = 0usize;

        for item in &self.items {
            let Some(nsn) = item.nsn() else {
                skipped += 1;
                continue;
            };

            let (manufacturer, part_number) = match self
                .parts_by_niin
                .get(&item.niin)
                .and_then(|parts| parts.first())
            {
                Some(part) => {
                    let manufacturer = self
                        .vendors_by_cage
                        .get(&part.cage_code)
                        .cloned()
                        .unwrap_or_else(|| part.cage_code.clone());
                    (manufacturer, part.part_number.clone())
                }
                None => (String::new(), String::new()),
            };

            records.push(ConsolidatedRecord {
                nsn,
                lin: String::new(),
                item_name: item.item_name.clone(),
                description: String::new(),
                category: item.fsc.clone(),
                manufacturer,
                part_number,
                unit_issue: item.unit_issue.clone(),
                unit_price: format_price(&item.unit_price),
                aac: item.aac.clone(),
            });
        }

        debug!(
            "consolidated {} records, skipped {} items with invalid NSN",
            records.len(),
            skipped
        );
        records
    }
}

/// Converts a raw cents value to dollars with two fractional digits.
///
/// The source field carries integer cents, but prices that already drifted
/// into fractional form convert too. Anything unparseable yields `0.00`.
fn format_price(raw: &str) -> String {
    if let Ok(cents) = raw.parse::<i64>() {
        let sign = if cents < 0 { "-" } else { "" };
        let cents = cents.unsigned_abs();
        return format!("{}{}.{:02}", sign, cents / 100, cents % 100);
    }

    match raw.parse::<f64>() {
        Ok(cents) => format!("{:.2}", cents / 100.0),
        Err(_) => "0.00".to_string(),
    }
}

/// Writes consolidated records to a CSV file with the fixed header row.
///
/// The header is written even when there are no records.
pub fn write_csv(path: impl AsRef<Path>, records: &[ConsolidatedRecord]) -> Result<()> {
    let path = path.as_ref();
    let mut writer = csv::Writer::from_path(path).map_err(|e| Error::csv_write(path, e))?;

    if records.is_empty() {
        writer
            .write_record(OUTPUT_HEADER)
            .map_err(|e| Error::csv_write(path, e))?;
    }
    for record in records {
        writer
            .serialize(record)
            .map_err(|e| Error::csv_write(path, e))?;
    }

    writer.flush().map_err(|e| Error::file_write(path, e))?;
    Ok(())
}
