//! Readers for the decoded catalog tables.
//!
//! Decoded buffers are tab-separated text without a header row. Each reader
//! knows the column positions for one table shape and skips rows shorter
//! than that shape's minimum field count; recovered files routinely carry
//! truncated or noisy rows and those are not errors. All fields are trimmed
//! of surrounding whitespace, and malformed UTF-8 is replaced rather than
//! rejected.

use crate::NSN_LEN;
use tracing::debug;

/// Minimum fields for an item-master row
const ITEM_MIN_FIELDS: usize = 7;

/// Minimum fields for a part cross-reference row
const PART_MIN_FIELDS: usize = 4;

/// Minimum fields for a CAGE address row
const CAGE_MIN_FIELDS: usize = 2;

/// Column of the acquisition advice code in the item master table
const ITEM_AAC_FIELD: usize = 11;

/// One row of the item master table (`V_FLIS_NSN`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRecord {
    /// National Item Identification Number
    pub niin: String,
    /// Federal Supply Class
    pub fsc: String,
    /// Item name
    pub item_name: String,
    /// Unit of issue
    pub unit_issue: String,
    /// Unit price in cents, as written in the source table
    pub unit_price: String,
    /// Acquisition advice code
    pub aac: String,
}

impl ItemRecord {
    /// Derives the NSN when it is structurally valid.
    ///
    /// The NSN is the FSC followed by the NIIN and must be exactly 13
    /// characters; anything else returns `None`, which excludes the record
    /// from consolidated output.
    pub fn nsn(&self) -> Option<String> {
        if self.fsc.is_empty() || self.niin.is_empty() {
            return None;
        }

        let nsn = format!("{}{}", self.fsc, self.niin);
        (nsn.len() == NSN_LEN).then_some(nsn)
    }
}

/// One row of the part cross-reference table (`V_FLIS_PART`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartRecord {
    /// National Item Identification Number
    pub niin: String,
    /// CAGE code of the part's vendor
    pub cage_code: String,
    /// Vendor part number
    pub part_number: String,
}

/// One row of the CAGE address table (`V_CAGE_ADDRESS`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CageRecord {
    /// CAGE code
    pub cage_code: String,
    /// Vendor name the code resolves to
    pub vendor_name: String,
}

/// Reads item-master rows from a decoded buffer.
///
/// Rows with fewer than 7 fields are skipped silently.
pub fn read_items(data: &[u8]) -> Vec<ItemRecord> {
    let mut items = Vec::new();

    for fields in read_rows(data) {
        if fields.len() < ITEM_MIN_FIELDS {
            continue;
        }
        items.push(ItemRecord {
            niin: fields[0].clone(),
            fsc: fields[1].clone(),
            item_name: fields[3].clone(),
            unit_issue: fields[5].clone(),
            unit_price: fields[6].clone(),
            aac: fields.get(ITEM_AAC_FIELD).cloned().unwrap_or_default(),
        });
    }

    debug!("read {} item rows", items.len());
    items
}

/// Reads part cross-reference rows from a decoded buffer.
///
/// Rows with fewer than 4 fields are skipped silently.
pub fn read_parts(data: &[u8]) -> Vec<PartRecord> {
    let mut parts = Vec::new();

    for fields in read_rows(data) {
        if fields.len() < PART_MIN_FIELDS {
            continue;
        }
        parts.push(PartRecord {
            niin: fields[0].clone(),
            cage_code: fields[1].clone(),
            part_number: fields[2].clone(),
        });
    }

    debug!("read {} part rows", parts.len());
    parts
}

/// Reads CAGE address rows from a decoded buffer.
///
/// Rows with fewer than 2 fields are skipped silently.
pub fn read_cages(data: &[u8]) -> Vec<CageRecord> {
    let mut cages = Vec::new();

    for fields in read_rows(data) {
        if fields.len() < CAGE_MIN_FIELDS {
            continue;
        }
        cages.push(CageRecord {
            cage_code: fields[0].clone(),
            vendor_name: fields[1].clone(),
        });
    }

    debug!("read {} CAGE rows", cages.len());
    cages
}

/// Parses a decoded buffer into trimmed per-row field lists.
///
/// Rows the CSV reader cannot parse at all are skipped like short rows.
fn read_rows(data: &[u8]) -> Vec<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .from_reader(data);

    let mut rows = Vec::new();
    for record in reader.byte_records() {
        let Ok(record) = record else {
            continue;
        };
        rows.push(
            record
                .iter()
                .map(|field| String::from_utf8_lossy(field).trim().to_string())
                .collect(),
        );
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_read_items() {
        let data = b"001234567\t5310\tINC\tWASHER, FLAT\tX\tEA\t1234\ta\tb\tc\td\tH\n\
                     001234568\t5310\tINC\tNUT, PLAIN\tX\tBX\t50\n";
        let items = read_items(data);

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].niin, "001234567");
        assert_eq!(items[0].fsc, "5310");
        assert_eq!(items[0].item_name, "WASHER, FLAT");
        assert_eq!(items[0].unit_issue, "EA");
        assert_eq!(items[0].unit_price, "1234");
        assert_eq!(items[0].aac, "H");

        // Row without an AAC column gets an empty code
        assert_eq!(items[1].aac, "");
    }

    #[test]
    fn test_read_items_skips_short_rows() {
        let data = b"001234567\t5310\tINC\tWASHER\tX\tEA\n\
                     001234568\t5310\tINC\tNUT, PLAIN\tX\tBX\t50\n";
        let items = read_items(data);

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].niin, "001234568");
    }

    #[test]
    fn test_read_items_trims_fields() {
        let data = b" 001234567 \t 5310\tINC\t WASHER \tX\tEA\t99\n";
        let items = read_items(data);

        assert_eq!(items[0].niin, "001234567");
        assert_eq!(items[0].fsc, "5310");
        assert_eq!(items[0].item_name, "WASHER");
    }

    #[test]
    fn test_read_items_lossy_utf8() {
        let data = b"001234567\t5310\tINC\tWASHER \xFF\tX\tEA\t99\n";
        let items = read_items(data);

        assert_eq!(items.len(), 1);
        assert!(items[0].item_name.starts_with("WASHER"));
    }

    #[test]
    fn test_read_parts() {
        let data = b"001234567\t12345\tPN-100\tX\n\
                     001234567\t67890\tPN-200\tX\n\
                     short\trow\n";
        let parts = read_parts(data);

        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].niin, "001234567");
        assert_eq!(parts[0].cage_code, "12345");
        assert_eq!(parts[0].part_number, "PN-100");
        assert_eq!(parts[1].cage_code, "67890");
    }

    #[test]
    fn test_read_cages() {
        let data = b"12345\tACME FASTENERS\textra\n\
                     67890\tGLOBE SUPPLY\n\
                     lonely\n";
        let cages = read_cages(data);

        assert_eq!(cages.len(), 2);
        assert_eq!(cages[0].cage_code, "12345");
        assert_eq!(cages[0].vendor_name, "ACME FASTENERS");
    }

    #[test]
    fn test_empty_input() {
        assert!(read_items(b"").is_empty());
        assert!(read_parts(b"").is_empty());
        assert!(read_cages(b"").is_empty());
    }

    #[test]
    fn test_nsn_derivation() {
        let mut item = ItemRecord {
            niin: "001234567".to_string(),
            fsc: "5310".to_string(),
            item_name: String::new(),
            unit_issue: String::new(),
            unit_price: String::new(),
            aac: String::new(),
        };
        assert_eq!(item.nsn(), Some("5310001234567".to_string()));

        // Wrong combined length
        item.niin = "12345".to_string();
        assert_eq!(item.nsn(), None);

        // Either half missing
        item.niin = String::new();
        assert_eq!(item.nsn(), None);
        item.niin = "001234567".to_string();
        item.fsc = String::new();
        assert_eq!(item.nsn(), None);
    }
}
