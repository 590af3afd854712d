use crate::data::{AmountPolicy, DonationRecord, Error};
use anyhow::Context;
use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::warn;

const COMMITTEE_COLUMN: &str = "CMTE_ID";
const AMOUNT_COLUMN: &str = "TRANSACTION_AMT";
const NAME_COLUMN: &str = "NAME";

/// The bulk file separates fields with pipes; the header file is plain CSV.
const BODY_DELIMITER: u8 = b'|';

/// Positions of the interpreted columns, resolved once from the header
/// table's first row. Both tables are positional, so the same layout
/// applies to the headerless bulk file.
struct Layout {
    columns: usize,
    committee: usize,
    amount: usize,
    name: usize,
}

impl Layout {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self, Error> {
        let find = |wanted: &'static str| {
            headers
                .iter()
                .position(|h| h == wanted)
                .ok_or(Error::MissingColumn(wanted))
        };
        Ok(Self {
            columns: headers.len(),
            committee: find(COMMITTEE_COLUMN)?,
            amount: find(AMOUNT_COLUMN)?,
            name: find(NAME_COLUMN)?,
        })
    }

    /// Pulls the interpreted fields out of one positional row. Returns
    /// `Ok(None)` for a row dropped under [`AmountPolicy::SkipAndCount`].
    fn record(
        &self,
        row: &csv::StringRecord,
        line: u64,
        policy: AmountPolicy,
    ) -> Result<Option<DonationRecord>, Error> {
        if row.len() != self.columns {
            return Err(Error::ColumnCountMismatch {
                expected: self.columns,
                found: row.len(),
                line,
            });
        }
        let transaction_amount = match Decimal::from_str(&row[self.amount]) {
            Ok(amount) => amount,
            Err(_) => match policy {
                AmountPolicy::Strict => {
                    return Err(Error::BadAmount {
                        line,
                        value: row[self.amount].to_string(),
                    })
                }
                AmountPolicy::SkipAndCount => return Ok(None),
            },
        };
        Ok(Some(DonationRecord {
            committee_id: row[self.committee].to_string(),
            transaction_amount,
            donor_name: row[self.name].to_string(),
        }))
    }
}

fn collect(
    layout: &Layout,
    row: &csv::StringRecord,
    line: u64,
    policy: AmountPolicy,
    records: &mut Vec<DonationRecord>,
    skipped: &mut u64,
) -> Result<(), Error> {
    match layout.record(row, line, policy)? {
        Some(record) => records.push(record),
        None => *skipped += 1,
    }
    Ok(())
}

/// Merges the header-described reference table with the headerless bulk
/// table into one record set, typed by the header table's column names.
/// The merge is a plain concatenation of both tables' data rows; nothing
/// is deduplicated. Any row whose field count differs from the header's
/// column count is a structural error.
pub(crate) fn read_merged<H: std::io::Read, B: std::io::Read>(
    header: H,
    body: B,
    policy: AmountPolicy,
) -> Result<Vec<DonationRecord>, anyhow::Error> {
    let mut header_rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(header);
    let layout = Layout::from_headers(header_rdr.headers().context("reading header table")?)?;

    let mut records = Vec::new();
    let mut skipped = 0u64;

    for (i, row) in header_rdr.records().enumerate() {
        let row = row.context("reading header table")?;
        // line 1 is the column-name row
        collect(&layout, &row, i as u64 + 2, policy, &mut records, &mut skipped)
            .context("in header table")?;
    }

    let mut body_rdr = csv::ReaderBuilder::new()
        .delimiter(BODY_DELIMITER)
        .has_headers(false)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(body);
    for (i, row) in body_rdr.records().enumerate() {
        let row = row.context("reading body table")?;
        collect(&layout, &row, i as u64 + 1, policy, &mut records, &mut skipped)
            .context("in body table")?;
    }

    if skipped > 0 {
        warn!(skipped, "dropped rows with non-numeric amounts");
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::read_merged;
    use crate::data::{AmountPolicy, DonationRecord, Error};
    use rust_decimal_macros::dec;

    // A cut-down version of the FEC layout: the real files have 21 columns
    // but only the relative positions matter here.
    const HEADER_TABLE: &[u8] = b"\
CMTE_ID, ENTITY_TP, NAME,       TRANSACTION_AMT
C1,      IND,       SMITH JOHN, 100
";

    fn record(committee: &str, amount: rust_decimal::Decimal, name: &str) -> DonationRecord {
        DonationRecord {
            committee_id: committee.to_string(),
            transaction_amount: amount,
            donor_name: name.to_string(),
        }
    }

    #[test]
    fn merges_header_data_rows_with_body_rows() {
        let body = b"C2|IND|DOE JANE|-30\nC1|IND|ROE RICHARD|2400\n";
        let merged = read_merged(HEADER_TABLE, &body[..], AmountPolicy::Strict).unwrap();
        assert_eq!(
            merged,
            [
                record("C1", dec!(100), "SMITH JOHN"),
                record("C2", dec!(-30), "DOE JANE"),
                record("C1", dec!(2400), "ROE RICHARD"),
            ]
        );
    }

    #[test]
    fn body_row_with_wrong_field_count_is_fatal() {
        let body = b"C2|IND|DOE JANE\n";
        let err = read_merged(HEADER_TABLE, &body[..], AmountPolicy::Strict).unwrap_err();
        assert_eq!(
            err.downcast_ref::<Error>(),
            Some(&Error::ColumnCountMismatch {
                expected: 4,
                found: 3,
                line: 1,
            })
        );
    }

    #[test]
    fn header_table_missing_required_column_is_fatal() {
        let header = b"CMTE_ID,ENTITY_TP,NAME\nC1,IND,SMITH JOHN\n";
        let body = b"";
        let err = read_merged(&header[..], &body[..], AmountPolicy::Strict).unwrap_err();
        assert_eq!(
            err.downcast_ref::<Error>(),
            Some(&Error::MissingColumn("TRANSACTION_AMT"))
        );
    }

    #[test]
    fn non_numeric_amount_is_fatal_under_strict_policy() {
        let body = b"C2|IND|DOE JANE|oops\n";
        let err = read_merged(HEADER_TABLE, &body[..], AmountPolicy::Strict).unwrap_err();
        assert_eq!(
            err.downcast_ref::<Error>(),
            Some(&Error::BadAmount {
                line: 1,
                value: "oops".to_string(),
            })
        );
    }

    #[test]
    fn non_numeric_amount_is_dropped_under_lenient_policy() {
        let body = b"C2|IND|DOE JANE|oops\nC2|IND|DOE JANE|55\n";
        let merged = read_merged(HEADER_TABLE, &body[..], AmountPolicy::SkipAndCount).unwrap();
        assert_eq!(
            merged,
            [
                record("C1", dec!(100), "SMITH JOHN"),
                record("C2", dec!(55), "DOE JANE"),
            ]
        );
    }
}
