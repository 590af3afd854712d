use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use thiserror::Error;

/// The three 2016 presidential campaign committees we report on.
/// C00575795 - HILLARY FOR AMERICA
/// C00577130 - BERNIE 2016
/// C00580100 - DONALD J. TRUMP FOR PRESIDENT, INC.
pub(crate) const TRACKED_COMMITTEES: [&str; 3] = ["C00575795", "C00577130", "C00580100"];

/// A single donation below this amount counts as coming from a small
/// contributor.
pub(crate) const SMALL_DONATION_THRESHOLD: Decimal = dec!(200);

/// One individual-contribution record, reduced to the three columns the
/// pipeline actually interprets. The FEC files carry another eighteen
/// columns, but nothing downstream reads them so they are dropped at
/// ingestion rather than carried around as opaque strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DonationRecord {
    pub committee_id: String,
    /// Signed; a negative amount is a refunded or corrected donation.
    pub transaction_amount: Decimal,
    pub donor_name: String,
}

/// What to do with a row whose amount field does not parse as a number.
/// Silently coercing to zero is not an option here: it would corrupt every
/// sum downstream without a trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AmountPolicy {
    /// Abort the whole run (the default).
    Strict,
    /// Drop the row and keep a count of how many were dropped.
    SkipAndCount,
}

/// Output row for `number_of_donations_per_campaign`.
#[derive(Debug, PartialEq, Eq, Serialize)]
pub(crate) struct CountRow {
    pub committee_id: String,
    pub count: u64,
}

/// Output row for `donation_amount_per_campaign`. The total is a net
/// figure: refunds have already been subtracted.
#[derive(Debug, PartialEq, Eq, Serialize)]
pub(crate) struct TotalRow {
    pub committee_id: String,
    pub total_donation: Decimal,
}

/// Output row for `small_donations_percentage`. `NaN` marks the one
/// committee state where the percentage is undefined (no positive donation
/// volume to divide by).
#[derive(Debug, PartialEq, Serialize)]
pub(crate) struct PercentageRow {
    pub committee_id: String,
    pub small_donations_percentage: f64,
}

/// Borrowing serialization proxy for the `donation_data_for_histogram`
/// artifact: projects a `DonationRecord` onto the three exported columns
/// and renames `donor_name` to the `name` header the plotting side expects.
#[derive(Debug, PartialEq, Eq, Serialize)]
pub(crate) struct HistogramRow<'a> {
    pub committee_id: &'a str,
    pub transaction_amount: Decimal,
    pub name: &'a str,
}

impl<'a> From<&'a DonationRecord> for HistogramRow<'a> {
    fn from(record: &'a DonationRecord) -> Self {
        Self {
            committee_id: &record.committee_id,
            transaction_amount: record.transaction_amount,
            name: &record.donor_name,
        }
    }
}

/// Ingestion error taxonomy. All of these are structural or data-quality
/// problems in the source tables; whether `BadAmount` aborts the run is
/// decided by the configured [`AmountPolicy`].
#[derive(Error, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("header table does not name a {0} column")]
    MissingColumn(&'static str),
    #[error("row {line} has {found} fields but the header table names {expected} columns")]
    ColumnCountMismatch {
        expected: usize,
        found: usize,
        line: u64,
    },
    #[error("row {line} has a non-numeric transaction amount {value:?}")]
    BadAmount { line: u64, value: String },
}
