use crate::data::{
    CountRow, DonationRecord, HistogramRow, PercentageRow, TotalRow, SMALL_DONATION_THRESHOLD,
};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Keeps only the records addressed to one of the allow-listed committees.
/// Applied exactly once, so every aggregator and the histogram export see
/// the same base set. Everything downstream of this function is a pure
/// read of the result.
pub(crate) fn filter_committees(
    mut records: Vec<DonationRecord>,
    allow_list: &[&str],
) -> Vec<DonationRecord> {
    records.retain(|r| allow_list.contains(&r.committee_id.as_str()));
    records
}

/// How many donations each campaign received. Non-positive amounts are
/// returned or voided donations and do not count, so a committee with only
/// refunds on file emits no row at all.
pub(crate) fn donation_counts(records: &[DonationRecord]) -> Vec<CountRow> {
    let mut counts: BTreeMap<&str, u64> = BTreeMap::new();
    for record in positive(records) {
        *counts.entry(record.committee_id.as_str()).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(committee_id, count)| CountRow {
            committee_id: committee_id.to_string(),
            count,
        })
        .collect()
}

/// Net amount donated to each campaign. Refunds stay in on purpose: the
/// total reflects what the campaign actually ended up with.
pub(crate) fn donation_totals(records: &[DonationRecord]) -> Vec<TotalRow> {
    let mut totals: BTreeMap<&str, Decimal> = BTreeMap::new();
    for record in records {
        *totals.entry(record.committee_id.as_str()).or_default() += record.transaction_amount;
    }
    totals
        .into_iter()
        .map(|(committee_id, total_donation)| TotalRow {
            committee_id: committee_id.to_string(),
            total_donation,
        })
        .collect()
}

/// Share of each campaign's donation volume that came from donations under
/// the small-contributor threshold. Refunds are excluded before anything is
/// summed, same policy as [`donation_counts`].
pub(crate) fn small_donation_percentages(records: &[DonationRecord]) -> Vec<PercentageRow> {
    let mut sums: BTreeMap<&str, (Decimal, Decimal)> = BTreeMap::new();
    for record in positive(records) {
        let (small, total) = sums.entry(record.committee_id.as_str()).or_default();
        if record.transaction_amount < SMALL_DONATION_THRESHOLD {
            *small += record.transaction_amount;
        }
        *total += record.transaction_amount;
    }
    sums.into_iter()
        .map(|(committee_id, (small, total))| PercentageRow {
            committee_id: committee_id.to_string(),
            small_donations_percentage: percentage(small, total),
        })
        .collect()
}

/// Raw per-transaction projection handed to the external plotting step.
/// No further filtering: refunds show up in the histogram data too.
pub(crate) fn histogram_rows(records: &[DonationRecord]) -> Vec<HistogramRow<'_>> {
    records.iter().map(HistogramRow::from).collect()
}

fn positive(records: &[DonationRecord]) -> impl Iterator<Item = &DonationRecord> {
    records
        .iter()
        .filter(|r| r.transaction_amount > Decimal::ZERO)
}

/// `100 * small / total`, with `NaN` standing in for the undefined
/// zero-volume case so the division can never abort the run.
fn percentage(small: Decimal, total: Decimal) -> f64 {
    if total.is_zero() {
        return f64::NAN;
    }
    (small * Decimal::ONE_HUNDRED / total)
        .to_f64()
        .unwrap_or(f64::NAN)
}
