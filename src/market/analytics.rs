//! Monthly waste diversion totals

use chrono::{DateTime, Datelike, Months, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Number of months covered by the diversion chart
pub const DIVERSION_MONTHS: u32 = 6;

const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// One chart bucket: streams sold in the month and their combined value (INR)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyDiversion {
    pub month: String,
    pub diverted: u32,
    pub profit: f64,
}

fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// First instant of the oldest bucket; sold listings before it are ignored
pub fn window_start(now: DateTime<Utc>) -> DateTime<Utc> {
    let first = month_start(now.date_naive())
        .checked_sub_months(Months::new(DIVERSION_MONTHS - 1))
        .unwrap_or(now.date_naive());
    Utc.from_utc_datetime(&first.and_hms_opt(0, 0, 0).unwrap_or_default())
}

/// Bucket sold `(created_at, price)` pairs into the current month and the
/// five before it, oldest first
pub fn monthly_diversion<I>(now: DateTime<Utc>, sold: I) -> Vec<MonthlyDiversion>
where
    I: IntoIterator<Item = (DateTime<Utc>, f64)>,
{
    let current = month_start(now.date_naive());
    let months: Vec<NaiveDate> = (0..DIVERSION_MONTHS)
        .rev()
        .filter_map(|back| current.checked_sub_months(Months::new(back)))
        .collect();

    let mut buckets: Vec<MonthlyDiversion> = months
        .iter()
        .map(|m| MonthlyDiversion {
            month: MONTH_NAMES[m.month0() as usize].to_string(),
            diverted: 0,
            profit: 0.0,
        })
        .collect();

    for (created_at, price) in sold {
        let month = month_start(created_at.date_naive());
        if let Some(idx) = months.iter().position(|m| *m == month) {
            buckets[idx].diverted += 1;
            buckets[idx].profit += price;
        }
    }

    buckets
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    #[test]
    fn six_buckets_oldest_first_across_year_boundary() {
        let buckets = monthly_diversion(at(2026, 2, 15), Vec::new());
        let months: Vec<_> = buckets.iter().map(|b| b.month.as_str()).collect();
        assert_eq!(months, vec!["Sep", "Oct", "Nov", "Dec", "Jan", "Feb"]);
        assert!(buckets.iter().all(|b| b.diverted == 0 && b.profit == 0.0));
    }

    #[test]
    fn sales_land_in_their_month() {
        let sold = vec![
            (at(2026, 2, 1), 1000.0),
            (at(2026, 2, 28), 500.0),
            (at(2025, 9, 3), 250.0),
            // a year earlier shares a month name but not the bucket
            (at(2025, 2, 10), 9999.0),
        ];
        let buckets = monthly_diversion(at(2026, 2, 15), sold);

        assert_eq!(buckets[5].diverted, 2);
        assert_eq!(buckets[5].profit, 1500.0);
        assert_eq!(buckets[0].diverted, 1);
        assert_eq!(buckets.iter().map(|b| b.diverted).sum::<u32>(), 3);
    }

    #[test]
    fn window_starts_on_first_of_oldest_month() {
        assert_eq!(
            window_start(at(2026, 2, 15)),
            Utc.with_ymd_and_hms(2025, 9, 1, 0, 0, 0).unwrap()
        );
    }
}
