use chrono::{Datelike, Duration, NaiveDate};

/// Future order dates on a weekly cadence within `[start, end]`.
///
/// `cadence` holds weekday offsets from Monday (0 = Monday, 6 = Sunday).
/// Returned dates are strictly ascending; an empty result means no cadence
/// slot falls inside the window.
pub fn generate_order_dates(start: NaiveDate, end: NaiveDate, cadence: &[u32]) -> Vec<NaiveDate> {
    if start > end {
        return Vec::new();
    }

    let mut offsets: Vec<i64> = cadence.iter().filter(|&&o| o < 7).map(|&o| o as i64).collect();
    offsets.sort_unstable();
    offsets.dedup();

    let first_monday = start - Duration::days(start.weekday().num_days_from_monday() as i64);
    let mut dates = Vec::new();
    let mut week = 0i64;

    loop {
        let monday = first_monday + Duration::days(7 * week);
        if monday > end {
            break;
        }
        for &offset in &offsets {
            let date = monday + Duration::days(offset);
            if date >= start && date <= end {
                dates.push(date);
            }
        }
        week += 1;
    }

    dates
}
