use chrono::{Datelike, Days, Months, NaiveDate, Weekday};

use crate::error::{FixpointError, FixpointResult};

/// Adds `months` calendar months and steps back one day, so a 12-month
/// contract starting Jan 1 ends Dec 31 of the same year, not Jan 1 of the
/// next one.
pub fn add_months_back_one_day(date: NaiveDate, months: u32) -> FixpointResult<NaiveDate> {
    date.checked_add_months(Months::new(months))
        .and_then(|d| d.checked_sub_days(Days::new(1)))
        .ok_or_else(|| {
            FixpointError::InvalidRange(format!("{} + {} months is out of range", date, months))
        })
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Calendar days from `start` to `end`, both endpoints counted. With
/// `exclude_weekends` Saturdays and Sundays are skipped.
pub fn inclusive_day_count(
    start: NaiveDate,
    end: NaiveDate,
    exclude_weekends: bool,
) -> FixpointResult<i64> {
    if end < start {
        return Err(FixpointError::InvalidRange(format!(
            "End date {} is before start date {}",
            end, start
        )));
    }
    if !exclude_weekends {
        return Ok((end - start).num_days() + 1);
    }
    Ok(start
        .iter_days()
        .take_while(|d| *d <= end)
        .filter(|d| !is_weekend(*d))
        .count() as i64)
}

/// Signed day difference; positive when `to` is in the future of `from`.
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}
