use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Duration, PrimitiveDateTime, Time};

use super::error::TimestampError;

/// EPIC writes its Date column day-first. The separator is not consistent
/// between log flavors, so all three observed variants are accepted.
const SLASH_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[day]/[month]/[year] [hour]:[minute]:[second]");
const DOT_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[day].[month].[year] [hour]:[minute]:[second]");
const DASH_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[day]-[month]-[year] [hour]:[minute]:[second]");

/// Format used for report lines and spreadsheet cells
const OUTPUT_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

/// Parse one Date field from an EPIC log, day-first.
///
/// Timestamps without a seconds field occur in older logs; they are
/// normalized to :00 before parsing.
pub fn parse_timestamp(raw: &str) -> Result<PrimitiveDateTime, TimestampError> {
    let trimmed = raw.trim();
    let mut candidate = String::from(trimmed);
    if candidate.matches(':').count() == 1 {
        candidate.push_str(":00");
    }
    for format in [SLASH_FORMAT, DOT_FORMAT, DASH_FORMAT] {
        if let Ok(stamp) = PrimitiveDateTime::parse(&candidate, format) {
            return Ok(stamp);
        }
    }
    Err(TimestampError::BadTimestamp(trimmed.to_string()))
}

/// Render a timestamp for report lines and exported cells.
pub fn format_timestamp(stamp: &PrimitiveDateTime) -> String {
    stamp
        .format(OUTPUT_FORMAT)
        .unwrap_or_else(|_| stamp.to_string())
}

/// Parse a resampling period string in the notation the EPIC operators use:
/// a positive integer followed by S (seconds), T (minutes), H (hours) or
/// D (days), e.g. "30S" or "3T".
pub fn parse_period(raw: &str) -> Result<Duration, TimestampError> {
    let trimmed = raw.trim();
    let split = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .ok_or_else(|| TimestampError::BadPeriod(trimmed.to_string()))?;
    let (digits, unit) = trimmed.split_at(split);
    let count: i64 = digits
        .parse()
        .map_err(|_| TimestampError::BadPeriod(trimmed.to_string()))?;
    if count < 1 {
        return Err(TimestampError::BadPeriod(trimmed.to_string()));
    }
    match unit.trim().to_ascii_uppercase().as_str() {
        "S" => Ok(Duration::seconds(count)),
        "T" | "MIN" => Ok(Duration::minutes(count)),
        "H" => Ok(Duration::hours(count)),
        "D" => Ok(Duration::days(count)),
        _ => Err(TimestampError::BadPeriod(trimmed.to_string())),
    }
}

/// Floor a timestamp to the start of its aggregation bucket.
///
/// Sub-day periods are anchored at midnight of the timestamp's own day,
/// day-or-longer periods at midnight itself. All EPIC batches cover a single
/// date folder, so multi-day alignment is irrelevant.
pub fn floor_to_period(stamp: PrimitiveDateTime, period: Duration) -> PrimitiveDateTime {
    let midnight = PrimitiveDateTime::new(stamp.date(), Time::MIDNIGHT);
    let period_secs = period.whole_seconds().max(1);
    if period_secs >= Duration::days(1).whole_seconds() {
        return midnight;
    }
    let day_secs = stamp.time().hour() as i64 * 3600
        + stamp.time().minute() as i64 * 60
        + stamp.time().second() as i64;
    midnight + Duration::seconds((day_secs / period_secs) * period_secs)
}
