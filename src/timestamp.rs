//! Conversion between filesystem timestamps and ZIP entry timestamps.
//!
//! ZIP stores modification times in MS-DOS format: local date and time with
//! two-second resolution, limited to the years 1980 through 2107. Times are
//! converted here as UTC since the format carries no zone.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use zip::DateTime;

const SECONDS_PER_DAY: u64 = 86_400;

/// Converts a system time to a ZIP timestamp.
///
/// Returns `None` for times outside the representable range, in which case
/// the writer falls back to its default timestamp.
pub(crate) fn to_zip_datetime(time: SystemTime) -> Option<DateTime> {
    let secs = time.duration_since(UNIX_EPOCH).ok()?.as_secs();
    let days = secs / SECONDS_PER_DAY;
    let rem = secs % SECONDS_PER_DAY;

    let (year, month, day) = civil_from_days(days);
    let year = u16::try_from(year).ok()?;

    DateTime::from_date_and_time(
        year,
        month,
        day,
        (rem / 3600) as u8,
        ((rem % 3600) / 60) as u8,
        (rem % 60) as u8,
    )
    .ok()
}

/// Converts a ZIP timestamp back to a system time.
///
/// Returns `None` for stored values that do not name a real calendar date.
pub(crate) fn from_zip_datetime(dt: DateTime) -> Option<SystemTime> {
    if !(1..=12).contains(&dt.month()) || dt.day() == 0 {
        return None;
    }
    let days = days_from_civil(u64::from(dt.year()), dt.month(), dt.day());
    let secs = days * SECONDS_PER_DAY
        + u64::from(dt.hour()) * 3600
        + u64::from(dt.minute()) * 60
        + u64::from(dt.second());
    Some(UNIX_EPOCH + Duration::from_secs(secs))
}

/// Converts a (year, month, day) triple to days since 1970-01-01.
fn days_from_civil(year: u64, month: u8, day: u8) -> u64 {
    let year = year - u64::from(month <= 2);
    let era = year / 400;
    let yoe = year - era * 400;
    let mp = if month > 2 { month - 3 } else { month + 9 };
    let doy = (153 * u64::from(mp) + 2) / 5 + u64::from(day) - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe - 719_468
}

/// Converts days since 1970-01-01 to a (year, month, day) triple.
fn civil_from_days(days: u64) -> (u64, u8, u8) {
    // Shift the epoch to 0000-03-01 so leap days fall at the end of a year.
    let z = days + 719_468;
    let era = z / 146_097;
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u8;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u8;
    let year = yoe + era * 400 + u64::from(month <= 2);
    (year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_civil_from_days() {
        assert_eq!(civil_from_days(0), (1970, 1, 1));
        assert_eq!(civil_from_days(59), (1970, 3, 1));
        assert_eq!(civil_from_days(11_016), (2000, 2, 29));
        assert_eq!(civil_from_days(19_723), (2024, 1, 1));
    }

    #[test]
    fn test_before_dos_epoch_is_rejected() {
        // 1970 predates the MS-DOS epoch of 1980.
        assert!(to_zip_datetime(UNIX_EPOCH).is_none());
    }

    #[test]
    fn test_recent_time_converts() {
        // 2024-01-01 12:34:56 UTC
        let time = UNIX_EPOCH + Duration::from_secs(1_704_112_496);
        let dt = to_zip_datetime(time).unwrap();
        assert_eq!(dt.year(), 2024);
        assert_eq!(dt.month(), 1);
        assert_eq!(dt.day(), 1);
        assert_eq!(dt.hour(), 12);
        assert_eq!(dt.minute(), 34);
    }

    #[test]
    fn test_days_from_civil_inverts() {
        for days in [3_652, 11_016, 19_723, 20_000] {
            let (year, month, day) = civil_from_days(days);
            assert_eq!(days_from_civil(year, month, day), days);
        }
    }

    #[test]
    fn test_zip_datetime_converts_back() {
        // 2024-01-01 12:34:56 UTC
        let time = UNIX_EPOCH + Duration::from_secs(1_704_112_496);
        let dt = to_zip_datetime(time).unwrap();
        assert_eq!(from_zip_datetime(dt), Some(time));
    }
}
