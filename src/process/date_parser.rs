use chrono::{DateTime, NaiveDate, NaiveDateTime};

use super::utils::clean_str;

/// Day-only layouts, tried in order. Slash and dash day-first forms follow
/// the Brazilian convention of the source spreadsheets.
const DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y"];

/// Layouts carrying a time of day; only the calendar day is kept.
const DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
];

/// Parse a closing-date cell into a calendar day, or `None`.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = clean_str(raw);
    if s.is_empty() {
        return None;
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(&s, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(&s, fmt).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| DateTime::parse_from_rfc3339(&s).ok().map(|dt| dt.date_naive()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_day_layouts() {
        assert_eq!(parse_date("2024-03-15"), Some(day(2024, 3, 15)));
        assert_eq!(parse_date("2024/03/15"), Some(day(2024, 3, 15)));
        assert_eq!(parse_date("15/03/2024"), Some(day(2024, 3, 15)));
        assert_eq!(parse_date("15-03-2024"), Some(day(2024, 3, 15)));
        assert_eq!(parse_date(" \"2024-03-15\" "), Some(day(2024, 3, 15)));
    }

    #[test]
    fn day_first_for_ambiguous_slashes() {
        assert_eq!(parse_date("01/02/2024"), Some(day(2024, 2, 1)));
    }

    #[test]
    fn keeps_only_the_day_of_timestamps() {
        assert_eq!(parse_date("2024-03-15 13:45:00"), Some(day(2024, 3, 15)));
        assert_eq!(parse_date("2024-03-15T13:45:00"), Some(day(2024, 3, 15)));
        assert_eq!(parse_date("2024/03/15 00:00:00"), Some(day(2024, 3, 15)));
        assert_eq!(parse_date("2024-03-15T13:45:00-03:00"), Some(day(2024, 3, 15)));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("soon"), None);
        assert_eq!(parse_date("2024-13-40"), None);
        assert_eq!(parse_date("45000"), None);
    }
}
