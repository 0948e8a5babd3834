use time::{format_description::FormatItem, macros::format_description, Date, OffsetDateTime};

const ISO_DATE: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Parses a calendar date in `YYYY-MM-DD` form.
pub fn parse_date(raw: &str) -> Option<Date> {
    Date::parse(raw.trim(), ISO_DATE).ok()
}

pub fn format_date(date: Date) -> String {
    date.format(ISO_DATE)
        .unwrap_or_else(|_| format!("{:04}-{:02}-{:02}", date.year(), u8::from(date.month()), date.day()))
}

/// Current calendar day in the server's local offset, UTC when the offset is unknown.
pub fn today() -> Date {
    OffsetDateTime::now_local()
        .unwrap_or_else(|_| OffsetDateTime::now_utc())
        .date()
}

/// Resolves an optional client date to canonical `YYYY-MM-DD`, today when absent.
pub fn normalize_date(raw: Option<&str>) -> Option<String> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Some(format_date(today())),
        Some(s) => parse_date(s).map(format_date),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn parses_iso_dates() {
        assert_eq!(parse_date("2024-03-01"), Some(date!(2024 - 03 - 01)));
        assert_eq!(parse_date(" 2024-12-31 "), Some(date!(2024 - 12 - 31)));
    }

    #[test]
    fn rejects_malformed_dates() {
        assert_eq!(parse_date("2024/03/01"), None);
        assert_eq!(parse_date("2024-02-30"), None);
        assert_eq!(parse_date("yesterday"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn formats_with_zero_padding() {
        assert_eq!(format_date(date!(2024 - 03 - 01)), "2024-03-01");
    }

    #[test]
    fn normalize_defaults_to_today() {
        assert_eq!(normalize_date(None), Some(format_date(today())));
        assert_eq!(normalize_date(Some("")), Some(format_date(today())));
        assert_eq!(normalize_date(Some("2024-03-02")).as_deref(), Some("2024-03-02"));
        assert_eq!(normalize_date(Some("03/02/2024")), None);
    }
}
