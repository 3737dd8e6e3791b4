use chrono::{NaiveDate, NaiveTime};

const SEPARATED_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d"];

/// Parse a calendar date from a loosely formatted cell.
///
/// Accepts `YYYY-MM-DD`, `YYYY/MM/DD`, `YYYY.MM.DD`, `YYYYMMDD` and
/// `YYYY年M月D日`. The separated forms may carry a trailing `HH:MM[:SS]`
/// (space or `T` separated), which is validated and then dropped.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim().trim_matches('"').trim();
    if s.is_empty() {
        return None;
    }

    // compact YYYYMMDD
    if s.len() == 8 && s.bytes().all(|b| b.is_ascii_digit()) {
        let year: i32 = s[0..4].parse().ok()?;
        let month: u32 = s[4..6].parse().ok()?;
        let day: u32 = s[6..8].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    if s.contains('年') {
        return NaiveDate::parse_from_str(s, "%Y年%m月%d日").ok();
    }

    let (date_part, time_part) = match s.split_once(|c: char| c == ' ' || c == 'T') {
        Some((d, t)) => (d, Some(t.trim())),
        None => (s, None),
    };
    if let Some(t) = time_part {
        if NaiveTime::parse_from_str(t, "%H:%M:%S").is_err()
            && NaiveTime::parse_from_str(t, "%H:%M").is_err()
        {
            return None;
        }
    }

    SEPARATED_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date_part, fmt).ok())
}
