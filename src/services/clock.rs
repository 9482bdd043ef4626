use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

/// Resolve an IANA timezone name, falling back to `fallback` and then UTC.
pub fn resolve_timezone(name: &str, fallback: &str) -> Tz {
    let name = name.trim();
    if !name.is_empty() {
        match name.parse::<Tz>() {
            Ok(tz) => return tz,
            Err(_) => tracing::warn!("Unknown timezone {:?}, using {:?}", name, fallback),
        }
    }

    fallback.trim().parse::<Tz>().unwrap_or_else(|_| {
        tracing::warn!("Unknown default timezone {:?}, using UTC", fallback);
        Tz::UTC
    })
}

pub fn is_valid_timezone(name: &str) -> bool {
    name.trim().parse::<Tz>().is_ok()
}

pub fn local_time(now: DateTime<Utc>, tz: Tz) -> DateTime<Tz> {
    now.with_timezone(&tz)
}

/// The calendar day `now` falls on in `tz`
pub fn local_date(now: DateTime<Utc>, tz: Tz) -> NaiveDate {
    local_time(now, tz).date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_resolve_timezone_prefers_player_choice() {
        assert_eq!(resolve_timezone("Pacific/Auckland", "UTC"), chrono_tz::Pacific::Auckland);
    }

    #[test]
    fn test_resolve_timezone_falls_back_twice() {
        assert_eq!(resolve_timezone("Mars/Olympus", "Europe/Berlin"), chrono_tz::Europe::Berlin);
        assert_eq!(resolve_timezone("", "Nowhere/Special"), Tz::UTC);
    }

    #[test]
    fn test_local_date_crosses_midnight() {
        let now = Utc.with_ymd_and_hms(2026, 2, 20, 11, 5, 0).unwrap();
        let auckland = resolve_timezone("Pacific/Auckland", "UTC");
        assert_eq!(local_date(now, auckland), NaiveDate::from_ymd_opt(2026, 2, 21).unwrap());
        assert_eq!(local_date(now, Tz::UTC), NaiveDate::from_ymd_opt(2026, 2, 20).unwrap());
    }
}
