use chrono::{DateTime, Duration, LocalResult, NaiveTime, SecondsFormat, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeFilter {
    #[default]
    Today,
    Week,
    Month,
}

impl TimeFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeFilter::Today => "today",
            TimeFilter::Week => "week",
            TimeFilter::Month => "month",
        }
    }
}

/// Inclusive range of unix seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub from: i64,
    pub to: i64,
}

/// Unix seconds of the most recent local midnight in `tz`.
pub fn start_of_day(now: DateTime<Utc>, tz: Tz) -> i64 {
    let local_date = now.with_timezone(&tz).date_naive();
    let midnight = local_date.and_time(NaiveTime::MIN);
    match tz.from_local_datetime(&midnight) {
        LocalResult::Single(dt) => dt.timestamp(),
        LocalResult::Ambiguous(earliest, _) => earliest.timestamp(),
        // Midnight skipped by a DST jump, the day starts one hour later
        LocalResult::None => tz
            .from_local_datetime(&(midnight + Duration::hours(1)))
            .earliest()
            .map(|dt| dt.timestamp())
            .unwrap_or_else(|| now.timestamp()),
    }
}

pub fn calculate_date_range(filter: TimeFilter, now: DateTime<Utc>, tz: Tz) -> DateRange {
    let to = now.timestamp();
    let from = match filter {
        TimeFilter::Today => start_of_day(now, tz),
        TimeFilter::Week => (now - Duration::days(7)).timestamp(),
        TimeFilter::Month => (now - Duration::days(30)).timestamp(),
    };
    DateRange { from, to }
}

pub fn format_local(ts: i64, tz: Tz) -> String {
    match Utc.timestamp_opt(ts, 0) {
        LocalResult::Single(dt) => dt
            .with_timezone(&tz)
            .to_rfc3339_opts(SecondsFormat::Secs, true),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Europe;

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn test_start_of_day() {
        // 23:30 UTC is already the next day in Warsaw (UTC+2 in summer)
        let now = at("2024-07-10T23:30:00Z");
        assert_eq!(
            start_of_day(now, Europe::Warsaw),
            at("2024-07-10T22:00:00Z").timestamp()
        );
        assert_eq!(
            start_of_day(now, chrono_tz::UTC),
            at("2024-07-10T00:00:00Z").timestamp()
        );
    }

    #[test]
    fn test_calculate_date_range() {
        let now = at("2024-01-15T12:00:00Z");
        let tz = Europe::Warsaw;

        let today = calculate_date_range(TimeFilter::Today, now, tz);
        assert_eq!(today.from, at("2024-01-14T23:00:00Z").timestamp());
        assert_eq!(today.to, now.timestamp());

        let week = calculate_date_range(TimeFilter::Week, now, tz);
        assert_eq!(week.to - week.from, 7 * 24 * 3600);

        let month = calculate_date_range(TimeFilter::Month, now, tz);
        assert_eq!(month.to - month.from, 30 * 24 * 3600);
        assert_eq!(month.to, week.to);
    }

    #[test]
    fn test_filter_deserialize() {
        let f: TimeFilter = serde_json::from_str("\"week\"").unwrap();
        assert_eq!(f, TimeFilter::Week);
        assert!(serde_json::from_str::<TimeFilter>("\"year\"").is_err());
        assert_eq!(TimeFilter::default(), TimeFilter::Today);
    }

    #[test]
    fn test_format_local() {
        let ts = at("2024-01-15T12:00:00Z").timestamp();
        assert_eq!(format_local(ts, Europe::Warsaw), "2024-01-15T13:00:00+01:00");
    }
}
