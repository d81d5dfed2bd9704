use crate::error::ReportError;
use chrono::{DateTime, Duration, Utc};

#[derive(Debug, PartialEq, Clone, Copy)]
pub struct TimeRange {
    pub start: chrono::DateTime<Utc>,
    pub end: chrono::DateTime<Utc>,
}

impl TimeRange {
    /// Window of `days` days ending at `now`.
    pub fn lookback(now: DateTime<Utc>, days: i64) -> Result<Self, ReportError> {
        let start = Duration::try_days(days)
            .and_then(|window| now.checked_sub_signed(window))
            .ok_or_else(|| {
                ReportError::Config(format!("lookback of {} days is out of range", days))
            })?;
        Ok(TimeRange { start, end: now })
    }

    pub fn start_timestamp(&self) -> String {
        Self::to_aws_timestamp(&self.start)
    }

    pub fn end_timestamp(&self) -> String {
        Self::to_aws_timestamp(&self.end)
    }

    fn to_aws_timestamp(date_time: &DateTime<Utc>) -> String {
        date_time.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }
}

#[cfg(test)]
mod tests {
    use crate::time_range::TimeRange;
    use chrono::{DateTime, TimeZone, Utc};
    use std::str::FromStr;

    #[test]
    fn test_lookback() {
        let now = DateTime::<Utc>::from_str("2020-12-01T15:00:00.0+00:00").unwrap();

        let time_range = TimeRange::lookback(now, 90).unwrap();
        assert_eq!(
            time_range,
            TimeRange {
                start: Utc::from_utc_datetime(
                    &Utc {},
                    &chrono::NaiveDate::from_ymd(2020, 9, 2).and_hms(15, 0, 0),
                ),
                end: now,
            }
        );
    }

    #[test]
    fn test_timestamps() {
        let now = DateTime::<Utc>::from_str("2021-03-01T08:30:05.0+00:00").unwrap();

        let time_range = TimeRange::lookback(now, 1).unwrap();
        assert_eq!(time_range.start_timestamp(), "2021-02-28T08:30:05Z");
        assert_eq!(time_range.end_timestamp(), "2021-03-01T08:30:05Z");
    }

    #[test]
    fn test_lookback_out_of_range() {
        let now = DateTime::<Utc>::from_str("2021-03-01T08:30:05.0+00:00").unwrap();

        assert!(TimeRange::lookback(now, 1_000_000_000).is_err());
        assert!(TimeRange::lookback(now, i64::MAX).is_err());
    }
}
