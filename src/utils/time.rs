use chrono::NaiveDateTime;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("can't parse start time {0:?}")]
pub struct TimestampError(pub String);

/// Layouts the activity API is known to use for local start times.
const NAIVE_LAYOUTS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parses an activity start time into a wall-clock date and time. Only the leading
/// `YYYY-MM-DDTHH:MM:SS` part matters: offsets, zone names and other trailing content are ignored,
/// because the archive names follow the time the athlete saw.
pub fn parse_start_time(value: &str) -> Result<NaiveDateTime, TimestampError> {
    let trimmed = value.trim();
    NAIVE_LAYOUTS
        .iter()
        .find_map(|layout| {
            NaiveDateTime::parse_and_remainder(trimmed, layout)
                .ok()
                .map(|(start, _)| start)
        })
        .ok_or_else(|| TimestampError(value.to_string()))
}

/// This is the standard way of converting a start time into the `{date}-{time}` prefix of a
/// canonical file name.
pub fn start_time_to_file_prefix(start: NaiveDateTime) -> String {
    start.format("%Y%m%d-%H%M%S").to_string()
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveTime};

    use super::*;

    fn expected() -> NaiveDateTime {
        NaiveDateTime::new(
            NaiveDate::from_ymd_opt(2023, 7, 4).unwrap(),
            NaiveTime::from_hms_opt(8, 15, 30).unwrap(),
        )
    }

    #[test]
    fn parses_iso_layout() {
        assert_eq!(parse_start_time("2023-07-04T08:15:30").unwrap(), expected());
    }

    #[test]
    fn parses_space_separated_layout_with_fraction() {
        let parsed = parse_start_time("2023-07-04 08:15:30.250").unwrap();
        assert_eq!(start_time_to_file_prefix(parsed), "20230704-081530");
    }

    #[test]
    fn keeps_wall_clock_of_offset_timestamps() {
        assert_eq!(
            parse_start_time("2023-07-04T08:15:30+02:00").unwrap(),
            expected()
        );
    }

    #[test]
    fn ignores_trailing_content() {
        for value in [
            "2023-07-04T08:15:30.000+0000",
            "2023-07-04T08:15:30 GMT",
            "2023-07-04T08:15:30Z[UTC]",
            "2023-07-04 08:15:30Z",
        ] {
            assert_eq!(parse_start_time(value), Ok(expected()), "{value}");
        }
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(
            parse_start_time("yesterday"),
            Err(TimestampError("yesterday".into()))
        );
        assert!(parse_start_time("2023-07-04").is_err());
    }
}
