use anyhow::{Result, anyhow};
use chrono::{DateTime, NaiveDate, NaiveTime, SecondsFormat, Utc};

const INPUT_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d.%m.%Y", "%Y%m%d"];

/// Parse a user-typed calendar date in any of the accepted input formats.
pub fn parse_input_date(input: &str) -> Result<NaiveDate> {
    let input = input.trim();
    for format in INPUT_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(input, format) {
            return Ok(date);
        }
    }
    Err(anyhow!("unrecognized date {input:?} (expected YYYY-MM-DD)"))
}

/// Wire format for every date parameter: midnight UTC, ISO-8601.
pub fn to_timestamp(date: NaiveDate) -> String {
    to_datetime(date).to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn to_datetime(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}
