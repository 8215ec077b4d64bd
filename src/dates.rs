use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, Timelike};
use thiserror::Error;

const DAYS: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Reports are published in New Zealand time. The offset is fixed and does
/// not follow daylight saving.
const REPORT_OFFSET_SECS: i32 = 12 * 3600;

#[derive(Debug, Error, PartialEq)]
pub enum DateError {
    #[error("malformed date {0:?}")]
    Malformed(String),
}

/// `Saturday 2 June 2018`
pub fn long_date<D: Datelike>(date: &D) -> String {
    let day = DAYS[date.weekday().num_days_from_sunday() as usize];
    let month = MONTHS[date.month0() as usize];
    format!("{day} {} {month} {}", date.day(), date.year())
}

/// `12:20am, Saturday 2 June 2018`
pub fn time_and_date<T: Datelike + Timelike>(time: &T) -> String {
    let hour = match time.hour() % 12 {
        0 => 12,
        h => h,
    };
    let suffix = if time.hour() >= 12 { "pm" } else { "am" };
    format!("{hour}:{:02}{suffix}, {}", time.minute(), long_date(time))
}

/// Build the report timestamp from the extracted `"<date> <time> "` text.
///
/// Only the minute precision `YYYY-MM-DDTHH:MM` is kept, and the report
/// offset is attached.
pub fn parse_update_time(raw: &str) -> Result<DateTime<FixedOffset>, DateError> {
    let malformed = || DateError::Malformed(raw.to_string());
    let joined = raw.trim().replacen(' ', "T", 1);
    let minutes = joined.get(..16).ok_or_else(malformed)?;
    let naive =
        NaiveDateTime::parse_from_str(minutes, "%Y-%m-%dT%H:%M").map_err(|_| malformed())?;
    let offset = FixedOffset::east_opt(REPORT_OFFSET_SECS).ok_or_else(malformed)?;
    naive
        .and_local_timezone(offset)
        .single()
        .ok_or_else(malformed)
}

/// Read the leading `YYYY-MM-DD` of a date field.
pub fn parse_day(raw: &str) -> Result<NaiveDate, DateError> {
    let malformed = || DateError::Malformed(raw.to_string());
    let day = raw.trim().get(..10).ok_or_else(malformed)?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(|_| malformed())
}

#[test]
fn test_long_date() {
    let date = NaiveDate::from_ymd_opt(2018, 6, 2).unwrap();
    assert_eq!(long_date(&date), "Saturday 2 June 2018");
    let date = NaiveDate::from_ymd_opt(2017, 1, 1).unwrap();
    assert_eq!(long_date(&date), "Sunday 1 January 2017");
    let date = NaiveDate::from_ymd_opt(2018, 12, 31).unwrap();
    assert_eq!(long_date(&date), "Monday 31 December 2018");
}

#[test]
fn test_time_and_date() {
    let date = NaiveDate::from_ymd_opt(2018, 6, 2).unwrap();
    let midnight = date.and_hms_opt(0, 20, 0).unwrap();
    assert_eq!(time_and_date(&midnight), "12:20am, Saturday 2 June 2018");
    let afternoon = date.and_hms_opt(13, 5, 0).unwrap();
    assert_eq!(time_and_date(&afternoon), "1:05pm, Saturday 2 June 2018");
    let noon = date.and_hms_opt(12, 0, 0).unwrap();
    assert_eq!(time_and_date(&noon), "12:00pm, Saturday 2 June 2018");
    let morning = date.and_hms_opt(11, 59, 0).unwrap();
    assert_eq!(time_and_date(&morning), "11:59am, Saturday 2 June 2018");
}

#[test]
fn test_parse_update_time() {
    let time = parse_update_time("2018-06-02 00:20:37 ").unwrap();
    assert_eq!(time.offset().local_minus_utc(), REPORT_OFFSET_SECS);
    assert_eq!(time_and_date(&time), "12:20am, Saturday 2 June 2018");
    assert_eq!(time.to_rfc3339(), "2018-06-02T00:20:00+12:00");
}

#[test]
fn test_parse_update_time_rejects_garbage() {
    assert!(parse_update_time("").is_err());
    assert!(parse_update_time("yesterday ").is_err());
    assert!(parse_update_time("2018-06-02 ").is_err());
}

#[test]
fn test_parse_day() {
    let day = parse_day("2018-06-02T09:00:00 ").unwrap();
    assert_eq!(long_date(&day), "Saturday 2 June 2018");
    assert_eq!(
        parse_day("soon"),
        Err(DateError::Malformed("soon".to_string()))
    );
}
