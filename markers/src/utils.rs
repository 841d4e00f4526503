use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

use crate::constant::{Const, DataError};

pub(crate) fn approx_eq_f64(a: f64, b: f64) -> bool {
    (a - b).abs() <= f64::EPSILON
}

pub fn midpoint(a: DateTime<Utc>, b: DateTime<Utc>) -> DateTime<Utc> {
    a + (b - a) / 2
}

pub(crate) fn days_between(a: DateTime<Utc>, b: DateTime<Utc>) -> f64 {
    (b - a).num_seconds() as f64 / Const::SECONDS_PER_DAY
}

pub(crate) fn interpolate(
    d0: DateTime<Utc>,
    v0: f64,
    d1: DateTime<Utc>,
    v1: f64,
    at: DateTime<Utc>,
) -> f64 {
    let span = (d1 - d0).num_seconds();
    if span == 0 {
        return v0;
    }
    let slope = (v1 - v0) / span as f64;
    v0 + slope * (at - d0).num_seconds() as f64
}

pub fn parse_datetime(value: &str) -> Result<DateTime<Utc>, DataError> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }

    let patterns = [
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y/%m/%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y%m%d%H%M%S%.f",
    ];

    for pattern in patterns {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, pattern) {
            return Ok(DateTime::<Utc>::from_naive_utc_and_offset(dt, Utc));
        }
    }

    for pattern in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(value, pattern) {
            if let Some(dt) = d.and_hms_opt(0, 0, 0) {
                return Ok(DateTime::<Utc>::from_naive_utc_and_offset(dt, Utc));
            }
        }
    }

    Err(DataError::InvalidDatetime(value.to_string()))
}

pub(crate) fn deserialize_opt_datetime<'de, D>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    raw.map(|x| parse_datetime(&x).map_err(serde::de::Error::custom))
        .transpose()
}
