use crate::error::{EtlError, Result};
use chrono::{DateTime, Datelike as _, NaiveDate, NaiveDateTime};
use polars::prelude::*;

/// Day number of 1970-01-01 counted from 0001-01-01, the origin Polars
/// `Date` values are relative to.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

const DATETIME_FORMATS: [&str; 5] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
];

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"];

/// Parses a date or date-time string, discarding any time of day.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.date_naive());
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|dt| dt.date())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        })
}

fn days_since_epoch(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE
}

/// Replaces column `name` with its calendar-date form.
///
/// `Date` columns are left alone and `Datetime` columns are truncated, so
/// converting an already converted frame changes nothing.
pub fn parse_date_column(df: &mut DataFrame, name: &str) -> Result<()> {
    let parsed = {
        let series = df
            .column(name)
            .map_err(|_| EtlError::MissingColumn(name.to_owned()))?
            .as_materialized_series();

        match series.dtype() {
            DataType::Date => None,
            DataType::Datetime(_, _) | DataType::Null => Some(series.cast(&DataType::Date)?),
            DataType::String => Some(parse_string_dates(series)?),
            other => {
                return Err(EtlError::DataProcessing(format!(
                    "column {name} has type {other}, expected date strings"
                )));
            }
        }
    };

    if let Some(parsed) = parsed {
        df.with_column(parsed)?;
    }
    Ok(())
}

fn parse_string_dates(series: &Series) -> Result<Series> {
    let values = series.str()?;
    let mut days: Vec<Option<i32>> = Vec::with_capacity(values.len());

    for value in values {
        let day = match value {
            Some(raw) if !raw.trim().is_empty() => {
                let date = parse_date(raw).ok_or_else(|| {
                    EtlError::DataProcessing(format!(
                        "column {}: cannot parse '{raw}' as a date",
                        series.name()
                    ))
                })?;
                Some(days_since_epoch(date))
            }
            _ => None,
        };
        days.push(day);
    }

    Ok(Series::new(series.name().clone(), days).cast(&DataType::Date)?)
}
