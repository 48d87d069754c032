//! Per-entity cleaning rules.
//!
//! Each function takes a raw frame straight from the extractor and returns
//! the cleaned frame that gets loaded. They do no I/O and share no state,
//! and each one is idempotent: feeding its own output back in returns the
//! same frame.
//!
//! | Entity    | Rules                                                        |
//! |-----------|--------------------------------------------------------------|
//! | Employees | `BirthDate`, `HireDate` to dates; drop `MiddleInitial`       |
//! | Products  | `ModifyDate` to date; `,` to `-` in names; fill and cast     |
//! | Sales     | drop duplicate rows and undated rows; `SalesDate` to date    |
//! | Customers | drop `MiddleInitial`                                         |

pub mod dates;

use crate::error::{EtlError, Result};
use polars::prelude::*;

pub use dates::{parse_date, parse_date_column};

pub const MIDDLE_INITIAL: &str = "MiddleInitial";

pub const CLASS_FALLBACK: &str = "N/A";
pub const UNKNOWN_FALLBACK: &str = "Unknown";

/// Cleans the employees table.
///
/// # Errors
///
/// Fails if `BirthDate` or `HireDate` is missing or holds a value that is not
/// a date.
pub fn transform_employees(df: DataFrame) -> Result<DataFrame> {
    let mut df = df;
    parse_date_column(&mut df, "BirthDate")?;
    parse_date_column(&mut df, "HireDate")?;
    drop_column_if_present(df, MIDDLE_INITIAL)
}

/// Cleans the products table.
///
/// # Errors
///
/// Fails if one of the product columns is missing or `ModifyDate` holds a
/// value that is not a date.
pub fn transform_products(df: DataFrame) -> Result<DataFrame> {
    require_columns(
        &df,
        &[
            "ProductName",
            "CategoryID",
            "Class",
            "Resistant",
            "IsAllergic",
            "VitalityDays",
            "Price",
        ],
    )?;

    let mut df = df;
    parse_date_column(&mut df, "ModifyDate")?;

    let cleaned = df
        .lazy()
        .with_columns([
            col("ProductName")
                .cast(DataType::String)
                .str()
                .replace_all(lit(","), lit("-"), true),
            col("CategoryID")
                .cast(DataType::Int64)
                .fill_null(lit(0i64)),
            text_or(col("Class"), CLASS_FALLBACK),
            text_or(col("Resistant"), UNKNOWN_FALLBACK),
            text_or(col("IsAllergic"), UNKNOWN_FALLBACK),
            integer_or_zero("VitalityDays"),
            col("Price").fill_null(lit(0)),
        ])
        .collect()?;

    Ok(cleaned)
}

/// Cleans the sales table.
///
/// Rows without a `SalesDate` are dropped, then exact duplicates are removed
/// keeping the first occurrence. Duplicates are compared after `SalesDate`
/// and `Quantity` are coerced, so `2020-01-01` and `2020-01-01 00:00:00`
/// count as the same date. Row order is otherwise preserved.
///
/// # Errors
///
/// Fails if `SalesDate` or `Quantity` is missing or a sales date cannot be
/// parsed.
pub fn transform_sales(df: DataFrame) -> Result<DataFrame> {
    require_columns(&df, &["SalesDate", "Quantity"])?;

    let mut df = df;
    parse_date_column(&mut df, "SalesDate")?;

    let cleaned = df
        .lazy()
        .filter(col("SalesDate").is_not_null())
        .with_column(col("Quantity").cast(DataType::Int64))
        .unique_stable(None, UniqueKeepStrategy::First)
        .collect()?;

    Ok(cleaned)
}

/// Cleans the customers table.
pub fn transform_customers(df: DataFrame) -> Result<DataFrame> {
    drop_column_if_present(df, MIDDLE_INITIAL)
}

fn text_or(expr: Expr, fallback: &str) -> Expr {
    expr.cast(DataType::String).fill_null(lit(fallback))
}

/// 2^63, the first float past `i64::MAX`.
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

/// `name` as an `Int64`. Null, NaN, both infinities and values outside the
/// `i64` range become zero.
fn integer_or_zero(name: &str) -> Expr {
    let value = col(name).cast(DataType::Float64);
    let representable = value
        .clone()
        .is_finite()
        .and(value.clone().gt_eq(lit(-I64_BOUND)))
        .and(value.clone().lt(lit(I64_BOUND)));
    when(representable)
        .then(value)
        .otherwise(lit(0.0))
        .cast(DataType::Int64)
        .alias(name)
}

fn drop_column_if_present(df: DataFrame, name: &str) -> Result<DataFrame> {
    if df.get_column_index(name).is_some() {
        Ok(df.drop(name)?)
    } else {
        Ok(df)
    }
}

fn require_columns(df: &DataFrame, names: &[&str]) -> Result<()> {
    match names.iter().find(|n| df.get_column_index(n).is_none()) {
        Some(missing) => Err(EtlError::MissingColumn((*missing).to_owned())),
        None => Ok(()),
    }
}
