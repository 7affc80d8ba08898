use rusqlite::{Connection, Result, Error};
use rusqlite::functions::{Context, FunctionFlags};
use rusqlite::types::ValueRef;
use crate::types::Interval;

/// Register interval-related functions in SQLite
pub fn register_interval_functions(conn: &Connection) -> Result<()> {
    // make_interval(months, days, micros) - Build the engine-native interval blob
    conn.create_scalar_function(
        "make_interval",
        3,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let months: i32 = ctx.get(0)?;
            let days: i32 = ctx.get(1)?;
            let micros: i64 = ctx.get(2)?;
            Ok(Interval::new(months, days, micros).to_bytes().to_vec())
        },
    )?;

    conn.create_scalar_function(
        "interval_months",
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| Ok(interval_arg(ctx, 0)?.map(|i| i.months as i64)),
    )?;

    conn.create_scalar_function(
        "interval_days",
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| Ok(interval_arg(ctx, 0)?.map(|i| i.days as i64)),
    )?;

    conn.create_scalar_function(
        "interval_micros",
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| Ok(interval_arg(ctx, 0)?.map(|i| i.micros)),
    )?;

    // interval_add(a, b) - Lane-wise sum, NULL if either side is NULL
    conn.create_scalar_function(
        "interval_add",
        2,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let (Some(a), Some(b)) = (interval_arg(ctx, 0)?, interval_arg(ctx, 1)?) else {
                return Ok(None);
            };
            let sum = a.checked_add(&b)
                .ok_or_else(|| Error::UserFunctionError("interval out of range".into()))?;
            Ok(Some(sum.to_bytes().to_vec()))
        },
    )?;

    // interval_text(blob) - Render in PostgreSQL interval style
    conn.create_scalar_function(
        "interval_text",
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| Ok(interval_arg(ctx, 0)?.map(|i| i.to_string())),
    )?;

    Ok(())
}

/// Read an interval argument: a 16-byte blob, integer microseconds or interval text
fn interval_arg(ctx: &Context<'_>, idx: usize) -> Result<Option<Interval>> {
    match ctx.get_raw(idx) {
        ValueRef::Null => Ok(None),
        ValueRef::Blob(b) => Interval::from_bytes(b)
            .map(Some)
            .ok_or_else(|| Error::UserFunctionError(format!("expected a {}-byte interval, got {} bytes", crate::types::interval::INTERVAL_BLOB_LEN, b.len()).into())),
        ValueRef::Integer(i) => Ok(Some(Interval::from_micros(i))),
        ValueRef::Text(s) => {
            let text = std::str::from_utf8(s)
                .map_err(|e| Error::UserFunctionError(e.to_string().into()))?;
            Interval::parse(text)
                .map(Some)
                .ok_or_else(|| Error::UserFunctionError(format!("invalid interval: {text}").into()))
        }
        ValueRef::Real(_) => Err(Error::UserFunctionError("expected an interval".into())),
    }
}
