/// Engine-native interval values and their time-of-day coercion
use byteorder::{BigEndian, ByteOrder};
use chrono::NaiveTime;
use std::fmt;

pub const MICROS_PER_SECOND: i64 = 1_000_000;
pub const MICROS_PER_MINUTE: i64 = 60 * MICROS_PER_SECOND;
pub const MICROS_PER_HOUR: i64 = 60 * MICROS_PER_MINUTE;
pub const MICROS_PER_DAY: i64 = 24 * MICROS_PER_HOUR;
pub const DAYS_PER_MONTH: i64 = 30;

/// Size of the engine blob: 8 bytes microseconds + 4 bytes days + 4 bytes months
pub const INTERVAL_BLOB_LEN: usize = 16;

/// A calendar-aware duration, kept as three independent lanes so that
/// "1 month" and "30 days" stay distinguishable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Interval {
    pub months: i32,
    pub days: i32,
    pub micros: i64,
}

/// Time-of-day value at microsecond resolution with the calendar month
/// lane of the interval it was derived from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Time64 {
    /// Microseconds since midnight, always in `0..MICROS_PER_DAY`
    pub micros: i64,
    pub months: i32,
}

impl Interval {
    pub fn new(months: i32, days: i32, micros: i64) -> Self {
        Self { months, days, micros }
    }

    pub fn from_months(months: i32) -> Self {
        Self::new(months, 0, 0)
    }

    pub fn from_days(days: i32) -> Self {
        Self::new(0, days, 0)
    }

    pub fn from_micros(micros: i64) -> Self {
        Self::new(0, 0, micros)
    }

    pub fn is_zero(&self) -> bool {
        self.months == 0 && self.days == 0 && self.micros == 0
    }

    /// Encode in the PostgreSQL binary interval layout
    pub fn to_bytes(&self) -> [u8; INTERVAL_BLOB_LEN] {
        let mut buf = [0u8; INTERVAL_BLOB_LEN];
        BigEndian::write_i64(&mut buf[0..8], self.micros);
        BigEndian::write_i32(&mut buf[8..12], self.days);
        BigEndian::write_i32(&mut buf[12..16], self.months);
        buf
    }

    /// Decode an interval blob; anything that is not exactly 16 bytes is rejected
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != INTERVAL_BLOB_LEN {
            return None;
        }
        Some(Self {
            micros: BigEndian::read_i64(&bytes[0..8]),
            days: BigEndian::read_i32(&bytes[8..12]),
            months: BigEndian::read_i32(&bytes[12..16]),
        })
    }

    /// Normalize to a time of day.
    ///
    /// The sub-day lane is the whole-day and microsecond lanes taken modulo one
    /// day; whole days vanish, the month lane is carried through untouched.
    pub fn to_time64(&self) -> Time64 {
        let day_micros = (self.days as i128) * (MICROS_PER_DAY as i128) + self.micros as i128;
        let micros = day_micros.rem_euclid(MICROS_PER_DAY as i128) as i64;
        Time64 {
            micros,
            months: self.months,
        }
    }

    pub fn checked_add(&self, other: &Interval) -> Option<Interval> {
        Some(Interval {
            months: self.months.checked_add(other.months)?,
            days: self.days.checked_add(other.days)?,
            micros: self.micros.checked_add(other.micros)?,
        })
    }

    /// Parse a PostgreSQL-style interval string such as `3 months`,
    /// `1 day 02:30:00` or `-1 year 2 mons`
    pub fn parse(input: &str) -> Option<Interval> {
        let tokens: Vec<&str> = input.split_whitespace().collect();
        if tokens.is_empty() {
            return None;
        }

        let mut result = Interval::default();
        let mut i = 0;
        while i < tokens.len() {
            let token = tokens[i];

            if token.contains(':') {
                let micros = parse_clock(token)?;
                result = result.checked_add(&Interval::from_micros(micros))?;
                i += 1;
                continue;
            }

            let value: f64 = token.parse().ok()?;
            let unit = tokens.get(i + 1)?;
            result = result.checked_add(&Interval::from_quantity(value, unit)?)?;
            i += 2;
        }

        Some(result)
    }

    /// Build an interval from a single quantity and unit keyword, e.g. `3` and `MONTH`.
    ///
    /// Fractions cascade into the next finer lane: fractional years into
    /// months, fractional months into 30-day days, fractional days into
    /// microseconds.
    pub fn from_quantity(value: f64, unit: &str) -> Option<Interval> {
        if !value.is_finite() {
            return None;
        }

        let unit = unit.to_lowercase();
        match unit.as_str() {
            "year" | "years" | "yr" | "yrs" | "y" => {
                let months = (value * 12.0).trunc();
                Some(Interval::new(to_i32(months)?, 0, 0))
            }
            "month" | "months" | "mon" | "mons" => {
                let whole = value.trunc();
                let days = (value - whole) * DAYS_PER_MONTH as f64;
                let whole_days = days.trunc();
                let micros = ((days - whole_days) * MICROS_PER_DAY as f64).round();
                Some(Interval::new(to_i32(whole)?, to_i32(whole_days)?, to_i64(micros)?))
            }
            "week" | "weeks" | "w" => Interval::from_quantity(value * 7.0, "day"),
            "day" | "days" | "d" => {
                let whole = value.trunc();
                let micros = ((value - whole) * MICROS_PER_DAY as f64).round();
                Some(Interval::new(0, to_i32(whole)?, to_i64(micros)?))
            }
            "hour" | "hours" | "hr" | "hrs" | "h" => scaled(value, MICROS_PER_HOUR),
            "minute" | "minutes" | "min" | "mins" | "m" => scaled(value, MICROS_PER_MINUTE),
            "second" | "seconds" | "sec" | "secs" | "s" => scaled(value, MICROS_PER_SECOND),
            "millisecond" | "milliseconds" | "ms" => scaled(value, 1_000),
            "microsecond" | "microseconds" | "us" => scaled(value, 1),
            _ => None,
        }
    }
}

fn scaled(value: f64, unit_micros: i64) -> Option<Interval> {
    to_i64((value * unit_micros as f64).round()).map(Interval::from_micros)
}

fn to_i32(value: f64) -> Option<i32> {
    if value >= i32::MIN as f64 && value <= i32::MAX as f64 {
        Some(value as i32)
    } else {
        None
    }
}

fn to_i64(value: f64) -> Option<i64> {
    // i64::MAX is not exactly representable; stay strictly below 2^63
    if value >= -9.223_372_036_854_776e18 && value < 9.223_372_036_854_776e18 {
        Some(value as i64)
    } else {
        None
    }
}

/// Parse `[-]HH:MM[:SS[.ffffff]]` into microseconds
fn parse_clock(token: &str) -> Option<i64> {
    let (negative, body) = match token.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, token),
    };

    let parts: Vec<&str> = body.split(':').collect();
    if parts.len() < 2 || parts.len() > 3 {
        return None;
    }

    let hours: i64 = parts[0].parse().ok()?;
    let minutes: i64 = parts[1].parse().ok()?;
    let seconds: f64 = match parts.get(2) {
        Some(s) => s.parse().ok()?,
        None => 0.0,
    };
    if !(0..60).contains(&minutes) || !(0.0..60.0).contains(&seconds) {
        return None;
    }

    let micros = hours.checked_mul(MICROS_PER_HOUR)?
        .checked_add(minutes * MICROS_PER_MINUTE)?
        .checked_add((seconds * MICROS_PER_SECOND as f64).round() as i64)?;

    Some(if negative { -micros } else { micros })
}

impl fmt::Display for Interval {
    /// Renders in PostgreSQL's `postgres` IntervalStyle
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return f.write_str("00:00:00");
        }

        let mut parts: Vec<String> = Vec::new();
        let years = self.months / 12;
        let months = self.months % 12;
        if years != 0 {
            parts.push(format!("{} year{}", years, if years.unsigned_abs() == 1 { "" } else { "s" }));
        }
        if months != 0 {
            parts.push(format!("{} mon{}", months, if months.unsigned_abs() == 1 { "" } else { "s" }));
        }
        if self.days != 0 {
            parts.push(format!("{} day{}", self.days, if self.days.unsigned_abs() == 1 { "" } else { "s" }));
        }
        if self.micros != 0 {
            let sign = if self.micros < 0 { "-" } else { "" };
            let abs = self.micros.unsigned_abs();
            let hours = abs / MICROS_PER_HOUR as u64;
            let minutes = (abs % MICROS_PER_HOUR as u64) / MICROS_PER_MINUTE as u64;
            let seconds = (abs % MICROS_PER_MINUTE as u64) / MICROS_PER_SECOND as u64;
            let fraction = abs % MICROS_PER_SECOND as u64;
            if fraction == 0 {
                parts.push(format!("{sign}{hours:02}:{minutes:02}:{seconds:02}"));
            } else {
                parts.push(format!("{sign}{hours:02}:{minutes:02}:{seconds:02}.{fraction:06}"));
            }
        }

        f.write_str(&parts.join(" "))
    }
}

impl Time64 {
    /// The time-of-day lane as a chrono time
    pub fn to_naive_time(&self) -> Option<NaiveTime> {
        let secs = (self.micros / MICROS_PER_SECOND) as u32;
        let nanos = ((self.micros % MICROS_PER_SECOND) * 1_000) as u32;
        NaiveTime::from_num_seconds_from_midnight_opt(secs, nanos)
    }
}

impl fmt::Display for Time64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.micros, self.months)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_three_months_coerces_to_zero_time() {
        let interval = Interval::from_months(3);
        let time = interval.to_time64();
        assert_eq!(time, Time64 { micros: 0, months: 3 });
        assert_eq!(time.to_string(), "0,3");
    }

    #[test]
    fn test_time_of_day_wraps_whole_days() {
        let interval = Interval::new(0, 2, 90 * MICROS_PER_MINUTE);
        assert_eq!(interval.to_time64().micros, 90 * MICROS_PER_MINUTE);

        let interval = Interval::from_micros(25 * MICROS_PER_HOUR);
        assert_eq!(interval.to_time64().micros, MICROS_PER_HOUR);

        // Negative sub-day lanes land inside the day, not before midnight
        let interval = Interval::from_micros(-MICROS_PER_HOUR);
        assert_eq!(interval.to_time64().micros, 23 * MICROS_PER_HOUR);
    }

    #[test]
    fn test_blob_layout() {
        let interval = Interval::new(3, 1, 95_400_000_000);
        let bytes = interval.to_bytes();
        assert_eq!(&bytes[0..8], &95_400_000_000i64.to_be_bytes());
        assert_eq!(&bytes[8..12], &1i32.to_be_bytes());
        assert_eq!(&bytes[12..16], &3i32.to_be_bytes());
        assert_eq!(Interval::from_bytes(&bytes), Some(interval));
        assert_eq!(Interval::from_bytes(&bytes[..15]), None);
    }

    #[test]
    fn test_parse_interval_strings() {
        assert_eq!(Interval::parse("3 months"), Some(Interval::from_months(3)));
        assert_eq!(Interval::parse("1 year 2 mons"), Some(Interval::from_months(14)));
        assert_eq!(Interval::parse("1 week"), Some(Interval::from_days(7)));
        assert_eq!(
            Interval::parse("1 day 02:30:00"),
            Some(Interval::new(0, 1, 2 * MICROS_PER_HOUR + 30 * MICROS_PER_MINUTE))
        );
        assert_eq!(Interval::parse("1.5 seconds"), Some(Interval::from_micros(1_500_000)));
        assert_eq!(Interval::parse("1.5 months"), Some(Interval::new(1, 15, 0)));
        assert_eq!(Interval::parse("-2 hours"), Some(Interval::from_micros(-2 * MICROS_PER_HOUR)));
        assert_eq!(Interval::parse("3 fortnights"), None);
        assert_eq!(Interval::parse("3"), None);
        assert_eq!(Interval::parse(""), None);
    }

    #[test]
    fn test_display_postgres_style() {
        assert_eq!(Interval::from_months(3).to_string(), "3 mons");
        assert_eq!(Interval::from_months(13).to_string(), "1 year 1 mon");
        assert_eq!(Interval::new(0, 1, 95_400_000_000 - MICROS_PER_DAY).to_string(), "1 day 02:30:00");
        assert_eq!(Interval::default().to_string(), "00:00:00");
    }

    #[test]
    fn test_display_extreme_lanes() {
        assert_eq!(Interval::from_days(i32::MIN).to_string(), "-2147483648 days");
        assert_eq!(Interval::from_months(i32::MIN).to_string(), "-178956970 years -8 mons");
        assert_eq!(Interval::from_micros(i64::MIN).to_string(), "-2562047788:00:54.775808");
    }

    #[test]
    fn test_naive_time() {
        let time = Interval::from_micros(13 * MICROS_PER_HOUR + 5).to_time64();
        let naive = time.to_naive_time().unwrap();
        assert_eq!(naive.format("%H:%M:%S%.6f").to_string(), "13:00:00.000005");
    }
}
