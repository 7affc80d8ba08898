use std::fmt;

/// Logical column types as the engine reports them, independent of how
/// a value is laid out on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalType {
    Null = 0,
    Integer = 1,
    Real = 2,
    Text = 3,
    Blob = 4,
    Interval = 5,
}

impl LogicalType {
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(LogicalType::Null),
            1 => Some(LogicalType::Integer),
            2 => Some(LogicalType::Real),
            3 => Some(LogicalType::Text),
            4 => Some(LogicalType::Blob),
            5 => Some(LogicalType::Interval),
            _ => None,
        }
    }

    pub fn to_tag(&self) -> u8 {
        *self as u8
    }

    pub fn name(&self) -> &'static str {
        match self {
            LogicalType::Null => "null",
            LogicalType::Integer => "integer",
            LogicalType::Real => "real",
            LogicalType::Text => "text",
            LogicalType::Blob => "blob",
            LogicalType::Interval => "interval",
        }
    }

    /// Map a declared column type (as written in CREATE TABLE) to a logical type.
    ///
    /// Follows SQLite's affinity rules, with INTERVAL recognized ahead of them
    /// so that interval columns keep their identity through a table round trip.
    pub fn from_decltype(decltype: &str) -> Option<Self> {
        let upper = decltype.trim().to_uppercase();
        if upper.is_empty() {
            return None;
        }

        // Strip a parameter list such as VARCHAR(255)
        let base = upper.split('(').next().unwrap_or("").trim();

        if base == "INTERVAL" || base == "DURATION" {
            return Some(LogicalType::Interval);
        }
        if base.contains("INT") {
            return Some(LogicalType::Integer);
        }
        if base.contains("CHAR") || base.contains("CLOB") || base.contains("TEXT") {
            return Some(LogicalType::Text);
        }
        if base.contains("BLOB") {
            return Some(LogicalType::Blob);
        }
        if base.contains("REAL") || base.contains("FLOA") || base.contains("DOUB") {
            return Some(LogicalType::Real);
        }

        None
    }
}

impl fmt::Display for LogicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Concrete encodings a column can take on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WireType {
    Null = 0,
    Int64 = 1,
    Float64 = 2,
    Utf8 = 3,
    Binary = 4,
    /// Time of day at microsecond resolution, paired with a calendar month lane
    Time64Microsecond = 5,
    /// Engine-native month/day/microsecond duration
    Interval = 6,
}

impl WireType {
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(WireType::Null),
            1 => Some(WireType::Int64),
            2 => Some(WireType::Float64),
            3 => Some(WireType::Utf8),
            4 => Some(WireType::Binary),
            5 => Some(WireType::Time64Microsecond),
            6 => Some(WireType::Interval),
            _ => None,
        }
    }

    pub fn to_tag(&self) -> u8 {
        *self as u8
    }

    pub fn name(&self) -> &'static str {
        match self {
            WireType::Null => "null",
            WireType::Int64 => "int64",
            WireType::Float64 => "float64",
            WireType::Utf8 => "utf8",
            WireType::Binary => "binary",
            WireType::Time64Microsecond => "time64[us]",
            WireType::Interval => "interval[month_day_micro]",
        }
    }
}

impl fmt::Display for WireType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
