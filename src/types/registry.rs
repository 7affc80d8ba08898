use super::logical_type::{LogicalType, WireType};
use super::value::Value;

/// How result values are coerced before they reach the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoercionPolicy {
    /// Emit interval columns as a time of day instead of the raw duration
    pub duration_to_time_of_day: bool,
}

impl Default for CoercionPolicy {
    fn default() -> Self {
        Self {
            duration_to_time_of_day: true,
        }
    }
}

/// Maps logical column types to the representation consumers receive.
///
/// Built once per session from its coercion policy and never mutated; a
/// different policy needs a new session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResultTypeRegistry {
    policy: CoercionPolicy,
}

impl ResultTypeRegistry {
    pub fn new(policy: CoercionPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> CoercionPolicy {
        self.policy
    }

    /// Output representation for a logical type
    pub fn resolve(&self, logical_type: LogicalType) -> WireType {
        match logical_type {
            LogicalType::Null => WireType::Null,
            LogicalType::Integer => WireType::Int64,
            LogicalType::Real => WireType::Float64,
            LogicalType::Text => WireType::Utf8,
            LogicalType::Blob => WireType::Binary,
            LogicalType::Interval => {
                if self.policy.duration_to_time_of_day {
                    WireType::Time64Microsecond
                } else {
                    WireType::Interval
                }
            }
        }
    }

    /// Apply the resolved representation to a single cell
    pub fn coerce(&self, logical_type: LogicalType, value: Value) -> Value {
        match (self.resolve(logical_type), value) {
            (WireType::Time64Microsecond, Value::Interval(interval)) => Value::Time64(interval.to_time64()),
            (_, value) => value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Interval;

    #[test]
    fn test_default_policy_casts_durations() {
        let registry = ResultTypeRegistry::default();
        let explicit = ResultTypeRegistry::new(CoercionPolicy { duration_to_time_of_day: true });
        assert_eq!(registry, explicit);
        assert_eq!(registry.resolve(LogicalType::Interval), WireType::Time64Microsecond);
    }

    #[test]
    fn test_disabled_policy_keeps_raw_duration() {
        let registry = ResultTypeRegistry::new(CoercionPolicy { duration_to_time_of_day: false });
        assert_eq!(registry.resolve(LogicalType::Interval), WireType::Interval);

        let raw = Value::Interval(Interval::from_months(3));
        assert_eq!(registry.coerce(LogicalType::Interval, raw.clone()), raw);
    }

    #[test]
    fn test_policy_only_affects_intervals() {
        for policy in [true, false] {
            let registry = ResultTypeRegistry::new(CoercionPolicy { duration_to_time_of_day: policy });
            assert_eq!(registry.resolve(LogicalType::Integer), WireType::Int64);
            assert_eq!(registry.resolve(LogicalType::Real), WireType::Float64);
            assert_eq!(registry.resolve(LogicalType::Text), WireType::Utf8);
            assert_eq!(registry.resolve(LogicalType::Blob), WireType::Binary);
            assert_eq!(registry.resolve(LogicalType::Null), WireType::Null);
        }
    }

    #[test]
    fn test_coerce_interval_to_time_of_day() {
        let registry = ResultTypeRegistry::default();
        let coerced = registry.coerce(LogicalType::Interval, Value::Interval(Interval::from_months(3)));
        assert_eq!(coerced.to_string(), "0,3");

        // Nulls and values that never became intervals pass through
        assert_eq!(registry.coerce(LogicalType::Interval, Value::Null), Value::Null);
        let text = Value::Text("soon".to_string());
        assert_eq!(registry.coerce(LogicalType::Interval, text.clone()), text);
    }
}
