//! `limit` argument policy.
//!
//! Every layer that accepts a `limit` resolves it through one
//! [`LimitPolicy`]; the layers differ only in the parameters they pass.

use serde_json::Value;

/// Default number of items when the caller gives none (or nonsense).
pub const DEFAULT_LIMIT: usize = 10;

/// Upper bound applied by the agent-facing layers and the JSON API source.
pub const MAX_LIMIT: usize = 50;

/// What a non-positive `limit` turns into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NonPositive {
    /// Fall back to the policy's default.
    Default,
    /// Raise to one item.
    Floor,
}

/// How a raw `limit` value turns into an item count.
///
/// Coercion failure always means "use the default". A non-positive value
/// follows [`NonPositive`]; it never means "return nothing".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimitPolicy {
    pub default: usize,
    pub max: Option<usize>,
    pub non_positive: NonPositive,
}

impl LimitPolicy {
    /// Tool handlers: default on failure or `<= 0`, no upper bound.
    pub const HANDLER: LimitPolicy = LimitPolicy {
        default: DEFAULT_LIMIT,
        max: None,
        non_positive: NonPositive::Default,
    };

    /// Agent-tool server and HTTP API: clamped into `[1, 50]`.
    pub const AGENT: LimitPolicy = LimitPolicy {
        default: DEFAULT_LIMIT,
        max: Some(MAX_LIMIT),
        non_positive: NonPositive::Floor,
    };

    /// The JSON API source clamps independently before the request.
    pub const API: LimitPolicy = LimitPolicy {
        default: DEFAULT_LIMIT,
        max: Some(MAX_LIMIT),
        non_positive: NonPositive::Default,
    };

    /// HTML sources only truncate what the page gave them.
    pub const PAGE: LimitPolicy = LimitPolicy {
        default: DEFAULT_LIMIT,
        max: None,
        non_positive: NonPositive::Default,
    };

    /// Resolve an optional JSON argument (as found in a tool's params map).
    pub fn resolve(&self, raw: Option<&Value>) -> usize {
        match raw.and_then(coerce_int) {
            Some(n) => self.clamp(n),
            None => self.default,
        }
    }

    /// Apply the non-positive rule and the upper bound.
    pub fn clamp(&self, n: i64) -> usize {
        if n <= 0 {
            return match self.non_positive {
                NonPositive::Default => self.default,
                NonPositive::Floor => 1,
            };
        }
        let n = usize::try_from(n).unwrap_or(usize::MAX);
        match self.max {
            Some(max) => n.min(max),
            None => n,
        }
    }
}

/// Lenient integer coercion: integers, floats (truncated), and numeric
/// strings. Anything else is a coercion failure.
pub fn coerce_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_u64().map(|u| i64::try_from(u).unwrap_or(i64::MAX)))
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_limit_uses_default() {
        assert_eq!(LimitPolicy::HANDLER.resolve(None), 10);
        assert_eq!(LimitPolicy::AGENT.resolve(None), 10);
    }

    #[test]
    fn test_non_positive_limit_uses_default() {
        assert_eq!(LimitPolicy::HANDLER.resolve(Some(&json!(0))), 10);
        assert_eq!(LimitPolicy::HANDLER.resolve(Some(&json!(-7))), 10);
        assert_eq!(LimitPolicy::API.clamp(0), 10);
        assert_eq!(LimitPolicy::PAGE.clamp(-1), 10);
    }

    #[test]
    fn test_agent_floors_non_positive_at_one() {
        assert_eq!(LimitPolicy::AGENT.resolve(Some(&json!(0))), 1);
        assert_eq!(LimitPolicy::AGENT.resolve(Some(&json!(-5))), 1);
        assert_eq!(LimitPolicy::AGENT.resolve(Some(&json!("-2"))), 1);
        // Garbage is still a coercion failure, not a non-positive value.
        assert_eq!(LimitPolicy::AGENT.resolve(Some(&json!("lots"))), 10);
    }

    #[test]
    fn test_uncoercible_limit_uses_default() {
        assert_eq!(LimitPolicy::HANDLER.resolve(Some(&json!("lots"))), 10);
        assert_eq!(LimitPolicy::HANDLER.resolve(Some(&json!(null))), 10);
        assert_eq!(LimitPolicy::HANDLER.resolve(Some(&json!([3]))), 10);
    }

    #[test]
    fn test_numeric_strings_and_floats_coerce() {
        assert_eq!(LimitPolicy::HANDLER.resolve(Some(&json!(" 7 "))), 7);
        assert_eq!(LimitPolicy::HANDLER.resolve(Some(&json!(3.9))), 3);
    }

    #[test]
    fn test_handler_has_no_upper_bound() {
        assert_eq!(LimitPolicy::HANDLER.resolve(Some(&json!(120))), 120);
    }

    #[test]
    fn test_agent_and_api_cap_at_fifty() {
        assert_eq!(LimitPolicy::AGENT.resolve(Some(&json!(120))), 50);
        assert_eq!(LimitPolicy::API.clamp(51), 50);
        assert_eq!(LimitPolicy::API.clamp(50), 50);
        assert_eq!(LimitPolicy::API.clamp(1), 1);
    }
}
