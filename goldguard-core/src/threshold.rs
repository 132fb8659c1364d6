//! Metric specifier grammar.
//!
//! A specifier is `<name><op><value>` with `op` one of `>=`, `<=`, `>`, `<`,
//! `=`, or a bare metric name. Inclusive operators set the bound directly;
//! strict operators are folded into inclusive bounds by nudging the value one
//! representable step (`>` becomes `min = value.next_up()`, `<` becomes
//! `max = value.next_down()`), so downstream comparison is always `min <= score
//! <= max`.

use std::str::FromStr;

use crate::error::ConfigError;

/// A parsed metric specifier: the metric name plus optional score bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSpec {
    pub name: String,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl MetricSpec {
    fn bare(name: &str) -> Self {
        Self {
            name: name.to_string(),
            min: None,
            max: None,
        }
    }
}

fn valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

impl FromStr for MetricSpec {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidMetricSpec(s.to_string());

        let Some(op_start) = s.find(['>', '<', '=']) else {
            // Bare name, no bound.
            if !valid_name(s) {
                return Err(invalid());
            }
            return Ok(MetricSpec::bare(s));
        };

        let name = &s[..op_start];
        if !valid_name(name) {
            return Err(invalid());
        }

        let rest = &s[op_start..];
        let (op, value_str) = if let Some(v) = rest.strip_prefix(">=") {
            (">=", v)
        } else if let Some(v) = rest.strip_prefix("<=") {
            ("<=", v)
        } else if let Some(v) = rest.strip_prefix('>') {
            (">", v)
        } else if let Some(v) = rest.strip_prefix('<') {
            ("<", v)
        } else if let Some(v) = rest.strip_prefix('=') {
            ("=", v)
        } else {
            return Err(invalid());
        };

        if value_str.is_empty() || !value_str.chars().all(|c| c.is_ascii_digit() || c == '.') {
            return Err(invalid());
        }
        let value: f64 = value_str.parse().map_err(|_| invalid())?;

        let mut spec = MetricSpec::bare(name);
        match op {
            ">=" | "=" => spec.min = Some(value),
            "<=" => spec.max = Some(value),
            ">" => spec.min = Some(value.next_up()),
            "<" => spec.max = Some(value.next_down()),
            _ => unreachable!(),
        }
        Ok(spec)
    }
}
