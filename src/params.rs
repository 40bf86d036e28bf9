//! Resolution of glass parameters from host slider values.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

use crate::config::GlassConfig;

/// Slider key for the body radius.
pub const BODY_RADIUS: &str = "body_radius";
/// Slider key for the body height.
pub const BODY_HEIGHT: &str = "body_height";

/// Slider values injected by the host, keyed by parameter name.
///
/// Ordered so that serialization is deterministic.
pub type SliderValues = BTreeMap<String, Value>;

/// Resolved glass dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlassParams {
    /// Radius of the body and base.
    pub body_radius: i64,
    /// Height of the body.
    pub body_height: i64,
}

impl GlassParams {
    /// The configured default dimensions.
    #[must_use]
    pub fn defaults(config: &GlassConfig) -> Self {
        Self {
            body_radius: config.body_radius.default,
            body_height: config.body_height.default,
        }
    }
}

/// Why the defaults were used instead of the slider values.
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultReason {
    /// The host supplied no slider values at all.
    NoSliders,
    /// A required key was absent from the slider values.
    MissingKey(&'static str),
    /// A value was present but not coercible to an integer.
    Malformed { name: &'static str, value: Value },
}

impl fmt::Display for DefaultReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoSliders => write!(f, "no slider values supplied"),
            Self::MissingKey(name) => write!(f, "slider `{name}` is missing"),
            Self::Malformed { name, value } => {
                write!(f, "slider `{name}` is not an integer: {value}")
            }
        }
    }
}

/// Outcome of parameter resolution.
///
/// Fallback is all-or-nothing: when any slider is missing or malformed, both
/// parameters take their defaults.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Both values came from the sliders.
    Resolved(GlassParams),
    /// Both values are the defaults, for the given reason.
    Defaulted {
        params: GlassParams,
        reason: DefaultReason,
    },
}

impl Resolution {
    /// The parameters to build with.
    #[must_use]
    pub fn params(&self) -> GlassParams {
        match self {
            Self::Resolved(params) | Self::Defaulted { params, .. } => *params,
        }
    }

    /// The fallback reason, if the defaults were used.
    #[must_use]
    pub fn default_reason(&self) -> Option<&DefaultReason> {
        match self {
            Self::Resolved(_) => None,
            Self::Defaulted { reason, .. } => Some(reason),
        }
    }
}

/// Resolves the glass parameters from optional slider values.
///
/// `body_radius` is read before `body_height`; the first failure decides the
/// reported [`DefaultReason`].
#[must_use]
pub fn resolve(sliders: Option<&SliderValues>, config: &GlassConfig) -> Resolution {
    let defaulted = |reason| Resolution::Defaulted {
        params: GlassParams::defaults(config),
        reason,
    };

    let Some(sliders) = sliders else {
        return defaulted(DefaultReason::NoSliders);
    };
    let body_radius = match read_slider(sliders, BODY_RADIUS) {
        Ok(v) => v,
        Err(reason) => return defaulted(reason),
    };
    let body_height = match read_slider(sliders, BODY_HEIGHT) {
        Ok(v) => v,
        Err(reason) => return defaulted(reason),
    };

    Resolution::Resolved(GlassParams {
        body_radius,
        body_height,
    })
}

fn read_slider(sliders: &SliderValues, name: &'static str) -> Result<i64, DefaultReason> {
    let value = sliders.get(name).ok_or(DefaultReason::MissingKey(name))?;
    coerce_int(value).ok_or_else(|| DefaultReason::Malformed {
        name,
        value: value.clone(),
    })
}

/// Coerces a slider value to an integer.
///
/// Accepts integers, finite floats (truncated toward zero), booleans, and
/// strings holding an optionally signed decimal integer, with surrounding
/// whitespace and single `_` separators between digits. Returns `None` for
/// anything else, including values outside the `i64` range.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub fn coerce_int(value: &Value) -> Option<i64> {
    match value {
        Value::Bool(b) => Some(i64::from(*b)),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Some(i);
            }
            if n.is_u64() {
                return None;
            }
            let f = n.as_f64()?.trunc();
            // i64::MAX as f64 rounds up to 2^63, which is itself out of range.
            (f.is_finite() && f >= i64::MIN as f64 && f < i64::MAX as f64).then_some(f as i64)
        }
        Value::String(s) => parse_int_literal(s),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn parse_int_literal(s: &str) -> Option<i64> {
    let s = s.trim();
    let (negative, body) = match s.as_bytes().first()? {
        b'-' => (true, &s[1..]),
        b'+' => (false, &s[1..]),
        _ => (false, s),
    };

    let mut digits = String::with_capacity(body.len() + 1);
    if negative {
        digits.push('-');
    }
    for group in body.split('_') {
        if group.is_empty() || !group.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.push_str(group);
    }
    digits.parse().ok()
}
