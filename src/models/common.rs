//! Response envelope and error-code classification.
//!
//! Every WeCom response carries `errcode` and `errmsg` next to the
//! operation-specific fields. The `errcode` field is documented as an
//! integer, but it is seen on the wire as an integer, a float or a numeric
//! string. All three are normalized here, once, into [`ErrCode`], and both
//! the typed [`Envelope`] and the generic [`classify`] use that same step.

use std::fmt;

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::error::WecomError;

/// Name of the error-code field in every response envelope.
pub const ERRCODE_FIELD: &str = "errcode";

/// A normalized `errcode` value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ErrCode {
    /// An integral code, from `0`, `0.0` or `"0"` style encodings.
    Code(i64),

    /// A value that is not an integral number in any accepted encoding,
    /// e.g. `"00"`, `1.5`, `true`. Kept verbatim for diagnostics.
    Unrecognized(String),

    /// The field was absent or `null`.
    #[default]
    Missing,
}

impl ErrCode {
    /// Normalizes a raw JSON value into an error code.
    ///
    /// - integers map to [`ErrCode::Code`]
    /// - floats with no fractional part map to [`ErrCode::Code`]
    /// - strings map to [`ErrCode::Code`] only when they are the canonical
    ///   decimal form of an integer (`"0"`, `"-1"`, `"40014"`)
    /// - `null` maps to [`ErrCode::Missing`]
    /// - anything else is [`ErrCode::Unrecognized`]
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Null => ErrCode::Missing,
            Value::Number(number) => {
                if let Some(code) = number.as_i64() {
                    return ErrCode::Code(code);
                }
                match number.as_f64() {
                    Some(f) if f.is_finite() && f.fract() == 0.0 && Self::fits_i64(f) => {
                        ErrCode::Code(f as i64)
                    }
                    _ => ErrCode::Unrecognized(number.to_string()),
                }
            }
            Value::String(text) => match text.parse::<i64>() {
                Ok(code) if code.to_string() == *text => ErrCode::Code(code),
                _ => ErrCode::Unrecognized(text.clone()),
            },
            other => ErrCode::Unrecognized(other.to_string()),
        }
    }

    fn fits_i64(f: f64) -> bool {
        f >= i64::MIN as f64 && f < i64::MAX as f64
    }

    /// Returns true only for a code equal to zero.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, ErrCode::Code(0))
    }

    /// Returns the numeric code, if the value was recognized.
    #[must_use]
    pub fn value(&self) -> Option<i64> {
        match self {
            ErrCode::Code(code) => Some(*code),
            _ => None,
        }
    }
}

impl fmt::Display for ErrCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrCode::Code(code) => write!(f, "{}", code),
            ErrCode::Unrecognized(raw) => write!(f, "unrecognized({})", raw),
            ErrCode::Missing => f.write_str("missing"),
        }
    }
}

impl<'de> Deserialize<'de> for ErrCode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(ErrCode::from_value(&value))
    }
}

/// The error fields shared by every WeCom response.
///
/// Unknown fields are ignored, so any response body can be decoded as an
/// `Envelope` before its operation-specific shape is looked at.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Envelope {
    /// Normalized error code; `0` means success.
    #[serde(default)]
    pub errcode: ErrCode,

    /// Error message, `"ok"` on success.
    #[serde(default)]
    pub errmsg: String,
}

impl Envelope {
    /// Returns true if the response indicates success.
    pub fn is_success(&self) -> bool {
        self.errcode.is_success()
    }

    /// Converts a failed envelope into a `WecomError::Api`.
    pub fn into_result(self) -> Result<(), WecomError> {
        if self.is_success() {
            Ok(())
        } else {
            Err(WecomError::api(self.errcode, self.errmsg))
        }
    }
}

/// Outcome of inspecting a raw response without a typed schema.
#[derive(Debug, Clone, Default)]
pub struct Classification {
    /// The decoded JSON object, or `None` if the body was not one.
    pub data: Option<Map<String, Value>>,

    /// True only if the body decoded and its `errcode` normalizes to zero.
    pub ok: bool,
}

/// Decodes `raw` as a generic JSON object and checks its `errcode`.
///
/// A body that is not a JSON object is never successful. An object with
/// no `errcode` field is treated as unsuccessful too, matching the typed
/// [`Envelope`] path.
pub fn classify(raw: &[u8]) -> Classification {
    let data: Map<String, Value> = match serde_json::from_slice(raw) {
        Ok(data) => data,
        Err(_) => return Classification::default(),
    };

    let ok = data
        .get(ERRCODE_FIELD)
        .map(ErrCode::from_value)
        .unwrap_or_default()
        .is_success();

    Classification {
        data: Some(data),
        ok,
    }
}
