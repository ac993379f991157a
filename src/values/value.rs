//! Candidate values and coercion
//!
//! Values extracted from a building model arrive loosely typed. Before a
//! comparison the candidate is coerced toward the constraint's declared type;
//! a failed coercion is a type mismatch and simply does not satisfy.

use super::types::SemanticType;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Relative and absolute tolerance applied to floating point comparisons
pub const FLOAT_TOLERANCE: f64 = 1e-6;

static DURATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(-)?P(?:(\d+)Y)?(?:(\d+)M)?(?:(\d+)D)?(?:T(?:(\d+)H)?(?:(\d+)M)?(?:(\d+(?:\.\d+)?)S)?)?$",
    )
    .unwrap()
});

/// An xs:duration split into its month and second components
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct XsDuration {
    /// Whether the duration is negative
    pub negative: bool,
    /// Years and months, in months
    pub months: u64,
    /// Days, hours, minutes and seconds, in seconds
    pub seconds: Decimal,
}

impl XsDuration {
    /// Parse an ISO 8601 duration such as `P1Y2M3DT4H5M6.5S`
    pub fn parse(s: &str) -> Option<Self> {
        let caps = DURATION.captures(s.trim())?;
        // a bare "P" or "PT" carries no component
        if caps.iter().skip(2).all(|c| c.is_none()) || s.trim().ends_with('T') {
            return None;
        }
        let num = |i: usize| -> Option<u64> {
            caps.get(i).map_or(Some(0), |m| m.as_str().parse().ok())
        };
        let months = num(2)? * 12 + num(3)?;
        let whole = num(4)? * 86_400 + num(5)? * 3_600 + num(6)? * 60;
        let secs = match caps.get(7) {
            Some(m) => Decimal::from_str(m.as_str()).ok()?,
            None => Decimal::ZERO,
        };
        Some(Self {
            negative: caps.get(1).is_some(),
            months,
            seconds: Decimal::from(whole) + secs,
        })
    }

    /// Build a duration from a whole number of days
    pub fn from_days(days: u64) -> Self {
        Self {
            negative: false,
            months: 0,
            seconds: Decimal::from(days * 86_400),
        }
    }

    fn signed(&self) -> (i128, Decimal) {
        if self.negative {
            (-(self.months as i128), -self.seconds)
        } else {
            (self.months as i128, self.seconds)
        }
    }
}

impl PartialOrd for XsDuration {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        let (ma, sa) = self.signed();
        let (mb, sb) = other.signed();
        // months and seconds are only comparable when one side agrees
        match (ma.cmp(&mb), sa.cmp(&sb)) {
            (Ordering::Equal, o) | (o, Ordering::Equal) => Some(o),
            (a, b) if a == b => Some(a),
            _ => None,
        }
    }
}

impl fmt::Display for XsDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negative {
            write!(f, "-")?;
        }
        write!(f, "P")?;
        let (years, months) = (self.months / 12, self.months % 12);
        if years > 0 {
            write!(f, "{}Y", years)?;
        }
        if months > 0 {
            write!(f, "{}M", months)?;
        }
        let total = self.seconds;
        let whole = total.trunc().to_u64().unwrap_or(0);
        let frac = total - total.trunc();
        let days = whole / 86_400;
        let hours = (whole % 86_400) / 3_600;
        let minutes = (whole % 3_600) / 60;
        let seconds = Decimal::from(whole % 60) + frac;
        if days > 0 {
            write!(f, "{}D", days)?;
        }
        if hours > 0 || minutes > 0 || !seconds.is_zero() {
            write!(f, "T")?;
            if hours > 0 {
                write!(f, "{}H", hours)?;
            }
            if minutes > 0 {
                write!(f, "{}M", minutes)?;
            }
            if !seconds.is_zero() {
                write!(f, "{}S", seconds.normalize())?;
            }
        } else if self.months == 0 && days == 0 {
            write!(f, "T0S")?;
        }
        Ok(())
    }
}

/// A typed scalar value supplied by the candidate accessor
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Text value
    String(String),
    /// Integer value
    Integer(i64),
    /// Single precision value
    Floating(f32),
    /// Double precision value
    Double(f64),
    /// Decimal value (scale preserved)
    Decimal(Decimal),
    /// Boolean value
    Boolean(bool),
    /// Date value
    Date(NaiveDate),
    /// DateTime value
    DateTime(NaiveDateTime),
    /// Time value
    Time(NaiveTime),
    /// Duration value
    Duration(XsDuration),
    /// URI value
    Uri(String),
}

impl Value {
    /// The value's own semantic type
    pub fn semantic_type(&self) -> SemanticType {
        match self {
            Value::String(_) => SemanticType::String,
            Value::Integer(_) => SemanticType::Integer,
            Value::Floating(_) => SemanticType::Floating,
            Value::Double(_) => SemanticType::Double,
            Value::Decimal(_) => SemanticType::Decimal,
            Value::Boolean(_) => SemanticType::Boolean,
            Value::Date(_) => SemanticType::Date,
            Value::DateTime(_) => SemanticType::DateTime,
            Value::Time(_) => SemanticType::Time,
            Value::Duration(_) => SemanticType::Duration,
            Value::Uri(_) => SemanticType::Uri,
        }
    }

    /// Parse a literal in the given type; `Undefined` and `String` keep the text
    pub fn parse(text: &str, ty: SemanticType) -> Option<Value> {
        let trimmed = text.trim();
        match ty {
            SemanticType::Undefined | SemanticType::String => Some(Value::String(text.to_string())),
            SemanticType::Integer => trimmed.parse::<i64>().ok().map(Value::Integer),
            SemanticType::Floating => parse_float(trimmed).map(|v| Value::Floating(v as f32)),
            SemanticType::Double => parse_float(trimmed).map(Value::Double),
            SemanticType::Decimal => parse_decimal(trimmed).map(Value::Decimal),
            SemanticType::Boolean => match trimmed {
                "true" | "1" => Some(Value::Boolean(true)),
                "false" | "0" => Some(Value::Boolean(false)),
                _ => None,
            },
            SemanticType::Date => NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
                .ok()
                .map(Value::Date),
            SemanticType::DateTime => parse_datetime(trimmed).map(Value::DateTime),
            SemanticType::Time => NaiveTime::parse_from_str(trimmed, "%H:%M:%S%.f")
                .ok()
                .map(Value::Time),
            SemanticType::Duration => XsDuration::parse(trimmed).map(Value::Duration),
            SemanticType::Uri => parse_uri(trimmed).map(Value::Uri),
        }
    }

    /// Coerce this value toward `target`, `None` on a type mismatch
    pub fn coerce(&self, target: SemanticType) -> Option<Value> {
        match (target, self) {
            (SemanticType::Undefined, v) => Some(v.clone()),
            (SemanticType::String, v) => Some(Value::String(v.to_string())),
            (t, Value::String(s)) => Value::parse(s, t),
            (t, v) if v.semantic_type() == t => Some(v.clone()),

            (SemanticType::Integer, Value::Floating(f)) => integral(*f as f64),
            (SemanticType::Integer, Value::Double(f)) => integral(*f),
            (SemanticType::Integer, Value::Decimal(d)) if d.fract().is_zero() => {
                d.to_i64().map(Value::Integer)
            }

            (SemanticType::Floating, Value::Integer(i)) => Some(Value::Floating(*i as f32)),

            (SemanticType::Double, Value::Integer(i)) => Some(Value::Double(*i as f64)),
            (SemanticType::Double, Value::Floating(f)) => Some(Value::Double(*f as f64)),
            (SemanticType::Double, Value::Decimal(d)) => d.to_f64().map(Value::Double),

            (SemanticType::Decimal, Value::Integer(i)) => Some(Value::Decimal(Decimal::from(*i))),
            (SemanticType::Decimal, Value::Floating(f)) => {
                Decimal::from_f32(*f).map(Value::Decimal)
            }
            (SemanticType::Decimal, Value::Double(f)) => Decimal::from_f64(*f).map(Value::Decimal),

            _ => None,
        }
    }

    /// Numeric view used for range comparisons across numeric variants
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Floating(f) => Some(*f as f64),
            Value::Double(f) => Some(*f),
            Value::Decimal(d) => d.to_f64(),
            _ => None,
        }
    }

    /// Order two values of the same variant
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
            (Value::Floating(a), Value::Floating(b)) => a.partial_cmp(b),
            (Value::Double(a), Value::Double(b)) => a.partial_cmp(b),
            (Value::Decimal(a), Value::Decimal(b)) => Some(a.cmp(b)),
            (Value::Date(a), Value::Date(b)) => Some(a.cmp(b)),
            (Value::DateTime(a), Value::DateTime(b)) => Some(a.cmp(b)),
            (Value::Time(a), Value::Time(b)) => Some(a.cmp(b)),
            (Value::Duration(a), Value::Duration(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) | Value::Uri(s) => write!(f, "{}", s),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Floating(v) => write!(f, "{}", v),
            Value::Double(v) => write!(f, "{}", v),
            Value::Decimal(d) => write!(f, "{}", d),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Value::DateTime(d) => write!(f, "{}", d.format("%Y-%m-%dT%H:%M:%S%.f")),
            Value::Time(t) => write!(f, "{}", t.format("%H:%M:%S%.f")),
            Value::Duration(d) => write!(f, "{}", d),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Integer(i as i64)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Floating(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<Decimal> for Value {
    fn from(d: Decimal) -> Self {
        Value::Decimal(d)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::Date(d)
    }
}

impl From<XsDuration> for Value {
    fn from(d: XsDuration) -> Self {
        Value::Duration(d)
    }
}

/// Tolerant equality of a candidate against an expected floating value
pub fn approx_eq(candidate: f64, expected: f64) -> bool {
    (candidate - expected).abs() < FLOAT_TOLERANCE * expected.abs() + FLOAT_TOLERANCE
}

fn integral(f: f64) -> Option<Value> {
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
        Some(Value::Integer(f as i64))
    } else {
        None
    }
}

fn parse_float(s: &str) -> Option<f64> {
    match s {
        "INF" => Some(f64::INFINITY),
        "-INF" => Some(f64::NEG_INFINITY),
        "NaN" => Some(f64::NAN),
        _ => s.parse::<f64>().ok().filter(|v| v.is_finite()),
    }
}

fn parse_decimal(s: &str) -> Option<Decimal> {
    Decimal::from_str(s)
        .ok()
        .or_else(|| Decimal::from_scientific(s).ok())
}

fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|d| d.naive_utc()))
}

fn parse_uri(s: &str) -> Option<String> {
    if s.is_empty() || s.contains(char::is_whitespace) {
        return None;
    }
    match url::Url::parse(s) {
        Ok(u) => Some(u.to_string()),
        // relative references are kept verbatim
        Err(url::ParseError::RelativeUrlWithoutBase) => Some(s.to_string()),
        Err(_) => None,
    }
}
