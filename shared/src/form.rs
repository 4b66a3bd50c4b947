//! Numeric input sanitizers
//!
//! Every keystroke on a numeric field goes through one of these functions so
//! the stored text is always a valid prefix of a number of the field's kind.
//! All sanitizers are idempotent.

use rust_decimal::Decimal;
use std::str::FromStr;

/// Longest accepted name (point name, tier name, event name)
pub const MAX_NAME_LEN: usize = 30;

/// Digit budget and optional ceiling for integer fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntegerPolicy {
    pub max_digits: usize,
    /// Values above this snap down to it
    pub max: Option<u64>,
}

impl IntegerPolicy {
    /// Point amounts, recall days and the like
    pub const GENERAL: IntegerPolicy = IntegerPolicy::digits(5);
    /// Tier point thresholds
    pub const POINT_THRESHOLD: IntegerPolicy = IntegerPolicy::digits(6);
    /// Redeem point cost
    pub const POINT_VALUE: IntegerPolicy = IntegerPolicy::digits(6).clamp_max(100_000);
    /// Percentage discount
    pub const DISCOUNT_PERCENT: IntegerPolicy = IntegerPolicy::digits(3).clamp_max(100);
    /// Coupon expiry in days
    pub const EXPIRY_DAYS: IntegerPolicy = IntegerPolicy::digits(3).clamp_max(365);

    pub const fn digits(max_digits: usize) -> Self {
        Self {
            max_digits,
            max: None,
        }
    }

    pub const fn clamp_max(self, max: u64) -> Self {
        Self {
            max_digits: self.max_digits,
            max: Some(max),
        }
    }
}

/// Digit budget and ceiling for decimal fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FloatPolicy {
    pub int_digits: usize,
    pub frac_digits: usize,
    pub ceiling: Option<Decimal>,
}

impl FloatPolicy {
    /// Tier multiplier: one integer digit, two decimals, at most 9.99
    pub const MULTIPLIER: FloatPolicy = FloatPolicy {
        int_digits: 1,
        frac_digits: 2,
        ceiling: Some(Decimal::from_parts(999, 0, 0, false, 2)),
    };

    /// Currency amounts such as a minimum purchase
    pub const AMOUNT: FloatPolicy = FloatPolicy {
        int_digits: 6,
        frac_digits: 2,
        ceiling: None,
    };
}

/// Keep digits only, drop leading zeros, cap length then clamp
pub fn sanitize_integer(raw: &str, policy: IntegerPolicy) -> String {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return digits;
    }

    let trimmed = digits.trim_start_matches('0');
    let mut out: String = if trimmed.is_empty() {
        "0".to_string()
    } else {
        trimmed.chars().take(policy.max_digits).collect()
    };

    if let Some(max) = policy.max
        && out.parse::<u64>().is_ok_and(|v| v > max)
    {
        out = max.to_string();
    }
    out
}

/// Keep digits and a single `.`, cap both sides, snap to the ceiling
///
/// A lone `.` or a trailing `.` is kept so the user can continue typing.
pub fn sanitize_float(raw: &str, policy: FloatPolicy) -> String {
    let mut int_part = String::new();
    let mut frac_part = String::new();
    let mut seen_dot = false;
    for c in raw.chars() {
        match c {
            '0'..='9' if seen_dot => frac_part.push(c),
            '0'..='9' => int_part.push(c),
            '.' => seen_dot = true,
            _ => {}
        }
    }

    if !seen_dot && int_part.is_empty() {
        return String::new();
    }

    let int_trimmed = int_part.trim_start_matches('0');
    let int_part = if int_trimmed.is_empty() {
        if int_part.is_empty() && frac_part.is_empty() {
            // lone "."
            String::new()
        } else {
            "0".to_string()
        }
    } else {
        int_trimmed.to_string()
    };

    if let Some(ceiling) = policy.ceiling {
        let candidate = if frac_part.is_empty() {
            int_part.clone()
        } else {
            format!("{int_part}.{frac_part}")
        };
        // unparseable means too many digits for a Decimal, so above any ceiling
        let exceeds = !candidate.is_empty()
            && Decimal::from_str(&candidate).map_or(true, |v| v > ceiling);
        if exceeds {
            return format_decimal(ceiling, policy.frac_digits);
        }
    }

    let int_part: String = int_part.chars().take(policy.int_digits).collect();
    if !seen_dot {
        return int_part;
    }
    let frac_part: String = frac_part.chars().take(policy.frac_digits).collect();
    format!("{int_part}.{frac_part}")
}

/// Cosmetic default when a numeric field loses focus
pub fn normalize_on_blur(text: &str) -> String {
    match text.trim() {
        "" | "." => "0".to_string(),
        t if t.ends_with('.') => t.trim_end_matches('.').to_string(),
        t => t.to_string(),
    }
}

/// Letters, digits and spaces, at most [`MAX_NAME_LEN`] characters
pub fn sanitize_name(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == ' ')
        .take(MAX_NAME_LEN)
        .collect()
}

fn format_decimal(value: Decimal, frac_digits: usize) -> String {
    format!("{:.*}", frac_digits, value)
}

/// Which grammar a [`FormValue`] accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericKind {
    Integer(IntegerPolicy),
    Float(FloatPolicy),
}

/// Text-encoded numeric form field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormValue {
    pub kind: NumericKind,
    pub min: Decimal,
    pub max: Decimal,
    text: String,
}

impl FormValue {
    pub fn integer(policy: IntegerPolicy, min: u32, max: u32) -> Self {
        Self {
            kind: NumericKind::Integer(policy),
            min: Decimal::from(min),
            max: Decimal::from(max),
            text: String::new(),
        }
    }

    pub fn float(policy: FloatPolicy, min: Decimal, max: Decimal) -> Self {
        Self {
            kind: NumericKind::Float(policy),
            min,
            max,
            text: String::new(),
        }
    }

    /// Start with a value, sanitized like typed input
    pub fn with_text(mut self, text: &str) -> Self {
        self.set_raw(text);
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Apply a keystroke-accumulated value
    pub fn set_raw(&mut self, raw: &str) {
        self.text = match self.kind {
            NumericKind::Integer(policy) => sanitize_integer(raw, policy),
            NumericKind::Float(policy) => sanitize_float(raw, policy),
        };
    }

    pub fn blur(&mut self) {
        self.text = normalize_on_blur(&self.text);
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }

    pub fn parse(&self) -> Option<Decimal> {
        let text = self.text.trim().trim_end_matches('.');
        if text.is_empty() {
            return None;
        }
        Decimal::from_str(text).ok()
    }

    pub fn parse_u32(&self) -> Option<u32> {
        self.text.trim().parse().ok()
    }

    pub fn in_range(&self) -> bool {
        self.parse()
            .is_some_and(|v| v >= self.min && v <= self.max)
    }
}
