use regex::Regex;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::validation::ValidationError;

/// Largest number of significant digits a `Decimal` can carry.
const SCALE_TOTAL_MAX: u32 = 28;

/// Fixed-point scale descriptor `TvD`.
///
/// `T` is the total number of significant digits and `D` the number of
/// decimal places, so `15v2` allows thirteen integer digits and two decimals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Scale {
    total: u32,
    decimals: u32,
}

impl Scale {
    /// Constructs a validated scale.
    pub fn new(total: u32, decimals: u32) -> Result<Self, ValidationError> {
        if total == 0 || total > SCALE_TOTAL_MAX {
            return Err(ValidationError::OutOfBounds {
                field: "scale_total",
                value: total.to_string(),
            });
        }
        if decimals > total {
            return Err(ValidationError::OutOfBounds {
                field: "scale_decimals",
                value: decimals.to_string(),
            });
        }
        Ok(Self { total, decimals })
    }

    /// Parses a `TvD` descriptor such as `15v2`.
    pub fn parse(descriptor: &str) -> Result<Self, ValidationError> {
        let re = Regex::new(r"^(\d{1,2})v(\d{1,2})$").expect("invalid regex");
        let caps = re
            .captures(descriptor.trim())
            .ok_or_else(|| ValidationError::PatternMismatch {
                field: "scale",
                value: descriptor.to_string(),
            })?;
        // Both groups are one or two ASCII digits.
        let total = caps[1].parse::<u32>().unwrap_or_default();
        let decimals = caps[2].parse::<u32>().unwrap_or_default();
        Self::new(total, decimals)
    }

    /// Total significant digits.
    pub fn total(&self) -> u32 {
        self.total
    }

    /// Decimal places.
    pub fn decimals(&self) -> u32 {
        self.decimals
    }

    /// Rounds `value` half-up to exactly `D` places and checks that it fits
    /// into `T` significant digits.
    pub fn apply(&self, value: Decimal) -> Result<Decimal, ValidationError> {
        let mut rounded =
            value.round_dp_with_strategy(self.decimals, RoundingStrategy::MidpointAwayFromZero);
        rounded.rescale(self.decimals);

        let integral = rounded.trunc().abs();
        let integer_digits = if integral.is_zero() {
            0
        } else {
            integral.normalize().to_string().len() as u32
        };
        if integer_digits > self.total - self.decimals {
            return Err(ValidationError::OutOfBounds {
                field: "value",
                value: value.to_string(),
            });
        }
        Ok(rounded)
    }
}

impl TryFrom<String> for Scale {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Scale> for String {
    fn from(value: Scale) -> Self {
        value.to_string()
    }
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.total, self.decimals)
    }
}
