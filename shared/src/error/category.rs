//! Which part of the program an error code belongs to

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Error area, taken from the thousands digit of the code
///
/// | Range | Area |
/// |-------|------|
/// | 0xxx | general |
/// | 1xxx | login and session |
/// | 2xxx | store and channel selection |
/// | 3xxx | points and tiers |
/// | 4xxx | ways to earn |
/// | 5xxx | ways to redeem |
/// | anything else | system |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    General,
    Auth,
    Channel,
    Points,
    Earn,
    Redeem,
    System,
}

impl ErrorCategory {
    pub fn from_code(code: u16) -> Self {
        match code / 1000 {
            0 => Self::General,
            1 => Self::Auth,
            2 => Self::Channel,
            3 => Self::Points,
            4 => Self::Earn,
            5 => Self::Redeem,
            _ => Self::System,
        }
    }

    /// Label used in log fields
    pub fn name(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Auth => "auth",
            Self::Channel => "channel",
            Self::Points => "points",
            Self::Earn => "earn",
            Self::Redeem => "redeem",
            Self::System => "system",
        }
    }
}

impl ErrorCode {
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }
}
