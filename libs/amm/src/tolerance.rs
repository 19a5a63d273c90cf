//! Fixed-point slippage tolerance
//!
//! A tolerance is the fraction of a desired amount the caller is willing to lose to price
//! movement between quoting and inclusion. It is stored in basis points so that every
//! downstream computation is exact integer arithmetic.

use std::fmt;
use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::{QuoteError, Result};

/// Fixed denominator for tolerances (1 bps = 0.01%)
pub const BPS_DENOMINATOR: u32 = 10_000;

/// Slippage tolerance in basis points, guaranteed to lie within [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct SlippageTolerance {
    bps: u32,
}

impl SlippageTolerance {
    /// No slippage allowed: minimums equal desired amounts
    pub const ZERO: Self = Self { bps: 0 };

    /// Total tolerance: minimums collapse to zero
    pub const TOTAL: Self = Self {
        bps: BPS_DENOMINATOR,
    };

    pub fn from_bps(bps: u32) -> Result<Self> {
        if bps > BPS_DENOMINATOR {
            return Err(QuoteError::InvalidTolerance {
                value: format!("{}bps", bps),
            });
        }
        Ok(Self { bps })
    }

    /// Convert an exact decimal fraction (0.2 = 20%) into basis points
    ///
    /// Fractions that cannot be expressed in whole basis points are rejected rather than
    /// rounded, so the tolerance a caller wrote is the tolerance that is enforced.
    pub fn from_fraction(fraction: Decimal) -> Result<Self> {
        if fraction < dec!(0) || fraction > dec!(1) {
            return Err(QuoteError::InvalidTolerance {
                value: fraction.to_string(),
            });
        }

        let scaled = fraction * Decimal::from(BPS_DENOMINATOR);
        if scaled.fract() != dec!(0) {
            return Err(QuoteError::TolerancePrecision {
                value: fraction.to_string(),
            });
        }

        let bps = scaled
            .to_u32()
            .ok_or_else(|| QuoteError::InvalidTolerance {
                value: fraction.to_string(),
            })?;
        Self::from_bps(bps)
    }

    pub fn bps(&self) -> u32 {
        self.bps
    }

    /// Fraction of the desired amount that must be received, in basis points
    pub fn retained_bps(&self) -> u32 {
        BPS_DENOMINATOR - self.bps
    }

    pub fn as_fraction(&self) -> Decimal {
        Decimal::from(self.bps) / Decimal::from(BPS_DENOMINATOR)
    }

    pub fn is_zero(&self) -> bool {
        self.bps == 0
    }

    /// A total tolerance disables slippage protection entirely
    pub fn is_total(&self) -> bool {
        self.bps == BPS_DENOMINATOR
    }
}

impl TryFrom<u32> for SlippageTolerance {
    type Error = QuoteError;

    fn try_from(bps: u32) -> Result<Self> {
        Self::from_bps(bps)
    }
}

impl From<SlippageTolerance> for u32 {
    fn from(tolerance: SlippageTolerance) -> Self {
        tolerance.bps
    }
}

/// Accepts either a decimal fraction (`0.2`), a percentage (`20%`) or basis points (`2000bps`)
impl FromStr for SlippageTolerance {
    type Err = QuoteError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let invalid = || QuoteError::InvalidTolerance {
            value: trimmed.to_string(),
        };

        if let Some(bps) = trimmed.strip_suffix("bps") {
            let bps = bps.trim().parse::<u32>().map_err(|_| invalid())?;
            return Self::from_bps(bps);
        }

        if let Some(pct) = trimmed.strip_suffix('%') {
            let pct = Decimal::from_str(pct.trim()).map_err(|_| invalid())?;
            return Self::from_fraction(pct / dec!(100));
        }

        let fraction = Decimal::from_str(trimmed).map_err(|_| invalid())?;
        Self::from_fraction(fraction)
    }
}

impl fmt::Display for SlippageTolerance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", (self.as_fraction() * dec!(100)).normalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fraction() {
        let tolerance: SlippageTolerance = "0.2".parse().unwrap();
        assert_eq!(tolerance.bps(), 2000);
        assert_eq!(tolerance.retained_bps(), 8000);
        assert_eq!(tolerance.as_fraction(), dec!(0.2));
    }

    #[test]
    fn test_parse_percent_and_bps() {
        assert_eq!("80%".parse::<SlippageTolerance>().unwrap().bps(), 8000);
        assert_eq!("50bps".parse::<SlippageTolerance>().unwrap().bps(), 50);
        assert_eq!(" 0.005 ".parse::<SlippageTolerance>().unwrap().bps(), 50);
    }

    #[test]
    fn test_out_of_range_rejected() {
        assert!(matches!(
            "1.2".parse::<SlippageTolerance>(),
            Err(QuoteError::InvalidTolerance { .. })
        ));
        assert!(matches!(
            "-0.1".parse::<SlippageTolerance>(),
            Err(QuoteError::InvalidTolerance { .. })
        ));
        assert!(SlippageTolerance::from_bps(10_001).is_err());
        assert!("abc".parse::<SlippageTolerance>().is_err());
    }

    #[test]
    fn test_sub_bps_precision_rejected() {
        assert!(matches!(
            SlippageTolerance::from_fraction(dec!(0.00001)),
            Err(QuoteError::TolerancePrecision { .. })
        ));
    }

    #[test]
    fn test_bounds() {
        assert!(SlippageTolerance::ZERO.is_zero());
        assert!(SlippageTolerance::TOTAL.is_total());
        assert_eq!(SlippageTolerance::from_fraction(dec!(1)).unwrap(), SlippageTolerance::TOTAL);
    }

    #[test]
    fn test_display() {
        assert_eq!(SlippageTolerance::from_bps(50).unwrap().to_string(), "0.5%");
        assert_eq!(SlippageTolerance::from_bps(2000).unwrap().to_string(), "20%");
    }

    #[test]
    fn test_bps_conversion_validates() {
        let tolerance = SlippageTolerance::try_from(125u32).unwrap();
        assert_eq!(u32::from(tolerance), 125);
        assert!(SlippageTolerance::try_from(20_000u32).is_err());
    }
}
