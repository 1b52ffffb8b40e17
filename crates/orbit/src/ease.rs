use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;
use strum::{Display as StrumDisplay, EnumString};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, StrumDisplay)]
pub enum Curve {
    #[strum(serialize = "in")]
    In,
    #[strum(serialize = "out")]
    Out,
    #[strum(serialize = "inOut")]
    InOut,
}

/// Easing curves named the way timeline authors write them: `none`,
/// `power3.out`, `power2.inOut`, `sine.inOut`.
///
/// `powerN` raises progress to `N + 1`, so `power2` is cubic and `power3` is
/// quartic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, SerializeDisplay, DeserializeFromStr)]
pub enum Ease {
    Linear,
    Power(u8, Curve),
    Sine(Curve),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseEaseError {
    #[error("unknown ease family '{0}'")]
    Family(String),
    #[error("unknown ease curve '{0}'")]
    Curve(String),
    #[error("power must be between 1 and 4, got '{0}'")]
    Power(String),
}

impl Ease {
    pub const POWER2_IN_OUT: Ease = Ease::Power(2, Curve::InOut);
    pub const POWER3_OUT: Ease = Ease::Power(3, Curve::Out);

    /// Maps linear progress `t` to eased progress. `t` is clamped to `[0, 1]`.
    pub fn apply(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match *self {
            Ease::Linear => t,
            Ease::Power(power, curve) => {
                let exp = i32::from(power) + 1;
                match curve {
                    Curve::In => t.powi(exp),
                    Curve::Out => 1.0 - (1.0 - t).powi(exp),
                    Curve::InOut if t < 0.5 => (2.0 * t).powi(exp) / 2.0,
                    Curve::InOut => 1.0 - (2.0 * (1.0 - t)).powi(exp) / 2.0,
                }
            }
            Ease::Sine(curve) => match curve {
                Curve::In => 1.0 - (t * PI / 2.0).cos(),
                Curve::Out => (t * PI / 2.0).sin(),
                Curve::InOut => -((PI * t).cos() - 1.0) / 2.0,
            },
        }
    }
}

impl FromStr for Ease {
    type Err = ParseEaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("none") || s.eq_ignore_ascii_case("linear") {
            return Ok(Ease::Linear);
        }

        let (family, curve) = s.split_once('.').unwrap_or((s, "out"));
        let curve =
            Curve::from_str(curve).map_err(|_| ParseEaseError::Curve(curve.to_string()))?;

        match family.to_ascii_lowercase().as_str() {
            "sine" => Ok(Ease::Sine(curve)),
            f if f.starts_with("power") => {
                let digits = &f["power".len()..];
                match digits.parse::<u8>() {
                    Ok(p @ 1..=4) => Ok(Ease::Power(p, curve)),
                    _ => Err(ParseEaseError::Power(digits.to_string())),
                }
            }
            _ => Err(ParseEaseError::Family(family.to_string())),
        }
    }
}

impl fmt::Display for Ease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ease::Linear => write!(f, "none"),
            Ease::Power(p, curve) => write!(f, "power{}.{}", p, curve),
            Ease::Sine(curve) => write!(f, "sine.{}", curve),
        }
    }
}
