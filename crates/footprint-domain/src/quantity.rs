//! Dimensioned quantities

use crate::error::{DimensionalityError, ParseError};
use crate::unit::Unit;
use crate::units::Dimension;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::{Div, Mul};
use std::str::FromStr;

/// A magnitude paired with a unit, e.g. `2 server * year`
///
/// Serialized as `"<magnitude> <unit>"`. Addition is only defined between
/// quantities of the same dimension and goes through [`Quantity::checked_add`].
#[derive(Debug, Clone, PartialEq)]
pub struct Quantity {
    magnitude: f64,
    unit: Unit,
}

impl Quantity {
    /// Build a quantity
    pub fn new(magnitude: f64, unit: Unit) -> Self {
        Self { magnitude, unit }
    }

    /// A pure number
    pub fn dimensionless(magnitude: f64) -> Self {
        Self::new(magnitude, Unit::dimensionless())
    }

    /// Zero expressed in `unit`
    pub fn zero(unit: Unit) -> Self {
        Self::new(0.0, unit)
    }

    /// Numeric part
    pub fn magnitude(&self) -> f64 {
        self.magnitude
    }

    /// Unit part
    pub fn unit(&self) -> &Unit {
        &self.unit
    }

    /// Dimension of the unit
    pub fn dimension(&self) -> Dimension {
        self.unit.dimension()
    }

    /// True when the dimension is exactly `[time]`
    pub fn is_time(&self) -> bool {
        self.dimension() == Dimension::time()
    }

    /// Express the same amount in another unit of equal dimension
    pub fn to(&self, target: &Unit) -> Result<Quantity, DimensionalityError> {
        let factor = self.unit.conversion_factor(target)?;
        Ok(Self::new(self.magnitude * factor, target.clone()))
    }

    /// `self + other`, in the unit of `self`
    pub fn checked_add(&self, other: &Quantity) -> Result<Quantity, DimensionalityError> {
        let converted = other.to(&self.unit).map_err(|_| self.mismatch(other))?;
        Ok(Self::new(self.magnitude + converted.magnitude, self.unit.clone()))
    }

    /// `self - other`, in the unit of `self`
    pub fn checked_sub(&self, other: &Quantity) -> Result<Quantity, DimensionalityError> {
        let converted = other.to(&self.unit).map_err(|_| self.mismatch(other))?;
        Ok(Self::new(self.magnitude - converted.magnitude, self.unit.clone()))
    }

    fn mismatch(&self, other: &Quantity) -> DimensionalityError {
        DimensionalityError {
            from: self.unit.to_string(),
            from_dimension: self.dimension().to_string(),
            to: other.unit.to_string(),
            to_dimension: other.dimension().to_string(),
        }
    }

    /// Combine factors of the same dimension into a single unit
    ///
    /// `10 server * month / day` becomes `304.375 server`.
    pub fn to_reduced_units(&self) -> Quantity {
        let (unit, multiplier) = self.unit.reduced();
        Self::new(self.magnitude * multiplier, unit)
    }

    /// Relative comparison after converting `other` into the unit of `self`
    pub fn approx_eq(&self, other: &Quantity, relative_tolerance: f64) -> bool {
        match other.to(&self.unit) {
            Ok(converted) => {
                let scale = self.magnitude.abs().max(converted.magnitude.abs()).max(1e-12);
                (self.magnitude - converted.magnitude).abs() <= relative_tolerance * scale
            }
            Err(_) => false,
        }
    }

    /// Magnitude rounded to `decimals` places
    pub fn rounded(&self, decimals: i32) -> Quantity {
        let scale = 10f64.powi(decimals);
        Self::new((self.magnitude * scale).round() / scale, self.unit.clone())
    }
}

impl From<f64> for Quantity {
    fn from(magnitude: f64) -> Self {
        Self::dimensionless(magnitude)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.unit.is_dimensionless() {
            write!(f, "{}", self.magnitude)
        } else {
            write!(f, "{} {}", self.magnitude, self.unit)
        }
    }
}

impl FromStr for Quantity {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (number, unit) = match trimmed.split_once(char::is_whitespace) {
            Some((number, unit)) => (number, unit),
            None => (trimmed, ""),
        };
        let magnitude: f64 = number
            .parse()
            .map_err(|_| ParseError::new(trimmed, "missing or invalid magnitude"))?;
        if !magnitude.is_finite() {
            return Err(ParseError::new(trimmed, "magnitude must be finite"));
        }
        let unit: Unit = unit
            .parse()
            .map_err(|e: ParseError| ParseError::new(trimmed, e.reason))?;
        Ok(Self::new(magnitude, unit))
    }
}

impl Serialize for Quantity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Quantity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

impl Mul<&Quantity> for &Quantity {
    type Output = Quantity;

    fn mul(self, rhs: &Quantity) -> Quantity {
        Quantity::new(self.magnitude * rhs.magnitude, &self.unit * &rhs.unit)
    }
}

impl Div<&Quantity> for &Quantity {
    type Output = Quantity;

    fn div(self, rhs: &Quantity) -> Quantity {
        Quantity::new(self.magnitude / rhs.magnitude, &self.unit / &rhs.unit)
    }
}

impl Mul<f64> for &Quantity {
    type Output = Quantity;

    fn mul(self, rhs: f64) -> Quantity {
        Quantity::new(self.magnitude * rhs, self.unit.clone())
    }
}

impl Div<f64> for &Quantity {
    type Output = Quantity;

    fn div(self, rhs: f64) -> Quantity {
        Quantity::new(self.magnitude / rhs, self.unit.clone())
    }
}

impl Mul<&Unit> for &Quantity {
    type Output = Quantity;

    fn mul(self, rhs: &Unit) -> Quantity {
        Quantity::new(self.magnitude, &self.unit * rhs)
    }
}

impl Div<&Unit> for &Quantity {
    type Output = Quantity;

    fn div(self, rhs: &Unit) -> Quantity {
        Quantity::new(self.magnitude, &self.unit / rhs)
    }
}
