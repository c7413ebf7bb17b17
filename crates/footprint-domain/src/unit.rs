//! Unit expressions: products of registered units with integer exponents

use crate::error::{DimensionalityError, ParseError};
use crate::units::{self, Dimension, UnitDefinition};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Div, Mul};
use std::str::FromStr;

/// Largest exponent magnitude a parsed unit may carry
pub const MAX_EXPONENT: i32 = 16;

/// A product of named units, e.g. `kg_co2e / server / day`
///
/// Two units are equal only when they are spelled with the same factors and
/// exponents: `server * day` and `server * hour` share a dimension but are
/// different units.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Unit {
    factors: BTreeMap<&'static str, i32>,
}

impl Unit {
    /// The empty product
    pub fn dimensionless() -> Self {
        Self::default()
    }

    /// Unit made of a single registry entry
    pub fn named(symbol: &str) -> Result<Self, ParseError> {
        let def = units::lookup(symbol)
            .ok_or_else(|| ParseError::new(symbol, "unknown unit"))?;
        Ok(Self::from_definition(def))
    }

    pub(crate) fn from_definition(def: &'static UnitDefinition) -> Self {
        let mut factors = BTreeMap::new();
        factors.insert(def.name, 1);
        Self { factors }
    }

    /// True when no factor is left
    pub fn is_dimensionless(&self) -> bool {
        self.factors.is_empty()
    }

    /// Number of distinct named factors (`server * day` has two, `server ** 2` one)
    pub fn factor_count(&self) -> usize {
        self.factors.len()
    }

    /// Named factors with their exponents
    pub fn factors(&self) -> impl Iterator<Item = (&'static UnitDefinition, i32)> + '_ {
        self.factors
            .iter()
            .filter_map(|(name, exponent)| units::lookup(name).map(|def| (def, *exponent)))
    }

    /// True when one of the factors is exactly `[time]`
    pub fn has_time_factor(&self) -> bool {
        self.factors().any(|(def, _)| def.is_time())
    }

    /// Combined dimension of all factors
    pub fn dimension(&self) -> Dimension {
        self.factors()
            .fold(Dimension::dimensionless(), |acc, (def, exponent)| {
                acc.multiply(&def.dimension().powi(exponent))
            })
    }

    /// Multiplier to the base units of this dimension
    pub fn scale(&self) -> f64 {
        self.factors()
            .map(|(def, exponent)| def.factor.powi(exponent))
            .product()
    }

    /// `self ** power`
    pub fn powi(&self, power: i32) -> Self {
        let mut result = Self::default();
        for (name, exponent) in &self.factors {
            result.accumulate(name, exponent.saturating_mul(power));
        }
        result
    }

    /// Largest exponent magnitude among the factors
    pub fn max_exponent(&self) -> i32 {
        self.factors.values().map(|e| e.saturating_abs()).max().unwrap_or(0)
    }

    /// Ratio by which a magnitude in `self` must be multiplied to be expressed in `target`
    pub fn conversion_factor(&self, target: &Unit) -> Result<f64, DimensionalityError> {
        if self == target {
            return Ok(1.0);
        }
        let from_dimension = self.dimension();
        let to_dimension = target.dimension();
        if from_dimension != to_dimension {
            return Err(DimensionalityError {
                from: self.to_string(),
                from_dimension: from_dimension.to_string(),
                to: target.to_string(),
                to_dimension: to_dimension.to_string(),
            });
        }
        Ok(self.scale() / target.scale())
    }

    fn accumulate(&mut self, name: &'static str, exponent: i32) {
        let entry = self.factors.entry(name).or_insert(0);
        *entry = entry.saturating_add(exponent);
        if *entry == 0 {
            self.factors.remove(name);
        }
    }

    fn multiply(&self, other: &Unit, sign: i32) -> Self {
        let mut result = self.clone();
        for (name, exponent) in &other.factors {
            result.accumulate(name, exponent.saturating_mul(sign));
        }
        result
    }

    /// Fold factors sharing a dimension into the first of them.
    ///
    /// Returns the folded unit with the magnitude multiplier the folding
    /// introduced, e.g. `server * month / day` gives `(server, 30.4375)`.
    pub fn reduced(&self) -> (Self, f64) {
        let mut kept: Vec<(&'static UnitDefinition, i32)> = Vec::new();
        let mut multiplier = 1.0;
        for (def, exponent) in self.factors() {
            let dimension = def.dimension();
            match kept.iter_mut().find(|(k, _)| k.dimension() == dimension) {
                Some((representative, kept_exponent)) => {
                    multiplier *= (def.factor / representative.factor).powi(exponent);
                    *kept_exponent = kept_exponent.saturating_add(exponent);
                }
                None => kept.push((def, exponent)),
            }
        }
        let mut reduced = Self::default();
        for (def, exponent) in kept {
            reduced.accumulate(def.name, exponent);
        }
        (reduced, multiplier)
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.factors.is_empty() {
            return write!(f, "dimensionless");
        }
        let power = |name: &str, exponent: i32| match exponent {
            1 => name.to_string(),
            n => format!("{} ** {}", name, n),
        };
        let numerator: Vec<String> = self
            .factors
            .iter()
            .filter(|(_, e)| **e > 0)
            .map(|(name, e)| power(name, *e))
            .collect();
        let denominator: Vec<String> = self
            .factors
            .iter()
            .filter(|(_, e)| **e < 0)
            .map(|(name, e)| power(name, -*e))
            .collect();

        if numerator.is_empty() {
            write!(f, "1")?;
        } else {
            write!(f, "{}", numerator.join(" * "))?;
        }
        for factor in denominator {
            write!(f, " / {}", factor)?;
        }
        Ok(())
    }
}

impl FromStr for Unit {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed == "dimensionless" {
            return Ok(Self::dimensionless());
        }
        let tokens = tokenize(trimmed)?;
        let mut parser = Parser {
            input: trimmed,
            tokens,
            position: 0,
        };
        let unit = parser.expression()?;
        if parser.position != parser.tokens.len() {
            return Err(ParseError::new(trimmed, "unexpected trailing input"));
        }
        Ok(unit)
    }
}

impl Mul for &Unit {
    type Output = Unit;

    fn mul(self, rhs: &Unit) -> Unit {
        self.multiply(rhs, 1)
    }
}

impl Mul for Unit {
    type Output = Unit;

    fn mul(self, rhs: Unit) -> Unit {
        self.multiply(&rhs, 1)
    }
}

impl Div for &Unit {
    type Output = Unit;

    fn div(self, rhs: &Unit) -> Unit {
        self.multiply(rhs, -1)
    }
}

impl Div for Unit {
    type Output = Unit;

    fn div(self, rhs: Unit) -> Unit {
        self.multiply(&rhs, -1)
    }
}

impl Serialize for Unit {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Unit {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Name(String),
    Integer(i32),
    Times,
    Divide,
    Power,
    Open,
    Close,
}

fn tokenize(input: &str) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(start, c)) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '*' => {
                chars.next();
                if matches!(chars.peek(), Some((_, '*'))) {
                    chars.next();
                    tokens.push(Token::Power);
                } else {
                    tokens.push(Token::Times);
                }
            }
            '^' => {
                chars.next();
                tokens.push(Token::Power);
            }
            '/' => {
                chars.next();
                tokens.push(Token::Divide);
            }
            '(' => {
                chars.next();
                tokens.push(Token::Open);
            }
            ')' => {
                chars.next();
                tokens.push(Token::Close);
            }
            c if c == '-' || c.is_ascii_digit() => {
                chars.next();
                let mut end = start + c.len_utf8();
                while let Some(&(i, d)) = chars.peek() {
                    if !d.is_ascii_digit() {
                        break;
                    }
                    end = i + d.len_utf8();
                    chars.next();
                }
                let value = input[start..end]
                    .parse()
                    .map_err(|_| ParseError::new(input, "invalid exponent"))?;
                tokens.push(Token::Integer(value));
            }
            c if c.is_alphabetic() || c == '_' => {
                let mut end = start;
                while let Some(&(i, d)) = chars.peek() {
                    if !(d.is_alphanumeric() || d == '_') {
                        break;
                    }
                    end = i + d.len_utf8();
                    chars.next();
                }
                tokens.push(Token::Name(input[start..end].to_string()));
            }
            other => {
                return Err(ParseError::new(
                    input,
                    format!("unexpected character '{}'", other),
                ))
            }
        }
    }
    Ok(tokens)
}

struct Parser<'a> {
    input: &'a str,
    tokens: Vec<Token>,
    position: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.position).cloned();
        self.position += 1;
        token
    }

    fn error(&self, reason: &str) -> ParseError {
        ParseError::new(self.input, reason)
    }

    fn bounded(&self, unit: Unit) -> Result<Unit, ParseError> {
        if unit.max_exponent() > MAX_EXPONENT {
            return Err(self.error(&format!("exponent exceeds {}", MAX_EXPONENT)));
        }
        Ok(unit)
    }

    // expression := term (('*' | '/') term)*
    fn expression(&mut self) -> Result<Unit, ParseError> {
        let mut unit = self.term()?;
        loop {
            match self.peek() {
                Some(Token::Times) => {
                    self.position += 1;
                    let rhs = self.term()?;
                    unit = self.bounded(&unit * &rhs)?;
                }
                Some(Token::Divide) => {
                    self.position += 1;
                    let rhs = self.term()?;
                    unit = self.bounded(&unit / &rhs)?;
                }
                _ => return Ok(unit),
            }
        }
    }

    // term := factor (('**' | '^') integer)?
    fn term(&mut self) -> Result<Unit, ParseError> {
        let base = self.factor()?;
        if matches!(self.peek(), Some(Token::Power)) {
            self.position += 1;
            match self.next() {
                Some(Token::Integer(power)) if power.saturating_abs() <= MAX_EXPONENT => {
                    return self.bounded(base.powi(power))
                }
                Some(Token::Integer(_)) => {
                    return Err(self.error(&format!("exponent exceeds {}", MAX_EXPONENT)))
                }
                _ => return Err(self.error("expected integer exponent")),
            }
        }
        Ok(base)
    }

    // factor := name | '1' | '(' expression ')'
    fn factor(&mut self) -> Result<Unit, ParseError> {
        match self.next() {
            Some(Token::Name(name)) => units::lookup(&name)
                .map(Unit::from_definition)
                .ok_or_else(|| ParseError::new(self.input, format!("unknown unit '{}'", name))),
            Some(Token::Integer(1)) => Ok(Unit::dimensionless()),
            Some(Token::Open) => {
                let inner = self.expression()?;
                match self.next() {
                    Some(Token::Close) => Ok(inner),
                    _ => Err(self.error("unbalanced parenthesis")),
                }
            }
            _ => Err(self.error("expected a unit name")),
        }
    }
}

/// Shorthands for the units the impact model refers to by name
pub mod aliases {
    use super::Unit;
    use std::collections::BTreeMap;

    // canonical registry names only; covered by `test_aliases_are_registered`
    fn registered(name: &'static str) -> Unit {
        Unit {
            factors: BTreeMap::from([(name, 1)]),
        }
    }

    /// Electricity mix (kg CO2e per kWh)
    pub fn electricity_mix() -> Unit { registered("electricity_mix") }
    /// 218 business days
    pub fn business_year() -> Unit { registered("business_year") }
    /// Twelfth of a business year
    pub fn business_month() -> Unit { registered("business_month") }
    /// Five business days
    pub fn business_week() -> Unit { registered("business_week") }
    /// Julian year
    pub fn year() -> Unit { registered("year") }
    /// Twelfth of a year
    pub fn month() -> Unit { registered("month") }
    /// Seven days
    pub fn week() -> Unit { registered("week") }
    /// Day
    pub fn day() -> Unit { registered("day") }
    /// Hour
    pub fn hour() -> Unit { registered("hour") }
    /// Minute
    pub fn minute() -> Unit { registered("minute") }
    /// Watt hour
    pub fn watt_hour() -> Unit { registered("watt_hour") }
    /// Kilowatt hour
    pub fn kwh() -> Unit { registered("kilowatt_hour") }
    /// Megajoule
    pub fn megajoule() -> Unit { registered("megajoule") }
    /// Kilogram
    pub fn kilogram() -> Unit { registered("kilogram") }
    /// kg CO2 equivalent
    pub fn kg_co2e() -> Unit { registered("kg_co2e") }
    /// kg antimony equivalent
    pub fn kg_sbe() -> Unit { registered("kg_Sbe") }
    /// mol H+ equivalent
    pub fn mol_hpos() -> Unit { registered("mol_Hpos") }
    /// Disease incidence
    pub fn disease_incidence() -> Unit { registered("disease_incidence") }
    /// kBq U235 equivalent
    pub fn kg_bq_u235e() -> Unit { registered("kg_Bq_u235e") }
    /// Cubic meter
    pub fn cubic_meter() -> Unit { registered("cubic_meter") }
    /// kg of material input
    pub fn kg_mips() -> Unit { registered("kg_mips") }
    /// Generic user device
    pub fn user_device() -> Unit { registered("device") }
    /// Generic device
    pub fn device() -> Unit { registered("device") }
    /// Laptop
    pub fn laptop() -> Unit { registered("laptop") }
    /// Smartphone
    pub fn smartphone() -> Unit { registered("smartphone") }
    /// Tablet
    pub fn tablet() -> Unit { registered("tablet") }
    /// Television
    pub fn television() -> Unit { registered("television") }
    /// Server
    pub fn server() -> Unit { registered("server") }
    /// Gigabyte
    pub fn gigabyte() -> Unit { registered("gigabyte") }
    /// Terabyte
    pub fn terabyte() -> Unit { registered("terabyte") }
    /// One person working one day
    pub fn man_day() -> Unit { registered("man_day") }
    /// People
    pub fn people() -> Unit { registered("people") }
}

#[cfg(test)]
mod tests {
    use super::aliases::*;
    use super::*;

    #[test]
    fn test_parse_single_unit() {
        assert_eq!("server".parse::<Unit>().unwrap(), server());
        assert_eq!("kWh".parse::<Unit>().unwrap(), kwh());
    }

    #[test]
    fn test_parse_compound_unit() {
        let unit: Unit = "kg_co2e / (server * day)".parse().unwrap();
        assert_eq!(unit, &kg_co2e() / &(&server() * &day()));
        assert_eq!(unit.to_string(), "kg_co2e / day / server");

        let chained: Unit = "kg_co2e / server / day".parse().unwrap();
        assert_eq!(unit, chained);
    }

    #[test]
    fn test_parse_exponents() {
        let squared: Unit = "server ** 2".parse().unwrap();
        assert_eq!(squared, &server() * &server());
        assert_eq!(squared.factor_count(), 1);
        assert_eq!("server^2".parse::<Unit>().unwrap(), squared);
        assert_eq!("1 / day".parse::<Unit>().unwrap(), day().powi(-1));
        assert_eq!("day ** -1".parse::<Unit>().unwrap(), day().powi(-1));
    }

    #[test]
    fn test_parse_rejects_unknown_and_malformed() {
        assert!("furlong".parse::<Unit>().is_err());
        assert!("server *".parse::<Unit>().is_err());
        assert!("(server".parse::<Unit>().is_err());
        assert!("server $ day".parse::<Unit>().is_err());
    }

    #[test]
    fn test_multiplication_cancels_identical_units() {
        let per_server = &kg_co2e() / &server();
        assert_eq!(&per_server * &server(), kg_co2e());
    }

    #[test]
    fn test_time_factor() {
        assert!((&server() * &day()).has_time_factor());
        assert!((&day() * &server()).has_time_factor());
        assert!(!server().has_time_factor());
        assert!(!(&server() * &server()).has_time_factor());
        assert!(!man_day().has_time_factor());
    }

    #[test]
    fn test_conversion_factor() {
        assert_eq!(kwh().conversion_factor(&watt_hour()).unwrap(), 1000.0);
        assert_eq!(week().conversion_factor(&day()).unwrap(), 7.0);
        assert!(server().conversion_factor(&laptop()).is_err());
        assert!(day().conversion_factor(&kg_co2e()).is_err());
    }

    #[test]
    fn test_reduced_folds_same_dimension() {
        let unit = &(&server() * &month()) / &day();
        let (reduced, multiplier) = unit.reduced();
        assert_eq!(reduced, server());
        assert!((multiplier - 30.4375).abs() < 1e-9);
    }

    #[test]
    fn test_aliases_are_registered() {
        let all = [
            electricity_mix(), business_year(), business_month(), business_week(), year(),
            month(), week(), day(), hour(), minute(), watt_hour(), kwh(), megajoule(),
            kilogram(), kg_co2e(), kg_sbe(), mol_hpos(), disease_incidence(), kg_bq_u235e(),
            cubic_meter(), kg_mips(), user_device(), device(), laptop(), smartphone(),
            tablet(), television(), server(), gigabyte(), terabyte(), man_day(), people(),
        ];
        for unit in all {
            let name = unit.to_string();
            assert_eq!(crate::units::lookup(&name).map(|d| d.name), Some(name.as_str()));
        }
    }

    #[test]
    fn test_exponent_bounds() {
        assert_eq!("server ** 16".parse::<Unit>().unwrap().max_exponent(), 16);
        assert!("server ** 17".parse::<Unit>().is_err());
        assert!("server ** 2147483647 * server".parse::<Unit>().is_err());
        assert!("(server ** 2147483647) ** 2".parse::<Unit>().is_err());
        assert!("((server ** 4) ** 4) ** 4".parse::<Unit>().is_err());
        assert!("server ** 9 * server ** 9".parse::<Unit>().is_err());
        assert!("1 / server ** -2147483648".parse::<Unit>().is_err());
    }

    #[test]
    fn test_arithmetic_saturates_instead_of_overflowing() {
        let huge = server().powi(i32::MAX);
        assert_eq!(huge.max_exponent(), i32::MAX);
        assert_eq!((&huge * &server()).max_exponent(), i32::MAX);
    }

    #[test]
    fn test_display_round_trip() {
        for raw in ["kg_co2e / server", "day * server", "1 / day", "server ** 2 / kilowatt_hour"] {
            let unit: Unit = raw.parse().unwrap();
            let reparsed: Unit = unit.to_string().parse().unwrap();
            assert_eq!(unit, reparsed);
        }
    }
}
