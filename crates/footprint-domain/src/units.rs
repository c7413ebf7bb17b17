//! Unit registry
//!
//! A closed table of named units, each defined by a conversion factor to the
//! base unit of its dimension. Impact indicators (kg CO2e, kg Sb eq, ...) and
//! countable equipment (servers, laptops, ...) are modelled as base dimensions
//! of their own, so a server can never be added to a laptop.

use std::collections::BTreeMap;
use std::fmt;

/// Independent physical or domain dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BaseDimension {
    /// Mass (kilogram)
    Mass,
    /// Length (meter)
    Length,
    /// Time (second)
    Time,
    /// Energy (joule)
    Energy,
    /// Information (byte)
    Information,
    /// Greenhouse gases, CO2 equivalent (kg CO2e)
    Co2e,
    /// Abiotic depletion, antimony equivalent (kg Sb eq)
    Sbe,
    /// Acidification, H+ equivalent (mol H+ eq)
    Hpos,
    /// Fine particles (disease incidence)
    DiseaseIncidence,
    /// Ionizing radiations, U235 equivalent
    U235e,
    /// Material input per service unit (kg MIPS)
    Mips,
    /// Servers
    Server,
    /// Generic end-user devices
    Device,
    /// Laptops
    Laptop,
    /// Smartphones
    Smartphone,
    /// Tablets
    Tablet,
    /// Televisions
    Television,
    /// People
    People,
}

impl BaseDimension {
    /// Name used in dimension strings, e.g. `[time]`
    pub fn as_str(&self) -> &'static str {
        match self {
            BaseDimension::Mass => "mass",
            BaseDimension::Length => "length",
            BaseDimension::Time => "time",
            BaseDimension::Energy => "energy",
            BaseDimension::Information => "information",
            BaseDimension::Co2e => "co2e",
            BaseDimension::Sbe => "sbe",
            BaseDimension::Hpos => "hpos",
            BaseDimension::DiseaseIncidence => "disease_incidence",
            BaseDimension::U235e => "u235e",
            BaseDimension::Mips => "mips",
            BaseDimension::Server => "server",
            BaseDimension::Device => "device",
            BaseDimension::Laptop => "laptop",
            BaseDimension::Smartphone => "smartphone",
            BaseDimension::Tablet => "tablet",
            BaseDimension::Television => "television",
            BaseDimension::People => "people",
        }
    }
}

/// Product of base dimensions with integer exponents
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Dimension(BTreeMap<BaseDimension, i32>);

impl Dimension {
    /// The empty product
    pub fn dimensionless() -> Self {
        Self::default()
    }

    /// A single base dimension raised to the first power
    pub fn of(base: BaseDimension) -> Self {
        Self::from_exponents(&[(base, 1)])
    }

    /// `[time]`
    pub fn time() -> Self {
        Self::of(BaseDimension::Time)
    }

    pub(crate) fn from_exponents(exponents: &[(BaseDimension, i32)]) -> Self {
        let mut dimension = Self::default();
        for &(base, exponent) in exponents {
            dimension.accumulate(base, exponent);
        }
        dimension
    }

    fn accumulate(&mut self, base: BaseDimension, exponent: i32) {
        let entry = self.0.entry(base).or_insert(0);
        *entry = entry.saturating_add(exponent);
        if *entry == 0 {
            self.0.remove(&base);
        }
    }

    /// True when every exponent cancelled out
    pub fn is_dimensionless(&self) -> bool {
        self.0.is_empty()
    }

    /// Exponent of one base dimension (0 when absent)
    pub fn exponent(&self, base: BaseDimension) -> i32 {
        self.0.get(&base).copied().unwrap_or(0)
    }

    /// `self ** power`
    pub fn powi(&self, power: i32) -> Self {
        let mut result = Self::default();
        for (&base, &exponent) in &self.0 {
            result.accumulate(base, exponent.saturating_mul(power));
        }
        result
    }

    /// `self * other`
    pub fn multiply(&self, other: &Dimension) -> Self {
        let mut result = self.clone();
        for (&base, &exponent) in &other.0 {
            result.accumulate(base, exponent);
        }
        result
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "dimensionless");
        }
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(base, exponent)| match exponent {
                1 => format!("[{}]", base.as_str()),
                n => format!("[{}] ** {}", base.as_str(), n),
            })
            .collect();
        write!(f, "{}", parts.join(" * "))
    }
}

/// One entry of the registry
#[derive(Debug, PartialEq)]
pub struct UnitDefinition {
    /// Canonical name, used when serializing
    pub name: &'static str,
    /// Alternative spellings accepted by the parser
    pub aliases: &'static [&'static str],
    /// Multiplier to the base unit of `dimension`
    pub factor: f64,
    dimension: &'static [(BaseDimension, i32)],
}

impl UnitDefinition {
    /// Dimension of one unit
    pub fn dimension(&self) -> Dimension {
        Dimension::from_exponents(self.dimension)
    }

    /// True when this unit is exactly `[time]`
    pub fn is_time(&self) -> bool {
        self.dimension() == Dimension::time()
    }
}

use BaseDimension::*;

const SECONDS_PER_DAY: f64 = 86_400.0;
const SECONDS_PER_YEAR: f64 = 365.25 * SECONDS_PER_DAY;
const BUSINESS_DAYS_PER_YEAR: f64 = 218.0;

macro_rules! unit {
    ($name:literal, [$($alias:literal),*], $factor:expr, [$(($base:ident, $exp:literal)),*]) => {
        UnitDefinition {
            name: $name,
            aliases: &[$($alias),*],
            factor: $factor,
            dimension: &[$(($base, $exp)),*],
        }
    };
}

static REGISTRY: &[UnitDefinition] = &[
    // Time
    unit!("second", ["s", "sec", "seconds"], 1.0, [(Time, 1)]),
    unit!("minute", ["min", "minutes"], 60.0, [(Time, 1)]),
    unit!("hour", ["h", "hr", "hours"], 3_600.0, [(Time, 1)]),
    unit!("day", ["d", "days"], SECONDS_PER_DAY, [(Time, 1)]),
    unit!("week", ["weeks"], 7.0 * SECONDS_PER_DAY, [(Time, 1)]),
    unit!("month", ["months"], SECONDS_PER_YEAR / 12.0, [(Time, 1)]),
    unit!("year", ["a", "yr", "years"], SECONDS_PER_YEAR, [(Time, 1)]),
    unit!("business_week", [], 5.0 * SECONDS_PER_DAY, [(Time, 1)]),
    unit!(
        "business_month",
        [],
        BUSINESS_DAYS_PER_YEAR * SECONDS_PER_DAY / 12.0,
        [(Time, 1)]
    ),
    unit!(
        "business_year",
        [],
        BUSINESS_DAYS_PER_YEAR * SECONDS_PER_DAY,
        [(Time, 1)]
    ),
    // Mass and volume
    unit!("kilogram", ["kg", "kilograms"], 1.0, [(Mass, 1)]),
    unit!("gram", ["g", "grams"], 1e-3, [(Mass, 1)]),
    unit!("tonne", ["t", "tonnes"], 1e3, [(Mass, 1)]),
    unit!("meter", ["m", "meters"], 1.0, [(Length, 1)]),
    unit!("kilometer", ["km", "kilometers"], 1e3, [(Length, 1)]),
    unit!("cubic_meter", ["m3", "cubic_meters"], 1.0, [(Length, 3)]),
    unit!("liter", ["l", "L", "liters"], 1e-3, [(Length, 3)]),
    // Energy and power
    unit!("joule", ["J"], 1.0, [(Energy, 1)]),
    unit!("megajoule", ["MJ"], 1e6, [(Energy, 1)]),
    unit!("watt_hour", ["Wh"], 3_600.0, [(Energy, 1)]),
    unit!("kilowatt_hour", ["kWh", "kwh"], 3.6e6, [(Energy, 1)]),
    unit!("watt", ["W"], 1.0, [(Energy, 1), (Time, -1)]),
    unit!("kilowatt", ["kW"], 1e3, [(Energy, 1), (Time, -1)]),
    // Storage
    unit!("byte", ["B", "bytes"], 1.0, [(Information, 1)]),
    unit!("megabyte", ["MB"], 1e6, [(Information, 1)]),
    unit!("gigabyte", ["GB"], 1e9, [(Information, 1)]),
    unit!("terabyte", ["TB"], 1e12, [(Information, 1)]),
    // Impact indicators
    unit!("kg_co2e", ["kgCO2e", "kg_CO2e"], 1.0, [(Co2e, 1)]),
    unit!("g_co2e", ["gCO2e"], 1e-3, [(Co2e, 1)]),
    unit!("t_co2e", ["tCO2e"], 1e3, [(Co2e, 1)]),
    unit!("kg_Sbe", ["kg_sbe"], 1.0, [(Sbe, 1)]),
    unit!("mol_Hpos", ["mol_hpos"], 1.0, [(Hpos, 1)]),
    unit!("disease_incidence", [], 1.0, [(DiseaseIncidence, 1)]),
    unit!("kg_Bq_u235e", ["kBq_u235e"], 1.0, [(U235e, 1)]),
    unit!("kg_mips", [], 1.0, [(Mips, 1)]),
    unit!("tonne_mips", [], 1e3, [(Mips, 1)]),
    unit!(
        "electricity_mix",
        [],
        1.0 / 3.6e6,
        [(Co2e, 1), (Energy, -1)]
    ),
    // Equipment
    unit!("server", ["servers"], 1.0, [(Server, 1)]),
    unit!("device", ["user_device", "devices"], 1.0, [(Device, 1)]),
    unit!("laptop", ["laptops"], 1.0, [(Laptop, 1)]),
    unit!("smartphone", ["smartphones"], 1.0, [(Smartphone, 1)]),
    unit!("tablet", ["tablets"], 1.0, [(Tablet, 1)]),
    unit!("television", ["televisions", "tv"], 1.0, [(Television, 1)]),
    // Staffing
    unit!("people", ["person", "persons"], 1.0, [(People, 1)]),
    unit!("man_day", ["person_day"], SECONDS_PER_DAY, [(People, 1), (Time, 1)]),
];

/// Look a unit up by canonical name or alias
pub fn lookup(symbol: &str) -> Option<&'static UnitDefinition> {
    REGISTRY
        .iter()
        .find(|def| def.name == symbol || def.aliases.contains(&symbol))
}

/// Every registered unit, in declaration order
pub fn all() -> &'static [UnitDefinition] {
    REGISTRY
}
