//! Unit conversions offered by the `convert*` commands.

use std::fmt;

const KM_PER_MILE: f64 = 1.609344;

/// A unit a value can be converted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Mph,
    Kmh,
    Celsius,
    Fahrenheit,
}

impl Unit {
    /// The unit a value in `self` converts to.
    pub fn counterpart(self) -> Unit {
        match self {
            Unit::Mph => Unit::Kmh,
            Unit::Kmh => Unit::Mph,
            Unit::Celsius => Unit::Fahrenheit,
            Unit::Fahrenheit => Unit::Celsius,
        }
    }

    pub fn convert(self, value: f64) -> f64 {
        match self {
            Unit::Mph => value * KM_PER_MILE,
            Unit::Kmh => value / KM_PER_MILE,
            Unit::Celsius => value * 9.0 / 5.0 + 32.0,
            Unit::Fahrenheit => (value - 32.0) * 5.0 / 9.0,
        }
    }

    fn suffix(self) -> &'static str {
        match self {
            Unit::Mph => " mph",
            Unit::Kmh => " km/h",
            Unit::Celsius => "°C",
            Unit::Fahrenheit => "°F",
        }
    }
}

/// A value tagged with its unit, printed with one decimal place.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quantity(pub f64, pub Unit);

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}{}", self.0, self.1.suffix())
    }
}

/// `"<value> is <converted>"`, e.g. `60.0 mph is 96.6 km/h`.
pub fn describe(unit: Unit, value: f64) -> String {
    let from = Quantity(value, unit);
    let to = Quantity(unit.convert(value), unit.counterpart());
    format!("{} is {}", from, to)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn speed() {
        assert_eq!(describe(Unit::Mph, 60.0), "60.0 mph is 96.6 km/h");
        assert_eq!(describe(Unit::Kmh, 100.0), "100.0 km/h is 62.1 mph");
    }

    #[test]
    fn temperature() {
        assert_eq!(describe(Unit::Celsius, 100.0), "100.0°C is 212.0°F");
        assert_eq!(describe(Unit::Fahrenheit, 32.0), "32.0°F is 0.0°C");
        assert_eq!(describe(Unit::Celsius, -40.0), "-40.0°C is -40.0°F");
    }
}
