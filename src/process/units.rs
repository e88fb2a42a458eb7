// std imports
use std::fmt;
use std::str::FromStr;

// 3rd party imports
use serde::{Deserialize, Serialize};

// internal imports
use crate::process::errors::ProcessError;

const CELSIUS_OFFSET: f64 = 273.15;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeUnit {
    #[serde(rename = "s")]
    Second,
    #[serde(rename = "min", alias = "m")]
    Minute,
    #[serde(rename = "h")]
    Hour,
    #[serde(rename = "d")]
    Day,
}

impl TimeUnit {
    /// Seconds per unit
    ///
    pub fn get_seconds(&self) -> f64 {
        match self {
            TimeUnit::Second => 1.0,
            TimeUnit::Minute => 60.0,
            TimeUnit::Hour => 3_600.0,
            TimeUnit::Day => 86_400.0,
        }
    }
}

impl FromStr for TimeUnit {
    type Err = ProcessError;

    fn from_str(unit: &str) -> Result<Self, Self::Err> {
        match unit {
            "s" => Ok(TimeUnit::Second),
            "m" | "min" => Ok(TimeUnit::Minute),
            "h" => Ok(TimeUnit::Hour),
            "d" => Ok(TimeUnit::Day),
            _ => Err(ProcessError::UnknownUnit(unit.to_string())),
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unit = match self {
            TimeUnit::Second => "s",
            TimeUnit::Minute => "min",
            TimeUnit::Hour => "h",
            TimeUnit::Day => "d",
        };
        write!(f, "{}", unit)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TemperatureUnit {
    #[serde(rename = "C", alias = "celsius")]
    Celsius,
    #[serde(rename = "K", alias = "kelvin")]
    Kelvin,
}

impl FromStr for TemperatureUnit {
    type Err = ProcessError;

    fn from_str(unit: &str) -> Result<Self, Self::Err> {
        match unit.to_lowercase().as_str() {
            "c" | "celsius" => Ok(TemperatureUnit::Celsius),
            "k" | "kelvin" => Ok(TemperatureUnit::Kelvin),
            _ => Err(ProcessError::UnknownUnit(unit.to_string())),
        }
    }
}

/// Converts a duration between units
///
/// # Arguments
/// * `value` - Duration
/// * `from` - Unit of `value`
/// * `to` - Target unit
///
pub fn convert_time(value: f64, from: TimeUnit, to: TimeUnit) -> f64 {
    value * from.get_seconds() / to.get_seconds()
}

/// Converts a temperature between Celsius and Kelvin
///
/// # Arguments
/// * `value` - Temperature
/// * `from` - Unit of `value`
/// * `to` - Target unit
///
pub fn convert_temperature(value: f64, from: TemperatureUnit, to: TemperatureUnit) -> f64 {
    match (from, to) {
        (TemperatureUnit::Celsius, TemperatureUnit::Kelvin) => value + CELSIUS_OFFSET,
        (TemperatureUnit::Kelvin, TemperatureUnit::Celsius) => value - CELSIUS_OFFSET,
        _ => value,
    }
}
