/// Mass of a proton in Dalton
///
pub const PROTON_MASS: f64 = 1.0072764665789;

/// Neutral mass of an ion from its charge and m/z.
///
/// # Arguments
/// * `charge` - Charge state
/// * `mz` - Mass to charge ratio
///
pub fn neutral_mass(charge: f64, mz: f64) -> f64 {
    charge * (mz - PROTON_MASS)
}

/// Mass as if the ion was singly protonated, which DynamX reports as `Center` in state data.
///
/// # Arguments
/// * `charge` - Charge state
/// * `mz` - Mass to charge ratio
///
pub fn singly_charged_mass(charge: f64, mz: f64) -> f64 {
    neutral_mass(charge, mz) + PROTON_MASS
}
