//! Core domain types for the mash water calculator.
//!
//! This module defines the fundamental types used throughout the system:
//! - Parameter keys (the user-editable input fields)
//! - Result keys (the derived slots written to the result sink)
//! - Rests, infusions and the derived volume snapshot

use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Parameter Keys
// ============================================================================

/// Named scalar input of the calculator
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum ParameterKey {
    /// Total grain bill (kg)
    GrainMass,
    /// Water-to-grain ratio (L/kg)
    MashThickness,
    /// Temperature of the dry grain (°C)
    GrainTemp,
    /// Volume into the fermenter (L)
    BatchVolume,
    /// Boil-off rate (L/hr)
    EvaporationRate,
    /// Boil length (min)
    BoilLength,
    /// Dead space in mash tun and plumbing (L)
    EquipmentLoss,
    /// Volume left behind in the kettle (L)
    TrubLoss,
    /// Usable mash tun capacity (L)
    MashTunVolume,
    /// Total hop additions (g)
    TotalHops,
}

impl ParameterKey {
    /// Every parameter, in form order
    pub const ALL: [ParameterKey; 10] = [
        ParameterKey::GrainMass,
        ParameterKey::MashThickness,
        ParameterKey::GrainTemp,
        ParameterKey::BatchVolume,
        ParameterKey::EvaporationRate,
        ParameterKey::BoilLength,
        ParameterKey::EquipmentLoss,
        ParameterKey::TrubLoss,
        ParameterKey::MashTunVolume,
        ParameterKey::TotalHops,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ParameterKey::GrainMass => "grain_mass",
            ParameterKey::MashThickness => "mash_thickness",
            ParameterKey::GrainTemp => "grain_temp",
            ParameterKey::BatchVolume => "batch_volume",
            ParameterKey::EvaporationRate => "evaporation_rate",
            ParameterKey::BoilLength => "boil_length",
            ParameterKey::EquipmentLoss => "equipment_loss",
            ParameterKey::TrubLoss => "trub_loss",
            ParameterKey::MashTunVolume => "mash_tun_volume",
            ParameterKey::TotalHops => "total_hops",
        }
    }
}

impl fmt::Display for ParameterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ParameterKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('-', "_");
        ParameterKey::ALL
            .iter()
            .copied()
            .find(|k| k.name() == wanted)
            .ok_or_else(|| Error::UnknownParameter(s.to_string()))
    }
}

// ============================================================================
// Result Keys
// ============================================================================

/// Named derived slot written by the model
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum ResultKey {
    /// Water temperature for the infusion reaching rest `n`
    InfusionTemperature(usize),
    /// Water volume for the infusion reaching rest `n`
    InfusionVolume(usize),
    GrainLoss,
    HopsLoss,
    BoilLoss,
    RunoffVolume,
    TotalInfusionVolume,
    SpargeVolume,
    TotalMashWaterVolume,
    TotalMashVolume,
}

impl ResultKey {
    /// Summary slots, in table order
    pub const SUMMARY: [ResultKey; 8] = [
        ResultKey::GrainLoss,
        ResultKey::HopsLoss,
        ResultKey::BoilLoss,
        ResultKey::RunoffVolume,
        ResultKey::TotalInfusionVolume,
        ResultKey::SpargeVolume,
        ResultKey::TotalMashWaterVolume,
        ResultKey::TotalMashVolume,
    ];

    /// Whether the slot holds a volume (and therefore has a gallon twin)
    pub fn is_volume(&self) -> bool {
        !matches!(self, ResultKey::InfusionTemperature(_))
    }

    /// Human readable label used by table renderers
    pub fn label(&self) -> String {
        match self {
            ResultKey::InfusionTemperature(i) => format!("Infusion {} temperature", i + 1),
            ResultKey::InfusionVolume(i) => format!("Infusion {} volume", i + 1),
            ResultKey::GrainLoss => "Grain absorption".into(),
            ResultKey::HopsLoss => "Hop absorption".into(),
            ResultKey::BoilLoss => "Boil-off".into(),
            ResultKey::RunoffVolume => "Runoff".into(),
            ResultKey::TotalInfusionVolume => "Total infusion".into(),
            ResultKey::SpargeVolume => "Sparge".into(),
            ResultKey::TotalMashWaterVolume => "Total mash water".into(),
            ResultKey::TotalMashVolume => "Total mash volume".into(),
        }
    }
}

impl fmt::Display for ResultKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultKey::InfusionTemperature(i) => write!(f, "infusion_{}_temperature", i + 1),
            ResultKey::InfusionVolume(i) => write!(f, "infusion_{}_volume", i + 1),
            ResultKey::GrainLoss => f.write_str("grain_loss"),
            ResultKey::HopsLoss => f.write_str("hops_loss"),
            ResultKey::BoilLoss => f.write_str("boil_loss"),
            ResultKey::RunoffVolume => f.write_str("runoff_volume"),
            ResultKey::TotalInfusionVolume => f.write_str("total_infusion_volume"),
            ResultKey::SpargeVolume => f.write_str("sparge_volume"),
            ResultKey::TotalMashWaterVolume => f.write_str("total_mash_water_volume"),
            ResultKey::TotalMashVolume => f.write_str("total_mash_volume"),
        }
    }
}

// ============================================================================
// Rest and Infusion Types
// ============================================================================

/// A held target temperature in the mash schedule
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Rest {
    pub index: usize,
    pub target_temperature: f64,
}

/// Water addition that brings the mash up to the paired rest
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Infusion {
    pub index: usize,
    /// Temperature of the water added (°C)
    pub temperature: f64,
    /// Volume of water added (L); 0 when not achievable
    pub volume: f64,
    /// False when the infusion water is no hotter than the rest target
    pub achievable: bool,
}

// ============================================================================
// Derived Volumes
// ============================================================================

/// Snapshot of every derived scalar after a recompute
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct MashResults {
    pub grain_loss: f64,
    pub hops_loss: f64,
    pub boil_loss: f64,
    pub runoff_volume: f64,
    pub total_infusion_volume: f64,
    pub sparge_volume: f64,
    pub total_mash_water_volume: f64,
    pub total_mash_volume: f64,
    pub fits_in_tun: bool,
}

impl MashResults {
    /// Value of a summary slot; `None` for per-infusion slots
    pub fn get(&self, key: ResultKey) -> Option<f64> {
        match key {
            ResultKey::GrainLoss => Some(self.grain_loss),
            ResultKey::HopsLoss => Some(self.hops_loss),
            ResultKey::BoilLoss => Some(self.boil_loss),
            ResultKey::RunoffVolume => Some(self.runoff_volume),
            ResultKey::TotalInfusionVolume => Some(self.total_infusion_volume),
            ResultKey::SpargeVolume => Some(self.sparge_volume),
            ResultKey::TotalMashWaterVolume => Some(self.total_mash_water_volume),
            ResultKey::TotalMashVolume => Some(self.total_mash_volume),
            ResultKey::InfusionTemperature(_) | ResultKey::InfusionVolume(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameter_key_parse() {
        assert_eq!(
            "grain_mass".parse::<ParameterKey>().unwrap(),
            ParameterKey::GrainMass
        );
        assert_eq!(
            "Mash-Tun-Volume".parse::<ParameterKey>().unwrap(),
            ParameterKey::MashTunVolume
        );
        assert!(matches!(
            "hops".parse::<ParameterKey>(),
            Err(Error::UnknownParameter(_))
        ));
    }

    #[test]
    fn test_parameter_key_display_matches_serde() {
        for key in ParameterKey::ALL {
            let json = serde_json::to_string(&key).unwrap();
            assert_eq!(json, format!("\"{}\"", key));
        }
    }

    #[test]
    fn test_result_key_units() {
        assert!(!ResultKey::InfusionTemperature(0).is_volume());
        assert!(ResultKey::InfusionVolume(0).is_volume());
        assert!(ResultKey::SUMMARY.iter().all(|k| k.is_volume()));
        assert_eq!(ResultKey::InfusionVolume(2).to_string(), "infusion_3_volume");
    }
}
