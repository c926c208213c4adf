//! Infusion and loss equations.
//!
//! Infusion equations (Palmer, 2017):
//! - Initial infusion: `Tw = (0.41 / r)(T2 - T1) + T2`
//! - Mash infusion:    `Wa = (T2 - T1)(0.41 G + Wm) / (Tw - T2)`
//!
//! where `r` is the water to grain ratio, `Wa` the water added, `Wm` the water
//! already in the mash, `T1` the current mash temperature, `T2` the target,
//! `Tw` the infusion water temperature and `G` the grain mass.

/// Thermal mass of grain relative to water
pub const TD_CONSTANT: f64 = 0.41;

/// Upper bound on the schedule length
pub const MAX_RESTS: usize = 5;

/// Liters per US gallon
pub const L_PER_GAL: f64 = 3.785;

/// Temperature of every infusion after the strike
pub const BOILING_WATER_TEMP: f64 = 100.0;

/// Default target of the first rest
pub const DEFAULT_REST_TEMP: f64 = 68.0;

/// Hottest rest the schedule accepts
pub const MAX_REST_TEMP: f64 = 80.0;

/// L absorbed per kg of grain
pub const GRAIN_LOSS_FACTOR: f64 = 1.04;

/// L absorbed per g of hops (0.4 L per 28 g)
pub const HOPS_LOSS_RATE: f64 = 0.0143;

/// Post-boil shrinkage of the wort
pub const SHRINKAGE_COEFF: f64 = 0.96;

/// L displaced per kg of grain
pub const GRAIN_DISPLACEMENT: f64 = 0.67;

/// Strike water temperature needed to bring dry grain from `t1` to `t2`
pub fn strike_temperature(_grain: f64, ratio: f64, t1: f64, t2: f64) -> f64 {
    (TD_CONSTANT / ratio) * (t2 - t1) + t2
}

/// Volume of `tw` water needed to raise the mash from `t1` to `t2`
///
/// Returns `None` when the infusion water is at the target temperature (the
/// equation divides by zero) or the result is otherwise not finite.
pub fn infusion_volume(grain: f64, water: f64, t1: f64, t2: f64, tw: f64) -> Option<f64> {
    let lift = tw - t2;
    if lift == 0.0 {
        return None;
    }

    let volume = (t2 - t1) * (TD_CONSTANT * grain + water) / lift;
    volume.is_finite().then_some(volume)
}

pub fn grain_loss(grain: f64) -> f64 {
    grain * GRAIN_LOSS_FACTOR
}

pub fn hops_loss(total_hops: f64) -> f64 {
    total_hops * HOPS_LOSS_RATE
}

/// Volume boiled off over `boil_length` minutes
pub fn boil_loss(boil_length: f64, evaporation_rate: f64) -> f64 {
    (boil_length / 60.0) * evaporation_rate
}

/// Pre-boil volume drawn off the mash tun
pub fn runoff_volume(batch_volume: f64, trub_loss: f64, hops_loss: f64, boil_loss: f64) -> f64 {
    ((batch_volume + trub_loss + hops_loss) / SHRINKAGE_COEFF) + boil_loss
}

/// Water still needed after the infusions
pub fn sparge_volume(runoff: f64, grain_loss: f64, equipment_loss: f64, infusion: f64) -> f64 {
    (runoff + grain_loss + equipment_loss) - infusion
}

/// Volume occupied by water and grain in the tun
pub fn total_mash_volume(infusion: f64, grain: f64) -> f64 {
    infusion + grain * GRAIN_DISPLACEMENT
}

pub fn liters_to_gallons(liters: f64) -> f64 {
    liters / L_PER_GAL
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_strike_temperature_worked_example() {
        let strike = strike_temperature(5.0, 2.5, 20.0, 67.0);
        assert!(approx(strike, 74.708));
    }

    #[test]
    fn test_first_infusion_matches_mash_thickness() {
        // Strike volume collapses to ratio * grain
        let strike = strike_temperature(5.0, 2.5, 20.0, 67.0);
        let volume = infusion_volume(5.0, 0.0, 20.0, 67.0, strike).unwrap();
        assert!(approx(volume, 12.5));
    }

    #[test]
    fn test_thinner_mash_needs_hotter_strike() {
        let ratios = [4.0, 3.5, 3.0, 2.5, 2.0, 1.5, 1.0];
        let strikes: Vec<f64> = ratios
            .iter()
            .map(|r| strike_temperature(5.0, *r, 18.0, 66.0))
            .collect();

        for pair in strikes.windows(2) {
            assert!(pair[1] > pair[0]);
        }
    }

    #[test]
    fn test_infusion_volume_grows_with_lift() {
        let mut previous = 0.0;
        for t2 in [62.0, 65.0, 68.0, 72.0, 76.0] {
            let volume = infusion_volume(5.0, 12.5, 60.0, t2, BOILING_WATER_TEMP).unwrap();
            assert!(volume > 0.0);
            assert!(volume > previous);
            previous = volume;
        }
    }

    #[test]
    fn test_degenerate_infusion() {
        assert_eq!(infusion_volume(5.0, 0.0, 20.0, 67.0, 67.0), None);
        assert_eq!(infusion_volume(5.0, 0.0, 20.0, 67.0, f64::NAN), None);
    }

    #[test]
    fn test_boil_and_runoff_worked_example() {
        let boil = boil_loss(90.0, 3.0);
        assert!(approx(boil, 4.5));
        assert!(approx(runoff_volume(20.0, 1.0, 0.0, boil), 26.375));
    }

    #[test]
    fn test_losses() {
        assert!(approx(grain_loss(5.0), 5.2));
        assert!(approx(hops_loss(100.0), 1.43));
        assert!(approx(total_mash_volume(12.5, 5.0), 15.85));
        assert!(approx(sparge_volume(26.375, 5.2, 1.0, 12.5), 20.075));
        assert!(approx(liters_to_gallons(3.785), 1.0));
    }
}
