//! The mash model: rest schedule plus every derived volume.
//!
//! Every edit runs the full recompute pass:
//! 1. Infusion cascade over the rests, accumulating water in the mash
//! 2. Downstream cascade (losses, runoff, sparge, totals, tun fit)
//!
//! Derived values are written to the [`ResultSink`] in dependency order, so a
//! sink never observes a value computed from a stale upstream slot.

use crate::config::MashConfig;
use crate::equations::{self, BOILING_WATER_TEMP, MAX_RESTS, MAX_REST_TEMP};
use crate::{
    FormParameters, Infusion, InitialParameters, MashResults, ParameterKey, ParameterStore,
    Rest, Result, ResultKey, ResultSink,
};

/// Rest schedule and derived volumes, driven through its public operations
#[derive(Debug)]
pub struct MashModel<P, S> {
    params: P,
    sink: S,
    rests: Vec<Rest>,
    infusions: Vec<Infusion>,
    results: MashResults,
    track_hops: bool,
    default_rest_temperature: f64,
}

impl<P: ParameterStore, S: ResultSink> MashModel<P, S> {
    /// Create a model with an empty schedule and default switches
    pub fn new(params: P, sink: S) -> Self {
        Self::with_config(params, sink, &MashConfig::default())
    }

    pub fn with_config(params: P, sink: S, config: &MashConfig) -> Self {
        Self {
            params,
            sink,
            rests: Vec::new(),
            infusions: Vec::new(),
            results: MashResults::default(),
            track_hops: config.track_hops,
            default_rest_temperature: config.default_rest_temperature,
        }
    }

    /// Apply the startup payload, compute everything once and make sure the
    /// schedule holds at least one rest
    pub fn initialize(&mut self, payload: &InitialParameters) {
        payload.apply(&mut self.params);
        tracing::debug!("Applied initial parameters: {:?}", payload);

        if self.rests.is_empty() {
            self.add_rest();
        } else {
            self.recompute();
        }
    }

    pub fn rests(&self) -> &[Rest] {
        &self.rests
    }

    pub fn infusions(&self) -> &[Infusion] {
        &self.infusions
    }

    pub fn results(&self) -> &MashResults {
        &self.results
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    // ========================================================================
    // Rest schedule
    // ========================================================================

    /// Append a rest; silently ignored once the schedule is full
    pub fn add_rest(&mut self) {
        if self.rests.len() >= MAX_RESTS {
            tracing::debug!("Schedule already holds {} rests, not adding", MAX_RESTS);
            return;
        }

        let target_temperature = match self.rests.last() {
            Some(previous) => previous.target_temperature,
            None => self
                .default_rest_temperature
                .max(self.param(ParameterKey::GrainTemp))
                .min(MAX_REST_TEMP),
        };

        self.rests.push(Rest {
            index: self.rests.len(),
            target_temperature,
        });
        tracing::debug!(
            "Added rest {} at {:.1}",
            self.rests.len(),
            target_temperature
        );

        self.recompute();
    }

    /// Remove the last rest; the schedule never drops below one rest
    pub fn remove_rest(&mut self) {
        if self.rests.len() <= 1 {
            tracing::debug!("Keeping the last remaining rest");
            return;
        }

        self.rests.pop();
        tracing::debug!("Removed rest {}", self.rests.len() + 1);
        self.recompute();
    }

    /// Set the target of rest `index`, then push later rests up so the
    /// schedule never cools down
    ///
    /// The new value is bounded below by the previous rest (the grain
    /// temperature for the first rest) and above by [`MAX_REST_TEMP`].
    pub fn set_rest_temperature(&mut self, index: usize, temperature: f64) -> Result<()> {
        if index >= self.rests.len() {
            return Err(crate::Error::RestIndex {
                index,
                len: self.rests.len(),
            });
        }

        let temperature = if temperature.is_finite() {
            temperature
        } else {
            tracing::warn!(
                "Rest {} temperature {} is not a number, using 0",
                index + 1,
                temperature
            );
            0.0
        };

        let floor = match index {
            0 => self.param(ParameterKey::GrainTemp),
            _ => self.rests[index - 1].target_temperature,
        };
        let clamped = temperature.max(floor).min(MAX_REST_TEMP);
        if clamped != temperature {
            tracing::debug!(
                "Rest {} temperature {:.1} clamped to {:.1}",
                index + 1,
                temperature,
                clamped
            );
        }
        self.rests[index].target_temperature = clamped;

        for j in index + 1..self.rests.len() {
            let min = self.rests[j - 1].target_temperature;
            if self.rests[j].target_temperature < min {
                self.rests[j].target_temperature = min;
            }
        }

        self.recompute();
        Ok(())
    }

    // ========================================================================
    // Parameters
    // ========================================================================

    /// Store a parameter value and recompute
    pub fn set_parameter(&mut self, key: ParameterKey, value: f64) {
        self.params.set(key, value);
        tracing::debug!("Parameter {} set to {}", key, value);
        self.recompute();
    }

    /// Read a parameter, substituting 0 for anything non-numeric
    fn param(&self, key: ParameterKey) -> f64 {
        match self.params.get(key) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("{}; using 0", e);
                0.0
            }
        }
    }

    // ========================================================================
    // Recompute cascade
    // ========================================================================

    /// Recompute every derived value from the parameters and rest schedule
    pub fn recompute(&mut self) {
        let total_infusion_volume = self.recompute_infusions();
        self.recompute_downstream(total_infusion_volume);

        tracing::debug!(
            "Recomputed {} infusions, sparge {:.2} L, total mash {:.2} L",
            self.infusions.len(),
            self.results.sparge_volume,
            self.results.total_mash_volume
        );
    }

    /// Walk the rests in order, returning the total water infused
    fn recompute_infusions(&mut self) -> f64 {
        let grain = self.param(ParameterKey::GrainMass);
        let ratio = self.param(ParameterKey::MashThickness);
        let grain_temp = self.param(ParameterKey::GrainTemp);

        let mut water_in_mash = 0.0;
        let mut infusions = Vec::with_capacity(self.rests.len());

        for (i, rest) in self.rests.iter().enumerate() {
            let t2 = rest.target_temperature;
            let (t1, tw) = if i == 0 {
                (
                    grain_temp,
                    equations::strike_temperature(grain, ratio, grain_temp, t2),
                )
            } else {
                (self.rests[i - 1].target_temperature, BOILING_WATER_TEMP)
            };

            let volume = if tw.is_finite() {
                equations::infusion_volume(grain, water_in_mash, t1, t2, tw)
            } else {
                None
            };

            let infusion = match volume {
                Some(volume) => Infusion {
                    index: i,
                    temperature: tw,
                    volume,
                    achievable: true,
                },
                None => {
                    tracing::warn!(
                        "Infusion {} cannot reach {:.1} with water at {:.1}",
                        i + 1,
                        t2,
                        tw
                    );
                    Infusion {
                        index: i,
                        temperature: tw,
                        volume: 0.0,
                        achievable: false,
                    }
                }
            };

            water_in_mash += infusion.volume;
            infusions.push(infusion);
        }

        for infusion in &infusions {
            self.sink
                .write(ResultKey::InfusionTemperature(infusion.index), infusion.temperature);
            self.sink
                .write(ResultKey::InfusionVolume(infusion.index), infusion.volume);
            self.sink
                .mark_status(ResultKey::InfusionVolume(infusion.index), infusion.achievable);
        }
        self.sink.clear_infusions_from(infusions.len());

        self.infusions = infusions;
        water_in_mash
    }

    fn recompute_downstream(&mut self, total_infusion_volume: f64) {
        let grain = self.param(ParameterKey::GrainMass);

        let grain_loss = equations::grain_loss(grain);
        let hops_loss = if self.track_hops {
            equations::hops_loss(self.param(ParameterKey::TotalHops))
        } else {
            0.0
        };
        let boil_loss = equations::boil_loss(
            self.param(ParameterKey::BoilLength),
            self.param(ParameterKey::EvaporationRate),
        );
        let runoff_volume = equations::runoff_volume(
            self.param(ParameterKey::BatchVolume),
            self.param(ParameterKey::TrubLoss),
            hops_loss,
            boil_loss,
        );
        let sparge_volume = equations::sparge_volume(
            runoff_volume,
            grain_loss,
            self.param(ParameterKey::EquipmentLoss),
            total_infusion_volume,
        );
        let total_mash_water_volume = total_infusion_volume + sparge_volume;
        let total_mash_volume = equations::total_mash_volume(total_infusion_volume, grain);
        let fits_in_tun = total_mash_volume < self.param(ParameterKey::MashTunVolume);

        self.results = MashResults {
            grain_loss,
            hops_loss,
            boil_loss,
            runoff_volume,
            total_infusion_volume,
            sparge_volume,
            total_mash_water_volume,
            total_mash_volume,
            fits_in_tun,
        };

        for key in ResultKey::SUMMARY {
            if let Some(value) = self.results.get(key) {
                self.sink.write(key, value);
            }
        }
        self.sink.mark_status(ResultKey::TotalMashVolume, fits_in_tun);

        if !fits_in_tun {
            tracing::info!(
                "Mash volume {:.2} L does not fit the tun",
                total_mash_volume
            );
        }
    }
}

impl<S: ResultSink> MashModel<FormParameters, S> {
    /// Store raw field text (numeric or not) and recompute
    pub fn set_parameter_input(&mut self, key: ParameterKey, input: &str) {
        self.params.set_input(key, input);
        tracing::debug!("Parameter {} input set to {:?}", key, input);
        self.recompute();
    }
}
