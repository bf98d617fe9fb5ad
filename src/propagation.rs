//! RSSI propagation model.
//!
//! Combines free-space path loss, material attenuation from a traced
//! [`SignalPath`], and coherent multipath synthesis into a single received
//! signal strength value, clamped at the receiver noise floor.
//!
//! All randomness goes through an injectable [`rand::Rng`], so simulations
//! can run with `thread_rng` in production and a seeded `StdRng` in tests.

use std::f64::consts::{PI, TAU};

use rand::Rng;
use serde::Deserialize;

use crate::Point;
use crate::error::Error;
use crate::grid::MaterialGrid;
use crate::materials::SignalPath;
use crate::raytrace::trace;

/// Speed of light in m/s.
pub const SPEED_OF_LIGHT: f64 = 3e8;

/// Number of reflected paths synthesized by default during batch sampling.
pub const DEFAULT_REFLECTED_PATHS: usize = 3;

/// Linear power floor applied before logarithms, keeps deep fades from
/// producing -inf or NaN.
const LINEAR_POWER_FLOOR_MW: f64 = 1e-10;

/// dBm values below this are treated as the floor power when converted to
/// linear, avoiding numerical underflow being read as exactly zero.
const POWER_FLOOR_THRESHOLD_DBM: f64 = -100.0;

/// Per-reflection extra path loss range in dB.
const REFLECTED_LOSS_MIN_DB: f64 = 3.0;
const REFLECTED_LOSS_MAX_DB: f64 = 20.0;

/// Radio configuration for a simulation run.
///
/// Process-wide constants for a run; the model never mutates them.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct PropagationConfig {
    /// Transmit power at the antenna port in dBm.
    pub tx_power_dbm: f64,
    /// Carrier frequency in Hz.
    pub frequency_hz: f64,
    /// Receiver noise floor in dBm; reported RSSI never goes below this.
    pub noise_floor_dbm: f64,
}

impl Default for PropagationConfig {
    fn default() -> Self {
        Self {
            tx_power_dbm: 20.0,
            frequency_hz: 2.4e9,
            noise_floor_dbm: -96.0,
        }
    }
}

/// Free-space and material propagation model.
pub struct PropagationModel {
    config: PropagationConfig,
    wavelength_m: f64,
}

impl PropagationModel {
    /// Build a model from a configuration.
    ///
    /// # Returns
    ///
    /// `Err(Error::InvalidFrequency)` for a non-positive carrier frequency.
    pub fn new(config: PropagationConfig) -> Result<Self, Error> {
        if !(config.frequency_hz > 0.0) {
            return Err(Error::InvalidFrequency(config.frequency_hz));
        }
        let wavelength_m = SPEED_OF_LIGHT / config.frequency_hz;
        Ok(Self {
            config,
            wavelength_m,
        })
    }

    pub fn config(&self) -> &PropagationConfig {
        &self.config
    }

    /// Free-space path loss in dB at the given distance.
    ///
    /// # Formula
    ///
    /// ```text
    /// FSPL(d) = 20·log₁₀(4π·d/λ)    with λ = c/f
    /// ```
    ///
    /// Strictly increasing in distance, +6.02 dB per doubling (inverse-square
    /// law) at any frequency. The degenerate `d == 0` case returns 0 dB to
    /// avoid `log(0)`.
    pub fn free_space_loss_db(&self, distance_m: f64) -> f64 {
        if distance_m == 0.0 {
            return 0.0;
        }
        20.0 * (4.0 * PI * distance_m / self.wavelength_m).log10()
    }

    /// Superimpose `n_paths` random reflected paths onto a direct-path RSSI.
    ///
    /// Each reflection carries a uniform extra loss in [3, 20] dB and a
    /// uniform phase in [0, 2π); the `cos(phase)` weight models coherent
    /// addition, so reflections can cancel as well as reinforce. With
    /// `n_paths == 0` the input is returned unchanged.
    ///
    /// The total linear power is floored before the final logarithm, so the
    /// result is always a finite dBm value, never NaN or -inf. Note that
    /// strongly aligned phases can push the combined power above the
    /// direct-path level; that is an accepted artifact of the simplified
    /// coherent model.
    pub fn add_multipath<R: Rng + ?Sized>(
        &self,
        rssi_dbm: f64,
        n_paths: usize,
        rng: &mut R,
    ) -> f64 {
        if n_paths == 0 {
            return rssi_dbm;
        }

        let mut power_mw = floored_linear_power(rssi_dbm);
        for _ in 0..n_paths {
            let extra_loss_db = rng.gen_range(REFLECTED_LOSS_MIN_DB..REFLECTED_LOSS_MAX_DB);
            let phase = rng.gen_range(0.0..TAU);
            power_mw += floored_linear_power(rssi_dbm - extra_loss_db) * phase.cos();
        }

        mw_to_dbm(power_mw.max(LINEAR_POWER_FLOOR_MW))
    }

    /// RSSI in dBm at `distance_m` from the transmitter.
    ///
    /// ```text
    /// RSSI = P_tx − FSPL(d) − Σ material losses
    /// ```
    ///
    /// then optional multipath synthesis ([`DEFAULT_REFLECTED_PATHS`]
    /// reflections) and a clamp at the configured noise floor: a receiver
    /// cannot distinguish a weaker signal from no signal at all.
    ///
    /// # Returns
    ///
    /// `Err(Error::InvalidDistance)` for negative distances; that is a caller
    /// contract violation, not a degeneracy to patch over.
    pub fn calculate_rssi<R: Rng + ?Sized>(
        &self,
        distance_m: f64,
        signal_path: Option<&SignalPath>,
        include_multipath: bool,
        rng: &mut R,
    ) -> Result<f64, Error> {
        if !(distance_m >= 0.0) {
            return Err(Error::InvalidDistance(distance_m));
        }

        let path_loss = self.free_space_loss_db(distance_m);
        let material_loss = signal_path
            .map(|path| path.total_attenuation_db(self.config.frequency_hz))
            .unwrap_or(0.0);

        let mut rssi = self.config.tx_power_dbm - path_loss - material_loss;
        if include_multipath {
            rssi = self.add_multipath(rssi, DEFAULT_REFLECTED_PATHS, rng);
        }

        Ok(rssi.max(self.config.noise_floor_dbm))
    }

    /// Sample RSSI for a batch of points from one access point.
    ///
    /// For each point a signal path is traced through `grid` (skipped when no
    /// grid is supplied) and the RSSI computed with multipath enabled. Points
    /// are independent of each other; nothing is shared between iterations
    /// beyond the read-only grid and configuration.
    pub fn collect_samples<R: Rng + ?Sized>(
        &self,
        points: &[Point],
        ap_location: Point,
        grid: Option<&MaterialGrid>,
        rng: &mut R,
    ) -> Result<Vec<f64>, Error> {
        let mut samples = Vec::with_capacity(points.len());
        for point in points {
            let distance = ap_location.distance_to(*point);
            let signal_path = grid.map(|grid| trace(ap_location, *point, grid));
            let rssi = self.calculate_rssi(distance, signal_path.as_ref(), true, rng)?;
            samples.push(rssi);
        }
        Ok(samples)
    }
}

/// Linear power in mW with the underflow floor applied.
fn floored_linear_power(dbm: f64) -> f64 {
    if dbm > POWER_FLOOR_THRESHOLD_DBM {
        dbm_to_mw(dbm)
    } else {
        LINEAR_POWER_FLOOR_MW
    }
}

/// Convert power from dBm to milliwatts: `P(mW) = 10^(P(dBm)/10)`.
pub fn dbm_to_mw(dbm: f64) -> f64 {
    10f64.powf(dbm / 10.0)
}

/// Convert power from milliwatts to dBm: `P(dBm) = 10·log₁₀(P(mW))`.
/// Undefined for non-positive power.
pub fn mw_to_dbm(mw: f64) -> f64 {
    10.0 * mw.log10()
}
