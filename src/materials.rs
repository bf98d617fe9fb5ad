//! Building materials and their RF attenuation.
//!
//! Contains:
//! - [`Material`]: immutable physical description of a building material
//! - [`MaterialLayer`] / [`SignalPath`]: the ordered stack of materials a
//!   signal crosses between transmitter and receiver
//! - A catalog of common building materials with typical electrical
//!   properties at WiFi frequencies
//!
//! Attenuation uses a simplified plane-wave propagation model driven by the
//! material's complex permittivity.

use std::f64::consts::PI;

use num_complex::Complex64;

use crate::error::Error;

/// Vacuum permittivity ε₀ in F/m.
const EPSILON_0: f64 = 8.854e-12;
/// Vacuum permeability μ₀ in H/m.
const MU_0: f64 = 4.0 * PI * 1e-7;
/// Nepers to decibels: 20/ln(10).
const DB_PER_NEPER: f64 = 8.686;

/// A building material and its RF properties.
///
/// Plain immutable value type with field-wise equality: two materials with
/// identical fields are interchangeable. Safe to share by reference, there is
/// no per-instance mutable state.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    /// Dielectric constant εᵣ (relative to vacuum, ≥ 1).
    pub relative_permittivity: f64,
    /// Electrical conductivity σ in S/m (≥ 0).
    pub conductivity: f64,
    /// Default wall thickness in meters (> 0).
    pub default_thickness: f64,
}

impl Material {
    /// Create a material, rejecting physically invalid fields.
    ///
    /// # Returns
    ///
    /// `Err(Error::InvalidMaterial)` if εᵣ < 1, σ < 0, or thickness ≤ 0.
    /// Invalid fields are never silently clamped.
    pub fn new(
        name: impl Into<String>,
        relative_permittivity: f64,
        conductivity: f64,
        default_thickness: f64,
    ) -> Result<Self, Error> {
        let name = name.into();
        let reject = |reason: &str| Error::InvalidMaterial {
            name: name.clone(),
            reason: reason.to_string(),
        };
        if !relative_permittivity.is_finite() || relative_permittivity < 1.0 {
            return Err(reject("relative permittivity must be >= 1"));
        }
        if !conductivity.is_finite() || conductivity < 0.0 {
            return Err(reject("conductivity must be non-negative"));
        }
        if !default_thickness.is_finite() || default_thickness <= 0.0 {
            return Err(reject("default thickness must be positive"));
        }
        Ok(Self {
            name,
            relative_permittivity,
            conductivity,
            default_thickness,
        })
    }

    /// Attenuation constant α in Np/m at the given frequency.
    ///
    /// # Formula
    ///
    /// ```text
    /// εᵣ_c = εᵣ − j·σ/(ω·ε₀)          complex relative permittivity
    /// γ    = jω·√(μ₀·ε₀·εᵣ_c)         complex propagation constant
    /// α    = Re(γ)
    /// ```
    ///
    /// For any physically valid material (εᵣ ≥ 1, σ ≥ 0) the result is
    /// finite and ≥ 0; with σ = 0 the permittivity is purely real and α
    /// collapses to 0 (lossless dielectric).
    pub fn attenuation_constant(&self, frequency_hz: f64) -> f64 {
        let omega = 2.0 * PI * frequency_hz;
        let permittivity = Complex64::new(
            self.relative_permittivity,
            -self.conductivity / (omega * EPSILON_0),
        );
        let gamma = Complex64::i() * omega * (permittivity * MU_0 * EPSILON_0).sqrt();
        gamma.re
    }

    /// Signal attenuation in dB through one default-thickness slab of this
    /// material at the given frequency.
    pub fn attenuation_db(&self, frequency_hz: f64) -> f64 {
        DB_PER_NEPER * self.attenuation_constant(frequency_hz) * self.default_thickness
    }
}

/// One material slab crossed by the signal.
///
/// Owned exclusively by the [`SignalPath`] that created it.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialLayer {
    pub material: Material,
    pub thickness_multiplier: f64,
}

impl MaterialLayer {
    /// Traversed thickness in meters: default thickness × multiplier.
    pub fn effective_thickness(&self) -> f64 {
        self.material.default_thickness * self.thickness_multiplier
    }

    /// Attenuation in dB through this layer at its effective thickness.
    pub fn attenuation_db(&self, frequency_hz: f64) -> f64 {
        DB_PER_NEPER * self.material.attenuation_constant(frequency_hz) * self.effective_thickness()
    }
}

/// Ordered sequence of material layers between transmitter and receiver.
///
/// Insertion order is meaningful for reporting only; the total attenuation is
/// additive in dB, so layers commute. Created per (AP, sample point) pair by
/// the ray tracer and discarded after the RSSI is computed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignalPath {
    layers: Vec<MaterialLayer>,
}

impl SignalPath {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a layer with the given thickness multiplier.
    pub fn add_layer(&mut self, material: Material, thickness_multiplier: f64) {
        self.layers.push(MaterialLayer {
            material,
            thickness_multiplier,
        });
    }

    pub fn layers(&self) -> &[MaterialLayer] {
        &self.layers
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Total attenuation in dB along the path. An empty path is lossless.
    pub fn total_attenuation_db(&self, frequency_hz: f64) -> f64 {
        self.layers
            .iter()
            .map(|layer| layer.attenuation_db(frequency_hz))
            .sum()
    }
}

// Common building materials with typical electrical properties.
// Field order: εᵣ, σ (S/m), default thickness (m).

pub fn concrete() -> Material {
    Material {
        name: "concrete".to_string(),
        relative_permittivity: 4.5,
        conductivity: 0.014,
        default_thickness: 0.2,
    }
}

pub fn glass() -> Material {
    Material {
        name: "glass".to_string(),
        relative_permittivity: 6.0,
        conductivity: 0.004,
        default_thickness: 0.006,
    }
}

pub fn wood() -> Material {
    Material {
        name: "wood".to_string(),
        relative_permittivity: 2.1,
        conductivity: 0.002,
        default_thickness: 0.04,
    }
}

pub fn drywall() -> Material {
    Material {
        name: "drywall".to_string(),
        relative_permittivity: 2.0,
        conductivity: 0.001,
        default_thickness: 0.016,
    }
}

pub fn metal() -> Material {
    Material {
        name: "metal".to_string(),
        relative_permittivity: 1.0,
        conductivity: 1e7,
        default_thickness: 0.002,
    }
}

/// The built-in material catalog.
pub fn standard_materials() -> Vec<Material> {
    vec![concrete(), glass(), wood(), drywall(), metal()]
}
