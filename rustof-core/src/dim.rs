//! Dimension labels for neutron data.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Closed set of dimension labels used by neutron data containers.
///
/// Labels name both array axes (e.g. [`Dim::Spectrum`], [`Dim::Tof`]) and
/// beamline metadata coordinates (e.g. [`Dim::SourcePosition`]). The set is
/// fixed at compile time; there is no runtime label registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Dim {
    /// Time-of-flight, the raw measured axis.
    Tof,
    /// Crystal lattice spacing (Bragg's law).
    DSpacing,
    /// Neutron wavelength.
    Wavelength,
    /// Neutron kinetic energy.
    Energy,
    /// Energy transfer in inelastic scattering.
    EnergyTransfer,
    /// Momentum transfer magnitude.
    Q,
    /// Detector spectrum (pixel) axis.
    Spectrum,
    /// Flat event axis of ragged buffers.
    Event,
    /// Per-detector pixel position.
    Position,
    /// Neutron source position.
    SourcePosition,
    /// Sample position.
    SamplePosition,
    /// Fixed incident energy (direct-geometry inelastic).
    IncidentEnergy,
    /// Fixed final energy (indirect-geometry inelastic).
    FinalEnergy,
    /// Source-to-sample beam vector.
    IncidentBeam,
    /// Sample-to-detector beam vector.
    ScatteredBeam,
    /// Full scattering angle.
    TwoTheta,
    /// Generic auxiliary axis.
    X,
}

impl Dim {
    /// Returns the lowercase text label for this dimension.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Dim::Tof => "tof",
            Dim::DSpacing => "dspacing",
            Dim::Wavelength => "wavelength",
            Dim::Energy => "energy",
            Dim::EnergyTransfer => "energy_transfer",
            Dim::Q => "q",
            Dim::Spectrum => "spectrum",
            Dim::Event => "event",
            Dim::Position => "position",
            Dim::SourcePosition => "source_position",
            Dim::SamplePosition => "sample_position",
            Dim::IncidentEnergy => "incident_energy",
            Dim::FinalEnergy => "final_energy",
            Dim::IncidentBeam => "incident_beam",
            Dim::ScatteredBeam => "scattered_beam",
            Dim::TwoTheta => "two_theta",
            Dim::X => "x",
        }
    }
}

impl fmt::Display for Dim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Whether a conversion accounts for scattering off the sample.
///
/// `Scatter` uses the full source-sample-detector flight path and is required
/// for any quantity that depends on the scattering angle. `NoScatter` treats
/// the beam as travelling straight from source to detector (e.g. beam
/// monitors).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ConvertMode {
    /// Sample scattering: flight path is L1 + L2.
    Scatter,
    /// Direct beam: flight path is the source-detector distance.
    NoScatter,
}

impl fmt::Display for ConvertMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ConvertMode::Scatter => "scatter",
            ConvertMode::NoScatter => "no-scatter",
        })
    }
}
