//! Geometric quantities derived from beamline coordinate metadata.
//!
//! Positions are 3-vectors in meters. Scalar quantities (source and sample
//! positions, L1) are zero-dimensional variables; per-detector quantities
//! (pixel positions, L2, scattering angles) vary along the detector axis of
//! the `position` coordinate.

use rustof_core::dim::{ConvertMode, Dim};
use rustof_core::error::{Error, Result};
use rustof_core::unit::Unit;
use rustof_core::variable::Variable;
use rustof_core::CoordLookup;

/// Round-off slack allowed when clamping a cosine to [-1, 1].
const COS_DOMAIN_TOLERANCE: f64 = 1e-10;

fn position_coord<M: CoordLookup>(meta: &M, dim: Dim) -> Result<Variable> {
    let coord = meta.require(dim)?;
    coord.expect_unit(Unit::M)?;
    Ok(coord.clone())
}

/// Per-detector pixel positions.
pub fn position<M: CoordLookup>(meta: &M) -> Result<Variable> {
    position_coord(meta, Dim::Position)
}

/// Neutron source position.
pub fn source_position<M: CoordLookup>(meta: &M) -> Result<Variable> {
    position_coord(meta, Dim::SourcePosition)
}

/// Sample position.
pub fn sample_position<M: CoordLookup>(meta: &M) -> Result<Variable> {
    position_coord(meta, Dim::SamplePosition)
}

/// Source-to-sample beam vector.
pub fn incident_beam<M: CoordLookup>(meta: &M) -> Result<Variable> {
    sample_position(meta)?.sub(&source_position(meta)?)
}

/// Sample-to-detector beam vectors, one per detector.
pub fn scattered_beam<M: CoordLookup>(meta: &M) -> Result<Variable> {
    position(meta)?.sub(&sample_position(meta)?)
}

/// L1, the primary flight path length (source to sample).
pub fn l1<M: CoordLookup>(meta: &M) -> Result<Variable> {
    incident_beam(meta)?.norm()
}

/// L2, the secondary flight path lengths (sample to each detector).
pub fn l2<M: CoordLookup>(meta: &M) -> Result<Variable> {
    scattered_beam(meta)?.norm()
}

/// Total flight path length for the given mode.
///
/// In `Scatter` mode this is `L1 + L2`; in `NoScatter` mode the beam is
/// taken straight from source to detector with no sample interaction.
pub fn ltotal<M: CoordLookup>(meta: &M, mode: ConvertMode) -> Result<Variable> {
    match mode {
        ConvertMode::Scatter => l1(meta)?.add(&l2(meta)?),
        ConvertMode::NoScatter => position(meta)?.sub(&source_position(meta)?)?.norm(),
    }
}

/// Cosine of the full scattering angle, per detector.
pub fn cos_two_theta<M: CoordLookup>(meta: &M) -> Result<Variable> {
    let incident = incident_beam(meta)?;
    let scattered = scattered_beam(meta)?;
    let incident_length = incident.norm()?;
    let scattered_length = scattered.norm()?;
    for (name, lengths) in [
        ("incident", &incident_length),
        ("scattered", &scattered_length),
    ] {
        if lengths.floats()?.iter().any(|&l| l == 0.0) {
            return Err(Error::NumericalDomain(format!(
                "{name} beam has zero length; scattering angle is undefined"
            )));
        }
    }
    incident
        .dot(&scattered)?
        .div(&incident_length.mul(&scattered_length)?)
}

/// The full scattering angle `2theta`, per detector.
///
/// The cosine computed from positions can leave [-1, 1] by floating-point
/// round-off; values within a small tolerance are clamped, values beyond it
/// indicate degenerate geometry and fail.
pub fn two_theta<M: CoordLookup>(meta: &M) -> Result<Variable> {
    cos_two_theta(meta)?.try_map(Unit::RAD, |c| {
        if c.abs() <= 1.0 + COS_DOMAIN_TOLERANCE {
            Ok(c.clamp(-1.0, 1.0).acos())
        } else {
            Err(Error::NumericalDomain(format!(
                "cosine of scattering angle out of range: {c}"
            )))
        }
    })
}

/// The scattering angle `theta` in Bragg's law, half of `2theta`.
pub fn scattering_angle<M: CoordLookup>(meta: &M) -> Result<Variable> {
    Ok(two_theta(meta)?.times(0.5))
}

/// Fixed incident energy, if set (direct-geometry inelastic instruments).
pub fn incident_energy<M: CoordLookup>(meta: &M) -> Result<Option<Variable>> {
    energy_coord(meta, Dim::IncidentEnergy)
}

/// Fixed final energy, if set (indirect-geometry inelastic instruments).
pub fn final_energy<M: CoordLookup>(meta: &M) -> Result<Option<Variable>> {
    energy_coord(meta, Dim::FinalEnergy)
}

fn energy_coord<M: CoordLookup>(meta: &M, dim: Dim) -> Result<Option<Variable>> {
    match meta.lookup(dim) {
        Some(coord) => {
            coord.expect_unit(Unit::MEV)?;
            Ok(Some(coord.clone()))
        }
        None => Ok(None),
    }
}
