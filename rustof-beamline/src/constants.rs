//! Closed-form coefficients mapping time-of-flight to derived coordinates.
//!
//! Each derivation resolves beamline geometry and produces a [`Transform`]
//! whose coefficients carry units, so the conversion engine can attach the
//! output unit without re-deriving it. Coefficients are computed fresh per
//! conversion call; geometry may change between calls.

use std::f64::consts::PI;

use rustof_core::dim::{ConvertMode, Dim};
use rustof_core::error::{Error, Result};
use rustof_core::unit::Unit;
use rustof_core::variable::Variable;
use rustof_core::CoordLookup;

use crate::beamline;

/// Neutron mass in kg (CODATA 2018).
pub const NEUTRON_MASS: f64 = 1.674_927_498_04e-27;

/// Planck constant in J s (exact, SI 2019).
pub const PLANCK_CONSTANT: f64 = 6.626_070_15e-34;

/// One milli-electron-volt in J (exact, SI 2019).
const MEV_IN_JOULE: f64 = 1.602_176_634e-22;

/// Converts `tof [us] / (Ltotal [m])` to wavelength in angstrom:
/// `h / m_n`, rescaled to angstrom m / us.
pub const TOF_TO_WAVELENGTH: f64 = 1.0e4 * PLANCK_CONSTANT / NEUTRON_MASS;

/// Bragg coefficient `2 m_n / h`, rescaled to us / (angstrom m).
pub const TOF_TO_DSPACING: f64 = 1.0e-4 * 2.0 * NEUTRON_MASS / PLANCK_CONSTANT;

/// Converts `(Ltotal [m] / tof [us])^2` to energy in meV:
/// `m_n / 2`, rescaled to meV us^2 / m^2.
pub const TOF_TO_ENERGY: f64 = 0.5e12 * NEUTRON_MASS / MEV_IN_JOULE;

fn wavelength_coefficient() -> Variable {
    Variable::scalar(
        TOF_TO_WAVELENGTH,
        Unit::ANGSTROM.mul(Unit::M).div(Unit::US),
    )
}

fn dspacing_coefficient() -> Variable {
    Variable::scalar(
        TOF_TO_DSPACING,
        Unit::US.div(Unit::ANGSTROM.mul(Unit::M)),
    )
}

fn energy_coefficient() -> Variable {
    Variable::scalar(
        TOF_TO_ENERGY,
        Unit::MEV.mul(Unit::US).mul(Unit::US).div(Unit::M.mul(Unit::M)),
    )
}

/// Transform coefficients for one conversion, broadcastable over the
/// detector axis.
///
/// The variant selects the application shape; the supported target set is
/// extended by adding a dispatch arm producing one of these shapes, with no
/// change to the apply engine.
#[derive(Debug, Clone, PartialEq)]
pub enum Transform {
    /// `target = scale * x`
    Scale {
        /// Multiplicative coefficient.
        scale: Variable,
    },
    /// `target = scale / x^2`
    InverseSquare {
        /// Numerator coefficient.
        scale: Variable,
    },
    /// `target = scale / (x - tof_shift)^2 - energy_shift`
    ShiftedInverseSquare {
        /// Numerator coefficient.
        scale: Variable,
        /// Time offset for the fixed-energy flight-path leg.
        tof_shift: Variable,
        /// Fixed-energy offset (negative incident energy for direct
        /// geometry, final energy for indirect).
        energy_shift: Variable,
    },
    /// `target = scale / x`
    Reciprocal {
        /// Numerator coefficient.
        scale: Variable,
    },
}

impl Transform {
    /// Unit of the converted coordinate for the given input unit.
    ///
    /// Fails with a unit mismatch if the input unit is incompatible with the
    /// coefficients (e.g. a time shift applied to a non-time coordinate).
    pub fn output_unit(&self, input: Unit) -> Result<Unit> {
        match self {
            Transform::Scale { scale } => Ok(scale.unit().mul(input)),
            Transform::InverseSquare { scale } => Ok(scale.unit().div(input.mul(input))),
            Transform::ShiftedInverseSquare {
                scale,
                tof_shift,
                energy_shift,
            } => {
                if tof_shift.unit() != input {
                    return Err(Error::UnitMismatch {
                        expected: tof_shift.unit().to_string(),
                        found: input.to_string(),
                    });
                }
                let out = scale.unit().div(input.mul(input));
                if out != energy_shift.unit() {
                    return Err(Error::UnitMismatch {
                        expected: energy_shift.unit().to_string(),
                        found: out.to_string(),
                    });
                }
                Ok(out)
            }
            Transform::Reciprocal { scale } => Ok(scale.unit().div(input)),
        }
    }
}

/// Coefficient for `tof -> dspacing` via Bragg's law:
/// `1 / (Ltotal * C * sqrt(0.5 * (1 - cos(2theta))))`.
pub fn tof_to_dspacing<M: CoordLookup>(meta: &M) -> Result<Transform> {
    let l = beamline::ltotal(meta, ConvertMode::Scatter)?;
    let cos_two_theta = beamline::cos_two_theta(meta)?;
    // sqrt(0.5 * (1 - cos(2theta))) = sin(theta); round-off can push the
    // cosine marginally past 1, so clamp tiny negatives instead of failing.
    let sin_theta = Variable::scalar(1.0, Unit::ONE)
        .sub(&cos_two_theta)?
        .times(0.5)
        .try_map(Unit::ONE, |v| {
            if v >= 0.0 {
                Ok(v.sqrt())
            } else if v > -1e-10 {
                Ok(0.0)
            } else {
                Err(Error::NumericalDomain(format!(
                    "cosine of scattering angle out of range: {}",
                    1.0 - 2.0 * v
                )))
            }
        })?;
    let scale = l
        .mul(&dspacing_coefficient())?
        .mul(&sin_theta)?
        .reciprocal()?;
    Ok(Transform::Scale { scale })
}

/// Coefficient for `tof -> wavelength`: `C / Ltotal(mode)`.
pub fn tof_to_wavelength<M: CoordLookup>(meta: &M, mode: ConvertMode) -> Result<Transform> {
    let l = beamline::ltotal(meta, mode)?;
    let scale = wavelength_coefficient().div(&l)?;
    Ok(Transform::Scale { scale })
}

/// Coefficient for `tof -> energy`: `Ltotal(mode)^2 * C`.
pub fn tof_to_energy<M: CoordLookup>(meta: &M, mode: ConvertMode) -> Result<Transform> {
    let l = beamline::ltotal(meta, mode)?;
    let scale = l.mul(&l)?.mul(&energy_coefficient())?;
    Ok(Transform::InverseSquare { scale })
}

/// Coefficients for `tof -> energy transfer`.
///
/// Requires exactly one of the incident-energy (direct geometry) or
/// final-energy (indirect geometry) coordinates; anything else is a
/// configuration error.
pub fn tof_to_energy_transfer<M: CoordLookup>(meta: &M) -> Result<Transform> {
    let ei = beamline::incident_energy(meta)?;
    let ef = beamline::final_energy(meta)?;
    let c = energy_coefficient();
    match (ei, ef) {
        (Some(ei), None) => {
            let l1 = beamline::l1(meta)?;
            let l2 = beamline::l2(meta)?;
            let scale = l2.mul(&l2)?.mul(&c)?.times(-1.0);
            let tof_shift = l1.mul(&l1)?.mul(&c)?.div(&ei)?.sqrt()?;
            let energy_shift = ei.times(-1.0);
            Ok(Transform::ShiftedInverseSquare {
                scale,
                tof_shift,
                energy_shift,
            })
        }
        (None, Some(ef)) => {
            let l1 = beamline::l1(meta)?;
            let l2 = beamline::l2(meta)?;
            let scale = l1.mul(&l1)?.mul(&c)?;
            let tof_shift = l2.mul(&l2)?.mul(&c)?.div(&ef)?.sqrt()?;
            Ok(Transform::ShiftedInverseSquare {
                scale,
                tof_shift,
                energy_shift: ef,
            })
        }
        (None, None) => Err(Error::Configuration(
            "energy transfer requires a fixed energy; set exactly one of the \
             `incident_energy` or `final_energy` coordinates"
                .into(),
        )),
        (Some(_), Some(_)) => Err(Error::Configuration(
            "both `incident_energy` and `final_energy` are set; energy transfer \
             requires exactly one"
                .into(),
        )),
    }
}

/// Coefficient for `wavelength -> q`: `4 pi sin(theta)`.
pub fn wavelength_to_q<M: CoordLookup>(meta: &M) -> Result<Transform> {
    let scale = beamline::scattering_angle(meta)?.sin()?.times(4.0 * PI);
    Ok(Transform::Reciprocal { scale })
}

/// Derives the transform for an `origin -> target` conversion in the given
/// mode, or fails with an unsupported-conversion error.
///
/// Quantities that depend on the scattering angle or on both flight-path
/// legs (d-spacing, energy transfer, q) are only defined in `Scatter` mode.
pub fn derive<M: CoordLookup>(
    meta: &M,
    origin: Dim,
    target: Dim,
    mode: ConvertMode,
) -> Result<Transform> {
    let unsupported = || Error::UnsupportedConversion {
        origin,
        target,
        mode,
    };
    match (origin, target, mode) {
        (Dim::Tof, Dim::DSpacing, ConvertMode::Scatter) => tof_to_dspacing(meta),
        (Dim::Tof, Dim::Wavelength, _) => tof_to_wavelength(meta, mode),
        (Dim::Tof, Dim::Energy, _) => tof_to_energy(meta, mode),
        (Dim::Tof, Dim::EnergyTransfer, ConvertMode::Scatter) => tof_to_energy_transfer(meta),
        (Dim::Wavelength, Dim::Q, ConvertMode::Scatter) => wavelength_to_q(meta),
        _ => Err(unsupported()),
    }
}
