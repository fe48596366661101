//! Coefficient derivations checked against a minimal fake metadata source.

use approx::assert_relative_eq;
use nalgebra::Vector3;
use rustof_beamline::beamline;
use rustof_beamline::constants::{self, Transform, TOF_TO_ENERGY, TOF_TO_WAVELENGTH};
use rustof_core::{ConvertMode, CoordLookup, Dim, Error, Unit, Variable};

/// Fake metadata with just the coordinates the derivations ask for.
struct Dummy {
    source: Variable,
    sample: Variable,
    position: Variable,
    ei: Option<Variable>,
    ef: Option<Variable>,
}

impl Dummy {
    fn new() -> Self {
        Self {
            source: Variable::vector(Vector3::new(1.0, 2.0, 3.0), Unit::M),
            sample: Variable::vector(Vector3::new(2.0, 4.0, 8.0), Unit::M),
            position: Variable::vectors(
                Dim::X,
                vec![Vector3::new(2.1, 4.1, 8.2), Vector3::new(2.2, 4.3, 8.4)],
                Unit::M,
            ),
            ei: None,
            ef: None,
        }
    }
}

impl CoordLookup for Dummy {
    fn lookup(&self, dim: Dim) -> Option<&Variable> {
        match dim {
            Dim::SourcePosition => Some(&self.source),
            Dim::SamplePosition => Some(&self.sample),
            Dim::Position => Some(&self.position),
            Dim::IncidentEnergy => self.ei.as_ref(),
            Dim::FinalEnergy => self.ef.as_ref(),
            _ => None,
        }
    }
}

fn scale_of(transform: &Transform) -> &Variable {
    match transform {
        Transform::Scale { scale }
        | Transform::InverseSquare { scale }
        | Transform::ShiftedInverseSquare { scale, .. }
        | Transform::Reciprocal { scale } => scale,
    }
}

#[test]
fn tof_to_wavelength() {
    let dummy = Dummy::new();
    for mode in [ConvertMode::Scatter, ConvertMode::NoScatter] {
        let transform = constants::tof_to_wavelength(&dummy, mode).unwrap();
        let Transform::Scale { scale } = &transform else {
            panic!("expected a scale transform");
        };
        assert_eq!(scale.unit(), Unit::ANGSTROM.div(Unit::US));
        let l = beamline::ltotal(&dummy, mode).unwrap();
        for (value, ltotal) in scale.floats().unwrap().iter().zip(l.floats().unwrap()) {
            assert_relative_eq!(*value, TOF_TO_WAVELENGTH / ltotal);
        }
    }
}

#[test]
fn tof_to_dspacing() {
    let dummy = Dummy::new();
    let transform = constants::tof_to_dspacing(&dummy).unwrap();
    let Transform::Scale { scale } = &transform else {
        panic!("expected a scale transform");
    };
    assert_eq!(scale.unit(), Unit::ANGSTROM.div(Unit::US));
    let l = beamline::ltotal(&dummy, ConvertMode::Scatter).unwrap();
    let cos_two_theta = beamline::cos_two_theta(&dummy).unwrap();
    for ((value, ltotal), cos2t) in scale
        .floats()
        .unwrap()
        .iter()
        .zip(l.floats().unwrap())
        .zip(cos_two_theta.floats().unwrap())
    {
        let sin_theta = (0.5 * (1.0 - cos2t)).sqrt();
        let expected = TOF_TO_WAVELENGTH / (2.0 * ltotal * sin_theta);
        assert_relative_eq!(*value, expected, max_relative = 1e-12);
    }
}

#[test]
fn tof_to_energy() {
    let dummy = Dummy::new();
    for mode in [ConvertMode::Scatter, ConvertMode::NoScatter] {
        let transform = constants::tof_to_energy(&dummy, mode).unwrap();
        let Transform::InverseSquare { scale } = &transform else {
            panic!("expected an inverse-square transform");
        };
        assert_eq!(
            scale.unit(),
            Unit::MEV.mul(Unit::US).mul(Unit::US)
        );
        let l = beamline::ltotal(&dummy, mode).unwrap();
        for (value, ltotal) in scale.floats().unwrap().iter().zip(l.floats().unwrap()) {
            assert_relative_eq!(*value, ltotal * ltotal * TOF_TO_ENERGY);
        }
    }
}

#[test]
fn tof_to_energy_transfer_fails_without_fixed_energy() {
    let mut dummy = Dummy::new();
    assert!(matches!(
        constants::tof_to_energy_transfer(&dummy),
        Err(Error::Configuration(_))
    ));
    dummy.ei = Some(Variable::scalar(3.0, Unit::MEV));
    dummy.ef = Some(Variable::scalar(3.0, Unit::MEV));
    assert!(matches!(
        constants::tof_to_energy_transfer(&dummy),
        Err(Error::Configuration(_))
    ));
}

#[test]
fn tof_to_energy_transfer_direct() {
    let mut dummy = Dummy::new();
    dummy.ei = Some(Variable::scalar(3.0, Unit::MEV));
    let Transform::ShiftedInverseSquare {
        scale,
        tof_shift,
        energy_shift,
    } = constants::tof_to_energy_transfer(&dummy).unwrap()
    else {
        panic!("expected a shifted inverse-square transform");
    };

    let l1 = beamline::l1(&dummy).unwrap().value().unwrap();
    let l2 = beamline::l2(&dummy).unwrap();
    for (value, l2) in scale.floats().unwrap().iter().zip(l2.floats().unwrap()) {
        assert_relative_eq!(*value, -l2 * l2 * TOF_TO_ENERGY);
    }
    assert_eq!(tof_shift.unit(), Unit::US);
    assert_relative_eq!(
        tof_shift.value().unwrap(),
        (l1 * l1 * TOF_TO_ENERGY / 3.0).sqrt()
    );
    assert_eq!(energy_shift.unit(), Unit::MEV);
    assert_relative_eq!(energy_shift.value().unwrap(), -3.0);
}

#[test]
fn tof_to_energy_transfer_indirect() {
    let mut dummy = Dummy::new();
    dummy.ef = Some(Variable::scalar(3.0, Unit::MEV));
    let Transform::ShiftedInverseSquare {
        scale,
        tof_shift,
        energy_shift,
    } = constants::tof_to_energy_transfer(&dummy).unwrap()
    else {
        panic!("expected a shifted inverse-square transform");
    };

    let l1 = beamline::l1(&dummy).unwrap().value().unwrap();
    let l2 = beamline::l2(&dummy).unwrap();
    assert_relative_eq!(scale.value().unwrap(), l1 * l1 * TOF_TO_ENERGY);
    for (value, l2) in tof_shift
        .floats()
        .unwrap()
        .iter()
        .zip(l2.floats().unwrap())
    {
        assert_relative_eq!(*value, (l2 * l2 * TOF_TO_ENERGY / 3.0).sqrt());
    }
    assert_relative_eq!(energy_shift.value().unwrap(), 3.0);
}

#[test]
fn wavelength_to_q() {
    let dummy = Dummy::new();
    let transform = constants::wavelength_to_q(&dummy).unwrap();
    let Transform::Reciprocal { scale } = &transform else {
        panic!("expected a reciprocal transform");
    };
    assert_eq!(scale.unit(), Unit::ONE);
    let theta = beamline::scattering_angle(&dummy).unwrap();
    for (value, theta) in scale.floats().unwrap().iter().zip(theta.floats().unwrap()) {
        assert_relative_eq!(*value, 4.0 * std::f64::consts::PI * theta.sin());
    }
}

#[test]
fn derive_rejects_unsupported_pairs() {
    let dummy = Dummy::new();
    let err = constants::derive(&dummy, Dim::Tof, Dim::DSpacing, ConvertMode::NoScatter)
        .unwrap_err();
    assert!(matches!(err, Error::UnsupportedConversion { .. }));
    let err =
        constants::derive(&dummy, Dim::Energy, Dim::Wavelength, ConvertMode::Scatter).unwrap_err();
    assert!(matches!(err, Error::UnsupportedConversion { .. }));
}

#[test]
fn derive_output_units() {
    let mut dummy = Dummy::new();
    dummy.ei = Some(Variable::scalar(3.0, Unit::MEV));
    let cases = [
        (Dim::Tof, Dim::DSpacing, Unit::US, Unit::ANGSTROM),
        (Dim::Tof, Dim::Wavelength, Unit::US, Unit::ANGSTROM),
        (Dim::Tof, Dim::Energy, Unit::US, Unit::MEV),
        (Dim::Tof, Dim::EnergyTransfer, Unit::US, Unit::MEV),
        (Dim::Wavelength, Dim::Q, Unit::ANGSTROM, Unit::ANGSTROM.recip()),
    ];
    for (origin, target, input, expected) in cases {
        let transform = constants::derive(&dummy, origin, target, ConvertMode::Scatter).unwrap();
        assert_eq!(transform.output_unit(input).unwrap(), expected);
        // A scale always exists, whatever the shape.
        assert!(!scale_of(&transform).is_empty());
    }
}
