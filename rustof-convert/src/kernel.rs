//! Apply kernels: broadcast transform coefficients over dense and ragged
//! coordinate buffers.
//!
//! Dense sweeps follow the memory layout (rows of the row-major buffer)
//! rather than the semantic axis order, so a transposed coordinate converts
//! at the same throughput. Ragged apply splits the flat event buffer into
//! disjoint mutable per-spectrum slices; both paths parallelize over the
//! outer axis with rayon.

use rayon::prelude::*;

use rustof_beamline::Transform;
use rustof_core::dim::Dim;
use rustof_core::error::{Error, Result};
use rustof_core::events::EventBatch;
use rustof_core::unit::Unit;
use rustof_core::variable::Variable;

/// A coefficient that is either shared by all spectra or varies per
/// spectrum.
#[derive(Clone, Copy)]
enum Coeff<'a> {
    Shared(f64),
    PerSpectrum(&'a [f64]),
}

impl Coeff<'_> {
    #[inline]
    fn at(&self, spectrum: usize) -> f64 {
        match self {
            Coeff::Shared(value) => *value,
            Coeff::PerSpectrum(values) => values[spectrum],
        }
    }
}

#[derive(Clone, Copy)]
enum Kind {
    Scale,
    InverseSquare,
    ShiftedInverseSquare,
    Reciprocal,
}

/// Flattened view of a [`Transform`], ready for elementwise application.
pub(crate) struct Kernel<'a> {
    kind: Kind,
    scale: Coeff<'a>,
    tof_shift: Coeff<'a>,
    energy_shift: Coeff<'a>,
    outer: Option<(Dim, usize)>,
}

impl<'a> Kernel<'a> {
    pub fn new(transform: &'a Transform) -> Result<Self> {
        let mut outer = None;
        let (kind, scale, tof_shift, energy_shift) = match transform {
            Transform::Scale { scale } => (
                Kind::Scale,
                coeff(scale, &mut outer)?,
                Coeff::Shared(0.0),
                Coeff::Shared(0.0),
            ),
            Transform::InverseSquare { scale } => (
                Kind::InverseSquare,
                coeff(scale, &mut outer)?,
                Coeff::Shared(0.0),
                Coeff::Shared(0.0),
            ),
            Transform::ShiftedInverseSquare {
                scale,
                tof_shift,
                energy_shift,
            } => (
                Kind::ShiftedInverseSquare,
                coeff(scale, &mut outer)?,
                coeff(tof_shift, &mut outer)?,
                coeff(energy_shift, &mut outer)?,
            ),
            Transform::Reciprocal { scale } => (
                Kind::Reciprocal,
                coeff(scale, &mut outer)?,
                Coeff::Shared(0.0),
                Coeff::Shared(0.0),
            ),
        };
        Ok(Self {
            kind,
            scale,
            tof_shift,
            energy_shift,
            outer,
        })
    }

    /// The detector axis the coefficients vary along, if any.
    pub fn outer(&self) -> Option<(Dim, usize)> {
        self.outer
    }

    #[inline]
    fn apply(&self, spectrum: usize, x: f64) -> f64 {
        match self.kind {
            Kind::Scale => self.scale.at(spectrum) * x,
            Kind::InverseSquare => self.scale.at(spectrum) / (x * x),
            Kind::ShiftedInverseSquare => {
                let t = x - self.tof_shift.at(spectrum);
                self.scale.at(spectrum) / (t * t) - self.energy_shift.at(spectrum)
            }
            Kind::Reciprocal => self.scale.at(spectrum) / x,
        }
    }
}

fn coeff<'a>(variable: &'a Variable, outer: &mut Option<(Dim, usize)>) -> Result<Coeff<'a>> {
    if variable.is_scalar() {
        return Ok(Coeff::Shared(variable.value()?));
    }
    if variable.ndim() != 1 {
        return Err(Error::ShapeMismatch(format!(
            "transform coefficients must be scalar or one-dimensional, found dims {:?}",
            variable.dims()
        )));
    }
    let axis = (variable.dims()[0], variable.shape()[0]);
    match outer {
        None => *outer = Some(axis),
        Some(existing) if *existing == axis => {}
        Some(existing) => {
            return Err(Error::ShapeMismatch(format!(
                "transform coefficient axes disagree: {existing:?} vs {axis:?}"
            )));
        }
    }
    Ok(Coeff::PerSpectrum(variable.floats()?))
}

/// Checks that a dense coordinate can be converted with this kernel.
pub(crate) fn validate_dense(coord: &Variable, kernel: &Kernel<'_>, origin: Dim) -> Result<()> {
    let dims = coord.dims();
    match dims.len() {
        1 if dims[0] == origin => Ok(()),
        2 => {
            if !dims.contains(&origin) {
                return Err(Error::ShapeMismatch(format!(
                    "coordinate dims {dims:?} do not include `{origin}`"
                )));
            }
            if let Some((outer_dim, extent)) = kernel.outer() {
                let Some(axis) = dims.iter().position(|d| *d == outer_dim) else {
                    return Err(Error::ShapeMismatch(format!(
                        "coefficients vary along `{outer_dim}` but coordinate dims are {dims:?}"
                    )));
                };
                if coord.shape()[axis] != extent {
                    return Err(Error::ShapeMismatch(format!(
                        "coordinate extent {} along `{outer_dim}` does not match the \
                         coefficient extent {extent}",
                        coord.shape()[axis]
                    )));
                }
            }
            Ok(())
        }
        _ => Err(Error::ShapeMismatch(format!(
            "cannot convert coordinate with dims {dims:?}"
        ))),
    }
}

/// Checks that an event batch can be converted with this kernel.
pub(crate) fn validate_events(batch: &EventBatch, kernel: &Kernel<'_>) -> Result<()> {
    if let Some((outer_dim, extent)) = kernel.outer() {
        if batch.num_spectra() != extent {
            return Err(Error::ShapeMismatch(format!(
                "{} event ranges do not match the `{outer_dim}` coefficient extent {extent}",
                batch.num_spectra()
            )));
        }
    }
    Ok(())
}

/// Rewrites a dense coordinate through the kernel, relabeling `origin` to
/// `target` and attaching `out_unit`.
///
/// A one-dimensional coordinate shared across spectra is broadcast to a
/// two-dimensional `[detector, target]` coordinate when the coefficients
/// vary per detector; otherwise the buffer is rewritten in place.
pub(crate) fn convert_dense(
    coord: Variable,
    kernel: &Kernel<'_>,
    origin: Dim,
    target: Dim,
    out_unit: Unit,
) -> Result<Variable> {
    validate_dense(&coord, kernel, origin)?;
    let dims = coord.dims().to_vec();
    if dims.len() == 1 {
        return match kernel.outer() {
            None => {
                let mut coord = coord;
                for value in coord.floats_mut()? {
                    *value = kernel.apply(0, *value);
                }
                coord.rename_dim(origin, target);
                coord.set_unit(out_unit);
                Ok(coord)
            }
            Some((outer_dim, extent)) => {
                let source = coord.floats()?;
                let row_len = source.len();
                let mut out = vec![0.0; extent * row_len];
                out.par_chunks_mut(row_len.max(1))
                    .enumerate()
                    .for_each(|(spectrum, row)| {
                        for (value, &x) in row.iter_mut().zip(source) {
                            *value = kernel.apply(spectrum, x);
                        }
                    });
                Variable::with_dims(
                    vec![outer_dim, target],
                    vec![extent, row_len],
                    out,
                    out_unit,
                )
            }
        };
    }

    let mut coord = coord;
    let shape = coord.shape().to_vec();
    let row_len = shape[1].max(1);
    match kernel.outer() {
        None => {
            coord
                .floats_mut()?
                .par_chunks_mut(row_len)
                .for_each(|row| {
                    for value in row {
                        *value = kernel.apply(0, *value);
                    }
                });
        }
        Some((outer_dim, _)) => {
            // validate_dense guarantees the axis exists and extents match.
            let detector_axis = dims
                .iter()
                .position(|d| *d == outer_dim)
                .ok_or_else(|| Error::ShapeMismatch(format!(
                    "coefficients vary along `{outer_dim}` but coordinate dims are {dims:?}"
                )))?;
            let values = coord.floats_mut()?;
            if detector_axis == 0 {
                values
                    .par_chunks_mut(row_len)
                    .enumerate()
                    .for_each(|(spectrum, row)| {
                        for value in row {
                            *value = kernel.apply(spectrum, *value);
                        }
                    });
            } else {
                values.par_chunks_mut(row_len).for_each(|row| {
                    for (spectrum, value) in row.iter_mut().enumerate() {
                        *value = kernel.apply(spectrum, *value);
                    }
                });
            }
        }
    }
    coord.rename_dim(origin, target);
    coord.set_unit(out_unit);
    Ok(coord)
}

/// Rewrites the event coordinate of a ragged batch through the kernel.
///
/// Each spectrum's coefficients are broadcast over its variable-length
/// slice of the flat buffer; the index ranges are untouched.
pub(crate) fn convert_events(
    batch: &mut EventBatch,
    kernel: &Kernel<'_>,
    target: Dim,
    out_unit: Unit,
) -> Result<()> {
    validate_events(batch, kernel)?;
    {
        let (ranges, buffer) = batch.ragged_view_mut()?;
        let mut slices: Vec<(usize, &mut [f64])> = Vec::with_capacity(ranges.len());
        let mut rest: &mut [f64] = buffer;
        let mut consumed = 0;
        for (spectrum, &(begin, end)) in ranges.iter().enumerate() {
            let tail = std::mem::take(&mut rest);
            let (_, tail) = tail.split_at_mut(begin - consumed);
            let (events, tail) = tail.split_at_mut(end - begin);
            slices.push((spectrum, events));
            rest = tail;
            consumed = end;
        }
        slices.into_par_iter().for_each(|(spectrum, events)| {
            for value in events {
                *value = kernel.apply(spectrum, *value);
            }
        });
    }
    batch.relabel_coord(target, out_unit);
    Ok(())
}
