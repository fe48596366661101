//! The conversion entry point.

use rustof_beamline::constants;
use rustof_core::dataset::{Container, CoordLookup, Data};
use rustof_core::dim::{ConvertMode, Dim};
use rustof_core::error::{Error, Result};
use rustof_core::unit::Unit;

use crate::kernel::{self, Kernel};

/// Unit the origin coordinate must carry.
fn origin_unit(origin: Dim, target: Dim, mode: ConvertMode) -> Result<Unit> {
    match origin {
        Dim::Tof => Ok(Unit::US),
        Dim::Wavelength => Ok(Unit::ANGSTROM),
        _ => Err(Error::UnsupportedConversion {
            origin,
            target,
            mode,
        }),
    }
}

/// Converts the `origin` coordinate of a container into `target`.
///
/// The container is consumed; on success the rewritten container is
/// returned, on failure it is dropped, so a partially rewritten coordinate
/// is never observable. Geometry is resolved once per call and the derived
/// coefficients are broadcast over every coordinate-bearing representation
/// present: the shared dense coordinate, and the event coordinate of each
/// ragged item. Histogram values, event weights, and variances are left
/// untouched; dimension labels are renamed throughout.
///
/// # Errors
///
/// * [`Error::UnsupportedConversion`] for an origin/target/mode combination
///   outside the supported mapping.
/// * [`Error::MissingMetadata`] when a required beamline coordinate, or the
///   origin coordinate itself, is absent.
/// * [`Error::Configuration`] for invalid fixed-energy setups.
/// * [`Error::UnitMismatch`] when the origin coordinate carries the wrong
///   unit.
pub fn convert<C: Container>(
    mut container: C,
    origin: Dim,
    target: Dim,
    mode: ConvertMode,
) -> Result<C> {
    let transform = constants::derive(container.coords(), origin, target, mode)?;
    let kernel = Kernel::new(&transform)?;
    let input_unit = origin_unit(origin, target, mode)?;
    let out_unit = transform.output_unit(input_unit)?;

    // Validate every representation before touching any buffer, so a
    // failure can never leave a half-rewritten coordinate behind.
    let mut bearing = 0;
    if let Some(coord) = container.coords().lookup(origin) {
        coord.expect_unit(input_unit)?;
        kernel::validate_dense(coord, &kernel, origin)?;
        bearing += 1;
    }
    for item in container.data_items() {
        if let Data::Events(batch) = item {
            if batch.coord_dim() == origin {
                batch.coord().expect_unit(input_unit)?;
                kernel::validate_events(batch, &kernel)?;
                bearing += 1;
            }
        }
    }
    if bearing == 0 {
        return Err(Error::MissingMetadata(origin));
    }

    if let Some(coord) = container.coords_mut().remove(origin) {
        let converted = kernel::convert_dense(coord, &kernel, origin, target, out_unit)?;
        container.coords_mut().set(target, converted);
    }
    for item in container.data_items_mut() {
        match item {
            Data::Events(batch) if batch.coord_dim() == origin => {
                kernel::convert_events(batch, &kernel, target, out_unit)?;
            }
            Data::Events(_) => {}
            Data::Histogram(values) => values.rename_dim(origin, target),
        }
    }
    // Auxiliary coordinates that vary along the converted axis keep their
    // values but follow the rename.
    for (_, coord) in container.coords_mut().iter_mut() {
        coord.rename_dim(origin, target);
    }
    Ok(container)
}
