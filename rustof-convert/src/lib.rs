//! rustof-convert: Dimension conversion for neutron data containers.
//!
//! Converts the time-of-flight coordinate of dense histograms and ragged
//! event data into physics-derived coordinates (d-spacing, wavelength,
//! energy, energy transfer, momentum transfer), resolving beamline geometry
//! once per call and broadcasting per-detector coefficients across both
//! layouts.
//!

mod convert;
mod kernel;

pub use convert::convert;

// Re-export the types callers need to drive a conversion.
pub use rustof_core::{
    Container, ConvertMode, Coords, Data, DataArray, Dataset, Dim, Error, EventBatch, Result,
    Unit, Variable,
};
