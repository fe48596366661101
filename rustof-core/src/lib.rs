//! rustof-core: Core types for neutron time-of-flight data containers.
//!
//! This crate provides the foundational abstractions the conversion engine
//! is built on: dimension labels, exact unit algebra, unit-carrying labeled
//! arrays, ragged per-spectrum event storage, and the data containers
//! (single series and collections) that bundle coordinates with values.
//!

pub mod dataset;
pub mod dim;
pub mod error;
pub mod events;
pub mod unit;
pub mod variable;

pub use dataset::{Container, CoordLookup, Coords, Data, DataArray, Dataset};
pub use dim::{ConvertMode, Dim};
pub use error::{Error, Result};
pub use events::EventBatch;
pub use unit::Unit;
pub use variable::{Values, Variable};
