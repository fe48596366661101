//! rustof-beamline: Beamline geometry and conversion coefficients.
//!
//! This crate derives geometric quantities (flight-path lengths, scattering
//! angles) from beamline coordinate metadata, and turns them into the
//! closed-form coefficients that map time-of-flight to physics-derived
//! coordinates. Everything is a pure function over the
//! [`CoordLookup`](rustof_core::CoordLookup) capability, so tests can supply
//! minimal fakes instead of full data containers.
//!

pub mod beamline;
pub mod constants;

pub use constants::Transform;

// Re-export the mode selector alongside the geometry that depends on it.
pub use rustof_core::ConvertMode;
