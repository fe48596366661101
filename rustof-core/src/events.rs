//! Ragged per-spectrum event storage.
//!
//! Event-mode data stores one variable-length list of events per spectrum.
//! The lists share flat buffers (coordinate values and weights) addressed
//! through an outer array of `(begin, end)` index ranges, so growing or
//! shrinking a single spectrum never moves another spectrum's events.

use crate::dim::Dim;
use crate::error::{Error, Result};
use crate::unit::Unit;
use crate::variable::Variable;

/// A batch of events bucketed by spectrum.
///
/// Invariants, validated at construction: ranges are non-overlapping,
/// monotonically assigned, and lie within the flat buffers; the coordinate
/// and weight buffers have equal length and are one-dimensional over
/// [`Dim::Event`].
#[derive(Debug, Clone, PartialEq)]
pub struct EventBatch {
    ranges: Vec<(usize, usize)>,
    coord_dim: Dim,
    coord: Variable,
    weights: Variable,
}

impl EventBatch {
    /// Creates a batch from index ranges and flat buffers.
    pub fn new(
        ranges: Vec<(usize, usize)>,
        coord_dim: Dim,
        coord: Variable,
        weights: Variable,
    ) -> Result<Self> {
        for (name, buffer) in [("coordinate", &coord), ("weight", &weights)] {
            if buffer.dims() != [Dim::Event] {
                return Err(Error::ShapeMismatch(format!(
                    "event {name} buffer must be one-dimensional over `event`, found dims {:?}",
                    buffer.dims()
                )));
            }
        }
        if weights.len() != coord.len() {
            return Err(Error::ShapeMismatch(format!(
                "{} weights for {} event coordinates",
                weights.len(),
                coord.len()
            )));
        }
        let len = coord.len();
        let mut prev_end = 0;
        for &(begin, end) in &ranges {
            if begin > end {
                return Err(Error::InvalidRanges(format!(
                    "range ({begin}, {end}) has begin > end"
                )));
            }
            if begin < prev_end {
                return Err(Error::InvalidRanges(format!(
                    "range ({begin}, {end}) overlaps or precedes an earlier range"
                )));
            }
            if end > len {
                return Err(Error::InvalidRanges(format!(
                    "range ({begin}, {end}) exceeds buffer length {len}"
                )));
            }
            prev_end = end;
        }
        Ok(Self {
            ranges,
            coord_dim,
            coord,
            weights,
        })
    }

    /// Per-spectrum `(begin, end)` index ranges.
    #[must_use]
    pub fn ranges(&self) -> &[(usize, usize)] {
        &self.ranges
    }

    /// Dimension label of the event coordinate (e.g. [`Dim::Tof`]).
    #[must_use]
    pub fn coord_dim(&self) -> Dim {
        self.coord_dim
    }

    /// Flat event coordinate buffer.
    #[must_use]
    pub fn coord(&self) -> &Variable {
        &self.coord
    }

    /// Flat event weight buffer.
    #[must_use]
    pub fn weights(&self) -> &Variable {
        &self.weights
    }

    /// Number of spectra (outer indices).
    #[must_use]
    pub fn num_spectra(&self) -> usize {
        self.ranges.len()
    }

    /// Total number of events in the flat buffers.
    #[must_use]
    pub fn num_events(&self) -> usize {
        self.coord.len()
    }

    /// Number of events addressed by each range.
    #[must_use]
    pub fn counts(&self) -> Vec<usize> {
        self.ranges.iter().map(|&(b, e)| e - b).collect()
    }

    /// Exposes the bucket structure: index ranges plus the mutable flat
    /// coordinate buffer.
    pub fn ragged_view_mut(&mut self) -> Result<(&[(usize, usize)], &mut [f64])> {
        let EventBatch {
            ref ranges,
            ref mut coord,
            ..
        } = *self;
        Ok((ranges.as_slice(), coord.floats_mut()?))
    }

    /// Relabels the event coordinate and replaces its unit; values are left
    /// as already rewritten through [`Self::ragged_view_mut`].
    pub fn relabel_coord(&mut self, dim: Dim, unit: Unit) {
        self.coord_dim = dim;
        self.coord.set_unit(unit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tof_buffer(values: Vec<f64>) -> Variable {
        Variable::array(Dim::Event, values, Unit::US)
    }

    fn unit_weights(n: usize) -> Variable {
        Variable::array(Dim::Event, vec![1.0; n], Unit::COUNTS)
    }

    #[test]
    fn test_valid_ranges() {
        let batch = EventBatch::new(
            vec![(0, 2), (2, 2), (3, 5)],
            Dim::Tof,
            tof_buffer(vec![1.0, 2.0, 3.0, 4.0, 5.0]),
            unit_weights(5),
        )
        .unwrap();
        assert_eq!(batch.num_spectra(), 3);
        assert_eq!(batch.counts(), vec![2, 0, 2]);
    }

    #[test]
    fn test_overlapping_ranges_rejected() {
        let result = EventBatch::new(
            vec![(0, 3), (2, 5)],
            Dim::Tof,
            tof_buffer(vec![0.0; 5]),
            unit_weights(5),
        );
        assert!(matches!(result, Err(Error::InvalidRanges(_))));
    }

    #[test]
    fn test_out_of_bounds_ranges_rejected() {
        let result = EventBatch::new(
            vec![(0, 6)],
            Dim::Tof,
            tof_buffer(vec![0.0; 5]),
            unit_weights(5),
        );
        assert!(matches!(result, Err(Error::InvalidRanges(_))));
    }

    #[test]
    fn test_reversed_range_rejected() {
        let result = EventBatch::new(
            vec![(3, 1)],
            Dim::Tof,
            tof_buffer(vec![0.0; 5]),
            unit_weights(5),
        );
        assert!(matches!(result, Err(Error::InvalidRanges(_))));
    }

    #[test]
    fn test_weight_length_mismatch_rejected() {
        let result = EventBatch::new(
            vec![(0, 2)],
            Dim::Tof,
            tof_buffer(vec![0.0; 2]),
            unit_weights(3),
        );
        assert!(matches!(result, Err(Error::ShapeMismatch(_))));
    }
}
