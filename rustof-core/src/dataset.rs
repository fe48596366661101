//! Data containers: coordinate sets, single series, and collections.

use std::collections::BTreeMap;

use crate::dim::Dim;
use crate::error::{Error, Result};
use crate::events::EventBatch;
use crate::variable::Variable;

/// A set of named coordinates attached to a data container.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Coords {
    map: BTreeMap<Dim, Variable>,
}

impl Coords {
    /// Creates an empty coordinate set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a coordinate.
    pub fn set(&mut self, dim: Dim, coord: Variable) {
        self.map.insert(dim, coord);
    }

    /// Looks up a coordinate.
    #[must_use]
    pub fn get(&self, dim: Dim) -> Option<&Variable> {
        self.map.get(&dim)
    }

    /// True if a coordinate with this label is present.
    #[must_use]
    pub fn contains(&self, dim: Dim) -> bool {
        self.map.contains_key(&dim)
    }

    /// Removes and returns a coordinate.
    pub fn remove(&mut self, dim: Dim) -> Option<Variable> {
        self.map.remove(&dim)
    }

    /// Moves a coordinate to a new label; a no-op if `from` is absent.
    pub fn rename(&mut self, from: Dim, to: Dim) {
        if let Some(coord) = self.map.remove(&from) {
            self.map.insert(to, coord);
        }
    }

    /// Iterates over `(label, coordinate)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (Dim, &Variable)> {
        self.map.iter().map(|(dim, coord)| (*dim, coord))
    }

    /// Iterates mutably over coordinates.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Dim, &mut Variable)> {
        self.map.iter_mut().map(|(dim, coord)| (*dim, coord))
    }

    /// Number of coordinates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// True if no coordinates are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Capability to look up coordinate metadata by dimension label.
///
/// Geometry and coefficient derivation are written against this trait so
/// tests can supply a minimal fake with only the accessors they need.
pub trait CoordLookup {
    /// Returns the coordinate, if present.
    fn lookup(&self, dim: Dim) -> Option<&Variable>;

    /// Returns the coordinate, or a missing-metadata error naming it.
    fn require(&self, dim: Dim) -> Result<&Variable> {
        self.lookup(dim).ok_or(Error::MissingMetadata(dim))
    }
}

impl CoordLookup for Coords {
    fn lookup(&self, dim: Dim) -> Option<&Variable> {
        self.get(dim)
    }
}

/// Values held by a data item: dense histogram counts or ragged events.
#[derive(Debug, Clone, PartialEq)]
pub enum Data {
    /// Rectangular values addressed by dimension labels.
    Histogram(Variable),
    /// Per-spectrum event lists over shared flat buffers.
    Events(EventBatch),
}

impl Data {
    /// Dense values, if this item is a histogram.
    #[must_use]
    pub fn as_histogram(&self) -> Option<&Variable> {
        match self {
            Data::Histogram(values) => Some(values),
            Data::Events(_) => None,
        }
    }

    /// Event batch, if this item holds ragged data.
    #[must_use]
    pub fn as_events(&self) -> Option<&EventBatch> {
        match self {
            Data::Events(batch) => Some(batch),
            Data::Histogram(_) => None,
        }
    }
}

/// A single named data series with its coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct DataArray {
    /// Name of the series.
    pub name: String,
    /// Coordinates, including beamline metadata.
    pub coords: Coords,
    /// The values.
    pub data: Data,
}

impl DataArray {
    /// Creates a data array.
    #[must_use]
    pub fn new(name: impl Into<String>, coords: Coords, data: Data) -> Self {
        Self {
            name: name.into(),
            coords,
            data,
        }
    }
}

/// A collection of named data items sharing one coordinate set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    /// Coordinates shared by all items.
    pub coords: Coords,
    items: BTreeMap<String, Data>,
}

impl Dataset {
    /// Creates a dataset with the given shared coordinates and no items.
    #[must_use]
    pub fn new(coords: Coords) -> Self {
        Self {
            coords,
            items: BTreeMap::new(),
        }
    }

    /// Inserts or replaces a named item.
    pub fn insert(&mut self, name: impl Into<String>, data: Data) {
        self.items.insert(name.into(), data);
    }

    /// Looks up an item by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Data> {
        self.items.get(name)
    }

    /// Iterates over `(name, item)` pairs.
    pub fn items(&self) -> impl Iterator<Item = (&String, &Data)> {
        self.items.iter()
    }

    /// Number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True if the dataset holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Uniform access to the two container kinds.
///
/// [`DataArray`] (single series) and [`Dataset`] (collection) both expose
/// their coordinate set and their data items, so the conversion engine is
/// written once against this trait.
pub trait Container {
    /// Shared coordinate set.
    fn coords(&self) -> &Coords;

    /// Mutable shared coordinate set.
    fn coords_mut(&mut self) -> &mut Coords;

    /// All data items.
    fn data_items(&self) -> Vec<&Data>;

    /// All data items, mutably.
    fn data_items_mut(&mut self) -> Vec<&mut Data>;
}

impl Container for DataArray {
    fn coords(&self) -> &Coords {
        &self.coords
    }

    fn coords_mut(&mut self) -> &mut Coords {
        &mut self.coords
    }

    fn data_items(&self) -> Vec<&Data> {
        vec![&self.data]
    }

    fn data_items_mut(&mut self) -> Vec<&mut Data> {
        vec![&mut self.data]
    }
}

impl Container for Dataset {
    fn coords(&self) -> &Coords {
        &self.coords
    }

    fn coords_mut(&mut self) -> &mut Coords {
        &mut self.coords
    }

    fn data_items(&self) -> Vec<&Data> {
        self.items.values().collect()
    }

    fn data_items_mut(&mut self) -> Vec<&mut Data> {
        self.items.values_mut().collect()
    }
}
