//! Breadboard connection points and the bus index.
//!
//! A breadboard is a set of holes ([`ConnectionPoint`]s). Holes on the same
//! metal strip share a bus id and are always electrically identical. The
//! [`BusIndex`] answers "which bus is this hole on" and "which holes are on
//! this bus" in constant time.

pub mod layout;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub use layout::{load_holes, parse_holes, standard_layout, DEFAULT_COLUMNS, MAX_COLUMNS};

/// Kind of strip a hole belongs to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum HoleKind {
    Main,
    Power,
    Ground,
}

impl std::fmt::Display for HoleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HoleKind::Main => write!(f, "main"),
            HoleKind::Power => write!(f, "power"),
            HoleKind::Ground => write!(f, "ground"),
        }
    }
}

/// A physical hole a component leg or wire end can attach to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConnectionPoint {
    pub id: String,
    #[serde(rename = "bus")]
    pub bus_id: String,
    #[serde(rename = "type")]
    pub kind: HoleKind,
}

impl ConnectionPoint {
    pub fn new(id: impl Into<String>, bus_id: impl Into<String>, kind: HoleKind) -> Self {
        Self {
            id: id.into(),
            bus_id: bus_id.into(),
            kind,
        }
    }
}

/// Lookup tables from hole id to bus and from bus to holes.
#[derive(Debug, Clone, Default)]
pub struct BusIndex {
    points: Vec<ConnectionPoint>,
    by_id: HashMap<String, usize>,
    by_bus: HashMap<String, Vec<usize>>,
}

impl BusIndex {
    /// Build the index from a hole list. A repeated hole id keeps its first record.
    pub fn new(points: Vec<ConnectionPoint>) -> Self {
        let mut index = Self::default();
        for point in points {
            if index.by_id.contains_key(&point.id) {
                tracing::warn!("Ignoring duplicate breadboard hole '{}'", point.id);
                continue;
            }
            let slot = index.points.len();
            index.by_id.insert(point.id.clone(), slot);
            index.by_bus.entry(point.bus_id.clone()).or_default().push(slot);
            index.points.push(point);
        }
        index
    }

    /// Bus of a hole, or `None` when the id is not a breadboard hole
    /// (component pin references like `pico1.GP0` never resolve here).
    pub fn bus_of(&self, point_id: &str) -> Option<&str> {
        self.point(point_id).map(|p| p.bus_id.as_str())
    }

    pub fn point(&self, point_id: &str) -> Option<&ConnectionPoint> {
        self.by_id.get(point_id).map(|&slot| &self.points[slot])
    }

    pub fn contains(&self, point_id: &str) -> bool {
        self.by_id.contains_key(point_id)
    }

    /// All holes on a bus, in hole-list order.
    pub fn points_on_bus(&self, bus_id: &str) -> Vec<&ConnectionPoint> {
        self.by_bus
            .get(bus_id)
            .map(|slots| slots.iter().map(|&slot| &self.points[slot]).collect())
            .unwrap_or_default()
    }

    /// True if any hole on the bus is of the given kind.
    pub fn bus_has_kind(&self, bus_id: &str, kind: HoleKind) -> bool {
        self.by_bus
            .get(bus_id)
            .map(|slots| slots.iter().any(|&slot| self.points[slot].kind == kind))
            .unwrap_or(false)
    }

    pub fn hole_count(&self) -> usize {
        self.points.len()
    }

    pub fn bus_count(&self) -> usize {
        self.by_bus.len()
    }
}
