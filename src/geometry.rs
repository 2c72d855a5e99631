//! Euclidean distances between network sites with a lazily filled cache.

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;

use crate::error::LookupError;
use crate::instance::Instance;

/// A location reference: its category plus the id within that category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Site {
    Garage(usize),
    Depot(usize),
    Station(usize),
}

impl Site {
    /// The id within the site's category.
    pub fn id(&self) -> usize {
        match *self {
            Site::Garage(id) | Site::Depot(id) | Site::Station(id) => id,
        }
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Site::Garage(id) => write!(f, "garage {}", id),
            Site::Depot(id) => write!(f, "depot {}", id),
            Site::Station(id) => write!(f, "station {}", id),
        }
    }
}

/// Symmetric distance memo shared for the lifetime of a run.
///
/// Entries are written once per unordered pair (under both orderings) and
/// never invalidated. Interior mutability keeps lookups available through
/// shared references while a round borrows the instance.
#[derive(Debug, Default)]
pub struct DistanceCache {
    entries: RefCell<HashMap<(Site, Site), f64>>,
}

impl DistanceCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        DistanceCache::default()
    }

    /// Euclidean distance between two sites of `instance`.
    ///
    /// Fails if either id is unknown in its category.
    pub fn distance(&self, instance: &Instance, a: Site, b: Site) -> Result<f64, LookupError> {
        if let Some(&cached) = self.entries.borrow().get(&(a, b)) {
            return Ok(cached);
        }

        let from = instance.location(a)?;
        let to = instance.location(b)?;
        let dist = from.distance(to);

        let mut entries = self.entries.borrow_mut();
        entries.insert((a, b), dist);
        entries.insert((b, a), dist);

        Ok(dist)
    }

    /// Whether the pair has already been computed.
    pub fn contains(&self, a: Site, b: Site) -> bool {
        self.entries.borrow().contains_key(&(a, b))
    }

    /// Number of cached ordered pairs.
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}
