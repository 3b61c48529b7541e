//! Static item catalog
//!
//! Maps item identifiers to their attributes. Built once from two record
//! streams that correspond row by row: the item rows carry id, reward and
//! weight, the location rows carry the coordinates of the item on the same
//! line. Pairing is positional, not a keyed join, so the streams must have
//! the same length.

use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::records::{self, ItemRecord, LocationRecord};
use crate::types::{Item, ItemId, Location};
use crate::{Result, SelectionError};

/// Item lookup table
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    items: HashMap<ItemId, Arc<Item>>,
}

impl Catalog {
    /// Build the catalog from positionally aligned record sequences
    pub fn load(items: Vec<ItemRecord>, locations: Vec<LocationRecord>) -> Result<Self> {
        if items.len() != locations.len() {
            return Err(SelectionError::MisalignedRecords {
                context: "item/location record",
                expected: items.len(),
                found: locations.len(),
            });
        }

        let mut table = HashMap::with_capacity(items.len());
        for (item, location) in items.into_iter().zip(locations) {
            table.insert(
                item.id,
                Arc::new(Item {
                    location: Location {
                        x: location.x,
                        y: location.y,
                    },
                    reward: item.reward,
                    weight: item.weight,
                }),
            );
        }

        info!("Loaded catalog with {} items", table.len());

        Ok(Self { items: table })
    }

    /// Parse both record streams, then build the catalog
    pub fn from_readers(items: impl BufRead, locations: impl BufRead) -> Result<Self> {
        Self::load(
            records::read_item_records(items)?,
            records::read_location_records(locations)?,
        )
    }

    pub fn from_paths(items: impl AsRef<Path>, locations: impl AsRef<Path>) -> Result<Self> {
        Self::load(
            records::read_item_records_from_path(items)?,
            records::read_location_records_from_path(locations)?,
        )
    }

    /// Resolve an item; absent identifiers yield `None`, never a default
    pub fn get(&self, id: &ItemId) -> Option<Arc<Item>> {
        self.items.get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ItemId, &Arc<Item>)> {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_catalog() -> Catalog {
        Catalog::from_readers(
            "a,10.0,1.0\nb,5.0,2.0\n".as_bytes(),
            "0,0,a\n3,4,b\n".as_bytes(),
        )
        .unwrap()
    }

    #[test]
    fn test_load_pairs_rows_by_position() {
        let catalog = sample_catalog();
        assert_eq!(catalog.len(), 2);

        let a = catalog.get(&ItemId::new("a")).unwrap();
        assert_eq!(a.reward, 10.0);
        assert_eq!(a.location, Location { x: 0, y: 0 });

        let b = catalog.get(&ItemId::new("b")).unwrap();
        assert_eq!(b.weight, 2.0);
        assert_eq!(b.location, Location { x: 3, y: 4 });
    }

    #[test]
    fn test_load_rejects_misaligned_streams() {
        let err = Catalog::from_readers("a,10.0,1.0\nb,5.0,2.0\n".as_bytes(), "0,0\n".as_bytes())
            .unwrap_err();
        match err {
            SelectionError::MisalignedRecords {
                expected, found, ..
            } => {
                assert_eq!(expected, 2);
                assert_eq!(found, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_get_absent_item() {
        let catalog = sample_catalog();
        assert!(catalog.get(&ItemId::new("z")).is_none());
    }

    #[test]
    fn test_malformed_row_aborts_load() {
        let result = Catalog::from_readers(
            "a,10.0,1.0\nb,five,2.0\n".as_bytes(),
            "0,0\n3,4\n".as_bytes(),
        );
        assert!(matches!(
            result,
            Err(SelectionError::MalformedRecord { line: 2, .. })
        ));
    }
}
