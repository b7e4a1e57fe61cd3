//! Business key → target identifier resolution.
//!
//! The resolver never fabricates identifiers: it only records what the
//! target's filtered search returned. Key sets larger than the search cap
//! are split into consecutive sub-batches, and one failing sub-batch fails
//! the whole resolution so the caller never sees a partial map.

use std::collections::BTreeSet;

use crate::config::SideConfig;
use crate::error::LookupError;
use crate::model::{normalize_key, FoundObject, ResolutionMap};

/// Filtered-search capability of the target system.
pub trait KeyLookup {
    /// Return every object of `object_type` whose `property` is one of
    /// `values`. `values` holds at most `limit` entries; `limit` is also the
    /// page size when the target pages its results.
    fn search(
        &self,
        object_type: &str,
        property: &str,
        values: &[String],
        limit: usize,
    ) -> Result<Vec<FoundObject>, LookupError>;
}

/// Resolution result plus the number of search calls it took.
#[derive(Debug)]
pub struct Resolution {
    pub map: Result<ResolutionMap, LookupError>,
    pub calls: usize,
}

pub struct KeyResolver<'a> {
    lookup: &'a dyn KeyLookup,
    limit: usize,
}

impl<'a> KeyResolver<'a> {
    pub fn new(lookup: &'a dyn KeyLookup, limit: usize) -> Self {
        Self { lookup, limit: limit.max(1) }
    }

    /// Resolve `keys` for one side. Empty keys are never sent.
    pub fn resolve(&self, side: &SideConfig, keys: &BTreeSet<String>) -> Resolution {
        let values: Vec<String> = keys.iter().filter(|k| !k.is_empty()).cloned().collect();
        let mut map = ResolutionMap::new();
        let mut calls = 0;
        let mut duplicates = 0usize;

        for chunk in values.chunks(self.limit) {
            calls += 1;
            let found = match self.lookup.search(
                &side.object_type,
                &side.key_property,
                chunk,
                self.limit,
            ) {
                Ok(found) => found,
                Err(e) => return Resolution { map: Err(e), calls },
            };

            for obj in found {
                let Some(key) = obj.key.as_deref().map(normalize_key) else {
                    continue;
                };
                if map.contains_key(&key) {
                    duplicates += 1;
                    continue;
                }
                map.insert(key, obj.id);
            }
        }

        if duplicates > 0 {
            log::warn!(
                "{}.{}: {duplicates} target object(s) share an already-resolved key; kept the first",
                side.object_type,
                side.key_property,
            );
        }

        Resolution { map: Ok(map), calls }
    }
}
