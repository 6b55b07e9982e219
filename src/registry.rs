//! The set of searchable regions and their lazily loaded tables.
//!
//! Every region is loaded at most once per process. The first `get` for a
//! label runs loader, normalizer and index preparation; concurrent callers for
//! the same label wait for that single load and then share the result. A
//! failed load is cached too, so a broken file is reported consistently
//! instead of being re-read on every request.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use futures::future::join_all;
use indexmap::IndexMap;
use indexmap::map::Entry;
use tokio::sync::OnceCell;
use tracing::{error, info, warn};
use crate::ParquetSource;
use crate::column_parquet_reader::{ParquetLoader, TableLoader};
use crate::config::{RegistryConfig, SearchFields};
use crate::error::{LoadFailure, RegistryError};
use crate::index_structure::search_index::{prepare_shared, IndexedTable};
use crate::schema_normalizer::normalize;

/// A selectable region: display label plus where its data lives.
#[derive(Debug, Clone)]
pub struct Region {
    pub label: String,
    pub source: ParquetSource,
}

impl Region {
    pub fn new(label: impl Into<String>, source: ParquetSource) -> Self {
        Self { label: label.into(), source }
    }

    /// Numeric code from the first whitespace-separated token of the label.
    ///
    /// ```
    /// # use roll_search::registry::Region;
    /// # use roll_search::ParquetSource;
    /// let region = Region::new("116 - திருப்பூர் (Tiruppur)", ParquetSource::Path("x".into()));
    /// assert_eq!(region.code(), Some(116));
    /// ```
    pub fn code(&self) -> Option<u32> {
        self.label.split_whitespace().next()?.parse().ok()
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

struct RegionSlot {
    region: Region,
    table: OnceCell<Result<Arc<IndexedTable>, LoadFailure>>,
}

/// Registry of regions, keyed by label, in display order.
pub struct DatasetRegistry {
    slots: IndexMap<String, RegionSlot>,
    fields: SearchFields,
    loader: Arc<dyn TableLoader>,
}

impl fmt::Debug for DatasetRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatasetRegistry")
            .field("regions", &self.labels())
            .field("fields", &self.fields)
            .finish()
    }
}

impl DatasetRegistry {
    /// Builds a registry. Nothing is loaded yet.
    ///
    /// Regions are ordered by numeric code; labels without a code follow, in
    /// label order. A repeated label keeps its first entry.
    pub fn new(regions: Vec<Region>, fields: SearchFields, loader: Arc<dyn TableLoader>) -> Self {
        let mut regions = regions;
        regions.sort_by(|a, b| {
            let (ca, cb) = (a.code(), b.code());
            (ca.is_none(), ca, &a.label).cmp(&(cb.is_none(), cb, &b.label))
        });

        let mut slots = IndexMap::with_capacity(regions.len());
        for region in regions {
            match slots.entry(region.label.clone()) {
                Entry::Occupied(_) => {
                    warn!(region = %region.label, "duplicate region label, keeping the first entry");
                }
                Entry::Vacant(slot) => {
                    slot.insert(RegionSlot { region, table: OnceCell::new() });
                }
            }
        }

        Self { slots, fields, loader }
    }

    /// Registry over Parquet files described by `config`.
    pub fn from_config(config: &RegistryConfig) -> Self {
        let regions = config.regions.iter()
            .map(|entry| Region::new(entry.label.clone(), config.source_for(entry)))
            .collect();
        Self::new(regions, config.fields.clone(), Arc::new(ParquetLoader))
    }

    /// Labels in display order.
    pub fn labels(&self) -> Vec<&str> {
        self.slots.keys().map(String::as_str).collect()
    }

    pub fn regions(&self) -> impl Iterator<Item = &Region> {
        self.slots.values().map(|slot| &slot.region)
    }

    pub fn fields(&self) -> &SearchFields {
        &self.fields
    }

    /// Whether the region's load has finished, successfully or not.
    pub fn is_loaded(&self, label: &str) -> bool {
        self.slots.get(label).is_some_and(|slot| slot.table.initialized())
    }

    /// Returns the prepared table of a region, loading it on first use.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::UnknownRegion`] if no region has this label.
    /// - [`RegistryError::Load`] if the region's data could not be loaded. The
    ///   same failure is returned on every later call.
    pub async fn get(&self, label: &str) -> Result<Arc<IndexedTable>, RegistryError> {
        let slot = self.slots.get(label)
            .ok_or_else(|| RegistryError::UnknownRegion(label.to_string()))?;

        let outcome = slot.table
            .get_or_init(|| self.load_region(&slot.region))
            .await;

        outcome.clone().map_err(RegistryError::from)
    }

    /// Loads every region concurrently, returning the failures.
    pub async fn load_all(&self) -> Vec<LoadFailure> {
        let outcomes = join_all(self.slots.keys().map(|label| self.get(label))).await;
        outcomes.into_iter()
            .filter_map(|outcome| match outcome {
                Err(RegistryError::Load(failure)) => Some(failure),
                _ => None,
            })
            .collect()
    }

    async fn load_region(&self, region: &Region) -> Result<Arc<IndexedTable>, LoadFailure> {
        let started = Instant::now();
        info!(region = %region, source = %region.source, "loading region");

        let outcome = match self.loader.load(&region.source).await {
            Ok(raw) => normalize(raw, &self.fields).map(prepare_shared),
            Err(e) => Err(e),
        };

        match outcome {
            Ok(indexed) => {
                info!(
                    region = %region,
                    rows = indexed.num_rows(),
                    columns = indexed.table.batch.num_columns(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "region ready"
                );
                Ok(indexed)
            }
            Err(cause) => {
                let failure = LoadFailure::new(region.label.as_str(), cause);
                error!(region = %region, error = %failure.cause, "region failed to load");
                Err(failure)
            }
        }
    }
}
