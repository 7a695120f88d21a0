//! Shared, reloadable catalog state.
//!
//! Readers take an `Arc` to the current [`CatalogSnapshot`] and keep it for the
//! whole request, so a concurrent reload never changes data under them.

use std::path::Path;
use std::sync::{Arc, RwLock};

use crate::catalog::CodeCatalog;
use crate::keywords::KeywordExpander;
use crate::matcher::Matcher;
use crate::types::{CatalogConfig, CatalogResult, MatcherConfig};

/// A catalog together with the matcher built over it.
#[derive(Debug)]
pub struct CatalogSnapshot {
    catalog: Arc<CodeCatalog>,
    matcher: Matcher,
}

impl CatalogSnapshot {
    /// Builds a snapshot, indexing the catalog.
    pub fn new(catalog: CodeCatalog, expander: KeywordExpander, config: MatcherConfig) -> Self {
        let catalog = Arc::new(catalog);
        let matcher = Matcher::with_config(Arc::clone(&catalog), expander, config);
        Self { catalog, matcher }
    }

    /// Returns the catalog.
    pub fn catalog(&self) -> &CodeCatalog {
        &self.catalog
    }

    /// Returns the matcher.
    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }
}

/// Thread-safe holder for the active [`CatalogSnapshot`].
///
/// ```ignore
/// let handle = CatalogHandle::new(catalog, KeywordExpander::new());
///
/// let snapshot = handle.current();
/// let hits = snapshot.matcher().search("tonsillectomy", 10);
///
/// // Elsewhere, swap in new data. `snapshot` above is unaffected.
/// handle.reload_from_path("ent_codes.csv", &CatalogConfig::default())?;
/// ```
#[derive(Debug)]
pub struct CatalogHandle {
    current: RwLock<Arc<CatalogSnapshot>>,
    expander: KeywordExpander,
    matcher_config: MatcherConfig,
}

impl CatalogHandle {
    /// Creates a handle over an initial catalog.
    pub fn new(catalog: CodeCatalog, expander: KeywordExpander) -> Self {
        Self::with_config(catalog, expander, MatcherConfig::default())
    }

    /// Creates a handle with explicit matcher configuration.
    pub fn with_config(
        catalog: CodeCatalog,
        expander: KeywordExpander,
        matcher_config: MatcherConfig,
    ) -> Self {
        let snapshot = CatalogSnapshot::new(catalog, expander.clone(), matcher_config.clone());
        Self {
            current: RwLock::new(Arc::new(snapshot)),
            expander,
            matcher_config,
        }
    }

    /// Returns the active snapshot.
    pub fn current(&self) -> Arc<CatalogSnapshot> {
        // A poisoned lock still holds a complete snapshot; the swap is a single store.
        match self.current.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// Installs a new catalog. The index is built before the lock is taken.
    pub fn replace(&self, catalog: CodeCatalog) {
        let snapshot = Arc::new(CatalogSnapshot::new(
            catalog,
            self.expander.clone(),
            self.matcher_config.clone(),
        ));
        let count = snapshot.catalog().len();

        match self.current.write() {
            Ok(mut guard) => *guard = snapshot,
            Err(poisoned) => *poisoned.into_inner() = snapshot,
        }

        tracing::info!("Catalog replaced: {} codes", count);
    }

    /// Loads a catalog file and installs it.
    ///
    /// # Errors
    /// Returns the load error and keeps the current snapshot.
    pub fn reload_from_path<P: AsRef<Path>>(
        &self,
        path: P,
        config: &CatalogConfig,
    ) -> CatalogResult<()> {
        let path = path.as_ref();
        tracing::info!("Reloading CPT catalog from: {}", path.display());

        match CodeCatalog::from_path(path, config) {
            Ok(catalog) => {
                self.replace(catalog);
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Catalog reload failed, keeping current data: {}", e);
                Err(e)
            }
        }
    }
}
