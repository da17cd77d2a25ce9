//! Cached collection identity
//!
//! The collection is created at most once per process. Concurrent first
//! requests share one creation; a failed creation leaves the cache empty so
//! the next request tries again. A creation that completes after its caller
//! stopped waiting is still recorded and adopted by the next request.

use std::future::Future;
use std::sync::{Mutex, PoisonError};

use log::info;
use tokio::sync::OnceCell;

use crate::error::Result;
use crate::ledger::{CollectionId, CollectionSpec};

/// Get-or-create cache for the collection id
#[derive(Debug)]
pub struct CollectionRegistry {
    spec: CollectionSpec,
    cell: OnceCell<CollectionId>,
    created: Mutex<Option<CollectionId>>,
}

impl CollectionRegistry {
    /// Empty registry that creates collections from `spec`
    pub fn new(spec: CollectionSpec) -> Self {
        CollectionRegistry { spec, cell: OnceCell::new(), created: Mutex::new(None) }
    }

    /// Registry pre-seeded with an existing collection
    pub fn with_existing(spec: CollectionSpec, id: CollectionId) -> Self {
        CollectionRegistry { spec, cell: OnceCell::new_with(Some(id)), created: Mutex::new(None) }
    }

    /// Parameters used for creation
    pub fn spec(&self) -> &CollectionSpec {
        &self.spec
    }

    /// Cached id, if a collection exists
    pub fn cached(&self) -> Option<&CollectionId> {
        self.cell.get()
    }

    /// Record a collection the ledger created
    ///
    /// Called from the creation task itself, so the id survives even when the
    /// request that started the creation has already given up.
    pub fn record_created(&self, id: CollectionId) {
        *self.created.lock().unwrap_or_else(PoisonError::into_inner) = Some(id.clone());
        if self.cell.set(id).is_ok() {
            info!("Cached collection created after its request stopped waiting");
        }
    }

    /// Take a recorded creation that has not been cached yet
    pub fn take_created(&self) -> Option<CollectionId> {
        self.created.lock().unwrap_or_else(PoisonError::into_inner).take()
    }

    /// Return the cached id or run `create` to obtain one
    pub async fn get_or_create<F, Fut>(&self, create: F) -> Result<CollectionId>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<CollectionId>>,
    {
        if let Some(id) = self.cell.get() {
            return Ok(id.clone());
        }
        let id = self
            .cell
            .get_or_try_init(|| async {
                let id = create().await?;
                info!("Collection {} ready ({})", id, self.spec.symbol);
                Ok::<_, crate::error::MintError>(id)
            })
            .await?;
        Ok(id.clone())
    }
}
