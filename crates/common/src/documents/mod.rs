//! Document containers and the operations on them.
//!
//! Each (owner, document type) pair owns one container holding exactly one
//!  uploaded binary and the [`Descriptor`](crate::descriptor::Descriptor)
//!  describing it. A container is either absent or populated; anything in
//!  between is reported as [`DocumentError::InconsistentContainer`] and left
//!  for the caller to deal with.
//!
//! [`DocumentManager`] runs every check-then-act sequence for a pair under
//!  that pair's lock, so concurrent callers sharing a manager cannot both
//!  pass an existence probe and both create. Between processes the store's
//!  create-if-absent decides, and the loser sees `AlreadyExists`.

mod error;
mod lifecycle;
mod permissions;
mod remote;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use url::Url;

use crate::descriptor::{Descriptor, DESCRIPTOR_EXTENSION};
use crate::identity::WebId;
use crate::location::DocumentType;
use crate::store::Binary;

pub use error::{DocumentError, Inconsistency};
pub use permissions::GrantKind;

/// A file handed in for upload or update.
#[derive(Debug, Clone)]
pub struct FileObject {
    pub doc_type: DocumentType,
    /// Name of the file, used as the stored binary's slug
    pub name: String,
    pub content: Binary,
    pub end_date: NaiveDate,
    pub description: String,
}

impl FileObject {
    fn validate(&self) -> Result<(), DocumentError> {
        let name = self.name.trim();
        let invalid = name.is_empty()
            || name.contains(['/', '\\'])
            || name.ends_with(DESCRIPTOR_EXTENSION);
        if invalid {
            return Err(DocumentError::InvalidFileName(self.name.clone()));
        }
        Ok(())
    }
}

/// A populated container: where its two halves live and what the
///  descriptor says.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredDocument {
    pub container: Url,
    pub binary: Url,
    pub descriptor_url: Url,
    pub descriptor: Descriptor,
}

type LockKey = (WebId, DocumentType);

#[derive(Debug, Clone, Default)]
pub struct DocumentManager {
    locks: Arc<Mutex<HashMap<LockKey, Arc<AsyncMutex<()>>>>>,
}

impl DocumentManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serialize work on one (owner, document type) pair.
    async fn lock(&self, owner: &WebId, doc_type: &DocumentType) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
            // nobody holds or waits on a lock only the table references
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            locks
                .entry((owner.clone(), doc_type.clone()))
                .or_default()
                .clone()
        };
        lock.lock_owned().await
    }
}
