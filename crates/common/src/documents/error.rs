use url::Url;

use crate::descriptor::DescriptorError;
use crate::location::{DocumentType, LocationError};
use crate::store::StoreError;

/// Why a container is neither absent nor properly populated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Inconsistency {
    #[error("binary {0} has no descriptor")]
    MissingDescriptor(Url),
    #[error("descriptor {0} has no binary")]
    MissingBinary(Url),
    #[error("expected one binary and one descriptor, found {binaries} and {descriptors}")]
    Ambiguous { binaries: usize, descriptors: usize },
    #[error("descriptor {descriptor} describes {described}, not {binary}")]
    Mismatch {
        descriptor: Url,
        described: Url,
        binary: Url,
    },
    #[error("descriptor {0} is for document type {1}")]
    ForeignDescriptor(Url, DocumentType),
    #[error("descriptor {0} is unreadable: {1}")]
    UnreadableDescriptor(Url, DescriptorError),
}

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("a document already exists at {0}")]
    AlreadyExists(Url),
    #[error("no document found at {0}")]
    DocumentNotFound(Url),
    #[error("permission denied on {0}")]
    PermissionDenied(Url),
    #[error("identity not found: {0}")]
    TargetNotFound(String),
    #[error("container {0} is inconsistent: {1}")]
    InconsistentContainer(Url, Inconsistency),
    #[error("network failure: {0}")]
    NetworkFailure(StoreError),
    #[error("container {0} still holds resources")]
    ContainerNotEmpty(Url),
    /// Every deletion was awaited; these are the ones that failed
    #[error("failed to delete {} resource(s) in {container}", .failures.len())]
    DeletionFailed {
        container: Url,
        failures: Vec<(Url, StoreError)>,
    },
    #[error("invalid document type '{0}'")]
    InvalidDocumentType(String),
    #[error("invalid file name '{0}'")]
    InvalidFileName(String),
    #[error("cannot change your own access to {0}")]
    SelfGrant(Url),
    #[error("store error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for DocumentError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound(url) => DocumentError::DocumentNotFound(url),
            StoreError::Forbidden(url) => DocumentError::PermissionDenied(url),
            StoreError::AlreadyExists(url) => DocumentError::AlreadyExists(url),
            StoreError::NotEmpty(url) => DocumentError::ContainerNotEmpty(url),
            error @ (StoreError::Timeout(_) | StoreError::Transport(_)) => {
                DocumentError::NetworkFailure(error)
            }
            error => DocumentError::Store(error),
        }
    }
}

impl From<LocationError> for DocumentError {
    fn from(error: LocationError) -> Self {
        match error {
            LocationError::InvalidDocumentType(value) => DocumentError::InvalidDocumentType(value),
            LocationError::UnresolvableIdentity(web_id, _) => {
                DocumentError::TargetNotFound(web_id.to_string())
            }
            LocationError::InvalidStoreBase(url) => DocumentError::Store(StoreError::Malformed(
                url,
                "store base cannot hold containers".to_string(),
            )),
        }
    }
}
