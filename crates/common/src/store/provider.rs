use async_trait::async_trait;
use url::Url;

use super::dataset::{Binary, Dataset};
use crate::acl::AccessControl;
use crate::identity::{Profile, WebId};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Nothing lives at the url
    #[error("resource not found: {0}")]
    NotFound(Url),
    /// The capability in use may not perform the request
    #[error("access forbidden: {0}")]
    Forbidden(Url),
    /// A create-if-absent found something already in place
    #[error("resource already exists: {0}")]
    AlreadyExists(Url),
    /// Containers can only be removed once they are empty
    #[error("container is not empty: {0}")]
    NotEmpty(Url),
    /// The request did not finish in time or was cancelled
    #[error("request timed out: {0}")]
    Timeout(String),
    /// The request never produced a response
    #[error("transport error: {0}")]
    Transport(String),
    /// The store answered with something we could not interpret
    #[error("malformed resource at {0}: {1}")]
    Malformed(Url, String),
    /// Any other unexpected answer -- url, status, body
    #[error("unexpected status {1} from {0}: {2}")]
    Status(Url, u16, String),
}

impl StoreError {
    /// Transient failures a caller may want to retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Timeout(_) | StoreError::Transport(_))
    }
}

/// A resource together with the access-control resource governing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceWithAcl {
    /// The resource the access-control resource is attached to
    pub resource: Url,
    /// Where the store keeps the resource's own access-control resource
    pub acl_url: Url,
    /// `None` when the resource has no access-control resource of its own yet
    pub access_control: Option<AccessControl>,
}

/// The primitive operations of a capability-scoped remote store.
///
/// Implementations carry their own credentials; every call acts on behalf of
///  whoever the implementation was authenticated as.
#[async_trait]
pub trait RemoteStore: Send + Sync + std::fmt::Debug {
    /// Create an empty container at `url`.
    ///
    /// Must be a create-if-absent: fails with
    ///  `Err(StoreError::AlreadyExists)` instead of touching an existing one.
    async fn create_container(&self, url: &Url) -> Result<(), StoreError>;

    /// Read a structured resource. For containers this is the listing.
    async fn get_dataset(&self, url: &Url) -> Result<Dataset, StoreError>;

    /// Store `dataset` as a new member of `container`, named after `slug`
    ///  where the store allows it.
    ///
    /// # Returns
    /// * `Ok(Url)` - The url the store assigned
    async fn save_dataset_in_container(
        &self,
        container: &Url,
        dataset: &Dataset,
        slug: &str,
    ) -> Result<Url, StoreError>;

    /// Replace the structured resource at `url`.
    async fn save_dataset(&self, url: &Url, dataset: &Dataset) -> Result<(), StoreError>;

    /// Store `binary` as a new member of `container`.
    ///
    /// # Returns
    /// * `Ok(Url)` - The url the store assigned
    async fn save_binary_in_container(
        &self,
        container: &Url,
        binary: &Binary,
        slug: &str,
    ) -> Result<Url, StoreError>;

    /// Replace the content of an existing binary resource in place.
    async fn overwrite_binary(&self, url: &Url, binary: &Binary) -> Result<Url, StoreError>;

    /// Read a binary resource.
    async fn read_binary(&self, url: &Url) -> Result<Binary, StoreError>;

    /// Delete a non-container resource.
    async fn delete_resource(&self, url: &Url) -> Result<(), StoreError>;

    /// Delete a container. Fails with `Err(StoreError::NotEmpty)` while
    ///  the container still has members.
    async fn delete_container(&self, url: &Url) -> Result<(), StoreError>;

    /// Fetch a resource's own access-control resource.
    async fn get_resource_with_access_control(
        &self,
        url: &Url,
    ) -> Result<ResourceWithAcl, StoreError>;

    /// Persist the access-control resource of `resource`.
    async fn save_access_control(
        &self,
        resource: &ResourceWithAcl,
        access_control: &AccessControl,
    ) -> Result<(), StoreError>;

    /// Read what the store publishes about `web_id`.
    async fn resolve_identity_profile(&self, web_id: &WebId) -> Result<Profile, StoreError>;
}
