use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use url::Url;
use uuid::Uuid;

use super::dataset::{is_container, parent_container, Binary, Dataset};
use super::provider::{RemoteStore, ResourceWithAcl, StoreError};
use crate::acl::{AccessControl, AccessMode};
use crate::identity::{Profile, WebId};

/// Names the primitive a one-shot failure is injected into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOperation {
    CreateContainer,
    GetDataset,
    SaveDataset,
    SaveBinary,
    OverwriteBinary,
    ReadBinary,
    DeleteResource,
    DeleteContainer,
    GetAccessControl,
    SaveAccessControl,
    ResolveProfile,
}

/// In-memory store shared by every handle cloned from it.
///
/// Handles returned by [`MemoryStore::as_agent`] act as that agent and are
///  subject to access control; the handle returned by [`MemoryStore::new`]
///  is administrative and bypasses it.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    inner: Arc<RwLock<MemoryStoreInner>>,
    agent: Option<WebId>,
}

#[derive(Debug, Default)]
struct MemoryStoreInner {
    /// url -> resource
    resources: BTreeMap<String, Resource>,
    /// resource url -> its own access-control resource
    access_controls: BTreeMap<String, AccessControl>,
    profiles: HashMap<WebId, Profile>,
    /// Failures handed out, once each, to the next matching call
    failures: Vec<(StoreOperation, StoreError)>,
}

#[derive(Debug, Clone)]
enum Resource {
    Container,
    Dataset(Dataset),
    Binary(Binary),
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(MemoryStoreInner::default())),
            agent: None,
        }
    }

    /// A handle on the same state acting as `agent`.
    pub fn as_agent(&self, agent: &WebId) -> Self {
        Self {
            inner: self.inner.clone(),
            agent: Some(agent.clone()),
        }
    }

    /// Create a store root at `base` owned by `owner`, publish the owner's
    ///  profile, and lock the root down to the owner.
    pub fn provision_pod(
        &self,
        owner: &WebId,
        base: &Url,
        name: Option<&str>,
    ) -> Result<(), StoreError> {
        let mut inner = self.write()?;
        inner
            .resources
            .insert(base.to_string(), Resource::Container);
        inner.access_controls.insert(
            base.to_string(),
            AccessControl::owner_only(base.clone(), owner),
        );
        inner.profiles.insert(
            owner.clone(),
            Profile {
                web_id: owner.clone(),
                name: name.map(str::to_string),
                storage: Some(base.clone()),
            },
        );
        Ok(())
    }

    /// Publish (or replace) a profile.
    pub fn put_profile(&self, profile: Profile) -> Result<(), StoreError> {
        let mut inner = self.write()?;
        inner.profiles.insert(profile.web_id.clone(), profile);
        Ok(())
    }

    /// Make the next call to `operation` fail with `error`.
    pub fn fail_next(&self, operation: StoreOperation, error: StoreError) -> Result<(), StoreError> {
        let mut inner = self.write()?;
        inner.failures.push((operation, error));
        Ok(())
    }

    pub fn exists(&self, url: &Url) -> bool {
        self.inner
            .read()
            .map(|inner| inner.resources.contains_key(url.as_str()))
            .unwrap_or(false)
    }

    /// Every resource at or below `prefix`.
    pub fn urls_under(&self, prefix: &Url) -> Vec<Url> {
        self.inner
            .read()
            .map(|inner| {
                inner
                    .resources
                    .keys()
                    .filter(|key| key.starts_with(prefix.as_str()))
                    .filter_map(|key| Url::parse(key).ok())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, MemoryStoreInner>, StoreError> {
        self.inner.read().map_err(|e| {
            StoreError::Transport(format!("failed to acquire read lock: {}", e))
        })
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, MemoryStoreInner>, StoreError> {
        self.inner.write().map_err(|e| {
            StoreError::Transport(format!("failed to acquire write lock: {}", e))
        })
    }

    /// Open the state for `operation`, failing first if a failure was injected.
    fn begin(
        &self,
        operation: StoreOperation,
    ) -> Result<RwLockWriteGuard<'_, MemoryStoreInner>, StoreError> {
        let mut inner = self.write()?;
        if let Some(position) = inner.failures.iter().position(|(op, _)| *op == operation) {
            let (_, error) = inner.failures.remove(position);
            return Err(error);
        }
        Ok(inner)
    }

    fn authorize(
        &self,
        inner: &MemoryStoreInner,
        url: &Url,
        mode: AccessMode,
    ) -> Result<(), StoreError> {
        let Some(agent) = &self.agent else {
            return Ok(());
        };
        match inner.permits(url, agent, mode) {
            None | Some(true) => Ok(()),
            Some(false) => {
                tracing::debug!("{} denied {:?} on {}", agent, mode, url);
                Err(StoreError::Forbidden(url.clone()))
            }
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStoreInner {
    /// Whether `agent` may use `mode` on `url`, decided by the resource's own
    ///  access-control resource, else by the inherited grants of the nearest
    ///  ancestor that has one. `None` when nothing governs the url.
    fn permits(&self, url: &Url, agent: &WebId, mode: AccessMode) -> Option<bool> {
        if let Some(access_control) = self.access_controls.get(url.as_str()) {
            return Some(access_control.allows(agent, mode));
        }
        let mut current = parent_container(url);
        while let Some(container) = current {
            if let Some(access_control) = self.access_controls.get(container.as_str()) {
                return Some(access_control.allows_inherited(agent, mode));
            }
            current = parent_container(&container);
        }
        None
    }

    fn ensure_parents(&mut self, url: &Url) {
        let mut current = parent_container(url);
        while let Some(container) = current {
            self.resources
                .entry(container.to_string())
                .or_insert(Resource::Container);
            current = parent_container(&container);
        }
    }

    fn require_container(&self, url: &Url) -> Result<(), StoreError> {
        match self.resources.get(url.as_str()) {
            Some(Resource::Container) => Ok(()),
            Some(_) => Err(StoreError::Status(
                url.clone(),
                409,
                "not a container".to_string(),
            )),
            None => Err(StoreError::NotFound(url.clone())),
        }
    }

    fn members(&self, container: &Url) -> Vec<Url> {
        self.resources
            .keys()
            .filter_map(|key| Url::parse(key).ok())
            .filter(|url| parent_container(url).as_ref() == Some(container))
            .collect()
    }

    /// A fresh member url for `slug` inside `container`.
    fn member_url(&self, container: &Url, slug: &str) -> Result<Url, StoreError> {
        let slug = if slug.is_empty() {
            Uuid::new_v4().simple().to_string()
        } else {
            slug.to_string()
        };
        let url = join_member(container, &slug)?;
        if !self.resources.contains_key(url.as_str()) {
            return Ok(url);
        }
        join_member(container, &format!("{}-{}", Uuid::new_v4().simple(), slug))
    }

    fn remove(&mut self, url: &Url) {
        self.resources.remove(url.as_str());
        self.access_controls.remove(url.as_str());
    }
}

fn join_member(container: &Url, slug: &str) -> Result<Url, StoreError> {
    let mut url = container.clone();
    url.path_segments_mut()
        .map_err(|_| StoreError::Malformed(container.clone(), "cannot be a base".to_string()))?
        .pop_if_empty()
        .push(slug);
    Ok(url)
}

fn acl_url_for(url: &Url) -> Url {
    let mut acl_url = url.clone();
    acl_url.set_path(&format!("{}.acl", url.path()));
    acl_url
}

#[async_trait]
impl RemoteStore for MemoryStore {
    async fn create_container(&self, url: &Url) -> Result<(), StoreError> {
        let mut inner = self.begin(StoreOperation::CreateContainer)?;
        self.authorize(&inner, url, AccessMode::Write)?;
        if !is_container(url) {
            return Err(StoreError::Status(
                url.clone(),
                400,
                "container urls end with '/'".to_string(),
            ));
        }
        if inner.resources.contains_key(url.as_str()) {
            return Err(StoreError::AlreadyExists(url.clone()));
        }
        inner.ensure_parents(url);
        inner
            .resources
            .insert(url.to_string(), Resource::Container);
        Ok(())
    }

    async fn get_dataset(&self, url: &Url) -> Result<Dataset, StoreError> {
        let inner = self.begin(StoreOperation::GetDataset)?;
        self.authorize(&inner, url, AccessMode::Read)?;
        match inner.resources.get(url.as_str()) {
            Some(Resource::Container) => Ok(Dataset::container_listing(url, inner.members(url))),
            Some(Resource::Dataset(dataset)) => Ok(dataset.clone()),
            Some(Resource::Binary(_)) => Err(StoreError::Malformed(
                url.clone(),
                "not a structured resource".to_string(),
            )),
            None => Err(StoreError::NotFound(url.clone())),
        }
    }

    async fn save_dataset_in_container(
        &self,
        container: &Url,
        dataset: &Dataset,
        slug: &str,
    ) -> Result<Url, StoreError> {
        let mut inner = self.begin(StoreOperation::SaveDataset)?;
        self.authorize(&inner, container, AccessMode::Append)?;
        inner.require_container(container)?;
        let url = inner.member_url(container, slug)?;
        inner
            .resources
            .insert(url.to_string(), Resource::Dataset(dataset.clone()));
        Ok(url)
    }

    async fn save_dataset(&self, url: &Url, dataset: &Dataset) -> Result<(), StoreError> {
        let mut inner = self.begin(StoreOperation::SaveDataset)?;
        self.authorize(&inner, url, AccessMode::Write)?;
        if let Some(Resource::Container) = inner.resources.get(url.as_str()) {
            return Err(StoreError::Status(
                url.clone(),
                409,
                "cannot replace a container".to_string(),
            ));
        }
        inner.ensure_parents(url);
        inner
            .resources
            .insert(url.to_string(), Resource::Dataset(dataset.clone()));
        Ok(())
    }

    async fn save_binary_in_container(
        &self,
        container: &Url,
        binary: &Binary,
        slug: &str,
    ) -> Result<Url, StoreError> {
        let mut inner = self.begin(StoreOperation::SaveBinary)?;
        self.authorize(&inner, container, AccessMode::Append)?;
        inner.require_container(container)?;
        let url = inner.member_url(container, slug)?;
        inner
            .resources
            .insert(url.to_string(), Resource::Binary(binary.clone()));
        Ok(url)
    }

    async fn overwrite_binary(&self, url: &Url, binary: &Binary) -> Result<Url, StoreError> {
        let mut inner = self.begin(StoreOperation::OverwriteBinary)?;
        self.authorize(&inner, url, AccessMode::Write)?;
        if is_container(url) || matches!(inner.resources.get(url.as_str()), Some(Resource::Container)) {
            return Err(StoreError::Status(
                url.clone(),
                409,
                "cannot overwrite a container".to_string(),
            ));
        }
        inner.ensure_parents(url);
        inner
            .resources
            .insert(url.to_string(), Resource::Binary(binary.clone()));
        Ok(url.clone())
    }

    async fn read_binary(&self, url: &Url) -> Result<Binary, StoreError> {
        let inner = self.begin(StoreOperation::ReadBinary)?;
        self.authorize(&inner, url, AccessMode::Read)?;
        match inner.resources.get(url.as_str()) {
            Some(Resource::Binary(binary)) => Ok(binary.clone()),
            Some(_) => Err(StoreError::Malformed(
                url.clone(),
                "not a binary resource".to_string(),
            )),
            None => Err(StoreError::NotFound(url.clone())),
        }
    }

    async fn delete_resource(&self, url: &Url) -> Result<(), StoreError> {
        let mut inner = self.begin(StoreOperation::DeleteResource)?;
        self.authorize(&inner, url, AccessMode::Write)?;
        match inner.resources.get(url.as_str()) {
            Some(Resource::Container) => Err(StoreError::Status(
                url.clone(),
                409,
                "containers are removed with delete_container".to_string(),
            )),
            Some(_) => {
                inner.remove(url);
                Ok(())
            }
            None => Err(StoreError::NotFound(url.clone())),
        }
    }

    async fn delete_container(&self, url: &Url) -> Result<(), StoreError> {
        let mut inner = self.begin(StoreOperation::DeleteContainer)?;
        self.authorize(&inner, url, AccessMode::Write)?;
        inner.require_container(url)?;
        let occupied = inner
            .resources
            .keys()
            .any(|key| key.starts_with(url.as_str()) && key.as_str() != url.as_str());
        if occupied {
            return Err(StoreError::NotEmpty(url.clone()));
        }
        inner.remove(url);
        Ok(())
    }

    async fn get_resource_with_access_control(
        &self,
        url: &Url,
    ) -> Result<ResourceWithAcl, StoreError> {
        let inner = self.begin(StoreOperation::GetAccessControl)?;
        self.authorize(&inner, url, AccessMode::Control)?;
        if !inner.resources.contains_key(url.as_str()) {
            return Err(StoreError::NotFound(url.clone()));
        }
        Ok(ResourceWithAcl {
            resource: url.clone(),
            acl_url: acl_url_for(url),
            access_control: inner.access_controls.get(url.as_str()).cloned(),
        })
    }

    async fn save_access_control(
        &self,
        resource: &ResourceWithAcl,
        access_control: &AccessControl,
    ) -> Result<(), StoreError> {
        let mut inner = self.begin(StoreOperation::SaveAccessControl)?;
        let url = &resource.resource;
        self.authorize(&inner, url, AccessMode::Control)?;
        if !inner.resources.contains_key(url.as_str()) {
            return Err(StoreError::NotFound(url.clone()));
        }
        inner
            .access_controls
            .insert(url.to_string(), access_control.clone());
        Ok(())
    }

    async fn resolve_identity_profile(&self, web_id: &WebId) -> Result<Profile, StoreError> {
        let inner = self.begin(StoreOperation::ResolveProfile)?;
        inner
            .profiles
            .get(web_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(web_id.document()))
    }
}
