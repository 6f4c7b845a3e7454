use std::convert::Infallible;
use std::str::FromStr;

use super::{DocumentError, DocumentManager};
use crate::acl::{AccessControl, AccessGrant, AccessModes};
use crate::identity::{Session, WebId};
use crate::location::{resolve_container_url, DocumentType, Scope};
use crate::store::RemoteStore;

/// Whether a permission change gives or takes away read access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GrantKind {
    Give,
    Revoke,
}

impl GrantKind {
    /// Anything other than an explicit `give` revokes.
    pub fn from_input(input: Option<&str>) -> Self {
        match input {
            Some(value) if value.trim().eq_ignore_ascii_case("give") => GrantKind::Give,
            _ => GrantKind::Revoke,
        }
    }
}

impl FromStr for GrantKind {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_input(Some(s)))
    }
}

impl From<&str> for GrantKind {
    fn from(value: &str) -> Self {
        Self::from_input(Some(value))
    }
}

impl DocumentManager {
    /// Give or revoke `target`'s read access to the caller's container for
    ///  `doc_type`.
    ///
    /// The target ends up with exactly one entry in the container's
    ///  access-control resource; any earlier entry for it is replaced.
    ///
    /// # Returns
    /// The grant now in place for the target
    ///
    /// # Errors
    /// * `TargetNotFound` - `target` does not name an identity
    /// * `SelfGrant` - `target` is the caller
    /// * `DocumentNotFound` - The container does not exist
    /// * `PermissionDenied` - The store refused to read or write the
    ///   access-control resource
    pub async fn set_doc_acl_permission<S: RemoteStore>(
        &self,
        session: &Session<S>,
        doc_type: &DocumentType,
        kind: GrantKind,
        target: &str,
    ) -> Result<AccessGrant, DocumentError> {
        let grantee = WebId::parse_target(target).map_err(|e| {
            tracing::debug!("cannot resolve grant target '{}': {}", target, e);
            DocumentError::TargetNotFound(target.to_string())
        })?;
        let container = resolve_container_url(session.pod(), doc_type, &Scope::Own)?;
        if &grantee == session.web_id() {
            return Err(DocumentError::SelfGrant(container));
        }

        let _guard = self.lock(session.web_id(), doc_type).await;
        let store = session.store();
        let resource = store.get_resource_with_access_control(&container).await?;
        let mut access_control = match &resource.access_control {
            Some(access_control) => access_control.clone(),
            None => {
                tracing::debug!("{} has no access control yet, starting owner-only", container);
                AccessControl::owner_only(container.clone(), session.web_id())
            }
        };

        let grant = AccessGrant::new(
            grantee,
            AccessModes::read_only(kind == GrantKind::Give),
        );
        let previous = access_control.set_grant(grant.clone());
        store
            .save_access_control(&resource, &access_control)
            .await?;

        tracing::info!(
            "{} on {}: {} -> {}",
            grant.grantee,
            container,
            previous
                .map(|grant| grant.modes.to_string())
                .unwrap_or_else(|| "none".to_string()),
            grant.modes
        );
        Ok(grant)
    }

    /// The grants in the access-control resource of the caller's container
    ///  for `doc_type`. Empty when the container has none of its own.
    pub async fn list_permissions<S: RemoteStore>(
        &self,
        session: &Session<S>,
        doc_type: &DocumentType,
    ) -> Result<Vec<AccessGrant>, DocumentError> {
        let container = resolve_container_url(session.pod(), doc_type, &Scope::Own)?;
        let resource = session
            .store()
            .get_resource_with_access_control(&container)
            .await?;
        Ok(resource
            .access_control
            .map(|access_control| access_control.grants().to_vec())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grant_kind_defaults_to_revoke() {
        assert_eq!(GrantKind::from_input(Some("Give")), GrantKind::Give);
        assert_eq!(GrantKind::from("give"), GrantKind::Give);
        assert_eq!(" GIVE ".parse::<GrantKind>().unwrap(), GrantKind::Give);

        assert_eq!(GrantKind::from_input(Some("Revoke")), GrantKind::Revoke);
        assert_eq!(GrantKind::from_input(Some("grant")), GrantKind::Revoke);
        assert_eq!(GrantKind::from_input(Some("")), GrantKind::Revoke);
        assert_eq!(GrantKind::from_input(None), GrantKind::Revoke);
    }
}
