use url::Url;

use super::{DocumentError, DocumentManager};
use crate::identity::{Profile, Session, WebId};
use crate::location::{DocumentType, Scope};
use crate::store::{RemoteStore, StoreError};

fn parse_identity(input: &str) -> Result<WebId, DocumentError> {
    WebId::parse_target(input).map_err(|e| {
        tracing::debug!("cannot resolve identity '{}': {}", input, e);
        DocumentError::TargetNotFound(input.to_string())
    })
}

impl DocumentManager {
    /// Find `remote`'s container for `doc_type`, if the caller can see it.
    /// Never writes to the remote store.
    pub async fn locate_remote_document<S: RemoteStore>(
        &self,
        session: &Session<S>,
        doc_type: &DocumentType,
        remote: &str,
    ) -> Result<Url, DocumentError> {
        let remote = parse_identity(remote)?;
        self.fetch_documents(session, doc_type, &Scope::Remote(remote))
            .await
    }

    /// Look up what `identity` publishes about itself.
    pub async fn fetch_profile<S: RemoteStore>(
        &self,
        session: &Session<S>,
        identity: &str,
    ) -> Result<Profile, DocumentError> {
        let web_id = parse_identity(identity)?;
        match session.store().resolve_identity_profile(&web_id).await {
            Ok(profile) => Ok(profile),
            Err(StoreError::NotFound(_)) => Err(DocumentError::TargetNotFound(web_id.to_string())),
            Err(e) => Err(e.into()),
        }
    }
}
