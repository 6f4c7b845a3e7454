use clap::Args;
use common::prelude::DocumentError;

use crate::op::ContextError;

#[derive(Args, Debug, Clone)]
pub struct Profile {
    /// Identity to look up (defaults to your own)
    pub identity: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error(transparent)]
    Context(#[from] ContextError),
    #[error(transparent)]
    Document(#[from] DocumentError),
}

#[async_trait::async_trait]
impl crate::op::Op for Profile {
    type Error = ProfileError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let session = ctx.session().await?;
        let identity = match &self.identity {
            Some(identity) => identity.clone(),
            None => session.web_id().to_string(),
        };

        let profile = ctx.manager.fetch_profile(&session, &identity).await?;
        let storage = match (&profile.storage, profile.web_id.store_base()) {
            (Some(storage), _) => storage.to_string(),
            (None, Ok(base)) => format!("{} (by convention)", base),
            (None, Err(_)) => "unknown".to_string(),
        };

        Ok(format!(
            "WebID: {}\nName: {}\nStorage: {}",
            profile.web_id,
            profile.name.as_deref().unwrap_or("-"),
            storage
        ))
    }
}
