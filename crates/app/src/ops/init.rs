use clap::Args;
use common::prelude::WebId;
use url::Url;

use crate::state::{AppConfig, AppState};

#[derive(Args, Debug, Clone)]
pub struct Init {
    /// WebID to act as, or a pod base / host that follows the
    /// profile/card#me convention
    #[arg(long)]
    pub web_id: WebId,

    /// Root of your pod (read from your profile if omitted)
    #[arg(long)]
    pub pod_url: Option<Url>,

    /// Bearer token for the pod (PODVAULT_ACCESS_TOKEN overrides it)
    #[arg(long)]
    pub access_token: Option<String>,

    /// Per-request timeout in seconds; 0 disables it
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("init failed: {0}")]
    StateFailed(#[from] crate::state::StateError),
}

#[async_trait::async_trait]
impl crate::op::Op for Init {
    type Error = InitError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let mut config = AppConfig::new(self.web_id.clone());
        config.pod_url = self.pod_url.clone();
        config.access_token = self.access_token.clone();
        config.request_timeout_secs = self.timeout_secs;

        let state = AppState::init(ctx.config_path.clone(), config)?;

        let pod = match &state.config.pod_url {
            Some(url) => url.to_string(),
            None => "from profile".to_string(),
        };

        let output = format!(
            "Initialized podvault directory at: {}\n\
             - Config: {}\n\
             - WebID: {}\n\
             - Pod: {}\n\
             - Access token: {}",
            state.podvault_dir.display(),
            state.config_path.display(),
            state.config.web_id,
            pod,
            if state.config.access_token.is_some() {
                "configured"
            } else {
                "none"
            }
        );

        Ok(output)
    }
}
