use std::error::Error;
use std::path::PathBuf;

use common::prelude::{DocumentManager, Session, SessionError, SolidClient, StoreError};

use crate::state::{AppState, StateError, ACCESS_TOKEN_ENV};

#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    #[error(transparent)]
    State(#[from] StateError),
    #[error("failed to build store client: {0}")]
    Client(#[from] StoreError),
    #[error("failed to open session: {0}")]
    Session(#[from] SessionError),
}

#[derive(Clone)]
pub struct OpContext {
    /// Optional custom config path (defaults to ~/.podvault)
    pub config_path: Option<PathBuf>,
    /// Shared by every op so per-document locking spans the whole run
    pub manager: DocumentManager,
}

impl OpContext {
    pub fn new(config_path: Option<PathBuf>) -> Self {
        Self {
            config_path,
            manager: DocumentManager::new(),
        }
    }

    /// Open a session as the configured identity.
    pub async fn session(&self) -> Result<Session<SolidClient>, ContextError> {
        let state = AppState::load(self.config_path.clone())?;
        let config = state.config;
        let client = SolidClient::new(&config.client_config(std::env::var(ACCESS_TOKEN_ENV).ok()))?;

        let session = match config.pod_url {
            Some(pod) => Session::new(config.web_id, pod, client),
            None => Session::connect(config.web_id, client).await?,
        };
        tracing::debug!("acting as {} on {}", session.web_id(), session.pod());
        Ok(session)
    }
}

#[async_trait::async_trait]
pub trait Op: Send + Sync {
    type Error: Error + Send + Sync + 'static;
    type Output;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error>;
}

#[macro_export]
macro_rules! command_enum {
    ($(($variant:ident, $type:ty)),* $(,)?) => {
        #[derive(Subcommand, Debug, Clone)]
        pub enum Command {
            $($variant($type),)*
        }

        #[derive(Debug)]
        pub enum OpOutput {
            $($variant(<$type as $crate::op::Op>::Output),)*
        }

        #[derive(Debug, thiserror::Error)]
        pub enum OpError {
            $(
                #[error(transparent)]
                $variant(<$type as $crate::op::Op>::Error),
            )*
        }

        #[async_trait::async_trait]
        impl $crate::op::Op for Command {
            type Output = OpOutput;
            type Error = OpError;

            async fn execute(&self, ctx: &$crate::op::OpContext) -> Result<Self::Output, Self::Error> {
                match self {
                    $(
                        Command::$variant(op) => {
                            op.execute(ctx).await
                                .map(OpOutput::$variant)
                                .map_err(OpError::$variant)
                        },
                    )*
                }
            }
        }

        impl std::fmt::Display for OpOutput {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(
                        OpOutput::$variant(output) => write!(f, "{}", output),
                    )*
                }
            }
        }
    };
}
