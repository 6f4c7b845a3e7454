use clap::{Args, Subcommand};
use common::prelude::DocumentError;

pub mod ls;
pub mod set;

use crate::op::{ContextError, Op};

crate::command_enum! {
    (Set, set::Set),
    (Ls, ls::Ls),
}

pub type AccessCommand = Command;

#[derive(Args, Debug, Clone)]
pub struct Access {
    #[command(subcommand)]
    pub command: AccessCommand,
}

#[async_trait::async_trait]
impl Op for Access {
    type Error = OpError;
    type Output = OpOutput;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        self.command.execute(ctx).await
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AccessError {
    #[error(transparent)]
    Context(#[from] ContextError),
    #[error(transparent)]
    Document(#[from] DocumentError),
}
