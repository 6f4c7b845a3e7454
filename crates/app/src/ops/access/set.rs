use clap::{ArgGroup, Args};
use common::prelude::{DocumentType, GrantKind};

use super::AccessError;

#[derive(Args, Debug, Clone)]
#[command(group(ArgGroup::new("kind").required(true).args(["give", "revoke"])))]
pub struct Set {
    /// Document type whose container is shared
    #[arg(long = "type")]
    pub doc_type: DocumentType,

    /// Identity to give or revoke read access: a WebID, pod base or host
    #[arg(long)]
    pub target: String,

    /// Let the target read the document
    #[arg(long)]
    pub give: bool,

    /// Take the target's read access away
    #[arg(long)]
    pub revoke: bool,
}

impl Set {
    fn kind(&self) -> GrantKind {
        if self.give {
            GrantKind::Give
        } else {
            GrantKind::Revoke
        }
    }
}

#[async_trait::async_trait]
impl crate::op::Op for Set {
    type Error = AccessError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let session = ctx.session().await?;
        let grant = ctx
            .manager
            .set_doc_acl_permission(&session, &self.doc_type, self.kind(), &self.target)
            .await?;

        let verb = if grant.read() { "can now" } else { "can no longer" };
        Ok(format!(
            "{} {} read your {}",
            grant.grantee, verb, self.doc_type
        ))
    }
}
