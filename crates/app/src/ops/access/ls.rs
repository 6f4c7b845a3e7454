use clap::Args;
use common::prelude::DocumentType;

use super::AccessError;

#[derive(Args, Debug, Clone)]
pub struct Ls {
    /// Document type whose container to inspect
    #[arg(long = "type")]
    pub doc_type: DocumentType,
}

#[async_trait::async_trait]
impl crate::op::Op for Ls {
    type Error = AccessError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let session = ctx.session().await?;
        let grants = ctx
            .manager
            .list_permissions(&session, &self.doc_type)
            .await?;

        if grants.is_empty() {
            return Ok(format!(
                "{} has no access control of its own",
                self.doc_type
            ));
        }

        let lines: Vec<String> = grants
            .iter()
            .map(|grant| format!("{}  {}", grant.modes, grant.grantee))
            .collect();
        Ok(lines.join("\n"))
    }
}
