use clap::Args;
use common::prelude::DocumentType;

use super::DocError;

#[derive(Args, Debug, Clone)]
pub struct Delete {
    /// Document type, e.g. passport
    #[arg(long = "type")]
    pub doc_type: DocumentType,

    /// Remove the files but leave the empty container in place
    #[arg(long)]
    pub keep_container: bool,
}

#[async_trait::async_trait]
impl crate::op::Op for Delete {
    type Error = DocError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let session = ctx.session().await?;
        let container = ctx
            .manager
            .delete_document_file(&session, &self.doc_type)
            .await?;
        if self.keep_container {
            return Ok(format!("Emptied {}", container));
        }

        ctx.manager
            .delete_document_container(&session, &container)
            .await?;
        Ok(format!("Removed {}", container))
    }
}
