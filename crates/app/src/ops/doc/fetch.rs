use clap::Args;
use common::prelude::{DocumentType, Scope};

use super::DocError;

#[derive(Args, Debug, Clone)]
pub struct Fetch {
    /// Document type, e.g. passport
    #[arg(long = "type")]
    pub doc_type: DocumentType,

    /// Look in another identity's pod instead of your own
    #[arg(long)]
    pub from: Option<String>,
}

#[async_trait::async_trait]
impl crate::op::Op for Fetch {
    type Error = DocError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let session = ctx.session().await?;
        let container = match &self.from {
            Some(remote) => {
                ctx.manager
                    .locate_remote_document(&session, &self.doc_type, remote)
                    .await?
            }
            None => {
                ctx.manager
                    .fetch_documents(&session, &self.doc_type, &Scope::Own)
                    .await?
            }
        };
        Ok(container.to_string())
    }
}
