use clap::Args;

use super::{DocError, FileArgs};

#[derive(Args, Debug, Clone)]
pub struct Update {
    #[command(flatten)]
    pub file: FileArgs,
}

#[async_trait::async_trait]
impl crate::op::Op for Update {
    type Error = DocError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let file = self.file.load().await?;
        let session = ctx.session().await?;
        let stored = ctx.manager.update_document(&session, &file).await?;

        Ok(format!(
            "Replaced {} with {} (valid until {})",
            stored.binary, file.name, stored.descriptor.end_date
        ))
    }
}
