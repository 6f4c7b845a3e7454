use clap::Args;

use super::{DocError, FileArgs};

#[derive(Args, Debug, Clone)]
pub struct Upload {
    #[command(flatten)]
    pub file: FileArgs,
}

#[async_trait::async_trait]
impl crate::op::Op for Upload {
    type Error = DocError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let file = self.file.load().await?;
        let session = ctx.session().await?;
        let stored = ctx.manager.upload_document(&session, &file).await?;

        Ok(format!(
            "Uploaded {} as {}\n- Container: {}\n- Descriptor: {}",
            file.name, stored.descriptor.identifier, stored.container, stored.descriptor_url
        ))
    }
}
