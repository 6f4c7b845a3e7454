use std::path::PathBuf;

use clap::Args;
use common::prelude::DocumentType;

use super::{scope_for, DocError};

#[derive(Args, Debug, Clone)]
pub struct Cat {
    /// Document type, e.g. passport
    #[arg(long = "type")]
    pub doc_type: DocumentType,

    /// Read from another identity's pod instead of your own
    #[arg(long)]
    pub from: Option<String>,

    /// Write the stored file here instead of printing it
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[async_trait::async_trait]
impl crate::op::Op for Cat {
    type Error = DocError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let scope = scope_for(self.from.as_deref())?;
        let session = ctx.session().await?;
        let (document, content) = ctx
            .manager
            .read_document(&session, &self.doc_type, &scope)
            .await?;

        let descriptor = &document.descriptor;
        let summary = format!(
            "{} ({})\n- Type: {}\n- Valid until: {}\n- Description: {}\n- Content: {}, {} bytes",
            descriptor.name,
            document.binary,
            descriptor.identifier,
            descriptor.end_date,
            descriptor.description,
            content.content_type,
            content.len()
        );

        if let Some(out) = &self.out {
            tokio::fs::write(out, &content.bytes)
                .await
                .map_err(|e| DocError::File(out.clone(), e))?;
            return Ok(format!("{}\nWrote {}", summary, out.display()));
        }

        match std::str::from_utf8(&content.bytes) {
            Ok(text) => Ok(format!("{}\n\n{}", summary, text)),
            Err(_) => Ok(format!("{}\n(binary content, use --out to save it)", summary)),
        }
    }
}
