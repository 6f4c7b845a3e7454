use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use clap::{Args, Subcommand};
use common::prelude::{Binary, DocumentError, DocumentType, FileObject, Scope, WebId};

pub mod cat;
pub mod delete;
pub mod fetch;
pub mod update;
pub mod upload;

use crate::op::{ContextError, Op};

crate::command_enum! {
    (Upload, upload::Upload),
    (Update, update::Update),
    (Fetch, fetch::Fetch),
    (Cat, cat::Cat),
    (Delete, delete::Delete),
}

pub type DocCommand = Command;

#[derive(Args, Debug, Clone)]
pub struct Doc {
    #[command(subcommand)]
    pub command: DocCommand,
}

#[async_trait::async_trait]
impl Op for Doc {
    type Error = OpError;
    type Output = OpOutput;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        self.command.execute(ctx).await
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DocError {
    #[error(transparent)]
    Context(#[from] ContextError),
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error("failed to access {}: {}", .0.display(), .1)]
    File(PathBuf, std::io::Error),
}

/// The document content and metadata shared by upload and update.
#[derive(Args, Debug, Clone)]
pub struct FileArgs {
    /// Document type, e.g. passport
    #[arg(long = "type")]
    pub doc_type: DocumentType,

    /// File to store
    #[arg(long)]
    pub file: PathBuf,

    /// End date of the document's validity (YYYY-MM-DD)
    #[arg(long)]
    pub date: NaiveDate,

    #[arg(long, default_value = "")]
    pub description: String,
}

impl FileArgs {
    /// Read the file from disk, guessing its content type from its name.
    pub async fn load(&self) -> Result<FileObject, DocError> {
        let name = file_name(&self.file)?;
        let bytes = tokio::fs::read(&self.file)
            .await
            .map_err(|e| DocError::File(self.file.clone(), e))?;
        let content_type = mime_guess::from_path(&self.file)
            .first_or_octet_stream()
            .to_string();
        tracing::debug!("read {} bytes of {} from {}", bytes.len(), content_type, self.file.display());

        Ok(FileObject {
            doc_type: self.doc_type.clone(),
            name,
            content: Binary::new(content_type, bytes),
            end_date: self.date,
            description: self.description.clone(),
        })
    }
}

fn file_name(path: &Path) -> Result<String, DocError> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .ok_or_else(|| {
            DocError::Document(DocumentError::InvalidFileName(path.display().to_string()))
        })
}

/// Scope for an optional `--from` identity.
fn scope_for(from: Option<&str>) -> Result<Scope, DocError> {
    match from {
        None => Ok(Scope::Own),
        Some(identity) => WebId::parse_target(identity)
            .map(Scope::Remote)
            .map_err(|_| DocError::Document(DocumentError::TargetNotFound(identity.to_string()))),
    }
}
