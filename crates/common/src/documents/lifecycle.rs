use futures::future::join_all;
use url::Url;

use super::{DocumentError, DocumentManager, FileObject, Inconsistency, StoredDocument};
use crate::acl::AccessControl;
use crate::descriptor::{build_descriptor, descriptor_slug, is_descriptor, parse_descriptor};
use crate::identity::Session;
use crate::location::{container_document_type, resolve_container_url, DocumentType, Scope};
use crate::store::{is_container, Binary, Dataset, RemoteStore, StoreError};

/// What a container listing holds, before its descriptor is read.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Listing {
    Empty,
    Pair { binary: Url, descriptor: Url },
}

/// What the store holds for a (owner, document type) pair.
#[derive(Debug)]
enum ContainerState {
    Absent,
    /// The container exists but holds no files
    Empty,
    Populated(StoredDocument),
}

/// Sort a container's files into its binary and its descriptor.
///
/// Sub-containers are not part of a document and are ignored.
fn classify(container: &Url, listing: &Dataset) -> Result<Listing, Inconsistency> {
    let (descriptors, binaries): (Vec<Url>, Vec<Url>) = listing
        .contained_resources(container)
        .into_iter()
        .filter(|url| !is_container(url))
        .partition(|url| is_descriptor(url));

    match (binaries.as_slice(), descriptors.as_slice()) {
        ([], []) => Ok(Listing::Empty),
        ([binary], [descriptor]) => Ok(Listing::Pair {
            binary: binary.clone(),
            descriptor: descriptor.clone(),
        }),
        ([binary], []) => Err(Inconsistency::MissingDescriptor(binary.clone())),
        ([], [descriptor]) => Err(Inconsistency::MissingBinary(descriptor.clone())),
        (binaries, descriptors) => Err(Inconsistency::Ambiguous {
            binaries: binaries.len(),
            descriptors: descriptors.len(),
        }),
    }
}

fn inconsistent(container: &Url, inconsistency: Inconsistency) -> DocumentError {
    tracing::warn!("container {} is inconsistent: {}", container, inconsistency);
    DocumentError::InconsistentContainer(container.clone(), inconsistency)
}

/// Normalize a failed existence probe: anything but a transport failure
///  means there is nothing here for the caller.
fn probe_failure(container: &Url, error: StoreError) -> DocumentError {
    if error.is_transient() {
        return DocumentError::NetworkFailure(error);
    }
    tracing::debug!("probe of {} failed: {}", container, error);
    DocumentError::DocumentNotFound(container.clone())
}

async fn inspect<S: RemoteStore>(
    store: &S,
    container: &Url,
    doc_type: &DocumentType,
) -> Result<ContainerState, DocumentError> {
    let listing = match store.get_dataset(container).await {
        Ok(listing) => listing,
        Err(StoreError::NotFound(_)) => return Ok(ContainerState::Absent),
        Err(e) => return Err(e.into()),
    };

    let (binary, descriptor_url) = match classify(container, &listing) {
        Ok(Listing::Empty) => return Ok(ContainerState::Empty),
        Ok(Listing::Pair { binary, descriptor }) => (binary, descriptor),
        Err(inconsistency) => return Err(inconsistent(container, inconsistency)),
    };

    let dataset = store.get_dataset(&descriptor_url).await?;
    let descriptor = parse_descriptor(&dataset).map_err(|e| {
        inconsistent(
            container,
            Inconsistency::UnreadableDescriptor(descriptor_url.clone(), e),
        )
    })?;
    if descriptor.subject != binary {
        return Err(inconsistent(
            container,
            Inconsistency::Mismatch {
                descriptor: descriptor_url,
                described: descriptor.subject,
                binary,
            },
        ));
    }
    if &descriptor.identifier != doc_type {
        return Err(inconsistent(
            container,
            Inconsistency::ForeignDescriptor(descriptor_url, descriptor.identifier),
        ));
    }

    Ok(ContainerState::Populated(StoredDocument {
        container: container.clone(),
        binary,
        descriptor_url,
        descriptor,
    }))
}

impl DocumentManager {
    /// Store a new document in the caller's container for its type.
    ///
    /// Creates the container if needed, stores the binary and then its
    ///  descriptor, and finally restricts the container to its owner.
    ///
    /// # Errors
    /// * `AlreadyExists` - The container already holds a document, or
    ///   another writer created it first
    /// * `InconsistentContainer` - The container holds a partial document
    pub async fn upload_document<S: RemoteStore>(
        &self,
        session: &Session<S>,
        file: &FileObject,
    ) -> Result<StoredDocument, DocumentError> {
        file.validate()?;
        let _guard = self.lock(session.web_id(), &file.doc_type).await;
        let store = session.store();
        let container = resolve_container_url(session.pod(), &file.doc_type, &Scope::Own)?;

        match inspect(store, &container, &file.doc_type).await? {
            ContainerState::Populated(_) => {
                tracing::debug!("{} already holds a document", container);
                return Err(DocumentError::AlreadyExists(container));
            }
            ContainerState::Absent => {
                tracing::debug!("creating container {}", container);
                store.create_container(&container).await?;
            }
            ContainerState::Empty => {}
        }

        let name = file.name.trim();
        let binary = store
            .save_binary_in_container(&container, &file.content, name)
            .await?;
        tracing::debug!("stored {} bytes at {}", file.content.len(), binary);

        let descriptor = build_descriptor(
            &binary,
            &file.doc_type,
            name,
            file.end_date,
            &file.description,
        );
        let descriptor_url = match store
            .save_dataset_in_container(
                &container,
                &descriptor.to_dataset(),
                &descriptor_slug(&file.doc_type),
            )
            .await
        {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(
                    "stored {} but not its descriptor, {} is now inconsistent: {}",
                    binary,
                    container,
                    e
                );
                return Err(e.into());
            }
        };

        let resource = store.get_resource_with_access_control(&container).await?;
        let access_control = AccessControl::owner_only(container.clone(), session.web_id());
        store
            .save_access_control(&resource, &access_control)
            .await?;

        tracing::info!("uploaded {} to {}", file.doc_type, container);
        Ok(StoredDocument {
            container,
            binary,
            descriptor_url,
            descriptor,
        })
    }

    /// Replace the stored file for the document type and revise its
    ///  descriptor. The document type recorded in the descriptor never changes.
    pub async fn update_document<S: RemoteStore>(
        &self,
        session: &Session<S>,
        file: &FileObject,
    ) -> Result<StoredDocument, DocumentError> {
        file.validate()?;
        let _guard = self.lock(session.web_id(), &file.doc_type).await;
        let store = session.store();
        let container = resolve_container_url(session.pod(), &file.doc_type, &Scope::Own)?;

        let mut document = match inspect(store, &container, &file.doc_type).await? {
            ContainerState::Populated(document) => document,
            ContainerState::Absent | ContainerState::Empty => {
                return Err(DocumentError::DocumentNotFound(container))
            }
        };

        let binary = store
            .overwrite_binary(&document.binary, &file.content)
            .await?;
        document.binary = binary.clone();
        document.descriptor.subject = binary;
        document
            .descriptor
            .revise(file.name.trim(), file.end_date, &file.description);
        store
            .save_dataset(&document.descriptor_url, &document.descriptor.to_dataset())
            .await?;

        tracing::info!("updated {} in {}", file.doc_type, container);
        Ok(document)
    }

    /// Resolve the container for `doc_type` under `scope` and confirm it
    ///  can be read.
    pub async fn fetch_documents<S: RemoteStore>(
        &self,
        session: &Session<S>,
        doc_type: &DocumentType,
        scope: &Scope,
    ) -> Result<Url, DocumentError> {
        let container = resolve_container_url(session.pod(), doc_type, scope)?;
        match session.store().get_dataset(&container).await {
            Ok(_) => Ok(container),
            Err(e) => Err(probe_failure(&container, e)),
        }
    }

    /// [`fetch_documents`](Self::fetch_documents) in the caller's own store.
    pub async fn probe_documents<S: RemoteStore>(
        &self,
        session: &Session<S>,
        doc_type: &DocumentType,
    ) -> Result<Url, DocumentError> {
        self.fetch_documents(session, doc_type, &Scope::Own).await
    }

    /// Read a stored document: its location, its descriptor and its content.
    pub async fn read_document<S: RemoteStore>(
        &self,
        session: &Session<S>,
        doc_type: &DocumentType,
        scope: &Scope,
    ) -> Result<(StoredDocument, Binary), DocumentError> {
        let store = session.store();
        let container = resolve_container_url(session.pod(), doc_type, scope)?;
        let document = match inspect(store, &container, doc_type).await? {
            ContainerState::Populated(document) => document,
            ContainerState::Absent | ContainerState::Empty => {
                return Err(DocumentError::DocumentNotFound(container))
            }
        };
        let content = store.read_binary(&document.binary).await?;
        Ok((document, content))
    }

    /// Delete every file in the caller's container for `doc_type`.
    ///
    /// All deletions are issued together and every one is awaited before
    ///  returning, so on success the container holds no files.
    ///
    /// # Returns
    /// The container url, ready for [`delete_document_container`](Self::delete_document_container)
    pub async fn delete_document_file<S: RemoteStore>(
        &self,
        session: &Session<S>,
        doc_type: &DocumentType,
    ) -> Result<Url, DocumentError> {
        let _guard = self.lock(session.web_id(), doc_type).await;
        let container = resolve_container_url(session.pod(), doc_type, &Scope::Own)?;
        remove_files(session.store(), &container).await?;
        Ok(container)
    }

    /// Delete an emptied document container of the caller's store.
    pub async fn delete_document_container<S: RemoteStore>(
        &self,
        session: &Session<S>,
        container: &Url,
    ) -> Result<(), DocumentError> {
        let doc_type = container_document_type(session.pod(), container)
            .ok_or_else(|| DocumentError::PermissionDenied(container.clone()))?;
        let _guard = self.lock(session.web_id(), &doc_type).await;
        session.store().delete_container(container).await?;
        tracing::info!("removed container {}", container);
        Ok(())
    }

    /// Remove the document for `doc_type` entirely: its files, then its
    ///  container.
    pub async fn delete_document<S: RemoteStore>(
        &self,
        session: &Session<S>,
        doc_type: &DocumentType,
    ) -> Result<Url, DocumentError> {
        let _guard = self.lock(session.web_id(), doc_type).await;
        let store = session.store();
        let container = resolve_container_url(session.pod(), doc_type, &Scope::Own)?;
        remove_files(store, &container).await?;
        store.delete_container(&container).await?;
        tracing::info!("removed container {}", container);
        Ok(container)
    }
}

async fn remove_files<S: RemoteStore>(store: &S, container: &Url) -> Result<(), DocumentError> {
    let listing = store.get_dataset(container).await?;
    let files: Vec<Url> = listing
        .contained_resources(container)
        .into_iter()
        .filter(|url| !is_container(url))
        .collect();

    let results = join_all(files.iter().map(|file| async move {
        tracing::debug!("deleting {}", file);
        (file.clone(), store.delete_resource(file).await)
    }))
    .await;

    let failures: Vec<(Url, StoreError)> = results
        .into_iter()
        .filter_map(|(file, result)| result.err().map(|e| (file, e)))
        .collect();
    if !failures.is_empty() {
        tracing::warn!(
            "{} of {} deletions in {} failed",
            failures.len(),
            files.len(),
            container
        );
        return Err(DocumentError::DeletionFailed {
            container: container.clone(),
            failures,
        });
    }

    tracing::debug!("removed {} file(s) from {}", files.len(), container);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    fn container() -> Url {
        url("https://alice.example/passport/")
    }

    fn listing(members: &[&str]) -> Dataset {
        Dataset::container_listing(&container(), members.iter().map(|m| url(m)))
    }

    #[test]
    fn test_classify_empty_and_pair() {
        assert_eq!(classify(&container(), &listing(&[])), Ok(Listing::Empty));
        assert_eq!(
            classify(
                &container(),
                &listing(&[
                    "https://alice.example/passport/passport.pdf",
                    "https://alice.example/passport/passport.ttl",
                    "https://alice.example/passport/scans/",
                ])
            ),
            Ok(Listing::Pair {
                binary: url("https://alice.example/passport/passport.pdf"),
                descriptor: url("https://alice.example/passport/passport.ttl"),
            })
        );
    }

    #[test]
    fn test_classify_partial_containers() {
        assert_eq!(
            classify(
                &container(),
                &listing(&["https://alice.example/passport/passport.pdf"])
            ),
            Err(Inconsistency::MissingDescriptor(url(
                "https://alice.example/passport/passport.pdf"
            )))
        );
        assert_eq!(
            classify(
                &container(),
                &listing(&["https://alice.example/passport/passport.ttl"])
            ),
            Err(Inconsistency::MissingBinary(url(
                "https://alice.example/passport/passport.ttl"
            )))
        );
        assert_eq!(
            classify(
                &container(),
                &listing(&[
                    "https://alice.example/passport/a.pdf",
                    "https://alice.example/passport/b.pdf",
                    "https://alice.example/passport/passport.ttl",
                ])
            ),
            Err(Inconsistency::Ambiguous {
                binaries: 2,
                descriptors: 1
            })
        );
    }

    #[test]
    fn test_probe_failures_keep_transport_errors() {
        assert!(matches!(
            probe_failure(&container(), StoreError::Forbidden(container())),
            DocumentError::DocumentNotFound(_)
        ));
        assert!(matches!(
            probe_failure(&container(), StoreError::Timeout("slow".into())),
            DocumentError::NetworkFailure(StoreError::Timeout(_))
        ));
        assert!(matches!(
            probe_failure(&container(), StoreError::Transport("refused".into())),
            DocumentError::NetworkFailure(StoreError::Transport(_))
        ));
        assert!(matches!(
            probe_failure(&container(), StoreError::Status(container(), 500, String::new())),
            DocumentError::DocumentNotFound(_)
        ));
    }
}
