/**
 * Access-control resources and the per-agent
 *  grants they hold.
 */
pub mod acl;
/**
 * Metadata stored beside each uploaded file.
 */
pub mod descriptor;
/**
 * Document containers: upload, update, probe
 *  and teardown, plus read-access grants on them.
 */
pub mod documents;
/**
 * WebIDs, profiles and the session every
 *  operation runs under.
 */
pub mod identity;
/**
 * Deterministic container locations for
 *  (owner, document type) pairs.
 */
pub mod location;
/**
 * The remote store contract, an HTTP client
 *  for Solid servers and an in-memory store.
 */
pub mod store;
pub mod vocab;

pub mod prelude {
    pub use crate::acl::{AccessControl, AccessGrant, AccessMode, AccessModes};
    pub use crate::descriptor::{Descriptor, DescriptorError};
    pub use crate::documents::{
        DocumentError, DocumentManager, FileObject, GrantKind, Inconsistency, StoredDocument,
    };
    pub use crate::identity::{IdentityError, Profile, Session, SessionError, WebId};
    pub use crate::location::{resolve_container_url, DocumentType, LocationError, Scope};
    pub use crate::store::{
        Binary, Dataset, MemoryStore, RemoteStore, SolidClient, SolidClientConfig, StoreError,
        StoreOperation,
    };
}
