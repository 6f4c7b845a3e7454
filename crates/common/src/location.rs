//! Where a document type lives in a store.
//!
//! Every (owner, document type) pair maps to exactly one container:
//!  `{store base}{document type}/`. Resolution is pure -- no store is
//!  consulted -- so the same inputs always produce the same url.

use std::fmt;
use std::str::FromStr;

use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::identity::{IdentityError, WebId};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocationError {
    #[error("invalid document type '{0}'")]
    InvalidDocumentType(String),
    #[error("store base {0} cannot hold containers")]
    InvalidStoreBase(Url),
    #[error("cannot locate store of {0}: {1}")]
    UnresolvableIdentity(WebId, IdentityError),
}

/// Tag naming a kind of document, e.g. `passport`. Also the name of the
///  container holding it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DocumentType(String);

impl DocumentType {
    pub fn new(value: impl Into<String>) -> Result<Self, LocationError> {
        let value = value.into();
        let trimmed = value.trim();
        let invalid = trimmed.is_empty()
            || trimmed == "."
            || trimmed == ".."
            || trimmed.contains(['/', '\\', '?', '#']);
        if invalid {
            return Err(LocationError::InvalidDocumentType(value));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DocumentType {
    type Err = LocationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for DocumentType {
    type Error = LocationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DocumentType> for String {
    fn from(value: DocumentType) -> Self {
        value.0
    }
}

/// Whose store an operation targets.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scope {
    /// The caller's own store
    Own,
    /// Another identity's store
    Remote(WebId),
}

/// Compute the container url for `doc_type` under `scope`.
///
/// `own_pod` is only consulted for [`Scope::Own`]; remote containers depend
///  solely on the remote identity's store base.
pub fn resolve_container_url(
    own_pod: &Url,
    doc_type: &DocumentType,
    scope: &Scope,
) -> Result<Url, LocationError> {
    match scope {
        Scope::Own => container_in(own_pod, doc_type),
        Scope::Remote(web_id) => {
            let base = web_id
                .store_base()
                .map_err(|e| LocationError::UnresolvableIdentity(web_id.clone(), e))?;
            container_in(&base, doc_type)
        }
    }
}

/// The document type whose own container is `container`, if it is one.
pub fn container_document_type(own_pod: &Url, container: &Url) -> Option<DocumentType> {
    let segment = container.path_segments()?.rev().nth(1)?;
    let segment = percent_decode_str(segment).decode_utf8().ok()?;
    let doc_type = DocumentType::new(segment).ok()?;
    let expected = container_in(own_pod, &doc_type).ok()?;
    (&expected == container).then_some(doc_type)
}

fn container_in(base: &Url, doc_type: &DocumentType) -> Result<Url, LocationError> {
    let mut url = base.clone();
    url.set_query(None);
    url.set_fragment(None);
    url.path_segments_mut()
        .map_err(|_| LocationError::InvalidStoreBase(base.clone()))?
        .pop_if_empty()
        .push(doc_type.as_str())
        .push("");
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(s: &str) -> DocumentType {
        DocumentType::new(s).unwrap()
    }

    #[test]
    fn test_own_container_url() {
        let pod = Url::parse("https://alice.example/").unwrap();
        let url = resolve_container_url(&pod, &doc("passport"), &Scope::Own).unwrap();
        assert_eq!(url.as_str(), "https://alice.example/passport/");

        // stable across calls
        let again = resolve_container_url(&pod, &doc("passport"), &Scope::Own).unwrap();
        assert_eq!(url, again);
    }

    #[test]
    fn test_nested_store_base() {
        let pod = Url::parse("https://host.example/alice").unwrap();
        let url = resolve_container_url(&pod, &doc("passport"), &Scope::Own).unwrap();
        assert_eq!(url.as_str(), "https://host.example/alice/passport/");
    }

    #[test]
    fn test_document_type_is_percent_encoded() {
        let pod = Url::parse("https://alice.example/").unwrap();
        let url = resolve_container_url(&pod, &doc("Bank Statement"), &Scope::Own).unwrap();
        assert_eq!(url.as_str(), "https://alice.example/Bank%20Statement/");
    }

    #[test]
    fn test_remote_ignores_own_pod() {
        let bob = WebId::parse_target("bob.example").unwrap();
        let scope = Scope::Remote(bob);
        let from_alice = resolve_container_url(
            &Url::parse("https://alice.example/").unwrap(),
            &doc("passport"),
            &scope,
        )
        .unwrap();
        let from_carol = resolve_container_url(
            &Url::parse("https://carol.example/").unwrap(),
            &doc("passport"),
            &scope,
        )
        .unwrap();
        assert_eq!(from_alice, from_carol);
        assert_eq!(from_alice.as_str(), "https://bob.example/passport/");
    }

    #[test]
    fn test_remote_without_convention_fails() {
        let odd = WebId::parse_target("https://id.example/people/bob#i").unwrap();
        let result = resolve_container_url(
            &Url::parse("https://alice.example/").unwrap(),
            &doc("passport"),
            &Scope::Remote(odd),
        );
        assert!(matches!(
            result,
            Err(LocationError::UnresolvableIdentity(_, _))
        ));
    }

    #[test]
    fn test_container_document_type() {
        let pod = Url::parse("https://alice.example/").unwrap();
        let statement = resolve_container_url(&pod, &doc("Bank Statement"), &Scope::Own).unwrap();
        assert_eq!(
            container_document_type(&pod, &statement),
            Some(doc("Bank Statement"))
        );

        for other in [
            "https://alice.example/",
            "https://alice.example/passport/nested/",
            "https://alice.example/passport/file.pdf",
            "https://bob.example/passport/",
        ] {
            let url = Url::parse(other).unwrap();
            assert_eq!(container_document_type(&pod, &url), None, "{}", other);
        }
    }

    #[test]
    fn test_invalid_document_types() {
        for bad in ["", "  ", ".", "..", "a/b", "a?b", "a#b"] {
            assert!(DocumentType::new(bad).is_err(), "accepted {:?}", bad);
        }
        assert_eq!(doc(" passport ").as_str(), "passport");
    }
}
