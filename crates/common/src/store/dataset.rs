use std::collections::BTreeMap;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::vocab;

/// A single object in a statement: either a plain string literal
///  or a reference to another resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Term {
    Literal(String),
    Iri(Url),
}

impl Term {
    pub fn as_literal(&self) -> Option<&str> {
        match self {
            Term::Literal(value) => Some(value),
            Term::Iri(_) => None,
        }
    }

    pub fn as_iri(&self) -> Option<&Url> {
        match self {
            Term::Iri(url) => Some(url),
            Term::Literal(_) => None,
        }
    }
}

/// A subject and everything the dataset says about it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thing {
    subject: Url,
    properties: BTreeMap<String, Vec<Term>>,
}

impl Thing {
    pub fn new(subject: Url) -> Self {
        Self {
            subject,
            properties: BTreeMap::new(),
        }
    }

    pub fn subject(&self) -> &Url {
        &self.subject
    }

    pub fn properties(&self) -> &BTreeMap<String, Vec<Term>> {
        &self.properties
    }

    /// Builder-style append of a value for `predicate`.
    pub fn with(mut self, predicate: &str, term: Term) -> Self {
        self.add(predicate, term);
        self
    }

    pub fn with_literal(self, predicate: &str, value: impl Into<String>) -> Self {
        self.with(predicate, Term::Literal(value.into()))
    }

    pub fn with_iri(self, predicate: &str, url: Url) -> Self {
        self.with(predicate, Term::Iri(url))
    }

    pub fn add(&mut self, predicate: &str, term: Term) {
        let values = self.properties.entry(predicate.to_string()).or_default();
        if !values.contains(&term) {
            values.push(term);
        }
    }

    /// Replace every value of `predicate` with a single literal.
    pub fn set_literal(&mut self, predicate: &str, value: impl Into<String>) {
        self.properties
            .insert(predicate.to_string(), vec![Term::Literal(value.into())]);
    }

    /// Drop every value of `predicate`, returning what was there.
    pub fn remove(&mut self, predicate: &str) -> Vec<Term> {
        self.properties.remove(predicate).unwrap_or_default()
    }

    pub fn get(&self, predicate: &str) -> &[Term] {
        self.properties
            .get(predicate)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn literal(&self, predicate: &str) -> Option<&str> {
        self.get(predicate).iter().find_map(Term::as_literal)
    }

    pub fn iris(&self, predicate: &str) -> impl Iterator<Item = &Url> {
        self.get(predicate).iter().filter_map(Term::as_iri)
    }

    pub fn has_iri(&self, predicate: &str, url: &str) -> bool {
        self.iris(predicate).any(|iri| iri.as_str() == url)
    }
}

/// A structured (RDF) resource: a set of things keyed by subject.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    things: BTreeMap<String, Thing>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `thing`, replacing any previous thing with the same subject.
    pub fn set_thing(&mut self, thing: Thing) {
        self.things.insert(thing.subject().to_string(), thing);
    }

    pub fn with_thing(mut self, thing: Thing) -> Self {
        self.set_thing(thing);
        self
    }

    pub fn thing(&self, subject: &Url) -> Option<&Thing> {
        self.things.get(subject.as_str())
    }

    pub fn things(&self) -> impl Iterator<Item = &Thing> {
        self.things.values()
    }

    pub fn is_empty(&self) -> bool {
        self.things.is_empty()
    }

    /// Resources listed as members of the container at `container`.
    pub fn contained_resources(&self, container: &Url) -> Vec<Url> {
        self.thing(container)
            .map(|thing| thing.iris(vocab::ldp::CONTAINS).cloned().collect())
            .unwrap_or_default()
    }

    /// Build the listing dataset for a container holding `members`.
    pub fn container_listing(container: &Url, members: impl IntoIterator<Item = Url>) -> Self {
        let mut thing = Thing::new(container.clone());
        for member in members {
            thing.add(vocab::ldp::CONTAINS, Term::Iri(member));
        }
        Self::new().with_thing(thing)
    }
}

/// An opaque (non-RDF) resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binary {
    pub content_type: String,
    pub bytes: Bytes,
}

impl Binary {
    pub fn new(content_type: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Whether `url` names a container (by the trailing slash convention).
pub fn is_container(url: &Url) -> bool {
    url.path().ends_with('/')
}

/// The container directly holding `url`, if any.
pub fn parent_container(url: &Url) -> Option<Url> {
    let path = url.path().trim_end_matches('/');
    if path.is_empty() {
        return None;
    }
    let cut = path.rfind('/')?;
    let mut parent = url.clone();
    parent.set_path(&path[..=cut]);
    parent.set_query(None);
    parent.set_fragment(None);
    Some(parent)
}
