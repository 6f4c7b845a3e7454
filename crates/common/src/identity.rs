//! Identities and the per-call session context.
//!
//! A [`WebId`] names an actor. A [`Session`] pairs the acting WebID with the
//!  root of its store and the store client that carries its credentials.
//!  Every document operation takes a session explicitly.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::store::{RemoteStore, StoreError};

/// Path segments that separate a store base from its profile document.
const PROFILE_SEGMENTS: [&str; 2] = ["profile", "card"];
const PROFILE_FRAGMENT: &str = "me";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    #[error("empty identity")]
    Empty,
    #[error("invalid identity '{0}'")]
    Invalid(String),
    #[error("identity {0} does not follow the profile/card convention")]
    Unconventional(Url),
}

/// A resolvable identity reference, e.g. `https://alice.example/profile/card#me`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WebId(Url);

impl WebId {
    /// Wrap an absolute http(s) URL as a WebID without further checks.
    pub fn new(url: Url) -> Result<Self, IdentityError> {
        match url.scheme() {
            "http" | "https" if url.host().is_some() => Ok(Self(url)),
            _ => Err(IdentityError::Invalid(url.to_string())),
        }
    }

    /// Interpret user input as an identity.
    ///
    /// Accepts a full WebID, a store base URL (`https://bob.example/`) or a
    ///  bare username / host (`bob.example`). Bases and usernames are
    ///  expanded with the `profile/card#me` convention.
    pub fn parse_target(input: &str) -> Result<Self, IdentityError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(IdentityError::Empty);
        }

        if input.contains("://") {
            let url = Url::parse(input).map_err(|_| IdentityError::Invalid(input.to_string()))?;
            if url.fragment().is_some() {
                return Self::new(url);
            }
            if url.path().ends_with('/') {
                return Self::from_store_base(&url);
            }
            return Self::new(url);
        }

        if input.contains(['/', '#', '?', ' ', '@']) {
            return Err(IdentityError::Invalid(input.to_string()));
        }
        let base = Url::parse(&format!("https://{}/", input))
            .map_err(|_| IdentityError::Invalid(input.to_string()))?;
        Self::from_store_base(&base)
    }

    /// The conventional WebID of the owner of `base`.
    pub fn from_store_base(base: &Url) -> Result<Self, IdentityError> {
        let mut url = base.clone();
        url.set_query(None);
        url.set_fragment(None);
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        let mut url = url
            .join(&format!("{}/{}", PROFILE_SEGMENTS[0], PROFILE_SEGMENTS[1]))
            .map_err(|_| IdentityError::Invalid(base.to_string()))?;
        url.set_fragment(Some(PROFILE_FRAGMENT));
        Self::new(url)
    }

    /// Derive the store base by convention: everything in front of the
    ///  `profile/card` segments.
    pub fn store_base(&self) -> Result<Url, IdentityError> {
        let segments: Vec<&str> = self.0.path().split('/').collect();
        let position = segments
            .windows(2)
            .position(|pair| pair == PROFILE_SEGMENTS)
            .ok_or_else(|| IdentityError::Unconventional(self.0.clone()))?;

        let mut base = self.0.clone();
        base.set_fragment(None);
        base.set_query(None);
        let prefix = segments[..position].join("/");
        base.set_path(&format!("{}/", prefix));
        Ok(base)
    }

    /// The URL of the document holding this identity's profile.
    pub fn document(&self) -> Url {
        let mut url = self.0.clone();
        url.set_fragment(None);
        url
    }

    pub fn as_url(&self) -> &Url {
        &self.0
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for WebId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for WebId {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_target(s)
    }
}

/// What a store publishes about an identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub web_id: WebId,
    pub name: Option<String>,
    pub storage: Option<Url>,
}

impl Profile {
    pub fn new(web_id: WebId) -> Self {
        Self {
            web_id,
            name: None,
            storage: None,
        }
    }

    /// The declared storage, or the conventional one.
    pub fn store_base(&self) -> Result<Url, IdentityError> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => self.web_id.store_base(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("identity error: {0}")]
    Identity(#[from] IdentityError),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// The acting identity plus an authenticated handle on the remote store.
#[derive(Debug, Clone)]
pub struct Session<S> {
    web_id: WebId,
    pod: Url,
    store: S,
}

impl<S: RemoteStore> Session<S> {
    /// Build a session with an explicitly known store base.
    pub fn new(web_id: WebId, pod: Url, store: S) -> Self {
        Self { web_id, pod, store }
    }

    /// Build a session by reading the caller's profile for its storage,
    ///  falling back to the conventional base if none is declared.
    pub async fn connect(web_id: WebId, store: S) -> Result<Self, SessionError> {
        let pod = match store.resolve_identity_profile(&web_id).await {
            Ok(profile) => profile.store_base()?,
            Err(StoreError::NotFound(_)) => {
                tracing::debug!("no profile for {}, using conventional store base", web_id);
                web_id.store_base()?
            }
            Err(e) => return Err(e.into()),
        };
        tracing::debug!("session for {} rooted at {}", web_id, pod);
        Ok(Self { web_id, pod, store })
    }

    pub fn web_id(&self) -> &WebId {
        &self.web_id
    }

    pub fn pod(&self) -> &Url {
        &self.pod
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
