//! # Access control
//!
//! An [`AccessControl`] is the access-control resource attached to a
//!  container or resource. It holds at most one [`AccessGrant`] per
//!  grantee: setting a grant for an identity that already has one
//!  replaces it in place.
//!
//! On the wire an access-control resource is a dataset in the W3C ACL
//!  vocabulary. Authorizations for single agents are decoded into grants;
//!  any other statement (public or group access, origins, rules for other
//!  resources) survives a decode and re-encode unchanged.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::identity::WebId;
use crate::store::{Dataset, Term, Thing};
use crate::vocab::{self, acl};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccessMode {
    Read,
    Append,
    Write,
    Control,
}

impl AccessMode {
    const ALL: [AccessMode; 4] = [
        AccessMode::Read,
        AccessMode::Append,
        AccessMode::Write,
        AccessMode::Control,
    ];

    fn iri(&self) -> &'static str {
        match self {
            AccessMode::Read => acl::READ,
            AccessMode::Append => acl::APPEND,
            AccessMode::Write => acl::WRITE,
            AccessMode::Control => acl::CONTROL,
        }
    }

    fn term(&self) -> Url {
        let iri = match self {
            AccessMode::Read => &acl::READ_IRI,
            AccessMode::Append => &acl::APPEND_IRI,
            AccessMode::Write => &acl::WRITE_IRI,
            AccessMode::Control => &acl::CONTROL_IRI,
        };
        Url::clone(iri)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccessModes {
    pub read: bool,
    pub append: bool,
    pub write: bool,
    pub control: bool,
}

impl AccessModes {
    pub const NONE: AccessModes = AccessModes {
        read: false,
        append: false,
        write: false,
        control: false,
    };

    pub fn full() -> Self {
        Self {
            read: true,
            append: true,
            write: true,
            control: true,
        }
    }

    /// Read access only, or nothing at all.
    pub fn read_only(read: bool) -> Self {
        Self {
            read,
            ..Self::NONE
        }
    }

    pub fn allows(&self, mode: AccessMode) -> bool {
        match mode {
            AccessMode::Read => self.read,
            // write implies append
            AccessMode::Append => self.append || self.write,
            AccessMode::Write => self.write,
            AccessMode::Control => self.control,
        }
    }

    /// The flag itself, without implied modes.
    fn has(&self, mode: AccessMode) -> bool {
        match mode {
            AccessMode::Read => self.read,
            AccessMode::Append => self.append,
            AccessMode::Write => self.write,
            AccessMode::Control => self.control,
        }
    }

    fn set(&mut self, mode: AccessMode) {
        match mode {
            AccessMode::Read => self.read = true,
            AccessMode::Append => self.append = true,
            AccessMode::Write => self.write = true,
            AccessMode::Control => self.control = true,
        }
    }

    fn union(self, other: AccessModes) -> Self {
        Self {
            read: self.read || other.read,
            append: self.append || other.append,
            write: self.write || other.write,
            control: self.control || other.control,
        }
    }
}

impl std::fmt::Display for AccessModes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let flags = [
            (self.read, 'r'),
            (self.append, 'a'),
            (self.write, 'w'),
            (self.control, 'c'),
        ];
        for (set, flag) in flags {
            write!(f, "{}", if set { flag } else { '-' })?;
        }
        Ok(())
    }
}

/// One identity's permission entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccessGrant {
    pub grantee: WebId,
    /// Modes on the resource itself
    pub modes: AccessModes,
    /// Modes on everything inside the resource
    pub default_modes: AccessModes,
}

impl AccessGrant {
    /// A grant covering the resource and everything inside it.
    pub fn new(grantee: WebId, modes: AccessModes) -> Self {
        Self {
            grantee,
            modes,
            default_modes: modes,
        }
    }

    pub fn read(&self) -> bool {
        self.modes.read
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AclError {
    #[error("authorization {0} names an invalid agent")]
    InvalidAgent(Url),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessControl {
    resource: Url,
    grants: Vec<AccessGrant>,
    /// Statements about anything other than single agents (classes, groups,
    ///  origins, other resources); written back as they were read
    preserved: Vec<Thing>,
}

impl AccessControl {
    pub fn new(resource: Url) -> Self {
        Self {
            resource,
            grants: Vec::new(),
            preserved: Vec::new(),
        }
    }

    /// The initial access-control resource of a container: the owner, and
    ///  only the owner, may do anything, here and below.
    pub fn owner_only(resource: Url, owner: &WebId) -> Self {
        let mut access_control = Self::new(resource);
        access_control.set_grant(AccessGrant::new(owner.clone(), AccessModes::full()));
        access_control
    }

    pub fn grants(&self) -> &[AccessGrant] {
        &self.grants
    }

    pub fn grant_for(&self, grantee: &WebId) -> Option<&AccessGrant> {
        self.grants.iter().find(|grant| &grant.grantee == grantee)
    }

    /// Insert `grant`, replacing any existing entry for the same grantee.
    ///
    /// # Returns
    /// * `Some(AccessGrant)` - The entry that was replaced
    /// * `None` - The grantee had no entry yet
    pub fn set_grant(&mut self, grant: AccessGrant) -> Option<AccessGrant> {
        match self
            .grants
            .iter_mut()
            .find(|existing| existing.grantee == grant.grantee)
        {
            Some(existing) => Some(std::mem::replace(existing, grant)),
            None => {
                self.grants.push(grant);
                None
            }
        }
    }

    /// Whether `agent` may use `mode` on the resource itself.
    pub fn allows(&self, agent: &WebId, mode: AccessMode) -> bool {
        self.grant_for(agent)
            .map(|grant| grant.modes.allows(mode))
            .unwrap_or(false)
    }

    /// Whether `agent` may use `mode` on something inside the resource.
    pub fn allows_inherited(&self, agent: &WebId, mode: AccessMode) -> bool {
        self.grant_for(agent)
            .map(|grant| grant.default_modes.allows(mode))
            .unwrap_or(false)
    }

    /// Encode as an ACL dataset stored at `acl_url`.
    ///
    /// A grant whose inherited modes match its own becomes one authorization
    ///  with both `acl:accessTo` and `acl:default`; otherwise the two halves
    ///  are written separately.
    pub fn to_dataset(&self, acl_url: &Url) -> Dataset {
        let mut dataset = Dataset::new();
        for thing in &self.preserved {
            dataset.set_thing(thing.clone());
        }

        let mut next = 0;
        for grant in &self.grants {
            let subject = free_subject(&dataset, acl_url, &mut next);
            let mut thing = authorization(subject, &grant.grantee, grant.modes)
                .with_iri(acl::ACCESS_TO, self.resource.clone());
            if grant.default_modes == grant.modes {
                thing.add(acl::DEFAULT, Term::Iri(self.resource.clone()));
            }
            dataset.set_thing(thing);

            if grant.default_modes != grant.modes && grant.default_modes != AccessModes::NONE {
                let subject = free_subject(&dataset, acl_url, &mut next);
                let thing = authorization(subject, &grant.grantee, grant.default_modes)
                    .with_iri(acl::DEFAULT, self.resource.clone());
                dataset.set_thing(thing);
            }
        }
        dataset
    }

    /// Decode the authorizations in `dataset` that apply to `resource`.
    ///
    /// Several authorizations naming the same agent are merged into one grant.
    ///  Everything that is not about a single agent's access to `resource` is
    ///  kept verbatim for [`AccessControl::to_dataset`].
    pub fn from_dataset(resource: &Url, dataset: &Dataset) -> Result<Self, AclError> {
        let mut access_control = Self::new(resource.clone());

        for thing in dataset.things() {
            let is_authorization = thing.has_iri(vocab::RDF_TYPE, acl::AUTHORIZATION)
                || !thing.get(acl::AGENT).is_empty();
            let covers = thing.has_iri(acl::ACCESS_TO, resource.as_str());
            let inherits = thing.has_iri(acl::DEFAULT, resource.as_str());
            if !is_authorization || (!covers && !inherits) || thing.get(acl::AGENT).is_empty() {
                access_control.preserved.push(thing.clone());
                continue;
            }

            let mut modes = AccessModes::NONE;
            for mode in AccessMode::ALL {
                if thing.has_iri(acl::MODE, mode.iri()) {
                    modes.set(mode);
                }
            }

            for agent in thing.iris(acl::AGENT) {
                let grantee = WebId::new(agent.clone())
                    .map_err(|_| AclError::InvalidAgent(thing.subject().clone()))?;
                let mut grant = access_control
                    .grant_for(&grantee)
                    .cloned()
                    .unwrap_or_else(|| AccessGrant {
                        grantee,
                        modes: AccessModes::NONE,
                        default_modes: AccessModes::NONE,
                    });
                if covers {
                    grant.modes = grant.modes.union(modes);
                }
                if inherits {
                    grant.default_modes = grant.default_modes.union(modes);
                }
                access_control.set_grant(grant);
            }

            // classes, groups and origins named alongside the agents
            if acl::OTHER_GRANTEES
                .iter()
                .any(|predicate| !thing.get(predicate).is_empty())
            {
                let mut rest = thing.clone();
                rest.remove(acl::AGENT);
                access_control.preserved.push(rest);
            }
        }

        Ok(access_control)
    }
}

fn authorization(subject: Url, grantee: &WebId, modes: AccessModes) -> Thing {
    let mut thing = Thing::new(subject)
        .with_iri(vocab::RDF_TYPE, acl::AUTHORIZATION_IRI.clone())
        .with_iri(acl::AGENT, grantee.as_url().clone());
    for mode in AccessMode::ALL {
        if modes.has(mode) {
            thing.add(acl::MODE, Term::Iri(mode.term()));
        }
    }
    thing
}

/// The next `#grant-NNNN` subject not already taken in `dataset`.
fn free_subject(dataset: &Dataset, acl_url: &Url, next: &mut usize) -> Url {
    loop {
        let mut subject = acl_url.clone();
        subject.set_fragment(Some(&format!("grant-{:04}", next)));
        *next += 1;
        if dataset.thing(&subject).is_none() {
            return subject;
        }
    }
}
