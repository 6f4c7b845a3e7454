//! IRIs of the linked-data vocabularies the store speaks.

use url::Url;

pub mod schema {
    pub const NAME: &str = "http://schema.org/name";
    pub const IDENTIFIER: &str = "http://schema.org/identifier";
    pub const END_DATE: &str = "http://schema.org/endDate";
    pub const DESCRIPTION: &str = "http://schema.org/description";
}

pub mod ldp {
    pub const CONTAINS: &str = "http://www.w3.org/ns/ldp#contains";
    pub const BASIC_CONTAINER: &str = "http://www.w3.org/ns/ldp#BasicContainer";
}

pub mod acl {
    use std::sync::LazyLock;

    use url::Url;

    pub const AUTHORIZATION: &str = "http://www.w3.org/ns/auth/acl#Authorization";
    pub const AGENT: &str = "http://www.w3.org/ns/auth/acl#agent";
    pub const AGENT_CLASS: &str = "http://www.w3.org/ns/auth/acl#agentClass";
    pub const AGENT_GROUP: &str = "http://www.w3.org/ns/auth/acl#agentGroup";
    pub const ORIGIN: &str = "http://www.w3.org/ns/auth/acl#origin";
    pub const ORIGIN_CLASS: &str = "http://www.w3.org/ns/auth/acl#originClass";
    pub const ACCESS_TO: &str = "http://www.w3.org/ns/auth/acl#accessTo";
    pub const DEFAULT: &str = "http://www.w3.org/ns/auth/acl#default";
    pub const MODE: &str = "http://www.w3.org/ns/auth/acl#mode";
    pub const READ: &str = "http://www.w3.org/ns/auth/acl#Read";
    pub const APPEND: &str = "http://www.w3.org/ns/auth/acl#Append";
    pub const WRITE: &str = "http://www.w3.org/ns/auth/acl#Write";
    pub const CONTROL: &str = "http://www.w3.org/ns/auth/acl#Control";

    /// Grantee predicates other than `acl:agent`.
    pub const OTHER_GRANTEES: [&str; 4] = [AGENT_CLASS, AGENT_GROUP, ORIGIN, ORIGIN_CLASS];

    pub static AUTHORIZATION_IRI: LazyLock<Url> = LazyLock::new(|| super::parse(AUTHORIZATION));
    pub static READ_IRI: LazyLock<Url> = LazyLock::new(|| super::parse(READ));
    pub static APPEND_IRI: LazyLock<Url> = LazyLock::new(|| super::parse(APPEND));
    pub static WRITE_IRI: LazyLock<Url> = LazyLock::new(|| super::parse(WRITE));
    pub static CONTROL_IRI: LazyLock<Url> = LazyLock::new(|| super::parse(CONTROL));
}

pub mod profile {
    pub const FOAF_NAME: &str = "http://xmlns.com/foaf/0.1/name";
    pub const VCARD_FN: &str = "http://www.w3.org/2006/vcard/ns#fn";
    pub const STORAGE: &str = "http://www.w3.org/ns/pim/space#storage";
}

pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";

// inputs are the constants of this module
fn parse(value: &'static str) -> Url {
    Url::parse(value).expect("vocabulary IRIs are valid urls")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_iris_parse() {
        assert_eq!(acl::AUTHORIZATION_IRI.as_str(), acl::AUTHORIZATION);
        for (iri, value) in [
            (&*acl::READ_IRI, acl::READ),
            (&*acl::APPEND_IRI, acl::APPEND),
            (&*acl::WRITE_IRI, acl::WRITE),
            (&*acl::CONTROL_IRI, acl::CONTROL),
        ] {
            assert_eq!(iri.as_str(), value);
        }
    }
}
