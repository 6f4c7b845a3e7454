//! Descriptors: the structured metadata stored next to each uploaded file.
//!
//! A descriptor is a single thing whose subject is the url of the binary it
//!  describes, carrying schema.org `name`, `identifier` (the document type),
//!  `endDate` and `description`. Inside a container descriptors are told
//!  apart from binaries by name: they end in [`DESCRIPTOR_EXTENSION`].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::location::DocumentType;
use crate::store::{Dataset, Thing};
use crate::vocab::schema;

pub const DESCRIPTOR_EXTENSION: &str = ".ttl";

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DescriptorError {
    #[error("resource is not a descriptor")]
    NotADescriptor,
    #[error("descriptor field {0} is malformed: {1}")]
    Malformed(&'static str, String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Descriptor {
    /// Url of the binary this descriptor describes
    pub subject: Url,
    /// The uploaded file's name
    pub name: String,
    /// The document type
    pub identifier: DocumentType,
    pub end_date: NaiveDate,
    pub description: String,
}

impl Descriptor {
    pub fn to_thing(&self) -> Thing {
        Thing::new(self.subject.clone())
            .with_literal(schema::NAME, self.name.clone())
            .with_literal(schema::IDENTIFIER, self.identifier.as_str())
            .with_literal(schema::END_DATE, self.end_date.format(DATE_FORMAT).to_string())
            .with_literal(schema::DESCRIPTION, self.description.clone())
    }

    pub fn to_dataset(&self) -> Dataset {
        Dataset::new().with_thing(self.to_thing())
    }

    /// Point the descriptor at new file content.
    pub fn revise(&mut self, name: &str, end_date: NaiveDate, description: &str) {
        self.name = name.to_string();
        self.end_date = end_date;
        self.description = description.to_string();
    }
}

pub fn build_descriptor(
    stored_binary: &Url,
    doc_type: &DocumentType,
    name: &str,
    end_date: NaiveDate,
    description: &str,
) -> Descriptor {
    Descriptor {
        subject: stored_binary.clone(),
        name: name.to_string(),
        identifier: doc_type.clone(),
        end_date,
        description: description.to_string(),
    }
}

/// Find and decode the descriptor in `dataset`.
///
/// The first thing carrying an `identifier` is taken as the descriptor;
///  datasets without one are not descriptors.
pub fn parse_descriptor(dataset: &Dataset) -> Result<Descriptor, DescriptorError> {
    let thing = dataset
        .things()
        .find(|thing| thing.literal(schema::IDENTIFIER).is_some())
        .ok_or(DescriptorError::NotADescriptor)?;

    let identifier = thing
        .literal(schema::IDENTIFIER)
        .ok_or(DescriptorError::NotADescriptor)?;
    let identifier = DocumentType::new(identifier)
        .map_err(|_| DescriptorError::Malformed("identifier", identifier.to_string()))?;

    let end_date = thing
        .literal(schema::END_DATE)
        .ok_or(DescriptorError::Malformed("endDate", String::new()))?;
    let end_date = NaiveDate::parse_from_str(end_date, DATE_FORMAT)
        .map_err(|_| DescriptorError::Malformed("endDate", end_date.to_string()))?;

    Ok(Descriptor {
        subject: thing.subject().clone(),
        name: thing.literal(schema::NAME).unwrap_or_default().to_string(),
        identifier,
        end_date,
        description: thing
            .literal(schema::DESCRIPTION)
            .unwrap_or_default()
            .to_string(),
    })
}

/// Whether the resource at `url` is a descriptor rather than a binary.
pub fn is_descriptor(url: &Url) -> bool {
    url.path().ends_with(DESCRIPTOR_EXTENSION)
}

/// The name under which the descriptor for `doc_type` is stored.
pub fn descriptor_slug(doc_type: &DocumentType) -> String {
    format!("{}{}", doc_type, DESCRIPTOR_EXTENSION)
}
