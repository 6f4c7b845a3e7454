//! Expanded JSON-LD, the wire format for structured resources.

use serde_json::{json, Map, Value};
use url::Url;

use super::dataset::{Dataset, Term, Thing};
use crate::vocab;

pub const CONTENT_TYPE: &str = "application/ld+json";

pub fn encode(dataset: &Dataset) -> Value {
    let nodes: Vec<Value> = dataset
        .things()
        .map(|thing| {
            let mut node = Map::new();
            node.insert("@id".into(), json!(thing.subject().as_str()));
            for (predicate, terms) in thing.properties() {
                if predicate == vocab::RDF_TYPE {
                    let types: Vec<Value> = terms
                        .iter()
                        .filter_map(Term::as_iri)
                        .map(|iri| json!(iri.as_str()))
                        .collect();
                    node.insert("@type".into(), Value::Array(types));
                    continue;
                }
                let values: Vec<Value> = terms
                    .iter()
                    .map(|term| match term {
                        Term::Iri(iri) => json!({ "@id": iri.as_str() }),
                        Term::Literal(value) => json!({ "@value": value }),
                    })
                    .collect();
                node.insert(predicate.clone(), Value::Array(values));
            }
            Value::Object(node)
        })
        .collect();
    Value::Array(nodes)
}

/// Decode an expanded JSON-LD document fetched from `base`.
///
/// Blank nodes are dropped; relative ids are resolved against `base`.
pub fn decode(base: &Url, document: &Value) -> Result<Dataset, String> {
    let nodes = match document {
        Value::Array(nodes) => nodes.as_slice(),
        Value::Object(object) => match object.get("@graph") {
            Some(Value::Array(nodes)) => nodes.as_slice(),
            _ => std::slice::from_ref(document),
        },
        _ => return Err("expected a JSON-LD array or object".to_string()),
    };

    let mut dataset = Dataset::new();
    for node in nodes {
        let Value::Object(node) = node else {
            return Err("expected a JSON-LD node object".to_string());
        };
        let Some(subject) = node.get("@id").and_then(Value::as_str).and_then(|id| resolve(base, id))
        else {
            tracing::debug!("skipping JSON-LD node without a usable @id");
            continue;
        };

        // merge with anything already said about the subject
        let mut thing = dataset
            .thing(&subject)
            .cloned()
            .unwrap_or_else(|| Thing::new(subject));

        for (key, value) in node {
            match key.as_str() {
                "@id" => {}
                "@type" => {
                    for iri in as_array(value).iter().filter_map(Value::as_str) {
                        if let Some(iri) = resolve(base, iri) {
                            thing.add(vocab::RDF_TYPE, Term::Iri(iri));
                        }
                    }
                }
                key if key.starts_with('@') => {}
                predicate => {
                    for object in as_array(value) {
                        if let Some(term) = decode_term(base, object) {
                            thing.add(predicate, term);
                        }
                    }
                }
            }
        }
        dataset.set_thing(thing);
    }
    Ok(dataset)
}

fn decode_term(base: &Url, object: &Value) -> Option<Term> {
    match object {
        Value::Object(object) => {
            if let Some(id) = object.get("@id").and_then(Value::as_str) {
                return resolve(base, id).map(Term::Iri);
            }
            match object.get("@value")? {
                Value::String(value) => Some(Term::Literal(value.clone())),
                Value::Null => None,
                other => Some(Term::Literal(other.to_string())),
            }
        }
        Value::String(value) => Some(Term::Literal(value.clone())),
        _ => None,
    }
}

fn as_array(value: &Value) -> &[Value] {
    match value {
        Value::Array(values) => values.as_slice(),
        other => std::slice::from_ref(other),
    }
}

fn resolve(base: &Url, id: &str) -> Option<Url> {
    if id.starts_with("_:") {
        return None;
    }
    base.join(id).ok()
}
