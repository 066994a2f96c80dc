//! FHIR JSON rendering.
//!
//! Resources are built as `serde_json` values. Optional elements and empty
//! arrays are omitted, as FHIR JSON does not allow empty values.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value, json};

use spia_model::{
    CodeListArtifact, CodeSystemArtifact, Concept, Designation, MappingArtifact, MappingElement,
};
use spia_transform::publication::{
    COPYRIGHT, EMAIL, JURISDICTION_CODE, JURISDICTION_DISPLAY, JURISDICTION_SYSTEM, OID_SYSTEM,
    PUBLISHER, VERSION,
};
use spia_transform::{ArtifactContent, BuiltArtifact, Publication, TargetSchema};

/// Options for FHIR output.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub schema: TargetSchema,
    /// Publication date stamped on every resource.
    pub date: DateTime<Utc>,
}

impl RenderOptions {
    pub fn new(schema: TargetSchema) -> Self {
        Self {
            schema,
            date: Utc::now(),
        }
    }

    #[must_use]
    pub fn with_date(mut self, date: DateTime<Utc>) -> Self {
        self.date = date;
        self
    }
}

/// Renders one artifact as a FHIR resource.
pub fn render_resource(artifact: &BuiltArtifact, options: &RenderOptions) -> Value {
    let publication = &artifact.publication;
    let mut resource = common_elements(publication, options);
    match &artifact.content {
        ArtifactContent::CodeList(list) => {
            resource.insert("compose".to_string(), compose(list));
        }
        ArtifactContent::Mapping {
            source,
            target,
            mapping,
        } => {
            resource.insert("sourceUri".to_string(), json!(source));
            resource.insert("targetUri".to_string(), json!(target));
            resource.insert("group".to_string(), groups(mapping, options.schema));
        }
        ArtifactContent::CodeSystem {
            value_set,
            code_system,
        } => {
            insert_code_system(&mut resource, value_set, code_system);
        }
    }
    Value::Object(resource)
}

/// Elements shared by every resource: metadata, narrative and publisher.
fn common_elements(publication: &Publication, options: &RenderOptions) -> Map<String, Value> {
    let kind = publication.kind;
    let mut resource = Map::new();
    resource.insert("resourceType".to_string(), json!(kind.resource_type()));
    resource.insert("id".to_string(), json!(publication.id()));
    resource.insert(
        "meta".to_string(),
        json!({ "profile": options.schema.profiles(kind) }),
    );
    resource.insert(
        "text".to_string(),
        json!({
            "status": "generated",
            "div": narrative(&publication.title, &publication.description),
        }),
    );
    resource.insert("url".to_string(), json!(publication.url()));
    if let Some(oid) = &publication.oid {
        let identifier = json!({ "system": OID_SYSTEM, "value": format!("urn:oid:{oid}") });
        let identifier = if options.schema.identifier_is_list(kind) {
            json!([identifier])
        } else {
            identifier
        };
        resource.insert("identifier".to_string(), identifier);
    }
    resource.insert("version".to_string(), json!(VERSION));
    resource.insert("name".to_string(), json!(publication.name));
    resource.insert("title".to_string(), json!(publication.title));
    resource.insert("status".to_string(), json!("draft"));
    resource.insert("experimental".to_string(), json!(true));
    resource.insert(
        "date".to_string(),
        json!(options.date.to_rfc3339_opts(SecondsFormat::Secs, true)),
    );
    resource.insert("publisher".to_string(), json!(PUBLISHER));
    resource.insert(
        "contact".to_string(),
        json!([{ "telecom": [{ "system": "email", "value": EMAIL }] }]),
    );
    resource.insert("description".to_string(), json!(publication.description));
    resource.insert(
        "jurisdiction".to_string(),
        json!([{
            "coding": [{
                "system": JURISDICTION_SYSTEM,
                "code": JURISDICTION_CODE,
                "display": JURISDICTION_DISPLAY,
            }]
        }]),
    );
    if let Some(purpose) = &publication.purpose {
        resource.insert("purpose".to_string(), json!(purpose));
    }
    resource.insert("copyright".to_string(), json!(COPYRIGHT));
    resource
}

/// XHTML narrative with the title as heading and the description below.
pub fn narrative(title: &str, description: &str) -> String {
    format!(
        "<div xmlns=\"http://www.w3.org/1999/xhtml\"><h1>{}</h1><p>{}</p></div>",
        escape_html(title),
        escape_html(description)
    )
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

fn compose(list: &CodeListArtifact) -> Value {
    let mut include = Map::new();
    include.insert("system".to_string(), json!(list.system.uri()));
    if !list.concepts.is_empty() {
        include.insert(
            "concept".to_string(),
            Value::Array(list.concepts.iter().map(concept).collect()),
        );
    }
    json!({ "include": [include] })
}

fn concept(concept: &Concept) -> Value {
    let mut value = Map::new();
    value.insert("code".to_string(), json!(concept.code));
    if let Some(display) = &concept.display {
        value.insert("display".to_string(), json!(display));
    }
    if !concept.designations.is_empty() {
        value.insert(
            "designation".to_string(),
            Value::Array(concept.designations.iter().map(designation).collect()),
        );
    }
    Value::Object(value)
}

fn designation(designation: &Designation) -> Value {
    json!({
        "use": {
            "system": designation.use_system(),
            "code": designation.use_code(),
            "display": designation.use_display(),
        },
        "value": designation.value,
    })
}

fn groups(mapping: &MappingArtifact, schema: TargetSchema) -> Value {
    mapping
        .groups
        .iter()
        .map(|group| {
            let mut value = Map::new();
            value.insert("source".to_string(), json!(group.source));
            value.insert("target".to_string(), json!(group.target));
            if !group.elements.is_empty() {
                value.insert(
                    "element".to_string(),
                    Value::Array(
                        group
                            .elements
                            .iter()
                            .map(|element| mapping_element(element, schema))
                            .collect(),
                    ),
                );
            }
            Value::Object(value)
        })
        .collect()
}

fn mapping_element(element: &MappingElement, schema: TargetSchema) -> Value {
    let mut value = Map::new();
    value.insert("code".to_string(), json!(element.code));
    if let Some(display) = &element.display {
        value.insert("display".to_string(), json!(display));
    }
    let targets = element
        .targets
        .iter()
        .map(|target| {
            let mut value = Map::new();
            value.insert("code".to_string(), json!(target.code));
            if let Some(display) = &target.display {
                value.insert("display".to_string(), json!(display));
            }
            value.insert(
                "equivalence".to_string(),
                json!(schema.equivalence_code(target.equivalence)),
            );
            Value::Object(value)
        })
        .collect();
    value.insert("target".to_string(), Value::Array(targets));
    Value::Object(value)
}

fn insert_code_system(
    resource: &mut Map<String, Value>,
    value_set: &str,
    code_system: &CodeSystemArtifact,
) {
    resource.insert("valueSet".to_string(), json!(value_set));
    resource.insert("caseSensitive".to_string(), json!(false));
    resource.insert("compositional".to_string(), json!(false));
    resource.insert("versionNeeded".to_string(), json!(false));
    resource.insert("content".to_string(), json!("complete"));
    resource.insert("count".to_string(), json!(code_system.concepts.len()));
    resource.insert(
        "concept".to_string(),
        Value::Array(
            code_system
                .concepts
                .iter()
                .map(|concept| {
                    json!({
                        "code": concept.code,
                        "display": concept.display,
                        "definition": concept.definition,
                    })
                })
                .collect(),
        ),
    );
}

/// Wraps rendered resources in a `collection` Bundle.
pub fn render_bundle(artifacts: &[BuiltArtifact], options: &RenderOptions) -> Value {
    let entries: Vec<Value> = artifacts
        .iter()
        .map(|artifact| {
            json!({
                "fullUrl": artifact.publication.url(),
                "resource": render_resource(artifact, options),
            })
        })
        .collect();
    json!({
        "resourceType": "Bundle",
        "meta": { "lastUpdated": options.date.to_rfc3339_opts(SecondsFormat::Secs, true) },
        "type": "collection",
        "entry": entries,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn narrative_escapes_markup() {
        assert_eq!(
            narrative("A & B", "<none>"),
            "<div xmlns=\"http://www.w3.org/1999/xhtml\"><h1>A &amp; B</h1><p>&lt;none&gt;</p></div>"
        );
    }
}
