//! Core schema registry types.

use serde::{Deserialize, Serialize};

/// Schema format (Avro, Protobuf, JSON Schema)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SchemaType {
    Avro,
    Protobuf,
    Json,
}

impl SchemaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaType::Avro => "AVRO",
            SchemaType::Protobuf => "PROTOBUF",
            SchemaType::Json => "JSON",
        }
    }
}

/// A schema retrieved from the registry.
///
/// Immutable once constructed; cached copies are never updated in place.
/// The version is only known when the schema was resolved through a
/// subject-scoped lookup; a fetch by ID alone returns `version() == None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    id: i32,
    schema: String,
    version: Option<i32>,
}

impl Schema {
    pub(crate) fn new(id: i32, schema: String, version: Option<i32>) -> Self {
        Self {
            id,
            schema,
            version,
        }
    }

    /// Registry-global schema ID.
    pub fn id(&self) -> i32 {
        self.id
    }

    /// Raw schema text.
    pub fn schema(&self) -> &str {
        &self.schema
    }

    /// Version under the subject this schema was resolved through, if known.
    pub fn version(&self) -> Option<i32> {
        self.version
    }
}

/// A named dependency edge to another registered subject+version.
///
/// References carry the import name of Protobuf and the `$ref` field of
/// JSON Schema, paired with the subject and version they resolve to in
/// the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub name: String,
    pub subject: String,
    pub version: i32,
}

/// A subject-scoped registration record returned by the registry.
///
/// This is also the wire shape of version lookups; the by-ID endpoint
/// only populates `schema`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegisteredSchema {
    #[serde(default)]
    pub subject: String,

    #[serde(default)]
    pub version: i32,

    #[serde(default)]
    pub id: i32,

    pub schema: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_type_as_str() {
        assert_eq!(SchemaType::Avro.as_str(), "AVRO");
        assert_eq!(SchemaType::Protobuf.as_str(), "PROTOBUF");
        assert_eq!(SchemaType::Json.as_str(), "JSON");
    }

    #[test]
    fn schema_type_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&SchemaType::Avro).unwrap(), "\"AVRO\"");
        assert_eq!(serde_json::to_string(&SchemaType::Json).unwrap(), "\"JSON\"");
    }

    #[test]
    fn reference_round_trips() {
        let reference = Reference {
            name: "common.proto".to_string(),
            subject: "common".to_string(),
            version: 3,
        };
        let json = serde_json::to_string(&reference).unwrap();
        assert_eq!(
            json,
            r#"{"name":"common.proto","subject":"common","version":3}"#
        );
    }

    #[test]
    fn registered_schema_tolerates_missing_fields() {
        // The by-ID endpoint returns only {schema}.
        let parsed: RegisteredSchema = serde_json::from_str(r#"{"schema": "\"string\""}"#).unwrap();
        assert_eq!(parsed.schema, "\"string\"");
        assert_eq!(parsed.id, 0);
        assert_eq!(parsed.version, 0);
        assert_eq!(parsed.subject, "");
    }
}
