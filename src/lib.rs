//! Schema Registry Client
//!
//! HTTP client for Confluent-style schema registries, used by streaming
//! producers and consumers to retrieve, register, and cache serialization
//! schemas.
//!
//! # Features
//!
//! - **Schema Formats**: Avro, Protobuf, JSON Schema
//! - **Read-through caching**: independent caches by schema ID and by
//!   subject+version; `"latest"` lookups always bypass them
//! - **Idempotent publication**: check-then-create protocol that converges
//!   through the registry's content-addressed registration
//! - **Basic auth**: optional credentials for secured registries
//!
//! # Usage
//!
//! ```ignore
//! use schema_registry_client::{SchemaRegistryClient, SchemaType};
//!
//! let client = SchemaRegistryClient::builder("http://localhost:8081")
//!     .credentials("svc-orders", "secret")
//!     .build();
//!
//! // Resolve a schema seen on the wire
//! let schema = client.get_schema(42).await?;
//!
//! // Publish a schema for a topic's value, creating it only if absent
//! let avro = r#"{"type": "record", "name": "Order", "fields": [{"name": "id", "type": "long"}]}"#;
//! let version = client.export_schema(avro.as_bytes(), "orders", SchemaType::Avro).await?;
//! ```

pub mod client;
pub mod error;
pub mod types;

pub use client::{SchemaRegistryClient, SchemaRegistryClientBuilder};
pub use error::{ClientError, Result, NOT_FOUND_STATUS};
pub use types::{Reference, RegisteredSchema, Schema, SchemaType};
