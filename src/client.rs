//! HTTP client for Confluent-style schema registries.
//!
//! Provides schema retrieval and registration over the registry REST API,
//! with a read-through cache layer in front of it. Two caches are kept:
//! one keyed by numeric schema ID and one keyed by concrete subject plus
//! version. They sit behind independent locks so ID lookups and subject
//! lookups never block each other.
//!
//! `"latest"` is never cached. A latest lookup bypasses both the cache read
//! and the cache write, even when caching is enabled; caching a moving
//! target under a stable key would serve stale schemas forever.

use crate::error::{ClientError, Result, NOT_FOUND_STATUS};
use crate::types::{Reference, RegisteredSchema, Schema, SchemaType};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;

const CONTENT_TYPE: &str = "application/vnd.schemaregistry.v1+json";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Basic auth credentials for registries with authentication enabled.
#[derive(Debug, Clone)]
struct Credentials {
    username: String,
    password: String,
}

/// Schema submission body for check, create, and compatibility requests.
#[derive(Debug, Serialize)]
struct SchemaRequest {
    schema: String,

    #[serde(rename = "schemaType")]
    schema_type: String,

    references: Vec<Reference>,
}

/// Response of `POST /subjects/{subject}/versions`. The registered version
/// is not reliably included, only the content-addressed ID.
#[derive(Debug, Deserialize)]
struct RegisterResponse {
    id: i32,
}

/// Response of the compatibility endpoint; the decision is the registry's.
#[derive(Debug, Deserialize)]
struct CompatibilityResponse {
    is_compatible: bool,
}

/// Error body the registry attaches to non-2xx responses.
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[allow(dead_code)]
    error_code: i32,
    message: String,
}

/// Builder for [`SchemaRegistryClient`].
pub struct SchemaRegistryClientBuilder {
    base_url: String,
    credentials: Option<Credentials>,
    timeout: Duration,
    caching_enabled: bool,
}

impl SchemaRegistryClientBuilder {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            credentials: None,
            timeout: DEFAULT_TIMEOUT,
            caching_enabled: true,
        }
    }

    /// Set basic auth credentials sent with every request.
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials = Some(Credentials {
            username: username.into(),
            password: password.into(),
        });
        self
    }

    /// Per-request timeout. Defaults to five seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Enable or disable the schema caches. Defaults to enabled.
    pub fn caching(mut self, enabled: bool) -> Self {
        self.caching_enabled = enabled;
        self
    }

    pub fn build(self) -> SchemaRegistryClient {
        SchemaRegistryClient {
            base_url: self.base_url,
            credentials: self.credentials,
            http: reqwest::Client::new(),
            timeout: self.timeout,
            caching_enabled: self.caching_enabled,
            id_cache: RwLock::new(HashMap::new()),
            subject_cache: RwLock::new(HashMap::new()),
        }
    }
}

/// Client for a Confluent-style schema registry.
///
/// Multiple tasks may share one client (e.g. behind `Arc`); the caches are
/// internally synchronized. There is no per-key locking: concurrent misses
/// on the same key may each issue a redundant network call, accepted because
/// lookups are cheap and idempotent. Failed calls surface immediately, with
/// no retries.
///
/// # Examples
///
/// ```ignore
/// use schema_registry_client::{SchemaRegistryClient, SchemaType};
///
/// let client = SchemaRegistryClient::new("http://localhost:8081");
/// let schema = client.get_latest_schema("orders", false).await?;
/// println!("orders-value v{:?}: {}", schema.version(), schema.schema());
/// ```
pub struct SchemaRegistryClient {
    base_url: String,
    credentials: Option<Credentials>,
    http: reqwest::Client,
    timeout: Duration,
    caching_enabled: bool,
    id_cache: RwLock<HashMap<i32, Schema>>,
    subject_cache: RwLock<HashMap<String, Schema>>,
}

impl SchemaRegistryClient {
    /// Create a client with default settings: five second timeout, caching
    /// enabled, no credentials.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::builder(base_url).build()
    }

    pub fn builder(base_url: impl Into<String>) -> SchemaRegistryClientBuilder {
        SchemaRegistryClientBuilder::new(base_url)
    }

    /// Get the schema associated with the given registry-global ID.
    ///
    /// The returned schema carries no version (the by-ID endpoint is not
    /// subject-scoped), so only the ID cache is populated.
    pub async fn get_schema(&self, id: i32) -> Result<Schema> {
        if self.caching_enabled {
            if let Some(schema) = self.id_cache.read().await.get(&id) {
                tracing::debug!(schema_id = id, "schema served from ID cache");
                return Ok(schema.clone());
            }
        }

        let resp: RegisteredSchema = self.http_get(&format!("/schemas/ids/{id}")).await?;
        let schema = Schema::new(id, resp.schema, None);

        if self.caching_enabled {
            self.id_cache.write().await.insert(id, schema.clone());
        }

        tracing::debug!(schema_id = id, "schema fetched by ID");
        Ok(schema)
    }

    /// Get the latest schema registered under the subject.
    ///
    /// Always goes to the registry: "latest" is a moving target, so this
    /// lookup neither reads from nor writes to the caches, regardless of
    /// the caching toggle.
    pub async fn get_latest_schema(&self, subject: &str, is_key: bool) -> Result<Schema> {
        self.get_version(subject, "latest", is_key, false).await
    }

    /// List the registered version numbers of a subject. Never cached.
    pub async fn get_schema_versions(&self, subject: &str, is_key: bool) -> Result<Vec<i32>> {
        let concrete_subject = concrete_subject(subject, is_key);
        self.http_get(&format!("/subjects/{concrete_subject}/versions"))
            .await
    }

    /// Get the schema registered under a specific version of a subject.
    pub async fn get_schema_by_version(
        &self,
        subject: &str,
        version: i32,
        is_key: bool,
    ) -> Result<Schema> {
        self.get_version(subject, &version.to_string(), is_key, self.caching_enabled)
            .await
    }

    /// List all subjects known to the registry. Never cached.
    pub async fn get_subjects(&self) -> Result<Vec<String>> {
        self.http_get("/subjects").await
    }

    /// Ask the registry whether this exact schema is already registered
    /// under the subject.
    ///
    /// Returns the existing registration record, or a registry error whose
    /// rendering contains [`NOT_FOUND_STATUS`] when the schema (or the
    /// subject itself) is absent. Never mutates the registry.
    pub async fn check_schema(
        &self,
        subject: &str,
        schema: &str,
        schema_type: SchemaType,
        is_key: bool,
        references: &[Reference],
    ) -> Result<RegisteredSchema> {
        let concrete_subject = concrete_subject(subject, is_key);
        let payload = build_request(schema, schema_type, references);
        self.http_post(&format!("/subjects/{concrete_subject}"), &payload)
            .await
    }

    /// Register a new schema version under the subject and return the
    /// resolved schema.
    ///
    /// The create response only reliably carries the content-addressed ID,
    /// so the registered version is learned through a follow-up latest
    /// lookup. Under concurrent writers that lookup can observe a racing
    /// writer's schema instead of this caller's; acceptable because schemas
    /// change rarely and registration is idempotent and content-addressed
    /// on the registry side. On success both caches are updated (under the
    /// concrete resolved version, never "latest").
    pub async fn create_schema(
        &self,
        subject: &str,
        schema: &str,
        schema_type: SchemaType,
        is_key: bool,
        references: &[Reference],
    ) -> Result<Schema> {
        let concrete_subject = concrete_subject(subject, is_key);
        let payload = build_request(schema, schema_type, references);
        let created: RegisterResponse = self
            .http_post(&format!("/subjects/{concrete_subject}/versions"), &payload)
            .await?;
        tracing::debug!(
            schema_id = created.id,
            subject = %concrete_subject,
            "schema registered"
        );

        let new_schema = self.get_latest_schema(subject, is_key).await?;
        let version = new_schema.version().ok_or_else(|| {
            ClientError::Internal("registration resolved a schema without a version".to_string())
        })?;

        if self.caching_enabled {
            let key = cache_key(&concrete_subject, &version.to_string());
            self.subject_cache
                .write()
                .await
                .insert(key, new_schema.clone());
            self.id_cache
                .write()
                .await
                .insert(new_schema.id(), new_schema.clone());
        }

        Ok(new_schema)
    }

    /// Publish a schema under a topic's value subject and return the version
    /// it lives at.
    ///
    /// Checks for an existing registration first and only creates when the
    /// check answers with a 404. Check-then-create is NOT atomic: two
    /// exporters racing on a brand-new subject can both attempt the create,
    /// and convergence relies on the registry's content-addressed idempotent
    /// registration rather than any local locking.
    pub async fn export_schema(
        &self,
        schema_bytes: &[u8],
        topic: &str,
        schema_type: SchemaType,
    ) -> Result<i32> {
        let schema = String::from_utf8_lossy(schema_bytes);
        match self
            .check_schema(topic, &schema, schema_type, false, &[])
            .await
        {
            Ok(existing) => {
                tracing::debug!(
                    subject = topic,
                    version = existing.version,
                    "schema already registered"
                );
                Ok(existing.version)
            }
            // The registry signals "schema absent" through its status text;
            // anything else is a real failure.
            Err(err) if err.to_string().contains(NOT_FOUND_STATUS) => {
                let created = self
                    .create_schema(topic, &schema, schema_type, false, &[])
                    .await?;
                created.version().ok_or_else(|| {
                    ClientError::Internal(
                        "registration resolved a schema without a version".to_string(),
                    )
                })
            }
            Err(err) => Err(err),
        }
    }

    /// Ask the registry whether a schema is compatible with the given
    /// version of a subject (`"latest"` or a version number). The decision
    /// is made entirely by the registry; this client only relays it.
    pub async fn test_compatibility(
        &self,
        subject: &str,
        schema: &str,
        schema_type: SchemaType,
        version: &str,
        is_key: bool,
    ) -> Result<bool> {
        let concrete_subject = concrete_subject(subject, is_key);
        let payload = build_request(schema, schema_type, &[]);
        let resp: CompatibilityResponse = self
            .http_post(
                &format!("/compatibility/subjects/{concrete_subject}/versions/{version}"),
                &payload,
            )
            .await?;
        Ok(resp.is_compatible)
    }

    /// Set basic auth credentials used for subsequent requests.
    pub fn set_credentials(&mut self, username: impl Into<String>, password: impl Into<String>) {
        let username = username.into();
        let password = password.into();
        if !username.is_empty() && !password.is_empty() {
            self.credentials = Some(Credentials { username, password });
        }
    }

    /// Reconfigure the per-request timeout. Defaults to five seconds.
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    /// Enable or disable the schema caches. Already-cached entries are kept
    /// and become visible again when caching is re-enabled.
    pub fn set_caching(&mut self, enabled: bool) {
        self.caching_enabled = enabled;
    }

    /// Shared fetch path for version-scoped lookups.
    ///
    /// `use_cache` is passed explicitly rather than read from the client
    /// toggle so the latest lookup can bypass both the read and the write
    /// without touching shared state.
    async fn get_version(
        &self,
        subject: &str,
        version: &str,
        is_key: bool,
        use_cache: bool,
    ) -> Result<Schema> {
        let concrete_subject = concrete_subject(subject, is_key);
        let key = cache_key(&concrete_subject, version);

        if use_cache {
            if let Some(schema) = self.subject_cache.read().await.get(&key) {
                tracing::debug!(cache_key = %key, "schema served from subject cache");
                return Ok(schema.clone());
            }
        }

        let resp: RegisteredSchema = self
            .http_get(&format!("/subjects/{concrete_subject}/versions/{version}"))
            .await?;
        let schema = Schema::new(resp.id, resp.schema, Some(resp.version));

        if use_cache {
            self.subject_cache
                .write()
                .await
                .insert(key, schema.clone());
            self.id_cache
                .write()
                .await
                .insert(schema.id(), schema.clone());
        }

        tracing::debug!(
            subject = %concrete_subject,
            version = version,
            schema_id = schema.id(),
            "schema fetched by subject version"
        );
        Ok(schema)
    }

    async fn http_get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let request = self.http.get(&url);
        self.dispatch(request).await
    }

    async fn http_post<T: DeserializeOwned>(&self, path: &str, body: &SchemaRequest) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        // Serialized by hand so the vendor content type set in dispatch stays
        // the only content-type header on the request.
        let request = self.http.post(&url).body(serde_json::to_string(body)?);
        self.dispatch(request).await
    }

    async fn dispatch<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T> {
        let mut request = request
            .header(reqwest::header::CONTENT_TYPE, CONTENT_TYPE)
            .timeout(self.timeout);

        if let Some(credentials) = &self.credentials {
            request = request.basic_auth(&credentials.username, Some(&credentials.password));
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let status_line = format!(
                "{} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            );
            let body = response.text().await.unwrap_or_default();
            let message =
                serde_json::from_str::<ErrorResponse>(&body)
                    .ok()
                    .map(|e| e.message);
            return Err(ClientError::Registry {
                status: status_line,
                message,
            });
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// Derive the registry subject for a topic's key or value schema, per the
/// registry's own subject-naming convention.
fn concrete_subject(subject: &str, is_key: bool) -> String {
    if is_key {
        format!("{subject}-key")
    } else {
        format!("{subject}-value")
    }
}

fn cache_key(concrete_subject: &str, version: &str) -> String {
    format!("{concrete_subject}-{version}")
}

/// Build the submission body for check, create, and compatibility requests.
///
/// Non-Protobuf schema text travels as a JSON string field and some registry
/// variants mishandle embedded newlines there, so `\r\n` and `\n` are
/// normalized to spaces. Protobuf grammar is newline-significant and passes
/// through untouched.
fn build_request(schema: &str, schema_type: SchemaType, references: &[Reference]) -> SchemaRequest {
    let schema = if schema_type == SchemaType::Protobuf {
        schema.to_string()
    } else {
        schema.replace("\r\n", " ").replace('\n', " ")
    };

    SchemaRequest {
        schema,
        schema_type: schema_type.as_str().to_string(),
        references: references.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concrete_subject_suffixes() {
        assert_eq!(concrete_subject("orders", false), "orders-value");
        assert_eq!(concrete_subject("orders", true), "orders-key");
    }

    #[test]
    fn cache_key_joins_subject_and_version() {
        assert_eq!(cache_key("orders-value", "3"), "orders-value-3");
        assert_eq!(cache_key("orders-key", "latest"), "orders-key-latest");
    }

    #[test]
    fn avro_newlines_normalized() {
        let request = build_request("a\nb", SchemaType::Avro, &[]);
        assert_eq!(request.schema, "a b");

        let request = build_request("a\r\nb\nc", SchemaType::Json, &[]);
        assert_eq!(request.schema, "a b c");
    }

    #[test]
    fn protobuf_newlines_untouched() {
        let request = build_request("a\nb", SchemaType::Protobuf, &[]);
        assert_eq!(request.schema, "a\nb");
    }

    #[test]
    fn request_serializes_empty_references_as_array() {
        let request = build_request("\"string\"", SchemaType::Avro, &[]);
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["schemaType"], "AVRO");
        assert_eq!(json["references"], serde_json::json!([]));
    }
}
