use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::OffsetDateTime;
use uuid::Uuid;

/// Keys owned by the server. Clients can never set them.
pub const SYSTEM_FIELDS: [&str; 3] = ["id", "createdAt", "updatedAt"];

/// A system timestamp as found in the collection file. Records written by
/// other tools may carry anything here; those values are kept verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Timestamp {
    At(#[serde(with = "time::serde::rfc3339")] OffsetDateTime),
    Raw(Value),
}

impl From<OffsetDateTime> for Timestamp {
    fn from(at: OffsetDateTime) -> Self {
        Timestamp::At(at)
    }
}

/// A stored book: server-assigned identity and timestamps plus whatever
/// fields the client supplied (title, author, category, ...).
///
/// Only `id` is required when reading the collection back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    /// Unique identifier, assigned at creation and never changed
    pub id: String,
    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
    #[serde(rename = "updatedAt", default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
    /// Client-supplied content
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Book {
    /// Build a new record with a fresh id.
    pub fn new(fields: Map<String, Value>, now: OffsetDateTime) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            created_at: Some(now.into()),
            updated_at: None,
            fields: without_system_fields(fields),
        }
    }

    /// Shallow-merge `patch` over the current fields and stamp `updatedAt`.
    pub fn apply(&mut self, patch: Map<String, Value>, now: OffsetDateTime) {
        self.fields.extend(without_system_fields(patch));
        self.updated_at = Some(now.into());
    }

    /// Exact, case-sensitive match on the `category` field.
    pub fn in_category(&self, category: &str) -> bool {
        self.fields.get("category").and_then(Value::as_str) == Some(category)
    }
}

/// Drop any server-owned keys from a client payload.
pub fn without_system_fields(mut fields: Map<String, Value>) -> Map<String, Value> {
    for key in SYSTEM_FIELDS {
        fields.remove(key);
    }
    fields
}

/// Response body for a successful create.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedBook {
    pub id: String,
}

/// Query string accepted by the list endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListBooksQuery {
    pub category: Option<String>,
}

impl ListBooksQuery {
    /// The first `category` pair wins; an empty value means no filter.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let category = pairs
            .into_iter()
            .find(|(key, _)| key == "category")
            .map(|(_, value)| value)
            .filter(|value| !value.is_empty());
        Self { category }
    }
}
