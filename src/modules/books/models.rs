use quire_db::ObjectId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;

/// Collection holding book documents.
pub const COLLECTION: &str = "books";

fn default_best_seller() -> bool {
    true
}

/// Catalogue item as stored and returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Store-assigned identifier
    pub id: ObjectId,
    pub title: String,
    pub publication: String,
    pub author: String,
    /// Reference to a [`Category`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<ObjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub published_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<OffsetDateTime>,
    #[serde(default)]
    pub cost: f64,
    #[serde(default = "default_best_seller")]
    pub is_best_seller: bool,
    /// Identity that created the book; set once at creation
    pub owner: ObjectId,
}

/// Book fields written on creation. The store adds `id`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBook {
    pub title: String,
    pub publication: String,
    pub author: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub cost: f64,
    pub is_best_seller: bool,
    pub owner: ObjectId,
}

/// Grouping a book may reference. Not managed through this service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: ObjectId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Body of `POST /books`.
///
/// Text fields accept any JSON scalar; numbers and booleans are stored as
/// their string form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateBook {
    #[serde(default)]
    pub title: Option<Value>,
    #[serde(default)]
    pub publication: Option<Value>,
    #[serde(default)]
    pub author: Option<Value>,
    /// Number or numeric string
    #[serde(default)]
    pub cost: Option<Value>,
}

/// Body of `PUT /books/{id}`. Only `cost` may change.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateBook {
    #[serde(default)]
    pub cost: Option<Value>,
}

/// Query string of `GET /books/cost`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostRange {
    #[serde(default)]
    pub min_cost: Option<String>,
    #[serde(default)]
    pub max_cost: Option<String>,
}

/// `{ "msg": ... }` acknowledgement for update and delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Confirmation {
    pub msg: String,
}

impl Confirmation {
    pub fn new(msg: impl Into<String>) -> Self {
        Self { msg: msg.into() }
    }
}
