use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DocumentListItem {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Clause {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DocumentDetail {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub clauses: Vec<Clause>,
    #[serde(default)]
    pub red_flags: Vec<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Analysis returned by `POST /document/upload`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct UploadResponse {
    pub id: i64,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub clauses: Vec<Clause>,
    #[serde(default)]
    pub red_flags: Vec<String>,
    #[serde(default)]
    pub filename: Option<String>,
}
