use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Resume,
    CoverLetter,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Resume => "resume",
            DocumentKind::CoverLetter => "cover_letter",
        }
    }

    /// Title used when the caller gave neither a company nor a job title.
    pub fn default_title(&self) -> &'static str {
        match self {
            DocumentKind::Resume => "Resume",
            DocumentKind::CoverLetter => "Cover Letter",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "resume" => Some(DocumentKind::Resume),
            "cover_letter" => Some(DocumentKind::CoverLetter),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Draft,
    Final,
}

impl DocumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Draft => "draft",
            DocumentStatus::Final => "final",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(DocumentStatus::Draft),
            "final" => Some(DocumentStatus::Final),
            _ => None,
        }
    }
}

/// A generated resume or cover letter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(rename = "type")]
    pub kind: DocumentKind,
    pub title: String,
    /// `{"raw_content": "<provider text>"}`
    pub content: Value,
    pub template_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    pub job_description: String,
    pub status: DocumentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// `documents` table row. Kind and status are stored as text.
#[derive(Debug, Clone, FromRow)]
pub struct DocumentRow {
    pub id: Uuid,
    pub user_id: Uuid,
    #[sqlx(rename = "type")]
    pub kind: String,
    pub title: String,
    pub content: Value,
    pub template_id: String,
    pub job_title: Option<String>,
    pub company_name: Option<String>,
    pub job_description: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<DocumentRow> for Document {
    type Error = String;

    fn try_from(row: DocumentRow) -> Result<Self, Self::Error> {
        let kind = DocumentKind::parse(&row.kind)
            .ok_or_else(|| format!("unknown document type '{}'", row.kind))?;
        let status = DocumentStatus::parse(&row.status)
            .ok_or_else(|| format!("unknown document status '{}'", row.status))?;

        Ok(Document {
            id: row.id,
            user_id: row.user_id,
            kind,
            title: row.title,
            content: row.content,
            template_id: row.template_id,
            job_title: row.job_title,
            company_name: row.company_name,
            job_description: row.job_description,
            status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Append-only usage ledger entry, one per persisted generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationHistoryRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub document_id: Uuid,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    /// Estimated USD.
    pub total_cost: f64,
    pub generation_time_ms: u64,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_row() -> DocumentRow {
        DocumentRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            kind: "cover_letter".to_string(),
            title: "Acme".to_string(),
            content: serde_json::json!({ "raw_content": "Dear Acme" }),
            template_id: "classic".to_string(),
            job_title: None,
            company_name: Some("Acme".to_string()),
            job_description: "Build things".to_string(),
            status: "final".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_row_converts_to_document() {
        let doc = Document::try_from(sample_row()).unwrap();
        assert_eq!(doc.kind, DocumentKind::CoverLetter);
        assert_eq!(doc.status, DocumentStatus::Final);
        assert_eq!(doc.company_name.as_deref(), Some("Acme"));
    }

    #[test]
    fn test_row_with_unknown_kind_is_rejected() {
        let mut row = sample_row();
        row.kind = "portfolio".to_string();
        assert!(Document::try_from(row).is_err());
    }

    #[test]
    fn test_document_serializes_kind_as_type() {
        let doc = Document::try_from(sample_row()).unwrap();
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["type"], "cover_letter");
        assert_eq!(json["status"], "final");
        assert!(json.get("job_title").is_none());
    }

    #[test]
    fn test_kind_deserializes_from_wire_name() {
        let kind: DocumentKind = serde_json::from_str("\"cover_letter\"").unwrap();
        assert_eq!(kind, DocumentKind::CoverLetter);
        assert_eq!(kind.default_title(), "Cover Letter");
        assert_eq!(DocumentKind::Resume.default_title(), "Resume");
    }
}
