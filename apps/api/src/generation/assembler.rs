//! Document Assembler: turns provider output plus request metadata into the
//! document record that gets persisted. No I/O happens here.

use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use crate::generation::provider::GeneratedContent;
use crate::generation::request::GenerationRequest;
use crate::models::document::{Document, DocumentKind, DocumentStatus};

#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentAssembler;

impl DocumentAssembler {
    /// Builds a `final` document. The generated text is stored verbatim
    /// under `raw_content`.
    pub fn assemble(
        &self,
        request: &GenerationRequest,
        generated: &GeneratedContent,
        user_id: Uuid,
    ) -> Document {
        let now = Utc::now();
        Document {
            id: Uuid::new_v4(),
            user_id,
            kind: request.kind,
            title: derive_title(
                request.kind,
                request.company_name.as_deref(),
                request.job_title.as_deref(),
            ),
            content: json!({ "raw_content": generated.content }),
            template_id: request.template_id.clone(),
            job_title: request.job_title.clone(),
            company_name: request.company_name.clone(),
            job_description: request.job_description.clone(),
            status: DocumentStatus::Final,
            created_at: now,
            updated_at: now,
        }
    }
}

/// "{company} - {job title}", then company, then job title, then the kind's
/// default. Blank strings count as absent.
pub fn derive_title(kind: DocumentKind, company: Option<&str>, job_title: Option<&str>) -> String {
    let company = company.map(str::trim).filter(|s| !s.is_empty());
    let job_title = job_title.map(str::trim).filter(|s| !s.is_empty());

    match (company, job_title) {
        (Some(c), Some(t)) => format!("{c} - {t}"),
        (Some(c), None) => c.to_string(),
        (None, Some(t)) => t.to_string(),
        (None, None) => kind.default_title().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generated(text: &str) -> GeneratedContent {
        GeneratedContent {
            content: text.to_string(),
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
            generation_time_ms: 42,
            model: "gpt-4o-mini".to_string(),
        }
    }

    fn request(company: Option<&str>, job_title: Option<&str>) -> GenerationRequest {
        GenerationRequest {
            kind: DocumentKind::Resume,
            job_description: "Build scalable systems".to_string(),
            job_title: job_title.map(String::from),
            company_name: company.map(String::from),
            template_id: "modern".to_string(),
            custom_sections: vec![],
        }
    }

    #[test]
    fn test_title_company_and_job_title() {
        assert_eq!(
            derive_title(DocumentKind::Resume, Some("Acme"), Some("Engineer")),
            "Acme - Engineer"
        );
    }

    #[test]
    fn test_title_company_only() {
        assert_eq!(derive_title(DocumentKind::Resume, Some("Acme"), Some("")), "Acme");
    }

    #[test]
    fn test_title_job_title_only() {
        assert_eq!(
            derive_title(DocumentKind::CoverLetter, None, Some("Engineer")),
            "Engineer"
        );
    }

    #[test]
    fn test_title_defaults_per_kind() {
        assert_eq!(derive_title(DocumentKind::Resume, Some(""), Some("")), "Resume");
        assert_eq!(
            derive_title(DocumentKind::CoverLetter, Some(""), Some("")),
            "Cover Letter"
        );
    }

    #[test]
    fn test_assemble_stores_raw_text_and_is_final() {
        let raw = "{\"summary\": \"not parsed\"  }";
        let user_id = Uuid::new_v4();
        let doc = DocumentAssembler.assemble(
            &request(Some("Acme"), Some("Engineer")),
            &generated(raw),
            user_id,
        );

        assert_eq!(doc.user_id, user_id);
        assert_eq!(doc.status, DocumentStatus::Final);
        assert_eq!(doc.title, "Acme - Engineer");
        assert_eq!(doc.content["raw_content"], raw);
        assert_eq!(doc.template_id, "modern");
        assert_eq!(doc.job_description, "Build scalable systems");
    }
}
