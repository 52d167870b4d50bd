//! Inbound generation request: wire body, validation, normalization.

use serde::Deserialize;

use crate::errors::AppError;
use crate::models::document::DocumentKind;

pub const DEFAULT_TEMPLATE_ID: &str = "classic";

/// Body accepted by the generation endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateDocumentBody {
    #[serde(rename = "type")]
    pub kind: Option<DocumentKind>,
    pub job_description: Option<String>,
    pub job_title: Option<String>,
    pub company_name: Option<String>,
    pub template_id: Option<String>,
    #[serde(default)]
    pub custom_sections: Vec<String>,
}

/// Validated caller intent. Immutable once built.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub kind: DocumentKind,
    pub job_description: String,
    pub job_title: Option<String>,
    pub company_name: Option<String>,
    pub template_id: String,
    pub custom_sections: Vec<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl GenerateDocumentBody {
    /// Validates the body. `kind_override` comes from kind-specific routes
    /// and wins over the body's `type`.
    pub fn into_request(
        self,
        kind_override: Option<DocumentKind>,
    ) -> Result<GenerationRequest, AppError> {
        let job_description = non_blank(self.job_description)
            .ok_or_else(|| AppError::MissingFields("Job description is required".to_string()))?;

        let kind = kind_override.or(self.kind).ok_or_else(|| {
            AppError::Validation("type must be 'resume' or 'cover_letter'".to_string())
        })?;

        let custom_sections = self
            .custom_sections
            .into_iter()
            .filter_map(|s| non_blank(Some(s)))
            .collect();

        Ok(GenerationRequest {
            kind,
            job_description,
            job_title: non_blank(self.job_title),
            company_name: non_blank(self.company_name),
            template_id: non_blank(self.template_id)
                .unwrap_or_else(|| DEFAULT_TEMPLATE_ID.to_string()),
            custom_sections,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(json: serde_json::Value) -> GenerateDocumentBody {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_missing_job_description_is_missing_fields() {
        let err = body(serde_json::json!({ "type": "resume" }))
            .into_request(None)
            .unwrap_err();
        assert!(matches!(err, AppError::MissingFields(_)));
    }

    #[test]
    fn test_blank_job_description_is_missing_fields() {
        let err = body(serde_json::json!({ "type": "resume", "job_description": "   " }))
            .into_request(None)
            .unwrap_err();
        assert!(matches!(err, AppError::MissingFields(_)));
    }

    #[test]
    fn test_missing_type_without_override_is_validation_error() {
        let err = body(serde_json::json!({ "job_description": "Build things" }))
            .into_request(None)
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_route_kind_overrides_body_type() {
        let req = body(serde_json::json!({
            "type": "resume",
            "job_description": "Build things"
        }))
        .into_request(Some(DocumentKind::CoverLetter))
        .unwrap();
        assert_eq!(req.kind, DocumentKind::CoverLetter);
    }

    #[test]
    fn test_defaults_and_blank_optionals() {
        let req = body(serde_json::json!({
            "type": "cover_letter",
            "job_description": "  Build scalable systems ",
            "job_title": "",
            "company_name": "Acme",
            "template_id": "",
            "custom_sections": ["Awards", " "]
        }))
        .into_request(None)
        .unwrap();

        assert_eq!(req.job_description, "Build scalable systems");
        assert_eq!(req.job_title, None);
        assert_eq!(req.company_name.as_deref(), Some("Acme"));
        assert_eq!(req.template_id, DEFAULT_TEMPLATE_ID);
        assert_eq!(req.custom_sections, vec!["Awards".to_string()]);
    }

    #[test]
    fn test_unknown_type_fails_deserialization() {
        let result: Result<GenerateDocumentBody, _> = serde_json::from_value(serde_json::json!({
            "type": "portfolio",
            "job_description": "x"
        }));
        assert!(result.is_err());
    }
}
