//! AI module - prompt templates and backends for document generation

pub mod ai;

pub use ai::backend_impl::CliAiBackend;
pub use ai::prompts::{
    build_bill_of_sale_prompt, build_nvis_prompt, build_vin_description_prompt,
    build_vin_label_prompt,
};

use docuhaul_types::Result;
use serde::{Deserialize, Serialize};

/// Something that can answer a text prompt.
///
/// Flows depend on this trait so tests can substitute a fake backend.
pub trait AiBackend {
    fn send_prompt(&self, prompt: &str) -> Result<String>;
}

impl<T: AiBackend + ?Sized> AiBackend for &T {
    fn send_prompt(&self, prompt: &str) -> Result<String> {
        (**self).send_prompt(prompt)
    }
}

/// AI backend configuration
#[derive(Debug, Clone)]
pub struct AiConfig {
    /// Backend name (gemini, claude, codex)
    pub backend: String,
    pub model: Option<String>,
    /// Full command line override; derived from `backend` when absent
    pub command: Option<String>,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            backend: "gemini".to_string(),
            model: None,
            command: None,
        }
    }
}

impl AiConfig {
    pub fn with_backend(mut self, backend: &str) -> Self {
        self.backend = backend.to_lowercase();
        self
    }

    pub fn with_model(mut self, model: Option<String>) -> Self {
        self.model = model;
        self
    }

    pub fn with_command(mut self, command: Option<String>) -> Self {
        self.command = command;
        self
    }

    /// Command line used to invoke the backend
    pub fn command_line(&self) -> String {
        if let Some(ref cmd) = self.command {
            if !cmd.trim().is_empty() {
                return cmd.clone();
            }
        }
        match self.backend.as_str() {
            "claude" => "claude -p".to_string(),
            "codex" => "codex exec".to_string(),
            _ => "gemini -p".to_string(),
        }
    }
}

/// Document text returned by the AI
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentDraft {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
}

/// Human-readable VIN description returned by the AI
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VinDescription {
    #[serde(default)]
    pub manufacturer: Option<String>,
    #[serde(default)]
    pub vehicle_type: Option<String>,
    #[serde(default)]
    pub description: String,
}

/// Extract JSON from AI response (handles markdown code blocks)
pub fn extract_json_from_response(response: &str) -> String {
    let response = response.trim();

    if response.starts_with("```") {
        if let Some(end) = response.rfind("```") {
            let start = response.find('\n').map(|i| i + 1).unwrap_or(3);
            if start < end {
                return response[start..end].trim().to_string();
            }
        }
    }

    if let Some(start) = response.find('{') {
        if let Some(end) = response.rfind('}') {
            if start < end {
                return response[start..=end].to_string();
            }
        }
    }

    response.to_string()
}

/// Parse a document draft; plain-text replies become the body.
pub fn parse_document_draft(response: &str, fallback_title: &str) -> DocumentDraft {
    let json_str = extract_json_from_response(response);
    match serde_json::from_str::<DocumentDraft>(&json_str) {
        Ok(mut draft) if !draft.body.trim().is_empty() => {
            if draft.title.trim().is_empty() {
                draft.title = fallback_title.to_string();
            }
            draft
        }
        Ok(_) | Err(_) => {
            tracing::debug!("AI reply was not a JSON draft, using raw text");
            DocumentDraft {
                title: fallback_title.to_string(),
                body: response.trim().to_string(),
            }
        }
    }
}

/// Parse a VIN description; plain-text replies become the description.
pub fn parse_vin_description(response: &str) -> VinDescription {
    let json_str = extract_json_from_response(response);
    serde_json::from_str::<VinDescription>(&json_str).unwrap_or_else(|_| VinDescription {
        manufacturer: None,
        vehicle_type: None,
        description: response.trim().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_json_code_block() {
        let response = "```json\n{\"title\": \"A\", \"body\": \"B\"}\n```";
        assert_eq!(
            extract_json_from_response(response),
            "{\"title\": \"A\", \"body\": \"B\"}"
        );
    }

    #[test]
    fn test_extract_json_with_prose() {
        let response = "Here you go: {\"body\": \"x\"} thanks";
        assert_eq!(extract_json_from_response(response), "{\"body\": \"x\"}");
    }

    #[test]
    fn test_parse_draft_json() {
        let draft = parse_document_draft("{\"title\": \"Bill\", \"body\": \"Sold.\"}", "Fallback");
        assert_eq!(draft.title, "Bill");
        assert_eq!(draft.body, "Sold.");
    }

    #[test]
    fn test_parse_draft_missing_title_uses_fallback() {
        let draft = parse_document_draft("{\"body\": \"Sold.\"}", "Fallback");
        assert_eq!(draft.title, "Fallback");
    }

    #[test]
    fn test_parse_draft_plain_text() {
        let draft = parse_document_draft("Just some text", "Fallback");
        assert_eq!(draft.title, "Fallback");
        assert_eq!(draft.body, "Just some text");
    }

    #[test]
    fn test_parse_vin_description() {
        let desc = parse_vin_description(
            "```json\n{\"manufacturer\": \"Honda\", \"vehicleType\": \"Passenger car\", \"description\": \"2003 Accord\"}\n```",
        );
        assert_eq!(desc.manufacturer.as_deref(), Some("Honda"));
        assert_eq!(desc.vehicle_type.as_deref(), Some("Passenger car"));
        assert_eq!(desc.description, "2003 Accord");
    }

    #[test]
    fn test_command_line_defaults() {
        assert_eq!(AiConfig::default().command_line(), "gemini -p");
        assert_eq!(AiConfig::default().with_backend("Claude").command_line(), "claude -p");
        let custom = AiConfig::default().with_command(Some("my-llm --json".to_string()));
        assert_eq!(custom.command_line(), "my-llm --json");
    }
}
