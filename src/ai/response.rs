//! Validation of the classifier's raw reply.
//!
//! The reply must contain a JSON object with non-empty `Titel` and
//! `Kategorie` strings. Nothing is repaired or retried.

use super::types::ClassificationResult;
use serde::Deserialize;
use thiserror::Error;

pub const TITLE_FIELD: &str = "Titel";
pub const CATEGORY_FIELD: &str = "Kategorie";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResponseError {
    #[error("Classification response is not a valid JSON object: {0}")]
    Malformed(String),

    #[error("Classification response is missing the \"{0}\" field")]
    MissingField(&'static str),

    #[error("Classification response has an empty \"{0}\" field")]
    EmptyField(&'static str),
}

#[derive(Deserialize)]
struct RawClassification {
    #[serde(rename = "Titel", alias = "title", alias = "Title")]
    title: Option<String>,
    #[serde(rename = "Kategorie", alias = "category", alias = "Category")]
    category: Option<String>,
}

/// Locate the object in a reply.
///
/// Chat models tend to wrap it in a ``` fence (`json` tag or none) or put a
/// sentence before it. The body of the first fence is searched if there is
/// one, otherwise the whole reply; the object spans the first `{` to the
/// last `}`.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let body = fenced_body(text).unwrap_or(text);
    let open = body.find('{')?;
    let close = body.rfind('}')?;
    (open < close).then(|| &body[open..=close])
}

/// Contents of the first ``` fence, without the info string line
fn fenced_body(text: &str) -> Option<&str> {
    let (_, after_fence) = text.split_once("```")?;
    let (_info, body) = after_fence.split_once('\n')?;
    let (body, _) = body.split_once("```")?;
    Some(body)
}

/// Parse and check a raw classification reply
pub fn validate_response(raw: &str) -> Result<ClassificationResult, ResponseError> {
    let json = extract_json_object(raw)
        .ok_or_else(|| ResponseError::Malformed("no JSON object found".to_string()))?;

    let parsed: RawClassification =
        serde_json::from_str(json).map_err(|e| ResponseError::Malformed(e.to_string()))?;

    let title = required(parsed.title, TITLE_FIELD)?;
    let category = required(parsed.category, CATEGORY_FIELD)?;

    Ok(ClassificationResult { title, category })
}

fn required(value: Option<String>, field: &'static str) -> Result<String, ResponseError> {
    let value = value.ok_or(ResponseError::MissingField(field))?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ResponseError::EmptyField(field));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_valid_response() {
        let result =
            validate_response(r#"{"Titel":"Invoice 2024-01","Kategorie":"Arbeit"}"#).unwrap();
        assert_eq!(result.title, "Invoice 2024-01");
        assert_eq!(result.category, "Arbeit");
    }

    #[test]
    fn test_rejects_malformed() {
        assert!(matches!(
            validate_response("{not json"),
            Err(ResponseError::Malformed(_))
        ));
        assert!(matches!(
            validate_response("Titel: \"x\", Kategorie: \"y\""),
            Err(ResponseError::Malformed(_))
        ));
    }

    #[test]
    fn test_rejects_missing_fields() {
        assert_eq!(
            validate_response("{}"),
            Err(ResponseError::MissingField(TITLE_FIELD))
        );
        assert_eq!(
            validate_response(r#"{"Titel":"x"}"#),
            Err(ResponseError::MissingField(CATEGORY_FIELD))
        );
    }

    #[test]
    fn test_rejects_empty_fields() {
        assert_eq!(
            validate_response(r#"{"Titel":"","Kategorie":"Arbeit"}"#),
            Err(ResponseError::EmptyField(TITLE_FIELD))
        );
        assert_eq!(
            validate_response(r#"{"Titel":"x","Kategorie":"   "}"#),
            Err(ResponseError::EmptyField(CATEGORY_FIELD))
        );
    }

    #[test]
    fn test_rejects_non_string_field() {
        assert!(matches!(
            validate_response(r#"{"Titel":42,"Kategorie":"Arbeit"}"#),
            Err(ResponseError::Malformed(_))
        ));
    }

    #[test]
    fn test_accepts_fenced_json() {
        let raw = "Hier ist das Ergebnis:\n```json\n{\"Titel\": \"Kfz-Steuer 2024\", \"Kategorie\": \"Versicherung\"}\n```";
        let result = validate_response(raw).unwrap();
        assert_eq!(result.title, "Kfz-Steuer 2024");
        assert_eq!(result.category, "Versicherung");
    }

    #[test]
    fn test_extract_json_object_shapes() {
        let object = r#"{"Titel":"a","Kategorie":"b"}"#;
        let bare_fence = format!("```\n{}\n```", object);
        let inline_fence = format!("```{}```", object);
        let prose = format!("Vorschlag: {} Ende.", object);

        assert_eq!(extract_json_object(&bare_fence), Some(object));
        assert_eq!(extract_json_object(&inline_fence), Some(object));
        assert_eq!(extract_json_object(&prose), Some(object));
        assert_eq!(extract_json_object("} nur Text {"), None);
        assert_eq!(extract_json_object("```json\nkein Objekt\n```"), None);
    }

    #[test]
    fn test_accepts_english_aliases() {
        let result = validate_response(r#"{"title":"Lease 2024","category":"Wohnung"}"#).unwrap();
        assert_eq!(result.title, "Lease 2024");
        assert_eq!(result.category, "Wohnung");
    }

    #[test]
    fn test_escaped_characters_survive() {
        let result =
            validate_response(r#"{"Titel":"Brief \"Finanzamt\" 03\/2024","Kategorie":"Steuer"}"#)
                .unwrap();
        assert_eq!(result.title, "Brief \"Finanzamt\" 03/2024");
    }
}
