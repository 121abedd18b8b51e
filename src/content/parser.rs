use serde_json::Value;

use crate::content::sanitizer::normalize_content;
use crate::content::schema::looks_like_content_document;
use crate::content::ContentError;

/// The model's response after the full narrowing pipeline: canonical content
/// JSON text plus the optional commit message it suggested.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedPayload {
    pub content_json: String,
    pub commit_message: Option<String>,
}

/// Narrow a raw model response to a validated payload.
///
/// Stages, each a hard failure point: strict envelope unwrapping, JSON parse,
/// top-level html/css/js guard, candidate resolution, sanitization and schema
/// validation, then commit-message extraction from the ORIGINAL top-level
/// object (never from the candidate).
pub fn parse_generated_payload(raw: &str) -> Result<GeneratedPayload, ContentError> {
    let unwrapped = unwrap_strict_envelope(raw)?;
    let parsed: Value = serde_json::from_str(unwrapped).map_err(|_| ContentError::InvalidJson)?;

    if let Some(map) = parsed.as_object() {
        for key in ["html", "css", "js"] {
            if map.contains_key(key) {
                return Err(ContentError::MarkupFields);
            }
        }
    }

    let candidate = resolve_candidate(&parsed)?;
    let content_json = normalize_content(candidate)?;

    let commit_message = parsed
        .get("commitMessage")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    Ok(GeneratedPayload {
        content_json,
        commit_message,
    })
}

/// Accept only two envelope shapes: a single triple-backtick fence (optionally
/// tagged `json`) wrapping the ENTIRE trimmed response, or bare text starting
/// with `{` and ending with `}`. Any conversational prose before or after the
/// JSON is rejected outright rather than salvaged.
fn unwrap_strict_envelope(raw: &str) -> Result<&str, ContentError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ContentError::EmptyOutput);
    }

    if trimmed.len() >= 6 && trimmed.starts_with("```") && trimmed.ends_with("```") {
        let mut inner = &trimmed[3..trimmed.len() - 3];
        if inner.len() >= 4 && inner.as_bytes()[..4].eq_ignore_ascii_case(b"json") {
            inner = &inner[4..];
        }
        let inner = inner.trim();
        if inner.is_empty() {
            return Err(ContentError::LooseEnvelope);
        }
        return Ok(inner);
    }

    if trimmed.starts_with('{') && trimmed.ends_with('}') {
        return Ok(trimmed);
    }

    Err(ContentError::LooseEnvelope)
}

/// Ordered extractor list locating the content document inside the parsed
/// value. The order is load-bearing:
///   1. a `contentJson` key (any value; later stages reject bad shapes)
///   2. a `content_json` key
///   3. a `result` key whose value independently looks like a content document
///   4. a `data` key under the same test
///   5. the first top-level value that looks like a content document
///   6. the parsed value itself, if it looks like one
fn resolve_candidate(parsed: &Value) -> Result<&Value, ContentError> {
    if let Some(map) = parsed.as_object() {
        if let Some(value) = map.get("contentJson") {
            return Ok(value);
        }
        if let Some(value) = map.get("content_json") {
            return Ok(value);
        }
        if let Some(value) = map.get("result") {
            if looks_like_content_document(value) {
                return Ok(value);
            }
        }
        if let Some(value) = map.get("data") {
            if looks_like_content_document(value) {
                return Ok(value);
            }
        }
        for value in map.values() {
            if looks_like_content_document(value) {
                return Ok(value);
            }
        }
    }

    if looks_like_content_document(parsed) {
        return Ok(parsed);
    }

    Err(ContentError::MissingContent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_document() -> Value {
        json!({
            "personal_brand": {
                "hero_statement": "I build things",
                "about_me": "An engineer",
                "core_values": ["Efficiency"],
                "work_philosophy": "Keep it simple"
            },
            "services": [],
            "portfolio_demos": [],
            "social_proof": { "google_reviews": [] },
            "connect_links": {
                "linkedin": "a", "github": "b", "facebook": "c",
                "instagram": "d", "scheduling_url": "e"
            }
        })
    }

    #[test]
    fn test_bare_document_accepted() {
        let payload = parse_generated_payload(&valid_document().to_string()).unwrap();
        assert!(payload.commit_message.is_none());
        let reparsed: Value = serde_json::from_str(&payload.content_json).unwrap();
        assert!(looks_like_content_document(&reparsed));
    }

    #[test]
    fn test_fenced_document_accepted() {
        let raw = format!("```json\n{}\n```", valid_document());
        assert!(parse_generated_payload(&raw).is_ok());
    }

    #[test]
    fn test_untagged_fence_accepted() {
        let raw = format!("```\n{}\n```", valid_document());
        assert!(parse_generated_payload(&raw).is_ok());
    }

    #[test]
    fn test_leading_prose_rejected_even_with_valid_json() {
        let raw = format!("Sure! Here is the update:\n{}", valid_document());
        let err = parse_generated_payload(&raw).unwrap_err();
        assert!(matches!(err, ContentError::LooseEnvelope));
    }

    #[test]
    fn test_trailing_prose_rejected() {
        let raw = format!("{}\nHope that helps!", valid_document());
        let err = parse_generated_payload(&raw).unwrap_err();
        assert!(matches!(err, ContentError::LooseEnvelope));
    }

    #[test]
    fn test_prose_around_fence_rejected() {
        let raw = format!("Here you go:\n```json\n{}\n```", valid_document());
        let err = parse_generated_payload(&raw).unwrap_err();
        assert!(matches!(err, ContentError::LooseEnvelope));
    }

    #[test]
    fn test_empty_response_rejected() {
        assert!(matches!(
            parse_generated_payload("   \n  ").unwrap_err(),
            ContentError::EmptyOutput
        ));
    }

    #[test]
    fn test_invalid_json_inside_envelope() {
        assert!(matches!(
            parse_generated_payload("{not valid json}").unwrap_err(),
            ContentError::InvalidJson
        ));
    }

    #[test]
    fn test_html_css_js_keys_rejected_before_resolution() {
        // Key presence alone is fatal, even alongside a valid envelope.
        for key in ["html", "css", "js"] {
            let raw = json!({
                key: "",
                "contentJson": valid_document()
            })
            .to_string();
            let err = parse_generated_payload(&raw).unwrap_err();
            assert!(matches!(err, ContentError::MarkupFields), "{key} should be fatal");
        }
    }

    #[test]
    fn test_content_json_envelope() {
        let raw = json!({
            "contentJson": valid_document(),
            "commitMessage": "feat: refresh hero"
        })
        .to_string();
        let payload = parse_generated_payload(&raw).unwrap();
        assert_eq!(payload.commit_message.as_deref(), Some("feat: refresh hero"));
    }

    #[test]
    fn test_snake_case_envelope() {
        let raw = json!({ "content_json": valid_document() }).to_string();
        assert!(parse_generated_payload(&raw).is_ok());
    }

    #[test]
    fn test_result_envelope_requires_full_shape() {
        // `result` not looking like a content document falls through to the
        // value scan, which also misses here.
        let raw = json!({ "result": { "personal_brand": {} } }).to_string();
        let err = parse_generated_payload(&raw).unwrap_err();
        assert!(matches!(err, ContentError::MissingContent));

        let raw = json!({ "result": valid_document() }).to_string();
        assert!(parse_generated_payload(&raw).is_ok());
    }

    #[test]
    fn test_data_envelope() {
        let raw = json!({ "data": valid_document() }).to_string();
        assert!(parse_generated_payload(&raw).is_ok());
    }

    #[test]
    fn test_scan_finds_document_under_arbitrary_key() {
        let raw = json!({ "updated": valid_document() }).to_string();
        assert!(parse_generated_payload(&raw).is_ok());
    }

    #[test]
    fn test_content_json_key_wins_over_scan() {
        // An explicit contentJson key is taken as-is even when another value
        // would pass the shape probe; its broken shape must surface.
        let raw = json!({
            "contentJson": { "personal_brand": {} },
            "fallback": valid_document()
        })
        .to_string();
        let err = parse_generated_payload(&raw).unwrap_err();
        assert!(matches!(err, ContentError::MissingKey(_)));
    }

    #[test]
    fn test_string_encoded_candidate() {
        let raw = json!({ "contentJson": valid_document().to_string() }).to_string();
        assert!(parse_generated_payload(&raw).is_ok());
    }

    #[test]
    fn test_commit_message_from_top_level_not_candidate() {
        let mut doc = valid_document();
        doc.as_object_mut()
            .unwrap()
            .insert("commitMessage".to_string(), json!("from-candidate"));
        // Top level has no commitMessage; the candidate's copy is ignored
        // (and dropped by whitelisting).
        let raw = json!({ "contentJson": doc }).to_string();
        let payload = parse_generated_payload(&raw).unwrap();
        assert!(payload.commit_message.is_none());
    }

    #[test]
    fn test_blank_commit_message_treated_as_absent() {
        let raw = json!({
            "contentJson": valid_document(),
            "commitMessage": "   "
        })
        .to_string();
        let payload = parse_generated_payload(&raw).unwrap();
        assert!(payload.commit_message.is_none());
    }

    #[test]
    fn test_missing_content_field() {
        let raw = json!({ "message": "done" }).to_string();
        assert!(matches!(
            parse_generated_payload(&raw).unwrap_err(),
            ContentError::MissingContent
        ));
    }

    #[test]
    fn test_forbidden_key_fails_whole_parse() {
        let mut doc = valid_document();
        doc["services"] = json!([{
            "service_name": "x", "description": "y",
            "client_value_add": "z", "tier": "gold"
        }]);
        let raw = json!({ "contentJson": doc }).to_string();
        let err = parse_generated_payload(&raw).unwrap_err();
        assert!(matches!(err, ContentError::ForbiddenKey(_)));
    }
}
