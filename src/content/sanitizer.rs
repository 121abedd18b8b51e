use serde_json::{Map, Value};

use crate::content::schema::{
    validate_document, CONNECT_LINK_KEYS, FORBIDDEN_KEY_FRAGMENTS, PERSONAL_BRAND_KEYS,
    PORTFOLIO_DEMO_KEYS, REVIEW_KEYS, SERVICE_KEYS,
};
use crate::content::ContentError;

/// Depth-first scan over the whole tree. Any key name containing a forbidden
/// fragment (case-insensitive) is a hard stop. Runs BEFORE whitelisting so a
/// forbidden key can never be silently dropped.
pub fn reject_forbidden_keys(value: &Value) -> Result<(), ContentError> {
    match value {
        Value::Array(items) => {
            for item in items {
                reject_forbidden_keys(item)?;
            }
            Ok(())
        }
        Value::Object(map) => {
            for (key, nested) in map {
                let lower = key.to_lowercase();
                if FORBIDDEN_KEY_FRAGMENTS
                    .iter()
                    .any(|fragment| lower.contains(fragment))
                {
                    return Err(ContentError::ForbiddenKey(key.clone()));
                }
                reject_forbidden_keys(nested)?;
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Rebuild the document keeping only whitelisted keys, in schema attribute
/// order. Unknown top-level keys are dropped without error (the one
/// deliberately lenient spot in the pipeline). Wrong-typed sections pass
/// through unchanged for the validator to reject with a precise path.
pub fn whitelist_document(doc: &Map<String, Value>) -> Value {
    let mut out = Map::new();

    if let Some(brand) = filter_object(doc.get("personal_brand"), &PERSONAL_BRAND_KEYS) {
        out.insert("personal_brand".to_string(), brand);
    }

    if let Some(services) = filter_array(doc.get("services"), &SERVICE_KEYS) {
        out.insert("services".to_string(), services);
    }

    if let Some(demos) = filter_array(doc.get("portfolio_demos"), &PORTFOLIO_DEMO_KEYS) {
        out.insert("portfolio_demos".to_string(), demos);
    }

    // social_proof is always rebuilt so stray keys under it are dropped even
    // when google_reviews itself is missing or malformed.
    let mut social = Map::new();
    let reviews = doc
        .get("social_proof")
        .and_then(Value::as_object)
        .and_then(|map| map.get("google_reviews"));
    if let Some(reviews) = filter_array(reviews, &REVIEW_KEYS) {
        social.insert("google_reviews".to_string(), reviews);
    }
    out.insert("social_proof".to_string(), Value::Object(social));

    if let Some(links) = filter_object(doc.get("connect_links"), &CONNECT_LINK_KEYS) {
        out.insert("connect_links".to_string(), links);
    }

    Value::Object(out)
}

fn filter_object(value: Option<&Value>, allowed: &[&str]) -> Option<Value> {
    let value = value?;
    match value.as_object() {
        Some(map) => {
            let mut filtered = Map::new();
            for key in allowed {
                if let Some(v) = map.get(*key) {
                    filtered.insert((*key).to_string(), v.clone());
                }
            }
            Some(Value::Object(filtered))
        }
        // Pass non-objects through; the validator reports the exact path.
        None => Some(value.clone()),
    }
}

fn filter_array(value: Option<&Value>, allowed: &[&str]) -> Option<Value> {
    let value = value?;
    match value.as_array() {
        Some(items) => Some(Value::Array(
            items
                .iter()
                .map(|item| filter_object(Some(item), allowed).unwrap_or(Value::Null))
                .collect(),
        )),
        None => Some(value.clone()),
    }
}

/// Narrow a resolved envelope candidate to canonical content JSON text:
/// string candidates are re-parsed, then forbidden-key scan, whitelist pass,
/// schema validation, and 2-space-indented serialization with stable key
/// order.
pub fn normalize_content(candidate: &Value) -> Result<String, ContentError> {
    let object = match candidate {
        Value::String(text) => {
            let reparsed: Value =
                serde_json::from_str(text).map_err(|_| ContentError::NotAnObject)?;
            match reparsed {
                Value::Object(map) => map,
                _ => return Err(ContentError::NotAnObject),
            }
        }
        Value::Object(map) => map.clone(),
        _ => return Err(ContentError::NotAnObject),
    };

    reject_forbidden_keys(&Value::Object(object.clone()))?;
    let sanitized = whitelist_document(&object);
    validate_document(&sanitized)?;

    // serde_json pretty-printing is 2-space indented; with preserve_order the
    // whitelist insertion order above is the canonical key order.
    serde_json::to_string_pretty(&sanitized).map_err(|_| ContentError::InvalidJson)
}
