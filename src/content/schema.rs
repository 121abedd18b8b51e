use serde_json::{Map, Value};

use crate::content::ContentError;

/// The five top-level sections of the content document. Order matters: it is
/// both the validation order and the canonical serialization order.
pub const REQUIRED_TOP_LEVEL_KEYS: [&str; 5] = [
    "personal_brand",
    "services",
    "portfolio_demos",
    "social_proof",
    "connect_links",
];

pub const PERSONAL_BRAND_KEYS: [&str; 4] = [
    "hero_statement",
    "about_me",
    "core_values",
    "work_philosophy",
];

pub const SERVICE_KEYS: [&str; 3] = ["service_name", "description", "client_value_add"];

pub const PORTFOLIO_DEMO_KEYS: [&str; 4] =
    ["project_title", "problem_solved", "demo_url", "repo_url"];

pub const REVIEW_KEYS: [&str; 2] = ["quote", "stars"];

pub const CONNECT_LINK_KEYS: [&str; 5] = [
    "linkedin",
    "github",
    "facebook",
    "instagram",
    "scheduling_url",
];

/// Key-name fragments that abort the whole operation wherever they appear.
pub const FORBIDDEN_KEY_FRAGMENTS: [&str; 4] = ["price", "pricing", "tier", "style"];

/// Quick shape probe used during envelope candidate resolution: an object
/// carrying all five required top-level keys. Values are not inspected.
pub fn looks_like_content_document(value: &Value) -> bool {
    match value.as_object() {
        Some(map) => REQUIRED_TOP_LEVEL_KEYS.iter().all(|key| map.contains_key(*key)),
        None => false,
    }
}

/// Validate a candidate document against the fixed schema.
///
/// Checks run top-down, left-to-right in the order of the key constants above;
/// the first violation wins and is reported with a path-qualified message.
/// A missing required key inside a present object is reported distinctly
/// (`Missing required key: ...`) from a wrong-typed or absent section
/// (`... must be an object`).
pub fn validate_document(doc: &Value) -> Result<(), ContentError> {
    let root = require_object(Some(doc), "contentJson")?;

    let brand = require_object(root.get("personal_brand"), "personal_brand")?;
    require_keys(brand, &PERSONAL_BRAND_KEYS, "personal_brand")?;
    require_string(brand.get("hero_statement"), "personal_brand.hero_statement")?;
    require_string(brand.get("about_me"), "personal_brand.about_me")?;
    require_string(brand.get("work_philosophy"), "personal_brand.work_philosophy")?;
    require_string_array(brand.get("core_values"), "personal_brand.core_values")?;

    let services = require_array(root.get("services"), "services")?;
    for (index, item) in services.iter().enumerate() {
        let path = format!("services[{index}]");
        let service = require_object(Some(item), &path)?;
        require_keys(service, &SERVICE_KEYS, &path)?;
        require_string(service.get("service_name"), &format!("{path}.service_name"))?;
        require_string(service.get("description"), &format!("{path}.description"))?;
        require_string(
            service.get("client_value_add"),
            &format!("{path}.client_value_add"),
        )?;
    }

    let demos = require_array(root.get("portfolio_demos"), "portfolio_demos")?;
    for (index, item) in demos.iter().enumerate() {
        let path = format!("portfolio_demos[{index}]");
        let demo = require_object(Some(item), &path)?;
        require_keys(demo, &PORTFOLIO_DEMO_KEYS, &path)?;
        require_string(demo.get("project_title"), &format!("{path}.project_title"))?;
        require_string(demo.get("problem_solved"), &format!("{path}.problem_solved"))?;
        require_string(demo.get("demo_url"), &format!("{path}.demo_url"))?;
        require_string(demo.get("repo_url"), &format!("{path}.repo_url"))?;
    }

    let social = require_object(root.get("social_proof"), "social_proof")?;
    require_keys(social, &["google_reviews"], "social_proof")?;
    let reviews = require_array(social.get("google_reviews"), "social_proof.google_reviews")?;
    for (index, item) in reviews.iter().enumerate() {
        let path = format!("social_proof.google_reviews[{index}]");
        let review = require_object(Some(item), &path)?;
        require_keys(review, &REVIEW_KEYS, &path)?;
        require_string(review.get("quote"), &format!("{path}.quote"))?;
        require_stars(review.get("stars"), &format!("{path}.stars"))?;
    }

    let links = require_object(root.get("connect_links"), "connect_links")?;
    require_keys(links, &CONNECT_LINK_KEYS, "connect_links")?;
    require_string(links.get("linkedin"), "connect_links.linkedin")?;
    require_string(links.get("github"), "connect_links.github")?;
    require_string(links.get("facebook"), "connect_links.facebook")?;
    require_string(links.get("instagram"), "connect_links.instagram")?;
    require_string(links.get("scheduling_url"), "connect_links.scheduling_url")?;

    Ok(())
}

fn require_object<'a>(
    value: Option<&'a Value>,
    path: &str,
) -> Result<&'a Map<String, Value>, ContentError> {
    value
        .and_then(Value::as_object)
        .ok_or_else(|| ContentError::shape(path, "an object"))
}

fn require_array<'a>(value: Option<&'a Value>, path: &str) -> Result<&'a Vec<Value>, ContentError> {
    value
        .and_then(Value::as_array)
        .ok_or_else(|| ContentError::shape(path, "an array"))
}

fn require_keys(
    map: &Map<String, Value>,
    required: &[&str],
    path: &str,
) -> Result<(), ContentError> {
    for key in required {
        if !map.contains_key(*key) {
            return Err(ContentError::MissingKey(format!("{path}.{key}")));
        }
    }
    Ok(())
}

fn require_string(value: Option<&Value>, path: &str) -> Result<(), ContentError> {
    match value.and_then(Value::as_str) {
        Some(s) if !s.trim().is_empty() => Ok(()),
        _ => Err(ContentError::shape(path, "a non-empty string")),
    }
}

fn require_string_array(value: Option<&Value>, path: &str) -> Result<(), ContentError> {
    let items = value.and_then(Value::as_array);
    let ok = items.is_some_and(|arr| {
        !arr.is_empty()
            && arr
                .iter()
                .all(|item| item.as_str().is_some_and(|s| !s.trim().is_empty()))
    });
    if ok {
        Ok(())
    } else {
        Err(ContentError::shape(path, "an array of non-empty strings"))
    }
}

/// Stars must be a true JSON integer in [1,5]; floats (even `4.0`), string
/// numerals and out-of-range integers all fail with the same message.
fn require_stars(value: Option<&Value>, path: &str) -> Result<(), ContentError> {
    let stars = value.and_then(Value::as_i64);
    match stars {
        Some(n) if (1..=5).contains(&n) => Ok(()),
        _ => Err(ContentError::shape(path, "an integer between 1 and 5")),
    }
}
