use serde_json::{Map, Value};

use crate::profile::{
    error::{ProfileError, malformed_response},
    types::GithubProfile,
};

pub const MAX_FIELD_CHARS: usize = 512;

/// Builds a [`GithubProfile`] from an untrusted API payload.
///
/// Only allow-listed fields survive. Strings are trimmed, stripped of control
/// characters and capped at [`MAX_FIELD_CHARS`]; blank optional fields become
/// `None`. URLs must be `https`.
pub fn sanitize_profile(payload: &Value) -> Result<GithubProfile, ProfileError> {
    let object = payload
        .as_object()
        .ok_or_else(|| malformed_response("profile payload is not a JSON object"))?;

    let login = optional_text(object, "login")
        .ok_or_else(|| malformed_response("profile payload is missing login"))?;
    let avatar_url = required_https_url(object, "avatar_url")?;
    let html_url = required_https_url(object, "html_url")?;

    Ok(GithubProfile {
        login,
        avatar_url,
        html_url,
        name: optional_text(object, "name"),
        bio: optional_text(object, "bio"),
        location: optional_text(object, "location"),
        company: optional_text(object, "company"),
    })
}

fn optional_text(object: &Map<String, Value>, field: &str) -> Option<String> {
    object
        .get(field)
        .and_then(Value::as_str)
        .map(clean_text)
        .filter(|text| !text.is_empty())
}

fn required_https_url(object: &Map<String, Value>, field: &str) -> Result<String, ProfileError> {
    let url = optional_text(object, field)
        .ok_or_else(|| malformed_response(format!("profile payload is missing {field}")))?;
    if !url.starts_with("https://") || url.chars().any(char::is_whitespace) {
        return Err(malformed_response(format!(
            "profile field {field} is not an https url"
        )));
    }
    Ok(url)
}

fn clean_text(raw: &str) -> String {
    raw.trim()
        .chars()
        .filter(|ch| !ch.is_control() || *ch == '\n')
        .take(MAX_FIELD_CHARS)
        .collect::<String>()
        .trim()
        .to_string()
}
