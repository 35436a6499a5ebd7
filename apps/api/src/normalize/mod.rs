//! Field mapping for loosely-keyed records.
//!
//! Legacy exports (flat JSON file, Mongo, Supabase) and upstream feeds disagree on
//! key names and casing. Everything untyped that enters the service goes through
//! these helpers before it touches a typed struct.

use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;
use thiserror::Error;

use crate::models::job::JobListing;

pub const NAME_ALIASES: &[&str] = &["full_name", "fullName", "name", "username"];
pub const HEADLINE_ALIASES: &[&str] = &["headline", "title", "jobTitle"];
pub const LOCATION_ALIASES: &[&str] = &["location", "city"];

const ID_ALIASES: &[&str] = &["id", "_id.$oid", "_id", "user_id", "userId"];
const EMAIL_ALIASES: &[&str] = &["email", "emailAddress", "email_address"];
const PASSWORD_ALIASES: &[&str] = &["password_hash", "passwordHash", "password", "hash"];
const CREATED_ALIASES: &[&str] = &["created_at", "createdAt", "registered_at"];

#[derive(Debug, Error, PartialEq)]
pub enum MappingError {
    #[error("record is not a JSON object")]
    NotAnObject,

    #[error("missing required field '{0}'")]
    MissingField(&'static str),

    #[error("invalid email address '{0}'")]
    InvalidEmail(String),
}

/// A user record from one of the legacy stores, reconciled to a single shape.
#[derive(Debug, Clone, PartialEq)]
pub struct LegacyUser {
    pub legacy_id: Option<String>,
    pub email: String,
    pub password_hash: String,
    pub full_name: Option<String>,
    pub headline: Option<String>,
    pub location: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Profile fields pulled from a loosely-keyed update body. `None` means "leave unchanged".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfilePatch {
    pub full_name: Option<String>,
    pub headline: Option<String>,
    pub location: Option<String>,
}

impl ProfilePatch {
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none() && self.headline.is_none() && self.location.is_none()
    }
}

/// Returns the first alias whose value is present and not null.
/// Aliases may be dotted paths (`_id.$oid`) into nested objects.
pub fn get_field<'a>(record: &'a Value, aliases: &[&str]) -> Option<&'a Value> {
    aliases
        .iter()
        .find_map(|alias| lookup(record, alias).filter(|v| !v.is_null()))
}

/// Like `get_field`, restricted to non-blank strings. Numbers are stringified.
pub fn get_str(record: &Value, aliases: &[&str]) -> Option<String> {
    aliases.iter().find_map(|alias| match lookup(record, alias)? {
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Reads a list of strings stored either as a JSON array or as one
/// comma/newline separated string.
pub fn get_string_list(record: &Value, aliases: &[&str]) -> Vec<String> {
    let items: Vec<String> = match get_field(record, aliases) {
        Some(Value::Array(arr)) => arr
            .iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect(),
        Some(Value::String(s)) => s.split([',', '\n']).map(String::from).collect(),
        _ => Vec::new(),
    };

    let mut out: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        let item = item.trim();
        if !item.is_empty() && !out.iter().any(|o| o.eq_ignore_ascii_case(item)) {
            out.push(item.to_string());
        }
    }
    out
}

/// Trims and lowercases an email, rejecting anything without a plausible
/// `local@domain.tld` shape.
pub fn normalize_email(raw: &str) -> Option<String> {
    let email = raw.trim().to_lowercase();
    let (local, domain) = email.split_once('@')?;
    let plausible = !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.chars().any(char::is_whitespace);
    plausible.then_some(email)
}

/// Maps a user record from any of the legacy stores.
pub fn map_legacy_user(record: &Value) -> Result<LegacyUser, MappingError> {
    if !record.is_object() {
        return Err(MappingError::NotAnObject);
    }

    let raw_email = get_str(record, EMAIL_ALIASES).ok_or(MappingError::MissingField("email"))?;
    let email = normalize_email(&raw_email).ok_or(MappingError::InvalidEmail(raw_email))?;
    let password_hash =
        get_str(record, PASSWORD_ALIASES).ok_or(MappingError::MissingField("password_hash"))?;

    Ok(LegacyUser {
        legacy_id: get_str(record, ID_ALIASES),
        email,
        password_hash,
        full_name: get_str(record, NAME_ALIASES),
        headline: get_str(record, HEADLINE_ALIASES),
        location: get_str(record, LOCATION_ALIASES),
        created_at: get_field(record, CREATED_ALIASES).and_then(parse_timestamp),
    })
}

pub fn map_profile_patch(record: &Value) -> ProfilePatch {
    ProfilePatch {
        full_name: get_str(record, NAME_ALIASES),
        headline: get_str(record, HEADLINE_ALIASES),
        location: get_str(record, LOCATION_ALIASES),
    }
}

/// Maps one item of the remote jobs feed. Items without an id or title are dropped.
pub fn map_remote_job(record: &Value) -> Option<JobListing> {
    Some(JobListing {
        id: get_str(record, &["id", "job_id"])?,
        title: get_str(record, &["title", "position"])?,
        company: get_str(record, &["company_name", "company"])
            .unwrap_or_else(|| "Unknown company".to_string()),
        location: get_str(record, &["candidate_required_location", "location"]),
        job_type: get_str(record, &["job_type", "type"]),
        category: get_str(record, &["category"]),
        salary: get_str(record, &["salary"]),
        url: get_str(record, &["url", "job_url"]),
        published_at: get_str(record, &["publication_date", "date"]),
        tags: get_string_list(record, &["tags"]),
        description: get_str(record, &["description"]).unwrap_or_default(),
    })
}

fn lookup<'a>(record: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(record, |value, segment| value.get(segment))
}

/// Accepts RFC 3339 strings, epoch milliseconds, and Mongo extended JSON
/// (`{"$date": "..."}`, `{"$date": {"$numberLong": "..."}}`).
fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s.trim())
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Value::Number(n) => n
            .as_i64()
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
        Value::Object(_) => {
            let inner = value.get("$date")?;
            match inner.get("$numberLong").and_then(Value::as_str) {
                Some(ms) => ms
                    .parse::<i64>()
                    .ok()
                    .and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
                None => parse_timestamp(inner),
            }
        }
        _ => None,
    }
}
