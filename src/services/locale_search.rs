use serde::Serialize;
use serde_json::Value;

use crate::error::{CoreError, CoreResult};
use crate::model::edit::parse_locales;
use crate::model::language::{display_name, LOCALE_NAMES};
use crate::services::context::Context;

/// Keyword searches stop after this many matches.
pub const KEYWORD_RESULT_LIMIT: usize = 8;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocaleQuery {
    pub keyword: String,
    /// Exact locale ids. Takes precedence over `keyword`.
    pub values: Vec<String>,
    pub only_supported: bool,
    /// With `only_supported`, whether the source locale may appear.
    pub include_current_locale: bool,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct LocaleMatch {
    pub id: String,
    pub name: String,
}

impl LocaleQuery {
    pub fn parse(ctx: &Context, payload: &Value) -> CoreResult<Self> {
        let keyword = match payload.get("keyword") {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.trim().to_string(),
            Some(_) => return Err(CoreError::validation("payload.keyword must be a string")),
        };

        let known: Vec<String> = known_locales(ctx).into_iter().map(|(id, _)| id).collect();
        let values = parse_locales(
            payload.get("value").unwrap_or(&Value::Null),
            &known,
            || "payload.value".to_string(),
        )?;

        Ok(LocaleQuery {
            keyword,
            values,
            only_supported: flag(payload, "only_supported")?,
            include_current_locale: flag(payload, "include_current_locale")?,
        })
    }
}

fn flag(payload: &Value, field: &str) -> CoreResult<bool> {
    match payload.get(field) {
        None | Some(Value::Null) => Ok(false),
        Some(Value::Bool(b)) => Ok(*b),
        Some(_) => Err(CoreError::validation(format!("payload.{field} must be a boolean"))),
    }
}

/// Every locale the admin can pick: the built-in table, then accepted
/// locales missing from it under their own id.
pub fn known_locales(ctx: &Context) -> Vec<(String, String)> {
    let mut all: Vec<(String, String)> = LOCALE_NAMES
        .iter()
        .map(|(id, name)| (id.to_string(), name.to_string()))
        .collect();

    for locale in ctx.accepted_locales() {
        if display_name(locale).is_none() {
            all.push((locale.clone(), locale.clone()));
        }
    }
    all
}

/// Matches by exact id when `values` is set, else by a case-insensitive
/// substring of the display name. An empty query matches nothing.
pub fn search(ctx: &Context, query: &LocaleQuery) -> Vec<LocaleMatch> {
    let source = ctx.settings.source_locale.as_str();
    let keyword = query.keyword.to_lowercase();

    let matches = known_locales(ctx)
        .into_iter()
        .filter(|(id, _)| {
            if !query.only_supported {
                return true;
            }
            if id == source {
                return query.include_current_locale;
            }
            ctx.settings.is_accepted(id)
        })
        .filter(|(id, name)| {
            if !query.values.is_empty() {
                query.values.contains(id)
            } else if !keyword.is_empty() {
                name.to_lowercase().contains(&keyword)
            } else {
                false
            }
        })
        .map(|(id, name)| LocaleMatch { id, name });

    if keyword.is_empty() {
        matches.collect()
    } else {
        matches.take(KEYWORD_RESULT_LIMIT).collect()
    }
}
