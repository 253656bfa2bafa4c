use serde_json::{json, Value};

use super::{App, Command};
use crate::error::{CoreError, CoreResult};
use crate::model::edit::BatchRequest;
use crate::services::locale_search::{self, LocaleQuery};

pub fn handle(app: &App, cmd: Command, payload: &Value) -> CoreResult<Value> {
    match cmd {
        Command::LanguageLocales => Ok(json!({
            "accepted_locales": app.ctx.accepted_locales(),
            "source_locale": app.ctx.settings.source_locale,
        })),

        Command::LanguageItems => {
            let page = match payload.get("page") {
                None | Some(Value::Null) => 1,
                Some(v) => v
                    .as_u64()
                    .and_then(|p| usize::try_from(p).ok())
                    .ok_or_else(|| CoreError::validation("payload.page must be a positive integer"))?
                    .max(1),
            };
            let items = app.coordinator.language_items(page)?;
            Ok(json!({ "items": items, "page": page }))
        }

        Command::LanguageText => {
            let locale = required_str(payload, "target_locale")?;
            let source = required_str(payload, "default_text")?;
            let text = app.coordinator.language_text(locale, source)?;
            Ok(json!({ "text": text }))
        }

        Command::LanguageSave => {
            let request = BatchRequest::parse(payload, app.ctx.accepted_locales())?;
            app.coordinator.apply(&request)?;
            Ok(json!({}))
        }

        Command::LanguageSearch => {
            let query = LocaleQuery::parse(&app.ctx, payload)?;
            Ok(serde_json::to_value(locale_search::search(&app.ctx, &query))?)
        }

        _ => Err(CoreError::validation("unknown command")),
    }
}

fn required_str<'a>(payload: &'a Value, field: &str) -> CoreResult<&'a str> {
    payload
        .get(field)
        .and_then(|v| v.as_str())
        .ok_or_else(|| CoreError::validation(format!("payload.{field} is required")))
}
