use serde_json::Value;

use super::{App, Command};
use crate::error::{CoreError, CoreResult};
use crate::model::edit::parse_locales;

pub fn handle(app: &App, cmd: Command, payload: &Value) -> CoreResult<Value> {
    match cmd {
        Command::AutoTranslateStart => {
            let only_draft = match payload.get("only_draft") {
                None | Some(Value::Null) => true,
                Some(Value::Bool(b)) => *b,
                Some(_) => return Err(CoreError::validation("payload.only_draft must be a boolean")),
            };
            let selected = parse_locales(
                payload.get("selected_locales").unwrap_or(&Value::Null),
                app.ctx.accepted_locales(),
                || "payload.selected_locales".to_string(),
            )?;

            // Detached: progress is observed through auto_translate.status.
            let _worker = app
                .job
                .start(&app.scheduler, app.translator.clone(), only_draft, selected)?;
            report(app)
        }

        Command::AutoTranslateStop => {
            app.job.stop(&app.scheduler)?;
            report(app)
        }

        Command::AutoTranslateStatus => report(app),

        Command::AutoTranslateSettings => Ok(serde_json::to_value(app.job.get_data()?)?),

        _ => Err(CoreError::validation("unknown command")),
    }
}

fn report(app: &App) -> CoreResult<Value> {
    Ok(serde_json::to_value(app.job.status_report()?)?)
}
