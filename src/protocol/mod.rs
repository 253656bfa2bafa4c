use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::{CoreError, CoreResult};
use crate::services::auto_translate::AutoTranslate;
use crate::services::context::Context;
use crate::services::coordinator::Coordinator;
use crate::services::provider::{self, Translator};
use crate::services::scheduler::JobScheduler;
use crate::services::settings;
use crate::services::storage::FsStorage;

mod auth;
mod auto_translate;
mod command;
mod language;

use auth::{AuthGate, TokenGate};
use command::Command;

fn get_cmd(req: &Value) -> &str {
    req.get("cmd").and_then(|v| v.as_str()).unwrap_or("")
}

fn get_id(req: &Value) -> Value {
    req.get("id").cloned().unwrap_or(Value::Null)
}

fn get_payload(req: &Value) -> &Value {
    static EMPTY: Value = Value::Null;
    req.get("payload").unwrap_or(&EMPTY)
}

fn get_token(req: &Value) -> Option<&str> {
    req.get("token").and_then(|v| v.as_str())
}

fn ok(id: Value, payload: Value) -> String {
    json!({
        "id": id,
        "status": "ok",
        "payload": payload
    })
    .to_string()
}

fn err(id: Value, message: impl Into<String>) -> String {
    json!({
        "id": id,
        "status": "error",
        "message": message.into()
    })
    .to_string()
}

/// Long-lived handles behind the line protocol.
pub struct App {
    ctx: Context,
    coordinator: Coordinator,
    job: AutoTranslate,
    scheduler: JobScheduler,
    translator: Arc<dyn Translator>,
    gate: Box<dyn AuthGate>,
}

impl App {
    /// Settings from the environment, documents under the data directory.
    pub fn from_env() -> CoreResult<Self> {
        let settings = settings::load()?;
        let storage = FsStorage::new(settings.data_dir.clone())?;
        let translator =
            provider::from_settings(&settings).map_err(|e| CoreError::Config(e.to_string()))?;
        Ok(App::new(Context::new(Arc::new(storage), settings), translator))
    }

    pub fn new(ctx: Context, translator: Arc<dyn Translator>) -> Self {
        App {
            coordinator: Coordinator::new(ctx.clone()),
            job: AutoTranslate::new(ctx.clone()),
            scheduler: JobScheduler::new(),
            gate: Box::new(TokenGate::new(ctx.settings.admin_token.clone())),
            translator,
            ctx,
        }
    }

    pub fn handle(&self, input: &str) -> String {
        let req: Value = match serde_json::from_str(input) {
            Ok(v) => v,
            Err(_) => {
                return json!({
                    "status": "error",
                    "message": "invalid json"
                })
                .to_string();
            }
        };

        let id = get_id(&req);
        let cmd_str = get_cmd(&req);
        let payload = get_payload(&req);
        let cmd = Command::from(cmd_str);

        if !cmd.is_public() && !self.gate.is_authorized(get_token(&req)) {
            warn!(cmd = cmd_str, "unauthorized request");
            return err(id, CoreError::Unauthorized.to_string());
        }

        let result = match cmd {
            Command::Ping => Ok(json!({ "message": "polyglot-core alive" })),

            Command::LanguageLocales
            | Command::LanguageItems
            | Command::LanguageText
            | Command::LanguageSave
            | Command::LanguageSearch => language::handle(self, cmd, payload),

            Command::AutoTranslateStart
            | Command::AutoTranslateStop
            | Command::AutoTranslateStatus
            | Command::AutoTranslateSettings => auto_translate::handle(self, cmd, payload),

            Command::Unknown => return err(id, "unknown command"),
        };

        match result {
            Ok(payload) => ok(id, payload),
            Err(e) => {
                debug!(cmd = cmd_str, "request failed: {e}");
                err(id, e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::settings::Settings;
    use crate::services::context::testing;
    use crate::services::provider::{MockMode, MockTranslator};
    use crate::services::storage::MemoryStorage;
    use std::thread;
    use std::time::{Duration, Instant};

    fn app(locales: &[&str]) -> App {
        let (ctx, _) = testing::context(locales);
        App::new(ctx, Arc::new(MockTranslator::new(MockMode::Suffix)))
    }

    fn call(app: &App, cmd: &str, payload: Value) -> Value {
        let line = json!({ "id": 7, "cmd": cmd, "payload": payload }).to_string();
        serde_json::from_str(&app.handle(&line)).unwrap()
    }

    fn payload(resp: &Value) -> &Value {
        assert_eq!(resp["status"], "ok", "unexpected response: {resp}");
        &resp["payload"]
    }

    #[test]
    fn ping_and_unknown() {
        let app = app(&["en_US"]);
        let resp = call(&app, "ping", Value::Null);
        assert_eq!(resp["id"], 7);
        assert_eq!(payload(&resp)["message"], "polyglot-core alive");

        let resp = call(&app, "nope", Value::Null);
        assert_eq!(resp["status"], "error");
        assert_eq!(resp["message"], "unknown command");
    }

    #[test]
    fn invalid_json() {
        let app = app(&["en_US"]);
        let resp: Value = serde_json::from_str(&app.handle("{ nope")).unwrap();
        assert_eq!(resp["status"], "error");
        assert_eq!(resp["message"], "invalid json");
    }

    #[test]
    fn save_list_and_read_back() {
        let app = app(&["en_US", "tr_TR"]);

        let resp = call(
            &app,
            "language.save",
            json!({
                "changed_items": {
                    "Hello": { "en_US": "Hello", "tr_TR": "Merhaba", "is_new": true },
                    "Bye": {}
                }
            }),
        );
        payload(&resp);

        let resp = call(&app, "language.items", json!({ "page": 1 }));
        let items = payload(&resp)["items"].as_array().unwrap().clone();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["default_text"], "Bye");
        assert_eq!(items[0]["fill_state"], "empty");
        assert_eq!(items[1]["default_text"], "Hello");
        assert_eq!(items[1]["fill_state"], "filled");

        let resp = call(
            &app,
            "language.text",
            json!({ "target_locale": "tr_TR", "default_text": "Hello" }),
        );
        assert_eq!(payload(&resp)["text"], "Merhaba");

        let resp = call(&app, "language.locales", Value::Null);
        assert_eq!(payload(&resp)["accepted_locales"], json!(["en_US", "tr_TR"]));
    }

    #[test]
    fn validation_errors_are_reported() {
        let app = app(&["en_US"]);

        let resp = call(
            &app,
            "language.save",
            json!({ "changed_items": { "Hello": { "fr_FR": "Bonjour" } } }),
        );
        assert_eq!(resp["status"], "error");
        assert!(resp["message"].as_str().unwrap().contains("fr_FR"));

        let resp = call(&app, "language.text", json!({ "target_locale": "en_US" }));
        assert_eq!(resp["message"], "payload.default_text is required");
    }

    #[test]
    fn huge_page_is_an_empty_page() {
        let app = app(&["en_US"]);
        payload(&call(&app, "language.save", json!({ "changed_items": { "Hello": {} } })));

        let resp = call(&app, "language.items", json!({ "page": u64::MAX }));
        assert_eq!(payload(&resp)["items"], json!([]));

        let resp = call(&app, "language.items", json!({ "page": -1 }));
        assert_eq!(resp["message"], "payload.page must be a positive integer");
    }

    #[test]
    fn language_search() {
        let app = app(&["en_US", "tr_TR"]);

        let resp = call(
            &app,
            "language.search",
            json!({ "keyword": "turk", "only_supported": true }),
        );
        assert_eq!(payload(&resp), &json!([{ "id": "tr_TR", "name": "Turkish" }]));

        let resp = call(&app, "language.search", json!({ "value": ["xx_XX"] }));
        assert_eq!(resp["status"], "error");
    }

    #[test]
    fn admin_token_gates_everything_but_ping() {
        let storage = Arc::new(MemoryStorage::new());
        let settings = Settings {
            accepted_locales: vec!["en_US".into()],
            admin_token: Some("s3cret".into()),
            translate_delay_ms: 0,
            ..Settings::default()
        };
        let app = App::new(
            Context::new(storage, settings),
            Arc::new(MockTranslator::new(MockMode::Suffix)),
        );

        payload(&call(&app, "ping", Value::Null));

        let resp = call(&app, "language.locales", Value::Null);
        assert_eq!(resp["message"], "unauthorized");

        let line = json!({ "id": 1, "cmd": "language.locales", "payload": {}, "token": "s3cret" });
        let resp: Value = serde_json::from_str(&app.handle(&line.to_string())).unwrap();
        payload(&resp);

        let line = json!({ "id": 2, "cmd": "language.locales", "payload": {}, "token": "guess" });
        let resp: Value = serde_json::from_str(&app.handle(&line.to_string())).unwrap();
        assert_eq!(resp["message"], "unauthorized");

        // A token inside the payload does not count.
        let resp = call(&app, "language.locales", json!({ "token": "s3cret" }));
        assert_eq!(resp["message"], "unauthorized");
    }

    #[test]
    fn auto_translate_round_trip() {
        let app = app(&["en_US", "tr_TR"]);
        payload(&call(
            &app,
            "language.save",
            json!({ "changed_items": { "Hello": {} } }),
        ));

        let resp = call(
            &app,
            "auto_translate.start",
            json!({ "only_draft": true, "selected_locales": ["tr_TR"] }),
        );
        payload(&resp);

        let deadline = Instant::now() + Duration::from_secs(10);
        loop {
            let resp = call(&app, "auto_translate.status", Value::Null);
            if payload(&resp)["is_translating"] == false && !app.scheduler.is_active("translate") {
                assert_eq!(payload(&resp)["size"], json!({}));
                break;
            }
            assert!(Instant::now() < deadline, "worker did not finish");
            thread::sleep(Duration::from_millis(10));
        }

        let resp = call(
            &app,
            "language.text",
            json!({ "target_locale": "tr_TR", "default_text": "Hello" }),
        );
        assert_eq!(payload(&resp)["text"], "Hello_tr");

        let resp = call(&app, "auto_translate.settings", Value::Null);
        assert_eq!(
            payload(&resp),
            &json!({ "only_draft": true, "selected_locales": ["tr_TR"], "is_translating": false })
        );
    }

    #[test]
    fn start_with_nothing_to_translate_fails() {
        let app = app(&["en_US"]);
        let resp = call(&app, "auto_translate.start", json!({}));
        assert_eq!(resp["status"], "error");

        let resp = call(&app, "auto_translate.stop", Value::Null);
        assert_eq!(
            payload(&resp),
            &json!({ "is_translating": false, "size": {} })
        );
    }
}
