use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{CoreError, CoreResult};
use crate::model::settings::Settings;

const SETTINGS_FILE: &str = "settings.json";

/// Loads settings from the process environment.
pub fn load() -> CoreResult<Settings> {
    load_with(|key| std::env::var(key).ok())
}

/// Optional JSON file first, then `POLYGLOT_*` overrides from `env`.
pub fn load_with(env: impl Fn(&str) -> Option<String>) -> CoreResult<Settings> {
    let var = |key: &str| env(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

    let data_dir = var("POLYGLOT_DATA_DIR").map(PathBuf::from);
    let config_path = match var("POLYGLOT_CONFIG") {
        Some(p) => PathBuf::from(p),
        None => data_dir
            .clone()
            .unwrap_or_else(|| Settings::default().data_dir)
            .join(SETTINGS_FILE),
    };

    let mut settings = read_file(&config_path)?.unwrap_or_default();

    if let Some(dir) = data_dir {
        settings.data_dir = dir;
    }
    if let Some(list) = var("POLYGLOT_ACCEPTED_LOCALES") {
        settings.accepted_locales = list
            .split(',')
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect();
    }
    if let Some(v) = var("POLYGLOT_SOURCE_LOCALE") {
        settings.source_locale = v;
    }
    if let Some(v) = var("POLYGLOT_PROVIDER") {
        settings.provider = v.to_lowercase();
    }
    if let Some(v) = var("POLYGLOT_API_KEY") {
        settings.api_key = v;
    }
    if let Some(v) = var("POLYGLOT_MODEL") {
        settings.model = v;
    }
    if let Some(v) = var("POLYGLOT_TRANSLATE_DELAY_MS") {
        settings.translate_delay_ms = v.parse().map_err(|_| {
            CoreError::Config(format!("POLYGLOT_TRANSLATE_DELAY_MS must be a number, got `{v}`"))
        })?;
    }
    if let Some(v) = var("POLYGLOT_ADMIN_TOKEN") {
        settings.admin_token = Some(v);
    }

    validate(&mut settings)?;
    info!(
        data_dir = %settings.data_dir.display(),
        locales = settings.accepted_locales.len(),
        provider = %settings.provider,
        "settings loaded"
    );
    Ok(settings)
}

fn read_file(path: &Path) -> CoreResult<Option<Settings>> {
    let text = match std::fs::read_to_string(path) {
        Ok(t) => t,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no settings file");
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };

    serde_json::from_str(&text)
        .map(Some)
        .map_err(|e| CoreError::Config(format!("{}: {e}", path.display())))
}

fn validate(settings: &mut Settings) -> CoreResult<()> {
    let locale_re = Regex::new(r"^[a-z]{2,3}(_[A-Za-z0-9]{2,4})?$")
        .map_err(|e| CoreError::Config(e.to_string()))?;

    let mut seen = Vec::with_capacity(settings.accepted_locales.len());
    for locale in &settings.accepted_locales {
        if !locale_re.is_match(locale) {
            return Err(CoreError::Config(format!("invalid locale `{locale}`")));
        }
        if !seen.contains(locale) {
            seen.push(locale.clone());
        }
    }
    settings.accepted_locales = seen;

    if settings.accepted_locales.is_empty() {
        return Err(CoreError::Config("accepted_locales must not be empty".to_string()));
    }
    if !locale_re.is_match(&settings.source_locale) {
        return Err(CoreError::Config(format!(
            "invalid source locale `{}`",
            settings.source_locale
        )));
    }
    if settings.domain.trim().is_empty() || settings.domain.contains(['/', '\\']) {
        return Err(CoreError::Config(format!("invalid domain `{}`", settings.domain)));
    }
    if settings.admin_token.as_deref().is_some_and(|t| t.trim().is_empty()) {
        settings.admin_token = None;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::fs;
    use tempfile::TempDir;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn env_only() {
        let dir = TempDir::new().unwrap();
        let data_dir = dir.path().to_string_lossy().to_string();
        let settings = load_with(env_of(&[
            ("POLYGLOT_DATA_DIR", data_dir.as_str()),
            ("POLYGLOT_ACCEPTED_LOCALES", "en_US, tr_TR,en_US"),
            ("POLYGLOT_PROVIDER", "Mock"),
            ("POLYGLOT_TRANSLATE_DELAY_MS", "0"),
        ]))
        .unwrap();

        assert_eq!(settings.data_dir, dir.path());
        assert_eq!(settings.accepted_locales, vec!["en_US", "tr_TR"]);
        assert_eq!(settings.provider, "mock");
        assert_eq!(settings.translate_delay_ms, 0);
        assert_eq!(settings.source_locale, "en_US");
        assert_eq!(settings.admin_token, None);
    }

    #[test]
    fn file_then_env_overrides() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(SETTINGS_FILE),
            r#"{ "accepted_locales": ["en_US", "de_DE"], "model": "gpt-4o-mini", "admin_token": "s3cret" }"#,
        )
        .unwrap();

        let data_dir = dir.path().to_string_lossy().to_string();
        let settings = load_with(env_of(&[
            ("POLYGLOT_DATA_DIR", data_dir.as_str()),
            ("POLYGLOT_MODEL", "deepseek-chat"),
        ]))
        .unwrap();

        assert_eq!(settings.accepted_locales, vec!["en_US", "de_DE"]);
        assert_eq!(settings.model, "deepseek-chat");
        assert_eq!(settings.admin_token.as_deref(), Some("s3cret"));
    }

    #[test]
    fn explicit_config_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.json");
        fs::write(&path, r#"{ "accepted_locales": ["fr_FR"], "domain": "shop" }"#).unwrap();

        let settings = load_with(env_of(&[
            ("POLYGLOT_CONFIG", path.to_str().unwrap()),
            ("POLYGLOT_DATA_DIR", dir.path().to_str().unwrap()),
        ]))
        .unwrap();
        assert_eq!(settings.domain, "shop");
        assert_eq!(settings.accepted_locales, vec!["fr_FR"]);
    }

    #[test]
    fn rejects_bad_values() {
        let dir = TempDir::new().unwrap();
        let data_dir = dir.path().to_string_lossy().to_string();

        let cases: [&[(&str, &str)]; 4] = [
            &[],
            &[("POLYGLOT_ACCEPTED_LOCALES", "en_US,../etc")],
            &[("POLYGLOT_ACCEPTED_LOCALES", "en_US"), ("POLYGLOT_SOURCE_LOCALE", "English")],
            &[("POLYGLOT_ACCEPTED_LOCALES", "en_US"), ("POLYGLOT_TRANSLATE_DELAY_MS", "soon")],
        ];

        for case in cases {
            let mut pairs = vec![("POLYGLOT_DATA_DIR", data_dir.as_str())];
            pairs.extend_from_slice(case);
            assert!(matches!(load_with(env_of(&pairs)), Err(CoreError::Config(_))));
        }
    }

    #[test]
    fn malformed_file_is_a_config_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(SETTINGS_FILE), "{ not json").unwrap();
        let data_dir = dir.path().to_string_lossy().to_string();
        assert!(matches!(
            load_with(env_of(&[("POLYGLOT_DATA_DIR", data_dir.as_str())])),
            Err(CoreError::Config(_))
        ));
    }
}
