#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Ping,
    LanguageLocales,
    LanguageItems,
    LanguageText,
    LanguageSave,
    LanguageSearch,
    AutoTranslateStart,
    AutoTranslateStop,
    AutoTranslateStatus,
    AutoTranslateSettings,
    Unknown,
}

impl From<&str> for Command {
    fn from(s: &str) -> Self {
        match s {
            "ping" => Command::Ping,
            "language.locales" => Command::LanguageLocales,
            "language.items" => Command::LanguageItems,
            "language.text" => Command::LanguageText,
            "language.save" => Command::LanguageSave,
            "language.search" => Command::LanguageSearch,
            "auto_translate.start" => Command::AutoTranslateStart,
            "auto_translate.stop" => Command::AutoTranslateStop,
            "auto_translate.status" => Command::AutoTranslateStatus,
            "auto_translate.settings" => Command::AutoTranslateSettings,
            _ => Command::Unknown,
        }
    }
}

impl Command {
    /// Commands anyone may call without the admin token.
    pub fn is_public(self) -> bool {
        matches!(self, Command::Ping)
    }
}
