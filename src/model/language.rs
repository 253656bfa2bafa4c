/// Locales the admin UI can offer, with English display names.
pub const LOCALE_NAMES: &[(&str, &str)] = &[
    ("ar", "Arabic"),
    ("az", "Azerbaijani"),
    ("bg_BG", "Bulgarian"),
    ("bn_BD", "Bengali (Bangladesh)"),
    ("bs_BA", "Bosnian"),
    ("ca", "Catalan"),
    ("cs_CZ", "Czech"),
    ("da_DK", "Danish"),
    ("de_CH", "German (Switzerland)"),
    ("de_DE", "German"),
    ("el", "Greek"),
    ("en_AU", "English (Australia)"),
    ("en_CA", "English (Canada)"),
    ("en_GB", "English (UK)"),
    ("en_US", "English (United States)"),
    ("es_ES", "Spanish (Spain)"),
    ("es_MX", "Spanish (Mexico)"),
    ("et", "Estonian"),
    ("fa_IR", "Persian"),
    ("fi", "Finnish"),
    ("fr_CA", "French (Canada)"),
    ("fr_FR", "French (France)"),
    ("he_IL", "Hebrew"),
    ("hi_IN", "Hindi"),
    ("hr", "Croatian"),
    ("hu_HU", "Hungarian"),
    ("hy", "Armenian"),
    ("id_ID", "Indonesian"),
    ("it_IT", "Italian"),
    ("ja", "Japanese"),
    ("ka_GE", "Georgian"),
    ("kk", "Kazakh"),
    ("ko_KR", "Korean"),
    ("lt_LT", "Lithuanian"),
    ("lv", "Latvian"),
    ("ms_MY", "Malay"),
    ("nb_NO", "Norwegian (Bokmål)"),
    ("nl_NL", "Dutch"),
    ("pl_PL", "Polish"),
    ("pt_BR", "Portuguese (Brazil)"),
    ("pt_PT", "Portuguese (Portugal)"),
    ("ro_RO", "Romanian"),
    ("ru_RU", "Russian"),
    ("sk_SK", "Slovak"),
    ("sl_SI", "Slovenian"),
    ("sq", "Albanian"),
    ("sr_RS", "Serbian"),
    ("sv_SE", "Swedish"),
    ("th", "Thai"),
    ("tr_TR", "Turkish"),
    ("uk", "Ukrainian"),
    ("ur", "Urdu"),
    ("uz_UZ", "Uzbek"),
    ("vi", "Vietnamese"),
    ("zh_CN", "Chinese (China)"),
    ("zh_HK", "Chinese (Hong Kong)"),
    ("zh_TW", "Chinese (Taiwan)"),
];

pub fn display_name(locale: &str) -> Option<&'static str> {
    LOCALE_NAMES
        .iter()
        .find(|(id, _)| *id == locale)
        .map(|(_, name)| *name)
}
