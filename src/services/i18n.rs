//! Interface translations
//!
//! Built-in string tables for the public site and the admin screens.

use crate::config::SUPPORTED_LANGUAGES;
use once_cell::sync::Lazy;
use std::collections::BTreeMap;

pub type Table = BTreeMap<&'static str, &'static str>;

static EN: Lazy<Table> = Lazy::new(|| {
    BTreeMap::from([
        ("nav.home", "Home"),
        ("nav.politics", "Politics"),
        ("nav.sports", "Sports"),
        ("nav.business", "Business"),
        ("nav.entertainment", "Entertainment"),
        ("nav.technology", "Technology"),
        ("nav.videos", "Videos"),
        ("nav.live", "Live"),
        ("breaking.label", "Breaking News"),
        ("search.placeholder", "Search news..."),
        ("newsletter.title", "Subscribe to our newsletter"),
        (
            "newsletter.description",
            "Get the latest news delivered to your inbox",
        ),
        ("newsletter.button", "Subscribe"),
        ("admin.dashboard", "Dashboard"),
        ("latest.news", "Latest News"),
        ("featured.articles", "Featured Articles"),
        ("live.streams", "Live Streams"),
        ("categories", "Categories"),
        ("date.format", "MMM d, yyyy"),
    ])
});

static HI: Lazy<Table> = Lazy::new(|| {
    BTreeMap::from([
        ("nav.home", "होम"),
        ("nav.politics", "राजनीति"),
        ("nav.sports", "खेल"),
        ("nav.business", "व्यापार"),
        ("nav.entertainment", "मनोरंजन"),
        ("nav.technology", "तकनीक"),
        ("nav.videos", "वीडियो"),
        ("nav.live", "लाइव"),
        ("breaking.label", "ब्रेकिंग न्यूज़"),
        ("search.placeholder", "समाचार खोजें..."),
        ("newsletter.title", "हमारे न्यूज़लेटर की सदस्यता लें"),
        (
            "newsletter.description",
            "ताज़ा समाचार सीधे अपने इनबॉक्स में पाएं",
        ),
        ("newsletter.button", "सदस्यता लें"),
        ("admin.dashboard", "डैशबोर्ड"),
        ("latest.news", "ताज़ा समाचार"),
        ("featured.articles", "विशेष लेख"),
        ("live.streams", "लाइव स्ट्रीम"),
        ("categories", "श्रेणियां"),
        ("date.format", "d MMM yyyy"),
    ])
});

/// Translation lookup with a configured fallback language
#[derive(Debug, Clone)]
pub struct I18nService {
    default_language: String,
}

impl I18nService {
    pub fn new(default_language: impl Into<String>) -> Self {
        let default_language = default_language.into();
        let default_language = if is_supported(&default_language) {
            default_language
        } else {
            "en".to_string()
        };
        Self { default_language }
    }

    pub fn default_language(&self) -> &str {
        &self.default_language
    }

    pub fn supported_languages(&self) -> &'static [&'static str] {
        SUPPORTED_LANGUAGES
    }

    /// The supported language closest to `lang`, or the default
    pub fn resolve<'a>(&'a self, lang: &'a str) -> &'a str {
        if is_supported(lang) {
            lang
        } else {
            &self.default_language
        }
    }

    /// Translate a key; a missing entry yields the key itself
    pub fn translate<'a>(&self, lang: &str, key: &'a str) -> &'a str {
        match table(self.resolve(lang)).get(key) {
            Some(value) => value,
            None => key,
        }
    }

    /// The whole table for a language
    pub fn translations(&self, lang: &str) -> &'static Table {
        table(self.resolve(lang))
    }
}

fn is_supported(lang: &str) -> bool {
    SUPPORTED_LANGUAGES.contains(&lang)
}

fn table(lang: &str) -> &'static Table {
    match lang {
        "hi" => &HI,
        _ => &EN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translate() {
        let i18n = I18nService::new("en");
        assert_eq!(i18n.translate("en", "nav.home"), "Home");
        assert_eq!(i18n.translate("hi", "nav.home"), "होम");
        assert_eq!(i18n.translate("hi", "breaking.label"), "ब्रेकिंग न्यूज़");
    }

    #[test]
    fn test_missing_key_falls_back_to_key() {
        let i18n = I18nService::new("en");
        assert_eq!(i18n.translate("hi", "footer.copyright"), "footer.copyright");
    }

    #[test]
    fn test_unknown_language_uses_default() {
        let i18n = I18nService::new("hi");
        assert_eq!(i18n.resolve("fr"), "hi");
        assert_eq!(i18n.translate("fr", "nav.live"), "लाइव");

        let fallback = I18nService::new("xx");
        assert_eq!(fallback.default_language(), "en");
    }

    #[test]
    fn test_tables_share_keys() {
        let en: Vec<_> = EN.keys().collect();
        let hi: Vec<_> = HI.keys().collect();
        assert_eq!(en, hi);
        assert_eq!(I18nService::new("en").supported_languages(), &["en", "hi"]);
    }
}
