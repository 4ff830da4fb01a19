//! Locale-explicit text collation
//!
//! Sorting and free-text search never consult the process environment: every
//! comparison goes through a [`Collator`] built from an explicit [`Locale`], so
//! the same input orders identically on every machine.
//!
//! Comparison is two-level. The primary key folds case, strips diacritics
//! (after NFKD decomposition) and expands ligatures; the locale decides which
//! accented letters are distinct letters of the alphabet instead of variants.
//! When primary keys tie, the original strings are compared code point by code
//! point so that distinct strings never compare equal.

use crate::core::error::ConfigError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// A BCP 47 style language tag reduced to language and optional region
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Locale {
    language: String,
    region: Option<String>,
}

impl Locale {
    /// Language subtag, lowercase
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Region subtag, uppercase
    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            region: None,
        }
    }
}

impl FromStr for Locale {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        static TAG_REGEX: OnceLock<Regex> = OnceLock::new();
        let regex = TAG_REGEX.get_or_init(|| {
            Regex::new(r"^([A-Za-z]{2,3})(?:[-_]([A-Za-z]{2}))?$").expect("locale pattern is valid")
        });

        let captures = regex
            .captures(s.trim())
            .ok_or_else(|| ConfigError::InvalidLocale {
                locale: s.to_string(),
            })?;

        Ok(Self {
            language: captures[1].to_ascii_lowercase(),
            region: captures.get(2).map(|m| m.as_str().to_ascii_uppercase()),
        })
    }
}

impl TryFrom<String> for Locale {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Locale> for String {
    fn from(locale: Locale) -> Self {
        locale.to_string()
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.region {
            Some(region) => write!(f, "{}-{}", self.language, region),
            None => f.write_str(&self.language),
        }
    }
}

/// Letters a locale treats as separate letters sorted after `z`
fn tailored_letters(language: &str) -> &'static [char] {
    match language {
        "sv" | "fi" => &['å', 'ä', 'ö'],
        "da" | "nb" | "nn" | "no" => &['æ', 'ø', 'å'],
        _ => &[],
    }
}

/// Compares and folds text for one explicit locale
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collator {
    locale: Locale,
    tailored: &'static [char],
}

impl Collator {
    pub fn new(locale: Locale) -> Self {
        let tailored = tailored_letters(locale.language());
        Self { locale, tailored }
    }

    pub fn locale(&self) -> &Locale {
        &self.locale
    }

    /// Primary collation key, also used for case and accent insensitive search
    pub fn fold(&self, text: &str) -> String {
        let mut key = String::with_capacity(text.len());

        // compose first so decomposed input still hits the tailored letters
        for ch in text.nfc().flat_map(char::to_lowercase) {
            if let Some(rank) = self.tailored.iter().position(|&t| t == ch) {
                // Private use code points sort after every Latin letter
                key.push(char::from_u32(0xE000 + rank as u32).unwrap_or(ch));
                continue;
            }
            match ch {
                'ß' => key.push_str("ss"),
                'æ' => key.push_str("ae"),
                'œ' => key.push_str("oe"),
                'ø' => key.push('o'),
                'đ' => key.push('d'),
                'ł' => key.push('l'),
                _ => key.extend(ch.to_string().nfkd().filter(|c| !is_combining_mark(*c))),
            }
        }

        key
    }

    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        self.fold(a).cmp(&self.fold(b)).then_with(|| a.cmp(b))
    }

    /// Whether `needle` occurs in `haystack` under primary-strength folding
    pub fn contains(&self, haystack: &str, needle: &str) -> bool {
        self.fold(haystack).contains(&self.fold(needle))
    }
}

impl Default for Collator {
    fn default() -> Self {
        Self::new(Locale::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collator(tag: &str) -> Collator {
        Collator::new(tag.parse().expect("valid locale"))
    }

    #[test]
    fn test_locale_parsing() {
        let locale: Locale = "pt_br".parse().expect("valid locale");
        assert_eq!(locale.language(), "pt");
        assert_eq!(locale.region(), Some("BR"));
        assert_eq!(locale.to_string(), "pt-BR");
    }

    #[test]
    fn test_invalid_locale_rejected() {
        assert!("".parse::<Locale>().is_err());
        assert!("english".parse::<Locale>().is_err());
        assert!("en-US-posix".parse::<Locale>().is_err());
    }

    #[test]
    fn test_case_and_accent_insensitive_primary() {
        let c = collator("en");
        assert_eq!(c.fold("Élan"), c.fold("elan"));
        assert_eq!(c.fold("Straße"), "strasse");
    }

    #[test]
    fn test_tailored_letters_match_decomposed_input() {
        let c = collator("sv");
        assert_eq!(c.fold("O\u{308}dland"), c.fold("Ödland"));
        assert_eq!(c.compare("O\u{308}dland", "Zeta"), Ordering::Greater);
        assert_eq!(c.compare("Odla", "O\u{308}dland"), Ordering::Less);
    }

    #[test]
    fn test_distinct_strings_never_equal() {
        let c = collator("en");
        assert_ne!(c.compare("Elan", "elan"), Ordering::Equal);
        assert_eq!(c.compare("elan", "elan"), Ordering::Equal);
    }

    #[test]
    fn test_root_orders_accented_with_base_letter() {
        let c = collator("en");
        assert_eq!(c.compare("Ödland", "Zebra"), Ordering::Less);
    }

    #[test]
    fn test_swedish_orders_o_umlaut_after_z() {
        let c = collator("sv");
        assert_eq!(c.compare("Ödland", "Zebra"), Ordering::Greater);
        assert_eq!(c.compare("Åsa", "Ödland"), Ordering::Less);
    }

    #[test]
    fn test_contains_ignores_case_and_accents() {
        let c = collator("fr");
        assert!(c.contains("Sœur Mary", "soeur"));
        assert!(c.contains("Café Noir", "CAFE"));
        assert!(!c.contains("Café Noir", "tea"));
    }

    #[test]
    fn test_locale_serde_as_string() {
        let locale: Locale = serde_json::from_str("\"de-DE\"").expect("deserialize");
        assert_eq!(serde_json::to_string(&locale).expect("serialize"), "\"de-DE\"");
        assert!(serde_json::from_str::<Locale>("\"not a locale\"").is_err());
    }
}
