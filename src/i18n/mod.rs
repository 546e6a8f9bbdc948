//! Translation catalogs
//!
//! One nested YAML document per locale, flattened at load time into dotted
//! keys (`about.features.guides.title`). Lookups fall back to English and
//! then to the key itself, so a missing string shows up on the page instead
//! of breaking it.

use anyhow::{bail, Context, Result};
use serde_yaml::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

const EN_SOURCE: &str = include_str!("../../locales/en.yaml");
const AR_SOURCE: &str = include_str!("../../locales/ar.yaml");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Locale {
    En,
    Ar,
}

impl Locale {
    pub const ALL: [Locale; 2] = [Locale::En, Locale::Ar];

    pub fn code(self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Ar => "ar",
        }
    }

    /// Name of the language in itself, for the language switcher.
    pub fn native_name(self) -> &'static str {
        match self {
            Locale::En => "English",
            Locale::Ar => "العربية",
        }
    }

    pub fn is_rtl(self) -> bool {
        matches!(self, Locale::Ar)
    }

    /// Value for the `dir` attribute.
    pub fn dir(self) -> &'static str {
        if self.is_rtl() {
            "rtl"
        } else {
            "ltr"
        }
    }

    /// The locale the switcher offers.
    pub fn other(self) -> Locale {
        match self {
            Locale::En => Locale::Ar,
            Locale::Ar => Locale::En,
        }
    }

    /// Pick the column matching this locale from a bilingual pair.
    pub fn pick<'a>(self, en: &'a str, ar: &'a str) -> &'a str {
        match self {
            Locale::En => en,
            Locale::Ar => ar,
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported locale: {0}")]
pub struct UnknownLocale(pub String);

impl FromStr for Locale {
    type Err = UnknownLocale;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "en" => Ok(Locale::En),
            "ar" => Ok(Locale::Ar),
            other => Err(UnknownLocale(other.to_string())),
        }
    }
}

/// The bilingual column matching `locale`, falling back to English when the
/// Arabic value is blank.
pub fn localized<'a>(locale: Locale, en: &'a str, ar: &'a str) -> &'a str {
    let picked = locale.pick(en, ar);
    if picked.trim().is_empty() {
        en
    } else {
        picked
    }
}

/// Flattened messages for one locale.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    messages: BTreeMap<String, String>,
}

impl Catalog {
    /// Parse a nested YAML catalog. Scalars become messages; mappings nest
    /// with `.`; sequences are addressed by index.
    pub fn parse(source: &str) -> Result<Self> {
        let root: Value = serde_yaml::from_str(source).context("Failed to parse catalog YAML")?;
        let mut messages = BTreeMap::new();
        match root {
            Value::Mapping(_) => flatten("", &root, &mut messages)?,
            Value::Null => {}
            _ => bail!("catalog root must be a mapping"),
        }
        Ok(Self { messages })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.messages.get(key).map(String::as_str)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.messages.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

fn flatten(prefix: &str, value: &Value, out: &mut BTreeMap<String, String>) -> Result<()> {
    let join = |key: &str| {
        if prefix.is_empty() {
            key.to_string()
        } else {
            format!("{prefix}.{key}")
        }
    };

    match value {
        Value::Mapping(map) => {
            for (k, v) in map {
                let key = match k {
                    Value::String(s) => s.clone(),
                    Value::Number(n) => n.to_string(),
                    Value::Bool(b) => b.to_string(),
                    other => bail!("unsupported catalog key under '{prefix}': {other:?}"),
                };
                flatten(&join(&key), v, out)?;
            }
        }
        Value::Sequence(items) => {
            for (i, v) in items.iter().enumerate() {
                flatten(&join(&i.to_string()), v, out)?;
            }
        }
        Value::String(s) => {
            out.insert(prefix.to_string(), s.clone());
        }
        Value::Number(n) => {
            out.insert(prefix.to_string(), n.to_string());
        }
        Value::Bool(b) => {
            out.insert(prefix.to_string(), b.to_string());
        }
        Value::Null => {
            out.insert(prefix.to_string(), String::new());
        }
        Value::Tagged(tagged) => flatten(prefix, &tagged.value, out)?,
    }
    Ok(())
}

/// Both catalogs, indexed by locale.
#[derive(Debug, Clone)]
pub struct Translations {
    en: Catalog,
    ar: Catalog,
}

impl Translations {
    /// The catalogs compiled into the binary.
    pub fn embedded() -> Result<Self> {
        Self::from_sources(EN_SOURCE, AR_SOURCE)
    }

    pub fn from_sources(en: &str, ar: &str) -> Result<Self> {
        Ok(Self {
            en: Catalog::parse(en).context("locale en")?,
            ar: Catalog::parse(ar).context("locale ar")?,
        })
    }

    pub fn catalog(&self, locale: Locale) -> &Catalog {
        match locale {
            Locale::En => &self.en,
            Locale::Ar => &self.ar,
        }
    }

    /// Message for `key` in `locale`, falling back to English, then to the
    /// key itself.
    pub fn t<'a>(&'a self, locale: Locale, key: &'a str) -> &'a str {
        if let Some(msg) = self.catalog(locale).get(key) {
            return msg;
        }
        if let Some(msg) = self.en.get(key) {
            tracing::debug!("[i18n] [fallback] locale={} key={}", locale, key);
            return msg;
        }
        tracing::debug!("[i18n] [missing] key={}", key);
        key
    }

    /// Keys present in one catalog but not the other, as `locale:key`.
    pub fn mismatched_keys(&self) -> Vec<String> {
        let mut out: Vec<String> = self
            .en
            .keys()
            .filter(|k| self.ar.get(k).is_none())
            .map(|k| format!("ar:{k}"))
            .collect();
        out.extend(
            self.ar
                .keys()
                .filter(|k| self.en.get(k).is_none())
                .map(|k| format!("en:{k}")),
        );
        out
    }
}
