//! Prompt and UI text catalog.
//!
//! Templates live in TOML tables addressed by dotted keys
//! (`vocabulary_builder.generate`) and use `{name}` placeholders. The English
//! catalog is compiled in; a locale directory can override it per key.

use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Value};
use thiserror::Error;

const BUILTIN_EN: &str = include_str!("../locales/en.toml");

#[derive(Error, Debug)]
pub enum LocaleError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Unknown text key: {0}")]
    UnknownKey(String),

    #[error("Missing parameter '{param}' for text key {key}")]
    MissingParam { key: String, param: String },
}

pub type Result<T> = std::result::Result<T, LocaleError>;

fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("valid placeholder regex"))
}

/// Text catalogs in lookup order: requested locale, fallback locale, built-in English
#[derive(Debug, Clone)]
pub struct Localization {
    locale: String,
    catalogs: Vec<toml::Table>,
}

impl Localization {
    /// Built-in English catalog only
    pub fn builtin() -> Result<Self> {
        Ok(Self {
            locale: "en".to_string(),
            catalogs: vec![BUILTIN_EN.parse::<toml::Table>()?],
        })
    }

    /// Layer `<dir>/<locale>.toml` and `<dir>/<fallback>.toml` over the
    /// built-in catalog. Missing files are skipped.
    pub fn load(dir: Option<&Path>, locale: &str, fallback_locale: &str) -> Result<Self> {
        let mut catalogs = Vec::new();

        if let Some(dir) = dir {
            let mut names = vec![locale];
            if fallback_locale != locale {
                names.push(fallback_locale);
            }
            for name in names {
                let path = dir.join(format!("{}.toml", name));
                if path.exists() {
                    let content = fs::read_to_string(&path)?;
                    catalogs.push(content.parse::<toml::Table>()?);
                    log::debug!("Loaded text catalog {:?}", path);
                } else {
                    log::debug!("No text catalog at {:?}", path);
                }
            }
        }

        catalogs.push(BUILTIN_EN.parse::<toml::Table>()?);
        Ok(Self {
            locale: locale.to_string(),
            catalogs,
        })
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    fn template(&self, key: &str) -> Option<&str> {
        self.catalogs.iter().find_map(|catalog| {
            let mut parts = key.split('.');
            let mut current = catalog.get(parts.next()?)?;
            for part in parts {
                current = current.as_table()?.get(part)?;
            }
            current.as_str()
        })
    }

    pub fn has_key(&self, key: &str) -> bool {
        self.template(key).is_some()
    }

    /// Render `key`, substituting `{name}` from `params`. Strings are inserted
    /// verbatim, other values as JSON.
    pub fn render(&self, key: &str, params: &Map<String, Value>) -> Result<String> {
        let template = self
            .template(key)
            .ok_or_else(|| LocaleError::UnknownKey(key.to_string()))?;

        let re = placeholder_regex();
        if let Some(missing) = re
            .captures_iter(template)
            .map(|caps| caps[1].to_string())
            .find(|name| !params.contains_key(name))
        {
            return Err(LocaleError::MissingParam {
                key: key.to_string(),
                param: missing,
            });
        }

        let rendered = re.replace_all(template, |caps: &regex::Captures| match &params[&caps[1]] {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        });
        Ok(rendered.into_owned())
    }

    /// `render` for plain string arguments
    pub fn render_args(&self, key: &str, args: &[(&str, &str)]) -> Result<String> {
        let params: Map<String, Value> = args
            .iter()
            .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
            .collect();
        self.render(key, &params)
    }

    /// Render a key without placeholders, falling back to the key itself
    pub fn text(&self, key: &str) -> String {
        self.render(key, &Map::new()).unwrap_or_else(|_| key.to_string())
    }
}
