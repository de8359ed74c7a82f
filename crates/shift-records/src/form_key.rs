//! Record keys.
//!
//! A [`FormKey`] names one record globally: a local id plus the plugin that
//! first defined it. Every override of that record in later plugins keeps the
//! same key, which is what lets layers be merged by key.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use crate::MAX_FORM_ID;

/// Errors parsing keys from text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormKeyError {
    #[error("missing ':' separator in form key '{0}'")]
    MissingSeparator(String),

    #[error("invalid form id '{0}': expected 6 hex digits")]
    InvalidId(String),

    #[error("invalid plugin name '{0}'")]
    InvalidModName(String),

    #[error("unknown plugin extension in '{0}': expected .esm, .esp or .esl")]
    UnknownExtension(String),
}

/// Plugin file type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModType {
    Master,
    Plugin,
    Light,
}

impl ModType {
    /// File extension without the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            ModType::Master => "esm",
            ModType::Plugin => "esp",
            ModType::Light => "esl",
        }
    }

    fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "esm" => Some(ModType::Master),
            "esp" => Some(ModType::Plugin),
            "esl" => Some(ModType::Light),
            _ => None,
        }
    }
}

/// Plugin identity, e.g. `Skyrim.esm`.
///
/// Plugin file names are case-insensitive, so equality, ordering and hashing
/// all ignore ASCII case. The original spelling is kept for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ModKey {
    name: String,
    kind: ModType,
}

impl ModKey {
    /// Build a key from a base name (no extension) and type.
    pub fn new(name: impl Into<String>, kind: ModType) -> Result<Self, FormKeyError> {
        let name = name.into();
        if name.is_empty() || name.contains(['/', '\\', ':']) {
            return Err(FormKeyError::InvalidModName(name));
        }
        Ok(Self { name, kind })
    }

    /// Base name without extension.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ModType {
        self.kind
    }

    /// File name with extension.
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.name, self.kind.extension())
    }

    fn folded(&self) -> String {
        self.name.to_ascii_lowercase()
    }
}

impl FromStr for ModKey {
    type Err = FormKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, ext) = s
            .rsplit_once('.')
            .ok_or_else(|| FormKeyError::UnknownExtension(s.to_string()))?;
        let kind = ModType::from_extension(ext)
            .ok_or_else(|| FormKeyError::UnknownExtension(s.to_string()))?;
        ModKey::new(name, kind)
    }
}

impl TryFrom<String> for ModKey {
    type Error = FormKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ModKey> for String {
    fn from(key: ModKey) -> Self {
        key.file_name()
    }
}

impl fmt::Display for ModKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.name, self.kind.extension())
    }
}

impl PartialEq for ModKey {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.name.eq_ignore_ascii_case(&other.name)
    }
}

impl Eq for ModKey {}

impl Hash for ModKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.folded().hash(state);
        self.kind.hash(state);
    }
}

impl PartialOrd for ModKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ModKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.folded()
            .cmp(&other.folded())
            .then(self.kind.cmp(&other.kind))
    }
}

/// Globally unique record key, text form `XXXXXX:Plugin.esp`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FormKey {
    mod_key: ModKey,
    id: u32,
}

impl FormKey {
    /// Create a key. The id is truncated to 24 bits; the top byte of a raw
    /// form id is a load-order index, not part of the identity.
    pub fn new(id: u32, mod_key: ModKey) -> Self {
        Self {
            mod_key,
            id: id & MAX_FORM_ID,
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    /// Plugin that first defined the record.
    pub fn mod_key(&self) -> &ModKey {
        &self.mod_key
    }
}

impl FromStr for FormKey {
    type Err = FormKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (id, plugin) = s
            .trim()
            .split_once(':')
            .ok_or_else(|| FormKeyError::MissingSeparator(s.to_string()))?;

        if id.len() != 6 || !id.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(FormKeyError::InvalidId(id.to_string()));
        }
        let id = u32::from_str_radix(id, 16).map_err(|_| FormKeyError::InvalidId(id.to_string()))?;

        Ok(FormKey::new(id, plugin.parse()?))
    }
}

impl TryFrom<String> for FormKey {
    type Error = FormKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FormKey> for String {
    fn from(key: FormKey) -> Self {
        key.to_string()
    }
}

impl fmt::Display for FormKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:06X}:{}", self.id, self.mod_key)
    }
}
