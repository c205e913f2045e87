//! Signing configuration resolution
//!
//! Turns an optional `key.properties` file into a [`SigningConfig`]. A missing
//! file yields an empty config; missing keys stay unset. Neither is an error.

use crate::error::Result;
use crate::properties::SigningProperties;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Property key for the key alias
pub const KEY_ALIAS: &str = "keyAlias";
/// Property key for the key password
pub const KEY_PASSWORD: &str = "keyPassword";
/// Property key for the keystore path
pub const STORE_FILE: &str = "storeFile";
/// Property key for the keystore password
pub const STORE_PASSWORD: &str = "storePassword";

/// All recognized keys, in declaration order
pub const RECOGNIZED_KEYS: [&str; 4] = [KEY_ALIAS, KEY_PASSWORD, STORE_FILE, STORE_PASSWORD];

/// Credentials used to sign a release package.
///
/// Every field is independently optional. `Debug` never prints passwords.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SigningConfig {
    key_alias: Option<String>,
    key_password: Option<String>,
    store_file: Option<PathBuf>,
    store_password: Option<String>,
}

impl SigningConfig {
    /// Map recognized keys of `properties` into a config. Relative `storeFile`
    /// values are joined onto `base_dir`.
    pub fn from_properties(properties: &SigningProperties, base_dir: &Path) -> Self {
        let store_file = match properties.get(STORE_FILE) {
            Some("") => {
                tracing::warn!("Ignoring empty storeFile entry");
                None
            }
            Some(value) => Some(base_dir.join(value)),
            None => None,
        };

        Self {
            key_alias: properties.get(KEY_ALIAS).map(String::from),
            key_password: properties.get(KEY_PASSWORD).map(String::from),
            store_file,
            store_password: properties.get(STORE_PASSWORD).map(String::from),
        }
    }

    /// `keyAlias`
    pub fn key_alias(&self) -> Option<&str> {
        self.key_alias.as_deref()
    }

    /// `keyPassword`
    pub fn key_password(&self) -> Option<&str> {
        self.key_password.as_deref()
    }

    /// `storeFile`, already joined onto the base directory
    pub fn store_file(&self) -> Option<&Path> {
        self.store_file.as_deref()
    }

    /// `storePassword`
    pub fn store_password(&self) -> Option<&str> {
        self.store_password.as_deref()
    }

    /// True when no field is set
    pub fn is_empty(&self) -> bool {
        self.missing_fields().len() == RECOGNIZED_KEYS.len()
    }

    /// True when all four fields are set
    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// Property keys whose fields are unset
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let present = [
            self.key_alias.is_some(),
            self.key_password.is_some(),
            self.store_file.is_some(),
            self.store_password.is_some(),
        ];
        RECOGNIZED_KEYS
            .iter()
            .zip(present)
            .filter(|(_, is_set)| !is_set)
            .map(|(key, _)| *key)
            .collect()
    }

    /// Password-free view for display and JSON output
    pub fn summary(&self) -> SigningSummary {
        SigningSummary {
            key_alias: self.key_alias.clone(),
            store_file: self.store_file.clone(),
            store_file_exists: self.store_file.as_deref().is_some_and(Path::is_file),
            key_password_set: self.key_password.is_some(),
            store_password_set: self.store_password.is_some(),
            complete: self.is_complete(),
            missing: self.missing_fields(),
        }
    }
}

impl fmt::Debug for SigningConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn redact(value: Option<&String>) -> Option<&'static str> {
            value.map(|_| "<redacted>")
        }

        f.debug_struct("SigningConfig")
            .field("key_alias", &self.key_alias)
            .field("key_password", &redact(self.key_password.as_ref()))
            .field("store_file", &self.store_file)
            .field("store_password", &redact(self.store_password.as_ref()))
            .finish()
    }
}

/// Serializable signing overview that never contains secrets
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SigningSummary {
    /// Key alias, which is not a secret
    pub key_alias: Option<String>,
    /// Resolved keystore path
    pub store_file: Option<PathBuf>,
    /// Whether `store_file` points at an existing file
    pub store_file_exists: bool,
    /// Whether a key password was given
    pub key_password_set: bool,
    /// Whether a store password was given
    pub store_password_set: bool,
    /// All four fields set
    pub complete: bool,
    /// Property keys that were not set
    pub missing: Vec<&'static str>,
}

/// Where the resolved values came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PropertiesOrigin {
    /// No file at the given path; the config is empty
    Absent {
        /// Path that was looked up
        path: PathBuf,
    },
    /// Parsed from a file with `entries` distinct keys
    File {
        /// Path that was read
        path: PathBuf,
        /// Number of distinct keys in the file
        entries: usize,
    },
}

impl PropertiesOrigin {
    /// Properties file path, whether or not it exists
    pub fn path(&self) -> &Path {
        match self {
            Self::Absent { path } | Self::File { path, .. } => path,
        }
    }

    /// True for the absent-file case
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent { .. })
    }
}

/// Resolves signing configuration from an optional properties file
#[derive(Debug, Clone)]
pub struct SigningConfigResolver {
    base_dir: PathBuf,
}

impl SigningConfigResolver {
    /// Create a resolver that joins relative `storeFile` values onto `base_dir`
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Directory relative `storeFile` values are resolved against
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Resolve the signing config from `source`.
    ///
    /// A missing file yields an empty config. Fails only when the file exists
    /// but cannot be read or decoded as UTF-8.
    pub fn resolve(&self, source: &Path) -> Result<SigningConfig> {
        self.resolve_with_origin(source).map(|(config, _)| config)
    }

    /// Like [`resolve`](Self::resolve), also reporting where values came from
    pub fn resolve_with_origin(&self, source: &Path) -> Result<(SigningConfig, PropertiesOrigin)> {
        match SigningProperties::load(source)? {
            Some(properties) => {
                tracing::debug!(
                    path = %source.display(),
                    keys = ?properties.keys().collect::<Vec<_>>(),
                    "Loaded signing properties"
                );
                let origin = PropertiesOrigin::File {
                    path: source.to_path_buf(),
                    entries: properties.len(),
                };
                Ok((self.resolve_properties(&properties), origin))
            }
            None => {
                tracing::info!(
                    path = %source.display(),
                    "Signing properties file not found, using empty signing config"
                );
                let origin = PropertiesOrigin::Absent {
                    path: source.to_path_buf(),
                };
                Ok((SigningConfig::default(), origin))
            }
        }
    }

    /// Map already-loaded properties into a config
    pub fn resolve_properties(&self, properties: &SigningProperties) -> SigningConfig {
        SigningConfig::from_properties(properties, &self.base_dir)
    }
}
