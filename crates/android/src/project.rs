//! Project configuration (`droidsign.toml`)
//!
//! One file holds the signing locations and every static build parameter.
//! All sections are optional; defaults reproduce a stock Flutter Android app.

use crate::build_config::{default_build_types, BuildType, CompileOptions, DefaultConfig};
use crate::signing::SigningConfigResolver;
use droidsign_core::config::{load_toml, GeneralConfig, Loaded, LoggingConfig, DEFAULT_CANDIDATES};
use droidsign_core::error::{Error, Result};
use droidsign_core::validation::ValidationResult;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Where signing inputs live, relative to the project directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigningSection {
    /// Keystore properties file
    #[serde(default = "default_properties_file")]
    pub properties_file: PathBuf,

    /// Directory relative `storeFile` values resolve against
    #[serde(default = "default_store_base_dir")]
    pub store_base_dir: PathBuf,
}

impl Default for SigningSection {
    fn default() -> Self {
        Self {
            properties_file: default_properties_file(),
            store_base_dir: default_store_base_dir(),
        }
    }
}

fn default_properties_file() -> PathBuf {
    PathBuf::from("key.properties")
}

// Gradle resolves `file(...)` inside the app module
fn default_store_base_dir() -> PathBuf {
    PathBuf::from("app")
}

/// Root of `droidsign.toml`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// `[general]`
    #[serde(default)]
    pub general: GeneralConfig,

    /// `[logging]`
    #[serde(default)]
    pub logging: LoggingConfig,

    /// `[signing]`
    #[serde(default)]
    pub signing: SigningSection,

    /// `[default_config]`
    #[serde(default)]
    pub default_config: DefaultConfig,

    /// `[compile_options]`
    #[serde(default)]
    pub compile_options: CompileOptions,

    /// User tables are layered over the default `release` and `debug` types
    #[serde(default = "default_build_types", deserialize_with = "merge_build_types")]
    pub build_types: BTreeMap<String, BuildType>,
}

fn merge_build_types<'de, D>(
    deserializer: D,
) -> std::result::Result<BTreeMap<String, BuildType>, D::Error>
where
    D: Deserializer<'de>,
{
    let mut build_types = default_build_types();
    build_types.extend(BTreeMap::<String, BuildType>::deserialize(deserializer)?);
    Ok(build_types)
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            logging: LoggingConfig::default(),
            signing: SigningSection::default(),
            default_config: DefaultConfig::default(),
            compile_options: CompileOptions::default(),
            build_types: default_build_types(),
        }
    }
}

impl ProjectConfig {
    /// Load from `explicit`, or discover under `project_dir`, or use defaults
    pub fn load(explicit: Option<&Path>, project_dir: &Path) -> Result<Loaded<Self>> {
        load_toml(explicit, DEFAULT_CANDIDATES, project_dir)
    }

    /// Absolute-or-project-relative path of the keystore properties file
    pub fn properties_path(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.signing.properties_file)
    }

    /// Directory relative `storeFile` values resolve against
    pub fn store_base_dir(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.signing.store_base_dir)
    }

    /// Resolver configured for this project
    pub fn resolver(&self, project_dir: &Path) -> SigningConfigResolver {
        SigningConfigResolver::new(self.store_base_dir(project_dir))
    }

    /// Look up a build type by name
    pub fn variant(&self, name: &str) -> Result<&BuildType> {
        self.build_types.get(name).ok_or_else(|| {
            let known: Vec<&str> = self.build_types.keys().map(String::as_str).collect();
            Error::unknown_variant(name, &known)
        })
    }

    /// Validate every section, collecting all errors and warnings
    pub fn validate(&self) -> ValidationResult {
        let mut result = self.default_config.validate();
        result.merge(self.compile_options.validate());
        for (name, build_type) in &self.build_types {
            result.merge(build_type.validate(name));
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build_config::Abi;
    use droidsign_core::error::ErrorCode;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"
[general]
project_name = "flutter_riverpod_demo"

[signing]
properties_file = "android/key.properties"
store_base_dir = "android/app"

[default_config]
namespace = "com.example.flutter_riverpod_demo"
application_id = "com.example.flutter_riverpod_demo"
version_code = 7
version_name = "1.2.0"

[default_config.sdk]
min = 23

[default_config.ndk]
abi_filters = ["arm64-v8a", "x86_64"]

[build_types.release.manifest_placeholders]
googleAuthClientId = "release-client.apps.googleusercontent.com"

[build_types.debug]
minify = false
shrink_resources = false
"#;

    #[test]
    fn test_defaults() {
        let config = ProjectConfig::default();
        assert_eq!(config.signing.properties_file, PathBuf::from("key.properties"));
        assert_eq!(
            config.build_types.keys().collect::<Vec<_>>(),
            vec!["debug", "release"]
        );
        assert!(config.validate().is_valid());
    }

    #[test]
    fn test_parse_sample() {
        let config: ProjectConfig = toml::from_str(SAMPLE).unwrap();

        assert_eq!(config.general.project_name, "flutter_riverpod_demo");
        assert_eq!(config.default_config.sdk.min, 23);
        assert_eq!(config.default_config.sdk.compile, 35);
        assert_eq!(
            config.default_config.ndk.abi_filters,
            vec![Abi::Arm64V8a, Abi::X86_64]
        );

        let release = config.variant("release").unwrap();
        assert!(release.minify);
        assert_eq!(
            release.manifest_placeholders.get("googleAuthClientId").map(String::as_str),
            Some("release-client.apps.googleusercontent.com")
        );

        let debug = config.variant("debug").unwrap();
        assert!(!debug.minify);
        assert!(debug.manifest_placeholders.is_empty());

        assert!(config.validate().is_valid());
    }

    #[test]
    fn test_placeholder_table_keeps_default_variants() {
        let config: ProjectConfig = toml::from_str(
            "[build_types.release.manifest_placeholders]\ngoogleAuthClientId = \"x\"\n",
        )
        .unwrap();

        assert_eq!(
            config.build_types.keys().collect::<Vec<_>>(),
            vec!["debug", "release"]
        );
        let release = config.variant("release").unwrap();
        assert_eq!(release.manifest_placeholders["googleAuthClientId"], "x");
        assert_eq!(config.variant("debug").unwrap(), &BuildType::default());
    }

    #[test]
    fn test_extra_build_type_is_added() {
        let config: ProjectConfig =
            toml::from_str("[build_types.staging]\nminify = true\n").unwrap();

        assert_eq!(config.build_types.len(), 3);
        assert!(config.variant("staging").is_ok());
        assert!(config.variant("debug").is_ok());
    }

    #[test]
    fn test_paths_relative_to_project_dir() {
        let config: ProjectConfig = toml::from_str(SAMPLE).unwrap();
        let project = Path::new("/work/demo");

        assert_eq!(
            config.properties_path(project),
            PathBuf::from("/work/demo/android/key.properties")
        );
        assert_eq!(
            config.resolver(project).base_dir(),
            Path::new("/work/demo/android/app")
        );
    }

    #[test]
    fn test_unknown_variant() {
        let err = ProjectConfig::default().variant("staging").unwrap_err();
        assert_eq!(err.code, ErrorCode::UnknownVariant);
        assert!(err.suggestion.unwrap().contains("debug, release"));
    }

    #[test]
    fn test_validate_collects_all_sections() {
        let mut config = ProjectConfig::default();
        config.default_config.application_id = "demo".to_string();
        config.compile_options.java_version = 4;
        config.build_types.get_mut("debug").unwrap().minify = false;

        let result = config.validate();
        assert_eq!(result.errors().len(), 3);
    }

    #[test]
    fn test_load_from_project_dir() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("droidsign.toml"), SAMPLE).unwrap();

        let loaded = ProjectConfig::load(None, dir.path()).unwrap();

        assert!(loaded.path.is_some());
        assert_eq!(loaded.value.default_config.version_code, 7);
    }
}
