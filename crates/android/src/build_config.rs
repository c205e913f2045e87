//! Static build parameters
//!
//! These values are passed through to the packaging step unmodified. They are
//! typed and validated here, never transformed.

use droidsign_core::validation::{ValidationResult, Validator};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Name of the only signing config the project defines
pub const RELEASE_SIGNING_CONFIG: &str = "release";

static APPLICATION_ID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9_]*(\.[A-Za-z][A-Za-z0-9_]*)+$").expect("valid regex")
});

/// CPU instruction-set variant a package can target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Abi {
    /// ARMv5, deprecated
    #[serde(rename = "armeabi")]
    Armeabi,
    /// 32-bit ARM
    #[serde(rename = "armeabi-v7a")]
    ArmeabiV7a,
    /// 64-bit ARM
    #[serde(rename = "arm64-v8a")]
    Arm64V8a,
    /// 32-bit Intel
    #[serde(rename = "x86")]
    X86,
    /// 64-bit Intel
    #[serde(rename = "x86_64")]
    X86_64,
}

impl Abi {
    /// Every ABI, in the order Android documents them
    pub const ALL: [Abi; 5] = [
        Abi::Armeabi,
        Abi::ArmeabiV7a,
        Abi::Arm64V8a,
        Abi::X86,
        Abi::X86_64,
    ];

    /// ABI name as used in `abiFilters`
    pub fn as_str(&self) -> &'static str {
        match self {
            Abi::Armeabi => "armeabi",
            Abi::ArmeabiV7a => "armeabi-v7a",
            Abi::Arm64V8a => "arm64-v8a",
            Abi::X86 => "x86",
            Abi::X86_64 => "x86_64",
        }
    }

    /// `armeabi` is no longer supported by the NDK
    pub fn is_deprecated(&self) -> bool {
        matches!(self, Abi::Armeabi)
    }

    /// Whether the ABI is a 64-bit one
    pub fn is_64_bit(&self) -> bool {
        matches!(self, Abi::Arm64V8a | Abi::X86_64)
    }
}

impl fmt::Display for Abi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Abi {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Abi::ALL
            .into_iter()
            .find(|abi| abi.as_str() == s)
            .ok_or_else(|| {
                let known: Vec<&str> = Abi::ALL.iter().map(Abi::as_str).collect();
                format!("unknown ABI '{}' (expected one of: {})", s, known.join(", "))
            })
    }
}

/// Native debug symbol level packaged with the build
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DebugSymbolLevel {
    /// No native symbols
    None,
    /// Symbol tables only
    #[default]
    SymbolTable,
    /// Full debug information
    Full,
}

impl DebugSymbolLevel {
    /// Name as written in `debugSymbolLevel`
    pub fn as_str(&self) -> &'static str {
        match self {
            DebugSymbolLevel::None => "NONE",
            DebugSymbolLevel::SymbolTable => "SYMBOL_TABLE",
            DebugSymbolLevel::Full => "FULL",
        }
    }
}

/// SDK version bounds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SdkVersions {
    /// `compileSdk`
    #[serde(default = "default_compile_sdk")]
    pub compile: u32,
    /// `minSdk`
    #[serde(default = "default_min_sdk")]
    pub min: u32,
    /// `targetSdk`
    #[serde(default = "default_target_sdk")]
    pub target: u32,
}

impl Default for SdkVersions {
    fn default() -> Self {
        Self {
            compile: default_compile_sdk(),
            min: default_min_sdk(),
            target: default_target_sdk(),
        }
    }
}

fn default_compile_sdk() -> u32 {
    35
}

fn default_min_sdk() -> u32 {
    21
}

fn default_target_sdk() -> u32 {
    35
}

/// NDK packaging options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NdkOptions {
    /// ABIs packaged into the build
    #[serde(default = "default_abi_filters")]
    pub abi_filters: Vec<Abi>,
    /// Native symbols kept for crash reporting
    #[serde(default)]
    pub debug_symbol_level: DebugSymbolLevel,
}

impl Default for NdkOptions {
    fn default() -> Self {
        Self {
            abi_filters: default_abi_filters(),
            debug_symbol_level: DebugSymbolLevel::default(),
        }
    }
}

fn default_abi_filters() -> Vec<Abi> {
    vec![Abi::Arm64V8a]
}

/// Settings shared by every build variant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultConfig {
    /// Kotlin/Java namespace of generated code
    #[serde(default = "default_package_name")]
    pub namespace: String,
    /// Package name on the device and in the store
    #[serde(default = "default_package_name")]
    pub application_id: String,
    /// SDK version bounds
    #[serde(default)]
    pub sdk: SdkVersions,
    /// Pinned NDK version, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ndk_version: Option<String>,
    /// Monotonic integer version
    #[serde(default = "default_version_code")]
    pub version_code: u32,
    /// User-visible version string
    #[serde(default = "default_version_name")]
    pub version_name: String,
    /// Multidex enabled
    #[serde(default = "default_true")]
    pub multidex: bool,
    /// NDK packaging options
    #[serde(default)]
    pub ndk: NdkOptions,
}

impl Default for DefaultConfig {
    fn default() -> Self {
        Self {
            namespace: default_package_name(),
            application_id: default_package_name(),
            sdk: SdkVersions::default(),
            ndk_version: None,
            version_code: default_version_code(),
            version_name: default_version_name(),
            multidex: true,
            ndk: NdkOptions::default(),
        }
    }
}

fn default_package_name() -> String {
    "com.example.app".to_string()
}

fn default_version_code() -> u32 {
    1
}

fn default_version_name() -> String {
    "1.0.0".to_string()
}

fn default_true() -> bool {
    true
}

impl DefaultConfig {
    /// Validate identifiers, SDK ordering and ABI filters
    pub fn validate(&self) -> ValidationResult {
        let mut seen = Vec::with_capacity(self.ndk.abi_filters.len());
        let mut duplicates = Vec::new();
        for abi in &self.ndk.abi_filters {
            if seen.contains(abi) {
                duplicates.push(abi.as_str());
            } else {
                seen.push(*abi);
            }
        }

        Validator::new()
            .required("default_config.namespace", &self.namespace)
            .required("default_config.application_id", &self.application_id)
            .pattern(
                "default_config.application_id",
                &self.application_id,
                &APPLICATION_ID,
                "a dotted package name like com.example.app",
            )
            .required("default_config.version_name", &self.version_name)
            .check(
                "default_config.version_code",
                self.version_code == 0,
                "RANGE",
                "Must be a positive integer",
            )
            .ordered(
                "default_config.sdk.min",
                self.sdk.min,
                "default_config.sdk.target",
                self.sdk.target,
            )
            .ordered(
                "default_config.sdk.target",
                self.sdk.target,
                "default_config.sdk.compile",
                self.sdk.compile,
            )
            .not_empty("default_config.ndk.abi_filters", &self.ndk.abi_filters)
            .warn_if(
                "default_config.ndk.abi_filters",
                self.ndk.abi_filters.iter().any(Abi::is_deprecated),
                "DEPRECATED",
                "armeabi is no longer supported by the NDK",
            )
            .warn_if(
                "default_config.ndk.abi_filters",
                !duplicates.is_empty(),
                "DUPLICATE",
                &format!("Listed more than once: {}", duplicates.join(", ")),
            )
            .validate()
    }
}

/// Java language level used for source/target compatibility and the JVM target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileOptions {
    /// Java release, 8 through 25
    #[serde(default = "default_java_version")]
    pub java_version: u8,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            java_version: default_java_version(),
        }
    }
}

fn default_java_version() -> u8 {
    11
}

impl CompileOptions {
    /// Kotlin `jvmTarget` string, e.g. `"11"`, or `"1.8"` for Java 8
    pub fn jvm_target(&self) -> String {
        if self.java_version <= 8 {
            format!("1.{}", self.java_version)
        } else {
            self.java_version.to_string()
        }
    }

    /// Check the Java release is one the toolchain accepts
    pub fn validate(&self) -> ValidationResult {
        Validator::new()
            .range("compile_options.java_version", self.java_version, 8, 25)
            .validate()
    }
}

/// Per-variant packaging flags
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildType {
    /// Run code shrinking
    #[serde(default = "default_true")]
    pub minify: bool,
    /// Strip unused resources; requires `minify`
    #[serde(default = "default_true")]
    pub shrink_resources: bool,
    /// Zip-align the package
    #[serde(default = "default_true")]
    pub zip_align: bool,
    /// ProGuard rule files
    #[serde(default = "default_proguard_files")]
    pub proguard_files: Vec<String>,
    /// Signing config name; `""` means unsigned
    #[serde(default = "default_signing_config")]
    pub signing_config: Option<String>,
    /// Values substituted into the manifest; supplied per variant by the project
    #[serde(default)]
    pub manifest_placeholders: BTreeMap<String, String>,
}

impl Default for BuildType {
    fn default() -> Self {
        Self {
            minify: true,
            shrink_resources: true,
            zip_align: true,
            proguard_files: default_proguard_files(),
            signing_config: default_signing_config(),
            manifest_placeholders: BTreeMap::new(),
        }
    }
}

fn default_proguard_files() -> Vec<String> {
    vec![
        "proguard-android.txt".to_string(),
        "proguard-rules.pro".to_string(),
    ]
}

fn default_signing_config() -> Option<String> {
    Some(RELEASE_SIGNING_CONFIG.to_string())
}

impl BuildType {
    /// Referenced signing config; an empty name in the project file means unsigned
    pub fn signing_config_name(&self) -> Option<&str> {
        self.signing_config.as_deref().filter(|name| !name.is_empty())
    }

    /// Validate flags and references for the variant called `name`
    pub fn validate(&self, name: &str) -> ValidationResult {
        let field = |suffix: &str| format!("build_types.{}.{}", name, suffix);

        let unknown_signing = self
            .signing_config_name()
            .is_some_and(|s| s != RELEASE_SIGNING_CONFIG);

        let empty_placeholders: Vec<&str> = self
            .manifest_placeholders
            .iter()
            .filter(|(_, v)| v.is_empty())
            .map(|(k, _)| k.as_str())
            .collect();

        Validator::new()
            .check(
                &field("shrink_resources"),
                self.shrink_resources && !self.minify,
                "REQUIRES_MINIFY",
                "Removing unused resources requires minify to be enabled",
            )
            .check(
                &field("signing_config"),
                unknown_signing,
                "UNKNOWN_REFERENCE",
                &format!(
                    "Unknown signing config '{}' (only '{}' is defined)",
                    self.signing_config_name().unwrap_or_default(),
                    RELEASE_SIGNING_CONFIG
                ),
            )
            .warn_if(
                &field("manifest_placeholders"),
                !empty_placeholders.is_empty(),
                "EMPTY_VALUE",
                &format!("Empty placeholder values: {}", empty_placeholders.join(", ")),
            )
            .validate()
    }
}

/// Default build types: `release` and `debug`, both minified and signed with `release`
pub fn default_build_types() -> BTreeMap<String, BuildType> {
    ["release", "debug"]
        .into_iter()
        .map(|name| (name.to_string(), BuildType::default()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_abi_round_trip_names() {
        for abi in Abi::ALL {
            assert_eq!(abi.as_str().parse::<Abi>().unwrap(), abi);
        }
        assert!("mips".parse::<Abi>().is_err());
    }

    #[test]
    fn test_abi_serde_names() {
        let abis: Vec<Abi> = serde_json::from_str(r#"["arm64-v8a", "x86_64"]"#).unwrap();
        assert_eq!(abis, vec![Abi::Arm64V8a, Abi::X86_64]);
        assert!(abis.iter().all(Abi::is_64_bit));
    }

    #[test]
    fn test_defaults_match_original_build_script() {
        let config = DefaultConfig::default();
        assert_eq!(config.ndk.abi_filters, vec![Abi::Arm64V8a]);
        assert_eq!(config.ndk.debug_symbol_level, DebugSymbolLevel::SymbolTable);
        assert!(config.multidex);

        let release = BuildType::default();
        assert!(release.minify && release.shrink_resources && release.zip_align);
        assert_eq!(release.signing_config.as_deref(), Some("release"));
        assert!(release.manifest_placeholders.is_empty());

        assert_eq!(CompileOptions::default().jvm_target(), "11");
    }

    #[test]
    fn test_default_config_is_valid() {
        let result = DefaultConfig::default().validate();
        assert!(result.is_valid(), "{:?}", result.errors());
        assert!(result.warnings().is_empty());
    }

    #[test]
    fn test_invalid_application_id() {
        let config = DefaultConfig {
            application_id: "not a package".to_string(),
            ..DefaultConfig::default()
        };
        let result = config.validate();
        assert!(result
            .errors()
            .iter()
            .any(|e| e.field == "default_config.application_id" && e.code == "PATTERN"));
    }

    #[test]
    fn test_sdk_ordering() {
        let config = DefaultConfig {
            sdk: SdkVersions {
                compile: 34,
                min: 21,
                target: 35,
            },
            ..DefaultConfig::default()
        };
        let result = config.validate();
        assert_eq!(result.errors().len(), 1);
        assert_eq!(result.errors()[0].field, "default_config.sdk.target");
    }

    #[test]
    fn test_abi_warnings_and_errors() {
        let mut config = DefaultConfig::default();
        config.ndk.abi_filters = vec![Abi::Armeabi, Abi::Arm64V8a, Abi::Arm64V8a];
        let result = config.validate();
        assert!(result.is_valid());
        let codes: Vec<&str> = result.warnings().iter().map(|w| w.code.as_str()).collect();
        assert_eq!(codes, vec!["DEPRECATED", "DUPLICATE"]);

        config.ndk.abi_filters.clear();
        assert!(!config.validate().is_valid());
    }

    #[test]
    fn test_java_8_jvm_target() {
        let options = CompileOptions { java_version: 8 };
        assert_eq!(options.jvm_target(), "1.8");
        assert!(options.validate().is_valid());
        assert!(!CompileOptions { java_version: 6 }.validate().is_valid());
    }

    #[test]
    fn test_shrink_requires_minify() {
        let build_type = BuildType {
            minify: false,
            ..BuildType::default()
        };
        let result = build_type.validate("debug");
        assert_eq!(result.errors()[0].field, "build_types.debug.shrink_resources");
    }

    #[test]
    fn test_unknown_signing_reference() {
        let build_type = BuildType {
            signing_config: Some("upload".to_string()),
            ..BuildType::default()
        };
        let result = build_type.validate("release");
        assert_eq!(result.errors()[0].code, "UNKNOWN_REFERENCE");

        let unsigned = BuildType {
            signing_config: None,
            ..BuildType::default()
        };
        assert!(unsigned.validate("debug").is_valid());

        let blank: BuildType = toml::from_str("signing_config = \"\"").unwrap();
        assert_eq!(blank.signing_config_name(), None);
        assert!(blank.validate("debug").is_valid());
    }

    #[test]
    fn test_empty_placeholder_warns() {
        let mut build_type = BuildType::default();
        build_type
            .manifest_placeholders
            .insert("googleAuthClientId".to_string(), String::new());
        let result = build_type.validate("release");
        assert!(result.is_valid());
        assert!(result.warnings()[0].message.contains("googleAuthClientId"));
    }

    #[test]
    fn test_build_type_from_toml_defaults() {
        let build_type: BuildType =
            toml::from_str("minify = false\nshrink_resources = false").unwrap();
        assert!(!build_type.minify);
        assert!(build_type.zip_align);
        assert_eq!(build_type.proguard_files.len(), 2);
    }
}
