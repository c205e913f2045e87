//! Packaging plan
//!
//! The immutable record handed to the external packaging step: one variant's
//! build parameters plus the signing config it references. Missing signing
//! credentials are reported, never rejected.

use crate::build_config::{BuildType, CompileOptions, DefaultConfig, RELEASE_SIGNING_CONFIG};
use crate::project::ProjectConfig;
use crate::signing::{SigningConfig, SigningSummary};
use droidsign_core::error::{Error, ErrorCode, Result};
use serde::Serialize;
use std::collections::BTreeMap;

/// Everything the packaging step needs for one variant
#[derive(Debug, Clone, Serialize)]
pub struct PackagingPlan {
    variant: String,
    default_config: DefaultConfig,
    compile_options: CompileOptions,
    build_type: BuildType,
    #[serde(skip)]
    credentials: Option<SigningConfig>,
    signing: Option<SigningSummary>,
}

impl PackagingPlan {
    /// Build the plan for `variant`.
    ///
    /// `overrides` are merged over the variant's manifest placeholders and win
    /// on conflict. `signing` is attached only when the build type references a
    /// signing config. A reference to any config other than `release` is an
    /// error.
    pub fn assemble(
        project: &ProjectConfig,
        variant: &str,
        signing: SigningConfig,
        overrides: &BTreeMap<String, String>,
    ) -> Result<Self> {
        let mut build_type = project.variant(variant)?.clone();
        build_type
            .manifest_placeholders
            .extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));

        let credentials = match build_type.signing_config_name() {
            None => None,
            Some(RELEASE_SIGNING_CONFIG) => Some(signing),
            Some(other) => {
                return Err(Error::new(
                    ErrorCode::InvalidConfigValue,
                    format!(
                        "Build type '{}' references unknown signing config '{}'",
                        variant, other
                    ),
                )
                .with_suggestion(format!(
                    "Set signing_config to \"{}\", or to \"\" for an unsigned build",
                    RELEASE_SIGNING_CONFIG
                )));
            }
        };
        let signing = credentials.as_ref().map(SigningConfig::summary);

        tracing::debug!(
            variant,
            signed = credentials.is_some(),
            placeholders = build_type.manifest_placeholders.len(),
            "Assembled packaging plan"
        );

        Ok(Self {
            variant: variant.to_string(),
            default_config: project.default_config.clone(),
            compile_options: project.compile_options.clone(),
            build_type,
            credentials,
            signing,
        })
    }

    /// Build variant name
    pub fn variant(&self) -> &str {
        &self.variant
    }

    /// Settings shared by every variant
    pub fn default_config(&self) -> &DefaultConfig {
        &self.default_config
    }

    /// Java and Kotlin targets
    pub fn compile_options(&self) -> &CompileOptions {
        &self.compile_options
    }

    /// The variant's build type, with placeholder overrides applied
    pub fn build_type(&self) -> &BuildType {
        &self.build_type
    }

    /// Signing config, when the variant is signed
    pub fn signing(&self) -> Option<&SigningConfig> {
        self.credentials.as_ref()
    }

    /// Merged manifest placeholders
    pub fn manifest_placeholders(&self) -> &BTreeMap<String, String> {
        &self.build_type.manifest_placeholders
    }

    /// True when the variant is signed with complete credentials and the
    /// keystore exists on disk
    pub fn is_signable(&self) -> bool {
        self.signing
            .as_ref()
            .is_some_and(|s| s.complete && s.store_file_exists)
    }

    /// Problems with the signing inputs, for the caller to act on
    pub fn signing_warnings(&self) -> Vec<String> {
        let Some(summary) = &self.signing else {
            return Vec::new();
        };

        let mut warnings = Vec::new();
        if !summary.missing.is_empty() {
            warnings.push(format!(
                "Signing config is missing: {}",
                summary.missing.join(", ")
            ));
        }
        if let (Some(path), false) = (&summary.store_file, summary.store_file_exists) {
            warnings.push(format!("Keystore not found: {}", path.display()));
        }
        warnings
    }
}

/// Parse a `key=value` manifest placeholder override
pub fn parse_placeholder(input: &str) -> Result<(String, String)> {
    match input.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(Error::new(
            ErrorCode::InvalidInput,
            format!("Invalid placeholder '{}'", input),
        )
        .with_suggestion(
            "Use the form name=value, e.g. googleAuthClientId=abc.apps.googleusercontent.com",
        )),
    }
}
