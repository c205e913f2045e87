//! droidsign CLI
//!
//! Inspect the signing configuration and packaging parameters of an Android app.

use anyhow::Result;
use clap::{Parser, Subcommand};
use droidsign_android::build_config::Abi;
use droidsign_android::packaging::{parse_placeholder, PackagingPlan};
use droidsign_android::{PropertiesOrigin, ProjectConfig, SigningConfig, SigningSummary};
use droidsign_cli::output::{display_optional, display_secret, format_count, Status};
use droidsign_core::config::LogFormat;
use droidsign_core::error::{exit_codes, Error, ErrorCode};
use droidsign_core::validation::ValidationResult;
use droidsign_telemetry::{level_for_verbosity, TelemetryConfig};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "droidsign")]
#[command(about = "Inspect Android signing configuration and packaging parameters")]
#[command(version)]
struct Cli {
    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Android project directory
    #[arg(long, global = true, default_value = ".")]
    project_dir: PathBuf,

    /// Increase log verbosity
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Log format: compact, json
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve and show the signing configuration
    Signing {
        /// Properties file (defaults to [signing].properties_file)
        #[arg(long)]
        properties: Option<PathBuf>,
        /// Directory relative storeFile values resolve against
        #[arg(long)]
        base_dir: Option<PathBuf>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
        /// Fail when any signing field is missing
        #[arg(long)]
        strict: bool,
    },

    /// Show the packaging plan for a build variant
    Plan {
        /// Build variant
        #[arg(long, default_value = "release")]
        variant: String,
        /// Manifest placeholder override (name=value), repeatable
        #[arg(long = "placeholder", value_name = "NAME=VALUE")]
        placeholders: Vec<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate the project configuration
    Check {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Diagnose signing setup
    Doctor,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.no_color {
        owo_colors::set_override(false);
    }

    let loaded = match ProjectConfig::load(cli.config.as_deref(), &cli.project_dir) {
        Ok(loaded) => loaded,
        Err(e) => {
            Status::error(&e.to_string());
            std::process::exit(e.code.exit_code());
        }
    };

    let mut telemetry = TelemetryConfig::from(&loaded.value.logging);
    telemetry.log_level = level_for_verbosity(cli.verbose, cli.quiet, &telemetry.log_level);
    telemetry.ansi = !cli.no_color;
    if let Some(format) = cli.log_format {
        telemetry.format = format;
    }
    if let Err(e) = droidsign_telemetry::init_with_config(telemetry) {
        Status::warning(&format!("Logging disabled: {}", e));
    }

    let ctx = Context {
        project: &loaded.value,
        config_path: loaded.path.as_deref(),
        project_dir: &cli.project_dir,
    };

    let result = match cli.command {
        Commands::Signing {
            properties,
            base_dir,
            json,
            strict,
        } => run_signing(&ctx, properties.as_deref(), base_dir.as_deref(), json, strict),
        Commands::Plan {
            variant,
            placeholders,
            json,
        } => run_plan(&ctx, &variant, &placeholders, json),
        Commands::Check { json } => run_check(&ctx, json),
        Commands::Doctor => run_doctor(&ctx),
    };

    let exit_code = result.unwrap_or_else(|e| {
        Status::error(&format!("{:#}", e));
        exit_code_for(&e)
    });

    std::process::exit(exit_code);
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<Error>()
        .map_or(exit_codes::FAILURE, |e| e.code.exit_code())
}

struct Context<'a> {
    project: &'a ProjectConfig,
    config_path: Option<&'a Path>,
    project_dir: &'a Path,
}

impl Context<'_> {
    fn resolve_signing(
        &self,
        properties: Option<&Path>,
        base_dir: Option<&Path>,
    ) -> Result<(SigningConfig, PropertiesOrigin)> {
        let path = properties
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.project.properties_path(self.project_dir));

        let resolver = match base_dir {
            Some(dir) => droidsign_android::SigningConfigResolver::new(dir),
            None => self.project.resolver(self.project_dir),
        };

        let resolved = resolver.resolve_with_origin(&path).map_err(|e| {
            Error::from(e).with_context("While resolving the signing configuration")
        })?;
        Ok(resolved)
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[derive(Serialize)]
struct SigningReport<'a> {
    origin: &'a PropertiesOrigin,
    signing: SigningSummary,
}

fn run_signing(
    ctx: &Context<'_>,
    properties: Option<&Path>,
    base_dir: Option<&Path>,
    json: bool,
    strict: bool,
) -> Result<i32> {
    let (config, origin) = ctx.resolve_signing(properties, base_dir)?;
    let summary = config.summary();

    if json {
        print_json(&SigningReport {
            origin: &origin,
            signing: summary.clone(),
        })?;
    } else {
        print_origin(&origin);
        print_signing(&summary);
    }

    if strict && !summary.complete {
        return Err(Error::new(
            ErrorCode::IncompleteSigningConfig,
            format!("Signing config incomplete, missing: {}", summary.missing.join(", ")),
        )
        .with_suggestion(format!(
            "Add the missing keys to {}",
            origin.path().display()
        ))
        .into());
    }

    Ok(exit_codes::SUCCESS)
}

fn print_origin(origin: &PropertiesOrigin) {
    match origin {
        PropertiesOrigin::Absent { path } => Status::info(&format!(
            "No properties file at {}, signing config is empty",
            path.display()
        )),
        PropertiesOrigin::File { path, entries } => Status::info(&format!(
            "Loaded {} from {}",
            format_count(*entries, "entry", "entries"),
            path.display()
        )),
    }
}

fn print_signing(summary: &SigningSummary) {
    Status::header("Signing config");
    Status::field("keyAlias", &display_optional(summary.key_alias.as_deref()));
    Status::field("keyPassword", &display_secret(summary.key_password_set));
    let store = summary
        .store_file
        .as_ref()
        .map(|p| p.display().to_string());
    Status::field("storeFile", &display_optional(store.as_deref()));
    Status::field("storePassword", &display_secret(summary.store_password_set));
    println!();

    if summary.complete {
        Status::success("Signing config complete");
    } else {
        Status::warning(&format!("Missing: {}", summary.missing.join(", ")));
    }
    if summary.store_file.is_some() && !summary.store_file_exists {
        Status::warning("Keystore file does not exist");
    }
}

fn run_plan(ctx: &Context<'_>, variant: &str, placeholders: &[String], json: bool) -> Result<i32> {
    let overrides = placeholders
        .iter()
        .map(|p| parse_placeholder(p))
        .collect::<droidsign_core::Result<BTreeMap<_, _>>>()?;

    let (signing, _) = ctx.resolve_signing(None, None)?;
    let plan = PackagingPlan::assemble(ctx.project, variant, signing, &overrides)?;

    if json {
        print_json(&plan)?;
    } else {
        print_plan(&plan);
    }

    for warning in plan.signing_warnings() {
        Status::warning(&warning);
    }

    Ok(exit_codes::SUCCESS)
}

fn print_plan(plan: &PackagingPlan) {
    let defaults = plan.default_config();
    let build_type = plan.build_type();
    let abis: Vec<&str> = defaults.ndk.abi_filters.iter().map(Abi::as_str).collect();
    let flag = |on: bool| if on { "yes" } else { "no" };

    Status::header(&format!("Packaging plan: {}", plan.variant()));
    Status::field("applicationId", &defaults.application_id);
    Status::field("namespace", &defaults.namespace);
    Status::field(
        "version",
        &format!("{} ({})", defaults.version_name, defaults.version_code),
    );
    Status::field(
        "sdk",
        &format!(
            "min {} / target {} / compile {}",
            defaults.sdk.min, defaults.sdk.target, defaults.sdk.compile
        ),
    );
    if let Some(ndk) = &defaults.ndk_version {
        Status::field("ndkVersion", ndk);
    }
    Status::field("abiFilters", &abis.join(", "));
    Status::field("debugSymbols", defaults.ndk.debug_symbol_level.as_str());
    Status::field("multidex", flag(defaults.multidex));
    Status::field("jvmTarget", &plan.compile_options().jvm_target());
    Status::field("minify", flag(build_type.minify));
    Status::field("shrinkResources", flag(build_type.shrink_resources));
    Status::field("zipAlign", flag(build_type.zip_align));
    Status::field("proguardFiles", &build_type.proguard_files.join(", "));

    if !plan.manifest_placeholders().is_empty() {
        Status::header("Manifest placeholders");
        for (name, value) in plan.manifest_placeholders() {
            Status::field(name, value);
        }
    }

    match plan.signing() {
        Some(signing) => print_signing(&signing.summary()),
        None => Status::info("Variant is not signed"),
    }
}

fn run_check(ctx: &Context<'_>, json: bool) -> Result<i32> {
    let result = ctx.project.validate();

    if json {
        print_json(&result)?;
    } else {
        print_validation(&result, ctx.config_path);
    }

    Ok(if result.is_valid() {
        exit_codes::SUCCESS
    } else {
        exit_codes::VALIDATION_ERROR
    })
}

fn print_validation(result: &ValidationResult, config_path: Option<&Path>) {
    match config_path {
        Some(path) => Status::info(&format!("Checking {}", path.display())),
        None => Status::info("No config file found, checking defaults"),
    }

    for error in result.errors() {
        Status::error(&error.to_string());
    }
    for warning in result.warnings() {
        Status::warning(&warning.to_string());
    }

    if result.is_valid() {
        Status::success(&format!(
            "Configuration valid ({})",
            format_count(result.warnings().len(), "warning", "warnings")
        ));
    } else {
        Status::error(&format!(
            "Configuration invalid: {}",
            format_count(result.errors().len(), "error", "errors")
        ));
    }
}

fn run_doctor(ctx: &Context<'_>) -> Result<i32> {
    println!("Signing Setup Check");
    println!();

    match ctx.config_path {
        Some(path) => Status::success(&format!("config: {}", path.display())),
        None => Status::warning("config: not found, using defaults"),
    }

    let properties_path = ctx.project.properties_path(ctx.project_dir);
    let (config, origin) = match ctx.resolve_signing(None, None) {
        Ok(resolved) => resolved,
        Err(e) => {
            Status::error(&format!("properties: {:#}", e));
            return Ok(exit_code_for(&e));
        }
    };

    if origin.is_absent() {
        Status::warning(&format!(
            "properties: {} not found",
            properties_path.display()
        ));
    } else {
        Status::success(&format!("properties: {}", properties_path.display()));
    }

    let summary = config.summary();
    match (&summary.store_file, summary.store_file_exists) {
        (Some(path), true) => Status::success(&format!("keystore: {}", path.display())),
        (Some(path), false) => Status::error(&format!("keystore: {} not found", path.display())),
        (None, _) => Status::warning("keystore: storeFile not set"),
    }

    if summary.complete {
        Status::success("credentials: complete");
    } else {
        Status::warning(&format!("credentials: missing {}", summary.missing.join(", ")));
    }

    let validation = ctx.project.validate();
    if validation.is_valid() {
        Status::success("project config: valid");
    } else {
        Status::error(&format!(
            "project config: {}",
            format_count(validation.errors().len(), "error", "errors")
        ));
    }

    tracing::debug!(
        complete = summary.complete,
        keystore_exists = summary.store_file_exists,
        "Doctor finished"
    );

    Ok(exit_codes::SUCCESS)
}
