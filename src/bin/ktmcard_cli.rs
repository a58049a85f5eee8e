//! KTM Card CLI - Bridge interface for the presentation layer
//!
//! Commands: profiles, themes, validate, render
//! Outputs JSON to stdout, logs to stderr
//! Returns 2 on validation or render failure

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ktmcard_core::{
    AssetPool, Face, ProfileRegistry, RenderContext, RenderPipeline, RenderRequest, ThemeSet,
};

#[derive(Parser)]
#[command(name = "ktmcard-cli")]
#[command(about = "KTM Card CLI - Student ID card layout engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to layout profiles directory
    #[arg(short, long, env = "KTMCARD_PROFILES_DIR", default_value = "profiles")]
    profiles_dir: PathBuf,
}

#[derive(Clone, Copy, ValueEnum)]
enum FaceArg {
    Front,
    Back,
    Both,
}

impl From<FaceArg> for Face {
    fn from(face: FaceArg) -> Self {
        match face {
            FaceArg::Front => Face::Front,
            FaceArg::Back => Face::Back,
            FaceArg::Both => Face::Both,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List available layout profiles
    Profiles,

    /// List built-in card themes
    Themes,

    /// Validate a profile against the built-in themes and assets
    Validate {
        /// Profile ID
        #[arg(short, long, default_value = "ktm-standard")]
        profile: String,
    },

    /// Render one or both card faces
    Render {
        /// Profile ID (defaults to the payload's, then ktm-standard)
        #[arg(short, long)]
        profile: Option<String>,

        /// Theme ID (defaults to the first theme)
        #[arg(short, long)]
        theme: Option<String>,

        /// Faces to render (defaults to the payload's, then both)
        #[arg(short, long, value_enum)]
        face: Option<FaceArg>,

        /// Year for the synthesized QR payload (defaults to the current year)
        #[arg(long)]
        year: Option<i32>,

        /// JSON payload (RenderRequest), or @path to read it from a file
        #[arg(long)]
        payload: String,
    },
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ktmcard_core=info,ktmcard_cli=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn print_json(value: &impl Serialize) -> bool {
    match serde_json::to_string_pretty(value) {
        Ok(s) => {
            println!("{}", s);
            true
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to serialize output");
            false
        }
    }
}

fn fail(code: u8, error: impl std::fmt::Display) -> ExitCode {
    let output = serde_json::json!({ "success": false, "error": error.to_string() });
    println!("{}", output);
    ExitCode::from(code)
}

fn read_payload(payload: &str) -> Result<String, std::io::Error> {
    match payload.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path),
        None => Ok(payload.to_string()),
    }
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    init_tracing();
    let cli = Cli::parse();

    let registry = match ProfileRegistry::load_from_dir(&cli.profiles_dir) {
        Ok(r) => r,
        Err(e) => return fail(1, format!("Failed to load profiles: {}", e)),
    };
    tracing::debug!(dir = %cli.profiles_dir.display(), "profiles loaded");

    let pipeline = RenderPipeline::new(registry, ThemeSet::builtin(), AssetPool::builtin());

    match cli.command {
        Commands::Profiles => {
            let profiles: Vec<_> = pipeline.list_profiles()
                .iter()
                .map(|p| serde_json::json!({
                    "id": p.id,
                    "name": p.name,
                    "version": p.profile_version,
                    "locale": p.locale,
                    "deprecated": p.deprecated,
                    "supersededBy": p.superseded_by,
                }))
                .collect();
            if print_json(&profiles) { ExitCode::SUCCESS } else { ExitCode::FAILURE }
        }

        Commands::Themes => {
            if print_json(pipeline.themes()) { ExitCode::SUCCESS } else { ExitCode::FAILURE }
        }

        Commands::Validate { profile } => match pipeline.validate_profile(&profile) {
            Ok(report) => {
                if !print_json(&report) {
                    return ExitCode::FAILURE;
                }
                if report.valid {
                    ExitCode::SUCCESS
                } else {
                    ExitCode::from(2)
                }
            }
            Err(e) => fail(1, e),
        },

        Commands::Render { profile, theme, face, year, payload } => {
            let raw = match read_payload(&payload) {
                Ok(raw) => raw,
                Err(e) => return fail(1, format!("Failed to read payload: {}", e)),
            };
            let request: RenderRequest = match serde_json::from_str(&raw) {
                Ok(r) => r,
                Err(e) => return fail(1, format!("Invalid payload: {}", e)),
            };

            // Command-line flags win over the payload
            let request = RenderRequest {
                profile_id: profile.unwrap_or(request.profile_id),
                theme_id: theme.or(request.theme_id),
                face: face.map(Face::from).unwrap_or(request.face),
                context: year.map(RenderContext::new).unwrap_or(request.context),
                ..request
            };

            match pipeline.render(&request) {
                Ok(card) => {
                    let output = serde_json::json!({ "success": true, "card": card });
                    if print_json(&output) { ExitCode::SUCCESS } else { ExitCode::FAILURE }
                }
                Err(e) => fail(2, e),
            }
        }
    }
}
