//! Keel CLI - document stream processing for cluster lifecycle configuration

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use keel::document::plugin::default_registry;
use keel::document::{DocumentBundle, Selector};
use keel::render::render;

/// Keel - document-processing engine for cluster lifecycle configuration
#[derive(Parser, Debug)]
#[command(name = "keel", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Apply a document plugin to a YAML document stream
    ///
    /// Reads a multi-document stream, instantiates the plugin named by the
    /// configuration document's apiVersion/kind, and writes the transformed
    /// stream back out.
    Transform(TransformArgs),

    /// Print the documents matching a selector
    Render(RenderArgs),
}

/// Transform mode arguments
#[derive(Parser, Debug)]
struct TransformArgs {
    /// Path to the plugin configuration document
    #[arg(short = 'c', long = "config")]
    config_file: PathBuf,

    /// Input document stream (defaults to stdin)
    #[arg(short = 'f', long = "input")]
    input: Option<PathBuf>,

    /// Output destination (defaults to stdout)
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,
}

/// Render mode arguments
#[derive(Parser, Debug)]
struct RenderArgs {
    /// Match documents with this apiVersion (GROUP/VERSION or VERSION)
    #[arg(long = "api-version")]
    api_version: Option<String>,

    /// Match documents with this kind
    #[arg(long)]
    kind: Option<String>,

    /// Match documents with this metadata.name
    #[arg(long)]
    name: Option<String>,

    /// Match documents with this metadata.namespace
    #[arg(long)]
    namespace: Option<String>,

    /// Input document stream (defaults to stdin)
    #[arg(short = 'f', long = "input")]
    input: Option<PathBuf>,

    /// Output destination (defaults to stdout)
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Transform(args) => run_transform(args),
        Commands::Render(args) => run_render(args),
    }
}

/// Apply the configured plugin to the input stream
fn run_transform(args: TransformArgs) -> anyhow::Result<()> {
    let config_text = std::fs::read_to_string(&args.config_file)
        .with_context(|| format!("failed to read config file {:?}", args.config_file))?;
    let config: serde_yaml::Value =
        serde_yaml::from_str(&config_text).context("failed to parse plugin configuration")?;

    let plugin = default_registry()
        .create(config)
        .context("failed to construct plugin")?;

    let mut input = open_input(args.input.as_deref())?;
    let mut output = open_output(args.output.as_deref())?;
    plugin
        .run(input.as_mut(), output.as_mut())
        .context("transform failed")?;
    Ok(())
}

/// Print the documents matching the selector flags
fn run_render(args: RenderArgs) -> anyhow::Result<()> {
    let (group, version) = match args.api_version.as_deref() {
        Some(api_version) => match api_version.split_once('/') {
            Some((group, version)) => (group.to_string(), version.to_string()),
            None => (String::new(), api_version.to_string()),
        },
        None => (String::new(), String::new()),
    };

    let mut selector = Selector::new().by_gvk(group, version, args.kind.unwrap_or_default());
    if let Some(name) = args.name {
        selector = selector.by_name(name);
    }
    if let Some(namespace) = args.namespace {
        selector = selector.by_namespace(namespace);
    }

    let mut input = open_input(args.input.as_deref())?;
    let bundle = DocumentBundle::from_reader(input.as_mut()).context("failed to decode input")?;

    let mut output = open_output(args.output.as_deref())?;
    render(&bundle, &selector, output.as_mut()).context("render failed")?;
    Ok(())
}

fn open_input(path: Option<&Path>) -> anyhow::Result<Box<dyn Read>> {
    match path {
        Some(path) => {
            let file =
                File::open(path).with_context(|| format!("failed to open input {path:?}"))?;
            Ok(Box::new(file))
        }
        None => Ok(Box::new(io::stdin())),
    }
}

fn open_output(path: Option<&Path>) -> anyhow::Result<Box<dyn Write>> {
    match path {
        Some(path) => {
            let file =
                File::create(path).with_context(|| format!("failed to create output {path:?}"))?;
            Ok(Box::new(file))
        }
        None => Ok(Box::new(io::stdout())),
    }
}
