use std::{fs, path::PathBuf, str::FromStr as _};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use serde_json::{Map, Value};
use vizbed::{CompileRequest, ContainerDimensions, Provider};

#[derive(Parser, Debug)]
#[command(name = "vizbed", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compile a specification into render-ready output (JSON on stdout).
    Compile(PipelineArgs),
    /// Validate a specification and report errors/warnings only.
    Lint(PipelineArgs),
}

#[derive(Parser, Debug)]
struct PipelineArgs {
    /// Input specification (JSON, comments allowed).
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Optional config file (JSON, comments allowed).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Grammar dialect (`vega` or `vegaLite`); detected from `$schema`
    /// when omitted.
    #[arg(long)]
    provider: Option<String>,

    /// Container width in pixels.
    #[arg(long)]
    width: Option<f64>,

    /// Container height in pixels.
    #[arg(long)]
    height: Option<f64>,

    /// Embed-option overrides as an inline JSON object.
    #[arg(long = "embed-options")]
    embed_options: Option<String>,

    /// Verbosity for advisory warnings (0 = silent .. 4 = debug).
    #[arg(long, default_value_t = 2)]
    log_level: u8,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Compile(args) => cmd_compile(args),
        Command::Lint(args) => cmd_lint(args),
    }
}

fn cmd_compile(args: PipelineArgs) -> anyhow::Result<()> {
    let inputs = PipelineInputs::load(&args)?;
    let outcome = vizbed::compile(&inputs.request(&args)?);
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    if !outcome.is_ready() {
        std::process::exit(1);
    }
    Ok(())
}

fn cmd_lint(args: PipelineArgs) -> anyhow::Result<()> {
    let inputs = PipelineInputs::load(&args)?;
    let report = vizbed::lint(&inputs.request(&args)?);
    println!("{}", serde_json::to_string_pretty(&report)?);
    if !report.errors.is_empty() {
        std::process::exit(1);
    }
    Ok(())
}

/// Owned file contents backing a borrowed `CompileRequest`.
struct PipelineInputs {
    spec: String,
    config: Option<String>,
}

impl PipelineInputs {
    fn load(args: &PipelineArgs) -> anyhow::Result<Self> {
        let spec = fs::read_to_string(&args.in_path)
            .with_context(|| format!("read specification '{}'", args.in_path.display()))?;
        let config = args
            .config
            .as_ref()
            .map(|path| {
                fs::read_to_string(path)
                    .with_context(|| format!("read config '{}'", path.display()))
            })
            .transpose()?;
        Ok(Self { spec, config })
    }

    fn request<'a>(&'a self, args: &PipelineArgs) -> anyhow::Result<CompileRequest<'a>> {
        let provider = resolve_provider(args, &self.spec)?;
        let mut request = CompileRequest::new(&self.spec, provider).log_level(args.log_level);

        if let Some(config) = &self.config {
            request = request.config(config);
        }
        if args.width.is_some() || args.height.is_some() {
            request = request.container(ContainerDimensions {
                width: args.width.unwrap_or(0.0),
                height: args.height.unwrap_or(0.0),
            });
        }
        if let Some(overrides) = &args.embed_options {
            let overrides: Map<String, Value> = serde_json::from_str(overrides)
                .with_context(|| "parse --embed-options (must be a JSON object)")?;
            request = request.embed_options(overrides);
        }

        Ok(request)
    }
}

fn resolve_provider(args: &PipelineArgs, spec_text: &str) -> anyhow::Result<Provider> {
    if let Some(name) = &args.provider {
        return Ok(Provider::from_str(name)?);
    }
    let parsed = vizbed::jsonc::parse(spec_text);
    parsed
        .result
        .as_ref()
        .and_then(Provider::from_spec)
        .ok_or_else(|| {
            anyhow::anyhow!("cannot detect the provider from `$schema`; pass --provider")
        })
}
