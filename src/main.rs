use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use lambdacfn_builder::{BuildContext, FunctionBuilder};
use lambdacfn_config::FunctionDef;
use lambdacfn_message::{Message, MessageConfig};
use lambdacfn_template::{Template, link};

/// lambdacfn - build CloudFormation templates for serverless functions
#[derive(Parser)]
#[command(name = "lambdacfn")]
#[command(version, about, long_about = None)]
struct Cli {
  /// Log at debug level (RUST_LOG takes precedence)
  #[arg(long, short, global = true)]
  verbose: bool,

  /// Write the result here instead of stdout
  #[arg(long, short, global = true)]
  output: Option<PathBuf>,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Build the template for one function definition
  Build {
    /// Path to the function definition (JSON)
    function_file: PathBuf,

    /// Directory holding the function entry point; defaults to the
    /// directory of the definition file
    #[arg(long, env = "LAMBDACFN_HANDLER_DIR")]
    handler_dir: Option<String>,

    /// Suffix for the webhook deployment resource; random when unset
    #[arg(long, env = "LAMBDACFN_DEPLOYMENT_NONCE")]
    nonce: Option<String>,

    /// Emit an embeddable template without format version or description
    #[arg(long)]
    embed: bool,
  },

  /// Link composed templates into one
  Link {
    /// Paths to the templates (JSON)
    #[arg(required = true)]
    template_files: Vec<PathBuf>,

    /// Description of the linked template
    #[arg(long)]
    description: Option<String>,
  },

  /// Render the publish request for a notification read from stdin
  Message,
}

fn main() -> Result<()> {
  let cli = Cli::parse();
  init_logging(cli.verbose);

  match cli.command {
    Commands::Build {
      function_file,
      handler_dir,
      nonce,
      embed,
    } => {
      let template = build(&function_file, handler_dir, nonce, embed)?;
      write_output(&template, cli.output.as_deref())
    }
    Commands::Link {
      template_files,
      description,
    } => {
      let template = link_templates(&template_files, description)?;
      write_output(&template, cli.output.as_deref())
    }
    Commands::Message => {
      let message: Message = serde_json::from_str(&read_stdin()?)
        .context("failed to parse message from stdin")?;
      let config = MessageConfig::from_lookup(|name| std::env::var(name).ok());
      let request = message
        .to_publish_request(&config)
        .context("failed to prepare message")?;
      write_output(&request, cli.output.as_deref())
    }
  }
}

/// Uses `RUST_LOG` if set, otherwise `info` or `debug` with `--verbose`.
fn init_logging(verbose: bool) {
  let filter = if std::env::var("RUST_LOG").is_ok() {
    EnvFilter::from_default_env()
  } else if verbose {
    EnvFilter::new("debug")
  } else {
    EnvFilter::new("info")
  };

  // Ignore error if a subscriber is already set.
  let _ = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(io::stderr)
    .try_init();
}

fn build(
  function_file: &Path,
  handler_dir: Option<String>,
  nonce: Option<String>,
  embed: bool,
) -> Result<Template> {
  let def: FunctionDef = read_json(function_file)?;

  let handler_dir = handler_dir
    .or_else(|| lambdacfn_builder::handler_dir_from_path(function_file))
    .unwrap_or_default();
  let nonce = nonce.unwrap_or_else(|| uuid::Uuid::new_v4().simple().to_string());
  let builder = FunctionBuilder::new(BuildContext::new(handler_dir).with_deployment_nonce(nonce));

  let template = if embed {
    builder.embed(&def)
  } else {
    builder.build(&def)
  }
  .with_context(|| format!("failed to build function: {}", function_file.display()))?;

  info!(function = %def.name, "built template");
  Ok(template)
}

fn link_templates(template_files: &[PathBuf], description: Option<String>) -> Result<Template> {
  let templates = template_files
    .iter()
    .map(|path| read_json::<Template>(path))
    .collect::<Result<Vec<_>>>()?;

  let linked = link(&templates).context("failed to link templates")?;
  info!(templates = templates.len(), "linked templates");

  Ok(match description {
    Some(description) => linked.finalize(description),
    None => linked,
  })
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
  let content = std::fs::read_to_string(path)
    .with_context(|| format!("failed to read file: {}", path.display()))?;
  serde_json::from_str(&content)
    .with_context(|| format!("failed to parse file: {}", path.display()))
}

fn read_stdin() -> Result<String> {
  let mut input = String::new();
  io::stdin()
    .read_to_string(&mut input)
    .context("failed to read stdin")?;
  Ok(input)
}

fn write_output<T: Serialize>(value: &T, output: Option<&Path>) -> Result<()> {
  let rendered = serde_json::to_string_pretty(value)?;
  match output {
    Some(path) => std::fs::write(path, format!("{rendered}\n"))
      .with_context(|| format!("failed to write output: {}", path.display())),
    None => {
      println!("{rendered}");
      Ok(())
    }
  }
}
