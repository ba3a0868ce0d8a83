//! Command-line front end
//!
//! Loads a bundle, reads one document and answers a single query at a cursor,
//! printing JSON on stdout.
//!
//! ```bash
//! mythic-analyzer --bundle data.json --file mobs/boss.yml --line 12 --character 9 --mode owner
//! mythic-analyzer --bundle data.json --file mobs/boss.yml --line 3 --character 2 --mode schema --category Mob
//! ```

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use lsp_types::Position;
use ropey::Rope;
use serde_json::json;
use tracing::info;

use mythic_analyzer::context::ResolutionContext;
use mythic_analyzer::parsers::get_key_path;
use mythic_analyzer::{Candidate, DatasetBundle, logging};

#[derive(Parser, Debug)]
#[command(name = "mythic-analyzer")]
#[command(version)]
#[command(about = "Resolve cursor context and completions in MythicMobs YAML files")]
struct Args {
    /// Reference-data bundle (JSON)
    #[arg(long)]
    bundle: Option<PathBuf>,

    /// Document to analyse
    #[arg(long)]
    file: PathBuf,

    /// Zero-based cursor line
    #[arg(long)]
    line: u32,

    /// Zero-based cursor character
    #[arg(long)]
    character: u32,

    #[arg(long, value_enum, default_value = "owner")]
    mode: Mode,

    /// File category for schema completion (Mob, Item, Skill, Achievement, ...)
    #[arg(long)]
    category: Option<String>,

    /// Emit LSP completion items instead of raw candidates
    #[arg(long)]
    lsp: bool,

    /// Log level for stderr (overrides RUST_LOG)
    #[arg(long)]
    log_level: Option<String>,

    #[arg(long)]
    no_color: bool,

    /// Also write a debug session log to the user cache directory
    #[arg(long)]
    log_file: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Object or attribute under the cursor
    Owner,
    /// Registry category at the cursor
    Category,
    /// Ancestor key path
    Keys,
    /// File-structure completion
    Schema,
    /// Placeholder completion
    Placeholder,
    /// Attribute name/value completion
    Attributes,
}

fn render(candidates: Vec<Candidate>, lsp: bool) -> Result<serde_json::Value> {
    if lsp {
        let items: Vec<_> = candidates
            .iter()
            .enumerate()
            .map(|(order, candidate)| candidate.to_completion_item(order))
            .collect();
        Ok(serde_json::to_value(items)?)
    } else {
        Ok(serde_json::to_value(candidates)?)
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let _guard = logging::init_logger(args.no_color, args.log_level.as_deref(), args.log_file)
        .context("Failed to initialize logging")?;

    let bundle = match &args.bundle {
        Some(path) => DatasetBundle::from_path(path).with_context(|| format!("Failed to load bundle {:?}", path))?,
        None => DatasetBundle::default(),
    };
    let context = ResolutionContext::build(&bundle).context("Failed to build resolution context")?;

    let text = fs::read_to_string(&args.file).with_context(|| format!("Failed to read {:?}", args.file))?;
    let document = Rope::from_str(&text);
    let position = Position::new(args.line, args.character);
    info!("Query {:?} at {}:{} in {:?}", args.mode, args.line, args.character, args.file);

    let output = match args.mode {
        Mode::Owner => serde_json::to_value(context.resolve_owner(&document, position))?,
        Mode::Category => json!(context.object_category(&document, position)),
        Mode::Keys => json!(get_key_path(&document, position)),
        Mode::Schema => {
            let Some(category) = args.category.as_deref() else {
                bail!("--category is required for schema completion");
            };
            render(context.complete_schema(&document, position, category), args.lsp)?
        }
        Mode::Placeholder => render(context.complete_placeholder(&document, position), args.lsp)?,
        Mode::Attributes => render(context.complete_attributes(&document, position), args.lsp)?,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
