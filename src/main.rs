use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde::Serialize;
use simple_patcher::{
    apply_patch_sets, discover_patch_files, generate_patch, load_from_paths, DiffEngine,
    GenerateRequest, PatchCatalog, PatchMeta, Reporter, DEFAULT_BLOCK_SIZE,
};
use std::env;
use std::path::PathBuf;

const PATCH_DIR_ENV: &str = "SIMPLE_PATCHER_DIR";
const DEFAULT_PATCH_DIR: &str = "./patches";

#[derive(Parser)]
#[command(name = "simple-patcher")]
#[command(about = "Simple binary patcher", long_about = None)]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply selected patches to a copy of an executable
    Apply {
        /// Original executable to start from
        #[arg(long = "orig-exe")]
        orig_exe: PathBuf,

        /// New executable to make (overwritten if it exists)
        #[arg(long = "new-exe")]
        new_exe: PathBuf,

        /// Add every patch in this group to the selection (repeatable)
        #[arg(short, long = "group")]
        groups: Vec<String>,

        /// Add the patch with this name to the selection (repeatable)
        #[arg(long = "patch")]
        patches: Vec<String>,

        #[command(flatten)]
        source: PatchSource,
    },

    /// Diff two executables and append the result to a patch file
    Generate {
        /// Original executable
        #[arg(short, long = "orig-exe")]
        orig_exe: PathBuf,

        /// Modified executable
        #[arg(short, long = "new-exe")]
        new_exe: PathBuf,

        /// Patch file to append to
        #[arg(short, long, default_value = "patch.yaml")]
        patch: PathBuf,

        /// The name of the patch
        #[arg(long, default_value = "PatchName")]
        name: String,

        /// The author of the patch
        #[arg(long, default_value = "Anonymous")]
        author: String,

        /// The group the patch belongs to
        #[arg(long, default_value = "custom")]
        group: String,

        /// Description of the patch
        #[arg(long, default_value = "Changes some bytes.")]
        description: String,

        /// Comparison block size in bytes
        #[arg(long, default_value_t = DEFAULT_BLOCK_SIZE)]
        block_size: usize,
    },

    /// List available patches by group
    List {
        #[command(flatten)]
        source: PatchSource,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(clap::Args)]
struct PatchSource {
    /// Directory searched recursively for .yaml patch files
    #[arg(short = 'd', long)]
    patch_dir: Option<PathBuf>,

    /// Load this patch file instead of searching a directory (repeatable)
    #[arg(short, long = "file")]
    files: Vec<PathBuf>,
}

/// Prints progress to stdout and failures to stderr.
struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn info(&self, message: &str) {
        println!("{message}");
    }

    fn error(&self, message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match (cli.quiet, cli.verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        (false, _) => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match cli.command {
        Commands::Apply {
            orig_exe,
            new_exe,
            groups,
            patches,
            source,
        } => cmd_apply(orig_exe, new_exe, groups, patches, source),

        Commands::Generate {
            orig_exe,
            new_exe,
            patch,
            name,
            author,
            group,
            description,
            block_size,
        } => {
            let request = GenerateRequest {
                original: orig_exe,
                modified: new_exe,
                patch_file: patch,
                meta: PatchMeta::new(name, author, group, description),
            };
            cmd_generate(request, block_size)
        }

        Commands::List { source, json } => cmd_list(source, json),
    }
}

/// Resolve the patch directory.
///
/// Priority order:
/// 1. Explicit --patch-dir flag
/// 2. SIMPLE_PATCHER_DIR environment variable
/// 3. ./patches
fn resolve_patch_dir(cli_dir: Option<PathBuf>) -> PathBuf {
    if let Some(dir) = cli_dir {
        return dir;
    }
    if let Ok(env_dir) = env::var(PATCH_DIR_ENV) {
        if !env_dir.is_empty() {
            return PathBuf::from(env_dir);
        }
    }
    PathBuf::from(DEFAULT_PATCH_DIR)
}

fn load_catalog(source: PatchSource) -> Result<PatchCatalog> {
    let files = if source.files.is_empty() {
        let dir = resolve_patch_dir(source.patch_dir);
        discover_patch_files(&dir)?
    } else {
        source.files
    };

    for file in &files {
        log::info!("loading patches from {}", file.display());
    }
    let catalog = load_from_paths(&files)?;
    log::info!(
        "loaded {} patch(es) in {} group(s)",
        catalog.len(),
        catalog.index().len()
    );
    Ok(catalog)
}

fn cmd_apply(
    orig_exe: PathBuf,
    new_exe: PathBuf,
    groups: Vec<String>,
    patches: Vec<String>,
    source: PatchSource,
) -> Result<()> {
    let mut catalog = load_catalog(source)?;

    for group in &groups {
        let count = catalog.select_group(group)?;
        println!("{} group \"{}\" ({} patches)", "+".green(), group, count);
    }
    for name in &patches {
        catalog.select_patch(name)?;
        println!("{} patch \"{}\"", "+".green(), name);
    }

    let selected = catalog.selected();
    if selected.is_empty() {
        anyhow::bail!(
            "{}\n  {}",
            "No patches selected.".red(),
            "Select some with --group <GROUP> or --patch <NAME> (see `simple-patcher list`)"
        );
    }

    for overlap in catalog.overlaps() {
        eprintln!(
            "{}",
            format!(
                "Warning: \"{}\" and \"{}\" both write {:#010x}..{:#010x}; \"{}\" wins",
                overlap.first.name(),
                overlap.second.name(),
                overlap.start,
                overlap.end,
                overlap.second.name()
            )
            .yellow()
        );
    }

    match apply_patch_sets(&orig_exe, &new_exe, &selected, &ConsoleReporter) {
        Ok(report) => {
            println!();
            println!("{}", "Complete!".green().bold());
            println!(
                "  {} patch(es), {} record(s), {} byte(s) written to {}",
                report.patch_sets,
                report.records,
                report.bytes_written,
                report.destination.display()
            );
            Ok(())
        }
        // Already reported through ConsoleReporter.
        Err(_) => std::process::exit(1),
    }
}

fn cmd_generate(request: GenerateRequest, block_size: usize) -> Result<()> {
    let engine = DiffEngine::with_block_size(block_size);
    match generate_patch(&request, &engine, &ConsoleReporter) {
        Ok(report) => {
            if report.records.is_empty() {
                println!("{}", "Files are identical; wrote an empty patch".yellow());
            }
            for record in &report.records {
                println!("  {}", record.to_string().dimmed());
            }
            println!(
                "{} {} record(s), {} byte(s) changed",
                "Complete!".green().bold(),
                report.records.len(),
                report.bytes_changed()
            );
            Ok(())
        }
        Err(_) => std::process::exit(1),
    }
}

#[derive(Serialize)]
struct GroupListing<'a> {
    group: &'a str,
    patches: Vec<PatchListing<'a>>,
}

#[derive(Serialize)]
struct PatchListing<'a> {
    name: &'a str,
    author: &'a str,
    description: &'a str,
    records: usize,
    bytes: usize,
}

fn cmd_list(source: PatchSource, json: bool) -> Result<()> {
    let catalog = load_catalog(source)?;

    let listing: Vec<GroupListing<'_>> = catalog
        .groups()
        .map(|(group, sets)| GroupListing {
            group,
            patches: sets
                .into_iter()
                .map(|set| PatchListing {
                    name: set.name(),
                    author: set.author(),
                    description: set.description(),
                    records: set.records().len(),
                    bytes: set.byte_count(),
                })
                .collect(),
        })
        .collect();

    if json {
        let text = serde_json::to_string_pretty(&listing).context("failed to render JSON")?;
        println!("{text}");
        return Ok(());
    }

    for group in &listing {
        println!(
            "{} ({} patches)",
            group.group.bold(),
            group.patches.len()
        );
        for patch in &group.patches {
            println!(
                "  - {} {} {}",
                patch.name.cyan(),
                format!("by {}", patch.author).dimmed(),
                format!("[{} record(s), {} byte(s)]", patch.records, patch.bytes).dimmed()
            );
            for line in patch.description.lines() {
                println!("      {line}");
            }
        }
        println!();
    }
    Ok(())
}
