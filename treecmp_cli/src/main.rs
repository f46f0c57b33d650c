use anyhow::Context;
use clap::{Parser, Subcommand};
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;
use treecmp_common::{
    ensure_config, load_config, load_config_from, save_config, AppConfig, LoadedConfig,
};
use treecmp_core::{AuditOutcome, AuditSummary, FolderAudit, FolderPicker};

const CANCELLED_MESSAGE: &str = "No folder selected. Exiting...";

#[derive(Parser)]
#[command(name = "treecmp")]
#[command(author = "treecmp Contributors")]
#[command(version = "0.1.0")]
#[command(about = "Find files missing from a copy of a folder, or copied with a different size", long_about = None)]
struct Cli {
    /// Use this config file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare two folders and write Report-File.txt
    Audit {
        /// First folder (prompted for on stdin when omitted)
        folder1: Option<PathBuf>,

        /// Second folder (prompted for on stdin when omitted)
        folder2: Option<PathBuf>,

        /// Ignore patterns (can be specified multiple times)
        #[arg(short, long)]
        ignore: Vec<String>,

        /// Follow symbolic links
        #[arg(short = 'L', long)]
        follow_symlinks: bool,

        /// Directory to write the report into
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Directory for the per-folder listing files
        #[arg(long)]
        listing_dir: Option<PathBuf>,

        /// Also print a JSON summary of the run to stdout
        #[arg(long)]
        json: bool,
    },
    /// Show the configuration file in use
    Config {
        /// Write a default config file if none exists
        #[arg(long)]
        init: bool,

        /// Keep the config file next to the executable
        #[arg(long)]
        portable: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    // Logs go to stderr so stdout carries only prompts, results and JSON
    let default_level = if cli.quiet { "warn" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    match cli.command {
        Commands::Audit {
            folder1,
            folder2,
            ignore,
            follow_symlinks,
            output_dir,
            listing_dir,
            json,
        } => {
            let audited = load(cli.config.as_ref(), false).and_then(|loaded| {
                let mut config = loaded.config;
                config.ignore_patterns.extend(ignore);
                if follow_symlinks {
                    config.follow_symlinks = true;
                }
                if output_dir.is_some() {
                    config.output_dir = output_dir;
                }
                if listing_dir.is_some() {
                    config.listing_dir = listing_dir;
                }
                run_audit(&config, folder1.into_iter().chain(folder2), json)
            });
            // Audit failures still exit with status 0
            if let Err(e) = audited {
                report_failure(&e);
            }
        }
        Commands::Config { init, portable } => {
            if let Err(e) = run_config(cli.config.as_ref(), init, portable) {
                report_failure(&e);
                std::process::exit(1);
            }
        }
    }
}

/// Print a failure even when logging is filtered out
fn report_failure(e: &anyhow::Error) {
    error!("{:#}", e);
    eprintln!("Error: {:#}", e);
}

fn load(explicit: Option<&PathBuf>, prefer_portable: bool) -> anyhow::Result<LoadedConfig> {
    let loaded = match explicit {
        Some(path) => load_config_from(path),
        None => load_config(prefer_portable),
    };
    loaded.context("Failed to load configuration")
}

fn run_audit(
    config: &AppConfig,
    folders: impl IntoIterator<Item = PathBuf>,
    json: bool,
) -> anyhow::Result<()> {
    let stdin = io::stdin();
    // With --json the prompts move to stderr to keep stdout parseable
    let prompt_out: Box<dyn Write> = if json {
        Box::new(io::stderr())
    } else {
        Box::new(io::stdout())
    };
    let mut picker = PromptPicker::new(folders, stdin.lock(), prompt_out);

    let summary = match FolderAudit::new(config).run(&mut picker)? {
        AuditOutcome::Cancelled => {
            if json {
                eprintln!("{}", CANCELLED_MESSAGE);
            } else {
                println!("{}", CANCELLED_MESSAGE);
            }
            return Ok(());
        }
        AuditOutcome::Completed(summary) => summary,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        write_summary(&mut io::stdout().lock(), &summary)?;
    }
    Ok(())
}

fn run_config(explicit: Option<&PathBuf>, init: bool, portable: bool) -> anyhow::Result<()> {
    let loaded = match (explicit, init) {
        (Some(path), true) => {
            let loaded = load(Some(path), portable)?;
            if !loaded.exists {
                save_config(&loaded.path, &loaded.config)
                    .context("Failed to write configuration")?;
            }
            loaded
        }
        (None, true) => ensure_config(portable).context("Failed to write configuration")?,
        (_, false) => load(explicit, portable)?,
    };

    println!("Config file: {} ({})", loaded.path.display(), loaded.location);
    if !loaded.exists && !init {
        println!("(not present, using defaults)");
    }
    print!("{}", toml::to_string_pretty(&loaded.config)?);
    Ok(())
}

fn write_summary(out: &mut impl Write, summary: &AuditSummary) -> io::Result<()> {
    writeln!(
        out,
        "Folder 1: {} ({} files, {} bytes)",
        summary.folder1.display(),
        summary.folder1_files,
        summary.folder1_bytes
    )?;
    writeln!(
        out,
        "Folder 2: {} ({} files, {} bytes)",
        summary.folder2.display(),
        summary.folder2_files,
        summary.folder2_bytes
    )?;
    writeln!(out, "Primary folder: {}", summary.primary.display())?;
    writeln!(
        out,
        "Missing from {}: {}",
        summary.secondary.display(),
        summary.result.missing_from_secondary.len()
    )?;
    writeln!(out, "Size mismatches: {}", summary.result.size_mismatches.len())?;
    if summary.skipped_entries > 0 {
        writeln!(out, "Skipped unreadable entries: {}", summary.skipped_entries)?;
    }

    writeln!(out)?;
    writeln!(out, "Temporary files have been written to:")?;
    writeln!(out, "Folder 1 contents: {}", summary.folder1_listing.display())?;
    writeln!(out, "Folder 2 contents: {}", summary.folder2_listing.display())?;
    writeln!(out)?;
    writeln!(
        out,
        "Final report has been generated: {}",
        summary.report_path.display()
    )
}

/// Hands out folders given on the command line, then prompts for the rest.
///
/// A blank answer or end of input cancels the selection. Only the line
/// ending is stripped, so folder names may begin or end with spaces.
struct PromptPicker<R, W> {
    preset: VecDeque<PathBuf>,
    input: R,
    prompts: W,
}

impl<R: BufRead, W: Write> PromptPicker<R, W> {
    fn new(preset: impl IntoIterator<Item = PathBuf>, input: R, prompts: W) -> Self {
        Self {
            preset: preset.into_iter().collect(),
            input,
            prompts,
        }
    }

    fn read_answer(&mut self) -> Option<PathBuf> {
        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => {
                let answer = line.trim_end_matches(['\r', '\n']);
                (!answer.trim().is_empty()).then(|| PathBuf::from(answer))
            }
            Err(e) => {
                warn!("Failed to read folder selection: {}", e);
                None
            }
        }
    }
}

impl<R: BufRead, W: Write> FolderPicker for PromptPicker<R, W> {
    fn pick_folder(&mut self, prompt: &str) -> Option<PathBuf> {
        if let Some(folder) = self.preset.pop_front() {
            return Some(folder);
        }

        let _ = writeln!(self.prompts, "{}", prompt);
        let _ = self.prompts.flush();
        self.read_answer()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use treecmp_common::{ComparisonResult, FileEntry};
    use treecmp_core::Direction;

    #[test]
    fn test_prompt_picker_uses_preset_folders_first() {
        let mut prompts = Vec::new();
        let mut picker = PromptPicker::new(
            vec![PathBuf::from("/from/args")],
            Cursor::new("/typed/in\n"),
            &mut prompts,
        );

        assert_eq!(picker.pick_folder("first?"), Some(PathBuf::from("/from/args")));
        assert_eq!(picker.pick_folder("second?"), Some(PathBuf::from("/typed/in")));
        drop(picker);

        assert_eq!(String::from_utf8(prompts).unwrap(), "second?\n");
    }

    #[test]
    fn test_prompt_picker_empty_line_cancels() {
        let mut picker = PromptPicker::new(Vec::<PathBuf>::new(), Cursor::new("   \n"), io::sink());
        assert_eq!(picker.pick_folder("first?"), None);
    }

    #[test]
    fn test_prompt_picker_keeps_spaces_in_folder_names() {
        let mut picker = PromptPicker::new(
            Vec::<PathBuf>::new(),
            Cursor::new(" leading\ntrailing \r\n"),
            io::sink(),
        );
        assert_eq!(picker.pick_folder("first?"), Some(PathBuf::from(" leading")));
        assert_eq!(picker.pick_folder("second?"), Some(PathBuf::from("trailing ")));
    }

    #[test]
    fn test_prompt_picker_end_of_input_cancels() {
        let mut picker = PromptPicker::new(Vec::<PathBuf>::new(), Cursor::new(""), io::sink());
        assert_eq!(picker.pick_folder("first?"), None);
    }

    #[test]
    fn test_write_summary() {
        let summary = AuditSummary {
            folder1: PathBuf::from("/left"),
            folder2: PathBuf::from("/right"),
            folder1_files: 2,
            folder2_files: 2,
            folder1_bytes: 7,
            folder2_bytes: 1024,
            skipped_entries: 0,
            direction: Direction::SecondIsPrimary,
            primary: PathBuf::from("/right"),
            secondary: PathBuf::from("/left"),
            result: ComparisonResult {
                missing_from_secondary: vec![FileEntry::new("b.txt", 3)],
                size_mismatches: Vec::new(),
            },
            report_path: PathBuf::from("/out/Report-File.txt"),
            folder1_listing: PathBuf::from("/tmp/folder1_abc.txt"),
            folder2_listing: PathBuf::from("/tmp/folder2_def.txt"),
        };

        let mut out = Vec::new();
        write_summary(&mut out, &summary).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("Folder 1: /left (2 files, 7 bytes)\n"));
        assert!(text.contains("Folder 2: /right (2 files, 1024 bytes)\n"));
        assert!(text.contains("Primary folder: /right\n"));
        assert!(text.contains("Missing from /left: 1\n"));
        assert!(text.contains("Folder 1 contents: /tmp/folder1_abc.txt\n"));
        assert!(text.contains("Folder 2 contents: /tmp/folder2_def.txt\n"));
        assert!(text.ends_with("Final report has been generated: /out/Report-File.txt\n"));
        assert!(!text.contains("Skipped"));
    }
}
