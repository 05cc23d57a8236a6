use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use similar::{ChangeTag, TextDiff};
use span_rewriter::diagnostic::{Diagnostic, Level};
use span_rewriter::output::atomic_write;
use span_rewriter::script::{load_from_path, run_script, RunOptions, RunReport};
use span_rewriter::{Rewriter, SourceBuffer};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "span-rewriter")]
#[command(about = "Apply batches of byte-range edits with clobber detection", long_about = None)]
#[command(version)]
struct Cli {
    /// Log scheduling decisions (repeat for more detail)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply an edit script to a source file
    Apply {
        /// File to rewrite
        #[arg(short, long)]
        source: PathBuf,

        /// Edit script (TOML, or JSON with a .json extension)
        #[arg(short = 'e', long)]
        script: PathBuf,

        /// Write the result back to the source file instead of stdout
        #[arg(short, long)]
        in_place: bool,

        /// Show unified diff of changes
        #[arg(short, long)]
        diff: bool,

        /// Skip conflicting edits and failed transactions instead of aborting
        #[arg(short, long)]
        keep_going: bool,
    },

    /// Schedule an edit script without writing anything and report conflicts
    Check {
        /// File the script targets
        #[arg(short, long)]
        source: PathBuf,

        /// Edit script (TOML, or JSON with a .json extension)
        #[arg(short = 'e', long)]
        script: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Apply {
            source,
            script,
            in_place,
            diff,
            keep_going,
        } => cmd_apply(&source, &script, in_place, diff, keep_going),

        Commands::Check { source, script } => cmd_check(&source, &script),
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

fn load_buffer(path: &Path) -> Result<SourceBuffer> {
    SourceBuffer::from_path(path).with_context(|| format!("failed to read {}", path.display()))
}

/// Helper: Print diagnostics with the offending source line underlined
fn print_diagnostics(buffer: &SourceBuffer, diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        let rendered = diagnostic.render(buffer);
        let (head, rest) = rendered.split_once('\n').unwrap_or((rendered.as_str(), ""));
        let head = match diagnostic.level {
            Level::Error => head.red().bold(),
            Level::Note => head.cyan(),
        };
        eprintln!("{}", head);
        if !rest.is_empty() {
            eprintln!("{}", rest);
        }
    }
}

/// Helper: Show unified diff between original and modified content
fn display_diff(file: &Path, original: &str, modified: &str) {
    println!("{}", format!("--- {} (original)", file.display()).dimmed());
    println!("{}", format!("+++ {} (rewritten)", file.display()).dimmed());

    let diff = TextDiff::from_lines(original, modified);

    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => format!("-{}", change).red(),
            ChangeTag::Insert => format!("+{}", change).green(),
            ChangeTag::Equal => format!(" {}", change).normal(),
        };
        print!("{}", sign);
    }
}

fn print_failures(report: &RunReport) {
    for failure in &report.failures {
        eprintln!("{} {}", "✗".red(), failure);
    }
}

fn cmd_apply(
    source: &Path,
    script_path: &Path,
    in_place: bool,
    show_diff: bool,
    keep_going: bool,
) -> Result<()> {
    let buffer = load_buffer(source)?;
    let script = load_from_path(script_path)?;

    let mut rewriter = Rewriter::with_sink(&buffer, Vec::<Diagnostic>::new());
    let report = match run_script(&script, &mut rewriter, RunOptions { keep_going }) {
        Ok(report) => report,
        Err(err) => {
            print_diagnostics(&buffer, rewriter.diagnostics());
            eprintln!("{} {}", "✗".red(), err);
            std::process::exit(1);
        }
    };

    print_diagnostics(&buffer, rewriter.diagnostics());
    print_failures(&report);

    let rewritten = rewriter.process()?;

    if show_diff {
        display_diff(source, buffer.source(), &rewritten);
    }

    if in_place {
        if rewritten != buffer.source() {
            atomic_write(source, rewritten.as_bytes())
                .with_context(|| format!("failed to write {}", source.display()))?;
        }
        eprintln!(
            "{} {}: {} edit(s) applied",
            "✓".green(),
            source.display(),
            report.scheduled
        );
    } else if !show_diff {
        print!("{}", rewritten);
    }

    if !report.is_clean() {
        std::process::exit(1);
    }

    Ok(())
}

fn cmd_check(source: &Path, script_path: &Path) -> Result<()> {
    let buffer = load_buffer(source)?;
    let script = load_from_path(script_path)?;

    let mut rewriter = Rewriter::with_sink(&buffer, Vec::<Diagnostic>::new());
    let report = run_script(&script, &mut rewriter, RunOptions { keep_going: true })?;

    print_diagnostics(&buffer, rewriter.diagnostics());
    print_failures(&report);

    println!("{}", "Summary:".bold());
    println!("  {} scheduled", format!("{}", report.scheduled).green());
    println!(
        "  {} transaction(s) committed",
        format!("{}", report.transactions_committed).cyan()
    );
    println!("  {} failed", format!("{}", report.failures.len()).red());

    if !report.is_clean() {
        std::process::exit(1);
    }

    Ok(())
}
