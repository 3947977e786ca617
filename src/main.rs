use anyhow::Result;
use circuit_synth_patcher::config::{
    apply_patches, builtin_patches, check_patches, ApplicationError, LocatorSettings,
    PatchResult, RootSource, PACKAGE,
};
use circuit_synth_patcher::edit::{Substitution, SubstitutionOutcome};
use circuit_synth_patcher::locator::LibraryLocation;
use circuit_synth_patcher::safety::RootGuard;
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use similar::{ChangeTag, TextDiff};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "circuit-synth-patcher")]
#[command(about = "Apply known fixes to an installed circuit-synth library", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply patches to the installed library (default)
    Apply {
        #[command(flatten)]
        target: TargetArgs,

        /// Dry run - show what would be changed without modifying files
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Show unified diff of changes
        #[arg(short, long)]
        diff: bool,
    },

    /// Check status of patches without applying
    Status {
        #[command(flatten)]
        target: TargetArgs,
    },

    /// List built-in patches
    List,
}

#[derive(Args, Default)]
struct TargetArgs {
    /// Library root directory (skips Python resolution)
    #[arg(short, long)]
    root: Option<PathBuf>,

    /// Python interpreter used to locate the library
    #[arg(long)]
    python: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        None => cmd_apply(TargetArgs::default(), false, false),

        Some(Commands::Apply {
            target,
            dry_run,
            diff,
        }) => cmd_apply(target, dry_run, diff),

        Some(Commands::Status { target }) => cmd_status(target),

        Some(Commands::List) => cmd_list(),
    }
}

/// Locate the library, or `None` when it is not installed.
///
/// A missing library is not an error: the patches are for an optional
/// dependency, so there is simply nothing to do.
fn resolve_library(target: TargetArgs) -> Result<Option<LibraryLocation>> {
    let settings = LocatorSettings::from_env(target.root, target.python);

    if let Some(ignored) = &settings.ignored_env_root {
        eprintln!(
            "{}",
            format!(
                "Warning: CIRCUIT_SYNTH_ROOT is set but is not a directory: {}",
                ignored
            )
            .yellow()
        );
    }

    if let RootSource::Python { interpreter } = &settings.source {
        println!(
            "{}",
            format!("Locating {} via {}", PACKAGE, interpreter).dimmed()
        );
    }

    match settings.locator(PACKAGE).locate() {
        Ok(location) => Ok(Some(location)),
        Err(e) if e.is_not_found() => {
            println!("{} not found in the current environment.", PACKAGE);
            println!("{}", format!("  {}", e).dimmed());
            println!("Nothing to patch.");
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

fn print_location(location: &LibraryLocation) {
    println!("Library: {}", location.root.display());
    println!(
        "Version: {}",
        location.version.as_deref().unwrap_or("unknown")
    );
    println!();
}

/// Helper: Show unified diff between original and modified content
fn display_diff(file: &Path, original: &str, modified: &str) {
    println!(
        "\n{}",
        format!("--- {} (original)", file.display()).dimmed()
    );
    println!("{}", format!("+++ {} (patched)", file.display()).dimmed());

    let diff = TextDiff::from_lines(original, modified);

    for hunk in diff.unified_diff().context_radius(3).iter_hunks() {
        println!("{}", hunk.header().to_string().cyan());
        for change in hunk.iter_changes() {
            let line = match change.tag() {
                ChangeTag::Delete => format!("-{}", change).red(),
                ChangeTag::Insert => format!("+{}", change).green(),
                ChangeTag::Equal => format!(" {}", change).normal(),
            };
            print!("{}", line);
            if change.missing_newline() {
                println!();
            }
        }
    }
}

fn cmd_apply(target: TargetArgs, dry_run: bool, show_diff: bool) -> Result<()> {
    // 1. Locate the library
    let Some(location) = resolve_library(target)? else {
        return Ok(());
    };
    let guard = RootGuard::new(&location.root)?;
    print_location(&location);

    let specs = builtin_patches();

    // 2. Capture file contents before applying (for diff output)
    let mut file_contents_before: HashMap<PathBuf, String> = HashMap::new();
    if show_diff {
        for spec in &specs {
            let file_path = spec.resolve(guard.root());
            if let Ok(content) = fs::read_to_string(&file_path) {
                file_contents_before.insert(file_path, content);
            }
        }
    }

    // 3. Apply patches (or dry-run)
    let results = if dry_run {
        println!("{}", "[DRY RUN - no files will be modified]".cyan());
        check_patches(&guard, &specs)
    } else {
        apply_patches(&guard, &specs)
    };

    // 4. Report results
    let mut total_applied = 0;
    let mut total_already_patched = 0;
    let mut total_target_missing = 0;
    let mut total_file_missing = 0;
    let mut total_failed = 0;

    for ((patch_id, result), spec) in results.into_iter().zip(&specs) {
        match result {
            Ok(PatchResult::Applied {
                ref file,
                replacements,
            }) => {
                let verb = if dry_run { "Would apply to" } else { "Applied to" };
                println!(
                    "{} {}: {} {} ({} replacement{})",
                    "✓".green(),
                    patch_id,
                    verb,
                    file.display(),
                    replacements,
                    if replacements == 1 { "" } else { "s" }
                );
                total_applied += 1;

                if show_diff {
                    if let Some(before) = file_contents_before.get(file) {
                        let after = if dry_run {
                            match Substitution::new(spec.old_text(), spec.new_text())
                                .evaluate(before)
                            {
                                SubstitutionOutcome::Replaced { content, .. } => Some(content),
                                _ => None,
                            }
                        } else {
                            fs::read_to_string(file).ok()
                        };
                        if let Some(after) = after {
                            if before != &after {
                                display_diff(file, before, &after);
                            }
                        }
                    }
                }
            }
            Ok(PatchResult::AlreadyPatched { file }) => {
                println!(
                    "{} {}: Already patched {}",
                    "⊙".yellow(),
                    patch_id,
                    file.display()
                );
                total_already_patched += 1;
            }
            Ok(PatchResult::TargetMissing { file }) => {
                println!(
                    "{} {}: {} {}",
                    "⚠".yellow(),
                    patch_id,
                    "Warning: content mismatch, could not patch".yellow(),
                    file.display()
                );
                println!("  Neither the original nor the patched text was found.");
                println!("  The upstream file has changed; manual review needed.");
                total_target_missing += 1;
            }
            Ok(PatchResult::FileMissing { file }) => {
                println!(
                    "{} {}: File not found {}",
                    "⊘".cyan(),
                    patch_id,
                    file.display()
                );
                total_file_missing += 1;
            }
            Err(e) => {
                eprintln!("{} {}: Error - {}", "✗".red(), patch_id, e);
                total_failed += 1;

                match &e {
                    ApplicationError::Io { path, source } => {
                        eprintln!("  File: {}", path.display());
                        eprintln!("  Cause: {}", source);
                    }
                    ApplicationError::OutsideRoot { .. } => {
                        eprintln!("  {}", "Target resolves outside the library root".red());
                    }
                    _ => {}
                }
            }
        }
    }

    // 5. Summary
    println!();
    println!("{}", "Summary:".bold());
    println!("  {} applied", format!("{}", total_applied).green());
    println!(
        "  {} already patched",
        format!("{}", total_already_patched).yellow()
    );
    println!(
        "  {} target missing",
        format!("{}", total_target_missing).yellow()
    );
    println!("  {} file missing", format!("{}", total_file_missing).cyan());
    println!("  {} failed", format!("{}", total_failed).red());

    if total_failed > 0 {
        std::process::exit(1);
    }

    Ok(())
}

fn cmd_status(target: TargetArgs) -> Result<()> {
    let Some(location) = resolve_library(target)? else {
        return Ok(());
    };
    let guard = RootGuard::new(&location.root)?;

    println!("{}", "Patch Status Report".bold());
    print_location(&location);

    let mut applied = Vec::new();
    let mut pending = Vec::new();
    let mut drifted = Vec::new();
    let mut missing = Vec::new();
    let mut errors = Vec::new();

    // Read-only; does not mutate library files
    for (patch_id, result) in check_patches(&guard, &builtin_patches()) {
        match result {
            Ok(PatchResult::AlreadyPatched { .. }) => applied.push(patch_id),
            Ok(PatchResult::Applied { .. }) => pending.push(patch_id),
            Ok(PatchResult::TargetMissing { file }) => drifted.push((patch_id, file)),
            Ok(PatchResult::FileMissing { file }) => missing.push((patch_id, file)),
            Err(e) => errors.push((patch_id, e.to_string())),
        }
    }

    if !applied.is_empty() {
        println!(
            "{} {} ({} patches)",
            "✓".green(),
            "APPLIED".green().bold(),
            applied.len()
        );
        for id in &applied {
            println!("  - {}", id);
        }
        println!();
    }

    if !pending.is_empty() {
        println!(
            "{} {} ({} patches)",
            "⊙".yellow(),
            "PENDING".yellow().bold(),
            pending.len()
        );
        for id in &pending {
            println!("  - {}", id);
        }
        println!();
    }

    if !drifted.is_empty() {
        println!(
            "{} {} ({} patches)",
            "⚠".yellow(),
            "DRIFTED".yellow().bold(),
            drifted.len()
        );
        for (id, file) in &drifted {
            println!(
                "  - {} ({})",
                id,
                format!("manual review needed: {}", file.display()).dimmed()
            );
        }
        println!();
    }

    if !missing.is_empty() {
        println!(
            "{} {} ({} patches)",
            "⊘".cyan(),
            "MISSING FILE".cyan().bold(),
            missing.len()
        );
        for (id, file) in &missing {
            println!("  - {} ({})", id, file.display().to_string().dimmed());
        }
        println!();
    }

    if !errors.is_empty() {
        eprintln!(
            "{} {} ({} patches)",
            "✗".red(),
            "ERROR".red().bold(),
            errors.len()
        );
        for (id, reason) in &errors {
            eprintln!("  - {} ({})", id, reason);
        }
        eprintln!();
    }

    Ok(())
}

fn cmd_list() -> Result<()> {
    for spec in builtin_patches() {
        println!("{}", spec.id().bold());
        println!("  File: {}", spec.relative_path().display());
        println!("  {}", spec.description());
    }
    Ok(())
}
