use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use dialoguer::Confirm;
use indicatif::{ProgressBar, ProgressStyle};
use pdfdedup::core::{Analysis, DedupPhase, DedupProgress, ProgressCallback};
use pdfdedup::services::{DedupRecord, HistoryService, PdfDocument, assemble, resolve_output_path};
use pdfdedup::{DedupConfig, DuplicateDetector, ExtractionFailurePolicy, Tokenizer};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(
    name = "pdfdedup",
    version,
    about = "Remove duplicate pages from a PDF",
    after_help = "Matching is fuzzy and can report false positives, e.g. pages that differ only in \
                  text colour or highlighting, or in where a shape is drawn."
)]
struct Cli {
    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Detect duplicate pages and write a copy without them
    Remove {
        /// PDF to deduplicate
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Output file name, placed next to the input (default: outfile.pdf)
        #[arg(short, long, value_name = "NAME")]
        output: Option<String>,
        /// Only show what would be removed
        #[arg(long)]
        dry_run: bool,
        /// Ask before writing the output file
        #[arg(long)]
        interactive: bool,
        #[command(flatten)]
        engine: EngineArgs,
    },

    /// List duplicate pages without writing anything
    Scan {
        /// PDF to analyze
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Print the analysis as JSON
        #[arg(long)]
        json: bool,
        #[command(flatten)]
        engine: EngineArgs,
    },

    /// Work with dedup history
    History {
        #[command(subcommand)]
        command: HistoryCmd,
    },
}

#[derive(Subcommand, Debug)]
enum HistoryCmd {
    /// List all dedup history records
    List {
        /// Directory containing the PDFs
        #[arg(short, long, value_name = "DIR")]
        path: PathBuf,
    },
}

#[derive(Args, Debug)]
struct EngineArgs {
    /// Similarity a pair must exceed to count as duplicate (0..=1)
    #[arg(long, value_name = "F")]
    threshold: Option<f64>,
    /// What to do with pages whose content cannot be read
    #[arg(long, value_enum, value_name = "POLICY")]
    on_error: Option<OnError>,
    /// Compare page text by characters or by words
    #[arg(long, value_enum)]
    tokens: Option<Tokens>,
    /// Treat two blank pages as duplicates
    #[arg(long)]
    match_blank_pages: bool,
    /// Compare page pairs on all cores
    #[arg(long)]
    parallel: bool,
    /// JSON config file; flags override its values
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum OnError {
    Abort,
    Empty,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Tokens {
    Chars,
    Words,
}

impl EngineArgs {
    fn to_config(&self) -> Result<DedupConfig> {
        let mut config = match &self.config {
            Some(path) => DedupConfig::from_json_file(path)
                .with_context(|| format!("Failed to load config {:?}", path))?,
            None => DedupConfig::default(),
        };
        if let Some(threshold) = self.threshold {
            if !(0.0..=1.0).contains(&threshold) {
                bail!("--threshold must be between 0 and 1, got {}", threshold);
            }
            config.threshold = threshold;
        }
        if let Some(policy) = self.on_error {
            config.on_extraction_error = match policy {
                OnError::Abort => ExtractionFailurePolicy::Abort,
                OnError::Empty => ExtractionFailurePolicy::TreatAsEmpty,
            };
        }
        if let Some(tokens) = self.tokens {
            config.tokenizer = match tokens {
                Tokens::Chars => Tokenizer::Chars,
                Tokens::Words => Tokenizer::Words,
            };
        }
        config.blank_pages_match |= self.match_blank_pages;
        config.parallel |= self.parallel;
        Ok(config)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Remove {
            file,
            output,
            dry_run,
            interactive,
            engine,
        } => {
            println!("▶ Removing duplicate pages from: {}", file.display());
            let pdf = load_pdf(&file)?;
            let detector = DuplicateDetector::new(engine.to_config()?)?
                .with_progress_callback(progress_bar(false)?);

            let analysis = benchmark("analysis", || detector.analyze(&pdf.pages()))
                .with_context(|| format!("Failed to analyze {}", file.display()))?;
            print_pairs(&analysis);

            let Some(deletion) = analysis.deletion_set() else {
                detector.finish(analysis.page_count);
                println!("No duplicates found.");
                println!("No output file produced!");
                return Ok(());
            };

            let out_path = resolve_output_path(&file, output.as_deref());
            println!(
                "   🗑️  Pages to remove: {:?} ({} of {} kept)",
                deletion.page_numbers(),
                analysis.kept_pages(),
                analysis.page_count
            );

            if dry_run {
                detector.finish(analysis.page_count);
                println!(
                    "\n⚠️  Dry-run only; {} was not written.",
                    out_path.display()
                );
                return Ok(());
            }

            if interactive
                && !Confirm::new()
                    .with_prompt(format!("Write {}?", out_path.display()))
                    .default(true)
                    .interact()?
            {
                detector.finish(analysis.page_count);
                println!("Aborted; no output file produced.");
                return Ok(());
            }

            let kept = assemble(&pdf, deletion, &out_path, &detector.context())
                .with_context(|| format!("Failed to write {}", out_path.display()))?;
            detector.finish(kept);
            println!("   📄 Wrote {} page(s) → {}", kept, out_path.display());

            let history = HistoryService::new(file.parent().unwrap_or_else(|| Path::new("")));
            history
                .append(&DedupRecord::now(
                    &file,
                    &out_path,
                    deletion.page_numbers(),
                    kept,
                ))
                .with_context(|| format!("Failed to update history {:?}", history.path()))?;
            println!("\n✅ Recorded dedup history in {}", history.path().display());
        }

        Commands::Scan { file, json, engine } => {
            if !json {
                println!("▶ Scanning for duplicate pages in: {}", file.display());
            }
            let pdf = load_pdf(&file)?;
            let detector = DuplicateDetector::new(engine.to_config()?)?
                .with_progress_callback(progress_bar(json)?);

            let analysis = detector
                .analyze(&pdf.pages())
                .with_context(|| format!("Failed to analyze {}", file.display()))?;
            detector.finish(analysis.page_count);

            if json {
                println!("{}", serde_json::to_string_pretty(&analysis)?);
            } else {
                print_pairs(&analysis);
                match analysis.deletion_set() {
                    None => println!("No duplicates found."),
                    Some(deletion) => println!(
                        "Duplicate pages: {:?} ({} of {} would be kept)",
                        deletion.page_numbers(),
                        analysis.kept_pages(),
                        analysis.page_count
                    ),
                }
            }
        }

        Commands::History { command } => match command {
            HistoryCmd::List { path } => {
                let history = HistoryService::new(&path);
                let records = history
                    .records()
                    .with_context(|| format!("Could not open history file {:?}", history.path()))?;

                println!("🗂️  Dedup History:");
                for (i, rec) in records.iter().enumerate() {
                    println!(
                        "[{}] {}\n     input: {}\n     output: {}\n     removed: {:?}\n     kept: {}\n",
                        i, rec.timestamp, rec.input, rec.output, rec.removed_pages, rec.kept_pages
                    );
                }
            }
        },
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn load_pdf(path: &Path) -> Result<PdfDocument> {
    PdfDocument::load(path).with_context(|| format!("File {:?} cannot be opened", path))
}

/// Print every similar pair with 1-based page numbers and text checksums.
fn print_pairs(analysis: &Analysis) {
    let checksum = |i: usize| analysis.text_checksums.get(i).copied().unwrap_or(0);

    for pair in &analysis.candidates {
        println!(
            "Pages {} and {} are similar: ({:.4}, sumPx: {}, sumPy: {})",
            pair.a + 1,
            pair.b + 1,
            pair.similarity,
            checksum(pair.a),
            checksum(pair.b)
        );
    }
    for pair in &analysis.rejected {
        println!(
            "Pages {} and {} share text ({:.4}) but their images differ; both kept",
            pair.a + 1,
            pair.b + 1,
            pair.similarity
        );
    }

    let detected = analysis.candidates.len() + analysis.rejected.len();
    if detected > 0 {
        println!("Detected pairs: {}", detected);
    }
}

/// One bar reused across phases; it is reset whenever the phase changes.
fn progress_bar(hidden: bool) -> Result<ProgressCallback> {
    let bar = if hidden {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(0)
    };
    bar.set_style(ProgressStyle::with_template(
        "{msg:<18} [{bar:40.cyan/blue}] {pos}/{len}",
    )?);

    let current = Mutex::new(None::<DedupPhase>);
    Ok(Box::new(move |progress: DedupProgress| {
        let mut current = current.lock().unwrap_or_else(|e| e.into_inner());
        if *current != Some(progress.phase) {
            *current = Some(progress.phase);
            bar.reset();
            bar.set_length(progress.total as u64);
            bar.set_message(match progress.phase {
                DedupPhase::Extracting => "Extracting text",
                DedupPhase::Analyzing => "Analyzing",
                DedupPhase::Assembling => "Building output",
                DedupPhase::Complete => "Done",
            });
        }
        bar.set_position(progress.completed as u64);
        if progress.phase == DedupPhase::Complete {
            bar.finish_and_clear();
        }
    }))
}

/// Run `f()`, log how long it took (with `label`), and return its result.
fn benchmark<T, F: FnOnce() -> T>(label: &str, f: F) -> T {
    let start = Instant::now();
    let result = f();
    log::info!("⏱ {} took {:.2?}", label, start.elapsed());
    result
}
