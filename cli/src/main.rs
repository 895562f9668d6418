//! outlineiq CLI - PDF outline extraction tool

use std::fs;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use outlineiq::batch::{self, BatchOptions, BatchOutcome};
use outlineiq::options::{DEFAULT_MIN_H1, DEFAULT_MIN_H2, DEFAULT_MIN_H3, DEFAULT_PREVIEW_MAX_SIZE};
use outlineiq::{
    extract_file, extract_opened, render, ExtractOptions, HeadingLevel, JsonFormat, PdfDocument,
    Source,
};

#[derive(Parser)]
#[command(name = "outlineiq")]
#[command(version)]
#[command(about = "Extract heading outlines, links and image previews from PDFs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract the outline of one PDF as JSON
    Extract {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        #[command(flatten)]
        extract: ExtractArgs,
    },

    /// Extract every PDF in a directory to <name>.json
    Batch {
        /// Directory containing PDF files
        #[arg(short, long, value_name = "DIR", default_value = "input", env = "OUTLINEIQ_INPUT")]
        input: PathBuf,

        /// Directory for JSON results
        #[arg(short, long, value_name = "DIR", default_value = "output", env = "OUTLINEIQ_OUTPUT")]
        output: PathBuf,

        /// Keep existing JSON files instead of overwriting them
        #[arg(long)]
        skip_existing: bool,

        /// Process files one at a time
        #[arg(long)]
        sequential: bool,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        #[command(flatten)]
        extract: ExtractArgs,
    },

    /// Show document information and outline statistics
    Info {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Show version information
    Version,
}

/// Flags shared by the extracting commands.
#[derive(Args)]
struct ExtractArgs {
    /// Minimum font size for H1 headings
    #[arg(long, value_name = "PT", default_value_t = DEFAULT_MIN_H1)]
    min_h1: f64,

    /// Minimum font size for H2 headings
    #[arg(long, value_name = "PT", default_value_t = DEFAULT_MIN_H2)]
    min_h2: f64,

    /// Minimum font size for H3 headings
    #[arg(long, value_name = "PT", default_value_t = DEFAULT_MIN_H3)]
    min_h3: f64,

    /// Maximum width and height of image previews in pixels
    #[arg(long, value_name = "PX", default_value_t = DEFAULT_PREVIEW_MAX_SIZE)]
    preview_size: u32,

    /// Build a preview for every image, not just the first per page
    #[arg(long)]
    all_images: bool,
}

impl ExtractArgs {
    fn to_options(&self) -> ExtractOptions {
        let options = ExtractOptions::new()
            .with_thresholds(self.min_h1, self.min_h2, self.min_h3)
            .with_preview_max_size(self.preview_size);
        if self.all_images {
            options.with_all_images()
        } else {
            options
        }
    }
}

fn json_format(compact: bool) -> JsonFormat {
    if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Extract {
            input,
            output,
            compact,
            extract,
        } => cmd_extract(&input, output.as_deref(), compact, &extract),
        Commands::Batch {
            input,
            output,
            skip_existing,
            sequential,
            compact,
            extract,
        } => {
            let options = BatchOptions {
                overwrite: !skip_existing,
                parallel: !sequential,
                json_format: json_format(compact),
                extract: extract.to_options(),
            };
            cmd_batch(&input, &output, &options)
        }
        Commands::Info { input } => cmd_info(&input),
        Commands::Version => {
            cmd_version();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn cmd_extract(
    input: &Path,
    output: Option<&Path>,
    compact: bool,
    args: &ExtractArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let result = extract_file(input, &args.to_options())?;

    for warning in &result.warnings {
        eprintln!("{} {}", "Warning:".yellow(), warning);
    }

    if let Some(path) = output {
        let file = fs::File::create(path)?;
        render::write_json(&result, BufWriter::new(file), json_format(compact))?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", render::to_json(&result, json_format(compact))?);
    }

    Ok(())
}

fn cmd_batch(
    input: &Path,
    output: &Path,
    options: &BatchOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let files = batch::collect_pdfs(input)?;
    if files.is_empty() {
        println!("{} {}", "No PDFs found in".yellow(), input.display());
        return Ok(());
    }

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let report = batch::run_with_progress(input, output, options, |entry| {
        if let Some(name) = entry.input.file_name() {
            pb.set_message(name.to_string_lossy().to_string());
        }
        pb.inc(1);
    })?;

    pb.finish_with_message("Done!");

    println!();
    for entry in &report.entries {
        let name = entry.input.display();
        match &entry.outcome {
            BatchOutcome::Written(path) => {
                println!("  {} {} -> {}", "✓".green(), name, path.display())
            }
            BatchOutcome::Skipped(path) => println!(
                "  {} {} ({} exists)",
                "-".yellow(),
                name,
                path.display()
            ),
            BatchOutcome::Failed(reason) => println!("  {} {}: {}", "✗".red(), name, reason),
        }
    }

    println!(
        "\n{} {} written, {} skipped, {} failed in {:.2}s",
        "Summary:".cyan().bold(),
        report.written(),
        report.skipped(),
        report.failed(),
        report.elapsed.as_secs_f64()
    );

    Ok(())
}

fn cmd_info(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let doc = PdfDocument::open(Source::Path(input))?;
    let result = extract_opened(&doc, &ExtractOptions::default())?;

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: PDF {}", "Format".bold(), doc.version());
    println!("{}: {}", "Pages".bold(), doc.page_count());
    println!("{}: {}", "Title".bold(), result.title);

    println!();
    println!("{}", "Outline Statistics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    let count = |level: HeadingLevel| {
        result.headings.iter().filter(|h| h.level == level).count()
    };
    println!("{}: {}", "Headings".bold(), result.headings.len());
    println!("  {}: {}", "H1".bold(), count(HeadingLevel::H1));
    println!("  {}: {}", "H2".bold(), count(HeadingLevel::H2));
    println!("  {}: {}", "H3".bold(), count(HeadingLevel::H3));
    println!("{}: {}", "Links".bold(), result.metadata.links.len());
    println!(
        "{}: {:?}",
        "Pages with images".bold(),
        result.metadata.pages_with_images
    );

    if result.has_warnings() {
        println!();
        println!("{}", "Scan Warnings".yellow().bold());
        println!("{}", "─".repeat(40).dimmed());
        for warning in &result.warnings {
            println!("  {}", warning);
        }
    }

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "outlineiq".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("PDF outline, link and image preview extraction tool");
    println!();
    println!("License: MIT");
}
