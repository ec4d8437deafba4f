//! unedgar CLI - 10-K submission to clean text

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use unedgar::parser::DocumentExtractor;
use unedgar::render::{normalize_text, to_json, AssetRenderer, RawAssetWriter, WkhtmlRenderer};
use unedgar::{
    batch_stats, convert_batch, convert_file, default_output_path, detect, ConvertOptions,
    ConvertOutcome, JsonFormat, Submission,
};

#[derive(Parser)]
#[command(name = "unedgar")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Convert SEC 10-K submissions to clean text", long_about = None)]
struct Cli {
    /// Input submission file
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output text file
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a submission to a parsed text file
    Convert {
        /// Input submission file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (derived from the input name if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Replace an existing output
        #[arg(long)]
        overwrite: bool,

        /// Write extracted tables and images
        #[arg(long)]
        assets: bool,

        /// Asset directory (input path without extension if not specified)
        #[arg(long, value_name = "DIR")]
        asset_dir: Option<PathBuf>,

        /// Rasterise tables with wkhtmltoimage instead of writing HTML
        #[arg(long)]
        wkhtml: bool,
    },

    /// Print reflowed text
    Text {
        /// Input submission file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Normalize an already flattened text file
    Normalize {
        /// Input text file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Convert a submission to JSON
    Json {
        /// Input submission file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Show header metadata and embedded documents
    Info {
        /// Input submission file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Decode every uuencoded attachment
    Extract {
        /// Input submission file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output directory
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,
    },

    /// Convert many submissions
    Batch {
        /// Input submission files
        #[arg(value_name = "FILES", required = true)]
        inputs: Vec<PathBuf>,

        /// Output directory (next to each input if not specified)
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Replace existing outputs
        #[arg(long)]
        overwrite: bool,

        /// Convert one file at a time
        #[arg(long)]
        sequential: bool,
    },

    /// Show version information
    Version,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Convert {
            input,
            output,
            overwrite,
            assets,
            asset_dir,
            wkhtml,
        }) => cmd_convert(
            &input,
            output.as_deref(),
            overwrite,
            assets,
            asset_dir,
            wkhtml,
        ),
        Some(Commands::Text { input, output }) => cmd_text(&input, output.as_deref()),
        Some(Commands::Normalize { input, output }) => cmd_normalize(&input, output.as_deref()),
        Some(Commands::Json {
            input,
            output,
            compact,
        }) => cmd_json(&input, output.as_deref(), compact),
        Some(Commands::Info { input }) => cmd_info(&input),
        Some(Commands::Extract { input, output }) => cmd_extract(&input, output.as_deref()),
        Some(Commands::Batch {
            inputs,
            output,
            overwrite,
            sequential,
        }) => cmd_batch(&inputs, output.as_deref(), overwrite, sequential),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            // Default behavior: convert if input is provided
            if let Some(input) = cli.input {
                cmd_convert(&input, cli.output.as_deref(), false, false, None, false)
            } else {
                println!("{}", "Usage: unedgar <FILE> [OUTPUT]".yellow());
                println!("       unedgar --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn renderer(wkhtml: bool) -> Box<dyn AssetRenderer> {
    if wkhtml {
        Box::new(WkhtmlRenderer::new())
    } else {
        Box::new(RawAssetWriter)
    }
}

fn write_or_print(content: &str, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(path) = output {
        unedgar::write_content(content, path)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", content);
    }
    Ok(())
}

fn cmd_convert(
    input: &Path,
    output: Option<&Path>,
    overwrite: bool,
    assets: bool,
    asset_dir: Option<PathBuf>,
    wkhtml: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let output = output
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| default_output_path(input));

    let mut options = ConvertOptions::new()
        .with_overwrite(overwrite)
        .with_assets(assets);
    if let Some(dir) = asset_dir {
        options = options.with_asset_dir(dir);
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.set_message(format!("Converting {}...", input.display()));
    pb.enable_steady_tick(std::time::Duration::from_millis(100));

    let outcome = convert_file(input, &output, &options, &*renderer(wkhtml));
    pb.finish_and_clear();

    match outcome? {
        ConvertOutcome::Written {
            path,
            assets,
            stats,
        } => {
            println!("{} {}", "Saved to".green(), path.display());
            println!(
                "  {} {} words, {} tables, {} images",
                "├─".dimmed(),
                stats.word_count,
                stats.table_count,
                stats.image_count
            );
            println!("  {} {} asset files", "└─".dimmed(), assets.len());
        }
        ConvertOutcome::Skipped(path) => {
            println!(
                "{} {} already exists (use --overwrite)",
                "Skipped".yellow(),
                path.display()
            );
        }
    }

    Ok(())
}

fn cmd_text(input: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let filing = unedgar::parse_file(input)?;
    write_or_print(&filing.text, output)
}

fn cmd_normalize(input: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let text = fs::read_to_string(input)?;
    write_or_print(&normalize_text(&text), output)
}

fn cmd_json(
    input: &Path,
    output: Option<&Path>,
    compact: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let filing = unedgar::parse_file(input)?;

    let format = if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };

    let json = to_json(&filing, format)?;
    write_or_print(&json, output)
}

fn cmd_info(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let raw = detect::read_submission(input)?;
    let format = detect::detect_format_from_str(&raw)?;
    let submission = Submission::new(raw);
    let meta = submission.metadata();

    println!("{}", "Submission Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Format".bold(), format);

    if let Some(ref company) = meta.company_name {
        println!("{}: {}", "Company".bold(), company);
    }
    if let Some(ref cik) = meta.cik {
        println!("{}: {}", "CIK".bold(), cik);
    }
    if let Some(ref accession) = meta.accession_number {
        println!("{}: {}", "Accession".bold(), accession);
    }
    if let Some(ref kind) = meta.submission_type {
        println!("{}: {}", "Type".bold(), kind);
    }
    if let Some(period) = meta.period_of_report {
        println!("{}: {}", "Period".bold(), period);
    }
    if let Some(filed) = meta.filed_date {
        println!("{}: {}", "Filed".bold(), filed);
    }

    println!();
    println!("{}", "Embedded Documents".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    for doc in submission.documents() {
        println!(
            "{:>4}  {:<12} {:<40} {}",
            doc.index,
            doc.doc_type.unwrap_or("-"),
            doc.filename.unwrap_or("-"),
            if doc.is_uuencoded() {
                "uuencoded".dimmed().to_string()
            } else {
                String::new()
            }
        );
    }

    Ok(())
}

fn cmd_extract(input: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let raw = detect::read_submission(input)?;
    let submission = Submission::new(raw);
    let extractor = DocumentExtractor::new(submission.raw());

    let output_dir = output
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."));
    fs::create_dir_all(&output_dir)?;

    let mut count = 0;
    for doc in submission.documents() {
        let Some(filename) = doc.filename else {
            continue;
        };
        if !doc.is_uuencoded() {
            continue;
        }

        match extractor.binary_file(filename) {
            Ok(data) => {
                let name = unedgar::render::asset_file_name(filename);
                fs::write(output_dir.join(&name), &data)?;
                println!("{} {}", "Extracted".green(), name);
                count += 1;
            }
            Err(e) => eprintln!("{} {}: {}", "Skipped".yellow(), filename, e),
        }
    }

    println!("\n{} {} attachments extracted", "Done!".green().bold(), count);

    Ok(())
}

fn cmd_batch(
    inputs: &[PathBuf],
    output: Option<&Path>,
    overwrite: bool,
    sequential: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut options = ConvertOptions::new().with_overwrite(overwrite);
    if sequential {
        options = options.sequential();
    }
    log::debug!(
        "Batch of {} submissions, parallel={}",
        inputs.len(),
        options.parallel
    );

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.set_message(format!("Converting {} submissions...", inputs.len()));
    pb.enable_steady_tick(std::time::Duration::from_millis(100));

    let items = convert_batch(inputs, output, &options, &RawAssetWriter);
    pb.finish_and_clear();

    let mut failed = 0;
    for item in &items {
        match &item.result {
            Ok(ConvertOutcome::Written { path, .. }) => {
                println!("{} {}", "Converted".green(), path.display())
            }
            Ok(ConvertOutcome::Skipped(path)) => {
                println!("{} {}", "Skipped".yellow(), path.display())
            }
            Err(e) => {
                failed += 1;
                eprintln!("{} {}: {}", "Failed".red(), item.input.display(), e);
            }
        }
    }

    println!(
        "\n{} {} of {} submissions converted",
        "Done!".green().bold(),
        items.len() - failed,
        items.len()
    );
    let totals = batch_stats(&items);
    println!(
        "  {} words, {} tables, {} images",
        totals.word_count, totals.table_count, totals.image_count
    );

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "unedgar".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("SEC 10-K submission to clean text");
    println!();
    println!("Repository: {}", "https://github.com/iyulab/unedgar".dimmed());
    println!("License: MIT");
}
