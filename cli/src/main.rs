//! pdfdown CLI - layout-aware PDF to Markdown conversion

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use pdfdown::source::detect_version;
use pdfdown::{
    ConversionReport, ConvertOptions, Converter, DocumentSource, ErrorMode, LayoutConfig,
    LopdfDocument, PostProcessOptions,
};

#[derive(Parser)]
#[command(name = "pdfdown")]
#[command(version)]
#[command(about = "Convert PDF documents to layout-aware Markdown", long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(flatten)]
    convert: ConvertArgs,

    /// Show debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show document information and what a conversion would find
    Info {
        /// Input PDF file
        #[arg(value_name = "PDF")]
        input: PathBuf,

        /// Layout thresholds as JSON
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },

    /// Show version information
    Version,
}

#[derive(Args)]
struct ConvertArgs {
    /// Input PDF file
    #[arg(value_name = "PDF")]
    input: Option<PathBuf>,

    /// Directory for the Markdown file
    #[arg(short, long, value_name = "DIR", env = "PDFDOWN_OUTPUT_DIR", default_value = ".")]
    output: PathBuf,

    /// Directory for extracted images [default: <OUTPUT>/images]
    #[arg(long, value_name = "DIR", env = "PDFDOWN_IMAGE_DIR")]
    images: Option<PathBuf>,

    /// Prefix of image links in the Markdown
    #[arg(long, value_name = "PREFIX", env = "PDFDOWN_IMAGE_PREFIX", default_value = "images")]
    image_prefix: String,

    /// Markdown file name (".md" is appended when missing)
    #[arg(long, value_name = "FILE")]
    name: Option<String>,

    /// Fail on pages whose content cannot be read
    #[arg(long)]
    strict: bool,

    /// Do not extract images
    #[arg(long)]
    no_images: bool,

    /// Do not render ruled tables
    #[arg(long)]
    no_tables: bool,

    /// Keep running headers and footers
    #[arg(long)]
    keep_headers: bool,

    /// Normalize Unicode to NFC and replace ligatures
    #[arg(long)]
    nfc: bool,

    /// Layout thresholds as JSON
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print conversion statistics as JSON
    #[arg(long)]
    stats: bool,
}

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let result = match cli.command {
        Some(Commands::Info { input, config }) => cmd_info(&input, config.as_deref()),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => match cli.convert.input {
            Some(ref input) => cmd_convert(input, &cli.convert),
            None => {
                println!("{}", "Usage: pdfdown <PDF> [OPTIONS]".yellow());
                println!("       pdfdown --help for more information");
                Ok(())
            }
        },
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn load_layout(config: Option<&Path>) -> Result<LayoutConfig, Box<dyn std::error::Error>> {
    match config {
        Some(path) => {
            let json = fs::read_to_string(path)?;
            Ok(LayoutConfig::from_json(&json)?)
        }
        None => Ok(LayoutConfig::default()),
    }
}

fn build_options(args: &ConvertArgs) -> Result<ConvertOptions, Box<dyn std::error::Error>> {
    let image_dir = args
        .images
        .clone()
        .unwrap_or_else(|| args.output.join("images"));

    let mut options = ConvertOptions::new()
        .with_output_dir(&args.output)
        .with_image_output_dir(image_dir)
        .with_public_image_path(args.image_prefix.trim_end_matches('/'))
        .with_error_mode(if args.strict {
            ErrorMode::Strict
        } else {
            ErrorMode::Lenient
        })
        .with_images(!args.no_images)
        .with_tables(!args.no_tables)
        .with_header_footer_detection(!args.keep_headers)
        .with_post_process(
            PostProcessOptions::new()
                .with_normalize_unicode(args.nfc)
                .with_fix_ligatures(args.nfc),
        )
        .with_layout(load_layout(args.config.as_deref())?);

    if let Some(ref name) = args.name {
        options = options.with_custom_filename(name);
    }
    log::debug!("Resolved options: {:?}", options);
    Ok(options)
}

fn spinner(message: &str) -> Result<ProgressBar, Box<dyn std::error::Error>> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    Ok(pb)
}

fn cmd_convert(input: &Path, args: &ConvertArgs) -> Result<(), Box<dyn std::error::Error>> {
    let converter = Converter::new(build_options(args)?);

    let pb = spinner(&format!("Converting {}...", input.display()))?;
    let output = match converter.convert(input) {
        Ok(output) => output,
        Err(e) => {
            pb.finish_and_clear();
            return Err(e.into());
        }
    };
    pb.finish_with_message("Done!");

    let report = &output.report;
    println!("\n{} {}", "Saved to".green().bold(), output.markdown_path.display());
    println!(
        "  {} {} pages, {} headings, {} tables, {} images",
        "├─".dimmed(),
        report.page_count,
        report.heading_count,
        report.table_count,
        report.image_count
    );
    println!(
        "  {} {} header/footer lines removed",
        "└─".dimmed(),
        report.header_footer_lines
    );
    if report.skipped() > 0 {
        println!(
            "{} {} tables and {} images could not be extracted",
            "Warning:".yellow().bold(),
            report.tables_skipped,
            report.images_skipped
        );
    }

    if args.stats {
        println!("{}", report.to_json()?);
    }

    Ok(())
}

fn cmd_info(input: &Path, config: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let data = fs::read(input)?;
    let version = detect_version(&data)?;
    let document = LopdfDocument::from_bytes(&data)?;
    log::debug!("{}: PDF {} with {} pages", input.display(), version, document.page_count());

    let options = ConvertOptions::new()
        .with_images(false)
        .with_layout(load_layout(config)?);
    let (_, report) = Converter::new(options).render_document(&document, "document")?;

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "File".bold(), input.display());
    println!("{}: PDF {}", "Format".bold(), version);
    println!("{}: {}", "Pages".bold(), document.page_count());

    println!();
    println!("{}", "Layout".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    print_report(&report);

    Ok(())
}

fn print_report(report: &ConversionReport) {
    println!("{}: {}", "Headings".bold(), report.heading_count);
    println!("{}: {}", "Paragraphs".bold(), report.text_block_count);
    println!("{}: {}", "List items".bold(), report.list_item_count);
    println!(
        "{}: {} ({} skipped)",
        "Tables".bold(),
        report.table_count,
        report.tables_skipped
    );
    println!("{}: {}", "Header/footer lines".bold(), report.header_footer_lines);
    println!("{}: {}", "Pages without text".bold(), report.pages_without_text);
}

fn cmd_version() {
    println!("{} {}", "pdfdown".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Layout-aware PDF to Markdown conversion");
    println!();
    println!("License: MIT");
}
