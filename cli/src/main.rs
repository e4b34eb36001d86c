//! paperblocks CLI - structure extracted PDF text into content blocks

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;

use paperblocks::pipeline::{
    parse_flag, DEFAULT_MAX_BLOCK_CHARS, DEFAULT_MAX_PAGES, ENV_INCLUDE_PAGE_NUMBERS,
};
use paperblocks::render::{self, notion};
use paperblocks::{
    load_pages_file, BlockKind, Document, ExtractionStats, JsonFormat, Pipeline, PipelineOptions,
    RenderOptions,
};

#[derive(Parser)]
#[command(name = "paperblocks")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Structure extracted PDF text into typed content blocks", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Structure one page-record file
    Structure {
        /// Page records (JSON array or JSON lines)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "json")]
        format: OutputFormat,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        /// PDF URL to embed ahead of Notion blocks
        #[arg(long, value_name = "URL")]
        pdf_url: Option<String>,

        #[command(flatten)]
        pipeline: PipelineArgs,
    },

    /// Structure many page-record files in parallel
    Batch {
        /// Page-record files
        #[arg(value_name = "FILES", required = true)]
        inputs: Vec<PathBuf>,

        /// Output directory
        #[arg(short, long, value_name = "DIR", default_value = "blocks")]
        output: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "json")]
        format: OutputFormat,

        #[command(flatten)]
        pipeline: PipelineArgs,
    },

    /// Show page and block statistics
    Info {
        /// Page records (JSON array or JSON lines)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        #[command(flatten)]
        pipeline: PipelineArgs,
    },

    /// Show version information
    Version,
}

#[derive(Args)]
struct PipelineArgs {
    /// Maximum number of pages to structure
    #[arg(long, env = "PDF_MAX_PAGES", default_value_t = DEFAULT_MAX_PAGES)]
    max_pages: u32,

    /// Insert "Page N" headings before each page's content
    #[arg(
        long,
        env = "PDF_INCLUDE_PAGE_NUMBERS",
        action = clap::ArgAction::Set,
        value_parser = parse_flag_arg,
        num_args = 0..=1,
        default_value = "false",
        default_missing_value = "true"
    )]
    page_numbers: bool,

    /// Maximum characters per block
    #[arg(long, env = "MAX_BLOCK_CHARS", default_value_t = DEFAULT_MAX_BLOCK_CHARS)]
    max_block_chars: usize,

    /// Keep page numbers, permission notices and venue headers
    #[arg(long)]
    keep_boilerplate: bool,
}

impl PipelineArgs {
    fn options(&self) -> PipelineOptions {
        PipelineOptions::new()
            .with_max_pages(self.max_pages)
            .with_page_numbers(self.page_numbers)
            .with_max_block_chars(self.max_block_chars)
            .with_boilerplate_filter(!self.keep_boilerplate)
    }
}

fn parse_flag_arg(value: &str) -> Result<bool, String> {
    parse_flag(ENV_INCLUDE_PAGE_NUMBERS, value).map_err(|e| e.to_string())
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Document JSON (blocks, page counts, statistics)
    Json,
    /// Markdown preview
    #[value(alias = "md")]
    Markdown,
    /// Notion block payloads
    Notion,
}

impl OutputFormat {
    fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "blocks.json",
            OutputFormat::Markdown => "md",
            OutputFormat::Notion => "notion.json",
        }
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Structure {
            input,
            output,
            format,
            compact,
            pdf_url,
            pipeline,
        } => cmd_structure(
            &input,
            output.as_deref(),
            format,
            compact,
            pdf_url,
            pipeline.options(),
        ),
        Commands::Batch {
            inputs,
            output,
            format,
            pipeline,
        } => cmd_batch(&inputs, &output, format, pipeline.options()),
        Commands::Info { input, pipeline } => cmd_info(&input, pipeline.options()),
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

/// Render a document in the requested format.
fn render_document(
    doc: &Document,
    format: OutputFormat,
    compact: bool,
    render_options: &RenderOptions,
) -> Result<String, Box<dyn std::error::Error>> {
    let json_format = if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };

    let content = match format {
        OutputFormat::Json => render::to_json(doc, json_format)?,
        OutputFormat::Markdown => render::to_markdown(doc, render_options)?,
        OutputFormat::Notion => {
            let blocks = notion::page_blocks(doc, render_options)?;
            let batches: Vec<&[serde_json::Value]> = notion::batches(&blocks).collect();
            let payload = serde_json::json!({ "batches": batches });
            if compact {
                serde_json::to_string(&payload)?
            } else {
                serde_json::to_string_pretty(&payload)?
            }
        }
    };
    Ok(content)
}

/// Output path for one input inside a batch directory.
fn output_path(input: &Path, output_dir: &Path, format: OutputFormat) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    let stem = stem.strip_suffix(".pages").unwrap_or(stem.as_ref());
    output_dir.join(format!("{}.{}", stem, format.extension()))
}

fn cmd_structure(
    input: &Path,
    output: Option<&Path>,
    format: OutputFormat,
    compact: bool,
    pdf_url: Option<String>,
    options: PipelineOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    options.validate()?;
    let pages = load_pages_file(input)?;
    let doc = Pipeline::new(options).run(&pages);

    let mut render_options = RenderOptions::new();
    if let Some(url) = pdf_url {
        render_options = render_options.with_pdf_url(url);
    }

    let content = render_document(&doc, format, compact, &render_options)?;

    if let Some(path) = output {
        fs::write(path, &content)?;
        println!(
            "{} {} ({} blocks)",
            "Saved to".green(),
            path.display(),
            doc.len()
        );
    } else {
        println!("{}", content);
    }

    if doc.truncated {
        eprintln!(
            "{} processed {} of {} pages",
            "Truncated:".yellow(),
            doc.pages_processed,
            doc.total_pages
        );
    }

    Ok(())
}

fn cmd_batch(
    inputs: &[PathBuf],
    output_dir: &Path,
    format: OutputFormat,
    options: PipelineOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    options.validate()?;
    fs::create_dir_all(output_dir)?;

    let pipeline = Pipeline::new(options);
    let render_options = RenderOptions::new();

    let pb = ProgressBar::new(inputs.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let totals = Mutex::new(ExtractionStats::new());
    let failures: Vec<(PathBuf, String)> = inputs
        .par_iter()
        .filter_map(|input| {
            let result = load_pages_file(input)
                .map_err(|e| e.to_string())
                .and_then(|pages| {
                    let doc = pipeline.run(&pages);
                    let content = render_document(&doc, format, false, &render_options)
                        .map_err(|e| e.to_string())?;
                    fs::write(output_path(input, output_dir, format), content)
                        .map_err(|e| e.to_string())?;
                    log::debug!("{}: {} blocks", input.display(), doc.len());
                    if let Ok(mut totals) = totals.lock() {
                        totals.merge(&doc.stats);
                    }
                    Ok(())
                });
            pb.inc(1);
            result.err().map(|e| {
                log::warn!("Failed to structure {}: {}", input.display(), e);
                (input.clone(), e)
            })
        })
        .collect();

    pb.finish_with_message("Done!");

    let totals = totals.into_inner().unwrap_or_default();
    println!(
        "\n{} {} file(s), {} blocks written to {}",
        "Structured".green().bold(),
        inputs.len() - failures.len(),
        totals.block_count(),
        output_dir.display()
    );
    if totals.hard_cuts > 0 {
        eprintln!("{} {} hard cut(s)", "Warning:".yellow(), totals.hard_cuts);
    }

    if failures.is_empty() {
        return Ok(());
    }

    for (path, error) in &failures {
        eprintln!("  {} {}: {}", "✗".red(), path.display(), error);
    }
    Err(format!("{} of {} file(s) failed", failures.len(), inputs.len()).into())
}

fn cmd_info(input: &Path, options: PipelineOptions) -> Result<(), Box<dyn std::error::Error>> {
    options.validate()?;
    let pages = load_pages_file(input)?;
    let span_count: usize = pages.iter().map(|p| p.len()).sum();
    let doc = Pipeline::new(options).run(&pages);
    let stats = &doc.stats;

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!(
        "{}: {} of {}",
        "Pages processed".bold(),
        doc.pages_processed,
        doc.total_pages
    );
    println!(
        "{}: {}",
        "Truncated".bold(),
        if doc.truncated { "Yes" } else { "No" }
    );
    println!("{}: {}", "Spans".bold(), span_count);

    println!();
    println!("{}", "Block Statistics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    for kind in BlockKind::ALL {
        println!("{}: {}", kind.as_str().bold(), doc.blocks_of(kind).count());
    }
    println!("{}: {}", "Hard cuts".bold(), stats.hard_cuts);
    println!("{}: {}", "Words".bold(), stats.word_count);
    println!("{}: {}", "Characters".bold(), stats.char_count);

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "paperblocks".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("PDF content structuring tool");
    println!();
    println!("License: MIT");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path_strips_pages_suffix() {
        let dir = tempfile::tempdir().unwrap();
        let path = output_path(Path::new("in/paper.pages.json"), dir.path(), OutputFormat::Notion);
        assert_eq!(path, dir.path().join("paper.notion.json"));

        let path = output_path(Path::new("other.jsonl"), dir.path(), OutputFormat::Markdown);
        assert_eq!(path, dir.path().join("other.md"));
    }

    #[test]
    fn test_parse_flag_arg() {
        assert_eq!(parse_flag_arg("yes"), Ok(true));
        assert_eq!(parse_flag_arg("0"), Ok(false));
        assert!(parse_flag_arg("sometimes").is_err());
    }

    #[test]
    fn test_cli_reads_pipeline_args() {
        let cli = Cli::try_parse_from([
            "paperblocks",
            "structure",
            "paper.json",
            "--max-pages",
            "3",
            "--page-numbers",
            "--format",
            "notion",
        ])
        .unwrap();

        match cli.command {
            Commands::Structure {
                pipeline, format, ..
            } => {
                let options = pipeline.options();
                assert_eq!(options.max_pages, 3);
                assert!(options.include_page_numbers);
                assert!(options.skip_boilerplate);
                assert!(format == OutputFormat::Notion);
            }
            _ => panic!("expected structure command"),
        }
    }

    #[test]
    fn test_cli_keep_boilerplate() {
        let cli =
            Cli::try_parse_from(["paperblocks", "info", "paper.json", "--keep-boilerplate"]).unwrap();
        match cli.command {
            Commands::Info { pipeline, .. } => assert!(!pipeline.options().skip_boilerplate),
            _ => panic!("expected info command"),
        }
    }

    #[test]
    fn test_render_notion_batches() {
        let mut doc = Document::new();
        doc.blocks.push(paperblocks::ContentBlock::heading("Intro", 1));
        let content =
            render_document(&doc, OutputFormat::Notion, true, &RenderOptions::new()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        let first = &value["batches"][0];
        assert_eq!(first[0]["type"], "divider");
        assert_eq!(first[1]["type"], "heading_2");
        assert_eq!(first[2]["type"], "heading_1");
    }
}
