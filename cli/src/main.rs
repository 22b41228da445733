//! pdfrag CLI - hybrid PDF ingestion tool

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use pdfrag::{
    extract_and_transcribe, ConvertOptions, ExtractOptions, LlamaParseClient, LlamaParseConfig,
    PageMap, Pdf2DocxCommand, Pipeline, PipelineArtifacts, PipelineOptions, TranscribeOptions,
    Transcriber,
};

#[derive(Parser)]
#[command(name = "pdfrag")]
#[command(version)]
#[command(about = "Convert PDFs into Markdown, HTML tables and page-attributed key-value text", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline on a PDF
    Process {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output directory
        #[arg(short, long, value_name = "DIR", env = "PDFRAG_OUTPUT_DIR", default_value = "uploads")]
        output: PathBuf,

        /// LlamaParse API key
        #[arg(long, env = "LLAMA_CLOUD_API_KEY", hide_env_values = true)]
        api_key: String,

        /// LlamaParse base URL
        #[arg(long, env = "LLAMA_CLOUD_BASE_URL")]
        base_url: Option<String>,

        /// External parse timeout in seconds
        #[arg(long, env = "PDFRAG_PARSE_TIMEOUT", default_value = "300")]
        parse_timeout: u64,

        /// pdf2docx executable
        #[arg(long, env = "PDF2DOCX_BIN", default_value = "pdf2docx")]
        pdf2docx: PathBuf,

        /// Multi-row header marker
        #[arg(long, env = "PDFRAG_HEADER_MARKER")]
        header_marker: Option<String>,

        /// First page to convert (zero-based)
        #[arg(long, default_value = "0")]
        start_page: u32,

        /// Page to stop converting before (zero-based)
        #[arg(long)]
        end_page: Option<u32>,
    },

    /// Transcribe the tables of an existing DOCX
    Tables {
        /// Input DOCX file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Saved page map (JSON object of page number to page text)
        #[arg(long, value_name = "JSON")]
        pages: Option<PathBuf>,

        /// Source name written into record metadata
        #[arg(long)]
        source: Option<String>,

        /// Output directory (stdout if not specified)
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Multi-row header marker
        #[arg(long, env = "PDFRAG_HEADER_MARKER")]
        header_marker: Option<String>,
    },

    /// Normalize narrative text from a file or stdin
    Normalize {
        /// Input text file (stdin if not specified)
        #[arg(value_name = "FILE")]
        input: Option<PathBuf>,
    },

    /// Show version information
    Version,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Process {
            input,
            output,
            api_key,
            base_url,
            parse_timeout,
            pdf2docx,
            header_marker,
            start_page,
            end_page,
        }) => {
            let mut convert = ConvertOptions::new().with_start_page(start_page);
            if let Some(end) = end_page {
                convert = convert.with_end_page(end);
            }
            let options = PipelineOptions::new()
                .with_output_dir(output)
                .with_parse_timeout(Duration::from_secs(parse_timeout))
                .with_convert_options(convert)
                .with_transcribe_options(transcribe_options(header_marker));

            let mut config = LlamaParseConfig::new(api_key);
            if let Some(url) = base_url {
                config = config.with_base_url(url);
            }

            cmd_process(&input, config, &pdf2docx, options)
        }
        Some(Commands::Tables {
            input,
            pages,
            source,
            output,
            header_marker,
        }) => cmd_tables(
            &input,
            pages.as_deref(),
            source,
            output.as_deref(),
            transcribe_options(header_marker),
        ),
        Some(Commands::Normalize { input }) => cmd_normalize(input.as_deref()),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            println!("{}", "Usage: pdfrag process <FILE>".yellow());
            println!("       pdfrag --help for more information");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn transcribe_options(header_marker: Option<String>) -> TranscribeOptions {
    match header_marker {
        Some(marker) => TranscribeOptions::new().with_header_marker(marker),
        None => TranscribeOptions::new(),
    }
}

fn cmd_process(
    input: &Path,
    config: LlamaParseConfig,
    pdf2docx: &Path,
    options: PipelineOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let parser = LlamaParseClient::new(config)?;
    let converter = Pdf2DocxCommand::with_program(pdf2docx);
    log::info!("Using {} for DOCX conversion", pdf2docx.display());

    let pipeline = Pipeline::new(Arc::new(converter), Arc::new(parser), options);

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg} [{elapsed}]")?);
    pb.enable_steady_tick(Duration::from_millis(120));
    pb.set_message(format!("Processing {}...", input.display()));

    let rt = tokio::runtime::Runtime::new()?;
    let result = rt.block_on(pipeline.run(input));

    match result {
        Ok(artifacts) => {
            pb.finish_with_message("Done!");
            print_artifacts(&artifacts);
            Ok(())
        }
        Err(e) => {
            pb.abandon_with_message("Failed");
            Err(e.into())
        }
    }
}

fn print_artifacts(artifacts: &PipelineArtifacts) {
    let stats = &artifacts.stats;

    println!("\n{}", "Output files:".green().bold());
    println!("  {} {}", "├─".dimmed(), artifacts.docx.display());
    println!("  {} {}", "├─".dimmed(), artifacts.markdown.display());
    println!("  {} {}", "├─".dimmed(), artifacts.html.display());
    println!("  {} {}", "└─".dimmed(), artifacts.key_values.display());

    println!();
    println!("{}", "Run Statistics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "Pages parsed".bold(), stats.pages_parsed);
    println!("{}: {}", "Paragraphs".bold(), stats.paragraph_count);
    println!(
        "{}: {} ({} skipped)",
        "Tables".bold(),
        stats.table_count,
        stats.tables_skipped
    );
    println!("{}: {}", "Unresolved tables".bold(), stats.tables_unresolved);
    println!("{}: {}", "Records".bold(), stats.record_count);

    if stats.parse_degraded {
        println!(
            "\n{} external parse degraded; table pages are unresolved",
            "Warning:".yellow().bold()
        );
    }
}

fn cmd_tables(
    input: &Path,
    pages: Option<&Path>,
    source: Option<String>,
    output: Option<&Path>,
    options: TranscribeOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let page_map: PageMap = match pages {
        Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
        None => PageMap::new(),
    };
    let source = source.unwrap_or_else(|| {
        input
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .into_owned()
    });

    let (document, transcript) = extract_and_transcribe(
        input,
        &page_map,
        &source,
        &ExtractOptions::default(),
        &Transcriber::new(options),
    )?;
    let kv_text = transcript.kv_text()?;

    if let Some(dir) = output {
        fs::create_dir_all(dir)?;
        let stem = input.file_stem().unwrap_or_default().to_string_lossy();
        let paths = PipelineArtifacts::paths_for(dir, &stem);
        fs::write(&paths.html, &transcript.html)?;
        fs::write(&paths.key_values, &kv_text)?;

        println!("{} {}", "Saved to".green(), paths.html.display());
        println!("{} {}", "Saved to".green(), paths.key_values.display());
        println!(
            "{} tables, {} records, {} skipped",
            document.table_count(),
            transcript.records.len(),
            transcript.skipped.len()
        );
    } else {
        println!("{}", kv_text);
    }

    Ok(())
}

fn cmd_normalize(input: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let text = match input {
        Some(path) => fs::read_to_string(path)?,
        None => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };

    println!("{}", pdfrag::normalize(&text));
    Ok(())
}

fn cmd_version() {
    println!("{} {}", "pdfrag".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Hybrid PDF ingestion for retrieval");
    println!();
    println!("Library: pdfrag {}", pdfrag::VERSION);
    println!("License: MIT");
}
