//! Process command - extract an expense record from a single receipt.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use rcpt_core::models::config::RcptConfig;
use rcpt_core::receipt::rules::{AmountSource, MerchantSource};
use rcpt_core::{enrich, ExpenseRecord, ExtractionResult, ReceiptExtractor};

use super::{build_categorizer, is_image_file, load_config, load_recognizer, read_lines_file, recognize_file};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Receipt image
    #[arg(required_unless_present = "lines", conflicts_with = "lines")]
    input: Option<PathBuf>,

    /// Use already recognized lines instead of OCR (text file, or JSON array for .json)
    #[arg(short, long)]
    lines: Option<PathBuf>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Model directory
    #[arg(short, long)]
    model_dir: Option<PathBuf>,

    /// Refine the category remotely even when disabled in config
    #[arg(long)]
    categorize: bool,

    /// Explain where each field came from
    #[arg(long)]
    explain: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    let lines = match (&args.lines, &args.input) {
        (Some(path), _) => read_lines_file(path)?,
        (None, Some(input)) => recognize_with_progress(input, &config, args.model_dir.as_deref())?,
        (None, None) => anyhow::bail!("Provide a receipt image or --lines"),
    };

    if lines.is_empty() {
        warn!("No text lines found, every field will be Unknown");
    }
    info!("Extracting fields from {} lines", lines.len());

    let extractor = ReceiptExtractor::with_config(&config.extraction);
    let result = extractor.parse(&lines);
    let categorizer = build_categorizer(&config.categorizer, args.categorize)?;
    let record = enrich(&categorizer, result.fields.clone(), &lines).await;

    if args.explain {
        explain(&result, &record);
    }

    let output = format_record(&record, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

fn recognize_with_progress(
    input: &Path,
    config: &RcptConfig,
    model_dir: Option<&Path>,
) -> anyhow::Result<Vec<String>> {
    if !input.exists() {
        anyhow::bail!("Input file not found: {}", input.display());
    }
    if !is_image_file(input) {
        anyhow::bail!("Unsupported file format: {}", input.display());
    }

    info!("Processing file: {}", input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));

    pb.set_message("Loading OCR models...");
    let engine = load_recognizer(&config.ocr, model_dir)?;

    pb.set_message("Running OCR...");
    let lines = recognize_file(&engine, input)?;

    pb.finish_with_message(format!("Recognized {} lines", lines.len()));

    Ok(lines)
}

fn explain(result: &ExtractionResult, record: &ExpenseRecord) {
    let merchant = match result.merchant_source {
        Some(MerchantSource::Keyword) => "known merchant keyword",
        Some(MerchantSource::FirstLine) => "first line",
        None => "not found",
    };
    let amount = match result.amount_source {
        Some(AmountSource::TotalLabel) => "line after the total label",
        Some(AmountSource::LastNumber) => "last number on the receipt",
        None => "not found",
    };

    eprintln!("{}", style("Extraction details:").bold());
    eprintln!("  merchant: {}", merchant);
    eprintln!("  amount:   {}", amount);
    if record.confidence > 0.0 {
        eprintln!(
            "  category: refined remotely ({:.0}% confidence)",
            record.confidence * 100.0
        );
    } else {
        eprintln!("  category: local rules");
    }

    for warning in &result.warnings {
        eprintln!("  {} {}", style("!").yellow(), warning);
    }
}

/// Render one record in the requested format.
pub fn format_record(record: &ExpenseRecord, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(record)?),
        OutputFormat::Csv => format_csv(record),
        OutputFormat::Text => Ok(format_text(record)),
    }
}

pub const CSV_HEADER: [&str; 5] = ["merchant", "date", "amount", "category", "confidence"];

pub fn csv_row(record: &ExpenseRecord) -> [String; 5] {
    let fields = &record.fields;
    [
        fields.merchant.clone(),
        fields.date.clone(),
        fields.amount.map(|a| a.to_string()).unwrap_or_default(),
        fields.category.clone(),
        format!("{:.2}", record.confidence),
    ]
}

fn format_csv(record: &ExpenseRecord) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(CSV_HEADER)?;
    wtr.write_record(csv_row(record))?;

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(record: &ExpenseRecord) -> String {
    let fields = &record.fields;
    let mut output = String::new();

    output.push_str(&format!("Merchant: {}\n", fields.merchant));
    output.push_str(&format!("Date:     {}\n", fields.date));
    match fields.amount {
        Some(amount) => output.push_str(&format!("Amount:   {}\n", amount)),
        None => output.push_str("Amount:   -\n"),
    }
    output.push_str(&format!("Category: {}\n", fields.category));
    if record.confidence > 0.0 {
        output.push_str(&format!("Confidence: {:.2}\n", record.confidence));
    }

    output
}
