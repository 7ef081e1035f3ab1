//! Batch processing command for multiple receipts.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, warn};

use rcpt_core::{enrich, ExpenseRecord, HttpCategorizer, PureOcrEngine, ReceiptExtractor};

use super::process::{csv_row, format_record, OutputFormat, CSV_HEADER};
use super::{
    build_categorizer, is_image_file, is_line_file, load_config, load_recognizer,
    read_lines_file, recognize_file,
};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Glob pattern matching receipt images or line files (.txt, .json)
    #[arg(required = true)]
    input: String,

    /// Output directory (default: records are printed to stdout)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,

    /// Model directory
    #[arg(short, long)]
    model_dir: Option<PathBuf>,

    /// Refine categories remotely even when disabled in config
    #[arg(long)]
    categorize: bool,
}

/// Result of processing a single file.
struct ProcessResult {
    path: PathBuf,
    record: Option<ExpenseRecord>,
    error: Option<String>,
    processing_time_ms: u64,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| is_image_file(p) || is_line_file(p))
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    eprintln!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    // Models are only loaded when at least one image needs OCR
    let engine = if files.iter().any(|p| is_image_file(p)) {
        Some(load_recognizer(&config.ocr, args.model_dir.as_deref())?)
    } else {
        None
    };
    let extractor = ReceiptExtractor::with_config(&config.extraction);
    let categorizer = build_categorizer(&config.categorizer, args.categorize)?;

    let overall_pb = ProgressBar::new(files.len() as u64);
    overall_pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let mut results = Vec::with_capacity(files.len());

    for path in files {
        let file_start = Instant::now();
        let result = process_single_file(&path, engine.as_ref(), &extractor, &categorizer).await;

        let processing_time_ms = file_start.elapsed().as_millis() as u64;

        match result {
            Ok(record) => {
                results.push(ProcessResult {
                    path,
                    record: Some(record),
                    error: None,
                    processing_time_ms,
                });
            }
            Err(e) => {
                let error_msg = format!("{:#}", e);
                if args.continue_on_error {
                    warn!("Failed to process {}: {}", path.display(), error_msg);
                    results.push(ProcessResult {
                        path,
                        record: None,
                        error: Some(error_msg),
                        processing_time_ms,
                    });
                } else {
                    error!("Failed to process {}: {}", path.display(), error_msg);
                    anyhow::bail!("Processing failed: {}", error_msg);
                }
            }
        }

        overall_pb.inc(1);
    }

    overall_pb.finish_and_clear();

    let successful: Vec<_> = results.iter().filter(|r| r.record.is_some()).collect();
    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();

    for result in &successful {
        let Some(record) = &result.record else {
            continue;
        };
        let content = format_record(record, args.format)?;

        match &args.output_dir {
            Some(output_dir) => {
                let output_name = result
                    .path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("receipt");
                let output_path =
                    output_dir.join(format!("{}.{}", output_name, args.format.extension()));

                fs::write(&output_path, content)?;
                debug!("Wrote output to {}", output_path.display());
            }
            None => println!("{}", content),
        }
    }

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &results)?;
        eprintln!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    eprintln!();
    eprintln!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    eprintln!(
        "   {} successful, {} failed",
        style(successful.len()).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        eprintln!();
        eprintln!("{}", style("Failed files:").red());
        for result in &failed {
            eprintln!(
                "  - {}: {}",
                result.path.display(),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

async fn process_single_file(
    path: &Path,
    engine: Option<&PureOcrEngine>,
    extractor: &ReceiptExtractor,
    categorizer: &Option<HttpCategorizer>,
) -> anyhow::Result<ExpenseRecord> {
    let lines = if is_line_file(path) {
        read_lines_file(path)?
    } else {
        let engine = engine.context("OCR engine is not loaded")?;
        recognize_file(engine, path)?
    };

    let fields = extractor.extract(&lines);
    Ok(enrich(categorizer, fields, &lines).await)
}

fn write_summary(path: &Path, results: &[ProcessResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    let mut header = vec!["filename", "status"];
    header.extend(CSV_HEADER);
    header.extend(["processing_time_ms", "error"]);
    wtr.write_record(&header)?;

    for result in results {
        let filename = result
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("");
        let time = result.processing_time_ms.to_string();

        let mut row = vec![filename.to_string()];
        match &result.record {
            Some(record) => {
                row.push("success".to_string());
                row.extend(csv_row(record));
                row.extend([time, String::new()]);
            }
            None => {
                row.push("error".to_string());
                row.extend(std::iter::repeat_n(String::new(), CSV_HEADER.len()));
                row.extend([time, result.error.clone().unwrap_or_default()]);
            }
        }
        wtr.write_record(&row)?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rcpt_core::ExtractedFields;

    #[test]
    fn test_summary_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.csv");

        let results = vec![
            ProcessResult {
                path: PathBuf::from("a.txt"),
                record: Some(ExpenseRecord::local(ExtractedFields::default())),
                error: None,
                processing_time_ms: 3,
            },
            ProcessResult {
                path: PathBuf::from("b.png"),
                record: None,
                error: Some("broken".to_string()),
                processing_time_ms: 1,
            },
        ];

        write_summary(&path, &results).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        let rows: Vec<&str> = content.lines().collect();

        assert_eq!(
            rows[0],
            "filename,status,merchant,date,amount,category,confidence,processing_time_ms,error"
        );
        assert_eq!(rows[1], "a.txt,success,Unknown,Unknown,,General,0.00,3,");
        assert_eq!(rows[2], "b.png,error,,,,,,1,broken");
    }
}
