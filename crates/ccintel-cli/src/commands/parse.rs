//! Parse command - extract statement fields from a single file.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use ccintel_core::models::config::CcintelConfig;
use ccintel_core::{
    FieldName, FieldSource, GeminiClient, PdfExtractor, StatementParser, StatementResult,
};

use super::{load_config, load_templates, resolve_credential};

/// Exit code for statements that could not be parsed.
const FAILURE_EXIT_CODE: i32 = 2;

/// Arguments for the parse command.
#[derive(Args)]
pub struct ParseArgs {
    /// Input statement (PDF or plain text)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Gemini API key (overrides the configured environment variable)
    #[arg(long)]
    api_key: Option<String>,

    /// Use template patterns only
    #[arg(long)]
    no_fallback: bool,

    /// JSON template table to use instead of the built-in banks
    #[arg(long)]
    templates: Option<PathBuf>,

    /// Include the extracted statement text in text output
    #[arg(long)]
    show_raw_text: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// Flattened JSON result
    Json,
    /// Data overview table
    Csv,
    /// Plain text summary
    Text,
}

pub async fn run(args: ParseArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?,
    );
    pb.enable_steady_tick(Duration::from_millis(100));

    pb.set_message("Reading statement...");
    let text = read_statement(&args, &config)?;

    let table = load_templates(args.templates.as_deref(), &config)?;
    let mut parser = StatementParser::new(&table).with_timeout(config.fallback.timeout());

    if !args.no_fallback && config.fallback.enabled {
        if let Some(key) = resolve_credential(args.api_key.as_deref(), &config) {
            debug!("Fallback enabled with model {}", config.fallback.model);
            let client = GeminiClient::from_config(key, &config.fallback)?
                .with_timeout(config.fallback.timeout());
            parser = parser.with_fallback(Arc::new(client));
        }
    }

    pb.set_message("Analyzing statement...");
    let result = match &text {
        StatementText::Readable(text) => parser.parse(text).await,
        StatementText::Unreadable(text) => parser.unreadable(text),
    };
    pb.finish_and_clear();

    let output = format_result(&result, args.format, args.show_raw_text)?;

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

    if !result.is_success() {
        std::process::exit(FAILURE_EXIT_CODE);
    }

    Ok(())
}

/// Text pulled from the input file.
enum StatementText {
    Readable(String),
    /// Extraction failed or produced too little text; holds what was recovered.
    Unreadable(String),
}

/// Load statement text from a PDF or a plain text file.
fn read_statement(args: &ParseArgs, config: &CcintelConfig) -> anyhow::Result<StatementText> {
    let extension = args
        .input
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match extension.as_str() {
        "pdf" => {
            let data = fs::read(&args.input)?;
            Ok(pdf_text(&data, config.pdf.min_text_length))
        }
        "txt" | "text" => Ok(StatementText::Readable(fs::read_to_string(&args.input)?)),
        _ => anyhow::bail!("Unsupported file format: {}", extension),
    }
}

fn pdf_text(data: &[u8], min_text_length: usize) -> StatementText {
    match PdfExtractor::text_from_bytes(data) {
        Ok(text) if text.trim().chars().count() < min_text_length => {
            warn!(
                "PDF yielded {} characters of text, below the {} character minimum",
                text.trim().chars().count(),
                min_text_length
            );
            StatementText::Unreadable(text)
        }
        Ok(text) => StatementText::Readable(text),
        Err(e) => {
            warn!("Could not read PDF: {}", e);
            StatementText::Unreadable(String::new())
        }
    }
}

fn format_result(
    result: &StatementResult,
    format: OutputFormat,
    show_raw_text: bool,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&result.flatten())?),
        OutputFormat::Csv => format_csv(result),
        OutputFormat::Text => Ok(format_text(result, show_raw_text)),
    }
}

fn format_csv(result: &StatementResult) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(["Data Point", "Extracted Value", "Status"])?;

    for name in FieldName::ALL {
        let value = result.value(name);
        let status = if value.is_found() { "Found" } else { "Missing" };
        wtr.write_record([name.label(), value.as_str(), status])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(result: &StatementResult, show_raw_text: bool) -> String {
    let mut output = String::new();

    output.push_str(&format!("Status: {}\n", result.status));

    if let Some(reason) = &result.reason {
        output.push_str(&format!("Reason: {}\n", reason));
    }
    if let Some(bank) = &result.bank_name {
        output.push_str(&format!("Bank: {}\n", bank));
    }
    if let Some(method) = result.extraction_method {
        output.push_str(&format!("Method: {}\n", method));
    }
    output.push_str(&format!("AI Fallback: {}\n", result.fallback_status));

    if result.is_success() {
        output.push('\n');
        for field in &result.fields {
            let source = if field.source == FieldSource::Fallback { " (AI)" } else { "" };
            output.push_str(&format!(
                "{:<20} {}{}\n",
                format!("{}:", field.name.label()),
                field.value,
                source
            ));
        }

        let missing = result.missing_fields();
        if !missing.is_empty() {
            let names: Vec<&str> = missing.iter().map(|f| f.label()).collect();
            output.push_str(&format!("\nMissing: {}\n", names.join(", ")));
        }
    } else {
        output.push_str("\nTroubleshooting:\n");
        output.push_str("  - Make sure the file is a text-based credit card statement, not a scan.\n");
        output.push_str("  - Make sure the PDF is not password-protected.\n");
        output.push_str("  - Check that the issuer is one of the banks listed by 'ccintel banks'.\n");
        output.push_str("  - Run with --show-raw-text to inspect what was extracted.\n");
    }

    if show_raw_text {
        output.push_str("\n--- Raw text ---\n");
        output.push_str(&result.raw_text);
        if !result.raw_text.ends_with('\n') {
            output.push('\n');
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use ccintel_core::{FailureReason, FallbackStatus};

    const HDFC_TEXT: &str = "HDFC Bank Credit Card Statement\n\
        Card No: 4567 XXXX XXXX 1234\n\
        Statement Date: 15/03/2024\n\
        Payment Due Date: 04/04/2024\n\
        Minimum Amount Due: Rs. 2,500.00\n";

    async fn parse_hdfc() -> StatementResult {
        StatementParser::builtin().parse(HDFC_TEXT).await
    }

    #[tokio::test]
    async fn test_csv_overview_marks_missing() {
        let csv = format_csv(&parse_hdfc().await).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "Data Point,Extracted Value,Status");
        assert_eq!(lines[1], "Statement Date,15/03/2024,Found");
        assert_eq!(lines[3], "Card Last 4 Digits,1234,Found");
        assert_eq!(lines[4], "Total Amount Due,NOT_FOUND,Missing");
        assert_eq!(lines[5], "Minimum Amount Due,2500.00,Found");
    }

    #[tokio::test]
    async fn test_text_summary_lists_missing_fields() {
        let text = format_text(&parse_hdfc().await, false);

        assert!(text.contains("Status: SUCCESS"));
        assert!(text.contains("Bank: HDFC Bank"));
        assert!(text.contains("Method: RegEx"));
        assert!(text.contains("AI Fallback: NOT_AVAILABLE"));
        assert!(text.contains("Missing: Total Amount Due"));
        assert!(!text.contains("--- Raw text ---"));
    }

    #[test]
    fn test_text_summary_on_failure() {
        let result = StatementResult::failure(
            FailureReason::BankNotRecognized,
            "Some Other Bank",
            FallbackStatus::NotAvailable,
        );
        let text = format_text(&result, true);

        assert!(text.contains("Status: FAILURE"));
        assert!(text.contains("Reason: Bank not recognized"));
        assert!(text.contains("Troubleshooting:"));
        assert!(text.contains("--- Raw text ---\nSome Other Bank\n"));
    }

    #[tokio::test]
    async fn test_json_output_is_flattened() {
        let json = format_result(&parse_hdfc().await, OutputFormat::Json, false).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["status"], "SUCCESS");
        assert_eq!(value["bank_name"], "HDFC Bank");
        assert_eq!(value["extraction_method"], "RegEx");
        assert_eq!(value["llm_status"], "NOT_AVAILABLE");
        assert_eq!(value["card_last_4_digits"], "1234");
        assert_eq!(value["total_due"], "NOT_FOUND");
    }

    #[test]
    fn test_corrupt_pdf_is_unreadable() {
        let text = pdf_text(b"HDFC Bank statement, not a PDF", 20);
        assert!(matches!(text, StatementText::Unreadable(ref t) if t.is_empty()));
    }
}
