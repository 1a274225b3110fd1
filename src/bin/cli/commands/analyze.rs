//! The `analyze` subcommand: the CLI's only data-processing path.
//!
//! Wires argument parsing to the library's pipeline, provider registry,
//! and report formatters. Everything stateful (memory guard, top-K,
//! worker pool) lives in `zonerisk::core::pipeline`; this module only
//! decides *which* mode and sink to use and renders the result.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use tracing::{error, info};

use zonerisk::core::catalog::PatternCatalog;
use zonerisk::core::classifier::ClassificationResult;
use zonerisk::core::errors::{Result, ZoneRiskError};
use zonerisk::core::pipeline::mode::{select_mode, ModeFlags};
use zonerisk::core::pipeline::{run_pipeline, CancellationToken, PipelineConfig};
use zonerisk::io::csv_source::CsvSource;
use zonerisk::io::reports::{csv, filter_by_level, json, table};
use zonerisk::providers::ProviderRegistry;

use crate::cli::args::{AnalyzeArgs, OutputFormatArg};
use crate::cli::output;

/// Run the `analyze` subcommand across every input file. Returns the
/// exit code the process should terminate with.
pub fn run(args: &AnalyzeArgs, quiet: bool, verbose: bool) -> i32 {
    if args.output == OutputFormatArg::Json && args.stream {
        eprintln!("error: --output json cannot be combined with --stream (JSON requires the full result set)");
        return ZoneRiskError::config("--output json is incompatible with --stream").exit_code();
    }

    let catalog = match load_catalog(args.patterns.as_deref()) {
        Ok(catalog) => Arc::new(catalog),
        Err(err) => {
            error!(%err, "failed to load pattern catalog");
            return err.exit_code();
        }
    };

    if args.files.is_empty() {
        eprintln!("error: no input files given");
        return ZoneRiskError::config("no input files given").exit_code();
    }

    let mut worst_exit = 0;
    for file in &args.files {
        match analyze_one(file, args, &catalog, quiet, verbose) {
            Ok(code) => worst_exit = worst_exit.max(code),
            Err(err) => {
                error!(file = %file.display(), %err, "analysis failed");
                eprintln!("error analyzing {}: {err}", file.display());
                worst_exit = worst_exit.max(err.exit_code());
            }
        }
    }
    worst_exit
}

/// Estimate the file's record count from its byte size, so [`select_mode`]
/// can pick in-memory mode for small files without a full pre-scan pass.
/// Assumes ~80 bytes/row, a rough average across the supported export
/// formats; overestimating the row count only pushes a borderline file
/// toward the safer bounded-streaming mode, never the other way.
const ASSUMED_BYTES_PER_ROW: u64 = 80;

fn estimate_record_count(file: &Path) -> Option<u64> {
    std::fs::metadata(file)
        .ok()
        .map(|meta| meta.len() / ASSUMED_BYTES_PER_ROW)
}

fn load_catalog(path: Option<&Path>) -> Result<PatternCatalog> {
    match path {
        Some(path) => PatternCatalog::from_file(path),
        None => Ok(PatternCatalog::default_catalog()),
    }
}

fn analyze_one(
    file: &Path,
    args: &AnalyzeArgs,
    catalog: &Arc<PatternCatalog>,
    quiet: bool,
    verbose: bool,
) -> Result<i32> {
    let mut source = CsvSource::open(file)?;
    let registry = ProviderRegistry::new();
    let zone_hint = file
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();

    if args.dry_run {
        let header = zonerisk::providers::HeaderIndex::new(source.header().to_vec());
        let detection = registry.detect(&header);
        println!(
            "{}: provider={} confidence={:.2} ambiguous={}",
            file.display(),
            detection.provider_id,
            detection.confidence,
            detection.ambiguous
        );
        return Ok(0);
    }

    let mode_flags = ModeFlags {
        force_stream: args.stream,
        workers: args.wants_workers(),
    };
    let mode = select_mode(estimate_record_count(file), mode_flags);

    let config = PipelineConfig {
        memory_limit_mib: args.memory_limit,
        // `--chunk-size` always wins and disables adaptive sizing;
        // `--enhanced` only confirms the adaptive default when no fixed
        // size was given.
        fixed_chunk_size: args.chunk_size,
        top_k: zonerisk::core::topk::DEFAULT_K,
        provider_override: args.provider.clone(),
        ..PipelineConfig::default()
    };

    // CancellationToken exists for embedders of the pipeline; this CLI
    // binary has no signal-handling crate in its dependency stack, so it
    // never fires one itself and every run proceeds to completion.
    let cancellation = CancellationToken::new();

    let progress_bar = (!quiet).then(output::spinner);
    let started = Instant::now();

    // Retained output sinks. CSV streams rows directly to its sink;
    // JSON and the verbose table need every surviving result collected,
    // since only the bounded top-K is otherwise retained.
    let mut csv_writer: Option<csv::CsvReportWriter<Box<dyn Write>>> = match (args.output, &args.output_file) {
        (OutputFormatArg::Csv, Some(path)) => {
            let file = File::create(path).map_err(|e| {
                ZoneRiskError::output_failed(format!("failed to create {}", path.display()), e)
            })?;
            let sink: Box<dyn Write> = Box::new(io::BufWriter::new(file));
            Some(csv::CsvReportWriter::new(sink)?)
        }
        (OutputFormatArg::Csv, None) => {
            let sink: Box<dyn Write> = Box::new(io::BufWriter::new(io::stdout()));
            Some(csv::CsvReportWriter::new(sink)?)
        }
        _ => None,
    };
    let retain_full = args.output == OutputFormatArg::Json || (args.output == OutputFormatArg::Table && verbose);
    let mut retained: Vec<ClassificationResult> = Vec::new();

    let summary = run_pipeline(
        &mut source,
        &file.display().to_string(),
        zone_hint,
        &registry,
        Arc::clone(catalog),
        mode,
        &config,
        &cancellation,
        |update| {
            if let Some(bar) = &progress_bar {
                output::report_progress(bar, &update);
            }
        },
        |result| {
            if let Some(writer) = csv_writer.as_mut() {
                if let Err(err) = writer.write_result(result) {
                    error!(%err, "failed to stream CSV row");
                }
            }
            if retain_full {
                retained.push(result.clone());
            }
        },
    );

    if let Some(bar) = progress_bar {
        bar.finish_and_clear();
    }

    let summary = summary?;
    if let Some(writer) = csv_writer.as_mut() {
        writer.flush()?;
    }

    info!(
        file = %file.display(),
        elapsed = ?started.elapsed(),
        records = summary.total_records,
        "finished analyzing file"
    );

    if args.output != OutputFormatArg::Csv {
        render_non_csv(args, &summary, &retained)?;
    } else if args.output_file.is_some() {
        // CSV detail streamed to `--output-file`; the summary still goes
        // to stdout since that sink was freed up by the file redirect.
        println!("{}", table::render_summary(&summary));
    }

    Ok(0)
}

fn render_non_csv(
    args: &AnalyzeArgs,
    summary: &zonerisk::core::pipeline::AnalysisSummary,
    retained: &[ClassificationResult],
) -> Result<()> {
    let floor = args.risk_level.map(|level| level.to_risk_level());
    match args.output {
        OutputFormatArg::Json => {
            let filtered = filter_by_level(retained, floor);
            let rendered = json::render(summary, &filtered)?;
            write_rendered(&rendered, args.output_file.as_deref())?;
        }
        OutputFormatArg::Table => {
            let mut rendered = table::render_summary(summary);
            if !retained.is_empty() {
                let filtered = filter_by_level(retained, floor);
                rendered.push('\n');
                rendered.push_str(&table::render_detail(&filtered));
            }
            write_rendered(&rendered, args.output_file.as_deref())?;
        }
        OutputFormatArg::Csv => unreachable!("CSV is written during pipeline execution"),
    }
    Ok(())
}

fn write_rendered(text: &str, output_file: Option<&Path>) -> Result<()> {
    match output_file {
        Some(path) => {
            let mut file = File::create(path).map_err(|e| {
                ZoneRiskError::output_failed(format!("failed to create {}", path.display()), e)
            })?;
            file.write_all(text.as_bytes())
                .map_err(|e| ZoneRiskError::output_failed("failed to write report", e))
        }
        None => {
            println!("{text}");
            Ok(())
        }
    }
}
