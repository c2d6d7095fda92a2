//! Extract command - link stud counts for a single recorded region.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::{debug, info};

use studs_core::{
    ExtractionResult, LinkMode, RecordedRecognizer, RegionInput, StudExtractor, StudReport, StudsConfig,
};

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Recorded region file (JSON)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Linking mode (overrides config)
    #[arg(short, long, value_enum)]
    mode: Option<ModeArg>,

    /// Maximum label-to-count distance in pixels (overrides config)
    #[arg(long)]
    max_distance: Option<f32>,

    /// Take region width and height from this image instead of the input file
    #[arg(long)]
    region_image: Option<PathBuf>,

    /// List the fused detections after the report
    #[arg(long)]
    show_detections: bool,

    /// Feed the recorded passes through the configured pass plan, as a live
    /// recognizer would; recorded passes missing from the plan are skipped
    #[arg(long)]
    replay_plan: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output, one row per linked count
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum ModeArg {
    /// Nearest beam label by centroid distance
    Spatial,
    /// Label followed by its count in the combined text
    Adjacency,
}

impl From<ModeArg> for LinkMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Spatial => LinkMode::Spatial,
            ModeArg::Adjacency => LinkMode::Adjacency,
        }
    }
}

pub async fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = super::load_config(config_path)?;
    apply_overrides(&mut config, args.mode, args.max_distance);

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing region: {}", args.input.display());

    let mut region = RegionInput::from_file(&args.input)?;
    if let Some(image_path) = &args.region_image {
        let (width, height) = image::image_dimensions(image_path)?;
        debug!("Region size from {}: {}x{}", image_path.display(), width, height);
        region.width = width as f32;
        region.height = height as f32;
    }

    let extractor = StudExtractor::new(&config)?;
    debug!("Linking mode: {:?}", extractor.mode());

    let result = if args.replay_plan {
        let recognizer = RecordedRecognizer::new(region);
        info!("Replaying {} planned passes", extractor.plan().len());
        extractor.extract_with(&recognizer, recognizer.size())?
    } else {
        extractor.extract(&region)?
    };

    let output = format_report(&result.report, args.format)?;

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

    if args.show_detections {
        println!();
        print_detections(&result);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

/// Apply command-line overrides on top of the loaded config.
pub fn apply_overrides(config: &mut StudsConfig, mode: Option<ModeArg>, max_distance: Option<f32>) {
    if let Some(mode) = mode {
        config.extraction.mode = mode.into();
    }
    if let Some(distance) = max_distance {
        config.linking.max_distance = distance;
    }
}

pub fn format_report(report: &StudReport, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
        OutputFormat::Csv => format_report_csv(report),
        OutputFormat::Text => Ok(format_report_text(report)),
    }
}

fn format_report_csv(report: &StudReport) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(["profile", "studs"])?;
    for (label, values) in report.profiles.iter() {
        for value in values {
            wtr.write_record([label, &value.to_string()])?;
        }
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_report_text(report: &StudReport) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "Studs: {} callouts, {} total\n",
        report.studs_count, report.studs_total
    ));

    if report.profiles.is_empty() {
        output.push_str("No beam profiles linked\n");
        return output;
    }

    output.push_str("\nProfiles:\n");
    for (label, values) in report.profiles.iter() {
        let counts: Vec<String> = values.iter().map(|v| v.to_string()).collect();
        let sum: u32 = values.iter().sum();
        output.push_str(&format!("  {:<10} {} (= {})\n", label, counts.join(", "), sum));
    }

    output
}

fn print_detections(result: &ExtractionResult) {
    println!(
        "{} {} detections after fusion:",
        style("ℹ").blue(),
        result.detections.len()
    );
    for d in &result.detections {
        println!(
            "  {:<14} {:>8.1} {:>8.1}  {:.2}  {}@{}",
            d.normalized_text, d.centroid.x, d.centroid.y, d.confidence, d.origin.variant, d.origin.rotation
        );
    }

    if !result.isolated.is_empty() {
        println!(
            "{} {} isolated counts ignored:",
            style("⚠").yellow(),
            result.isolated.len()
        );
        for c in &result.isolated {
            println!("  [{}] at ({:.1}, {:.1})", c.value, c.position.x, c.position.y);
        }
    }

    println!(
        "{} Processing time: {}ms",
        style("ℹ").blue(),
        result.processing_time_ms
    );
}
