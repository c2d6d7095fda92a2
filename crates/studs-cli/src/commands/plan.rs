//! Plan command - show the recognition passes a recognizer should run.

use clap::Args;
use console::style;

use studs_core::{ImageTransform, PassVariant, StudExtractor};

/// Arguments for the plan command.
#[derive(Args)]
pub struct PlanArgs {
    /// Print the plan as JSON
    #[arg(long)]
    json: bool,
}

pub async fn run(args: PlanArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = super::load_config(config_path)?;
    let extractor = StudExtractor::new(&config)?;
    let passes = extractor.plan();

    if args.json {
        println!("{}", serde_json::to_string_pretty(passes)?);
        return Ok(());
    }

    println!(
        "{} {} passes, render scale {}x",
        style("ℹ").blue(),
        passes.len(),
        config.recognition.render_scale
    );
    println!("   allowlist: {}", config.recognition.allowlist);
    println!();

    for (i, pass) in passes.iter().enumerate() {
        println!("{}", describe_pass(i + 1, pass));
    }

    Ok(())
}

fn describe_pass(index: usize, pass: &PassVariant) -> String {
    let steps: Vec<String> = pass.transforms.iter().map(describe_transform).collect();
    let steps = if steps.is_empty() {
        "original".to_string()
    } else {
        steps.join(" -> ")
    };

    if pass.rotation == 0 {
        format!("{:>2}. {:<12} {}", index, pass.name, steps)
    } else {
        format!("{:>2}. {:<12} {} -> rotate {}", index, pass.name, steps, pass.rotation)
    }
}

fn describe_transform(transform: &ImageTransform) -> String {
    match transform {
        ImageTransform::Sharpen => "sharpen".to_string(),
        ImageTransform::AdaptiveThreshold { block_size, offset } => {
            format!("threshold({}, {})", block_size, offset)
        }
        ImageTransform::Dilate { kernel, iterations } => {
            format!("dilate({}x{}, {})", kernel, kernel, iterations)
        }
    }
}
