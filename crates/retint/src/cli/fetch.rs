//! The `retint fetch` command: one batch over the configured remote directory.

use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use retint_core::{BatchMode, Config, Coordinator, PipelineResult};
use std::time::{Duration, Instant};

/// Arguments for the `fetch` command.
#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Download only, skip correction
    #[arg(long)]
    pub fetch_only: bool,

    /// Maximum concurrent transfers (overrides fetch.parallel)
    #[arg(short, long)]
    pub parallel: Option<usize>,

    /// White-balance target offset in percent (overrides correction.white_balance_scale_percent)
    #[arg(long, allow_hyphen_values = true)]
    pub scale: Option<f64>,
}

impl FetchArgs {
    fn apply(&self, config: &mut Config) {
        if let Some(parallel) = self.parallel {
            config.fetch.parallel = parallel;
        }
        if let Some(scale) = self.scale {
            config.correction.white_balance_scale_percent = scale;
        }
    }

    fn mode(&self) -> BatchMode {
        if self.fetch_only {
            BatchMode::FetchOnly
        } else {
            BatchMode::Correct
        }
    }
}

/// Execute the fetch command.
pub async fn execute(args: FetchArgs, mut config: Config) -> anyhow::Result<()> {
    args.apply(&mut config);
    config.validate()?;

    let mode = args.mode();
    let coordinator = Coordinator::connect(config).await?;

    let start_time = Instant::now();
    let progress = create_spinner();
    let pb = progress.clone();
    let result = coordinator
        .run_batch_with(mode, move |report| {
            pb.inc(1);
            pb.set_message(report.source_name.clone());
        })
        .await;
    progress.finish_and_clear();
    let result = result?;

    print_summary(&result, start_time.elapsed());
    println!("{}", serde_json::to_string_pretty(&result)?);

    if result.total() > 0 && result.succeeded() == 0 {
        tracing::warn!("Every file in the batch failed");
    }
    Ok(())
}

fn create_spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {pos} files {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message("listing...");
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Print a formatted summary table after a batch.
fn print_summary(result: &PipelineResult, elapsed: Duration) {
    eprintln!();
    eprintln!("  ====================================");
    eprintln!("               Summary");
    eprintln!("  ====================================");
    eprintln!("    Succeeded:    {:>8}", result.succeeded());
    if result.failed() > 0 {
        eprintln!("    Failed:       {:>8}", result.failed());
    }
    eprintln!("  ------------------------------------");
    eprintln!("    Total:        {:>8}", result.total());
    eprintln!("    Duration:     {:>7.1}s", elapsed.as_secs_f64());
    if let Some(name) = &result.representative {
        eprintln!("    Latest:       {name}");
    }
    eprintln!("  ====================================");
    eprintln!();
}
