//! The `retint correct` command: correct one already-downloaded image.

use clap::Args;
use retint_core::{Config, Coordinator, OutputKind};
use serde::Serialize;

/// Arguments for the `correct` command.
#[derive(Args, Debug)]
pub struct CorrectArgs {
    /// File name inside the download directory (e.g. n_photo.jpg)
    pub name: String,

    /// White-balance target offset in percent (overrides correction.white_balance_scale_percent)
    #[arg(long, allow_hyphen_values = true)]
    pub scale: Option<f64>,
}

/// The `{"path": ...}` body shared with the HTTP surface.
#[derive(Debug, Serialize)]
pub struct PathResponse {
    pub path: Option<String>,
}

/// Execute the correct command.
pub async fn execute(args: CorrectArgs, mut config: Config) -> anyhow::Result<()> {
    if let Some(scale) = args.scale {
        config.correction.white_balance_scale_percent = scale;
    }
    config.validate()?;

    let coordinator = Coordinator::offline(config);
    let corrected = coordinator.correct_file(&args.name).await?;

    let response = PathResponse {
        path: Some(coordinator.public_url(OutputKind::Corrected, &corrected.file_name)),
    };
    println!("{}", serde_json::to_string(&response)?);
    Ok(())
}
