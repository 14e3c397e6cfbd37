//! Per-file correction pipeline - wires together validate, decode, correct,
//! encode and persist.

use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::config::Config;
use crate::correction::{self, CorrectionParameters};
use crate::error::PipelineError;
use crate::naming;
use crate::types::{CorrectedFile, FetchOutcome, FileReport, FileState};

use super::decode::ImageDecoder;
use super::encode::JpegWriter;
use super::validate::Validator;

/// The image processor that walks one fetched file to a terminal state.
pub struct ImageProcessor {
    decoder: ImageDecoder,
    validator: Validator,
    writer: JpegWriter,
    params: CorrectionParameters,
    corrected_dir: PathBuf,
    corrected_prefix: String,
}

impl ImageProcessor {
    /// Create a new image processor with the given configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            decoder: ImageDecoder::new(config.limits.clone()),
            validator: Validator::new(config.limits.clone()),
            writer: JpegWriter::new(config.correction.jpeg_quality),
            params: config.correction_params(),
            corrected_dir: config.corrected_dir(),
            corrected_prefix: config.storage.corrected_prefix.clone(),
        }
    }

    /// Where the corrected version of `input` is written.
    pub fn output_path(&self, input: &Path) -> Result<PathBuf, PipelineError> {
        let base = input
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| PipelineError::InvalidName(input.display().to_string()))?;
        Ok(self
            .corrected_dir
            .join(naming::corrected_name(&self.corrected_prefix, base)))
    }

    /// Correct one download. Failed fetches pass through untouched; later
    /// failures are logged and recorded on the report.
    pub async fn process_fetched(&self, outcome: FetchOutcome) -> FileReport {
        let mut report = FileReport::from_fetch(outcome);
        if report.state == FileState::Fetched {
            if let Err(e) = self.process(&mut report).await {
                tracing::error!("{e}");
            }
        }
        report
    }

    /// Run a `Fetched` file through decode, correct, encode and persist.
    ///
    /// Each stage advances `report`; on error the report is moved to the
    /// matching `*Failed` state and the error is also returned.
    pub async fn process(&self, report: &mut FileReport) -> Result<CorrectedFile, PipelineError> {
        let start = Instant::now();
        let input = report.local_path.clone();
        tracing::debug!("Processing: {:?}", input);

        // Decode
        report.advance(FileState::Decoding);
        let decode_start = Instant::now();
        let decoded = match self.decode(&input).await {
            Ok(decoded) => decoded,
            Err(e) => {
                report.fail(FileState::DecodeFailed, &e);
                return Err(e);
            }
        };
        report.advance(FileState::Decoded);
        tracing::debug!("  Decode: {:?}", decode_start.elapsed());

        let (width, height) = (decoded.width, decoded.height);
        let params = self.params;
        let pixels = decoded.pixels;

        // Correct (CPU-bound)
        report.advance(FileState::Correcting);
        let correct_start = Instant::now();
        let corrected =
            tokio::task::spawn_blocking(move || correction::correct(&pixels, &params)).await;
        let corrected = match corrected {
            Ok(Ok(image)) => image,
            Ok(Err(source)) => {
                let e = PipelineError::Correct {
                    path: input.clone(),
                    source,
                };
                report.fail(FileState::CorrectFailed, &e);
                return Err(e);
            }
            Err(join) => {
                let e = worker_error(&input, "correct", join);
                report.fail(FileState::CorrectFailed, &e);
                return Err(e);
            }
        };
        report.advance(FileState::Corrected);
        tracing::debug!("  Correct: {:?}", correct_start.elapsed());

        // Encode
        report.advance(FileState::Encoding);
        let output_path = match self.output_path(&input) {
            Ok(path) => path,
            Err(e) => {
                report.fail(FileState::EncodeFailed, &e);
                return Err(e);
            }
        };
        let encode_start = Instant::now();
        let bytes = match self.encode(corrected, &output_path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                report.fail(FileState::EncodeFailed, &e);
                return Err(e);
            }
        };
        tracing::debug!("  Encode: {:?}", encode_start.elapsed());

        // Persist
        if let Err(e) = tokio::fs::write(&output_path, &bytes).await {
            let e = PipelineError::Persist {
                path: output_path,
                message: e.to_string(),
            };
            report.fail(FileState::PersistFailed, &e);
            return Err(e);
        }
        report.advance(FileState::Persisted);
        report.output_path = Some(output_path.clone());

        let file_name = output_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();

        tracing::info!(
            "Corrected {} -> {} ({}x{}) in {:?}",
            report.source_name,
            file_name,
            width,
            height,
            start.elapsed()
        );

        Ok(CorrectedFile {
            source_path: input,
            output_path,
            file_name,
            width,
            height,
        })
    }

    async fn decode(&self, input: &Path) -> Result<super::DecodedImage, PipelineError> {
        self.validator.validate(input)?;
        self.decoder.decode(input).await
    }

    async fn encode(
        &self,
        image: image::RgbaImage,
        output_path: &Path,
    ) -> Result<Vec<u8>, PipelineError> {
        let writer = self.writer;
        let path = output_path.to_path_buf();
        tokio::task::spawn_blocking(move || writer.encode(image, &path))
            .await
            .map_err(|join| worker_error(output_path, "encode", join))?
    }
}

fn worker_error(path: &Path, stage: &str, join: tokio::task::JoinError) -> PipelineError {
    PipelineError::Worker {
        path: path.to_path_buf(),
        stage: stage.to_string(),
        message: join.to_string(),
    }
}
