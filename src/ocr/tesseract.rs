use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use super::{flatten, OcrEngine, OcrError};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Runs the `tesseract` executable on a temp copy of the image. The child is
/// killed when it outlives `timeout`.
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    binary: PathBuf,
    language: String,
    timeout: Duration,
}

impl TesseractEngine {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            binary: PathBuf::from("tesseract"),
            language: language.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.binary = binary.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn run(&self, input: &std::path::Path) -> Result<String, OcrError> {
        // "stdout" as output base makes tesseract print instead of writing a file.
        let child = Command::new(&self.binary)
            .arg(input)
            .arg("stdout")
            .args(["-l", &self.language, "--psm", "3"])
            .kill_on_drop(true)
            .output();

        let output = match tokio::time::timeout(self.timeout, child).await {
            Ok(output) => output?,
            Err(_) => {
                warn!(timeout_ms = self.timeout.as_millis() as u64, "tesseract timed out");
                return Err(OcrError::Timeout(self.timeout));
            }
        };

        if !output.status.success() {
            return Err(OcrError::Engine(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }
        Ok(flatten(&String::from_utf8_lossy(&output.stdout)))
    }
}

#[async_trait]
impl OcrEngine for TesseractEngine {
    #[instrument(skip(self, image), fields(bytes = image.len()))]
    async fn recognize(&self, image: &[u8]) -> Result<String, OcrError> {
        if image.is_empty() {
            return Err(OcrError::EmptyImage);
        }
        let input = std::env::temp_dir().join(format!("ocr_input_{}", Uuid::new_v4()));
        tokio::fs::write(&input, image).await?;

        let result = self.run(&input).await;
        let _ = tokio::fs::remove_file(&input).await;

        let text = result?;
        debug!(chars = text.len(), "ocr finished");
        Ok(text)
    }
}
