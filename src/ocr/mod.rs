//! Optical character recognition for nutrition label photos.
//!
//! Engines return the detected text flattened to single-space separated tokens;
//! no layout survives.

mod tesseract;

use async_trait::async_trait;
use thiserror::Error;

pub use tesseract::TesseractEngine;

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("empty image")]
    EmptyImage,
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("ocr engine failed: {0}")]
    Engine(String),
    #[error("ocr engine timed out after {0:?}")]
    Timeout(std::time::Duration),
}

#[async_trait]
pub trait OcrEngine: Send + Sync {
    async fn recognize(&self, image: &[u8]) -> Result<String, OcrError>;
}

/// Collapses any whitespace (newlines, tabs, runs of spaces) to single spaces.
pub fn flatten(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
