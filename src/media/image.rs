// src/media/image.rs
// Image-to-text: fixed preprocessing pipeline + OCR collaborator.

use std::io::{Cursor, Write};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use image::{DynamicImage, ImageFormat};
use thiserror::Error;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

use super::MediaError;
use crate::config::CONFIG;

/// Luma cutoff for binarization after the contrast boost.
const BINARIZE_THRESHOLD: u8 = 150;

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("OCR engine failed: {0}")]
    Engine(String),

    #[error("OCR engine timed out")]
    Timeout,
}

/// Async seam for the OCR collaborator: prepared image bytes in, raw
/// recognized text out.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    async fn recognize(&self, image: &[u8]) -> Result<String, OcrError>;
}

/// Drives the `tesseract` binary: the image is written to a scoped temp file
/// and text is read back from stdout.
pub struct TesseractOcr {
    cmd: String,
    language: String,
    page_seg_mode: u8,
    timeout: Duration,
}

impl TesseractOcr {
    pub fn from_env() -> Self {
        Self {
            cmd: CONFIG.tesseract_cmd.clone(),
            language: CONFIG.ocr_language.clone(),
            page_seg_mode: CONFIG.ocr_page_seg_mode,
            timeout: Duration::from_secs(CONFIG.ocr_timeout),
        }
    }
}

#[async_trait]
impl OcrEngine for TesseractOcr {
    async fn recognize(&self, image: &[u8]) -> Result<String, OcrError> {
        let mut file = tempfile::Builder::new()
            .prefix("sahayak-ocr-")
            .suffix(".png")
            .tempfile()
            .map_err(|e| OcrError::Engine(format!("could not create temp image: {e}")))?;
        file.write_all(image)
            .and_then(|_| file.flush())
            .map_err(|e| OcrError::Engine(format!("could not write temp image: {e}")))?;

        debug!(cmd = %self.cmd, psm = self.page_seg_mode, "Running OCR");
        let run = Command::new(&self.cmd)
            .arg(file.path())
            .arg("stdout")
            .args(["-l", &self.language])
            .args(["--psm", &self.page_seg_mode.to_string()])
            .output();

        let output = timeout(self.timeout, run)
            .await
            .map_err(|_| OcrError::Timeout)?
            .map_err(|e| OcrError::Engine(format!("could not run '{}': {e}", self.cmd)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(OcrError::Engine(stderr));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Extracts question text from an uploaded image, optionally cleaning it up
/// first for handwriting legibility.
pub struct ImageReader {
    ocr: Arc<dyn OcrEngine>,
    preprocess: bool,
}

impl ImageReader {
    pub fn new(ocr: Arc<dyn OcrEngine>, preprocess: bool) -> Self {
        Self { ocr, preprocess }
    }

    pub fn from_env() -> Self {
        Self::new(Arc::new(TesseractOcr::from_env()), CONFIG.ocr_preprocess)
    }

    /// Runs the pipeline and returns trimmed text. Empty OCR output is a
    /// recoverable failure and never reaches the tutoring layer.
    pub async fn extract(&self, image_bytes: &[u8]) -> Result<String, MediaError> {
        let prepared;
        let input: &[u8] = if self.preprocess {
            prepared = preprocess(image_bytes)?;
            &prepared
        } else {
            image_bytes
        };

        let text = self.ocr.recognize(input).await.map_err(|e| match e {
            OcrError::Timeout => MediaError::Ocr("engine timed out".into()),
            OcrError::Engine(msg) => MediaError::Ocr(msg),
        })?;

        let text = text.trim();
        if text.is_empty() {
            return Err(MediaError::UnreadableImage);
        }
        Ok(text.to_string())
    }
}

/// Fixed, non-adaptive cleanup chain: grayscale, mild blur against sensor
/// noise, contrast boost, threshold binarization, re-encoded as PNG.
fn preprocess(image_bytes: &[u8]) -> Result<Vec<u8>, MediaError> {
    let img = image::load_from_memory(image_bytes).map_err(|_| MediaError::UnreadableImage)?;

    let gray = img.to_luma8();
    let denoised = image::imageops::blur(&gray, 1.0);
    let mut contrasted = image::imageops::contrast(&denoised, 30.0);
    for pixel in contrasted.pixels_mut() {
        pixel.0[0] = if pixel.0[0] > BINARIZE_THRESHOLD { 255 } else { 0 };
    }

    let mut out = Vec::new();
    DynamicImage::ImageLuma8(contrasted)
        .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
        .map_err(|e| MediaError::Ocr(format!("could not re-encode image: {e}")))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Luma};

    /// Returns a preset result without touching any engine.
    struct FixedOcr(Result<String, fn() -> OcrError>);

    #[async_trait]
    impl OcrEngine for FixedOcr {
        async fn recognize(&self, _image: &[u8]) -> Result<String, OcrError> {
            match &self.0 {
                Ok(text) => Ok(text.clone()),
                Err(make) => Err(make()),
            }
        }
    }

    fn reader(result: Result<String, fn() -> OcrError>) -> ImageReader {
        ImageReader::new(Arc::new(FixedOcr(result)), false)
    }

    fn sample_png() -> Vec<u8> {
        let img: ImageBuffer<Luma<u8>, Vec<u8>> = ImageBuffer::from_fn(16, 16, |x, _| {
            if x < 8 { Luma([30u8]) } else { Luma([220u8]) }
        });
        let mut out = Vec::new();
        DynamicImage::ImageLuma8(img)
            .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
            .unwrap();
        out
    }

    #[tokio::test]
    async fn extract_trims_recognized_text() {
        let text = reader(Ok("  what is gravity?\n".into()))
            .extract(b"fake image")
            .await
            .unwrap();
        assert_eq!(text, "what is gravity?");
    }

    #[tokio::test]
    async fn empty_ocr_output_is_a_recoverable_failure() {
        let err = reader(Ok("   \n\t".into())).extract(b"fake image").await.unwrap_err();
        assert!(matches!(err, MediaError::UnreadableImage));
        assert!(err.is_recoverable());
    }

    #[tokio::test]
    async fn engine_breakage_is_internal() {
        let err = reader(Err(|| OcrError::Engine("tesseract not found".into())))
            .extract(b"fake image")
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::Ocr(_)));
        assert!(!err.is_recoverable());
    }

    #[tokio::test]
    async fn preprocessing_rejects_undecodable_bytes() {
        let reader = ImageReader::new(Arc::new(FixedOcr(Ok("text".into()))), true);
        let err = reader.extract(b"definitely not an image").await.unwrap_err();
        assert!(matches!(err, MediaError::UnreadableImage));
    }

    #[test]
    fn preprocess_produces_binarized_png() {
        let out = preprocess(&sample_png()).unwrap();
        let decoded = image::load_from_memory(&out).unwrap().to_luma8();
        assert!(decoded.pixels().all(|p| p.0[0] == 0 || p.0[0] == 255));
    }
}
