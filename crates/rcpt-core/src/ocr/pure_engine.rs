//! Pure Rust OCR engine wrapper using `pure-onnx-ocr`.
//!
//! The `pure-onnx-ocr` engine caches execution plans in `RefCell`s and cannot
//! leave the thread that built it. [`PureOcrEngine`] is a `Send + Sync` handle
//! to a dedicated `rcpt-ocr` thread that owns the engine. Jobs go over a
//! channel, each with its own reply channel.

use std::sync::mpsc;
use std::thread;
use std::time::Instant;

use image::{DynamicImage, GenericImageView};
use pure_onnx_ocr::engine::{OcrEngine, OcrEngineBuilder};
use tracing::{debug, info};

use crate::error::OcrError;
use crate::models::config::OcrConfig;

use super::{LineRecognizer, OcrResult, TextBox};

/// Placeholder the recognizer emits for glyphs outside its dictionary.
const UNKNOWN_GLYPH: &str = "[UNK]";

/// One recognition request for the OCR thread.
struct Job {
    image: DynamicImage,
    reply: mpsc::Sender<Result<OcrResult, OcrError>>,
}

/// OCR engine backed by `pure-onnx-ocr` (pure Rust, no external ONNX Runtime).
///
/// Jobs are served one at a time in submission order. Dropping the handle
/// stops the OCR thread.
pub struct PureOcrEngine {
    jobs: mpsc::Sender<Job>,
}

impl PureOcrEngine {
    /// Start the OCR thread and load the model files named in the config.
    ///
    /// Returns once the models are loaded, or with the load error.
    pub fn from_config(config: &OcrConfig) -> Result<Self, OcrError> {
        let det_path = config.model_path(&config.detection_model);
        let rec_path = config.model_path(&config.recognition_model);
        let dict_path = config.model_path(&config.dictionary);

        for path in [&det_path, &rec_path, &dict_path] {
            if !path.exists() {
                return Err(OcrError::ModelLoad(format!(
                    "missing model file {}",
                    path.display()
                )));
            }
        }

        let keep_unk = config.keep_unk;
        let (jobs, queue) = mpsc::channel::<Job>();
        let (ready_tx, ready_rx) = mpsc::channel::<Result<(), OcrError>>();

        thread::Builder::new()
            .name("rcpt-ocr".to_string())
            .spawn(move || {
                let built = OcrEngineBuilder::new()
                    .det_model_path(&det_path)
                    .rec_model_path(&rec_path)
                    .dictionary_path(&dict_path)
                    .build();

                let engine = match built {
                    Ok(engine) => engine,
                    Err(e) => {
                        let _ = ready_tx.send(Err(OcrError::ModelLoad(format!("pure-onnx-ocr: {}", e))));
                        return;
                    }
                };

                if ready_tx.send(Ok(())).is_ok() {
                    serve_jobs(&engine, keep_unk, queue);
                }
            })
            .map_err(|e| OcrError::ModelLoad(format!("cannot start OCR thread: {}", e)))?;

        ready_rx
            .recv()
            .map_err(|_| OcrError::ModelLoad("OCR thread exited while loading models".to_string()))??;

        info!("Loaded pure-onnx-ocr engine from {}", config.model_dir.display());

        Ok(Self { jobs })
    }
}

impl LineRecognizer for PureOcrEngine {
    fn recognize(&self, image: &DynamicImage) -> Result<OcrResult, OcrError> {
        let (width, height) = image.dimensions();

        if width == 0 || height == 0 {
            return Err(OcrError::InvalidImage(format!("{}x{}", width, height)));
        }

        let (reply, response) = mpsc::channel();
        self.jobs
            .send(Job {
                image: image.clone(),
                reply,
            })
            .map_err(|_| worker_stopped())?;

        response.recv().map_err(|_| worker_stopped())?
    }
}

fn worker_stopped() -> OcrError {
    OcrError::Recognition("OCR thread is not running".to_string())
}

/// Answer jobs until every handle is dropped.
fn serve_jobs(engine: &OcrEngine, keep_unk: bool, queue: mpsc::Receiver<Job>) {
    for job in queue {
        // The caller may have given up waiting
        let _ = job.reply.send(run_ocr(engine, keep_unk, &job.image));
    }
    debug!("OCR thread stopped");
}

fn run_ocr(engine: &OcrEngine, keep_unk: bool, image: &DynamicImage) -> Result<OcrResult, OcrError> {
    let start = Instant::now();
    let (width, height) = image.dimensions();

    info!("Processing image: {}x{}", width, height);

    let results = engine
        .run_from_image(image)
        .map_err(|e| OcrError::Recognition(format!("pure-onnx-ocr: {}", e)))?;

    debug!("pure-onnx-ocr returned {} text regions", results.len());

    let boxes = results
        .iter()
        .map(|r| TextBox {
            bbox: polygon_to_bbox(&r.bounding_box),
            text: if keep_unk {
                r.text.clone()
            } else {
                r.text.replace(UNKNOWN_GLYPH, " ")
            },
            score: r.confidence,
        })
        .collect();

    let mut result = OcrResult {
        boxes,
        processing_time_ms: 0,
        image_size: (width, height),
    };
    result.sort_by_reading_order();
    result.processing_time_ms = start.elapsed().as_millis() as u64;

    info!(
        "OCR complete: {} text boxes in {}ms",
        result.boxes.len(),
        result.processing_time_ms
    );

    Ok(result)
}

/// Convert a `Polygon<f64>` to our `[f32; 8]` bbox format.
///
/// Extracts the first 4 exterior points (quadrilateral) as
/// `[x1, y1, x2, y2, x3, y3, x4, y4]`.
fn polygon_to_bbox(polygon: &pure_onnx_ocr::Polygon<f64>) -> [f32; 8] {
    let mut bbox = [0.0f32; 8];
    for (i, coord) in polygon.exterior().coords().take(4).enumerate() {
        bbox[i * 2] = coord.x as f32;
        bbox[i * 2 + 1] = coord.y as f32;
    }
    bbox
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_models_fail_to_load() {
        let dir = tempfile::tempdir().unwrap();
        let config = OcrConfig {
            model_dir: dir.path().to_path_buf(),
            ..OcrConfig::default()
        };

        match PureOcrEngine::from_config(&config) {
            Err(OcrError::ModelLoad(msg)) => assert!(msg.contains("det.onnx")),
            Err(e) => panic!("unexpected error: {}", e),
            Ok(_) => panic!("engine loaded without models"),
        }
    }

    #[test]
    fn test_corrupt_models_fail_on_ocr_thread() {
        let dir = tempfile::tempdir().unwrap();
        let config = OcrConfig {
            model_dir: dir.path().to_path_buf(),
            ..OcrConfig::default()
        };
        for name in [&config.detection_model, &config.recognition_model, &config.dictionary] {
            std::fs::write(config.model_path(name), b"").unwrap();
        }

        match PureOcrEngine::from_config(&config) {
            Err(OcrError::ModelLoad(msg)) => assert!(msg.starts_with("pure-onnx-ocr")),
            Err(e) => panic!("unexpected error: {}", e),
            Ok(_) => panic!("engine loaded from empty model files"),
        }
    }

    #[test]
    fn test_engine_handle_is_shareable() {
        fn assert_shareable<T: Send + Sync + 'static>() {}
        assert_shareable::<PureOcrEngine>();
        assert_shareable::<std::sync::Arc<dyn LineRecognizer>>();
    }
}
