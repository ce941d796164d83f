use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "license-plate-server")]
#[command(about = "Locates license plates in photos and reads their text")]
#[command(version)]
pub struct Args {
    /// Host address to bind to
    #[arg(long, env = "PLATE_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "PLATE_PORT", default_value = "5000")]
    pub port: u16,

    /// Maximum upload size in bytes (default: 20MB)
    #[arg(long, env = "PLATE_MAX_FILE_SIZE", default_value = "20971520")]
    pub max_file_size: usize,

    /// OCR engine used for plate text ("ocrs", "leptess")
    #[arg(long, env = "PLATE_ENGINE")]
    pub engine: Option<String>,

    /// Directory holding the ocrs detection/recognition models
    #[arg(long, env = "PLATE_MODEL_DIR")]
    pub model_dir: Option<PathBuf>,

    /// Path to tessdata directory (downloaded to the cache dir if not set)
    #[arg(long, env = "TESSDATA_PREFIX")]
    pub tessdata_path: Option<String>,

    /// Tesseract language
    #[arg(long, env = "PLATE_LANGUAGE", default_value = "eng")]
    pub language: String,

    /// Serialize calls into the OCR engine behind a lock
    #[arg(long, env = "PLATE_SERIALIZE_OCR")]
    pub serialize_ocr: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub max_file_size: usize,
    pub engine: Option<String>,
    pub model_dir: Option<PathBuf>,
    pub tessdata_path: Option<String>,
    pub language: String,
    pub serialize_ocr: bool,
    pub pipeline: PipelineConfig,
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        Self {
            host: args.host,
            port: args.port,
            max_file_size: args.max_file_size,
            engine: args.engine,
            model_dir: args.model_dir,
            tessdata_path: args.tessdata_path,
            language: args.language,
            serialize_ocr: args.serialize_ocr,
            pipeline: PipelineConfig::default(),
        }
    }
}

/// Tunables of the plate pipeline.
///
/// `Default` holds the values the pipeline was tuned with: a 400x600 frame,
/// 5x5 blur, 11x11 Gaussian adaptive threshold with a bias of 2, the 10
/// largest contours and a polygon tolerance of 2% of the perimeter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineConfig {
    /// Canonical frame every input is resized to (width, height)
    pub frame: (u32, u32),
    /// Gaussian blur kernel size (odd)
    pub blur_kernel: u32,
    /// Adaptive threshold neighbourhood size (odd)
    pub threshold_block: u32,
    /// Constant subtracted from the local mean
    pub threshold_bias: i16,
    /// Number of largest contours considered
    pub max_candidates: usize,
    /// Polygon approximation tolerance as a fraction of the perimeter
    pub epsilon_ratio: f64,
    /// Vertex count a simplified contour needs to count as a plate
    pub plate_vertices: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            frame: (400, 600),
            blur_kernel: 5,
            threshold_block: 11,
            threshold_bias: 2,
            max_candidates: 10,
            epsilon_ratio: 0.02,
            plate_vertices: 4,
        }
    }
}

impl Config {
    /// Configuration for running without the CLI (tests, embedding)
    pub fn local(port: u16) -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port,
            max_file_size: 20 * 1024 * 1024,
            engine: None,
            model_dir: None,
            tessdata_path: None,
            language: "eng".to_string(),
            serialize_ocr: false,
            pipeline: PipelineConfig::default(),
        }
    }
}
