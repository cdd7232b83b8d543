//! Command-line arguments

use annotator_core::time::DEFAULT_FPS;
use annotator_cv::Region;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Keypoint annotation toolkit",
    long_about = "Detects keypoints in video frames, applies skeleton templates and exports annotation files."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Detect edge keypoints in an image
    Detect(DetectArgs),
    /// Place a skeleton template
    Template(TemplateArgs),
    /// Print dot and line rows of an annotation file as JSON
    Export(ExportArgs),
    /// Copy the nearest earlier annotated frame into a frame
    Propagate(PropagateArgs),
}

/// Annotation file and frame to write results into
#[derive(Args, Debug)]
pub struct Target {
    /// Annotation JSON file; created when missing
    #[arg(short, long, value_name = "ANNOTATIONS")]
    pub annotations: Option<PathBuf>,

    /// Frame number the result is placed at
    #[arg(short, long, default_value_t = 0)]
    pub frame: u32,
}

#[derive(Args, Debug)]
pub struct DetectArgs {
    /// Image to detect in; scaled to the display resolution first
    #[arg(short, long, value_name = "IMAGE")]
    pub input: PathBuf,

    /// Detection config JSON
    #[arg(short, long, value_name = "CONFIG")]
    pub config: Option<PathBuf>,

    /// Restrict detection to x,y,width,height in display coordinates
    #[arg(long, value_name = "X,Y,W,H", value_parser = parse_region)]
    pub region: Option<Region>,

    /// Label of the annotation created from the detection
    #[arg(long, default_value = "Detected")]
    pub label: String,

    #[command(flatten)]
    pub target: Target,

    /// Write the detection result JSON here instead of stdout
    #[arg(short, long, value_name = "OUTPUT")]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct TemplateArgs {
    /// Template id (human-pose, hand-pose, face-landmarks or a user template)
    #[arg(short, long)]
    pub name: String,

    /// Directory searched for <id>.json before the built-in templates
    #[arg(long, value_name = "DIR")]
    pub template_dir: Option<PathBuf>,

    #[arg(long, default_value_t = annotator_core::template::DEFAULT_CENTER.0)]
    pub cx: f64,

    #[arg(long, default_value_t = annotator_core::template::DEFAULT_CENTER.1)]
    pub cy: f64,

    #[command(flatten)]
    pub target: Target,
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    #[arg(short, long, value_name = "ANNOTATIONS")]
    pub annotations: PathBuf,

    #[arg(long, default_value_t = DEFAULT_FPS)]
    pub fps: f64,
}

#[derive(Args, Debug)]
pub struct PropagateArgs {
    #[arg(short, long, value_name = "ANNOTATIONS")]
    pub annotations: PathBuf,

    /// Frame to fill
    #[arg(short, long)]
    pub frame: u32,
}

/// `x,y,width,height` with a non-empty size
fn parse_region(value: &str) -> Result<Region, String> {
    let region: Region = value.parse()?;
    if region.width > 0.0 && region.height > 0.0 {
        Ok(region)
    } else {
        Err("region width and height must be positive".to_string())
    }
}
