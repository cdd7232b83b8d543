//! Commands operating on annotation files

use crate::cli::{DetectArgs, ExportArgs, PropagateArgs, Target, TemplateArgs};
use annotator_core::export::export_rows;
use annotator_core::template::TemplateLoader;
use annotator_core::{AnnotationCollection, Dot, LineSegment, Session, SessionConfig};
use annotator_cv::{DetectionConfig, DetectionResult, EdgeDetector, FrameBuffer, Region, Result};
use anyhow::Context;
use serde::Serialize;
use std::path::Path;
use tracing::{info, warn};

/// A run with fewer dots than this moves on to the next preset
const MIN_USEFUL_DOTS: usize = 3;

/// Printed after writing into an annotation file
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MergeReport {
    annotation_id: Option<String>,
    frame: u32,
    dots: usize,
    lines: usize,
}

#[derive(Debug, Serialize)]
struct PropagateReport {
    source: Option<u32>,
    frame: u32,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value).context("Failed to serialize output")?);
    Ok(())
}

/// Detect with the configured preset, then the fallback presets, until one
/// finds enough dots. The last run is kept when none does.
pub fn detect_keypoints(frame: &FrameBuffer, config: DetectionConfig, region: Option<&Region>) -> Result<DetectionResult> {
    let configs_to_try = [
        ("configured", config),
        ("low contrast", DetectionConfig::for_low_contrast()),
        ("fine detail", DetectionConfig::for_fine_detail()),
    ];

    let mut best = DetectionResult::default();
    for (name, config) in configs_to_try {
        info!("Trying configuration: {}", name);
        let detector = EdgeDetector::new(config)?;
        let result = detector.detect(frame, region);

        if result.dots.len() >= MIN_USEFUL_DOTS {
            return Ok(result);
        }
        info!("Only {} dots, trying next configuration", result.dots.len());
        if result.dots.len() >= best.dots.len() {
            best = result;
        }
    }

    warn!("Using best available detection ({} dots)", best.dots.len());
    Ok(best)
}

pub fn run_detect(args: &DetectArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => DetectionConfig::from_file(path)?,
        None => DetectionConfig::default(),
    };
    let frame = FrameBuffer::load(&args.input, config.display_width, config.display_height)
        .with_context(|| format!("Failed to load frame: {:?}", args.input))?;

    let detector = EdgeDetector::new(config.clone())?;
    let result = detect_keypoints(&frame, config, args.region.as_ref())?;

    if let Some(output) = &args.output {
        detector.export_json(&result, output)?;
    }

    match &args.target.annotations {
        Some(path) => {
            let annotation_id = merge_into(path, args.target.frame, &result.dots, &result.lines, &args.label)?;
            print_json(&MergeReport {
                annotation_id,
                frame: args.target.frame,
                dots: result.dots.len(),
                lines: result.lines.len(),
            })?;
        }
        None if args.output.is_none() => print_json(&result)?,
        None => {}
    }
    Ok(())
}

pub fn run_template(args: &TemplateArgs) -> Result<()> {
    let mut loader = TemplateLoader::new();
    if let Some(dir) = &args.template_dir {
        loader = loader.add_template_dir(dir);
    }
    let template = loader.load_template(&args.name)?;
    template.validate()?;
    let result = template.apply(args.cx, args.cy);

    match &args.target {
        Target {
            annotations: Some(path),
            frame,
        } => {
            let annotation_id = merge_into(path, *frame, &result.dots, &result.lines, &template.name)?;
            print_json(&MergeReport {
                annotation_id,
                frame: *frame,
                dots: result.dots.len(),
                lines: result.lines.len(),
            })
        }
        _ => print_json(&result),
    }
}

pub fn run_export(args: &ExportArgs) -> Result<()> {
    anyhow::ensure!(args.fps.is_finite() && args.fps > 0.0, "fps must be positive, got {}", args.fps);
    let collection = AnnotationCollection::load(&args.annotations)?;
    print_json(&export_rows(&collection, args.fps))
}

pub fn run_propagate(args: &PropagateArgs) -> Result<()> {
    let collection = AnnotationCollection::load(&args.annotations)?;
    let mut session = Session::with_collection(collection, SessionConfig::default());
    session.set_frame(args.frame);

    let source = session.propagate_previous_frame();
    match source {
        Some(source) => {
            session.into_collection().save(&args.annotations)?;
            info!("Copied frame {} into frame {}", source, args.frame);
        }
        None => warn!("No earlier annotated frame before {}", args.frame),
    }
    print_json(&PropagateReport {
        source,
        frame: args.frame,
    })
}

/// Add dots and lines as a new annotation in the file at `path`
fn merge_into(path: &Path, frame: u32, dots: &[Dot], lines: &[LineSegment], label: &str) -> Result<Option<String>> {
    let collection = AnnotationCollection::load_or_default(path)?;
    let mut session = Session::with_collection(collection, SessionConfig::default());
    session.set_frame(frame);

    let annotation_id = session.merge_detection(dots, lines, label);
    match &annotation_id {
        Some(id) => {
            session.into_collection().save(path)?;
            info!("Added annotation {} at frame {} to {}", id, frame, path.display());
        }
        None => warn!("Nothing to add at frame {}", frame),
    }
    Ok(annotation_id)
}
