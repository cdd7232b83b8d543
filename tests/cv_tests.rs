// tests/cv_tests.rs
use annotator_core::{Session, SessionConfig};
use annotator_cv::{
    BBox, BBoxCollection, DetectionConfig, EdgeDetector, EdgeOptions, FrameBuffer, Region, Result,
    edges::extract_keypoints,
};

/// Bright rectangle on a dark background
fn rectangle_frame(width: u32, height: u32, x: std::ops::Range<u32>, y: std::ops::Range<u32>) -> FrameBuffer {
    let image = image::RgbaImage::from_fn(width, height, |px, py| {
        if x.contains(&px) && y.contains(&py) {
            image::Rgba([240, 240, 240, 255])
        } else {
            image::Rgba([15, 15, 15, 255])
        }
    });
    FrameBuffer::from_rgba_image(image)
}

#[test]
fn test_detection_is_deterministic() {
    let frame = rectangle_frame(160, 90, 50..110, 20..70);
    let options = EdgeOptions::default();

    let (first, _) = extract_keypoints(&frame, &options, None, "");
    let (second, _) = extract_keypoints(&frame, &options, None, "");

    assert!(!first.is_empty());
    assert_eq!(first.dots, second.dots);
    assert_eq!(first.lines, second.lines);
}

#[test]
fn test_uniform_frame_yields_nothing() -> Result<()> {
    let detector = EdgeDetector::new(DetectionConfig::default())?;
    for color in [[0, 0, 0, 255], [128, 64, 200, 255], [255, 255, 255, 255]] {
        let result = detector.detect(&FrameBuffer::filled(80, 45, color), None);
        assert!(result.dots.is_empty());
        assert!(result.lines.is_empty());
    }
    Ok(())
}

#[test]
fn test_unreadable_frame_yields_nothing() -> Result<()> {
    let detector = EdgeDetector::new(DetectionConfig::default())?;
    let truncated = FrameBuffer::new(10, 10, vec![255; 12]);
    assert!(detector.detect(&truncated, None).is_empty());
    assert!(detector.detect(&FrameBuffer::new(0, 0, Vec::new()), None).is_empty());
    Ok(())
}

#[test]
fn test_rectangle_outline_is_found() -> Result<()> {
    let detector = EdgeDetector::new(DetectionConfig::default())?;
    let result = detector.detect(&rectangle_frame(160, 90, 50..110, 20..70), None);

    assert!(result.dots.len() >= 3);
    assert!(!result.lines.is_empty());
    for dot in &result.dots {
        assert!((45.0..=115.0).contains(&dot.x), "dot x {}", dot.x);
        assert!((15.0..=75.0).contains(&dot.y), "dot y {}", dot.y);
        assert_eq!(dot.color, "blue");
    }
    for line in &result.lines {
        assert_ne!(line.start_dot_id, line.end_dot_id);
        assert!(result.dots.iter().any(|d| d.id == line.start_dot_id));
        assert!(result.dots.iter().any(|d| d.id == line.end_dot_id));
    }
    Ok(())
}

#[test]
fn test_region_output_is_in_frame_coordinates() -> Result<()> {
    let detector = EdgeDetector::new(DetectionConfig::default())?;
    let frame = rectangle_frame(200, 120, 130..170, 60..100);

    let region = Region::new(110.0, 40.0, 500.0, 500.0);
    let result = detector.detect(&frame, Some(&region));
    assert!(!result.is_empty());
    assert!(result.dots.iter().all(|d| d.x >= 110.0 && d.y >= 40.0));
    assert!(result.dots.iter().any(|d| d.x >= 160.0));

    let outside = Region::new(400.0, 400.0, 50.0, 50.0);
    assert!(detector.detect(&frame, Some(&outside)).is_empty());
    Ok(())
}

#[test]
fn test_proposer_restricts_search() -> Result<()> {
    let detector = EdgeDetector::new(DetectionConfig::default())?;
    let frame = rectangle_frame(200, 120, 20..60, 30..80);

    let proposer = |_: &FrameBuffer| -> Result<BBoxCollection> {
        Ok(BBoxCollection::from_vec(vec![
            BBox::new(10.0, 20.0, 60.0, 70.0, 0.9).with_class(0, "person"),
            BBox::new(12.0, 22.0, 58.0, 68.0, 0.6).with_class(0, "person"),
        ]))
    };
    let result = detector.detect_with_proposer(&frame, &proposer)?;

    // the second box overlaps the first and is suppressed
    assert_eq!(result.stats.regions, 1);
    assert!(result.dots.iter().all(|d| d.x <= 70.0 && d.y <= 90.0));
    assert!(result.dots.iter().all(|d| d.id.starts_with("r0-")));
    Ok(())
}

#[test]
fn test_detection_merges_into_session() -> Result<()> {
    let detector = EdgeDetector::new(DetectionConfig::default())?;
    let result = detector.detect(&rectangle_frame(160, 90, 50..110, 20..70), None);

    let mut session = Session::new(SessionConfig::default());
    session.set_frame(12);
    let annotation_id = session
        .merge_detection(&result.dots, &result.lines, "Detected")
        .ok_or_else(|| anyhow::anyhow!("nothing merged"))?;

    let record = session
        .collection()
        .frame_record(&annotation_id, 12)
        .ok_or_else(|| anyhow::anyhow!("missing frame"))?;
    assert_eq!(record.dots.len(), result.dots.len());
    assert_eq!(record.lines.len(), result.lines.len());
    // merged ids are fresh
    assert!(record.dots.iter().all(|d| result.dots.iter().all(|r| r.id != d.id)));
    assert!(session.can_undo());
    Ok(())
}
