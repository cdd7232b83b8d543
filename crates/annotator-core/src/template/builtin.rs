//! Templates shipped with the tool

use super::{SkeletonTemplate, TemplateDot, TemplateLine};
use crate::error::{AnnotationError, Result};

type DotSpec = (&'static str, f64, f64, &'static str);
type LineSpec = (&'static str, &'static str, &'static str);

const HUMAN_POSE_DOTS: &[DotSpec] = &[
    ("nose", 400.0, 100.0, "Nose"),
    ("left-eye", 390.0, 90.0, "Left Eye"),
    ("right-eye", 410.0, 90.0, "Right Eye"),
    ("left-ear", 380.0, 95.0, "Left Ear"),
    ("right-ear", 420.0, 95.0, "Right Ear"),
    ("left-shoulder", 350.0, 150.0, "Left Shoulder"),
    ("right-shoulder", 450.0, 150.0, "Right Shoulder"),
    ("left-elbow", 320.0, 200.0, "Left Elbow"),
    ("right-elbow", 480.0, 200.0, "Right Elbow"),
    ("left-wrist", 290.0, 250.0, "Left Wrist"),
    ("right-wrist", 510.0, 250.0, "Right Wrist"),
    ("left-hip", 370.0, 300.0, "Left Hip"),
    ("right-hip", 430.0, 300.0, "Right Hip"),
    ("left-knee", 360.0, 380.0, "Left Knee"),
    ("right-knee", 440.0, 380.0, "Right Knee"),
    ("left-ankle", 350.0, 450.0, "Left Ankle"),
    ("right-ankle", 450.0, 450.0, "Right Ankle"),
];

const HUMAN_POSE_LINES: &[LineSpec] = &[
    ("nose", "left-eye", "Face"),
    ("nose", "right-eye", "Face"),
    ("left-eye", "left-ear", "Face"),
    ("right-eye", "right-ear", "Face"),
    ("nose", "left-shoulder", "Torso"),
    ("nose", "right-shoulder", "Torso"),
    ("left-shoulder", "right-shoulder", "Torso"),
    ("left-shoulder", "left-elbow", "Left Arm"),
    ("left-elbow", "left-wrist", "Left Arm"),
    ("right-shoulder", "right-elbow", "Right Arm"),
    ("right-elbow", "right-wrist", "Right Arm"),
    ("left-shoulder", "left-hip", "Torso"),
    ("right-shoulder", "right-hip", "Torso"),
    ("left-hip", "right-hip", "Torso"),
    ("left-hip", "left-knee", "Left Leg"),
    ("left-knee", "left-ankle", "Left Leg"),
    ("right-hip", "right-knee", "Right Leg"),
    ("right-knee", "right-ankle", "Right Leg"),
];

const HAND_POSE_DOTS: &[DotSpec] = &[
    ("wrist", 400.0, 300.0, "Wrist"),
    ("thumb-cmc", 420.0, 320.0, "Thumb CMC"),
    ("thumb-mcp", 440.0, 340.0, "Thumb MCP"),
    ("thumb-ip", 460.0, 360.0, "Thumb IP"),
    ("thumb-tip", 480.0, 380.0, "Thumb Tip"),
    ("index-mcp", 380.0, 320.0, "Index MCP"),
    ("index-pip", 360.0, 340.0, "Index PIP"),
    ("index-dip", 340.0, 360.0, "Index DIP"),
    ("index-tip", 320.0, 380.0, "Index Tip"),
    ("middle-mcp", 400.0, 320.0, "Middle MCP"),
    ("middle-pip", 400.0, 340.0, "Middle PIP"),
    ("middle-dip", 400.0, 360.0, "Middle DIP"),
    ("middle-tip", 400.0, 380.0, "Middle Tip"),
    ("ring-mcp", 420.0, 320.0, "Ring MCP"),
    ("ring-pip", 440.0, 340.0, "Ring PIP"),
    ("ring-dip", 460.0, 360.0, "Ring DIP"),
    ("ring-tip", 480.0, 380.0, "Ring Tip"),
    ("pinky-mcp", 440.0, 320.0, "Pinky MCP"),
    ("pinky-pip", 460.0, 340.0, "Pinky PIP"),
    ("pinky-dip", 480.0, 360.0, "Pinky DIP"),
    ("pinky-tip", 500.0, 380.0, "Pinky Tip"),
];

const HAND_POSE_LINES: &[LineSpec] = &[
    ("wrist", "thumb-cmc", "Thumb"),
    ("thumb-cmc", "thumb-mcp", "Thumb"),
    ("thumb-mcp", "thumb-ip", "Thumb"),
    ("thumb-ip", "thumb-tip", "Thumb"),
    ("wrist", "index-mcp", "Index"),
    ("index-mcp", "index-pip", "Index"),
    ("index-pip", "index-dip", "Index"),
    ("index-dip", "index-tip", "Index"),
    ("wrist", "middle-mcp", "Middle"),
    ("middle-mcp", "middle-pip", "Middle"),
    ("middle-pip", "middle-dip", "Middle"),
    ("middle-dip", "middle-tip", "Middle"),
    ("wrist", "ring-mcp", "Ring"),
    ("ring-mcp", "ring-pip", "Ring"),
    ("ring-pip", "ring-dip", "Ring"),
    ("ring-dip", "ring-tip", "Ring"),
    ("wrist", "pinky-mcp", "Pinky"),
    ("pinky-mcp", "pinky-pip", "Pinky"),
    ("pinky-pip", "pinky-dip", "Pinky"),
    ("pinky-dip", "pinky-tip", "Pinky"),
];

const FACE_DOTS: &[DotSpec] = &[
    ("nose-tip", 400.0, 200.0, "Nose Tip"),
    ("left-eye-inner", 380.0, 180.0, "Left Eye Inner"),
    ("left-eye-outer", 360.0, 180.0, "Left Eye Outer"),
    ("right-eye-inner", 420.0, 180.0, "Right Eye Inner"),
    ("right-eye-outer", 440.0, 180.0, "Right Eye Outer"),
    ("left-mouth", 370.0, 220.0, "Left Mouth"),
    ("right-mouth", 430.0, 220.0, "Right Mouth"),
    ("chin", 400.0, 240.0, "Chin"),
];

const FACE_LINES: &[LineSpec] = &[
    ("left-eye-inner", "left-eye-outer", "Left Eye"),
    ("right-eye-inner", "right-eye-outer", "Right Eye"),
    ("left-mouth", "right-mouth", "Mouth"),
    ("nose-tip", "chin", "Face Center"),
];

fn build(id: &str, name: &str, description: &str, dots: &[DotSpec], lines: &[LineSpec]) -> SkeletonTemplate {
    SkeletonTemplate {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        dots: dots
            .iter()
            .map(|&(id, x, y, label)| TemplateDot {
                id: id.to_string(),
                x,
                y,
                label: label.to_string(),
            })
            .collect(),
        lines: lines
            .iter()
            .map(|&(start, end, label)| TemplateLine {
                start_dot_id: start.to_string(),
                end_dot_id: end.to_string(),
                label: Some(label.to_string()),
            })
            .collect(),
    }
}

pub fn builtin_templates() -> Vec<SkeletonTemplate> {
    vec![
        build(
            "human-pose",
            "Human Pose",
            "17-point human body pose (COCO format)",
            HUMAN_POSE_DOTS,
            HUMAN_POSE_LINES,
        ),
        build(
            "hand-pose",
            "Hand Pose",
            "21-point hand keypoints",
            HAND_POSE_DOTS,
            HAND_POSE_LINES,
        ),
        build(
            "face-landmarks",
            "Face Landmarks",
            "Basic facial keypoints",
            FACE_DOTS,
            FACE_LINES,
        ),
    ]
}

pub fn find_builtin(id: &str) -> Result<SkeletonTemplate> {
    builtin_templates()
        .into_iter()
        .find(|t| t.id == id)
        .ok_or_else(|| AnnotationError::UnknownTemplate(id.to_string()))
}
