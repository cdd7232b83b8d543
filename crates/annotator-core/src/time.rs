//! Frame/time conversion

pub const DEFAULT_FPS: f64 = 15.0;

/// Nearest frame index for a playback position
pub fn seconds_to_frame(played_seconds: f64, fps: f64) -> u32 {
    let frame = (played_seconds * fps).round();
    if frame.is_finite() && frame > 0.0 {
        frame as u32
    } else {
        0
    }
}

pub fn frame_to_seconds(frame: u32, fps: f64) -> f64 {
    frame as f64 / fps
}

/// `m:ss` clock string
pub fn format_clock(time_seconds: f64) -> String {
    let time_seconds = time_seconds.max(0.0);
    let minutes = (time_seconds / 60.0).floor() as u64;
    let seconds = (time_seconds % 60.0).floor() as u64;
    format!("{}:{:02}", minutes, seconds)
}
