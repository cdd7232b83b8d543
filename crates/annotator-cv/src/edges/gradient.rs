//! Gradient estimation and non-maximum suppression

use super::Plane;
use std::f64::consts::PI;

const SOBEL_X: [f64; 9] = [-1.0, 0.0, 1.0, -2.0, 0.0, 2.0, -1.0, 0.0, 1.0];
const SOBEL_Y: [f64; 9] = [-1.0, -2.0, -1.0, 0.0, 0.0, 0.0, 1.0, 2.0, 1.0];
const SCHARR_X: [f64; 9] = [-3.0, 0.0, 3.0, -10.0, 0.0, 10.0, -3.0, 0.0, 3.0];
const SCHARR_Y: [f64; 9] = [-3.0, -10.0, -3.0, 0.0, 0.0, 0.0, 3.0, 10.0, 3.0];

#[derive(Debug, Clone, PartialEq)]
pub struct Gradient {
    pub magnitude: Plane,
    /// Radians, `atan2` of the Sobel response
    pub direction: Plane,
}

/// Sobel and Scharr responses over interior pixels. Magnitude is the mean of
/// the two operators' magnitudes; the one-pixel border stays zero.
pub fn gradient(blurred: &Plane) -> Gradient {
    let (width, height) = (blurred.width, blurred.height);
    let mut magnitude = Plane::new(width, height);
    let mut direction = Plane::new(width, height);

    for y in 1..height.saturating_sub(1) {
        for x in 1..width.saturating_sub(1) {
            let (mut sx, mut sy, mut cx, mut cy) = (0.0, 0.0, 0.0, 0.0);
            for ky in 0..3 {
                for kx in 0..3 {
                    let v = blurred.get(x + kx - 1, y + ky - 1);
                    let k = ky * 3 + kx;
                    sx += v * SOBEL_X[k];
                    sy += v * SOBEL_Y[k];
                    cx += v * SCHARR_X[k];
                    cy += v * SCHARR_Y[k];
                }
            }

            let sobel = (sx * sx + sy * sy).sqrt();
            let scharr = (cx * cx + cy * cy).sqrt();
            let idx = y * width + x;
            magnitude.data[idx] = (sobel + scharr) / 2.0;
            direction.data[idx] = sy.atan2(sx);
        }
    }

    Gradient {
        magnitude,
        direction,
    }
}

/// Keep a pixel's magnitude only where it is at least both neighbours
/// along its gradient direction
pub fn suppress_non_maxima(gradient: &Gradient) -> Plane {
    let Gradient {
        magnitude,
        direction,
    } = gradient;
    let (width, height) = (magnitude.width, magnitude.height);
    let mut suppressed = Plane::new(width, height);

    for y in 1..height.saturating_sub(1) {
        for x in 1..width.saturating_sub(1) {
            let mag = magnitude.get(x, y);
            let ((ax, ay), (bx, by)) = neighbours_along(direction.get(x, y));
            let a = magnitude.get((x as isize + ax) as usize, (y as isize + ay) as usize);
            let b = magnitude.get((x as isize + bx) as usize, (y as isize + by) as usize);
            if mag >= a && mag >= b {
                suppressed.data[y * width + x] = mag;
            }
        }
    }

    suppressed
}

/// Offsets of the two pixels compared against, by direction bucket
fn neighbours_along(dir: f64) -> ((isize, isize), (isize, isize)) {
    let eighth = PI / 8.0;
    if (-eighth..eighth).contains(&dir) || dir >= 7.0 * eighth || dir < -7.0 * eighth {
        ((-1, 0), (1, 0))
    } else if (eighth..3.0 * eighth).contains(&dir) || (-7.0 * eighth..-5.0 * eighth).contains(&dir) {
        ((1, -1), (-1, 1))
    } else if (3.0 * eighth..5.0 * eighth).contains(&dir) || (-5.0 * eighth..-3.0 * eighth).contains(&dir) {
        ((0, -1), (0, 1))
    } else {
        ((-1, -1), (1, 1))
    }
}
