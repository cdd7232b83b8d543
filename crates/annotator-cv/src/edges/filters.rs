//! Grayscale conversion and separable Gaussian blur

use super::Plane;
use crate::frame::FrameBuffer;

/// Luma per pixel: `0.299 R + 0.587 G + 0.114 B`
pub fn grayscale(frame: &FrameBuffer) -> Plane {
    let width = frame.width() as usize;
    let height = frame.height() as usize;
    let mut plane = Plane::new(width, height);
    let bytes = frame.as_bytes();

    let fill_row = |(y, row): (usize, &mut [f64])| {
        let src = &bytes[y * width * 4..(y + 1) * width * 4];
        for (value, px) in row.iter_mut().zip(src.chunks_exact(4)) {
            *value = 0.299 * px[0] as f64 + 0.587 * px[1] as f64 + 0.114 * px[2] as f64;
        }
    };

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        plane.data.par_chunks_mut(width).enumerate().for_each(fill_row);
    }

    #[cfg(not(feature = "parallel"))]
    {
        plane.data.chunks_mut(width).enumerate().for_each(fill_row);
    }

    plane
}

/// Normalized 1-D kernel of `ceil(2 * radius) + 1` taps, sigma `radius / 3`
pub fn gaussian_kernel(radius: f64) -> Vec<f64> {
    let size = (radius * 2.0).ceil() as usize + 1;
    let half = (size / 2) as f64;
    let sigma = radius / 3.0;

    let mut kernel: Vec<f64> = (0..size)
        .map(|i| {
            let x = i as f64 - half;
            (-(x * x) / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let sum: f64 = kernel.iter().sum();
    for k in &mut kernel {
        *k /= sum;
    }
    kernel
}

/// Horizontal then vertical pass. Near the border only in-bounds taps
/// contribute and their weights are renormalized, so a flat image stays
/// flat.
pub fn gaussian_blur(plane: &Plane, radius: f64) -> Plane {
    let kernel = gaussian_kernel(radius);
    let horizontal = convolve_rows(plane, &kernel);
    convolve_columns(&horizontal, &kernel)
}

fn convolve_rows(src: &Plane, kernel: &[f64]) -> Plane {
    let width = src.width;
    let half = (kernel.len() / 2) as isize;
    let mut out = Plane::new(width, src.height);

    let blur_row = |(y, row): (usize, &mut [f64])| {
        for (x, value) in row.iter_mut().enumerate() {
            let (mut acc, mut weight) = (0.0, 0.0);
            for (k, w) in kernel.iter().enumerate() {
                let kx = x as isize + k as isize - half;
                if kx >= 0 && (kx as usize) < width {
                    acc += src.data[y * width + kx as usize] * w;
                    weight += w;
                }
            }
            *value = acc / weight;
        }
    };

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        out.data.par_chunks_mut(width).enumerate().for_each(blur_row);
    }

    #[cfg(not(feature = "parallel"))]
    {
        out.data.chunks_mut(width).enumerate().for_each(blur_row);
    }

    out
}

fn convolve_columns(src: &Plane, kernel: &[f64]) -> Plane {
    let (width, height) = (src.width, src.height);
    let half = (kernel.len() / 2) as isize;
    let mut out = Plane::new(width, height);

    let blur_row = |(y, row): (usize, &mut [f64])| {
        for (x, value) in row.iter_mut().enumerate() {
            let (mut acc, mut weight) = (0.0, 0.0);
            for (k, w) in kernel.iter().enumerate() {
                let ky = y as isize + k as isize - half;
                if ky >= 0 && (ky as usize) < height {
                    acc += src.data[ky as usize * width + x] * w;
                    weight += w;
                }
            }
            *value = acc / weight;
        }
    };

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        out.data.par_chunks_mut(width).enumerate().for_each(blur_row);
    }

    #[cfg(not(feature = "parallel"))]
    {
        out.data.chunks_mut(width).enumerate().for_each(blur_row);
    }

    out
}
