//! Render-time helpers.

use std::time::Instant;

/// Monotonic animation clock: seconds since creation.
///
/// Kept in `f64` so that a timeline driven for days still resolves individual frames.
#[derive(Debug, Clone)]
pub struct FrameClock {
    start: Instant,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    #[inline]
    pub fn elapsed_s(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert a physical window size to logical points.
#[inline]
pub fn physical_to_pt(size: winit::dpi::PhysicalSize<u32>, scale_factor: f64) -> [f32; 2] {
    let logical = size.to_logical::<f32>(scale_factor);
    [logical.width, logical.height]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_is_monotonic() {
        let clock = FrameClock::new();
        let a = clock.elapsed_s();
        let b = clock.elapsed_s();
        assert!(a >= 0.0);
        assert!(b >= a);
    }

    #[test]
    fn physical_size_divides_by_scale() {
        let pt = physical_to_pt(winit::dpi::PhysicalSize::new(840, 1280), 2.0);
        assert_eq!(pt, [420.0, 640.0]);
    }
}
