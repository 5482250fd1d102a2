//! Collision-free placement for newly created objects.

use crate::config::PlacementConfig;
use kurbo::{Point, Rect, Size};

/// Radius of the first spiral step.
const SPIRAL_START_RADIUS: f64 = 50.0;
/// Angle increment per spiral step, in radians.
const SPIRAL_ANGLE_STEP: f64 = 0.5;
/// `radius = SPIRAL_BASE_RADIUS + angle * SPIRAL_GROWTH` after the first step.
const SPIRAL_BASE_RADIUS: f64 = 30.0;
const SPIRAL_GROWTH: f64 = 10.0;

/// Small seedable generator for the jitter fallback (splitmix64).
///
/// Placement is deterministic for a fixed seed, which keeps tests and replays stable.
#[derive(Debug, Clone)]
pub struct JitterRng {
    state: u64,
}

impl JitterRng {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform value in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform value in `[-amplitude, amplitude]`.
    pub fn symmetric(&mut self, amplitude: f64) -> f64 {
        (self.next_f64() * 2.0 - 1.0) * amplitude
    }
}

/// Result of a placement search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementResult {
    /// Top-left corner for the new object.
    pub point: Point,
    /// Spiral steps taken (0 when the target itself was free).
    pub attempts: usize,
    /// True when the spiral was exhausted and the target was jittered instead.
    /// The returned rectangle may overlap in that case.
    pub fallback: bool,
}

/// Check whether a `size` rectangle at `origin`, inflated by `padding`, overlaps any of `existing`.
pub fn collides(origin: Point, size: Size, padding: f64, existing: &[Rect]) -> bool {
    let candidate = Rect::from_origin_size(origin, size).inflate(padding, padding);
    existing
        .iter()
        .any(|r| candidate.intersect(*r).area() > 0.0)
}

/// Find a free spot near `target` for an object of `size`.
///
/// Tries the target first, then walks an outward spiral for up to
/// `config.max_attempts` steps. On exhaustion the target is jittered by up to
/// `config.jitter` on each axis and the residual overlap is accepted.
pub fn find_free_space(
    target: Point,
    size: Size,
    existing: &[Rect],
    config: &PlacementConfig,
    rng: &mut JitterRng,
) -> PlacementResult {
    if !collides(target, size, config.padding, existing) {
        return PlacementResult { point: target, attempts: 0, fallback: false };
    }

    let mut angle = 0.0_f64;
    let mut radius = SPIRAL_START_RADIUS;
    for attempt in 1..=config.max_attempts {
        let candidate = Point::new(
            target.x + angle.cos() * radius,
            target.y + angle.sin() * radius,
        );
        if !collides(candidate, size, config.padding, existing) {
            return PlacementResult { point: candidate, attempts: attempt, fallback: false };
        }
        angle += SPIRAL_ANGLE_STEP;
        radius = SPIRAL_BASE_RADIUS + angle * SPIRAL_GROWTH;
    }

    log::debug!(
        "No free space near ({:.0}, {:.0}) after {} attempts, jittering",
        target.x,
        target.y,
        config.max_attempts
    );
    let point = Point::new(
        target.x + rng.symmetric(config.jitter),
        target.y + rng.symmetric(config.jitter),
    );
    PlacementResult { point, attempts: config.max_attempts, fallback: true }
}
