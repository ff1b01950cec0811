//! Movement patterns.
//!
//! A pattern turns the pointer's starting position into a `Plan`: an ordered
//! list of absolute targets, each followed by a settle delay. Planning is
//! pure (no OS access, no sleeping) so the geometry can be tested directly;
//! `execute` then replays a plan against a `Pointer`.

use std::f64::consts::TAU;
use std::fmt;
use std::thread;
use std::time::Duration;

use rand::Rng;

use crate::platform::{PlatformError, Point, Pointer};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Pause between the outbound and return move of `gentle` and `random`.
const SHORT_SETTLE: Duration = Duration::from_millis(50);

/// Pause between consecutive points of `circular`.
const CIRCLE_SETTLE: Duration = Duration::from_millis(20);

/// Number of points sampled on the circle.
const CIRCLE_STEPS: u32 = 8;

// ---------------------------------------------------------------------------
// Pattern
// ---------------------------------------------------------------------------

/// How the pointer is perturbed on each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Pattern {
    /// Right by `distance`, then to `distance` left of the start.
    #[default]
    Gentle,
    /// Eight points on a circle of radius `distance`, then back to the start.
    Circular,
    /// One random offset within `distance` on each axis, then back.
    Random,
}

impl Pattern {
    /// Resolves a pattern name from free-form input (the config file).
    ///
    /// Unknown names fall back to `Gentle`.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "gentle" => Pattern::Gentle,
            "circular" => Pattern::Circular,
            "random" => Pattern::Random,
            other => {
                log::warn!("pattern: unknown pattern {other:?}, using gentle");
                Pattern::Gentle
            }
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Pattern::Gentle => "gentle",
            Pattern::Circular => "circular",
            Pattern::Random => "random",
        }
    }

    /// Computes the moves for one cycle starting at `origin`.
    pub fn plan<R: Rng + ?Sized>(self, origin: Point, distance: u32, rng: &mut R) -> Plan {
        let d = i32::try_from(distance).unwrap_or(i32::MAX);
        match self {
            Pattern::Gentle => gentle(origin, d),
            Pattern::Circular => circular(origin, d),
            Pattern::Random => random(origin, d, rng),
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Plan
// ---------------------------------------------------------------------------

/// One absolute move followed by a pause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub target: Point,
    pub settle: Duration,
}

impl Step {
    fn new(target: Point, settle: Duration) -> Self {
        Step { target, settle }
    }
}

/// The moves making up a single jiggle cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    steps: Vec<Step>,
}

impl Plan {
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Where the pointer ends up after the plan runs.
    #[cfg(test)]
    pub fn final_target(&self) -> Option<Point> {
        self.steps.last().map(|step| step.target)
    }

    /// Moves the pointer through every step, sleeping each settle delay.
    ///
    /// Stops at the first failed move; no retries.
    pub fn execute<P: Pointer + ?Sized>(&self, pointer: &P) -> Result<(), PlatformError> {
        for step in &self.steps {
            pointer.move_to(step.target)?;
            log::debug!("pattern: moved to {}", step.target);
            if !step.settle.is_zero() {
                thread::sleep(step.settle);
            }
        }
        Ok(())
    }
}

fn gentle(origin: Point, d: i32) -> Plan {
    // The return move overshoots to -d instead of restoring the origin,
    // so the pointer drifts left by `distance` per cycle.
    Plan {
        steps: vec![
            Step::new(origin.offset(d, 0), SHORT_SETTLE),
            Step::new(origin.offset(d.saturating_neg(), 0), Duration::ZERO),
        ],
    }
}

fn circular(origin: Point, d: i32) -> Plan {
    let radius = f64::from(d);
    let mut steps: Vec<Step> = (0..CIRCLE_STEPS)
        .map(|i| {
            let angle = TAU * f64::from(i) / f64::from(CIRCLE_STEPS);
            let dx = (radius * angle.cos()).round() as i32;
            let dy = (radius * angle.sin()).round() as i32;
            Step::new(origin.offset(dx, dy), CIRCLE_SETTLE)
        })
        .collect();
    steps.push(Step::new(origin, Duration::ZERO));
    Plan { steps }
}

fn random<R: Rng + ?Sized>(origin: Point, d: i32, rng: &mut R) -> Plan {
    let dx = rng.gen_range(-d..=d);
    let dy = rng.gen_range(-d..=d);
    Plan {
        steps: vec![
            Step::new(origin.offset(dx, dy), SHORT_SETTLE),
            Step::new(origin, Duration::ZERO),
        ],
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::platform::fake::FakePointer;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn from_name_accepts_known_patterns() {
        assert_eq!(Pattern::from_name("gentle"), Pattern::Gentle);
        assert_eq!(Pattern::from_name("Circular"), Pattern::Circular);
        assert_eq!(Pattern::from_name(" random "), Pattern::Random);
    }

    #[test]
    fn unknown_name_falls_back_to_gentle() {
        assert_eq!(Pattern::from_name("zigzag"), Pattern::Gentle);
        assert_eq!(Pattern::from_name(""), Pattern::Gentle);
    }

    #[test]
    fn gentle_plan_drifts_left() {
        let plan = Pattern::Gentle.plan(Point::new(100, 50), 3, &mut rng());
        let targets: Vec<Point> = plan.steps().iter().map(|s| s.target).collect();
        assert_eq!(targets, vec![Point::new(103, 50), Point::new(97, 50)]);
        assert_eq!(plan.steps()[0].settle, Duration::from_millis(50));
    }

    #[test]
    fn circular_plan_has_eight_points_and_returns() {
        let origin = Point::new(500, 400);
        let plan = Pattern::Circular.plan(origin, 10, &mut rng());
        assert_eq!(plan.steps().len(), 9);
        assert_eq!(plan.final_target(), Some(origin));
        assert!(plan.steps()[..8]
            .iter()
            .all(|s| s.settle == Duration::from_millis(20)));
    }

    #[test]
    fn circular_points_lie_on_circle() {
        let origin = Point::new(0, 0);
        let distance = 25;
        let plan = Pattern::Circular.plan(origin, distance, &mut rng());
        let points = &plan.steps()[..8];

        for step in points {
            let r = f64::from(step.target.x).hypot(f64::from(step.target.y));
            assert!(
                (r - f64::from(distance)).abs() <= 1.0,
                "{} is {r} from center",
                step.target
            );
        }

        // Consecutive points are 45 degrees apart.
        for (i, step) in points.iter().enumerate() {
            let angle = f64::from(step.target.y).atan2(f64::from(step.target.x));
            let expected = TAU * i as f64 / 8.0;
            let diff = (angle - expected).rem_euclid(TAU);
            let diff = diff.min(TAU - diff);
            assert!(diff < 0.1, "point {i} at angle {angle}");
        }
    }

    #[test]
    fn circular_first_point_is_to_the_right() {
        let plan = Pattern::Circular.plan(Point::new(10, 10), 4, &mut rng());
        assert_eq!(plan.steps()[0].target, Point::new(14, 10));
        assert_eq!(plan.steps()[2].target, Point::new(10, 14));
    }

    #[test]
    fn random_offsets_stay_within_distance() {
        let mut rng = rng();
        let origin = Point::new(1000, 1000);
        let d = 4;
        for _ in 0..1000 {
            let plan = Pattern::Random.plan(origin, d, &mut rng);
            let first = plan.steps()[0].target;
            let (dx, dy) = (first.x - origin.x, first.y - origin.y);
            assert!((-4..=4).contains(&dx), "dx = {dx}");
            assert!((-4..=4).contains(&dy), "dy = {dy}");
            assert_eq!(plan.final_target(), Some(origin));
        }
    }

    #[test]
    fn random_covers_both_extremes() {
        let mut rng = rng();
        let origin = Point::new(0, 0);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..1000 {
            seen.insert(Pattern::Random.plan(origin, 1, &mut rng).steps()[0].target.x);
        }
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn execute_replays_every_step() {
        let pointer = FakePointer::at(20, 20);
        let plan = Pattern::Circular.plan(Point::new(20, 20), 2, &mut rng());
        plan.execute(&pointer).unwrap();

        let expected: Vec<Point> = plan.steps().iter().map(|s| s.target).collect();
        assert_eq!(pointer.moves(), expected);
        assert_eq!(pointer.current(), Point::new(20, 20));
    }

    #[test]
    fn execute_stops_on_first_error() {
        let pointer = FakePointer::at(0, 0);
        pointer.deny_moves();
        let plan = Pattern::Gentle.plan(Point::new(0, 0), 1, &mut rng());
        let err = plan.execute(&pointer).unwrap_err();
        assert!(matches!(err, PlatformError::PermissionDenied(_)));
        assert!(pointer.moves().is_empty());
    }
}
