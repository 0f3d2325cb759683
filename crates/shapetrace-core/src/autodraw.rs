//! Idle auto-draw demonstration.
//!
//! [`PathPlanner`] builds a hand-drawn looking path between two anchors on a
//! shape. [`AutoDrawPlayer`] replays that path through the tracer's paint
//! primitive on a clock, so the demonstration paints, burns and completes
//! exactly like a real stroke would. After each pass it rests, resets the
//! stroke and starts over until cancelled.

use crate::brush::Brush;
use crate::config::AutoDrawConfig;
use crate::events::{EventSink, HandIndicator, StrokeSource, TraceEvent};
use crate::mask::ShapeMask;
use crate::raster::{Pixel, line_points};
use crate::shape::TraceShape;
use crate::tracer::CoverageTracer;
use crate::transform::Viewport;
use kurbo::Point;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use std::time::Duration;

/// Overshoot of the hand's scale-in and scale-out.
const HAND_OVERSHOOT: f64 = 1.7;

/// Generates auto-draw paths.
#[derive(Debug, Clone, PartialEq)]
pub struct PathPlanner {
    pub sample_step: usize,
    pub snap_tolerance: f64,
    pub smooth_min_gap: f64,
    pub jitter: f64,
}

impl PathPlanner {
    pub fn from_config(config: &AutoDrawConfig) -> Self {
        Self {
            sample_step: config.sample_step,
            snap_tolerance: config.snap_tolerance,
            smooth_min_gap: config.smooth_min_gap,
            jitter: config.jitter,
        }
    }

    /// Path from `start` to `end` that stays on the mask.
    ///
    /// Every `sample_step`-th point of the straight line between the anchors
    /// is snapped onto the mask; samples with nothing within
    /// `snap_tolerance` are dropped. Both anchors are always included.
    pub fn plan(&self, mask: &ShapeMask, start: Pixel, end: Pixel) -> Vec<Pixel> {
        let line = line_points(start, end);
        let mut path = vec![start];

        if line.len() > 2 {
            path.extend(
                line[1..line.len() - 1]
                    .iter()
                    .step_by(self.sample_step.max(1))
                    .filter_map(|&p| mask.nearest(p, self.snap_tolerance)),
            );
        }

        path.push(end);
        path
    }

    /// Insert jittered midpoints between interior points that are far apart.
    ///
    /// The first and last points are kept as they are. No midpoint is
    /// inserted between the last interior point and the end.
    pub fn smooth<R: Rng + ?Sized>(&self, path: &[Pixel], rng: &mut R) -> Vec<Pixel> {
        if path.len() < 3 {
            return path.to_vec();
        }

        let jitter = self.jitter.abs();
        let last = path.len() - 1;
        let mut smoothed = Vec::with_capacity(path.len() * 2);
        smoothed.push(path[0]);

        for i in 1..last {
            let current = path[i];
            smoothed.push(current);

            if i < last - 1 {
                let next = path[i + 1];
                if current.distance(next) > self.smooth_min_gap {
                    let (ox, oy) = if jitter > 0.0 {
                        (rng.gen_range(-jitter..=jitter), rng.gen_range(-jitter..=jitter))
                    } else {
                        (0.0, 0.0)
                    };
                    let mid_x = f64::from(current.x) + f64::from(next.x - current.x) * 0.5 + ox;
                    let mid_y = f64::from(current.y) + f64::from(next.y - current.y) * 0.5 + oy;
                    smoothed.push(Pixel::new(mid_x.round() as i32, mid_y.round() as i32));
                }
            }
        }

        smoothed.push(path[last]);
        smoothed
    }
}

#[derive(Debug, Clone)]
enum Playback {
    Stopped,
    Drawing {
        path: Vec<Pixel>,
        started_at: Duration,
        last_index: usize,
        hand_from: Point,
        hand_to: Point,
    },
    Resting {
        finished_at: Duration,
        hand_at: Point,
        hand_hidden: bool,
    },
}

/// Drives the auto-draw demonstration on an external clock.
///
/// All times are offsets on the same monotonic clock, passed in by the
/// caller on every call.
#[derive(Debug, Clone)]
pub struct AutoDrawPlayer {
    config: AutoDrawConfig,
    planner: PathPlanner,
    rng: Pcg64,
    playback: Playback,
}

impl AutoDrawPlayer {
    /// Create a player seeded from the configuration, or from entropy when
    /// no seed is configured.
    pub fn new(config: AutoDrawConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => Pcg64::seed_from_u64(seed),
            None => Pcg64::from_entropy(),
        };
        Self::with_rng(config, rng)
    }

    pub fn with_rng(config: AutoDrawConfig, rng: Pcg64) -> Self {
        Self {
            planner: PathPlanner::from_config(&config),
            config,
            rng,
            playback: Playback::Stopped,
        }
    }

    pub fn config(&self) -> &AutoDrawConfig {
        &self.config
    }

    /// Drawing or resting between passes.
    pub fn is_active(&self) -> bool {
        !matches!(self.playback, Playback::Stopped)
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self.playback, Playback::Drawing { .. })
    }

    /// Path of the pass in progress. Empty when not drawing.
    pub fn path(&self) -> &[Pixel] {
        match &self.playback {
            Playback::Drawing { path, .. } => path,
            _ => &[],
        }
    }

    /// Index of the last path point fed to the tracer.
    pub fn last_index(&self) -> Option<usize> {
        match &self.playback {
            Playback::Drawing { last_index, .. } => Some(*last_index),
            _ => None,
        }
    }

    /// Start a pass on `shape`, replacing any pass in progress.
    ///
    /// Returns `false` when the shape has no auto-draw anchors or an anchor
    /// cannot be snapped onto the mask.
    pub fn start(
        &mut self,
        now: Duration,
        shape: &TraceShape,
        tracer: &mut CoverageTracer,
        viewport: &Viewport,
        events: &mut dyn EventSink,
    ) -> bool {
        self.playback = Playback::Stopped;

        let Some(anchors) = shape.auto_draw().copied() else {
            log::debug!("Shape '{}' has no auto-draw anchors", shape.name());
            return false;
        };

        let mask = shape.mask();
        let snap = |p: Point| {
            mask.nearest(
                Pixel::new(p.x.round() as i32, p.y.round() as i32),
                self.config.anchor_snap_radius,
            )
        };
        let Some(start) = snap(anchors.texture_start) else {
            log::warn!("Auto-draw: no valid start point on '{}'", shape.name());
            return false;
        };
        let Some(end) = snap(anchors.texture_end) else {
            log::warn!("Auto-draw: no valid end point on '{}'", shape.name());
            return false;
        };

        let planned = self.planner.plan(mask, start, end);
        let path = self.planner.smooth(&planned, &mut self.rng);

        tracer.begin_at(
            shape,
            start,
            StrokeSource::AutoDraw,
            Brush::new(self.config.brush_radius),
            events,
        );

        let hand_from = viewport.to_device(anchors.hand_start);
        let hand_to = viewport.to_device(anchors.hand_end);
        events.emit(TraceEvent::Hand(HandIndicator {
            visible: true,
            position: hand_from,
            scale: 0.0,
        }));

        log::info!("Auto-draw started on '{}' with {} path points", shape.name(), path.len());
        self.playback = Playback::Drawing {
            path,
            started_at: now,
            last_index: 0,
            hand_from,
            hand_to,
        };
        true
    }

    /// Advance the demonstration to `now`.
    pub fn tick(
        &mut self,
        now: Duration,
        shape: &TraceShape,
        tracer: &mut CoverageTracer,
        viewport: &Viewport,
        events: &mut dyn EventSink,
    ) {
        let hand_scale = self.config.hand_scale_duration();
        let mut finished = false;
        let mut restart = false;

        match &mut self.playback {
            Playback::Stopped => {}
            Playback::Drawing {
                path,
                started_at,
                last_index,
                hand_from,
                hand_to,
            } => {
                let elapsed = now.saturating_sub(*started_at);
                let progress = fraction(elapsed, self.config.duration());
                let len = path.len();
                let target = if progress >= 1.0 {
                    len - 1
                } else {
                    ((progress * len as f64).floor() as usize).min(len - 1)
                };

                if target >= *last_index {
                    for &point in &path[*last_index..=target] {
                        tracer.extend_to(shape, point, events);
                    }
                    *last_index = target;
                }

                events.emit(TraceEvent::Hand(HandIndicator {
                    visible: true,
                    position: hand_from.lerp(*hand_to, progress),
                    scale: back_out(fraction(elapsed, hand_scale)),
                }));
                finished = progress >= 1.0;
            }
            Playback::Resting {
                finished_at,
                hand_at,
                hand_hidden,
            } => {
                let elapsed = now.saturating_sub(*finished_at);
                if !*hand_hidden {
                    let t = fraction(elapsed, hand_scale);
                    if t >= 1.0 {
                        *hand_hidden = true;
                        events.emit(TraceEvent::Hand(HandIndicator::hidden()));
                    } else {
                        events.emit(TraceEvent::Hand(HandIndicator {
                            visible: true,
                            position: *hand_at,
                            scale: 1.0 - back_in(t),
                        }));
                    }
                }
                restart = elapsed >= self.config.restart_delay();
            }
        }

        if finished {
            let hand_at = match &self.playback {
                Playback::Drawing { hand_to, .. } => *hand_to,
                _ => Point::ZERO,
            };
            log::debug!("Auto-draw pass on '{}' finished", shape.name());
            self.playback = Playback::Resting {
                finished_at: now,
                hand_at,
                hand_hidden: false,
            };
        } else if restart {
            tracer.stroke_end(events);
            log::debug!("Auto-draw restarting on '{}'", shape.name());
            self.start(now, shape, tracer, viewport, events);
        }
    }

    /// Stop the demonstration and hide the hand.
    ///
    /// Drops the pass in progress and any pending restart. Safe to call at
    /// any time, any number of times. The tracer is left as it is.
    pub fn cancel(&mut self, events: &mut dyn EventSink) {
        if self.is_active() {
            log::debug!("Auto-draw cancelled");
        }
        self.playback = Playback::Stopped;
        events.emit(TraceEvent::Hand(HandIndicator::hidden()));
    }
}

/// `elapsed / total`, clamped to `[0, 1]`. A zero total is already done.
fn fraction(elapsed: Duration, total: Duration) -> f64 {
    if total.is_zero() {
        return 1.0;
    }
    (elapsed.as_secs_f64() / total.as_secs_f64()).clamp(0.0, 1.0)
}

fn back_out(t: f64) -> f64 {
    let t = t - 1.0;
    1.0 + (HAND_OVERSHOOT + 1.0) * t * t * t + HAND_OVERSHOOT * t * t
}

fn back_in(t: f64) -> f64 {
    (HAND_OVERSHOOT + 1.0) * t * t * t - HAND_OVERSHOOT * t * t
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AutoDrawAnchors, ShapeConfig, TracerConfig};
    use crate::events::EventQueue;
    use crate::tracer::TracerState;
    use std::collections::HashSet;

    fn rect_mask(width: u32, height: u32) -> ShapeMask {
        let pixels: Vec<Pixel> = (0..height as i32)
            .flat_map(|y| (0..width as i32).map(move |x| Pixel::new(x, y)))
            .collect();
        ShapeMask::from_pixels(width, height, pixels)
    }

    fn anchors(start: (f64, f64), end: (f64, f64)) -> AutoDrawAnchors {
        AutoDrawAnchors {
            texture_start: Point::new(start.0, start.1),
            texture_end: Point::new(end.0, end.1),
            hand_start: Point::new(100.0, 200.0),
            hand_end: Point::new(300.0, 200.0),
        }
    }

    fn strip_shape() -> TraceShape {
        TraceShape::new(
            ShapeConfig::new("strip", 1.0).with_auto_draw(anchors((5.0, 10.0), (195.0, 10.0))),
            rect_mask(200, 20),
        )
    }

    fn config() -> AutoDrawConfig {
        AutoDrawConfig {
            brush_radius: 2,
            sample_step: 24,
            smooth_min_gap: 50.0,
            ..AutoDrawConfig::default()
        }
    }

    fn planner() -> PathPlanner {
        PathPlanner::from_config(&AutoDrawConfig::default())
    }

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    #[test]
    fn test_plan_includes_anchors_and_stays_on_mask() {
        let mask = rect_mask(100, 10);
        let path = planner().plan(&mask, Pixel::new(2, 5), Pixel::new(90, 5));
        assert_eq!(path.first(), Some(&Pixel::new(2, 5)));
        assert_eq!(path.last(), Some(&Pixel::new(90, 5)));
        assert!(path.len() > 2);
        assert!(path.iter().all(|p| mask.contains(*p)));
    }

    #[test]
    fn test_plan_samples_every_nth_point() {
        let mask = rect_mask(100, 10);
        // Line of 31 points; interior indices 1, 6, 11, 16, 21, 26.
        let path = planner().plan(&mask, Pixel::new(0, 5), Pixel::new(30, 5));
        assert_eq!(path.len(), 8);
        assert_eq!(path[1], Pixel::new(1, 5));
        assert_eq!(path[2], Pixel::new(6, 5));
    }

    #[test]
    fn test_plan_minimal_when_nothing_snaps() {
        let mask = ShapeMask::from_pixels(200, 10, [Pixel::new(0, 0), Pixel::new(199, 0)]);
        let strict = PathPlanner {
            snap_tolerance: 0.5,
            ..planner()
        };
        let path = strict.plan(&mask, Pixel::new(0, 0), Pixel::new(199, 0));
        assert_eq!(path, vec![Pixel::new(0, 0), Pixel::new(199, 0)]);
    }

    #[test]
    fn test_plan_degenerate_anchors() {
        let mask = rect_mask(10, 10);
        let path = planner().plan(&mask, Pixel::new(3, 3), Pixel::new(3, 3));
        assert_eq!(path, vec![Pixel::new(3, 3), Pixel::new(3, 3)]);
    }

    #[test]
    fn test_smooth_short_path_untouched() {
        let path = vec![Pixel::new(0, 0), Pixel::new(100, 0)];
        let mut rng = Pcg64::seed_from_u64(1);
        assert_eq!(planner().smooth(&path, &mut rng), path);
    }

    #[test]
    fn test_smooth_inserts_midpoints_and_keeps_endpoints() {
        let path: Vec<Pixel> = (0..6).map(|i| Pixel::new(i * 50, 0)).collect();
        let mut rng = Pcg64::seed_from_u64(42);
        let smoothed = planner().smooth(&path, &mut rng);

        assert!(smoothed.len() > path.len());
        assert_eq!(smoothed.first(), path.first());
        assert_eq!(smoothed.last(), path.last());
        // Interior points 1..=3 get a midpoint; the gap before the end does not.
        assert_eq!(smoothed.len(), path.len() + 3);
        for p in &path {
            assert!(smoothed.contains(p));
        }
    }

    #[test]
    fn test_smooth_jitter_is_bounded() {
        let path: Vec<Pixel> = (0..5).map(|i| Pixel::new(i * 40, 0)).collect();
        let mut rng = Pcg64::seed_from_u64(9);
        let smoothed = planner().smooth(&path, &mut rng);
        for p in smoothed.iter().filter(|p| !path.contains(p)) {
            assert!(p.y.abs() <= 3);
        }
    }

    #[test]
    fn test_smooth_is_reproducible_with_seed() {
        let path: Vec<Pixel> = (0..8).map(|i| Pixel::new(i * 30, i * 7)).collect();
        let a = planner().smooth(&path, &mut Pcg64::seed_from_u64(5));
        let b = planner().smooth(&path, &mut Pcg64::seed_from_u64(5));
        assert_eq!(a, b);
    }

    #[test]
    fn test_start_without_anchors_fails() {
        let shape = TraceShape::new(ShapeConfig::new("plain", 1.0), rect_mask(10, 10));
        let mut player = AutoDrawPlayer::with_rng(config(), Pcg64::seed_from_u64(1));
        let mut tracer = CoverageTracer::new(TracerConfig::default());
        let mut events = EventQueue::new();

        assert!(!player.start(ms(0), &shape, &mut tracer, &Viewport::default(), &mut events));
        assert!(!player.is_active());
        assert!(!tracer.is_active());
    }

    #[test]
    fn test_start_with_unsnappable_anchor_fails() {
        let shape = TraceShape::new(
            ShapeConfig::new("far", 1.0).with_auto_draw(anchors((500.0, 500.0), (5.0, 5.0))),
            rect_mask(10, 10),
        );
        let mut player = AutoDrawPlayer::with_rng(config(), Pcg64::seed_from_u64(1));
        let mut tracer = CoverageTracer::new(TracerConfig::default());
        let mut events = EventQueue::new();

        assert!(!player.start(ms(0), &shape, &mut tracer, &Viewport::default(), &mut events));
        assert!(!player.is_active());
    }

    #[test]
    fn test_full_pass_paints_path_then_rests() {
        let shape = strip_shape();
        let mut player = AutoDrawPlayer::with_rng(config(), Pcg64::seed_from_u64(3));
        let mut tracer = CoverageTracer::new(TracerConfig::default());
        let mut events = EventQueue::new();
        let viewport = Viewport::default();

        assert!(player.start(ms(0), &shape, &mut tracer, &viewport, &mut events));
        assert_eq!(tracer.source(), StrokeSource::AutoDraw);
        let path = player.path().to_vec();
        assert_eq!(path.first(), Some(&Pixel::new(5, 10)));
        assert_eq!(path.last(), Some(&Pixel::new(195, 10)));

        let mut previous = tracer.coverage();
        for t in (0..=1000).step_by(100) {
            player.tick(ms(t), &shape, &mut tracer, &viewport, &mut events);
            assert!(tracer.coverage() >= previous);
            previous = tracer.coverage();
        }

        assert!(!player.is_drawing());
        assert!(player.is_active());
        assert_eq!(tracer.last_point(), Some(Pixel::new(195, 10)));
        assert!(tracer.painted_pixels().contains(&Pixel::new(100, 10)));
        assert!(tracer.painted_pixels().iter().all(|p| shape.mask().contains(*p)));
    }

    #[test]
    fn test_hand_scales_in_and_hides_after_pass() {
        let shape = strip_shape();
        let mut player = AutoDrawPlayer::with_rng(config(), Pcg64::seed_from_u64(3));
        let mut tracer = CoverageTracer::new(TracerConfig::default());
        let mut events = EventQueue::new();
        let viewport = Viewport::new(kurbo::Size::new(375.0, 667.0), crate::transform::BASE_VIEWPORT);

        player.start(ms(0), &shape, &mut tracer, &viewport, &mut events);
        events.clear();
        player.tick(ms(500), &shape, &mut tracer, &viewport, &mut events);
        let hand = events.events().iter().rev().find_map(|e| match e {
            TraceEvent::Hand(h) => Some(*h),
            _ => None,
        });
        let hand = hand.unwrap();
        assert!(hand.visible);
        assert!((hand.scale - 1.0).abs() < 1e-9);
        // Halfway between (50, 100) and (150, 100) on the half-size device.
        assert!((hand.position.x - 100.0).abs() < 1e-9);
        assert!((hand.position.y - 100.0).abs() < 1e-9);

        player.tick(ms(1000), &shape, &mut tracer, &viewport, &mut events);
        events.clear();
        player.tick(ms(1600), &shape, &mut tracer, &viewport, &mut events);
        assert_eq!(events.events(), &[TraceEvent::Hand(HandIndicator::hidden())]);
    }

    #[test]
    fn test_restarts_after_rest() {
        let shape = strip_shape();
        let mut player = AutoDrawPlayer::with_rng(config(), Pcg64::seed_from_u64(3));
        let mut tracer = CoverageTracer::new(TracerConfig::default());
        let mut events = EventQueue::new();
        let viewport = Viewport::default();

        player.start(ms(0), &shape, &mut tracer, &viewport, &mut events);
        player.tick(ms(1000), &shape, &mut tracer, &viewport, &mut events);
        assert!(!player.is_drawing());
        let painted = tracer.painted_pixels().len();

        player.tick(ms(5999), &shape, &mut tracer, &viewport, &mut events);
        assert!(!player.is_drawing());
        assert_eq!(tracer.painted_pixels().len(), painted);

        player.tick(ms(6000), &shape, &mut tracer, &viewport, &mut events);
        assert!(player.is_drawing());
        assert_eq!(player.last_index(), Some(0));
        assert_eq!(tracer.state(), TracerState::Drawing);
        assert!(tracer.painted_pixels().len() < painted);
    }

    #[test]
    fn test_cancel_mid_flight_stops_painting_and_restart() {
        let shape = strip_shape();
        let mut player = AutoDrawPlayer::with_rng(config(), Pcg64::seed_from_u64(11));
        let mut tracer = CoverageTracer::new(TracerConfig::default());
        let mut events = EventQueue::new();
        let viewport = Viewport::default();

        player.start(ms(0), &shape, &mut tracer, &viewport, &mut events);
        let path = player.path().to_vec();
        assert_eq!(path.len(), 10);

        // 350ms of 1000ms over 10 points reaches index 3.
        player.tick(ms(350), &shape, &mut tracer, &viewport, &mut events);
        assert_eq!(player.last_index(), Some(3));

        player.cancel(&mut events);
        assert!(!player.is_active());
        assert_eq!(events.events().last(), Some(&TraceEvent::Hand(HandIndicator::hidden())));

        let painted: HashSet<Pixel> = tracer.painted_pixels().clone();
        for t in [400, 1000, 6000, 20000] {
            player.tick(ms(t), &shape, &mut tracer, &viewport, &mut events);
        }
        assert_eq!(tracer.painted_pixels(), &painted);
        assert!(!player.is_active());

        // Exactly the pixels of path[0..=3].
        let mut replay = CoverageTracer::new(TracerConfig::default());
        let mut sink = EventQueue::new();
        replay.begin_at(&shape, path[0], StrokeSource::AutoDraw, Brush::new(2), &mut sink);
        for &p in &path[1..=3] {
            replay.extend_to(&shape, p, &mut sink);
        }
        assert_eq!(replay.painted_pixels(), &painted);

        // Idempotent.
        player.cancel(&mut events);
        assert!(!player.is_active());
    }
}
