//! Click outcomes, delayed removals and the escape sequence.
//!
//! The pieces here hold no reference to the session; [`crate::game::Session`]
//! drives them from its click handler and its per-frame update.
//!
//! # Sculpture lifecycle
//!
//! ```text
//! Active --(threshold-th click)--> PendingRemoval --(delay elapsed)--> removed
//! ```
//!
//! A pending sculpture keeps collecting marks but is never rescheduled, and
//! its soundtrack is started only on the transition.

use crate::config::InteractionConfig;
use crate::game::entity::{EntityId, PreviewDescriptor, Sculpture};
use crate::math::ease_out_cubic;
use std::time::{Duration, Instant};

/// What a single click resolved to.
#[derive(Debug, Clone, PartialEq)]
pub enum ClickOutcome {
    /// A figure was hit; the caller opens the preview overlay.
    Preview(PreviewDescriptor),
    /// A sculpture took a hit and is still below the threshold.
    Struck { clicks: u32 },
    /// A sculpture just reached the threshold and is queued for removal.
    Doomed(EntityId),
    EscapeStarted,
    /// The hit changed nothing, e.g. the exit while already escaping.
    Ignored,
    Miss,
}

/// Things that happened during one [`crate::game::Session::update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    Removed(EntityId),
    EscapeCompleted,
}

/// Records a click on `sculpture` at `local` (relative to its centre).
///
/// Returns `true` exactly once, on the click that reaches `threshold`.
pub fn strike(sculpture: &mut Sculpture, local: [f32; 3], threshold: u32) -> bool {
    sculpture.clicks += 1;
    sculpture.marks.push(local);
    if sculpture.doomed || sculpture.clicks < threshold {
        return false;
    }
    sculpture.doomed = true;
    true
}

/// Wall-clock deadlines for entities awaiting removal.
#[derive(Debug, Default)]
pub struct RemovalQueue {
    pending: Vec<(EntityId, Instant)>,
}

impl RemovalQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `id` for removal at `now + delay`. An id already queued keeps
    /// its original deadline.
    pub fn schedule(&mut self, id: EntityId, now: Instant, delay: Duration) {
        if self.contains(id) {
            return;
        }
        self.pending.push((id, now + delay));
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.pending.iter().any(|(queued, _)| *queued == id)
    }

    /// Takes every id whose deadline is at or before `now`, in scheduling
    /// order. Each id is returned once.
    pub fn poll(&mut self, now: Instant) -> Vec<EntityId> {
        let mut due = Vec::new();
        self.pending.retain(|&(id, deadline)| {
            if deadline <= now {
                due.push(id);
                false
            } else {
                true
            }
        });
        due
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Displacements produced by one frame of the escape animation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EscapeFrame {
    /// Absolute lift of every wall above its resting position.
    pub wall_offset: f32,
    /// Extra height gained by each surviving sculpture this frame.
    pub rise: f32,
    /// Set on the single frame where progress first reaches 1.
    pub completed: bool,
}

/// The walls-fly-away sequence started by clicking the exit.
#[derive(Debug, Clone, PartialEq)]
pub struct EscapeSequence {
    active: bool,
    progress: f32,
    duration: f32,
    lift: f32,
    rise_speed: f32,
}

impl EscapeSequence {
    pub fn new(config: &InteractionConfig) -> Self {
        Self {
            active: false,
            progress: 0.0,
            duration: config.escape_duration,
            lift: config.wall_lift,
            rise_speed: config.rise_speed,
        }
    }

    /// Starts the sequence. Only the first call has any effect.
    pub fn trigger(&mut self) -> bool {
        if self.active {
            return false;
        }
        self.active = true;
        true
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    #[cfg(test)]
    pub fn progress(&self) -> f32 {
        self.progress
    }

    #[cfg(test)]
    pub fn is_complete(&self) -> bool {
        self.active && self.progress >= 1.0
    }

    /// Moves the animation forward by `dt` seconds.
    ///
    /// Returns `None` before the trigger and once the animation has finished.
    pub fn advance(&mut self, dt: f32) -> Option<EscapeFrame> {
        if !self.active || self.progress >= 1.0 {
            return None;
        }
        self.progress = (self.progress + dt.max(0.0) / self.duration).min(1.0);
        Some(EscapeFrame {
            wall_offset: (self.lift * ease_out_cubic(self.progress)).min(self.lift),
            rise: self.rise_speed * dt.max(0.0),
            completed: self.progress >= 1.0,
        })
    }
}

/// Brightness of the exit glow `t` seconds into the session, in `[0, 1]`.
pub fn exit_pulse(t: f32) -> f32 {
    0.5 + 0.5 * (3.0 * t).sin()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn sculpture() -> Sculpture {
        Sculpture {
            batch: 0,
            clip: None,
            clicks: 0,
            marks: Vec::new(),
            doomed: false,
            preview: PreviewDescriptor::sculpture(PathBuf::from("posters/matrix.webp")),
        }
    }

    /// Only the threshold-th click dooms; later clicks still leave marks.
    #[test]
    fn test_strike_dooms_once() {
        let mut target = sculpture();
        assert!(!strike(&mut target, [0.0, 0.1, 0.0], 3));
        assert!(!strike(&mut target, [0.0, 0.2, 0.0], 3));
        assert!(strike(&mut target, [0.0, 0.3, 0.0], 3));
        assert!(!strike(&mut target, [0.0, 0.4, 0.0], 3));
        assert!(target.doomed);
        assert_eq!(target.clicks, 4);
        assert_eq!(target.marks.len(), 4);
    }

    #[test]
    fn test_removal_queue_polls_each_id_once() {
        let start = Instant::now();
        let mut queue = RemovalQueue::new();
        queue.schedule(EntityId(4), start, Duration::from_millis(300));
        queue.schedule(EntityId(9), start, Duration::from_millis(500));
        queue.schedule(EntityId(4), start + Duration::from_millis(200), Duration::from_millis(300));
        assert_eq!(queue.len(), 2);

        assert!(queue.poll(start + Duration::from_millis(299)).is_empty());
        assert_eq!(queue.poll(start + Duration::from_millis(300)), vec![EntityId(4)]);
        assert!(queue.poll(start + Duration::from_millis(400)).is_empty());
        assert_eq!(queue.poll(start + Duration::from_secs(5)), vec![EntityId(9)]);
        assert!(queue.is_empty());
    }

    /// The sequence is inert until triggered, and triggering twice is a no-op.
    #[test]
    fn test_escape_trigger_is_idempotent() {
        let mut escape = EscapeSequence::new(&InteractionConfig::default());
        assert_eq!(escape.advance(0.5), None);
        assert!(escape.trigger());
        assert!(!escape.trigger());
        assert!(escape.is_active());
        assert_eq!(escape.progress(), 0.0);
    }

    /// Progress climbs monotonically to 1, completion is reported once and
    /// the walls end exactly at the configured lift.
    #[test]
    fn test_escape_runs_to_completion() {
        let config = InteractionConfig::default();
        let mut escape = EscapeSequence::new(&config);
        escape.trigger();

        let mut last = 0.0;
        let mut completions = 0;
        let mut final_offset = 0.0;
        for _ in 0..40 {
            if let Some(frame) = escape.advance(0.1) {
                assert!(escape.progress() >= last);
                assert!(frame.wall_offset <= config.wall_lift);
                assert!((frame.rise - 50.0).abs() < 1e-3);
                last = escape.progress();
                final_offset = frame.wall_offset;
                if frame.completed {
                    completions += 1;
                }
            }
        }
        assert_eq!(completions, 1);
        assert_eq!(escape.progress(), 1.0);
        assert!(escape.is_complete());
        assert_eq!(final_offset, config.wall_lift);
        assert_eq!(escape.advance(0.1), None);
    }

    #[test]
    fn test_exit_pulse_range() {
        assert_eq!(exit_pulse(0.0), 0.5);
        for i in 0..100 {
            let glow = exit_pulse(i as f32 * 0.37);
            assert!((0.0..=1.0).contains(&glow));
        }
    }
}
