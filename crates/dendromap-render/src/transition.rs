//! Caller-driven color transitions (no global timer).
//!
//! The host owns the clock: it calls [`TransitionScheduler::start`] once, then
//! [`TransitionScheduler::tick`] with its current time (for example once per animation frame)
//! and applies the returned colors to the named targets.

use crate::colors::Color;

#[derive(Debug, Clone, PartialEq)]
struct ColorTransition {
    target: String,
    from: Color,
    to: Color,
    duration_ms: f64,
    /// Set on the first tick after scheduling.
    started_at: Option<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct TransitionScheduler {
    running: bool,
    origin_ms: f64,
    pending: Vec<ColorTransition>,
}

impl TransitionScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, now_ms: f64) {
        self.running = true;
        self.origin_ms = now_ms;
    }

    /// Drops every pending transition.
    pub fn stop(&mut self) {
        self.running = false;
        self.pending.clear();
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// A later transition on the same target replaces the earlier one.
    pub fn schedule(&mut self, target: impl Into<String>, from: Color, to: Color, duration_ms: f64) {
        let target = target.into();
        self.pending.retain(|t| t.target != target);
        self.pending.push(ColorTransition {
            target,
            from,
            to,
            duration_ms: duration_ms.max(0.0),
            started_at: None,
        });
    }

    /// Current `(target, hex color)` of every pending transition; finished ones are removed.
    pub fn tick(&mut self, now_ms: f64) -> Vec<(String, String)> {
        if !self.running {
            return Vec::new();
        }
        let now = now_ms.max(self.origin_ms);
        let mut out = Vec::with_capacity(self.pending.len());
        self.pending.retain_mut(|t| {
            let started = *t.started_at.get_or_insert(now);
            let t_norm = if t.duration_ms == 0.0 {
                1.0
            } else {
                ((now - started) / t.duration_ms).clamp(0.0, 1.0)
            };
            out.push((t.target.clone(), t.from.interpolate(t.to, t_norm).to_hex()));
            t_norm < 1.0
        });
        out
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}
