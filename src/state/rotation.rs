use crate::views::{View, ViewRegistry};
use log::debug;

pub const PAUSE_GLYPH: &str = "⏸️";
pub const PLAY_GLYPH: &str = "▶️";

/// Result of flipping the rotation switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleOutcome {
    pub enabled: bool,
    pub glyph: &'static str,
    pub timer_disabled: bool,
}

/// Per-session view rotation.
///
/// States are {Rotating, Paused} × registry index. A tick while rotating
/// moves one entry forward and wraps; a tick while paused does nothing,
/// except for the very first tick of a session which is always applied.
#[derive(Debug, Clone)]
pub struct RotationController {
    registry: ViewRegistry,
    /// Kept as a name so a restored or stale value can be anything; unknown
    /// names are reset on the next tick.
    current: String,
    enabled: bool,
    started: bool,
}

impl RotationController {
    pub fn new(registry: ViewRegistry) -> Self {
        let current = registry.first().name().to_string();
        Self {
            registry,
            current,
            enabled: true,
            started: false,
        }
    }

    /// Starts from a restored view name, valid or not.
    pub fn with_current(mut self, name: impl Into<String>) -> Self {
        self.current = name.into();
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn registry(&self) -> &ViewRegistry {
        &self.registry
    }

    pub fn current(&self) -> &str {
        &self.current
    }

    pub fn current_view(&self) -> Option<View> {
        View::from_name(&self.current)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn glyph(&self) -> &'static str {
        glyph_for(self.enabled)
    }

    /// Handle one timer tick. Returns the new view when it changed, `None`
    /// when there is nothing to update.
    pub fn advance(&mut self, tick: Option<u64>) -> Option<View> {
        let tick = tick?;
        let first = tick == 0 || !self.started;
        if !self.enabled && !first {
            return None;
        }

        let next = self.registry.next_after(&self.current);
        debug!("rotation tick {tick}: {} -> {}", self.current, next.name());
        self.current = next.name().to_string();
        self.started = true;
        Some(next)
    }

    pub fn toggle(&mut self) -> ToggleOutcome {
        self.enabled = !self.enabled;
        ToggleOutcome {
            enabled: self.enabled,
            glyph: glyph_for(self.enabled),
            timer_disabled: !self.enabled,
        }
    }

    /// Jump straight to a view without touching the rotation switch.
    pub fn select(&mut self, view: View) {
        self.current = view.name().to_string();
        self.started = true;
    }
}

fn glyph_for(enabled: bool) -> &'static str {
    if enabled { PAUSE_GLYPH } else { PLAY_GLYPH }
}
