//! Transient toast notifications
//!
//! Save/load results surface only as short-lived text: green on success,
//! red on failure. Nothing here blocks or needs confirmation.

use crate::consts::NOTIFICATION_DURATION_MS;

/// Maximum number of toasts kept on screen
pub const MAX_TOASTS: usize = 4;

/// What a toast reports (selects its color)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Failure,
    /// Story events (new spell unlocked, etc.)
    Info,
}

impl ToastKind {
    /// RGBA text color
    pub fn color(&self) -> [f32; 4] {
        match self {
            ToastKind::Success => [0.30, 0.85, 0.40, 1.0],
            ToastKind::Failure => [0.90, 0.25, 0.25, 1.0],
            ToastKind::Info => [0.95, 0.85, 0.45, 1.0],
        }
    }
}

/// A single on-screen message
#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub text: String,
    pub kind: ToastKind,
    /// Time left before the toast disappears (ms)
    pub remaining_ms: f64,
}

impl Toast {
    /// Opacity for fade-out over the last 500 ms
    pub fn alpha(&self) -> f32 {
        (self.remaining_ms / 500.0).clamp(0.0, 1.0) as f32
    }
}

/// Queue of active toasts, newest last
#[derive(Debug, Clone)]
pub struct NotificationQueue {
    toasts: Vec<Toast>,
    duration_ms: f64,
    enabled: bool,
}

impl Default for NotificationQueue {
    fn default() -> Self {
        Self::new(NOTIFICATION_DURATION_MS)
    }
}

impl NotificationQueue {
    pub fn new(duration_ms: f64) -> Self {
        Self {
            toasts: Vec::with_capacity(MAX_TOASTS),
            duration_ms,
            enabled: true,
        }
    }

    /// Turn toasts on/off (from settings)
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.toasts.clear();
        }
    }

    pub fn push(&mut self, kind: ToastKind, text: impl Into<String>) {
        if !self.enabled {
            return;
        }
        self.toasts.push(Toast {
            text: text.into(),
            kind,
            remaining_ms: self.duration_ms,
        });
        if self.toasts.len() > MAX_TOASTS {
            self.toasts.remove(0);
        }
    }

    pub fn success(&mut self, text: impl Into<String>) {
        self.push(ToastKind::Success, text);
    }

    pub fn failure(&mut self, text: impl Into<String>) {
        self.push(ToastKind::Failure, text);
    }

    /// Age toasts and drop expired ones
    pub fn update(&mut self, dt_ms: f64) {
        for toast in &mut self.toasts {
            toast.remaining_ms -= dt_ms;
        }
        self.toasts.retain(|t| t.remaining_ms > 0.0);
    }

    pub fn active(&self) -> &[Toast] {
        &self.toasts
    }

    /// Most recent toast, if any
    pub fn latest(&self) -> Option<&Toast> {
        self.toasts.last()
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toasts_expire() {
        let mut queue = NotificationQueue::new(1_000.0);
        queue.success("Game saved");
        queue.update(600.0);
        queue.failure("Load failed");
        assert_eq!(queue.active().len(), 2);

        queue.update(500.0);
        assert_eq!(queue.active().len(), 1);
        assert_eq!(queue.latest().unwrap().kind, ToastKind::Failure);

        queue.update(1_000.0);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_queue_is_bounded() {
        let mut queue = NotificationQueue::default();
        for i in 0..(MAX_TOASTS + 2) {
            queue.push(ToastKind::Info, format!("toast {}", i));
        }
        assert_eq!(queue.active().len(), MAX_TOASTS);
        assert_eq!(queue.active()[0].text, "toast 2");
    }

    #[test]
    fn test_disabled_queue_drops_toasts() {
        let mut queue = NotificationQueue::default();
        queue.success("kept");
        queue.set_enabled(false);
        assert!(queue.is_empty());
        queue.success("dropped");
        assert!(queue.is_empty());
    }

    #[test]
    fn test_colors_distinguish_outcome() {
        assert_ne!(ToastKind::Success.color(), ToastKind::Failure.color());
        let toast = Toast {
            text: String::new(),
            kind: ToastKind::Success,
            remaining_ms: 250.0,
        };
        assert!((toast.alpha() - 0.5).abs() < 1e-6);
    }
}
