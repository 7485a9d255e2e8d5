//! Thin on-screen feedback for the save layer
//!
//! Rendering lives in the host; these types only hold what to draw.

pub mod health_bar;
pub mod notifications;

pub use health_bar::HealthBar;
pub use notifications::{NotificationQueue, Toast, ToastKind};
