//! Save slot summaries for the continue/load menu

use super::snapshot::SaveData;

/// What the load menu shows for a slot
#[derive(Debug, Clone, PartialEq)]
pub struct SaveSummary {
    pub level: u32,
    pub scene: String,
    /// Session time played (ms)
    pub playtime: f64,
    /// Unix ms the save was written
    pub timestamp: f64,
}

impl SaveSummary {
    /// Summarize a save; `None` if it has no player section
    pub fn from_save(data: &SaveData) -> Option<Self> {
        let player = data.player.as_ref()?;
        Some(Self {
            level: player.attributes.resolve().level,
            scene: data.scene.clone(),
            playtime: data.playtime,
            timestamp: data.timestamp,
        })
    }

    /// One-line label, e.g. `Lv 4 - village - 1:02:03 - 2 hours ago`
    pub fn label(&self, now: f64) -> String {
        format!(
            "Lv {} - {} - {} - {}",
            self.level,
            self.scene,
            format_playtime(self.playtime),
            format_date(self.timestamp, now)
        )
    }
}

/// Format a playtime as `m:ss` or `h:mm:ss`
pub fn format_playtime(ms: f64) -> String {
    let total_secs = (ms.max(0.0) / 1000.0).floor() as u64;
    let hours = total_secs / 3600;
    let mins = (total_secs % 3600) / 60;
    let secs = total_secs % 60;
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, mins, secs)
    } else {
        format!("{}:{:02}", mins, secs)
    }
}

/// Format a timestamp relative to `now` (both Unix ms)
pub fn format_date(timestamp: f64, now: f64) -> String {
    let diff_ms = now - timestamp;
    let diff_secs = diff_ms / 1000.0;
    let diff_mins = diff_secs / 60.0;
    let diff_hours = diff_mins / 60.0;
    let diff_days = diff_hours / 24.0;

    if diff_days >= 1.0 {
        let days = diff_days.floor() as i32;
        if days == 1 {
            "Yesterday".to_string()
        } else if days < 7 {
            format!("{} days ago", days)
        } else if days < 30 {
            format!("{} weeks ago", days / 7)
        } else {
            "Long ago".to_string()
        }
    } else if diff_hours >= 1.0 {
        let hours = diff_hours.floor() as i32;
        if hours == 1 {
            "1 hour ago".to_string()
        } else {
            format!("{} hours ago", hours)
        }
    } else if diff_mins >= 1.0 {
        let mins = diff_mins.floor() as i32;
        if mins == 1 {
            "1 min ago".to_string()
        } else {
            format!("{} mins ago", mins)
        }
    } else {
        "Just now".to_string()
    }
}
