//! Wear tracker configuration.

use serde::{Deserialize, Serialize};

use crate::record::RECORD_SIZE;

/// Rated write endurance assumed when none is configured.
pub const DEFAULT_MAX_WRITES: u32 = 12_000_000;

/// Default write-counter slot: the last of 256 record slots.
pub const DEFAULT_WRITE_COUNTER_OFFSET: usize = 255 * RECORD_SIZE;

/// Default boot-counter slot: the one just below the write counter.
pub const DEFAULT_BOOT_COUNTER_OFFSET: usize = 254 * RECORD_SIZE;

/// Default spacing of periodic status reports (five minutes).
pub const DEFAULT_REPORT_INTERVAL_MS: u64 = 300_000;

/// Wear percentages at which each warning level starts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub caution: f64,
    pub critical: f64,
    pub retirement: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            caution: 75.0,
            critical: 90.0,
            retirement: 100.0,
        }
    }
}

/// Everything a [`WearTracker`](crate::WearTracker) needs besides its store.
///
/// Missing fields take their defaults when deserialized:
///
/// ```rust
/// use flashcfg_core_store::WearSettings;
///
/// let settings: WearSettings = serde_json::from_str(r#"{"max_writes": 100000}"#).unwrap();
/// assert_eq!(settings.max_writes, 100_000);
/// assert_eq!(settings.thresholds.caution, 75.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WearSettings {
    pub max_writes: u32,
    pub write_counter_offset: usize,
    pub boot_counter_offset: usize,
    pub thresholds: Thresholds,
    pub report_interval_ms: u64,
}

impl Default for WearSettings {
    fn default() -> Self {
        Self {
            max_writes: DEFAULT_MAX_WRITES,
            write_counter_offset: DEFAULT_WRITE_COUNTER_OFFSET,
            boot_counter_offset: DEFAULT_BOOT_COUNTER_OFFSET,
            thresholds: Thresholds::default(),
            report_interval_ms: DEFAULT_REPORT_INTERVAL_MS,
        }
    }
}

impl WearSettings {
    pub fn with_max_writes(mut self, max_writes: u32) -> Self {
        self.max_writes = max_writes;
        self
    }

    pub fn with_offsets(mut self, write_counter: usize, boot_counter: usize) -> Self {
        self.write_counter_offset = write_counter;
        self.boot_counter_offset = boot_counter;
        self
    }

    pub fn with_report_interval(mut self, interval_ms: u64) -> Self {
        self.report_interval_ms = interval_ms;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_slots_do_not_overlap() {
        let settings = WearSettings::default();
        assert_eq!(
            settings.write_counter_offset - settings.boot_counter_offset,
            RECORD_SIZE
        );
        assert_eq!(settings.write_counter_offset + RECORD_SIZE, 2048);
    }

    #[test]
    fn partial_json_uses_defaults() {
        let settings: WearSettings = serde_json::from_str(
            r#"{"thresholds": {"critical": 95.0}, "report_interval_ms": 1000}"#,
        )
        .unwrap();
        assert_eq!(settings.max_writes, DEFAULT_MAX_WRITES);
        assert_eq!(settings.thresholds.caution, 75.0);
        assert_eq!(settings.thresholds.critical, 95.0);
        assert_eq!(settings.report_interval_ms, 1000);
    }

    #[test]
    fn builder_methods() {
        let settings = WearSettings::default()
            .with_max_writes(10)
            .with_offsets(0, 8)
            .with_report_interval(50);
        assert_eq!(settings.max_writes, 10);
        assert_eq!(settings.write_counter_offset, 0);
        assert_eq!(settings.boot_counter_offset, 8);
        assert_eq!(settings.report_interval_ms, 50);
    }
}
