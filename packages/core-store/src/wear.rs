//! Flash wear and boot counting.
//!
//! A [`WearTracker`] keeps two counters in a [`DurableCounterStore`]: the
//! number of durable config writes performed over the device's life, and
//! the number of times the device has booted. The write count is compared
//! against the flash's rated endurance to warn operators before the config
//! partition wears out.
//!
//! # Example
//!
//! ```rust
//! use flashcfg_core_store::{ManualClock, WarningLevel, WearSettings, WearTracker};
//! use flashcfg_ll_store::MemoryCounterStore;
//!
//! let settings = WearSettings::default().with_max_writes(10);
//! let mut tracker =
//!     WearTracker::boot(MemoryCounterStore::new(4096), settings, ManualClock::new()).unwrap();
//!
//! for _ in 0..8 {
//!     assert!(tracker.record_write());
//! }
//! assert_eq!(tracker.warning_level(), WarningLevel::Caution);
//! assert_eq!(tracker.boot_count(), 1);
//! ```

use serde::Serialize;

use flashcfg_ll_store::DurableCounterStore;

use crate::clock::{Clock, SystemClock};
use crate::record::{RecordOrigin, WearRecord, RECORD_SIZE};
use crate::settings::{Thresholds, WearSettings};
use crate::Error;

/// Severity of the current wear percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[repr(u8)]
pub enum WarningLevel {
    Normal = 0,
    Caution = 1,
    Critical = 2,
    Retirement = 3,
}

impl WarningLevel {
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    fn from_percentage(percentage: f64, thresholds: &Thresholds) -> Self {
        if percentage >= thresholds.retirement {
            WarningLevel::Retirement
        } else if percentage >= thresholds.critical {
            WarningLevel::Critical
        } else if percentage >= thresholds.caution {
            WarningLevel::Caution
        } else {
            WarningLevel::Normal
        }
    }
}

impl std::fmt::Display for WarningLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WarningLevel::Normal => write!(f, "NORMAL"),
            WarningLevel::Caution => write!(f, "CAUTION"),
            WarningLevel::Critical => write!(f, "CRITICAL"),
            WarningLevel::Retirement => write!(f, "RETIREMENT REQUIRED"),
        }
    }
}

/// A point-in-time view of a tracker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WearSnapshot {
    pub write_count: u32,
    pub max_writes: u32,
    pub percentage: f64,
    pub level: WarningLevel,
    pub boot_count: u32,
    pub retired: bool,
}

/// Something to tell about completed durable writes.
///
/// A config store calls this
/// once per successful save. Returns whether the event was durably counted.
pub trait WriteObserver {
    fn on_durable_write(&mut self) -> bool;
}

type RetirementHandler = Box<dyn FnMut(&WearSnapshot)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TrackerState {
    Uninitialized,
    Initialized,
}

/// Durable write and boot counters with retirement policy.
///
/// A tracker starts uninitialized. [`initialize`](Self::initialize) places
/// both records in the store, loads (or repairs) the write count, and counts
/// the current boot. It should run once per process start, before any
/// config I/O.
pub struct WearTracker<D, C = SystemClock> {
    store: D,
    clock: C,
    settings: WearSettings,
    state: TrackerState,
    write_offset: usize,
    boot_offset: usize,
    write_count: u32,
    boot_count: u32,
    retired: bool,
    last_report_ms: u64,
    retirement_handler: Option<RetirementHandler>,
}

impl<D: DurableCounterStore, C: Clock> WearTracker<D, C> {
    /// Create an uninitialized tracker.
    pub fn new(store: D, settings: WearSettings, clock: C) -> Self {
        Self {
            store,
            clock,
            write_offset: settings.write_counter_offset,
            boot_offset: settings.boot_counter_offset,
            settings,
            state: TrackerState::Uninitialized,
            write_count: 0,
            boot_count: 0,
            retired: false,
            last_report_ms: 0,
            retirement_handler: None,
        }
    }

    /// Create and initialize a tracker in one step.
    pub fn boot(store: D, settings: WearSettings, clock: C) -> Result<Self, Error> {
        let mut tracker = Self::new(store, settings, clock);
        tracker.initialize()?;
        Ok(tracker)
    }

    /// Load both counters and count this boot.
    ///
    /// Records whose tag is invalid are repaired in place. Calling this on an
    /// initialized tracker does nothing, so a boot is never counted twice.
    ///
    /// Fails only when the store cannot hold both records without overlap.
    pub fn initialize(&mut self) -> Result<(), Error> {
        if self.state == TrackerState::Initialized {
            log::debug!("Wear tracker already initialized");
            return Ok(());
        }

        let (write_offset, boot_offset) = place_records(
            self.settings.write_counter_offset,
            self.settings.boot_counter_offset,
            self.store.capacity(),
        )?;
        self.write_offset = write_offset;
        self.boot_offset = boot_offset;

        let bound = self.settings.max_writes;

        let (writes, origin) = self.load_record(write_offset, bound);
        self.write_count = writes;
        if let Err(error) = self.persist(write_offset, writes) {
            log::warn!(
                "Could not rewrite write counter at offset {}: {}",
                write_offset,
                error
            );
        }
        log::info!(
            "Wear tracker initialized with {} writes ({:.2}% of limit, {:?} record)",
            writes,
            self.percentage_of(writes),
            origin
        );

        let (boots, origin) = self.load_record(boot_offset, bound);
        self.boot_count = boots.saturating_add(1);
        if let Err(error) = self.persist(boot_offset, self.boot_count) {
            log::warn!(
                "Could not persist boot count at offset {}: {}",
                boot_offset,
                error
            );
        }
        log::info!("Boot {} ({:?} boot record)", self.boot_count, origin);

        self.state = TrackerState::Initialized;
        self.retired = self.wear_percentage() >= self.settings.thresholds.retirement;
        self.last_report_ms = self.clock.now_ms();
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.state == TrackerState::Initialized
    }

    /// Count one durable write.
    ///
    /// Returns `false` if the tracker is not initialized or the updated
    /// count could not be committed, in which case the count is unchanged.
    pub fn record_write(&mut self) -> bool {
        match self.try_record_write() {
            Ok(_) => true,
            Err(error) => {
                log::error!("Flash wear counter not updated: {}", error);
                false
            }
        }
    }

    /// Count one durable write, returning the resulting warning level.
    pub fn try_record_write(&mut self) -> Result<WarningLevel, Error> {
        if !self.is_initialized() {
            return Err(Error::NotInitialized);
        }

        let previous = self.write_count;
        self.write_count = previous.saturating_add(1);
        if let Err(error) = self.persist(self.write_offset, self.write_count) {
            self.write_count = previous;
            return Err(error);
        }

        let level = self.warning_level();
        let percentage = self.wear_percentage();
        match level {
            WarningLevel::Retirement => {
                log::error!(
                    "Flash wear at {:.2}% ({}/{} writes) - device retirement required",
                    percentage,
                    self.write_count,
                    self.settings.max_writes
                );
                self.enter_retirement();
            }
            WarningLevel::Critical => log::warn!(
                "Flash wear at {:.2}% ({}/{} writes) - device retirement recommended",
                percentage,
                self.write_count,
                self.settings.max_writes
            ),
            WarningLevel::Caution => log::warn!(
                "Flash wear at {:.2}% ({}/{} writes)",
                percentage,
                self.write_count,
                self.settings.max_writes
            ),
            WarningLevel::Normal => {}
        }
        Ok(level)
    }

    pub fn write_count(&self) -> u32 {
        if self.is_initialized() {
            self.write_count
        } else {
            0
        }
    }

    pub fn max_writes(&self) -> u32 {
        self.settings.max_writes
    }

    /// Share of the rated endurance used so far, in percent.
    pub fn wear_percentage(&self) -> f64 {
        self.percentage_of(self.write_count())
    }

    pub fn warning_level(&self) -> WarningLevel {
        WarningLevel::from_percentage(self.wear_percentage(), &self.settings.thresholds)
    }

    /// Whether the write count has reached the retirement threshold.
    ///
    /// Once set this stays set for the life of the tracker.
    pub fn is_device_retired(&self) -> bool {
        self.is_initialized()
            && (self.retired || self.wear_percentage() >= self.settings.thresholds.retirement)
    }

    /// Log a status line if forced or if the report interval has elapsed.
    ///
    /// Returns whether a report was produced.
    pub fn report_status(&mut self, force: bool) -> bool {
        if !self.is_initialized() {
            log::error!("Flash wear status requested before initialization");
            return false;
        }

        let now = self.clock.now_ms();
        if !force && now.saturating_sub(self.last_report_ms) < self.settings.report_interval_ms {
            return false;
        }

        log::info!("{}", self.status_line());
        match self.warning_level() {
            WarningLevel::Retirement => {
                log::error!("Flash write limit exceeded - device should be retired immediately");
                self.enter_retirement();
            }
            WarningLevel::Critical => {
                log::warn!("Flash wear critical - device retirement recommended")
            }
            WarningLevel::Caution => log::warn!("High flash wear detected"),
            WarningLevel::Normal => log::info!("Flash wear within normal limits"),
        }

        self.last_report_ms = now;
        true
    }

    pub fn force_report(&mut self) -> bool {
        self.report_status(true)
    }

    pub fn set_thresholds(&mut self, caution: f64, critical: f64, retirement: f64) {
        self.settings.thresholds = Thresholds {
            caution,
            critical,
            retirement,
        };
        log::info!(
            "Wear thresholds set - caution: {:.1}%, critical: {:.1}%, retirement: {:.1}%",
            caution,
            critical,
            retirement
        );
    }

    pub fn set_report_interval(&mut self, interval_ms: u64) {
        self.settings.report_interval_ms = interval_ms;
        log::info!("Wear report interval set to {} ms", interval_ms);
    }

    /// Refuses to reset the write counter.
    ///
    /// The write count is the device's wear history; clearing it would hide
    /// a worn-out part. Always returns `false` and leaves the count as is.
    pub fn reset_counter(&mut self) -> bool {
        log::error!(
            "Programmer error: the flash write counter cannot be reset (count stays at {})",
            self.write_count
        );
        false
    }

    pub fn boot_count(&self) -> u32 {
        if self.is_initialized() {
            self.boot_count
        } else {
            0
        }
    }

    /// Reset the boot counter to zero, durably.
    pub fn reset_boot_counter(&mut self) -> bool {
        if !self.is_initialized() {
            log::error!("Boot counter reset requested before initialization");
            return false;
        }
        match self.persist(self.boot_offset, 0) {
            Ok(()) => {
                self.boot_count = 0;
                log::info!("Boot counter reset to 0");
                true
            }
            Err(error) => {
                log::error!("Boot counter not reset: {}", error);
                false
            }
        }
    }

    /// One-line summary, e.g. `Flash wear: 9/10 writes (90.00% used) - CRITICAL`.
    pub fn status_line(&self) -> String {
        if !self.is_initialized() {
            return "Flash wear: not initialized".to_string();
        }
        format!(
            "Flash wear: {}/{} writes ({:.2}% used) - {}",
            self.write_count,
            self.settings.max_writes,
            self.wear_percentage(),
            self.warning_level()
        )
    }

    pub fn snapshot(&self) -> WearSnapshot {
        WearSnapshot {
            write_count: self.write_count(),
            max_writes: self.max_writes(),
            percentage: self.wear_percentage(),
            level: self.warning_level(),
            boot_count: self.boot_count(),
            retired: self.is_device_retired(),
        }
    }

    /// Run `handler` when the device first crosses into retirement.
    pub fn set_retirement_handler(&mut self, handler: impl FnMut(&WearSnapshot) + 'static) {
        self.retirement_handler = Some(Box::new(handler));
    }

    pub fn settings(&self) -> &WearSettings {
        &self.settings
    }

    /// Resolved `(write_counter, boot_counter)` offsets.
    pub fn offsets(&self) -> (usize, usize) {
        (self.write_offset, self.boot_offset)
    }

    pub fn store(&self) -> &D {
        &self.store
    }

    pub fn into_store(self) -> D {
        self.store
    }

    fn enter_retirement(&mut self) {
        if self.retired {
            return;
        }
        self.retired = true;
        log::error!(
            "Device retirement mode: flash write limit reached, replace the device; \
             further config writes risk data loss"
        );
        let snapshot = self.snapshot();
        if let Some(handler) = self.retirement_handler.as_mut() {
            handler(&snapshot);
        }
    }

    fn load_record(&mut self, offset: usize, bound: u32) -> (u32, RecordOrigin) {
        match self.store.read_bytes(offset, RECORD_SIZE) {
            Ok(bytes) => match WearRecord::decode(&bytes) {
                Some(record) => record.resolve(bound),
                None => (0, RecordOrigin::Reset),
            },
            Err(error) => {
                log::warn!("Could not read wear record at offset {}: {}", offset, error);
                (0, RecordOrigin::Reset)
            }
        }
    }

    fn persist(&mut self, offset: usize, value: u32) -> Result<(), Error> {
        self.store
            .write_bytes(offset, &WearRecord::valid(value).encode())?;
        Ok(())
    }

    fn percentage_of(&self, count: u32) -> f64 {
        count as f64 * 100.0 / self.settings.max_writes.max(1) as f64
    }
}

impl<D: DurableCounterStore, C: Clock> WriteObserver for WearTracker<D, C> {
    fn on_durable_write(&mut self) -> bool {
        self.record_write()
    }
}

impl<D, C> std::fmt::Debug for WearTracker<D, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WearTracker")
            .field("state", &self.state)
            .field("write_offset", &self.write_offset)
            .field("boot_offset", &self.boot_offset)
            .field("write_count", &self.write_count)
            .field("boot_count", &self.boot_count)
            .field("retired", &self.retired)
            .finish_non_exhaustive()
    }
}

/// Read both counters without counting a boot or repairing anything.
///
/// Records are located and resolved exactly as [`WearTracker::initialize`]
/// would, so the snapshot matches what the next boot starts from (except
/// that `boot_count` is the number of boots so far).
pub fn inspect<D: DurableCounterStore + ?Sized>(
    store: &mut D,
    settings: &WearSettings,
) -> Result<WearSnapshot, Error> {
    let (write_offset, boot_offset) = place_records(
        settings.write_counter_offset,
        settings.boot_counter_offset,
        store.capacity(),
    )?;
    let mut resolve = |offset: usize| -> Result<u32, Error> {
        let bytes = store.read_bytes(offset, RECORD_SIZE)?;
        Ok(WearRecord::decode(&bytes)
            .map(|record| record.resolve(settings.max_writes).0)
            .unwrap_or(0))
    };
    let write_count = resolve(write_offset)?;
    let boot_count = resolve(boot_offset)?;

    let percentage = write_count as f64 * 100.0 / settings.max_writes.max(1) as f64;
    let level = WarningLevel::from_percentage(percentage, &settings.thresholds);
    Ok(WearSnapshot {
        write_count,
        max_writes: settings.max_writes,
        percentage,
        level,
        boot_count,
        retired: level == WarningLevel::Retirement,
    })
}

/// Choose non-overlapping, in-bounds offsets for the write and boot records.
///
/// Each record tries its configured offset, then one record size back, then
/// offset zero; the boot record also tries the slot directly after the write
/// record. Write candidates are tried in order and the first one that leaves
/// room for the boot record wins, so placement only fails when the store is
/// smaller than two records.
fn place_records(
    write_offset: usize,
    boot_offset: usize,
    capacity: usize,
) -> Result<(usize, usize), Error> {
    let fits = |offset: usize| {
        offset
            .checked_add(RECORD_SIZE)
            .is_some_and(|end| end <= capacity)
    };

    let placement = candidates(write_offset, None)
        .filter(|write| fits(*write))
        .find_map(|write| {
            let overlaps_write =
                |offset: usize| offset < write + RECORD_SIZE && write < offset + RECORD_SIZE;
            candidates(boot_offset, Some(write + RECORD_SIZE))
                .find(|boot| fits(*boot) && !overlaps_write(*boot))
                .map(|boot| (write, boot))
        });

    let (write, boot) = placement.ok_or_else(|| Error::Placement {
        message: format!(
            "write counter at {} and boot counter at {} cannot both fit in {} bytes",
            write_offset, boot_offset, capacity
        ),
    })?;

    if write != write_offset {
        log::warn!(
            "Write counter moved from offset {} to {} (capacity {})",
            write_offset,
            write,
            capacity
        );
    }
    if boot != boot_offset {
        log::warn!(
            "Boot counter moved from offset {} to {} (write counter at {})",
            boot_offset,
            boot,
            write
        );
    }

    Ok((write, boot))
}

fn candidates(offset: usize, last_resort: Option<usize>) -> impl Iterator<Item = usize> {
    [Some(offset), offset.checked_sub(RECORD_SIZE), Some(0), last_resort]
        .into_iter()
        .flatten()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::record::VALID_TAG;
    use flashcfg_ll_store::MemoryCounterStore;
    use std::cell::Cell;
    use std::rc::Rc;

    fn small_settings() -> WearSettings {
        WearSettings::default()
            .with_max_writes(10)
            .with_offsets(16, 8)
    }

    fn boot_small(
        store: &mut MemoryCounterStore,
    ) -> WearTracker<&mut MemoryCounterStore, ManualClock> {
        WearTracker::boot(store, small_settings(), ManualClock::new()).unwrap()
    }

    #[test]
    fn fresh_store_starts_at_zero_and_heals_records() {
        let mut store = MemoryCounterStore::new(64);
        let tracker = boot_small(&mut store);
        assert_eq!(tracker.write_count(), 0);
        assert_eq!(tracker.boot_count(), 1);
        assert_eq!(tracker.offsets(), (16, 8));
        drop(tracker);

        assert_eq!(
            WearRecord::decode(&store.raw()[16..24]),
            Some(WearRecord::valid(0))
        );
        assert_eq!(
            WearRecord::decode(&store.raw()[8..16]),
            Some(WearRecord::valid(1))
        );
    }

    #[test]
    fn threshold_crossing() {
        let mut store = MemoryCounterStore::new(64);
        let mut tracker = boot_small(&mut store);

        let mut levels = Vec::new();
        for _ in 0..9 {
            assert!(tracker.record_write());
            levels.push(tracker.warning_level());
        }
        assert_eq!(levels[6], WarningLevel::Normal);
        assert_eq!(levels[7], WarningLevel::Caution);
        assert_eq!(levels[8], WarningLevel::Critical);
        assert!(!tracker.is_device_retired());

        assert!(tracker.record_write());
        assert_eq!(tracker.write_count(), 10);
        assert_eq!(tracker.warning_level(), WarningLevel::Retirement);
        assert!(tracker.is_device_retired());
    }

    #[test]
    fn retirement_handler_runs_once() {
        let mut store = MemoryCounterStore::new(64);
        let mut tracker = boot_small(&mut store);
        let calls = Rc::new(Cell::new(0));
        let seen = calls.clone();
        tracker.set_retirement_handler(move |snapshot| {
            assert!(snapshot.retired);
            seen.set(seen.get() + 1);
        });

        for _ in 0..12 {
            tracker.record_write();
        }
        assert_eq!(calls.get(), 1);
        // Writes past retirement are still counted.
        assert_eq!(tracker.write_count(), 12);
    }

    #[test]
    fn failed_commit_rolls_back() {
        let mut store = MemoryCounterStore::new(64);
        {
            let mut tracker = boot_small(&mut store);
            assert!(tracker.record_write());
            assert!(tracker.record_write());
        }

        store.set_fail_writes(true);
        let mut tracker = WearTracker::boot(&mut store, small_settings(), ManualClock::new()).unwrap();
        assert_eq!(tracker.write_count(), 2);
        assert!(!tracker.record_write());
        assert_eq!(tracker.write_count(), 2);
        assert!(matches!(tracker.try_record_write(), Err(Error::Storage(_))));
        assert_eq!(tracker.write_count(), 2);
    }

    #[test]
    fn write_counter_reset_is_refused() {
        let mut store = MemoryCounterStore::new(64);
        let mut tracker = boot_small(&mut store);
        tracker.record_write();
        tracker.record_write();
        for _ in 0..3 {
            assert!(!tracker.reset_counter());
            assert_eq!(tracker.write_count(), 2);
        }
    }

    #[test]
    fn boot_counter_counts_each_initialization() {
        let mut store = MemoryCounterStore::new(64);
        for expected in 1..=3 {
            let tracker = boot_small(&mut store);
            assert_eq!(tracker.boot_count(), expected);
        }
    }

    #[test]
    fn boot_counter_reset_is_durable() {
        let mut store = MemoryCounterStore::new(64);
        {
            let mut tracker = boot_small(&mut store);
            assert!(tracker.reset_boot_counter());
            assert_eq!(tracker.boot_count(), 0);
        }
        let tracker = boot_small(&mut store);
        assert_eq!(tracker.boot_count(), 1);
    }

    #[test]
    fn second_initialize_is_a_no_op() {
        let mut store = MemoryCounterStore::new(64);
        let mut tracker = boot_small(&mut store);
        tracker.initialize().unwrap();
        assert_eq!(tracker.boot_count(), 1);
    }

    #[test]
    fn uninitialized_tracker_refuses_work() {
        let mut tracker = WearTracker::new(
            MemoryCounterStore::new(64),
            small_settings(),
            ManualClock::new(),
        );
        assert!(!tracker.record_write());
        assert!(!tracker.report_status(true));
        assert!(!tracker.reset_boot_counter());
        assert_eq!(tracker.write_count(), 0);
        assert_eq!(tracker.warning_level(), WarningLevel::Normal);
        assert!(!tracker.is_device_retired());
        assert_eq!(tracker.status_line(), "Flash wear: not initialized");
    }

    #[test]
    fn corrupted_but_plausible_count_is_recovered() {
        let mut store = MemoryCounterStore::new(64);
        store.poke(16, &WearRecord { value: 7, tag: 0x00 }.encode());
        let tracker = boot_small(&mut store);
        assert_eq!(tracker.write_count(), 7);
        drop(tracker);
        assert_eq!(store.raw()[20], VALID_TAG);
    }

    #[test]
    fn implausible_count_resets() {
        let mut store = MemoryCounterStore::zeroed(64);
        store.poke(16, &WearRecord { value: 500, tag: 0x12 }.encode());
        let tracker = boot_small(&mut store);
        assert_eq!(tracker.write_count(), 0);
    }

    #[test]
    fn report_respects_interval() {
        let clock = ManualClock::new();
        let settings = small_settings().with_report_interval(1_000);
        let mut tracker =
            WearTracker::boot(MemoryCounterStore::new(64), settings, clock.clone()).unwrap();

        assert!(!tracker.report_status(false));
        clock.advance(999);
        assert!(!tracker.report_status(false));
        clock.advance(1);
        assert!(tracker.report_status(false));
        assert!(!tracker.report_status(false));
        assert!(tracker.force_report());

        tracker.set_report_interval(10);
        clock.advance(10);
        assert!(tracker.report_status(false));
    }

    #[test]
    fn custom_thresholds() {
        let mut tracker =
            WearTracker::boot(MemoryCounterStore::new(64), small_settings(), ManualClock::new())
                .unwrap();
        tracker.set_thresholds(10.0, 20.0, 50.0);
        tracker.record_write();
        assert_eq!(tracker.warning_level(), WarningLevel::Caution);
        tracker.record_write();
        assert_eq!(tracker.warning_level(), WarningLevel::Critical);
        for _ in 0..3 {
            tracker.record_write();
        }
        assert!(tracker.is_device_retired());
        assert_eq!(tracker.warning_level().as_u8(), 3);
    }

    #[test]
    fn status_line_and_snapshot() {
        let mut tracker =
            WearTracker::boot(MemoryCounterStore::new(64), small_settings(), ManualClock::new())
                .unwrap();
        for _ in 0..9 {
            tracker.record_write();
        }
        assert_eq!(
            tracker.status_line(),
            "Flash wear: 9/10 writes (90.00% used) - CRITICAL"
        );
        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.write_count, 9);
        assert_eq!(snapshot.boot_count, 1);
        assert_eq!(snapshot.level, WarningLevel::Critical);
        assert!(!snapshot.retired);
    }

    #[test]
    fn observer_counts_writes() {
        let mut tracker =
            WearTracker::boot(MemoryCounterStore::new(64), small_settings(), ManualClock::new())
                .unwrap();
        let observer: &mut dyn WriteObserver = &mut tracker;
        assert!(observer.on_durable_write());
        assert_eq!(tracker.write_count(), 1);
    }

    #[test]
    fn placement_keeps_valid_offsets() {
        assert_eq!(place_records(16, 8, 64).unwrap(), (16, 8));
    }

    #[test]
    fn placement_moves_overlapping_boot_record_back() {
        assert_eq!(place_records(16, 16, 64).unwrap(), (16, 8));
        // One record back still overlaps, so fall back to zero.
        assert_eq!(place_records(16, 20, 64).unwrap(), (16, 0));
    }

    #[test]
    fn placement_moves_out_of_range_records() {
        // Default offsets on a 1 KiB region.
        assert_eq!(place_records(2040, 2032, 1024).unwrap(), (0, 8));
        assert_eq!(place_records(60, 8, 64).unwrap(), (52, 8));
    }

    #[test]
    fn placement_fails_without_room() {
        assert!(matches!(
            place_records(0, 0, 4),
            Err(Error::Placement { .. })
        ));
        assert!(matches!(
            place_records(0, 0, 8),
            Err(Error::Placement { .. })
        ));
        assert_eq!(place_records(0, 0, 16).unwrap(), (0, 8));
    }

    #[test]
    fn placement_moves_misaligned_write_record_to_make_room() {
        // No boot slot fits beside a write record at 4, but one fits beside 0.
        assert_eq!(place_records(4, 0, 16).unwrap(), (0, 8));
        assert_eq!(place_records(3, 9, 17).unwrap(), (0, 9));

        let mut store = MemoryCounterStore::new(16);
        let settings = small_settings().with_offsets(4, 0);
        let tracker = WearTracker::boot(&mut store, settings, ManualClock::new()).unwrap();
        assert_eq!(tracker.offsets(), (0, 8));
        assert_eq!(tracker.boot_count(), 1);
    }

    #[test]
    fn initialization_fails_on_tiny_store() {
        let result = WearTracker::boot(
            MemoryCounterStore::new(8),
            small_settings(),
            ManualClock::new(),
        );
        assert!(matches!(result, Err(Error::Placement { .. })));
    }

    #[test]
    fn inspect_reads_without_side_effects() {
        let mut store = MemoryCounterStore::new(64);
        {
            let mut tracker = boot_small(&mut store);
            for _ in 0..9 {
                tracker.record_write();
            }
        }
        let writes = store.writes();

        let snapshot = inspect(&mut store, &small_settings()).unwrap();
        assert_eq!(snapshot.write_count, 9);
        assert_eq!(snapshot.boot_count, 1);
        assert_eq!(snapshot.level, WarningLevel::Critical);
        assert!(!snapshot.retired);
        assert_eq!(store.writes(), writes);

        let fresh = inspect(&mut MemoryCounterStore::new(64), &small_settings()).unwrap();
        assert_eq!(fresh.write_count, 0);
        assert_eq!(fresh.boot_count, 0);
    }
}
