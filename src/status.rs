//! Network and battery status polling
//!
//! Each status has its own throttle, advanced by the frame delta and
//! decoupled from the render cadence. Snapshots are replaced wholesale on
//! every poll; the battery snapshot is compared field by field so that
//! dependent caches only invalidate on a real change.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, trace};

/// Delay between network reachability checks (milliseconds)
pub const NETWORK_INTERVAL_MS: u32 = 2000;

/// Delay between battery checks (milliseconds)
pub const BATTERY_INTERVAL_MS: u32 = 5000;

/// Point-in-time battery state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatterySnapshot {
    pub has_battery: bool,
    pub is_charging: bool,
    /// Charge level, 0..=100
    pub level_percent: u8,
}

impl BatterySnapshot {
    pub fn discharging(level_percent: u8) -> Self {
        Self {
            has_battery: true,
            is_charging: false,
            level_percent: level_percent.min(100),
        }
    }

    pub fn charging(level_percent: u8) -> Self {
        Self {
            is_charging: true,
            ..Self::discharging(level_percent)
        }
    }

    /// Text shown next to the battery icon
    pub fn label(&self) -> String {
        format!("{}%", self.level_percent)
    }
}

/// Point-in-time network state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NetworkSnapshot {
    pub connected: bool,
}

/// Platform status queries
///
/// Query failures are reported as "not connected" / "no battery".
pub trait StatusProbe: Send + Sync {
    /// True if at least one usable interface has an address
    fn network_connected(&self) -> bool;

    fn battery(&self) -> BatterySnapshot;
}

/// Which battery-dependent caches a poll invalidated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatteryChange {
    /// `level_percent` changed: the percentage text must be rebuilt
    pub level_changed: bool,
    /// `has_battery` or `is_charging` changed: the icon must be re-resolved
    pub state_changed: bool,
}

impl BatteryChange {
    fn between(old: &BatterySnapshot, new: &BatterySnapshot) -> Self {
        Self {
            level_changed: old.level_percent != new.level_percent,
            state_changed: old.has_battery != new.has_battery
                || old.is_charging != new.is_charging,
        }
    }

    pub fn is_unchanged(&self) -> bool {
        !self.level_changed && !self.state_changed
    }
}

/// Elapsed-time accumulator that fires once per interval
#[derive(Debug, Clone, Copy)]
pub struct Throttle {
    interval_ms: u32,
    elapsed_ms: u32,
}

impl Throttle {
    pub fn new(interval_ms: u32) -> Self {
        Self {
            interval_ms,
            elapsed_ms: 0,
        }
    }

    /// Accumulate `delta_ms`; returns true (and restarts) once the interval is reached
    pub fn advance(&mut self, delta_ms: u32) -> bool {
        self.elapsed_ms = self.elapsed_ms.saturating_add(delta_ms);
        if self.elapsed_ms >= self.interval_ms {
            self.elapsed_ms = 0;
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self) {
        self.elapsed_ms = 0;
    }

    pub fn elapsed_ms(&self) -> u32 {
        self.elapsed_ms
    }
}

/// The two throttled pollers and their latest snapshots
#[derive(Debug, Clone)]
pub struct StatusPollers {
    network_throttle: Throttle,
    battery_throttle: Throttle,
    network: NetworkSnapshot,
    battery: BatterySnapshot,
}

impl StatusPollers {
    pub fn new(network_interval_ms: u32, battery_interval_ms: u32) -> Self {
        Self {
            network_throttle: Throttle::new(network_interval_ms),
            battery_throttle: Throttle::new(battery_interval_ms),
            network: NetworkSnapshot::default(),
            battery: BatterySnapshot::default(),
        }
    }

    pub fn network(&self) -> NetworkSnapshot {
        self.network
    }

    pub fn battery(&self) -> BatterySnapshot {
        self.battery
    }

    /// Query the network state now
    ///
    /// When `enabled` is false the probe is not called and the snapshot
    /// reads as disconnected.
    pub fn poll_network(&mut self, probe: &dyn StatusProbe, enabled: bool) -> NetworkSnapshot {
        self.network = NetworkSnapshot {
            connected: enabled && probe.network_connected(),
        };
        self.network_throttle.reset();

        trace!("Network poll: connected={}", self.network.connected);
        self.network
    }

    /// Query the battery state now
    ///
    /// When `enabled` is false the probe is not called and the snapshot is
    /// forced to "no battery" without reporting any invalidation.
    pub fn poll_battery(&mut self, probe: &dyn StatusProbe, enabled: bool) -> BatteryChange {
        self.battery_throttle.reset();

        if !enabled {
            self.battery.has_battery = false;
            return BatteryChange::default();
        }

        let info = probe.battery();
        let change = BatteryChange::between(&self.battery, &info);
        if change.is_unchanged() {
            trace!("Battery poll: unchanged ({}%)", info.level_percent);
            return change;
        }

        debug!(
            "Battery changed: has_battery={} charging={} level={}%",
            info.has_battery, info.is_charging, info.level_percent
        );
        self.battery = info;
        change
    }

    /// Advance the network throttle, polling when it fires
    pub fn advance_network(
        &mut self,
        delta_ms: u32,
        probe: &dyn StatusProbe,
        enabled: bool,
    ) -> Option<NetworkSnapshot> {
        self.network_throttle
            .advance(delta_ms)
            .then(|| self.poll_network(probe, enabled))
    }

    /// Advance the battery throttle, polling when it fires
    pub fn advance_battery(
        &mut self,
        delta_ms: u32,
        probe: &dyn StatusProbe,
        enabled: bool,
    ) -> Option<BatteryChange> {
        self.battery_throttle
            .advance(delta_ms)
            .then(|| self.poll_battery(probe, enabled))
    }
}

impl Default for StatusPollers {
    fn default() -> Self {
        Self::new(NETWORK_INTERVAL_MS, BATTERY_INTERVAL_MS)
    }
}

/// Runs a slow probe on the blocking pool and serves its latest result
///
/// Every query returns immediately with the last published value and, if
/// no refresh is already running, starts one. Results are published by
/// replacement, so the most recent completed query wins.
pub struct BackgroundProbe {
    inner: Arc<dyn StatusProbe>,
    runtime: tokio::runtime::Handle,
    network: Arc<RwLock<bool>>,
    battery: Arc<RwLock<BatterySnapshot>>,
    network_in_flight: Arc<AtomicBool>,
    battery_in_flight: Arc<AtomicBool>,
}

impl BackgroundProbe {
    /// Wrap `inner`, priming both values with one synchronous query each
    pub fn new(inner: Arc<dyn StatusProbe>, runtime: tokio::runtime::Handle) -> Self {
        let network = inner.network_connected();
        let battery = inner.battery();

        Self {
            inner,
            runtime,
            network: Arc::new(RwLock::new(network)),
            battery: Arc::new(RwLock::new(battery)),
            network_in_flight: Arc::new(AtomicBool::new(false)),
            battery_in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    fn refresh<T, F>(&self, slot: &Arc<RwLock<T>>, in_flight: &Arc<AtomicBool>, query: F)
    where
        T: Send + Sync + 'static,
        F: FnOnce(&dyn StatusProbe) -> T + Send + 'static,
    {
        if in_flight.swap(true, Ordering::AcqRel) {
            return;
        }

        let inner = Arc::clone(&self.inner);
        let slot = Arc::clone(slot);
        let in_flight = Arc::clone(in_flight);
        self.runtime.spawn_blocking(move || {
            let value = query(inner.as_ref());
            *slot.write() = value;
            in_flight.store(false, Ordering::Release);
        });
    }
}

impl StatusProbe for BackgroundProbe {
    fn network_connected(&self) -> bool {
        self.refresh(&self.network, &self.network_in_flight, |probe| {
            probe.network_connected()
        });
        *self.network.read()
    }

    fn battery(&self) -> BatterySnapshot {
        self.refresh(&self.battery, &self.battery_in_flight, |probe| probe.battery());
        *self.battery.read()
    }
}
