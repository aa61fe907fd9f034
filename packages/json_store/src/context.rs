//! The device's configuration, wired together once at startup.

use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

use flashcfg_core_store::{Clock, DurableCounterStore, Error, WearSettings, WearTracker};
use flashcfg_ll_store::StorageProvider;

use crate::device_state::{DeviceState, DEVICE_STATE_PATH};
use crate::ConfigStore;

/// Default network config file path.
pub const NETWORK_CONFIG_PATH: &str = "/wifiConfig.json";

/// Owns every configuration component of a device.
///
/// Components that need configuration are handed a reference to the part
/// they use. Both stores report their saves to the same wear tracker.
pub struct DeviceContext<S, D, C> {
    tracker: Rc<RefCell<WearTracker<D, C>>>,
    network: ConfigStore<S>,
    device: DeviceState<S>,
}

impl<S, D, C> DeviceContext<S, D, C>
where
    S: StorageProvider,
    D: DurableCounterStore + 'static,
    C: Clock + 'static,
{
    /// Count this boot, then load the network and device state configs.
    ///
    /// The boot is counted before any config file is touched. Fails only if
    /// the wear records cannot be placed in `counters`.
    pub fn boot(
        network_storage: S,
        device_storage: S,
        counters: D,
        settings: WearSettings,
        clock: C,
    ) -> Result<Self, Error> {
        let tracker = WearTracker::boot(counters, settings, clock)?;
        log::info!("Booting device context (boot {})", tracker.boot_count());
        let tracker = Rc::new(RefCell::new(tracker));

        let mut network = ConfigStore::with_path(network_storage, NETWORK_CONFIG_PATH);
        network.attach_wear_tracker(tracker.clone());
        network.load(NETWORK_CONFIG_PATH, false);

        let mut device_store = ConfigStore::with_path(device_storage, DEVICE_STATE_PATH);
        device_store.attach_wear_tracker(tracker.clone());
        let mut device = DeviceState::new(device_store);
        device.load();

        Ok(Self {
            tracker,
            network,
            device,
        })
    }

    pub fn network(&self) -> &ConfigStore<S> {
        &self.network
    }

    pub fn network_mut(&mut self) -> &mut ConfigStore<S> {
        &mut self.network
    }

    pub fn device_state(&self) -> &DeviceState<S> {
        &self.device
    }

    pub fn device_state_mut(&mut self) -> &mut DeviceState<S> {
        &mut self.device
    }

    pub fn wear(&self) -> Ref<'_, WearTracker<D, C>> {
        self.tracker.borrow()
    }

    pub fn wear_mut(&self) -> RefMut<'_, WearTracker<D, C>> {
        self.tracker.borrow_mut()
    }

    /// Periodic wear report; call from the main loop.
    pub fn report_status(&self, force: bool) -> bool {
        self.tracker.borrow_mut().report_status(force)
    }

    /// Release the storage media so the device can be booted again over
    /// them: `(network storage, device storage, counters)`.
    pub fn shutdown(self) -> Result<(S, S, D), Error> {
        let Self {
            tracker,
            network,
            device,
        } = self;
        let network = network.into_storage();
        let device = device.into_store().into_storage();
        let tracker = Rc::try_unwrap(tracker).map_err(|_| Error::Refused {
            message: "wear tracker is still shared".to_string(),
        })?;
        Ok((network, device, tracker.into_inner().into_store()))
    }
}

impl<S, D, C> std::fmt::Debug for DeviceContext<S, D, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceContext")
            .field("network", &self.network)
            .field("device", &self.device)
            .finish_non_exhaustive()
    }
}
