use std::sync::{Arc, Mutex, MutexGuard};

use crate::config::EngineConfig;
use crate::error::EngineResult;
use crate::models::{Client, Driver, Shipment, Vehicle};
use crate::store::{
    load_collection, save_collection, CollectionStore, CLIENTS_KEY, DRIVERS_KEY, SHIPMENTS_KEY,
    VEHICLES_KEY,
};

/// Shared engine state: the persistence port, configuration, and the
/// write gates that serialize mutations.
///
/// Persistence is whole-collection JSON, so the narrowest sound writer
/// unit is the collection: a gate is held across the full
/// load-mutate-persist cycle, which guarantees at most one in-flight
/// mutation per shipment id and no lost updates between concurrent
/// operators.
pub struct EngineState {
    store: Arc<dyn CollectionStore>,
    pub config: Arc<EngineConfig>,
    shipments_gate: Mutex<()>,
    vehicles_gate: Mutex<()>,
}

impl EngineState {
    pub fn new(store: Arc<dyn CollectionStore>, config: EngineConfig) -> Self {
        Self {
            store,
            config: Arc::new(config),
            shipments_gate: Mutex::new(()),
            vehicles_gate: Mutex::new(()),
        }
    }

    pub fn lock_shipments(&self) -> MutexGuard<'_, ()> {
        self.shipments_gate.lock().expect("shipments gate poisoned")
    }

    pub fn lock_vehicles(&self) -> MutexGuard<'_, ()> {
        self.vehicles_gate.lock().expect("vehicles gate poisoned")
    }

    pub fn load_shipments(&self) -> EngineResult<Vec<Shipment>> {
        load_collection(self.store.as_ref(), SHIPMENTS_KEY)
    }

    pub fn save_shipments(&self, shipments: &[Shipment]) -> EngineResult<()> {
        save_collection(self.store.as_ref(), SHIPMENTS_KEY, shipments)
    }

    pub fn load_drivers(&self) -> EngineResult<Vec<Driver>> {
        load_collection(self.store.as_ref(), DRIVERS_KEY)
    }

    pub fn load_vehicles(&self) -> EngineResult<Vec<Vehicle>> {
        load_collection(self.store.as_ref(), VEHICLES_KEY)
    }

    pub fn save_vehicles(&self, vehicles: &[Vehicle]) -> EngineResult<()> {
        save_collection(self.store.as_ref(), VEHICLES_KEY, vehicles)
    }

    pub fn load_clients(&self) -> EngineResult<Vec<Client>> {
        load_collection(self.store.as_ref(), CLIENTS_KEY)
    }
}
