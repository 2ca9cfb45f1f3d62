pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod policy;
pub mod state;
pub mod store;

pub use config::EngineConfig;
pub use engine::{BookingInput, ManifestEngine, ShipmentView, StopInput, StopPatch};
pub use error::{EngineError, EngineResult};
pub use models::{
    Client, DeliveryStop, Driver, Shipment, ShipmentEvent, ShipmentFilter, ShipmentStatus,
    StopStatus, Vehicle, VehicleStatus,
};
pub use store::{CollectionStore, FileStore, MemoryStore};
