use std::sync::Arc;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use shakti_manifest::store::{save_collection, CLIENTS_KEY, DRIVERS_KEY, VEHICLES_KEY};
use shakti_manifest::{
    BookingInput, Client, Driver, EngineConfig, ManifestEngine, MemoryStore, Shipment, StopInput,
    Vehicle, VehicleStatus,
};

static TRACING: Lazy<()> = Lazy::new(|| {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
});

pub struct TestEngine {
    pub engine: ManifestEngine,
    pub store: Arc<MemoryStore>,
}

impl TestEngine {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Lazy::force(&TRACING);
        let store = Arc::new(MemoryStore::new());
        seed_collections(store.as_ref());
        let engine = ManifestEngine::new(store.clone(), config);
        Self { engine, store }
    }

    /// Book a valid single-stop manifest through the admin channel.
    #[allow(dead_code)]
    pub fn booked_shipment(&self) -> Shipment {
        self.engine
            .create_shipment(booking_input(vec![stop(5.0)]))
            .expect("booking a valid manifest")
    }
}

fn seed_collections(store: &MemoryStore) {
    save_collection(store, DRIVERS_KEY, &seed_drivers()).expect("seed drivers");
    save_collection(store, VEHICLES_KEY, &seed_vehicles()).expect("seed vehicles");
    save_collection(store, CLIENTS_KEY, &seed_clients()).expect("seed clients");
}

fn seed_drivers() -> Vec<Driver> {
    vec![
        Driver {
            id: 1,
            name: "Vikram Singh".to_string(),
            role: "Lead Driver".to_string(),
            license: "GJ-01-2015-0012345".to_string(),
            phone: "+91 98250 11223".to_string(),
            status: "In Transit".to_string(),
            vehicle: "GJ-27-X-1234".to_string(),
        },
        Driver {
            id: 2,
            name: "Rajesh Patel".to_string(),
            role: "Driver".to_string(),
            license: "GJ-01-2012-0055667".to_string(),
            phone: "+91 98250 44556".to_string(),
            status: "Active".to_string(),
            vehicle: "GJ-27-Y-5678".to_string(),
        },
    ]
}

fn seed_vehicles() -> Vec<Vehicle> {
    let unit = |id: &str, reg: &str, class: &str, capacity: &str, status: VehicleStatus| Vehicle {
        id: id.to_string(),
        registration_number: reg.to_string(),
        vehicle_type: class.to_string(),
        capacity: capacity.to_string(),
        status,
        last_maintenance: NaiveDate::from_ymd_opt(2024, 3, 1),
        features: vec!["GPS".to_string()],
        notes: None,
    };
    vec![
        unit(
            "V-001",
            "GJ-27-X-1234",
            "Big Eicher",
            "7 Tons",
            VehicleStatus::InTransit,
        ),
        unit(
            "V-002",
            "GJ-27-Y-5678",
            "Small Eicher",
            "4 Tons",
            VehicleStatus::Available,
        ),
        unit(
            "V-003",
            "GJ-27-Z-9012",
            "Small Eicher",
            "4 Tons",
            VehicleStatus::Available,
        ),
        unit(
            "V-004",
            "GJ-01-B-9988",
            "Bolero Pickup",
            "1.5 Tons",
            VehicleStatus::Maintenance,
        ),
        unit(
            "V-005",
            "GJ-01-B-7766",
            "Bolero Pickup",
            "1.5 Tons",
            VehicleStatus::Available,
        ),
        unit(
            "V-006",
            "GJ-01-C-1122",
            "Small Carry",
            "1 Ton",
            VehicleStatus::Available,
        ),
    ]
}

fn seed_clients() -> Vec<Client> {
    vec![
        Client {
            id: "CL-001".to_string(),
            company_name: "PST Polytech".to_string(),
            contact_person: "Amit Shah".to_string(),
            phone: "+91 98980 11111".to_string(),
            email: "amit@pstpoly.com".to_string(),
            gstin: None,
            address: "GIDC, Kalol".to_string(),
            tier: "Gold".to_string(),
            status: "Active".to_string(),
            joined_date: NaiveDate::from_ymd_opt(2023, 1, 10),
            notes: None,
        },
        Client {
            id: "CL-002".to_string(),
            company_name: "Reva Industries".to_string(),
            contact_person: "Rajiv Menon".to_string(),
            phone: "+91 98980 22222".to_string(),
            email: "ops@revaind.com".to_string(),
            gstin: None,
            address: "Makarpura, Vadodara".to_string(),
            tier: "Diamond".to_string(),
            status: "Active".to_string(),
            joined_date: NaiveDate::from_ymd_opt(2022, 11, 5),
            notes: None,
        },
    ]
}

pub fn stop(weight: f64) -> StopInput {
    StopInput {
        address: "Surat".to_string(),
        landmark: None,
        contact_name: "Receiving Desk".to_string(),
        contact_phone: "+91 98111 00000".to_string(),
        payload_description: "50 PVC Pipes".to_string(),
        weight,
        instructions: None,
        call_before_delivery: true,
    }
}

pub fn booking_input(stops: Vec<StopInput>) -> BookingInput {
    BookingInput {
        client: "PST Polytech".to_string(),
        origin: "Kalol Base".to_string(),
        destination: None,
        pickup_landmark: None,
        pickup_date: NaiveDate::from_ymd_opt(2024, 5, 20).expect("valid date"),
        pickup_time_window: Some("Morning (9-12)".to_string()),
        goods_type: "Industrial Hardware".to_string(),
        vehicle_class: "Big Eicher".to_string(),
        is_multi_stop: stops.len() > 1,
        is_non_fragile: true,
        is_non_perishable: true,
        instructions: None,
        stops,
    }
}
