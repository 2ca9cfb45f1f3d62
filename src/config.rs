use std::collections::HashMap;
use std::env;

use anyhow::{Context, Result};

/// Rated capacity in tons by vehicle class. Fleet composition changes
/// through configuration, not code.
pub const DEFAULT_FLEET_CAPACITY: &[(&str, f64)] = &[
    ("Big Eicher", 7.0),
    ("Small Eicher", 4.0),
    ("Bolero Pickup", 1.5),
    ("Small Carry", 1.0),
];

#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Vehicle class -> rated capacity in tons.
    pub fleet_capacity: HashMap<String, f64>,
    /// Reject assignment of a driver whose duty status is "In Transit".
    /// Off by default: dispatchers resolve driver conflicts manually.
    pub enforce_driver_availability: bool,
    /// Derive Partially Delivered / Delivered on the parent shipment from
    /// stop completion after each stop-status change.
    pub auto_reconcile_status: bool,
    /// Reject stop edits on Delivered / Declined / Invoiced shipments.
    pub guard_closed_edits: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fleet_capacity: DEFAULT_FLEET_CAPACITY
                .iter()
                .map(|(class, tons)| (class.to_string(), *tons))
                .collect(),
            enforce_driver_availability: false,
            auto_reconcile_status: true,
            guard_closed_edits: true,
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let fleet_capacity = match env::var("SHAKTI_FLEET_CAPACITY") {
            Ok(raw) => parse_capacity_table(&raw)
                .context("SHAKTI_FLEET_CAPACITY must look like 'Big Eicher=7,Small Carry=1'")?,
            Err(_) => defaults.fleet_capacity,
        };

        let enforce_driver_availability = env_flag(
            "SHAKTI_ENFORCE_DRIVER_AVAILABILITY",
            defaults.enforce_driver_availability,
        );
        let auto_reconcile_status =
            env_flag("SHAKTI_AUTO_RECONCILE_STATUS", defaults.auto_reconcile_status);
        let guard_closed_edits = env_flag("SHAKTI_GUARD_CLOSED_EDITS", defaults.guard_closed_edits);

        Ok(Self {
            fleet_capacity,
            enforce_driver_availability,
            auto_reconcile_status,
            guard_closed_edits,
        })
    }

    /// Rated capacity for a vehicle class, matched case-insensitively.
    pub fn capacity_for(&self, vehicle_class: &str) -> Option<f64> {
        let wanted = vehicle_class.trim();
        self.fleet_capacity
            .iter()
            .find(|(class, _)| class.eq_ignore_ascii_case(wanted))
            .map(|(_, tons)| *tons)
    }
}

fn env_flag(name: &str, default: bool) -> bool {
    env::var(name)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(default)
}

fn parse_capacity_table(raw: &str) -> Result<HashMap<String, f64>> {
    let mut table = HashMap::new();
    for entry in raw.split(',') {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }
        let (class, tons) = entry
            .split_once('=')
            .with_context(|| format!("capacity entry '{entry}' is missing '='"))?;
        let tons: f64 = tons
            .trim()
            .parse()
            .with_context(|| format!("capacity for '{}' is not a number", class.trim()))?;
        anyhow::ensure!(tons > 0.0, "capacity for '{}' must be positive", class.trim());
        table.insert(class.trim().to_string(), tons);
    }
    anyhow::ensure!(!table.is_empty(), "capacity table is empty");
    Ok(table)
}
