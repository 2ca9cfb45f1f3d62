use crate::models::DeliveryStop;

/// Sum of the stop weights in tons. The authoritative value for
/// `Shipment::total_weight` whenever stops exist.
pub fn total_weight(stops: &[DeliveryStop]) -> f64 {
    stops.iter().map(|stop| stop.weight).sum()
}

/// Load gate used by both booking channels before a manifest is stored.
pub fn is_overweight(total_weight: f64, vehicle_class_capacity: f64) -> bool {
    total_weight > vehicle_class_capacity
}
