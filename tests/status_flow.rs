mod common;

use anyhow::Result;
use common::{booking_input, stop, TestEngine};
use shakti_manifest::{EngineError, ShipmentStatus};

#[test]
fn booked_to_delivered_end_to_end() -> Result<()> {
    let app = TestEngine::new();

    let shipment = app.engine.create_shipment(booking_input(vec![stop(5.0)]))?;
    assert_eq!(shipment.status, ShipmentStatus::Booked);
    assert_eq!(shipment.total_weight, 5.0);
    assert_eq!(shipment.timeline.len(), 1);

    let assigned = app.engine.approve_request(&shipment.id, 1, "V-002")?;
    assert_eq!(assigned.status, ShipmentStatus::Assigned);
    assert_eq!(assigned.driver_id, Some(1));
    assert_eq!(assigned.vehicle_id.as_deref(), Some("V-002"));
    assert_eq!(assigned.vehicle, "GJ-27-Y-5678 (Small Eicher)");
    assert_eq!(assigned.timeline.len(), 2);
    assert_eq!(
        assigned.timeline[1].note.as_deref(),
        Some("Approved & Assigned Personnel: Vikram Singh | Unit: GJ-27-Y-5678")
    );

    let only_stop = assigned.stops[0].id.clone();
    let err = app.engine.remove_stop(&assigned.id, &only_stop).unwrap_err();
    assert!(matches!(err, EngineError::MinimumStopViolation));
    let unchanged = app.engine.get_shipment(&assigned.id)?;
    assert_eq!(unchanged.stops.len(), 1);
    assert_eq!(unchanged.timeline.len(), 2);

    let delivered = app
        .engine
        .set_status(&assigned.id, ShipmentStatus::Delivered, None)?;
    assert_eq!(delivered.status, ShipmentStatus::Delivered);
    assert_eq!(delivered.timeline.len(), 3);
    assert_eq!(delivered.timeline[2].location, "Admin Console");
    assert_eq!(
        delivered.timeline[2].note.as_deref(),
        Some("Status manually updated by root admin to: DELIVERED")
    );

    // Well past Booked by now.
    let err = app.engine.decline_request(&delivered.id).unwrap_err();
    assert!(matches!(err, EngineError::InvalidTransition { .. }));
    Ok(())
}

#[test]
fn manual_override_rejects_the_current_status() -> Result<()> {
    let app = TestEngine::new();
    let shipment = app.booked_shipment();

    let moved = app
        .engine
        .set_status(&shipment.id, ShipmentStatus::Dispatched, None)?;
    assert_eq!(moved.timeline.len(), 2);

    let err = app
        .engine
        .set_status(&moved.id, ShipmentStatus::Dispatched, None)
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::NoOpTransition {
            status: ShipmentStatus::Dispatched
        }
    ));

    // No duplicate audit entry was appended.
    let stored = app.engine.get_shipment(&moved.id)?;
    assert_eq!(stored.timeline.len(), 2);
    Ok(())
}

#[test]
fn override_cannot_reach_booking_or_assignment_states() {
    let app = TestEngine::new();
    let shipment = app.booked_shipment();

    for target in [
        ShipmentStatus::Booked,
        ShipmentStatus::Assigned,
        ShipmentStatus::Declined,
    ] {
        let err = app.engine.set_status(&shipment.id, target, None).unwrap_err();
        assert!(matches!(err, EngineError::InvalidTransition { .. }));
    }
}

#[test]
fn operators_may_move_backward() -> Result<()> {
    let app = TestEngine::new();
    let shipment = app.booked_shipment();

    app.engine
        .set_status(&shipment.id, ShipmentStatus::Delivered, None)?;
    let walked_back = app
        .engine
        .set_status(&shipment.id, ShipmentStatus::InTransit, None)?;
    assert_eq!(walked_back.status, ShipmentStatus::InTransit);
    assert_eq!(walked_back.timeline.len(), 3);
    Ok(())
}

#[test]
fn declined_is_terminal() -> Result<()> {
    let app = TestEngine::new();
    let shipment = app.booked_shipment();

    let declined = app.engine.decline_request(&shipment.id)?;
    assert_eq!(declined.status, ShipmentStatus::Declined);
    assert_eq!(declined.timeline.len(), 2);
    assert_eq!(declined.timeline[1].location, "Admin Terminal");
    assert_eq!(
        declined.timeline[1].note.as_deref(),
        Some("Manifest Request Declined by Operations.")
    );

    let err = app
        .engine
        .set_status(&declined.id, ShipmentStatus::Dispatched, None)
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidTransition { .. }));

    let err = app
        .engine
        .approve_request(&declined.id, 2, "V-002")
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidTransition { .. }));

    let err = app
        .engine
        .reassign_assets(&declined.id, 2, "V-002")
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidTransition { .. }));

    let stored = app.engine.get_shipment(&declined.id)?;
    assert_eq!(stored.timeline.len(), 2);
    Ok(())
}

#[test]
fn decline_is_only_reachable_from_booked() -> Result<()> {
    let app = TestEngine::new();
    let shipment = app.booked_shipment();
    app.engine.approve_request(&shipment.id, 2, "V-002")?;

    let err = app.engine.decline_request(&shipment.id).unwrap_err();
    assert!(matches!(err, EngineError::InvalidTransition { .. }));
    Ok(())
}

#[test]
fn timeline_is_append_only_across_transitions() -> Result<()> {
    let app = TestEngine::new();
    let shipment = app.booked_shipment();

    let before = app.engine.get_shipment(&shipment.id)?.timeline;
    let after = app
        .engine
        .set_status(&shipment.id, ShipmentStatus::InTransit, None)?
        .timeline;

    assert_eq!(after.len(), before.len() + 1);
    for (old, new) in before.iter().zip(after.iter()) {
        assert_eq!(old.status, new.status);
        assert_eq!(old.timestamp, new.timestamp);
        assert_eq!(old.location, new.location);
        assert_eq!(old.note, new.note);
    }
    Ok(())
}

#[test]
fn override_note_can_be_supplied() -> Result<()> {
    let app = TestEngine::new();
    let shipment = app.booked_shipment();

    let updated = app.engine.set_status(
        &shipment.id,
        ShipmentStatus::Invoiced,
        Some("Billed against PO-4471".to_string()),
    )?;
    assert_eq!(
        updated.timeline[1].note.as_deref(),
        Some("Billed against PO-4471")
    );
    Ok(())
}

#[test]
fn unknown_shipment_is_not_found() {
    let app = TestEngine::new();
    let err = app
        .engine
        .set_status("SHAKTI-999999", ShipmentStatus::Delivered, None)
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound { .. }));
}
