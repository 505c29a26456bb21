//! Scheduling-conflict detection.
//!
//! Decides whether a proposed veterinarian time window is free. This check
//! runs on the creation path before persisting; the store's
//! `insert_scheduled` repeats it under its own lock, so two concurrent
//! creations cannot both slip past it.

use crate::appointment::TimeWindow;
use crate::error::ClinicResult;
use crate::store::AppointmentStore;
use std::sync::Arc;
use uuid::Uuid;

/// Guards a veterinarian's calendar against double-booking.
#[derive(Clone)]
pub struct ConflictDetector {
    appointments: Arc<dyn AppointmentStore>,
}

impl ConflictDetector {
    pub fn new(appointments: Arc<dyn AppointmentStore>) -> Self {
        Self { appointments }
    }

    /// Returns true if `window` overlaps any blocking appointment of the
    /// given veterinarian.
    ///
    /// Cancelled and no-show appointments do not block. Overlap uses the
    /// strict half-open test, so touching endpoints are free and an empty
    /// window conflicts with nothing.
    pub fn has_conflict(&self, veterinarian_id: Uuid, window: &TimeWindow) -> ClinicResult<bool> {
        let existing = self.appointments.list_for_veterinarian(veterinarian_id)?;

        let conflict = existing
            .iter()
            .filter(|a| a.status.blocks_schedule())
            .any(|a| a.window().overlaps(window));

        if conflict {
            tracing::debug!(
                veterinarian_id = %veterinarian_id,
                start = %window.start(),
                end = %window.end(),
                "requested window conflicts with an existing appointment"
            );
        }

        Ok(conflict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::appointment::{Appointment, AppointmentStatus};
    use crate::store::MemoryStore;
    use chrono::{DateTime, TimeZone, Utc};
    use vetdesk_types::DurationMinutes;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, hour, minute, 0).unwrap()
    }

    fn booked(
        store: &Arc<MemoryStore>,
        veterinarian_id: Uuid,
        start: DateTime<Utc>,
        minutes: u32,
    ) -> Appointment {
        let appointment = Appointment::new_scheduled(
            Uuid::new_v4(),
            Uuid::new_v4(),
            veterinarian_id,
            start,
            DurationMinutes::new(minutes).unwrap(),
            "consultation".into(),
            None,
            at(8, 0),
        );
        store.insert_scheduled(appointment).unwrap()
    }

    fn detector(store: &Arc<MemoryStore>) -> ConflictDetector {
        ConflictDetector::new(store.clone() as Arc<dyn AppointmentStore>)
    }

    #[test]
    fn overlapping_window_conflicts() {
        let store = Arc::new(MemoryStore::new());
        let vet = Uuid::new_v4();
        booked(&store, vet, at(10, 15), 30);

        let window = TimeWindow::new(at(10, 0), at(10, 30));
        assert!(detector(&store).has_conflict(vet, &window).unwrap());
    }

    #[test]
    fn touching_endpoints_do_not_conflict() {
        let store = Arc::new(MemoryStore::new());
        let vet = Uuid::new_v4();
        booked(&store, vet, at(10, 0), 30);

        let detector = detector(&store);
        let before = TimeWindow::new(at(9, 30), at(10, 0));
        let after = TimeWindow::new(at(10, 30), at(11, 0));
        assert!(!detector.has_conflict(vet, &before).unwrap());
        assert!(!detector.has_conflict(vet, &after).unwrap());
    }

    #[test]
    fn cancelled_and_no_show_slots_do_not_block() {
        let store = Arc::new(MemoryStore::new());
        let vet = Uuid::new_v4();

        let mut cancelled = booked(&store, vet, at(10, 0), 30);
        cancelled.apply_status(AppointmentStatus::Cancelled, at(9, 0));
        AppointmentStore::save(store.as_ref(), cancelled).unwrap();

        let mut no_show = booked(&store, vet, at(11, 0), 30);
        no_show.apply_status(AppointmentStatus::NoShow, at(11, 40));
        AppointmentStore::save(store.as_ref(), no_show).unwrap();

        let detector = detector(&store);
        let window = TimeWindow::new(at(10, 0), at(11, 30));
        assert!(!detector.has_conflict(vet, &window).unwrap());
    }

    #[test]
    fn other_veterinarians_never_conflict() {
        let store = Arc::new(MemoryStore::new());
        let vet = Uuid::new_v4();
        booked(&store, vet, at(10, 0), 30);

        let window = TimeWindow::new(at(10, 0), at(10, 30));
        assert!(!detector(&store)
            .has_conflict(Uuid::new_v4(), &window)
            .unwrap());
    }

    #[test]
    fn zero_duration_window_never_conflicts() {
        // Deliberate semantics of the strict-inequality test: the degenerate
        // interval has an empty intersection with everything.
        let store = Arc::new(MemoryStore::new());
        let vet = Uuid::new_v4();
        booked(&store, vet, at(10, 0), 60);

        let degenerate = TimeWindow::new(at(10, 30), at(10, 30));
        assert!(!detector(&store).has_conflict(vet, &degenerate).unwrap());
    }
}
