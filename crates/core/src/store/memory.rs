//! In-process store backing the server binary and the test suites.

use super::{AppointmentStore, MedicationStore, PetStore, UserStore, VaccineStore};
use crate::appointment::Appointment;
use crate::error::{ClinicError, ClinicResult};
use crate::medical::{MedicationCourse, Vaccine};
use crate::pet::Pet;
use crate::user::User;
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct Tables {
    appointments: HashMap<Uuid, Appointment>,
    pets: HashMap<Uuid, Pet>,
    users: HashMap<Uuid, User>,
    vaccines: HashMap<Uuid, Vaccine>,
    medications: HashMap<Uuid, MedicationCourse>,
    // Insertion order per table, so list operations are deterministic.
    appointment_order: Vec<Uuid>,
    pet_order: Vec<Uuid>,
    vaccine_order: Vec<Uuid>,
    medication_order: Vec<Uuid>,
}

/// All tables behind one lock.
///
/// A single `RwLock` plays the role of the database transaction: everything
/// done under the write guard in [`AppointmentStore::insert_scheduled`] is
/// serialised, which closes the check-then-act race between the lifecycle's
/// conflict check and the insert.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Tables> {
        // A poisoned lock means a writer panicked; the tables themselves are
        // plain maps and remain usable.
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Tables> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl AppointmentStore for MemoryStore {
    fn find(&self, id: Uuid) -> ClinicResult<Option<Appointment>> {
        Ok(self.read().appointments.get(&id).cloned())
    }

    fn list_for_veterinarian(&self, veterinarian_id: Uuid) -> ClinicResult<Vec<Appointment>> {
        let tables = self.read();
        Ok(tables
            .appointment_order
            .iter()
            .filter_map(|id| tables.appointments.get(id))
            .filter(|a| a.veterinarian_id == Some(veterinarian_id))
            .cloned()
            .collect())
    }

    fn list_for_owner(&self, owner_id: Uuid) -> ClinicResult<Vec<Appointment>> {
        let tables = self.read();
        Ok(tables
            .appointment_order
            .iter()
            .filter_map(|id| tables.appointments.get(id))
            .filter(|a| a.owner_id == owner_id)
            .cloned()
            .collect())
    }

    fn insert_scheduled(&self, appointment: Appointment) -> ClinicResult<Appointment> {
        let mut tables = self.write();

        // Overlap re-check under the write guard. The lifecycle already ran
        // the user-facing conflict check, but only this one is serialised
        // with the insert.
        if let Some(veterinarian_id) = appointment.veterinarian_id {
            let window = appointment.window();
            let conflict = tables
                .appointment_order
                .iter()
                .filter_map(|id| tables.appointments.get(id))
                .filter(|a| a.veterinarian_id == Some(veterinarian_id))
                .filter(|a| a.status.blocks_schedule())
                .any(|a| a.window().overlaps(&window));
            if conflict {
                tracing::warn!(
                    veterinarian_id = %veterinarian_id,
                    start = %window.start(),
                    "rejecting concurrent double-booking at insert"
                );
                return Err(ClinicError::SchedulingConflict);
            }
        }

        tables.appointment_order.push(appointment.id);
        tables.appointments.insert(appointment.id, appointment.clone());
        Ok(appointment)
    }

    fn save(&self, appointment: Appointment) -> ClinicResult<Appointment> {
        let mut tables = self.write();
        if !tables.appointments.contains_key(&appointment.id) {
            return Err(ClinicError::not_found("appointment", appointment.id));
        }
        tables.appointments.insert(appointment.id, appointment.clone());
        Ok(appointment)
    }
}

impl PetStore for MemoryStore {
    fn find(&self, id: Uuid) -> ClinicResult<Option<Pet>> {
        Ok(self.read().pets.get(&id).cloned())
    }

    fn list_for_owner(&self, owner_id: Uuid) -> ClinicResult<Vec<Pet>> {
        let tables = self.read();
        Ok(tables
            .pet_order
            .iter()
            .filter_map(|id| tables.pets.get(id))
            .filter(|p| p.owner_id == owner_id)
            .cloned()
            .collect())
    }

    fn save(&self, pet: Pet) -> ClinicResult<Pet> {
        let mut tables = self.write();
        if !tables.pets.contains_key(&pet.id) {
            tables.pet_order.push(pet.id);
        }
        tables.pets.insert(pet.id, pet.clone());
        Ok(pet)
    }
}

impl UserStore for MemoryStore {
    fn find(&self, id: Uuid) -> ClinicResult<Option<User>> {
        Ok(self.read().users.get(&id).cloned())
    }

    fn save(&self, user: User) -> ClinicResult<User> {
        self.write().users.insert(user.id, user.clone());
        Ok(user)
    }
}

impl VaccineStore for MemoryStore {
    fn list_for_pet(&self, pet_id: Uuid) -> ClinicResult<Vec<Vaccine>> {
        let tables = self.read();
        Ok(tables
            .vaccine_order
            .iter()
            .filter_map(|id| tables.vaccines.get(id))
            .filter(|v| v.pet_id == pet_id)
            .cloned()
            .collect())
    }

    fn save(&self, vaccine: Vaccine) -> ClinicResult<Vaccine> {
        let mut tables = self.write();
        if !tables.vaccines.contains_key(&vaccine.id) {
            tables.vaccine_order.push(vaccine.id);
        }
        tables.vaccines.insert(vaccine.id, vaccine.clone());
        Ok(vaccine)
    }
}

impl MedicationStore for MemoryStore {
    fn list_for_pet(&self, pet_id: Uuid) -> ClinicResult<Vec<MedicationCourse>> {
        let tables = self.read();
        Ok(tables
            .medication_order
            .iter()
            .filter_map(|id| tables.medications.get(id))
            .filter(|m| m.pet_id == pet_id)
            .cloned()
            .collect())
    }

    fn save(&self, course: MedicationCourse) -> ClinicResult<MedicationCourse> {
        let mut tables = self.write();
        if !tables.medications.contains_key(&course.id) {
            tables.medication_order.push(course.id);
        }
        tables.medications.insert(course.id, course.clone());
        Ok(course)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::appointment::AppointmentStatus;
    use chrono::{DateTime, TimeZone, Utc};
    use vetdesk_types::DurationMinutes;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, hour, minute, 0).unwrap()
    }

    fn appointment(veterinarian_id: Uuid, start: DateTime<Utc>, minutes: u32) -> Appointment {
        Appointment::new_scheduled(
            Uuid::new_v4(),
            Uuid::new_v4(),
            veterinarian_id,
            start,
            DurationMinutes::new(minutes).unwrap(),
            "check-up".into(),
            None,
            at(8, 0),
        )
    }

    #[test]
    fn insert_scheduled_rejects_overlap_for_same_veterinarian() {
        let store = MemoryStore::new();
        let vet = Uuid::new_v4();

        store
            .insert_scheduled(appointment(vet, at(10, 15), 30))
            .unwrap();

        // Even a caller that skipped the detector cannot double-book.
        let result = store.insert_scheduled(appointment(vet, at(10, 0), 30));
        assert!(matches!(result, Err(ClinicError::SchedulingConflict)));
    }

    #[test]
    fn insert_scheduled_allows_other_veterinarians_and_free_slots() {
        let store = MemoryStore::new();
        let vet = Uuid::new_v4();

        store
            .insert_scheduled(appointment(vet, at(10, 0), 30))
            .unwrap();
        // Touching endpoint, not a conflict.
        store
            .insert_scheduled(appointment(vet, at(10, 30), 30))
            .unwrap();
        // Same window, different veterinarian.
        store
            .insert_scheduled(appointment(Uuid::new_v4(), at(10, 0), 30))
            .unwrap();
    }

    #[test]
    fn insert_scheduled_ignores_cancelled_slots() {
        let store = MemoryStore::new();
        let vet = Uuid::new_v4();

        let mut booked = store
            .insert_scheduled(appointment(vet, at(10, 0), 30))
            .unwrap();
        booked.apply_status(AppointmentStatus::Cancelled, at(9, 0));
        AppointmentStore::save(&store, booked).unwrap();

        store
            .insert_scheduled(appointment(vet, at(10, 0), 30))
            .unwrap();
    }

    #[test]
    fn save_requires_an_existing_row() {
        let store = MemoryStore::new();
        let result = AppointmentStore::save(&store, appointment(Uuid::new_v4(), at(10, 0), 30));
        assert!(matches!(result, Err(ClinicError::NotFound { .. })));
    }

    #[test]
    fn list_for_owner_preserves_insertion_order() {
        let store = MemoryStore::new();
        let vet = Uuid::new_v4();
        let owner = Uuid::new_v4();

        let mut first = appointment(vet, at(9, 0), 30);
        first.owner_id = owner;
        let mut second = appointment(vet, at(11, 0), 30);
        second.owner_id = owner;

        let first = store.insert_scheduled(first).unwrap();
        let second = store.insert_scheduled(second).unwrap();

        let listed = AppointmentStore::list_for_owner(&store, owner).unwrap();
        assert_eq!(
            listed.iter().map(|a| a.id).collect::<Vec<_>>(),
            vec![first.id, second.id]
        );
    }
}
