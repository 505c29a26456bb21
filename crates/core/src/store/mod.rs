//! Narrow persistence interfaces.
//!
//! Persistence of entities is an external collaborator: core services only
//! depend on these traits, which expose lookup-by-id, lookup-by-owner/pet
//! and save operations. The in-process [`MemoryStore`] implementation backs
//! the server binary and the test suites.

mod memory;

pub use memory::MemoryStore;

use crate::appointment::Appointment;
use crate::error::ClinicResult;
use crate::medical::{MedicationCourse, Vaccine};
use crate::pet::Pet;
use crate::user::User;
use uuid::Uuid;

/// Appointment persistence.
///
/// `insert_scheduled` is the only way a new appointment enters the store.
/// Implementations must re-check veterinarian overlap atomically with the
/// insert (one serializable transaction, or an equivalent store-level
/// lock), because the lifecycle's conflict check and the insert are not
/// atomic at the application level and two concurrent creations could
/// otherwise both pass the check before either commits.
pub trait AppointmentStore: Send + Sync {
    fn find(&self, id: Uuid) -> ClinicResult<Option<Appointment>>;
    fn list_for_veterinarian(&self, veterinarian_id: Uuid) -> ClinicResult<Vec<Appointment>>;
    fn list_for_owner(&self, owner_id: Uuid) -> ClinicResult<Vec<Appointment>>;
    /// Inserts a new appointment, failing with `SchedulingConflict` if its
    /// window overlaps a blocking appointment of the same veterinarian.
    fn insert_scheduled(&self, appointment: Appointment) -> ClinicResult<Appointment>;
    /// Persists changes to an existing appointment.
    fn save(&self, appointment: Appointment) -> ClinicResult<Appointment>;
}

pub trait PetStore: Send + Sync {
    fn find(&self, id: Uuid) -> ClinicResult<Option<Pet>>;
    fn list_for_owner(&self, owner_id: Uuid) -> ClinicResult<Vec<Pet>>;
    fn save(&self, pet: Pet) -> ClinicResult<Pet>;
}

pub trait UserStore: Send + Sync {
    fn find(&self, id: Uuid) -> ClinicResult<Option<User>>;
    fn save(&self, user: User) -> ClinicResult<User>;
}

pub trait VaccineStore: Send + Sync {
    fn list_for_pet(&self, pet_id: Uuid) -> ClinicResult<Vec<Vaccine>>;
    fn save(&self, vaccine: Vaccine) -> ClinicResult<Vaccine>;
}

pub trait MedicationStore: Send + Sync {
    fn list_for_pet(&self, pet_id: Uuid) -> ClinicResult<Vec<MedicationCourse>>;
    fn save(&self, course: MedicationCourse) -> ClinicResult<MedicationCourse>;
}
