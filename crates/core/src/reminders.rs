//! Multi-source reminder aggregation.
//!
//! Builds the dashboard list of "things needing attention" for an owner by
//! combining vaccine doses, upcoming appointments, running medication
//! courses and a synthesized deworming task into one ranked list. Items are
//! derived fresh on every call and never persisted; ordering is computed at
//! aggregation time.
//!
//! The aggregation is read-only and degrades gracefully: a reminder source
//! that references a record outside the owner's pet set is skipped with a
//! warning rather than failing the whole dashboard.

use crate::appointment::AppointmentStatus;
use crate::config::CoreConfig;
use crate::error::ClinicResult;
use crate::pet::Pet;
use crate::store::{AppointmentStore, MedicationStore, PetStore, VaccineStore};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Which source a reminder was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReminderKind {
    Vaccine,
    Appointment,
    Medication,
    Deworming,
}

/// Urgency tier, used only for sort ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReminderPriority {
    Low,
    Normal,
    High,
    Critical,
}

/// A single outstanding item on the owner dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderItem {
    pub kind: ReminderKind,
    pub title: String,
    pub message: String,
    pub due: DateTime<Utc>,
    pub priority: ReminderPriority,
    pub pet_id: Uuid,
    /// The source entity, absent for synthesized reminders.
    pub source_id: Option<Uuid>,
}

/// Bucketed counts over the built reminder list.
///
/// Buckets are keyed by whole-day deltas between the due date and today;
/// `critical` counts priority tiers, not dates. Reminders carry no
/// completed flag in the derived model, so there is nothing to exclude
/// here unless the source item was already closed upstream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderSummary {
    pub overdue: usize,
    pub due_today: usize,
    pub due_this_week: usize,
    pub due_this_month: usize,
    pub critical: usize,
}

/// Ranked reminders plus the parallel summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderReport {
    pub reminders: Vec<ReminderItem>,
    pub summary: ReminderSummary,
}

/// Whole days between `now` and `due`, on calendar dates.
///
/// Negative means overdue. Date-level granularity keeps "due today"
/// stable across the day instead of flipping at the stored time of day.
fn days_until(now: DateTime<Utc>, due: DateTime<Utc>) -> i64 {
    (due.date_naive() - now.date_naive()).num_days()
}

fn vaccine_priority(days: i64) -> ReminderPriority {
    match days {
        d if d < 0 => ReminderPriority::Critical,
        0..=3 => ReminderPriority::High,
        4..=7 => ReminderPriority::Normal,
        _ => ReminderPriority::Low,
    }
}

/// Builds the owner dashboard reminder list.
#[derive(Clone)]
pub struct ReminderAggregator {
    appointments: Arc<dyn AppointmentStore>,
    pets: Arc<dyn PetStore>,
    vaccines: Arc<dyn VaccineStore>,
    medications: Arc<dyn MedicationStore>,
    cfg: Arc<CoreConfig>,
}

impl ReminderAggregator {
    pub fn new(
        appointments: Arc<dyn AppointmentStore>,
        pets: Arc<dyn PetStore>,
        vaccines: Arc<dyn VaccineStore>,
        medications: Arc<dyn MedicationStore>,
        cfg: Arc<CoreConfig>,
    ) -> Self {
        Self {
            appointments,
            pets,
            vaccines,
            medications,
            cfg,
        }
    }

    /// Builds the ranked reminder list and its summary for one owner.
    ///
    /// Sources are scanned in a fixed order (vaccines, appointments,
    /// medications, deworming); the final stable sort orders by priority
    /// descending then due date ascending, so ties beyond that keep the
    /// source-enumeration order.
    pub fn build(&self, owner_id: Uuid, now: DateTime<Utc>) -> ClinicResult<ReminderReport> {
        let pets = self.pets.list_for_owner(owner_id)?;
        let by_id: HashMap<Uuid, &Pet> = pets.iter().map(|p| (p.id, p)).collect();

        let mut reminders = Vec::new();
        self.collect_vaccines(&pets, now, &mut reminders)?;
        self.collect_appointments(owner_id, &by_id, now, &mut reminders)?;
        self.collect_medications(&pets, now, &mut reminders)?;
        self.collect_deworming(&pets, now, &mut reminders);

        // Stable: equal (priority, due) pairs keep source-enumeration order.
        reminders.sort_by(|a, b| b.priority.cmp(&a.priority).then(a.due.cmp(&b.due)));

        let summary = summarise(&reminders, now);
        Ok(ReminderReport { reminders, summary })
    }

    fn collect_vaccines(
        &self,
        pets: &[Pet],
        now: DateTime<Utc>,
        out: &mut Vec<ReminderItem>,
    ) -> ClinicResult<()> {
        for pet in pets {
            for vaccine in self.vaccines.list_for_pet(pet.id)? {
                let Some(due) = vaccine.next_dose_date else {
                    continue;
                };
                let days = days_until(now, due);
                out.push(ReminderItem {
                    kind: ReminderKind::Vaccine,
                    title: format!("Vaccine: {}", vaccine.name),
                    message: if days < 0 {
                        format!(
                            "{}'s {} dose is {} day(s) overdue",
                            pet.name,
                            vaccine.name,
                            -days
                        )
                    } else {
                        format!("{}'s {} dose is due in {} day(s)", pet.name, vaccine.name, days)
                    },
                    due,
                    priority: vaccine_priority(days),
                    pet_id: pet.id,
                    source_id: Some(vaccine.id),
                });
            }
        }
        Ok(())
    }

    fn collect_appointments(
        &self,
        owner_id: Uuid,
        pets: &HashMap<Uuid, &Pet>,
        now: DateTime<Utc>,
        out: &mut Vec<ReminderItem>,
    ) -> ClinicResult<()> {
        let horizon_end = now + self.cfg.appointment_horizon();

        for appointment in self.appointments.list_for_owner(owner_id)? {
            if !matches!(
                appointment.status,
                AppointmentStatus::Scheduled | AppointmentStatus::Confirmed
            ) {
                continue;
            }
            if appointment.start_time < now || appointment.start_time >= horizon_end {
                continue;
            }
            let Some(pet) = pets.get(&appointment.pet_id) else {
                // Stale reference; drop the item, keep the dashboard alive.
                tracing::warn!(
                    appointment_id = %appointment.id,
                    pet_id = %appointment.pet_id,
                    "skipping appointment reminder with unknown pet"
                );
                continue;
            };
            out.push(ReminderItem {
                kind: ReminderKind::Appointment,
                title: format!("Appointment: {}", appointment.reason),
                message: format!(
                    "{} has an appointment on {}",
                    pet.name,
                    appointment.start_time.format("%Y-%m-%d %H:%M")
                ),
                due: appointment.start_time,
                // Always NORMAL regardless of proximity. Unlike vaccines and
                // medications this does not scale with urgency; flagged for
                // product clarification, reproduced as-is until then.
                priority: ReminderPriority::Normal,
                pet_id: appointment.pet_id,
                source_id: Some(appointment.id),
            });
        }
        Ok(())
    }

    fn collect_medications(
        &self,
        pets: &[Pet],
        now: DateTime<Utc>,
        out: &mut Vec<ReminderItem>,
    ) -> ClinicResult<()> {
        for pet in pets {
            for course in self.medications.list_for_pet(pet.id)? {
                if !course.active || course.end_date <= now {
                    continue;
                }
                let days = days_until(now, course.end_date);
                let priority = if days <= self.cfg.medication_urgency_days() {
                    ReminderPriority::High
                } else {
                    ReminderPriority::Normal
                };
                out.push(ReminderItem {
                    kind: ReminderKind::Medication,
                    title: format!("Medication: {}", course.name),
                    message: format!(
                        "{}'s {} course ({}) ends in {} day(s)",
                        pet.name, course.name, course.dosage, days
                    ),
                    due: course.end_date,
                    priority,
                    pet_id: pet.id,
                    source_id: Some(course.id),
                });
            }
        }
        Ok(())
    }

    fn collect_deworming(&self, pets: &[Pet], now: DateTime<Utc>, out: &mut Vec<ReminderItem>) {
        for pet in pets {
            let lapsed = match pet.last_deworming {
                None => true,
                Some(last) => now - last > self.cfg.deworming_interval(),
            };
            if !lapsed {
                continue;
            }
            out.push(ReminderItem {
                kind: ReminderKind::Deworming,
                title: "Deworming due".into(),
                message: match pet.last_deworming {
                    Some(last) => format!(
                        "{} was last dewormed on {}; a new treatment is due",
                        pet.name,
                        last.format("%Y-%m-%d")
                    ),
                    None => format!("{} has no recorded deworming treatment", pet.name),
                },
                due: now + self.cfg.deworming_grace(),
                priority: ReminderPriority::Normal,
                pet_id: pet.id,
                source_id: None,
            });
        }
    }
}

fn summarise(reminders: &[ReminderItem], now: DateTime<Utc>) -> ReminderSummary {
    let mut summary = ReminderSummary::default();
    for item in reminders {
        match days_until(now, item.due) {
            d if d < 0 => summary.overdue += 1,
            0 => summary.due_today += 1,
            1..=7 => summary.due_this_week += 1,
            8..=30 => summary.due_this_month += 1,
            _ => {}
        }
        if item.priority == ReminderPriority::Critical {
            summary.critical += 1;
        }
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::appointment::Appointment;
    use crate::medical::{MedicationCourse, Vaccine};
    use crate::store::MemoryStore;
    use crate::user::{User, UserRole};
    use chrono::{Duration, TimeZone};
    use vetdesk_types::{DurationMinutes, NonEmptyText};

    struct Fixture {
        store: Arc<MemoryStore>,
        aggregator: ReminderAggregator,
        owner: User,
        pet: Pet,
        now: DateTime<Utc>,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let now = Utc.with_ymd_and_hms(2026, 3, 10, 9, 0, 0).unwrap();

        let owner = User::new(
            NonEmptyText::new("Marta Ruiz").unwrap(),
            "marta@example.com".into(),
            UserRole::Owner,
            now,
        );
        crate::store::UserStore::save(store.as_ref(), owner.clone()).unwrap();

        let mut pet = Pet::new(
            owner.id,
            NonEmptyText::new("Luna").unwrap(),
            "dog".into(),
            now,
        );
        // Recently dewormed so the synthesized reminder stays quiet unless a
        // test asks for it.
        pet.last_deworming = Some(now - Duration::days(10));
        PetStore::save(store.as_ref(), pet.clone()).unwrap();

        let aggregator = ReminderAggregator::new(
            store.clone() as Arc<dyn AppointmentStore>,
            store.clone() as Arc<dyn PetStore>,
            store.clone() as Arc<dyn VaccineStore>,
            store.clone() as Arc<dyn MedicationStore>,
            Arc::new(CoreConfig::default()),
        );

        Fixture {
            store,
            aggregator,
            owner,
            pet,
            now,
        }
    }

    fn pending_vaccine(fx: &Fixture, name: &str, due: DateTime<Utc>) -> Vaccine {
        let mut vaccine = Vaccine::new(fx.pet.id, name.into(), fx.now - Duration::days(180));
        vaccine.next_dose_date = Some(due);
        VaccineStore::save(fx.store.as_ref(), vaccine).unwrap()
    }

    fn booked_appointment(fx: &Fixture, start: DateTime<Utc>) -> Appointment {
        let appointment = Appointment::new_scheduled(
            fx.pet.id,
            fx.owner.id,
            Uuid::new_v4(),
            start,
            DurationMinutes::new(30).unwrap(),
            "check-up".into(),
            None,
            fx.now,
        );
        fx.store.insert_scheduled(appointment).unwrap()
    }

    #[test]
    fn overdue_vaccine_is_critical() {
        let fx = fixture();
        pending_vaccine(&fx, "rabies", fx.now - Duration::days(1));

        let report = fx.aggregator.build(fx.owner.id, fx.now).unwrap();
        let vaccine = report
            .reminders
            .iter()
            .find(|r| r.kind == ReminderKind::Vaccine)
            .unwrap();
        assert_eq!(vaccine.priority, ReminderPriority::Critical);
        assert_eq!(report.summary.critical, 1);
        assert_eq!(report.summary.overdue, 1);
    }

    #[test]
    fn vaccine_priority_scales_with_days_until_due() {
        let fx = fixture();
        pending_vaccine(&fx, "A", fx.now + Duration::days(2)); // high
        pending_vaccine(&fx, "B", fx.now + Duration::days(5)); // normal
        pending_vaccine(&fx, "C", fx.now + Duration::days(12)); // low

        let report = fx.aggregator.build(fx.owner.id, fx.now).unwrap();
        let priorities: Vec<_> = report
            .reminders
            .iter()
            .filter(|r| r.kind == ReminderKind::Vaccine)
            .map(|r| (r.title.clone(), r.priority))
            .collect();
        assert!(priorities.contains(&("Vaccine: A".into(), ReminderPriority::High)));
        assert!(priorities.contains(&("Vaccine: B".into(), ReminderPriority::Normal)));
        assert!(priorities.contains(&("Vaccine: C".into(), ReminderPriority::Low)));
    }

    #[test]
    fn near_appointment_stays_normal_priority() {
        // Unlike vaccines, proximity does not raise appointment urgency.
        let fx = fixture();
        booked_appointment(&fx, fx.now + Duration::days(2));

        let report = fx.aggregator.build(fx.owner.id, fx.now).unwrap();
        let appointment = report
            .reminders
            .iter()
            .find(|r| r.kind == ReminderKind::Appointment)
            .unwrap();
        assert_eq!(appointment.priority, ReminderPriority::Normal);
    }

    #[test]
    fn appointments_outside_the_horizon_are_ignored() {
        let fx = fixture();
        booked_appointment(&fx, fx.now + Duration::days(20));
        booked_appointment(&fx, fx.now - Duration::hours(2));

        let report = fx.aggregator.build(fx.owner.id, fx.now).unwrap();
        assert!(report
            .reminders
            .iter()
            .all(|r| r.kind != ReminderKind::Appointment));
    }

    #[test]
    fn cancelled_appointments_produce_no_reminder() {
        let fx = fixture();
        let mut appointment = booked_appointment(&fx, fx.now + Duration::days(2));
        appointment.apply_status(AppointmentStatus::Cancelled, fx.now);
        AppointmentStore::save(fx.store.as_ref(), appointment).unwrap();

        let report = fx.aggregator.build(fx.owner.id, fx.now).unwrap();
        assert!(report
            .reminders
            .iter()
            .all(|r| r.kind != ReminderKind::Appointment));
    }

    #[test]
    fn medication_turns_high_near_course_end() {
        let fx = fixture();
        let soon = MedicationCourse::new(
            fx.pet.id,
            "amoxicillin".into(),
            "250mg twice daily".into(),
            fx.now - Duration::days(5),
            fx.now + Duration::days(2),
        );
        let later = MedicationCourse::new(
            fx.pet.id,
            "omega supplement".into(),
            "one capsule daily".into(),
            fx.now - Duration::days(5),
            fx.now + Duration::days(10),
        );
        MedicationStore::save(fx.store.as_ref(), soon).unwrap();
        MedicationStore::save(fx.store.as_ref(), later).unwrap();

        let report = fx.aggregator.build(fx.owner.id, fx.now).unwrap();
        let by_title: HashMap<_, _> = report
            .reminders
            .iter()
            .filter(|r| r.kind == ReminderKind::Medication)
            .map(|r| (r.title.clone(), r.priority))
            .collect();
        assert_eq!(
            by_title.get("Medication: amoxicillin"),
            Some(&ReminderPriority::High)
        );
        assert_eq!(
            by_title.get("Medication: omega supplement"),
            Some(&ReminderPriority::Normal)
        );
    }

    #[test]
    fn finished_or_inactive_courses_are_ignored() {
        let fx = fixture();
        let finished = MedicationCourse::new(
            fx.pet.id,
            "painkiller".into(),
            "as needed".into(),
            fx.now - Duration::days(20),
            fx.now - Duration::days(2),
        );
        let mut inactive = MedicationCourse::new(
            fx.pet.id,
            "drops".into(),
            "twice daily".into(),
            fx.now - Duration::days(1),
            fx.now + Duration::days(6),
        );
        inactive.active = false;
        MedicationStore::save(fx.store.as_ref(), finished).unwrap();
        MedicationStore::save(fx.store.as_ref(), inactive).unwrap();

        let report = fx.aggregator.build(fx.owner.id, fx.now).unwrap();
        assert!(report
            .reminders
            .iter()
            .all(|r| r.kind != ReminderKind::Medication));
    }

    #[test]
    fn lapsed_or_unrecorded_deworming_synthesizes_a_reminder() {
        let fx = fixture();

        let mut lapsed = fx.pet.clone();
        lapsed.last_deworming = Some(fx.now - Duration::days(120));
        PetStore::save(fx.store.as_ref(), lapsed).unwrap();

        let mut unrecorded = Pet::new(
            fx.owner.id,
            NonEmptyText::new("Milo").unwrap(),
            "cat".into(),
            fx.now,
        );
        unrecorded.last_deworming = None;
        PetStore::save(fx.store.as_ref(), unrecorded).unwrap();

        let report = fx.aggregator.build(fx.owner.id, fx.now).unwrap();
        let deworming: Vec<_> = report
            .reminders
            .iter()
            .filter(|r| r.kind == ReminderKind::Deworming)
            .collect();
        assert_eq!(deworming.len(), 2);
        for item in deworming {
            assert_eq!(item.priority, ReminderPriority::Normal);
            assert_eq!(item.due, fx.now + Duration::days(7));
            assert!(item.source_id.is_none());
        }
    }

    #[test]
    fn recent_deworming_stays_quiet() {
        let fx = fixture();
        let report = fx.aggregator.build(fx.owner.id, fx.now).unwrap();
        assert!(report
            .reminders
            .iter()
            .all(|r| r.kind != ReminderKind::Deworming));
    }

    #[test]
    fn ordering_is_priority_desc_then_due_asc() {
        let fx = fixture();
        pending_vaccine(&fx, "rabies", fx.now - Duration::days(2)); // critical
        pending_vaccine(&fx, "parvo", fx.now + Duration::days(10)); // low
        booked_appointment(&fx, fx.now + Duration::days(1)); // normal
        pending_vaccine(&fx, "lepto", fx.now + Duration::days(1)); // high

        let report = fx.aggregator.build(fx.owner.id, fx.now).unwrap();
        let ordered: Vec<_> = report.reminders.iter().map(|r| r.priority).collect();
        let mut sorted = ordered.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(ordered, sorted, "no lower tier may precede a higher one");

        for pair in report.reminders.windows(2) {
            if pair[0].priority == pair[1].priority {
                assert!(pair[0].due <= pair[1].due);
            }
        }
    }

    #[test]
    fn equal_priority_and_due_keeps_source_enumeration_order() {
        let fx = fixture();
        let due = fx.now + Duration::days(5);
        // Same due instant, both NORMAL: vaccine enumerates before
        // appointment, appointment before medication.
        pending_vaccine(&fx, "bordetella", due);
        booked_appointment(&fx, due);
        let course = MedicationCourse::new(
            fx.pet.id,
            "ear drops".into(),
            "once daily".into(),
            fx.now,
            due,
        );
        MedicationStore::save(fx.store.as_ref(), course).unwrap();

        let report = fx.aggregator.build(fx.owner.id, fx.now).unwrap();
        let normals: Vec<_> = report
            .reminders
            .iter()
            .filter(|r| r.priority == ReminderPriority::Normal && r.due == due)
            .map(|r| r.kind)
            .collect();
        assert_eq!(
            normals,
            vec![
                ReminderKind::Vaccine,
                ReminderKind::Appointment,
                ReminderKind::Medication
            ]
        );
    }

    #[test]
    fn appointment_with_unknown_pet_is_skipped_not_fatal() {
        let fx = fixture();
        let stray = Appointment::new_scheduled(
            Uuid::new_v4(), // pet that is not in the owner's set
            fx.owner.id,
            Uuid::new_v4(),
            fx.now + Duration::days(3),
            DurationMinutes::new(30).unwrap(),
            "follow-up".into(),
            None,
            fx.now,
        );
        fx.store.insert_scheduled(stray).unwrap();
        booked_appointment(&fx, fx.now + Duration::days(2));

        let report = fx.aggregator.build(fx.owner.id, fx.now).unwrap();
        let appointments: Vec<_> = report
            .reminders
            .iter()
            .filter(|r| r.kind == ReminderKind::Appointment)
            .collect();
        assert_eq!(appointments.len(), 1);
        assert_eq!(appointments[0].pet_id, fx.pet.id);
    }

    #[test]
    fn summary_buckets_day_deltas() {
        let fx = fixture();
        pending_vaccine(&fx, "overdue", fx.now - Duration::days(3));
        pending_vaccine(&fx, "today", fx.now + Duration::hours(2));
        pending_vaccine(&fx, "week", fx.now + Duration::days(6));
        pending_vaccine(&fx, "month", fx.now + Duration::days(20));

        let report = fx.aggregator.build(fx.owner.id, fx.now).unwrap();
        assert_eq!(
            report.summary,
            ReminderSummary {
                overdue: 1,
                due_today: 1,
                due_this_week: 1,
                due_this_month: 1,
                critical: 1,
            }
        );
    }

    #[test]
    fn owner_with_no_pets_gets_an_empty_report() {
        let fx = fixture();
        let report = fx.aggregator.build(Uuid::new_v4(), fx.now).unwrap();
        assert!(report.reminders.is_empty());
        assert_eq!(report.summary, ReminderSummary::default());
    }
}
