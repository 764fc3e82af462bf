//! In-process [`AppointmentStore`] with the same compare-and-swap
//! discipline as the PostgreSQL store: every occupancy mutation reads a
//! snapshot, applies the pure transition, and commits only if the
//! record's version is unchanged, retrying otherwise. Used by the test
//! suites and for running the service without a database.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tutorsync_core::engine::{self, AppointmentStore};
use tutorsync_core::errors::{TutorError, TutorResult};
use tutorsync_core::models::appointment::{Appointment, FeedbackEntry, SessionReport};
use tutorsync_core::models::free_schedule::FreeSchedule;
use tutorsync_core::models::session::Session;
use uuid::Uuid;

#[derive(Debug, Clone)]
struct Versioned {
    version: u64,
    apt: Appointment,
}

#[derive(Default)]
struct Inner {
    appointments: HashMap<Uuid, Versioned>,
    free_schedules: HashMap<(String, i32), FreeSchedule>,
    sessions: HashMap<String, Session>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a bearer token. In production the SSO integration owns
    /// token issuance; here tests and local runs seed them directly.
    pub async fn seed_session(&self, token: &str, session: Session) {
        let mut inner = self.inner.write().await;
        inner.sessions.insert(token.to_string(), session);
    }

    /// Read a snapshot of one appointment plus its version.
    async fn snapshot(&self, id: Uuid) -> TutorResult<(u64, Appointment)> {
        let inner = self.inner.read().await;
        inner
            .appointments
            .get(&id)
            .map(|v| (v.version, v.apt.clone()))
            .ok_or_else(|| TutorError::NotFound(format!("appointment {id} does not exist")))
    }

    /// Commit `apt` if the stored version still matches `expected`.
    /// Returns false when another writer got there first.
    async fn commit(&self, expected: u64, apt: Appointment) -> TutorResult<bool> {
        let mut inner = self.inner.write().await;
        let slot = inner
            .appointments
            .get_mut(&apt.id)
            .ok_or_else(|| TutorError::NotFound(format!("appointment {} does not exist", apt.id)))?;
        if slot.version != expected {
            return Ok(false);
        }
        slot.version += 1;
        slot.apt = apt;
        Ok(true)
    }

    /// Run one pure transition under compare-and-swap until it commits
    /// or fails a precondition.
    async fn mutate<F>(&self, id: Uuid, mut transition: F) -> TutorResult<Appointment>
    where
        F: FnMut(&mut Appointment) -> TutorResult<()>,
    {
        loop {
            let (version, mut apt) = self.snapshot(id).await?;
            transition(&mut apt)?;
            if self.commit(version, apt.clone()).await? {
                return Ok(apt);
            }
            tracing::debug!("lost compare-and-swap on appointment {}, retrying", id);
        }
    }
}

#[async_trait]
impl AppointmentStore for MemoryStore {
    async fn create_appointment(&self, apt: Appointment) -> TutorResult<Appointment> {
        let mut inner = self.inner.write().await;
        inner
            .appointments
            .insert(apt.id, Versioned { version: 0, apt: apt.clone() });
        Ok(apt)
    }

    async fn get_appointment(&self, id: Uuid) -> TutorResult<Option<Appointment>> {
        let inner = self.inner.read().await;
        Ok(inner.appointments.get(&id).map(|v| v.apt.clone()))
    }

    async fn list_appointments(&self, tutor_id: Option<&str>) -> TutorResult<Vec<Appointment>> {
        let inner = self.inner.read().await;
        let mut appointments: Vec<Appointment> = inner
            .appointments
            .values()
            .filter(|v| tutor_id.map_or(true, |t| v.apt.tutor_id == t))
            .map(|v| v.apt.clone())
            .collect();
        appointments.sort_by_key(|apt| apt.start_time);
        Ok(appointments)
    }

    async fn book(&self, id: Uuid, user_id: &str) -> TutorResult<Appointment> {
        self.mutate(id, |apt| engine::apply_book(apt, user_id)).await
    }

    async fn cancel_booking(&self, id: Uuid, user_id: &str) -> TutorResult<Appointment> {
        let now = Utc::now();
        self.mutate(id, |apt| engine::apply_cancel_booking(apt, user_id, now))
            .await
    }

    async fn close_appointment(&self, id: Uuid) -> TutorResult<Appointment> {
        self.mutate(id, |apt| {
            engine::apply_close(apt);
            Ok(())
        })
        .await
    }

    async fn move_occupant(
        &self,
        from: Uuid,
        to: Uuid,
        user_id: &str,
    ) -> TutorResult<Appointment> {
        if from == to {
            return Err(TutorError::Validation(
                "cannot reschedule into the same appointment".into(),
            ));
        }

        // One critical section covers both appointments: either both
        // transitions commit or neither does.
        let now = Utc::now();
        let mut inner = self.inner.write().await;

        let mut from_apt = inner
            .appointments
            .get(&from)
            .map(|v| v.apt.clone())
            .ok_or_else(|| TutorError::NotFound(format!("appointment {from} does not exist")))?;
        let mut to_apt = inner
            .appointments
            .get(&to)
            .map(|v| v.apt.clone())
            .ok_or_else(|| TutorError::NotFound(format!("appointment {to} does not exist")))?;

        engine::apply_cancel_booking(&mut from_apt, user_id, now)?;
        engine::apply_book(&mut to_apt, user_id)?;

        for apt in [from_apt, to_apt.clone()] {
            if let Some(slot) = inner.appointments.get_mut(&apt.id) {
                slot.version += 1;
                slot.apt = apt;
            }
        }

        Ok(to_apt)
    }

    async fn attach_report(&self, id: Uuid, report: SessionReport) -> TutorResult<Appointment> {
        self.mutate(id, |apt| {
            apt.report = Some(report.clone());
            Ok(())
        })
        .await
    }

    async fn submit_feedback(&self, id: Uuid, entry: FeedbackEntry) -> TutorResult<FeedbackEntry> {
        self.mutate(id, |apt| {
            engine::validate_feedback(apt, &entry)?;
            apt.feedback.push(entry.clone());
            Ok(())
        })
        .await?;
        Ok(entry)
    }

    async fn get_free_schedule(&self, tutor_id: &str, week: i32) -> TutorResult<FreeSchedule> {
        let inner = self.inner.read().await;
        Ok(inner
            .free_schedules
            .get(&(tutor_id.to_string(), week))
            .cloned()
            .unwrap_or_else(|| FreeSchedule::empty(tutor_id, week)))
    }

    async fn replace_free_schedule(&self, schedule: FreeSchedule) -> TutorResult<()> {
        let mut inner = self.inner.write().await;
        inner
            .free_schedules
            .insert((schedule.tutor_id.clone(), schedule.week), schedule);
        Ok(())
    }

    async fn resolve_session(&self, token: &str) -> TutorResult<Option<Session>> {
        let inner = self.inner.read().await;
        Ok(inner.sessions.get(token).cloned())
    }
}
