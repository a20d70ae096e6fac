// SPDX-FileCopyrightText: 2026 Agendo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Booking engine: create, cancel, and reschedule appointments.
//!
//! There is no lock over the external calendar, so the availability
//! engine is re-run synchronously at commit time; that recheck is the
//! only double-booking guard. A race inside the validation window
//! itself is an accepted gap. Calendar writes are best effort: the
//! local appointment record stays authoritative and calendar failures
//! only produce warnings.

use std::sync::Arc;

use chrono::{Duration, Local, NaiveDate, NaiveTime, Utc};
use tracing::warn;
use uuid::Uuid;

use agendo_core::domain::{Appointment, AppointmentStatus, Resource, Service, User};
use agendo_core::types::NewCalendarEvent;
use agendo_core::{AgendoError, CalendarPort, Storage};

use crate::availability::AvailabilityEngine;

/// Booking engine settings.
#[derive(Debug, Clone)]
pub struct BookingSettings {
    /// Alternatives offered when a requested time is unavailable.
    pub max_alternatives: usize,
    /// Fallback booking window when the business does not set one.
    pub booking_window_days: u32,
    /// IANA time zone attached to created calendar events.
    pub time_zone: String,
}

/// A request to book a service at a concrete time.
#[derive(Debug, Clone)]
pub struct BookingRequest {
    pub user_id: String,
    pub branch_id: String,
    pub service_name: String,
    pub resource_name: String,
    pub date: NaiveDate,
    pub start: NaiveTime,
}

/// Result of a create attempt.
#[derive(Debug)]
pub enum BookingOutcome {
    Confirmed(Box<Appointment>),
    /// The request could not be honored; `message` explains why and
    /// `alternatives` offers other start times when any exist.
    Rejected {
        message: String,
        alternatives: Vec<NaiveTime>,
    },
}

/// Result of a cancel attempt. Re-cancelling is a friendly no-op.
#[derive(Debug)]
pub enum CancelOutcome {
    Cancelled(Box<Appointment>),
    AlreadyCancelled(Box<Appointment>),
    NotFound,
}

/// Result of a reschedule attempt.
#[derive(Debug)]
pub enum RescheduleOutcome {
    Moved {
        appointment: Box<Appointment>,
        previous_date: NaiveDate,
        previous_start: NaiveTime,
    },
    Rejected {
        message: String,
        alternatives: Vec<NaiveTime>,
    },
    NotFound,
}

/// Creates, cancels, and reschedules appointments with commit-time
/// re-validation.
pub struct BookingEngine {
    storage: Arc<dyn Storage>,
    calendar: Arc<dyn CalendarPort>,
    availability: AvailabilityEngine,
    settings: BookingSettings,
}

impl BookingEngine {
    pub fn new(
        storage: Arc<dyn Storage>,
        calendar: Arc<dyn CalendarPort>,
        availability: AvailabilityEngine,
        settings: BookingSettings,
    ) -> Self {
        Self {
            storage,
            calendar,
            availability,
            settings,
        }
    }

    /// Books an appointment, re-validating availability at commit time.
    pub async fn create(&self, request: &BookingRequest) -> Result<BookingOutcome, AgendoError> {
        let Some(user) = self.storage.get_user(&request.user_id).await? else {
            // A business id passed where a user id belongs is the
            // assistant's most common confusion; call it out directly.
            if self.storage.get_business(&request.user_id).await?.is_some() {
                return Ok(reject(format!(
                    "ERROR: '{}' es el ID del negocio, no de un usuario. Usa el user_id \
                     devuelto por find_or_create_user.",
                    request.user_id
                )));
            }
            return Ok(reject(format!(
                "No existe un usuario con id '{}'. Registra primero al usuario con \
                 find_or_create_user.",
                request.user_id
            )));
        };

        let Some(service) = self
            .storage
            .find_service_by_name(&request.branch_id, &request.service_name)
            .await?
        else {
            let names: Vec<String> = self
                .storage
                .list_services(&request.branch_id)
                .await?
                .into_iter()
                .map(|s| s.name)
                .collect();
            let message = if names.is_empty() {
                format!("No encontré el servicio '{}'.", request.service_name)
            } else {
                format!(
                    "No encontré el servicio '{}'. Disponibles: {}.",
                    request.service_name,
                    names.join(", ")
                )
            };
            return Ok(reject(message));
        };

        let Some(resource) = self
            .storage
            .find_resource_by_name(&request.branch_id, &request.resource_name)
            .await?
        else {
            return Ok(reject(format!(
                "No encontré al empleado '{}'.",
                request.resource_name
            )));
        };

        if let Some(message) = self.date_guard(&request.branch_id, request.date).await? {
            return Ok(reject(message));
        }

        let duration = service.duration_minutes;
        let end = end_time(request.date, request.start, duration);

        // Commit-time re-validation: the only double-booking guard.
        let slots = self
            .availability
            .slots_for_resource(&resource, request.date, duration)
            .await?;
        if !slots.contains(&request.start) {
            if slots.is_empty() {
                return Ok(reject(format!(
                    "No hay horarios disponibles para el {} con {}.",
                    request.date, resource.name
                )));
            }
            return Ok(BookingOutcome::Rejected {
                message: format!(
                    "Lo siento, las {} no está disponible.",
                    request.start.format("%H:%M")
                ),
                alternatives: self.take_alternatives(slots),
            });
        }

        let external_event_id = self
            .create_external_event(&resource, &service, &user, request, end, false)
            .await;

        let now = Utc::now().naive_utc();
        let appointment = Appointment {
            id: Uuid::new_v4().to_string(),
            user_id: user.id.clone(),
            resource_id: resource.id.clone(),
            service_id: service.id.clone(),
            branch_id: request.branch_id.clone(),
            service_name_snapshot: service.name.clone(),
            service_price_snapshot: service.price,
            service_duration_snapshot: duration,
            resource_name_snapshot: resource.name.clone(),
            date: request.date,
            start_time: request.start,
            end_time: end,
            external_event_id,
            status: AppointmentStatus::Scheduled,
            cancellation_reason: None,
            cancelled_at: None,
            cancelled_by: None,
            created_at: now,
            updated_at: now,
        };
        self.storage.create_appointment(&appointment).await?;

        Ok(BookingOutcome::Confirmed(Box::new(appointment)))
    }

    /// Cancels an appointment. Idempotent on already-cancelled ones.
    pub async fn cancel(
        &self,
        appointment_id: &str,
        reason: &str,
        actor: &str,
    ) -> Result<CancelOutcome, AgendoError> {
        let Some(appointment) = self.storage.get_appointment(appointment_id).await? else {
            return Ok(CancelOutcome::NotFound);
        };
        if appointment.status == AppointmentStatus::Cancelled {
            return Ok(CancelOutcome::AlreadyCancelled(Box::new(appointment)));
        }

        if let Some(event_id) = &appointment.external_event_id {
            self.delete_external_event(&appointment.resource_id, event_id)
                .await;
        }

        self.storage
            .cancel_appointment(appointment_id, reason, actor, Utc::now().naive_utc())
            .await?;

        let cancelled = self
            .storage
            .get_appointment(appointment_id)
            .await?
            .ok_or_else(|| AgendoError::Internal("cancelled appointment vanished".into()))?;
        Ok(CancelOutcome::Cancelled(Box::new(cancelled)))
    }

    /// Moves an appointment to a new date/time after re-validating.
    pub async fn reschedule(
        &self,
        appointment_id: &str,
        new_date: NaiveDate,
        new_start: NaiveTime,
    ) -> Result<RescheduleOutcome, AgendoError> {
        let Some(appointment) = self.storage.get_appointment(appointment_id).await? else {
            return Ok(RescheduleOutcome::NotFound);
        };
        if appointment.status != AppointmentStatus::Scheduled {
            return Ok(RescheduleOutcome::Rejected {
                message: "Solo se pueden reagendar citas activas.".into(),
                alternatives: Vec::new(),
            });
        }

        let Some(resource) = self.storage.get_resource(&appointment.resource_id).await? else {
            return Ok(RescheduleOutcome::Rejected {
                message: "El empleado de la cita ya no está disponible.".into(),
                alternatives: Vec::new(),
            });
        };

        if let Some(message) = self.date_guard(&appointment.branch_id, new_date).await? {
            return Ok(RescheduleOutcome::Rejected {
                message,
                alternatives: Vec::new(),
            });
        }

        let duration = appointment.service_duration_snapshot;
        let slots = self
            .availability
            .slots_for_resource(&resource, new_date, duration)
            .await?;
        if !slots.contains(&new_start) {
            if slots.is_empty() {
                return Ok(RescheduleOutcome::Rejected {
                    message: format!("No hay horarios disponibles para el {new_date}."),
                    alternatives: Vec::new(),
                });
            }
            return Ok(RescheduleOutcome::Rejected {
                message: format!(
                    "Lo siento, las {} no está disponible.",
                    new_start.format("%H:%M")
                ),
                alternatives: self.take_alternatives(slots),
            });
        }

        // Best effort: drop the old event, recreate at the new time.
        if let Some(event_id) = &appointment.external_event_id {
            self.delete_external_event(&appointment.resource_id, event_id)
                .await;
        }
        let end = end_time(new_date, new_start, duration);
        let new_event_id = match self.storage.get_user(&appointment.user_id).await? {
            Some(user) => {
                let request = BookingRequest {
                    user_id: user.id.clone(),
                    branch_id: appointment.branch_id.clone(),
                    service_name: appointment.service_name_snapshot.clone(),
                    resource_name: resource.name.clone(),
                    date: new_date,
                    start: new_start,
                };
                self.create_external_event(
                    &resource,
                    &service_snapshot(&appointment),
                    &user,
                    &request,
                    end,
                    true,
                )
                .await
            }
            None => None,
        };

        self.storage
            .reschedule_appointment(
                appointment_id,
                new_date,
                new_start,
                end,
                new_event_id.as_deref(),
            )
            .await?;

        let moved = self
            .storage
            .get_appointment(appointment_id)
            .await?
            .ok_or_else(|| AgendoError::Internal("rescheduled appointment vanished".into()))?;
        Ok(RescheduleOutcome::Moved {
            appointment: Box::new(moved),
            previous_date: appointment.date,
            previous_start: appointment.start_time,
        })
    }

    /// Rejects past dates and dates beyond the booking window.
    async fn date_guard(
        &self,
        branch_id: &str,
        date: NaiveDate,
    ) -> Result<Option<String>, AgendoError> {
        let today = Local::now().date_naive();
        if date < today {
            return Ok(Some(
                "No puedo agendar en fechas pasadas. Por favor elige una fecha futura.".into(),
            ));
        }

        let window_days = match self.storage.get_branch(branch_id).await? {
            Some(branch) => self
                .storage
                .get_business(&branch.business_id)
                .await?
                .map(|b| b.booking_window_days)
                .unwrap_or(self.settings.booking_window_days),
            None => self.settings.booking_window_days,
        };
        if (date - today).num_days() > i64::from(window_days) {
            return Ok(Some(format!(
                "Solo puedo agendar dentro de los próximos {window_days} días."
            )));
        }
        Ok(None)
    }

    fn take_alternatives(&self, slots: Vec<NaiveTime>) -> Vec<NaiveTime> {
        slots.into_iter().take(self.settings.max_alternatives).collect()
    }

    async fn create_external_event(
        &self,
        resource: &Resource,
        service: &Service,
        user: &User,
        request: &BookingRequest,
        end: NaiveTime,
        rescheduled: bool,
    ) -> Option<String> {
        let suffix = if rescheduled { " [Reagendada]" } else { "" };
        let event = NewCalendarEvent {
            title: format!(
                "{} - {} ({}){}",
                service.name, user.full_name, user.identification_number, suffix
            ),
            description: Some(format!(
                "Cita agendada via asistente\nCliente: {}\nCédula: {}\nTeléfono: {}",
                user.full_name, user.identification_number, user.phone_number
            )),
            start: request.date.and_time(request.start),
            end: request.date.and_time(end),
            time_zone: self.settings.time_zone.clone(),
        };
        match self
            .calendar
            .create_event(&resource.external_calendar_id, event)
            .await
        {
            Ok(id) => Some(id),
            Err(e) => {
                warn!(error = %e, "calendar event creation failed, keeping local record only");
                None
            }
        }
    }

    async fn delete_external_event(&self, resource_id: &str, event_id: &str) {
        let calendar_id = match self.storage.get_resource(resource_id).await {
            Ok(Some(resource)) => resource.external_calendar_id,
            Ok(None) => {
                warn!(resource_id, "resource gone, skipping calendar event deletion");
                return;
            }
            Err(e) => {
                warn!(error = %e, "resource lookup failed, skipping calendar event deletion");
                return;
            }
        };
        if let Err(e) = self.calendar.delete_event(&calendar_id, event_id).await {
            warn!(error = %e, "calendar event deletion failed, keeping local record");
        }
    }
}

fn reject(message: String) -> BookingOutcome {
    BookingOutcome::Rejected {
        message,
        alternatives: Vec::new(),
    }
}

fn end_time(date: NaiveDate, start: NaiveTime, duration_minutes: u32) -> NaiveTime {
    (date.and_time(start) + Duration::minutes(i64::from(duration_minutes))).time()
}

/// A `Service` view reconstructed from an appointment's snapshot
/// fields, for event recreation on reschedule.
fn service_snapshot(appointment: &Appointment) -> Service {
    Service {
        id: appointment.service_id.clone(),
        branch_id: appointment.branch_id.clone(),
        category_id: String::new(),
        name: appointment.service_name_snapshot.clone(),
        description: None,
        price: appointment.service_price_snapshot,
        duration_minutes: appointment.service_duration_snapshot,
        is_active: true,
    }
}
