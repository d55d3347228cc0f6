//! DTOs de asignaciones
//!
//! Requests del flujo de asignación/aprobación y responses enriquecidas
//! con el slot, el vehículo, la flota y el solicitante.

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::models::slot_assignment::SlotAssignment;

/// Request para asignar un vehículo a un slot
#[derive(Debug, Deserialize, Validate)]
pub struct AssignRequest {
    pub slot_id: Uuid,
    pub vehicle_id: Uuid,
    pub fleet_id: Uuid,

    /// Default: momento actual
    pub start_date: Option<DateTime<Utc>>,

    /// Ausente = asignación sin fecha de fin
    pub end_date: Option<DateTime<Utc>>,

    /// Orden de desempate en listados (default 1)
    #[validate(range(min = 1))]
    pub priority: Option<i32>,
}

/// Acciones válidas sobre el estado de una asignación
pub const ACTION_APPROVE: &str = "approve";
pub const ACTION_REJECT: &str = "reject";

/// Request para aprobar o rechazar una asignación
#[derive(Debug, Deserialize)]
pub struct AssignmentActionRequest {
    pub action: String,
    pub reason: Option<String>,
}

/// Subconjunto del slot para listados enriquecidos
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SlotSummary {
    pub id: Uuid,
    pub route_id: Uuid,
    pub slot_number: i32,
    pub departure_time: NaiveTime,
    pub arrival_time: NaiveTime,
    pub slot_type: String,
    pub max_capacity: i32,
}

/// Subconjunto del vehículo para listados enriquecidos
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleSummary {
    pub id: Uuid,
    pub vehicle_number: String,
    pub vehicle_type: String,
    pub status: String,
}

/// Subconjunto de la flota para listados enriquecidos
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FleetSummary {
    pub id: Uuid,
    pub name: String,
    pub phone: Option<String>,
}

/// Identidad del usuario que solicitó la asignación
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequesterSummary {
    pub id: Uuid,
    pub full_name: String,
}

/// Asignación enriquecida para los listados de pendientes y aprobadas
#[derive(Debug, Serialize)]
pub struct AssignmentDetailResponse {
    #[serde(flatten)]
    pub assignment: SlotAssignment,
    pub slot: Option<SlotSummary>,
    pub vehicle: Option<VehicleSummary>,
    pub fleet: Option<FleetSummary>,
    pub requested_by: Option<RequesterSummary>,
}

/// Filtro opcional para el listado de aprobadas
#[derive(Debug, Deserialize)]
pub struct ApprovedFilter {
    pub route_id: Option<Uuid>,
}
