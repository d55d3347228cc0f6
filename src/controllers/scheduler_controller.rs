//! Controller del scheduler de slots (facade)
//!
//! Superficie de operaciones del subsistema: compone Slot Registry y
//! Assignment Ledger bajo la política de roles. Todos los chequeos de
//! permisos se hacen aquí, una sola vez, antes de despachar.

use std::collections::HashMap;

use uuid::Uuid;
use validator::Validate;

use crate::dto::assignment_dto::{
    AssignRequest, AssignmentActionRequest, AssignmentDetailResponse, ACTION_APPROVE,
    ACTION_REJECT,
};
use crate::dto::slot_dto::{CreateSlotsRequest, CreateSlotsResponse, SlotWithAvailability};
use crate::dto::ApiResponse;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::slot_assignment::{AssignmentStatus, SlotAssignment};
use crate::models::user::UserRole;
use crate::repositories::assignment_repository::{AssignmentRepository, NewAssignment};
use crate::repositories::slot_repository::SlotRepository;
use crate::services::policy::{require_permission, Operation};
use crate::utils::errors::{AppError, AppResult};

pub struct SchedulerController {
    slots: SlotRepository,
    assignments: AssignmentRepository,
}

impl SchedulerController {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self {
            slots: SlotRepository::new(pool.clone()),
            assignments: AssignmentRepository::new(pool),
        }
    }

    /// Crear slots en batch para una ruta
    pub async fn create_slots(
        &self,
        user: &AuthenticatedUser,
        route_id: Uuid,
        request: CreateSlotsRequest,
    ) -> AppResult<ApiResponse<CreateSlotsResponse>> {
        require_permission(user, Operation::CreateSlots)?;
        request.validate_all()?;

        let requested = request.slots.len();
        let created = self
            .slots
            .create_slots(route_id, user.user_id, &request.slots)
            .await?;

        let message = format!("{} of {} slots created", created.len(), requested);
        Ok(ApiResponse::success_with_message(
            CreateSlotsResponse {
                requested,
                created: created.len(),
                slots: created,
            },
            message,
        ))
    }

    /// Slots activos de una ruta con sus asignaciones vigentes y la
    /// capacidad disponible calculada (sin recortar valores negativos)
    pub async fn get_route_slots_with_availability(
        &self,
        user: &AuthenticatedUser,
        route_id: Uuid,
    ) -> AppResult<Vec<SlotWithAvailability>> {
        require_permission(user, Operation::ListRouteSlots)?;

        let slots = self.slots.list_active_by_route(route_id).await?;
        if slots.is_empty() {
            return Ok(Vec::new());
        }

        let slot_ids: Vec<Uuid> = slots.iter().map(|s| s.id).collect();
        let holders = self
            .assignments
            .list_capacity_holders_for_slots(&slot_ids)
            .await?;

        Ok(compose_availability(slots, holders))
    }

    /// Asignar un vehículo a un slot. El route admin se auto-aprueba;
    /// el fleet manager queda pendiente de aprobación.
    pub async fn assign(
        &self,
        user: &AuthenticatedUser,
        request: AssignRequest,
    ) -> AppResult<ApiResponse<SlotAssignment>> {
        require_permission(user, Operation::AssignVehicle)?;
        request.validate()?;

        let initial_status = initial_status_for(user.role);

        let assignment = self
            .assignments
            .create(NewAssignment {
                slot_id: request.slot_id,
                vehicle_id: request.vehicle_id,
                fleet_id: request.fleet_id,
                assigned_by: user.user_id,
                initial_status,
                start_date: request.start_date,
                end_date: request.end_date,
                priority: request.priority,
            })
            .await?;

        let message = match initial_status {
            AssignmentStatus::Approved => "Vehicle assigned and approved".to_string(),
            _ => "Assignment request created, pending approval".to_string(),
        };

        Ok(ApiResponse::success_with_message(assignment, message))
    }

    /// Aprobar o rechazar una asignación
    pub async fn set_assignment_status(
        &self,
        user: &AuthenticatedUser,
        assignment_id: Uuid,
        request: AssignmentActionRequest,
    ) -> AppResult<ApiResponse<SlotAssignment>> {
        require_permission(user, Operation::SetAssignmentStatus)?;

        match request.action.as_str() {
            ACTION_APPROVE => {
                let updated = self.assignments.approve(assignment_id, user.user_id).await?;
                Ok(ApiResponse::success_with_message(
                    updated,
                    "Assignment approved".to_string(),
                ))
            }
            ACTION_REJECT => {
                let updated = self
                    .assignments
                    .reject(assignment_id, user.user_id, request.reason)
                    .await?;
                Ok(ApiResponse::success_with_message(
                    updated,
                    "Assignment rejected".to_string(),
                ))
            }
            other => Err(AppError::BadRequest(format!(
                "Invalid action '{}': expected 'approve' or 'reject'",
                other
            ))),
        }
    }

    /// Listado de solicitudes pendientes (solo route admin)
    pub async fn list_pending(
        &self,
        user: &AuthenticatedUser,
    ) -> AppResult<Vec<AssignmentDetailResponse>> {
        require_permission(user, Operation::ListPendingAssignments)?;
        self.assignments.list_pending().await
    }

    /// Listado de asignaciones aprobadas/activas, opcionalmente por ruta
    pub async fn list_approved(
        &self,
        user: &AuthenticatedUser,
        route_id: Option<Uuid>,
    ) -> AppResult<Vec<AssignmentDetailResponse>> {
        require_permission(user, Operation::ListApprovedAssignments)?;
        self.assignments.list_approved(route_id).await
    }

    /// Baja lógica de una asignación
    pub async fn remove_assignment(
        &self,
        user: &AuthenticatedUser,
        assignment_id: Uuid,
    ) -> AppResult<ApiResponse<SlotAssignment>> {
        require_permission(user, Operation::RemoveAssignment)?;

        let removed = self.assignments.remove(assignment_id).await?;
        Ok(ApiResponse::success_with_message(
            removed,
            "Assignment removed".to_string(),
        ))
    }
}

/// Estado inicial según el rol: el route admin se auto-aprueba
fn initial_status_for(role: UserRole) -> AssignmentStatus {
    if role == UserRole::RouteAdmin {
        AssignmentStatus::Approved
    } else {
        AssignmentStatus::Pending
    }
}

/// Componer cada slot con sus asignaciones vigentes y la capacidad
/// restante. Un valor negativo indica sobreasignación y se expone tal
/// cual, sin recortar.
fn compose_availability(
    slots: Vec<crate::models::route_slot::RouteSlot>,
    holders: Vec<SlotAssignment>,
) -> Vec<SlotWithAvailability> {
    let mut by_slot: HashMap<Uuid, Vec<SlotAssignment>> = HashMap::new();
    for assignment in holders {
        by_slot.entry(assignment.slot_id).or_default().push(assignment);
    }

    slots
        .into_iter()
        .map(|slot| {
            let assignments = by_slot.remove(&slot.id).unwrap_or_default();
            let available_capacity = slot.max_capacity - assignments.len() as i32;
            SlotWithAvailability {
                slot,
                assignments,
                available_capacity,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveTime, Utc};
    use crate::models::route_slot::RouteSlot;

    fn slot(max_capacity: i32) -> RouteSlot {
        RouteSlot {
            id: Uuid::new_v4(),
            route_id: Uuid::new_v4(),
            slot_number: 1,
            departure_time: NaiveTime::from_hms_opt(7, 30, 0).unwrap(),
            arrival_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            buffer_minutes: 15,
            days_of_week: vec!["monday".to_string()],
            slot_type: "regular".to_string(),
            max_capacity,
            is_active: true,
            created_by: Uuid::new_v4(),
            created_at: Utc::now(),
        }
    }

    fn holder_for(slot: &RouteSlot) -> SlotAssignment {
        SlotAssignment {
            id: Uuid::new_v4(),
            slot_id: slot.id,
            vehicle_id: Uuid::new_v4(),
            fleet_id: Uuid::new_v4(),
            route_id: slot.route_id,
            assigned_by: Uuid::new_v4(),
            status: "approved".to_string(),
            start_date: Utc::now(),
            end_date: None,
            priority: 1,
            approved_at: Some(Utc::now()),
            approved_by: Some(Uuid::new_v4()),
            rejected_at: None,
            rejected_by: None,
            rejection_reason: None,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_route_admin_self_approves() {
        assert_eq!(
            initial_status_for(UserRole::RouteAdmin),
            AssignmentStatus::Approved
        );
        assert_eq!(
            initial_status_for(UserRole::FleetManager),
            AssignmentStatus::Pending
        );
        assert_eq!(
            initial_status_for(UserRole::SystemAdmin),
            AssignmentStatus::Pending
        );
    }

    #[test]
    fn test_available_capacity_computation() {
        let s = slot(3);
        let holders = vec![holder_for(&s), holder_for(&s)];
        let composed = compose_availability(vec![s], holders);

        assert_eq!(composed.len(), 1);
        assert_eq!(composed[0].assignments.len(), 2);
        assert_eq!(composed[0].available_capacity, 1);
    }

    #[test]
    fn test_slot_without_assignments_has_full_capacity() {
        let s = slot(2);
        let composed = compose_availability(vec![s], vec![]);

        assert_eq!(composed[0].assignments.len(), 0);
        assert_eq!(composed[0].available_capacity, 2);
    }

    #[test]
    fn test_overallocation_surfaces_negative_capacity() {
        // Datos sobreasignados por fuera del subsistema: no se recorta a 0
        let s = slot(1);
        let holders = vec![holder_for(&s), holder_for(&s), holder_for(&s)];
        let composed = compose_availability(vec![s], holders);

        assert_eq!(composed[0].available_capacity, -2);
    }

    #[test]
    fn test_assignments_grouped_by_slot() {
        let s1 = slot(2);
        let s2 = slot(2);
        let holders = vec![holder_for(&s1), holder_for(&s2), holder_for(&s2)];
        let composed = compose_availability(vec![s1, s2], holders);

        assert_eq!(composed[0].assignments.len(), 1);
        assert_eq!(composed[1].assignments.len(), 2);
        assert_eq!(composed[0].available_capacity, 1);
        assert_eq!(composed[1].available_capacity, 0);
    }
}
