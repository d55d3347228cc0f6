//! Rutas HTTP del scheduler de slots
//!
//! Handlers finos que delegan en el SchedulerController. El middleware
//! de autenticación inyecta el AuthenticatedUser en las extensions.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, patch, post},
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::controllers::scheduler_controller::SchedulerController;
use crate::dto::assignment_dto::{
    AssignRequest, AssignmentActionRequest, AssignmentDetailResponse, ApprovedFilter,
};
use crate::dto::slot_dto::{CreateSlotsRequest, CreateSlotsResponse, SlotWithAvailability};
use crate::dto::ApiResponse;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::slot_assignment::SlotAssignment;
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Router de slots por ruta: /api/routes/:route_id/slots
pub fn create_route_slots_router() -> Router<AppState> {
    Router::new()
        .route("/:route_id/slots", post(create_slots))
        .route("/:route_id/slots", get(get_route_slots))
}

/// Router de asignaciones: /api/slot-assignments
pub fn create_assignments_router() -> Router<AppState> {
    Router::new()
        .route("/", post(assign_vehicle))
        .route("/pending", get(list_pending))
        .route("/approved", get(list_approved))
        .route("/:id/status", patch(set_assignment_status))
        .route("/:id", delete(remove_assignment))
}

async fn create_slots(
    Extension(user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    Path(route_id): Path<Uuid>,
    Json(request): Json<CreateSlotsRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CreateSlotsResponse>>), AppError> {
    let controller = SchedulerController::new(state.pool.clone());
    let response = controller.create_slots(&user, route_id, request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn get_route_slots(
    Extension(user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    Path(route_id): Path<Uuid>,
) -> Result<Json<Vec<SlotWithAvailability>>, AppError> {
    let controller = SchedulerController::new(state.pool.clone());
    let response = controller
        .get_route_slots_with_availability(&user, route_id)
        .await?;
    Ok(Json(response))
}

async fn assign_vehicle(
    Extension(user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    Json(request): Json<AssignRequest>,
) -> Result<(StatusCode, Json<ApiResponse<SlotAssignment>>), AppError> {
    let controller = SchedulerController::new(state.pool.clone());
    let response = controller.assign(&user, request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn set_assignment_status(
    Extension(user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<AssignmentActionRequest>,
) -> Result<Json<ApiResponse<SlotAssignment>>, AppError> {
    let controller = SchedulerController::new(state.pool.clone());
    let response = controller.set_assignment_status(&user, id, request).await?;
    Ok(Json(response))
}

async fn list_pending(
    Extension(user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
) -> Result<Json<Vec<AssignmentDetailResponse>>, AppError> {
    let controller = SchedulerController::new(state.pool.clone());
    let response = controller.list_pending(&user).await?;
    Ok(Json(response))
}

async fn list_approved(
    Extension(user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    Query(filter): Query<ApprovedFilter>,
) -> Result<Json<Vec<AssignmentDetailResponse>>, AppError> {
    let controller = SchedulerController::new(state.pool.clone());
    let response = controller.list_approved(&user, filter.route_id).await?;
    Ok(Json(response))
}

async fn remove_assignment(
    Extension(user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<SlotAssignment>>, AppError> {
    let controller = SchedulerController::new(state.pool.clone());
    let response = controller.remove_assignment(&user, id).await?;
    Ok(Json(response))
}
