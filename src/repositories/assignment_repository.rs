//! Repositorio de asignaciones (Assignment Ledger)
//!
//! Acceso a la tabla slot_assignments: creación con control de capacidad,
//! transiciones de aprobación, listados enriquecidos y baja lógica.
//!
//! El conteo de asignaciones por slot es el único recurso compartido en
//! disputa del subsistema. Toda secuencia contar-e-insertar (o contar-y-
//! aprobar) se ejecuta dentro de una transacción que bloquea la fila del
//! slot con SELECT ... FOR UPDATE, de modo que los intentos concurrentes
//! sobre el mismo slot se serializan en el almacenamiento.

use chrono::{DateTime, Utc};
use sqlx::postgres::PgPool;
use sqlx::FromRow;
use uuid::Uuid;

use crate::dto::assignment_dto::{
    AssignmentDetailResponse, FleetSummary, RequesterSummary, SlotSummary, VehicleSummary,
};
use crate::models::route_slot::RouteSlot;
use crate::models::slot_assignment::{AssignmentStatus, SlotAssignment, DEFAULT_PRIORITY};
use crate::utils::errors::{not_found_error, AppError};

pub struct AssignmentRepository {
    pool: PgPool,
}

/// Parámetros de creación de una asignación
pub struct NewAssignment {
    pub slot_id: Uuid,
    pub vehicle_id: Uuid,
    pub fleet_id: Uuid,
    pub assigned_by: Uuid,
    pub initial_status: AssignmentStatus,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub priority: Option<i32>,
}

/// Fila plana de los listados enriquecidos (LEFT JOIN sobre slot,
/// vehículo, flota y solicitante)
#[derive(Debug, FromRow)]
struct EnrichedAssignmentRow {
    id: Uuid,
    slot_id: Uuid,
    vehicle_id: Uuid,
    fleet_id: Uuid,
    route_id: Uuid,
    assigned_by: Uuid,
    status: String,
    start_date: DateTime<Utc>,
    end_date: Option<DateTime<Utc>>,
    priority: i32,
    approved_at: Option<DateTime<Utc>>,
    approved_by: Option<Uuid>,
    rejected_at: Option<DateTime<Utc>>,
    rejected_by: Option<Uuid>,
    rejection_reason: Option<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
    s_id: Option<Uuid>,
    s_route_id: Option<Uuid>,
    s_slot_number: Option<i32>,
    s_departure_time: Option<chrono::NaiveTime>,
    s_arrival_time: Option<chrono::NaiveTime>,
    s_slot_type: Option<String>,
    s_max_capacity: Option<i32>,
    v_id: Option<Uuid>,
    v_vehicle_number: Option<String>,
    v_vehicle_type: Option<String>,
    v_status: Option<String>,
    f_id: Option<Uuid>,
    f_name: Option<String>,
    f_phone: Option<String>,
    u_id: Option<Uuid>,
    u_full_name: Option<String>,
}

impl From<EnrichedAssignmentRow> for AssignmentDetailResponse {
    fn from(row: EnrichedAssignmentRow) -> Self {
        let assignment = SlotAssignment {
            id: row.id,
            slot_id: row.slot_id,
            vehicle_id: row.vehicle_id,
            fleet_id: row.fleet_id,
            route_id: row.route_id,
            assigned_by: row.assigned_by,
            status: row.status,
            start_date: row.start_date,
            end_date: row.end_date,
            priority: row.priority,
            approved_at: row.approved_at,
            approved_by: row.approved_by,
            rejected_at: row.rejected_at,
            rejected_by: row.rejected_by,
            rejection_reason: row.rejection_reason,
            is_active: row.is_active,
            created_at: row.created_at,
        };

        let slot = match (
            row.s_id,
            row.s_route_id,
            row.s_slot_number,
            row.s_departure_time,
            row.s_arrival_time,
            row.s_slot_type,
            row.s_max_capacity,
        ) {
            (
                Some(id),
                Some(route_id),
                Some(slot_number),
                Some(departure_time),
                Some(arrival_time),
                Some(slot_type),
                Some(max_capacity),
            ) => Some(SlotSummary {
                id,
                route_id,
                slot_number,
                departure_time,
                arrival_time,
                slot_type,
                max_capacity,
            }),
            _ => None,
        };

        let vehicle = match (row.v_id, row.v_vehicle_number, row.v_vehicle_type, row.v_status) {
            (Some(id), Some(vehicle_number), Some(vehicle_type), Some(status)) => {
                Some(VehicleSummary {
                    id,
                    vehicle_number,
                    vehicle_type,
                    status,
                })
            }
            _ => None,
        };

        let fleet = match (row.f_id, row.f_name) {
            (Some(id), Some(name)) => Some(FleetSummary {
                id,
                name,
                phone: row.f_phone,
            }),
            _ => None,
        };

        let requested_by = match (row.u_id, row.u_full_name) {
            (Some(id), Some(full_name)) => Some(RequesterSummary { id, full_name }),
            _ => None,
        };

        AssignmentDetailResponse {
            assignment,
            slot,
            vehicle,
            fleet,
            requested_by,
        }
    }
}

const ENRICHED_SELECT: &str = r#"
    SELECT a.id, a.slot_id, a.vehicle_id, a.fleet_id, a.route_id, a.assigned_by,
           a.status, a.start_date, a.end_date, a.priority,
           a.approved_at, a.approved_by,
           a.rejected_at, a.rejected_by, a.rejection_reason,
           a.is_active, a.created_at,
           s.id AS s_id, s.route_id AS s_route_id, s.slot_number AS s_slot_number,
           s.departure_time AS s_departure_time, s.arrival_time AS s_arrival_time,
           s.slot_type AS s_slot_type, s.max_capacity AS s_max_capacity,
           v.id AS v_id, v.vehicle_number AS v_vehicle_number,
           v.vehicle_type AS v_vehicle_type, v.status AS v_status,
           f.id AS f_id, f.name AS f_name, f.phone AS f_phone,
           u.id AS u_id, u.full_name AS u_full_name
    FROM slot_assignments a
    LEFT JOIN route_slots s ON s.id = a.slot_id
    LEFT JOIN vehicles v ON v.id = a.vehicle_id
    LEFT JOIN fleets f ON f.id = a.fleet_id
    LEFT JOIN users u ON u.id = a.assigned_by
"#;

impl AssignmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Crear una asignación con control de capacidad.
    ///
    /// La secuencia contar-e-insertar corre dentro de una transacción que
    /// bloquea la fila del slot, así dos requests concurrentes sobre el
    /// mismo slot no pueden pasar ambas el chequeo de capacidad.
    pub async fn create(&self, new: NewAssignment) -> Result<SlotAssignment, AppError> {
        let mut tx = self.pool.begin().await?;

        let slot = sqlx::query_as::<_, RouteSlot>(
            "SELECT * FROM route_slots WHERE id = $1 FOR UPDATE",
        )
        .bind(new.slot_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| not_found_error("Slot", &new.slot_id.to_string()))?;

        let occupied = Self::count_capacity_holders(&mut tx, new.slot_id).await?;
        if capacity_reached(occupied, slot.max_capacity) {
            return Err(AppError::CapacityExceeded(format!(
                "Slot {} is at full capacity ({}/{})",
                slot.id, occupied, slot.max_capacity
            )));
        }

        let assignment = sqlx::query_as::<_, SlotAssignment>(
            r#"
            INSERT INTO slot_assignments (
                id, slot_id, vehicle_id, fleet_id, route_id, assigned_by,
                status, start_date, end_date, priority, is_active, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, true, $11)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new.slot_id)
        .bind(new.vehicle_id)
        .bind(new.fleet_id)
        .bind(slot.route_id)
        .bind(new.assigned_by)
        .bind(new.initial_status.as_str())
        .bind(new.start_date.unwrap_or_else(Utc::now))
        .bind(new.end_date)
        .bind(new.priority.unwrap_or(DEFAULT_PRIORITY))
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(assignment)
    }

    /// Buscar una asignación por id
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<SlotAssignment>, AppError> {
        let assignment =
            sqlx::query_as::<_, SlotAssignment>("SELECT * FROM slot_assignments WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(assignment)
    }

    /// Aprobar una asignación. Estampa approved_at/approved_by y limpia
    /// los campos de rechazo.
    ///
    /// Si la asignación todavía no ocupa capacidad (pending/rejected), la
    /// aprobación re-verifica la capacidad del slot bajo el mismo bloqueo
    /// de fila que usa la creación: aprobar en serie varias solicitudes
    /// pendientes no puede sobrepasar max_capacity. Re-aprobar una
    /// asignación ya aprobada solo refresca el sello de aprobación.
    pub async fn approve(
        &self,
        id: Uuid,
        approved_by: Uuid,
    ) -> Result<SlotAssignment, AppError> {
        let mut tx = self.pool.begin().await?;

        let mut current = sqlx::query_as::<_, SlotAssignment>(
            "SELECT * FROM slot_assignments WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| not_found_error("Assignment", &id.to_string()))?;

        // Una asignación dada de baja nunca se reactiva: hay que crear una nueva
        if !current.can_change_status() {
            return Err(AppError::BadRequest(format!(
                "Assignment {} is inactive and cannot be approved",
                id
            )));
        }

        if !current.holds_capacity() {
            let slot = sqlx::query_as::<_, RouteSlot>(
                "SELECT * FROM route_slots WHERE id = $1 FOR UPDATE",
            )
            .bind(current.slot_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| not_found_error("Slot", &current.slot_id.to_string()))?;

            let occupied = Self::count_capacity_holders(&mut tx, current.slot_id).await?;
            if capacity_reached(occupied, slot.max_capacity) {
                return Err(AppError::CapacityExceeded(format!(
                    "Slot {} is at full capacity ({}/{}), cannot approve assignment {}",
                    slot.id, occupied, slot.max_capacity, id
                )));
            }
        }

        current.apply_approval(approved_by, Utc::now());

        let updated = sqlx::query_as::<_, SlotAssignment>(
            r#"
            UPDATE slot_assignments
            SET status = $2,
                approved_at = $3,
                approved_by = $4,
                rejected_at = NULL,
                rejected_by = NULL,
                rejection_reason = NULL
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&current.status)
        .bind(current.approved_at)
        .bind(current.approved_by)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(updated)
    }

    /// Rechazar una asignación. Estampa rejected_at/rejected_by/
    /// rejection_reason y limpia los campos de aprobación. Igual que la
    /// aprobación, una asignación inactiva ya no puede rechazarse.
    pub async fn reject(
        &self,
        id: Uuid,
        rejected_by: Uuid,
        reason: Option<String>,
    ) -> Result<SlotAssignment, AppError> {
        let mut tx = self.pool.begin().await?;

        let mut current = sqlx::query_as::<_, SlotAssignment>(
            "SELECT * FROM slot_assignments WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| not_found_error("Assignment", &id.to_string()))?;

        if !current.can_change_status() {
            return Err(AppError::BadRequest(format!(
                "Assignment {} is inactive and cannot be rejected",
                id
            )));
        }

        current.apply_rejection(rejected_by, Utc::now(), reason);

        let updated = sqlx::query_as::<_, SlotAssignment>(
            r#"
            UPDATE slot_assignments
            SET status = $2,
                rejected_at = $3,
                rejected_by = $4,
                rejection_reason = $5,
                approved_at = NULL,
                approved_by = NULL
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&current.status)
        .bind(current.rejected_at)
        .bind(current.rejected_by)
        .bind(current.rejection_reason.clone())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(updated)
    }

    /// Baja lógica: status = inactive, is_active = false. Es inocuo
    /// aplicarla sobre una asignación ya inactiva.
    pub async fn remove(&self, id: Uuid) -> Result<SlotAssignment, AppError> {
        let mut current = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Assignment", &id.to_string()))?;

        current.apply_removal();

        let updated = sqlx::query_as::<_, SlotAssignment>(
            r#"
            UPDATE slot_assignments
            SET status = $2, is_active = $3
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&current.status)
        .bind(current.is_active)
        .fetch_one(&self.pool)
        .await?;

        Ok(updated)
    }

    /// Listado enriquecido de asignaciones pendientes, las más recientes
    /// primero (prioridad como desempate)
    pub async fn list_pending(&self) -> Result<Vec<AssignmentDetailResponse>, AppError> {
        let sql = format!(
            "{} WHERE a.status = 'pending' AND a.is_active \
             ORDER BY a.created_at DESC, a.priority DESC",
            ENRICHED_SELECT
        );

        let rows = sqlx::query_as::<_, EnrichedAssignmentRow>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(AssignmentDetailResponse::from).collect())
    }

    /// Listado enriquecido de asignaciones aprobadas/activas, ordenado
    /// por la hora de salida del slot
    pub async fn list_approved(
        &self,
        route_id: Option<Uuid>,
    ) -> Result<Vec<AssignmentDetailResponse>, AppError> {
        let rows = match route_id {
            Some(route_id) => {
                let sql = format!(
                    "{} WHERE a.status IN ('approved', 'active') AND a.is_active \
                     AND a.route_id = $1 \
                     ORDER BY s.departure_time ASC",
                    ENRICHED_SELECT
                );
                sqlx::query_as::<_, EnrichedAssignmentRow>(&sql)
                    .bind(route_id)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let sql = format!(
                    "{} WHERE a.status IN ('approved', 'active') AND a.is_active \
                     ORDER BY s.departure_time ASC",
                    ENRICHED_SELECT
                );
                sqlx::query_as::<_, EnrichedAssignmentRow>(&sql)
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        Ok(rows.into_iter().map(AssignmentDetailResponse::from).collect())
    }

    /// Asignaciones que ocupan capacidad de cualquiera de los slots dados
    pub async fn list_capacity_holders_for_slots(
        &self,
        slot_ids: &[Uuid],
    ) -> Result<Vec<SlotAssignment>, AppError> {
        let assignments = sqlx::query_as::<_, SlotAssignment>(
            r#"
            SELECT * FROM slot_assignments
            WHERE slot_id = ANY($1)
              AND status IN ('approved', 'active')
              AND is_active
            ORDER BY priority DESC, created_at ASC
            "#,
        )
        .bind(slot_ids.to_vec())
        .fetch_all(&self.pool)
        .await?;

        Ok(assignments)
    }

    /// Conteo de asignaciones que ocupan capacidad del slot. Debe
    /// ejecutarse con la fila del slot ya bloqueada por la transacción.
    async fn count_capacity_holders(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        slot_id: Uuid,
    ) -> Result<i64, AppError> {
        let (count,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM slot_assignments
            WHERE slot_id = $1
              AND status IN ('approved', 'active')
              AND is_active
            "#,
        )
        .bind(slot_id)
        .fetch_one(&mut **tx)
        .await?;

        Ok(count)
    }
}

/// El chequeo de cupo que aplican la creación y la aprobación: el slot
/// está lleno cuando las asignaciones que ocupan capacidad igualan o
/// superan max_capacity.
fn capacity_reached(occupied: i64, max_capacity: i32) -> bool {
    occupied >= max_capacity as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_reached_at_bound() {
        assert!(!capacity_reached(0, 1));
        assert!(capacity_reached(1, 1));
        assert!(!capacity_reached(2, 3));
        assert!(capacity_reached(3, 3));
    }

    #[test]
    fn test_capacity_reached_when_over_allocated() {
        // Un slot puede quedar sobre-ocupado si se redujo max_capacity
        assert!(capacity_reached(2, 1));
    }
}
