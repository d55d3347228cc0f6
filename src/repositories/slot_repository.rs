//! Repositorio de slots (Slot Registry)
//!
//! Acceso a la tabla route_slots: creación en batch y listado de slots
//! activos de una ruta.

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::slot_dto::SlotSpec;
use crate::models::route_slot::RouteSlot;
use crate::utils::errors::AppError;

pub struct SlotRepository {
    pool: PgPool,
}

impl SlotRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Crear los slots de un batch. Cada inserción es independiente:
    /// un fallo no revierte las anteriores. Los fallos individuales se
    /// registran en el log y el facade reporta cuántos se crearon.
    pub async fn create_slots(
        &self,
        route_id: Uuid,
        created_by: Uuid,
        specs: &[SlotSpec],
    ) -> Result<Vec<RouteSlot>, AppError> {
        let mut created = Vec::with_capacity(specs.len());

        for spec in specs {
            let result = sqlx::query_as::<_, RouteSlot>(
                r#"
                INSERT INTO route_slots (
                    id, route_id, slot_number, departure_time, arrival_time,
                    buffer_minutes, days_of_week, slot_type, max_capacity,
                    is_active, created_by, created_at
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
                RETURNING *
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(route_id)
            .bind(spec.slot_number)
            .bind(spec.departure_time)
            .bind(spec.arrival_time)
            .bind(spec.buffer_minutes_or_default())
            .bind(&spec.days_of_week)
            .bind(spec.slot_type_or_default())
            .bind(spec.max_capacity_or_default())
            .bind(spec.is_active_or_default())
            .bind(created_by)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await;

            match result {
                Ok(slot) => created.push(slot),
                Err(e) => {
                    tracing::error!(
                        "Error creating slot {} for route {}: {}",
                        spec.slot_number,
                        route_id,
                        e
                    );
                }
            }
        }

        Ok(created)
    }

    /// Buscar un slot por id
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<RouteSlot>, AppError> {
        let slot = sqlx::query_as::<_, RouteSlot>("SELECT * FROM route_slots WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(slot)
    }

    /// Listar los slots activos de una ruta, ordenados por slot_number
    pub async fn list_active_by_route(&self, route_id: Uuid) -> Result<Vec<RouteSlot>, AppError> {
        let slots = sqlx::query_as::<_, RouteSlot>(
            r#"
            SELECT * FROM route_slots
            WHERE route_id = $1 AND is_active
            ORDER BY slot_number ASC
            "#,
        )
        .bind(route_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(slots)
    }
}
