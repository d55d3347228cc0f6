//! Modelo de RouteSlot
//!
//! Un slot es una ventana de servicio recurrente sobre una ruta, con
//! capacidad acotada de vehículos. Los horarios son horas del día
//! (no timestamps completos); la recurrencia se expresa con days_of_week.

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// RouteSlot - mapea exactamente a la tabla route_slots
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RouteSlot {
    pub id: Uuid,
    pub route_id: Uuid,
    /// Posición dentro de la ruta, no es único globalmente
    pub slot_number: i32,
    pub departure_time: NaiveTime,
    pub arrival_time: NaiveTime,
    pub buffer_minutes: i32,
    pub days_of_week: Vec<String>,
    pub slot_type: String,
    pub max_capacity: i32,
    pub is_active: bool,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Tipo de slot por defecto. El conjunto es abierto (regular | express |
/// special entre los conocidos): un valor distinto se persiste tal cual.
pub const SLOT_TYPE_REGULAR: &str = "regular";

pub const DEFAULT_BUFFER_MINUTES: i32 = 15;
pub const DEFAULT_MAX_CAPACITY: i32 = 1;
