//! DTOs de slots
//!
//! Requests y responses para la creación y el listado de slots de ruta.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::route_slot::{
    RouteSlot, DEFAULT_BUFFER_MINUTES, DEFAULT_MAX_CAPACITY, SLOT_TYPE_REGULAR,
};
use crate::models::slot_assignment::SlotAssignment;

/// Especificación de un slot dentro del batch de creación
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SlotSpec {
    pub slot_number: i32,

    pub departure_time: NaiveTime,

    pub arrival_time: NaiveTime,

    /// Minutos de margen alrededor de la ventana (default 15)
    #[validate(range(min = 0, max = 720))]
    pub buffer_minutes: Option<i32>,

    pub days_of_week: Vec<String>,

    /// regular | express | special (conjunto abierto, default regular)
    pub slot_type: Option<String>,

    #[validate(range(min = 1))]
    pub max_capacity: Option<i32>,

    pub is_active: Option<bool>,
}

impl SlotSpec {
    pub fn buffer_minutes_or_default(&self) -> i32 {
        self.buffer_minutes.unwrap_or(DEFAULT_BUFFER_MINUTES)
    }

    pub fn slot_type_or_default(&self) -> String {
        self.slot_type
            .clone()
            .unwrap_or_else(|| SLOT_TYPE_REGULAR.to_string())
    }

    pub fn max_capacity_or_default(&self) -> i32 {
        self.max_capacity.unwrap_or(DEFAULT_MAX_CAPACITY)
    }

    /// Activo salvo que se indique explícitamente lo contrario
    pub fn is_active_or_default(&self) -> bool {
        self.is_active.unwrap_or(true)
    }
}

/// Request para crear slots en batch
#[derive(Debug, Deserialize, Validate)]
pub struct CreateSlotsRequest {
    #[validate(length(min = 1, message = "at least one slot spec is required"))]
    pub slots: Vec<SlotSpec>,
}

impl CreateSlotsRequest {
    /// Validar el batch y cada especificación individual
    pub fn validate_all(&self) -> Result<(), validator::ValidationErrors> {
        self.validate()?;
        for spec in &self.slots {
            spec.validate()?;
        }
        Ok(())
    }
}

/// Response de la creación en batch. La creación de cada slot es
/// independiente: un fallo parcial no revierte los anteriores, por eso
/// se reportan los contadores.
#[derive(Debug, Serialize)]
pub struct CreateSlotsResponse {
    pub requested: usize,
    pub created: usize,
    pub slots: Vec<RouteSlot>,
}

/// Slot con sus asignaciones vigentes y la capacidad disponible calculada.
/// `available_capacity` puede ser negativo si el slot quedó sobreasignado
/// por fuera de este subsistema; se expone sin recortar para que los
/// operadores puedan detectarlo.
#[derive(Debug, Serialize)]
pub struct SlotWithAvailability {
    #[serde(flatten)]
    pub slot: RouteSlot,
    pub assignments: Vec<SlotAssignment>,
    pub available_capacity: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(max_capacity: Option<i32>) -> SlotSpec {
        SlotSpec {
            slot_number: 1,
            departure_time: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            arrival_time: NaiveTime::from_hms_opt(10, 30, 0).unwrap(),
            buffer_minutes: None,
            days_of_week: vec!["monday".to_string(), "friday".to_string()],
            slot_type: None,
            max_capacity,
            is_active: None,
        }
    }

    #[test]
    fn test_slot_spec_defaults() {
        let s = spec(None);
        assert_eq!(s.buffer_minutes_or_default(), 15);
        assert_eq!(s.slot_type_or_default(), "regular");
        assert_eq!(s.max_capacity_or_default(), 1);
        assert!(s.is_active_or_default());
    }

    #[test]
    fn test_slot_spec_explicit_values_win() {
        let mut s = spec(Some(4));
        s.buffer_minutes = Some(30);
        s.slot_type = Some("express".to_string());
        s.is_active = Some(false);
        assert_eq!(s.buffer_minutes_or_default(), 30);
        assert_eq!(s.slot_type_or_default(), "express");
        assert_eq!(s.max_capacity_or_default(), 4);
        assert!(!s.is_active_or_default());
    }

    #[test]
    fn test_empty_batch_fails_validation() {
        let request = CreateSlotsRequest { slots: vec![] };
        assert!(request.validate_all().is_err());
    }

    #[test]
    fn test_zero_capacity_fails_validation() {
        let request = CreateSlotsRequest {
            slots: vec![spec(Some(0))],
        };
        assert!(request.validate_all().is_err());
    }

    #[test]
    fn test_valid_batch_passes_validation() {
        let request = CreateSlotsRequest {
            slots: vec![spec(None), spec(Some(3))],
        };
        assert!(request.validate_all().is_ok());
    }
}
