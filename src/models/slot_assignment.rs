//! Modelo de SlotAssignment
//!
//! Una asignación vincula un vehículo (vía su flota) a un slot para un
//! rango de fechas, con un ciclo de aprobación en dos pasos:
//! el fleet manager la solicita y el route admin la aprueba o rechaza.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Estado de una asignación - se persiste como texto en la columna status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentStatus {
    Pending,
    Approved,
    Rejected,
    Active,
    Inactive,
}

impl AssignmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignmentStatus::Pending => "pending",
            AssignmentStatus::Approved => "approved",
            AssignmentStatus::Rejected => "rejected",
            AssignmentStatus::Active => "active",
            AssignmentStatus::Inactive => "inactive",
        }
    }

    /// Estados que ocupan capacidad del slot
    pub fn holds_capacity(&self) -> bool {
        matches!(self, AssignmentStatus::Approved | AssignmentStatus::Active)
    }
}

/// SlotAssignment - mapea exactamente a la tabla slot_assignments
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SlotAssignment {
    pub id: Uuid,
    pub slot_id: Uuid,
    pub vehicle_id: Uuid,
    pub fleet_id: Uuid,
    /// Copia desnormalizada de route_id del slot; los slots nunca cambian
    /// de ruta, así que la copia no puede quedar obsoleta.
    pub route_id: Uuid,
    pub assigned_by: Uuid,
    pub status: String,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub priority: i32,
    pub approved_at: Option<DateTime<Utc>>,
    pub approved_by: Option<Uuid>,
    pub rejected_at: Option<DateTime<Utc>>,
    pub rejected_by: Option<Uuid>,
    pub rejection_reason: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl SlotAssignment {
    /// Los metadatos de aprobación y rechazo son mutuamente excluyentes
    pub fn approval_fields_consistent(&self) -> bool {
        let has_approval = self.approved_at.is_some() || self.approved_by.is_some();
        let has_rejection = self.rejected_at.is_some()
            || self.rejected_by.is_some()
            || self.rejection_reason.is_some();
        !(has_approval && has_rejection)
    }

    /// Una asignación dada de baja no vuelve a transicionar:
    /// hay que crear una asignación nueva
    pub fn can_change_status(&self) -> bool {
        self.is_active
    }

    /// Si la asignación ya ocupa capacidad del slot, re-aprobarla no
    /// requiere re-verificar la capacidad
    pub fn holds_capacity(&self) -> bool {
        matches!(self.status.as_str(), "approved" | "active") && self.is_active
    }

    /// Aprobar: estampa approved_at/approved_by y limpia los campos de
    /// rechazo. El UPDATE del repositorio escribe exactamente estos campos.
    pub fn apply_approval(&mut self, approved_by: Uuid, approved_at: DateTime<Utc>) {
        self.status = AssignmentStatus::Approved.as_str().to_string();
        self.approved_at = Some(approved_at);
        self.approved_by = Some(approved_by);
        self.rejected_at = None;
        self.rejected_by = None;
        self.rejection_reason = None;
    }

    /// Rechazar: estampa rejected_at/rejected_by/rejection_reason y
    /// limpia los campos de aprobación.
    pub fn apply_rejection(
        &mut self,
        rejected_by: Uuid,
        rejected_at: DateTime<Utc>,
        reason: Option<String>,
    ) {
        self.status = AssignmentStatus::Rejected.as_str().to_string();
        self.rejected_at = Some(rejected_at);
        self.rejected_by = Some(rejected_by);
        self.rejection_reason = reason;
        self.approved_at = None;
        self.approved_by = None;
    }

    /// Baja lógica. Inocua si la asignación ya estaba inactiva.
    pub fn apply_removal(&mut self) {
        self.status = AssignmentStatus::Inactive.as_str().to_string();
        self.is_active = false;
    }
}

pub const DEFAULT_PRIORITY: i32 = 1;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn pending_assignment() -> SlotAssignment {
        SlotAssignment {
            id: Uuid::new_v4(),
            slot_id: Uuid::new_v4(),
            vehicle_id: Uuid::new_v4(),
            fleet_id: Uuid::new_v4(),
            route_id: Uuid::new_v4(),
            assigned_by: Uuid::new_v4(),
            status: AssignmentStatus::Pending.as_str().to_string(),
            start_date: Utc::now(),
            end_date: None,
            priority: 1,
            approved_at: None,
            approved_by: None,
            rejected_at: None,
            rejected_by: None,
            rejection_reason: None,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_holds_capacity() {
        assert!(AssignmentStatus::Approved.holds_capacity());
        assert!(AssignmentStatus::Active.holds_capacity());
        assert!(!AssignmentStatus::Pending.holds_capacity());
        assert!(!AssignmentStatus::Rejected.holds_capacity());
        assert!(!AssignmentStatus::Inactive.holds_capacity());
    }

    #[test]
    fn test_approval_clears_rejection_fields() {
        let mut a = pending_assignment();
        a.apply_rejection(Uuid::new_v4(), Utc::now(), Some("no seats".to_string()));
        assert_eq!(a.status, "rejected");
        assert!(a.approval_fields_consistent());

        a.apply_approval(Uuid::new_v4(), Utc::now());
        assert_eq!(a.status, "approved");
        assert!(a.approved_at.is_some());
        assert!(a.approved_by.is_some());
        assert!(a.rejected_at.is_none());
        assert!(a.rejected_by.is_none());
        assert!(a.rejection_reason.is_none());
        assert!(a.approval_fields_consistent());
    }

    #[test]
    fn test_rejection_clears_approval_fields() {
        let mut a = pending_assignment();
        a.apply_approval(Uuid::new_v4(), Utc::now());

        a.apply_rejection(Uuid::new_v4(), Utc::now(), Some("vehicle in repair".to_string()));
        assert_eq!(a.status, "rejected");
        assert!(a.rejected_at.is_some());
        assert!(a.rejected_by.is_some());
        assert_eq!(a.rejection_reason.as_deref(), Some("vehicle in repair"));
        assert!(a.approved_at.is_none());
        assert!(a.approved_by.is_none());
        assert!(a.approval_fields_consistent());
    }

    #[test]
    fn test_reapproval_refreshes_timestamp() {
        let mut a = pending_assignment();
        let first = Utc::now();
        let second = first + Duration::seconds(30);

        a.apply_approval(Uuid::new_v4(), first);
        a.apply_approval(Uuid::new_v4(), second);

        assert_eq!(a.status, "approved");
        assert_eq!(a.approved_at, Some(second));
        assert!(a.approval_fields_consistent());
    }

    #[test]
    fn test_removal_from_any_status() {
        for status in [
            AssignmentStatus::Pending,
            AssignmentStatus::Approved,
            AssignmentStatus::Rejected,
            AssignmentStatus::Active,
            AssignmentStatus::Inactive,
        ] {
            let mut a = pending_assignment();
            a.status = status.as_str().to_string();
            a.apply_removal();
            assert_eq!(a.status, "inactive");
            assert!(!a.is_active);
        }
    }

    #[test]
    fn test_removal_is_idempotent() {
        let mut a = pending_assignment();
        a.apply_removal();
        a.apply_removal();
        assert_eq!(a.status, "inactive");
        assert!(!a.is_active);
    }

    #[test]
    fn test_inactive_assignment_cannot_change_status() {
        let mut a = pending_assignment();
        assert!(a.can_change_status());

        a.apply_removal();
        assert!(!a.can_change_status());
        // Tampoco ocupa capacidad aunque alguien la marque aprobada por fuera
        a.status = "approved".to_string();
        assert!(!a.holds_capacity());
    }

    #[test]
    fn test_status_as_str_roundtrip() {
        for status in [
            AssignmentStatus::Pending,
            AssignmentStatus::Approved,
            AssignmentStatus::Rejected,
            AssignmentStatus::Active,
            AssignmentStatus::Inactive,
        ] {
            let serialized = serde_json::to_string(&status).unwrap();
            assert_eq!(serialized, format!("\"{}\"", status.as_str()));
        }
    }
}
