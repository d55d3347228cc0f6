//! Política de roles del scheduler
//!
//! Tabla declarativa operación → roles permitidos, consultada una sola
//! vez en la frontera del facade antes de tocar registry o ledger.
//! Centraliza los chequeos que de otro modo se repetirían en cada
//! operación.

use crate::middleware::auth::AuthenticatedUser;
use crate::models::user::UserRole;
use crate::utils::errors::{AppError, AppResult};

/// Operaciones del scheduler sujetas a política de roles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    CreateSlots,
    ListRouteSlots,
    AssignVehicle,
    SetAssignmentStatus,
    ListPendingAssignments,
    ListApprovedAssignments,
    RemoveAssignment,
}

impl Operation {
    /// Roles permitidos por operación
    pub fn allowed_roles(&self) -> &'static [UserRole] {
        match self {
            Operation::CreateSlots => &[UserRole::SystemAdmin, UserRole::RouteAdmin],
            Operation::ListRouteSlots => &[
                UserRole::SystemAdmin,
                UserRole::RouteAdmin,
                UserRole::FleetManager,
                UserRole::Other,
            ],
            Operation::AssignVehicle => &[UserRole::FleetManager, UserRole::RouteAdmin],
            Operation::SetAssignmentStatus => &[UserRole::RouteAdmin],
            Operation::ListPendingAssignments => &[UserRole::RouteAdmin],
            Operation::ListApprovedAssignments => &[
                UserRole::SystemAdmin,
                UserRole::RouteAdmin,
                UserRole::FleetManager,
                UserRole::Other,
            ],
            Operation::RemoveAssignment => &[UserRole::RouteAdmin, UserRole::FleetManager],
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Operation::CreateSlots => "create slots",
            Operation::ListRouteSlots => "list route slots",
            Operation::AssignVehicle => "assign vehicle",
            Operation::SetAssignmentStatus => "update assignment status",
            Operation::ListPendingAssignments => "list pending assignments",
            Operation::ListApprovedAssignments => "list approved assignments",
            Operation::RemoveAssignment => "remove assignment",
        }
    }
}

/// Verifica si el rol puede ejecutar la operación
pub fn role_allows(role: UserRole, operation: Operation) -> bool {
    operation.allowed_roles().contains(&role)
}

/// Chequeo de permiso en la frontera del facade
pub fn require_permission(user: &AuthenticatedUser, operation: Operation) -> AppResult<()> {
    if role_allows(user.role, operation) {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!(
            "Role '{}' is not allowed to {}",
            user.role.as_str(),
            operation.name()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_ROLES: [UserRole; 4] = [
        UserRole::SystemAdmin,
        UserRole::RouteAdmin,
        UserRole::FleetManager,
        UserRole::Other,
    ];

    const ALL_OPERATIONS: [Operation; 7] = [
        Operation::CreateSlots,
        Operation::ListRouteSlots,
        Operation::AssignVehicle,
        Operation::SetAssignmentStatus,
        Operation::ListPendingAssignments,
        Operation::ListApprovedAssignments,
        Operation::RemoveAssignment,
    ];

    #[test]
    fn test_policy_is_total() {
        // Toda combinación rol/operación tiene una decisión definida
        for role in ALL_ROLES {
            for op in ALL_OPERATIONS {
                let _ = role_allows(role, op);
            }
        }
    }

    #[test]
    fn test_create_slots_restricted_to_admins() {
        assert!(role_allows(UserRole::SystemAdmin, Operation::CreateSlots));
        assert!(role_allows(UserRole::RouteAdmin, Operation::CreateSlots));
        assert!(!role_allows(UserRole::FleetManager, Operation::CreateSlots));
        assert!(!role_allows(UserRole::Other, Operation::CreateSlots));
    }

    #[test]
    fn test_assign_restricted_to_fleet_manager_and_route_admin() {
        assert!(role_allows(UserRole::FleetManager, Operation::AssignVehicle));
        assert!(role_allows(UserRole::RouteAdmin, Operation::AssignVehicle));
        assert!(!role_allows(UserRole::SystemAdmin, Operation::AssignVehicle));
        assert!(!role_allows(UserRole::Other, Operation::AssignVehicle));
    }

    #[test]
    fn test_status_and_pending_are_route_admin_only() {
        for role in ALL_ROLES {
            let expected = role == UserRole::RouteAdmin;
            assert_eq!(role_allows(role, Operation::SetAssignmentStatus), expected);
            assert_eq!(
                role_allows(role, Operation::ListPendingAssignments),
                expected
            );
        }
    }

    #[test]
    fn test_other_role_never_mutates() {
        for op in [
            Operation::CreateSlots,
            Operation::AssignVehicle,
            Operation::SetAssignmentStatus,
            Operation::RemoveAssignment,
        ] {
            assert!(!role_allows(UserRole::Other, op));
        }
    }
}
