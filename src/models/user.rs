//! Modelo de usuario y roles
//!
//! El scheduler no gestiona usuarios: recibe un contexto autenticado
//! {id, rol} producido por el middleware de autenticación.

use serde::{Deserialize, Serialize};

/// Rol del usuario autenticado
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    SystemAdmin,
    RouteAdmin,
    FleetManager,
    /// Cualquier rol desconocido se trata como `other` para que los
    /// chequeos de permisos sigan siendo totales.
    #[serde(other)]
    Other,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::SystemAdmin => "system_admin",
            UserRole::RouteAdmin => "route_admin",
            UserRole::FleetManager => "fleet_manager",
            UserRole::Other => "other",
        }
    }

    /// Parsear un rol desde el claim del JWT
    pub fn from_claim(value: &str) -> Self {
        match value {
            "system_admin" => UserRole::SystemAdmin,
            "route_admin" => UserRole::RouteAdmin,
            "fleet_manager" => UserRole::FleetManager,
            _ => UserRole::Other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_claim_known_roles() {
        assert_eq!(UserRole::from_claim("system_admin"), UserRole::SystemAdmin);
        assert_eq!(UserRole::from_claim("route_admin"), UserRole::RouteAdmin);
        assert_eq!(UserRole::from_claim("fleet_manager"), UserRole::FleetManager);
    }

    #[test]
    fn test_from_claim_unknown_role_is_other() {
        assert_eq!(UserRole::from_claim("driver"), UserRole::Other);
        assert_eq!(UserRole::from_claim(""), UserRole::Other);
    }
}
