//! Transit Slot Scheduler
//!
//! Backend de reservas de transporte: definición de slots por ruta con
//! capacidad acotada y flujo de aprobación de asignaciones de vehículos.

pub mod config;
pub mod controllers;
pub mod database;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;
