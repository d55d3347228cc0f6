//! Controllers de la aplicación
//!
//! Este módulo contiene el facade del scheduler de slots.

pub mod scheduler_controller;
