use anyhow::Result;
use dotenvy::dotenv;
use std::net::SocketAddr;
use tokio::signal;
use tracing::{error, info};

use transit_slot_scheduler::config::environment::EnvironmentConfig;
use transit_slot_scheduler::database::DatabaseConnection;
use transit_slot_scheduler::routes::create_app;
use transit_slot_scheduler::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    // Configurar logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    info!("🚌 Transit Slot Scheduler - API de slots y asignaciones");
    info!("=======================================================");

    // Inicializar base de datos
    let db_connection = match DatabaseConnection::new_default().await {
        Ok(conn) => conn,
        Err(e) => {
            error!("❌ Error conectando a la base de datos: {}", e);
            return Err(anyhow::anyhow!("Error de base de datos: {}", e));
        }
    };

    let pool = db_connection.pool().clone();
    let config = EnvironmentConfig::default();
    let app_state = AppState::new(pool, config.clone());

    let app = create_app(app_state);

    // Puerto del servidor
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET    /health - Health check");
    info!("🗓  Endpoints - Slots:");
    info!("   POST   /api/routes/:route_id/slots - Crear slots en batch");
    info!("   GET    /api/routes/:route_id/slots - Slots activos con disponibilidad");
    info!("🚐 Endpoints - Asignaciones:");
    info!("   POST   /api/slot-assignments - Asignar vehículo a slot");
    info!("   PATCH  /api/slot-assignments/:id/status - Aprobar/rechazar");
    info!("   GET    /api/slot-assignments/pending - Solicitudes pendientes");
    info!("   GET    /api/slot-assignments/approved - Asignaciones aprobadas");
    info!("   DELETE /api/slot-assignments/:id - Baja lógica de asignación");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| {
            error!("❌ Error del servidor: {}", e);
            anyhow::anyhow!(e)
        })?;

    info!("👋 Servidor terminado");
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
