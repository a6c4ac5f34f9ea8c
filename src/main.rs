// --- Asesor de asignaturas - Archivo principal ---

use quickadvisor::{run_server, telemetry, Settings};
use tracing::info;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    telemetry::init_tracing();
    let settings = Settings::from_env();
    info!("=== Asesor de asignaturas (API) ===");
    info!("Iniciando servidor en http://{}", settings.bind);
    run_server(settings).await
}
