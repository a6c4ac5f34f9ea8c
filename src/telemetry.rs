use tracing_subscriber::EnvFilter;

/// Filtro cuando `RUST_LOG` no está definido.
pub const DEFAULT_FILTER: &str = "quickadvisor=info,actix_web=info";

/// Inicializa el subscriber global. Llamar una sola vez desde `main`;
/// si ya hay uno instalado (tests) no hace nada.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_target(true).try_init();
}
