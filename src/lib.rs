// Biblioteca raíz del crate `quickadvisor`.
// Motor de asesoría de asignaturas (distancias, elegibilidad, carga y
// diagnósticos) más la API HTTP que lo expone.
pub mod models;
pub mod error;
pub mod algorithm;
pub mod catalogue;
pub mod config;
pub mod telemetry;
pub mod api_json;
mod server_handlers;
pub mod server;

pub use algorithm::{Advisor, PlanOptions, Recomputation, Session, ToggleMode, ToggleOutcome};
pub use catalogue::{get_catalogue_cached, load_catalogue};
pub use config::Settings;
pub use error::{AdvisorError, Rejection};
pub use models::{Catalogue, Diagnostics, Distance, StudentState};

/// Ejecuta el servidor HTTP (reexport para facilitar uso desde `main`)
pub use server::run_server;
