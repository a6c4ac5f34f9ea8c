use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tracing::info;

use crate::algorithm::{Advisor, Session};
use crate::catalogue::get_catalogue_cached;
use crate::config::Settings;
use crate::error::AdvisorError;
use crate::models::StudentState;
use crate::server_handlers::{
    add_credit_handler, catalogue_handler, create_session_handler, diagnostics_handler, get_session_handler,
    help_handler, load_handler, major_handler, override_handler, recompute_handler, remove_credit_handler,
    toggle_handler,
};

/// Estado compartido entre workers: el motor (inmutable) y la tabla de sesiones.
/// Las sesiones viven sólo en memoria.
pub struct AppState {
    pub advisor: Arc<Advisor>,
    sessions: Mutex<HashMap<u64, Session>>,
    next_id: AtomicU64,
}

impl AppState {
    pub fn new(advisor: Arc<Advisor>) -> Self {
        Self {
            advisor,
            sessions: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn open_session(&self, state: StudentState) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let session = Session::new(Arc::clone(&self.advisor), state);
        let mut guard = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        guard.insert(id, session);
        id
    }

    /// Ejecuta `f` sobre la sesión `id` con la tabla bloqueada.
    pub fn with_session<R, F>(&self, id: u64, f: F) -> Result<R, AdvisorError>
    where
        F: FnOnce(&mut Session) -> R,
    {
        let mut guard = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        let session = guard.get_mut(&id).ok_or(AdvisorError::UnknownSession(id))?;
        Ok(f(session))
    }
}

/// Registra todas las rutas; compartido por `run_server` y los tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/catalogue", web::get().to(catalogue_handler))
        .route("/recompute", web::post().to(recompute_handler))
        .route("/sessions", web::post().to(create_session_handler))
        .route("/sessions/{id}", web::get().to(get_session_handler))
        .route("/sessions/{id}/toggle", web::post().to(toggle_handler))
        .route("/sessions/{id}/major", web::post().to(major_handler))
        .route("/sessions/{id}/load", web::post().to(load_handler))
        .route("/sessions/{id}/override", web::post().to(override_handler))
        .route("/sessions/{id}/credits", web::post().to(add_credit_handler))
        .route("/sessions/{id}/credits", web::delete().to(remove_credit_handler))
        .route("/sessions/{id}/diagnostics", web::get().to(diagnostics_handler))
        .route("/help", web::get().to(help_handler));
}

pub async fn run_server(settings: Settings) -> std::io::Result<()> {
    let path = settings.catalogue_path();
    // La lectura del workbook es bloqueante; se hace fuera del runtime.
    let load_path = path.clone();
    let catalogue = tokio::task::spawn_blocking(move || get_catalogue_cached(&load_path))
        .await
        .map_err(std::io::Error::other)?
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    let advisor = Arc::new(Advisor::new(catalogue));
    let state = web::Data::new(AppState::new(advisor));

    info!(bind = %settings.bind, catalogue = %path.display(), workers = settings.workers, "starting server");

    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .workers(settings.workers)
    .bind(settings.bind.as_str())?
    .run()
    .await
}
