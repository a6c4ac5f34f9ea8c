use actix_web::{web, HttpResponse, Responder};
use tracing::debug;

use crate::api_json::{resolve_state_subjects, RecomputeRequest};
use super::error_response;
use crate::server::AppState;

/// GET /catalogue
/// Devuelve el programa, los majors y todas las asignaturas con sus requisitos.
pub async fn catalogue_handler(data: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(data.advisor.catalogue())
}

/// POST /recompute
/// Cálculo sin sesión: recibe el estado completo y devuelve la pasada entera.
pub async fn recompute_handler(
    data: web::Data<AppState>,
    body: web::Json<RecomputeRequest>,
) -> HttpResponse {
    let RecomputeRequest { state, options } = body.into_inner();
    let state = match resolve_state_subjects(data.advisor.catalogue(), state) {
        Ok(s) => s,
        Err(e) => return error_response(&e),
    };
    debug!(
        completed = state.completed.len(),
        planned = state.planned.len(),
        ?options,
        "stateless recompute"
    );
    HttpResponse::Ok().json(data.advisor.recompute(&state, &options))
}
