// Handlers de sesión: cada uno toma el lock de la tabla, aplica una sola
// mutación (que recalcula todo) y responde con la instantánea resultante.

use actix_web::{web, HttpResponse, Responder};
use serde_json::json;
use tracing::info;

use super::error_response;
use crate::api_json::{
    resolve_state_subjects, CreditRequest, LoadRequest, MajorRequest, NewSessionRequest, OverrideRequest,
    SessionView, ToggleRequest, ToggleResponse,
};
use crate::catalogue::resolve_subject;
use crate::server::AppState;

/// POST /sessions
/// El cuerpo es opcional; sin él la sesión parte vacía.
pub async fn create_session_handler(
    data: web::Data<AppState>,
    body: Option<web::Json<NewSessionRequest>>,
) -> HttpResponse {
    let request = body.map(|b| b.into_inner()).unwrap_or_default();
    let state = match resolve_state_subjects(data.advisor.catalogue(), request.state) {
        Ok(s) => s,
        Err(e) => return error_response(&e),
    };
    let id = data.open_session(state);
    info!(session = id, "session opened");

    match data.with_session(id, |s| {
        HttpResponse::Created().json(json!({"id": id, "snapshot": s.snapshot()}))
    }) {
        Ok(resp) => resp,
        Err(e) => error_response(&e),
    }
}

/// GET /sessions/{id}
pub async fn get_session_handler(data: web::Data<AppState>, path: web::Path<u64>) -> impl Responder {
    let id = path.into_inner();
    match data.with_session(id, |s| {
        HttpResponse::Ok().json(SessionView {
            id,
            state: s.state(),
            options: s.options(),
            snapshot: s.snapshot(),
        })
    }) {
        Ok(resp) => resp,
        Err(e) => error_response(&e),
    }
}

/// POST /sessions/{id}/toggle
/// Un rechazo de política no es un error HTTP: se responde 200 con `accepted = false`.
pub async fn toggle_handler(
    data: web::Data<AppState>,
    path: web::Path<u64>,
    body: web::Json<ToggleRequest>,
) -> impl Responder {
    let id = path.into_inner();
    let ToggleRequest { subject, mode } = body.into_inner();
    let resolved = resolve_subject(data.advisor.catalogue(), &subject).map(|s| s.id.clone());
    let target = resolved.clone().unwrap_or(subject);

    match data.with_session(id, |s| {
        let outcome = s.toggle_subject(&target, mode);
        HttpResponse::Ok().json(ToggleResponse {
            outcome,
            subject: resolved,
            snapshot: s.snapshot(),
        })
    }) {
        Ok(resp) => resp,
        Err(e) => error_response(&e),
    }
}

/// POST /sessions/{id}/major
pub async fn major_handler(
    data: web::Data<AppState>,
    path: web::Path<u64>,
    body: web::Json<MajorRequest>,
) -> impl Responder {
    let id = path.into_inner();
    let major = body.into_inner().major.filter(|m| !m.trim().is_empty());

    let result = data.with_session(id, |s| {
        s.set_major(major.as_deref())
            .map(|_| HttpResponse::Ok().json(json!({"major": s.state().major, "snapshot": s.snapshot()})))
    });
    match result {
        Ok(Ok(resp)) => resp,
        Ok(Err(e)) | Err(e) => error_response(&e),
    }
}

/// POST /sessions/{id}/load
pub async fn load_handler(
    data: web::Data<AppState>,
    path: web::Path<u64>,
    body: web::Json<LoadRequest>,
) -> impl Responder {
    let id = path.into_inner();
    let req = body.into_inner();
    match data.with_session(id, |s| {
        let outcome = s.set_load_settings(
            req.category,
            req.exceptional_approved,
            req.desired_cap,
            req.remaining_confirmed,
        );
        HttpResponse::Ok().json(json!({
            "applied_cap": outcome.applied_cap,
            "legal_caps": outcome.legal_caps,
            "snapshot": s.snapshot(),
        }))
    }) {
        Ok(resp) => resp,
        Err(e) => error_response(&e),
    }
}

/// POST /sessions/{id}/override
pub async fn override_handler(
    data: web::Data<AppState>,
    path: web::Path<u64>,
    body: web::Json<OverrideRequest>,
) -> impl Responder {
    let id = path.into_inner();
    let enabled = body.into_inner().enabled;
    match data.with_session(id, |s| {
        s.set_override(enabled);
        HttpResponse::Ok().json(json!({"override_prerequisites": enabled, "snapshot": s.snapshot()}))
    }) {
        Ok(resp) => resp,
        Err(e) => error_response(&e),
    }
}

/// POST /sessions/{id}/credits
pub async fn add_credit_handler(
    data: web::Data<AppState>,
    path: web::Path<u64>,
    body: Option<web::Json<CreditRequest>>,
) -> impl Responder {
    let id = path.into_inner();
    let mode = body.map(|b| b.into_inner()).unwrap_or_default().mode;
    match data.with_session(id, |s| {
        let outcome = s.add_generic_credit(mode);
        HttpResponse::Ok().json(json!({
            "accepted": outcome.accepted,
            "reason": outcome.reason,
            "generic_credits": s.state().generic_credits,
            "snapshot": s.snapshot(),
        }))
    }) {
        Ok(resp) => resp,
        Err(e) => error_response(&e),
    }
}

/// DELETE /sessions/{id}/credits
/// Quita el último crédito genérico agregado.
pub async fn remove_credit_handler(data: web::Data<AppState>, path: web::Path<u64>) -> impl Responder {
    let id = path.into_inner();
    match data.with_session(id, |s| {
        let outcome = s.remove_generic_credit();
        HttpResponse::Ok().json(json!({
            "accepted": outcome.accepted,
            "reason": outcome.reason,
            "generic_credits": s.state().generic_credits,
            "snapshot": s.snapshot(),
        }))
    }) {
        Ok(resp) => resp,
        Err(e) => error_response(&e),
    }
}

/// GET /sessions/{id}/diagnostics
pub async fn diagnostics_handler(data: web::Data<AppState>, path: web::Path<u64>) -> impl Responder {
    let id = path.into_inner();
    match data.with_session(id, |s| HttpResponse::Ok().json(s.diagnostics())) {
        Ok(resp) => resp,
        Err(e) => error_response(&e),
    }
}
