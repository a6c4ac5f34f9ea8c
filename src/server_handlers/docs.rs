use actix_web::{HttpResponse, Responder};
use serde_json::json;

use crate::algorithm::{PlanOptions, ToggleMode};
use crate::api_json::{LoadRequest, RecomputeRequest, ToggleRequest};
use crate::models::{StudentCategory, StudentState};

pub async fn help_handler() -> impl Responder {
    let mut state = StudentState::default();
    state.mark_completed("COMP1001");
    state.mark_completed("MATH1001");
    state.mark_planned("COMP1002");
    state.major = Some("net".to_string());

    let recompute_example = RecomputeRequest {
        state,
        options: PlanOptions::default(),
    };
    let toggle_example = ToggleRequest {
        subject: "Data Structures".to_string(),
        mode: ToggleMode::Planning,
    };
    let load_example = LoadRequest {
        category: StudentCategory::Domestic,
        exceptional_approved: false,
        desired_cap: 3,
        remaining_confirmed: false,
    };

    let help = json!({
        "description": "API de asesoría de asignaturas. POST /recompute calcula sin sesión; /sessions mantiene el estado del estudiante y recalcula tras cada cambio.",
        "recompute_example": recompute_example,
        "toggle_example": toggle_example,
        "load_example": load_example,
        "major_example": {"major": "net"},
        "override_example": {"enabled": true},
        "credit_example": {"mode": "recording"},
        "note": "Las asignaturas pueden indicarse por código o por nombre; los nombres se resuelven contra el catálogo cargado.",
        "routes": [
            "GET /catalogue",
            "POST /recompute",
            "POST /sessions",
            "GET /sessions/{id}",
            "POST /sessions/{id}/toggle",
            "POST /sessions/{id}/major",
            "POST /sessions/{id}/load",
            "POST /sessions/{id}/override",
            "POST /sessions/{id}/credits",
            "DELETE /sessions/{id}/credits",
            "GET /sessions/{id}/diagnostics",
            "GET /help"
        ]
    });

    HttpResponse::Ok().json(help)
}
