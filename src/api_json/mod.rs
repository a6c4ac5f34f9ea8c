use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::algorithm::{PlanOptions, Recomputation, ToggleMode, ToggleOutcome};
use crate::catalogue::resolve_subject;
use crate::error::AdvisorError;
use crate::models::{Catalogue, StudentCategory, StudentState};

/// Cuerpo de `POST /recompute` (y estado inicial opcional de `POST /sessions`).
///
/// # Estructura del JSON esperado:
/// ```json
/// {
///   "state": {
///     "completed": ["COMP1001", "Mathematics for Computing"],
///     "planned": ["COMP1002"],
///     "major": "net",
///     "category": "international",
///     "exceptional_load_approved": false,
///     "remaining_confirmed": false,
///     "load_cap": 4,
///     "generic_credits": [{ "code": "ELEC01", "status": "completed" }]
///   },
///   "options": { "mode": "planning", "override_prerequisites": false }
/// }
/// ```
///
/// Los ramos en `completed`/`planned` pueden venir por código o por nombre;
/// se resuelven contra el catálogo antes de calcular.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct RecomputeRequest {
	#[serde(default)]
	pub state: StudentState,
	#[serde(default)]
	pub options: PlanOptions,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct NewSessionRequest {
	#[serde(default)]
	pub state: StudentState,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ToggleRequest {
	/// Código o nombre de la asignatura.
	pub subject: String,
	#[serde(default)]
	pub mode: ToggleMode,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MajorRequest {
	#[serde(default)]
	pub major: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoadRequest {
	#[serde(default)]
	pub category: StudentCategory,
	#[serde(default)]
	pub exceptional_approved: bool,
	pub desired_cap: u32,
	#[serde(default)]
	pub remaining_confirmed: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OverrideRequest {
	pub enabled: bool,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CreditRequest {
	#[serde(default)]
	pub mode: ToggleMode,
}

#[derive(Debug, Serialize)]
pub struct SessionView<'a> {
	pub id: u64,
	pub state: &'a StudentState,
	pub options: &'a PlanOptions,
	pub snapshot: &'a Recomputation,
}

#[derive(Debug, Serialize)]
pub struct ToggleResponse<'a> {
	#[serde(flatten)]
	pub outcome: ToggleOutcome,
	/// Código resuelto (si la consulta vino por nombre).
	pub subject: Option<String>,
	pub snapshot: &'a Recomputation,
}

/// Resuelve nombres a códigos en el estado recibido usando el catálogo.
/// Un ramo que no corresponde a ninguna asignatura es un error del cliente.
pub fn resolve_state_subjects(catalogue: &Catalogue, state: StudentState) -> Result<StudentState, AdvisorError> {
	let state = resolve_state_with_resolver(state, |q| resolve_subject(catalogue, q).map(|s| s.id.clone()));
	if let Some(unknown) = state.completed.iter().chain(state.planned.iter()).find(|id| !catalogue.contains(id)) {
		return Err(AdvisorError::UnknownSubject(unknown.clone()));
	}
	Ok(state)
}

/// Versión parametrizable para pruebas: recibe un `resolver` que intenta mapear
/// un nombre a código. Lo que no se resuelve queda tal cual (y más adelante
/// se rechaza o se ignora como código desconocido).
pub fn resolve_state_with_resolver<F>(mut state: StudentState, resolver: F) -> StudentState
where
	F: Fn(&str) -> Option<String>,
{
	let resolve_all = |ids: BTreeSet<String>| -> BTreeSet<String> {
		ids.into_iter().map(|r| resolver(&r).unwrap_or(r)).collect()
	};
	state.completed = resolve_all(std::mem::take(&mut state.completed));
	state.planned = resolve_all(std::mem::take(&mut state.planned));
	state.normalize();
	state
}
