//! Búsqueda de asignaturas por código o por nombre.
//!
//! Los clientes a veces envían el nombre visible en lugar del código; se
//! intenta, en orden: código exacto (sin distinguir mayúsculas), nombre
//! normalizado y, por último, el nombre más parecido (Jaro-Winkler).

use strsim::jaro_winkler;

use crate::models::{Catalogue, Subject};

/// Similitud mínima para aceptar una coincidencia aproximada.
pub const MIN_NAME_SIMILARITY: f64 = 0.90;

/// Minúsculas, sin tildes y sólo alfanuméricos.
pub fn normalize_name(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            'á' | 'à' | 'ä' | 'Á' | 'À' | 'Ä' => 'a',
            'é' | 'è' | 'ë' | 'É' | 'È' | 'Ë' => 'e',
            'í' | 'ì' | 'ï' | 'Í' | 'Ì' | 'Ï' => 'i',
            'ó' | 'ò' | 'ö' | 'Ó' | 'Ò' | 'Ö' => 'o',
            'ú' | 'ù' | 'ü' | 'Ú' | 'Ù' | 'Ü' => 'u',
            'ñ' | 'Ñ' => 'n',
            other => other,
        })
        .filter(|c| c.is_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

pub fn resolve_subject<'c>(catalogue: &'c Catalogue, query: &str) -> Option<&'c Subject> {
    let query = query.trim();
    if query.is_empty() {
        return None;
    }
    if let Some(s) = catalogue.subject(query) {
        return Some(s);
    }
    if let Some(s) = catalogue.subjects().iter().find(|s| s.id.eq_ignore_ascii_case(query)) {
        return Some(s);
    }

    let wanted = normalize_name(query);
    if let Some(s) = catalogue.subjects().iter().find(|s| normalize_name(&s.name) == wanted) {
        return Some(s);
    }

    let mut best: Option<(&Subject, f64)> = None;
    for s in catalogue.subjects() {
        let score = jaro_winkler(&normalize_name(&s.name), &wanted);
        if score >= MIN_NAME_SIMILARITY && best.map(|(_, b)| score > b).unwrap_or(true) {
            best = Some((s, score));
        }
    }
    best.map(|(s, _)| s)
}
