// Política de carga por semestre.

use serde::Serialize;

use crate::models::{StudentCategory, DEFAULT_LOAD_CAP};

/// Carga máxima habitual.
pub const STANDARD_MAX_LOAD: u32 = 4;
/// Sobrecarga: sólo con pocas asignaturas restantes o confirmación explícita.
pub const OVERLOAD: u32 = 5;
/// Con este número de asignaturas restantes (o menos) se habilita la sobrecarga.
pub const OVERLOAD_REMAINING_THRESHOLD: u32 = 9;
/// Tramo final: el tope de admisión pasa a ser exactamente lo que falta.
pub const FINAL_STRETCH: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadOutcome {
    pub applied_cap: u32,
    pub legal_caps: Vec<u32>,
}

/// Cargas legales, en orden ascendente. Nunca queda vacío.
pub fn legal_loads(
    category: StudentCategory,
    exceptional_approved: bool,
    remaining: u32,
    remaining_confirmed: bool,
) -> Vec<u32> {
    let mut loads: Vec<u32> = match (category, exceptional_approved) {
        (StudentCategory::International, false) => vec![STANDARD_MAX_LOAD],
        _ => (1..=STANDARD_MAX_LOAD).collect(),
    };
    if remaining <= OVERLOAD_REMAINING_THRESHOLD || remaining_confirmed {
        loads.push(OVERLOAD);
    }
    loads
}

/// Ajusta la carga deseada al conjunto legal: si no está, toma la mayor
/// legal que no la supere, o la menor legal si todas la superan.
pub fn clamp_to_legal(desired: u32, legal: &[u32]) -> u32 {
    if legal.contains(&desired) {
        return desired;
    }
    legal
        .iter()
        .copied()
        .filter(|&l| l <= desired)
        .max()
        .or_else(|| legal.iter().copied().min())
        .unwrap_or(DEFAULT_LOAD_CAP)
}

/// Cuántas asignaturas se pueden planificar en esta pasada.
pub fn admission_cap(active_cap: u32, remaining: u32) -> u32 {
    if remaining <= FINAL_STRETCH {
        remaining
    } else {
        active_cap.min(remaining)
    }
}
