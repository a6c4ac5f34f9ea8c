// Diagnóstico de cadenas de prerequisitos.
//
// Compara la distancia de cada asignatura pendiente con el ritmo óptimo
// (ceil(restantes / carga)). Para cada asignatura que lo supera se recorre
// hacia atrás su ruta crítica: en cada paso el prerequisito de mayor
// distancia (empate: el primero de la lista).

use std::collections::{BTreeMap, BTreeSet};

use crate::algorithm::graph::PrerequisiteGraph;
use crate::models::Distance;

/// Umbral de restantes a partir del cual se avisa de una cadena final ajustada.
pub const TIGHT_CHAIN_MIN_REMAINING: u32 = 8;
/// Más de esta cantidad de asignaturas en la distancia máxima dispara el aviso.
pub const TIGHT_CHAIN_CROWD: usize = 4;
/// Distancia máxima que, por sí sola, dispara el aviso.
pub const TIGHT_CHAIN_DEPTH: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainReport {
    pub optimal_pace: u32,
    /// Asignaturas cuya distancia supera el ritmo óptimo.
    pub delayed: Vec<String>,
    /// Una ruta por asignatura retrasada, de la raíz a la asignatura.
    pub paths: Vec<Vec<String>>,
    /// Unión de todo lo tocado por las rutas.
    pub chain_delay: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TightChain {
    pub max_distance: u32,
    pub subjects_at_max: Vec<String>,
}

pub fn optimal_pace(remaining: u32, load_cap: u32) -> u32 {
    remaining.div_ceil(load_cap.max(1))
}

/// Ruta crítica que explica la distancia de `start`, en orden de progresión.
pub fn critical_path(
    graph: &PrerequisiteGraph,
    distances: &BTreeMap<String, Distance>,
    start: &str,
) -> Vec<String> {
    let mut path = vec![start.to_string()];
    let mut current = start.to_string();

    loop {
        let mut best: Option<(&String, Distance)> = None;
        for p in graph.prerequisites_of(&current) {
            let d = distances.get(p).copied().unwrap_or(Distance::ZERO);
            // aprobado (o externo): la cadena termina aquí
            if d == Distance::ZERO {
                continue;
            }
            match best {
                Some((_, bd)) if bd >= d => {}
                _ => best = Some((p, d)),
            }
        }

        let Some((next, _)) = best else { break };
        // ciclo: no seguir dando vueltas
        if path.contains(next) {
            break;
        }
        path.push(next.clone());
        current = next.clone();
    }

    path.reverse();
    path
}

/// `candidates`: asignaturas pendientes (no aprobadas, no placeholders).
pub fn analyze_chain_delay<'c>(
    graph: &PrerequisiteGraph,
    distances: &BTreeMap<String, Distance>,
    candidates: impl IntoIterator<Item = &'c str>,
    remaining: u32,
    load_cap: u32,
) -> Option<ChainReport> {
    if remaining == 0 {
        return None;
    }
    let pace = optimal_pace(remaining, load_cap);

    let mut report = ChainReport {
        optimal_pace: pace,
        delayed: Vec::new(),
        paths: Vec::new(),
        chain_delay: BTreeSet::new(),
    };

    for id in candidates {
        let d = distances.get(id).copied().unwrap_or(Distance::ZERO);
        if !d.exceeds(pace) {
            continue;
        }
        let path = critical_path(graph, distances, id);
        report.chain_delay.extend(path.iter().cloned());
        report.delayed.push(id.to_string());
        report.paths.push(path);
    }

    if report.delayed.is_empty() { None } else { Some(report) }
}

/// Aviso temprano: muchas asignaturas empatadas en la distancia máxima, o
/// una cadena muy profunda, con bastante camino todavía por delante.
pub fn detect_tight_chain<'c>(
    distances: &BTreeMap<String, Distance>,
    candidates: impl IntoIterator<Item = &'c str>,
    remaining: u32,
) -> Option<TightChain> {
    if remaining < TIGHT_CHAIN_MIN_REMAINING {
        return None;
    }

    let finite: Vec<(&str, u32)> = candidates
        .into_iter()
        .filter_map(|id| distances.get(id).and_then(|d| d.value()).map(|v| (id, v)))
        .filter(|&(_, v)| v > 0)
        .collect();
    let max_distance = finite.iter().map(|&(_, v)| v).max()?;
    let subjects_at_max: Vec<String> = finite
        .iter()
        .filter(|&&(_, v)| v == max_distance)
        .map(|&(id, _)| id.to_string())
        .collect();

    if subjects_at_max.len() > TIGHT_CHAIN_CROWD || max_distance >= TIGHT_CHAIN_DEPTH {
        Some(TightChain { max_distance, subjects_at_max })
    } else {
        None
    }
}
