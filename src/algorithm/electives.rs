// Contabilidad de electivos: asignaturas electivas concretas más créditos
// genéricos, sin duplicados y contra el cupo fijo del programa.

use std::collections::HashSet;

use crate::models::GenericCredit;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElectiveTally {
    pub fulfilments: Vec<String>,
    pub limit: usize,
}

impl ElectiveTally {
    pub fn is_over_limit(&self) -> bool {
        self.fulfilments.len() > self.limit
    }

    /// Códigos que quedan fuera del cupo (los últimos en entrar).
    pub fn excess(&self) -> &[String] {
        if self.is_over_limit() { &self.fulfilments[self.limit..] } else { &[] }
    }
}

/// Primero las asignaturas concretas, luego los créditos genéricos en su orden.
pub fn tally_electives<'s>(
    specific: impl IntoIterator<Item = &'s str>,
    generic: &'s [GenericCredit],
    limit: usize,
) -> ElectiveTally {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut fulfilments = Vec::new();
    let all = specific.into_iter().chain(generic.iter().map(|c| c.code.as_str()));
    for code in all {
        if seen.insert(code) {
            fulfilments.push(code.to_string());
        }
    }
    ElectiveTally { fulfilments, limit }
}

/// Siguiente código genérico sin usar, respetando el orden de prioridad.
pub fn next_generic_code<'p>(priority: &'p [String], used: &[GenericCredit]) -> Option<&'p str> {
    priority
        .iter()
        .find(|code| !used.iter().any(|c| &c.code == *code))
        .map(|s| s.as_str())
}
