use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{HashMap, HashSet};
use tracing::warn;

use crate::models::Subject;

/// Arista que apunta a un código sin definición en la malla.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingEdge {
    pub subject: String,
    pub missing: String,
}

/// Grafo de prerequisitos/correquisitos construido una vez desde la malla.
///
/// Las listas de prerequisitos conservan el orden de los datos (el desempate
/// de la ruta crítica depende de él). El índice inverso `dependents` se deriva
/// de los prerequisitos y se reconstruye cada vez que cambian.
///
/// Además se arma un `DiGraph` de petgraph (prerequisito -> asignatura) sólo
/// para reportar ciclos al cargar; el cálculo de distancias no lo necesita.
#[derive(Debug, Clone, Default)]
pub struct PrerequisiteGraph {
    order: Vec<String>,
    known: HashSet<String>,
    not_offered: HashSet<String>,
    prerequisites: HashMap<String, Vec<String>>,
    corequisites: HashMap<String, Vec<String>>,
    dependents: HashMap<String, Vec<String>>,
    dangling: Vec<DanglingEdge>,
    cycles: Vec<Vec<String>>,
}

impl PrerequisiteGraph {
    pub fn from_subjects(subjects: &[Subject]) -> Self {
        let mut g = PrerequisiteGraph::default();
        for s in subjects {
            g.order.push(s.id.clone());
            g.known.insert(s.id.clone());
            if s.not_offered {
                g.not_offered.insert(s.id.clone());
            }
            g.prerequisites.insert(s.id.clone(), s.prerequisites.clone());
            g.corequisites.insert(s.id.clone(), s.corequisites.clone());
        }

        // Referencias colgantes: se toleran como hojas satisfechas, sólo se avisan
        for s in subjects {
            for missing in s.prerequisites.iter().chain(s.corequisites.iter()) {
                if !g.known.contains(missing) {
                    warn!(subject = %s.id, missing = %missing, "requirement references an undefined subject");
                    g.dangling.push(DanglingEdge { subject: s.id.clone(), missing: missing.clone() });
                }
            }
        }

        g.rebuild_dependents();
        g.cycles = g.find_cycles();
        for cycle in &g.cycles {
            warn!(subjects = ?cycle, "prerequisite cycle detected; subjects are unreachable");
        }
        g
    }

    /// Reconstruye el índice inverso (asignatura -> quienes la exigen).
    pub fn rebuild_dependents(&mut self) {
        self.dependents.clear();
        for id in &self.order {
            let Some(prereqs) = self.prerequisites.get(id) else { continue };
            for p in prereqs {
                let entry = self.dependents.entry(p.clone()).or_default();
                if !entry.contains(id) {
                    entry.push(id.clone());
                }
            }
        }
    }

    fn find_cycles(&self) -> Vec<Vec<String>> {
        let mut graph: DiGraph<&str, ()> = DiGraph::new();
        let mut node_map: HashMap<&str, NodeIndex> = HashMap::new();
        for id in &self.order {
            node_map.insert(id.as_str(), graph.add_node(id.as_str()));
        }
        for id in &self.order {
            let Some(&to) = node_map.get(id.as_str()) else { continue };
            for p in self.prerequisites_of(id) {
                if let Some(&from) = node_map.get(p.as_str()) {
                    if graph.find_edge(from, to).is_none() {
                        graph.add_edge(from, to, ());
                    }
                }
            }
        }

        let mut cycles = Vec::new();
        for scc in tarjan_scc(&graph) {
            let self_loop = scc.len() == 1 && graph.contains_edge(scc[0], scc[0]);
            if scc.len() > 1 || self_loop {
                let mut ids: Vec<String> = scc.iter().map(|&n| graph[n].to_string()).collect();
                ids.sort();
                cycles.push(ids);
            }
        }
        cycles.sort();
        cycles
    }

    pub fn prerequisites_of(&self, id: &str) -> &[String] {
        self.prerequisites.get(id).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn corequisites_of(&self, id: &str) -> &[String] {
        self.corequisites.get(id).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn dependents_of(&self, id: &str) -> &[String] {
        self.dependents.get(id).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn is_known(&self, id: &str) -> bool {
        self.known.contains(id)
    }

    pub fn is_offered(&self, id: &str) -> bool {
        !self.not_offered.contains(id)
    }

    /// Códigos en el orden de la malla.
    pub fn subject_ids(&self) -> &[String] {
        &self.order
    }

    pub fn dangling(&self) -> &[DanglingEdge] {
        &self.dangling
    }

    pub fn cycles(&self) -> &[Vec<String>] {
        &self.cycles
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StreamKind;

    fn s(id: &str, pre: &[&str]) -> Subject {
        Subject::new(id, id, StreamKind::Core).with_prerequisites(pre)
    }

    #[test]
    fn dependents_are_derived_in_subject_order() {
        let g = PrerequisiteGraph::from_subjects(&[
            s("A", &[]),
            s("B", &["A"]),
            s("C", &["A", "B"]),
        ]);
        assert_eq!(g.prerequisites_of("C"), &["A".to_string(), "B".to_string()]);
        assert_eq!(g.dependents_of("A"), &["B".to_string(), "C".to_string()]);
        assert_eq!(g.dependents_of("C"), &[] as &[String]);
    }

    #[test]
    fn dangling_references_are_reported_not_fatal() {
        let g = PrerequisiteGraph::from_subjects(&[s("A", &["ZZZ999"])]);
        assert_eq!(g.dangling().len(), 1);
        assert_eq!(g.dangling()[0].missing, "ZZZ999");
        assert!(!g.is_known("ZZZ999"));
        assert!(g.prerequisites_of("ZZZ999").is_empty());
    }

    #[test]
    fn cycles_are_listed() {
        let g = PrerequisiteGraph::from_subjects(&[
            s("A", &["B"]),
            s("B", &["A"]),
            s("C", &["C"]),
            s("D", &[]),
        ]);
        assert_eq!(
            g.cycles(),
            &[vec!["A".to_string(), "B".to_string()], vec!["C".to_string()]]
        );
    }

    #[test]
    fn corequisites_and_offer_flags() {
        let g = PrerequisiteGraph::from_subjects(&[
            Subject::new("L", "Lab", StreamKind::Core).with_corequisites(&["T"]).not_offered(),
            s("T", &[]),
        ]);
        assert_eq!(g.corequisites_of("L"), &["T".to_string()]);
        assert!(!g.is_offered("L"));
        assert!(g.is_offered("T"));
    }
}
