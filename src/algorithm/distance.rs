use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use crate::algorithm::graph::PrerequisiteGraph;
use crate::models::Distance;

/// Semestres mínimos hasta poder aprobar cada asignatura (camino más largo
/// hacia atrás por prerequisitos).
///
/// - 0 si ya está aprobada (o planificada cuando `treat_planned_as_complete`).
/// - 1 + máx(distancia de sus prerequisitos), +1 si no se dicta este periodo.
/// - `Unreachable` si el recorrido vuelve a un nodo que sigue en la pila.
///
/// El memo vive lo que vive la calculadora: una pasada de recálculo.
pub struct DistanceCalculator<'a> {
    graph: &'a PrerequisiteGraph,
    completed: &'a BTreeSet<String>,
    planned: &'a BTreeSet<String>,
    treat_planned_as_complete: bool,
    memo: HashMap<String, Distance>,
}

impl<'a> DistanceCalculator<'a> {
    pub fn new(
        graph: &'a PrerequisiteGraph,
        completed: &'a BTreeSet<String>,
        planned: &'a BTreeSet<String>,
        treat_planned_as_complete: bool,
    ) -> Self {
        Self {
            graph,
            completed,
            planned,
            treat_planned_as_complete,
            memo: HashMap::new(),
        }
    }

    pub fn distance(&mut self, id: &str) -> Distance {
        let mut visiting: HashSet<String> = HashSet::new();
        self.visit(id, &mut visiting)
    }

    /// Distancia de todas las asignaturas del grafo, en orden de código.
    pub fn distances(&mut self) -> BTreeMap<String, Distance> {
        let graph = self.graph;
        graph
            .subject_ids()
            .iter()
            .map(|id| (id.clone(), self.distance(id)))
            .collect()
    }

    fn is_done(&self, id: &str) -> bool {
        self.completed.contains(id) || (self.treat_planned_as_complete && self.planned.contains(id))
    }

    fn visit(&mut self, id: &str, visiting: &mut HashSet<String>) -> Distance {
        if self.is_done(id) {
            return Distance::ZERO;
        }
        // código externo sin definición: hoja satisfecha
        if !self.graph.is_known(id) {
            return Distance::ZERO;
        }
        if let Some(&d) = self.memo.get(id) {
            return d;
        }
        // ciclo: no se memoriza aquí, lo resuelve el nodo que cierra la vuelta
        if !visiting.insert(id.to_string()) {
            return Distance::Unreachable;
        }

        let graph = self.graph;
        let mut slowest = Distance::ZERO;
        for p in graph.prerequisites_of(id) {
            slowest = slowest.max(self.visit(p, visiting));
        }
        visiting.remove(id);

        let penalty = if graph.is_offered(id) { 0 } else { 1 };
        let d = slowest.plus(1 + penalty);
        self.memo.insert(id.to_string(), d);
        d
    }
}

/// Atajo para una consulta aislada.
pub fn distance(
    graph: &PrerequisiteGraph,
    id: &str,
    completed: &BTreeSet<String>,
    planned: &BTreeSet<String>,
    treat_planned_as_complete: bool,
) -> Distance {
    DistanceCalculator::new(graph, completed, planned, treat_planned_as_complete).distance(id)
}
