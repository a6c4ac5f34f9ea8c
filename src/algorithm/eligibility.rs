// Evaluación de elegibilidad por asignatura.
//
// Dos vistas independientes:
// - "ahora": sólo cuenta lo aprobado.
// - "planificada": cuenta aprobado + planificado.
// Los correquisitos se exigen con el mismo conjunto que la vista, así que
// en la vista "ahora" un correquisito sólo se cumple si ya se aprobó.

use serde::Serialize;
use std::collections::BTreeSet;

use crate::algorithm::graph::PrerequisiteGraph;
use crate::models::{CapstoneRule, Catalogue};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Eligibility {
    pub prereq_now: bool,
    pub coreq_now: bool,
    pub prereq_planned: bool,
    pub coreq_planned: bool,
    /// Vista estricta permitida y la asignatura se dicta este periodo.
    pub can_select_now: bool,
    /// La vista planificada se cumple.
    pub satisfied: bool,
    pub locked: bool,
    /// Tiene correquisitos y están cubiertos por lo planificado: se puede
    /// elegir junto a ellos aunque los prerequisitos la bloqueen.
    pub coreq_selectable: bool,
}

impl Eligibility {
    pub fn now_view(&self) -> bool {
        self.prereq_now && self.coreq_now
    }

    pub fn planned_view(&self) -> bool {
        self.prereq_planned && self.coreq_planned
    }

    /// Puede pasar a "planificada" (sin contar el tope de carga).
    pub fn admits(&self, override_prerequisites: bool) -> bool {
        override_prerequisites || self.satisfied || self.coreq_selectable
    }
}

pub struct EligibilityEvaluator<'a> {
    catalogue: &'a Catalogue,
    graph: &'a PrerequisiteGraph,
    completed: &'a BTreeSet<String>,
    planned: &'a BTreeSet<String>,
    major: Option<&'a str>,
}

impl<'a> EligibilityEvaluator<'a> {
    pub fn new(
        catalogue: &'a Catalogue,
        graph: &'a PrerequisiteGraph,
        completed: &'a BTreeSet<String>,
        planned: &'a BTreeSet<String>,
        major: Option<&'a str>,
    ) -> Self {
        Self { catalogue, graph, completed, planned, major }
    }

    fn met_now(&self, id: &str) -> bool {
        // los códigos sin definición no bloquean
        self.completed.contains(id) || !self.graph.is_known(id)
    }

    fn met_planned(&self, id: &str) -> bool {
        self.met_now(id) || self.planned.contains(id)
    }

    pub fn evaluate(&self, id: &str) -> Eligibility {
        let prereqs = self.graph.prerequisites_of(id);
        let coreqs = self.graph.corequisites_of(id);

        let mut e = Eligibility {
            prereq_now: prereqs.iter().all(|p| self.met_now(p)),
            coreq_now: coreqs.iter().all(|c| self.met_now(c)),
            prereq_planned: prereqs.iter().all(|p| self.met_planned(p)),
            coreq_planned: coreqs.iter().all(|c| self.met_planned(c)),
            ..Eligibility::default()
        };

        let offered = self.graph.is_offered(id);
        let capstone = self.catalogue.program().capstone.as_ref().filter(|r| r.subject == id);

        match capstone {
            Some(rule) => {
                let (strict, forward) = self.capstone_views(rule);
                e.prereq_now = e.prereq_now && strict;
                e.prereq_planned = e.prereq_planned && forward;
                // el capstone siempre decide con la vista planificada
                e.can_select_now = e.planned_view() && offered;
            }
            None => {
                e.can_select_now = e.now_view() && offered;
            }
        }

        e.satisfied = e.planned_view();
        e.locked = !e.satisfied;
        e.coreq_selectable = !coreqs.is_empty() && e.coreq_planned;
        e
    }

    /// (vista estricta, vista planificada) de la regla del capstone.
    fn capstone_views(&self, rule: &CapstoneRule) -> (bool, bool) {
        let Some(major) = self.major else {
            return (false, false);
        };

        let mut done = 0u32;
        let mut in_plan = 0u32;
        for s in self.catalogue.subjects() {
            if s.id == rule.subject || !s.belongs_to_major(major) {
                continue;
            }
            if self.completed.contains(&s.id) {
                done += 1;
            } else if self.planned.contains(&s.id) {
                in_plan += 1;
            }
        }

        let strict = done >= rule.major_full_count && self.met_now(&rule.required_subject);
        let forward = done >= rule.major_partial_count
            && done + in_plan >= rule.major_full_count
            && self.met_planned(&rule.required_subject);
        (strict, forward)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Major, ProgramRequirements, StreamKind, Subject};

    fn set(ids: &[&str]) -> BTreeSet<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    fn catalogue(subjects: Vec<Subject>, capstone: Option<CapstoneRule>) -> Catalogue {
        let program = ProgramRequirements { capstone, ..ProgramRequirements::default() };
        let majors = vec![Major { key: "net".into(), name: "Networks".into() }];
        Catalogue::new(program, majors, subjects).unwrap()
    }

    #[test]
    fn now_view_requires_every_prerequisite_completed() {
        let cat = catalogue(
            vec![
                Subject::new("A", "A", StreamKind::Core),
                Subject::new("B", "B", StreamKind::Core),
                Subject::new("X", "X", StreamKind::Core).with_prerequisites(&["A", "B"]),
            ],
            None,
        );
        let g = PrerequisiteGraph::from_subjects(cat.subjects());

        let completed = set(&["A"]);
        let planned = set(&["B"]);
        let e = EligibilityEvaluator::new(&cat, &g, &completed, &planned, None).evaluate("X");
        assert!(!e.can_select_now);
        assert!(e.satisfied);
        assert!(!e.locked);

        let completed = set(&["A", "B"]);
        let empty = BTreeSet::new();
        let e = EligibilityEvaluator::new(&cat, &g, &completed, &empty, None).evaluate("X");
        assert!(e.can_select_now);
    }

    #[test]
    fn not_offered_blocks_select_now_only() {
        let cat = catalogue(vec![Subject::new("A", "A", StreamKind::Core).not_offered()], None);
        let g = PrerequisiteGraph::from_subjects(cat.subjects());
        let empty = BTreeSet::new();
        let e = EligibilityEvaluator::new(&cat, &g, &empty, &empty, None).evaluate("A");
        assert!(!e.can_select_now);
        assert!(e.satisfied);
    }

    #[test]
    fn corequisite_is_never_met_now_by_planning() {
        let cat = catalogue(
            vec![
                Subject::new("P", "P", StreamKind::Core),
                Subject::new("T", "T", StreamKind::Core),
                Subject::new("L", "L", StreamKind::Core)
                    .with_prerequisites(&["P"])
                    .with_corequisites(&["T"]),
            ],
            None,
        );
        let g = PrerequisiteGraph::from_subjects(cat.subjects());
        let empty = BTreeSet::new();
        let planned = set(&["T"]);
        let e = EligibilityEvaluator::new(&cat, &g, &empty, &planned, None).evaluate("L");
        assert!(!e.coreq_now);
        assert!(e.coreq_planned);
        // P sigue pendiente: bloqueada, pero el correquisito permite elegirla
        assert!(e.locked);
        assert!(e.coreq_selectable);
        assert!(e.admits(false));
    }

    #[test]
    fn capstone_tolerates_partial_major_only_in_planned_view() {
        let mut subjects = vec![Subject::new("R", "Research", StreamKind::Core)];
        for i in 0..4 {
            subjects.push(Subject::new(&format!("M{}", i), "m", StreamKind::Core).in_major("net"));
        }
        subjects.push(Subject::new("CAP", "Capstone", StreamKind::Core));
        let rule = CapstoneRule {
            subject: "CAP".into(),
            required_subject: "R".into(),
            major_full_count: 4,
            major_partial_count: 2,
        };
        let cat = catalogue(subjects, Some(rule));
        let g = PrerequisiteGraph::from_subjects(cat.subjects());

        let completed = set(&["R", "M0", "M1"]);
        let planned = set(&["M2", "M3"]);
        let e = EligibilityEvaluator::new(&cat, &g, &completed, &planned, Some("net")).evaluate("CAP");
        assert!(!e.now_view());
        assert!(e.satisfied);
        assert!(e.can_select_now);

        // sin major declarado no hay forma de habilitarlo
        let e = EligibilityEvaluator::new(&cat, &g, &completed, &planned, None).evaluate("CAP");
        assert!(e.locked);
        assert!(!e.can_select_now);

        // bajo el mínimo parcial
        let completed = set(&["R", "M0"]);
        let planned = set(&["M1", "M2", "M3"]);
        let e = EligibilityEvaluator::new(&cat, &g, &completed, &planned, Some("net")).evaluate("CAP");
        assert!(e.locked);
    }
}
