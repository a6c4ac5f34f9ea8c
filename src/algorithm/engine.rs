// engine.rs - Orquestador del recálculo completo y de la sesión del estudiante.
//
// Cada mutación de la sesión dispara, de forma síncrona, la pasada completa:
//   1. carga legal / tope de admisión
//   2. distancias (DistanceCalculator)
//   3. elegibilidad por asignatura
//   4. diagnóstico de cadenas (sólo en puntos de decisión)
//   5. electivos y avisos restantes
// `Advisor::recompute` es puro: mismo estado -> mismo resultado.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::debug;

use crate::algorithm::chain::{analyze_chain_delay, detect_tight_chain, optimal_pace};
use crate::algorithm::distance::DistanceCalculator;
use crate::algorithm::electives::{next_generic_code, tally_electives};
use crate::algorithm::eligibility::{Eligibility, EligibilityEvaluator};
use crate::algorithm::graph::PrerequisiteGraph;
use crate::algorithm::load::{admission_cap, clamp_to_legal, legal_loads, LoadOutcome};
use crate::error::{AdvisorError, Rejection};
use crate::models::{
    Catalogue, CreditStatus, DiagnosticDetail, Diagnostics, Distance, GenericCredit, StreamKind,
    StudentCategory, StudentState,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToggleMode {
    /// Elegir asignaturas para el próximo semestre.
    #[default]
    Planning,
    /// Registrar créditos ya aprobados (sin validar requisitos).
    Recording,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlanOptions {
    #[serde(default)]
    pub mode: ToggleMode,
    /// Ignora prerequisitos/correquisitos al planificar; el tope de carga se mantiene.
    #[serde(default)]
    pub override_prerequisites: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mark {
    Completed,
    Planned,
    Open,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubjectStatus {
    pub mark: Mark,
    pub satisfied: bool,
    pub can_select_now: bool,
    pub locked: bool,
    pub coreq_selectable: bool,
    pub distance: Distance,
    pub chain_delay: bool,
}

/// Resultado de una pasada completa.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recomputation {
    pub subjects: BTreeMap<String, SubjectStatus>,
    pub remaining: u32,
    pub legal_caps: Vec<u32>,
    pub active_cap: u32,
    pub admission_cap: u32,
    pub planned_count: usize,
    pub treat_planned_as_complete: bool,
    pub optimal_pace: Option<u32>,
    pub electives: Vec<String>,
    pub diagnostics: Diagnostics,
}

impl Recomputation {
    pub fn status(&self, id: &str) -> Option<&SubjectStatus> {
        self.subjects.get(id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ToggleOutcome {
    pub accepted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<Rejection>,
}

impl ToggleOutcome {
    fn accepted() -> Self {
        Self { accepted: true, reason: None }
    }

    fn rejected(reason: Rejection) -> Self {
        Self { accepted: false, reason: Some(reason) }
    }
}

/// Motor de consulta: catálogo inmutable + grafo derivado.
#[derive(Debug)]
pub struct Advisor {
    catalogue: Arc<Catalogue>,
    graph: PrerequisiteGraph,
}

impl Advisor {
    pub fn new(catalogue: Arc<Catalogue>) -> Self {
        let graph = PrerequisiteGraph::from_subjects(catalogue.subjects());
        Self { catalogue, graph }
    }

    pub fn catalogue(&self) -> &Catalogue {
        &self.catalogue
    }

    pub fn graph(&self) -> &PrerequisiteGraph {
        &self.graph
    }

    /// Asignaturas que faltan para egresar (sólo cuenta lo aprobado).
    pub fn remaining(&self, state: &StudentState) -> u32 {
        let done = state.completed.len() + state.credits_with(CreditStatus::Completed);
        self.catalogue.program().total_required.saturating_sub(done as u32)
    }

    /// (cargas legales, carga activa ya ajustada).
    pub fn load_caps(&self, state: &StudentState) -> (Vec<u32>, u32) {
        let legal = legal_loads(
            state.category,
            state.exceptional_load_approved,
            self.remaining(state),
            state.remaining_confirmed,
        );
        let active = clamp_to_legal(state.load_cap, &legal);
        (legal, active)
    }

    pub fn admission_cap(&self, state: &StudentState) -> u32 {
        let (_, active) = self.load_caps(state);
        admission_cap(active, self.remaining(state))
    }

    pub fn distance(
        &self,
        id: &str,
        completed: &BTreeSet<String>,
        planned: &BTreeSet<String>,
        treat_planned_as_complete: bool,
    ) -> Distance {
        DistanceCalculator::new(&self.graph, completed, planned, treat_planned_as_complete).distance(id)
    }

    pub fn eligibility(&self, state: &StudentState, id: &str) -> Eligibility {
        EligibilityEvaluator::new(
            &self.catalogue,
            &self.graph,
            &state.completed,
            &state.planned,
            state.major.as_deref(),
        )
        .evaluate(id)
    }

    pub fn recompute(&self, state: &StudentState, options: &PlanOptions) -> Recomputation {
        let remaining = self.remaining(state);
        let (legal_caps, active_cap) = self.load_caps(state);
        let admission = admission_cap(active_cap, remaining);
        let planned_count = state.planned.len();
        // la selección está "completa" al llegar a la carga activa, no al tope de admisión
        let treat = planned_count > 0 && planned_count >= active_cap as usize;

        let distances =
            DistanceCalculator::new(&self.graph, &state.completed, &state.planned, treat).distances();
        let evaluator = EligibilityEvaluator::new(
            &self.catalogue,
            &self.graph,
            &state.completed,
            &state.planned,
            state.major.as_deref(),
        );

        let mut diagnostics = Diagnostics::default();
        let mut subjects = BTreeMap::new();
        for s in self.catalogue.subjects() {
            let distance = distances.get(&s.id).copied().unwrap_or(Distance::ZERO);
            let status = if state.completed.contains(&s.id) {
                SubjectStatus {
                    mark: Mark::Completed,
                    satisfied: true,
                    can_select_now: false,
                    locked: false,
                    coreq_selectable: false,
                    distance,
                    chain_delay: false,
                }
            } else {
                let e = evaluator.evaluate(&s.id);
                let planned = state.planned.contains(&s.id);
                if planned {
                    self.plan_warnings(state, options, &s.id, &e, &mut diagnostics);
                }
                SubjectStatus {
                    mark: if planned { Mark::Planned } else { Mark::Open },
                    satisfied: e.satisfied,
                    can_select_now: !planned && e.can_select_now,
                    locked: e.locked,
                    coreq_selectable: e.coreq_selectable,
                    distance,
                    chain_delay: false,
                }
            };
            subjects.insert(s.id.clone(), status);
        }

        // Diagnóstico de cadenas: nunca registrando créditos, y sólo con la
        // selección vacía o completa.
        let mut pace = None;
        let decision_point = planned_count == 0 || treat;
        if options.mode == ToggleMode::Planning && decision_point {
            let effective_remaining = if treat {
                remaining
                    .saturating_sub(planned_count as u32)
                    .saturating_sub(state.credits_with(CreditStatus::Planned) as u32)
            } else {
                remaining
            };
            let pending: Vec<&str> = self
                .catalogue
                .subjects()
                .iter()
                .filter(|s| !state.completed.contains(&s.id))
                .map(|s| s.id.as_str())
                .collect();

            if effective_remaining > 0 {
                pace = Some(optimal_pace(effective_remaining, active_cap));
            }
            if let Some(report) = analyze_chain_delay(
                &self.graph,
                &distances,
                pending.iter().copied(),
                effective_remaining,
                active_cap,
            ) {
                for id in &report.chain_delay {
                    if let Some(st) = subjects.get_mut(id) {
                        st.chain_delay = true;
                    }
                }
                diagnostics.push(DiagnosticDetail::ChainDelay {
                    optimal_pace: report.optimal_pace,
                    remaining: effective_remaining,
                    load_cap: active_cap,
                    delayed: report.delayed,
                    paths: report.paths,
                });
            }
            if let Some(tight) = detect_tight_chain(&distances, pending.iter().copied(), effective_remaining) {
                diagnostics.push(DiagnosticDetail::TightChain {
                    max_distance: tight.max_distance,
                    subjects_at_max: tight.subjects_at_max,
                    remaining: effective_remaining,
                });
            }
        }

        let specific: Vec<&str> = self
            .catalogue
            .subjects()
            .iter()
            .filter(|s| s.is_elective())
            .filter(|s| state.completed.contains(&s.id) || state.planned.contains(&s.id))
            .map(|s| s.id.as_str())
            .collect();
        let tally = tally_electives(
            specific,
            &state.generic_credits,
            self.catalogue.program().max_electives,
        );
        if tally.is_over_limit() {
            diagnostics.push(DiagnosticDetail::ElectiveOverLimit {
                limit: tally.limit,
                codes: tally.fulfilments.clone(),
                excess_codes: tally.excess().to_vec(),
            });
        }

        for edge in self.graph.dangling() {
            diagnostics.push(DiagnosticDetail::DanglingReference {
                subject: edge.subject.clone(),
                missing: edge.missing.clone(),
            });
        }
        for cycle in self.graph.cycles() {
            diagnostics.push(DiagnosticDetail::CycleDetected { subjects: cycle.clone() });
        }

        Recomputation {
            subjects,
            remaining,
            legal_caps,
            active_cap,
            admission_cap: admission,
            planned_count,
            treat_planned_as_complete: treat,
            optimal_pace: pace,
            electives: tally.fulfilments,
            diagnostics,
        }
    }

    fn plan_warnings(
        &self,
        state: &StudentState,
        options: &PlanOptions,
        id: &str,
        e: &Eligibility,
        diagnostics: &mut Diagnostics,
    ) {
        let concurrent: Vec<String> = self
            .graph
            .corequisites_of(id)
            .iter()
            .filter(|c| state.planned.contains(*c))
            .cloned()
            .collect();
        if !concurrent.is_empty() {
            diagnostics.push(DiagnosticDetail::ConcurrentCorequisite {
                subject: id.to_string(),
                corequisites: concurrent,
            });
        }
        if !options.override_prerequisites && !e.admits(false) {
            diagnostics.push(DiagnosticDetail::PlanInvalidated { subject: id.to_string() });
        }
    }
}

/// Sesión de un estudiante: único escritor de su `StudentState`.
#[derive(Debug, Clone)]
pub struct Session {
    advisor: Arc<Advisor>,
    state: StudentState,
    options: PlanOptions,
    snapshot: Recomputation,
}

impl Session {
    pub fn new(advisor: Arc<Advisor>, mut state: StudentState) -> Self {
        state.normalize();
        let options = PlanOptions::default();
        let snapshot = advisor.recompute(&state, &options);
        let mut session = Self { advisor, state, options, snapshot };
        session.refresh();
        session
    }

    pub fn state(&self) -> &StudentState {
        &self.state
    }

    pub fn options(&self) -> &PlanOptions {
        &self.options
    }

    pub fn snapshot(&self) -> &Recomputation {
        &self.snapshot
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.snapshot.diagnostics
    }

    /// Ajusta la carga activa al conjunto legal vigente y recalcula todo.
    fn refresh(&mut self) {
        let (_, active) = self.advisor.load_caps(&self.state);
        self.state.load_cap = active;
        self.snapshot = self.advisor.recompute(&self.state, &self.options);
    }

    pub fn toggle_subject(&mut self, id: &str, mode: ToggleMode) -> ToggleOutcome {
        let outcome = self.apply_toggle(id, mode);
        debug!(subject = %id, ?mode, accepted = outcome.accepted, reason = ?outcome.reason, "toggle");
        if outcome.accepted {
            self.options.mode = mode;
            self.refresh();
        }
        outcome
    }

    fn apply_toggle(&mut self, id: &str, mode: ToggleMode) -> ToggleOutcome {
        if !self.advisor.catalogue().contains(id) {
            return ToggleOutcome::rejected(Rejection::UnknownSubject);
        }

        match mode {
            ToggleMode::Recording => {
                if self.state.is_completed(id) {
                    self.state.unmark(id);
                } else {
                    self.state.mark_completed(id);
                }
                ToggleOutcome::accepted()
            }
            ToggleMode::Planning => {
                if self.state.is_planned(id) {
                    self.state.unmark(id);
                    return ToggleOutcome::accepted();
                }
                if self.state.is_completed(id) {
                    return ToggleOutcome::rejected(Rejection::AlreadyCompleted);
                }
                if !self.advisor.graph().is_offered(id) {
                    return ToggleOutcome::rejected(Rejection::NotOffered);
                }
                let e = self.advisor.eligibility(&self.state, id);
                if !e.admits(self.options.override_prerequisites) {
                    return ToggleOutcome::rejected(Rejection::PrerequisitesUnmet);
                }
                if self.state.planned.len() as u32 >= self.advisor.admission_cap(&self.state) {
                    return ToggleOutcome::rejected(Rejection::AdmissionCapReached);
                }
                self.state.mark_planned(id);
                ToggleOutcome::accepted()
            }
        }
    }

    /// Cambia el major declarado. Lo planificado de otro major se descarta;
    /// lo aprobado es historia y se conserva.
    pub fn set_major(&mut self, major: Option<&str>) -> Result<(), AdvisorError> {
        if let Some(key) = major {
            if self.advisor.catalogue().major(key).is_none() {
                return Err(AdvisorError::UnknownMajor(key.to_string()));
            }
        }
        if self.state.major.as_deref() == major {
            return Ok(());
        }

        let dropped: Vec<String> = self
            .state
            .planned
            .iter()
            .filter(|id| {
                self.advisor
                    .catalogue()
                    .subject(id)
                    .map(|s| s.stream == StreamKind::Major && s.major.as_deref() != major)
                    .unwrap_or(false)
            })
            .cloned()
            .collect();
        for id in &dropped {
            self.state.planned.remove(id);
        }
        debug!(major = ?major, dropped = ?dropped, "major changed");

        self.state.major = major.map(|m| m.to_string());
        self.refresh();
        Ok(())
    }

    pub fn set_load_settings(
        &mut self,
        category: StudentCategory,
        exceptional_approved: bool,
        desired_cap: u32,
        remaining_confirmed: bool,
    ) -> LoadOutcome {
        self.state.category = category;
        self.state.exceptional_load_approved = exceptional_approved;
        self.state.remaining_confirmed = remaining_confirmed;
        self.state.load_cap = desired_cap;
        self.refresh();
        debug!(?category, exceptional_approved, desired_cap, applied = self.state.load_cap, "load settings");
        LoadOutcome {
            applied_cap: self.state.load_cap,
            legal_caps: self.snapshot.legal_caps.clone(),
        }
    }

    pub fn set_override(&mut self, enabled: bool) {
        self.options.override_prerequisites = enabled;
        self.refresh();
    }

    /// Agrega el siguiente crédito electivo genérico disponible.
    pub fn add_generic_credit(&mut self, mode: ToggleMode) -> ToggleOutcome {
        if self.snapshot.electives.len() >= self.advisor.catalogue().program().max_electives {
            return ToggleOutcome::rejected(Rejection::ElectiveQuotaFull);
        }
        let priority = &self.advisor.catalogue().program().generic_elective_codes;
        let Some(code) = next_generic_code(priority, &self.state.generic_credits) else {
            return ToggleOutcome::rejected(Rejection::NoGenericCreditAvailable);
        };
        let status = match mode {
            ToggleMode::Recording => CreditStatus::Completed,
            ToggleMode::Planning => CreditStatus::Planned,
        };
        self.state.generic_credits.push(GenericCredit { code: code.to_string(), status });
        debug!(code = %code, ?status, "generic credit added");
        self.refresh();
        ToggleOutcome::accepted()
    }

    /// Quita el último crédito genérico agregado.
    pub fn remove_generic_credit(&mut self) -> ToggleOutcome {
        match self.state.generic_credits.pop() {
            Some(credit) => {
                debug!(code = %credit.code, "generic credit removed");
                self.refresh();
                ToggleOutcome::accepted()
            }
            None => ToggleOutcome::rejected(Rejection::NoGenericCreditToRemove),
        }
    }
}
