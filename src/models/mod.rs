// Estructuras de datos principales del asesor de asignaturas

pub mod diagnostics;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;

use crate::error::AdvisorError;

pub use diagnostics::{DiagnosticDetail, DiagnosticRecord, Diagnostics, Severity};

/// Carga por semestre que se asume cuando el estudiante no ha elegido otra.
pub const DEFAULT_LOAD_CAP: u32 = 4;

/// Cupo fijo de electivos del programa.
pub const DEFAULT_MAX_ELECTIVES: usize = 4;

/// Línea (stream) del programa a la que pertenece una asignatura.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamKind {
    Core,
    Major,
    Elective,
}

/// Una asignatura de la malla, con sus aristas tal como vienen en los datos.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    pub id: String,
    pub name: String,
    pub stream: StreamKind,
    /// Clave del major cuando `stream == Major`.
    #[serde(default)]
    pub major: Option<String>,
    /// La asignatura no se dicta este periodo: obliga a saltar a la siguiente oferta.
    #[serde(default)]
    pub not_offered: bool,
    #[serde(default)]
    pub prerequisites: Vec<String>,
    #[serde(default)]
    pub corequisites: Vec<String>,
}

impl Subject {
    pub fn new(id: &str, name: &str, stream: StreamKind) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            stream,
            major: None,
            not_offered: false,
            prerequisites: Vec::new(),
            corequisites: Vec::new(),
        }
    }

    pub fn with_prerequisites(mut self, ids: &[&str]) -> Self {
        self.prerequisites = ids.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_corequisites(mut self, ids: &[&str]) -> Self {
        self.corequisites = ids.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn in_major(mut self, key: &str) -> Self {
        self.stream = StreamKind::Major;
        self.major = Some(key.to_string());
        self
    }

    pub fn not_offered(mut self) -> Self {
        self.not_offered = true;
        self
    }

    pub fn belongs_to_major(&self, key: &str) -> bool {
        self.stream == StreamKind::Major && self.major.as_deref() == Some(key)
    }

    pub fn is_elective(&self) -> bool {
        self.stream == StreamKind::Elective
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Major {
    pub key: String,
    pub name: String,
}

/// Asignatura "final" que exige haber avanzado en el major declarado.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapstoneRule {
    pub subject: String,
    pub required_subject: String,
    /// Asignaturas del major que deben estar aprobadas (vista estricta).
    pub major_full_count: u32,
    /// Mínimo aprobado cuando el resto del major se cursa en paralelo (vista planificada).
    pub major_partial_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramRequirements {
    #[serde(default)]
    pub name: String,
    pub total_required: u32,
    #[serde(default)]
    pub core: u32,
    #[serde(default)]
    pub major: u32,
    #[serde(default)]
    pub elective: u32,
    #[serde(default = "default_max_electives")]
    pub max_electives: usize,
    /// Códigos genéricos de crédito electivo, en el orden en que se consumen.
    #[serde(default)]
    pub generic_elective_codes: Vec<String>,
    #[serde(default)]
    pub capstone: Option<CapstoneRule>,
}

fn default_max_electives() -> usize {
    DEFAULT_MAX_ELECTIVES
}

impl Default for ProgramRequirements {
    fn default() -> Self {
        Self {
            name: String::new(),
            total_required: 24,
            core: 12,
            major: 8,
            elective: 4,
            max_electives: DEFAULT_MAX_ELECTIVES,
            generic_elective_codes: Vec::new(),
            capstone: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StudentCategory {
    #[default]
    Domestic,
    International,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreditStatus {
    Completed,
    Planned,
}

/// Crédito electivo sin asignatura específica (p. ej. convalidación).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenericCredit {
    pub code: String,
    pub status: CreditStatus,
}

/// Estado mutable del estudiante durante la sesión.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentState {
    #[serde(default)]
    pub completed: BTreeSet<String>,
    #[serde(default)]
    pub planned: BTreeSet<String>,
    #[serde(default)]
    pub major: Option<String>,
    #[serde(default)]
    pub category: StudentCategory,
    #[serde(default)]
    pub exceptional_load_approved: bool,
    #[serde(default)]
    pub remaining_confirmed: bool,
    #[serde(default = "default_load_cap")]
    pub load_cap: u32,
    #[serde(default)]
    pub generic_credits: Vec<GenericCredit>,
}

fn default_load_cap() -> u32 {
    DEFAULT_LOAD_CAP
}

impl Default for StudentState {
    fn default() -> Self {
        Self {
            completed: BTreeSet::new(),
            planned: BTreeSet::new(),
            major: None,
            category: StudentCategory::Domestic,
            exceptional_load_approved: false,
            remaining_confirmed: false,
            load_cap: DEFAULT_LOAD_CAP,
            generic_credits: Vec::new(),
        }
    }
}

impl StudentState {
    /// Marca como aprobada; completado y planificado son excluyentes.
    pub fn mark_completed(&mut self, id: &str) {
        self.planned.remove(id);
        self.completed.insert(id.to_string());
    }

    pub fn mark_planned(&mut self, id: &str) {
        self.completed.remove(id);
        self.planned.insert(id.to_string());
    }

    pub fn unmark(&mut self, id: &str) {
        self.completed.remove(id);
        self.planned.remove(id);
    }

    pub fn is_completed(&self, id: &str) -> bool {
        self.completed.contains(id)
    }

    pub fn is_planned(&self, id: &str) -> bool {
        self.planned.contains(id)
    }

    pub fn credits_with(&self, status: CreditStatus) -> usize {
        self.generic_credits.iter().filter(|c| c.status == status).count()
    }

    /// Repara estados importados donde una asignatura aparece en ambos conjuntos.
    pub fn normalize(&mut self) {
        let overlap: Vec<String> = self.planned.intersection(&self.completed).cloned().collect();
        for id in overlap {
            self.planned.remove(&id);
        }
        if self.load_cap == 0 {
            self.load_cap = DEFAULT_LOAD_CAP;
        }
    }
}

/// Distancia en semestres hasta poder aprobar una asignatura.
/// `Unreachable` representa un ciclo en los prerequisitos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Distance {
    Finite(u32),
    Unreachable,
}

impl Distance {
    pub const ZERO: Distance = Distance::Finite(0);

    pub fn value(self) -> Option<u32> {
        match self {
            Distance::Finite(n) => Some(n),
            Distance::Unreachable => None,
        }
    }

    pub fn plus(self, n: u32) -> Distance {
        match self {
            Distance::Finite(d) => Distance::Finite(d.saturating_add(n)),
            Distance::Unreachable => Distance::Unreachable,
        }
    }

    pub fn exceeds(self, pace: u32) -> bool {
        match self {
            Distance::Finite(d) => d > pace,
            Distance::Unreachable => true,
        }
    }
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Distance::Finite(n) => write!(f, "{}", n),
            Distance::Unreachable => write!(f, "∞"),
        }
    }
}

// Se serializa como número o `null` para que el cliente no tenga que conocer el enum.
impl Serialize for Distance {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Distance::Finite(n) => serializer.serialize_some(n),
            Distance::Unreachable => serializer.serialize_none(),
        }
    }
}

/// Catálogo validado: programa, majors y asignaturas indexadas por código.
#[derive(Debug, Clone, Serialize)]
pub struct Catalogue {
    program: ProgramRequirements,
    majors: Vec<Major>,
    subjects: Vec<Subject>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl Catalogue {
    pub fn new(
        program: ProgramRequirements,
        majors: Vec<Major>,
        subjects: Vec<Subject>,
    ) -> Result<Self, AdvisorError> {
        let mut index = HashMap::with_capacity(subjects.len());
        for (pos, s) in subjects.iter().enumerate() {
            if s.id.trim().is_empty() {
                return Err(AdvisorError::InvalidCatalogue(format!(
                    "subject at position {} has an empty id",
                    pos
                )));
            }
            if index.insert(s.id.clone(), pos).is_some() {
                return Err(AdvisorError::InvalidCatalogue(format!(
                    "duplicate subject id '{}'",
                    s.id
                )));
            }
        }

        if let Some(rule) = &program.capstone {
            if !index.contains_key(&rule.subject) {
                return Err(AdvisorError::InvalidCatalogue(format!(
                    "capstone subject '{}' is not defined",
                    rule.subject
                )));
            }
            if rule.major_partial_count > rule.major_full_count {
                return Err(AdvisorError::InvalidCatalogue(format!(
                    "capstone partial count {} exceeds full count {}",
                    rule.major_partial_count, rule.major_full_count
                )));
            }
        }

        Ok(Self { program, majors, subjects, index })
    }

    pub fn program(&self) -> &ProgramRequirements {
        &self.program
    }

    pub fn majors(&self) -> &[Major] {
        &self.majors
    }

    pub fn major(&self, key: &str) -> Option<&Major> {
        self.majors.iter().find(|m| m.key == key)
    }

    pub fn subjects(&self) -> &[Subject] {
        &self.subjects
    }

    pub fn subject(&self, id: &str) -> Option<&Subject> {
        self.index.get(id).map(|&pos| &self.subjects[pos])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_orders_unreachable_last() {
        assert!(Distance::Finite(7) < Distance::Unreachable);
        assert_eq!(Distance::Finite(2).max(Distance::Unreachable), Distance::Unreachable);
        assert_eq!(Distance::Unreachable.plus(1), Distance::Unreachable);
        assert!(Distance::Unreachable.exceeds(100));
        assert!(!Distance::Finite(3).exceeds(3));
    }

    #[test]
    fn distance_serializes_as_number_or_null() {
        assert_eq!(serde_json::to_string(&Distance::Finite(3)).unwrap(), "3");
        assert_eq!(serde_json::to_string(&Distance::Unreachable).unwrap(), "null");
    }

    #[test]
    fn catalogue_rejects_duplicates() {
        let subjects = vec![
            Subject::new("A", "Uno", StreamKind::Core),
            Subject::new("A", "Otro", StreamKind::Core),
        ];
        let err = Catalogue::new(ProgramRequirements::default(), Vec::new(), subjects).unwrap_err();
        assert!(matches!(err, AdvisorError::InvalidCatalogue(_)));
    }

    #[test]
    fn state_keeps_completed_and_planned_exclusive() {
        let mut st = StudentState::default();
        st.mark_planned("A");
        st.mark_completed("A");
        assert!(st.is_completed("A"));
        assert!(!st.is_planned("A"));

        st.planned.insert("A".to_string());
        st.normalize();
        assert!(!st.is_planned("A"));
    }

    #[test]
    fn student_state_defaults_from_empty_json() {
        let st: StudentState = serde_json::from_str("{}").unwrap();
        assert_eq!(st.load_cap, DEFAULT_LOAD_CAP);
        assert_eq!(st.category, StudentCategory::Domestic);
    }
}
