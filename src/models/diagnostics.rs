//! Registros de diagnóstico consumidos por la capa de presentación.
//!
//! Cada registro lleva un título legible y campos estructurados; el texto
//! final lo arma el cliente.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiagnosticDetail {
    /// Asignaturas cuya distancia supera el ritmo óptimo, con su ruta crítica.
    ChainDelay {
        optimal_pace: u32,
        remaining: u32,
        load_cap: u32,
        delayed: Vec<String>,
        paths: Vec<Vec<String>>,
    },
    /// Cadena final ajustada: aviso temprano, no bloquea.
    TightChain {
        max_distance: u32,
        subjects_at_max: Vec<String>,
        remaining: u32,
    },
    ElectiveOverLimit {
        limit: usize,
        codes: Vec<String>,
        excess_codes: Vec<String>,
    },
    ConcurrentCorequisite {
        subject: String,
        corequisites: Vec<String>,
    },
    PlanInvalidated {
        subject: String,
    },
    DanglingReference {
        subject: String,
        missing: String,
    },
    CycleDetected {
        subjects: Vec<String>,
    },
}

impl DiagnosticDetail {
    pub fn severity(&self) -> Severity {
        match self {
            DiagnosticDetail::ChainDelay { .. } | DiagnosticDetail::ElectiveOverLimit { .. } => {
                Severity::Error
            }
            _ => Severity::Warning,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            DiagnosticDetail::ChainDelay { .. } => "Prerequisite chain delays graduation",
            DiagnosticDetail::TightChain { .. } => "Tight final prerequisite chain",
            DiagnosticDetail::ElectiveOverLimit { .. } => "Too many electives",
            DiagnosticDetail::ConcurrentCorequisite { .. } => "Corequisite must be taken concurrently",
            DiagnosticDetail::PlanInvalidated { .. } => "Planned subject no longer eligible",
            DiagnosticDetail::DanglingReference { .. } => "Requirement references an unknown subject",
            DiagnosticDetail::CycleDetected { .. } => "Prerequisite cycle",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagnosticRecord {
    pub title: String,
    #[serde(flatten)]
    pub detail: DiagnosticDetail,
}

impl From<DiagnosticDetail> for DiagnosticRecord {
    fn from(detail: DiagnosticDetail) -> Self {
        Self { title: detail.title().to_string(), detail }
    }
}

/// Resultado de una pasada: se recalcula completo, nunca se acumula.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Diagnostics {
    pub errors: Vec<DiagnosticRecord>,
    pub warnings: Vec<DiagnosticRecord>,
}

impl Diagnostics {
    pub fn push(&mut self, detail: DiagnosticDetail) {
        let record = DiagnosticRecord::from(detail);
        match record.detail.severity() {
            Severity::Error => self.errors.push(record),
            Severity::Warning => self.warnings.push(record),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DiagnosticRecord> {
        self.errors.iter().chain(self.warnings.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_routes_by_severity() {
        let mut d = Diagnostics::default();
        d.push(DiagnosticDetail::PlanInvalidated { subject: "X".into() });
        d.push(DiagnosticDetail::ElectiveOverLimit { limit: 4, codes: vec![], excess_codes: vec![] });
        assert_eq!(d.errors.len(), 1);
        assert_eq!(d.warnings.len(), 1);
        assert_eq!(d.errors[0].title, "Too many electives");
    }

    #[test]
    fn record_serializes_flat() {
        let r = DiagnosticRecord::from(DiagnosticDetail::PlanInvalidated { subject: "X".into() });
        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(v["kind"], "plan_invalidated");
        assert_eq!(v["subject"], "X");
        assert_eq!(v["title"], "Planned subject no longer eligible");
    }
}
