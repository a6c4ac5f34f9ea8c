// Módulo de alto nivel del motor de asesoría
// Declarar submódulos (archivos en la carpeta `src/algorithm`)
pub mod graph;
pub mod distance;
pub mod eligibility;
pub mod load;
pub mod chain;
pub mod electives;
pub mod engine;

// Reexportar sólo la API pública que usa el servidor y los tests
pub use graph::{DanglingEdge, PrerequisiteGraph};
pub use distance::{distance, DistanceCalculator};
pub use eligibility::{Eligibility, EligibilityEvaluator};
pub use load::{admission_cap, clamp_to_legal, legal_loads, LoadOutcome};
pub use chain::{analyze_chain_delay, critical_path, detect_tight_chain, optimal_pace, ChainReport, TightChain};
pub use electives::{next_generic_code, tally_electives, ElectiveTally};
pub use engine::{Advisor, Mark, PlanOptions, Recomputation, Session, SubjectStatus, ToggleMode, ToggleOutcome};
