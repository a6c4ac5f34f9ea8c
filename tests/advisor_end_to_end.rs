// Pruebas de punta a punta contra la malla incluida en `datafiles/program.json`.

use std::path::PathBuf;
use std::sync::Arc;

use quickadvisor::catalogue::resolve_subject;
use quickadvisor::models::{DiagnosticDetail, StudentCategory};
use quickadvisor::{load_catalogue, Advisor, Distance, PlanOptions, Rejection, Session, StudentState, ToggleMode};

fn bundled_advisor() -> Arc<Advisor> {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("datafiles").join("program.json");
    let catalogue = load_catalogue(&path).expect("la malla incluida debe cargar");
    Arc::new(Advisor::new(Arc::new(catalogue)))
}

fn state_with(completed: &[&str], planned: &[&str]) -> StudentState {
    let mut st = StudentState::default();
    for id in completed {
        st.mark_completed(id);
    }
    for id in planned {
        st.mark_planned(id);
    }
    st
}

#[test]
fn bundled_catalogue_is_clean() {
    let adv = bundled_advisor();
    assert_eq!(adv.catalogue().subjects().len(), 34);
    assert_eq!(adv.catalogue().majors().len(), 2);
    assert!(adv.graph().dangling().is_empty());
    assert!(adv.graph().cycles().is_empty());
}

#[test]
fn fresh_student_distances_follow_longest_chain() {
    let adv = bundled_advisor();
    let snap = adv.recompute(&StudentState::default(), &PlanOptions::default());

    assert_eq!(snap.status("COMP1001").unwrap().distance, Distance::Finite(1));
    assert_eq!(snap.status("CAP3001").unwrap().distance, Distance::Finite(5));
    // no se dicta este periodo: +1
    assert_eq!(snap.status("NET3002").unwrap().distance, Distance::Finite(4));
    assert_eq!(snap.status("AI3003").unwrap().distance, Distance::Finite(7));
    assert_eq!(snap.remaining, 24);
    assert_eq!(snap.optimal_pace, Some(6));
}

#[test]
fn fresh_student_gets_chain_delay_for_deep_major_subject() {
    let adv = bundled_advisor();
    let snap = adv.recompute(&StudentState::default(), &PlanOptions::default());

    let delay = snap
        .diagnostics
        .errors
        .iter()
        .find_map(|d| match &d.detail {
            DiagnosticDetail::ChainDelay { delayed, paths, .. } => Some((delayed.clone(), paths.clone())),
            _ => None,
        })
        .expect("debe existir un diagnóstico de retraso");
    assert_eq!(delay.0, vec!["AI3003"]);
    assert_eq!(
        delay.1[0],
        vec!["MATH1001", "MATH1002", "AI2001", "AI2002", "AI3001", "AI3003"]
    );
    assert!(snap.status("AI2001").unwrap().chain_delay);
    assert!(!snap.status("NET2001").unwrap().chain_delay);

    let tight = snap.diagnostics.warnings.iter().any(|d| {
        matches!(&d.detail, DiagnosticDetail::TightChain { max_distance: 7, .. })
    });
    assert!(tight);
}

#[test]
fn recording_mode_suppresses_chain_diagnostics() {
    let adv = bundled_advisor();
    let options = PlanOptions { mode: ToggleMode::Recording, override_prerequisites: false };
    let snap = adv.recompute(&StudentState::default(), &options);
    assert!(snap.diagnostics.errors.is_empty());
    assert!(snap.optimal_pace.is_none());
}

#[test]
fn corequisite_pair_can_be_planned_together() {
    let adv = bundled_advisor();
    let mut session = Session::new(adv, state_with(&["COMP1001", "COMP1002"], &[]));

    let web = session.snapshot().status("COMP2002").unwrap();
    assert!(!web.can_select_now);
    assert!(web.locked);

    assert!(session.toggle_subject("COMP1003", ToggleMode::Planning).accepted);
    let web = session.snapshot().status("COMP2002").unwrap();
    assert!(web.coreq_selectable);
    assert!(session.toggle_subject("COMP2002", ToggleMode::Planning).accepted);

    let concurrent = session
        .diagnostics()
        .iter()
        .any(|d| matches!(&d.detail, DiagnosticDetail::ConcurrentCorequisite { subject, .. } if subject == "COMP2002"));
    assert!(concurrent);
}

#[test]
fn capstone_accepts_major_finished_in_parallel() {
    let adv = bundled_advisor();
    let core_done = [
        "COMP1001", "MATH1001", "INFO1001", "NETW1001", "COMP1002", "COMP1003", "MATH1002", "COMP2001",
        "COMP2002", "INFO2001", "COMP2003", "NET2001", "NET2002",
    ];
    let mut session = Session::new(adv, state_with(&core_done, &[]));

    // sin major declarado el capstone no se abre
    assert!(!session.snapshot().status("CAP3001").unwrap().can_select_now);

    session.set_major(Some("net")).unwrap();
    assert!(!session.snapshot().status("CAP3001").unwrap().can_select_now);

    assert!(session.toggle_subject("NET2003", ToggleMode::Planning).accepted);
    assert!(session.toggle_subject("NET3001", ToggleMode::Planning).accepted);

    let cap = session.snapshot().status("CAP3001").unwrap();
    assert!(cap.can_select_now);
    assert!(cap.satisfied);
    assert!(session.toggle_subject("CAP3001", ToggleMode::Planning).accepted);

    // la vista estricta sigue cerrada: no todo el major está aprobado
    let e = session.snapshot().status("CAP3001").unwrap();
    assert!(e.satisfied);
    let strict = bundled_advisor().eligibility(session.state(), "CAP3001");
    assert!(!strict.prereq_now);
}

#[test]
fn international_load_needs_confirmation_for_five() {
    let adv = bundled_advisor();
    let mut session = Session::new(adv, StudentState::default());

    let out = session.set_load_settings(StudentCategory::International, false, 5, false);
    assert_eq!(out.legal_caps, vec![4]);
    assert_eq!(out.applied_cap, 4);

    let out = session.set_load_settings(StudentCategory::International, false, 5, true);
    assert_eq!(out.legal_caps, vec![4, 5]);
    assert_eq!(out.applied_cap, 5);
    assert_eq!(session.snapshot().admission_cap, 5);
}

#[test]
fn fifth_elective_is_reported_and_blocks_generic_credits() {
    let adv = bundled_advisor();
    let mut session = Session::new(adv, StudentState::default());
    for id in ["ELEC2001", "ELEC2002", "ELEC2003", "ELEC2004"] {
        assert!(session.toggle_subject(id, ToggleMode::Recording).accepted);
    }
    assert!(session.diagnostics().errors.iter().all(|d| !matches!(d.detail, DiagnosticDetail::ElectiveOverLimit { .. })));
    assert_eq!(
        session.add_generic_credit(ToggleMode::Recording).reason,
        Some(Rejection::ElectiveQuotaFull)
    );

    assert!(session.toggle_subject("ELEC3002", ToggleMode::Recording).accepted);
    let over = session
        .diagnostics()
        .errors
        .iter()
        .find_map(|d| match &d.detail {
            DiagnosticDetail::ElectiveOverLimit { codes, excess_codes, .. } => Some((codes.clone(), excess_codes.clone())),
            _ => None,
        })
        .expect("debe reportar exceso de electivos");
    assert_eq!(over.0.len(), 5);
    assert_eq!(over.1, vec!["ELEC3002"]);
}

#[test]
fn not_offered_subject_cannot_be_planned_even_with_override() {
    let adv = bundled_advisor();
    let mut session = Session::new(adv, state_with(&["NETW1001", "NET2001"], &[]));
    session.set_major(Some("net")).unwrap();
    session.set_override(true);
    assert_eq!(
        session.toggle_subject("NET3002", ToggleMode::Planning).reason,
        Some(Rejection::NotOffered)
    );
}

#[test]
fn recompute_is_idempotent_on_bundled_catalogue() {
    let adv = bundled_advisor();
    let st = state_with(&["COMP1001", "MATH1001"], &["COMP1002", "MATH1002"]);
    let options = PlanOptions::default();
    assert_eq!(adv.recompute(&st, &options), adv.recompute(&st, &options));
}

#[test]
fn names_resolve_to_codes() {
    let adv = bundled_advisor();
    let cat = adv.catalogue();
    assert_eq!(resolve_subject(cat, "data structures").map(|s| s.id.as_str()), Some("COMP2001"));
    assert_eq!(resolve_subject(cat, "Machine Lerning").map(|s| s.id.as_str()), Some("AI2002"));
}
