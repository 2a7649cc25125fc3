#![allow(clippy::cast_precision_loss)]
use approx::assert_abs_diff_eq;
use cellscope_cell::{BinningConfig, ConsensusBuilder, ConsensusError, SelectionSession};
use cellscope_core::{CellParameter, Centering, Crystal, LatticeLabel, LatticeType, UniqueAxis};
use std::collections::BTreeSet;

// 40 crystals around a C-centred monoclinic cell (unique axis b), with a
// handful of outliers on different parameters.
fn population() -> Vec<Crystal> {
    let mut crystals = Vec::new();
    for i in 0..36 {
        let jitter = f64::from(i % 5) * 0.1 - 0.2;
        let centering = if i % 12 == 0 { Centering::P } else { Centering::C };
        crystals.push(Crystal::new(
            format!("run1.h5 //{i} #0"),
            [
                61.0 + jitter,
                90.5 - jitter,
                65.2 + jitter,
                90.0,
                118.0 + jitter * 0.5,
                90.0,
            ],
            centering,
            LatticeLabel::new(LatticeType::Monoclinic, UniqueAxis::B),
        ));
    }
    let outliers = [
        [45.0, 90.5, 65.2, 90.0, 118.0, 90.0],
        [61.0, 120.0, 65.2, 90.0, 118.0, 90.0],
        [61.0, 90.5, 65.2, 75.0, 118.0, 90.0],
        [61.0, 90.5, 65.2, 90.0, 118.0, 100.0],
    ];
    for (i, cell) in outliers.into_iter().enumerate() {
        crystals.push(Crystal::new(
            format!("run2.h5 //{i} #1"),
            cell,
            Centering::P,
            LatticeLabel::placeholder(),
        ));
    }
    crystals
}

const REGIONS: [(CellParameter, f64, f64); 6] = [
    (CellParameter::A, 60.0, 62.0),
    (CellParameter::B, 89.0, 92.0),
    (CellParameter::C, 64.0, 66.0),
    (CellParameter::Alfa, 89.0, 91.0),
    (CellParameter::Beta, 117.0, 119.0),
    (CellParameter::Gamma, 89.0, 91.0),
];

fn select_all(session: &mut SelectionSession) {
    for (parameter, lo, hi) in REGIONS {
        session.set_region(parameter, lo, hi);
    }
}

fn brute_force(crystals: &[Crystal], regions: &[(CellParameter, f64, f64)]) -> Vec<usize> {
    crystals
        .iter()
        .enumerate()
        .filter(|(_, crystal)| {
            regions.iter().all(|&(p, lo, hi)| {
                let v = crystal.parameter(p);
                v >= lo && v <= hi
            })
        })
        .map(|(i, _)| i)
        .collect()
}

#[test]
fn test_partition_matches_intersection() {
    let crystals = population();
    let expected = brute_force(&crystals, &REGIONS);
    let mut session = SelectionSession::new(crystals, BinningConfig::default());
    select_all(&mut session);

    let n = session.population().len();
    let k = expected.len();
    assert_eq!(k, 36);
    assert_eq!(session.included(), expected.as_slice());
    assert_eq!(session.excluded().len(), n - k);

    let union: BTreeSet<usize> = session
        .included()
        .iter()
        .chain(session.excluded())
        .copied()
        .collect();
    assert_eq!(union.len(), n);
    assert_eq!(union, (0..n).collect());
}

#[test]
fn test_set_region_is_idempotent() {
    let mut session = SelectionSession::new(population(), BinningConfig::default());
    session.set_region(CellParameter::B, 89.0, 92.0);
    let first = (session.included().to_vec(), session.excluded().to_vec());
    session.set_region(CellParameter::B, 89.0, 92.0);
    let second = (session.included().to_vec(), session.excluded().to_vec());
    assert_eq!(first, second);
    assert_eq!(first.1.len(), 1);
}

#[test]
fn test_degenerate_region_deactivates_dimension() {
    let mut session = SelectionSession::new(population(), BinningConfig::default());
    session.set_region(CellParameter::A, 60.0, 62.0);
    session.set_region(CellParameter::Gamma, 89.0, 91.0);
    let before = session.included().to_vec();

    session.set_region(CellParameter::Beta, 117.97, 118.03);
    assert!(session.included().len() < before.len());

    session.set_region(CellParameter::Beta, 5.0, 5.0);
    assert_eq!(session.included(), before.as_slice());
    assert!(!session.dimension(CellParameter::Beta).is_selected());
    assert_eq!(session.dimension(CellParameter::Beta).region(), None);
}

#[test]
fn test_consensus_requires_every_dimension() {
    let mut session = SelectionSession::new(population(), BinningConfig::default());
    session.set_region(CellParameter::A, 60.0, 62.0);
    session.set_region(CellParameter::C, 64.0, 66.0);

    let err = ConsensusBuilder::new().build_for_session(&session).unwrap_err();
    assert_eq!(
        err,
        ConsensusError::NotReady {
            missing: vec![
                CellParameter::B,
                CellParameter::Alfa,
                CellParameter::Beta,
                CellParameter::Gamma
            ],
        }
    );
    assert!(err.to_string().contains("missing: b, alfa, beta, gamma"));
}

#[test]
fn test_consensus_over_selection() {
    let mut session = SelectionSession::new(population(), BinningConfig::default());
    select_all(&mut session);

    let consensus = ConsensusBuilder::new().build_for_session(&session).unwrap();
    let cell = consensus.cell;
    assert_eq!(consensus.crystals, 36);
    // 33 of 36 are C-centred.
    assert_eq!(cell.centering, Centering::C);
    assert_eq!(cell.lattice_type, LatticeType::Monoclinic);
    assert_eq!(cell.unique_axis, UniqueAxis::B);
    assert_abs_diff_eq!(cell.a, 61.0, epsilon = 0.02);
    assert_abs_diff_eq!(cell.b, 90.5, epsilon = 0.02);
    assert_abs_diff_eq!(cell.gamma, 90.0, epsilon = 1e-9);
    assert!(consensus.fits[0].std_dev > 0.0);
}

#[test]
fn test_selection_that_excludes_everything() {
    let mut session = SelectionSession::new(population(), BinningConfig::default());
    select_all(&mut session);
    session.set_region(CellParameter::A, 10.0, 20.0);
    assert!(session.included().is_empty());
    assert_eq!(
        ConsensusBuilder::new().build_for_session(&session).unwrap_err(),
        ConsensusError::EmptySelection
    );
}
