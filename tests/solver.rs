use std::time::Duration;

use chainsat::{
    count_models, ProofAssertionError, ProofEvent, Solver, SolverConfig, SolverError,
};
use rand::{rngs::SmallRng, Rng, SeedableRng};

fn solver_with(vars: usize, clauses: &[Vec<i32>], config: SolverConfig) -> Solver {
    let mut solver = Solver::new(config);
    solver.new_var(vars);
    for clause in clauses {
        // contradictions are remembered by the solver
        let _ = solver.add_clause(clause);
    }
    solver
}

fn proof_config() -> SolverConfig {
    SolverConfig {
        proof: true,
        ..SolverConfig::default()
    }
}

fn holds(bits: u32, lit: i32) -> bool {
    let var = lit.unsigned_abs() - 1;
    ((bits >> var) & 1 == 1) == (lit > 0)
}

fn brute_force(vars: usize, clauses: &[Vec<i32>], at_least: &[(Vec<i32>, usize)]) -> u64 {
    (0..1u32 << vars)
        .filter(|&bits| {
            clauses
                .iter()
                .all(|clause| clause.iter().any(|&lit| holds(bits, lit)))
                && at_least.iter().all(|(literals, degree)| {
                    literals.iter().filter(|&&lit| holds(bits, lit)).count() >= *degree
                })
        })
        .count() as u64
}

fn random_clauses(rng: &mut SmallRng, vars: usize, count: usize, width: usize) -> Vec<Vec<i32>> {
    (0..count)
        .map(|_| {
            (0..width)
                .map(|_| {
                    let var = rng.gen_range(1..=vars as i32);
                    if rng.gen_bool(0.5) {
                        var
                    } else {
                        -var
                    }
                })
                .collect()
        })
        .collect()
}

/// `pigeons` pigeons in `pigeons - 1` holes.
fn pigeonhole(pigeons: usize) -> (usize, Vec<Vec<i32>>) {
    let holes = pigeons - 1;
    let var = |p: usize, h: usize| (p * holes + h + 1) as i32;
    let mut clauses = vec![];
    for p in 0..pigeons {
        clauses.push((0..holes).map(|h| var(p, h)).collect());
    }
    for h in 0..holes {
        for p in 0..pigeons {
            for q in p + 1..pigeons {
                clauses.push(vec![-var(p, h), -var(q, h)]);
            }
        }
    }
    (pigeons * holes, clauses)
}

#[test]
fn two_opposite_clauses_have_six_models() {
    let mut solver = solver_with(3, &[vec![1, 2, 3], vec![-1, -2, -3]], SolverConfig::default());
    assert_eq!(solver.is_satisfiable(), Ok(true));
    assert_eq!(count_models(&mut solver), Ok(6));
}

#[test]
fn single_positive_clause_excludes_only_all_false() {
    for n in 2..=12 {
        let clause: Vec<i32> = (1..=n).collect();
        let mut solver = solver_with(n as usize, &[clause], SolverConfig::default());
        assert_eq!(count_models(&mut solver), Ok((1 << n) - 1), "n = {}", n);
    }
}

#[test]
fn contradicting_units_fail_on_the_second() {
    let mut solver = Solver::default();
    solver.new_var(1);
    assert!(solver.add_clause(&[1]).is_ok());
    assert!(matches!(
        solver.add_clause(&[-1]),
        Err(SolverError::Contradiction(_))
    ));
    assert_eq!(solver.is_satisfiable(), Ok(false));
}

#[test]
fn empty_clause_is_a_contradiction() {
    let mut solver = Solver::default();
    solver.new_var(2);
    assert!(matches!(
        solver.add_clause(&[]),
        Err(SolverError::Contradiction(_))
    ));
}

#[test]
fn minimal_refutation_is_checked() {
    let mut solver = solver_with(2, &[vec![1, 2], vec![-1, 2], vec![-2]], proof_config());
    assert_eq!(solver.is_satisfiable(), Ok(false));
    assert_eq!(solver.check_proof(), Ok(()));
}

#[test]
fn refutation_found_by_search_is_checked() {
    // every clause has two literals left, so nothing is decided while adding
    let clauses = vec![vec![1, 2], vec![1, -2], vec![-1, 3], vec![-1, -3]];
    let mut solver = solver_with(3, &clauses, proof_config());
    assert_eq!(solver.is_satisfiable(), Ok(false));
    assert_eq!(solver.check_proof(), Ok(()));

    let proof = solver.proof().unwrap();
    let roots = proof
        .events()
        .filter(|event| matches!(event, ProofEvent::Root { .. }))
        .count();
    assert_eq!(roots, clauses.len());
}

#[test]
fn pigeonhole_refutations_are_checked() {
    for pigeons in 2..=5 {
        let (vars, clauses) = pigeonhole(pigeons);
        let mut solver = solver_with(vars, &clauses, proof_config());
        assert_eq!(solver.is_satisfiable(), Ok(false), "{} pigeons", pigeons);
        assert_eq!(solver.check_proof(), Ok(()), "{} pigeons", pigeons);
    }
}

#[test]
fn refutation_survives_clause_deletion() {
    let (vars, clauses) = pigeonhole(6);
    let config = SolverConfig {
        min_learnts: 20,
        learnt_ratio: 0.0,
        ..proof_config()
    };
    let mut solver = solver_with(vars, &clauses, config);
    assert_eq!(solver.is_satisfiable(), Ok(false));
    assert!(solver.statistics().reductions > 0);
    assert!(solver
        .proof()
        .unwrap()
        .events()
        .any(|event| matches!(event, ProofEvent::Deleted(_))));
    assert_eq!(solver.check_proof(), Ok(()));
}

#[test]
fn random_three_sat_agrees_with_brute_force() {
    let mut rng = SmallRng::seed_from_u64(7);
    for round in 0..60 {
        let vars = 10;
        let clauses = random_clauses(&mut rng, vars, 43, 3);
        let expected = brute_force(vars, &clauses, &[]);

        let mut solver = solver_with(vars, &clauses, proof_config());
        let sat = solver.is_satisfiable().unwrap();
        assert_eq!(sat, expected > 0, "round {}", round);
        if sat {
            let model = solver.model().unwrap();
            assert!(clauses
                .iter()
                .all(|clause| clause.iter().any(|lit| model.contains(lit))));
        } else {
            assert_eq!(solver.check_proof(), Ok(()), "round {}", round);
        }
    }
}

#[test]
fn model_counts_agree_with_brute_force() {
    let mut rng = SmallRng::seed_from_u64(11);
    for round in 0..20 {
        let vars = 8;
        let clauses = random_clauses(&mut rng, vars, 20, 3);
        let expected = brute_force(vars, &clauses, &[]);
        let mut solver = solver_with(vars, &clauses, SolverConfig::default());
        assert_eq!(count_models(&mut solver), Ok(expected), "round {}", round);
    }
}

#[test]
fn cardinality_constraints_agree_with_brute_force() {
    let mut rng = SmallRng::seed_from_u64(3);
    for round in 0..30 {
        let vars = 8;
        let clauses = random_clauses(&mut rng, vars, 6, 3);
        let mut at_least = vec![];
        for _ in 0..3 {
            let mut pool: Vec<i32> = (1..=vars as i32).collect();
            let size = rng.gen_range(3..=5);
            let literals: Vec<i32> = (0..size)
                .map(|_| {
                    let var = pool.swap_remove(rng.gen_range(0..pool.len()));
                    if rng.gen_bool(0.5) {
                        var
                    } else {
                        -var
                    }
                })
                .collect();
            at_least.push((literals, rng.gen_range(1..size)));
        }
        let expected = brute_force(vars, &clauses, &at_least);

        let mut solver = solver_with(vars, &clauses, SolverConfig::default());
        for (literals, degree) in &at_least {
            let _ = solver.add_at_least(literals, *degree);
        }
        assert_eq!(count_models(&mut solver), Ok(expected), "round {}", round);
    }
}

#[test]
fn cardinality_edge_cases() {
    let mut solver = Solver::default();
    solver.new_var(4);
    solver.add_at_least(&[1, 2, 3, 4], 3).unwrap();
    solver.add_clause(&[-1, -2]).unwrap();
    assert_eq!(count_models(&mut solver), Ok(2));

    let mut solver = Solver::default();
    solver.new_var(3);
    assert!(matches!(
        solver.add_at_least(&[1, 2], 3),
        Err(SolverError::Contradiction(_))
    ));

    let mut solver = Solver::default();
    solver.new_var(3);
    solver.add_at_least(&[1, 2], 2).unwrap();
    assert_eq!(solver.is_satisfiable(), Ok(true));
    let model = solver.model().unwrap();
    assert!(model.contains(&1) && model.contains(&2));

    let mut solver = Solver::new(proof_config());
    solver.new_var(3);
    assert_eq!(
        solver.add_at_least(&[1, 2, 3], 2),
        Err(SolverError::ProofUnsupported)
    );
    assert!(solver.add_at_least(&[1, 2, 3], 1).is_ok());
}

#[test]
fn assumptions_do_not_refute_the_formula() {
    let mut solver = solver_with(3, &[vec![1, 2], vec![-1, 3]], proof_config());
    assert_eq!(solver.is_satisfiable_with(&[-2]), Ok(true));
    let model = solver.model().unwrap();
    assert!(model.contains(&1) && model.contains(&3));

    assert_eq!(solver.is_satisfiable_with(&[-2, -3]), Ok(false));
    assert_eq!(solver.check_proof(), Err(ProofAssertionError::NoRefutation));
    assert_eq!(solver.is_satisfiable(), Ok(true));
}

#[test]
fn timeouts_leave_the_solver_usable() {
    let (vars, clauses) = pigeonhole(5);
    let mut solver = solver_with(vars, &clauses, SolverConfig::default());
    solver.set_timeout_on_conflicts(1);
    assert_eq!(solver.is_satisfiable(), Err(SolverError::Timeout));
    assert!(solver.model().is_none());

    solver.set_timeout_on_conflicts(1_000_000);
    assert_eq!(solver.is_satisfiable(), Ok(false));

    let (vars, clauses) = pigeonhole(6);
    let mut solver = solver_with(vars, &clauses, SolverConfig::default());
    solver.set_timeout(Duration::ZERO);
    assert_eq!(solver.is_satisfiable(), Err(SolverError::Timeout));
}

#[test]
fn proof_is_unavailable_unless_enabled() {
    let mut solver = solver_with(1, &[vec![1], vec![-1]], SolverConfig::default());
    assert_eq!(solver.is_satisfiable(), Ok(false));
    assert!(solver.proof().is_none());
    assert_eq!(solver.check_proof(), Err(ProofAssertionError::Disabled));
}

#[test]
fn empty_clause_refutation_is_checked() {
    let mut solver = Solver::new(proof_config());
    solver.new_var(2);
    solver.add_clause(&[1, 2]).unwrap();
    assert!(matches!(
        solver.add_clause(&[]),
        Err(SolverError::Contradiction(_))
    ));
    assert_eq!(solver.is_satisfiable(), Ok(false));
    assert_eq!(solver.check_proof(), Ok(()));
}

#[test]
fn nothing_is_added_once_unsatisfiable() {
    for config in [SolverConfig::default(), proof_config()] {
        let mut solver = solver_with(2, &[vec![1], vec![-1]], config);
        for degree in 0..=2 {
            assert!(matches!(
                solver.add_at_least(&[1, 2], degree),
                Err(SolverError::Contradiction(_))
            ));
        }
        assert!(matches!(
            solver.add_clause(&[2]),
            Err(SolverError::Contradiction(_))
        ));
    }
}
