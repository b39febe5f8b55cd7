#![allow(dead_code)]

use dpll_sat::sat::assignment::Assignment;
use dpll_sat::sat::cnf::CnfFormula;

/// Random 3-CNF over `vars` variables; literals within a clause may repeat.
pub fn random_3cnf(rng: &mut fastrand::Rng, vars: i32, clauses: usize) -> CnfFormula {
    let rows = (0..clauses)
        .map(|_| {
            (0..3)
                .map(|_| {
                    let v = rng.i32(1..=vars);
                    if rng.bool() { v } else { -v }
                })
                .collect()
        })
        .collect::<Vec<Vec<i32>>>();

    let mut formula = CnfFormula::with_props(vars.unsigned_abs() as usize);
    formula.extend(CnfFormula::from_dimacs(&rows).clauses().iter().cloned());
    formula
}

/// `holes + 1` pigeons into `holes` holes.
pub fn pigeonhole(holes: i32) -> CnfFormula {
    let pigeons = holes + 1;
    let var = |p: i32, h: i32| p * holes + h + 1;

    let mut rows: Vec<Vec<i32>> = (0..pigeons)
        .map(|p| (0..holes).map(|h| var(p, h)).collect())
        .collect();
    for h in 0..holes {
        for p in 0..pigeons {
            for q in p + 1..pigeons {
                rows.push(vec![-var(p, h), -var(q, h)]);
            }
        }
    }
    CnfFormula::from_dimacs(&rows)
}

/// Decides `formula` by enumerating every total assignment.
pub fn brute_force_sat(formula: &CnfFormula) -> bool {
    let n = formula.num_props();
    assert!(n <= 16, "too many propositions to enumerate");

    (0u32..1 << n).any(|bits| {
        let values = (0..n).map(|i| (bits >> i) & 1 == 1).collect::<Vec<_>>();
        formula.verify(&Assignment::from_values(&values))
    })
}
