//! Strategy-level tests against mock collaborators.

use std::cell::RefCell;
use std::rc::Rc;

use rand::SeedableRng;
use rand_xorshift::XorShiftRng;

use crate::bridge::DecisionClient;
use crate::common::*;
use crate::gen::*;
use crate::oracle::{scoped, CaseSplit, Expander, Frames, SatSession};

fn int_sym(name: &str) -> Term {
    term::sym(name, typ::int())
}
fn array_sym(name: &str) -> Term {
    term::sym(name, typ::array(typ::int(), typ::int()))
}
fn term_set(lits: &[Term]) -> TermSet {
    let mut set = TermSet::new();
    for lit in lits {
        set.insert(lit.clone());
    }
    set
}
fn lemma_of(lits: Vec<Term>, level: Level) -> Lemma {
    Lemma::new(lits, level, 0, 0.into())
}

/// Inductiveness oracle accepting a fixed family of cubes.
///
/// Matching is order-insensitive. Accepted cubes are certified at
/// `max(stored level, queried level)` unless a level is forced, which
/// lets tests exercise the level regression hard stop.
#[derive(Clone)]
struct MockFrames {
    inductive: Vec<(TermSet, Level)>,
    forced_level: Option<Level>,
    core: Option<(Vec<Term>, Level)>,
    checks: usize,
    invariant_queries: usize,
}
impl MockFrames {
    fn new() -> Self {
        MockFrames {
            inductive: vec![],
            forced_level: None,
            core: None,
            checks: 0,
            invariant_queries: 0,
        }
    }
    fn accept(mut self, lits: &[Term], level: Level) -> Self {
        self.inductive.push((term_set(lits), level));
        self
    }
    fn force_level(mut self, level: Level) -> Self {
        self.forced_level = Some(level);
        self
    }
    fn with_core(mut self, core: Vec<Term>, level: Level) -> Self {
        self.core = Some((core, level));
        self
    }
    fn accepts(&self, cube: &[Term]) -> Option<Level> {
        for (set, level) in &self.inductive {
            if set.len() == cube.len() && cube.iter().all(|lit| set.contains(lit)) {
                return Some(*level);
            }
        }
        None
    }
}
impl Frames for MockFrames {
    fn check_inductive(
        &mut self,
        level: Level,
        cube: &[Term],
        _weakness: usize,
    ) -> Res<Option<Level>> {
        self.checks += 1;
        match self.accepts(cube) {
            Some(stored) => Ok(Some(self.forced_level.unwrap_or_else(|| stored.max(level)))),
            None => Ok(None),
        }
    }
    fn is_invariant(&mut self, _level: Level, lemma: &Lemma) -> Res<Option<(Vec<Term>, Level)>> {
        self.invariant_queries += 1;
        if let Some((core, level)) = self.core.clone() {
            return Ok(Some((core, level)));
        }
        match self.accepts(lemma.cube()) {
            Some(stored) => Ok(Some((lemma.cube().to_vec(), stored))),
            None => Ok(None),
        }
    }
}

/// Satisfiability session scripted with unsatisfiable literal pairs.
///
/// Checks push/pop balance and records every asserted literal. Cloning
/// shares the state, so tests can inspect it after the strategy consumed
/// the session.
#[derive(Clone)]
struct SharedSat(Rc<RefCell<SatState>>);
struct SatState {
    unsat_pairs: Vec<(Term, Term)>,
    scopes: Vec<Vec<Term>>,
    asserted: Vec<Term>,
}
impl SharedSat {
    fn new(unsat_pairs: Vec<(Term, Term)>) -> Self {
        SharedSat(Rc::new(RefCell::new(SatState {
            unsat_pairs,
            scopes: vec![vec![]],
            asserted: vec![],
        })))
    }
    fn depth(&self) -> usize {
        self.0.borrow().scopes.len() - 1
    }
    fn asserted(&self) -> Vec<Term> {
        self.0.borrow().asserted.clone()
    }
    fn factory(&self) -> crate::gen::array_eq::SessionFactory {
        let shared = self.clone();
        Box::new(move || Ok(Box::new(shared.clone()) as Box<dyn SatSession>))
    }
}
impl SatSession for SharedSat {
    fn declare_const(&mut self, _: &str, _: &Typ) -> Res<()> {
        Ok(())
    }
    fn push(&mut self) -> Res<()> {
        self.0.borrow_mut().scopes.push(vec![]);
        Ok(())
    }
    fn pop(&mut self) -> Res<()> {
        let mut state = self.0.borrow_mut();
        assert!(state.scopes.len() > 1, "pop without matching push");
        state.scopes.pop();
        Ok(())
    }
    fn assert_lit(&mut self, lit: &Term) -> Res<()> {
        let mut state = self.0.borrow_mut();
        state.asserted.push(lit.clone());
        state
            .scopes
            .last_mut()
            .expect("at least the base scope is open")
            .push(lit.clone());
        Ok(())
    }
    fn check(&mut self) -> Res<Option<bool>> {
        let state = self.0.borrow();
        let live: Vec<&Term> = state.scopes.iter().flatten().collect();
        for (lhs, rhs) in &state.unsat_pairs {
            if live.contains(&lhs) && live.contains(&rhs) {
                return Ok(Some(false));
            }
        }
        Ok(Some(true))
    }
}

// |===| Boolean inductive drop.

#[test]
fn bool_ind_chain_drop() {
    let (a, b, c) = (int_sym("a"), int_sym("b"), int_sym("c"));
    let (a, b, c) = (
        term::ge(a, term::int(0)),
        term::ge(b, term::int(0)),
        term::ge(c, term::int(0)),
    );
    let mut frames = MockFrames::new()
        .accept(&[b.clone(), c.clone()], 2)
        .accept(&[c.clone()], 2);
    let mut gen = BoolIndGen::new().with_failure_limit(0);
    let mut lemma = lemma_of(vec![a, b, c.clone()], 2);

    gen.generalize(&mut frames, &mut lemma).expect("generalize");

    assert_eq!(lemma.cube().to_vec(), vec![c]);
    assert_eq!(lemma.level(), 2);
    assert_eq!(gen.stats().count, 1);

    // Idempotent: the singleton cannot shrink further.
    let checks = frames.checks;
    gen.generalize(&mut frames, &mut lemma).expect("generalize");
    assert_eq!(lemma.cube().len(), 1);
    assert_eq!(frames.checks, checks)
}

#[test]
fn bool_ind_adopts_oracle_level() {
    let (a, b) = (int_sym("a"), int_sym("b"));
    let mut frames = MockFrames::new().accept(&[b.clone()], 7);
    let mut gen = BoolIndGen::new();
    let mut lemma = lemma_of(vec![a, b.clone()], 3);

    gen.generalize(&mut frames, &mut lemma).expect("generalize");

    assert_eq!(lemma.cube().to_vec(), vec![b]);
    assert_eq!(lemma.level(), 7)
}

#[test]
fn bool_ind_level_regression_is_hard_stop() {
    let (a, b) = (int_sym("a"), int_sym("b"));
    let mut frames = MockFrames::new().accept(&[b.clone()], 1).force_level(1);
    let mut gen = BoolIndGen::new();
    let mut lemma = lemma_of(vec![a.clone(), b.clone()], 3);

    let err = gen
        .generalize(&mut frames, &mut lemma)
        .expect_err("level regression must fail");
    assert!(err.is_hard_stop());
    // The lemma is untouched.
    assert_eq!(lemma.cube().to_vec(), vec![a, b]);
    assert_eq!(lemma.level(), 3)
}

#[test]
fn bool_ind_failure_limit() {
    let (a, b, c) = (int_sym("a"), int_sym("b"), int_sym("c"));
    let mut frames = MockFrames::new();
    let mut gen = BoolIndGen::new().with_failure_limit(2);
    let mut lemma = lemma_of(vec![a, b, c], 1);

    gen.generalize(&mut frames, &mut lemma).expect("generalize");

    assert_eq!(lemma.cube().len(), 3);
    assert_eq!(frames.checks, 2);
    assert_eq!(gen.stats().num_failures, 2)
}

#[test]
fn bool_ind_array_only_skips_scalar_literals() {
    let (a, b) = (int_sym("a"), int_sym("b"));
    // Would accept any drop, but no literal mentions an array.
    let mut frames = MockFrames::new()
        .accept(&[a.clone()], 1)
        .accept(&[b.clone()], 1);
    let mut gen = BoolIndGen::new().array_only();
    let mut lemma = lemma_of(vec![a, b], 1);

    gen.generalize(&mut frames, &mut lemma).expect("generalize");

    assert_eq!(lemma.cube().len(), 2);
    assert_eq!(frames.checks, 0)
}

#[test]
fn bool_ind_expansion_substitutes_case_split() {
    let x = int_sym("x");
    let other = term::sym("p", typ::bool());
    let lit = term::ge(x.clone(), term::int(0));
    let refined = term::gt(x, term::int(0));
    // Dropping `lit` outright does not work, its strict refinement does.
    let mut frames = MockFrames::new().accept(&[refined.clone(), other.clone()], 4);
    let mut gen = BoolIndGen::new().with_expander(Box::new(CaseSplit));
    let mut lemma = lemma_of(vec![lit, other.clone()], 4);

    gen.generalize(&mut frames, &mut lemma).expect("generalize");

    assert_eq!(lemma.cube().to_vec(), vec![refined, other]);
    assert_eq!(lemma.level(), 4);
    assert_eq!(gen.stats().count, 1)
}

#[test]
fn empty_cube_is_left_alone() {
    let mut frames = MockFrames::new();
    let mut lemma = lemma_of(vec![], 1);
    BoolIndGen::new()
        .generalize(&mut frames, &mut lemma)
        .expect("bool ind");
    HeurIndGen::new()
        .generalize(&mut frames, &mut lemma)
        .expect("heur ind");
    UnsatCoreGen::new()
        .generalize(&mut frames, &mut lemma)
        .expect("unsat core");
    ArrayEqGen::new()
        .generalize(&mut frames, &mut lemma)
        .expect("array eq");
    EqRewriteGen::new()
        .generalize(&mut frames, &mut lemma)
        .expect("eq rewrite");
    assert_eq!(frames.checks, 0);
    assert_eq!(frames.invariant_queries, 0)
}

// |===| Case-split expansion.

#[test]
fn case_split_refinements() {
    let (x, y) = (int_sym("x"), int_sym("y"));
    let mut expander = CaseSplit;

    let ge = term::ge(x.clone(), y.clone());
    assert_eq!(
        expander.expand(&ge),
        vec![term::gt(x.clone(), y.clone()), term::eq(x.clone(), y.clone())]
    );

    let le = term::le(x.clone(), y.clone());
    assert_eq!(
        expander.expand(&le),
        vec![term::lt(x.clone(), y.clone()), term::eq(x.clone(), y.clone())]
    );

    let neq = term::not(term::eq(x.clone(), y.clone()));
    assert_eq!(
        expander.expand(&neq),
        vec![term::lt(x.clone(), y.clone()), term::gt(x.clone(), y.clone())]
    );

    // Nothing useful for an opaque literal.
    let opaque = term::sym("p", typ::bool());
    assert_eq!(expander.expand(&opaque), vec![opaque.clone()])
}

// |===| Heuristic inductive drop.

#[test]
fn drop_policy_formulas() {
    let mut rng = XorShiftRng::seed_from_u64(42);
    let fresh = LitStats {
        seen: 1,
        succeeded: 0,
    };
    let seasoned = LitStats {
        seen: 4,
        succeeded: 2,
    };

    // Below the threshold, every policy lets the attempt through.
    for policy in [
        DropPolicy::Passthrough,
        DropPolicy::GlobalSample,
        DropPolicy::GlobalThenRatio,
        DropPolicy::Ratio,
        DropPolicy::GlobalThenStochastic,
        DropPolicy::Stochastic,
    ] {
        assert!(policy.decide(&mut rng, fresh, 3, 0, 0, 5, 0.5))
    }

    // Passthrough only gates first visits past the threshold.
    assert!(!DropPolicy::Passthrough.decide(&mut rng, fresh, 9, 4, 4, 5, 0.5));
    assert!(DropPolicy::Passthrough.decide(&mut rng, seasoned, 9, 4, 4, 5, 0.5));

    // Global sample: degenerate calibration passes, probability zero and
    // one are deterministic whatever the rng draws.
    assert!(DropPolicy::GlobalSample.decide(&mut rng, fresh, 9, 1, 1, 5, 0.5));
    assert!(!DropPolicy::GlobalSample.decide(&mut rng, fresh, 9, 10, 1, 5, 0.5));
    assert!(DropPolicy::GlobalSample.decide(&mut rng, fresh, 9, 1, 100, 5, 0.5));

    // Own-ratio thresholds.
    assert!(DropPolicy::Ratio.decide(&mut rng, seasoned, 9, 0, 0, 5, 0.5));
    assert!(!DropPolicy::Ratio.decide(&mut rng, seasoned, 9, 0, 0, 5, 0.6));
    assert!(!DropPolicy::Ratio.decide(&mut rng, fresh, 9, 0, 0, 5, 0.1));
    assert!(DropPolicy::GlobalThenRatio.decide(&mut rng, seasoned, 9, 0, 0, 5, 0.5));
    assert!(!DropPolicy::GlobalThenRatio.decide(&mut rng, seasoned, 9, 0, 0, 5, 0.6));
    // First visit falls back to the (degenerate) global sample.
    assert!(DropPolicy::GlobalThenRatio.decide(&mut rng, fresh, 9, 0, 0, 5, 0.6));

    // Stochastic extremes: ratio one always passes, ratio zero never.
    let sure = LitStats {
        seen: 3,
        succeeded: 3,
    };
    let never = LitStats {
        seen: 3,
        succeeded: 0,
    };
    assert!(DropPolicy::Stochastic.decide(&mut rng, sure, 9, 0, 0, 5, 0.5));
    assert!(!DropPolicy::Stochastic.decide(&mut rng, never, 9, 0, 0, 5, 0.5));
    assert!(DropPolicy::GlobalThenStochastic.decide(&mut rng, sure, 9, 0, 0, 5, 0.5));
    assert!(!DropPolicy::GlobalThenStochastic.decide(&mut rng, never, 9, 0, 0, 5, 0.5))
}

#[test]
fn heuristic_threshold_gating() {
    let lits = vec![
        term::ge(int_sym("x"), term::int(0)),
        term::ge(int_sym("y"), term::int(0)),
        term::ge(int_sym("z"), term::int(0)),
    ];
    // The oracle never accepts anything, so success ratios stay at zero.
    let mut frames = MockFrames::new();
    let mut gen = HeurIndGen::new()
        .with_policy(DropPolicy::Ratio)
        .with_threshold(5)
        .with_ratio(0.1)
        .with_failure_limit(0);

    // First five attempts go through regardless of history.
    let mut lemma = lemma_of(lits.clone(), 1);
    gen.generalize(&mut frames, &mut lemma).expect("run 1");
    assert_eq!(frames.checks, 3);
    let mut lemma = lemma_of(lits.clone(), 1);
    gen.generalize(&mut frames, &mut lemma).expect("run 2");
    assert_eq!(frames.checks, 5);
    assert_eq!(gen.attempts(), 5);

    // Past the threshold, zero-ratio literals are always skipped.
    let mut lemma = lemma_of(lits.clone(), 1);
    gen.generalize(&mut frames, &mut lemma).expect("run 3");
    assert_eq!(frames.checks, 5);
    assert_eq!(lemma.cube().len(), 3);

    // Gated-away visits did not count as observations.
    assert_eq!(
        gen.lit_stats(&lits[0]),
        Some(LitStats {
            seen: 2,
            succeeded: 0
        })
    );
    assert_eq!(
        gen.lit_stats(&lits[2]),
        Some(LitStats {
            seen: 1,
            succeeded: 0
        })
    )
}

#[test]
fn heuristic_statistics_accounting() {
    let (a, b) = (int_sym("a"), int_sym("b"));
    let mut frames = MockFrames::new().accept(&[b.clone()], 1);
    let mut gen = HeurIndGen::new()
        .with_policy(DropPolicy::Passthrough)
        .with_threshold(100);
    let mut lemma = lemma_of(vec![a.clone(), b.clone()], 1);

    gen.generalize(&mut frames, &mut lemma).expect("generalize");

    assert_eq!(lemma.cube().to_vec(), vec![b.clone()]);
    assert_eq!(gen.stats().count, 1);
    assert_eq!(
        gen.lit_stats(&a),
        Some(LitStats {
            seen: 1,
            succeeded: 1
        })
    );
    assert_eq!(
        gen.lit_stats(&b),
        Some(LitStats {
            seen: 1,
            succeeded: 0
        })
    );
    for lit in [&a, &b] {
        let stats = gen.lit_stats(lit).expect("visited");
        assert!(stats.succeeded <= stats.seen)
    }
}

// |===| Unsat-core shrinking.

#[test]
fn unsat_core_shrinks_and_adopts_level() {
    let (a, b) = (int_sym("a"), int_sym("b"));
    let mut frames = MockFrames::new().with_core(vec![a.clone()], 3);
    let mut gen = UnsatCoreGen::new();
    let mut lemma = lemma_of(vec![a.clone(), b], 1);

    gen.generalize(&mut frames, &mut lemma).expect("generalize");
    assert_eq!(lemma.cube().to_vec(), vec![a]);
    assert_eq!(lemma.level(), 3);
    assert_eq!(gen.stats().count, 1);

    // Idempotent once the core cannot shrink.
    gen.generalize(&mut frames, &mut lemma).expect("generalize");
    assert_eq!(lemma.cube().len(), 1);
    assert_eq!(lemma.level(), 3);
    assert_eq!(gen.stats().count, 1)
}

#[test]
fn unsat_core_rejection_is_unsound_oracle() {
    let (a, b) = (int_sym("a"), int_sym("b"));
    let mut frames = MockFrames::new();
    let mut gen = UnsatCoreGen::new();
    let mut lemma = lemma_of(vec![a, b], 1);

    let err = gen
        .generalize(&mut frames, &mut lemma)
        .expect_err("rejection of a certified lemma");
    assert!(err.is_hard_stop())
}

#[test]
fn unsat_core_level_regression_is_hard_stop() {
    let (a, b) = (int_sym("a"), int_sym("b"));
    let mut frames = MockFrames::new().with_core(vec![a], 1);
    let mut gen = UnsatCoreGen::new();
    let mut lemma = lemma_of(vec![int_sym("c"), b], 4);

    let err = gen
        .generalize(&mut frames, &mut lemma)
        .expect_err("level regression must fail");
    assert!(err.is_hard_stop())
}

// |===| Array-equality strengthening.

#[test]
fn array_eq_two_constants_nothing_unsat() {
    let (a, b) = (array_sym("A"), array_sym("B"));
    let neg = term::not(term::eq(a.clone(), b.clone()));
    let other = term::ge(int_sym("x"), term::int(0));
    let sat = SharedSat::new(vec![]);
    let mut gen = ArrayEqGen::with_sessions(sat.factory());
    let mut frames = MockFrames::new();
    let mut lemma = lemma_of(vec![neg.clone(), other], 1);

    gen.generalize(&mut frames, &mut lemma).expect("generalize");

    assert_eq!(lemma.cube().len(), 2);
    assert_eq!(frames.checks, 0);
    // The negated array equality is never even asserted.
    assert!(!sat.asserted().contains(&neg));
    assert_eq!(sat.depth(), 0)
}

#[test]
fn array_eq_below_minimum_is_noop() {
    let a = array_sym("A");
    let lit = term::eq(term::select(a, term::int(0)), term::int(1));
    let sat = SharedSat::new(vec![]);
    let mut gen = ArrayEqGen::with_sessions(sat.factory());
    let mut frames = MockFrames::new();
    let mut lemma = lemma_of(vec![lit], 1);

    gen.generalize(&mut frames, &mut lemma).expect("generalize");

    assert_eq!(lemma.cube().len(), 1);
    assert!(sat.asserted().is_empty());
    assert_eq!(frames.checks, 0)
}

#[test]
fn array_eq_strengthen_commits_when_certified() {
    let (a, b, c) = (array_sym("A"), array_sym("B"), array_sym("C"));
    let lit = term::eq(
        term::select(a.clone(), term::int(0)),
        term::select(b.clone(), term::int(0)),
    );
    let third = term::ge(term::select(c, int_sym("i")), term::int(0));
    let eq_ab = term::eq(a, b);
    let expected = vec![term::not(eq_ab.clone()), third.clone()];

    let sat = SharedSat::new(vec![(lit.clone(), eq_ab)]);
    let mut gen = ArrayEqGen::with_sessions(sat.factory());
    let mut frames = MockFrames::new().accept(&expected, 4);
    let mut lemma = lemma_of(vec![lit, third], 2);

    gen.generalize(&mut frames, &mut lemma).expect("generalize");

    assert_eq!(lemma.cube().to_vec(), expected);
    assert_eq!(lemma.level(), 4);
    assert_eq!(gen.stats().count, 1);
    assert_eq!(sat.depth(), 0)
}

#[test]
fn array_eq_speculative_rewrite_is_discarded_on_rejection() {
    let (a, b, c) = (array_sym("A"), array_sym("B"), array_sym("C"));
    let lit = term::eq(
        term::select(a.clone(), term::int(0)),
        term::select(b.clone(), term::int(0)),
    );
    let third = term::ge(term::select(c, int_sym("i")), term::int(0));
    let eq_ab = term::eq(a, b);

    let sat = SharedSat::new(vec![(lit.clone(), eq_ab)]);
    let mut gen = ArrayEqGen::with_sessions(sat.factory());
    // Oracle rejects the strengthened cube.
    let mut frames = MockFrames::new();
    let mut lemma = lemma_of(vec![lit.clone(), third.clone()], 2);

    gen.generalize(&mut frames, &mut lemma).expect("generalize");

    assert_eq!(lemma.cube().to_vec(), vec![lit, third]);
    assert_eq!(lemma.level(), 2);
    assert_eq!(frames.checks, 1);
    assert_eq!(gen.stats().num_failures, 1);
    assert_eq!(sat.depth(), 0)
}

// |===| Equality-closure rewrite.

#[test]
fn eq_rewrite_exposes_equalities_without_oracle() {
    let (x, y, z) = (int_sym("x"), int_sym("y"), int_sym("z"));
    let cube = vec![
        term::eq(x.clone(), y.clone()),
        term::eq(y.clone(), z.clone()),
        term::ge(z.clone(), term::int(0)),
    ];
    let mut frames = MockFrames::new();
    let mut gen = EqRewriteGen::new();
    let mut lemma = lemma_of(cube, 3);

    gen.generalize(&mut frames, &mut lemma).expect("generalize");

    let expected = vec![
        term::ge(x.clone(), term::int(0)),
        term::eq(x.clone(), y.clone()),
        term::eq(x.clone(), z.clone()),
        term::eq(y, z),
    ];
    assert_eq!(lemma.cube().to_vec(), expected);
    // Semantics-preserving: no oracle query, level untouched.
    assert_eq!(frames.checks, 0);
    assert_eq!(lemma.level(), 3);
    assert_eq!(gen.stats().count, 1);

    // Idempotent on its own output.
    let mut gen = EqRewriteGen::new();
    gen.generalize(&mut frames, &mut lemma).expect("generalize");
    assert_eq!(lemma.cube().to_vec(), expected);
    assert_eq!(gen.stats().count, 0)
}

#[test]
fn eq_rewrite_noop_without_equalities() {
    let cube = vec![
        term::ge(int_sym("x"), term::int(0)),
        term::lt(int_sym("y"), term::int(7)),
    ];
    let mut frames = MockFrames::new();
    let mut gen = EqRewriteGen::new();
    let mut lemma = lemma_of(cube.clone(), 1);

    gen.generalize(&mut frames, &mut lemma).expect("generalize");
    assert_eq!(lemma.cube().to_vec(), cube);
    assert_eq!(gen.stats().count, 0)
}

// |===| Sanity check.

#[test]
fn sanity_check_accepts_certified_lemma() {
    let a = int_sym("a");
    let mut frames = MockFrames::new().accept(&[a.clone()], 1);
    let mut lemma = lemma_of(vec![a], 1);
    SanityCheck
        .generalize(&mut frames, &mut lemma)
        .expect("sanity")
}

#[test]
fn sanity_check_fails_loudly() {
    let a = int_sym("a");
    let mut frames = MockFrames::new();
    let mut lemma = lemma_of(vec![a], 1);
    let err = SanityCheck
        .generalize(&mut frames, &mut lemma)
        .expect_err("uncertified lemma");
    assert!(err.is_hard_stop())
}

// |===| Pipeline.

#[test]
fn pipeline_chains_strategies() {
    let (x, y) = (int_sym("x"), int_sym("y"));
    let cube = vec![term::eq(x.clone(), y.clone()), term::ge(y, term::int(0))];
    let generalized = term::ge(x.clone(), term::int(0));
    let mut frames = MockFrames::new().accept(&[generalized.clone()], 2);
    let mut pipeline = Pipeline::new(vec![
        Box::new(EqRewriteGen::new()),
        Box::new(BoolIndGen::new().with_failure_limit(0)),
    ]);
    let mut lemma = lemma_of(cube, 1);

    pipeline.generalize(&mut frames, &mut lemma).expect("pipeline");

    assert_eq!(lemma.cube().to_vec(), vec![generalized]);
    assert_eq!(lemma.level(), 2)
}

#[test]
fn pipeline_propagates_hard_stops() {
    let (a, b) = (int_sym("a"), int_sym("b"));
    let mut frames = MockFrames::new().accept(&[b.clone()], 0).force_level(0);
    let mut pipeline = Pipeline::new(vec![Box::new(BoolIndGen::new())]);
    let mut lemma = lemma_of(vec![a, b], 2);

    let err = pipeline
        .generalize(&mut frames, &mut lemma)
        .expect_err("hard stop");
    assert!(err.iter().any(|e| format!("{}", e).contains("bool_ind")))
}

// |===| Scoped sessions.

#[test]
fn scoped_pops_on_error() {
    let mut sat = SharedSat::new(vec![]);
    let res: Res<()> = scoped(&mut sat, |session| {
        session.assert_lit(&term::tru())?;
        bail!("session lost")
    });
    assert!(res.is_err());
    assert_eq!(sat.depth(), 0)
}

#[test]
fn scoped_pops_on_early_success() {
    let mut sat = SharedSat::new(vec![]);
    let res = scoped(&mut sat, |session| {
        scoped(session, |session| {
            session.assert_lit(&term::fls())?;
            session.check()
        })
    })
    .expect("nested scopes");
    assert_eq!(res, Some(true));
    assert_eq!(sat.depth(), 0)
}

// |===| Decision service bridge.

#[test]
fn bridge_protocol() {
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;

    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let server = std::thread::spawn(move || {
        let (stream, _) = listener.accept().expect("accept");
        let mut reader = BufReader::new(stream.try_clone().expect("clone"));
        let mut stream = stream;
        let mut line = String::new();

        reader.read_line(&mut line).expect("greet");
        assert!(line.starts_with("(greet \""), "got `{}`", line.trim());
        writeln!(stream, "(greeting \"at your service\")").expect("greeting");

        line.clear();
        reader.read_line(&mut line).expect("lemma");
        assert!(line.starts_with("(lemma :before \""), "got `{}`", line.trim());
        writeln!(stream, "(ack)").expect("ack");

        for answer in &["1", "0", "-2"] {
            line.clear();
            reader.read_line(&mut line).expect("query");
            assert!(line.starts_with("(query :lemma \""), "got `{}`", line.trim());
            assert!(line.contains(":checking 2"), "got `{}`", line.trim());
            writeln!(stream, "(answer {})", answer).expect("answer")
        }
    });

    let mut client = DecisionClient::connect(&addr.to_string()).expect("connect");
    assert_eq!(client.greet("tester").expect("greet"), "at your service");
    client
        .send_lemma("(and a b)", "(and b)")
        .expect("send_lemma");
    assert!(client
        .query_model("(and a b)", &[1], 2, &[3])
        .expect("query 1"));
    assert!(!client.query_model("(and a b)", &[], 2, &[]).expect("query 2"));
    assert!(!client.query_model("(and a b)", &[], 2, &[]).expect("query 3"));
    server.join().expect("server thread")
}

#[test]
fn bridge_malformed_answer_is_protocol_error() {
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;

    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let server = std::thread::spawn(move || {
        let (stream, _) = listener.accept().expect("accept");
        let mut reader = BufReader::new(stream.try_clone().expect("clone"));
        let mut stream = stream;
        let mut line = String::new();
        reader.read_line(&mut line).expect("query");
        writeln!(stream, "(answer maybe)").expect("answer")
    });

    let mut client = DecisionClient::connect(&addr.to_string()).expect("connect");
    let err = client
        .query_model("(and a b)", &[], 1, &[])
        .expect_err("malformed answer");
    assert!(!err.is_hard_stop());
    server.join().expect("server thread")
}
