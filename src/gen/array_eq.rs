//! Array-equality strengthening.
//!
//! Looks for literals that contradict an equality between two of the
//! cube's array constants: if `lit ∧ (A = B)` is unsatisfiable then `lit`
//! implies `A ≠ B`, and replacing `lit` by `(not (= A B))` weakens the
//! cube. The whole rewrite is speculative, it only lands if the oracle
//! still certifies the result at the lemma's level.

use crate::common::smt::SmtSession;
use crate::common::*;
use crate::gen::{certify, GenStats, Generalizer};
use crate::oracle::{scoped, Frames, SatSession};

/// Cube must mention at least this many array constants.
const MIN_ARRAY_SYMS: usize = 2;
/// And at most this many (quadratic candidate blowup above).
const MAX_ARRAY_SYMS: usize = 8;

/// Produces fresh satisfiability sessions.
pub type SessionFactory = Box<dyn FnMut() -> Res<Box<dyn SatSession>>>;

/// Replaces literals by negated array equalities they imply.
pub struct ArrayEqGen {
    /// Spawns the satisfiability sessions for the equality trials.
    sessions: SessionFactory,
    /// Run counters.
    stats: GenStats,
    /// Profiler.
    _profiler: Profiler,
}

impl ArrayEqGen {
    /// Constructor, using solver-backed sessions.
    pub fn new() -> Self {
        Self::with_sessions(Box::new(|| {
            let session = SmtSession::new("array_eq")?;
            Ok(Box::new(session) as Box<dyn SatSession>)
        }))
    }

    /// Constructor with a custom session factory.
    pub fn with_sessions(sessions: SessionFactory) -> Self {
        ArrayEqGen {
            sessions,
            stats: GenStats::default(),
            _profiler: Profiler::new(),
        }
    }

    /// Run counters.
    pub fn stats(&self) -> &GenStats {
        &self.stats
    }

    /// Speculative rewrite of the cube, no oracle involved.
    ///
    /// Returns the rewritten literals if at least one replacement
    /// happened.
    fn strengthen(&mut self, cube: &[Term]) -> Res<Option<Vec<Term>>> {
        let syms = term::collect_array_syms(cube);
        if syms.len() < MIN_ARRAY_SYMS || syms.len() > MAX_ARRAY_SYMS {
            return Ok(None);
        }

        let mut candidates = Vec::with_capacity(syms.len() * (syms.len() - 1) / 2);
        for i in 0..syms.len() {
            for j in i + 1..syms.len() {
                candidates.push(term::eq(syms[i].clone(), syms[j].clone()))
            }
        }

        let mut session = (self.sessions)()?;
        for sym in term::collect_syms(cube) {
            if let Some((name, typ)) = sym.sym_inspect() {
                session.declare_const(name, typ)?
            }
        }

        let mut lits = cube.to_vec();
        let mut changed = false;
        for lit in &mut lits {
            if lit.is_neg_array_eq() {
                continue;
            }
            let found = {
                let lit = &*lit;
                scoped(&mut *session, |session| {
                    session.assert_lit(lit)?;
                    for eq in &candidates {
                        let unsat = scoped(&mut *session, |session| {
                            session.assert_lit(eq)?;
                            Ok(session.check()? == Some(false))
                        })?;
                        // First contradicting equality wins.
                        if unsat {
                            return Ok(Some(eq.clone()));
                        }
                    }
                    Ok(None)
                })?
            };
            if let Some(eq) = found {
                log! { @debug "literal {} implies {}", lit, term::not(eq.clone()) }
                *lit = term::not(eq);
                changed = true
            }
        }

        if changed {
            Ok(Some(lits))
        } else {
            Ok(None)
        }
    }
}
impl Default for ArrayEqGen {
    fn default() -> Self {
        Self::new()
    }
}

impl Generalizer for ArrayEqGen {
    fn name(&self) -> &'static str {
        "array_eq"
    }

    fn generalize(&mut self, frames: &mut dyn Frames, lemma: &mut Lemma) -> Res<()> {
        if lemma.cube().is_empty() {
            return Ok(());
        }
        profile! { self tick "array eq" }
        let strengthened = self.strengthen(lemma.cube());
        profile! { self mark "array eq" }

        let lits = match strengthened {
            Ok(Some(lits)) => lits,
            Ok(None) => return Ok(()),
            Err(e) => {
                if e.is_hard_stop() {
                    return Err(e);
                }
                // Solver trouble during the speculative phase, give up on
                // this invocation.
                log! { @debug "array equality strengthening failed: {}", e }
                return Ok(());
            }
        };

        match certify(frames, lemma.level(), &lits, lemma.weakness())? {
            Some(uses_level) => {
                self.stats.count += 1;
                log! {
                    @verb "strengthened lemma with negated array equalities at level {}",
                    uses_level
                }
                lemma.update(lits, uses_level);
                Ok(())
            }
            // Speculative work, discarded.
            None => {
                self.stats.num_failures += 1;
                Ok(())
            }
        }
    }
}
