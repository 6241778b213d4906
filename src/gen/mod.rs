//! Lemma generalization strategies.
//!
//! A strategy consumes a lemma and the engine's inductiveness oracle, and
//! either leaves the lemma unchanged or replaces its cube with a weaker
//! one, together with the level at which the oracle certified the new
//! cube. Strategies never publish a cube they have not certified, with the
//! exception of the equality-closure rewrite which only ever produces
//! logically equivalent cubes.
//!
//! Strategies are independent and composable through [`Pipeline`]. The
//! drop-based ones ([`BoolIndGen`] and [`HeurIndGen`]) share the scan loop
//! of this module and differ only in their [`DropGate`].

use crate::common::*;
use crate::oracle::{Expander, Frames};

pub mod array_eq;
pub mod bool_ind;
pub mod eq_rewrite;
pub mod heur_ind;
pub mod sanity;
pub mod unsat_core;

pub use self::array_eq::ArrayEqGen;
pub use self::bool_ind::BoolIndGen;
pub use self::eq_rewrite::EqRewriteGen;
pub use self::heur_ind::{DropPolicy, HeurIndGen, LitStats};
pub use self::sanity::SanityCheck;
pub use self::unsat_core::UnsatCoreGen;

/// A lemma generalization strategy.
pub trait Generalizer {
    /// Name of the strategy, for logging and statistics.
    fn name(&self) -> &'static str;

    /// Generalizes a lemma in place.
    ///
    /// Either leaves the lemma untouched or replaces its cube and level
    /// with an oracle-certified pair. Errors abort the whole
    /// generalization run; recoverable conditions (solver failures,
    /// rejected candidates) are handled internally.
    fn generalize(&mut self, frames: &mut dyn Frames, lemma: &mut Lemma) -> Res<()>;
}

/// Run counters of a strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GenStats {
    /// Invocations that changed the lemma.
    pub count: usize,
    /// Drop or rewrite attempts the oracle rejected.
    pub num_failures: usize,
}

/// Applies strategies to a lemma in sequence.
///
/// Only hard stops (level regression, unsound oracle) abort the sequence.
pub struct Pipeline {
    /// The strategies, in application order.
    gens: Vec<Box<dyn Generalizer>>,
}
impl Pipeline {
    /// Constructor.
    pub fn new(gens: Vec<Box<dyn Generalizer>>) -> Self {
        Pipeline { gens }
    }

    /// Appends a strategy.
    pub fn push(&mut self, gen: Box<dyn Generalizer>) {
        self.gens.push(gen)
    }

    /// Runs all strategies on a lemma, in order.
    pub fn generalize(&mut self, frames: &mut dyn Frames, lemma: &mut Lemma) -> Res<()> {
        if lemma.cube().is_empty() {
            return Ok(());
        }
        for gen in &mut self.gens {
            gen.generalize(frames, lemma)
                .chain_err(|| format!("in generalization strategy `{}`", gen.name()))?
        }
        Ok(())
    }
}

/// Asks the oracle to certify a cube at some level.
///
/// Oracle failures are demoted to `None` (cannot prove inductive), except
/// hard stops which propagate. Bails on a level regression.
pub(crate) fn certify(
    frames: &mut dyn Frames,
    level: Level,
    cube: &[Term],
    weakness: usize,
) -> Res<Option<Level>> {
    match frames.check_inductive(level, cube, weakness) {
        Ok(Some(uses_level)) => {
            if uses_level < level {
                bail!(ErrorKind::LevelRegression(level, uses_level))
            }
            Ok(Some(uses_level))
        }
        Ok(None) => Ok(None),
        Err(e) => {
            if e.is_hard_stop() {
                return Err(e);
            }
            log! { @debug "inductiveness check failed: {}", e }
            Ok(None)
        }
    }
}

/// Gating hook of the drop scan.
///
/// The boolean generalizer always tries; the heuristic one charges its
/// statistics table and consults its drop policy.
pub(crate) trait DropGate {
    /// Whether to attempt dropping the literal at `idx` in `cube`.
    fn should_try(&mut self, cube: &[Term], idx: usize) -> bool;
    /// Reports the outcome of an attempt the gate allowed.
    fn attempted(&mut self, lit: &Term, dropped: bool);
}

/// Gate that lets every attempt through.
pub(crate) struct AlwaysTry;
impl DropGate for AlwaysTry {
    fn should_try(&mut self, _: &[Term], _: usize) -> bool {
        true
    }
    fn attempted(&mut self, _: &Term, _: bool) {}
}

/// Result of a [`drop_scan`].
pub(crate) struct ScanRes {
    /// New cube and certified level, if the scan committed anything.
    pub changed: Option<(Vec<Term>, Level)>,
    /// Total number of failed attempts during the scan.
    pub failures: usize,
}

/// Single left-to-right drop scan over a lemma's cube.
///
/// Visits each literal once: tentatively removes it, keeps the removal if
/// the oracle certifies the smaller cube at the lemma's level, restores it
/// otherwise (trying case-split expansions first when an expander is
/// given). Literals confirmed necessary go to a processed set and are
/// never revisited; a committed removal rescans from the first
/// unprocessed index since it can re-open earlier ones. Stops early after
/// `failure_limit` consecutive failures (`0` for unlimited). Never drops
/// below one literal.
pub(crate) fn drop_scan(
    frames: &mut dyn Frames,
    lemma: &Lemma,
    mut expander: Option<&mut (dyn Expander + 'static)>,
    failure_limit: usize,
    array_only: bool,
    gate: &mut dyn DropGate,
) -> Res<ScanRes> {
    let level = lemma.level();
    let weakness = lemma.weakness();
    let mut cube = lemma.cube().to_vec();

    let mut processed = TermSet::new();
    let mut uses_level = level;
    let mut changed = false;
    let mut consecutive = 0;
    let mut failures = 0;

    let mut i = 0;
    'scan: while i < cube.len() {
        if failure_limit > 0 && consecutive >= failure_limit {
            break;
        }
        let lit = cube[i].clone();
        if processed.contains(&lit) {
            i += 1;
            continue;
        }

        if array_only && !term::has_array_sub(&lit) {
            processed.insert(lit);
            i += 1;
            continue;
        }

        if !gate.should_try(&cube, i) {
            i += 1;
            continue;
        }

        // Tentative drop, kept when the smaller cube is still inductive.
        if cube.len() > 1 {
            let mut candidate = cube.clone();
            candidate.remove(i);
            if let Some(lvl) = certify(frames, level, &candidate, weakness)? {
                gate.attempted(&lit, true);
                cube = candidate;
                uses_level = lvl;
                changed = true;
                consecutive = 0;
                i = first_unprocessed(&cube, &processed);
                continue 'scan;
            }
        }

        // The literal cannot go away outright, maybe one of its
        // case-split refinements can take its place.
        if let Some(exp) = expander.as_mut() {
            let candidates = exp.expand(&lit);
            if candidates.len() > 1 && candidates[0] != lit {
                for cand in candidates {
                    let mut candidate = cube.clone();
                    candidate[i] = cand.clone();
                    if let Some(lvl) = certify(frames, level, &candidate, weakness)? {
                        gate.attempted(&lit, true);
                        processed.insert(cand);
                        cube = candidate;
                        uses_level = lvl;
                        changed = true;
                        consecutive = 0;
                        i = first_unprocessed(&cube, &processed);
                        continue 'scan;
                    }
                }
            }
        }

        gate.attempted(&lit, false);
        processed.insert(lit);
        consecutive += 1;
        failures += 1;
        i += 1
    }

    let changed = if changed {
        Some((cube, uses_level))
    } else {
        None
    };
    Ok(ScanRes { changed, failures })
}

/// First index of a cube whose literal is not processed yet.
fn first_unprocessed(cube: &[Term], processed: &TermSet) -> usize {
    cube.iter()
        .position(|lit| !processed.contains(lit))
        .unwrap_or(cube.len())
}
