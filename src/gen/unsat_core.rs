//! Unsat-core shrinking.

use crate::common::*;
use crate::gen::{GenStats, Generalizer};
use crate::oracle::Frames;

/// Shrinks a lemma to the unsat core of its own inductiveness proof.
///
/// Asks the oracle's richer mode for the core of the (already certified)
/// lemma and adopts it when it is strictly smaller. Pure shrink: the cube
/// never grows, and once the core is minimal reapplication is a no-op.
pub struct UnsatCoreGen {
    /// Run counters.
    stats: GenStats,
    /// Profiler.
    _profiler: Profiler,
}

impl UnsatCoreGen {
    /// Constructor.
    pub fn new() -> Self {
        UnsatCoreGen {
            stats: GenStats::default(),
            _profiler: Profiler::new(),
        }
    }

    /// Run counters.
    pub fn stats(&self) -> &GenStats {
        &self.stats
    }
}
impl Default for UnsatCoreGen {
    fn default() -> Self {
        Self::new()
    }
}

impl Generalizer for UnsatCoreGen {
    fn name(&self) -> &'static str {
        "unsat_core"
    }

    fn generalize(&mut self, frames: &mut dyn Frames, lemma: &mut Lemma) -> Res<()> {
        if lemma.cube().is_empty() {
            return Ok(());
        }
        profile! { self tick "unsat core" }
        let res = frames.is_invariant(lemma.level(), lemma);
        profile! { self mark "unsat core" }
        match res {
            Ok(Some((core, uses_level))) => {
                if uses_level < lemma.level() {
                    bail!(ErrorKind::LevelRegression(lemma.level(), uses_level))
                }
                if core.len() < lemma.cube().len() {
                    self.stats.count += 1;
                    log! {
                        @verb "core-shrunk lemma from {} to {} literal(s) at level {}",
                        lemma.cube().len(), core.len(), uses_level
                    }
                    lemma.update(core, uses_level)
                }
                Ok(())
            }
            // The lemma is certified already, a rejection is a contract
            // violation.
            Ok(None) => {
                log! { @err "oracle rejected certified lemma {}", lemma }
                bail!(ErrorKind::UnsoundOracle)
            }
            Err(e) => {
                if e.is_hard_stop() {
                    return Err(e);
                }
                log! { @debug "unsat core query failed: {}", e }
                self.stats.num_failures += 1;
                Ok(())
            }
        }
    }
}
