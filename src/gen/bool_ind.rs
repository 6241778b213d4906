//! Boolean inductive drop.

use crate::common::*;
use crate::gen::{drop_scan, AlwaysTry, GenStats, Generalizer};
use crate::oracle::{CaseSplit, Expander, Frames};

/// Drops literals greedily as long as the oracle certifies the result.
///
/// Single pass with a processed set, see
/// [`drop_scan`][crate::gen::drop_scan]. Configured from the global
/// [`GenConf`][crate::common::config::GenConf]: failure limit, array-only
/// mode, and case-split expansion of literals that cannot be dropped.
pub struct BoolIndGen {
    /// Literal expansion oracle, if expansion is active.
    expander: Option<Box<dyn Expander>>,
    /// Consecutive failed drops before giving up (`0` for unlimited).
    failure_limit: usize,
    /// Only attempts literals mentioning arrays.
    array_only: bool,
    /// Run counters.
    stats: GenStats,
    /// Profiler.
    _profiler: Profiler,
}

impl BoolIndGen {
    /// Constructor following the global configuration.
    pub fn new() -> Self {
        let expander: Option<Box<dyn Expander>> = if conf.gen.expansion {
            Some(Box::new(CaseSplit))
        } else {
            None
        };
        BoolIndGen {
            expander,
            failure_limit: conf.gen.failure_limit,
            array_only: conf.gen.array_only,
            stats: GenStats::default(),
            _profiler: Profiler::new(),
        }
    }

    /// Overrides the expansion oracle.
    pub fn with_expander(mut self, expander: Box<dyn Expander>) -> Self {
        self.expander = Some(expander);
        self
    }

    /// Overrides the failure limit.
    pub fn with_failure_limit(mut self, failure_limit: usize) -> Self {
        self.failure_limit = failure_limit;
        self
    }

    /// Restricts attempts to literals mentioning arrays.
    pub fn array_only(mut self) -> Self {
        self.array_only = true;
        self
    }

    /// Run counters.
    pub fn stats(&self) -> &GenStats {
        &self.stats
    }
}
impl Default for BoolIndGen {
    fn default() -> Self {
        Self::new()
    }
}

impl Generalizer for BoolIndGen {
    fn name(&self) -> &'static str {
        "bool_ind"
    }

    fn generalize(&mut self, frames: &mut dyn Frames, lemma: &mut Lemma) -> Res<()> {
        if lemma.cube().is_empty() {
            return Ok(());
        }
        profile! { self tick "bool ind" }
        let res = drop_scan(
            frames,
            lemma,
            self.expander.as_deref_mut(),
            self.failure_limit,
            self.array_only,
            &mut AlwaysTry,
        );
        profile! { self mark "bool ind" }
        let scan = res?;
        self.stats.num_failures += scan.failures;
        if let Some((cube, level)) = scan.changed {
            self.stats.count += 1;
            log! {
                @verb "generalized lemma from {} to {} literal(s) at level {}",
                lemma.cube().len(), cube.len(), level
            }
            lemma.update(cube, level)
        }
        Ok(())
    }
}
