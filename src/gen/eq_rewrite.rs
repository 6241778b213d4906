//! Equality-closure canonicalization.

use crate::common::*;
use crate::eqgraph::{EqGraph, UfGraph};
use crate::gen::{GenStats, Generalizer};
use crate::oracle::Frames;

/// Produces fresh equality graphs.
pub type GraphFactory = Box<dyn FnMut() -> Box<dyn EqGraph>>;

/// Rewrites a cube to its equality-saturated canonical form.
///
/// Not a weakening: the output is logically equivalent to the input, so
/// the oracle is not consulted and the level is untouched. The point is to
/// expose latent equalities to the strategies running after it.
pub struct EqRewriteGen {
    /// Spawns the equality graphs.
    graphs: GraphFactory,
    /// Run counters.
    stats: GenStats,
    /// Profiler.
    _profiler: Profiler,
}

impl EqRewriteGen {
    /// Constructor, using the in-crate union-find graph.
    pub fn new() -> Self {
        Self::with_graphs(Box::new(|| Box::new(UfGraph::new())))
    }

    /// Constructor with a custom graph factory.
    pub fn with_graphs(graphs: GraphFactory) -> Self {
        EqRewriteGen {
            graphs,
            stats: GenStats::default(),
            _profiler: Profiler::new(),
        }
    }

    /// Run counters.
    pub fn stats(&self) -> &GenStats {
        &self.stats
    }
}
impl Default for EqRewriteGen {
    fn default() -> Self {
        Self::new()
    }
}

impl Generalizer for EqRewriteGen {
    fn name(&self) -> &'static str {
        "eq_rewrite"
    }

    fn generalize(&mut self, _frames: &mut dyn Frames, lemma: &mut Lemma) -> Res<()> {
        if lemma.cube().is_empty() {
            return Ok(());
        }
        profile! { self tick "eq rewrite" }
        let mut graph = (self.graphs)();
        graph.add_lits(lemma.cube());
        let lits = graph.to_lits(true);
        profile! { self mark "eq rewrite" }

        // Trivial tautologies canonicalize to nothing, keep the cube.
        if lits.is_empty() {
            return Ok(());
        }

        let changed =
            lits.len() != lemma.cube().len() || lits.first() != lemma.cube().first();
        if changed {
            self.stats.count += 1;
            log! { @debug "canonicalized lemma to {}", term::and(lits.clone()) }
            let level = lemma.level();
            lemma.update(lits, level)
        }
        Ok(())
    }
}
