//! Heuristic inductive drop.
//!
//! Same scan loop as [`bool_ind`][crate::gen::bool_ind], except that each
//! visit is gated by a drop policy fed by a per-literal statistics table.
//! The table is owned by the generalizer instance and spans its whole
//! lifetime, across many lemmas; it is never reset.
//!
//! The policies calibrate on two global counters: how many literals, the
//! first time they were ever visited, turned out droppable and how many
//! did not. An optional external decision service can take over the
//! verdicts entirely, see [`bridge`][crate::bridge].

use rand::{Rng, SeedableRng};
use rand_xorshift::XorShiftRng;

use crate::bridge::DecisionClient;
use crate::common::*;
use crate::gen::{drop_scan, DropGate, GenStats, Generalizer};
use crate::oracle::{CaseSplit, Expander, Frames};

/// Per-literal drop statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LitStats {
    /// Times the literal was genuinely visited (gated-away visits do not
    /// count).
    pub seen: usize,
    /// Times dropping it succeeded.
    pub succeeded: usize,
}

/// The selectable should-try-drop policies.
///
/// Inputs: the current literal's [`LitStats`] (with the ongoing visit
/// already counted), the total number of attempts so far, the two global
/// first-visit calibration counters, the sample threshold `T` and the
/// success ratio threshold `R`. Below `T` attempts every policy says
/// "try".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropPolicy {
    /// Policy 1: try unless the threshold is reached and the literal is on
    /// its first visit.
    ///
    /// Since revisited literals always have `seen > 1`, this gates almost
    /// nothing; it is kept as-is for comparison against the other
    /// policies.
    Passthrough,
    /// Policy 2: past the threshold, randomized test against the global
    /// failure ratio `(cannot - 1) / (cannot + can - 2)`.
    GlobalSample,
    /// Policy 3: past the threshold, first-visit literals take the
    /// [`GlobalSample`][Self::GlobalSample] test, revisited ones must have
    /// an own success ratio of at least `R`.
    GlobalThenRatio,
    /// Policy 4: past the threshold, the literal's own success ratio must
    /// be at least `R` (so first-visit literals are always skipped).
    Ratio,
    /// Policy 5: stochastic variant of
    /// [`GlobalThenRatio`][Self::GlobalThenRatio], revisited literals draw
    /// against their own success ratio.
    GlobalThenStochastic,
    /// Policy 6: stochastic variant of [`Ratio`][Self::Ratio].
    Stochastic,
}
impl DropPolicy {
    /// Policy of a configuration index, `1` to `6`.
    pub fn of_index(index: usize) -> Option<Self> {
        match index {
            1 => Some(DropPolicy::Passthrough),
            2 => Some(DropPolicy::GlobalSample),
            3 => Some(DropPolicy::GlobalThenRatio),
            4 => Some(DropPolicy::Ratio),
            5 => Some(DropPolicy::GlobalThenStochastic),
            6 => Some(DropPolicy::Stochastic),
            _ => None,
        }
    }

    /// Decides whether to attempt a drop.
    pub fn decide<R: Rng>(
        self,
        rng: &mut R,
        lit: LitStats,
        attempts: usize,
        can_drop: usize,
        cannot_drop: usize,
        threshold: usize,
        ratio: f64,
    ) -> bool {
        let below = attempts < threshold;
        let own_ratio = if lit.seen == 0 {
            0.
        } else {
            lit.succeeded as f64 / lit.seen as f64
        };
        match self {
            DropPolicy::Passthrough => below || lit.seen > 1,
            DropPolicy::GlobalSample => below || global_draw(rng, can_drop, cannot_drop),
            DropPolicy::GlobalThenRatio => {
                if below {
                    true
                } else if lit.seen == 1 {
                    global_draw(rng, can_drop, cannot_drop)
                } else {
                    own_ratio >= ratio
                }
            }
            DropPolicy::Ratio => below || own_ratio >= ratio,
            DropPolicy::GlobalThenStochastic => {
                if below {
                    true
                } else if lit.seen == 1 {
                    global_draw(rng, can_drop, cannot_drop)
                } else {
                    rng.gen::<f64>() < own_ratio
                }
            }
            DropPolicy::Stochastic => below || rng.gen::<f64>() < own_ratio,
        }
    }
}

/// Randomized test against the global first-visit failure ratio.
///
/// Degenerate samples (fewer than three calibration points) always pass.
fn global_draw<R: Rng>(rng: &mut R, can_drop: usize, cannot_drop: usize) -> bool {
    if can_drop + cannot_drop <= 2 {
        return true;
    }
    let p = (cannot_drop as f64 - 1.) / ((cannot_drop + can_drop) as f64 - 2.);
    rng.gen::<f64>() < p
}

/// Drops literals like [`BoolIndGen`][crate::gen::BoolIndGen], gated by a
/// [`DropPolicy`].
pub struct HeurIndGen {
    /// The drop policy.
    policy: DropPolicy,
    /// Sample threshold `T`.
    threshold: usize,
    /// Success ratio threshold `R`.
    ratio: f64,
    /// Rng for the stochastic policies, seeded for reproducibility.
    rng: XorShiftRng,
    /// Per-literal statistics, process-wide for this instance.
    lit_stats: TermMap<LitStats>,
    /// Total number of attempted drops.
    attempts: usize,
    /// First-visit literals that turned out droppable.
    first_seen_can_drop: usize,
    /// First-visit literals that did not.
    first_seen_cannot_drop: usize,
    /// Literal expansion oracle, if expansion is active.
    expander: Option<Box<dyn Expander>>,
    /// Consecutive failed drops before giving up (`0` for unlimited).
    failure_limit: usize,
    /// Only attempts literals mentioning arrays.
    array_only: bool,
    /// External decision service, if attached.
    client: Option<DecisionClient>,
    /// Feeds applied generalizations back to the service.
    send_lemmas: bool,
    /// Run counters.
    stats: GenStats,
    /// Profiler.
    _profiler: Profiler,
}

impl HeurIndGen {
    /// Constructor following the global configuration.
    ///
    /// Attaches to the decision service if one is configured; a failed
    /// greeting logs a warning and detaches the client.
    pub fn new() -> Self {
        let policy = DropPolicy::of_index(conf.gen.heuristic)
            .unwrap_or_else(|| panic!("illegal drop policy index {}", conf.gen.heuristic));
        let expander: Option<Box<dyn Expander>> = if conf.gen.expansion {
            Some(Box::new(CaseSplit))
        } else {
            None
        };
        let client = conf.gen.server.as_ref().and_then(|addr| {
            let attached = DecisionClient::connect(addr)
                .and_then(|mut client| client.greet("lemgen").map(|_| client));
            match attached {
                Ok(client) => {
                    log! { @info "attached to decision service at {}", conf.emph(addr) }
                    Some(client)
                }
                Err(e) => {
                    warn! { "could not attach to decision service at {}: {}", addr, e }
                    None
                }
            }
        });
        HeurIndGen {
            policy,
            threshold: conf.gen.threshold,
            ratio: conf.gen.success_ratio,
            rng: XorShiftRng::seed_from_u64(conf.gen.seed),
            lit_stats: TermMap::new(),
            attempts: 0,
            first_seen_can_drop: 0,
            first_seen_cannot_drop: 0,
            expander,
            failure_limit: conf.gen.failure_limit,
            array_only: conf.gen.array_only,
            client,
            send_lemmas: conf.gen.send_lemmas,
            stats: GenStats::default(),
            _profiler: Profiler::new(),
        }
    }

    /// Overrides the drop policy.
    pub fn with_policy(mut self, policy: DropPolicy) -> Self {
        self.policy = policy;
        self
    }
    /// Overrides the sample threshold.
    pub fn with_threshold(mut self, threshold: usize) -> Self {
        self.threshold = threshold;
        self
    }
    /// Overrides the success ratio threshold.
    pub fn with_ratio(mut self, ratio: f64) -> Self {
        self.ratio = ratio;
        self
    }
    /// Re-seeds the rng.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = XorShiftRng::seed_from_u64(seed);
        self
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
    /// Attaches a decision service client.
    pub fn with_client(mut self, client: DecisionClient) -> Self {
        self.client = Some(client);
        self
    }

    /// Statistics entry of a literal, if it was ever visited.
    pub fn lit_stats(&self, lit: &Term) -> Option<LitStats> {
        self.lit_stats.get(lit).cloned()
    }
    /// Total number of attempted drops.
    pub fn attempts(&self) -> usize {
        self.attempts
    }
    /// Run counters.
    pub fn stats(&self) -> &GenStats {
        &self.stats
    }

    /// Logs the statistics table at debug verbosity.
    fn dump_lit_stats(&self) {
        log! { @debug
            "literal drop statistics ({} literal(s), {} attempt(s), {}/{} first-visit drops):",
            self.lit_stats.len(), self.attempts,
            self.first_seen_can_drop,
            self.first_seen_can_drop + self.first_seen_cannot_drop
        }
        for (lit, stats) in self.lit_stats.iter() {
            log! { @debug "  {}/{} {}", stats.succeeded, stats.seen, lit }
        }
    }
}
impl Default for HeurIndGen {
    fn default() -> Self {
        Self::new()
    }
}

/// Gate borrowing the mutable state of a [`HeurIndGen`].
struct HeurGate<'a> {
    /// The drop policy.
    policy: DropPolicy,
    /// Sample threshold.
    threshold: usize,
    /// Success ratio threshold.
    ratio: f64,
    /// Rng.
    rng: &'a mut XorShiftRng,
    /// Per-literal statistics.
    lit_stats: &'a mut TermMap<LitStats>,
    /// Total number of attempted drops.
    attempts: &'a mut usize,
    /// First-visit literals that turned out droppable.
    can_drop: &'a mut usize,
    /// First-visit literals that did not.
    cannot_drop: &'a mut usize,
    /// External decision service, if attached.
    client: Option<&'a mut DecisionClient>,
}
impl<'a> DropGate for HeurGate<'a> {
    fn should_try(&mut self, cube: &[Term], idx: usize) -> bool {
        let lit = &cube[idx];
        let stats = {
            let entry = self
                .lit_stats
                .entry(lit.clone())
                .or_insert_with(LitStats::default);
            entry.seen += 1;
            *entry
        };

        let verdict = if let Some(client) = self.client.as_mut() {
            let text = format!("{}", term::and(cube.to_vec()));
            let kept: Vec<u64> = cube[..idx].iter().map(|l| l.uid()).collect();
            let candidates: Vec<u64> = cube[idx + 1..].iter().map(|l| l.uid()).collect();
            match client.query_model(&text, &kept, lit.uid(), &candidates) {
                Ok(verdict) => verdict,
                // Fail open: an unreachable service must not block drops.
                Err(e) => {
                    warn! { "decision service query failed: {}", e }
                    true
                }
            }
        } else {
            self.policy.decide(
                &mut *self.rng,
                stats,
                *self.attempts,
                *self.can_drop,
                *self.cannot_drop,
                self.threshold,
                self.ratio,
            )
        };

        if verdict {
            *self.attempts += 1
        } else if let Some(entry) = self.lit_stats.get_mut(lit) {
            // A gated-away visit is not an observation.
            entry.seen -= 1
        }
        verdict
    }

    fn attempted(&mut self, lit: &Term, dropped: bool) {
        if let Some(entry) = self.lit_stats.get_mut(lit) {
            if dropped {
                entry.succeeded += 1
            }
            if entry.seen == 1 {
                if dropped {
                    *self.can_drop += 1
                } else {
                    *self.cannot_drop += 1
                }
            }
        }
    }
}

impl Generalizer for HeurIndGen {
    fn name(&self) -> &'static str {
        "heur_ind"
    }

    fn generalize(&mut self, frames: &mut dyn Frames, lemma: &mut Lemma) -> Res<()> {
        if lemma.cube().is_empty() {
            return Ok(());
        }
        profile! { self tick "heur ind" }
        let scan = {
            let mut gate = HeurGate {
                policy: self.policy,
                threshold: self.threshold,
                ratio: self.ratio,
                rng: &mut self.rng,
                lit_stats: &mut self.lit_stats,
                attempts: &mut self.attempts,
                can_drop: &mut self.first_seen_can_drop,
                cannot_drop: &mut self.first_seen_cannot_drop,
                client: self.client.as_mut(),
            };
            drop_scan(
                frames,
                lemma,
                self.expander.as_deref_mut(),
                self.failure_limit,
                self.array_only,
                &mut gate,
            )
        };
        profile! { self mark "heur ind" }
        let scan = scan?;
        self.stats.num_failures += scan.failures;

        if let Some((cube, level)) = scan.changed {
            self.stats.count += 1;
            log! {
                @verb "generalized lemma from {} to {} literal(s) at level {}",
                lemma.cube().len(), cube.len(), level
            }
            let before = if self.send_lemmas && self.client.is_some() {
                Some(format!("{}", lemma.cube()))
            } else {
                None
            };
            lemma.update(cube, level);
            if let (Some(before), Some(client)) = (before, self.client.as_mut()) {
                let after = format!("{}", lemma.cube());
                if let Err(e) = client.send_lemma(&before, &after) {
                    warn! { "could not report generalization to decision service: {}", e }
                }
            }
        }
        self.dump_lit_stats();
        Ok(())
    }
}
