//! Profiling stuff.
//!
//! In `bench` mode, `Profiler` is a unit structure and all profiling macros
//! are deactivated, so profiling is completely removed.

use std::time::{Duration, Instant};

use crate::common::*;

/// Extends duration with a pretty printing.
pub trait DurationExt {
    /// Nice string representation.
    fn to_str(&self) -> String;
}
impl DurationExt for Duration {
    fn to_str(&self) -> String {
        format!("{}.{:0>9}", self.as_secs(), self.subsec_nanos())
    }
}

/// Maps strings to counters.
pub type Stats = HashMap<String, usize>;

/// Profiling structure, only in `not(bench)`.
///
/// Maintains scoped timers and statistics using hashmaps indexed by strings.
///
/// Internally, the structures are wrapped in `RefCell`s so that mutation
/// does not require `&mut self`.
#[cfg(not(feature = "bench"))]
pub struct Profiler {
    /// Scope-indexed timers: current tick (if any) and accumulated time.
    map: ::std::cell::RefCell<HashMap<Vec<&'static str>, (Option<Instant>, Duration)>>,
    /// Starting tick, for total time.
    start: Instant,
    /// Other statistics.
    stats: ::std::cell::RefCell<Stats>,
}
#[cfg(feature = "bench")]
pub struct Profiler;

impl Default for Profiler {
    fn default() -> Self {
        Profiler::new()
    }
}

impl Profiler {
    /// Constructor.
    #[cfg(not(feature = "bench"))]
    pub fn new() -> Self {
        use std::cell::RefCell;
        Profiler {
            map: RefCell::new(HashMap::new()),
            start: Instant::now(),
            stats: RefCell::new(HashMap::new()),
        }
    }
    #[cfg(feature = "bench")]
    pub fn new() -> Self {
        Profiler
    }

    /// Acts on a statistic.
    #[cfg(not(feature = "bench"))]
    pub fn stat_do<F, S>(&self, stat: S, f: F)
    where
        F: Fn(usize) -> usize,
        S: Into<String>,
    {
        let stat = stat.into();
        let mut map = self.stats.borrow_mut();
        let val = map.get(&stat).cloned().unwrap_or(0);
        let _ = map.insert(stat, f(val));
    }

    /// Value of a statistic, zero if never set.
    #[cfg(not(feature = "bench"))]
    pub fn stat_get<S: AsRef<str>>(&self, stat: S) -> usize {
        self.stats.borrow().get(stat.as_ref()).cloned().unwrap_or(0)
    }

    /// Ticks.
    #[cfg(not(feature = "bench"))]
    pub fn tick(&self, scope: Vec<&'static str>) {
        debug_assert! { !scope.is_empty() }
        let mut map = self.map.borrow_mut();
        let time = map
            .entry(scope)
            .or_insert_with(|| (None, Duration::from_secs(0)));
        time.0 = Some(Instant::now())
    }

    /// Registers the time since the last tick.
    ///
    /// Panics if there was no tick since the last time registration.
    #[cfg(not(feature = "bench"))]
    pub fn mark(&self, scope: Vec<&'static str>) {
        let mut map = self.map.borrow_mut();
        if let Some(&mut (ref mut tick, ref mut sum)) = map.get_mut(&scope) {
            let mut instant = None;
            ::std::mem::swap(&mut instant, tick);
            if let Some(instant) = instant {
                *sum += Instant::now().duration_since(instant)
            } else {
                panic!("profiler: `mark` called before `tick` on {:?}", scope)
            }
        } else {
            panic!("profiler: `mark` called on unknown scope {:?}", scope)
        }
    }

    /// Prints the timers and statistics gathered so far.
    #[cfg(not(feature = "bench"))]
    pub fn print(&self, name: &str) {
        println!(
            "; {} {}s",
            conf.emph(name),
            Instant::now().duration_since(self.start).to_str()
        );
        let map = self.map.borrow();
        let mut scopes: Vec<_> = map.keys().collect();
        scopes.sort();
        for scope in scopes {
            let (_, sum) = &map[scope];
            println!(";   {}: {}s", scope.join("/"), sum.to_str())
        }
        let stats = self.stats.borrow();
        let mut keys: Vec<_> = stats.keys().collect();
        keys.sort();
        for stat in keys {
            let stat_len = ::std::cmp::min(30, stat.len());
            println!(
                ";   {0: >1$}{2}: {3: >5}",
                "",
                30 - stat_len,
                conf.emph(stat),
                stats[stat]
            )
        }
    }

    #[cfg(feature = "bench")]
    pub fn print(&self, _: &str) {}
}
