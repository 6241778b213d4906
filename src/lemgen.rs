//! Lemma generalization for IC3/PDR-style Horn clause engines.
//!
//! When the engine proves that a lemma blocks a proof obligation, the raw
//! cube is usually an overly specific conjunction of literals. The
//! [generalizers][gen] in this crate rewrite it into a weaker cube that the
//! engine's [inductiveness oracle][frames] still certifies, so that the
//! lemma blocks more states and the search converges faster.
//!
//! A generalizer only ever publishes a cube together with the level at which
//! the oracle certified it. The five strategies are
//!
//! - [`BoolIndGen`]: greedy literal dropping with optional case-split
//!   expansion,
//! - [`HeurIndGen`]: same loop, gated by learned per-literal drop
//!   statistics,
//! - [`UnsatCoreGen`]: shrinking to the oracle's reduced unsat core,
//! - [`ArrayEqGen`]: strengthening literals into negated array equalities,
//! - [`EqRewriteGen`]: canonicalization through equality saturation.
//!
//! [gen]: crate::gen
//! [frames]: crate::oracle::Frames
//! [`BoolIndGen`]: crate::gen::BoolIndGen
//! [`HeurIndGen`]: crate::gen::HeurIndGen
//! [`UnsatCoreGen`]: crate::gen::UnsatCoreGen
//! [`ArrayEqGen`]: crate::gen::ArrayEqGen
//! [`EqRewriteGen`]: crate::gen::EqRewriteGen

#![doc(test(attr(deny(warnings))))]
#![allow(non_upper_case_globals)]

#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate error_chain;
#[macro_use]
extern crate clap;

pub mod errors;
#[macro_use]
pub mod common;
pub mod bridge;
pub mod eqgraph;
pub mod gen;
pub mod lemma;
pub mod oracle;
pub mod term;

#[cfg(test)]
mod tests;
