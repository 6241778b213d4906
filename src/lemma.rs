//! Lemmas and cubes.

use std::fmt;
use std::ops::Deref;

use crate::common::*;

/// A frame level.
pub type Level = usize;

/// Opaque reference to the proof obligation owning a lemma.
///
/// Generalizers never inspect this, the inductiveness oracle may use it to
/// locate the obligation's predicate transformer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PobIdx(usize);
impl From<usize> for PobIdx {
    fn from(idx: usize) -> Self {
        PobIdx(idx)
    }
}
impl fmt::Display for PobIdx {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "{}", self.0)
    }
}

/// An ordered conjunction of literals.
///
/// Order is not semantically meaningful but is preserved during rewriting,
/// so that index-based bookkeeping in the generalizers is well-defined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cube {
    lits: Vec<Term>,
}
impl Cube {
    /// Constructor.
    pub fn new(lits: Vec<Term>) -> Self {
        Cube { lits }
    }

    /// The literals, as a mutable vector.
    pub fn to_vec(&self) -> Vec<Term> {
        self.lits.clone()
    }

    /// Conjunction view of the cube.
    pub fn to_term(&self) -> Term {
        term::and(self.lits.clone())
    }
}
impl Deref for Cube {
    type Target = [Term];
    fn deref(&self) -> &[Term] {
        &self.lits
    }
}
impl From<Vec<Term>> for Cube {
    fn from(lits: Vec<Term>) -> Self {
        Cube::new(lits)
    }
}
impl fmt::Display for Cube {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "{}", self.to_term())
    }
}

/// A candidate inductive invariant fragment.
///
/// At all externally observable points, `level` is a level at which the
/// current `cube` has been certified inductive by the oracle. Generalizers
/// uphold this by only going through [`update`][Lemma::update] with an
/// oracle-certified pair.
#[derive(Debug, Clone)]
pub struct Lemma {
    /// The cube.
    cube: Cube,
    /// Earliest level at which the cube is known inductive.
    level: Level,
    /// Bound on how aggressively the lemma may be weakened.
    weakness: usize,
    /// Owning proof obligation.
    pob: PobIdx,
}
impl Lemma {
    /// Constructor.
    pub fn new<C: Into<Cube>>(cube: C, level: Level, weakness: usize, pob: PobIdx) -> Self {
        Lemma {
            cube: cube.into(),
            level,
            weakness,
            pob,
        }
    }

    /// The cube.
    #[inline]
    pub fn cube(&self) -> &Cube {
        &self.cube
    }
    /// Earliest level at which the cube is known inductive.
    #[inline]
    pub fn level(&self) -> Level {
        self.level
    }
    /// Bound on how aggressively the lemma may be weakened.
    #[inline]
    pub fn weakness(&self) -> usize {
        self.weakness
    }
    /// Owning proof obligation.
    #[inline]
    pub fn pob(&self) -> PobIdx {
        self.pob
    }

    /// Replaces the cube and the level.
    ///
    /// The only mutator: callers must have certified `(cube, level)` with
    /// the oracle, and must have checked level monotonicity beforehand.
    pub fn update<C: Into<Cube>>(&mut self, cube: C, level: Level) {
        debug_assert! { level >= self.level }
        self.cube = cube.into();
        self.level = level
    }
}
impl fmt::Display for Lemma {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "{} @ {}", self.cube, self.level)
    }
}
