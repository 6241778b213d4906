//! Interfaces to the engine's reasoning services.
//!
//! The generalizers consume three external collaborators through the traits
//! of this module:
//!
//! - [`Frames`], the inductiveness oracle (frame bookkeeping and
//!   transition-relation checking live in the engine),
//! - [`Expander`], the literal expansion oracle used on failed drops,
//! - [`SatSession`], a scoped incremental satisfiability session.
//!
//! Everything is blocking and synchronous: a generalizer works on one lemma
//! at a time and never spawns concurrent work.

use crate::common::*;

/// Inductiveness oracle.
pub trait Frames {
    /// Checks whether `cube` is inductive at `level`.
    ///
    /// Returns `Some(uses_level)` with `uses_level >= level` if the cube is
    /// inductive, `None` otherwise. Errors mean the oracle could not decide
    /// (solver failure); callers treat them as "cannot prove inductive".
    fn check_inductive(&mut self, level: Level, cube: &[Term], weakness: usize)
        -> Res<Option<Level>>;

    /// Checks whether a lemma is invariant and reduces it to an unsat core.
    ///
    /// Returns `Some((core, uses_level))` where `core` is a subset of the
    /// lemma's cube sufficient to prove inductiveness. Returns `None` only
    /// if the lemma does not hold, which for an already-certified lemma is
    /// an oracle contract violation.
    fn is_invariant(&mut self, level: Level, lemma: &Lemma) -> Res<Option<(Vec<Term>, Level)>>;
}

/// Literal expansion oracle.
pub trait Expander {
    /// Case-split refinements of a literal.
    ///
    /// The result is never empty; a first element equal to the input
    /// signals that no useful expansion exists.
    fn expand(&mut self, lit: &Term) -> Vec<Term>;
}

/// Expander performing arithmetic case splits.
///
/// - `a >= b` expands to `a > b` and `a = b`,
/// - `a <= b` expands to `a < b` and `a = b`,
/// - `not (a = b)` over integers expands to `a < b` and `a > b`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CaseSplit;
impl Expander for CaseSplit {
    fn expand(&mut self, lit: &Term) -> Vec<Term> {
        if let Some((op, args)) = lit.app_inspect() {
            match op {
                Op::Ge if args.len() == 2 => {
                    return vec![
                        term::gt(args[0].clone(), args[1].clone()),
                        term::eq(args[0].clone(), args[1].clone()),
                    ]
                }
                Op::Le if args.len() == 2 => {
                    return vec![
                        term::lt(args[0].clone(), args[1].clone()),
                        term::eq(args[0].clone(), args[1].clone()),
                    ]
                }
                Op::Not => {
                    if let Some((lhs, rhs)) = args[0].eq_inspect() {
                        if lhs.typ().is_int() && rhs.typ().is_int() {
                            return vec![
                                term::lt(lhs.clone(), rhs.clone()),
                                term::gt(lhs.clone(), rhs.clone()),
                            ];
                        }
                    }
                }
                _ => (),
            }
        }
        vec![lit.clone()]
    }
}

/// Scoped incremental satisfiability session.
///
/// Assertions follow strict stack discipline: every `push` must be matched
/// by a `pop` before the session is dropped, on all paths. Use [`scoped`]
/// rather than pairing the calls by hand.
pub trait SatSession {
    /// Declares an uninterpreted constant.
    fn declare_const(&mut self, name: &str, typ: &Typ) -> Res<()>;
    /// Opens an assertion scope.
    fn push(&mut self) -> Res<()>;
    /// Closes the innermost assertion scope.
    fn pop(&mut self) -> Res<()>;
    /// Asserts a literal in the current scope.
    fn assert_lit(&mut self, lit: &Term) -> Res<()>;
    /// Checks satisfiability of the current assertions.
    ///
    /// `Some(false)` is unsat, `None` is unknown.
    fn check(&mut self) -> Res<Option<bool>>;
}

/// Runs some action inside an assertion scope.
///
/// The scope is closed on every exit path, including early success and
/// errors raised by the action.
pub fn scoped<T, F>(session: &mut dyn SatSession, f: F) -> Res<T>
where
    F: FnOnce(&mut dyn SatSession) -> Res<T>,
{
    session.push()?;
    let res = f(session);
    let popped = session.pop();
    match (res, popped) {
        (Ok(val), Ok(())) => Ok(val),
        (Err(e), _) => Err(e),
        (_, Err(e)) => Err(e),
    }
}
