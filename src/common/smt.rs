//! SMT-related zero-cost wrappers.

use rsmt2::print::*;

use crate::common::*;
use crate::oracle::SatSession;
use crate::term::typ::RTyp;

/// SMT-prints a literal.
pub struct SmtLit<'a> {
    /// The literal.
    pub lit: &'a Term,
}
impl<'a> SmtLit<'a> {
    /// Constructor.
    pub fn new(lit: &'a Term) -> Self {
        SmtLit { lit }
    }
}
impl<'a> Expr2Smt<()> for SmtLit<'a> {
    fn expr_to_smt2<Writer: Write>(&self, w: &mut Writer, _: ()) -> SmtRes<()> {
        self.lit.get().write(w)?;
        Ok(())
    }
}

/// SMT-prints a collection of literals as a conjunction.
pub struct SmtConj<'a> {
    /// Conjunction.
    pub lits: &'a [Term],
}
impl<'a> SmtConj<'a> {
    /// Constructor.
    pub fn new(lits: &'a [Term]) -> Self {
        SmtConj { lits }
    }
}
impl<'a> Expr2Smt<()> for SmtConj<'a> {
    fn expr_to_smt2<Writer: Write>(&self, w: &mut Writer, _: ()) -> SmtRes<()> {
        if self.lits.is_empty() {
            write!(w, "true")?
        } else {
            write!(w, "(and")?;
            for lit in self.lits {
                write!(w, " ")?;
                lit.get().write(w)?
            }
            write!(w, ")")?
        }
        Ok(())
    }
}

/// SMT-prints a constant symbol.
pub struct SmtSym<'a> {
    /// Name of the symbol.
    pub name: &'a str,
}
impl<'a> Sym2Smt<()> for SmtSym<'a> {
    fn sym_to_smt2<Writer: Write>(&self, w: &mut Writer, _: ()) -> SmtRes<()> {
        write!(w, "{}", self.name)?;
        Ok(())
    }
}

impl Sort2Smt for RTyp {
    fn sort_to_smt2<Writer: Write>(&self, w: &mut Writer) -> SmtRes<()> {
        write!(w, "{}", self)?;
        Ok(())
    }
}

/// Scoped satisfiability session backed by an `rsmt2` solver.
///
/// Spawned from the global solver configuration. Solver-level failures on
/// `check` are demoted to "unknown": a candidate rejected because the
/// solver died is indistinguishable from one the solver could not decide,
/// and neither may corrupt the lemma being generalized.
pub struct SmtSession {
    /// Underlying solver.
    solver: Solver<()>,
}
impl SmtSession {
    /// Spawns a solver and wraps it.
    pub fn new(name: &'static str) -> Res<Self> {
        let solver = crate::errors::ResultExt::chain_err(conf.solver.spawn(name, ()), || {
            "while spawning a solver for a satisfiability session"
        })?;
        Ok(SmtSession { solver })
    }
}
impl SatSession for SmtSession {
    fn declare_const(&mut self, name: &str, typ: &Typ) -> Res<()> {
        self.solver.declare_const(&SmtSym { name }, typ.get())?;
        Ok(())
    }
    fn push(&mut self) -> Res<()> {
        self.solver.push(1)?;
        Ok(())
    }
    fn pop(&mut self) -> Res<()> {
        self.solver.pop(1)?;
        Ok(())
    }
    fn assert_lit(&mut self, lit: &Term) -> Res<()> {
        self.solver.assert(&SmtLit::new(lit))?;
        Ok(())
    }
    fn check(&mut self) -> Res<Option<bool>> {
        match self.solver.check_sat() {
            Ok(sat) => Ok(Some(sat)),
            Err(e) => {
                log! { @debug "solver could not decide: {}", e }
                Ok(None)
            }
        }
    }
}
