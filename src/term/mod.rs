//! Hash-consed literals over the transition system's state vocabulary.
//!
//! A literal is an atomic predicate or its negation over symbolic state
//! constants. Two syntactically identical literals are the same entity:
//! the factory is a lazy static, and all creation goes through the
//! functions of this module ([`sym`], [`eq`], [`not`], ...).
//!
//! The generalizers only ever inspect literals through the theory
//! predicates below ([`RTerm::is_array_eq`], [`has_array_sub`], ...), the
//! rest of the structure is opaque to them.

use std::fmt;

use hashconsing::{HConsed, HashConsign};
use num::Zero;

use crate::common::*;

pub mod typ;


pub use self::typ::Typ;

hashconsing::consign! {
    /// Literal factory.
    let factory = consign(conf.instance.term_capa) for RTerm ;
}

/// A hash-consed term.
pub type Term = HConsed<RTerm>;

/// Operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Op {
    /// Negation.
    Not,
    /// Conjunction.
    And,
    /// Equality.
    Eq,
    /// Greater than or equal to.
    Ge,
    /// Greater than.
    Gt,
    /// Less than or equal to.
    Le,
    /// Less than.
    Lt,
    /// Addition.
    Add,
    /// Subtraction.
    Sub,
    /// Multiplication.
    Mul,
    /// Array selection.
    Select,
    /// Array update.
    Store,
}
impl Op {
    /// String representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Op::Not => "not",
            Op::And => "and",
            Op::Eq => "=",
            Op::Ge => ">=",
            Op::Gt => ">",
            Op::Le => "<=",
            Op::Lt => "<",
            Op::Add => "+",
            Op::Sub => "-",
            Op::Mul => "*",
            Op::Select => "select",
            Op::Store => "store",
        }
    }

    /// Sort of an application of this operator.
    ///
    /// Panics on an ill-sorted application, which is a defect in the
    /// caller, not a runtime condition.
    pub fn typ(self, args: &[Term]) -> Typ {
        match self {
            Op::Not | Op::And | Op::Eq | Op::Ge | Op::Gt | Op::Le | Op::Lt => typ::bool(),
            Op::Add | Op::Sub | Op::Mul => typ::int(),
            Op::Select => {
                let (_, tgt) = args[0]
                    .typ()
                    .array_inspect()
                    .map(|(src, tgt)| (src.clone(), tgt.clone()))
                    .unwrap_or_else(|| panic!("ill-sorted `select` application"));
                tgt
            }
            Op::Store => args[0].typ(),
        }
    }
}
impl fmt::Display for Op {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "{}", self.as_str())
    }
}

/// Terms.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RTerm {
    /// A boolean constant.
    Bool(bool),
    /// An integer constant.
    Int(Int),
    /// An uninterpreted state constant.
    Sym {
        /// Name of the constant.
        name: String,
        /// Sort of the constant.
        typ: Typ,
    },
    /// An operator application.
    App {
        /// The operator.
        op: Op,
        /// Sort of the application.
        typ: Typ,
        /// The arguments.
        args: Vec<Term>,
    },
}

impl RTerm {
    /// Sort of the term.
    pub fn typ(&self) -> Typ {
        match *self {
            RTerm::Bool(_) => typ::bool(),
            RTerm::Int(_) => typ::int(),
            RTerm::Sym { ref typ, .. } => typ.clone(),
            RTerm::App { ref typ, .. } => typ.clone(),
        }
    }

    /// True if the term is the constant `true`.
    pub fn is_true(&self) -> bool {
        *self == RTerm::Bool(true)
    }
    /// True if the term is the constant `false`.
    pub fn is_false(&self) -> bool {
        *self == RTerm::Bool(false)
    }
    /// Boolean value of the term, if it is a boolean constant.
    pub fn bool(&self) -> Option<bool> {
        if let RTerm::Bool(b) = *self {
            Some(b)
        } else {
            None
        }
    }

    /// Name and sort of the term, if it is an uninterpreted constant.
    pub fn sym_inspect(&self) -> Option<(&str, &Typ)> {
        if let RTerm::Sym { ref name, ref typ } = *self {
            Some((name, typ))
        } else {
            None
        }
    }

    /// Operator and arguments of the term, if it is an application.
    pub fn app_inspect(&self) -> Option<(Op, &[Term])> {
        if let RTerm::App { op, ref args, .. } = *self {
            Some((op, args))
        } else {
            None
        }
    }

    /// Both sides of the term, if it is an equality.
    pub fn eq_inspect(&self) -> Option<(&Term, &Term)> {
        match self.app_inspect() {
            Some((Op::Eq, args)) if args.len() == 2 => Some((&args[0], &args[1])),
            _ => None,
        }
    }

    /// The term negated by this term, if it is a negation.
    pub fn negated(&self) -> Option<&Term> {
        match self.app_inspect() {
            Some((Op::Not, args)) => Some(&args[0]),
            _ => None,
        }
    }

    /// True if the term is an equality between two uninterpreted constants
    /// of array sort.
    pub fn is_array_eq(&self) -> bool {
        if let Some((lhs, rhs)) = self.eq_inspect() {
            if let (Some((_, l_typ)), Some((_, r_typ))) = (lhs.sym_inspect(), rhs.sym_inspect()) {
                return l_typ.is_array() && r_typ.is_array();
            }
        }
        false
    }

    /// True if the term is a negated equality between two uninterpreted
    /// constants of array sort.
    pub fn is_neg_array_eq(&self) -> bool {
        match self.negated() {
            Some(sub) => sub.is_array_eq(),
            None => false,
        }
    }

    /// Writes the term in SMT-LIB syntax.
    pub fn write<W: Write>(&self, w: &mut W) -> IoRes<()> {
        match *self {
            RTerm::Bool(b) => write!(w, "{}", b),
            RTerm::Int(ref i) => {
                if i < &Int::zero() {
                    write!(w, "(- {})", -i)
                } else {
                    write!(w, "{}", i)
                }
            }
            RTerm::Sym { ref name, .. } => write!(w, "{}", name),
            RTerm::App { op, ref args, .. } => {
                write!(w, "({}", op)?;
                for arg in args {
                    write!(w, " ")?;
                    arg.get().write(w)?
                }
                write!(w, ")")
            }
        }
    }
}
impl fmt::Display for RTerm {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        let mut buf = Vec::with_capacity(30);
        self.write(&mut buf)
            .expect("writing to a string buffer cannot fail");
        write!(fmt, "{}", String::from_utf8_lossy(&buf))
    }
}

// |===| Factory functions.

/// Creates a term.
#[inline]
pub fn term(t: RTerm) -> Term {
    factory.mk(t)
}

/// Creates a boolean constant.
#[inline]
pub fn bool(b: bool) -> Term {
    factory.mk(RTerm::Bool(b))
}
/// Creates the constant `true`.
#[inline]
pub fn tru() -> Term {
    bool(true)
}
/// Creates the constant `false`.
#[inline]
pub fn fls() -> Term {
    bool(false)
}

/// Creates an integer constant.
#[inline]
pub fn int<I: Into<Int>>(i: I) -> Term {
    factory.mk(RTerm::Int(i.into()))
}

/// Creates an uninterpreted state constant.
#[inline]
pub fn sym<S: Into<String>>(name: S, typ: Typ) -> Term {
    factory.mk(RTerm::Sym {
        name: name.into(),
        typ,
    })
}

/// Creates an operator application.
#[inline]
pub fn app(op: Op, args: Vec<Term>) -> Term {
    let typ = op.typ(&args);
    factory.mk(RTerm::App { op, typ, args })
}

/// Creates a negation.
///
/// Collapses double negations and negations of boolean constants.
pub fn not(t: Term) -> Term {
    if let Some(b) = t.bool() {
        return bool(!b);
    }
    if let Some(sub) = t.negated() {
        return sub.clone();
    }
    app(Op::Not, vec![t])
}

/// Creates an equality.
#[inline]
pub fn eq(lhs: Term, rhs: Term) -> Term {
    app(Op::Eq, vec![lhs, rhs])
}

/// Creates a conjunction.
///
/// The trivial conjunction is `true`, a singleton conjunction is its only
/// element.
pub fn and(mut terms: Vec<Term>) -> Term {
    match terms.len() {
        0 => tru(),
        1 => terms.pop().expect("pop on a vector of length 1"),
        _ => app(Op::And, terms),
    }
}

/// Creates a `>=`.
#[inline]
pub fn ge(lhs: Term, rhs: Term) -> Term {
    app(Op::Ge, vec![lhs, rhs])
}
/// Creates a `>`.
#[inline]
pub fn gt(lhs: Term, rhs: Term) -> Term {
    app(Op::Gt, vec![lhs, rhs])
}
/// Creates a `<=`.
#[inline]
pub fn le(lhs: Term, rhs: Term) -> Term {
    app(Op::Le, vec![lhs, rhs])
}
/// Creates a `<`.
#[inline]
pub fn lt(lhs: Term, rhs: Term) -> Term {
    app(Op::Lt, vec![lhs, rhs])
}
/// Creates an addition.
#[inline]
pub fn add(terms: Vec<Term>) -> Term {
    app(Op::Add, terms)
}
/// Creates a subtraction.
#[inline]
pub fn sub(terms: Vec<Term>) -> Term {
    app(Op::Sub, terms)
}
/// Creates a multiplication.
#[inline]
pub fn mul(terms: Vec<Term>) -> Term {
    app(Op::Mul, terms)
}
/// Creates an array selection.
#[inline]
pub fn select(array: Term, idx: Term) -> Term {
    app(Op::Select, vec![array, idx])
}
/// Creates an array update.
#[inline]
pub fn store(array: Term, idx: Term, val: Term) -> Term {
    app(Op::Store, vec![array, idx, val])
}

// |===| Traversal helpers.

/// Applies a function to a term and all its subterms.
pub fn for_each_sub<F: FnMut(&Term)>(term: &Term, f: &mut F) {
    let mut stack = vec![term];
    while let Some(t) = stack.pop() {
        f(t);
        if let RTerm::App { ref args, .. } = **t {
            // Reversed, so that arguments come out of the stack
            // left-to-right and first-seen orders are stable.
            for arg in args.iter().rev() {
                stack.push(arg)
            }
        }
    }
}

/// True if the term mentions the array theory anywhere.
pub fn has_array_sub(term: &Term) -> bool {
    let mut found = false;
    for_each_sub(term, &mut |t| {
        if t.typ().is_array() {
            found = true
        }
        if let Some((op, _)) = t.app_inspect() {
            if op == Op::Select || op == Op::Store {
                found = true
            }
        }
    });
    found
}

/// Uninterpreted constants appearing in some terms, in first-seen order.
pub fn collect_syms(terms: &[Term]) -> Vec<Term> {
    let mut known = TermSet::new();
    let mut syms = Vec::with_capacity(7);
    for term in terms {
        for_each_sub(term, &mut |t| {
            if t.sym_inspect().is_some() && known.insert(t.clone()) {
                syms.push(t.clone())
            }
        })
    }
    syms
}

/// Array-sorted uninterpreted constants appearing in some terms.
///
/// Only constants of a single array sort are collected: the first array
/// sort encountered wins, constants of any other array sort are ignored.
pub fn collect_array_syms(terms: &[Term]) -> Vec<Term> {
    let mut sort: Option<Typ> = None;
    let mut known = TermSet::new();
    let mut syms = Vec::with_capacity(7);
    for term in terms {
        for_each_sub(term, &mut |t| {
            if let Some((_, typ)) = t.sym_inspect() {
                if !typ.is_array() {
                    return;
                }
                match sort {
                    Some(ref sort) if sort != typ => return,
                    None => sort = Some(typ.clone()),
                    _ => (),
                }
                if known.insert(t.clone()) {
                    syms.push(t.clone())
                }
            }
        })
    }
    syms
}

/// Parallel substitution.
///
/// Replaces whole subterms mapped by `map`, bottom-up rebuild everywhere
/// else.
pub fn subst(term: &Term, map: &TermMap<Term>) -> Term {
    if let Some(t) = map.get(term) {
        return t.clone();
    }
    match **term {
        RTerm::App { op, ref args, .. } => {
            let args = args.iter().map(|arg| subst(arg, map)).collect();
            app(op, args)
        }
        _ => term.clone(),
    }
}
