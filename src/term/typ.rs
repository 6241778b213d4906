//! Everything sort-related.

use std::fmt;

use hashconsing::{HConsed, HashConsign};

use crate::common::*;

hashconsing::consign! {
    /// Sort factory.
    let factory = consign(conf.instance.term_capa) for RTyp ;
}

/// Generates the `Bool` sort.
pub fn bool() -> Typ {
    factory.mk(RTyp::Bool)
}
/// Generates the `Int` sort.
pub fn int() -> Typ {
    factory.mk(RTyp::Int)
}
/// Generates an array sort.
pub fn array(src: Typ, tgt: Typ) -> Typ {
    factory.mk(RTyp::Array { src, tgt })
}

/// A hash-consed sort.
pub type Typ = HConsed<RTyp>;

/// Sorts.
///
/// # Examples
///
/// ```rust
/// use lemgen::term::typ::*;
/// assert_eq! {
///   format!("{}", array(int(), array(int(), int()))),
///   "(Array Int (Array Int Int))"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RTyp {
    /// Booleans.
    Bool,
    /// Integers.
    Int,

    /// Arrays.
    Array {
        /// Sort of indices.
        src: Typ,
        /// Sort of values.
        tgt: Typ,
    },
}
impl RTyp {
    /// True if the sort is bool.
    pub fn is_bool(&self) -> bool {
        *self == RTyp::Bool
    }
    /// True if the sort is integer.
    pub fn is_int(&self) -> bool {
        *self == RTyp::Int
    }
    /// True if the sort is an array sort.
    pub fn is_array(&self) -> bool {
        matches!(*self, RTyp::Array { .. })
    }

    /// Source and target sorts if the sort is an array sort.
    pub fn array_inspect(&self) -> Option<(&Typ, &Typ)> {
        if let RTyp::Array { ref src, ref tgt } = *self {
            Some((src, tgt))
        } else {
            None
        }
    }
}
impl fmt::Display for RTyp {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            RTyp::Bool => write!(fmt, "Bool"),
            RTyp::Int => write!(fmt, "Int"),
            RTyp::Array { ref src, ref tgt } => write!(fmt, "(Array {} {})", src.get(), tgt.get()),
        }
    }
}
