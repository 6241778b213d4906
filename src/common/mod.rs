//! Base types and functions.

pub use std::collections::{HashMap, HashSet};
pub use std::io::Result as IoRes;
pub use std::io::{Read, Write};
pub use std::sync::RwLock;

pub use hashconsing::coll::*;
pub use hashconsing::HashConsign;

pub use rsmt2::{SmtRes, Solver};

pub use crate::errors::*;
pub use crate::lemma::{Cube, Lemma, Level, PobIdx};
pub use crate::term;
pub use crate::term::typ;
pub use crate::term::{Op, RTerm, Term, Typ};

#[macro_use]
pub mod macros;
pub mod config;
pub mod profiling;
pub mod smt;

pub use self::config::*;
pub use self::profiling::{DurationExt, Profiler};

lazy_static! {
    /// Configuration from clap.
    pub static ref conf: Config = Config::clap();
}

// |===| Type and trait aliases.

/// Integers.
pub type Int = ::num::BigInt;

/// A set of terms.
pub type TermSet = HConSet<Term>;
/// A map from terms to something.
pub type TermMap<T> = HConMap<Term, T>;

// |===| Helpers.

/// Prints the stats if asked. Does nothing in bench mode.
#[cfg(feature = "bench")]
pub fn print_stats(_: &'static str, _: &Profiler) {}
/// Prints the stats if asked. Does nothing in bench mode.
#[cfg(not(feature = "bench"))]
pub fn print_stats(name: &str, profiler: &Profiler) {
    if conf.stats {
        println!();
        profiler.print(name);
        println!()
    }
}

/// Creates a directory if it doesn't exist.
pub fn mk_dir<P: AsRef<::std::path::Path>>(path: P) -> Res<()> {
    use std::fs::DirBuilder;
    DirBuilder::new().recursive(true).create(path)?;
    Ok(())
}
