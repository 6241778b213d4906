//! Error types.
//!
//! Almost everything that can go wrong during generalization is local
//! control-flow: a drop attempt the oracle rejects, a solver that answers
//! `unknown`, a decision service that times out. None of these are errors.
//! The kinds below are reserved for the few conditions that must abort a
//! generalization run, [`LevelRegression`][regr] and
//! [`UnsoundOracle`][unsound] in particular.
//!
//! [regr]: enum.ErrorKind.html#variant.LevelRegression
//! (LevelRegression variant of the ErrorKind enum)
//! [unsound]: enum.ErrorKind.html#variant.UnsoundOracle
//! (UnsoundOracle variant of the ErrorKind enum)

error_chain! {
    types {
        Error, ErrorKind, ResultExt, Res;
    }

    links {
        SmtError(
            ::rsmt2::errors::Error, ::rsmt2::errors::ErrorKind
        ) #[doc = "Error at SMT level."];
    }

    foreign_links {
        Io(::std::io::Error) #[doc = "IO error."];
    }

    errors {
        #[doc = "The oracle certified a level below the lemma's level."]
        LevelRegression(from: usize, to: usize) {
            description("level regression")
            display(
                "oracle certified level {} for a lemma already at level {}",
                to, from
            )
        }
        #[doc = "The oracle rejected a lemma it had already certified."]
        UnsoundOracle {
            description("unsound oracle")
            display("oracle rejected a lemma it had already certified")
        }
        #[doc = "Decision service protocol error."]
        Protocol(msg: String) {
            description("decision service protocol error")
            display("decision service protocol error: {}", msg)
        }
    }
}

impl Error {
    /// True if the error must abort the generalization run.
    pub fn is_hard_stop(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::LevelRegression(_, _) | ErrorKind::UnsoundOracle
        )
    }
}

/// Prints an error.
pub fn print_err(e: &Error) {
    use crate::common::*;
    println!("({} \"", conf.bad("error"));
    for e in e.iter() {
        for line in format!("{}", e).lines() {
            println!("  {}", line)
        }
    }
    println!("\")")
}
