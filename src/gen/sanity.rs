//! Lemma sanity checking.

use crate::common::*;
use crate::gen::Generalizer;
use crate::oracle::Frames;

/// Re-checks a lemma the engine believes inductive.
///
/// Debugging strategy: it never changes the lemma, it only fails loudly
/// when the oracle rejects a (cube, level) pair the engine already
/// committed to. Meant to run at the end of a pipeline.
#[derive(Debug, Clone, Copy, Default)]
pub struct SanityCheck;

impl Generalizer for SanityCheck {
    fn name(&self) -> &'static str {
        "sanity"
    }

    fn generalize(&mut self, frames: &mut dyn Frames, lemma: &mut Lemma) -> Res<()> {
        if lemma.cube().is_empty() {
            return Ok(());
        }
        match frames.check_inductive(lemma.level(), lemma.cube(), lemma.weakness())? {
            Some(_) => Ok(()),
            None => {
                log! { @err "lemma {} is not inductive", lemma }
                bail!(ErrorKind::UnsoundOracle)
            }
        }
    }
}
