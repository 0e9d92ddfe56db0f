//! User-word call expansion.
//!
//! Walks the main block and splices in the body of every called word,
//! recursively, so the final program is a single flat block the
//! interpreter can run without a call stack. Branch targets are
//! re-derived from scratch while appending: each expansion level keeps
//! its own jump stack in the same discipline the parser uses, which
//! keeps outer branches correct as inner regions change length.

use crate::{OptimizeError, Result};
use pixelforth_frontend::{Code, Inst, Word};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// Deepest allowed chain of user-word calls.
pub const MAX_INLINE_DEPTH: usize = 100;

/// Produce a copy of `main` with every `Call` expanded.
pub fn expand_calls(main: &Code, words: &FxHashMap<String, Word>) -> Result<Code> {
    let mut out = Code::with_capacity(main.len());
    expand_block(main, words, &mut out, MAX_INLINE_DEPTH)?;
    Ok(out)
}

fn expand_block(
    block: &[Inst],
    words: &FxHashMap<String, Word>,
    out: &mut Code,
    depth: usize,
) -> Result<()> {
    if depth == 0 {
        return Err(OptimizeError::RecursionLimit);
    }

    let mut pending: SmallVec<[usize; 16]> = SmallVec::new();

    for inst in block {
        match inst {
            Inst::Call(name) => match words.get(name) {
                Some(Word::User(code)) => expand_block(code, words, out, depth - 1)?,
                _ => return Err(OptimizeError::UnknownWord { word: name.clone() }),
            },
            Inst::JumpIfZero(_) => {
                out.push(Inst::JumpIfZero(0));
                pending.push(out.len() - 1);
            }
            Inst::Jump(_) => {
                out.push(Inst::Jump(0));
                let p = pending.pop().ok_or(OptimizeError::MalformedControlFlow)?;
                // The false branch starts right after this jump.
                let target = out.len();
                retarget(out, p, target);
                pending.push(target - 1);
            }
            Inst::Nop => {
                out.push(Inst::Nop);
                let p = pending.pop().ok_or(OptimizeError::MalformedControlFlow)?;
                let nop_at = out.len() - 1;
                retarget(out, p, nop_at);
            }
            other => out.push(other.clone()),
        }
    }

    Ok(())
}

pub(crate) fn retarget(code: &mut [Inst], at: usize, target: usize) {
    match &mut code[at] {
        Inst::JumpIfZero(t) | Inst::Jump(t) => *t = target,
        _ => unreachable!("jump stack entries always index a branch"),
    }
}
