//! Peephole rewrites over an inlined block.
//!
//! One pass copies the block into a fresh one. As each runtime builtin
//! arrives it is matched against the already-emitted tail: short
//! sequences fuse into private builtins, and arithmetic on literal
//! operands folds into a single push. Branches and the `then` landing
//! nop act as barriers; they are re-emitted with targets re-derived by
//! the same jump-stack discipline the inliner uses, so no pattern ever
//! matches across a control edge.

use crate::inline::retarget;
use crate::{OptimizeError, Result};
use pixelforth_frontend::{Builtin, Code, Inst};
use smallvec::SmallVec;
use tracing::debug;

/// Run the optimizer: one pass, and one more if the first changed
/// anything.
pub fn optimize(code: &mut Code) -> Result<()> {
    if pass(code)? {
        pass(code)?;
    }
    Ok(())
}

/// A single rewrite pass. Returns whether anything changed.
pub fn pass(code: &mut Code) -> Result<bool> {
    let mut out = Code::with_capacity(code.len());
    let mut pending: SmallVec<[usize; 16]> = SmallVec::new();
    let mut modified = false;

    for inst in code.iter() {
        match inst {
            Inst::Op(b) => {
                if fuse_pair(&mut out, *b) || fold_constants(&mut out, *b) {
                    modified = true;
                } else {
                    out.push(Inst::Op(*b));
                }
            }
            Inst::JumpIfZero(_) => {
                out.push(Inst::JumpIfZero(0));
                pending.push(out.len() - 1);
            }
            Inst::Jump(_) => {
                out.push(Inst::Jump(0));
                let p = pending.pop().ok_or(OptimizeError::MalformedControlFlow)?;
                let target = out.len();
                retarget(&mut out, p, target);
                pending.push(target - 1);
            }
            Inst::Nop => {
                out.push(Inst::Nop);
                let p = pending.pop().ok_or(OptimizeError::MalformedControlFlow)?;
                let nop_at = out.len() - 1;
                retarget(&mut out, p, nop_at);
            }
            other => out.push(other.clone()),
        }
    }

    if modified {
        debug!(before = code.len(), after = out.len(), "peephole rewrote block");
    }
    *code = out;
    Ok(modified)
}

/// One-instruction look-back: fuse the incoming builtin with the
/// previously emitted one.
fn fuse_pair(out: &mut [Inst], incoming: Builtin) -> bool {
    use Builtin::*;
    let Some(Inst::Op(prev)) = out.last() else {
        return false;
    };
    let fused = match (*prev, incoming) {
        (Mul, Add) => Fma,
        (Pi, Mul) => MultPi,
        (Dup, Dup) => DupDup,
        (Unrot, Swap) => UnrotSwap,
        (Ge, Swap) => GeSwap,
        (MultPi, Div2) => MultHalfPi,
        _ => return false,
    };
    let last = out.len() - 1;
    out[last] = Inst::Op(fused);
    true
}

/// Longer look-back: fold literal operands at the tail.
fn fold_constants(out: &mut Code, incoming: Builtin) -> bool {
    use Builtin::*;
    match incoming {
        Add | Sub | Mul | Div => {
            if let [.., Inst::Push(a), Inst::Push(b)] = out.as_slice() {
                let folded = match incoming {
                    Add => a + b,
                    Sub => a - b,
                    Mul => a * b,
                    // Matches the runtime word: division by zero
                    // produces positive infinity.
                    Div if *b == 0.0 => f64::INFINITY,
                    Div => a / b,
                    _ => unreachable!(),
                };
                out.truncate(out.len() - 2);
                out.push(Inst::Push(folded));
                return true;
            }
            // A lone constant 2.0 at the tail strength-reduces; the
            // value below stays on the stack. Dividends that are
            // themselves constants were handled above.
            if matches!(incoming, Mul | Div) && matches!(out.last(), Some(Inst::Push(v)) if *v == 2.0)
            {
                let last = out.len() - 1;
                out[last] = Inst::Op(if incoming == Mul { Mult2 } else { Div2 });
                return true;
            }
            false
        }
        Pow => {
            if matches!(out.last(), Some(Inst::Push(v)) if *v == 2.0) {
                let last = out.len() - 1;
                out[last] = Inst::Op(Pow2);
                return true;
            }
            false
        }
        Mult2 => {
            // A fused doubling right after a literal collapses into it.
            if let Some(Inst::Push(v)) = out.last_mut() {
                *v *= 2.0;
                return true;
            }
            false
        }
        _ => false,
    }
}
