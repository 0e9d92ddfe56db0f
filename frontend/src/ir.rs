//! Instruction representation shared by the parser, the optimizer and
//! the interpreter.

use crate::builtins::Builtin;
use std::fmt;

/// A compiled instruction. Immediates live in the variant; branch
/// targets are absolute instruction indices into the containing block.
#[derive(Debug, Clone, PartialEq)]
pub enum Inst {
    /// Push a literal onto the D stack.
    Push(f64),
    /// Pop the D stack and transfer to the target when the popped value
    /// is exactly 0.0; fall through otherwise.
    JumpIfZero(usize),
    /// Unconditional transfer.
    Jump(usize),
    /// Landing site emitted by `then`. Preserved until inlining so
    /// branch targets can be re-derived uniformly.
    Nop,
    /// Publish the final stack depths and stop.
    Halt,
    /// Invoke a runtime builtin.
    Op(Builtin),
    /// Call a user word by name. Never survives inlining.
    Call(String),
}

/// A code block: the body of a user word, or the main program.
pub type Code = Vec<Inst>;

impl fmt::Display for Inst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Inst::Push(v) => write!(f, "number {v}"),
            Inst::JumpIfZero(t) => write!(f, "if-zero -> {t}"),
            Inst::Jump(t) => write!(f, "jump -> {t}"),
            Inst::Nop => write!(f, "nop"),
            Inst::Halt => write!(f, "halt"),
            Inst::Op(b) if b.is_private() => {
                write!(f, "call private builtin '{}'", b.name().trim_start())
            }
            Inst::Op(b) => write!(f, "call builtin '{}'", b.name()),
            Inst::Call(name) => write!(f, "call word '{name}'"),
        }
    }
}
