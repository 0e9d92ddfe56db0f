//! Pixelforth is a compiler and interpreter for the Forth Salon
//! pixel-shader dialect.
//!
//! Programs ("haikus") manipulate two stacks of doubles and read a
//! small record of per-invocation inputs; whatever remains on the data
//! stack when execution halts is the caller's result, typically color
//! channels. Compilation flattens every user word into one linear,
//! branch-resolved block, rewrites it with a peephole optimizer, and
//! statically verifies stack effects so the interpreter can run with
//! no bounds checks and no runtime errors.
//!
//! ```
//! use pixelforth::{Engine, Vars};
//!
//! let mut engine = Engine::compile(": sq dup * ; x sq").unwrap();
//! let mut vars = Vars { x: 3.0, ..Default::default() };
//! engine.run(&mut vars);
//! assert_eq!(engine.d_stack(&vars), &[9.0]);
//! ```

pub mod engine;
pub mod error;
pub mod interp;
pub mod render;

pub use engine::Engine;
pub use error::{Error, Result};
pub use interp::{Vars, MEMORY_SLOTS};
pub use render::{render_rgb, write_ppm, RenderOptions};

pub use pixelforth_frontend::{
    Builtin, Code, CompileError, Compiler, ControlWord, Inst, StackEffect, Word, MAX_COND_DEPTH,
    MAX_WORD_LEN,
};
pub use pixelforth_optimizer::{
    check_stack_effects, expand_calls, peephole, OptimizeError, MAX_INLINE_DEPTH, STACK_CAPACITY,
};
