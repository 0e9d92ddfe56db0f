//! The execution engine: drives the pipeline once at construction and
//! then runs the verified block any number of times.

use crate::error::Result;
use crate::interp::{self, Vars};
use pixelforth_frontend::{Code, Compiler};
use pixelforth_optimizer::{check_stack_effects, expand_calls, peephole, STACK_CAPACITY};
use std::fmt::Write as _;
use tracing::debug;

/// A compiled haiku, ready to run. Owns the two value stacks; `run`
/// writes the final depths into the caller's [`Vars`], which then
/// index into them through the accessors.
#[derive(Debug, Clone)]
pub struct Engine {
    code: Code,
    d_stack: [f64; STACK_CAPACITY],
    r_stack: [f64; STACK_CAPACITY],
}

impl Engine {
    /// Compile source text: parse, inline every user-word call, run
    /// the peephole optimizer, and statically verify stack effects.
    pub fn compile(source: &str) -> Result<Self> {
        let mut compiler = Compiler::new();
        compiler.parse(source)?;
        let (main, words) = compiler.into_parts();
        debug!(instructions = main.len(), "parsed");

        let mut code = expand_calls(&main, &words)?;
        debug!(instructions = code.len(), "inlined");

        peephole::optimize(&mut code)?;
        debug!(instructions = code.len(), "optimized");

        check_stack_effects(&code)?;

        Ok(Self {
            code,
            d_stack: [0.0; STACK_CAPACITY],
            r_stack: [0.0; STACK_CAPACITY],
        })
    }

    /// Execute against the given variable record. Completion is
    /// guaranteed: the program is branch-resolved and verified, and no
    /// runtime errors exist in this dialect.
    pub fn run(&mut self, vars: &mut Vars) {
        interp::execute(&self.code, &mut self.d_stack, &mut self.r_stack, vars);
    }

    /// The compiled instruction stream.
    pub fn code(&self) -> &Code {
        &self.code
    }

    /// Residual D stack after the run described by `vars`.
    pub fn d_stack(&self, vars: &Vars) -> &[f64] {
        &self.d_stack[..vars.final_d_depth]
    }

    /// Residual R stack after the run described by `vars`.
    pub fn r_stack(&self, vars: &Vars) -> &[f64] {
        &self.r_stack[..vars.final_r_depth]
    }

    pub fn d_stack_len(&self, vars: &Vars) -> usize {
        vars.final_d_depth
    }

    /// Pop the top of the residual D stack, decrementing the recorded
    /// depth. Caller-side convenience.
    pub fn d_stack_pop(&self, vars: &mut Vars) -> Option<f64> {
        if vars.final_d_depth == 0 {
            return None;
        }
        vars.final_d_depth -= 1;
        Some(self.d_stack[vars.final_d_depth])
    }

    /// Instruction listing of the compiled program.
    pub fn disassemble(&self) -> String {
        let mut out = String::new();
        for (index, inst) in self.code.iter().enumerate() {
            let _ = writeln!(out, "{index:08}    {inst}");
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixelforth_frontend::{Builtin, CompileError, Inst};
    use pixelforth_optimizer::OptimizeError;

    #[test]
    fn compile_reports_frontend_errors() {
        assert_eq!(
            Engine::compile("nonsense").unwrap_err(),
            crate::Error::Compile(CompileError::UndefinedWord {
                word: "nonsense".into()
            })
        );
    }

    #[test]
    fn compile_reports_checker_errors() {
        assert_eq!(
            Engine::compile("drop").unwrap_err(),
            crate::Error::Optimize(OptimizeError::StackUnderflow {
                word: "drop",
                needs: 1,
                stack: "D",
            })
        );
    }

    #[test]
    fn empty_program_runs_to_an_empty_stack() {
        let mut engine = Engine::compile("").unwrap();
        assert_eq!(engine.code(), &vec![Inst::Halt]);
        let mut vars = Vars::default();
        engine.run(&mut vars);
        assert_eq!(engine.d_stack(&vars), &[] as &[f64]);
        assert_eq!(engine.d_stack_pop(&mut vars), None);
    }

    #[test]
    fn pop_walks_down_the_final_stack() {
        let mut engine = Engine::compile("1 2 3").unwrap();
        let mut vars = Vars::default();
        engine.run(&mut vars);
        assert_eq!(engine.d_stack_len(&vars), 3);
        assert_eq!(engine.d_stack_pop(&mut vars), Some(3.0));
        assert_eq!(engine.d_stack_pop(&mut vars), Some(2.0));
        assert_eq!(engine.d_stack_pop(&mut vars), Some(1.0));
        assert_eq!(engine.d_stack_pop(&mut vars), None);
    }

    #[test]
    fn disassembly_lists_every_instruction() {
        let engine = Engine::compile("5 dup dup").unwrap();
        let listing = engine.disassemble();
        assert!(listing.contains("number 5"));
        assert!(listing.contains("call private builtin 'dupdup'"));
        assert!(listing.contains("halt"));
    }

    #[test]
    fn engines_are_independent_across_threads() {
        let engine = Engine::compile("x 2 * y +").unwrap();
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let mut engine = engine.clone();
                std::thread::spawn(move || {
                    let mut vars = Vars {
                        x: f64::from(i),
                        y: 1.0,
                        ..Default::default()
                    };
                    engine.run(&mut vars);
                    engine.d_stack(&vars).to_vec()
                })
            })
            .collect();
        for (i, handle) in handles.into_iter().enumerate() {
            assert_eq!(handle.join().unwrap(), vec![i as f64 * 2.0 + 1.0]);
        }
    }

    #[test]
    fn no_calls_survive_compilation() {
        let engine = Engine::compile(": a 1 ; : b a a + ; b b *").unwrap();
        assert!(!engine.code().iter().any(|i| matches!(i, Inst::Call(_))));
        assert!(!engine
            .code()
            .iter()
            .any(|i| matches!(i, Inst::Op(Builtin::Add))));
    }
}
