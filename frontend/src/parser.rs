//! The compiler state: word map, emission target and the compile-time
//! jump stack used to back-patch `if`/`else`/`then`.
//!
//! Parsing emits directly into code blocks; there is no separate AST.
//! Numbers become `Push`, runtime builtins become `Op`, user words
//! become `Call`, and the seven compile-time words mutate the compiler
//! state or consume input.

use crate::builtins::{ControlWord, CONTROL_WORDS, REGISTRY};
use crate::error::{CompileError, Result};
use crate::ir::{Code, Inst};
use crate::lexer::{parse_number, Scanner};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// Deepest allowed `if` nesting within one word.
pub const MAX_COND_DEPTH: usize = 64;

/// A name resolved by the parser.
#[derive(Debug, Clone)]
pub enum Word {
    Builtin(crate::builtins::Builtin),
    Control(ControlWord),
    User(Code),
}

/// Where emissions currently land.
enum Target {
    /// Top level: the main block.
    Main,
    /// Right after `:`, awaiting the name of the new word.
    Pending,
    /// Inside `: name ... ;`.
    Word(String),
}

pub struct Compiler {
    words: FxHashMap<String, Word>,
    main: Code,
    target: Target,
    jump_stack: SmallVec<[usize; MAX_COND_DEPTH]>,
}

impl Compiler {
    /// A fresh compiler with every builtin registered, including the
    /// fused ones the peephole optimizer emits.
    pub fn new() -> Self {
        let mut words = FxHashMap::default();
        for &(name, b) in REGISTRY {
            words.insert(name.to_string(), Word::Builtin(b));
        }
        for &(name, c) in CONTROL_WORDS {
            words.insert(name.to_string(), Word::Control(c));
        }
        Self {
            words,
            main: Code::new(),
            target: Target::Main,
            jump_stack: SmallVec::new(),
        }
    }

    /// Parse a complete source text into the main block, appending the
    /// terminal `Halt`. On failure the state may hold partial
    /// definitions and should be discarded.
    pub fn parse(&mut self, source: &str) -> Result<()> {
        self.jump_stack.clear();
        let mut scanner = Scanner::new(source);
        while let Some(token) = scanner.next_token()? {
            self.compile_token(token, &mut scanner)?;
        }
        if !matches!(self.target, Target::Main) {
            return Err(CompileError::UnfinishedDefinition);
        }
        if !self.jump_stack.is_empty() {
            return Err(CompileError::DanglingConditional);
        }
        self.main.push(Inst::Halt);
        Ok(())
    }

    pub fn main(&self) -> &Code {
        &self.main
    }

    pub fn words(&self) -> &FxHashMap<String, Word> {
        &self.words
    }

    pub fn into_parts(self) -> (Code, FxHashMap<String, Word>) {
        (self.main, self.words)
    }

    fn compile_token(&mut self, token: &str, scanner: &mut Scanner) -> Result<()> {
        if let Some(value) = parse_number(token) {
            if matches!(self.target, Target::Pending) {
                return Err(CompileError::NumberAsName { value });
            }
            self.emit(Inst::Push(value));
            return Ok(());
        }

        enum Resolved {
            Control(ControlWord),
            Builtin(crate::builtins::Builtin),
            User,
            Unknown,
        }
        let resolved = match self.words.get(token) {
            Some(Word::Control(c)) => Resolved::Control(*c),
            Some(Word::Builtin(b)) => Resolved::Builtin(*b),
            Some(Word::User(_)) => Resolved::User,
            None => Resolved::Unknown,
        };

        // Name resolution wins over compile-time dispatch while a name
        // is awaited, so `: if ...` is a redefinition error and a
        // comment cannot sit between `:` and the name.
        if matches!(self.target, Target::Pending) {
            return match resolved {
                Resolved::Control(_) | Resolved::Builtin(_) => {
                    Err(CompileError::RedefinedBuiltin { word: token.into() })
                }
                Resolved::User => Err(CompileError::RedefinedWord { word: token.into() }),
                Resolved::Unknown => {
                    self.words.insert(token.to_string(), Word::User(Code::new()));
                    self.target = Target::Word(token.to_string());
                    Ok(())
                }
            };
        }

        match resolved {
            Resolved::Control(c) => self.control(c, scanner),
            Resolved::Builtin(b) => {
                self.emit(Inst::Op(b));
                Ok(())
            }
            Resolved::User => {
                self.emit(Inst::Call(token.to_string()));
                Ok(())
            }
            Resolved::Unknown => Err(CompileError::UndefinedWord { word: token.into() }),
        }
    }

    fn control(&mut self, word: ControlWord, scanner: &mut Scanner) -> Result<()> {
        match word {
            ControlWord::Backslash => scanner.skip_line_comment(),
            ControlWord::Paren => scanner.skip_paren_comment(),
            ControlWord::Colon => {
                if !matches!(self.target, Target::Main) {
                    return Err(CompileError::NestedDefinition);
                }
                self.target = Target::Pending;
                Ok(())
            }
            ControlWord::Semicolon => {
                if !self.jump_stack.is_empty() {
                    return Err(CompileError::UnbalancedConditional);
                }
                if matches!(self.target, Target::Main) {
                    return Err(CompileError::UnexpectedSemicolon);
                }
                self.target = Target::Main;
                Ok(())
            }
            ControlWord::If => {
                if self.jump_stack.len() >= MAX_COND_DEPTH {
                    return Err(CompileError::TooManyNestedIfs);
                }
                let branch = self.emit(Inst::JumpIfZero(0));
                self.jump_stack.push(branch);
                Ok(())
            }
            ControlWord::Else => {
                let pending = self
                    .jump_stack
                    .pop()
                    .ok_or(CompileError::ControlWithoutIf { word: "else" })?;
                let jump = self.emit(Inst::Jump(0));
                self.jump_stack.push(jump);
                // The false branch starts right after the jump.
                self.patch(pending, jump + 1);
                Ok(())
            }
            ControlWord::Then => {
                let pending = self
                    .jump_stack
                    .pop()
                    .ok_or(CompileError::ControlWithoutIf { word: "then" })?;
                let nop = self.emit(Inst::Nop);
                self.patch(pending, nop);
                Ok(())
            }
        }
    }

    /// Append to the current block, returning the instruction's index.
    fn emit(&mut self, inst: Inst) -> usize {
        let code = match &self.target {
            Target::Main => &mut self.main,
            Target::Pending => unreachable!("tokens are rejected while awaiting a name"),
            Target::Word(name) => match self.words.get_mut(name.as_str()) {
                Some(Word::User(code)) => code,
                _ => unreachable!("defining target is always a user word"),
            },
        };
        code.push(inst);
        code.len() - 1
    }

    fn patch(&mut self, at: usize, target: usize) {
        let code = match &self.target {
            Target::Main => &mut self.main,
            Target::Pending => unreachable!("no emissions while awaiting a name"),
            Target::Word(name) => match self.words.get_mut(name.as_str()) {
                Some(Word::User(code)) => code,
                _ => unreachable!("defining target is always a user word"),
            },
        };
        match &mut code[at] {
            Inst::JumpIfZero(t) | Inst::Jump(t) => *t = target,
            _ => unreachable!("jump stack entries always index a branch"),
        }
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}
