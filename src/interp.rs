//! The interpreter: a dispatch loop over the verified block.
//!
//! Every step is a constant-cost match on the opcode sum, with a plain
//! program counter and two stack indices. This is the portable
//! rendition of tail-threaded dispatch. The static checker has proved
//! that the indices stay inside the arrays, so the hot loop performs
//! no bounds reasoning of its own beyond what slice indexing requires.

use pixelforth_frontend::Inst;
use pixelforth_optimizer::STACK_CAPACITY;
use rand::Rng;
use std::f64::consts::{FRAC_PI_2, PI};

/// Number of slots addressable by `@` and `!`.
pub const MEMORY_SLOTS: usize = 16;

/// Per-run inputs and outputs.
///
/// `x`, `y`, `t`, `dt` and `memory` are read and written by the
/// program; `final_d_depth` and `final_r_depth` are written by `halt`
/// and index into the engine's stacks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Vars {
    pub x: f64,
    pub y: f64,
    pub t: f64,
    pub dt: f64,
    pub memory: [f64; MEMORY_SLOTS],
    pub final_d_depth: usize,
    pub final_r_depth: usize,
}

pub(crate) fn execute(
    code: &[Inst],
    d_stack: &mut [f64; STACK_CAPACITY],
    r_stack: &mut [f64; STACK_CAPACITY],
    vars: &mut Vars,
) {
    use pixelforth_frontend::Builtin::*;

    let mut pc = 0usize;
    let mut d = 0usize;
    let mut r = 0usize;

    macro_rules! push_d {
        ($value:expr) => {{
            let v = $value;
            d_stack[d] = v;
            d += 1;
        }};
    }
    macro_rules! pop_d {
        () => {{
            d -= 1;
            d_stack[d]
        }};
    }
    macro_rules! push_r {
        ($value:expr) => {{
            let v = $value;
            r_stack[r] = v;
            r += 1;
        }};
    }
    macro_rules! pop_r {
        () => {{
            r -= 1;
            r_stack[r]
        }};
    }

    loop {
        match &code[pc] {
            Inst::Push(v) => push_d!(*v),
            Inst::JumpIfZero(target) => {
                if pop_d!() == 0.0 {
                    pc = *target;
                    continue;
                }
            }
            Inst::Jump(target) => {
                pc = *target;
                continue;
            }
            Inst::Nop => {}
            Inst::Halt => {
                vars.final_d_depth = d;
                vars.final_r_depth = r;
                return;
            }
            Inst::Call(_) => unreachable!("user-word call after inlining"),
            Inst::Op(b) => match b {
                X => push_d!(vars.x),
                Y => push_d!(vars.y),
                T => push_d!(vars.t),
                Dt => push_d!(vars.dt),
                Mx | My | Buttons => push_d!(0.0),
                Button => {
                    d -= 1;
                    push_d!(0.0);
                }
                Audio => d -= 1,
                Sample => {
                    d -= 2;
                    push_d!(0.0);
                    push_d!(0.0);
                    push_d!(0.0);
                }
                BwSample => {
                    d -= 2;
                    push_d!(0.0);
                }
                ToR => push_r!(pop_d!()),
                FromR => push_d!(pop_r!()),
                RFetch => {
                    let v = pop_r!();
                    push_r!(v);
                    push_d!(v);
                }
                Load => {
                    let slot = pop_d!() as u32 as usize % MEMORY_SLOTS;
                    push_d!(vars.memory[slot]);
                }
                Store => {
                    let v = pop_d!();
                    let slot = pop_d!() as u32 as usize % MEMORY_SLOTS;
                    vars.memory[slot] = v;
                }
                Dup => {
                    let v = pop_d!();
                    push_d!(v);
                    push_d!(v);
                }
                DupDup => {
                    let v = pop_d!();
                    push_d!(v);
                    push_d!(v);
                    push_d!(v);
                    push_d!(v);
                }
                Over => {
                    let v1 = pop_d!();
                    let v2 = pop_d!();
                    push_d!(v2);
                    push_d!(v1);
                    push_d!(v2);
                }
                TwoDup => {
                    let v1 = pop_d!();
                    let v2 = pop_d!();
                    push_d!(v2);
                    push_d!(v1);
                    push_d!(v2);
                    push_d!(v1);
                }
                ZAdd => {
                    let v1 = pop_d!();
                    let v2 = pop_d!();
                    let v3 = pop_d!();
                    let v4 = pop_d!();
                    push_d!(v2 + v4);
                    push_d!(v1 + v3);
                }
                ZMul => {
                    let v1 = pop_d!();
                    let v2 = pop_d!();
                    let v3 = pop_d!();
                    let v4 = pop_d!();
                    push_d!(v4 * v2 - v3 * v1);
                    push_d!(v4 * v1 + v3 * v2);
                }
                Drop => d -= 1,
                Swap => {
                    let v1 = pop_d!();
                    let v2 = pop_d!();
                    push_d!(v1);
                    push_d!(v2);
                }
                Rot => {
                    let v1 = pop_d!();
                    let v2 = pop_d!();
                    let v3 = pop_d!();
                    push_d!(v2);
                    push_d!(v1);
                    push_d!(v3);
                }
                Unrot => {
                    let v1 = pop_d!();
                    let v2 = pop_d!();
                    let v3 = pop_d!();
                    push_d!(v1);
                    push_d!(v3);
                    push_d!(v2);
                }
                UnrotSwap => {
                    let v1 = pop_d!();
                    let v2 = pop_d!();
                    let v3 = pop_d!();
                    push_d!(v1);
                    push_d!(v2);
                    push_d!(v3);
                }
                Eq => {
                    let v1 = pop_d!();
                    let v2 = pop_d!();
                    push_d!(if v1 == v2 { 1.0 } else { 0.0 });
                }
                Ne => {
                    let v1 = pop_d!();
                    let v2 = pop_d!();
                    push_d!(if v1 != v2 { 1.0 } else { 0.0 });
                }
                Gt => {
                    let v1 = pop_d!();
                    let v2 = pop_d!();
                    push_d!(if v1 > v2 { 1.0 } else { 0.0 });
                }
                Lt => {
                    let v1 = pop_d!();
                    let v2 = pop_d!();
                    push_d!(if v1 < v2 { 1.0 } else { 0.0 });
                }
                Ge => {
                    let v1 = pop_d!();
                    let v2 = pop_d!();
                    push_d!(if v1 >= v2 { 1.0 } else { 0.0 });
                }
                GeSwap => {
                    let v1 = pop_d!();
                    let v2 = pop_d!();
                    let v3 = pop_d!();
                    push_d!(if v1 >= v2 { 1.0 } else { 0.0 });
                    push_d!(v3);
                }
                Le => {
                    let v1 = pop_d!();
                    let v2 = pop_d!();
                    push_d!(if v1 <= v2 { 1.0 } else { 0.0 });
                }
                Add => push_d!(pop_d!() + pop_d!()),
                Fma => {
                    let m1 = pop_d!();
                    let m2 = pop_d!();
                    let a = pop_d!();
                    push_d!(m1.mul_add(m2, a));
                }
                Mul => push_d!(pop_d!() * pop_d!()),
                Sub => {
                    let v = pop_d!();
                    push_d!(pop_d!() - v);
                }
                Div => {
                    let v = pop_d!();
                    if v == 0.0 {
                        d -= 1;
                        push_d!(f64::INFINITY);
                    } else {
                        push_d!(pop_d!() / v);
                    }
                }
                Mod => {
                    let v = pop_d!();
                    push_d!(pop_d!() % v);
                }
                Pow => {
                    let v = pop_d!();
                    push_d!(pop_d!().abs().powf(v));
                }
                Atan2 => {
                    let v = pop_d!();
                    push_d!(pop_d!().atan2(v));
                }
                And => {
                    let v = pop_d!();
                    let other = pop_d!();
                    push_d!(if other != 0.0 && v != 0.0 { 1.0 } else { 0.0 });
                }
                Or => {
                    let v = pop_d!();
                    let other = pop_d!();
                    push_d!(if other != 0.0 || v != 0.0 { 1.0 } else { 0.0 });
                }
                Not => push_d!(if pop_d!() != 0.0 { 0.0 } else { 1.0 }),
                Min => push_d!(pop_d!().min(pop_d!())),
                Max => push_d!(pop_d!().max(pop_d!())),
                Negate => push_d!(-pop_d!()),
                Sin => push_d!(pop_d!().sin()),
                Cos => push_d!(pop_d!().cos()),
                Tan => push_d!(pop_d!().tan()),
                Log => push_d!(pop_d!().abs().ln()),
                Exp => push_d!(pop_d!().exp()),
                Sqrt => push_d!(pop_d!().abs().sqrt()),
                Floor => push_d!(pop_d!().floor()),
                Ceil => push_d!(pop_d!().ceil()),
                Abs => push_d!(pop_d!().abs()),
                Pi => push_d!(PI),
                Random => push_d!(rand::thread_rng().gen::<f64>()),
                Mult2 => d_stack[d - 1] *= 2.0,
                Pow2 => {
                    let v = d_stack[d - 1];
                    d_stack[d - 1] = v * v;
                }
                Div2 => d_stack[d - 1] /= 2.0,
                MultPi => d_stack[d - 1] *= PI,
                MultHalfPi => d_stack[d - 1] *= FRAC_PI_2,
            },
        }
        pc += 1;
    }
}
