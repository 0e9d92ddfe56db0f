//! Property-based tests over generated programs.

use pixelforth::{Engine, Inst, Vars, STACK_CAPACITY};
use proptest::prelude::*;

/// Literals that stay well away from overflow when combined.
fn arb_literal() -> impl Strategy<Value = f64> {
    prop_oneof![
        -1000i32..1000i32,
        Just(0i32),
        Just(1i32),
        Just(2i32),
    ]
    .prop_map(f64::from)
}

fn arb_binary_op() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just("+"), Just("-"), Just("*"), Just("/"), Just("min"), Just("max")]
}

fn arb_stack_op() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just("dup"), Just("swap"), Just("over"), Just("drop"), Just("rot")]
}

/// A program built from segments that each push two literals and then
/// apply a word, so the data stack grows slowly and never underflows.
fn arb_program() -> impl Strategy<Value = String> {
    prop::collection::vec(
        (arb_literal(), arb_literal(), arb_binary_op()),
        1..8,
    )
    .prop_map(|segments| {
        let mut source = String::from("1 1 1 ");
        for (a, b, op) in segments {
            source.push_str(&format!("{a} {b} {op} "));
        }
        source
    })
}

proptest! {
    /// Accepted programs run to completion with both final depths
    /// inside the stack arrays.
    #[test]
    fn accepted_programs_terminate_in_bounds(source in arb_program()) {
        let mut engine = Engine::compile(&source).expect("generated programs are balanced");
        let mut vars = Vars::default();
        engine.run(&mut vars);
        prop_assert!(vars.final_d_depth <= STACK_CAPACITY);
        prop_assert!(vars.final_r_depth <= STACK_CAPACITY);
    }

    /// The optimizer must not change what a program computes.
    #[test]
    fn peephole_preserves_meaning(source in arb_program()) {
        let mut compiler = pixelforth::Compiler::new();
        compiler.parse(&source).expect("parse");
        let (main, words) = compiler.into_parts();
        let unoptimized = pixelforth::expand_calls(&main, &words).expect("inline");
        let mut optimized = unoptimized.clone();
        pixelforth::peephole::optimize(&mut optimized).expect("peephole");

        let run = |code: &pixelforth::Code| {
            let mut d = [0.0f64; STACK_CAPACITY];
            let mut depth = 0usize;
            // Reference evaluation of the straight-line subset the
            // generator emits.
            for inst in code {
                match inst {
                    Inst::Push(v) => { d[depth] = *v; depth += 1; }
                    Inst::Halt => break,
                    Inst::Op(b) => eval_op(*b, &mut d, &mut depth),
                    other => panic!("generator never emits {other}"),
                }
            }
            d[..depth].to_vec()
        };

        let lhs = run(&unoptimized);
        let rhs = run(&optimized);
        prop_assert_eq!(lhs.len(), rhs.len());
        for (a, b) in lhs.iter().zip(rhs.iter()) {
            prop_assert!(bits_equal(*a, *b), "{} != {} in {}", a, b, source);
        }
    }

    /// Constant folding of addition commutes.
    #[test]
    fn constant_folding_commutes(a in arb_literal(), b in arb_literal()) {
        let forward = Engine::compile(&format!("{a} {b} +")).expect("compile");
        let backward = Engine::compile(&format!("{b} {a} +")).expect("compile");
        prop_assert_eq!(forward.code(), backward.code());
    }

    /// Comment contents never reach the instruction stream.
    #[test]
    fn comments_do_not_affect_compilation(
        source in arb_program(),
        note in "[ a-zA-Z0-9+*/-]{0,20}",
    ) {
        let plain = Engine::compile(&source).expect("compile");
        let commented = Engine::compile(&format!("( {note} ) {source}")).expect("compile");
        let line_commented = Engine::compile(&format!("\\ {note}\n{source}")).expect("compile");
        prop_assert_eq!(plain.code(), commented.code());
        prop_assert_eq!(plain.code(), line_commented.code());
    }

    /// Stack shuffles pass the checker whenever enough operands exist,
    /// and never move values the interpreter cannot hold.
    #[test]
    fn shuffle_programs_run_or_reject_cleanly(
        ops in prop::collection::vec(arb_stack_op(), 0..12),
    ) {
        let mut source = String::from("1 2 3 4 ");
        for op in &ops {
            source.push_str(op);
            source.push(' ');
        }
        match Engine::compile(&source) {
            Ok(mut engine) => {
                let mut vars = Vars::default();
                engine.run(&mut vars);
                prop_assert!(vars.final_d_depth <= STACK_CAPACITY);
            }
            Err(err) => {
                // Only stack discipline can fail here.
                prop_assert!(matches!(err, pixelforth::Error::Optimize(_)), "{}", err);
            }
        }
    }
}

fn eval_op(b: pixelforth::Builtin, d: &mut [f64; STACK_CAPACITY], depth: &mut usize) {
    use pixelforth::Builtin::*;
    macro_rules! pop {
        () => {{
            *depth -= 1;
            d[*depth]
        }};
    }
    macro_rules! push {
        ($v:expr) => {{
            let v = $v;
            d[*depth] = v;
            *depth += 1;
        }};
    }
    match b {
        Add => push!(pop!() + pop!()),
        Mul => push!(pop!() * pop!()),
        Sub => {
            let v = pop!();
            push!(pop!() - v);
        }
        Div => {
            let v = pop!();
            if v == 0.0 {
                *depth -= 1;
                push!(f64::INFINITY);
            } else {
                push!(pop!() / v);
            }
        }
        Min => push!(pop!().min(pop!())),
        Max => push!(pop!().max(pop!())),
        Fma => {
            let m1 = pop!();
            let m2 = pop!();
            let a = pop!();
            push!(m1.mul_add(m2, a));
        }
        Mult2 => d[*depth - 1] *= 2.0,
        Div2 => d[*depth - 1] /= 2.0,
        Pow2 => {
            let v = d[*depth - 1];
            d[*depth - 1] = v * v;
        }
        other => panic!("generator never emits {:?}", other),
    }
}

/// IEEE-754 equality that also identifies NaNs.
fn bits_equal(a: f64, b: f64) -> bool {
    a.to_bits() == b.to_bits() || (a.is_nan() && b.is_nan())
}
