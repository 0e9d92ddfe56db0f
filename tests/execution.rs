//! End-to-end scenarios: source text through the whole pipeline to
//! final stack contents.

use pixelforth::{Builtin, Engine, Inst, Vars};

fn run_with_x(source: &str, x: f64) -> Vec<f64> {
    let mut engine = Engine::compile(source).expect("compile");
    let mut vars = Vars {
        x,
        ..Default::default()
    };
    engine.run(&mut vars);
    engine.d_stack(&vars).to_vec()
}

fn run(source: &str) -> Vec<f64> {
    run_with_x(source, 0.0)
}

#[test]
fn two_word_conditional_program() {
    let source = ": nice 60 5 4 + + ; : juanita 400 10 5 5 + + + ; \
                  x if nice else juanita then 2 * 4 / 2 *";
    // Both arms share the `2 * 4 / 2 *` tail, which multiplies by one:
    // the result is the chosen word's folded constant.
    assert_eq!(run_with_x(source, 0.0), vec![420.0]);
    assert_eq!(run_with_x(source, 1.0), vec![69.0]);
}

#[test]
fn addition_folds_and_runs() {
    let engine = Engine::compile("3 4 +").unwrap();
    assert_eq!(engine.code(), &vec![Inst::Push(7.0), Inst::Halt]);
    assert_eq!(run("3 4 +"), vec![7.0]);
}

#[test]
fn two_pi() {
    let engine = Engine::compile("2 pi *").unwrap();
    assert_eq!(
        engine.code(),
        &vec![Inst::Push(2.0), Inst::Op(Builtin::MultPi), Inst::Halt]
    );
    assert_eq!(run("2 pi *"), vec![2.0 * std::f64::consts::PI]);
}

#[test]
fn dup_dup_fuses_once() {
    let engine = Engine::compile("5 dup dup").unwrap();
    let fused = engine
        .code()
        .iter()
        .filter(|i| matches!(i, Inst::Op(Builtin::DupDup)))
        .count();
    assert_eq!(fused, 1);
    assert_eq!(run("5 dup dup"), vec![5.0, 5.0, 5.0, 5.0]);
}

#[test]
fn square_word_inlines_away() {
    let engine = Engine::compile(": sq dup * ; 3 sq").unwrap();
    assert!(!engine.code().iter().any(|i| matches!(i, Inst::Call(_))));
    assert_eq!(run(": sq dup * ; 3 sq"), vec![9.0]);
}

#[test]
fn division_by_zero_is_positive_infinity() {
    // Folded at compile time...
    let engine = Engine::compile("1 0 /").unwrap();
    assert_eq!(engine.code(), &vec![Inst::Push(f64::INFINITY), Inst::Halt]);
    assert_eq!(run("1 0 /"), vec![f64::INFINITY]);
    // ...and with a runtime divisor.
    assert_eq!(run("1 x /"), vec![f64::INFINITY]);
}

#[test]
fn both_conditional_arms() {
    assert_eq!(run_with_x("x if 1 else 2 then", 0.0), vec![2.0]);
    assert_eq!(run_with_x("x if 1 else 2 then", 1.0), vec![1.0]);
    assert_eq!(run("0 if 1 else 2 then"), vec![2.0]);
    assert_eq!(run("1 if 1 else 2 then"), vec![1.0]);
}

#[test]
fn conditionals_away_from_the_block_start() {
    // The branch bookkeeping must hold wherever the `if` sits.
    assert_eq!(run("x drop 0 if 1 else 2 then"), vec![2.0]);
    assert_eq!(run("1 2 3 drop drop drop 0 if 1 else 2 then"), vec![2.0]);
}

#[test]
fn one_armed_conditional() {
    assert_eq!(run_with_x("x if 1 then", 1.0), vec![1.0]);
    assert_eq!(run_with_x("x if 1 then", 0.0), Vec::<f64>::new());
}

#[test]
fn nested_conditionals() {
    let source = "x if y if 1 else 2 then else 3 then";
    let mut engine = Engine::compile(source).unwrap();
    let mut check = |x: f64, y: f64, expected: f64| {
        let mut vars = Vars {
            x,
            y,
            ..Default::default()
        };
        engine.run(&mut vars);
        assert_eq!(engine.d_stack(&vars), &[expected]);
    };
    check(1.0, 1.0, 1.0);
    check(1.0, 0.0, 2.0);
    check(0.0, 1.0, 3.0);
    check(0.0, 0.0, 3.0);
}

#[test]
fn conditional_inside_a_word_used_twice() {
    let source = ": pick x if 1 else 2 then ; pick pick +";
    assert_eq!(run_with_x(source, 1.0), vec![2.0]);
    assert_eq!(run_with_x(source, 0.0), vec![4.0]);
}

#[test]
fn empty_source() {
    assert_eq!(run(""), Vec::<f64>::new());
}

#[test]
fn comments_are_invisible() {
    assert_eq!(run("1 ( r ) 2 ( g ) 3 ( b )"), vec![1.0, 2.0, 3.0]);
    assert_eq!(run("1 \\ red\n2 \\ green\n3"), vec![1.0, 2.0, 3.0]);
}

#[test]
fn a_realistic_haiku() {
    // Plasma-ish shader: three channels derived from x, y and t.
    let source = "\
        : wave pi * sin ; \
        x y + wave abs \
        x y - wave abs \
        x t + wave abs";
    let mut engine = Engine::compile(source).unwrap();
    let mut vars = Vars {
        x: 0.25,
        y: 0.25,
        t: 0.5,
        ..Default::default()
    };
    engine.run(&mut vars);
    let stack = engine.d_stack(&vars).to_vec();
    assert_eq!(stack.len(), 3);
    for channel in stack {
        assert!((0.0..=1.0).contains(&channel));
    }
}

#[test]
fn memory_persists_within_a_run() {
    assert_eq!(run("0 x 5 + ! 0 @ 0 @ *"), vec![25.0]);
}

#[test]
fn deep_word_chains_inline() {
    // 99 levels deep is fine; the engine test for the limit lives in
    // the optimizer crate.
    let mut source = String::from(": w0 1 ; ");
    for i in 1..99 {
        source.push_str(&format!(": w{i} w{} ; ", i - 1));
    }
    source.push_str("w98");
    assert_eq!(run(&source), vec![1.0]);
}

#[test]
fn too_deep_word_chains_fail() {
    let mut source = String::from(": w0 1 ; ");
    for i in 1..100 {
        source.push_str(&format!(": w{i} w{} ; ", i - 1));
    }
    source.push_str("w99");
    assert!(Engine::compile(&source).is_err());
}
