//! Benchmarks for program evaluation and the evolution loop.

#![allow(missing_docs)] // Benchmark macros generate undocumented functions

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use symreg::gp::{Alphabet, Lcg48, Program};
use symreg::{Case, Engine, EngineConfig, Problem};

fn sine_problem() -> Problem {
    let cases = (0..63)
        .map(|i| {
            let x = -3.1 + 0.1 * f64::from(i);
            Case::new(vec![x], x.sin())
        })
        .collect();
    Problem::new(1, 100, (-5.0, 5.0), cases).expect("valid problem")
}

fn bench_eval(c: &mut Criterion) {
    let alphabet = Alphabet::new(1, 100);
    let consts: Vec<f64> = (0..100).map(|i| f64::from(i) * 0.1 - 5.0).collect();
    let mut rng = Lcg48::new(42);
    let mut program = Program::with_capacity(100);
    program.grow(&alphabet, &mut rng);

    c.bench_function("eval_grown_program", |b| {
        b.iter(|| {
            for x in 0..100 {
                let _ = black_box(program.eval(&alphabet, &consts, &[f64::from(x) * 0.05]));
            }
        });
    });
}

fn bench_grow(c: &mut Criterion) {
    let alphabet = Alphabet::new(1, 100);
    let mut rng = Lcg48::new(42);

    c.bench_function("grow_capacity_100", |b| {
        b.iter(|| {
            let mut program = Program::with_capacity(100);
            program.grow(&alphabet, &mut rng);
            black_box(&program);
        });
    });
}

fn bench_evolve(c: &mut Criterion) {
    let problem = sine_problem();
    let config = EngineConfig {
        population_size: 1000,
        program_capacity: 100,
        ..EngineConfig::default()
    };
    let mut engine = Engine::new(&problem, config).expect("valid config");

    c.bench_function("evolve_pop_1000", |b| {
        b.iter(|| {
            engine.evolve();
            black_box(engine.generation());
        });
    });
}

criterion_group!(benches, bench_eval, bench_grow, bench_evolve);
criterion_main!(benches);
