use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

use ilp_bridge::{
    default_adapter, variable, DefaultEngine, Engine, Linear, Problem, SolveError, VarMap,
};

pub fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("translating sum(2 x_i) <= 1 for i in [1..100_000]", |b| {
        let mut problem = Problem::new();
        problem.add_variables(0..100_000, variable().bounds(0..=1));
        let sum: Linear<usize> = (0..100_000).map(|i| (black_box(2), i)).collect();
        problem.add_constraint(sum.leq(1));
        // Stop the session once the model is built, before the search
        let adapter = default_adapter().with_hook(
            |_: &mut DefaultEngine,
             _: &VarMap<usize, <DefaultEngine as Engine>::Expr>|
             -> Result<(), SolveError> {
                Err(SolveError::Hook("translated".into()))
            },
        );
        b.iter(|| adapter.solve(black_box(&problem)).unwrap_err())
    });

    c.bench_function(
        "solving empty problem with 100k variables and reading results",
        |b| {
            b.iter(|| {
                let mut problem = Problem::new();
                problem.add_variables(0..100_000, variable().min(0));
                let objective: Linear<usize> = (0..100_000).map(|i| (1, i)).collect();
                problem.minimise(objective.clone());
                let solution = default_adapter().solve(&problem).unwrap().unwrap();
                solution.eval(&objective)
            })
        },
    );
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
