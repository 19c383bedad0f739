use criterion::{criterion_group, criterion_main, Criterion};
use eqnibbler::{Equation, Registry};
use fasteval::{Compiler, Evaler};
use std::collections::BTreeMap;

const VARIABLES: [&str; 5] = ["x", "y", "z", "w", "v"];

fn run_benchmarks(c: &mut Criterion) {
    let expressions = generate_test_expressions(500);
    let inputs = [1.0, 2.0, 3.0, 4.0, 5.0];
    let mut group = c.benchmark_group("Library Comparison");

    // FastEval setup
    let parser = fasteval::Parser::new();
    let mut slab = fasteval::Slab::new();
    let mut map = BTreeMap::new();
    let compiled_exprs: Vec<_> = expressions
        .iter()
        .map(|expr| {
            parser
                .parse(expr, &mut slab.ps)
                .unwrap()
                .from(&slab.ps)
                .compile(&slab.ps, &mut slab.cs)
        })
        .collect();
    for (name, value) in VARIABLES.iter().zip(inputs) {
        map.insert(*name, value);
    }

    let equations: Vec<Equation> = expressions
        .iter()
        .map(|e| Equation::new(e, &VARIABLES).unwrap())
        .collect();

    let mut registry = Registry::new();
    for expression in &expressions {
        registry.register(expression, &VARIABLES).unwrap();
    }

    group.bench_function("FastEval", |b| {
        b.iter(|| {
            for compiled in &compiled_exprs {
                let _val = compiled.eval(&slab, &mut map);
            }
        })
    });

    group.bench_function("Equation", |b| {
        b.iter(|| {
            for eq in &equations {
                let _val = eq.eval(&inputs).unwrap();
            }
        })
    });

    group.bench_function("Registry", |b| {
        b.iter(|| {
            let _val = registry.evaluate_all(&inputs).unwrap();
        })
    });

    group.finish();
}

/// Generates expressions both libraries read the same way: arithmetic, `^`,
/// `sin`, `cos` and `abs` over the variables x, y, z, w, v.
fn generate_test_expressions(n_equations: usize) -> Vec<String> {
    (0..n_equations)
        .map(|i| match i % 6 {
            0 => format!("2*x + y^{}/z + abs(z - {}) + w*v", (i % 5) + 2, (i % 3) + 2),
            1 => format!(
                "sin(x/{}) + y^{}/z + cos(z+{}*x) + w/v",
                (i % 4) + 2,
                (i % 3) + 2,
                (i % 3) + 1
            ),
            2 => format!(
                "(x+{}*y)^2 + (y+{}*z)^2 + (z+{}*x)^2 + w^2 + v^2",
                (i % 3) + 1,
                (i % 4) + 1,
                (i % 5) + 1
            ),
            3 => format!(
                "(x*y)/(z+{}) + (y*z)/(x+{}) + (z*x)/(y+{}) + (w*v)/(x+1)",
                (i % 3) + 1,
                (i % 4) + 1,
                (i % 5) + 1
            ),
            4 => format!(
                "(x^2 + {}*y^2)/(z + {}) + ({}*x*y*z)^0.5 - sin(w)*cos(v)",
                (i % 3) + 1,
                (i % 4) + 1,
                (i % 5) + 1
            ),
            5 => format!(
                "(x^{} + y^{})/(z^{} + 1) + abs(w - v)",
                (i % 4) + 2,
                (i % 3) + 2,
                (i % 5) + 2
            ),
            _ => unreachable!(),
        })
        .collect()
}

criterion_group!(benches, run_benchmarks);
criterion_main!(benches);
