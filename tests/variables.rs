use ilp_bridge::{Linear, Operator, Problem, Term, VarType};

#[test]
fn complex_expression() {
    let a = Linear::new().with(1, "a");
    let b = Linear::new().with(1, "b");
    let c = Linear::new().with(1, "c");
    let d = Linear::new().with(1, "d");
    let expression = (a - b * 2.) * 9. + c * 4 * 0.5 - d;
    assert_eq!(
        expression,
        Linear::from(vec![
            Term::new(9., "a"),
            Term::new(-18., "b"),
            Term::new(2., "c"),
            Term::new(-1., "d"),
        ])
    );
    assert_eq!(expression.to_string(), "9*a - 18*b + 2*c - d");
}

#[test]
fn large_sum() {
    let sum_right: Linear<usize> = (0..100_000).map(|i| (1, i)).collect();
    let sum_reverse: Linear<usize> = (0..100_000).rev().map(|i| (1, i)).collect();
    let value = |&v: &usize| Some(v as f64);
    assert_eq!(sum_right.evaluate(value), sum_reverse.evaluate(value));
}

#[test]
fn debug_format() {
    let constraint = (Linear::new().with(3, "v1") + Linear::new().with(8, "v0")).leq(-8);
    assert_eq!(format!("{:?}", constraint.lhs()), "[(3.0, \"v1\"), (8.0, \"v0\")]");
    assert_eq!(constraint.to_string(), "3*v1 + 8*v0 <= -8");
    assert_eq!(constraint.operator(), Operator::Le);
}

#[test]
fn undeclared_variables_are_real() {
    let mut problem = Problem::new();
    problem.add_variable("a", VarType::Int);
    problem.add(Linear::from_iter([(1, "a"), (1, "b")]), Operator::Ge, 2);
    problem.minimise(Linear::from_iter([(1, "c")]));
    assert_eq!(problem.variables_count(), 3);
    assert_eq!(problem.var_type(&"b"), Some(VarType::Real));
    assert_eq!(problem.var_type(&"c"), Some(VarType::Real));
    assert_eq!(problem.var_lower_bound(&"b"), None);
}

#[cfg(feature = "microlp")]
#[test]
fn integer_variables() {
    use ilp_bridge::{default_adapter, variable};

    let mut problem = Problem::new();
    problem.add_variable("a", variable().max(1));
    problem.add_variable("b", variable().integer().bounds(2..=4));
    problem.maximise(Linear::from_iter([(10, "a"), (-3, "b")]));
    problem.add_constraint(Linear::from_iter([(1, "a"), (-1, "b")]).leq(-2));
    problem.add_constraint(Linear::from_iter([(1, "a"), (1, "b")]).geq(3));
    let solution = default_adapter().solve(&problem).unwrap().expect("solve");
    assert!((solution.value(&"a").unwrap() - 1.).abs() < 1e-5);
    assert_eq!(solution.int(&"b"), Some(3));
}
