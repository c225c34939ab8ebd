/// Tests that every bundled engine must pass, run through the adapter
#[allow(unused_macros)]
macro_rules! engine_tests {
    ($engine:ty) => {
        fn adapter() -> $crate::EngineAdapter<$engine, &'static str> {
            $crate::EngineAdapter::new()
        }

        #[test]
        fn empty_problem_has_legal_values() {
            let mut problem = $crate::Problem::new();
            problem.add_variable("b", $crate::VarType::Bool);
            problem.add_variable("i", $crate::variable().integer().bounds(-2. ..=5.));
            problem.add_variable("r", $crate::variable().bounds(0.5..=1.5));
            problem.add_variable("free_real", $crate::variable());
            problem.add_variable("free_int", $crate::variable().integer());
            let solution = adapter().solve(&problem).unwrap().unwrap();
            assert_eq!(solution.len(), 5);
            assert!(matches!(solution.int(&"b"), Some(0 | 1)));
            assert!((-2..=5).contains(&solution.int(&"i").unwrap()));
            let r = solution.value(&"r").unwrap();
            assert!((0.5..=1.5).contains(&r), "r = {}", r);
            assert!(solution.value(&"free_real").unwrap().is_finite());
            assert!(solution.int(&"free_int").is_some());
        }

        #[test]
        fn booleans_are_zero_or_one() {
            let mut problem = $crate::Problem::new();
            problem.add_variable("a", $crate::VarType::Bool);
            problem.add_variable("b", $crate::VarType::Bool);
            problem.add_constraint($crate::Linear::from_iter([(1, "a"), (1, "b")]).geq(1));
            problem.maximise($crate::Linear::from_iter([(1, "a"), (-1, "b")]));
            let solution = adapter().solve(&problem).unwrap().unwrap();
            assert_eq!(solution.get(&"a"), Some($crate::Value::Int(1)));
            assert_eq!(solution.get(&"b"), Some($crate::Value::Int(0)));
            assert_eq!(solution.boolean(&"a"), Some(true));
        }

        #[test]
        fn integer_bounds_are_respected() {
            let mut problem = $crate::Problem::new();
            problem.add_variable("x", $crate::variable().integer().bounds(-3. ..=7.));
            problem.maximise($crate::Linear::from_iter([(1, "x")]));
            assert_eq!(adapter().solve(&problem).unwrap().unwrap().int(&"x"), Some(7));
            problem.minimise($crate::Linear::from_iter([(1, "x")]));
            assert_eq!(adapter().solve(&problem).unwrap().unwrap().int(&"x"), Some(-3));
        }

        #[test]
        fn translated_expression_evaluates_like_the_solution() {
            use std::sync::{Arc, Mutex};

            let mut problem = $crate::Problem::new();
            problem.add_variable("x", $crate::variable().integer().bounds(0. ..=4.));
            problem.add_variable("y", $crate::variable().bounds(0. ..=2.5));
            problem.maximise($crate::Linear::from_iter([(1, "x"), (1, "y")]));
            let expression: $crate::Linear<&str> = [(2, "x"), (-3, "y")].into_iter().collect();

            let seen = Arc::new(Mutex::new(None));
            let hook_seen = Arc::clone(&seen);
            let hook_expression = expression.clone();
            let solver = adapter().with_hook(
                move |engine: &mut $engine,
                      variables: &$crate::VarMap<&'static str, <$engine as $crate::Engine>::Expr>|
                 -> Result<(), $crate::SolveError> {
                    let expr = $crate::translate(engine, &hook_expression, variables)?;
                    *hook_seen.lock().unwrap() = Some(expr);
                    Ok(())
                },
            );
            // The expression is translated, but the solution is read back from plain values
            let solution = solver.solve(&problem).unwrap().unwrap();
            assert!(seen.lock().unwrap().is_some());
            assert_eq!(solution.int(&"x"), Some(4));
            let value = solution.eval(&expression).unwrap();
            assert!((value - 0.5).abs() < 1e-6, "2x - 3y = {}", value);
        }

        #[test]
        fn engine_evaluates_expressions() {
            let mut engine = <$engine as $crate::Engine>::open().unwrap();
            let x = engine.int_var(0, 4).unwrap();
            let y = engine.float_var(0., 2.5).unwrap();
            let objective = engine.sum(x, y).unwrap();
            engine.maximize(objective).unwrap();
            let two = engine.constant(2.).unwrap();
            let minus_three = engine.constant(-3.).unwrap();
            let two_x = engine.prod(two, x).unwrap();
            let minus_three_y = engine.prod(minus_three, y).unwrap();
            let expression = engine.sum(two_x, minus_three_y).unwrap();
            engine.close().unwrap();
            engine.solve().unwrap();
            assert_eq!(engine.status(), $crate::EngineStatus::Optimal);
            let value = engine.float_value(expression).unwrap();
            assert!((value - 0.5).abs() < 1e-6, "2x - 3y = {}", value);
        }

        #[test]
        fn infeasible_problem_has_no_solution() {
            let mut problem = $crate::Problem::new();
            problem.add_variable("x", $crate::variable().bounds(0. ..=10.));
            problem.add_constraint($crate::Linear::from_iter([(1, "x")]).geq(5));
            problem.add_constraint($crate::Linear::from_iter([(1, "x")]).leq(1));
            assert_eq!(adapter().solve(&problem).unwrap(), None);
        }

        #[test]
        fn empty_domain_has_no_solution() {
            let mut problem = $crate::Problem::new();
            problem.add_variable("x", $crate::variable().integer().bounds(3. ..=1.));
            assert_eq!(adapter().solve(&problem).unwrap(), None);
        }

        #[test]
        fn hook_constraints_are_enforced() {
            let mut problem = $crate::Problem::new();
            problem.add_variable("x", $crate::variable().integer().bounds(0. ..=10.));
            problem.maximise($crate::Linear::from_iter([(1, "x")]));
            let solver = adapter().with_hook(
                |engine: &mut $engine,
                 variables: &$crate::VarMap<&'static str, <$engine as $crate::Engine>::Expr>|
                 -> Result<(), $crate::SolveError> {
                    let x = variables
                        .handle(&"x")
                        .ok_or_else(|| $crate::SolveError::Hook("x is not declared".into()))?;
                    let c = engine.leq(x, 3.)?;
                    engine.add_constraint(c)?;
                    Ok(())
                },
            );
            assert_eq!(solver.solve(&problem).unwrap().unwrap().int(&"x"), Some(3));
        }

        #[test]
        fn equality_constraint() {
            let mut problem = $crate::Problem::new();
            problem.add_variable("x", $crate::variable().bounds(0. ..=10.));
            problem.add_variable("y", $crate::variable().bounds(0. ..=10.));
            problem.add_constraint($crate::Linear::from_iter([(1, "x"), (1, "y")]).eq(4));
            problem.maximise($crate::Linear::from_iter([(1, "x"), (2, "y")]));
            let solution = adapter().solve(&problem).unwrap().unwrap();
            assert!((solution.value(&"x").unwrap() - 0.).abs() < 1e-6);
            assert!((solution.value(&"y").unwrap() - 4.).abs() < 1e-6);
            assert!((solution.objective_value().unwrap() - 8.).abs() < 1e-6);
        }

        #[test]
        fn tiny_timeout_returns_promptly() {
            let mut problem = $crate::Problem::new();
            for name in ["a", "b", "c", "d"] {
                problem.add_variable(name, $crate::variable().integer().bounds(0. ..=9.));
            }
            problem.add_constraint(
                $crate::Linear::from_iter([(3, "a"), (5, "b"), (7, "c"), (11, "d")]).leq(40),
            );
            problem.maximise($crate::Linear::from_iter([(4, "a"), (6, "b"), (9, "c"), (13, "d")]));
            let solver = adapter().with_parameter($crate::parameters::TIMEOUT, 0.001);
            let start = std::time::Instant::now();
            let result = solver.solve(&problem).unwrap();
            // The limit is rounded up to one second
            assert!(start.elapsed() < std::time::Duration::from_secs(30));
            if let Some(solution) = result {
                let weight = solution
                    .eval(&$crate::Linear::from_iter([(3, "a"), (5, "b"), (7, "c"), (11, "d")]))
                    .unwrap();
                assert!(weight <= 40. + 1e-6);
            }
        }

        #[test]
        fn stopped_search_returns_only_valid_assignments() {
            let mut problem = $crate::Problem::new();
            problem.add_variables(0..50, $crate::variable().integer().bounds(0. ..=3.));
            let weights: Vec<f64> = (0..50).map(|i| (2 * (1000 + (i * 7919) % 997)) as f64).collect();
            let capacity = weights.iter().sum::<f64>() + 1.;
            let weight: $crate::Linear<usize> = weights.iter().copied().zip(0..).collect();
            problem.add_constraint(weight.clone().leq(capacity));
            problem.maximise(weights.iter().enumerate().map(|(i, &w)| (w + (i % 17) as f64, i)).collect());
            let solver = $crate::EngineAdapter::<$engine, usize>::new()
                .with_parameter($crate::parameters::TIMEOUT, 1);
            if let Some(solution) = solver.solve(&problem).unwrap() {
                assert_eq!(solution.len(), 50);
                for (_, value) in solution.iter() {
                    assert!(matches!(value, $crate::Value::Int(0..=3)), "{:?}", value);
                }
                assert!(solution.eval(&weight).unwrap() <= capacity + 1e-6);
            }
        }

        #[test]
        fn verbose_solve_succeeds() {
            let mut problem = $crate::Problem::new();
            problem.add_variable("x", $crate::variable().bounds(0. ..=2.));
            problem.maximise($crate::Linear::from_iter([(1, "x")]));
            let solver = adapter().with_parameter($crate::parameters::VERBOSE, 1);
            let solution = solver.solve(&problem).unwrap().unwrap();
            assert!((solution.value(&"x").unwrap() - 2.).abs() < 1e-6);
        }
    };
}
