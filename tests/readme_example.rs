use std::error::Error;

use ilp_bridge::{default_adapter, variable, Linear, Problem};

#[test]
fn main() -> Result<(), Box<dyn Error>> {
    let mut problem = Problem::new();
    problem.add_variable("a", variable().max(1));
    problem.add_variable("b", variable().bounds(2..=4));
    // 10 * (a - b / 5) - b
    problem.maximise(Linear::from_iter([(10, "a"), (-2, "b"), (-1, "b")]));
    // a + 2 <= b
    problem.add_constraint(Linear::from_iter([(1, "a"), (-1, "b")]).leq(-2));
    // 1 + a >= 4 - b
    problem.add_constraint(Linear::from_iter([(1, "a"), (1, "b")]).geq(3));
    let solution = default_adapter()
        .solve(&problem)?
        .ok_or("the problem is infeasible")?;
    println!("a={:?}   b={:?}", solution.value(&"a"), solution.value(&"b"));
    println!(
        "a + b = {:?}",
        solution.eval(&Linear::from_iter([(1, "a"), (1, "b")]))
    );
    println!("{}", solution);
    Ok(())
}
