//! Analyze a two-variable counting loop with widening and one narrowing step.
//!
//! Usage:
//!   cargo run -p polka --example interval_loop
//!
//! Program:
//!   i = 0; j = 10;
//!   while i < 100 { i += 1; j += 2; }
//!
//! Prints each iterate and the invariant at loop exit.

use polka::prelude::*;

fn main() -> Result<(), PolyError> {
    let dom = Domain::default();
    let init = Polyhedron::of_linear_constraints(
        &dom,
        0,
        2,
        &[
            LinCons::eq(LinExpr::from_ints(&[(0, 1)], 0)),
            LinCons::eq(LinExpr::from_ints(&[(1, 1)], -10)),
        ],
    )?
    .into_value();
    let guard = [LinCons::ge(LinExpr::from_ints(&[(0, -1)], 99))];
    let body = [LinExpr::from_ints(&[(0, 1)], 1), LinExpr::from_ints(&[(1, 1)], 2)];

    let step = |head: &Polyhedron| -> Result<Polyhedron, PolyError> {
        let inside = head.meet_lincons(&dom, &guard)?.into_value();
        let next = inside.assign_array(&dom, &[0, 1], &body, None)?.into_value();
        Ok(init.join(&dom, &next)?.into_value())
    };

    let mut head = init.clone();
    for k in 0.. {
        let next = step(&head)?;
        let widened = head.widening(&dom, &next)?.into_value();
        println!("iterate {k}: {widened}");
        if widened.is_eq(&dom, &head)?.is_true() {
            break;
        }
        head = widened;
    }
    // one decreasing step recovers the guard bound
    let head = step(&head)?;
    println!("head: {head}");

    let exit = head.meet_lincons(&dom, &[LinCons::ge(LinExpr::from_ints(&[(0, 1)], -100))])?;
    println!("exit: {}  (exact: {})", exit.value, exit.exact);
    let j = exit.value.bound_dimension(&dom, 1)?.into_value();
    println!("j at exit in [{:?}, {:?}]", j.inf.map(|q| q.to_string()), j.sup.map(|q| q.to_string()));
    Ok(())
}
