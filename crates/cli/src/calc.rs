//! Arithmetic subcommands.

use cmdtree_core::CommandGraph;

use crate::error::{Error, Result};

/// Registers `add`, `subtract`, `multiply`, `divide` and `sum`.
pub fn register(graph: &mut CommandGraph) {
    graph
        .func("add", "add two values", |args| print_value(add(args)))
        .with_usage("<a> <b>");
    graph
        .func("subtract", "subtract two values", |args| print_value(subtract(args)))
        .with_usage("<a> <b>");
    graph
        .func("multiply", "multiply two values", |args| print_value(multiply(args)))
        .with_usage("<a> <b>");
    graph
        .func("divide", "divide two values", |args| print_value(divide(args)))
        .with_usage("<a> <b>");
    graph
        .func("sum", "calculate sum of values", |args| print_value(sum(args)))
        .with_usage("<value>...");
}

fn print_value(value: Result<f64>) -> cmdtree_core::Result<()> {
    println!("{}", value?);
    Ok(())
}

pub fn parse_floats(args: &[String]) -> Result<Vec<f64>> {
    args.iter()
        .map(|arg| {
            arg.parse::<f64>()
                .map_err(|original| Error::invalid_number(arg, original))
        })
        .collect()
}

pub fn parse_two_floats(args: &[String]) -> Result<(f64, f64)> {
    if args.len() != 2 {
        return Err(Error::ArgumentCount {
            expected: 2,
            received: args.len(),
        });
    }

    let values = parse_floats(args)?;
    Ok((values[0], values[1]))
}

pub fn add(args: &[String]) -> Result<f64> {
    let (a, b) = parse_two_floats(args)?;
    Ok(a + b)
}

pub fn subtract(args: &[String]) -> Result<f64> {
    let (a, b) = parse_two_floats(args)?;
    Ok(a - b)
}

pub fn multiply(args: &[String]) -> Result<f64> {
    let (a, b) = parse_two_floats(args)?;
    Ok(a * b)
}

pub fn divide(args: &[String]) -> Result<f64> {
    let (a, b) = parse_two_floats(args)?;
    if b == 0.0 {
        return Err(Error::DivideByZero);
    }
    Ok(a / b)
}

pub fn sum(args: &[String]) -> Result<f64> {
    Ok(parse_floats(args)?.iter().sum())
}
