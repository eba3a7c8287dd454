use crate::evaluator::Evaluator;

/// Runs a whole script in a fresh session and prints the visible results,
/// one per line. Errors are reported against the script source and stop
/// execution.
pub fn run(source: &str, filename: Option<&str>) {
    let mut evaluator = Evaluator::new();

    match evaluator.evaluate(source) {
        Ok(results) => {
            for result in results {
                println!("{result}");
            }
        }
        Err(error) => error.report(source, filename),
    }
}
