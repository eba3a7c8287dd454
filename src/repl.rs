use crate::evaluator::Evaluator;
use crate::trig::AngleUnit;

use std::io::{self, Write};

const HISTORY_LIMIT: usize = 20;

/// The interactive shell. One evaluator lives for the whole session, so
/// definitions persist between inputs.
pub fn start() {
    println!("ccalc v0.1.0");
    println!("Type 'help' for commands, 'exit' or Ctrl+D to quit");
    println!();

    let mut evaluator = Evaluator::new();
    let mut history: Vec<String> = Vec::new();

    loop {
        print!("> ");
        io::stdout().flush().unwrap();

        let mut line = String::new();
        match io::stdin().read_line(&mut line) {
            Ok(0) => {
                // EOF (Ctrl+D or the end of piped input)
                println!();
                break;
            }
            Ok(_) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                if !run_command(line, &mut evaluator, &mut history) {
                    println!("Goodbye!");
                    break;
                }
            }
            Err(error) => {
                eprintln!("Error reading input: {}", error);
                break;
            }
        }
    }
}

/// Dispatches one input line. Returns `false` when the session should end.
fn run_command(line: &str, evaluator: &mut Evaluator, history: &mut Vec<String>) -> bool {
    let mut words = line.split_whitespace();
    let command = words.next().unwrap_or("");
    let argument = words.next();

    match command {
        "exit" | "quit" => return false,
        "help" => print_help(),
        "history" => match argument {
            None => print_history(history),
            Some(index) => rerun_history(index, evaluator, history),
        },
        "del" => match argument {
            None => println!("Usage: del <name>"),
            Some(name) => delete_definition(name, evaluator),
        },
        "angle" => match argument {
            None => println!("Current angle unit: {}", evaluator.angle_unit().name()),
            Some(unit) => change_angle_unit(unit, evaluator),
        },
        _ => eval(line, evaluator, history),
    }

    true
}

fn eval(source: &str, evaluator: &mut Evaluator, history: &mut Vec<String>) {
    match evaluator.evaluate(source) {
        Ok(results) => {
            for result in results {
                println!("{result}");
            }

            if history.len() == HISTORY_LIMIT {
                history.remove(0);
            }
            history.push(source.to_string());
        }
        Err(error) => error.report(source, None),
    }
}

fn print_history(history: &[String]) {
    if history.is_empty() {
        println!("No history!");
        return;
    }

    for (i, entry) in history.iter().enumerate() {
        println!("{}: {}", i + 1, entry);
    }
}

/// `history N` re-runs the Nth remembered input.
fn rerun_history(index: &str, evaluator: &mut Evaluator, history: &mut Vec<String>) {
    let entry = index
        .parse::<usize>()
        .ok()
        .filter(|&n| n >= 1 && n <= history.len())
        .map(|n| history[n - 1].clone());

    match entry {
        Some(source) => {
            println!("{source}");
            eval(&source, evaluator, history);
        }
        None => println!(
            "Usage: history <number> (1 to {})",
            history.len()
        ),
    }
}

fn delete_definition(name: &str, evaluator: &mut Evaluator) {
    match evaluator.remove_global(name) {
        Ok(true) => println!("Deleted '{name}'"),
        Ok(false) => println!("No definition named '{name}'"),
        Err(message) => println!("{message}"),
    }
}

fn change_angle_unit(input: &str, evaluator: &mut Evaluator) {
    match AngleUnit::from_prefix(input) {
        Some(unit) => {
            evaluator.set_angle_unit(unit);
            println!("Angle unit set to {}", unit.name());
        }
        None => println!(
            "Angle unit must be one of radians/degrees/gradians, received: {input}"
        ),
    }
}

fn print_help() {
    println!("Expressions:");
    println!("  2 + 3 * 4            arithmetic over complex numbers");
    println!("  (1 + 2i) * ~z        'i' is the imaginary unit, '~' conjugates");
    println!("  |z|  z!  x ^ y       absolute value, factorial, power");
    println!("  x = 5                assign a variable");
    println!("  fn f(x, y = 1) = x^y define a function; 'y' is optional");
    println!("  sum(k = 1, 10, k)    aggregate sums; 'product' multiplies");
    println!();
    println!("Commands:");
    println!("  help                 show this text");
    println!("  history              list recent inputs");
    println!("  history <n>          re-run the nth input");
    println!("  del <name>           delete a variable or function");
    println!("  angle [unit]         show or set radians/degrees/gradians");
    println!("  exit, quit           leave the shell");
}
