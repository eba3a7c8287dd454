// Parser robustness tests: every malformed input must come back as a
// reported error, never a panic.

use ccalc::error::CalcError;
use ccalc::lexer::Lexer;
use ccalc::parser::Parser;

/// Test result for a single test case
#[derive(Debug)]
pub enum TestResult {
    Pass,
    Fail(String),
    Crash(String),
}

/// Individual test case
#[derive(Debug, Clone)]
pub struct TestCase {
    pub name: String,
    pub input: String,
    pub should_succeed: bool,
    pub expected_error_contains: Option<String>,
}

impl TestCase {
    pub fn should_succeed(name: &str, input: &str) -> Self {
        Self {
            name: name.to_string(),
            input: input.to_string(),
            should_succeed: true,
            expected_error_contains: None,
        }
    }

    pub fn should_fail(name: &str, input: &str) -> Self {
        Self {
            name: name.to_string(),
            input: input.to_string(),
            should_succeed: false,
            expected_error_contains: None,
        }
    }

    pub fn should_fail_with_message(name: &str, input: &str, expected_msg: &str) -> Self {
        Self {
            name: name.to_string(),
            input: input.to_string(),
            should_succeed: false,
            expected_error_contains: Some(expected_msg.to_string()),
        }
    }
}

/// Test suite containing multiple test cases
#[derive(Debug)]
pub struct TestSuite {
    pub name: String,
    pub tests: Vec<TestCase>,
}

impl TestSuite {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            tests: Vec::new(),
        }
    }

    pub fn add_test(&mut self, test: TestCase) {
        self.tests.push(test);
    }

    /// Runs every test, printing per-case results. Returns whether the
    /// whole suite passed.
    pub fn run(&self) -> bool {
        println!("Running test suite: {}", self.name);

        let mut all_passed = true;
        for test in &self.tests {
            match run_single_test(test) {
                TestResult::Pass => println!("  ok {}", test.name),
                TestResult::Fail(msg) => {
                    all_passed = false;
                    println!("  FAIL {}: {}", test.name, msg);
                }
                TestResult::Crash(msg) => {
                    all_passed = false;
                    println!("  CRASH {}: {}", test.name, msg);
                }
            }
        }

        println!();
        all_passed
    }
}

fn run_single_test(test: &TestCase) -> TestResult {
    // A panic means the parser is not robust; report it as a crash.
    let result = std::panic::catch_unwind(|| parse_input(&test.input));

    let parse_result = match result {
        Ok(parse_result) => parse_result,
        Err(panic_info) => {
            let panic_msg = if let Some(s) = panic_info.downcast_ref::<String>() {
                s.clone()
            } else if let Some(s) = panic_info.downcast_ref::<&str>() {
                s.to_string()
            } else {
                "Unknown panic".to_string()
            };
            return TestResult::Crash(panic_msg);
        }
    };

    match (parse_result, test.should_succeed) {
        (Ok(_), true) => TestResult::Pass,
        (Ok(_), false) => {
            TestResult::Fail("Expected parsing to fail, but it succeeded".to_string())
        }
        (Err(error), false) => match &test.expected_error_contains {
            Some(expected) if !error.message.contains(expected) => TestResult::Fail(format!(
                "Error message '{}' doesn't contain expected text '{}'",
                error.message, expected
            )),
            _ => TestResult::Pass,
        },
        (Err(error), true) => TestResult::Fail(format!(
            "Expected parsing to succeed, but got error: {}",
            error.message
        )),
    }
}

fn parse_input(input: &str) -> Result<ccalc::ast::Program, CalcError> {
    let mut lexer = Lexer::new(input.to_string());
    let tokens = lexer.scan_tokens()?;
    let mut parser = Parser::new(tokens);
    parser.parse()
}

// ============================================================================
// Test Suite Creation Functions
// ============================================================================

fn create_expression_tests() -> TestSuite {
    let mut suite = TestSuite::new("Expressions");

    suite.add_test(TestCase::should_succeed("simple_arithmetic", "1 + 2 * 3"));
    suite.add_test(TestCase::should_succeed("parentheses", "(1 + 2) * 3"));
    suite.add_test(TestCase::should_succeed("int_division", "7 // 2"));
    suite.add_test(TestCase::should_succeed("power_chain", "2^3^2"));
    suite.add_test(TestCase::should_succeed("factorial", "5!"));
    suite.add_test(TestCase::should_succeed("absolute_value", "|1 - 4|"));
    suite.add_test(TestCase::should_succeed("conjugate", "~(1 + i)"));
    suite.add_test(TestCase::should_succeed("trailing_i", "3i"));
    suite.add_test(TestCase::should_succeed("implicit_mul_paren", "2(3 + 4)"));
    suite.add_test(TestCase::should_succeed("implicit_mul_keyword", "2pi"));
    suite.add_test(TestCase::should_succeed("unicode_constant", "\u{03C0} + 1"));

    // Consecutive signs read as unary operators on the right operand
    suite.add_test(TestCase::should_succeed("double_minus", "1 -- 2"));
    suite.add_test(TestCase::should_succeed("plus_minus", "1 +- 2"));
    suite.add_test(TestCase::should_succeed("double_plus", "1 ++ 2"));

    suite.add_test(TestCase::should_fail_with_message(
        "unmatched_opening_paren",
        "(1 + 2",
        "Expected ')' after expression",
    ));
    suite.add_test(TestCase::should_fail_with_message(
        "unmatched_closing_paren",
        "1 + 2)",
        "Expected end of statement",
    ));
    suite.add_test(TestCase::should_fail_with_message(
        "empty_parentheses",
        "()",
        "Expected expression",
    ));
    suite.add_test(TestCase::should_fail_with_message(
        "unclosed_absolute_value",
        "|1 + 2",
        "Expected '|' to close",
    ));
    suite.add_test(TestCase::should_fail("missing_right_operand", "1 +"));
    suite.add_test(TestCase::should_fail("missing_both_operands", "*"));

    suite
}

fn create_edge_case_tests() -> TestSuite {
    let mut suite = TestSuite::new("Edge Cases");

    suite.add_test(TestCase::should_succeed("empty_input", ""));
    suite.add_test(TestCase::should_succeed("only_whitespace", "   \n\t  "));
    suite.add_test(TestCase::should_succeed("blank_statements", ";;\n;1"));

    let deep_parens = "(".repeat(100) + "1" + &")".repeat(100);
    suite.add_test(TestCase::should_succeed(
        "deeply_nested_parens",
        &deep_parens,
    ));

    suite.add_test(TestCase::should_fail("unexpected_eof_in_paren", "1 + ("));

    suite
}

fn create_number_tests() -> TestSuite {
    let mut suite = TestSuite::new("Numbers");

    suite.add_test(TestCase::should_succeed("integer_literal", "42"));
    suite.add_test(TestCase::should_succeed("double_literal", "3.14"));
    suite.add_test(TestCase::should_succeed("leading_dot", ".5"));
    suite.add_test(TestCase::should_succeed("trailing_dot", "2."));

    suite.add_test(TestCase::should_fail_with_message(
        "multiple_dots",
        "3.14.159",
        "Illegal character",
    ));
    suite.add_test(TestCase::should_fail_with_message(
        "lone_dot",
        ".",
        "Invalid number",
    ));
    suite.add_test(TestCase::should_fail_with_message(
        "illegal_character",
        "1 @ 2",
        "Illegal character",
    ));

    suite
}

fn create_assignment_tests() -> TestSuite {
    let mut suite = TestSuite::new("Assignments");

    suite.add_test(TestCase::should_succeed("simple_assignment", "x = 42"));
    suite.add_test(TestCase::should_succeed("chained_assignment", "x = y = 1"));
    suite.add_test(TestCase::should_succeed(
        "assignment_with_expression",
        "x = (1 + 2) * 3",
    ));

    suite.add_test(TestCase::should_fail("missing_value", "x ="));
    suite.add_test(TestCase::should_fail_with_message(
        "invalid_target",
        "1 = x",
        "Expected end of statement",
    ));

    suite
}

fn create_function_def_tests() -> TestSuite {
    let mut suite = TestSuite::new("Function Definitions");

    suite.add_test(TestCase::should_succeed("simple_def", "fn f(x) = x"));
    suite.add_test(TestCase::should_succeed("no_params", "fn f() = 1"));
    suite.add_test(TestCase::should_succeed(
        "optional_param",
        "fn f(x, y = 1) = x + y",
    ));
    suite.add_test(TestCase::should_succeed(
        "default_uses_earlier_param",
        "fn f(x, y = x + 1) = x * y",
    ));
    suite.add_test(TestCase::should_succeed("native_def", "fn f(x) native"));
    suite.add_test(TestCase::should_succeed(
        "all_optional_after_first_default",
        "fn f(x, y = 1, z = 2) = x + y + z",
    ));

    suite.add_test(TestCase::should_fail_with_message(
        "duplicate_param",
        "fn f(x, x) = x",
        "already defined",
    ));
    suite.add_test(TestCase::should_fail_with_message(
        "required_after_optional",
        "fn f(x = 1, y) = x",
        "Required parameter 'y' after an optional one",
    ));
    suite.add_test(TestCase::should_fail_with_message(
        "trailing_comma_in_params",
        "fn f(x,) = x",
        "Parameter expected after ','",
    ));
    suite.add_test(TestCase::should_fail_with_message(
        "missing_name",
        "fn 2(x) = x",
        "Function name expected",
    ));
    suite.add_test(TestCase::should_fail_with_message(
        "missing_body",
        "fn f(x)",
        "Expected '=' before function body",
    ));

    // The working set of parameters must reset between statements
    suite.add_test(TestCase::should_succeed(
        "params_reset_after_def",
        "fn f(x) = x\nfn g(x) = x",
    ));

    suite
}

fn create_call_tests() -> TestSuite {
    let mut suite = TestSuite::new("Function Calls");

    suite.add_test(TestCase::should_succeed("simple_call", "foo()"));
    suite.add_test(TestCase::should_succeed("call_with_args", "foo(1, 2, 3)"));
    suite.add_test(TestCase::should_succeed(
        "nested_calls",
        "foo(bar(1), 2 + 3)",
    ));

    suite.add_test(TestCase::should_fail("missing_closing_paren", "foo(1, 2"));
    suite.add_test(TestCase::should_fail_with_message(
        "trailing_comma",
        "foo(1, 2,)",
        "Expression expected after ','",
    ));
    suite.add_test(TestCase::should_fail_with_message(
        "missing_comma",
        "foo(1 2)",
        "Expected ',' between arguments",
    ));

    suite
}

fn create_aggregation_tests() -> TestSuite {
    let mut suite = TestSuite::new("Aggregations");

    suite.add_test(TestCase::should_succeed("sum", "sum(k = 1, 10, k)"));
    suite.add_test(TestCase::should_succeed("product", "product(k = 1, 10, k^2)"));
    suite.add_test(TestCase::should_succeed("sigma_symbol", "\u{03A3}(k = 1, 10, k)"));
    suite.add_test(TestCase::should_succeed("pi_symbol", "\u{03A0}(k = 1, 4, k)"));
    suite.add_test(TestCase::should_succeed(
        "nested_aggregation",
        "sum(a = 1, 3, sum(b = 1, 3, a b))",
    ));

    suite.add_test(TestCase::should_fail_with_message(
        "missing_variable",
        "sum(1, 2, 3)",
        "Expected variable name",
    ));
    suite.add_test(TestCase::should_fail_with_message(
        "missing_body",
        "sum(k = 1, 2)",
        "Expected ',' after the upper bound",
    ));
    suite.add_test(TestCase::should_fail_with_message(
        "variable_shadows_param",
        "fn f(k) = sum(k = 1, 2, k)",
        "already defined",
    ));

    suite
}

// ============================================================================
// Main Test Function
// ============================================================================

#[test]
fn comprehensive_parser_tests() {
    let suites = vec![
        create_expression_tests(),
        create_edge_case_tests(),
        create_number_tests(),
        create_assignment_tests(),
        create_function_def_tests(),
        create_call_tests(),
        create_aggregation_tests(),
    ];

    let mut all_passed = true;
    for suite in suites {
        if !suite.run() {
            all_passed = false;
        }
    }

    assert!(all_passed, "some parser test cases failed, see output above");
}
