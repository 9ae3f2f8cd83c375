// Integration tests for the brackit interpreter

use brackit::config::InterpreterConfig;
use brackit::interpreter::engine::Interpreter;
use brackit::interpreter::errors::RuntimeError;
use pretty_assertions::assert_eq;

fn quiet(config: InterpreterConfig) -> InterpreterConfig {
    InterpreterConfig {
        echo_output: false,
        ..config
    }
}

/// Runs a whole program and returns the interpreter together with the outcome
fn execute_with(
    source: &str,
    config: InterpreterConfig,
) -> (Interpreter, Result<(), RuntimeError>) {
    let mut interpreter =
        Interpreter::new(source, quiet(config)).expect("program should pre-scan");
    let result = interpreter.run();
    (interpreter, result)
}

/// Runs a program that must succeed and returns what it printed
fn output_of(source: &str) -> String {
    let (interpreter, result) = execute_with(source, InterpreterConfig::default());
    assert!(result.is_ok(), "Execution failed: {:?}", result);
    interpreter.terminal().as_str().to_string()
}

/// Runs a program that must fail and returns the error
fn error_of(source: &str) -> RuntimeError {
    let (_, result) = execute_with(source, InterpreterConfig::default());
    result.expect_err("program should fail")
}

/// Wraps statements into a program with an entry routine
fn program(body: &str) -> String {
    format!("program [\n  command start()\n  [\n{}\n  ]\n]\n", body)
}

// === ARITHMETIC ===

#[test]
fn test_operator_precedence() {
    let source = program("    outputNL 2 + 3 * 4\n    outputNL (2 + 3) * 4");
    assert_eq!(output_of(&source), "14\n20\n");
}

#[test]
fn test_unary_minus_and_modulo() {
    let source = program("    integer a = -7\n    outputNL a % 3\n    outputNL -(a + 2) * 2");
    assert_eq!(output_of(&source), "-1\n10\n");
}

#[test]
fn test_integer_division_truncates() {
    let source = program("    double d = 7 / 2\n    outputNL d\n    outputNL 7.0 / 2");
    assert_eq!(output_of(&source), "3.0\n3.5\n");
}

#[test]
fn test_division_by_zero() {
    let err = error_of(&program("    integer x = 5 / 0"));
    assert!(
        matches!(&err, RuntimeError::DivisionByZero { operation, .. } if operation == "division"),
        "got {:?}",
        err
    );

    let err = error_of(&program("    integer x = 5 % 0"));
    assert!(
        matches!(&err, RuntimeError::DivisionByZero { operation, .. } if operation == "modulo"),
        "got {:?}",
        err
    );
}

#[test]
fn test_error_reports_source_line() {
    let err = error_of(&program("    integer x = 1\n    integer y = x / 0"));
    assert_eq!(err.location().map(|l| l.line), Some(5));
    assert!(err.to_string().ends_with("at line 5"));
}

#[test]
fn test_integer_overflow_is_an_error() {
    let err = error_of(&program("    integer big = 2147483647\n    big = big + 1"));
    assert!(matches!(err, RuntimeError::IntegerOverflow { .. }), "got {:?}", err);
}

#[test]
fn test_double_fraction_loses_leading_zeros() {
    let source = program("    double d = 1.05\n    outputNL d\n    double e = 2.5\n    outputNL e");
    assert_eq!(output_of(&source), "1.5\n2.5\n");
}

// === OUTPUT AND TYPES ===

#[test]
fn test_output_without_newline() {
    let source = program("    output \"a\"\n    output 'b'\n    outputNL 1\n    outputNL \"\"");
    assert_eq!(output_of(&source), "ab1\n\n");
}

#[test]
fn test_boolean_output() {
    let source = program(
        "    boolean b = 3 > 2 & !false\n    outputNL b\n    outputNL 1 == 2 | 2 >= 2\n    outputNL !(1 < 2)",
    );
    assert_eq!(output_of(&source), "true\ntrue\nfalse\n");
}

#[test]
fn test_char_and_word_equality() {
    let source = program(
        "    char c = 'a'\n    word w = \"hi\"\n    if (c == 'a' & w != \"ho\") [\n      outputNL \"yes\"\n    ]",
    );
    assert_eq!(output_of(&source), "yes\n");
}

#[test]
fn test_boolean_equality() {
    let source = program(
        "    boolean a = true\n    boolean b = false\n    if (a == b) [\n      outputNL \"same\"\n    ] else [\n      outputNL \"differ\"\n    ]\n    outputNL a != b\n    outputNL b == false\n    boolean c = a = true\n    outputNL c",
    );
    assert_eq!(output_of(&source), "differ\ntrue\ntrue\ntrue\n");
}

#[test]
fn test_boolean_compared_with_char_is_a_type_mismatch() {
    let source = program("    boolean a = true\n    outputNL a == 'c'");
    let err = error_of(&source);
    assert!(
        matches!(err, RuntimeError::TypeMismatch { ref expected, .. } if expected == "boolean"),
        "got {:?}",
        err
    );

    let source = program("    boolean a = true\n    char c = 'c'\n    if (a != c) [\n      outputNL 1\n    ]");
    assert!(matches!(error_of(&source), RuntimeError::TypeMismatch { .. }));
}

#[test]
fn test_multiple_declarations_on_one_line() {
    let source = program("    integer a = 1, b = a + 1\n    outputNL a + b");
    assert_eq!(output_of(&source), "3\n");
}

#[test]
fn test_comments_are_ignored() {
    let source = program("    // nothing to see\n    integer a = 4 // four\n    outputNL a");
    assert_eq!(output_of(&source), "4\n");
}

// === CONTROL FLOW ===

#[test]
fn test_while_loop() {
    let source = program("    integer i = 0 while(i < 3)[ outputNL i i = i + 1 ]");
    assert_eq!(output_of(&source), "0\n1\n2\n");
}

#[test]
fn test_break_in_nested_if_leaves_only_the_loop() {
    let source = program(
        r#"    integer i = 0
    while (i < 10) [
      if (i == 2) [
        break
      ]
      output i
      i = i + 1
    ]
    outputNL "done""#,
    );
    assert_eq!(output_of(&source), "01done\n");
}

#[test]
fn test_break_leaves_innermost_loop_only() {
    let source = program(
        r#"    integer i = 0
    while (i < 2) [
      integer j = 0
      while (true) [
        if (j == 1) [ break ]
        j = j + 1
      ]
      output j
      i = i + 1
    ]
    outputNL i"#,
    );
    assert_eq!(output_of(&source), "112\n");
}

#[test]
fn test_break_outside_loop() {
    let err = error_of(&program("    if (true) [\n      break\n    ]"));
    assert!(matches!(err, RuntimeError::BreakOutsideLoop { .. }), "got {:?}", err);
}

#[test]
fn test_if_else_chain() {
    let chain = |x: i32| {
        program(&format!(
            r#"    integer x = {}
    if (x < 3) [
      outputNL "small"
    ] else if (x < 10) [
      outputNL "medium"
    ] else [
      outputNL "large"
    ]"#,
            x
        ))
    };
    assert_eq!(output_of(&chain(1)), "small\n");
    assert_eq!(output_of(&chain(5)), "medium\n");
    assert_eq!(output_of(&chain(50)), "large\n");
}

#[test]
fn test_for_loop_removes_its_variable() {
    let source = program(
        r#"    for (integer k = 0; k < 3; k = k + 1) [
      output k
    ]
    outputNL ""
    integer k = 9
    outputNL k"#,
    );
    let (interpreter, result) = execute_with(&source, InterpreterConfig::default());
    assert!(result.is_ok(), "Execution failed: {:?}", result);
    assert_eq!(interpreter.terminal().as_str(), "012\n9\n");
}

#[test]
fn test_for_loop_with_existing_variable() {
    let source = program(
        r#"    integer k = 10
    for (k = 0; k < 2; k = k + 1) [
      output k
    ]
    outputNL k"#,
    );
    assert_eq!(output_of(&source), "012\n");
}

#[test]
fn test_do_while_runs_at_least_once() {
    let source = program(
        r#"    integer i = 5
    do [
      outputNL i
    ] while (i < 3)"#,
    );
    assert_eq!(output_of(&source), "5\n");
}

#[test]
fn test_do_while_break_skips_condition() {
    let source = program(
        r#"    integer i = 0
    do [
      i = i + 1
      if (i == 3) [ break ]
    ] while (i < 10)
    outputNL i"#,
    );
    assert_eq!(output_of(&source), "3\n");
}

#[test]
fn test_give_in_entry_routine_halts() {
    let source = program("    outputNL 1\n    while (true) [\n      give\n    ]\n    outputNL 2");
    let (interpreter, result) = execute_with(&source, InterpreterConfig::default());
    assert!(result.is_ok(), "Execution failed: {:?}", result);
    assert_eq!(interpreter.terminal().as_str(), "1\n");
    assert!(interpreter.is_finished());
}

// === SCOPES ===

#[test]
fn test_duplicate_declaration_in_same_scope() {
    let err = error_of(&program("    integer x = 1\n    integer x = 2"));
    assert!(
        matches!(&err, RuntimeError::DuplicateDeclaration { name, .. } if name == "x"),
        "got {:?}",
        err
    );
}

#[test]
fn test_same_name_in_sibling_blocks() {
    let source = program(
        r#"    if (true) [
      integer y = 1
      outputNL y
    ]
    if (true) [
      integer y = 2
      outputNL y
    ]"#,
    );
    assert_eq!(output_of(&source), "1\n2\n");
}

#[test]
fn test_block_variables_are_freed() {
    let source = program("    if (true) [\n      integer y = 1\n    ]\n    outputNL y");
    let err = error_of(&source);
    assert!(
        matches!(&err, RuntimeError::UndeclaredVariable { name, .. } if name == "y"),
        "got {:?}",
        err
    );
}

#[test]
fn test_reserved_names_cannot_be_declared() {
    let err = error_of(&program("    integer while = 1"));
    assert!(matches!(err, RuntimeError::ReservedName { .. }), "got {:?}", err);
}

#[test]
fn test_universal_variables_are_shared() {
    let source = r#"program [
  integer counter = 0
  command start()
  [
    bump()
    bump()
    outputNL counter
  ]
]
command bump() gives nothing [
  counter = counter + 1
]
"#;
    let (interpreter, result) = execute_with(source, InterpreterConfig::default());
    assert!(result.is_ok(), "Execution failed: {:?}", result);
    assert_eq!(interpreter.terminal().as_str(), "2\n");
    assert!(interpreter.variables().contains_key("universal.counter"));
}

// === METHODS ===

const FACTORIAL: &str = r#"program [
  command start()
  [
    outputNL fact(5)
    integer n = 3
    outputNL fact(n) + n
  ]
]
command fact(integer n) gives integer [
  if (n <= 1) [
    give 1
  ]
  give n * fact(n - 1)
]
"#;

#[test]
fn test_recursive_factorial() {
    assert_eq!(output_of(FACTORIAL), "120\n9\n");
}

#[test]
fn test_activations_are_swept_after_return() {
    let (interpreter, result) = execute_with(FACTORIAL, InterpreterConfig::default());
    assert!(result.is_ok(), "Execution failed: {:?}", result);
    // Only the return slot outlives the calls
    let mut names: Vec<&String> = interpreter.variables().keys().collect();
    names.sort();
    assert_eq!(names, vec!["fact.returnValue"]);
}

#[test]
fn test_arguments_are_passed_by_value() {
    let source = r#"program [
  command start()
  [
    integer x = 1
    change(x)
    outputNL x
  ]
]
command change(integer x) gives nothing [
  x = 99
]
"#;
    assert_eq!(output_of(source), "1\n");
}

#[test]
fn test_boolean_variable_argument_is_aliased() {
    let source = r#"program [
  command start()
  [
    boolean flag = false
    raise(flag)
    outputNL flag
  ]
]
command raise(boolean b) gives nothing [
  b = true
]
"#;
    assert_eq!(output_of(source), "true\n");
}

#[test]
fn test_method_values_in_every_context() {
    let source = r#"program [
  command start()
  [
    word w = greet("bob")
    outputNL w
    if (positive(-1) | positive(2)) [
      outputNL half(5)
    ]
  ]
]
command greet(word name) gives word [
  give name
]
command positive(integer n) gives boolean [
  give n > 0
]
command half(double d) gives double [
  give d / 2
]
"#;
    assert_eq!(output_of(source), "bob\ntrue\n2.5\n");
}

#[test]
fn test_missing_return() {
    let source = r#"program [
  command start()
  [
    integer x = broken()
  ]
]
command broken() gives integer [
  integer y = 1
]
"#;
    let err = error_of(source);
    assert!(
        matches!(&err, RuntimeError::MissingReturn { method, .. } if method == "broken"),
        "got {:?}",
        err
    );
}

#[test]
fn test_argument_count_mismatch() {
    let source = r#"program [
  command start()
  [
    integer x = square(1, 2)
  ]
]
command square(integer n) gives integer [
  give n * n
]
"#;
    let err = error_of(source);
    assert!(
        matches!(err, RuntimeError::ArgumentCountMismatch { expected: 1, .. }),
        "got {:?}",
        err
    );

    let source = r#"program [
  command start()
  [
    hi(3)
  ]
]
command hi() gives nothing [
  outputNL "hi"
]
"#;
    let err = error_of(source);
    assert!(
        matches!(err, RuntimeError::ArgumentCountMismatch { expected: 0, .. }),
        "got {:?}",
        err
    );
}

#[test]
fn test_unknown_method() {
    let err = error_of(&program("    integer x = nope(1)"));
    assert!(matches!(err, RuntimeError::UnknownMethod { .. }), "got {:?}", err);
}

#[test]
fn test_method_named_without_parentheses() {
    let source = r#"program [
  command start()
  [
    greet
  ]
]
command greet() gives nothing [
  outputNL "hi"
]
"#;
    let err = error_of(source);
    assert!(
        matches!(err, RuntimeError::UnknownMethod { ref name, ref location } if name == "greet" && location.line == 4),
        "got {:?}",
        err
    );
}

#[test]
fn test_recursion_limit() {
    let source = r#"program [
  command start()
  [
    integer x = forever(0)
  ]
]
command forever(integer n) gives integer [
  give forever(n + 1)
]
"#;
    let config = InterpreterConfig {
        max_call_depth: 25,
        ..InterpreterConfig::default()
    };
    let (_, result) = execute_with(source, config);
    assert!(
        matches!(result, Err(RuntimeError::RecursionLimit { limit: 25, .. })),
        "got {:?}",
        result
    );
}

#[test]
fn test_missing_start() {
    let result = Interpreter::new("program [\n]\n", InterpreterConfig::default());
    assert!(matches!(result, Err(RuntimeError::MissingStart)));
}

// === MEMORY ===

#[test]
fn test_word_shrink_keeps_neighbours_intact() {
    let source = program(
        "    word a = \"hello\"\n    integer b = 7\n    a = \"hi\"\n    outputNL a\n    outputNL b",
    );
    let (interpreter, result) = execute_with(&source, InterpreterConfig::default());
    assert!(result.is_ok(), "Execution failed: {:?}", result);
    assert_eq!(interpreter.terminal().as_str(), "hi\n7\n");
}

#[test]
fn test_compaction_makes_room() {
    // 32-bit word, 32-bit integer, then the word grows to 64 bits and leaves a hole
    let source = program(
        "    word w = \"ab\"\n    integer a = 1\n    w = \"abcd\"\n    integer b = 2\n    outputNL w\n    outputNL a + b",
    );
    let config = InterpreterConfig {
        memory_bits: 128,
        ..InterpreterConfig::default()
    };
    let (interpreter, result) = execute_with(&source, config);
    assert!(result.is_ok(), "Execution failed: {:?}", result);
    assert_eq!(interpreter.terminal().as_str(), "abcd\n3\n");
    assert_eq!(interpreter.memory().compactions(), 1);
}

#[test]
fn test_out_of_memory() {
    let source = program("    integer a = 1\n    integer b = 2\n    integer c = 3");
    let config = InterpreterConfig {
        memory_bits: 64,
        ..InterpreterConfig::default()
    };
    let (_, result) = execute_with(&source, config);
    assert!(
        matches!(
            result,
            Err(RuntimeError::OutOfMemory {
                requested: 32,
                capacity: 64,
                ..
            })
        ),
        "got {:?}",
        result
    );
}

#[test]
fn test_char_outside_byte_range_is_rejected() {
    let err = error_of(&program("    char c = 'é'\n    char d = 'Ā'"));
    assert!(matches!(err, RuntimeError::InvalidEncoding { .. }), "got {:?}", err);
    assert_eq!(err.location().map(|l| l.line), Some(5));
}

// === HISTORY ===

#[test]
fn test_history_stepping() {
    let source = program("    integer x = 1\n    outputNL x\n    x = x + 1\n    outputNL x");
    let config = InterpreterConfig {
        record_history: true,
        ..InterpreterConfig::default()
    };
    let (mut interpreter, result) = execute_with(&source, config);
    assert!(result.is_ok(), "Execution failed: {:?}", result);

    // One snapshot per statement plus the final state
    assert_eq!(interpreter.total_snapshots(), 5);
    let last = interpreter.total_snapshots() - 1;
    assert_eq!(interpreter.history_position(), last);

    interpreter.rewind_to_start().unwrap();
    let first = interpreter.current_snapshot().unwrap();
    assert_eq!(first.location.line, 4);
    assert!(first.variables.is_empty());
    assert_eq!(first.output_len, 0);

    assert!(matches!(
        interpreter.step_backward(),
        Err(RuntimeError::HistoryUnavailable { .. })
    ));

    interpreter.step_forward().unwrap();
    interpreter.step_forward().unwrap();
    let snapshot = interpreter.current_snapshot().unwrap();
    assert_eq!(snapshot.variables.len(), 1);
    assert_eq!(snapshot.variables[0].value, "1");
    assert_eq!(snapshot.output_len, 2);
    assert_eq!(snapshot.buckets.len(), 1);
    assert_eq!(snapshot.buckets[0].bits.len(), 32);

    while interpreter.step_forward().is_ok() {}
    assert_eq!(interpreter.history_position(), last);
    let end = interpreter.current_snapshot().unwrap();
    assert_eq!(end.output_len, interpreter.terminal().len());
    assert!(end.variables.is_empty());
}

#[test]
fn test_history_is_kept_after_an_error() {
    let source = program("    integer x = 1\n    outputNL x / 0");
    let config = InterpreterConfig {
        record_history: true,
        ..InterpreterConfig::default()
    };
    let (mut interpreter, result) = execute_with(&source, config);
    assert!(result.is_err());
    assert_eq!(interpreter.total_snapshots(), 2);
    assert!(interpreter.rewind_to_start().is_ok());
}

#[test]
fn test_history_is_not_recorded_by_default() {
    let (mut interpreter, result) = execute_with(FACTORIAL, InterpreterConfig::default());
    assert!(result.is_ok());
    assert_eq!(interpreter.total_snapshots(), 0);
    assert!(interpreter.rewind_to_start().is_err());
}

#[test]
fn test_snapshot_limit() {
    let config = InterpreterConfig {
        record_history: true,
        snapshot_limit: 1,
        ..InterpreterConfig::default()
    };
    let (_, result) = execute_with(FACTORIAL, config);
    assert!(
        matches!(result, Err(RuntimeError::SnapshotLimitExceeded { .. })),
        "got {:?}",
        result
    );
}
