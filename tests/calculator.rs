use pratt_calc::{
    Calculator, Error, LexError, NumericAnomaly, Options, ParseError, ValidationError, evaluate,
};

fn value(input: &str) -> f64 {
    evaluate(input)
        .unwrap_or_else(|e| panic!("`{input}` should evaluate: {e}"))
        .value
}

fn display(input: &str) -> String {
    evaluate(input)
        .unwrap_or_else(|e| panic!("`{input}` should evaluate: {e}"))
        .display
}

#[test]
fn precedence() {
    assert_eq!(display("2+3*4"), "14");
    assert_eq!(display("(2+3)*4"), "20");
    assert_eq!(display("2 * 3 + 4 * 5"), "26");
}

#[test]
fn redundant_parentheses() {
    assert_eq!(value("((2+3))"), value("2+3"));
    assert_eq!(value("((1.5*(2)))"), value("1.5*2"));
}

#[test]
fn power_is_right_associative() {
    assert_eq!(display("2^3^2"), "512");
}

#[test]
fn unary_minus_binds_looser_than_power() {
    assert_eq!(display("-2^2"), "-4");
    assert_eq!(display("3 - -2"), "5");
}

#[test]
fn division_by_zero_is_an_overflow_anomaly() {
    let evaluation = evaluate("5/0").unwrap();
    assert_eq!(evaluation.value, f64::INFINITY);
    assert_eq!(evaluation.anomaly, Some(NumericAnomaly::Overflow));
    assert_eq!(evaluation.display, "∞");
    assert!(evaluation.to_string().starts_with("Error: Operation too large."));
}

#[test]
fn zero_over_zero_is_not_a_number() {
    let evaluation = evaluate("0/0").unwrap();
    assert!(evaluation.value.is_nan());
    assert_eq!(evaluation.anomaly, Some(NumericAnomaly::NotANumber));
    assert_eq!(evaluation.to_string(), "Error: divide by 0.\nResult: NaN");
}

#[test]
fn large_powers_overflow() {
    let evaluation = evaluate("10^400").unwrap();
    assert_eq!(evaluation.anomaly, Some(NumericAnomaly::Overflow));
    let evaluation = evaluate("-10^401").unwrap();
    assert_eq!(evaluation.display, "-∞");
}

#[test]
fn unbalanced_brackets_are_rejected_before_evaluation() {
    for input in ["(1+2", ")1+2(", "2+2)"] {
        assert!(
            matches!(
                evaluate(input),
                Err(Error::Validation(ValidationError::UnmatchedBrackets { .. }))
            ),
            "`{input}` should fail bracket validation"
        );
    }
}

#[test]
fn empty_parentheses_have_no_operand() {
    assert!(matches!(
        evaluate("()"),
        Err(Error::Parse(ParseError::EmptyBrackets { .. }))
    ));
}

#[test]
fn disallowed_characters_are_rejected() {
    assert!(matches!(
        evaluate("2x+1"),
        Err(Error::Validation(ValidationError::DisallowedCharacter { token: 'x', .. }))
    ));
}

#[test]
fn stray_decimal_points_are_lexical_errors() {
    for input in [".5", "1.2.3", "(.5)"] {
        assert!(
            matches!(
                evaluate(input),
                Err(Error::Lex(LexError::StrayDecimalPoint { .. }))
            ),
            "`{input}` should fail lexing"
        );
    }
}

#[test]
fn empty_input_passes_validation_but_has_no_value() {
    assert!(matches!(
        evaluate(""),
        Err(Error::Parse(ParseError::UnexpectedEnd { .. }))
    ));
    assert!(matches!(
        evaluate("   "),
        Err(Error::Parse(ParseError::UnexpectedEnd { .. }))
    ));
}

#[test]
fn trailing_tokens_are_rejected() {
    assert!(matches!(
        evaluate("(1)(2)"),
        Err(Error::Parse(ParseError::TrailingToken { .. }))
    ));
    assert!(matches!(
        evaluate("12 34"),
        Err(Error::Parse(ParseError::TrailingToken { .. }))
    ));
}

#[test]
fn evaluating_twice_gives_the_same_value() {
    let calculator = Calculator::new();
    let first = calculator.evaluate("(1.5+2)^2/7-3").unwrap();
    let second = calculator.evaluate("(1.5+2)^2/7-3").unwrap();
    assert_eq!(first.value, second.value);
    assert_eq!(first, second);
}

#[test]
fn a_failed_line_does_not_affect_the_next() {
    let calculator = Calculator::new();
    assert!(calculator.evaluate("(1+").is_err());
    assert!(calculator.evaluate("2*").is_err());
    assert_eq!(calculator.evaluate("2*3").unwrap().display, "6");
}

#[test]
fn results_are_rounded_to_ten_places() {
    assert_eq!(display("0.1 + 0.2"), "0.3");
    assert_eq!(display("1/3"), "0.3333333333");
    assert_eq!(display("2^0.5"), "1.4142135624");
}

#[test]
fn pathological_nesting_is_an_error_not_a_crash() {
    let input = format!("{}1{}", "(".repeat(10_000), ")".repeat(10_000));
    assert!(matches!(
        evaluate(&input),
        Err(Error::Parse(ParseError::NestingTooDeep { .. }))
    ));

    let wide = format!("{}1{}", "(".repeat(100_000), ")".repeat(100_000));
    assert!(matches!(
        evaluate(&wide),
        Err(Error::Parse(ParseError::NestingTooDeep { .. }))
    ));

    let negations = format!("{}1", "-".repeat(10_000));
    assert!(matches!(
        evaluate(&negations),
        Err(Error::Parse(ParseError::NestingTooDeep { .. }))
    ));
}

#[test]
fn depth_limit_comes_from_options() {
    let calculator = Calculator::with_options(Options { max_depth: 4 });
    assert!(calculator.evaluate("((((((1))))))").is_err());
    assert_eq!(calculator.evaluate("(1)").unwrap().display, "1");
}

#[test]
fn errors_render_as_diagnostics() {
    let err = evaluate("1 + .5").unwrap_err();
    let report = format!("{:?}", miette::Report::new(err));
    assert!(report.contains("digit must precede decimal point"));
}
