#![cfg(test)]

use crate::frontend::{
    SourceFile,
    ast::{BinaryOperatorKind, Block, Expression, ExpressionKind, StatementKind},
    lexer::Span,
    parser::{ParseError, Parser},
};

fn parse(text: &str) -> Block {
    Parser::parse_program(&SourceFile::from_memory(text)).unwrap()
}

fn parse_error(text: &str) -> ParseError {
    Parser::parse_program(&SourceFile::from_memory(text)).unwrap_err()
}

fn parse_expression(text: &str) -> Expression {
    let mut program = parse(text);
    assert_eq!(program.statements.len(), 1);

    match program.statements.remove(0).kind {
        StatementKind::Expression(expression) => *expression,
        kind => panic!("expected an expression statement but got {kind:?}"),
    }
}

fn binary_parts(expression: &Expression) -> (&Expression, BinaryOperatorKind, &Expression) {
    match &expression.kind {
        ExpressionKind::Binary { lhs, operator, rhs } => (&**lhs, operator.kind, &**rhs),
        kind => panic!("expected a binary expression but got {kind:?}"),
    }
}

#[test]
fn multiplication_binds_tighter_than_addition() {
    let expression = parse_expression("1 + 2 * 3");

    let (lhs, operator, rhs) = binary_parts(&expression);
    assert_eq!(operator, BinaryOperatorKind::Add);
    assert_eq!(lhs.kind, ExpressionKind::IntegerLiteral(1));

    let (_, operator, _) = binary_parts(rhs);
    assert_eq!(operator, BinaryOperatorKind::Multiply);
}

#[test]
fn binary_operators_are_left_associative() {
    let expression = parse_expression("8 - 4 - 2");

    let (lhs, operator, rhs) = binary_parts(&expression);
    assert_eq!(operator, BinaryOperatorKind::Subtract);
    assert_eq!(rhs.kind, ExpressionKind::IntegerLiteral(2));

    let (inner_lhs, _, inner_rhs) = binary_parts(lhs);
    assert_eq!(inner_lhs.kind, ExpressionKind::IntegerLiteral(8));
    assert_eq!(inner_rhs.kind, ExpressionKind::IntegerLiteral(4));
}

#[test]
fn comparisons_bind_loosest() {
    let expression = parse_expression("a + 1 < b");

    let (lhs, operator, _) = binary_parts(&expression);
    assert_eq!(operator, BinaryOperatorKind::LessThan);
    assert_eq!(binary_parts(lhs).1, BinaryOperatorKind::Add);
}

#[test]
fn parentheses_override_precedence() {
    let expression = parse_expression("(1 + 2) * 3");

    let (lhs, operator, _) = binary_parts(&expression);
    assert_eq!(operator, BinaryOperatorKind::Multiply);
    assert_eq!(binary_parts(lhs).1, BinaryOperatorKind::Add);
    assert_eq!(lhs.span, Span::new(0, 7));
}

#[test]
fn assignment_is_right_associative() {
    let expression = parse_expression("a = b = 3");

    let ExpressionKind::Assignment { target, value } = &expression.kind else {
        panic!("expected an assignment but got {:?}", expression.kind);
    };
    assert_eq!(target.name, "a");

    let ExpressionKind::Assignment { target, value } = &value.kind else {
        panic!("expected a nested assignment but got {:?}", value.kind);
    };
    assert_eq!(target.name, "b");
    assert_eq!(value.kind, ExpressionKind::IntegerLiteral(3));
}

#[test]
fn parses_calls_with_nested_arguments() {
    let expression = parse_expression("f(1, g(), 2.5)");

    let ExpressionKind::MethodCall { callee, arguments } = &expression.kind else {
        panic!("expected a call but got {:?}", expression.kind);
    };
    assert_eq!(callee.name, "f");
    assert_eq!(arguments.len(), 3);
    assert!(matches!(
        &arguments[1].kind,
        ExpressionKind::MethodCall { callee, arguments }
            if callee.name == "g" && arguments.is_empty()
    ));
    assert_eq!(arguments[2].kind, ExpressionKind::DoubleLiteral(2.5));
}

#[test]
fn parses_variable_declarations() {
    let program = parse("double d\nint x = 5");
    assert_eq!(program.statements.len(), 2);

    let StatementKind::VariableDeclaration(uninitialized) = &program.statements[0].kind else {
        panic!("expected a declaration");
    };
    assert_eq!(uninitialized.ty.name, "double");
    assert_eq!(uninitialized.name.name, "d");
    assert!(uninitialized.initializer.is_none());

    let StatementKind::VariableDeclaration(initialized) = &program.statements[1].kind else {
        panic!("expected a declaration");
    };
    assert_eq!(
        initialized.initializer.as_ref().map(|e| &e.kind),
        Some(&ExpressionKind::IntegerLiteral(5))
    );
    assert_eq!(initialized.span, Span::new(9, 18));
}

#[test]
fn parses_function_declarations() {
    let program = parse("int add(int a, int b) { a + b; }");

    let StatementKind::FunctionDeclaration(function) = &program.statements[0].kind else {
        panic!("expected a function declaration");
    };
    assert_eq!(function.return_type.name, "int");
    assert_eq!(function.name.name, "add");

    let parameters = function
        .parameters
        .iter()
        .map(|parameter| (parameter.ty.name.as_str(), parameter.name.name.as_str()))
        .collect::<Vec<_>>();
    assert_eq!(parameters, [("int", "a"), ("int", "b")]);

    assert_eq!(function.body.statements.len(), 1);
    assert_eq!(function.span, Span::new(0, 32));
}

#[test]
fn semicolons_are_optional_separators() {
    let program = parse(";int x = 1;; x\nx = 2;");

    assert_eq!(program.statements.len(), 3);
    assert_eq!(program.span, Span::new(0, 21));
}

#[test]
fn line_break_separates_an_identifier_from_a_following_statement() {
    let program = parse("int a = 1\na\na = 2");

    let kinds = program
        .statements
        .iter()
        .map(|statement| &statement.kind)
        .collect::<Vec<_>>();
    assert_eq!(kinds.len(), 3);
    assert!(matches!(kinds[0], StatementKind::VariableDeclaration(_)));
    assert!(matches!(
        kinds[1],
        StatementKind::Expression(expression)
            if matches!(&expression.kind, ExpressionKind::Identifier(name) if name.name == "a")
    ));
    assert!(matches!(
        kinds[2],
        StatementKind::Expression(expression)
            if matches!(expression.kind, ExpressionKind::Assignment { .. })
    ));
}

#[test]
fn declaration_needs_type_and_name_on_one_line() {
    let program = parse("int\nx");

    assert_eq!(program.statements.len(), 2);
    assert!(
        program
            .statements
            .iter()
            .all(|statement| matches!(statement.kind, StatementKind::Expression(_)))
    );
}

#[test]
fn empty_program_is_an_empty_block() {
    let program = parse("  // nothing\n");

    assert!(program.statements.is_empty());
}

#[test]
fn rejects_parameter_initializers() {
    let error = parse_error("int f(int a = 1) {}");

    assert_eq!(error.message, "function parameters may not have initializers");
    assert_eq!(error.span, Span::new(14, 15));
}

#[test]
fn reports_unexpected_end_of_file() {
    let error = parse_error("int x =");

    assert_eq!(error.message, "expected expression but reached end of file");
    assert_eq!(error.span, Span::new(7, 7));
}

#[test]
fn reports_unexpected_tokens() {
    assert_eq!(parse_error("f(1 2)").message, "expected `)` but found `2`");
    assert_eq!(parse_error(")").message, "expected expression but found `)`");
    assert_eq!(
        parse_error("int f(int a {}").message,
        "expected `)` but found `{`"
    );
}

#[test]
fn rejects_integer_literals_wider_than_64_bits() {
    let error = parse_error("99999999999999999999");

    assert_eq!(
        error.message,
        "integer literal `99999999999999999999` does not fit in 64 bits"
    );
}
