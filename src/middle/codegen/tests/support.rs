#![cfg(test)]

//! Builders for syntax trees and contexts used by the code generation tests.
//! Nodes get an empty span unless a test cares about where an error points.

use crate::{
    frontend::{
        ast::{
            BinaryOperator, BinaryOperatorKind, Block, Expression, ExpressionKind,
            FunctionDeclaration, Identifier, Statement, StatementKind, VariableDeclaration,
        },
        lexer::Span,
    },
    middle::{
        codegen::context::{EmissionPoint, GenerationContext},
        lir::{Instruction, Type},
    },
};

pub(super) fn identifier(name: &str) -> Identifier {
    Identifier {
        span: Span::default(),
        name: name.to_owned(),
    }
}

fn expression(kind: ExpressionKind) -> Expression {
    Expression {
        span: Span::default(),
        kind,
    }
}

pub(super) fn int(value: i64) -> Expression {
    expression(ExpressionKind::IntegerLiteral(value))
}

pub(super) fn double(value: f64) -> Expression {
    expression(ExpressionKind::DoubleLiteral(value))
}

pub(super) fn variable(name: &str) -> Expression {
    expression(ExpressionKind::Identifier(identifier(name)))
}

pub(super) fn binary(lhs: Expression, kind: BinaryOperatorKind, rhs: Expression) -> Expression {
    expression(ExpressionKind::Binary {
        lhs: Box::new(lhs),
        operator: BinaryOperator {
            span: Span::default(),
            kind,
        },
        rhs: Box::new(rhs),
    })
}

pub(super) fn assign(target: &str, value: Expression) -> Expression {
    expression(ExpressionKind::Assignment {
        target: identifier(target),
        value: Box::new(value),
    })
}

pub(super) fn call(callee: &str, arguments: Vec<Expression>) -> Expression {
    expression(ExpressionKind::MethodCall {
        callee: identifier(callee),
        arguments,
    })
}

pub(super) fn declaration(
    ty: &str,
    name: &str,
    initializer: Option<Expression>,
) -> VariableDeclaration {
    VariableDeclaration {
        span: Span::default(),
        ty: identifier(ty),
        name: identifier(name),
        initializer,
    }
}

fn statement(kind: StatementKind) -> Statement {
    Statement {
        span: Span::default(),
        kind,
    }
}

pub(super) fn declare(ty: &str, name: &str, initializer: Option<Expression>) -> Statement {
    statement(StatementKind::VariableDeclaration(Box::new(declaration(
        ty,
        name,
        initializer,
    ))))
}

pub(super) fn evaluate(expression: Expression) -> Statement {
    statement(StatementKind::Expression(Box::new(expression)))
}

pub(super) fn function(
    return_type: &str,
    name: &str,
    parameters: &[(&str, &str)],
    body: Vec<Statement>,
) -> Statement {
    statement(StatementKind::FunctionDeclaration(Box::new(
        FunctionDeclaration {
            span: Span::default(),
            return_type: identifier(return_type),
            name: identifier(name),
            parameters: parameters
                .iter()
                .map(|(ty, name)| declaration(ty, name, None))
                .collect(),
            body: block(body),
        },
    )))
}

pub(super) fn block(statements: Vec<Statement>) -> Block {
    Block {
        span: Span::default(),
        statements,
    }
}

/// Declares a parameterless function with an entry block and opens a scope
/// emitting into it
pub(super) fn open_function(context: &mut GenerationContext, name: &str) -> EmissionPoint {
    let function = context.module_mut().declare_function(name, Type::Void, &[]);
    let block = context.module_mut().function_mut(function).create_block();
    let emission_point = EmissionPoint { function, block };

    context.enter_scope(emission_point);

    emission_point
}

/// A context with one open function scope named `test`
pub(super) fn test_context() -> (GenerationContext, EmissionPoint) {
    let mut context = GenerationContext::new("test");
    let emission_point = open_function(&mut context, "test");

    (context, emission_point)
}

pub(super) fn instructions(
    context: &GenerationContext,
    emission_point: EmissionPoint,
) -> Vec<Instruction> {
    context.module().function(emission_point.function).blocks[emission_point.block]
        .instructions
        .clone()
}
