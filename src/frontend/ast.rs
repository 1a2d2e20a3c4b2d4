//! Syntax tree produced by the parser. The tree is never mutated once built;
//! code generation only borrows it.

use crate::frontend::lexer::Span;

#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    pub span: Span,
    pub name: String,
}

/// The root of a program is a block of top level statements
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub span: Span,
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub span: Span,
    pub kind: StatementKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StatementKind {
    VariableDeclaration(Box<VariableDeclaration>),
    FunctionDeclaration(Box<FunctionDeclaration>),
    /// Expression evaluated for its effect; contributes no code of its own
    Expression(Box<Expression>),
}

/// `int x` or `int x = 5`. Also used for function parameters, which never
/// carry an initializer.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableDeclaration {
    pub span: Span,
    pub ty: Identifier,
    pub name: Identifier,
    pub initializer: Option<Expression>,
}

/// `int add(int a, int b) { ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDeclaration {
    pub span: Span,
    pub return_type: Identifier,
    pub name: Identifier,
    pub parameters: Vec<VariableDeclaration>,
    pub body: Block,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    pub span: Span,
    pub kind: ExpressionKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionKind {
    IntegerLiteral(i64),
    DoubleLiteral(f64),
    Identifier(Identifier),
    Binary {
        lhs: Box<Expression>,
        operator: BinaryOperator,
        rhs: Box<Expression>,
    },
    Assignment {
        target: Identifier,
        value: Box<Expression>,
    },
    MethodCall {
        callee: Identifier,
        arguments: Vec<Expression>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinaryOperator {
    pub span: Span,
    pub kind: BinaryOperatorKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum BinaryOperatorKind {
    #[strum(serialize = "+")]
    Add,
    #[strum(serialize = "-")]
    Subtract,
    #[strum(serialize = "*")]
    Multiply,
    #[strum(serialize = "/")]
    Divide,
    #[strum(serialize = "==")]
    Equals,
    #[strum(serialize = "!=")]
    NotEquals,
    #[strum(serialize = "<")]
    LessThan,
    #[strum(serialize = "<=")]
    LessThanOrEqualTo,
    #[strum(serialize = ">")]
    GreaterThan,
    #[strum(serialize = ">=")]
    GreaterThanOrEqualTo,
}
