use crate::frontend::{ast::BinaryOperatorKind, lexer::Span};

/// Reason code generation stopped. The module built so far must not be used.
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationError {
    pub kind: TranslationErrorKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TranslationErrorKind {
    /// A variable was read or assigned without being declared in the current
    /// function
    UndeclaredVariable(String),
    UndeclaredFunction(String),
    /// Only `+ - * /` can be lowered
    UnsupportedOperator(BinaryOperatorKind),
    /// An expression without a value (e.g. a call to a `void` function) was
    /// used where a value is required
    VoidValue,
}

impl TranslationError {
    pub fn new(kind: TranslationErrorKind, span: Span) -> Self {
        Self { kind, span }
    }
}

impl core::fmt::Display for TranslationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            TranslationErrorKind::UndeclaredVariable(name) => {
                write!(f, "undeclared variable `{name}`")
            }
            TranslationErrorKind::UndeclaredFunction(name) => {
                write!(f, "no such function `{name}`")
            }
            TranslationErrorKind::UnsupportedOperator(operator) => {
                write!(f, "unsupported binary operator `{operator}`")
            }
            TranslationErrorKind::VoidValue => {
                write!(f, "expression does not produce a value")
            }
        }
    }
}
