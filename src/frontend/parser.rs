use itertools::{PeekNth, peek_nth};

use crate::frontend::{
    SourceFile,
    ast::{
        BinaryOperator, BinaryOperatorKind, Block, Expression, ExpressionKind,
        FunctionDeclaration, Identifier, Statement, StatementKind, VariableDeclaration,
    },
    lexer::{Lexer, Span, Token, TokenKind},
};

/// A fatal error in the front end. Parsing stops at the first one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    pub span: Span,
}

impl ParseError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }
}

impl core::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

pub struct Parser<'source> {
    source: &'source SourceFile,
    tokens: PeekNth<std::vec::IntoIter<Token>>,
}

impl<'source> Parser<'source> {
    /// Parses a whole source file into the top level block of the program
    pub fn parse_program(source: &'source SourceFile) -> Result<Block, ParseError> {
        let mut parser = Self {
            source,
            tokens: peek_nth(Lexer::tokenize(source)?),
        };

        let mut statements = Vec::new();

        parser.skip_semicolons();

        while parser.tokens.peek().is_some() {
            statements.push(parser.parse_statement()?);
            parser.skip_semicolons();
        }

        Ok(Block {
            span: Span::new(0, source.contents.len()),
            statements,
        })
    }

    fn end_of_file(&self) -> Span {
        let length = self.source.contents.len();
        Span::new(length, length)
    }

    fn peek_kind(&mut self, n: usize) -> Option<TokenKind> {
        self.tokens.peek_nth(n).map(|token| token.kind)
    }

    fn expect_peek(&mut self, expecting: &str) -> Result<Token, ParseError> {
        let Some(token) = self.tokens.peek().copied() else {
            return Err(ParseError::new(
                format!("expected {expecting} but reached end of file"),
                self.end_of_file(),
            ));
        };

        Ok(token)
    }

    fn expect_next(&mut self, expecting: &str) -> Result<Token, ParseError> {
        let token = self.expect_peek(expecting)?;
        self.tokens.next();
        Ok(token)
    }

    fn expect_next_to_be(&mut self, kind: TokenKind, expecting: &str) -> Result<Token, ParseError> {
        let token = self.expect_next(expecting)?;

        if token.kind != kind {
            return Err(ParseError::new(
                format!(
                    "expected {expecting} but found `{}`",
                    self.source.value_of_span(token.span)
                ),
                token.span,
            ));
        }

        Ok(token)
    }

    fn skip_semicolons(&mut self) {
        while self.peek_kind(0) == Some(TokenKind::Semicolon) {
            self.tokens.next();
        }
    }

    /// Two identifiers on the same line start a declaration: `int x` or
    /// `int f(`. Across a line break they are two expression statements.
    fn at_declaration(&mut self) -> bool {
        let (Some(ty), Some(name)) = (
            self.tokens.peek_nth(0).copied(),
            self.tokens.peek_nth(1).copied(),
        ) else {
            return false;
        };

        ty.kind == TokenKind::Identifier
            && name.kind == TokenKind::Identifier
            && !name.starts_line
    }

    fn parse_identifier(&mut self, expecting: &str) -> Result<Identifier, ParseError> {
        let token = self.expect_next_to_be(TokenKind::Identifier, expecting)?;

        Ok(Identifier {
            span: token.span,
            name: self.source.value_of_span(token.span).to_owned(),
        })
    }

    fn parse_statement(&mut self) -> Result<Statement, ParseError> {
        if self.at_declaration() {
            if self.peek_kind(2) == Some(TokenKind::OpenParen) {
                let function = self.parse_function_declaration()?;

                return Ok(Statement {
                    span: function.span,
                    kind: StatementKind::FunctionDeclaration(Box::new(function)),
                });
            }

            let variable = self.parse_variable_declaration()?;

            return Ok(Statement {
                span: variable.span,
                kind: StatementKind::VariableDeclaration(Box::new(variable)),
            });
        }

        let expression = self.parse_expression()?;

        Ok(Statement {
            span: expression.span,
            kind: StatementKind::Expression(Box::new(expression)),
        })
    }

    /// type name (= expression)?
    fn parse_variable_declaration(&mut self) -> Result<VariableDeclaration, ParseError> {
        let ty = self.parse_identifier("type name")?;
        let name = self.parse_identifier("variable name")?;

        let initializer = if self.peek_kind(0) == Some(TokenKind::Equals) {
            self.tokens.next();
            Some(self.parse_expression()?)
        } else {
            None
        };

        let end = initializer.as_ref().map_or(name.span, |e| e.span);

        Ok(VariableDeclaration {
            span: ty.span.to(end),
            ty,
            name,
            initializer,
        })
    }

    /// type name(type name, ...) { ... }
    fn parse_function_declaration(&mut self) -> Result<FunctionDeclaration, ParseError> {
        let return_type = self.parse_identifier("return type")?;
        let name = self.parse_identifier("function name")?;

        self.expect_next_to_be(TokenKind::OpenParen, "`(`")?;

        let mut parameters = Vec::new();

        if self.expect_peek("parameter or `)`")?.kind != TokenKind::CloseParen {
            loop {
                let parameter = self.parse_variable_declaration()?;

                if let Some(initializer) = &parameter.initializer {
                    return Err(ParseError::new(
                        "function parameters may not have initializers",
                        initializer.span,
                    ));
                }

                parameters.push(parameter);

                if self.expect_peek("`,` or `)`")?.kind != TokenKind::Comma {
                    break;
                }

                self.tokens.next();
            }
        }

        self.expect_next_to_be(TokenKind::CloseParen, "`)`")?;

        let body = self.parse_block()?;

        Ok(FunctionDeclaration {
            span: return_type.span.to(body.span),
            return_type,
            name,
            parameters,
            body,
        })
    }

    fn parse_block(&mut self) -> Result<Block, ParseError> {
        let open = self.expect_next_to_be(TokenKind::OpenBrace, "`{`")?;
        let mut statements = Vec::new();

        self.skip_semicolons();

        while self.expect_peek("statement or `}`")?.kind != TokenKind::CloseBrace {
            statements.push(self.parse_statement()?);
            self.skip_semicolons();
        }

        let close = self.expect_next_to_be(TokenKind::CloseBrace, "`}`")?;

        Ok(Block {
            span: open.span.to(close.span),
            statements,
        })
    }

    fn parse_expression(&mut self) -> Result<Expression, ParseError> {
        // Assignment is right associative and binds the loosest
        if self.peek_kind(0) == Some(TokenKind::Identifier)
            && self.peek_kind(1) == Some(TokenKind::Equals)
        {
            let target = self.parse_identifier("assignment target")?;
            self.tokens.next();
            let value = self.parse_expression()?;

            return Ok(Expression {
                span: target.span.to(value.span),
                kind: ExpressionKind::Assignment {
                    target,
                    value: Box::new(value),
                },
            });
        }

        self.parse_comparison_expression()
    }

    fn parse_binary_level(
        &mut self,
        is_operator: fn(&TokenKind) -> bool,
        next_level: fn(&mut Self) -> Result<Expression, ParseError>,
    ) -> Result<Expression, ParseError> {
        let mut expression = next_level(self)?;

        while self.peek_kind(0).is_some_and(|kind| is_operator(&kind)) {
            let operator = self.parse_binary_operator()?;
            let rhs = next_level(self)?;

            expression = Expression {
                span: expression.span.to(rhs.span),
                kind: ExpressionKind::Binary {
                    lhs: Box::new(expression),
                    operator,
                    rhs: Box::new(rhs),
                },
            };
        }

        Ok(expression)
    }

    fn parse_comparison_expression(&mut self) -> Result<Expression, ParseError> {
        self.parse_binary_level(
            TokenKind::is_comparison_operator,
            Self::parse_term_expression,
        )
    }

    fn parse_term_expression(&mut self) -> Result<Expression, ParseError> {
        self.parse_binary_level(TokenKind::is_term_operator, Self::parse_factor_expression)
    }

    fn parse_factor_expression(&mut self) -> Result<Expression, ParseError> {
        self.parse_binary_level(
            TokenKind::is_factor_operator,
            Self::parse_primary_expression,
        )
    }

    fn parse_binary_operator(&mut self) -> Result<BinaryOperator, ParseError> {
        let operator = self.expect_next("binary operator")?;

        let kind = match operator.kind {
            TokenKind::Plus => BinaryOperatorKind::Add,
            TokenKind::Minus => BinaryOperatorKind::Subtract,
            TokenKind::Asterisk => BinaryOperatorKind::Multiply,
            TokenKind::Divide => BinaryOperatorKind::Divide,
            TokenKind::DoubleEquals => BinaryOperatorKind::Equals,
            TokenKind::NotEquals => BinaryOperatorKind::NotEquals,
            TokenKind::LessThan => BinaryOperatorKind::LessThan,
            TokenKind::LessThanOrEqualTo => BinaryOperatorKind::LessThanOrEqualTo,
            TokenKind::GreaterThan => BinaryOperatorKind::GreaterThan,
            TokenKind::GreaterThanOrEqualTo => BinaryOperatorKind::GreaterThanOrEqualTo,
            _ => {
                return Err(ParseError::new(
                    format!(
                        "expected binary operator but found `{}`",
                        self.source.value_of_span(operator.span)
                    ),
                    operator.span,
                ));
            }
        };

        Ok(BinaryOperator {
            span: operator.span,
            kind,
        })
    }

    fn parse_primary_expression(&mut self) -> Result<Expression, ParseError> {
        let token = self.expect_peek("expression")?;

        match token.kind {
            TokenKind::Identifier if self.peek_kind(1) == Some(TokenKind::OpenParen) => {
                self.parse_method_call()
            }
            TokenKind::Identifier => {
                let identifier = self.parse_identifier("identifier")?;

                Ok(Expression {
                    span: identifier.span,
                    kind: ExpressionKind::Identifier(identifier),
                })
            }
            TokenKind::IntegerLiteral => {
                self.tokens.next();
                let text = self.source.value_of_span(token.span);
                let value = text.parse::<i64>().map_err(|_| {
                    ParseError::new(
                        format!("integer literal `{text}` does not fit in 64 bits"),
                        token.span,
                    )
                })?;

                Ok(Expression {
                    span: token.span,
                    kind: ExpressionKind::IntegerLiteral(value),
                })
            }
            TokenKind::FloatLiteral => {
                self.tokens.next();
                let text = self.source.value_of_span(token.span);
                let value = text.parse::<f64>().map_err(|_| {
                    ParseError::new(format!("malformed float literal `{text}`"), token.span)
                })?;

                Ok(Expression {
                    span: token.span,
                    kind: ExpressionKind::DoubleLiteral(value),
                })
            }
            TokenKind::OpenParen => {
                self.tokens.next();
                let mut inner = self.parse_expression()?;
                let close = self.expect_next_to_be(TokenKind::CloseParen, "`)`")?;

                inner.span = token.span.to(close.span);
                Ok(inner)
            }
            _ => Err(ParseError::new(
                format!(
                    "expected expression but found `{}`",
                    self.source.value_of_span(token.span)
                ),
                token.span,
            )),
        }
    }

    /// name(expression, ...)
    fn parse_method_call(&mut self) -> Result<Expression, ParseError> {
        let callee = self.parse_identifier("function name")?;
        self.expect_next_to_be(TokenKind::OpenParen, "`(`")?;

        let mut arguments = Vec::new();

        if self.expect_peek("argument or `)`")?.kind != TokenKind::CloseParen {
            loop {
                arguments.push(self.parse_expression()?);

                if self.expect_peek("`,` or `)`")?.kind != TokenKind::Comma {
                    break;
                }

                self.tokens.next();
            }
        }

        let close = self.expect_next_to_be(TokenKind::CloseParen, "`)`")?;

        Ok(Expression {
            span: callee.span.to(close.span),
            kind: ExpressionKind::MethodCall { callee, arguments },
        })
    }
}
