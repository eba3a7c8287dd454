use crate::ast::{AggregateKind, BinaryOp, Expr, Parameter, Program, UnaryOp};
use crate::error::{CalcError, Span};
use crate::lexer::{Token, TokenType};
use crate::value;
use crate::value::Complex;

use std::collections::HashSet;

/// Operator sets for the generic binary-operation loop. The adjacency kinds
/// (`(`, identifier, keyword) stand for an implicit multiplication: the token
/// itself begins the right operand, so no operator token is consumed.
const ADD_OPS: &[TokenType] = &[TokenType::Plus, TokenType::Minus];
const MUL_OPS: &[TokenType] = &[TokenType::Star, TokenType::Slash, TokenType::SlashSlash];
const IMPLICIT_OPS: &[TokenType] = &[
    TokenType::LeftParen,
    TokenType::Identifier,
    TokenType::Keyword,
];
const POW_OPS: &[TokenType] = &[TokenType::Caret];

pub struct Parser {
    tokens: Vec<Token>,
    current: usize,

    /// Global variable names known to the session, extended by assignments
    /// parsed in this input. Distinguishes `x(x+1)` (multiplication when `x`
    /// is a variable) from a function call.
    known_vars: HashSet<String>,

    /// Parameter names of the function definition (or aggregation) being
    /// parsed; identifiers in this set resolve to the local scope.
    param_names: HashSet<String>,

    /// Name of the function definition being parsed, for error messages.
    fn_name: Option<String>,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            current: 0,
            known_vars: HashSet::new(),
            param_names: HashSet::new(),
            fn_name: None,
        }
    }

    /// Seeds the set of global variable names, usually from the session's
    /// symbol table.
    pub fn with_known_variables(mut self, vars: HashSet<String>) -> Self {
        self.known_vars = vars;
        self
    }

    pub fn parse(&mut self) -> Result<Program, CalcError> {
        let mut statements = Vec::new();

        while !self.is_at_end() {
            if self.check(&TokenType::StatementEnd) {
                self.advance();
                continue;
            }

            let statement = if self.check_keyword(&["fn"]) {
                self.func_def()?
            } else {
                self.assignment()?
            };
            statements.push(statement);

            if !self.check(&TokenType::StatementEnd) && !self.is_at_end() {
                return Err(CalcError::syntax_error_with_help(
                    self.peek().span.clone(),
                    format!("Expected end of statement, found '{}'", self.peek().lexeme),
                    "Statements are separated by ';' or a newline.".to_string(),
                ));
            }

            if self.check(&TokenType::StatementEnd) {
                self.advance();
            }
        }

        Ok(Program { statements })
    }

    /// `IDENT '=' assignment`, right-associative so `x = y = 1` chains.
    /// Anything else falls through to an additive expression.
    fn assignment(&mut self) -> Result<Expr, CalcError> {
        if !self.check(&TokenType::Identifier) || !self.check_next(&TokenType::Equal) {
            return self.plus_minus();
        }

        let name_token = self.peek().clone();
        let name = name_token.lexeme;

        self.advance(); // identifier
        self.advance(); // equals

        let value = self.assignment()?;
        let span = Span::new(name_token.span.start, value.span().end);

        self.known_vars.insert(name.clone());
        Ok(Expr::Assign {
            name,
            value: Box::new(value),
            span,
        })
    }

    fn plus_minus(&mut self) -> Result<Expr, CalcError> {
        self.bin_op(Self::multi_div, Self::multi_div, ADD_OPS)
    }

    fn multi_div(&mut self) -> Result<Expr, CalcError> {
        self.bin_op(Self::implicit_mul, Self::implicit_mul, MUL_OPS)
    }

    /// An identifier, `(` or keyword directly following an expression binds
    /// as multiplication, tighter than explicit `*` and `/`.
    fn implicit_mul(&mut self) -> Result<Expr, CalcError> {
        self.bin_op(Self::unary_sign, Self::unary_sign, IMPLICIT_OPS)
    }

    fn unary_sign(&mut self) -> Result<Expr, CalcError> {
        let operator = match self.peek().token_type {
            TokenType::Plus => UnaryOp::Plus,
            TokenType::Minus => UnaryOp::Negate,
            TokenType::Tilde => UnaryOp::Conjugate,
            _ => return self.power(),
        };

        let start = self.peek().span.start;
        self.advance();
        let operand = self.unary_sign()?;
        let span = Span::new(start, operand.span().end);

        Ok(Expr::Unary {
            operator,
            operand: Box::new(operand),
            span,
        })
    }

    /// Right-associative `^`: the right operand re-enters at the unary-sign
    /// level, which descends back through `power`.
    fn power(&mut self) -> Result<Expr, CalcError> {
        self.bin_op(Self::atom_fi, Self::unary_sign, POW_OPS)
    }

    /// The generic binary-operation loop: parse a left operand, then fold
    /// right operands while the current token is one of `ops`. Operator
    /// tokens are consumed; adjacency kinds synthesize a multiplication
    /// without consuming, since the adjacency itself is the operator.
    fn bin_op(
        &mut self,
        left_fn: fn(&mut Self) -> Result<Expr, CalcError>,
        right_fn: fn(&mut Self) -> Result<Expr, CalcError>,
        ops: &[TokenType],
    ) -> Result<Expr, CalcError> {
        let mut expr = left_fn(self)?;

        while ops.contains(&self.peek().token_type) {
            let operator = match self.peek().token_type {
                TokenType::Plus => BinaryOp::Add,
                TokenType::Minus => BinaryOp::Subtract,
                TokenType::Star => BinaryOp::Multiply,
                TokenType::Slash => BinaryOp::Divide,
                TokenType::SlashSlash => BinaryOp::IntDivide,
                TokenType::Caret => BinaryOp::Power,
                TokenType::LeftParen | TokenType::Identifier | TokenType::Keyword => {
                    BinaryOp::Multiply
                }
                _ => unreachable!(),
            };

            // Explicit operators are consumed; implicit multiplication leaves
            // the token to start the right operand.
            if !matches!(
                self.peek().token_type,
                TokenType::LeftParen | TokenType::Identifier | TokenType::Keyword
            ) {
                self.advance();
            }

            let right = right_fn(self)?;
            let span = Span::new(expr.span().start, right.span().end);

            expr = Expr::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
                span,
            };
        }

        Ok(expr)
    }

    /// An atom with an optional trailing `i`, which multiplies by the
    /// imaginary unit: `3i`, `(1+2)i`, `x^2i`.
    fn atom_fi(&mut self) -> Result<Expr, CalcError> {
        let mut expr = self.atom_f()?;

        if self.check_keyword(&["i"]) {
            let i_token = self.peek().clone();
            let span = Span::new(expr.span().start, i_token.span.end);

            expr = Expr::Binary {
                left: Box::new(expr),
                operator: BinaryOp::Multiply,
                right: Box::new(Expr::Number {
                    value: value::I,
                    span: i_token.span,
                }),
                span,
            };
            self.advance();
        }

        Ok(expr)
    }

    /// An atom with an optional factorial suffix.
    fn atom_f(&mut self) -> Result<Expr, CalcError> {
        let mut expr = self.atom()?;

        if self.check(&TokenType::Bang) {
            let span = Span::new(expr.span().start, self.peek().span.end);
            expr = Expr::Unary {
                operator: UnaryOp::Factorial,
                operand: Box::new(expr),
                span,
            };
            self.advance();
        }

        Ok(expr)
    }

    fn atom(&mut self) -> Result<Expr, CalcError> {
        let token = self.peek().clone();

        match token.token_type {
            TokenType::Number => {
                let parsed = token.lexeme.parse::<f64>().map_err(|_| {
                    CalcError::syntax_error(token.span.clone(), "Invalid number".to_string())
                })?;
                self.advance();
                Ok(Expr::Number {
                    value: Complex::real(parsed),
                    span: token.span,
                })
            }
            TokenType::LeftParen => {
                self.advance();
                let expr = self.plus_minus()?;
                self.consume_with_help(
                    TokenType::RightParen,
                    "Expected ')' after expression",
                    "Every opening parenthesis '(' must have a matching closing parenthesis ')'."
                        .to_string(),
                )?;
                Ok(expr)
            }
            TokenType::Pipe => {
                self.advance();
                let expr = self.plus_minus()?;
                let end_token = self.consume_with_help(
                    TokenType::Pipe,
                    "Expected '|' to close the absolute value",
                    "Absolute values are written between pipes: |x - 1|.".to_string(),
                )?;
                let span = Span::new(token.span.start, end_token.span.end);

                Ok(Expr::Unary {
                    operator: UnaryOp::Abs,
                    operand: Box::new(expr),
                    span,
                })
            }
            TokenType::Identifier => self.var_or_call(),
            TokenType::Keyword => self.keyword_expr(),
            _ => {
                let help_msg = match token.token_type {
                    TokenType::RightParen => {
                        "Found ')' without matching '('. Check for unbalanced parentheses."
                    }
                    TokenType::Eof | TokenType::StatementEnd => {
                        "Reached the end of the statement while expecting an expression."
                    }
                    _ => "Expected a number, a variable, a function call or a parenthesized expression here.",
                };

                Err(CalcError::syntax_error_with_help(
                    token.span,
                    format!("Expected expression, found '{}'", token.lexeme),
                    help_msg.to_string(),
                ))
            }
        }
    }

    /// A bare identifier, or a call when followed by `(` and the name is not
    /// a known variable. `x(x+1)` with `x` bound reads as multiplication.
    fn var_or_call(&mut self) -> Result<Expr, CalcError> {
        let token = self.peek().clone();
        let name = token.lexeme.clone();
        self.advance();

        if self.param_names.contains(&name) || self.known_vars.contains(&name) {
            return Ok(Expr::Identifier {
                name,
                span: token.span,
            });
        }

        if !self.check(&TokenType::LeftParen) {
            return Ok(Expr::Identifier {
                name,
                span: token.span,
            });
        }
        self.advance();

        let mut args = Vec::new();
        while !self.check(&TokenType::RightParen) && !self.is_at_end() {
            args.push(self.plus_minus()?);

            if self.check(&TokenType::RightParen) || self.is_at_end() {
                continue;
            }

            self.consume_with_help(
                TokenType::Comma,
                "Expected ',' between arguments",
                "Function arguments are separated by commas: f(1, 2).".to_string(),
            )?;
        }

        if self.is_at_end() {
            return Err(CalcError::syntax_error(
                self.peek().span.clone(),
                "Expected ')' after arguments".to_string(),
            ));
        }

        if self.previous_is(&TokenType::Comma) {
            return Err(CalcError::syntax_error(
                self.peek().span.clone(),
                "Expression expected after ','".to_string(),
            ));
        }

        let paren = self.advance().clone();

        Ok(Expr::Call {
            name,
            args,
            span: Span::new(token.span.start, paren.span.end),
        })
    }

    fn keyword_expr(&mut self) -> Result<Expr, CalcError> {
        let token = self.peek().clone();

        if self.check_keyword(&["sum", "\u{03A3}"]) {
            return self.sigma_pi(AggregateKind::Sum);
        }

        if self.check_keyword(&["product", "\u{03A0}"]) {
            return self.sigma_pi(AggregateKind::Product);
        }

        let value = if self.check_keyword(&["pi", "\u{03C0}"]) {
            value::PI
        } else if self.check_keyword(&["e"]) {
            value::E
        } else if self.check_keyword(&["i"]) {
            value::I
        } else {
            return Err(CalcError::syntax_error(
                token.span,
                format!("Unexpected keyword: '{}'", token.lexeme),
            ));
        };

        self.advance();
        Ok(Expr::Number {
            value,
            span: token.span,
        })
    }

    /// `fn name(params) native` or `fn name(params) = body`. Parameter names
    /// go into the working set so the body can tell locals from globals.
    fn func_def(&mut self) -> Result<Expr, CalcError> {
        let start = self.peek().span.start;
        self.advance(); // fn

        if !self.check(&TokenType::Identifier) {
            return Err(CalcError::syntax_error(
                self.peek().span.clone(),
                format!("Function name expected, found '{}'", self.peek().lexeme),
            ));
        }
        let name = self.peek().lexeme.clone();
        self.fn_name = Some(name.clone());
        self.advance();

        self.consume(TokenType::LeftParen, "Expected '(' after function name")?;

        let params = self.parameter_list(&name);
        // The working set must be cleared on the error path too, so the next
        // statement's identifiers resolve globally again.
        let params = match params {
            Ok(params) => params,
            Err(e) => {
                self.clean_up();
                return Err(e);
            }
        };

        if self.check_keyword(&["native"]) {
            let end = self.peek().span.end;
            self.advance();
            self.clean_up();

            return Ok(Expr::FuncDef {
                name,
                params,
                body: None,
                span: Span::new(start, end),
            });
        }

        let result = match self.consume_with_help(
            TokenType::Equal,
            "Expected '=' before function body",
            "Function definitions are written 'fn name(params) = body' or 'fn name(params) native'."
                .to_string(),
        ) {
            Ok(_) => self.plus_minus(),
            Err(e) => Err(e),
        };
        self.clean_up();
        let body = result?;

        let span = Span::new(start, body.span().end);
        Ok(Expr::FuncDef {
            name,
            params,
            body: Some(Box::new(body)),
            span,
        })
    }

    fn parameter_list(&mut self, fn_name: &str) -> Result<Vec<Parameter>, CalcError> {
        let mut params = Vec::new();
        let mut has_default = false;

        while !self.check(&TokenType::RightParen) && !self.is_at_end() {
            if !self.check(&TokenType::Identifier) {
                return Err(CalcError::syntax_error(
                    self.peek().span.clone(),
                    format!("Parameter name expected, found '{}'", self.peek().lexeme),
                ));
            }

            let param_token = self.peek().clone();
            let param_name = param_token.lexeme;

            if self.param_names.contains(&param_name) {
                return Err(CalcError::redefinition(
                    param_token.span,
                    format!("Parameter '{}' is already defined", param_name),
                ));
            }
            self.param_names.insert(param_name.clone());
            self.advance();

            let default = if self.check(&TokenType::Equal) {
                self.advance();
                Some(self.plus_minus()?)
            } else {
                None
            };

            if has_default && default.is_none() {
                return Err(CalcError::parameter_order(
                    param_token.span,
                    format!(
                        "Required parameter '{}' after an optional one in function '{}'",
                        param_name, fn_name
                    ),
                ));
            }
            has_default = has_default || default.is_some();

            params.push(Parameter::new(param_name, default));

            if self.check(&TokenType::RightParen) || self.is_at_end() {
                continue;
            }

            self.consume_with_help(
                TokenType::Comma,
                "Expected ',' between parameters",
                "Parameters are separated by commas: fn f(x, y = 1).".to_string(),
            )?;
        }

        if self.is_at_end() {
            return Err(CalcError::syntax_error(
                self.peek().span.clone(),
                "Expected ')' after parameters".to_string(),
            ));
        }

        if self.previous_is(&TokenType::Comma) {
            return Err(CalcError::syntax_error(
                self.peek().span.clone(),
                "Parameter expected after ','".to_string(),
            ));
        }
        self.advance();

        Ok(params)
    }

    /// `sum(var = init, upper, body)` / `product(...)`. The bound variable
    /// joins the working set for the duration of the three sub-expressions.
    fn sigma_pi(&mut self, kind: AggregateKind) -> Result<Expr, CalcError> {
        let start = self.peek().span.start;
        self.advance(); // sum | product

        self.consume(TokenType::LeftParen, "Expected '(' after 'sum' or 'product'")?;

        if !self.check(&TokenType::Identifier) {
            return Err(CalcError::syntax_error(
                self.peek().span.clone(),
                format!("Expected variable name, found '{}'", self.peek().lexeme),
            ));
        }

        let var_token = self.peek().clone();
        let var = var_token.lexeme;

        if self.param_names.contains(&var) {
            return Err(CalcError::redefinition(
                var_token.span,
                format!("Variable '{}' is already defined", var),
            ));
        }
        self.param_names.insert(var.clone());
        self.advance();

        let result = (|| {
            self.consume_with_help(
                TokenType::Equal,
                "Expected '=' after the bound variable",
                "Aggregations are written sum(k = 1, 10, k) or product(k = 1, 10, k).".to_string(),
            )?;

            let init = self.plus_minus()?;
            self.consume(TokenType::Comma, "Expected ',' after the initial value")?;

            let upper = self.plus_minus()?;
            self.consume(TokenType::Comma, "Expected ',' after the upper bound")?;

            let body = self.plus_minus()?;
            let end_token = self.consume(TokenType::RightParen, "Expected ')' after the body")?;
            let end = end_token.span.end;

            Ok((init, upper, body, end))
        })();
        self.param_names.remove(&var);
        let (init, upper, body, end) = result?;

        Ok(Expr::SigmaPi {
            kind,
            var,
            init: Box::new(init),
            upper: Box::new(upper),
            body: Box::new(body),
            span: Span::new(start, end),
        })
    }

    fn check(&self, token_type: &TokenType) -> bool {
        if self.is_at_end() {
            false
        } else {
            &self.peek().token_type == token_type
        }
    }

    fn check_next(&self, token_type: &TokenType) -> bool {
        if self.current + 1 >= self.tokens.len() {
            return false;
        }
        &self.tokens[self.current + 1].token_type == token_type
    }

    fn check_keyword(&self, names: &[&str]) -> bool {
        self.check(&TokenType::Keyword) && names.contains(&self.peek().lexeme.as_str())
    }

    fn previous_is(&self, token_type: &TokenType) -> bool {
        self.current > 0 && &self.tokens[self.current - 1].token_type == token_type
    }

    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }

    fn is_at_end(&self) -> bool {
        self.peek().token_type == TokenType::Eof
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current - 1]
    }

    fn clean_up(&mut self) {
        self.param_names.clear();
        self.fn_name = None;
    }

    fn consume(&mut self, token_type: TokenType, message: &str) -> Result<&Token, CalcError> {
        if self.check(&token_type) {
            Ok(self.advance())
        } else {
            Err(CalcError::syntax_error(
                self.error_span(),
                message.to_string(),
            ))
        }
    }

    fn consume_with_help(
        &mut self,
        token_type: TokenType,
        message: &str,
        help: String,
    ) -> Result<&Token, CalcError> {
        if self.check(&token_type) {
            Ok(self.advance())
        } else {
            Err(CalcError::syntax_error_with_help(
                self.error_span(),
                message.to_string(),
                help,
            ))
        }
    }

    /// At end of input, point past the last real token instead of at the
    /// zero-width Eof token.
    fn error_span(&self) -> Span {
        if self.is_at_end() && self.current > 0 {
            let last_token = &self.tokens[self.current - 1];
            Span::single(last_token.span.end)
        } else {
            self.peek().span.clone()
        }
    }
}
