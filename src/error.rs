use ariadne::{Color, Fmt, Label, Report, ReportKind, Source};
use std::fmt;

#[derive(Debug, Clone)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn single(pos: usize) -> Self {
        Self {
            start: pos,
            end: pos + 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Illegal character in the input.
    Lexical,
    /// Unexpected token or end of input.
    Syntax,
    /// Too few or too many call arguments.
    Arity,
    /// Identifier or function not found.
    UndefinedName,
    /// Name declared twice, or an attempt to rebind a protected built-in.
    Redefinition,
    /// Required parameter declared after an optional one.
    ParameterOrder,
    /// Runtime math failure (division by zero, factorial domain, etc.).
    Math,
}

#[derive(Debug, Clone)]
pub struct CalcError {
    pub kind: ErrorKind,
    pub span: Span,
    pub message: String,
    pub help: Option<String>,
}

impl CalcError {
    pub fn new(kind: ErrorKind, span: Span, message: String) -> Self {
        Self {
            kind,
            span,
            message,
            help: None,
        }
    }

    pub fn new_with_help(kind: ErrorKind, span: Span, message: String, help: String) -> Self {
        Self {
            kind,
            span,
            message,
            help: Some(help),
        }
    }

    pub fn lex_error(span: Span, message: String) -> Self {
        Self::new(ErrorKind::Lexical, span, message)
    }

    pub fn syntax_error(span: Span, message: String) -> Self {
        Self::new(ErrorKind::Syntax, span, message)
    }

    pub fn syntax_error_with_help(span: Span, message: String, help: String) -> Self {
        Self::new_with_help(ErrorKind::Syntax, span, message, help)
    }

    pub fn arity_error(span: Span, message: String) -> Self {
        Self::new(ErrorKind::Arity, span, message)
    }

    pub fn undefined_name(span: Span, message: String) -> Self {
        Self::new(ErrorKind::UndefinedName, span, message)
    }

    pub fn redefinition(span: Span, message: String) -> Self {
        Self::new(ErrorKind::Redefinition, span, message)
    }

    pub fn parameter_order(span: Span, message: String) -> Self {
        Self::new(ErrorKind::ParameterOrder, span, message)
    }

    pub fn math_error(span: Span, message: String) -> Self {
        Self::new(ErrorKind::Math, span, message)
    }

    pub fn report(&self, source: &str, filename: Option<&str>) {
        let filename = filename.unwrap_or("<repl>");

        let color = match self.kind {
            ErrorKind::Lexical => Color::Red,
            ErrorKind::Syntax => Color::Yellow,
            ErrorKind::Arity | ErrorKind::UndefinedName => Color::Cyan,
            ErrorKind::Redefinition | ErrorKind::ParameterOrder => Color::Blue,
            ErrorKind::Math => Color::Magenta,
        };

        let kind_str = match self.kind {
            ErrorKind::Lexical => "Lexical Error",
            ErrorKind::Syntax => "Syntax Error",
            ErrorKind::Arity => "Arity Error",
            ErrorKind::UndefinedName => "Undefined Name",
            ErrorKind::Redefinition => "Redefinition Error",
            ErrorKind::ParameterOrder => "Parameter Order Error",
            ErrorKind::Math => "Math Error",
        };

        let mut report_builder = Report::build(ReportKind::Error, filename, self.span.start)
            .with_message(format!("{}: {}", kind_str.fg(color), self.message))
            .with_label(
                Label::new((filename, self.span.start..self.span.end))
                    .with_message(&self.message)
                    .with_color(color),
            );

        if let Some(ref help_text) = self.help {
            report_builder =
                report_builder.with_note(format!("{}: {}", "help".fg(Color::Cyan), help_text));
        }

        report_builder
            .finish()
            .print((filename, Source::from(source)))
            .unwrap();
    }
}

impl fmt::Display for CalcError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CalcError {}
