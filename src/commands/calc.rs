// src/commands/calc.rs

use crate::{
    commands::vars::validate_name,
    core::{
        commons::format_number,
        context::EngineContext,
        error::{ScriptError, ScriptResult},
        registry::{Command, Invocation, parse_options},
    },
};
use clap::{CommandFactory, Parser};
use std::iter::Peekable;
use std::str::Chars;

#[derive(Parser, Debug)]
#[command(no_binary_name = true, name = "calc", allow_negative_numbers = true)]
struct CalcArgs {
    /// Variable receiving the result.
    dest: String,

    /// Expression using numbers, `+ - * / %` and parentheses. Words are joined by spaces.
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    expression: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Number(f64),
    Op(char),
    Open,
    Close,
}

fn tokenize(expression: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut chars: Peekable<Chars<'_>> = expression.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '0'..='9' | '.' => {
                let mut literal = String::new();
                while let Some(&d) = chars.peek() {
                    if d.is_ascii_digit() || d == '.' {
                        literal.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let number = literal
                    .parse::<f64>()
                    .map_err(|_| format!("'{}' is not a number", literal))?;
                tokens.push(Token::Number(number));
            }
            '+' | '-' | '*' | '/' | '%' => {
                tokens.push(Token::Op(c));
                chars.next();
            }
            '(' => {
                tokens.push(Token::Open);
                chars.next();
            }
            ')' => {
                tokens.push(Token::Close);
                chars.next();
            }
            other => return Err(format!("unexpected character '{}'", other)),
        }
    }
    Ok(tokens)
}

/// Recursive-descent evaluator over a token list.
///
/// ```text
/// expr   := term (('+' | '-') term)*
/// term   := unary (('*' | '/' | '%') unary)*
/// unary  := ('-' | '+') unary | atom
/// atom   := number | '(' expr ')'
/// ```
struct Evaluator {
    tokens: Vec<Token>,
    pos: usize,
}

impl Evaluator {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.peek();
        self.pos += 1;
        token
    }

    fn expr(&mut self) -> Result<f64, String> {
        let mut value = self.term()?;
        while let Some(Token::Op(op @ ('+' | '-'))) = self.peek() {
            self.advance();
            let rhs = self.term()?;
            value = if op == '+' { value + rhs } else { value - rhs };
        }
        Ok(value)
    }

    fn term(&mut self) -> Result<f64, String> {
        let mut value = self.unary()?;
        while let Some(Token::Op(op @ ('*' | '/' | '%'))) = self.peek() {
            self.advance();
            let rhs = self.unary()?;
            value = match op {
                '*' => value * rhs,
                _ if rhs == 0.0 => return Err("division by zero".to_string()),
                '/' => value / rhs,
                _ => value % rhs,
            };
        }
        Ok(value)
    }

    fn unary(&mut self) -> Result<f64, String> {
        match self.peek() {
            Some(Token::Op('-')) => {
                self.advance();
                Ok(-self.unary()?)
            }
            Some(Token::Op('+')) => {
                self.advance();
                self.unary()
            }
            _ => self.atom(),
        }
    }

    fn atom(&mut self) -> Result<f64, String> {
        match self.advance() {
            Some(Token::Number(n)) => Ok(n),
            Some(Token::Open) => {
                let value = self.expr()?;
                match self.advance() {
                    Some(Token::Close) => Ok(value),
                    _ => Err("missing ')'".to_string()),
                }
            }
            Some(token) => Err(format!("unexpected {:?}", token)),
            None => Err("unexpected end of expression".to_string()),
        }
    }
}

/// Evaluates an arithmetic expression.
pub fn evaluate(expression: &str) -> Result<f64, String> {
    let tokens = tokenize(expression)?;
    if tokens.is_empty() {
        return Err("empty expression".to_string());
    }
    let mut evaluator = Evaluator { tokens, pos: 0 };
    let value = evaluator.expr()?;
    if let Some(token) = evaluator.peek() {
        return Err(format!("unexpected {:?} after expression", token));
    }
    Ok(value)
}

#[derive(Debug, Default)]
pub struct Calc;

impl Command for Calc {
    fn name(&self) -> &'static str {
        "calc"
    }

    fn options(&self) -> Option<clap::Command> {
        Some(CalcArgs::command())
    }

    fn execute(&mut self, ctx: &mut EngineContext, inv: Invocation) -> ScriptResult<()> {
        let Some(args) = parse_options::<CalcArgs>(ctx, self.name(), &inv.args)? else {
            return Ok(());
        };
        validate_name(self.name(), &args.dest)?;
        let expression = args.expression.join(" ");
        let value = evaluate(&expression).map_err(|reason| ScriptError::InvalidOptions {
            command: self.name().to_string(),
            message: format!("cannot evaluate '{}': {}", expression, reason),
        })?;
        ctx.variables.set(args.dest, format_number(value));
        Ok(())
    }
}

pub fn build() -> Box<dyn Command> {
    Box::new(Calc)
}
