//! The `calculator` tool: evaluates a small arithmetic expression.
//!
//! Supports `+ - * /`, parentheses, unary minus and f64 literals; anything
//! else is a handler-level error.

use crate::catalog::Catalog;
use crate::config::GatewayConfig;
use crate::error::{Error, Result};
use crate::registry::{ParamType, ToolHandler, ToolParam, ToolRegistry};
use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::sync::Arc;

pub fn register(
    registry: &mut ToolRegistry,
    _config: &GatewayConfig,
    _catalog: &Arc<Catalog>,
) -> Result<()> {
    registry.register(
        "calculator",
        "Simple arithmetic evaluation",
        vec![ToolParam::required(
            "expression",
            ParamType::String,
            "e.g. '2 + 2'",
        )],
        Arc::new(CalculatorHandler),
    )?;
    Ok(())
}

struct CalculatorHandler;

#[async_trait]
impl ToolHandler for CalculatorHandler {
    async fn invoke(&self, args: &Map<String, Value>) -> Result<Value> {
        let expression = args["expression"].as_str().unwrap_or_default();
        let result = evaluate(expression).map_err(Error::Handler)?;
        Ok(json!({ "result": result }))
    }
}

fn evaluate(input: &str) -> std::result::Result<f64, String> {
    let mut parser = Parser {
        chars: input.chars().collect(),
        pos: 0,
    };
    let value = parser.expr()?;
    parser.skip_ws();
    if parser.pos != parser.chars.len() {
        return Err(format!("Unexpected input at position {}", parser.pos));
    }
    if !value.is_finite() {
        return Err("Expression does not evaluate to a finite number".to_string());
    }
    Ok(value)
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn skip_ws(&mut self) {
        while self.peek().is_some_and(|c| c.is_whitespace()) {
            self.pos += 1;
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn eat(&mut self, expected: char) -> bool {
        self.skip_ws();
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expr(&mut self) -> std::result::Result<f64, String> {
        let mut value = self.term()?;
        loop {
            if self.eat('+') {
                value += self.term()?;
            } else if self.eat('-') {
                value -= self.term()?;
            } else {
                return Ok(value);
            }
        }
    }

    fn term(&mut self) -> std::result::Result<f64, String> {
        let mut value = self.factor()?;
        loop {
            if self.eat('*') {
                value *= self.factor()?;
            } else if self.eat('/') {
                let divisor = self.factor()?;
                if divisor == 0.0 {
                    return Err("Division by zero".to_string());
                }
                value /= divisor;
            } else {
                return Ok(value);
            }
        }
    }

    fn factor(&mut self) -> std::result::Result<f64, String> {
        self.skip_ws();
        if self.eat('-') {
            return Ok(-self.factor()?);
        }
        if self.eat('(') {
            let value = self.expr()?;
            if !self.eat(')') {
                return Err("Expected closing parenthesis".to_string());
            }
            return Ok(value);
        }
        self.number()
    }

    fn number(&mut self) -> std::result::Result<f64, String> {
        self.skip_ws();
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_digit() || c == '.')
        {
            self.pos += 1;
        }
        if start == self.pos {
            return Err(format!("Expected a number at position {start}"));
        }
        let literal: String = self.chars[start..self.pos].iter().collect();
        literal
            .parse::<f64>()
            .map_err(|_| format!("Invalid number literal '{literal}'"))
    }
}
