//! Script compilation
//!
//! Scripts are compiled once at language registration into a flat
//! instruction sequence. Block literals compile recursively and are carried
//! as shared data, so invoking a block twice never recompiles it. The
//! `{{ ... }}` wrapper used by rule tables to mark a script column is
//! accepted and stripped here.

use crate::error::DefineError;
use crate::script::tokens::{tokenize, Token};
use crate::script::value::Symbol;
use std::sync::Arc;

/// One compiled instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum Instr {
    /// Push an integer literal.
    Integer(i64),
    /// Push a real literal.
    Real(f64),
    /// Push a string literal.
    Str(String),
    /// Push a literal name as a symbol.
    LiteralName(Symbol),
    /// Push the text of a capture group of the current match.
    Capture(usize),
    /// Push a block literal as data.
    Block(Arc<Vec<Instr>>),
    /// Evaluate a name: bound value, bound block, or built-in operator.
    Exec(Symbol),
}

/// A script parsed into instructions, ready to run per match.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledScript {
    code: Arc<Vec<Instr>>,
}

impl CompiledScript {
    /// Compile script source into an instruction sequence.
    pub fn compile(source: &str) -> Result<Self, DefineError> {
        let body = strip_wrapper(source);
        let tokens = tokenize(body);

        // One frame per open block; frame 0 is the script body.
        let mut frames: Vec<Vec<Instr>> = vec![Vec::new()];

        for (result, span) in tokens {
            let token = result.map_err(|_| DefineError::ScriptCompile {
                message: format!("unrecognized token at byte {}", span.start),
            })?;
            let instr = match token {
                Token::BlockOpen => {
                    frames.push(Vec::new());
                    continue;
                }
                Token::BlockClose => {
                    if frames.len() < 2 {
                        return Err(DefineError::ScriptCompile {
                            message: format!("unmatched `}}` at byte {}", span.start),
                        });
                    }
                    let block = frames.pop().expect("frame stack checked above");
                    Instr::Block(Arc::new(block))
                }
                Token::ArrayOpen => Instr::Exec(Symbol::intern("[")),
                Token::ArrayClose => Instr::Exec(Symbol::intern("]")),
                Token::DictOpen => Instr::Exec(Symbol::intern("<<")),
                Token::DictClose => Instr::Exec(Symbol::intern(">>")),
                Token::Integer(value) => Instr::Integer(value),
                Token::Real(value) => Instr::Real(value),
                Token::CharCode(value) => Instr::Integer(value),
                Token::Str(text) => Instr::Str(text),
                Token::LiteralName(name) => Instr::LiteralName(Symbol::intern(&name)),
                Token::Name(name) => Instr::Exec(Symbol::intern(&name)),
                Token::CaptureRef(group) => Instr::Capture(group),
            };
            frames
                .last_mut()
                .expect("frame stack is never empty")
                .push(instr);
        }

        if frames.len() != 1 {
            return Err(DefineError::ScriptCompile {
                message: "unterminated block".to_string(),
            });
        }

        Ok(Self {
            code: Arc::new(frames.pop().expect("frame stack checked above")),
        })
    }

    /// The instruction sequence.
    pub fn code(&self) -> &[Instr] {
        &self.code
    }

    /// Shared handle to the instruction sequence, as block values carry it.
    pub fn shared(&self) -> Arc<Vec<Instr>> {
        Arc::clone(&self.code)
    }
}

/// Strip the rule-table script marker `{{ ... }}` if present.
fn strip_wrapper(source: &str) -> &str {
    let trimmed = source.trim();
    match trimmed.strip_prefix("{{").and_then(|s| s.strip_suffix("}}")) {
        Some(inner) => inner,
        None => trimmed,
    }
}
