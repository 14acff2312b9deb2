//! Error types for the tag extraction engine
//!
//! Two families, split by lifetime: `DefineError` covers language
//! registration (bad patterns, bad scripts, inconsistent kind tables) and is
//! surfaced to the caller immediately. `ScriptRuntimeError` covers a single
//! script run against one match; it never aborts a parse session and is
//! reported through the session's diagnostics instead.

use crate::script::value::StackError;
use std::fmt;

/// Error raised while registering a language definition.
///
/// Any of these rejects the offending rule or language at build time.
#[derive(Debug, Clone, PartialEq)]
pub enum DefineError {
    /// The rule's regular expression failed to compile.
    PatternCompile { pattern: String, message: String },
    /// The rule's script failed to compile.
    ScriptCompile { message: String },
    /// Two kinds were registered under the same one-letter alias.
    DuplicateKindLetter(char),
    /// A rule references a kind letter that was never registered.
    UnknownKindLetter(char),
    /// The language prelude script failed while seeding the environment.
    PreludeFailed(ScriptRuntimeError),
}

impl fmt::Display for DefineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefineError::PatternCompile { pattern, message } => {
                write!(f, "invalid rule pattern `{}`: {}", pattern, message)
            }
            DefineError::ScriptCompile { message } => {
                write!(f, "invalid rule script: {}", message)
            }
            DefineError::DuplicateKindLetter(letter) => {
                write!(f, "kind letter '{}' registered twice", letter)
            }
            DefineError::UnknownKindLetter(letter) => {
                write!(f, "rule references unknown kind letter '{}'", letter)
            }
            DefineError::PreludeFailed(err) => {
                write!(f, "prelude script failed: {}", err)
            }
        }
    }
}

impl std::error::Error for DefineError {}

/// A patch addressed an entry that is not in the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueIndexError {
    /// The requested entry index.
    pub index: usize,
    /// Number of entries currently committed.
    pub len: usize,
}

impl fmt::Display for QueueIndexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "queue index {} out of bounds ({} committed)",
            self.index, self.len
        )
    }
}

impl std::error::Error for QueueIndexError {}

/// Error raised while running a rule script against one match.
///
/// Scoped to the match: the dispatcher discards the tag in progress,
/// records the error, and continues scanning.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptRuntimeError {
    /// An operator needed more operands than the stack holds.
    Underflow,
    /// A stack shuffle addressed a depth the stack does not have.
    InvalidStackIndex(usize),
    /// An operator was invoked with the wrong kind of operand.
    TypeMismatch {
        operator: &'static str,
        expected: &'static str,
        got: &'static str,
    },
    /// A name was neither bound nor a built-in operator.
    UndefinedName(String),
    /// Array or string index out of range.
    BadIndex { index: i64, len: usize },
    /// Dict lookup with a key that is not present.
    MissingKey(String),
    /// A capture reference addressed a group the match did not bind.
    UnmatchedGroup(usize),
    /// `]` or `>>` without a mark on the stack.
    UnmatchedMark,
    /// A kind reference resolved outside the registered kind table.
    InvalidKind(String),
    /// Division by zero.
    DivisionByZero,
    /// Block execution nested past the depth limit.
    RecursionLimit,
    /// A tag reached commit with an empty name.
    EmptyTagName,
    /// A queue patch addressed an index that was never committed.
    BadQueueIndex(QueueIndexError),
}

impl fmt::Display for ScriptRuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptRuntimeError::Underflow => write!(f, "stack underflow"),
            ScriptRuntimeError::InvalidStackIndex(depth) => {
                write!(f, "invalid stack index: {}", depth)
            }
            ScriptRuntimeError::TypeMismatch {
                operator,
                expected,
                got,
            } => write!(f, "{}: expected {}, got {}", operator, expected, got),
            ScriptRuntimeError::UndefinedName(name) => {
                write!(f, "undefined name: {}", name)
            }
            ScriptRuntimeError::BadIndex { index, len } => {
                write!(f, "index {} out of range (length {})", index, len)
            }
            ScriptRuntimeError::MissingKey(key) => write!(f, "missing key: /{}", key),
            ScriptRuntimeError::UnmatchedGroup(group) => {
                write!(f, "capture group {} did not participate in the match", group)
            }
            ScriptRuntimeError::UnmatchedMark => write!(f, "no mark on the stack"),
            ScriptRuntimeError::InvalidKind(what) => {
                write!(f, "invalid kind reference: {}", what)
            }
            ScriptRuntimeError::DivisionByZero => write!(f, "division by zero"),
            ScriptRuntimeError::RecursionLimit => write!(f, "block recursion too deep"),
            ScriptRuntimeError::EmptyTagName => write!(f, "tag committed with empty name"),
            ScriptRuntimeError::BadQueueIndex(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for ScriptRuntimeError {}

impl From<StackError> for ScriptRuntimeError {
    fn from(err: StackError) -> Self {
        match err {
            StackError::Underflow => ScriptRuntimeError::Underflow,
            StackError::InvalidIndex(depth) => ScriptRuntimeError::InvalidStackIndex(depth),
        }
    }
}

impl From<QueueIndexError> for ScriptRuntimeError {
    fn from(err: QueueIndexError) -> Self {
        ScriptRuntimeError::BadQueueIndex(err)
    }
}
