//! The embedded rule script language
//!
//! A minimal postfix stack language that turns one regex match into zero or
//! more committed tags. Scripts are tokenized and compiled once when a
//! language is registered, then interpreted per match with access to the
//! capture groups, the kind table, and the session's cork queue.

pub mod compile;
pub mod interp;
pub mod tokens;
pub mod value;

pub use compile::{CompiledScript, Instr};
pub use interp::{run_script, Env, ScriptHost};
pub use value::{ScriptValue, Stack, Symbol};
