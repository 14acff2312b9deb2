//! Script interpreter
//!
//! Executes a compiled script against a single match. Evaluation is strictly
//! left to right over one value stack and one flat binding environment; a
//! bare name resolves to its binding first and to a built-in operator
//! second. A name bound to a block executes the block inline, so procedures
//! are ordinary `def`s. Every operand check is a match arm over the closed
//! value union, and every failure aborts only the current run.

use crate::cork::{CorkQueue, PendingTag, TagPatch};
use crate::error::ScriptRuntimeError;
use crate::kinds::KindTable;
use crate::pattern::MatchData;
use crate::script::compile::{CompiledScript, Instr};
use crate::script::value::{ScriptValue, Stack, Symbol};
use std::collections::{BTreeMap, HashMap};

/// Blocks may invoke themselves through bindings; the language has no loops,
/// so only pathological self-reference reaches this.
const MAX_EXEC_DEPTH: usize = 64;

/// Flat name-to-value binding environment.
///
/// Last define wins; there is no shadowing stack. Each parse session clones
/// the language's base environment so sessions never observe each other.
#[derive(Debug, Clone, Default)]
pub struct Env {
    bindings: HashMap<Symbol, ScriptValue>,
}

impl Env {
    /// Create an empty environment.
    pub fn new() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }

    /// Bind `name` to `value`, overwriting any prior binding.
    pub fn define(&mut self, name: Symbol, value: ScriptValue) {
        self.bindings.insert(name, value);
    }

    /// Look up a binding.
    pub fn get(&self, name: &Symbol) -> Option<&ScriptValue> {
        self.bindings.get(name)
    }
}

/// Everything a script run may touch outside its own stack and environment.
pub struct ScriptHost<'a> {
    /// The language's frozen kind table.
    pub kinds: &'a KindTable,
    /// The session's deferred output queue.
    pub cork: &'a mut CorkQueue,
    /// Capture groups of the current match; empty for prelude runs.
    pub matched: &'a MatchData,
}

/// Location overrides accumulated by `_matchloc` for the next `_tag`.
#[derive(Debug, Clone, Copy, Default)]
struct TagBuilder {
    start: Option<usize>,
    end: Option<usize>,
}

/// Run a compiled script. Returns the final stack, which the engine
/// discards but tests inspect.
pub fn run_script(
    script: &CompiledScript,
    env: &mut Env,
    host: &mut ScriptHost<'_>,
) -> Result<Stack, ScriptRuntimeError> {
    let mut run = Run {
        stack: Stack::new(),
        builder: TagBuilder::default(),
        env,
        host,
    };
    run.exec(script.code(), 0)?;
    Ok(run.stack)
}

struct Run<'a, 'b> {
    stack: Stack,
    builder: TagBuilder,
    env: &'a mut Env,
    host: &'a mut ScriptHost<'b>,
}

impl Run<'_, '_> {
    fn exec(&mut self, code: &[Instr], depth: usize) -> Result<(), ScriptRuntimeError> {
        if depth > MAX_EXEC_DEPTH {
            return Err(ScriptRuntimeError::RecursionLimit);
        }
        for instr in code {
            match instr {
                Instr::Integer(value) => self.stack.push(ScriptValue::Integer(*value)),
                Instr::Real(value) => self.stack.push(ScriptValue::Real(*value)),
                Instr::Str(text) => self.stack.push(ScriptValue::String(text.clone())),
                Instr::LiteralName(name) => self.stack.push(ScriptValue::Symbol(name.clone())),
                Instr::Block(body) => self.stack.push(ScriptValue::Block(body.clone())),
                Instr::Capture(group) => {
                    let captured = self
                        .host
                        .matched
                        .group(*group)
                        .ok_or(ScriptRuntimeError::UnmatchedGroup(*group))?;
                    self.stack.push(ScriptValue::String(captured.text.clone()));
                }
                Instr::Exec(name) => self.eval_name(name, depth)?,
            }
        }
        Ok(())
    }

    fn eval_name(&mut self, name: &Symbol, depth: usize) -> Result<(), ScriptRuntimeError> {
        if let Some(value) = self.env.get(name).cloned() {
            return match value {
                ScriptValue::Block(body) => self.exec(&body, depth + 1),
                other => {
                    self.stack.push(other);
                    Ok(())
                }
            };
        }
        self.builtin(name, depth)
    }

    fn builtin(&mut self, name: &Symbol, depth: usize) -> Result<(), ScriptRuntimeError> {
        match name.as_str() {
            "dup" => self.stack.dup()?,
            "pop" => {
                self.stack.pop()?;
            }
            "exch" => self.stack.exch()?,
            "index" => {
                let n = self.pop_count("index")?;
                self.stack.index(n)?;
            }
            "roll" => {
                let shift = self.pop_integer("roll")?;
                let count = self.pop_count("roll")?;
                self.stack.roll(count, shift)?;
            }
            "def" => {
                let value = self.stack.pop()?;
                let key = match self.stack.pop()? {
                    ScriptValue::Symbol(symbol) => symbol,
                    other => {
                        return Err(self.type_mismatch("def", "symbol", &other));
                    }
                };
                self.env.define(key, value);
            }
            "get" => self.op_get()?,
            "length" => self.op_length()?,
            "add" => self.op_arith("add")?,
            "sub" => self.op_arith("sub")?,
            "mul" => self.op_arith("mul")?,
            "div" => self.op_arith("div")?,
            "eq" => self.op_compare("eq")?,
            "ne" => self.op_compare("ne")?,
            "lt" => self.op_compare("lt")?,
            "le" => self.op_compare("le")?,
            "gt" => self.op_compare("gt")?,
            "ge" => self.op_compare("ge")?,
            "not" => {
                let value = self.stack.pop()?;
                let truthy = value
                    .as_bool()
                    .ok_or_else(|| self.type_mismatch("not", "number", &value))?;
                self.stack.push(ScriptValue::Integer(i64::from(!truthy)));
            }
            "if" => {
                let alternative = self.stack.pop()?;
                let condition = self.pop_bool("if")?;
                if condition {
                    self.select(alternative, depth)?;
                }
            }
            "ifelse" => {
                let otherwise = self.stack.pop()?;
                let consequent = self.stack.pop()?;
                let condition = self.pop_bool("ifelse")?;
                let chosen = if condition { consequent } else { otherwise };
                self.select(chosen, depth)?;
            }
            "[" | "<<" => self.stack.push(ScriptValue::Mark),
            "]" => {
                let items = self
                    .stack
                    .pop_to_mark()
                    .ok_or(ScriptRuntimeError::UnmatchedMark)?;
                self.stack.push(ScriptValue::Array(items));
            }
            ">>" => self.op_dict_close()?,
            "_matchloc" => self.op_matchloc()?,
            "_tag" => self.op_tag()?,
            "_commit" => self.op_commit()?,
            "_scopeset" => self.op_scopeset()?,
            other => {
                return Err(ScriptRuntimeError::UndefinedName(other.to_string()));
            }
        }
        Ok(())
    }

    fn op_get(&mut self) -> Result<(), ScriptRuntimeError> {
        let key = self.stack.pop()?;
        let container = self.stack.pop()?;
        let value = match (&container, &key) {
            (ScriptValue::Array(items), ScriptValue::Integer(i)) => {
                let at = usize::try_from(*i).ok().filter(|at| *at < items.len()).ok_or(
                    ScriptRuntimeError::BadIndex {
                        index: *i,
                        len: items.len(),
                    },
                )?;
                items[at].clone()
            }
            (ScriptValue::String(text), ScriptValue::Integer(i)) => {
                let bytes = text.as_bytes();
                let at = usize::try_from(*i).ok().filter(|at| *at < bytes.len()).ok_or(
                    ScriptRuntimeError::BadIndex {
                        index: *i,
                        len: bytes.len(),
                    },
                )?;
                ScriptValue::Integer(i64::from(bytes[at]))
            }
            (ScriptValue::Dict(map), ScriptValue::Symbol(symbol)) => map
                .get(symbol)
                .cloned()
                .ok_or_else(|| ScriptRuntimeError::MissingKey(symbol.to_string()))?,
            (ScriptValue::Array(_), key) | (ScriptValue::String(_), key) => {
                return Err(self.type_mismatch("get", "integer index", key));
            }
            (ScriptValue::Dict(_), key) => {
                return Err(self.type_mismatch("get", "symbol key", key));
            }
            (container, _) => {
                return Err(self.type_mismatch("get", "array, dict, or string", container));
            }
        };
        self.stack.push(value);
        Ok(())
    }

    fn op_length(&mut self) -> Result<(), ScriptRuntimeError> {
        let container = self.stack.pop()?;
        let len = match &container {
            ScriptValue::Array(items) => items.len(),
            ScriptValue::Dict(map) => map.len(),
            ScriptValue::String(text) => text.len(),
            other => {
                return Err(self.type_mismatch("length", "array, dict, or string", other));
            }
        };
        self.stack.push(ScriptValue::Integer(len as i64));
        Ok(())
    }

    fn op_arith(&mut self, operator: &'static str) -> Result<(), ScriptRuntimeError> {
        let rhs = self.stack.pop()?;
        let lhs = self.stack.pop()?;
        let result = match (&lhs, &rhs) {
            (ScriptValue::Integer(a), ScriptValue::Integer(b)) => match operator {
                "add" => ScriptValue::Integer(a.wrapping_add(*b)),
                "sub" => ScriptValue::Integer(a.wrapping_sub(*b)),
                "mul" => ScriptValue::Integer(a.wrapping_mul(*b)),
                _ => {
                    if *b == 0 {
                        return Err(ScriptRuntimeError::DivisionByZero);
                    }
                    ScriptValue::Integer(a.wrapping_div(*b))
                }
            },
            _ => {
                let (a, b) = match (lhs.as_real(), rhs.as_real()) {
                    (Some(a), Some(b)) => (a, b),
                    (None, _) => return Err(self.type_mismatch(operator, "number", &lhs)),
                    (_, None) => return Err(self.type_mismatch(operator, "number", &rhs)),
                };
                match operator {
                    "add" => ScriptValue::Real(a + b),
                    "sub" => ScriptValue::Real(a - b),
                    "mul" => ScriptValue::Real(a * b),
                    _ => {
                        if b == 0.0 {
                            return Err(ScriptRuntimeError::DivisionByZero);
                        }
                        ScriptValue::Real(a / b)
                    }
                }
            }
        };
        self.stack.push(result);
        Ok(())
    }

    fn op_compare(&mut self, operator: &'static str) -> Result<(), ScriptRuntimeError> {
        let rhs = self.stack.pop()?;
        let lhs = self.stack.pop()?;
        let outcome = match operator {
            "eq" => lhs.loosely_equals(&rhs),
            "ne" => !lhs.loosely_equals(&rhs),
            _ => {
                let ordering = match (&lhs, &rhs) {
                    (ScriptValue::String(a), ScriptValue::String(b)) => a.cmp(b),
                    _ => {
                        let (a, b) = match (lhs.as_real(), rhs.as_real()) {
                            (Some(a), Some(b)) => (a, b),
                            (None, _) => {
                                return Err(self.type_mismatch(operator, "number or string", &lhs))
                            }
                            (_, None) => {
                                return Err(self.type_mismatch(operator, "number or string", &rhs))
                            }
                        };
                        a.partial_cmp(&b)
                            .unwrap_or(std::cmp::Ordering::Greater)
                    }
                };
                match operator {
                    "lt" => ordering.is_lt(),
                    "le" => ordering.is_le(),
                    "gt" => ordering.is_gt(),
                    _ => ordering.is_ge(),
                }
            }
        };
        self.stack.push(ScriptValue::Integer(i64::from(outcome)));
        Ok(())
    }

    fn op_dict_close(&mut self) -> Result<(), ScriptRuntimeError> {
        let items = self
            .stack
            .pop_to_mark()
            .ok_or(ScriptRuntimeError::UnmatchedMark)?;
        if items.len() % 2 != 0 {
            return Err(ScriptRuntimeError::TypeMismatch {
                operator: ">>",
                expected: "symbol/value pairs",
                got: "odd number of items",
            });
        }
        let mut map = BTreeMap::new();
        let mut iter = items.into_iter();
        while let (Some(key), Some(value)) = (iter.next(), iter.next()) {
            match key {
                ScriptValue::Symbol(symbol) => {
                    map.insert(symbol, value);
                }
                other => {
                    return Err(self.type_mismatch(">>", "symbol key", &other));
                }
            }
        }
        self.stack.push(ScriptValue::Dict(map));
        Ok(())
    }

    fn op_matchloc(&mut self) -> Result<(), ScriptRuntimeError> {
        let field = match self.stack.pop()? {
            ScriptValue::Symbol(symbol) => symbol,
            other => return Err(self.type_mismatch("_matchloc", "/start or /end", &other)),
        };
        let group = self.pop_count("_matchloc")?;
        let captured = self
            .host
            .matched
            .group(group)
            .ok_or(ScriptRuntimeError::UnmatchedGroup(group))?;
        match field.as_str() {
            "start" => self.builder.start = Some(captured.start),
            "end" => self.builder.end = Some(captured.end),
            _ => {
                return Err(ScriptRuntimeError::TypeMismatch {
                    operator: "_matchloc",
                    expected: "/start or /end",
                    got: "other symbol",
                });
            }
        }
        Ok(())
    }

    fn op_tag(&mut self) -> Result<(), ScriptRuntimeError> {
        let kind_index = match self.stack.pop()? {
            ScriptValue::Integer(i) => usize::try_from(i)
                .ok()
                .filter(|at| *at < self.host.kinds.len())
                .ok_or_else(|| ScriptRuntimeError::InvalidKind(format!("index {}", i)))?,
            ScriptValue::Symbol(name) => self
                .host
                .kinds
                .index_by_name(name.as_str())
                .ok_or_else(|| ScriptRuntimeError::InvalidKind(format!("/{}", name)))?,
            other => return Err(self.type_mismatch("_tag", "kind index or symbol", &other)),
        };
        let name = match self.stack.pop()? {
            ScriptValue::String(text) => text,
            other => return Err(self.type_mismatch("_tag", "string name", &other)),
        };
        let full = self.host.matched.full();
        let pending = PendingTag {
            name,
            kind_index,
            start: self
                .builder
                .start
                .or(full.map(|g| g.start))
                .unwrap_or(0),
            end: self.builder.end.or(full.map(|g| g.end)),
            scope: None,
            extras: BTreeMap::new(),
        };
        // Location overrides apply to one tag only.
        self.builder = TagBuilder::default();
        self.stack.push(ScriptValue::Tag(pending));
        Ok(())
    }

    fn op_commit(&mut self) -> Result<(), ScriptRuntimeError> {
        let pending = match self.stack.pop()? {
            ScriptValue::Tag(pending) => pending,
            other => return Err(self.type_mismatch("_commit", "tag", &other)),
        };
        let index = self.host.cork.commit(pending, self.host.kinds)?;
        self.stack.push(ScriptValue::Integer(index as i64));
        Ok(())
    }

    fn op_scopeset(&mut self) -> Result<(), ScriptRuntimeError> {
        let scope = self.pop_count("_scopeset")?;
        let target = self.pop_count("_scopeset")?;
        self.host.cork.patch(target, TagPatch::Scope(scope))?;
        Ok(())
    }

    fn select(&mut self, value: ScriptValue, depth: usize) -> Result<(), ScriptRuntimeError> {
        match value {
            ScriptValue::Block(body) => self.exec(&body, depth + 1),
            other => {
                self.stack.push(other);
                Ok(())
            }
        }
    }

    fn pop_integer(&mut self, operator: &'static str) -> Result<i64, ScriptRuntimeError> {
        match self.stack.pop()? {
            ScriptValue::Integer(value) => Ok(value),
            other => Err(self.type_mismatch(operator, "integer", &other)),
        }
    }

    /// Pop a non-negative integer used as a count or index.
    fn pop_count(&mut self, operator: &'static str) -> Result<usize, ScriptRuntimeError> {
        let value = self.pop_integer(operator)?;
        usize::try_from(value)
            .map_err(|_| self.type_mismatch(operator, "non-negative integer", &ScriptValue::Integer(value)))
    }

    fn pop_bool(&mut self, operator: &'static str) -> Result<bool, ScriptRuntimeError> {
        let value = self.stack.pop()?;
        value
            .as_bool()
            .ok_or_else(|| self.type_mismatch(operator, "number", &value))
    }

    fn type_mismatch(
        &self,
        operator: &'static str,
        expected: &'static str,
        got: &ScriptValue,
    ) -> ScriptRuntimeError {
        ScriptRuntimeError::TypeMismatch {
            operator,
            expected,
            got: got.kind_name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::{RuleAction, RuleFlags, TagRule};

    fn pod_kinds() -> KindTable {
        let mut kinds = KindTable::new();
        kinds.define('c', "chapter", "chapters", true).unwrap();
        kinds.define('s', "section", "sections", true).unwrap();
        kinds.define('S', "subsection", "subsections", true).unwrap();
        kinds
            .define('t', "subsubsection", "subsubsections", true)
            .unwrap();
        kinds
    }

    fn match_against(pattern: &str, text: &str) -> MatchData {
        TagRule::compile(
            pattern,
            RuleFlags::default(),
            RuleAction::Template {
                name_template: String::new(),
                kind_letter: 'c',
            },
        )
        .unwrap()
        .try_match(text, 0)
        .unwrap()
    }

    fn eval(
        source: &str,
        env: &mut Env,
        matched: &MatchData,
        kinds: &KindTable,
        cork: &mut CorkQueue,
    ) -> Result<Stack, ScriptRuntimeError> {
        let script = CompiledScript::compile(source).unwrap();
        let mut host = ScriptHost {
            kinds,
            cork,
            matched,
        };
        run_script(&script, env, &mut host)
    }

    fn eval_fresh(source: &str) -> Result<Stack, ScriptRuntimeError> {
        let kinds = pod_kinds();
        let mut cork = CorkQueue::new();
        let mut env = Env::new();
        eval(source, &mut env, &MatchData::empty(), &kinds, &mut cork)
    }

    #[test]
    fn test_arith_with_promotion() {
        let mut stack = eval_fresh("1 2 add 3 mul 0.5 sub").unwrap();
        assert_eq!(stack.pop(), Ok(ScriptValue::Real(8.5)));
    }

    #[test]
    fn test_integer_division_truncates() {
        let mut stack = eval_fresh("7 2 div").unwrap();
        assert_eq!(stack.pop(), Ok(ScriptValue::Integer(3)));
        assert_eq!(
            eval_fresh("1 0 div"),
            Err(ScriptRuntimeError::DivisionByZero)
        );
    }

    #[test]
    fn test_def_binds_and_names_resolve() {
        let mut stack = eval_fresh("/answer 41 def answer 1 add").unwrap();
        assert_eq!(stack.pop(), Ok(ScriptValue::Integer(42)));
    }

    #[test]
    fn test_last_define_wins() {
        let mut stack = eval_fresh("/x 1 def /x 2 def x").unwrap();
        assert_eq!(stack.pop(), Ok(ScriptValue::Integer(2)));
    }

    #[test]
    fn test_block_bound_to_name_executes() {
        let mut stack = eval_fresh("/double { 2 mul } def 21 double").unwrap();
        assert_eq!(stack.pop(), Ok(ScriptValue::Integer(42)));
    }

    #[test]
    fn test_block_is_data_until_invoked() {
        let stack = eval_fresh("{ 1 0 div }").unwrap();
        assert_eq!(stack.len(), 1);
    }

    #[test]
    fn test_array_and_get() {
        let mut stack = eval_fresh("[ 10 20 30 ] 1 get").unwrap();
        assert_eq!(stack.pop(), Ok(ScriptValue::Integer(20)));
    }

    #[test]
    fn test_get_out_of_range() {
        assert_eq!(
            eval_fresh("[ 10 ] 3 get"),
            Err(ScriptRuntimeError::BadIndex { index: 3, len: 1 })
        );
    }

    #[test]
    fn test_string_get_yields_byte() {
        let mut stack = eval_fresh("(2) 0 get").unwrap();
        assert_eq!(stack.pop(), Ok(ScriptValue::Integer(50)));
    }

    #[test]
    fn test_dict_literal_and_lookup() {
        let mut stack = eval_fresh("<< /a 1 /b 2 >> /b get").unwrap();
        assert_eq!(stack.pop(), Ok(ScriptValue::Integer(2)));
        assert_eq!(
            eval_fresh("<< /a 1 >> /missing get"),
            Err(ScriptRuntimeError::MissingKey("missing".into()))
        );
    }

    #[test]
    fn test_conditionals() {
        let mut stack = eval_fresh("1 2 gt { 10 } { 20 } ifelse").unwrap();
        assert_eq!(stack.pop(), Ok(ScriptValue::Integer(20)));
        let mut stack = eval_fresh("3 3 eq { 7 } if").unwrap();
        assert_eq!(stack.pop(), Ok(ScriptValue::Integer(7)));
        // Non-block alternatives are selected as values.
        let mut stack = eval_fresh("0 1 eq (yes) (no) ifelse").unwrap();
        assert_eq!(stack.pop(), Ok(ScriptValue::String("no".into())));
    }

    #[test]
    fn test_underflow_and_type_errors() {
        assert_eq!(eval_fresh("pop"), Err(ScriptRuntimeError::Underflow));
        assert_eq!(
            eval_fresh("(a) 1 add"),
            Err(ScriptRuntimeError::TypeMismatch {
                operator: "add",
                expected: "number",
                got: "string",
            })
        );
    }

    #[test]
    fn test_undefined_name() {
        assert_eq!(
            eval_fresh("whatever"),
            Err(ScriptRuntimeError::UndefinedName("whatever".into()))
        );
    }

    #[test]
    fn test_recursion_limit() {
        assert_eq!(
            eval_fresh("/loop { loop } def loop"),
            Err(ScriptRuntimeError::RecursionLimit)
        );
    }

    #[test]
    fn test_capture_refs_read_the_match() {
        let kinds = pod_kinds();
        let mut cork = CorkQueue::new();
        let mut env = Env::new();
        let matched = match_against(r"^=head([1-4])[ \t]+(.+)", "=head2 Methods");
        let mut stack = eval("\\2", &mut env, &matched, &kinds, &mut cork).unwrap();
        assert_eq!(stack.pop(), Ok(ScriptValue::String("Methods".into())));
        assert_eq!(
            eval("\\7", &mut env, &matched, &kinds, &mut cork),
            Err(ScriptRuntimeError::UnmatchedGroup(7))
        );
    }

    #[test]
    fn test_pod_heading_script_commits_section() {
        let kinds = pod_kinds();
        let mut cork = CorkQueue::new();
        let mut env = Env::new();
        eval(
            "/kindTable [ /chapter /section /subsection /subsubsection ] def",
            &mut env,
            &MatchData::empty(),
            &kinds,
            &mut cork,
        )
        .unwrap();

        let matched = match_against(r"^=head([1-4])[ \t]+(.+)", "=head2 Methods");
        let script = "{{ \\2 kindTable \\1 0 get ?1 sub get 2 /start _matchloc _tag _commit pop }}";
        let stack = eval(script, &mut env, &matched, &kinds, &mut cork).unwrap();
        assert!(stack.is_empty());

        let tag = cork.get(0).unwrap();
        assert_eq!(tag.name, "Methods");
        assert_eq!(kinds.lookup(tag.kind_index).unwrap().name, "section");
        assert_eq!(tag.start, 7);
        assert_eq!(tag.end, Some(14));
    }

    #[test]
    fn test_tag_defaults_to_full_match_span() {
        let kinds = pod_kinds();
        let mut cork = CorkQueue::new();
        let mut env = Env::new();
        let matched = match_against(r"=head([1-4])[ \t]+(.+)", "=head1 Intro");
        eval("(Intro) 0 _tag _commit pop", &mut env, &matched, &kinds, &mut cork).unwrap();
        let tag = cork.get(0).unwrap();
        assert_eq!((tag.start, tag.end), (0, Some(12)));
    }

    #[test]
    fn test_matchloc_resets_between_tags() {
        let kinds = pod_kinds();
        let mut cork = CorkQueue::new();
        let mut env = Env::new();
        let matched = match_against(r"(\w+) (\w+)", "alpha beta");
        eval(
            "(first) 0 2 /start _matchloc _tag _commit pop (second) 1 _tag _commit pop",
            &mut env,
            &matched,
            &kinds,
            &mut cork,
        )
        .unwrap();
        // The override applied to the first tag only.
        assert_eq!(cork.get(0).unwrap().start, 6);
        assert_eq!(cork.get(1).unwrap().start, 0);
        assert_eq!(cork.get(1).unwrap().end, Some(10));
    }

    #[test]
    fn test_commit_pushes_queue_index_and_scopeset_patches() {
        let kinds = pod_kinds();
        let mut cork = CorkQueue::new();
        let mut env = Env::new();
        let matched = match_against(r"(\w+)", "Intro");
        eval(
            "/parent (Intro) 0 _tag _commit def \
             (Detail) 1 _tag _commit parent _scopeset",
            &mut env,
            &matched,
            &kinds,
            &mut cork,
        )
        .unwrap();
        assert_eq!(cork.get(1).unwrap().scope, Some(0));
        assert_eq!(cork.get(0).unwrap().scope, None);
    }

    #[test]
    fn test_invalid_kind_index_is_reported_not_clamped() {
        let kinds = pod_kinds();
        let mut cork = CorkQueue::new();
        let mut env = Env::new();
        let matched = match_against(r"(\w+)", "Intro");
        assert!(matches!(
            eval("(Intro) 9 _tag", &mut env, &matched, &kinds, &mut cork),
            Err(ScriptRuntimeError::InvalidKind(_))
        ));
        assert!(matches!(
            eval("(Intro) /nonesuch _tag", &mut env, &matched, &kinds, &mut cork),
            Err(ScriptRuntimeError::InvalidKind(_))
        ));
    }

    #[test]
    fn test_kind_symbol_resolves_by_name() {
        let kinds = pod_kinds();
        let mut cork = CorkQueue::new();
        let mut env = Env::new();
        let matched = match_against(r"(\w+)", "Intro");
        eval("(Intro) /subsection _tag _commit pop", &mut env, &matched, &kinds, &mut cork)
            .unwrap();
        assert_eq!(cork.get(0).unwrap().kind_index, 2);
    }
}
