//! Language registration and the rule dispatcher
//!
//! A language definition is registered once: kinds, rules, and an optional
//! prelude script are compiled into an immutable `Language` that concurrent
//! parse sessions share read-only. Each session owns its cork queue, its
//! clone of the base environment, and its diagnostics, and walks the input
//! as a small state machine: scan for the first rule that matches at the
//! current position, run that rule's action, and keep going. A script
//! failure never halts the parse; it is recorded and scanning resumes.

use crate::cork::{CorkQueue, PendingTag, Tag};
use crate::error::{DefineError, ScriptRuntimeError};
use crate::kinds::KindTable;
use crate::pattern::{expand_template, MatchData, RuleAction, RuleFlags, TagRule};
use crate::script::compile::CompiledScript;
use crate::script::interp::{run_script, Env, ScriptHost};
use crate::script::value::{ScriptValue, Symbol};
use std::collections::BTreeMap;

/// One rule as supplied by a language definition, before compilation.
#[derive(Debug, Clone)]
enum RawRule {
    Script {
        pattern: String,
        flags: String,
        script: String,
    },
    Simple {
        pattern: String,
        flags: String,
        name_template: String,
        kind_letter: char,
    },
}

/// Collects a language definition and compiles it into a `Language`.
///
/// Adders are infallible so definitions chain; all validation happens in
/// `build`, which rejects the whole language on the first bad rule.
#[derive(Debug, Clone, Default)]
pub struct LanguageBuilder {
    name: String,
    kinds: Vec<(char, String, String, bool)>,
    rules: Vec<RawRule>,
    constants: Vec<(String, String)>,
    prelude: Option<String>,
}

impl LanguageBuilder {
    /// Register a kind. Indices are assigned in call order.
    pub fn kind(mut self, letter: char, name: &str, plural_name: &str, enabled: bool) -> Self {
        self.kinds
            .push((letter, name.to_string(), plural_name.to_string(), enabled));
        self
    }

    /// Add a programmable rule: on match, run `script` against the captures.
    pub fn rule(mut self, pattern: &str, flags: &str, script: &str) -> Self {
        self.rules.push(RawRule::Script {
            pattern: pattern.to_string(),
            flags: flags.to_string(),
            script: script.to_string(),
        });
        self
    }

    /// Add a simple rule: on match, commit one tag named by expanding
    /// `name_template` with the kind aliased by `kind_letter`.
    pub fn simple_rule(
        mut self,
        pattern: &str,
        flags: &str,
        name_template: &str,
        kind_letter: char,
    ) -> Self {
        self.rules.push(RawRule::Simple {
            pattern: pattern.to_string(),
            flags: flags.to_string(),
            name_template: name_template.to_string(),
            kind_letter,
        });
        self
    }

    /// Bind an opaque text resource in the initial environment, visible to
    /// the prelude and to every rule script as a string value.
    pub fn constant(mut self, name: &str, text: &str) -> Self {
        self.constants.push((name.to_string(), text.to_string()));
        self
    }

    /// Set the prelude script, run once at build time to seed the base
    /// environment with language-level bindings.
    pub fn prelude(mut self, script: &str) -> Self {
        self.prelude = Some(script.to_string());
        self
    }

    /// Compile the definition into an immutable language.
    pub fn build(self) -> Result<Language, DefineError> {
        let mut kinds = KindTable::new();
        for (letter, name, plural_name, enabled) in &self.kinds {
            kinds.define(*letter, name, plural_name, *enabled)?;
        }

        let mut rules = Vec::with_capacity(self.rules.len());
        for raw in &self.rules {
            let rule = match raw {
                RawRule::Script {
                    pattern,
                    flags,
                    script,
                } => TagRule::compile(
                    pattern,
                    RuleFlags::parse(flags),
                    RuleAction::Script(CompiledScript::compile(script)?),
                )?,
                RawRule::Simple {
                    pattern,
                    flags,
                    name_template,
                    kind_letter,
                } => {
                    if kinds.index_by_letter(*kind_letter).is_none() {
                        return Err(DefineError::UnknownKindLetter(*kind_letter));
                    }
                    TagRule::compile(
                        pattern,
                        RuleFlags::parse(flags),
                        RuleAction::Template {
                            name_template: name_template.clone(),
                            kind_letter: *kind_letter,
                        },
                    )?
                }
            };
            rules.push(rule);
        }

        let mut base_env = Env::new();
        base_env.define(Symbol::intern("true"), ScriptValue::Integer(1));
        base_env.define(Symbol::intern("false"), ScriptValue::Integer(0));
        base_env.define(
            Symbol::intern("_kinds"),
            ScriptValue::Array(
                kinds
                    .iter()
                    .map(|k| ScriptValue::Symbol(Symbol::intern(&k.name)))
                    .collect(),
            ),
        );
        for (name, text) in &self.constants {
            base_env.define(Symbol::intern(name), ScriptValue::String(text.clone()));
        }

        if let Some(source) = &self.prelude {
            let prelude = CompiledScript::compile(source)?;
            let empty = MatchData::empty();
            let mut scratch = CorkQueue::new();
            let mut host = ScriptHost {
                kinds: &kinds,
                cork: &mut scratch,
                matched: &empty,
            };
            run_script(&prelude, &mut base_env, &mut host)
                .map_err(DefineError::PreludeFailed)?;
        }

        Ok(Language {
            name: self.name,
            kinds,
            rules,
            base_env,
        })
    }
}

/// A registered language: frozen kinds, compiled rules, seeded environment.
///
/// Immutable after `build`, so it can be shared (for example behind an
/// `Arc`) by any number of concurrent parse sessions.
#[derive(Debug, Clone)]
pub struct Language {
    name: String,
    kinds: KindTable,
    rules: Vec<TagRule>,
    base_env: Env,
}

impl Language {
    /// Start defining a language.
    pub fn builder(name: &str) -> LanguageBuilder {
        LanguageBuilder {
            name: name.to_string(),
            ..LanguageBuilder::default()
        }
    }

    /// The language name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The frozen kind table.
    pub fn kinds(&self) -> &KindTable {
        &self.kinds
    }

    /// Create an exclusive parse session for one source buffer.
    pub fn session(&self) -> ParseSession<'_> {
        ParseSession {
            language: self,
            cork: CorkQueue::new(),
            env: self.base_env.clone(),
            diagnostics: Vec::new(),
        }
    }
}

/// A script failure recorded during a session, with its 1-based line.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub line: usize,
    pub error: ScriptRuntimeError,
}

/// Dispatcher states while walking one buffer.
enum DispatchState {
    /// Trying rules at the current position.
    Scanning,
    /// A rule matched; its action has not run yet.
    Matched { rule: usize, matched: MatchData },
    /// The action failed; record it and resume past the match.
    ScriptFailed {
        rule: usize,
        matched: MatchData,
        error: ScriptRuntimeError,
    },
    /// End of input.
    Done,
}

/// One parse of one source buffer.
///
/// Owns the cork queue, the environment clone, and the diagnostics; never
/// shared across threads or buffers.
pub struct ParseSession<'a> {
    language: &'a Language,
    cork: CorkQueue,
    env: Env,
    diagnostics: Vec<Diagnostic>,
}

impl ParseSession<'_> {
    /// Scan the whole buffer and drain the resulting tags in commit order.
    pub fn run(&mut self, buffer: &str) -> Vec<Tag> {
        let language = self.language;
        let lines = line_spans(buffer);
        let mut cursor = 0usize;
        let mut state = DispatchState::Scanning;

        loop {
            state = match state {
                DispatchState::Scanning => {
                    if cursor >= lines.len() {
                        DispatchState::Done
                    } else {
                        match self.first_match(buffer, &lines, cursor) {
                            Some((rule, matched)) => DispatchState::Matched { rule, matched },
                            None => {
                                cursor += 1;
                                DispatchState::Scanning
                            }
                        }
                    }
                }
                DispatchState::Matched { rule, matched } => match self.apply_rule(rule, &matched)
                {
                    Ok(()) => {
                        cursor = self.advance(cursor, rule, &matched, &lines);
                        DispatchState::Scanning
                    }
                    Err(error) => DispatchState::ScriptFailed {
                        rule,
                        matched,
                        error,
                    },
                },
                DispatchState::ScriptFailed {
                    rule,
                    matched,
                    error,
                } => {
                    log::debug!(
                        "{}: rule action failed on line {}: {}",
                        language.name,
                        cursor + 1,
                        error
                    );
                    self.diagnostics.push(Diagnostic {
                        line: cursor + 1,
                        error,
                    });
                    // The match still counts as consumed.
                    cursor = self.advance(cursor, rule, &matched, &lines);
                    DispatchState::Scanning
                }
                DispatchState::Done => break,
            };
        }

        self.cork.drain(&language.kinds)
    }

    /// Script failures recorded so far, oldest first.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// First rule matching at line `cursor`, in declaration order.
    ///
    /// A multiline rule only wins here if its match starts on the current
    /// line; a span starting further down fires once the cursor gets there.
    fn first_match(
        &self,
        buffer: &str,
        lines: &[(usize, usize)],
        cursor: usize,
    ) -> Option<(usize, MatchData)> {
        let (line_start, line_end) = lines[cursor];
        let next_start = lines
            .get(cursor + 1)
            .map(|(start, _)| *start)
            .unwrap_or(buffer.len());

        for (index, rule) in self.language.rules.iter().enumerate() {
            let matched = if rule.flags().multiline {
                rule.try_match(&buffer[line_start..], line_start)
                    .filter(|m| m.full().map(|g| g.start < next_start.max(line_start + 1)).unwrap_or(false))
            } else {
                rule.try_match(&buffer[line_start..line_end], line_start)
            };
            if let Some(matched) = matched {
                return Some((index, matched));
            }
        }
        None
    }

    fn apply_rule(&mut self, rule: usize, matched: &MatchData) -> Result<(), ScriptRuntimeError> {
        let language = self.language;
        match language.rules[rule].action() {
            RuleAction::Script(script) => {
                let mut host = ScriptHost {
                    kinds: &language.kinds,
                    cork: &mut self.cork,
                    matched,
                };
                run_script(script, &mut self.env, &mut host)?;
                Ok(())
            }
            RuleAction::Template {
                name_template,
                kind_letter,
            } => {
                let kind_index = language
                    .kinds
                    .index_by_letter(*kind_letter)
                    .ok_or_else(|| ScriptRuntimeError::InvalidKind(format!("'{}'", kind_letter)))?;
                let full = matched.full();
                let pending = PendingTag {
                    name: expand_template(name_template, matched),
                    kind_index,
                    start: full.map(|g| g.start).unwrap_or(0),
                    end: full.map(|g| g.end),
                    scope: None,
                    extras: BTreeMap::new(),
                };
                self.cork.commit(pending, &language.kinds)?;
                Ok(())
            }
        }
    }

    /// Next scan position after a match at line `cursor`.
    ///
    /// Consuming rules skip past the matched span; everything else moves one
    /// line. Always moves forward, so zero-length matches cannot stall.
    fn advance(
        &self,
        cursor: usize,
        rule: usize,
        matched: &MatchData,
        lines: &[(usize, usize)],
    ) -> usize {
        let next = cursor + 1;
        if !self.language.rules[rule].flags().exclusive {
            return next;
        }
        let consumed_to = match matched.full() {
            Some(group) => group.end,
            None => return next,
        };
        let past_span = lines.partition_point(|(start, _)| *start < consumed_to);
        past_span.max(next)
    }
}

/// Byte spans of each line's content, excluding the line terminator.
fn line_spans(buffer: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut offset = 0usize;
    for segment in buffer.split_inclusive('\n') {
        let content = segment.trim_end_matches('\n');
        let content = content.strip_suffix('\r').unwrap_or(content);
        spans.push((offset, offset + content.len()));
        offset += segment.len();
    }
    spans
}
