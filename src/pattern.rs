//! Regex rule matching
//!
//! A rule pairs a compiled pattern with flags and an action. Applying a rule
//! to a slice of the input yields the capture groups with exact byte offsets
//! into the original buffer; group 0 spans the full match and optional
//! groups that did not participate stay absent, which is distinguishable
//! from an empty capture.

use crate::error::DefineError;
use crate::script::compile::CompiledScript;
use regex::RegexBuilder;

/// Per-rule matching flags.
///
/// `exclusive` rules consume the matched span: scanning resumes past the
/// match instead of at the next line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuleFlags {
    /// Match case-insensitively.
    pub case_insensitive: bool,
    /// Match against the buffer from the scan position instead of one line;
    /// `^` then anchors at every line start.
    pub multiline: bool,
    /// Consume the matched span, advancing the scan cursor past it.
    pub exclusive: bool,
}

impl RuleFlags {
    /// Parse a flag string: `i` case-insensitive, `m` multiline,
    /// `x` exclusive. Unknown letters are ignored.
    pub fn parse(flags: &str) -> Self {
        Self {
            case_insensitive: flags.contains('i'),
            multiline: flags.contains('m'),
            exclusive: flags.contains('x'),
        }
    }
}

/// One capture group of a successful match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchGroup {
    /// Captured text.
    pub text: String,
    /// Byte offset of the group start in the original buffer.
    pub start: usize,
    /// Byte offset just past the group end in the original buffer.
    pub end: usize,
}

/// All capture groups of one successful match.
///
/// Index 0 is the whole match; unmatched optional groups are `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchData {
    groups: Vec<Option<MatchGroup>>,
}

impl MatchData {
    /// Empty match context, used when running prelude scripts.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The group at `index`, if it participated in the match.
    pub fn group(&self, index: usize) -> Option<&MatchGroup> {
        self.groups.get(index).and_then(|g| g.as_ref())
    }

    /// The whole-match group.
    ///
    /// Present on every successful match; absent only on the empty context.
    pub fn full(&self) -> Option<&MatchGroup> {
        self.group(0)
    }

    /// Number of groups, counting the whole match.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Check if this is the empty context.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// What a rule does with its match.
#[derive(Debug, Clone)]
pub enum RuleAction {
    /// Run a compiled script against the match.
    Script(CompiledScript),
    /// Build one tag directly: a name template with `\N` references and a
    /// kind letter resolved against the language's kind table.
    Template {
        name_template: String,
        kind_letter: char,
    },
}

/// A compiled tag rule: pattern, flags, action.
#[derive(Debug, Clone)]
pub struct TagRule {
    regex: regex::Regex,
    flags: RuleFlags,
    action: RuleAction,
}

impl TagRule {
    /// Compile a rule from pattern text.
    pub fn compile(pattern: &str, flags: RuleFlags, action: RuleAction) -> Result<Self, DefineError> {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(flags.case_insensitive)
            .multi_line(flags.multiline)
            .build()
            .map_err(|err| DefineError::PatternCompile {
                pattern: pattern.to_string(),
                message: err.to_string(),
            })?;
        Ok(Self {
            regex,
            flags,
            action,
        })
    }

    /// The rule's flags.
    pub fn flags(&self) -> RuleFlags {
        self.flags
    }

    /// The rule's action.
    pub fn action(&self) -> &RuleAction {
        &self.action
    }

    /// Apply the rule to `haystack`, a slice of the original buffer starting
    /// at byte offset `base`. Offsets in the result are buffer-absolute.
    ///
    /// No match is a normal outcome, not an error.
    pub fn try_match(&self, haystack: &str, base: usize) -> Option<MatchData> {
        let captures = self.regex.captures(haystack)?;
        let groups = (0..captures.len())
            .map(|i| {
                captures.get(i).map(|m| MatchGroup {
                    text: m.as_str().to_string(),
                    start: base + m.start(),
                    end: base + m.end(),
                })
            })
            .collect();
        Some(MatchData { groups })
    }
}

/// Expand a `\N` name template against a match.
///
/// Unmatched groups expand to the empty string; `\\` is a literal backslash.
pub fn expand_template(template: &str, matched: &MatchData) -> String {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some(digit @ '0'..='9') => {
                let group = digit as usize - '0' as usize;
                if let Some(g) = matched.group(group) {
                    out.push_str(&g.text);
                }
            }
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
