//! # tagrex
//!
//! A regex-driven tag extraction engine. A language is defined declaratively
//! as an ordered list of regex rules plus a table of tag kinds; each match is
//! post-processed either by a name template or by a small embedded stack
//! script that computes the tag's kind, name, and location. Committed tags
//! pass through a deferred output queue so later matches can still patch
//! earlier entries (for example to attach a parent scope) before the caller
//! sees them.
//!
//! ```ignore
//! let pod = Language::builder("Pod")
//!     .kind('c', "chapter", "chapters", true)
//!     .kind('s', "section", "sections", true)
//!     .prelude("{{ /kindTable [ /chapter /section ] def }}")
//!     .rule(r"^=head([1-2])[ \t]+(.+)", "", "{{
//!         \2
//!         kindTable \1 0 get ?1 sub get
//!         2 /start _matchloc
//!         _tag _commit pop
//!     }}")
//!     .build()?;
//! let tags = pod.session().run(buffer);
//! ```

pub mod cork;
pub mod dispatch;
pub mod error;
pub mod kinds;
pub mod pattern;
pub mod script;

pub use cork::{CorkQueue, PendingTag, Tag, TagPatch};
pub use dispatch::{Diagnostic, Language, LanguageBuilder, ParseSession};
pub use error::{DefineError, QueueIndexError, ScriptRuntimeError};
pub use kinds::{KindDefinition, KindTable};
pub use pattern::{MatchData, MatchGroup, RuleFlags};
