//! End-to-end tests for a Pod-style heading language
//!
//! The language mirrors the classic Pod definition: four heading kinds, one
//! programmable rule that captures the heading level and title, and a
//! prelude binding the kind symbols in an array. The rule script maps the
//! captured level digit to a kind index arithmetically and reports the tag
//! at the title's offset, not the keyword's.

use rstest::rstest;
use tagrex::Language;

const POD_PRELUDE: &str = "{{\n\
    /kindTable [ /chapter /section /subsection /subsubsection ] def\n\
}}";

const POD_HEADING_SCRIPT: &str = "{{\n\
    \\2\n\
    kindTable \\1 0 get ?1 sub get\n\
    2 /start _matchloc\n\
    _tag _commit pop\n\
}}";

fn pod() -> Language {
    Language::builder("Pod")
        .kind('c', "chapter", "chapters", true)
        .kind('s', "section", "sections", true)
        .kind('S', "subsection", "subsections", true)
        .kind('t', "subsubsection", "subsubsections", true)
        .prelude(POD_PRELUDE)
        .rule(r"^=head([1-4])[ \t]+(.+)", "", POD_HEADING_SCRIPT)
        .build()
        .expect("Pod language definition compiles")
}

#[test]
fn test_head2_commits_section_at_title_offset() {
    let language = pod();
    let buffer = "=head2 Methods\n";
    let tags = language.session().run(buffer);

    assert_eq!(tags.len(), 1);
    let tag = &tags[0];
    assert_eq!(tag.name, "Methods");
    assert_eq!(language.kinds().lookup(tag.kind_index).unwrap().name, "section");
    assert_eq!(tag.start, buffer.find("Methods").unwrap());
}

#[rstest]
#[case("=head1 Intro", "chapter")]
#[case("=head2 Methods", "section")]
#[case("=head3 Details", "subsection")]
#[case("=head4 Fine Print", "subsubsection")]
fn test_heading_level_selects_kind(#[case] line: &str, #[case] kind: &str) {
    let language = pod();
    let tags = language.session().run(line);
    assert_eq!(tags.len(), 1);
    assert_eq!(language.kinds().lookup(tags[0].kind_index).unwrap().name, kind);
}

#[test]
fn test_document_yields_tags_in_order() {
    let language = pod();
    let buffer = "\
=head1 NAME

Some prose that is not a heading.

=head2 Methods

=head3 new

=head2 Errors
";
    let tags = language.session().run(buffer);
    let names: Vec<_> = tags.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["NAME", "Methods", "new", "Errors"]);

    // Every tag points at its title, not at the =headN keyword.
    for tag in &tags {
        assert_eq!(&buffer[tag.start..tag.start + tag.name.len()], tag.name);
    }
}

#[test]
fn test_unknown_heading_level_is_ignored() {
    let language = pod();
    let mut session = language.session();
    let tags = session.run("=head9 Nope\n=over 4\n");
    assert!(tags.is_empty());
    assert!(session.diagnostics().is_empty());
}

#[test]
fn test_disabled_kind_suppressed_without_moving_others() {
    let build = |sections_enabled: bool| {
        Language::builder("Pod")
            .kind('c', "chapter", "chapters", true)
            .kind('s', "section", "sections", sections_enabled)
            .kind('S', "subsection", "subsections", true)
            .kind('t', "subsubsection", "subsubsections", true)
            .prelude(POD_PRELUDE)
            .rule(r"^=head([1-4])[ \t]+(.+)", "", POD_HEADING_SCRIPT)
            .build()
            .unwrap()
    };
    let buffer = "=head1 A\n=head2 B\n=head3 C\n";

    let full = build(true);
    let all = full.session().run(buffer);
    assert_eq!(all.len(), 3);

    let partial = build(false);
    let filtered = partial.session().run(buffer);
    let names: Vec<_> = filtered.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["A", "C"]);
    // The subsection kept the index it had with all kinds enabled.
    assert_eq!(filtered[1].kind_index, all[2].kind_index);
}

#[test]
fn test_sections_record_their_chapter_scope() {
    let language = Language::builder("PodScoped")
        .kind('c', "chapter", "chapters", true)
        .kind('s', "section", "sections", true)
        .rule(
            r"^=head1[ \t]+(.+)",
            "",
            "{{ \\1 /chapter _tag _commit /lastChapter exch def }}",
        )
        .rule(
            r"^=head2[ \t]+(.+)",
            "",
            "{{ \\1 /section _tag _commit lastChapter _scopeset }}",
        )
        .build()
        .unwrap();

    let tags = language
        .session()
        .run("=head1 One\n=head2 A\n=head2 B\n=head1 Two\n=head2 C\n");
    let described: Vec<_> = tags
        .iter()
        .map(|t| (t.name.as_str(), t.scope))
        .collect();
    assert_eq!(
        described,
        vec![
            ("One", None),
            ("A", Some(0)),
            ("B", Some(0)),
            ("Two", None),
            ("C", Some(3)),
        ]
    );
}

#[test]
fn test_script_failure_does_not_poison_later_matches() {
    // Group 1 is optional; the script errors when it is absent.
    let language = Language::builder("Items")
        .kind('i', "item", "items", true)
        .rule(r"^=item(?:[ \t]+(\S+))?", "", "{{ \\1 /item _tag _commit pop }}")
        .build()
        .unwrap();

    let mut session = language.session();
    let tags = session.run("=item\n=item first\n=item\n=item second\n");
    let names: Vec<_> = tags.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["first", "second"]);

    let failed_lines: Vec<_> = session.diagnostics().iter().map(|d| d.line).collect();
    assert_eq!(failed_lines, vec![1, 3]);
}

#[test]
fn test_tag_stream_serializes() {
    let language = pod();
    let tags = language.session().run("=head2 Methods\n");
    let json = serde_json::to_value(&tags).unwrap();

    assert_eq!(json[0]["name"], "Methods");
    assert_eq!(json[0]["kind_index"], 1);
    assert_eq!(json[0]["start"], 7);
    assert_eq!(json[0]["scope"], serde_json::Value::Null);
}
