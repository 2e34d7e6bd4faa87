//! Token-level scanner behavior over start tags, attributes, entities,
//! namespaces, end tags and content, including malformed input.

use xml_editor_core::{PieceTable, ScanEvent, TextStorage, TokenKind, XmlScanner, tag_end_before};

fn token(scanner: &mut XmlScanner, doc: &str, kind: TokenKind, start: usize, end: usize) {
    assert_eq!(scanner.scan(doc), Some(kind), "at offset {start}");
    assert_eq!(
        (scanner.start_offset(), scanner.end_offset()),
        (start, end),
        "span of {kind:?}"
    );
    assert!(!scanner.is_error(), "{kind:?} at {start} flagged unexpectedly");
}

fn error_token(scanner: &mut XmlScanner, doc: &str, kind: TokenKind, start: usize, end: usize) {
    assert_eq!(scanner.scan(doc), Some(kind), "at offset {start}");
    assert_eq!(
        (scanner.start_offset(), scanner.end_offset()),
        (start, end),
        "span of {kind:?}"
    );
    assert!(scanner.is_error(), "{kind:?} at {start} should be flagged");
}

fn end(scanner: &mut XmlScanner, doc: &str, offset: usize) {
    assert_eq!(scanner.scan(doc), None);
    assert_eq!((scanner.start_offset(), scanner.end_offset()), (offset, offset));
    assert_eq!(scanner.event(), ScanEvent::EndDocument);
}

#[test]
fn start_tag() {
    let doc = "<test>";
    let mut s = XmlScanner::new();
    assert_eq!(s.event(), ScanEvent::StartDocument);
    token(&mut s, doc, TokenKind::Special, 0, 1);
    assert_eq!(s.event(), ScanEvent::StartElement);
    token(&mut s, doc, TokenKind::ElementName, 1, 5);
    token(&mut s, doc, TokenKind::Special, 5, 6);
    assert_eq!(s.event(), ScanEvent::StartElement);
    end(&mut s, doc, 6);
    assert!(!s.is_error());
}

#[test]
fn start_tag_cut_off_by_next_tag() {
    let doc = "<test<";
    let mut s = XmlScanner::new();
    token(&mut s, doc, TokenKind::Special, 0, 1);
    error_token(&mut s, doc, TokenKind::ElementName, 1, 5);
    token(&mut s, doc, TokenKind::Special, 5, 6);
    assert_eq!(s.event(), ScanEvent::StartElement);
    end(&mut s, doc, 6);
    assert!(s.is_error(), "range ends inside a tag");
}

#[test]
fn element_name_starting_with_digit() {
    let doc = "<1test>";
    let mut s = XmlScanner::new();
    token(&mut s, doc, TokenKind::Special, 0, 1);
    error_token(&mut s, doc, TokenKind::ElementName, 1, 6);
    token(&mut s, doc, TokenKind::Special, 6, 7);
    end(&mut s, doc, 7);
}

#[test]
fn element_prefix() {
    let doc = "<pre:test>";
    let mut s = XmlScanner::new();
    token(&mut s, doc, TokenKind::Special, 0, 1);
    token(&mut s, doc, TokenKind::ElementPrefix, 1, 4);
    token(&mut s, doc, TokenKind::Special, 4, 5);
    token(&mut s, doc, TokenKind::ElementName, 5, 9);
    token(&mut s, doc, TokenKind::Special, 9, 10);
    end(&mut s, doc, 10);
}

#[test]
fn doubled_prefix_separator() {
    let doc = "<pre::test>";
    let mut s = XmlScanner::new();
    token(&mut s, doc, TokenKind::Special, 0, 1);
    token(&mut s, doc, TokenKind::ElementPrefix, 1, 4);
    token(&mut s, doc, TokenKind::Special, 4, 5);
    error_token(&mut s, doc, TokenKind::ElementName, 5, 10);
    token(&mut s, doc, TokenKind::Special, 10, 11);
    end(&mut s, doc, 11);
}

#[test]
fn attribute_with_value() {
    let doc = "<test att='test'>";
    let mut s = XmlScanner::new();
    token(&mut s, doc, TokenKind::Special, 0, 1);
    token(&mut s, doc, TokenKind::ElementName, 1, 5);
    token(&mut s, doc, TokenKind::Whitespace, 5, 6);
    token(&mut s, doc, TokenKind::AttributeName, 6, 9);
    token(&mut s, doc, TokenKind::Special, 9, 10);
    token(&mut s, doc, TokenKind::AttributeValue, 10, 16);
    token(&mut s, doc, TokenKind::Special, 16, 17);
    end(&mut s, doc, 17);
}

#[test]
fn value_cut_off_by_next_tag() {
    let doc = "<test att='t\"e>s<t'>";
    let mut s = XmlScanner::new();
    token(&mut s, doc, TokenKind::Special, 0, 1);
    token(&mut s, doc, TokenKind::ElementName, 1, 5);
    token(&mut s, doc, TokenKind::Whitespace, 5, 6);
    token(&mut s, doc, TokenKind::AttributeName, 6, 9);
    token(&mut s, doc, TokenKind::Special, 9, 10);
    // The quoted value includes `"` and `>` but an unescaped `<` ends it.
    error_token(&mut s, doc, TokenKind::AttributeValue, 10, 16);
    token(&mut s, doc, TokenKind::Special, 16, 17);
    assert_eq!(s.event(), ScanEvent::StartElement);
    error_token(&mut s, doc, TokenKind::ElementName, 17, 19);
    token(&mut s, doc, TokenKind::Special, 19, 20);
    end(&mut s, doc, 20);
}

#[test]
fn empty_attribute_value() {
    let doc = "<test att=''>";
    let mut s = XmlScanner::new();
    token(&mut s, doc, TokenKind::Special, 0, 1);
    token(&mut s, doc, TokenKind::ElementName, 1, 5);
    token(&mut s, doc, TokenKind::Whitespace, 5, 6);
    token(&mut s, doc, TokenKind::AttributeName, 6, 9);
    token(&mut s, doc, TokenKind::Special, 9, 10);
    token(&mut s, doc, TokenKind::AttributeValue, 10, 12);
    token(&mut s, doc, TokenKind::Special, 12, 13);
    end(&mut s, doc, 13);
}

#[test]
fn value_that_is_one_entity() {
    let doc = "<test att='&amp;'>";
    let mut s = XmlScanner::new();
    token(&mut s, doc, TokenKind::Special, 0, 1);
    token(&mut s, doc, TokenKind::ElementName, 1, 5);
    token(&mut s, doc, TokenKind::Whitespace, 5, 6);
    token(&mut s, doc, TokenKind::AttributeName, 6, 9);
    token(&mut s, doc, TokenKind::Special, 9, 10);
    // The flanking chunks keep the quotes.
    token(&mut s, doc, TokenKind::AttributeValue, 10, 11);
    token(&mut s, doc, TokenKind::EntityReference, 11, 16);
    token(&mut s, doc, TokenKind::AttributeValue, 16, 17);
    token(&mut s, doc, TokenKind::Special, 17, 18);
    end(&mut s, doc, 18);
}

#[test]
fn entity_splits_value_into_chunks() {
    let doc = "<test att='test&amp;test'>";
    let mut s = XmlScanner::new();
    token(&mut s, doc, TokenKind::Special, 0, 1);
    token(&mut s, doc, TokenKind::ElementName, 1, 5);
    token(&mut s, doc, TokenKind::Whitespace, 5, 6);
    token(&mut s, doc, TokenKind::AttributeName, 6, 9);
    token(&mut s, doc, TokenKind::Special, 9, 10);
    token(&mut s, doc, TokenKind::AttributeValue, 10, 15);
    token(&mut s, doc, TokenKind::EntityReference, 15, 20);
    token(&mut s, doc, TokenKind::AttributeValue, 20, 25);
    token(&mut s, doc, TokenKind::Special, 25, 26);
    end(&mut s, doc, 26);
}

#[test]
fn character_reference_in_value() {
    let doc = "<test att='test&#45;test'>";
    let mut s = XmlScanner::new();
    token(&mut s, doc, TokenKind::Special, 0, 1);
    token(&mut s, doc, TokenKind::ElementName, 1, 5);
    token(&mut s, doc, TokenKind::Whitespace, 5, 6);
    token(&mut s, doc, TokenKind::AttributeName, 6, 9);
    token(&mut s, doc, TokenKind::Special, 9, 10);
    token(&mut s, doc, TokenKind::AttributeValue, 10, 15);
    token(&mut s, doc, TokenKind::EntityReference, 15, 20);
    token(&mut s, doc, TokenKind::AttributeValue, 20, 25);
    token(&mut s, doc, TokenKind::Special, 25, 26);
    end(&mut s, doc, 26);
}

#[test]
fn malformed_entity_consumes_through_semicolon() {
    let doc = "<test att='test&a mp;test'>";
    let mut s = XmlScanner::new();
    token(&mut s, doc, TokenKind::Special, 0, 1);
    token(&mut s, doc, TokenKind::ElementName, 1, 5);
    token(&mut s, doc, TokenKind::Whitespace, 5, 6);
    token(&mut s, doc, TokenKind::AttributeName, 6, 9);
    token(&mut s, doc, TokenKind::Special, 9, 10);
    token(&mut s, doc, TokenKind::AttributeValue, 10, 15);
    error_token(&mut s, doc, TokenKind::EntityReference, 15, 21);
    token(&mut s, doc, TokenKind::AttributeValue, 21, 26);
    token(&mut s, doc, TokenKind::Special, 26, 27);
    end(&mut s, doc, 27);
}

#[test]
fn attribute_prefix() {
    let doc = "<test pre:att='test'>";
    let mut s = XmlScanner::new();
    token(&mut s, doc, TokenKind::Special, 0, 1);
    token(&mut s, doc, TokenKind::ElementName, 1, 5);
    token(&mut s, doc, TokenKind::Whitespace, 5, 6);
    token(&mut s, doc, TokenKind::AttributePrefix, 6, 9);
    token(&mut s, doc, TokenKind::Special, 9, 10);
    token(&mut s, doc, TokenKind::AttributeName, 10, 13);
    token(&mut s, doc, TokenKind::Special, 13, 14);
    token(&mut s, doc, TokenKind::AttributeValue, 14, 20);
    token(&mut s, doc, TokenKind::Special, 20, 21);
    end(&mut s, doc, 21);
}

#[test]
fn namespace_declaration_with_prefix() {
    let doc = "<test xmlns:pre='test'>";
    let mut s = XmlScanner::new();
    token(&mut s, doc, TokenKind::Special, 0, 1);
    token(&mut s, doc, TokenKind::ElementName, 1, 5);
    token(&mut s, doc, TokenKind::Whitespace, 5, 6);
    token(&mut s, doc, TokenKind::NamespaceName, 6, 11);
    token(&mut s, doc, TokenKind::Special, 11, 12);
    token(&mut s, doc, TokenKind::NamespacePrefix, 12, 15);
    token(&mut s, doc, TokenKind::Special, 15, 16);
    token(&mut s, doc, TokenKind::NamespaceValue, 16, 22);
    token(&mut s, doc, TokenKind::Special, 22, 23);
    end(&mut s, doc, 23);
}

#[test]
fn default_namespace_declaration() {
    let doc = "<test xmlns='test'>";
    let mut s = XmlScanner::new();
    token(&mut s, doc, TokenKind::Special, 0, 1);
    token(&mut s, doc, TokenKind::ElementName, 1, 5);
    token(&mut s, doc, TokenKind::Whitespace, 5, 6);
    token(&mut s, doc, TokenKind::NamespaceName, 6, 11);
    token(&mut s, doc, TokenKind::Special, 11, 12);
    token(&mut s, doc, TokenKind::NamespaceValue, 12, 18);
    token(&mut s, doc, TokenKind::Special, 18, 19);
    end(&mut s, doc, 19);
}

#[test]
fn self_closing_tag() {
    let doc = "<test/>";
    let mut s = XmlScanner::new();
    token(&mut s, doc, TokenKind::Special, 0, 1);
    assert_eq!(s.event(), ScanEvent::StartElement);
    token(&mut s, doc, TokenKind::ElementName, 1, 5);
    token(&mut s, doc, TokenKind::Special, 5, 7);
    assert_eq!(s.event(), ScanEvent::EndElement);
    end(&mut s, doc, 7);
}

#[test]
fn self_closing_tag_with_whitespace_everywhere() {
    let doc = "<test att  =  \"test\"  />";
    let mut s = XmlScanner::new();
    token(&mut s, doc, TokenKind::Special, 0, 1);
    token(&mut s, doc, TokenKind::ElementName, 1, 5);
    token(&mut s, doc, TokenKind::Whitespace, 5, 6);
    token(&mut s, doc, TokenKind::AttributeName, 6, 9);
    token(&mut s, doc, TokenKind::Whitespace, 9, 11);
    token(&mut s, doc, TokenKind::Special, 11, 12);
    token(&mut s, doc, TokenKind::Whitespace, 12, 14);
    token(&mut s, doc, TokenKind::AttributeValue, 14, 20);
    token(&mut s, doc, TokenKind::Whitespace, 20, 22);
    token(&mut s, doc, TokenKind::Special, 22, 24);
    assert_eq!(s.event(), ScanEvent::EndElement);
    end(&mut s, doc, 24);
}

#[test]
fn end_tag() {
    let doc = "</test>";
    let mut s = XmlScanner::new();
    token(&mut s, doc, TokenKind::Special, 0, 2);
    assert_eq!(s.event(), ScanEvent::EndElement);
    token(&mut s, doc, TokenKind::ElementName, 2, 6);
    token(&mut s, doc, TokenKind::Special, 6, 7);
    end(&mut s, doc, 7);
}

#[test]
fn end_tag_name_starting_with_digit() {
    let doc = "</1test>";
    let mut s = XmlScanner::new();
    token(&mut s, doc, TokenKind::Special, 0, 2);
    error_token(&mut s, doc, TokenKind::ElementName, 2, 7);
    token(&mut s, doc, TokenKind::Special, 7, 8);
    end(&mut s, doc, 8);
}

#[test]
fn end_tag_with_prefix() {
    let doc = "</pre:test>";
    let mut s = XmlScanner::new();
    token(&mut s, doc, TokenKind::Special, 0, 2);
    token(&mut s, doc, TokenKind::ElementPrefix, 2, 5);
    token(&mut s, doc, TokenKind::Special, 5, 6);
    token(&mut s, doc, TokenKind::ElementName, 6, 10);
    token(&mut s, doc, TokenKind::Special, 10, 11);
    end(&mut s, doc, 11);
}

#[test]
fn end_tag_cut_off_by_openers() {
    let doc = "</test<<";
    let mut s = XmlScanner::new();
    token(&mut s, doc, TokenKind::Special, 0, 2);
    assert_eq!(s.event(), ScanEvent::EndElement);
    error_token(&mut s, doc, TokenKind::ElementName, 2, 6);
    // A `<` where the end tag expected `>` is itself an error; the one
    // after it opens a tag from scratch.
    error_token(&mut s, doc, TokenKind::Special, 6, 7);
    assert_eq!(s.event(), ScanEvent::StartElement);
    token(&mut s, doc, TokenKind::Special, 7, 8);
    assert_eq!(s.event(), ScanEvent::StartElement);
    end(&mut s, doc, 8);
    assert!(s.is_error(), "range ends inside a tag");
}

#[test]
fn element_content_stops_only_at_tag_opener() {
    let doc = "<test>this \" is test > / content > </test>";
    let mut s = XmlScanner::new();
    token(&mut s, doc, TokenKind::Special, 0, 1);
    token(&mut s, doc, TokenKind::ElementName, 1, 5);
    token(&mut s, doc, TokenKind::Special, 5, 6);
    token(&mut s, doc, TokenKind::ElementValue, 6, 35);
    assert_eq!(s.event(), ScanEvent::Characters);
    token(&mut s, doc, TokenKind::Special, 35, 37);
    assert_eq!(s.event(), ScanEvent::EndElement);
    token(&mut s, doc, TokenKind::ElementName, 37, 41);
    token(&mut s, doc, TokenKind::Special, 41, 42);
    end(&mut s, doc, 42);
}

#[test]
fn entity_splits_element_content() {
    let doc = "<test>test&amp;test</test>";
    let mut s = XmlScanner::new();
    token(&mut s, doc, TokenKind::Special, 0, 1);
    token(&mut s, doc, TokenKind::ElementName, 1, 5);
    token(&mut s, doc, TokenKind::Special, 5, 6);
    token(&mut s, doc, TokenKind::ElementValue, 6, 10);
    token(&mut s, doc, TokenKind::EntityReference, 10, 15);
    token(&mut s, doc, TokenKind::ElementValue, 15, 19);
    token(&mut s, doc, TokenKind::Special, 19, 21);
    token(&mut s, doc, TokenKind::ElementName, 21, 25);
    token(&mut s, doc, TokenKind::Special, 25, 26);
    end(&mut s, doc, 26);
}

#[test]
fn percent_is_plain_content() {
    let doc = "<test>%test</test>";
    let mut s = XmlScanner::new();
    token(&mut s, doc, TokenKind::Special, 0, 1);
    token(&mut s, doc, TokenKind::ElementName, 1, 5);
    token(&mut s, doc, TokenKind::Special, 5, 6);
    token(&mut s, doc, TokenKind::ElementValue, 6, 11);
    token(&mut s, doc, TokenKind::Special, 11, 13);
    token(&mut s, doc, TokenKind::ElementName, 13, 17);
    token(&mut s, doc, TokenKind::Special, 17, 18);
    end(&mut s, doc, 18);
}

#[test]
fn missing_equals_flags_the_gap_not_the_value() {
    let doc = "<test att 'test'>";
    let mut s = XmlScanner::new();
    token(&mut s, doc, TokenKind::Special, 0, 1);
    token(&mut s, doc, TokenKind::ElementName, 1, 5);
    token(&mut s, doc, TokenKind::Whitespace, 5, 6);
    token(&mut s, doc, TokenKind::AttributeName, 6, 9);
    error_token(&mut s, doc, TokenKind::Whitespace, 9, 10);
    token(&mut s, doc, TokenKind::AttributeValue, 10, 16);
    token(&mut s, doc, TokenKind::Special, 16, 17);
    end(&mut s, doc, 17);
}

#[test]
fn unquoted_value_swallows_the_tag_end() {
    let doc = "<test att=atesta>";
    let mut s = XmlScanner::new();
    token(&mut s, doc, TokenKind::Special, 0, 1);
    token(&mut s, doc, TokenKind::ElementName, 1, 5);
    token(&mut s, doc, TokenKind::Whitespace, 5, 6);
    token(&mut s, doc, TokenKind::AttributeName, 6, 9);
    token(&mut s, doc, TokenKind::Special, 9, 10);
    error_token(&mut s, doc, TokenKind::AttributeName, 10, 17);
    end(&mut s, doc, 17);
    assert!(s.is_error(), "the tag never closed");
}

#[test]
fn next_tag_walks_completed_tags() {
    let doc = "<test><test><test/> <test> <test/></test> </test></test>";
    let mut s = XmlScanner::new();
    // One event per tag, reported once its `>` or `/>` is consumed;
    // self-closing tags are end elements only.
    let expected = [
        ScanEvent::StartElement,
        ScanEvent::StartElement,
        ScanEvent::EndElement,
        ScanEvent::StartElement,
        ScanEvent::EndElement,
        ScanEvent::EndElement,
        ScanEvent::EndElement,
        ScanEvent::EndElement,
    ];
    for (i, expected) in expected.into_iter().enumerate() {
        assert_eq!(s.get_next_tag(doc), expected, "tag event {i}");
    }
    assert_eq!(s.get_next_tag(doc), ScanEvent::EndDocument);
    assert_eq!(s.get_next_tag(doc), ScanEvent::EndDocument);
}

#[test]
fn next_tag_offsets_follow_the_consumed_bracket() {
    let doc = "<a>text</a>";
    let mut s = XmlScanner::new();
    assert_eq!(s.get_next_tag(doc), ScanEvent::StartElement);
    assert_eq!((s.start_offset(), s.end_offset()), (2, 3));
    assert_eq!(s.get_next_tag(doc), ScanEvent::EndElement);
    assert_eq!((s.start_offset(), s.end_offset()), (10, 11));
    assert_eq!(s.get_next_tag(doc), ScanEvent::EndDocument);
}

#[test]
fn rescan_after_edit_from_last_tag_end() {
    let mut table = PieceTable::new("<root><a>value</a></root>");
    let mut s = XmlScanner::new();
    s.set_valid(false);

    // Edit inside the <a> element, then restart the scan at the last `>`
    // before the edit, the way a view resynchronizes after a keystroke.
    table.insert(9, "new ");
    let edit_offset = 9;
    let restart = tag_end_before(&table, edit_offset);
    assert_eq!(restart, 9);
    s.set_range(&table, restart, table.len()).unwrap();
    s.set_valid(true);

    assert_eq!(s.scan(&table), Some(TokenKind::ElementValue));
    assert_eq!(
        table
            .get_text(s.start_offset(), s.end_offset() - s.start_offset())
            .unwrap(),
        "new value"
    );
    assert_eq!(s.scan(&table), Some(TokenKind::Special));
    assert_eq!(s.event(), ScanEvent::EndElement);
}
