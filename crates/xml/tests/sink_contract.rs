use xml::{NodeKind, WriteOptions, XmlDocument, XmlError, XmlSink};

/// Builds `<list><a/><b/></list>` through the trait only, writing `b` first
/// into a detached buffer and moving it into place afterwards.
fn build_out_of_order<S: XmlSink>(sink: &mut S) -> Result<(), XmlError> {
    let root = sink.root();
    let list = sink.element(root, "list")?;
    let late = sink.detached();
    sink.element(late, "b")?;
    let early = sink.detached();
    sink.element(early, "a")?;
    for buffer in [early, late] {
        for child in sink.children(buffer) {
            sink.append(list, child)?;
        }
        sink.remove(buffer)?;
    }
    Ok(())
}

#[test]
fn buffers_splice_into_place_through_the_trait() {
    let mut doc = XmlDocument::new();
    build_out_of_order(&mut doc).unwrap();
    assert_eq!(
        doc.serialize(&WriteOptions::headless()),
        "<list><a/><b/></list>"
    );
    let list = doc.document_element().unwrap();
    assert!(matches!(doc.kind(list), Some(NodeKind::Element { name, .. }) if name == "list"));
}

#[test]
fn imported_fragments_are_copied_not_moved() {
    let mut fragment = XmlDocument::new();
    let root = fragment.element(fragment.root(), "root").unwrap();
    fragment.text(root, "test").unwrap();

    let mut doc = XmlDocument::new();
    let parent = doc.element(doc.root(), "parent").unwrap();
    XmlSink::import(&mut doc, parent, &fragment).unwrap();
    XmlSink::import(&mut doc, parent, &fragment).unwrap();
    assert_eq!(
        doc.serialize(&WriteOptions::headless()),
        "<parent><root>test</root><root>test</root></parent>"
    );
    assert_eq!(
        fragment.serialize(&WriteOptions::headless()),
        "<root>test</root>"
    );
}

#[test]
fn removed_nodes_cannot_be_written_to() {
    let mut doc = XmlDocument::new();
    let buffer = doc.detached();
    doc.remove(buffer).unwrap();
    assert_eq!(
        XmlSink::text(&mut doc, buffer, "late"),
        Err(XmlError::UnknownNode(buffer))
    );
}
