use super::*;
use crate::builtin::{comment, fragment};
use crate::context::{Context, declare_context, read_context};
use crate::element::{Component, async_component, component, tag};
use crate::node::Pending;
use crate::render::render;
use futures::executor::block_on;
use jsx_test_support::delay;
use std::cell::RefCell;
use std::rc::Rc;
use xml::WriteOptions;

fn headless(doc: &XmlDocument) -> String {
    doc.serialize(&WriteOptions::headless())
}

fn pretty(doc: &XmlDocument) -> String {
    doc.serialize(&WriteOptions::pretty().with_headless(true))
}

/// Async component that waits `polls` suspensions, logs its label, and
/// renders `<label/>`.
fn slow(label: &'static str, polls: usize, log: Rc<RefCell<Vec<&'static str>>>) -> Node {
    Node::pending(async move {
        delay(polls).await;
        log.borrow_mut().push(label);
        Ok(tag(label).into())
    })
}

#[test]
fn output_follows_declaration_order_not_completion_order() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let tree = tag("root")
        .child(slow("a", 5, log.clone()))
        .child(slow("b", 0, log.clone()))
        .child(slow("c", 2, log.clone()));
    let doc = block_on(render_async(tree)).unwrap();
    assert_eq!(*log.borrow(), ["b", "c", "a"]);
    assert_eq!(headless(&doc), "<root><a/><b/><c/></root>");
}

#[test]
fn sync_trees_match_the_sync_engine() {
    let tree = Node::from(
        tag("root").child(
            tag("item")
                .attr("x", 5)
                .child(tag("test"))
                .child("text")
                .child(tag("item").child("Child content")),
        ),
    );
    let sync_doc = render(tree.clone()).unwrap();
    let async_doc = block_on(render_async(tree)).unwrap();
    assert_eq!(headless(&async_doc), headless(&sync_doc));
    assert_eq!(pretty(&async_doc), pretty(&sync_doc));
    assert_eq!(
        pretty(&async_doc),
        "<root>\n  <item x=\"5\">\n    <test/>\n    text\n    <item>Child content</item>\n  </item>\n</root>"
    );
}

#[test]
fn adjacent_text_from_branches_is_merged() {
    let tree = tag("root")
        .child("a")
        .child(Pending::new(async {
            delay(1).await;
            Ok(Node::from("b"))
        }))
        .child(2)
        .child(3);
    let doc = block_on(render_async(tree)).unwrap();
    assert_eq!(headless(&doc), "<root>ab23</root>");
    let root = doc.document_element().unwrap();
    assert_eq!(doc.children(root).len(), 1);
}

#[test]
fn pending_values_resolve_recursively() {
    let tree = tag("root").child(Pending::new(async {
        delay(1).await;
        Ok(Node::pending(async {
            delay(1).await;
            Ok(tag("deep").child("x").into())
        }))
    }));
    let doc = block_on(render_async(tree)).unwrap();
    assert_eq!(headless(&doc), "<root><deep>x</deep></root>");
}

#[test]
fn pending_root_and_top_level_comment() {
    let tree = fragment(vec![
        Node::from(comment("comment 2")),
        Node::pending(async { Ok(tag("root").into()) }),
    ]);
    let doc = block_on(render_async(tree)).unwrap();
    assert_eq!(headless(&doc), "<!--comment 2--><root/>");
}

#[test]
fn async_components_receive_props() {
    let greet = async_component("Greet", |props| async move {
        delay(1).await;
        let name = props.get("name").map(ToString::to_string).unwrap_or_default();
        Ok(tag("hello").attr("to", name).children(props.children()).into())
    });
    let tree = tag("root").child(greet.element().prop("name", "world").child("!"));
    let doc = block_on(render_async(tree)).unwrap();
    assert_eq!(headless(&doc), r#"<root><hello to="world">!</hello></root>"#);
}

#[derive(Debug)]
struct AsyncFailure;

impl std::fmt::Display for AsyncFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Async component error")
    }
}

impl std::error::Error for AsyncFailure {}

#[test]
fn first_failure_rejects_the_render_unchanged() {
    let failing = async_component("Failing", |_| async {
        delay(1).await;
        Err(RenderError::component(AsyncFailure))
    });
    let log = Rc::new(RefCell::new(Vec::new()));
    let tree = tag("root")
        .child(slow("ok", 0, log))
        .child(failing.element());
    let err = block_on(render_async(tree)).unwrap_err();
    assert_eq!(err.to_string(), "Async component error");
    assert!(err.downcast_ref::<AsyncFailure>().is_some());
}

#[test]
fn unsupported_values_fail_in_any_branch() {
    let tree = tag("root").child(tag("a")).child(Pending::ready(tag("1bad")));
    let err = block_on(render_async(tree)).unwrap_err();
    assert!(matches!(err, RenderError::Xml(_)), "{err:?}");
}

fn keyed_probe(ctx: &Context<String>, label: &'static str, polls: usize) -> Component {
    let ctx = ctx.clone();
    async_component(label, move |props| {
        let ctx = ctx.clone();
        async move {
            let expected = props.key().map(ToString::to_string).unwrap_or_default();
            let before = read_context(&ctx)?;
            delay(polls).await;
            let after = read_context(&ctx)?;
            assert_eq!(before, expected);
            assert_eq!(after, expected);
            Ok(tag("div").child(format!("{label}: {after}")).into())
        }
    })
}

fn passthrough(ctx: &Context<String>) -> Component {
    let ctx = ctx.clone();
    async_component("Passthrough", move |props| {
        let ctx = ctx.clone();
        async move {
            let expected = props.key().map(ToString::to_string).unwrap_or_default();
            assert_eq!(read_context(&ctx)?, expected);
            delay(1).await;
            Ok(props.children())
        }
    })
}

const KEYS: [&str; 5] = ["default", "key1", "key2", "more", "updated-by-first-sibling"];

#[test]
fn concurrent_renders_keep_context_scoped() {
    let ctx = declare_context(String::from("unset"));
    let first = keyed_probe(&ctx, "First", 2);
    let second = keyed_probe(&ctx, "Second", 1);
    let wrapper = passthrough(&ctx);

    let renders = KEYS.iter().map(|&key| {
        let tree = ctx.provider(
            key.to_string(),
            tag("item")
                .child(wrapper.element().key(key).child(first.element().key(key)))
                .child(second.element().key(key)),
        );
        render_async(tree)
    });
    let results = block_on(futures::future::try_join_all(renders)).unwrap();

    for (key, doc) in KEYS.iter().zip(&results) {
        assert_eq!(
            pretty(doc),
            format!("<item>\n  <div>First: {key}</div>\n  <div>Second: {key}</div>\n</item>")
        );
    }
    assert_eq!(read_context(&ctx).unwrap(), "unset");
}

#[test]
fn nested_renders_do_not_disturb_the_outer_context() {
    let ctx = declare_context(String::from("unset"));
    let first = keyed_probe(&ctx, "First", 2);
    let second = keyed_probe(&ctx, "Second", 1);
    let wrapper = passthrough(&ctx);
    let nested = {
        let ctx = ctx.clone();
        let wrapper = wrapper.clone();
        async_component("Nested", move |props| {
            let ctx = ctx.clone();
            let wrapper = wrapper.clone();
            async move {
                let expected = props.key().map(ToString::to_string).unwrap_or_default();
                delay(1).await;
                assert_eq!(read_context(&ctx)?, expected);
                let inner = ctx.provider(
                    "nestedKey".to_string(),
                    tag("root")
                        .attr("nested", "true")
                        .child(wrapper.element().key("nestedKey").child("nested")),
                );
                let view = render_async(inner).await?;
                assert_eq!(read_context(&ctx)?, expected);
                Ok(view.into())
            }
        })
    };

    let renders = KEYS.iter().map(|&key| {
        let tree = ctx.provider(
            key.to_string(),
            tag("item")
                .child(wrapper.element().key(key).child(first.element().key(key)))
                .child(nested.element().key(key))
                .child(second.element().key(key)),
        );
        render_async(tree)
    });
    let results = block_on(futures::future::try_join_all(renders)).unwrap();

    for (key, doc) in KEYS.iter().zip(&results) {
        assert_eq!(
            pretty(doc),
            format!(
                "<item>\n  <div>First: {key}</div>\n  <root nested=\"true\">nested</root>\n  <div>Second: {key}</div>\n</item>"
            )
        );
    }
}

#[test]
fn nested_render_can_inherit_the_callers_context() {
    let ctx = declare_context(String::from("unset"));
    let reader = {
        let ctx = ctx.clone();
        component("Reader", move |_| Ok(read_context(&ctx)?.into()))
    };
    let outer = {
        let reader = reader.clone();
        async_component("Outer", move |_| {
            let reader = reader.clone();
            async move {
                delay(1).await;
                let fresh = render_async(tag("fresh").child(reader.element())).await?;
                let inherited = render_async_with(
                    tag("inherited").child(reader.element()),
                    &RenderOptions::inheriting(),
                )
                .await?;
                Ok(Node::from(vec![Node::from(fresh), Node::from(inherited)]))
            }
        })
    };
    let tree = ctx.provider("outer".to_string(), tag("root").child(outer.element()));
    let doc = block_on(render_async(tree)).unwrap();
    assert_eq!(
        headless(&doc),
        "<root><fresh>unset</fresh><inherited>outer</inherited></root>"
    );
}

#[test]
fn rendering_twice_gives_identical_output() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let shared = Pending::new({
        let log = log.clone();
        async move {
            delay(2).await;
            log.borrow_mut().push("evaluated");
            Ok(Node::from("once"))
        }
    });
    let tree = Node::from(tag("root").child(shared.clone()).child(shared));
    let first = block_on(render_async(tree.clone())).unwrap();
    let second = block_on(render_async(tree)).unwrap();
    assert_eq!(headless(&first), "<root>onceonce</root>");
    assert_eq!(headless(&first), headless(&second));
    assert_eq!(*log.borrow(), ["evaluated"]);
}

#[test]
fn shared_pending_keeps_its_first_context_across_awaits() {
    let ctx = declare_context("unset".to_string());
    let reads = Rc::new(RefCell::new(Vec::new()));
    let shared = Pending::new({
        let ctx = ctx.clone();
        let reads = reads.clone();
        async move {
            let before = read_context(&ctx)?;
            delay(3).await;
            let after = read_context(&ctx)?;
            reads.borrow_mut().push((before.clone(), after.clone()));
            Ok(Node::from(format!("{before}/{after}")))
        }
    });
    let tree = tag("root")
        .child(tag("x").child(ctx.provider("a".to_string(), shared.clone())))
        .child(tag("y").child(ctx.provider("b".to_string(), shared)));
    let doc = block_on(render_async(tree)).unwrap();
    assert_eq!(headless(&doc), "<root><x>a/a</x><y>a/a</y></root>");
    assert_eq!(*reads.borrow(), [("a".to_string(), "a".to_string())]);
}

#[test]
fn render_async_into_returns_the_sink() {
    let mut doc = XmlDocument::new();
    let existing = doc.element(doc.root(), "existing").unwrap();
    doc.text(existing, "kept").unwrap();
    let tree = Node::from(vec![tag("a"), tag("b")]);
    let doc = block_on(render_async_into(doc, tree, ContextSnapshot::seeded())).unwrap();
    assert_eq!(headless(&doc), "<existing>kept</existing><a/><b/>");
}

#[test]
fn concurrent_renders_on_a_local_pool() {
    use futures::executor::LocalPool;
    use futures::task::LocalSpawnExt;

    let ctx = declare_context(0u32);
    let reader = keyed_number(&ctx);
    let mut pool = LocalPool::new();
    let outputs = Rc::new(RefCell::new(Vec::new()));
    for n in 0..8u32 {
        let tree = ctx.provider(n, tag("n").child(reader.element()));
        let outputs = outputs.clone();
        pool.spawner()
            .spawn_local(async move {
                let doc = render_async(tree).await.unwrap();
                outputs.borrow_mut().push((n, headless(&doc)));
            })
            .unwrap();
    }
    pool.run();
    let mut outputs = outputs.take();
    outputs.sort();
    for (n, xml) in outputs {
        assert_eq!(xml, format!("<n>{n}</n>"));
    }
}

fn keyed_number(ctx: &Context<u32>) -> Component {
    let ctx = ctx.clone();
    async_component("Number", move |_| {
        let ctx = ctx.clone();
        async move {
            let before = read_context(&ctx)?;
            delay(before as usize % 3).await;
            assert_eq!(read_context(&ctx)?, before);
            Ok(before.into())
        }
    })
}
