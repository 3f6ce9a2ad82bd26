// Dispatcher and fade integration tests
//
// The primitive layer exercised end to end: delegated dispatch through a
// real tree, token-based teardown, and fade round-trips on the manual
// clock.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use lacekit::component::Context;
use lacekit::dom::ElementId;
use lacekit::events::CustomEvent;
use serde_json::json;

fn menu_markup(ctx: &Context) -> (ElementId, Vec<ElementId>) {
    let doc = ctx.document();
    let menu = doc.create_element("ul");
    doc.add_class(menu, "cl-menu");
    doc.append_child(doc.body(), menu);

    let items = (0..3)
        .map(|i| {
            let item = doc.create_element("li");
            doc.add_class(item, "cl-menu-item");
            doc.set_attribute(item, "data-index", &i.to_string());
            doc.append_child(menu, item);
            item
        })
        .collect();
    (menu, items)
}

#[test]
fn one_delegated_listener_covers_every_item() {
    let ctx = Context::new_manual();
    let (menu, items) = menu_markup(&ctx);
    let seen = Arc::new(Mutex::new(Vec::new()));

    {
        let seen = seen.clone();
        let doc = ctx.document().clone();
        ctx.events()
            .on_delegated(menu, "click", ".cl-menu-item", move |scope| {
                let index = doc
                    .get_attribute(scope.current_target, "data-index")
                    .unwrap_or_default();
                seen.lock().unwrap().push(index);
            });
    }

    for &item in &items {
        ctx.events().trigger(ctx.document(), item, CustomEvent::new("click"));
    }
    assert_eq!(seen.lock().unwrap().as_slice(), ["0", "1", "2"]);

    // Items added after registration are covered too.
    let doc = ctx.document();
    let late = doc.create_element("li");
    doc.add_class(late, "cl-menu-item");
    doc.set_attribute(late, "data-index", "9");
    doc.append_child(menu, late);

    ctx.events().trigger(doc, late, CustomEvent::new("click"));
    assert_eq!(seen.lock().unwrap().last().map(String::as_str), Some("9"));
}

#[test]
fn clicks_outside_the_delegate_selector_do_not_fire() {
    let ctx = Context::new_manual();
    let (menu, _) = menu_markup(&ctx);
    let hits = Arc::new(AtomicUsize::new(0));

    let doc = ctx.document();
    let separator = doc.create_element("li");
    doc.add_class(separator, "cl-menu-separator");
    doc.append_child(menu, separator);

    {
        let hits = hits.clone();
        ctx.events()
            .on_delegated(menu, "click", ".cl-menu-item", move |_| {
                hits.fetch_add(1, Ordering::SeqCst);
            });
    }

    ctx.events().trigger(doc, separator, CustomEvent::new("click"));
    ctx.events().trigger(doc, menu, CustomEvent::new("click"));
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[test]
fn handler_tokens_remove_exactly_their_registration() {
    let ctx = Context::new_manual();
    let (menu, items) = menu_markup(&ctx);
    let first_hits = Arc::new(AtomicUsize::new(0));
    let second_hits = Arc::new(AtomicUsize::new(0));

    let token = {
        let hits = first_hits.clone();
        ctx.events()
            .on_delegated(menu, "click", ".cl-menu-item", move |_| {
                hits.fetch_add(1, Ordering::SeqCst);
            })
    };
    {
        let hits = second_hits.clone();
        ctx.events()
            .on_delegated(menu, "click", ".cl-menu-item", move |_| {
                hits.fetch_add(1, Ordering::SeqCst);
            });
    }

    ctx.events().off(token);
    ctx.events().trigger(ctx.document(), items[0], CustomEvent::new("click"));

    assert_eq!(first_hits.load(Ordering::SeqCst), 0);
    assert_eq!(second_hits.load(Ordering::SeqCst), 1);
}

#[test]
fn detail_payloads_travel_with_the_event() {
    let ctx = Context::new_manual();
    let (menu, items) = menu_markup(&ctx);
    let payload = Arc::new(Mutex::new(serde_json::Value::Null));

    {
        let payload = payload.clone();
        ctx.events().on(menu, "cl.menu.selected", move |scope| {
            *payload.lock().unwrap() = scope.detail().clone();
        });
    }

    ctx.events().trigger(
        ctx.document(),
        items[1],
        CustomEvent::new("cl.menu.selected").with_detail(json!({ "relatedTarget": 1 })),
    );

    assert_eq!(*payload.lock().unwrap(), json!({ "relatedTarget": 1 }));
}

#[test]
fn fade_round_trip_with_zero_duration() {
    let ctx = Context::new_manual();
    let doc = ctx.document();
    let el = doc.create_element("div");
    doc.append_child(doc.body(), el);

    let fade = ctx.animator().fade_in(el, Duration::ZERO, "grid");
    ctx.animator().settle();
    assert!(fade.is_done());
    assert_eq!(doc.style(el, "display").as_deref(), Some("grid"));
    assert_eq!(doc.opacity(el), 1.0);

    let fade = ctx.animator().fade_out(el, Duration::ZERO);
    ctx.animator().settle();
    assert!(fade.is_done());
    assert_eq!(doc.style(el, "display").as_deref(), Some("none"));
    assert_eq!(doc.opacity(el), 0.0);
}

#[test]
fn overlapping_fades_are_resolved_by_cancelling_the_stale_one() {
    let ctx = Context::new_manual();
    let doc = ctx.document();
    let el = doc.create_element("div");
    doc.append_child(doc.body(), el);

    let fade_in = ctx.animator().fade_in(el, Duration::from_millis(300), "block");
    ctx.animator().advance(Duration::from_millis(150));

    // The caller hands over to a fade-out; cancelling first keeps a single
    // writer per frame on the element.
    fade_in.cancel();
    let fade_out = ctx.animator().fade_out(el, Duration::from_millis(300));
    ctx.animator().settle();

    assert!(fade_in.is_cancelled());
    assert!(fade_out.is_done());
    assert_eq!(doc.style(el, "display").as_deref(), Some("none"));
}

#[test]
fn remove_all_is_a_clean_slate_for_test_teardown() {
    let ctx = Context::new_manual();
    let (menu, items) = menu_markup(&ctx);
    let hits = Arc::new(AtomicUsize::new(0));

    for _ in 0..4 {
        let hits = hits.clone();
        ctx.events().on(menu, "click", move |_| {
            hits.fetch_add(1, Ordering::SeqCst);
        });
    }
    assert_eq!(ctx.events().len(), 4);

    ctx.events().remove_all();
    ctx.events().trigger(ctx.document(), items[0], CustomEvent::new("click"));

    assert!(ctx.events().is_empty());
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}
