//! Engine tests: the frame loop, dirty tracking, event plumbing, and
//! state-driven restyling.

use std::cell::Cell;
use std::rc::Rc;

use willow_browser::{Engine, InputEvent};
use willow_css::values::Color;
use willow_dom::NodeId;

fn engine_with(html: &str) -> Engine {
    let mut engine = Engine::new((900.0, 600.0));
    engine.load_html(html, None);
    engine
}

fn find(engine: &Engine, tag: &str) -> NodeId {
    engine
        .tree
        .iter_all()
        .find(|&id| {
            engine
                .tree
                .as_element(id)
                .is_some_and(|e| e.tag_name == tag)
        })
        .unwrap_or_else(|| panic!("no <{tag}> in tree"))
}

#[test]
fn test_frame_produces_styles_layout_and_paint() {
    let mut engine = engine_with(
        "<style>p { color: red; width: 100px; height: 40px; display: block }</style>\
         <p>hello</p>",
    );
    let list = engine.frame().unwrap();
    assert!(!list.is_empty(), "text should paint");

    let p = find(&engine, "p");
    assert_eq!(engine.styles[&p].color(), Color::rgb(255, 0, 0));
    assert!(engine.layout.get(p).is_some());
}

#[test]
fn test_frame_is_incremental() {
    let mut engine = engine_with("<p>x</p>");
    let _ = engine.frame().unwrap();
    assert!(!engine.tree.is_style_dirty());
    assert!(!engine.tree.is_layout_dirty());

    // touching an attribute dirties styles again
    let p = find(&engine, "p");
    engine.set_attribute(p, "class", "now");
    assert!(engine.tree.is_style_dirty());
    let _ = engine.frame().unwrap();
    assert!(!engine.tree.is_style_dirty());
}

#[test]
fn test_hover_restyles_through_frames() {
    let mut engine = engine_with(
        "<style>div { width: 200px; height: 100px } div:hover { color: red }</style>\
         <div>hover me</div>",
    );
    let _ = engine.frame().unwrap();
    let div = find(&engine, "div");
    assert_eq!(engine.styles[&div].color(), Color::BLACK);

    engine.events.push_event(InputEvent::PointerMove { x: 50.0, y: 20.0 });
    let _ = engine.frame().unwrap();
    assert_eq!(engine.events.hover, Some(div));
    assert_eq!(engine.styles[&div].color(), Color::rgb(255, 0, 0));

    // moving off clears the bit and the style
    engine.events.push_event(InputEvent::PointerMove { x: 890.0, y: 590.0 });
    let _ = engine.frame().unwrap();
    assert_eq!(engine.styles[&div].color(), Color::BLACK);
}

#[test]
fn test_click_dispatch_bubbles() {
    let mut engine = engine_with(
        "<style>div { width: 200px; height: 100px }</style>\
         <div><p>target</p></div>",
    );
    let _ = engine.frame().unwrap();
    let div = find(&engine, "div");
    let p = find(&engine, "p");

    let clicks = Rc::new(Cell::new(0));
    let clicks_on_div = Rc::clone(&clicks);
    engine.events.add_listener(div, "click", move |_engine, event| {
        assert_eq!(event.kind, "click");
        assert_eq!(event.current, div);
        clicks_on_div.set(clicks_on_div.get() + 1);
    });

    // press and release over the paragraph's text
    engine.events.push_event(InputEvent::PointerDown { x: 10.0, y: 10.0 });
    engine.events.push_event(InputEvent::PointerUp { x: 10.0, y: 10.0 });
    let _ = engine.frame().unwrap();

    assert_eq!(clicks.get(), 1, "click on <p> bubbles to <div>");
    let _ = p;
}

#[test]
fn test_focus_follows_pointer_down() {
    let mut engine = engine_with(
        "<style>input { width: 100px; height: 20px; display: block }</style>\
         <input>",
    );
    let _ = engine.frame().unwrap();
    let input = find(&engine, "input");

    engine.events.push_event(InputEvent::PointerDown { x: 5.0, y: 5.0 });
    let _ = engine.frame().unwrap();
    assert_eq!(engine.events.focus, Some(input));
    assert!(engine.tree.as_element(input).unwrap().state.focus);
}

#[test]
fn test_ua_sheet_styles_focused_input() {
    let mut engine = engine_with(
        "<style>input { width: 100px; height: 20px; display: block }</style>\
         <input>",
    );
    let _ = engine.frame().unwrap();
    let input = find(&engine, "input");
    let before = engine.styles[&input].get("outline-width").cloned();

    engine.events.push_event(InputEvent::PointerDown { x: 5.0, y: 5.0 });
    let _ = engine.frame().unwrap();
    let after = engine.styles[&input].get("outline-width").cloned();
    // the built-in sheet gives focused inputs a medium outline
    assert_ne!(before, after);
    assert_eq!(after, Some(willow_css::ComputedValue::Length(3.0)));
}

#[test]
fn test_visited_links_restyle() {
    let mut engine = engine_with("<a href=\"page.html\">go</a>");
    let _ = engine.frame().unwrap();
    let a = find(&engine, "a");
    assert_eq!(engine.styles[&a].color(), Color::rgb(0, 0, 255));

    engine.mark_visited("page.html");
    let _ = engine.frame().unwrap();
    // a:visited { color: purple } from the UA sheet
    assert_eq!(engine.styles[&a].color(), Color::rgb(128, 0, 128));
}

#[test]
fn test_scroll_clamps_to_overflow() {
    let mut engine = engine_with(
        "<style>div { width: 200px; height: 50px } p { height: 400px; display: block }</style>\
         <div><p>tall</p></div>",
    );
    let _ = engine.frame().unwrap();
    let div = find(&engine, "div");
    assert!(engine.tree.as_element(div).unwrap().overflow);

    engine.events.push_event(InputEvent::Scroll {
        x: 10.0,
        y: 10.0,
        delta: 10_000.0,
    });
    let _ = engine.frame().unwrap();
    let scrolled = engine.tree.as_element(div).unwrap().scroll_y;
    assert!((scrolled - 350.0).abs() < 0.5, "clamped to 400 - 50, was {scrolled}");
}

#[test]
fn test_viewport_change_recomputes_media() {
    let mut engine = engine_with(
        "<style>@media (min-width: 600px) { p { color: red } }</style><p>x</p>",
    );
    let _ = engine.frame().unwrap();
    let p = find(&engine, "p");
    assert_eq!(engine.styles[&p].color(), Color::rgb(255, 0, 0));

    engine.set_viewport(400.0, 600.0);
    let _ = engine.frame().unwrap();
    assert_eq!(engine.styles[&p].color(), Color::BLACK);
}

#[test]
fn test_inline_style_mutator_restyles() {
    let mut engine = engine_with("<p>x</p>");
    let _ = engine.frame().unwrap();
    let p = find(&engine, "p");

    engine.set_inline_style(p, "color: #123456");
    let _ = engine.frame().unwrap();
    assert_eq!(engine.styles[&p].color(), Color::rgb(0x12, 0x34, 0x56));
}

#[test]
fn test_cursor_resolution() {
    let mut engine = engine_with(
        "<style>div { width: 200px; height: 100px }</style>\
         <div><a href=\"x\">link text here</a></div>",
    );
    let _ = engine.frame().unwrap();
    // over the link's first word: pointer (anchor default style)
    assert_eq!(engine.cursor_at(5.0, 5.0), "pointer");
    // elsewhere: default
    assert_eq!(engine.cursor_at(800.0, 500.0), "default");
}
