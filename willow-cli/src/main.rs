//! Willow CLI
//!
//! A headless renderer for testing and debugging: load a document, run
//! the style/layout pipeline once, and print the styled tree, the box
//! tree, or the display list.

use anyhow::{Context, Result};
use clap::Parser;
use owo_colors::OwoColorize;
use willow_browser::{Engine, load_document};
use willow_css::layout::BoxType;
use willow_dom::{DomTree, NodeId, NodeType};

/// Willow CLI - a headless rendering engine for testing and debugging
#[derive(Parser, Debug)]
#[command(name = "willow-cli")]
#[command(author, version, about, long_about = None)]
#[command(group = clap::ArgGroup::new("input").required(true))]
#[command(after_help = r#"EXAMPLES:
    # Parse a local file and show the styled tree
    willow-cli ./index.html

    # Fetch a URL and show the layout tree
    willow-cli --layout https://example.com

    # Parse inline HTML
    willow-cli --html '<div style="margin: 20px auto; width: 200px">Centered</div>' --layout

    # Dump the display list as JSON with a custom viewport
    willow-cli --paint --json --width 1280 --height 720 ./index.html
"#)]
struct Cli {
    /// Path to an HTML file or URL to fetch and parse
    #[arg(value_name = "FILE|URL", group = "input")]
    path: Option<String>,

    /// Parse an HTML string directly instead of a file/URL
    #[arg(long, value_name = "HTML", group = "input")]
    html: Option<String>,

    /// Show the layout tree with computed boxes
    #[arg(long)]
    layout: bool,

    /// Show the display list instead of a tree
    #[arg(long)]
    paint: bool,

    /// Emit JSON instead of the human-readable form
    #[arg(long)]
    json: bool,

    /// Viewport width in px
    #[arg(long, default_value_t = 900.0)]
    width: f32,

    /// Viewport height in px
    #[arg(long, default_value_t = 600.0)]
    height: f32,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let viewport = (cli.width, cli.height);

    let mut engine = match (&cli.path, &cli.html) {
        (Some(path), _) => load_document(path, viewport)?,
        (None, Some(html)) => {
            let mut engine = Engine::new(viewport);
            engine.load_html(html, None);
            engine
        }
        (None, None) => unreachable!("clap requires one input"),
    };

    let display_list = engine
        .frame()
        .context("the engine hit an internal error while rendering")?;

    if cli.paint {
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&display_list)?);
        } else {
            for command in display_list.commands() {
                println!("{command:?}");
            }
        }
        return Ok(());
    }

    if cli.json {
        let root = engine
            .tree
            .document_element()
            .context("document has no root element")?;
        println!("{}", serde_json::to_string_pretty(&json_tree(&engine, root))?);
        return Ok(());
    }

    if let Some(root) = engine.tree.document_element() {
        print_tree(&engine, root, 0, cli.layout);
    }
    Ok(())
}

/// Print the element tree with either computed style summaries or boxes.
fn print_tree(engine: &Engine, id: NodeId, depth: usize, show_layout: bool) {
    let indent = "  ".repeat(depth);
    match engine.tree.get(id).map(|n| &n.node_type) {
        Some(NodeType::Element(data)) => {
            let tag = format!("<{}>", data.tag_name);
            if show_layout {
                let summary = engine.layout.get(id).map_or_else(
                    || "(not rendered)".dimmed().to_string(),
                    |entry| {
                        let rect = entry.css_box.rect_of(BoxType::Border);
                        format!(
                            "x={:.1} y={:.1} w={:.1} h={:.1}",
                            rect.x, rect.y, rect.width, rect.height
                        )
                    },
                );
                println!("{indent}{} {}", tag.cyan(), summary);
            } else {
                let summary = engine.styles.get(&id).map_or_else(String::new, |style| {
                    format!(
                        "display={} color={} font-size={:.1}px",
                        style.display(),
                        (**style).color(),
                        style.font_size()
                    )
                });
                println!("{indent}{} {}", tag.cyan(), summary.dimmed());
            }
            for &child in engine.tree.children(id) {
                print_tree(engine, child, depth + 1, show_layout);
            }
        }
        Some(NodeType::Text(text)) => {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                println!("{indent}{}", format!("\"{trimmed}\"").green());
            }
        }
        _ => {}
    }
}

/// Build a JSON-friendly view of the styled and laid-out tree.
fn json_tree(engine: &Engine, id: NodeId) -> serde_json::Value {
    let tree: &DomTree = &engine.tree;
    match tree.get(id).map(|n| &n.node_type) {
        Some(NodeType::Element(data)) => {
            let children: Vec<serde_json::Value> = tree
                .children(id)
                .iter()
                .map(|&c| json_tree(engine, c))
                .filter(|v| !v.is_null())
                .collect();
            let border_rect = engine
                .layout
                .get(id)
                .map(|entry| entry.css_box.rect_of(BoxType::Border));
            serde_json::json!({
                "tag": data.tag_name,
                "attrs": data.attrs,
                "style": engine.styles.get(&id).map(|s| {
                    // fold the four-sided longhands back into shorthands
                    // for readable output
                    let flat: indexmap::IndexMap<String, String> = s
                        .iter()
                        .map(|(k, v)| (k.clone(), v.to_string()))
                        .collect();
                    willow_css::style::pack_longhands(&flat)
                        .into_iter()
                        .collect::<std::collections::BTreeMap<_, _>>()
                }),
                "box": border_rect,
                "children": children,
            })
        }
        Some(NodeType::Text(text)) if !text.trim().is_empty() => {
            serde_json::json!({ "text": text.trim() })
        }
        _ => serde_json::Value::Null,
    }
}
