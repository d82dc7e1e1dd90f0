//! The cascade: which declaration wins for each property on each element.
//!
//! [§ 6 Cascading](https://www.w3.org/TR/css-cascade-4/#cascading)
//!
//! "The cascade takes an unordered list of declared values for a given
//! property on a given element, sorts them by their declaration's
//! precedence..."
//!
//! For every element, the declarations of all matching rules across all
//! active sheets are sorted ascending by `(important, specificity, source
//! order)` and fused into one declaration map, later entries replacing
//! earlier ones. `!important` therefore outranks specificity, higher
//! specificity outranks source order, and the later declaration wins ties.

use std::collections::HashMap;

use willow_dom::{DomTree, NodeId};

use crate::cssom::{SourceSheet, StyleRule};
use crate::media::MediaValue;
use crate::selector::Specificity;
use crate::style::{Style, StyleValue};

/// One matching declaration with its cascade sort key.
struct MatchedDeclaration<'a> {
    name: &'a str,
    value: &'a StyleValue,
    important: bool,
    specificity: Specificity,
    source_order: usize,
}

/// Compute the externally-cascaded style of every element.
///
/// The result is the `external_cascaded` layer only; tag defaults and
/// inline styles are layered in during computation.
#[must_use]
pub fn cascaded_styles(
    tree: &DomTree,
    sheets: &[SourceSheet],
    media: MediaValue,
) -> HashMap<NodeId, Style> {
    // flatten the active rules of all sheets, keeping one global source
    // order across sheet boundaries
    let rules: Vec<&StyleRule> = sheets
        .iter()
        .flat_map(|sheet| sheet.active_rules(media))
        .collect();

    let mut styles = HashMap::new();
    for id in tree.iter_all() {
        if tree.as_element(id).is_none() {
            continue;
        }
        let _ = styles.insert(id, cascade_element(tree, id, &rules));
    }
    styles
}

/// Cascade one element against the pre-flattened rule list.
fn cascade_element(tree: &DomTree, id: NodeId, rules: &[&StyleRule]) -> Style {
    let mut matched: Vec<MatchedDeclaration> = Vec::new();
    for (source_order, rule) in rules.iter().enumerate() {
        if !rule.selector.matches(tree, id) {
            continue;
        }
        for (name, (value, important)) in rule.style.iter() {
            matched.push(MatchedDeclaration {
                name,
                value,
                important: *important,
                specificity: rule.specificity,
                source_order,
            });
        }
    }

    // [§ 6.4 Cascade Sorting Order](https://www.w3.org/TR/css-cascade-4/#cascade-sort)
    // ascending, so the strongest declaration lands last and wins the fuse
    matched.sort_by_key(|d| (d.important, d.specificity, d.source_order));

    let mut fused = Style::new();
    for decl in matched {
        fused.insert(decl.name, decl.value.clone(), decl.important);
    }
    fused
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_sheet;
    use willow_dom::{ElementData, NodeType};

    fn element_tree(tag: &str, id_attr: Option<&str>) -> (DomTree, NodeId) {
        let mut tree = DomTree::new();
        let attrs: Vec<(String, String)> = id_attr
            .map(|v| vec![("id".to_string(), v.to_string())])
            .unwrap_or_default();
        let el = tree.alloc(NodeType::Element(ElementData::new(tag, attrs)));
        tree.append_child(NodeId::ROOT, el);
        (tree, el)
    }

    fn color_of(style: &Style) -> String {
        match style.get("color") {
            Some((StyleValue::Computed(v), _)) => v.to_string(),
            Some((StyleValue::Raw(s), _)) => s.clone(),
            None => String::new(),
        }
    }

    #[test]
    fn later_rule_wins_at_equal_specificity() {
        let sheet = parse_sheet("p { color: red } p { color: blue }");
        let (tree, p) = element_tree("p", None);
        let styles = cascaded_styles(&tree, &[sheet], (800.0, 600.0));
        assert_eq!(color_of(&styles[&p]), "#0000ff");
    }

    #[test]
    fn important_beats_specificity() {
        let sheet = parse_sheet("p { color: red !important } p#x { color: blue }");
        let (tree, p) = element_tree("p", Some("x"));
        let styles = cascaded_styles(&tree, &[sheet], (800.0, 600.0));
        assert_eq!(color_of(&styles[&p]), "#ff0000");
    }

    #[test]
    fn higher_specificity_wins() {
        let sheet = parse_sheet(".a { color: green } p { color: red }");
        let mut tree = DomTree::new();
        let el = tree.alloc(NodeType::Element(ElementData::new(
            "p",
            [("class".to_string(), "a".to_string())],
        )));
        tree.append_child(NodeId::ROOT, el);
        let styles = cascaded_styles(&tree, &[sheet], (800.0, 600.0));
        assert_eq!(color_of(&styles[&el]), "#008000");
    }

    #[test]
    fn media_gates_rules() {
        let sheet = parse_sheet("@media (min-width: 600px) { p { color: red } }");
        let (tree, p) = element_tree("p", None);

        let styles = cascaded_styles(&tree, &[sheet.clone()], (800.0, 600.0));
        assert_eq!(color_of(&styles[&p]), "#ff0000");

        let styles = cascaded_styles(&tree, &[sheet], (400.0, 600.0));
        assert!(styles[&p].get("color").is_none());
    }
}
