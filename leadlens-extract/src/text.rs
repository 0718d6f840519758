//! DOM text helpers shared by the extractors.

use scraper::{ElementRef, Html, Node, Selector};

/// Elements whose text never counts as visible page text.
const INVISIBLE: [&str; 3] = ["script", "style", "template"];

/// Visible text of `element`: each text node trimmed, empties dropped,
/// the rest joined with `separator`.
pub fn joined_text(element: ElementRef<'_>, separator: &str) -> String {
    let mut pieces = Vec::new();
    collect_visible_text(element, &mut pieces);
    pieces
        .iter()
        .map(|piece| piece.trim())
        .filter(|piece| !piece.is_empty())
        .collect::<Vec<_>>()
        .join(separator)
}

fn collect_visible_text(element: ElementRef<'_>, out: &mut Vec<String>) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push(text.to_string()),
            Node::Element(el) if INVISIBLE.contains(&el.name()) => {}
            Node::Element(el) => {
                let Some(child_el) = ElementRef::wrap(child) else {
                    continue;
                };
                if el.name() == "noscript" {
                    collect_noscript_text(child_el, out);
                } else {
                    collect_visible_text(child_el, out);
                }
            }
            _ => {}
        }
    }
}

/// With scripting enabled the parser keeps `<noscript>` contents as one raw
/// text node; reparse it so only its text survives.
fn collect_noscript_text(noscript: ElementRef<'_>, out: &mut Vec<String>) {
    if noscript.children().any(|child| child.value().is_element()) {
        collect_visible_text(noscript, out);
        return;
    }
    let raw: String = text_nodes(noscript).collect();
    let fragment = Html::parse_fragment(&raw);
    collect_visible_text(fragment.root_element(), out);
}

/// The element's only string, looking through single-child wrappers.
///
/// Mirrors the "tag has exactly one child" rule: `<p><b>x</b></p>` has the
/// sole string `x`, while `<p>x <b>y</b></p>` has none.
pub fn sole_string<'a>(element: ElementRef<'a>) -> Option<&'a str> {
    let mut children = element.children();
    let only = children.next()?;
    if children.next().is_some() {
        return None;
    }
    match only.value() {
        Node::Text(text) => Some(&**text),
        Node::Element(_) => ElementRef::wrap(only).and_then(sole_string),
        _ => None,
    }
}

/// First element strictly below `scope` matching `selector`, in document order.
pub fn first_descendant<'a>(scope: ElementRef<'a>, selector: &Selector) -> Option<ElementRef<'a>> {
    descendants(scope, selector).next()
}

/// Every element strictly below `scope` matching `selector`.
pub fn descendants<'a, 'b>(
    scope: ElementRef<'a>,
    selector: &'b Selector,
) -> impl Iterator<Item = ElementRef<'a>> + 'b
where
    'a: 'b,
{
    let scope_id = scope.id();
    scope
        .select(selector)
        .filter(move |element| element.id() != scope_id)
}

/// Every text node below `scope`, raw and untrimmed.
pub fn text_nodes<'a>(scope: ElementRef<'a>) -> impl Iterator<Item = &'a str> {
    scope
        .descendants()
        .filter_map(|node| node.value().as_text().map(|text| &**text))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first<'a>(doc: &'a Html, css: &str) -> ElementRef<'a> {
        let selector = Selector::parse(css).unwrap();
        doc.select(&selector).next().unwrap()
    }

    #[test]
    fn joined_text_skips_scripts_and_blank_nodes() {
        let doc = Html::parse_fragment(
            "<div>  Hello <script>var x = 1;</script>\n <b> World </b>  </div>",
        );
        let div = first(&doc, "div");
        assert_eq!(joined_text(div, " "), "Hello World");
        assert_eq!(joined_text(div, ""), "HelloWorld");
    }

    #[test]
    fn noscript_markup_contributes_only_its_text() {
        let doc = Html::parse_document(
            r#"<main>About us<noscript><img src="p.gif">Enable <b>JS</b></noscript></main>"#,
        );
        assert_eq!(joined_text(first(&doc, "main"), " "), "About us Enable JS");
    }

    #[test]
    fn joined_text_keeps_inner_spacing_of_a_node() {
        let doc = Html::parse_fragment("<main>Open   daily</main>");
        assert_eq!(joined_text(first(&doc, "main"), " "), "Open   daily");
    }

    #[test]
    fn sole_string_follows_single_child_chain() {
        let doc = Html::parse_fragment("<p><span><b>(555) 123-4567</b></span></p>");
        assert_eq!(sole_string(first(&doc, "p")), Some("(555) 123-4567"));

        let doc = Html::parse_fragment("<p>Call <b>(555) 123-4567</b></p>");
        assert_eq!(sole_string(first(&doc, "p")), None);

        let doc = Html::parse_fragment("<p></p>");
        assert_eq!(sole_string(first(&doc, "p")), None);
    }

    #[test]
    fn first_descendant_never_returns_the_scope() {
        let doc = Html::parse_fragment(
            r#"<div role="heading" class="outer"><div role="heading">Inner</div></div>"#,
        );
        let outer = first(&doc, "div.outer");
        let heading = Selector::parse(r#"div[role="heading"]"#).unwrap();
        let found = first_descendant(outer, &heading).unwrap();
        assert_eq!(joined_text(found, ""), "Inner");
    }
}
