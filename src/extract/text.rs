use scraper::ElementRef;

/// Elements whose text never renders.
const HIDDEN_TAGS: &[&str] = &["script", "style", "noscript", "template"];

/// Visible text under `element`: each text node trimmed, blanks dropped, one fragment per line.
pub fn visible_text(element: ElementRef<'_>) -> String {
    element
        .descendants()
        .filter_map(|node| {
            let text = node.value().as_text()?;
            let hidden = node.ancestors().any(|a| {
                a.value()
                    .as_element()
                    .is_some_and(|e| HIDDEN_TAGS.contains(&e.name()))
            });
            if hidden {
                return None;
            }
            let t = text.trim();
            (!t.is_empty()).then_some(t)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use scraper::{Html, Selector};

    use super::*;

    fn first(html: &str, sel: &str) -> String {
        let doc = Html::parse_document(html);
        let sel = Selector::parse(sel).unwrap();
        visible_text(doc.select(&sel).next().unwrap())
    }

    #[test]
    fn fragments_join_with_newlines() {
        let text = first(
            "<div id=c><h2> 愚人 </h2>\n\n<p>第一段</p><p>第二段 <b>加粗</b></p></div>",
            "#c",
        );
        assert_eq!(text, "愚人\n第一段\n第二段\n加粗");
    }

    #[test]
    fn scripts_and_styles_are_skipped() {
        let text = first(
            "<div id=c><style>.x{}</style><p>正文</p><script>track();</script></div>",
            "#c",
        );
        assert_eq!(text, "正文");
    }

    #[test]
    fn whitespace_only_container_is_empty() {
        assert_eq!(first("<div id=c>  <p> </p> </div>", "#c"), "");
    }
}
