/// Where the real interpretation starts inside the extracted text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrimStrategy {
    None,
    /// Drop the first occurrence of the card title and everything before it.
    Title,
    /// Keep text from `lookback` characters before the first `marker`.
    /// Tuned to a single page; it does not generalize.
    Marker { marker: String, lookback: usize },
}

impl TrimStrategy {
    /// Apply the strategy; the result is whitespace-trimmed. A missing title or marker keeps the text.
    pub fn apply<'a>(&self, text: &'a str, title: &str) -> &'a str {
        let rest = match self {
            TrimStrategy::None => text,
            TrimStrategy::Title => after_first(text, title),
            TrimStrategy::Marker { marker, lookback } => before_marker(text, marker, *lookback),
        };
        rest.trim()
    }
}

/// Cut `text` at the first `marker`, dropping the marker and everything after it.
pub fn cut_footer<'a>(text: &'a str, marker: &str) -> &'a str {
    if marker.is_empty() {
        return text;
    }
    match text.find(marker) {
        Some(idx) => text[..idx].trim_end(),
        None => text,
    }
}

fn after_first<'a>(text: &'a str, needle: &str) -> &'a str {
    if needle.is_empty() {
        return text;
    }
    match text.find(needle) {
        Some(idx) => &text[idx + needle.len()..],
        None => text,
    }
}

fn before_marker<'a>(text: &'a str, marker: &str, lookback: usize) -> &'a str {
    if marker.is_empty() {
        return text;
    }
    let Some(byte_pos) = text.find(marker) else {
        return text;
    };
    if lookback == 0 {
        return &text[byte_pos..];
    }

    // lookback counts characters; walk back from the marker on char boundaries
    let start = text[..byte_pos]
        .char_indices()
        .rev()
        .nth(lookback - 1)
        .map(|(i, _)| i)
        .unwrap_or(0);
    &text[start..]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marker(m: &str, lookback: usize) -> TrimStrategy {
        TrimStrategy::Marker {
            marker: m.into(),
            lookback,
        }
    }

    #[test]
    fn title_trim_drops_through_first_occurrence() {
        let text = "Fool  rest of content  related reading...";
        assert_eq!(
            TrimStrategy::Title.apply(text, "Fool"),
            "rest of content  related reading..."
        );
    }

    #[test]
    fn title_trim_only_cuts_once() {
        let text = "愚人\n愚人牌象征开始，愚人\n代表冒险";
        assert_eq!(
            TrimStrategy::Title.apply(text, "愚人"),
            "愚人牌象征开始，愚人\n代表冒险"
        );
    }

    #[test]
    fn title_trim_skips_leading_boilerplate() {
        let text = "首页 > 塔罗牌\n塔罗牌愚人（The Fool）\n正文";
        assert_eq!(TrimStrategy::Title.apply(text, "塔罗牌愚人（The Fool）"), "正文");
    }

    #[test]
    fn missing_title_keeps_text() {
        assert_eq!(TrimStrategy::Title.apply("  正文  ", "星星"), "正文");
        assert_eq!(TrimStrategy::Title.apply("正文", ""), "正文");
    }

    #[test]
    fn marker_trim_uses_fixed_lookback() {
        let text = "0123456789abcdefMARK rest";
        assert_eq!(marker("MARK", 10).apply(text, ""), "6789abcdefMARK rest");
    }

    #[test]
    fn marker_near_start_clamps_to_zero() {
        assert_eq!(marker("MARK", 10).apply("abcMARK tail", ""), "abcMARK tail");
    }

    #[test]
    fn marker_lookback_counts_characters() {
        let text = "一二三四五六七八九十甲乙也是起点，正文";
        assert_eq!(
            marker("也是起点", 10).apply(text, ""),
            "三四五六七八九十甲乙也是起点，正文"
        );
    }

    #[test]
    fn zero_lookback_starts_at_marker() {
        assert_eq!(marker("MARK", 0).apply("abcMARK", ""), "MARK");
    }

    #[test]
    fn missing_marker_keeps_text() {
        assert_eq!(marker("也是起点", 10).apply(" 全文 ", ""), "全文");
    }

    #[test]
    fn none_only_trims_whitespace() {
        assert_eq!(TrimStrategy::None.apply("\n 标题\n正文 \n", "标题"), "标题\n正文");
    }

    #[test]
    fn footer_cut_drops_related_reading() {
        assert_eq!(cut_footer("正文\n相关阅读\n链接", "相关阅读"), "正文");
        assert_eq!(cut_footer("正文", "相关阅读"), "正文");
        assert_eq!(cut_footer("正文", ""), "正文");
    }
}
