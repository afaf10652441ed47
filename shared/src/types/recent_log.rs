use std::collections::VecDeque;

/// How many messages the viewer keeps.
pub const RECENT_LOG_CAPACITY: usize = 10;

/// Bounded, order-preserving buffer of the most recent log lines. Pushing at
/// capacity evicts the oldest entry first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentLog {
    entries: VecDeque<String>,
    capacity: usize,
}

impl RecentLog {
    pub fn new() -> Self {
        Self::with_capacity(RECENT_LOG_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, entry: String) {
        while self.entries.len() >= self.capacity {
            if self.entries.pop_front().is_none() {
                break;
            }
        }
        self.entries.push_back(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in arrival order, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    /// Render the buffer as one markup fragment, a `<p>` per entry in arrival
    /// order. Pure function of the current state; entries are escaped so that
    /// raw process output cannot inject markup.
    pub fn render_html(&self) -> String {
        let mut html = String::new();
        for entry in &self.entries {
            html.push_str("<p>");
            html.push_str(&escape_html(entry));
            html.push_str("</p>");
        }
        html
    }
}

impl Default for RecentLog {
    fn default() -> Self {
        Self::new()
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn push_numbered(log: &mut RecentLog, n: usize) {
        for i in 1..=n {
            log.push(format!("m{i}"));
        }
    }

    #[test]
    fn holds_last_min_n_ten_entries_in_order() {
        for n in [0, 1, 5, 10, 11, 25] {
            let mut log = RecentLog::new();
            push_numbered(&mut log, n);
            assert_eq!(log.len(), n.min(10));
            let expected: Vec<String> =
                (n.saturating_sub(log.len()) + 1..=n).map(|i| format!("m{i}")).collect();
            let got: Vec<&str> = log.iter().collect();
            assert_eq!(got, expected);
        }
    }

    #[test]
    fn eleventh_message_evicts_the_oldest() {
        let mut log = RecentLog::new();
        push_numbered(&mut log, 11);
        let got: Vec<&str> = log.iter().collect();
        let expected: Vec<String> = (2..=11).map(|i| format!("m{i}")).collect();
        assert_eq!(got, expected);
    }

    #[test]
    fn ten_messages_fit_without_eviction() {
        let mut log = RecentLog::new();
        push_numbered(&mut log, 10);
        assert_eq!(log.len(), 10);
        assert_eq!(log.iter().next(), Some("m1"));
        assert_eq!(log.iter().last(), Some("m10"));
    }

    #[test]
    fn render_is_pure() {
        let mut log = RecentLog::new();
        log.push("one".into());
        log.push("two".into());
        assert_eq!(log.render_html(), log.render_html());
    }

    #[test]
    fn renders_one_paragraph_per_entry() {
        let mut log = RecentLog::new();
        log.push("a".into());
        log.push("b".into());
        assert_eq!(log.render_html(), "<p>a</p><p>b</p>");
    }

    #[test]
    fn empty_log_renders_empty_fragment() {
        assert_eq!(RecentLog::new().render_html(), "");
    }

    #[test]
    fn markup_in_entries_is_escaped() {
        let mut log = RecentLog::new();
        log.push("<script>&".into());
        assert_eq!(log.render_html(), "<p>&lt;script&gt;&amp;</p>");
    }
}
