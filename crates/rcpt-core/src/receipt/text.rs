//! Borrowed view over the OCR lines of one receipt.

/// Ordered OCR lines plus their space-joined text.
///
/// Line-oriented rules (merchant, labeled total) walk [`lines`](Self::lines);
/// blob-oriented rules (date, last number, category) search
/// [`joined`](Self::joined).
#[derive(Debug, Clone)]
pub struct ReceiptText<'a> {
    lines: Vec<&'a str>,
    joined: String,
}

impl<'a> ReceiptText<'a> {
    pub fn new<S: AsRef<str>>(lines: &'a [S]) -> Self {
        let lines: Vec<&'a str> = lines.iter().map(|line| line.as_ref()).collect();
        let joined = lines.join(" ");
        Self { lines, joined }
    }

    /// Lines in OCR emission order.
    pub fn lines(&self) -> &[&'a str] {
        &self.lines
    }

    /// All lines joined with single spaces.
    pub fn joined(&self) -> &str {
        &self.joined
    }

    pub fn first_line(&self) -> Option<&'a str> {
        self.lines.first().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_joined_uses_single_spaces() {
        let lines = vec!["Store ABC".to_string(), "12/05/2024".to_string()];
        let text = ReceiptText::new(&lines);

        assert_eq!(text.joined(), "Store ABC 12/05/2024");
        assert_eq!(text.len(), 2);
        assert_eq!(text.first_line(), Some("Store ABC"));
    }

    #[test]
    fn test_empty_sequence() {
        let lines: Vec<&str> = Vec::new();
        let text = ReceiptText::new(&lines);

        assert!(text.is_empty());
        assert_eq!(text.joined(), "");
        assert_eq!(text.first_line(), None);
    }
}
