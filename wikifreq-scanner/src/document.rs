use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A fetched article: its plain text and the titles it links to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub title: String,
    pub text: String,
    pub links: BTreeSet<String>,
}

impl Document {
    pub fn new(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
            links: BTreeSet::new(),
        }
    }

    pub fn with_links<I, S>(mut self, links: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.links.extend(links.into_iter().map(Into::into));
        self
    }
}

/// Discussion pages (`Talk:Foo`, `User talk:Bar`, ...) are never part of the link graph.
pub fn is_discussion_title(title: &str) -> bool {
    match title.split_once(':') {
        Some((namespace, _)) => {
            let namespace = namespace.trim().to_lowercase();
            namespace == "talk" || namespace.ends_with(" talk")
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discussion_titles() {
        assert!(is_discussion_title("Talk:Seabrooke"));
        assert!(is_discussion_title("User talk:Someone"));
        assert!(is_discussion_title("Wikipedia talk:Manual of Style"));
        assert!(!is_discussion_title("Seabrooke"));
        assert!(!is_discussion_title("Category:Towns"));
        assert!(!is_discussion_title("Star Trek: Voyager"));
    }

    #[test]
    fn test_with_links_deduplicates() {
        let doc = Document::new("A", "text").with_links(["B", "C", "B"]);
        assert_eq!(doc.links.len(), 2);
    }
}
