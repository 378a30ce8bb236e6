use regex::{Regex, RegexBuilder};
use std::sync::LazyLock;
use thiserror::Error;
use wb_domain::types::{PageContent, SkipDecision, Title};

#[derive(Debug, Error)]
pub enum LinkError {
    #[error("Search term is empty")]
    EmptyTerm,
    #[error("Search term does not compile: {0}")]
    InvalidTerm(#[from] regex::Error),
}

/// `[[target]]` or `[[target|label]]`; captures the target.
static WIKILINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[\[([^\[\]|]*)(?:\|[^\[\]]*)?\]\]").expect("wikilink pattern is valid")
});

/// Links the first unlinked mention of a term on a page.
pub struct LinkInserter {
    term: String,
    pattern: Regex,
}

impl LinkInserter {
    pub fn new(term: &str) -> Result<Self, LinkError> {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return Err(LinkError::EmptyTerm);
        }
        let pattern = RegexBuilder::new(&format!("({})", regex::escape(&term)))
            .case_insensitive(true)
            .size_limit(1 << 20)
            .build()?;
        Ok(Self { term, pattern })
    }

    /// The lower-cased search term.
    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn summary(&self) -> String {
        format!("link [[{}]]", self.term)
    }

    /// The page the links would point at.
    pub fn is_target_page(&self, title: &Title) -> bool {
        title.display.to_lowercase() == self.term
    }

    pub fn is_linked(&self, wikitext: &str) -> bool {
        WIKILINK
            .captures_iter(wikitext)
            .any(|caps| caps[1].trim().to_lowercase() == self.term)
    }

    /// Skip predicate for the link bot.
    pub fn evaluate(&self, page: &PageContent) -> SkipDecision {
        if self.is_target_page(&page.title) {
            SkipDecision::Skip("is the link target")
        } else if self.is_linked(&page.wikitext) {
            SkipDecision::Skip("already linked")
        } else {
            SkipDecision::Process
        }
    }

    /// Wrap the first mention, keeping its original case. `None` if the
    /// term does not appear.
    pub fn apply(&self, wikitext: &str) -> Option<String> {
        if !self.pattern.is_match(wikitext) {
            return None;
        }
        Some(self.pattern.replace(wikitext, "[[${1}]]").into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wb_domain::types::{Namespace, PageId, RevisionId};

    fn page(title: &str, wikitext: &str) -> PageContent {
        PageContent {
            page_id: PageId(1),
            title: Title::new(Namespace::MAIN, title),
            revision: RevisionId(100),
            timestamp: chrono::Utc::now(),
            wikitext: wikitext.to_string(),
            exists: true,
            is_redirect: false,
        }
    }

    #[test]
    fn test_links_first_mention_only() {
        let inserter = LinkInserter::new("Dobby").unwrap();
        let text = "A dobby loom. Another dobby here.";
        assert_eq!(
            inserter.apply(text).as_deref(),
            Some("A [[dobby]] loom. Another dobby here.")
        );
    }

    #[test]
    fn test_preserves_case_of_mention() {
        let inserter = LinkInserter::new("jacquard loom").unwrap();
        assert_eq!(
            inserter.apply("The Jacquard Loom changed weaving.").as_deref(),
            Some("The [[Jacquard Loom]] changed weaving.")
        );
    }

    #[test]
    fn test_no_mention_returns_none() {
        let inserter = LinkInserter::new("heddle").unwrap();
        assert_eq!(inserter.apply("Nothing relevant."), None);
    }

    #[test]
    fn test_term_is_matched_literally() {
        let inserter = LinkInserter::new("C++").unwrap();
        assert_eq!(
            inserter.apply("Written in C++ and C.").as_deref(),
            Some("Written in [[C++]] and C.")
        );
        assert_eq!(inserter.apply("Written in CCC."), None);
    }

    #[test]
    fn test_is_linked_with_and_without_label() {
        let inserter = LinkInserter::new("warp").unwrap();
        assert!(inserter.is_linked("The [[Warp]] threads."));
        assert!(inserter.is_linked("The [[ warp |lengthwise threads]]."));
        assert!(!inserter.is_linked("The [[Warp and weft]] article."));
        assert!(!inserter.is_linked("No links to warp at all."));
    }

    #[test]
    fn test_is_linked_inside_file_caption() {
        let inserter = LinkInserter::new("shuttle").unwrap();
        assert!(inserter.is_linked("[[File:Loom.jpg|thumb|A [[shuttle]] in use]]"));
    }

    #[test]
    fn test_evaluate_skips_target_and_linked_pages() {
        let inserter = LinkInserter::new("Loom").unwrap();
        assert_eq!(
            inserter.evaluate(&page("Loom", "A loom is a device.")),
            SkipDecision::Skip("is the link target")
        );
        assert_eq!(
            inserter.evaluate(&page("Weaving", "Uses a [[loom]].")),
            SkipDecision::Skip("already linked")
        );
        assert_eq!(
            inserter.evaluate(&page("Weaving", "Uses a loom.")),
            SkipDecision::Process
        );
    }

    #[test]
    fn test_summary_and_term() {
        let inserter = LinkInserter::new("  Reed ").unwrap();
        assert_eq!(inserter.term(), "reed");
        assert_eq!(inserter.summary(), "link [[reed]]");
    }

    #[test]
    fn test_empty_term_rejected() {
        assert!(matches!(LinkInserter::new("   "), Err(LinkError::EmptyTerm)));
    }
}
