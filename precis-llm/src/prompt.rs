//! Prompt construction for page summaries.
//!
//! A [`SummaryRequest`] pairs the fixed summarizer instruction with a user
//! prompt built from a page's title and body. Bodies are embedded verbatim
//! unless a character budget is configured on the [`SummaryRequestBuilder`].

use crate::traits::ChatMessage;
use precis_common::PageContent;

/// Instruction sent as the system message of every summary request.
pub const SYSTEM_INSTRUCTION: &str =
    "You are a summarizer. Provide a concise summary of the given website content.";

/// Appended to a body that was cut to fit the configured budget.
pub const TRUNCATION_MARKER: &str = "\n[content truncated]";

/// Bodies longer than this are logged when no budget is set.
pub const LARGE_BODY_WARN_CHARS: usize = 100_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRequest {
    pub system_instruction: String,
    pub user_prompt: String,
}

impl SummaryRequest {
    /// Build a request embedding `title` and `body` unchanged.
    ///
    /// ```
    /// use precis_llm::prompt::SummaryRequest;
    ///
    /// let req = SummaryRequest::build("Example", "Hello world");
    /// assert_eq!(
    ///     req.user_prompt,
    ///     "Title: Example\n\nContent: Hello world\n\nSummarize this."
    /// );
    /// ```
    pub fn build(title: &str, body: &str) -> Self {
        let chars = body.chars().count();
        if chars > LARGE_BODY_WARN_CHARS {
            tracing::warn!(
                body_chars = chars,
                threshold = LARGE_BODY_WARN_CHARS,
                "prompt.body.large"
            );
        }
        Self::assemble(title, body)
    }

    /// Build a request, cutting the body to at most `max_body_chars`
    /// characters and marking the cut.
    pub fn build_with_budget(title: &str, body: &str, max_body_chars: usize) -> Self {
        match truncate_chars(body, max_body_chars) {
            Some(kept) => {
                tracing::warn!(
                    original_chars = body.chars().count(),
                    kept_chars = max_body_chars,
                    "prompt.body.truncated"
                );
                let mut cut = String::with_capacity(kept.len() + TRUNCATION_MARKER.len());
                cut.push_str(kept);
                cut.push_str(TRUNCATION_MARKER);
                Self::assemble(title, &cut)
            }
            None => Self::assemble(title, body),
        }
    }

    fn assemble(title: &str, body: &str) -> Self {
        Self {
            system_instruction: SYSTEM_INSTRUCTION.to_string(),
            user_prompt: format!("Title: {title}\n\nContent: {body}\n\nSummarize this."),
        }
    }

    /// The `[system, user]` conversation sent to the completion service.
    pub fn messages(&self) -> [ChatMessage; 2] {
        [
            ChatMessage::system(self.system_instruction.clone()),
            ChatMessage::user(self.user_prompt.clone()),
        ]
    }
}

/// Turns extracted pages into summary requests.
#[derive(Debug, Clone, Copy, Default)]
pub struct SummaryRequestBuilder {
    max_body_chars: Option<usize>,
}

impl SummaryRequestBuilder {
    pub fn new(max_body_chars: Option<usize>) -> Self {
        Self { max_body_chars }
    }

    pub fn max_body_chars(&self) -> Option<usize> {
        self.max_body_chars
    }

    pub fn build(&self, title: &str, body: &str) -> SummaryRequest {
        match self.max_body_chars {
            Some(budget) => SummaryRequest::build_with_budget(title, body, budget),
            None => SummaryRequest::build(title, body),
        }
    }

    pub fn for_page(&self, page: &PageContent) -> SummaryRequest {
        self.build(page.title(), page.body())
    }
}

/// Returns the first `max` chars of `s`, or `None` when nothing needs cutting.
fn truncate_chars(s: &str, max: usize) -> Option<&str> {
    s.char_indices().nth(max).map(|(idx, _)| &s[..idx])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::Role;

    #[test]
    fn prompt_embeds_title_and_body_verbatim() {
        let req = SummaryRequest::build("Example", "Hello world");
        assert!(req.user_prompt.contains("Example"));
        assert!(req.user_prompt.contains("Hello world"));
        assert_eq!(req.system_instruction, SYSTEM_INSTRUCTION);
    }

    #[test]
    fn prompt_is_deterministic() {
        let a = SummaryRequest::build("Example", "Hello world");
        let b = SummaryRequest::build("Example", "Hello world");
        assert_eq!(a.user_prompt.as_bytes(), b.user_prompt.as_bytes());
    }

    #[test]
    fn empty_body_still_builds() {
        let req = SummaryRequest::build("No title found", "");
        assert_eq!(
            req.user_prompt,
            "Title: No title found\n\nContent: \n\nSummarize this."
        );
    }

    #[test]
    fn large_body_is_not_cut_without_budget() {
        let body = "a".repeat(LARGE_BODY_WARN_CHARS + 10);
        let req = SummaryRequest::build("t", &body);
        assert!(req.user_prompt.contains(&body));
        assert!(!req.user_prompt.contains(TRUNCATION_MARKER));
    }

    #[test]
    fn budget_cuts_on_char_boundary() {
        let req = SummaryRequest::build_with_budget("t", "héllo wörld", 4);
        assert_eq!(
            req.user_prompt,
            "Title: t\n\nContent: héll\n[content truncated]\n\nSummarize this."
        );
    }

    #[test]
    fn budget_leaves_short_body_alone() {
        let within = SummaryRequest::build_with_budget("t", "short", 5);
        assert_eq!(within, SummaryRequest::build("t", "short"));
    }

    #[test]
    fn builder_applies_configured_budget() {
        let page = PageContent::new("https://example.com", Some("Page".into()), "0123456789");
        let cut = SummaryRequestBuilder::new(Some(3)).for_page(&page);
        assert!(cut.user_prompt.contains("Content: 012\n[content truncated]"));

        let full = SummaryRequestBuilder::default().for_page(&page);
        assert!(full.user_prompt.contains("Content: 0123456789\n\n"));
        assert!(full.user_prompt.starts_with("Title: Page\n\n"));
    }

    #[test]
    fn messages_are_system_then_user() {
        let req = SummaryRequest::build("Example", "Hello");
        let [system, user] = req.messages();
        assert_eq!(system.role, Role::System);
        assert_eq!(system.content, SYSTEM_INSTRUCTION);
        assert_eq!(user.role, Role::User);
        assert_eq!(user.content, req.user_prompt);
    }
}
