#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use std::collections::HashMap;
use std::sync::Mutex;
use wb_bot::{EditReview, ReviewDecision};
use wb_domain::types::{Namespace, PageContent, PageId, RevisionId, Title};
use wb_mw_api::client::{EditRequest, EditResponse, MediaWikiClient};
use wb_mw_api::error::MwApiError;

#[derive(Debug, Clone)]
pub struct SavedEdit {
    pub title: String,
    pub text: String,
    pub summary: String,
    pub base_timestamp: String,
}

#[derive(Default)]
pub struct MockClient {
    pages: HashMap<String, PageContent>,
    search_results: Vec<Title>,
    fail_edits: bool,
    edits: Mutex<Vec<SavedEdit>>,
    searches: Mutex<Vec<(String, usize)>>,
}

impl MockClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, title: &str, wikitext: &str) -> Self {
        let page = PageContent {
            page_id: PageId(self.pages.len() as u64 + 1),
            title: Title::new(Namespace::MAIN, title),
            revision: RevisionId(100),
            timestamp: Utc.with_ymd_and_hms(2022, 11, 28, 16, 0, 0).unwrap(),
            wikitext: wikitext.to_string(),
            exists: true,
            is_redirect: false,
        };
        self.pages.insert(title.to_string(), page);
        self.search_results.push(Title::new(Namespace::MAIN, title));
        self
    }

    pub fn with_redirect(mut self, title: &str, target: &str) -> Self {
        self = self.with_page(title, &format!("#REDIRECT [[{target}]]"));
        if let Some(page) = self.pages.get_mut(title) {
            page.is_redirect = true;
        }
        self
    }

    /// A search hit whose page has since been deleted.
    pub fn with_missing_hit(mut self, title: &str) -> Self {
        self.search_results.push(Title::new(Namespace::MAIN, title));
        self
    }

    pub fn failing_edits(mut self) -> Self {
        self.fail_edits = true;
        self
    }

    pub fn edits(&self) -> Vec<SavedEdit> {
        self.edits.lock().unwrap().clone()
    }

    pub fn searches(&self) -> Vec<(String, usize)> {
        self.searches.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaWikiClient for MockClient {
    async fn login_bot_password(&self, _username: &str, _password: &str) -> Result<(), MwApiError> {
        Ok(())
    }

    async fn fetch_csrf_token(&self) -> Result<String, MwApiError> {
        Ok("mocktoken+\\".to_string())
    }

    async fn get_page(&self, title: &Title) -> Result<PageContent, MwApiError> {
        Ok(self
            .pages
            .get(&title.display)
            .cloned()
            .unwrap_or_else(|| PageContent::missing(title.clone())))
    }

    async fn edit_page(&self, edit: &EditRequest) -> Result<EditResponse, MwApiError> {
        if self.fail_edits {
            return Err(MwApiError::EditConflict {
                title: edit.title.display.clone(),
            });
        }
        let mut edits = self.edits.lock().unwrap();
        edits.push(SavedEdit {
            title: edit.title.display.clone(),
            text: edit.text.clone(),
            summary: edit.summary.clone(),
            base_timestamp: edit.base_timestamp.clone(),
        });
        Ok(EditResponse {
            result: "Success".to_string(),
            new_revid: Some(100 + edits.len() as u64),
            new_timestamp: Some(Utc::now().to_rfc3339()),
        })
    }

    async fn search(
        &self,
        query: &str,
        _namespaces: &[Namespace],
        limit: usize,
    ) -> Result<Vec<Title>, MwApiError> {
        self.searches
            .lock()
            .unwrap()
            .push((query.to_string(), limit));
        Ok(self.search_results.iter().take(limit).cloned().collect())
    }
}

/// Answers reviews from a script, then saves.
pub struct ScriptedReview {
    answers: Vec<ReviewDecision>,
    pub seen: Vec<(String, String)>,
}

impl ScriptedReview {
    pub fn new(answers: Vec<ReviewDecision>) -> Self {
        Self {
            answers,
            seen: Vec::new(),
        }
    }
}

impl EditReview for ScriptedReview {
    fn review(&mut self, title: &Title, diff: &str) -> ReviewDecision {
        self.seen.push((title.display.clone(), diff.to_string()));
        if self.answers.is_empty() {
            ReviewDecision::Save
        } else {
            self.answers.remove(0)
        }
    }
}
