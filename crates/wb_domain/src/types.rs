use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RevisionId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Namespace(pub i32);

impl Namespace {
    pub const MAIN: Self = Self(0);
    pub const TALK: Self = Self(1);
    pub const USER: Self = Self(2);
    pub const USER_TALK: Self = Self(3);
    pub const PROJECT: Self = Self(4);
    pub const FILE: Self = Self(6);
    pub const TEMPLATE: Self = Self(10);
    pub const HELP: Self = Self(12);
    pub const CATEGORY: Self = Self(14);

    /// Canonical English prefix for the namespace, if it has a well-known one.
    pub fn canonical_name(self) -> Option<&'static str> {
        match self.0 {
            0 => Some(""),
            1 => Some("Talk"),
            2 => Some("User"),
            3 => Some("User talk"),
            4 => Some("Project"),
            6 => Some("File"),
            10 => Some("Template"),
            12 => Some("Help"),
            14 => Some("Category"),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Title {
    pub namespace: Namespace,
    pub name: String,
    pub display: String,
}

impl Title {
    pub fn new(namespace: Namespace, name: impl Into<String>) -> Self {
        let name = name.into();
        let display = match namespace.canonical_name() {
            Some("") => name.clone(),
            Some(prefix) => format!("{}:{}", prefix, &name),
            None => format!("{}:{}", namespace.0, &name),
        };
        Self {
            namespace,
            name,
            display,
        }
    }

    /// Build a title from the full display form the API returns
    /// (e.g. `"User:Example"` in namespace 2).
    pub fn from_display(namespace: Namespace, display: impl Into<String>) -> Self {
        let display = display.into();
        let name = match namespace.canonical_name() {
            Some("") | None => display.clone(),
            Some(prefix) => display
                .strip_prefix(prefix)
                .and_then(|rest| rest.strip_prefix(':'))
                .unwrap_or(&display)
                .to_string(),
        };
        Self {
            namespace,
            name,
            display,
        }
    }
}

impl std::fmt::Display for Title {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageContent {
    pub page_id: PageId,
    pub title: Title,
    pub revision: RevisionId,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub wikitext: String,
    /// False when the API reported the page as missing; `wikitext` is then empty.
    pub exists: bool,
    pub is_redirect: bool,
}

impl PageContent {
    /// A page that does not exist yet, as returned for `missing` titles.
    pub fn missing(title: Title) -> Self {
        Self {
            page_id: PageId(0),
            title,
            revision: RevisionId(0),
            timestamp: chrono::Utc::now(),
            wikitext: String::new(),
            exists: false,
            is_redirect: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipDecision {
    Process,
    Skip(&'static str),
}
