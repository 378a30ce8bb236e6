use wb_domain::types::Title;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewDecision {
    Save,
    Skip,
    /// Skip this edit and end the run.
    Stop,
}

/// Asked before every save with the proposed unified diff.
pub trait EditReview: Send {
    fn review(&mut self, title: &Title, diff: &str) -> ReviewDecision;
}

/// Saves everything without asking.
#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysSave;

impl EditReview for AlwaysSave {
    fn review(&mut self, _title: &Title, _diff: &str) -> ReviewDecision {
        ReviewDecision::Save
    }
}
