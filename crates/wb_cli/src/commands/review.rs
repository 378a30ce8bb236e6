use super::print_diff;
use console::style;
use dialoguer::Select;
use wb_bot::{EditReview, ReviewDecision};
use wb_domain::types::Title;

/// Shows each diff on the terminal and asks whether to save it.
pub struct InteractiveReview;

impl EditReview for InteractiveReview {
    fn review(&mut self, title: &Title, diff: &str) -> ReviewDecision {
        println!("\n{}", style(format!("Diff for: {}", title)).bold());
        println!("{}", style("─".repeat(60)).dim());
        print_diff(diff);
        println!("{}", style("─".repeat(60)).dim());

        let choices = ["Save", "Skip", "Stop"];
        match Select::new()
            .with_prompt("Action")
            .items(&choices)
            .default(0)
            .interact()
        {
            Ok(0) => ReviewDecision::Save,
            Ok(1) => ReviewDecision::Skip,
            Ok(_) => ReviewDecision::Stop,
            Err(e) => {
                tracing::warn!("Failed to read user input: {}", e);
                ReviewDecision::Stop
            }
        }
    }
}
