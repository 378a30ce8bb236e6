pub mod diff;
pub mod link_insert;
pub mod page_merge;
pub mod reading_list;
pub mod skip;

pub use link_insert::LinkInserter;
pub use page_merge::merge_entries;
pub use reading_list::entry_for;
pub use skip::{SkipCondition, SkipEngine};
