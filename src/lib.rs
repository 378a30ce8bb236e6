//! Umbrella crate for the end-to-end tests and benchmarks: the message
//! parser, the entry formatter and the page merge, under one name.

pub use wb_domain as domain;
pub use wb_engine as engine;
pub use wb_mail as mail;

use wb_mail::parse_message;

/// Raw message bytes straight to a reading-list entry.
pub fn entry_for_raw(raw: &[u8]) -> Option<String> {
    parse_message(raw).and_then(|message| wb_engine::entry_for(&message))
}
