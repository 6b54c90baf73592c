//! Stores: owned state containers behind cloneable handles.

pub mod content;
pub mod drafts;
pub mod messages;

pub use content::{ContentStore, REPORT_ACK, REPORT_REASONS, ReportRecord};
pub use drafts::{DELETE_DRAFT_PROMPT, DRAFTS_KEY, DraftCache};
pub use messages::{ChatMessage, ChatThread, MessageStore};
