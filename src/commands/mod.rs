pub mod bookmark;
pub mod post;
pub mod reset;

// Re-export command functions for convenience
pub use bookmark::{add, check, delete, edit, lint, list, show, AddParams, EditParams};
pub use post::post;
pub use reset::{reset_all, reset_one};
