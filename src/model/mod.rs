pub mod entry;
pub mod issue;
