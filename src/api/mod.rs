pub mod chat;
pub mod git;
pub mod knowledge;
