pub mod analysis;
pub mod extract;
pub mod handlers;
pub mod prompts;
pub mod repo;
pub mod storage;
