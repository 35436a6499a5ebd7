pub mod card;
pub mod filter;
pub mod handlers;
pub mod news;
pub mod source;
