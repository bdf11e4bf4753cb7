pub mod journal;
pub mod mood;
pub mod post;
pub mod user;
