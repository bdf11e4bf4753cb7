pub mod analytics;
pub mod assistant;
pub mod auth;
pub mod community;
pub mod health;
pub mod journal;
pub mod moods;
pub mod ws;
