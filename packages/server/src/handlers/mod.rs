pub mod auth;
pub mod like;
pub mod stats;
pub mod video;
