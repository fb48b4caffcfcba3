pub mod auth;
pub mod like;
pub mod shared;
pub mod stats;
pub mod video;
