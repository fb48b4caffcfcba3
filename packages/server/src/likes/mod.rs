mod service;

pub use service::{LikeError, LikeService, ToggleOutcome};
