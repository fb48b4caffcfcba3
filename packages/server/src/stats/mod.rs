mod service;

pub use service::{
    ConsistencyReport, CounterDrift, OwnerLikes, OwnerMismatch, StatsError, StatsService,
    diff_owner_likes,
};
