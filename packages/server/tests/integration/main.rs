mod common;
mod like;
mod video;
