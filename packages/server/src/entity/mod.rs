pub mod like;
pub mod user;
pub mod video;
pub mod video_file;
