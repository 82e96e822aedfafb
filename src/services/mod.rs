pub mod feed;
pub mod review;
pub mod stats;
