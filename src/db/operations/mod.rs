pub mod items;
pub mod memory;
pub mod reviews;
pub mod stats;
