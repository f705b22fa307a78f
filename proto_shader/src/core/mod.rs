pub mod platform;
pub mod rendering;
pub mod time;
pub mod utils;
pub mod windowing;
