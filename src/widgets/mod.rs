pub mod banner;
pub mod charts;
pub mod controls;
pub mod debug;
pub mod selectors;
