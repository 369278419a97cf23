pub mod attempts;
pub mod puzzle;
pub mod scoring;
