pub mod launcher;
pub mod opt;
