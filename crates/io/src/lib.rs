// File I/O and share links

pub mod csv;
pub mod json;
pub mod preview;
pub mod share;
pub mod templates;
