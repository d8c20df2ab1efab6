//! Libris application library: the book catalog modules mounted on the
//! libris runtime crates.

pub mod modules;
