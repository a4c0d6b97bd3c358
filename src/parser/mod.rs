// file: src/parser/mod.rs
// description: document markup parsing module exports
// reference: internal module structure

pub mod storage;

pub use storage::to_plain_text;
