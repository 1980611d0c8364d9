// src/core/mod.rs

pub mod color;
pub mod completion;
pub mod config_loader;
pub mod history;
pub mod line_editor;
pub mod paths;
pub mod pipeline;
pub mod redirect;
pub mod tokenizer;
