// src/cli/handlers/mod.rs

// This module contains the logic for each internal command.

pub mod cd;
pub mod echo;
pub mod exit;
pub mod help;
pub mod history;
pub mod pwd;
pub mod type_cmd;
