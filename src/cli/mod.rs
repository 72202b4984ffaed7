//! CLI layer: thin command shells over the library

pub mod commands;
