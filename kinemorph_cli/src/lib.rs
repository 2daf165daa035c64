// kinemorph_cli/src/lib.rs

// This module contains the command-line surface of the `kinemorph` binary.
pub mod cli;
pub mod commands;
pub mod config;
