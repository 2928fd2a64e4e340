//! Configuration management for the puzzle solver

pub mod settings;

pub use settings::{
    BatchConfig, CliOverrides, EncodingConfig, OutputConfig, OutputFormat, Settings, SolverConfig,
};
