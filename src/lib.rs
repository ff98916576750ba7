//! Infers season, episode and quality from media filenames and turns them
//! into find/replace regex rules for batch renaming.

pub mod credentials;
pub mod error;
pub mod filename_parser;
pub mod metadata;
pub mod pipeline;
pub mod prompt;
pub mod regex_synth;
pub mod scanner;
