pub mod compositor;
pub mod prompt;
pub mod synthesizer;
pub mod workflow;
