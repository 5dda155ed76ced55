pub mod pipeline;
mod prompts;

pub use pipeline::{AltText, AltTextPipeline, AltTextQuery, PipelineError};
