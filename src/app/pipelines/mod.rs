pub mod set_pipeline;

pub use set_pipeline::SetPipeline;
