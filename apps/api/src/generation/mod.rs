// Letter generation: per-section prompting, retry, cleanup, and the pipeline
// that ties the sections to the fetched company material.
// All model calls go through llm_client.

pub mod cleanup;
pub mod pipeline;
pub mod prompts;
pub mod retry;
pub mod sections;
