// Document generation pipeline.
// quota → profile snapshot → provider → assemble → persist → metering + quota commit.
// All backend calls go through `provider`; all persistence through `crate::store`.

pub mod assembler;
pub mod error;
pub mod handlers;
pub mod metering;
pub mod observer;
pub mod orchestrator;
pub mod profile;
pub mod prompts;
pub mod provider;
pub mod quota;
pub mod request;
