//! Search API client.
//!
//! Developer-friendly goal: keep the public surface small and predictable.
//! Implementation details are split into submodules under `src/client/`.

pub mod builder;
pub mod core;
mod execution;
pub mod options;

pub use builder::SearchClientBuilder;
pub use self::core::SearchClient;
pub use options::RequestOptions;
