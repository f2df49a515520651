// GitHub access through the `gh` CLI.
// Repository types, input validation, and the caching remote fetcher.

pub mod fetcher;
pub mod types;
pub mod validate;

pub use fetcher::RemoteFetcher;
pub use types::*;
