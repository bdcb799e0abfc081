//! Pattern-induction core for a subdomain wordlist generator.
//!
//! Ingests a set of passively observed subdomains and returns a small set
//! of high-quality generative templates with enumerated placeholder
//! payloads. See [`learn_patterns`] for the single entry point.

pub mod budget;
pub mod cancel;
pub mod closure;
pub mod config;
pub mod consolidate;
pub mod dictionary;
pub mod distance;
pub mod enrich;
pub mod error;
pub mod filter;
pub mod host;
pub mod level_group;
pub mod pattern;
pub mod pipeline;
pub mod quality;
pub mod sampler;
pub mod template;
pub mod token;
pub mod trie;

pub use cancel::CancelToken;
pub use config::{Config, Mode};
pub use dictionary::TokenDictionary;
pub use error::{CoreError, CoreResult};
pub use pattern::LearnedPattern;
pub use pipeline::{learn_patterns, learn_patterns_cancellable};
pub use template::Variable;
