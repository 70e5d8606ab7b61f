#![warn(missing_docs)]
#![warn(clippy::std_instead_of_core)]
#![warn(clippy::std_instead_of_alloc)]
#![deny(unsafe_code)]
#![doc = include_str!("../README.md")]

extern crate alloc;

mod engine;
mod env;
mod error;
mod in_place;
mod path;
mod provider;
pub mod schema;

pub use engine::Configurator;
pub use env::EnvProvider;
pub use error::{ConfigError, ConfigErrorKind, ProviderError};
pub use path::ConfigPath;
pub use provider::{Provider, ProviderChain};
