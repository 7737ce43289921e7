#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::return_self_not_must_use)]

//! Core library for importnav: import specifier resolution for JS/TS projects.

pub mod config;
pub mod error;
pub mod resolver;
pub mod version;

pub use config::ResolverConfig;
pub use error::Error;
pub use resolver::{
    Explanation, ResolveOutcome, ResolvePhase, ResolveReasonCode, Resolver, SpecifierKind,
};
pub use version::{SCHEMA_VERSION, VERSION};
