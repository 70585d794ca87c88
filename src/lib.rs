pub mod config;
pub mod core;
pub mod engine;
pub mod error;
pub mod host;
pub mod payload;
pub mod script;
pub mod service;
pub mod session;
pub mod tokens;
pub mod wizard;

#[cfg(test)]
mod testing;

pub use config::{FormDefinition, ScriptLimits, Settings};
pub use crate::core::field;
pub use crate::core::form_state;
pub use crate::core::step;
pub use crate::core::template;
pub use crate::core::text_edit;
pub use crate::core::value;
pub use error::{FormError, Result};

pub use engine::behavior;
pub use engine::context;
pub use engine::validation;
pub use engine::visibility;
