pub mod behavior;
pub mod context;
pub mod validation;
pub mod visibility;

pub use behavior::FieldBehaviorEngine;
pub use context::EngineContext;
pub use validation::{ValidationEngine, ValidationFailure};
pub use visibility::VisibilityEngine;
