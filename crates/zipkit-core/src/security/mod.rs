//! Security validation modules.

pub mod path;
pub mod permissions;

pub use path::PathGuard;
pub use path::is_contained;
pub use permissions::sanitize_permissions;
