//! Interactive authoring support
//!
//! - `Executor`: runs the user's editor in the foreground
//! - `save_template`: writes a template next to existing files without
//!   overwriting them

mod executor;
mod template;

pub use executor::{Executor, ExecError, ExecResult, editor_script};
pub use template::save_template;
