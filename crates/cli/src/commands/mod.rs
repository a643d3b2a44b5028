pub mod bindings;
pub mod generate;
pub mod project;
pub mod templates;

pub use bindings::*;
pub use generate::*;
pub use project::*;
pub use templates::*;
