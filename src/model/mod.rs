pub mod bundle;
pub mod conversion;
pub mod definition;
pub mod migration;

pub use bundle::*;
pub use conversion::*;
pub use definition::*;
pub use migration::{CURRENT_SCHEMA_VERSION, migrate};
