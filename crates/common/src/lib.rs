pub mod types;
pub mod utils;
pub mod money;
pub mod pagination;
pub mod env;
pub mod serde_ext;
