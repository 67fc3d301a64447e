pub mod paths;

pub use paths::{lexical_resolve, to_platform_separators};
