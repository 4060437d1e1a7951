pub mod aggregate;
pub mod defaults;
pub mod treemap;
