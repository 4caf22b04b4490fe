pub mod ast;
pub mod builder;
