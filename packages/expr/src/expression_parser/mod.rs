/**
 * Expression Parser Module
 *
 * Template grammar, packrat memo table and AST serializer
 */
pub mod ast;
pub mod memo;
pub mod parser;
pub mod serializer;

pub use ast::*;
pub use parser::Parser;
pub use serializer::{serialize, serialize_template};
