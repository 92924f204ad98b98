//! Expression Module
//!
//! The tagged binary expression format (SEXP) carried inside `DT_SEXP`
//! parameters, and the in-memory tree it decodes into.
//!
//! - [`decode`] parses any node type the server sends
//! - [`encode_node`] serializes the subset the server accepts for assignment
//! - [`RList`], [`Factor`] and [`RBool`] are views over decoded values

pub mod tag;

mod cursor;
mod decode;
mod encode;
mod expr;
mod factor;
mod list;
mod rbool;

pub use decode::{decode, decode_parameter};
pub use encode::{encode_expression, encode_node};
pub use expr::{Expression, Value};
pub use factor::Factor;
pub use list::RList;
pub use rbool::RBool;
pub use tag::XpType;
