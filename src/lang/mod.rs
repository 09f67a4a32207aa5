//! # Quill values and operators
//!
//! The scalar [`value::Value`] type, the operator set shared by the evaluator
//! and the VM, and the direct evaluator.

pub mod eval;
pub mod operator;
pub mod value;
