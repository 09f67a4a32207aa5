pub mod runtime_error;
pub mod stack;
pub mod vm;
