//! Opcode handler modules
//!
//! Handlers are free functions over the pieces of VM state they touch, so
//! each can be exercised without a running VM.

pub mod arithmetic;
pub mod comparison;
pub mod variables;
