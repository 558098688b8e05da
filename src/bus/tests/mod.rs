//! Unit tests for the event bus module.
//!
//! Tests are organised by concept: envelope construction and wire shape,
//! local dispatch semantics, and cross-bus relay behaviour.
