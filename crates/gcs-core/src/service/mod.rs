//! Business logic services (use cases).
//!
//! Services orchestrate repository calls and token lifecycle rules. They
//! depend on traits (ports) -- never on concrete infrastructure.

pub mod token;
