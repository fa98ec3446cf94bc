//! Background loops for continuous processing.

pub mod broadcast_loop;
