// Application layer: wires passes, stores and configuration together.

pub mod controller;
pub mod passes;
