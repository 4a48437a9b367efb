mod linear_queue;

pub use linear_queue::*;
