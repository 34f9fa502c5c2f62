pub mod engine;

pub use engine::StopLossEngine;
