//! Ports - trait seams between the pipeline and the outside world.

pub mod command;
pub mod storage;
