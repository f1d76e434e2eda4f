//! Session layer: a supervisor actor that owns the conversation store and
//! forwards user lines to the query engine.

pub mod messages;
pub mod supervisor;
pub mod traits;
