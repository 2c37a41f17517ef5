//! Property-based test modules.

mod queue_laws;
mod time_laws;
