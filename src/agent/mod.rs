pub mod assistant;
pub mod classifier;
pub mod error;
pub mod loop_;

#[cfg(test)]
mod tests;

#[allow(unused_imports)]
pub use assistant::{FitnessAssistant, Flow, Reply, SessionState};
#[allow(unused_imports)]
pub use classifier::{Intent, IntentRule, IntentTable};
pub use error::FlowError;
#[allow(unused_imports)]
pub use loop_::{run, run_session};
