//! The single-step rewriting engine.
//!
//! Given an expression, a selection within it, and a set of invariant rules, the engine
//! deterministically picks and executes one pedagogically correct rewrite:
//!
//! 1. the selection is [normalized](selection::normalize) into an anchor;
//! 2. the anchor is [expanded](window::resolve) into a semantic window;
//! 3. the rules whose structural preconditions hold are [matched](matcher::match_rules);
//! 4. matched rules become [candidates](candidate::generate), which are narrowed to the
//!    selection;
//! 5. the [decision](decision::decide) picks the first ready candidate;
//! 6. the candidate is [executed](execute::execute), producing a new tree.
//!
//! [`orchestrator::step`] runs the whole sequence.
//!
//! ```
//! use stepwise_engine::{ctxt::StepContext, history::StepHistory, orchestrator::{step, StepRequest}};
//!
//! let mut ctx = StepContext::default();
//! let outcome = step(&mut ctx, &StepRequest::new("1/7 + 3/7"), StepHistory::new());
//! assert_eq!(outcome.response.new_expression_text.as_deref(), Some("4/7"));
//! ```

pub mod candidate;
pub mod ctxt;
pub mod decision;
pub mod error;
pub mod execute;
pub mod history;
pub mod matcher;
pub mod orchestrator;
pub mod pattern;
pub mod primitive;
pub mod registry;
pub mod selection;
pub mod window;

pub use error::{EngineError, ErrorCode};
pub use registry::Registry;
