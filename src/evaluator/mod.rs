//! The tree-walking evaluator.
//!
//! The evaluator is a dispatcher, not an interpreter: it enforces *which*
//! node kinds may run and *in what order* their children are visited, under
//! a per-call depth and wall-clock budget, and hands every semantically
//! meaningful operation — name lookup, function calls, operators — to the
//! universe it was built with.
//!
//! ## Design principles
//!
//! - **Closed allow-list**: node kinds are dispatched by an exhaustive match,
//!   so what the sandbox admits is auditable in one place.
//! - **Fail fast**: every violation aborts the whole evaluation; the one
//!   designed recovery is the loose-identity null substitution.
//! - **Balanced budgets**: depth bookkeeping is restored on success and
//!   failure alike, so thunks forced later by a universe see correct depth.
//!
//! ## Example
//!
//! ```
//! use warden::evaluator::Evaluator;
//! use warden::universe::SimpleUniverse;
//! use warden::values::Value;
//!
//! let universe = SimpleUniverse::new(
//!     [("answer".into(), Value::Int(42))].into_iter().collect(),
//!     Default::default(),
//! );
//! let evaluator = Evaluator::new(universe);
//! let result = evaluator.evaluate_expression("answer > 40").unwrap();
//! assert_eq!(result, Value::Bool(true));
//! ```

pub(crate) mod eval;
mod options;

pub use eval::Evaluator;
pub use options::{ConstantPolicy, ContainerPolicy, EvaluatorOptions};
