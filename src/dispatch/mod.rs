pub mod dispatcher;

pub use dispatcher::{Completion, DispatchError, DispatchOptions, UnitFailure, dispatch};
