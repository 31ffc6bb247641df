//! bf-core - Core library for Boilerflow
//!
//! This crate provides the variable model behind Boilerflow's template
//! engine: typed variables grouped into toggle-able sections, a dependency
//! grammar gating their activation, and the collection type that merges
//! specification layers, orders sections, applies value overrides and
//! validates the result.

pub mod collection;
pub mod error;
pub mod needs;
pub mod origin;
pub mod section;
pub mod value;
pub mod var_type;
pub mod variable;

pub use collection::{ValueMap, VariableCollection};
pub use error::{CoreError, CoreResult};
pub use needs::Need;
pub use origin::Origin;
pub use section::VariableSection;
pub use value::Value;
pub use var_type::VarType;
pub use variable::{Field, FieldSet, Variable, VariablePatch};
