//! Data structures of the object model: dynamic values, member tables,
//! callable members, class descriptors, instances and call contexts.

pub mod context;
pub mod descriptor;
pub mod error;
pub mod instance;
pub mod method;
pub mod object;
pub mod value;
