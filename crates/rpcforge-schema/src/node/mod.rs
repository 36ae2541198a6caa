mod arg;
mod column;
mod entry;
mod enum_var;
mod meta;
mod model;
mod rpc_type;

pub use arg::*;
pub use column::*;
pub use entry::*;
pub use enum_var::*;
pub use meta::*;
pub use model::*;
pub use rpc_type::*;
