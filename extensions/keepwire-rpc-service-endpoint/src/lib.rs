mod endpoint;
pub use endpoint::*;

mod interface_table;
pub use interface_table::*;

mod registry;
pub use registry::*;
