pub mod types;
pub mod filter_where;
pub mod filter_order;
pub mod error;

pub use types::*;
pub use error::FilterError;
pub use filter_where::FilterWhere;
pub use filter_order::FilterOrder;
