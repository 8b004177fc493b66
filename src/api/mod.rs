pub mod balance_query;
pub mod expense_handler;
pub mod router;

pub use balance_query::*;
pub use expense_handler::*;
pub use router::*;
