pub mod catalog;
pub mod relay;
pub mod retrieval;

pub use catalog::*;
pub use relay::*;
pub use retrieval::*;
