pub mod errors;
pub mod retry;
pub mod rounding;
pub mod shutdown;

pub use errors::*;
pub use retry::*;
pub use rounding::*;
pub use shutdown::*;
