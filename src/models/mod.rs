pub mod chat;
pub mod incident;
pub mod similar;
pub mod suggestion;

pub use chat::*;
pub use incident::*;
pub use similar::*;
pub use suggestion::*;
