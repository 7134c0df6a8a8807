pub mod authoring;
pub mod check_in;
pub mod conditions;
pub mod engine;
pub mod geodesy;
pub mod lifecycle;
pub mod memory;
pub mod progress;
pub mod storage;
pub mod time_window;

// Re-export main components
pub use check_in::*;
pub use conditions::*;
pub use engine::*;
pub use geodesy::*;
pub use memory::*;
pub use progress::*;
pub use storage::*;
