//! OpenGL flavored canvas and 2D driver.

pub mod backend;
pub mod canvas;
pub mod driver;
pub mod driver_db;
pub mod extensions;
pub mod picker;
pub mod state_cache;

pub use backend::*;
pub use canvas::*;
pub use driver::*;
pub use driver_db::*;
pub use extensions::*;
pub use picker::*;
pub use state_cache::*;
