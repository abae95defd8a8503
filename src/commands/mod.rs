pub mod files;
pub mod history;
pub mod info;
pub mod session;
pub mod status;

pub use files::*;
pub use history::*;
pub use info::*;
pub use session::{Session, SessionOptions};
pub use status::*;
