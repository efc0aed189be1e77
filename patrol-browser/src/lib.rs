pub mod browser;
pub mod error;
pub mod keys;
pub mod page;

pub use browser::{BrowserSession, Engine, SessionConfig};
pub use error::BrowserError;
pub use keys::Key;
pub use page::Page;

pub type Result<T> = std::result::Result<T, BrowserError>;
