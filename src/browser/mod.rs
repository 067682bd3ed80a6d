pub mod chrome;
pub mod session;

pub use chrome::{ChromeLauncher, ChromePage, ChromeSession};
pub use session::{RenderSession, SessionLauncher};
