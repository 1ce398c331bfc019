//! # Kompanion Data Model
//!
//! Plain data records shared by every domain. They are serde-serializable so
//! the in-memory repositories can snapshot them to disk.
pub mod book;
pub mod device;
pub mod progress;
pub mod session;
pub mod user;

pub use book::Book;
pub use device::Device;
pub use progress::Progress;
pub use session::Session;
pub use user::User;
