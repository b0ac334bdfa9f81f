pub mod protocol;
pub mod entities;
pub mod template;
pub mod progression;
pub mod hooks;
pub mod modifiers;
pub mod skills;
pub mod items;
pub mod heroes;
pub mod catalog;
pub mod content;

pub use protocol::*;
pub use entities::*;
pub use progression::*;
pub use hooks::*;
pub use modifiers::*;
pub use skills::*;
pub use items::*;
pub use heroes::*;
pub use catalog::*;
