//! Built-in hop stages.

pub mod reference;
pub mod share;

pub use reference::ReferenceStage;
pub use share::ShareStage;
