pub mod document;
pub mod error;
pub mod item;
pub mod registry;
pub mod tick;

mod atomic;

pub use document::Document;
pub use error::Error;
pub use item::{item, AnyItem, ConfigItem, ConfigItemBuilder, ConfigValue, RegisteredItem};
pub use registry::{ConfigRegistry, RegistryBuilder};
pub use tick::TickScheduler;

// the dynamic value type of the backing document
pub use serde_value::Value;
