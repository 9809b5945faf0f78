//! Typed configuration items: declarative accessors for one path in the
//! backing document, with default fallback and deprecated-key migration.

use derive_builder::Builder;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_value::Value;

use crate::document::Document;
use crate::error::Error;
use crate::registry::ConfigRegistry;

/// Values a configuration item can hold.
///
/// Blanket-implemented for every `Clone + Serialize + DeserializeOwned` type,
/// so the closed set of document scalars (strings, booleans, integers,
/// floats, lists) and arbitrary serde structs all work. Each `ConfigItem<T>`
/// monomorphizes to a direct accessor for its `T`; nothing inspects the
/// default's type at read time.
pub trait ConfigValue: Clone + Serialize + DeserializeOwned {}

impl<T: Clone + Serialize + DeserializeOwned> ConfigValue for T {}

/// A strongly-typed accessor for one configuration path.
///
/// An item is an immutable descriptor: a dot-addressed `path`, a default
/// value applied whenever the path is absent, and an ordered list of
/// deprecated keys migrated into `path` on [`init`](ConfigItem::init). It
/// caches nothing — every read goes back to the document, so there is no
/// local staleness.
///
/// Items do not own the store. Every operation takes the
/// [`ConfigRegistry`] that does, keeping mutation visible to the borrow
/// checker instead of hiding it behind a process-wide singleton.
///
/// # Example
///
/// ```rust
/// use keypath_config::{item, ConfigRegistry};
///
/// # fn main() -> Result<(), keypath_config::Error> {
/// # let dir = tempfile::tempdir().unwrap();
/// let volume = item("sound.volume", 1.0_f64).deprecated_keys(["sound.vol"]);
///
/// let mut registry = ConfigRegistry::open(dir.path().join("app.toml"))?;
/// registry.register(volume.clone())?;
/// registry.initialize()?;
///
/// assert_eq!(volume.get(&registry)?, 1.0);
/// let previous = volume.set(&mut registry, 0.25)?;
/// assert_eq!(previous, 1.0);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Builder)]
#[builder(setter(into))]
pub struct ConfigItem<T: Clone> {
    path: String,
    default_value: T,
    #[builder(default)]
    deprecated_keys: Vec<String>,
}

/// Constructs a configuration item with no deprecated keys.
///
/// The short form of [`ConfigItem::builder`]; chain
/// [`deprecated_keys`](ConfigItem::deprecated_keys) to add aliases.
pub fn item<T: ConfigValue>(path: impl Into<String>, default_value: T) -> ConfigItem<T> {
    ConfigItem {
        path: path.into(),
        default_value,
        deprecated_keys: Vec::new(),
    }
}

impl<T: Clone> ConfigItem<T> {
    /// The long-form declarative constructor.
    pub fn builder() -> ConfigItemBuilder<T> {
        ConfigItemBuilder::default()
    }

    /// Replaces the deprecated keys, oldest first. During migration the keys
    /// are applied in this order and the last one present wins.
    pub fn deprecated_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.deprecated_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// The immutable default, independent of store state.
    pub fn default_value(&self) -> &T {
        &self.default_value
    }

    pub fn deprecated(&self) -> &[String] {
        &self.deprecated_keys
    }
}

impl<T: ConfigValue> ConfigItem<T> {
    /// The value stored at this item's path, or the default if the path is
    /// absent. A single document query serves both cases.
    ///
    /// A stored value whose shape does not deserialize into `T` is an error;
    /// the crate does not coerce across type classes.
    pub fn get(&self, registry: &ConfigRegistry) -> Result<T, Error> {
        registry.document().get_with(&self.path, &self.default_value)
    }

    /// True iff the path is explicitly set in the document, whatever the
    /// value.
    pub fn is_defined(&self, registry: &ConfigRegistry) -> bool {
        registry.document().contains(&self.path)
    }

    /// Writes `value` and flushes the registry to durable storage.
    ///
    /// Returns the previous effective value, read before the write (the
    /// default if the path was absent). Equivalent to
    /// [`set_with(registry, value, true)`](ConfigItem::set_with).
    pub fn set(&self, registry: &mut ConfigRegistry, value: T) -> Result<T, Error> {
        self.set_with(registry, value, true)
    }

    /// Writes `value`, flushing to durable storage only if `save` is true.
    ///
    /// With `save = false` the document is updated in memory only — but the
    /// flush is registry-wide, so a later saving write on *any* item will
    /// persist this change too. Suppressing the save defers persistence, it
    /// does not isolate the write.
    ///
    /// Returns the previous effective value.
    pub fn set_with(&self, registry: &mut ConfigRegistry, value: T, save: bool) -> Result<T, Error> {
        let previous = self.get(registry)?;
        registry.document_mut().set(&self.path, &value)?;
        if save {
            registry.save()?;
        }
        Ok(previous)
    }

    /// Renders the current effective value as text. Never fails on an absent
    /// path, since the default always applies.
    pub fn render(&self, registry: &ConfigRegistry) -> Result<String, Error> {
        let effective = serde_value::to_value(self.get(registry)?)?;
        Ok(render_value(&effective))
    }

    /// Applies this item's defaults and migrations to the document.
    ///
    /// Run once per item, at registry startup:
    ///
    /// 1. If the path is undefined, the default is written there.
    /// 2. Each deprecated key present in the document is moved to the path
    ///    (overwriting whatever is there — a surviving deprecated key means
    ///    the item was never migrated, so its value is authoritative even
    ///    when the canonical path already holds something) and removed.
    ///
    /// Returns whether the document was mutated, so the caller can decide to
    /// trigger a save pass. A second call is a no-op returning `false`.
    pub fn init(&self, document: &mut Document) -> Result<bool, Error> {
        let mut affected = false;

        if !document.contains(&self.path) {
            document.set(&self.path, &self.default_value)?;
            tracing::debug!(path = %self.path, "seeded default value");
            affected = true;
        }

        for old_key in &self.deprecated_keys {
            if let Some(value) = document.remove(old_key) {
                tracing::debug!(from = %old_key, to = %self.path, "migrated deprecated key");
                document.set_value(&self.path, value);
                affected = true;
            }
        }

        Ok(affected)
    }
}

fn render_value(value: &Value) -> String {
    match value {
        Value::Bool(b) => b.to_string(),
        Value::U8(n) => n.to_string(),
        Value::U16(n) => n.to_string(),
        Value::U32(n) => n.to_string(),
        Value::U64(n) => n.to_string(),
        Value::I8(n) => n.to_string(),
        Value::I16(n) => n.to_string(),
        Value::I32(n) => n.to_string(),
        Value::I64(n) => n.to_string(),
        Value::F32(n) => n.to_string(),
        Value::F64(n) => n.to_string(),
        Value::Char(c) => c.to_string(),
        Value::String(s) => s.clone(),
        Value::Unit => String::new(),
        Value::Option(None) => String::new(),
        Value::Option(Some(inner)) => render_value(inner),
        Value::Newtype(inner) => render_value(inner),
        Value::Seq(items) => {
            let rendered: Vec<String> = items.iter().map(render_value).collect();
            format!("[{}]", rendered.join(", "))
        }
        Value::Map(entries) => {
            let rendered: Vec<String> = entries
                .iter()
                .map(|(k, v)| format!("{} = {}", render_value(k), render_value(v)))
                .collect();
            format!("{{{}}}", rendered.join(", "))
        }
        Value::Bytes(bytes) => format!("{bytes:?}"),
    }
}

/// A type-erased configuration item, as held by the registry.
pub trait AnyItem: Send + Sync {
    fn path(&self) -> &str;
    fn init(&self, document: &mut Document) -> Result<bool, Error>;
}

impl<T> AnyItem for ConfigItem<T>
where
    T: ConfigValue + Send + Sync + 'static,
{
    fn path(&self) -> &str {
        &self.path
    }

    fn init(&self, document: &mut Document) -> Result<bool, Error> {
        ConfigItem::init(self, document)
    }
}

/// A registered item descriptor, collected by
/// [`ConfigRegistry::open`](crate::ConfigRegistry::open).
pub struct RegisteredItem {
    pub construct: fn() -> Box<dyn AnyItem>,
}

impl RegisteredItem {
    pub const fn new(construct: fn() -> Box<dyn AnyItem>) -> Self {
        Self { construct }
    }
}

inventory::collect!(RegisteredItem);

#[macro_export]
macro_rules! submit_item {
    ($item:expr) => {
        ::inventory::submit! {
            $crate::RegisteredItem::new(
                || ::std::boxed::Box::new($item) as ::std::boxed::Box<dyn $crate::AnyItem>,
            )
        }
    };
}
