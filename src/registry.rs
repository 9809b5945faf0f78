//! The configuration registry: owner of the backing document and its file.
//!
//! This module provides [`ConfigRegistry`], the entry point for loading a
//! configuration document, declaring items against it, running the startup
//! migration pass, and flushing changes to disk.
//!
//! # Overview
//!
//! The [`ConfigRegistry`]:
//!
//! - Collects every item submitted with [`submit_item!`](crate::submit_item)
//!   and any item registered explicitly
//! - Loads the TOML document from a specified file
//! - Seeds defaults and migrates deprecated keys on
//!   [`initialize`](ConfigRegistry::initialize)
//! - Exposes the process-wide [`save`](ConfigRegistry::save) that item writes
//!   trigger
//!
//! # Example
//!
//! ```rust
//! use keypath_config::{item, ConfigRegistry};
//!
//! fn main() -> Result<(), keypath_config::Error> {
//!     # let dir = tempfile::tempdir().unwrap();
//!     # let config_path = dir.path().join("app.toml");
//!     let greeting = item("ui.greeting", String::from("hello"));
//!     let limit = item("limit", 10_i64);
//!
//!     let mut registry = ConfigRegistry::builder()
//!         .register(greeting.clone())
//!         .register(limit.clone())
//!         .open(&config_path)?;
//!
//!     // Seed defaults / migrate deprecated keys, saving if anything changed.
//!     registry.initialize()?;
//!
//!     assert_eq!(limit.get(&registry)?, 10);
//!     limit.set(&mut registry, 20)?;
//!     Ok(())
//! }
//! ```

use std::path::Path;

use crate::atomic::AtomicFile;
use crate::document::Document;
use crate::error::Error;
use crate::item::{AnyItem, ConfigItem, ConfigValue, RegisteredItem};

/// The registry owning the configuration document and the set of declared
/// items.
///
/// # Lifecycle
///
/// 1. **Open**: [`open`](ConfigRegistry::open) (or the
///    [`builder`](ConfigRegistry::builder)) reads the document from disk — an
///    absent file is an empty document — and collects every
///    [`submit_item!`](crate::submit_item) registration.
/// 2. **Register**: [`register`](ConfigRegistry::register) declares further
///    items. Each path may be claimed by exactly one item.
/// 3. **Initialize**: [`initialize`](ConfigRegistry::initialize) runs every
///    item's migration/default pass, once, at startup.
/// 4. **Access**: items read and write through the registry handle for the
///    rest of the process lifetime.
///
/// The document is process-shared mutable state accessed from one logical
/// thread; the registry takes `&mut self` on every mutation and needs no
/// further locking.
pub struct ConfigRegistry {
    file: AtomicFile,
    document: Document,
    items: Vec<Box<dyn AnyItem>>,
}

impl ConfigRegistry {
    /// Opens the document at `path` and collects all statically submitted
    /// items.
    ///
    /// An absent file yields an empty document; it is first written when
    /// something triggers [`save`](ConfigRegistry::save). A present file must
    /// parse as TOML with a table at the root.
    ///
    /// # Errors
    ///
    /// - [`Error::Io`] — the file exists but cannot be read
    /// - [`Error::TomlDeserialization`] — the file is not valid TOML
    /// - [`Error::NotATable`] — the document root is not a table
    /// - [`Error::DuplicateItem`] — two submitted items share a path
    pub fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let file = AtomicFile::new(path.as_ref());
        let document = match file.read()? {
            Some(contents) => Document::from_toml_str(&contents)?,
            None => Document::new(),
        };
        tracing::debug!(
            path = %file.path().display(),
            empty = document.is_empty(),
            "opened configuration document"
        );

        let mut registry = Self {
            file,
            document,
            items: Vec::new(),
        };
        for registration in inventory::iter::<RegisteredItem> {
            registry.register_boxed((registration.construct)())?;
        }
        Ok(registry)
    }

    /// A builder for registering items fluently before opening.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Declares `item` against this registry.
    ///
    /// Items are cheap to clone: register one copy and keep another for
    /// reads. Returns [`Error::DuplicateItem`] if the path is already
    /// claimed.
    pub fn register<T>(&mut self, item: ConfigItem<T>) -> Result<(), Error>
    where
        T: ConfigValue + Send + Sync + 'static,
    {
        self.register_boxed(Box::new(item))
    }

    fn register_boxed(&mut self, item: Box<dyn AnyItem>) -> Result<(), Error> {
        if self.items.iter().any(|known| known.path() == item.path()) {
            return Err(Error::DuplicateItem(item.path().to_owned()));
        }
        self.items.push(item);
        Ok(())
    }

    /// Runs every registered item's default/migration pass, in registration
    /// order, and saves once if anything changed.
    ///
    /// Returns whether any item mutated the document. Calling this again is
    /// harmless: a fully initialized document reports `false` and triggers no
    /// save.
    pub fn initialize(&mut self) -> Result<bool, Error> {
        let mut affected = false;
        for item in &self.items {
            affected |= item.init(&mut self.document)?;
        }
        if affected {
            self.save()?;
        }
        Ok(affected)
    }

    /// Flushes the whole document to durable storage.
    ///
    /// This is the registry-wide save that `set` on any item triggers: every
    /// pending in-memory mutation is persisted, including writes made with
    /// `save = false`.
    pub fn save(&self) -> Result<(), Error> {
        let rendered = self.document.to_toml_string()?;
        self.file.write(&rendered)?;
        tracing::debug!(path = %self.file.path().display(), "flushed configuration document");
        Ok(())
    }

    /// The backing document.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Mutable access to the backing document. Changes made here follow the
    /// same rules as item writes: in memory until the next
    /// [`save`](ConfigRegistry::save).
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    /// The file this registry persists to.
    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

/// Registers items fluently before the registry opens its document.
#[derive(Default)]
pub struct RegistryBuilder {
    items: Vec<Box<dyn AnyItem>>,
}

impl RegistryBuilder {
    pub fn register<T>(mut self, item: ConfigItem<T>) -> Self
    where
        T: ConfigValue + Send + Sync + 'static,
    {
        self.items.push(Box::new(item));
        self
    }

    /// Opens the registry at `path` with the builder's items registered on
    /// top of any [`submit_item!`](crate::submit_item) submissions.
    pub fn open(self, path: impl AsRef<Path>) -> Result<ConfigRegistry, Error> {
        let mut registry = ConfigRegistry::open(path)?;
        for item in self.items {
            registry.register_boxed(item)?;
        }
        Ok(registry)
    }
}
