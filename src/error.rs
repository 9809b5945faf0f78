use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization: {0}")]
    Serialization(#[from] serde_value::SerializerError),

    #[error("Deserialization: {0}")]
    Deserialization(#[from] serde_value::DeserializerError),

    #[error("TOML Serialization: {0}")]
    TomlSerialization(#[from] toml::ser::Error),

    #[error("TOML Deserialization: {0}")]
    TomlDeserialization(#[from] toml::de::Error),

    /// A typed getter found a value whose dynamic type does not match.
    ///
    /// Returned by the typed accessors on [`Document`](crate::Document)
    /// (`get_str`, `get_bool`, `get_i64`, `get_f64`, `get_list`) when the
    /// value stored at `path` exists but belongs to another type class. The
    /// crate never coerces across type classes; fix the stored value or read
    /// it through [`Document::get`](crate::Document::get) and inspect it
    /// yourself.
    #[error("type mismatch at `{path}`: expected {expected}, found {found}")]
    TypeMismatch {
        path: String,
        expected: &'static str,
        found: &'static str,
    },

    /// Two configuration items were registered for the same path.
    ///
    /// Paths identify items; a registry refuses to hold two items that would
    /// both claim to be the accessor for one location.
    ///
    /// # How to Fix
    ///
    /// Register each path once, whether through
    /// [`ConfigRegistry::register`](crate::ConfigRegistry::register), the
    /// registry builder, or [`submit_item!`](crate::submit_item):
    ///
    /// ```rust
    /// use keypath_config::{item, ConfigRegistry};
    ///
    /// # fn main() -> Result<(), keypath_config::Error> {
    /// # let dir = tempfile::tempdir().unwrap();
    /// let mut registry = ConfigRegistry::open(dir.path().join("app.toml"))?;
    /// registry.register(item("server.port", 8080_i64))?;
    /// // registering "server.port" again would return Error::DuplicateItem
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// The contained string is the offending path.
    #[error("configuration item registered twice: {0}")]
    DuplicateItem(String),

    /// The persisted document's root was not a key/value table.
    #[error("configuration document root is not a table")]
    NotATable,
}
