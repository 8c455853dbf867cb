//! Named definitions the host exports into the script global namespace
//!
//! At environment-preparation time the host enumerates a sequence of these;
//! the bridge binds each one as a script global using a type-specific
//! binding rule (see the bridge's lifecycle module).

/// Value of a host-exported definition, tagged by semantic type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefValue {
    /// Bound literally, e.g. `bits = 64`.
    Int(i64),
    /// Bound as a quoted string literal.
    Str(String),
    /// An opaque native object, bound through a cast-from-address helper of
    /// the named script-side type.
    Handle { type_name: String, addr: usize },
}

/// One `(name, type, value)` triple exported by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Definition {
    pub name: String,
    pub value: DefValue,
}

impl Definition {
    pub fn int(name: impl Into<String>, value: i64) -> Self {
        Definition {
            name: name.into(),
            value: DefValue::Int(value),
        }
    }

    pub fn str(name: impl Into<String>, value: impl Into<String>) -> Self {
        Definition {
            name: name.into(),
            value: DefValue::Str(value.into()),
        }
    }

    pub fn handle(name: impl Into<String>, type_name: impl Into<String>, addr: usize) -> Self {
        Definition {
            name: name.into(),
            value: DefValue::Handle {
                type_name: type_name.into(),
                addr,
            },
        }
    }
}
