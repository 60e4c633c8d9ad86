//! Runtime coercion of strings and values into typed storage, and pre-order
//! traversal of nested values.
//!
//! Types opt in through [`Reflect`], implemented here for the standard
//! scalars, `String`, `Duration`, `Vec`, arrays, `HashMap`, `BTreeMap`,
//! `Option` and `Box`, and derived for structs:
//!
//! ```
//! use refl::Reflect;
//!
//! #[derive(Reflect, Clone, Default)]
//! struct Server {
//!     host: String,
//!     port: Option<u16>,
//! }
//!
//! let mut server = Server::default();
//! refl::assign_path(&mut server, "port", "8080").unwrap();
//! assert_eq!(server.port, Some(8080));
//! ```

pub mod assign;
pub mod bind;
pub mod error;
pub mod field;
mod impls;
pub mod parse;
mod primitive;
mod reflect;
mod target;
mod text;
pub mod traverse;

pub use assign::{assign, assign_string, assign_string_to_value, assign_value};
pub use bind::{assign_path, assign_paths};
pub use error::{BoxError, ParseFailure, ReflectError};
pub use field::{Field, Tag};
pub use primitive::{Primitive, PrimitiveMut};
pub use reflect::{AsAny, Kind, Map, Pointer, Reflect, ReflectMut, ReflectRef, Seq, Struct};
pub use target::Target;
pub use text::{SharedTextParsable, TextParsable};
pub use traverse::{State, Traverser, clear, traverse, traverse_fields, traverse_fields_mut, traverse_mut};

#[cfg(feature = "derive")]
pub use refl_derive::Reflect;
