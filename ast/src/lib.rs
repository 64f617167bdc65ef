//! Declaration tree model consumed by the struct2msg compiler.
//!
//! Front-ends (the built-in header parser, the clang JSON importer) build a
//! [`Decl`] tree; the compiler only ever reads it through a [`DeclCursor`].
//!
//! ```
//! use struct2msg_ast::*;
//!
//! let unit = Decl::translation_unit(vec![
//!     Decl::record(Some("Point"), TagKind::Struct, vec![
//!         Decl::field("x", TypeDesc::Builtin("int".to_owned())),
//!         Decl::field("y", TypeDesc::Builtin("int".to_owned())),
//!     ]),
//! ]);
//!
//! let point = DeclCursor::root(&unit).children().next().unwrap();
//! assert_eq!(point.qualified_name().as_deref(), Some("Point"));
//! assert_eq!(point.fields().count(), 2);
//! ```

pub mod cursor;
pub mod decl;
pub mod type_desc;

pub use cursor::*;
pub use decl::*;
pub use type_desc::*;
