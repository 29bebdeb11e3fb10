mod ext;
pub use self::ext::{type_definition_name, DocumentExt, ObjectTypeExt, TypeExt, BUILTIN_SCALARS};

pub mod object_macro;
pub use self::object_macro::{object_value, IntoValue};
