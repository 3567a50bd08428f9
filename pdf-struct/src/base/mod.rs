pub mod dict;
pub mod name;
pub mod object;
pub mod xref;

pub use dict::Dict;
pub use name::Name;
pub use object::Object;
pub use xref::XrefEntry;
