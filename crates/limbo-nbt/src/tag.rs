//! The in-memory tag tree.
//!
//! Compounds are unordered; lists keep their element order, which registry
//! payloads rely on.

use std::collections::HashMap;

pub type NbtCompound = HashMap<String, NbtTag>;

/// Wire ids of each tag kind.
pub mod id {
    pub const END: u8 = 0;
    pub const BYTE: u8 = 1;
    pub const SHORT: u8 = 2;
    pub const INT: u8 = 3;
    pub const LONG: u8 = 4;
    pub const FLOAT: u8 = 5;
    pub const DOUBLE: u8 = 6;
    pub const BYTE_ARRAY: u8 = 7;
    pub const STRING: u8 = 8;
    pub const LIST: u8 = 9;
    pub const COMPOUND: u8 = 10;
    pub const INT_ARRAY: u8 = 11;
    pub const LONG_ARRAY: u8 = 12;
}

/// A compound with its root name, as stored in `.dat` and `.nbt` files.
#[derive(Debug, Clone, PartialEq)]
pub struct NbtRoot {
    pub name: String,
    pub compound: NbtCompound,
}

impl NbtRoot {
    pub fn new(name: impl Into<String>, compound: NbtCompound) -> Self {
        Self {
            name: name.into(),
            compound,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NbtTag {
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    ByteArray(Vec<i8>),
    String(String),
    List(Vec<NbtTag>),
    Compound(NbtCompound),
    IntArray(Vec<i32>),
    LongArray(Vec<i64>),
}

macro_rules! view {
    ($name:ident, $variant:ident, $out:ty) => {
        pub fn $name(&self) -> Option<$out> {
            match self {
                NbtTag::$variant(v) => Some(v),
                _ => None,
            }
        }
    };
    (mut $name:ident, $variant:ident, $out:ty) => {
        pub fn $name(&mut self) -> Option<$out> {
            match self {
                NbtTag::$variant(v) => Some(v),
                _ => None,
            }
        }
    };
}

impl NbtTag {
    pub const fn id(&self) -> u8 {
        match self {
            NbtTag::Byte(_) => id::BYTE,
            NbtTag::Short(_) => id::SHORT,
            NbtTag::Int(_) => id::INT,
            NbtTag::Long(_) => id::LONG,
            NbtTag::Float(_) => id::FLOAT,
            NbtTag::Double(_) => id::DOUBLE,
            NbtTag::ByteArray(_) => id::BYTE_ARRAY,
            NbtTag::String(_) => id::STRING,
            NbtTag::List(_) => id::LIST,
            NbtTag::Compound(_) => id::COMPOUND,
            NbtTag::IntArray(_) => id::INT_ARRAY,
            NbtTag::LongArray(_) => id::LONG_ARRAY,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            NbtTag::Int(v) => Some(*v),
            _ => None,
        }
    }

    view!(as_string, String, &str);
    view!(as_byte_array, ByteArray, &[i8]);
    view!(as_list, List, &[NbtTag]);
    view!(as_compound, Compound, &NbtCompound);
    view!(mut as_list_mut, List, &mut Vec<NbtTag>);
    view!(mut as_compound_mut, Compound, &mut NbtCompound);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn views_match_only_their_kind() {
        assert_eq!(NbtTag::Int(42).as_int(), Some(42));
        assert_eq!(NbtTag::Byte(42).as_int(), None);
        assert_eq!(NbtTag::String("void".into()).as_string(), Some("void"));
        assert!(NbtTag::Int(5).as_string().is_none());
        assert_eq!(NbtTag::ByteArray(vec![1, -1]).as_byte_array(), Some(&[1i8, -1][..]));
        assert!(NbtTag::List(vec![]).as_compound().is_none());
    }

    #[test]
    fn registry_entry_edited_in_place() {
        let mut registry = NbtTag::List(vec![NbtTag::Compound(NbtCompound::new())]);
        let entry = registry
            .as_list_mut()
            .and_then(|l| l.first_mut())
            .and_then(NbtTag::as_compound_mut)
            .unwrap();
        entry.insert("sky_color".into(), NbtTag::Int(0));
        assert_eq!(
            registry.as_list().unwrap()[0].as_compound().unwrap()["sky_color"],
            NbtTag::Int(0)
        );
    }

    #[test]
    fn list_and_compound_ids() {
        assert_eq!(NbtTag::List(vec![]).id(), id::LIST);
        assert_eq!(NbtTag::Compound(NbtCompound::new()).id(), id::COMPOUND);
        assert_eq!(NbtTag::LongArray(vec![]).id(), id::LONG_ARRAY);
    }
}
