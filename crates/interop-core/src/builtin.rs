//! Guest builtin (fundamental) types.

use std::fmt;

/// A fundamental guest type.
///
/// Sizes are not part of the kind; they come from the
/// [`TargetInfo`](crate::TargetInfo) the translation unit was built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BuiltinKind {
    Void,
    Bool,
    Char,
    SChar,
    UChar,
    Short,
    UShort,
    Int,
    UInt,
    Long,
    ULong,
    LongLong,
    ULongLong,
    Float,
    Double,
}

/// Spellings accepted for each builtin, canonical spelling first.
const SPELLINGS: &[(&str, BuiltinKind)] = &[
    ("void", BuiltinKind::Void),
    ("bool", BuiltinKind::Bool),
    ("char", BuiltinKind::Char),
    ("signed char", BuiltinKind::SChar),
    ("unsigned char", BuiltinKind::UChar),
    ("short", BuiltinKind::Short),
    ("short int", BuiltinKind::Short),
    ("signed short", BuiltinKind::Short),
    ("unsigned short", BuiltinKind::UShort),
    ("unsigned short int", BuiltinKind::UShort),
    ("int", BuiltinKind::Int),
    ("signed", BuiltinKind::Int),
    ("signed int", BuiltinKind::Int),
    ("unsigned int", BuiltinKind::UInt),
    ("unsigned", BuiltinKind::UInt),
    ("long", BuiltinKind::Long),
    ("long int", BuiltinKind::Long),
    ("signed long", BuiltinKind::Long),
    ("unsigned long", BuiltinKind::ULong),
    ("unsigned long int", BuiltinKind::ULong),
    ("long long", BuiltinKind::LongLong),
    ("long long int", BuiltinKind::LongLong),
    ("signed long long", BuiltinKind::LongLong),
    ("unsigned long long", BuiltinKind::ULongLong),
    ("unsigned long long int", BuiltinKind::ULongLong),
    ("float", BuiltinKind::Float),
    ("double", BuiltinKind::Double),
];

impl BuiltinKind {
    /// Every builtin kind, in declaration order.
    pub const ALL: [BuiltinKind; 15] = [
        BuiltinKind::Void,
        BuiltinKind::Bool,
        BuiltinKind::Char,
        BuiltinKind::SChar,
        BuiltinKind::UChar,
        BuiltinKind::Short,
        BuiltinKind::UShort,
        BuiltinKind::Int,
        BuiltinKind::UInt,
        BuiltinKind::Long,
        BuiltinKind::ULong,
        BuiltinKind::LongLong,
        BuiltinKind::ULongLong,
        BuiltinKind::Float,
        BuiltinKind::Double,
    ];

    /// Look up a builtin by any of its accepted spellings.
    ///
    /// Matching is exact: `"unsigned int"` resolves, `"unsigned  int"` and
    /// `"Int"` do not.
    pub fn from_name(name: &str) -> Option<BuiltinKind> {
        SPELLINGS
            .iter()
            .find(|(spelling, _)| *spelling == name)
            .map(|(_, kind)| *kind)
    }

    /// All accepted spellings.
    pub fn spellings() -> impl Iterator<Item = &'static str> {
        SPELLINGS.iter().map(|(spelling, _)| *spelling)
    }

    /// Canonical spelling.
    pub fn name(self) -> &'static str {
        match self {
            BuiltinKind::Void => "void",
            BuiltinKind::Bool => "bool",
            BuiltinKind::Char => "char",
            BuiltinKind::SChar => "signed char",
            BuiltinKind::UChar => "unsigned char",
            BuiltinKind::Short => "short",
            BuiltinKind::UShort => "unsigned short",
            BuiltinKind::Int => "int",
            BuiltinKind::UInt => "unsigned int",
            BuiltinKind::Long => "long",
            BuiltinKind::ULong => "unsigned long",
            BuiltinKind::LongLong => "long long",
            BuiltinKind::ULongLong => "unsigned long long",
            BuiltinKind::Float => "float",
            BuiltinKind::Double => "double",
        }
    }

    /// Short descriptive name of the kind, as printed in type dumps.
    pub fn kind_name(self) -> &'static str {
        match self {
            BuiltinKind::Void => "Void",
            BuiltinKind::Bool => "Bool",
            BuiltinKind::Char => "Char_S",
            BuiltinKind::SChar => "SChar",
            BuiltinKind::UChar => "UChar",
            BuiltinKind::Short => "Short",
            BuiltinKind::UShort => "UShort",
            BuiltinKind::Int => "Int",
            BuiltinKind::UInt => "UInt",
            BuiltinKind::Long => "Long",
            BuiltinKind::ULong => "ULong",
            BuiltinKind::LongLong => "LongLong",
            BuiltinKind::ULongLong => "ULongLong",
            BuiltinKind::Float => "Float",
            BuiltinKind::Double => "Double",
        }
    }

    /// Whether this type may be the type of a non-type template parameter.
    pub fn is_integral(self) -> bool {
        !matches!(
            self,
            BuiltinKind::Void | BuiltinKind::Float | BuiltinKind::Double
        )
    }

    /// Whether the integral type is signed. `char` is signed on every
    /// supported target.
    pub fn is_signed(self) -> bool {
        matches!(
            self,
            BuiltinKind::Char
                | BuiltinKind::SChar
                | BuiltinKind::Short
                | BuiltinKind::Int
                | BuiltinKind::Long
                | BuiltinKind::LongLong
        )
    }

    /// Itanium C++ ABI mangling code.
    pub fn mangling(self) -> &'static str {
        match self {
            BuiltinKind::Void => "v",
            BuiltinKind::Bool => "b",
            BuiltinKind::Char => "c",
            BuiltinKind::SChar => "a",
            BuiltinKind::UChar => "h",
            BuiltinKind::Short => "s",
            BuiltinKind::UShort => "t",
            BuiltinKind::Int => "i",
            BuiltinKind::UInt => "j",
            BuiltinKind::Long => "l",
            BuiltinKind::ULong => "m",
            BuiltinKind::LongLong => "x",
            BuiltinKind::ULongLong => "y",
            BuiltinKind::Float => "f",
            BuiltinKind::Double => "d",
        }
    }
}

impl fmt::Display for BuiltinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
