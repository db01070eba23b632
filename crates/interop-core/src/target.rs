//! Target platform model: builtin sizes, alignments and IR target strings.

use std::fmt;

use crate::BuiltinKind;

/// Size and alignment of a complete type, in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Layout {
    pub size: u64,
    pub align: u64,
}

impl Layout {
    #[inline]
    pub const fn new(size: u64, align: u64) -> Self {
        Self { size, align }
    }
}

/// Round `offset` up to a multiple of `align` (which must be non-zero).
#[inline]
pub const fn align_to(offset: u64, align: u64) -> u64 {
    offset.div_ceil(align) * align
}

/// The platform model used for layout and IR emission.
///
/// The same model drives `sizeof`/`alignof` inside guest constant
/// expressions and record layout, so both always agree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetInfo {
    pub triple: &'static str,
    pub data_layout: &'static str,
    pub pointer_width: u64,
    pub long_width: u64,
    /// Alignment of `long long` and `unsigned long long`.
    pub long_long_align: u64,
    /// Alignment of `double`.
    pub double_align: u64,
    /// The builtin `size_t` names.
    pub size_type: BuiltinKind,
    /// The builtin `ptrdiff_t` names.
    pub ptrdiff_type: BuiltinKind,
}

impl Default for TargetInfo {
    fn default() -> Self {
        Self::x86_64_linux()
    }
}

impl TargetInfo {
    /// LP64 System V (x86-64 Linux).
    pub fn x86_64_linux() -> Self {
        Self {
            triple: "x86_64-unknown-linux-gnu",
            data_layout: "e-m:e-p270:32:32-p271:32:32-p272:64:64-i64:64-i128:128-f80:128-n8:16:32:64-S128",
            pointer_width: 8,
            long_width: 8,
            long_long_align: 8,
            double_align: 8,
            size_type: BuiltinKind::ULong,
            ptrdiff_type: BuiltinKind::Long,
        }
    }

    /// ILP32 System V (i386 Linux): 4-byte `long`, pointers, and
    /// 4-byte alignment for `long long` and `double`.
    pub fn i686_linux() -> Self {
        Self {
            triple: "i686-unknown-linux-gnu",
            data_layout: "e-m:e-p:32:32-p270:32:32-p271:32:32-p272:64:64-i128:128-f64:32:64-f80:32-n8:16:32-S128",
            pointer_width: 4,
            long_width: 4,
            long_long_align: 4,
            double_align: 4,
            size_type: BuiltinKind::UInt,
            ptrdiff_type: BuiltinKind::Int,
        }
    }

    /// Layout of a builtin. `void` has none.
    pub fn builtin_layout(&self, kind: BuiltinKind) -> Option<Layout> {
        let layout = match kind {
            BuiltinKind::Void => return None,
            BuiltinKind::Bool | BuiltinKind::Char | BuiltinKind::SChar | BuiltinKind::UChar => {
                Layout::new(1, 1)
            }
            BuiltinKind::Short | BuiltinKind::UShort => Layout::new(2, 2),
            BuiltinKind::Int | BuiltinKind::UInt | BuiltinKind::Float => Layout::new(4, 4),
            BuiltinKind::Long | BuiltinKind::ULong => {
                Layout::new(self.long_width, self.long_width)
            }
            BuiltinKind::LongLong | BuiltinKind::ULongLong => {
                Layout::new(8, self.long_long_align)
            }
            BuiltinKind::Double => Layout::new(8, self.double_align),
        };
        Some(layout)
    }

    /// Layout of any pointer or reference.
    pub fn pointer_layout(&self) -> Layout {
        Layout::new(self.pointer_width, self.pointer_width)
    }

    /// Builtin typedef names provided by the target (`size_t`, `int32_t`, ...).
    pub fn builtin_typedef(&self, name: &str) -> Option<BuiltinKind> {
        let kind = match name {
            "size_t" | "uintptr_t" => self.size_type,
            "ptrdiff_t" | "intptr_t" | "ssize_t" => self.ptrdiff_type,
            "int8_t" => BuiltinKind::SChar,
            "uint8_t" => BuiltinKind::UChar,
            "int16_t" => BuiltinKind::Short,
            "uint16_t" => BuiltinKind::UShort,
            "int32_t" => BuiltinKind::Int,
            "uint32_t" => BuiltinKind::UInt,
            "int64_t" if self.long_width == 8 => BuiltinKind::Long,
            "int64_t" => BuiltinKind::LongLong,
            "uint64_t" if self.long_width == 8 => BuiltinKind::ULong,
            "uint64_t" => BuiltinKind::ULongLong,
            _ => return None,
        };
        Some(kind)
    }

    /// Inclusive value range of an integral builtin.
    pub fn integer_range(&self, kind: BuiltinKind) -> Option<(i128, i128)> {
        if !kind.is_integral() {
            return None;
        }
        if kind == BuiltinKind::Bool {
            return Some((0, 1));
        }
        let bits = self.builtin_layout(kind)?.size * 8;
        if kind.is_signed() {
            Some((-(1i128 << (bits - 1)), (1i128 << (bits - 1)) - 1))
        } else {
            Some((0, (1i128 << bits) - 1))
        }
    }
}

impl fmt::Display for TargetInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.triple)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn x86_64_sizes() {
        let target = TargetInfo::x86_64_linux();
        assert_eq!(target.builtin_layout(BuiltinKind::Int), Some(Layout::new(4, 4)));
        assert_eq!(target.builtin_layout(BuiltinKind::Long), Some(Layout::new(8, 8)));
        assert_eq!(target.builtin_layout(BuiltinKind::Double), Some(Layout::new(8, 8)));
        assert_eq!(target.builtin_layout(BuiltinKind::Void), None);
        assert_eq!(target.pointer_layout(), Layout::new(8, 8));
    }

    #[test]
    fn i686_sizes() {
        let target = TargetInfo::i686_linux();
        assert_eq!(target.builtin_layout(BuiltinKind::Long), Some(Layout::new(4, 4)));
        assert_eq!(
            target.builtin_layout(BuiltinKind::LongLong),
            Some(Layout::new(8, 4))
        );
        assert_eq!(target.builtin_layout(BuiltinKind::Double), Some(Layout::new(8, 4)));
        assert_eq!(target.pointer_layout(), Layout::new(4, 4));
        assert_eq!(target.builtin_typedef("size_t"), Some(BuiltinKind::UInt));
        assert_eq!(target.builtin_typedef("int64_t"), Some(BuiltinKind::LongLong));
    }

    #[test]
    fn integer_ranges() {
        let target = TargetInfo::default();
        assert_eq!(target.integer_range(BuiltinKind::Bool), Some((0, 1)));
        assert_eq!(target.integer_range(BuiltinKind::Char), Some((-128, 127)));
        assert_eq!(target.integer_range(BuiltinKind::UChar), Some((0, 255)));
        assert_eq!(
            target.integer_range(BuiltinKind::Int),
            Some((i32::MIN as i128, i32::MAX as i128))
        );
        assert_eq!(
            target.integer_range(BuiltinKind::ULong),
            Some((0, u64::MAX as i128))
        );
        assert_eq!(target.integer_range(BuiltinKind::Float), None);
    }

    #[test]
    fn align_to_rounds_up() {
        assert_eq!(align_to(0, 4), 0);
        assert_eq!(align_to(1, 4), 4);
        assert_eq!(align_to(8, 8), 8);
        assert_eq!(align_to(9, 8), 16);
    }
}
