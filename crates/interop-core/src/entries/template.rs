//! Class template entries.
//!
//! A class template keeps its parameter list and the uninstantiated member
//! pattern. Instances are separate [`RecordEntry`](super::RecordEntry)s.

use std::fmt;

use crate::{BuiltinKind, MethodKind, PatternArg, PatternExpr, PatternType, QualifiedName, RecordTag, Span};

/// What a template parameter accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateParamKind {
    /// `class T` / `typename T`
    Type,
    /// `int N`, `bool B`, ...
    Integral(BuiltinKind),
}

impl fmt::Display for TemplateParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateParamKind::Type => f.write_str("type"),
            TemplateParamKind::Integral(kind) => write!(f, "{}", kind),
        }
    }
}

/// One template parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateParamEntry {
    /// Parameters may be unnamed (`template<class, int = 0>`).
    pub name: Option<String>,
    pub kind: TemplateParamKind,
    /// Default argument; may refer to earlier parameters.
    pub default: Option<PatternArg>,
    pub span: Span,
}

impl TemplateParamEntry {
    pub fn new(name: Option<String>, kind: TemplateParamKind, span: Span) -> Self {
        Self {
            name,
            kind,
            default: None,
            span,
        }
    }

    pub fn with_default(mut self, default: PatternArg) -> Self {
        self.default = Some(default);
        self
    }

    /// Name for diagnostics; unnamed parameters print their position.
    pub fn display_name(&self, index: usize) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("#{}", index),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPattern {
    pub name: String,
    pub ty: PatternType,
    pub is_static: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodPattern {
    pub name: String,
    pub kind: MethodKind,
    pub return_type: PatternType,
    pub params: Vec<PatternType>,
    pub is_const: bool,
    pub is_virtual: bool,
    pub is_static: bool,
    pub has_body: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticAssertPattern {
    pub condition: PatternExpr,
    pub message: Option<String>,
    pub span: Span,
}

/// The member list of a class template definition, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RecordPattern {
    pub fields: Vec<FieldPattern>,
    pub methods: Vec<MethodPattern>,
    pub static_asserts: Vec<StaticAssertPattern>,
}

/// A class template declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassTemplateEntry {
    pub name: QualifiedName,
    pub tag: RecordTag,
    pub params: Vec<TemplateParamEntry>,
    /// `None` while the template is only forward-declared.
    pub pattern: Option<RecordPattern>,
    pub span: Span,
}

impl ClassTemplateEntry {
    pub fn new(name: QualifiedName, tag: RecordTag, params: Vec<TemplateParamEntry>, span: Span) -> Self {
        Self {
            name,
            tag,
            params,
            pattern: None,
            span,
        }
    }

    /// Number of template parameters.
    #[inline]
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Number of leading parameters without a default.
    pub fn required_arity(&self) -> usize {
        self.params
            .iter()
            .position(|p| p.default.is_some())
            .unwrap_or(self.params.len())
    }

    #[inline]
    pub fn is_defined(&self) -> bool {
        self.pattern.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn foo() -> ClassTemplateEntry {
        ClassTemplateEntry::new(
            QualifiedName::global("Foo"),
            RecordTag::Struct,
            vec![
                TemplateParamEntry::new(Some("T".into()), TemplateParamKind::Type, Span::default()),
                TemplateParamEntry::new(
                    Some("num".into()),
                    TemplateParamKind::Integral(BuiltinKind::Int),
                    Span::default(),
                )
                .with_default(PatternArg::Value(PatternExpr::Int(4))),
            ],
            Span::default(),
        )
    }

    #[test]
    fn arity_counts_defaults() {
        let template = foo();
        assert_eq!(template.arity(), 2);
        assert_eq!(template.required_arity(), 1);
        assert!(!template.is_defined());
    }

    #[test]
    fn param_display() {
        let template = foo();
        assert_eq!(template.params[0].display_name(0), "T");
        let unnamed = TemplateParamEntry::new(None, TemplateParamKind::Type, Span::default());
        assert_eq!(unnamed.display_name(2), "#2");
        assert_eq!(template.params[1].kind.to_string(), "int");
        assert_eq!(TemplateParamKind::Type.to_string(), "type");
    }
}
