/// Type tag of a [`Variant`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum VariantKind {
    Long,
    Bool,
    String,
    Float,
}

/// A typed value passed through the indexed option protocol.
#[derive(Debug, Clone, PartialEq)]
pub enum Variant {
    Long(i64),
    Bool(bool),
    String(String),
    Float(f32),
}

impl Variant {
    pub fn kind(&self) -> VariantKind {
        match self {
            Self::Long(_) => VariantKind::Long,
            Self::Bool(_) => VariantKind::Bool,
            Self::String(_) => VariantKind::String,
            Self::Float(_) => VariantKind::Float,
        }
    }

    pub fn as_long(&self) -> Option<i64> {
        match *self {
            Self::Long(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Self::Bool(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }
}

/// Describes one entry of an indexed option table.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct OptionDescription {
    pub id: usize,
    pub name: &'static str,
    pub description: &'static str,
    pub kind: VariantKind,
}
