//! Structured form of a record's HTML `text` fragment.
//!
//! The generator renders each implementation as a fragment like
//!
//! ```text
//! impl&lt;DB&gt; Group&lt;DB&gt; for <a class="struct" href="..." title="...">Storage</a>
//! <span class="where fmt-newline">where<br>&nbsp;...DB: <a class="trait" ...>Database</a>,</span>
//! ```
//!
//! The parser crate lowers that markup into [`ImplSignature`]; `Display`
//! renders it back as plain Rust-like text for CLI output.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Item kind carried in a link's `class` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    /// `class="struct"`
    Struct,
    /// `class="enum"`
    Enum,
    /// `class="trait"`
    Trait,
    /// `class="union"`
    Union,
    /// `class="type"` (type alias)
    Type,
    /// `class="primitive"`
    Primitive,
}

impl ItemKind {
    /// Parse the `class` attribute value.
    #[must_use]
    pub fn from_class(class: &str) -> Option<Self> {
        match class {
            "struct" => Some(Self::Struct),
            "enum" => Some(Self::Enum),
            "trait" => Some(Self::Trait),
            "union" => Some(Self::Union),
            "type" => Some(Self::Type),
            "primitive" => Some(Self::Primitive),
            _ => None,
        }
    }

    /// The `class` attribute value for this kind.
    #[must_use]
    pub const fn as_class(self) -> &'static str {
        match self {
            Self::Struct => "struct",
            Self::Enum => "enum",
            Self::Trait => "trait",
            Self::Union => "union",
            Self::Type => "type",
            Self::Primitive => "primitive",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_class())
    }
}

/// A cross-reference link inside a signature fragment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeLink {
    /// Item kind from the `class` attribute.
    pub kind: ItemKind,
    /// Relative page URL from the `href` attribute.
    pub href: String,
    /// `title` attribute, conventionally `"<kind> <full::path>"`.
    pub title: String,
    /// Link text, the item's display name.
    pub name: String,
}

impl TypeLink {
    /// The fully qualified path from the `title` attribute, with the
    /// leading kind word stripped when present.
    #[must_use]
    pub fn qualified_path(&self) -> &str {
        match self.title.split_once(' ') {
            Some((kind, path)) if ItemKind::from_class(kind).is_some() => path,
            _ => &self.title,
        }
    }
}

/// Structured `impl` signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImplSignature {
    /// Generic parameter names from the `impl<...>` header.
    pub generics: Vec<String>,
    /// The trait reference as plain text, e.g. `Group<DB>`.
    pub trait_ref: String,
    /// Link for the implementing type.
    pub self_link: TypeLink,
    /// Plain-text `where` clauses, one per `<br>`-separated line.
    pub where_clauses: Vec<String>,
}

impl fmt::Display for ImplSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "impl")?;
        if !self.generics.is_empty() {
            write!(f, "<{}>", self.generics.join(", "))?;
        }
        write!(f, " {} for {}", self.trait_ref, self.self_link.name)?;
        if !self.where_clauses.is_empty() {
            write!(f, " where {}", self.where_clauses.join(", "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(name: &str) -> TypeLink {
        TypeLink {
            kind: ItemKind::Struct,
            href: format!("acme_db/struct.{name}.html"),
            title: format!("struct acme_db::{name}"),
            name: name.to_string(),
        }
    }

    #[test]
    fn item_kind_round_trip() {
        for kind in [
            ItemKind::Struct,
            ItemKind::Enum,
            ItemKind::Trait,
            ItemKind::Union,
            ItemKind::Type,
            ItemKind::Primitive,
        ] {
            assert_eq!(ItemKind::from_class(kind.as_class()), Some(kind));
        }
        assert_eq!(ItemKind::from_class("macro"), None);
    }

    #[test]
    fn qualified_path_strips_kind_word() {
        assert_eq!(link("Storage").qualified_path(), "acme_db::Storage");
    }

    #[test]
    fn qualified_path_keeps_unrecognized_title() {
        let mut l = link("Storage");
        l.title = "acme_db::Storage".to_string();
        assert_eq!(l.qualified_path(), "acme_db::Storage");
    }

    #[test]
    fn display_full_signature() {
        let sig = ImplSignature {
            generics: vec!["DB".to_string()],
            trait_ref: "Group<DB>".to_string(),
            self_link: link("Storage"),
            where_clauses: vec!["DB: Database".to_string(), "DB: HasGroup<Storage>".to_string()],
        };
        assert_eq!(
            sig.to_string(),
            "impl<DB> Group<DB> for Storage where DB: Database, DB: HasGroup<Storage>"
        );
    }

    #[test]
    fn display_without_generics_or_where() {
        let sig = ImplSignature {
            generics: Vec::new(),
            trait_ref: "Group".to_string(),
            self_link: link("Storage"),
            where_clauses: Vec::new(),
        };
        assert_eq!(sig.to_string(), "impl Group for Storage");
    }
}
