//! Parser for a record's HTML `text` fragment.
//!
//! Fragments use a fixed, generator-controlled vocabulary: entity-escaped
//! text, `<a>` cross-reference links, a `<span class="where fmt-newline">`
//! region for bounds, and `<br>` soft breaks. Anything outside that
//! vocabulary is an error; implementor listings are machine-written, so a
//! surprise tag means a corrupt or foreign fragment.

use thiserror::Error;
use traitdex_core::entity::{self, EntityError};
use traitdex_core::{ImplSignature, ItemKind, TypeLink};

/// Errors produced while parsing a signature fragment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FragmentError {
    /// A `<` without a matching `>`.
    #[error("unterminated tag at byte {0}")]
    UnterminatedTag(usize),
    /// A tag outside the generator's vocabulary.
    #[error("unknown tag '<{tag}>' at byte {position}")]
    UnknownTag {
        /// Byte offset of the `<`.
        position: usize,
        /// The tag name.
        tag: String,
    },
    /// A closing tag that does not match the innermost open tag.
    #[error("mismatched closing tag '</{tag}>' at byte {position}")]
    MismatchedClose {
        /// Byte offset of the `<`.
        position: usize,
        /// The closing tag name.
        tag: String,
    },
    /// An element left open at the end of the fragment.
    #[error("unclosed '<{0}>' element")]
    Unclosed(String),
    /// A malformed attribute list inside a tag.
    #[error("malformed attribute in '<{tag}>' at byte {position}")]
    MalformedAttr {
        /// Byte offset of the `<`.
        position: usize,
        /// The tag name.
        tag: String,
    },
    /// A link element missing a required attribute.
    #[error("link is missing '{0}' attribute")]
    MissingAttr(&'static str),
    /// A link whose `class` is not a known item kind.
    #[error("unknown item kind '{0}' in link class")]
    UnknownItemKind(String),
    /// An entity error in text content or attribute values.
    #[error(transparent)]
    Entity(#[from] EntityError),
    /// The fragment does not begin with an `impl` header.
    #[error("fragment does not start with an 'impl' header")]
    MalformedHeader,
    /// No link for the implementing type was found.
    #[error("no implementing-type link in fragment")]
    MissingSelfLink,
}

/// Parse a record's `text` fragment into a structured signature.
pub fn parse_fragment(fragment: &str) -> Result<ImplSignature, FragmentError> {
    let events = tokenize(fragment)?;
    build(events)
}

#[derive(Debug)]
enum Event {
    Text(String),
    OpenLink {
        kind: ItemKind,
        href: String,
        title: String,
    },
    CloseLink,
    OpenSpan {
        where_region: bool,
    },
    CloseSpan,
    Br,
}

fn tokenize(fragment: &str) -> Result<Vec<Event>, FragmentError> {
    let mut events = Vec::new();
    let mut stack: Vec<&'static str> = Vec::new();
    let mut rest = fragment;
    let mut offset = 0usize;

    while !rest.is_empty() {
        if let Some(lt) = rest.find('<') {
            if lt > 0 {
                events.push(Event::Text(entity::unescape(&rest[..lt])?));
            }
            let tag_start = offset + lt;
            let after_lt = &rest[lt + 1..];
            let gt = after_lt
                .find('>')
                .ok_or(FragmentError::UnterminatedTag(tag_start))?;
            let tag_body = &after_lt[..gt];
            parse_tag(tag_body, tag_start, &mut events, &mut stack)?;
            let consumed = lt + 1 + gt + 1;
            offset += consumed;
            rest = &rest[consumed..];
        } else {
            events.push(Event::Text(entity::unescape(rest)?));
            break;
        }
    }

    if let Some(open) = stack.pop() {
        return Err(FragmentError::Unclosed(open.to_string()));
    }
    Ok(events)
}

fn parse_tag(
    tag_body: &str,
    position: usize,
    events: &mut Vec<Event>,
    stack: &mut Vec<&'static str>,
) -> Result<(), FragmentError> {
    if let Some(name) = tag_body.strip_prefix('/') {
        let name = name.trim();
        let open = stack.pop();
        return match (name, open) {
            ("a", Some("a")) => {
                events.push(Event::CloseLink);
                Ok(())
            }
            ("span", Some("span")) => {
                events.push(Event::CloseSpan);
                Ok(())
            }
            _ => Err(FragmentError::MismatchedClose {
                position,
                tag: name.to_string(),
            }),
        };
    }

    let body = tag_body.trim_end_matches('/').trim();
    let (name, attr_text) = match body.split_once(char::is_whitespace) {
        Some((name, attrs)) => (name, attrs),
        None => (body, ""),
    };

    match name {
        "br" => {
            events.push(Event::Br);
            Ok(())
        }
        "a" => {
            let attrs = parse_attrs(attr_text, position, "a")?;
            let class = find_attr(&attrs, "class").ok_or(FragmentError::MissingAttr("class"))?;
            let kind = ItemKind::from_class(&class)
                .ok_or_else(|| FragmentError::UnknownItemKind(class.clone()))?;
            let href = find_attr(&attrs, "href").ok_or(FragmentError::MissingAttr("href"))?;
            let title = find_attr(&attrs, "title").ok_or(FragmentError::MissingAttr("title"))?;
            stack.push("a");
            events.push(Event::OpenLink { kind, href, title });
            Ok(())
        }
        "span" => {
            let attrs = parse_attrs(attr_text, position, "span")?;
            let where_region = find_attr(&attrs, "class")
                .is_some_and(|class| class.split_whitespace().any(|c| c == "where"));
            stack.push("span");
            events.push(Event::OpenSpan { where_region });
            Ok(())
        }
        other => Err(FragmentError::UnknownTag {
            position,
            tag: other.to_string(),
        }),
    }
}

fn parse_attrs(
    text: &str,
    position: usize,
    tag: &str,
) -> Result<Vec<(String, String)>, FragmentError> {
    let malformed = || FragmentError::MalformedAttr {
        position,
        tag: tag.to_string(),
    };
    let mut attrs = Vec::new();
    let mut rest = text.trim();
    while !rest.is_empty() {
        let eq = rest.find('=').ok_or_else(malformed)?;
        let name = rest[..eq].trim();
        let after_eq = rest[eq + 1..].trim_start();
        let mut chars = after_eq.char_indices();
        match chars.next() {
            Some((_, '"')) => {}
            _ => return Err(malformed()),
        }
        let close = after_eq[1..].find('"').ok_or_else(malformed)?;
        let raw_value = &after_eq[1..1 + close];
        attrs.push((name.to_string(), entity::unescape(raw_value)?));
        rest = after_eq[1 + close + 1..].trim_start();
    }
    Ok(attrs)
}

fn find_attr(attrs: &[(String, String)], name: &str) -> Option<String> {
    attrs
        .iter()
        .find(|(attr, _)| attr == name)
        .map(|(_, value)| value.clone())
}

fn build(events: Vec<Event>) -> Result<ImplSignature, FragmentError> {
    let mut header = String::new();
    let mut where_text = String::new();
    let mut in_where = false;
    let mut self_link: Option<TypeLink> = None;
    let mut pending_link: Option<(ItemKind, String, String, String)> = None;

    for event in events {
        match event {
            Event::Text(text) => {
                if let Some((_, _, _, name)) = pending_link.as_mut() {
                    name.push_str(&text);
                } else if in_where {
                    where_text.push_str(&text);
                } else {
                    header.push_str(&text);
                }
            }
            Event::Br => {
                if in_where {
                    where_text.push('\n');
                } else if pending_link.is_none() {
                    header.push('\n');
                }
            }
            Event::OpenLink { kind, href, title } => {
                pending_link = Some((kind, href, title, String::new()));
            }
            Event::CloseLink => {
                let (kind, href, title, name) =
                    pending_link.take().ok_or(FragmentError::MissingSelfLink)?;
                let link = TypeLink {
                    kind,
                    href,
                    title,
                    name,
                };
                if !in_where && self_link.is_none() && header.trim_end().ends_with("for") {
                    self_link = Some(link);
                } else if in_where {
                    where_text.push_str(&link.name);
                } else {
                    // A link on the trait side of the header; flatten it.
                    header.push_str(&link.name);
                }
            }
            Event::OpenSpan { where_region } => {
                if where_region {
                    in_where = true;
                }
            }
            Event::CloseSpan => {
                in_where = false;
            }
        }
    }

    let self_link = self_link.ok_or(FragmentError::MissingSelfLink)?;
    let (generics, trait_ref) = parse_header(&header)?;
    let where_clauses = where_text
        .lines()
        .map(str::trim)
        .map(|line| line.strip_suffix(',').unwrap_or(line).trim())
        .filter(|line| !line.is_empty() && *line != "where")
        .map(ToString::to_string)
        .collect();

    Ok(ImplSignature {
        generics,
        trait_ref,
        self_link,
        where_clauses,
    })
}

/// Split an unescaped header like `impl<DB> Group<DB> for ` into generic
/// parameters and the trait reference.
fn parse_header(header: &str) -> Result<(Vec<String>, String), FragmentError> {
    let header = header.trim();
    let rest = header.strip_prefix("impl").ok_or(FragmentError::MalformedHeader)?;

    let (generics, rest) = if let Some(inner) = rest.strip_prefix('<') {
        let close = matching_angle(inner).ok_or(FragmentError::MalformedHeader)?;
        (split_generics(&inner[..close]), &inner[close + 1..])
    } else {
        (Vec::new(), rest)
    };

    let rest = rest.trim();
    let trait_ref = rest
        .strip_suffix("for")
        .ok_or(FragmentError::MalformedHeader)?
        .trim();
    if trait_ref.is_empty() {
        return Err(FragmentError::MalformedHeader);
    }
    Ok((generics, trait_ref.to_string()))
}

/// Byte index of the `>` closing the angle bracket that `text` starts inside.
fn matching_angle(text: &str) -> Option<usize> {
    let mut depth = 1usize;
    for (i, c) in text.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Split generic parameters on top-level commas.
fn split_generics(text: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut current = String::new();
    for c in text.chars() {
        match c {
            '<' => {
                depth += 1;
                current.push(c);
            }
            '>' => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            ',' if depth == 0 => {
                let part = current.trim().to_string();
                if !part.is_empty() {
                    parts.push(part);
                }
                current.clear();
            }
            _ => current.push(c),
        }
    }
    let part = current.trim().to_string();
    if !part.is_empty() {
        parts.push(part);
    }
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "impl&lt;DB__&gt; Group&lt;DB__&gt; for \
        <a class=\"struct\" href=\"acme_db/struct.SourceStorage.html\" \
        title=\"struct acme_db::SourceStorage\">SourceStorage</a> \
        <span class=\"where fmt-newline\">where<br>&nbsp;&nbsp;&nbsp;&nbsp;DB__: \
        <a class=\"trait\" href=\"acme_db/trait.SourceDatabase.html\" \
        title=\"trait acme_db::SourceDatabase\">SourceDatabase</a>,<br>\
        &nbsp;&nbsp;&nbsp;&nbsp;DB__: HasGroup&lt;\
        <a class=\"struct\" href=\"acme_db/struct.SourceStorage.html\" \
        title=\"struct acme_db::SourceStorage\">SourceStorage</a>&gt;,<br>\
        &nbsp;&nbsp;&nbsp;&nbsp;DB__: Database,&nbsp;</span>";

    #[test]
    fn parse_full_signature() {
        let sig = parse_fragment(SAMPLE).unwrap();
        assert_eq!(sig.generics, vec!["DB__"]);
        assert_eq!(sig.trait_ref, "Group<DB__>");
        assert_eq!(sig.self_link.kind, ItemKind::Struct);
        assert_eq!(sig.self_link.name, "SourceStorage");
        assert_eq!(sig.self_link.qualified_path(), "acme_db::SourceStorage");
        assert_eq!(
            sig.where_clauses,
            vec![
                "DB__: SourceDatabase",
                "DB__: HasGroup<SourceStorage>",
                "DB__: Database",
            ]
        );
    }

    #[test]
    fn display_round_trip_to_plain_text() {
        let sig = parse_fragment(SAMPLE).unwrap();
        assert_eq!(
            sig.to_string(),
            "impl<DB__> Group<DB__> for SourceStorage where DB__: SourceDatabase, \
             DB__: HasGroup<SourceStorage>, DB__: Database"
        );
    }

    #[test]
    fn parse_minimal_signature() {
        let fragment = "impl Group for <a class=\"struct\" href=\"a/struct.S.html\" \
                        title=\"struct a::S\">S</a>";
        let sig = parse_fragment(fragment).unwrap();
        assert!(sig.generics.is_empty());
        assert_eq!(sig.trait_ref, "Group");
        assert!(sig.where_clauses.is_empty());
    }

    #[test]
    fn trait_side_link_is_flattened() {
        let fragment = "impl <a class=\"trait\" href=\"x/trait.T.html\" \
                        title=\"trait x::T\">T</a> for <a class=\"struct\" \
                        href=\"a/struct.S.html\" title=\"struct a::S\">S</a>";
        let sig = parse_fragment(fragment).unwrap();
        assert_eq!(sig.trait_ref, "T");
        assert_eq!(sig.self_link.name, "S");
    }

    #[test]
    fn missing_self_link_rejected() {
        assert_eq!(
            parse_fragment("impl Group for Nothing"),
            Err(FragmentError::MissingSelfLink)
        );
    }

    #[test]
    fn unknown_tag_rejected() {
        let err = parse_fragment("impl Group for <b>S</b>").unwrap_err();
        assert!(matches!(err, FragmentError::UnknownTag { tag, .. } if tag == "b"));
    }

    #[test]
    fn unbalanced_markup_rejected() {
        let fragment = "impl Group for <a class=\"struct\" href=\"a/struct.S.html\" \
                        title=\"struct a::S\">S";
        assert_eq!(
            parse_fragment(fragment),
            Err(FragmentError::Unclosed("a".to_string()))
        );
    }

    #[test]
    fn mismatched_close_rejected() {
        let fragment = "impl Group for <a class=\"struct\" href=\"h\" title=\"t\">S</span>";
        assert!(matches!(
            parse_fragment(fragment),
            Err(FragmentError::MismatchedClose { .. })
        ));
    }

    #[test]
    fn missing_link_attrs_rejected() {
        let fragment = "impl Group for <a class=\"struct\" title=\"t\">S</a>";
        assert_eq!(
            parse_fragment(fragment),
            Err(FragmentError::MissingAttr("href"))
        );
    }

    #[test]
    fn unknown_item_kind_rejected() {
        let fragment = "impl Group for <a class=\"macro\" href=\"h\" title=\"t\">S</a>";
        assert!(matches!(
            parse_fragment(fragment),
            Err(FragmentError::UnknownItemKind(kind)) if kind == "macro"
        ));
    }

    #[test]
    fn bad_entity_rejected() {
        let err = parse_fragment("impl Group &copy; for x").unwrap_err();
        assert!(matches!(err, FragmentError::Entity(_)));
    }

    #[test]
    fn header_without_impl_rejected() {
        let fragment = "fn Group for <a class=\"struct\" href=\"h\" title=\"t\">S</a>";
        assert_eq!(parse_fragment(fragment), Err(FragmentError::MalformedHeader));
    }

    #[test]
    fn multi_generic_header() {
        let fragment = "impl&lt;K, V: Ord&lt;K&gt;&gt; Map&lt;K, V&gt; for \
                        <a class=\"struct\" href=\"m/struct.Tree.html\" \
                        title=\"struct m::Tree\">Tree</a>";
        let sig = parse_fragment(fragment).unwrap();
        assert_eq!(sig.generics, vec!["K", "V: Ord<K>"]);
        assert_eq!(sig.trait_ref, "Map<K, V>");
    }
}
