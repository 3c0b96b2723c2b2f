//! Cross-reference queries over implementor listings.
//!
//! [`ImplIndex`] inverts a set of listings into two views: trait to
//! implementors, and type to implemented traits. Lookups and searches
//! return results in sorted order so output is deterministic.
//!
//! # Example
//!
//! ```
//! use traitdex_core::{Implementor, ImplementorMap, TraitListing, TypePath};
//! use traitdex_query::ImplIndex;
//!
//! let mut map = ImplementorMap::new();
//! map.push(
//!     "acme_db",
//!     Implementor::new("impl Group for Storage", false, vec![TypePath::new("acme_db::Storage")]),
//! );
//! let listing = TraitListing::new(TypePath::new("acme::Group"), map);
//!
//! let index = ImplIndex::build(&[listing]);
//! assert_eq!(index.implementors_of(&TypePath::new("acme::Group")).len(), 1);
//! assert_eq!(index.traits_for(&TypePath::new("acme_db::Storage")).len(), 1);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod index;
mod search;

pub use index::{ImplIndex, IndexedImpl};
pub use search::{QueryError, SearchFilter, SearchHit};
