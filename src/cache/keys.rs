//! Cache key definitions.

use std::fmt;

use crate::domain::types::Collection;

/// Which consumer a cached read belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryShape {
    /// Section readers on the public site.
    Public,
    /// Admin panel listings.
    Admin,
}

impl QueryShape {
    pub const ALL: [QueryShape; 2] = [QueryShape::Public, QueryShape::Admin];
}

/// One cached read result, scoped per collection and consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub collection: Collection,
    pub shape: QueryShape,
}

impl QueryKey {
    pub const fn new(collection: Collection, shape: QueryShape) -> Self {
        Self { collection, shape }
    }

    pub const fn public(collection: Collection) -> Self {
        Self::new(collection, QueryShape::Public)
    }

    pub const fn admin(collection: Collection) -> Self {
        Self::new(collection, QueryShape::Admin)
    }

    /// Every key that caches a read of `collection`.
    pub fn for_collection(collection: Collection) -> impl Iterator<Item = QueryKey> {
        QueryShape::ALL
            .into_iter()
            .map(move |shape| QueryKey::new(collection, shape))
    }

    pub fn name(&self) -> &'static str {
        match (self.shape, self.collection) {
            (QueryShape::Public, Collection::Portfolio) => "portfolio-items",
            (QueryShape::Public, Collection::Gallery) => "gallery-images",
            (QueryShape::Public, Collection::Experience) => "experience-entries",
            (QueryShape::Public, Collection::Messages) => "contact-messages",
            (QueryShape::Admin, Collection::Portfolio) => "admin-portfolio",
            (QueryShape::Admin, Collection::Gallery) => "admin-gallery",
            (QueryShape::Admin, Collection::Experience) => "admin-experience",
            (QueryShape::Admin, Collection::Messages) => "admin-messages",
        }
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_match_historic_keys() {
        assert_eq!(QueryKey::public(Collection::Gallery).name(), "gallery-images");
        assert_eq!(QueryKey::admin(Collection::Messages).name(), "admin-messages");
    }

    #[test]
    fn collection_fans_out_to_both_shapes() {
        let keys: Vec<_> = QueryKey::for_collection(Collection::Portfolio)
            .map(|key| key.name())
            .collect();
        assert_eq!(keys, ["portfolio-items", "admin-portfolio"]);
    }
}
