use crate::{Element, ElementId, Relationship, RelationshipKey, RelationshipType, Result};

/// Single-owner store of elements and relationships.
///
/// Enumeration order is insertion order; validation and autocomplete rely on
/// it for deterministic output. Callers serialize access, the store does no
/// locking of its own.
pub trait GraphStore {
    fn element(&self, id: &str) -> Option<&Element>;
    fn relationship(&self, id: &str) -> Option<&Relationship>;

    fn elements(&self) -> Box<dyn Iterator<Item = &Element> + '_>;
    fn relationships(&self) -> Box<dyn Iterator<Item = &Relationship> + '_>;

    fn element_count(&self) -> usize;
    fn relationship_count(&self) -> usize;

    fn outgoing(&self, id: &str) -> Vec<&Relationship>;
    fn incoming(&self, id: &str) -> Vec<&Relationship>;

    /// Finds the relationship holding a `(source, target, type)` triple, if any.
    fn find_by_key(&self, key: &RelationshipKey) -> Option<&Relationship>;

    fn add_element(&mut self, element: Element) -> Result<()>;
    fn add_relationship(&mut self, relationship: Relationship) -> Result<()>;

    fn remove_element(&mut self, id: &str) -> Option<Element>;
    fn remove_relationship(&mut self, id: &str) -> Option<Relationship>;

    /// Rewrites endpoints and type of an existing relationship, keeping its id.
    fn retarget_relationship(
        &mut self,
        id: &str,
        source: ElementId,
        target: ElementId,
        rel_type: RelationshipType,
    ) -> Result<()>;

    fn contains_element(&self, id: &str) -> bool {
        self.element(id).is_some()
    }
}
