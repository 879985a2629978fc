use archgraph_core::{
    ArchGraphError, Element, ElementId, ElementType, GraphStore, Relationship, RelationshipId,
    RelationshipKey, RelationshipType, Result,
};
use indexmap::IndexMap;
use std::collections::HashMap;
use std::hash::Hash;
use tracing::debug;

/// In-memory architecture graph with insertion-ordered storage and
/// adjacency indexes by source, target and `(source, target, type)` key.
#[derive(Debug, Default, Clone)]
pub struct ArchGraph {
    elements: IndexMap<ElementId, Element>,
    relationships: IndexMap<RelationshipId, Relationship>,
    // Indexes
    by_source: HashMap<ElementId, Vec<RelationshipId>>,
    by_target: HashMap<ElementId, Vec<RelationshipId>>,
    by_key: HashMap<RelationshipKey, Vec<RelationshipId>>,
}

impl ArchGraph {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert_index<K: Eq + Hash>(map: &mut HashMap<K, Vec<RelationshipId>>, key: K, id: &str) {
        map.entry(key).or_default().push(id.to_string());
    }

    fn remove_index<K: Eq + Hash>(map: &mut HashMap<K, Vec<RelationshipId>>, key: &K, id: &str) {
        if let Some(ids) = map.get_mut(key) {
            if let Some(pos) = ids.iter().position(|r| r == id) {
                ids.remove(pos);
            }
            if ids.is_empty() {
                map.remove(key);
            }
        }
    }

    fn index_relationship(&mut self, rel: &Relationship) {
        Self::insert_index(&mut self.by_source, rel.source.clone(), &rel.id);
        Self::insert_index(&mut self.by_target, rel.target.clone(), &rel.id);
        Self::insert_index(&mut self.by_key, rel.key(), &rel.id);
    }

    fn unindex_relationship(&mut self, rel: &Relationship) {
        Self::remove_index(&mut self.by_source, &rel.source, &rel.id);
        Self::remove_index(&mut self.by_target, &rel.target, &rel.id);
        Self::remove_index(&mut self.by_key, &rel.key(), &rel.id);
    }

    /// Resolves indexed ids, ordered by relationship insertion position.
    fn resolve(&self, ids: Option<&Vec<RelationshipId>>) -> Vec<&Relationship> {
        let mut found: Vec<(usize, &Relationship)> = ids
            .into_iter()
            .flatten()
            .filter_map(|id| self.relationships.get_full(id))
            .map(|(pos, _, rel)| (pos, rel))
            .collect();
        found.sort_by_key(|(pos, _)| *pos);
        found.into_iter().map(|(_, rel)| rel).collect()
    }

    /// Removes an element together with every relationship attached to it.
    pub fn remove_element_cascade(&mut self, id: &str) -> Option<(Element, Vec<Relationship>)> {
        let element = self.elements.shift_remove(id)?;
        let attached: Vec<RelationshipId> = self
            .outgoing(id)
            .into_iter()
            .chain(self.incoming(id))
            .map(|r| r.id.clone())
            .collect();
        let mut removed = Vec::with_capacity(attached.len());
        for rel_id in attached {
            if let Some(rel) = self.remove_relationship(&rel_id) {
                removed.push(rel);
            }
        }
        debug!(
            "Removed element {} with {} attached relationships",
            element.id,
            removed.len()
        );
        Some((element, removed))
    }

    pub fn update_element_documentation(
        &mut self,
        id: &str,
        documentation: Option<String>,
    ) -> Result<()> {
        let element = self
            .elements
            .get_mut(id)
            .ok_or_else(|| ArchGraphError::ElementNotFound(id.to_string()))?;
        element.documentation = documentation;
        Ok(())
    }

    pub fn set_element_attribute<K: Into<String>, V: Into<String>>(
        &mut self,
        id: &str,
        key: K,
        value: V,
    ) -> Result<()> {
        let element = self
            .elements
            .get_mut(id)
            .ok_or_else(|| ArchGraphError::ElementNotFound(id.to_string()))?;
        element.attributes.insert(key.into(), value.into());
        Ok(())
    }

    pub fn find_element_by_name(&self, element_type: ElementType, name: &str) -> Option<&Element> {
        self.elements
            .values()
            .find(|e| e.element_type == element_type && e.name == name)
    }

    /// Relationships joining `a` and `b` in either direction.
    pub fn relationships_between(&self, a: &str, b: &str) -> Vec<&Relationship> {
        self.outgoing(a)
            .into_iter()
            .chain(self.incoming(a))
            .filter(|r| r.connects(a, b))
            .collect()
    }

    /// Human-readable form naming both endpoints, e.g.
    /// `Sales (BusinessActor) --Serving--> Billing (BusinessProcess)`.
    pub fn describe_relationship(&self, rel: &Relationship) -> String {
        describe(self, rel)
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty() && self.relationships.is_empty()
    }
}

impl GraphStore for ArchGraph {
    fn element(&self, id: &str) -> Option<&Element> {
        self.elements.get(id)
    }

    fn relationship(&self, id: &str) -> Option<&Relationship> {
        self.relationships.get(id)
    }

    fn elements(&self) -> Box<dyn Iterator<Item = &Element> + '_> {
        Box::new(self.elements.values())
    }

    fn relationships(&self) -> Box<dyn Iterator<Item = &Relationship> + '_> {
        Box::new(self.relationships.values())
    }

    fn element_count(&self) -> usize {
        self.elements.len()
    }

    fn relationship_count(&self) -> usize {
        self.relationships.len()
    }

    fn outgoing(&self, id: &str) -> Vec<&Relationship> {
        self.resolve(self.by_source.get(id))
    }

    fn incoming(&self, id: &str) -> Vec<&Relationship> {
        self.resolve(self.by_target.get(id))
    }

    fn find_by_key(&self, key: &RelationshipKey) -> Option<&Relationship> {
        self.resolve(self.by_key.get(key)).into_iter().next()
    }

    fn add_element(&mut self, element: Element) -> Result<()> {
        element.validate()?;
        if self.elements.contains_key(&element.id) {
            return Err(ArchGraphError::DuplicateElement(element.id));
        }
        self.elements.insert(element.id.clone(), element);
        Ok(())
    }

    fn add_relationship(&mut self, relationship: Relationship) -> Result<()> {
        if relationship.id.trim().is_empty() {
            return Err(ArchGraphError::InvalidOperation(format!(
                "relationship {} -> {} has an empty id",
                relationship.source, relationship.target
            )));
        }
        if self.relationships.contains_key(&relationship.id) {
            return Err(ArchGraphError::InvalidOperation(format!(
                "relationship id {} already exists",
                relationship.id
            )));
        }
        self.index_relationship(&relationship);
        self.relationships
            .insert(relationship.id.clone(), relationship);
        Ok(())
    }

    fn remove_element(&mut self, id: &str) -> Option<Element> {
        self.elements.shift_remove(id)
    }

    fn remove_relationship(&mut self, id: &str) -> Option<Relationship> {
        let rel = self.relationships.shift_remove(id)?;
        self.unindex_relationship(&rel);
        Some(rel)
    }

    fn retarget_relationship(
        &mut self,
        id: &str,
        source: ElementId,
        target: ElementId,
        rel_type: RelationshipType,
    ) -> Result<()> {
        let current = self
            .relationships
            .get(id)
            .cloned()
            .ok_or_else(|| ArchGraphError::RelationshipNotFound(id.to_string()))?;

        let key = RelationshipKey {
            source,
            target,
            rel_type,
        };
        if let Some(holder) = self.find_by_key(&key) {
            if holder.id != id {
                return Err(ArchGraphError::DuplicateRelationship(format!(
                    "{} already holds {} -> {} ({})",
                    holder.id, key.source, key.target, key.rel_type
                )));
            }
        }

        self.unindex_relationship(&current);
        let updated = Relationship {
            source: key.source,
            target: key.target,
            rel_type: key.rel_type,
            ..current
        };
        self.index_relationship(&updated);
        self.relationships.insert(updated.id.clone(), updated);
        Ok(())
    }
}

/// Renders a relationship with endpoint names and types, marking missing ends.
pub fn describe<G: GraphStore + ?Sized>(graph: &G, rel: &Relationship) -> String {
    let end = |id: &str| match graph.element(id) {
        Some(e) => format!("{} ({})", e.name, e.element_type),
        None => format!("<missing {}>", id),
    };
    format!("{} --{}--> {}", end(&rel.source), rel.rel_type, end(&rel.target))
}
