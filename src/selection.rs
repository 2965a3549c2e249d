use crate::metadata::{EntityMetadata, PropertyMetadata};

/// How a property should be presented; derived from its flags, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeTone {
    Disabled,
    Inherited,
    Normal,
}

/// Selectable view of one entity. Owns its properties, which in turn own the
/// related entities they point at, so the whole structure is a plain tree.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityNode {
    original_metadata: EntityMetadata,
    entity_name: String,
    dto_name: String,
    can_reuse_base_mapper: bool,
    reuse_base_entity_mapper: bool,
    base_entity_dto_name: Option<String>,
    properties: Vec<PropertyNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyNode {
    name: String,
    type_name: String,
    is_inherited: bool,
    is_selected: bool,
    is_visible: bool,
    can_select: bool,
    related_entity: Option<EntityNode>,
}

impl EntityNode {
    pub(crate) fn new(original_metadata: EntityMetadata, properties: Vec<PropertyNode>) -> Self {
        Self {
            entity_name: original_metadata.name.clone(),
            dto_name: original_metadata.dto_name.clone(),
            original_metadata,
            can_reuse_base_mapper: false,
            reuse_base_entity_mapper: false,
            base_entity_dto_name: None,
            properties,
        }
    }

    /// Enables base-mapper reuse; applied once by the builder before the node is handed out.
    pub(crate) fn allow_base_mapper_reuse(&mut self, base_dto_name: String, reuse: bool) {
        self.can_reuse_base_mapper = true;
        self.base_entity_dto_name = Some(base_dto_name);
        self.set_reuse_base_entity_mapper(reuse);
    }

    pub fn original_metadata(&self) -> &EntityMetadata {
        &self.original_metadata
    }

    pub fn entity_name(&self) -> &str {
        &self.entity_name
    }

    pub fn dto_name(&self) -> &str {
        &self.dto_name
    }

    pub fn set_dto_name(&mut self, dto_name: impl Into<String>) {
        self.dto_name = dto_name.into();
    }

    pub fn can_reuse_base_mapper(&self) -> bool {
        self.can_reuse_base_mapper
    }

    pub fn reuse_base_entity_mapper(&self) -> bool {
        self.reuse_base_entity_mapper
    }

    pub fn base_entity_dto_name(&self) -> Option<&str> {
        self.base_entity_dto_name.as_deref()
    }

    pub fn properties(&self) -> &[PropertyNode] {
        &self.properties
    }

    pub fn properties_mut(&mut self) -> &mut [PropertyNode] {
        &mut self.properties
    }

    /// Hides inherited properties while the base DTO's mapper is reused and
    /// shows them again when it is not.
    pub fn set_reuse_base_entity_mapper(&mut self, value: bool) {
        if value == self.reuse_base_entity_mapper {
            return;
        }
        self.reuse_base_entity_mapper = value;
        for property in self.properties.iter_mut().filter(|p| p.is_inherited) {
            property.set_visible(!value);
        }
    }

    /// Looks a property up by dotted path, descending through related entities.
    pub fn property(&self, path: &str) -> Option<&PropertyNode> {
        let (head, rest) = split_path(path);
        let property = self.properties.iter().find(|p| p.name == head)?;
        match rest {
            Some(rest) => property.related_entity.as_ref()?.property(rest),
            None => Some(property),
        }
    }

    pub fn property_mut(&mut self, path: &str) -> Option<&mut PropertyNode> {
        let (head, rest) = split_path(path);
        let property = self.properties.iter_mut().find(|p| p.name == head)?;
        match rest {
            Some(rest) => property.related_entity.as_mut()?.property_mut(rest),
            None => Some(property),
        }
    }

    pub fn has_selection_in_subtree(&self) -> bool {
        self.properties.iter().any(|p| p.is_selected)
            || self
                .properties
                .iter()
                .filter_map(|p| p.related_entity.as_ref())
                .any(EntityNode::has_selection_in_subtree)
    }

    /// Projects the current selection back onto a copy of the captured
    /// metadata, dropping every property that is neither selected nor leads
    /// to a selection further down.
    pub fn to_metadata(&self) -> EntityMetadata {
        let mut result = self.original_metadata.clone();
        result.dto_name = self.dto_name.clone();
        result.base_class_dto_name = if self.reuse_base_entity_mapper {
            self.base_entity_dto_name.clone()
        } else {
            None
        };

        // The builder creates exactly one node per original property, in order.
        result.properties = result
            .properties
            .into_iter()
            .zip(&self.properties)
            .filter_map(|(meta, node)| node.project(meta))
            .collect();

        result
    }
}

impl PropertyNode {
    pub(crate) fn new(meta: &PropertyMetadata, can_select: bool, is_selected: bool) -> Self {
        Self {
            name: meta.name.clone(),
            type_name: meta.type_name.clone(),
            is_inherited: meta.is_inherited,
            is_selected,
            is_visible: true,
            can_select,
            related_entity: None,
        }
    }

    pub(crate) fn with_related_entity(mut self, related: EntityNode) -> Self {
        self.related_entity = Some(related);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// `Name (Type)`, as shown in a picker.
    pub fn display_name(&self) -> String {
        format!("{} ({})", self.name, self.type_name)
    }

    pub fn is_inherited(&self) -> bool {
        self.is_inherited
    }

    pub fn is_selected(&self) -> bool {
        self.is_selected
    }

    pub fn is_visible(&self) -> bool {
        self.is_visible
    }

    pub fn can_select(&self) -> bool {
        self.can_select
    }

    pub fn is_enabled(&self) -> bool {
        self.can_select && self.is_visible
    }

    pub fn tone(&self) -> NodeTone {
        if !self.can_select {
            NodeTone::Disabled
        } else if self.is_inherited {
            NodeTone::Inherited
        } else {
            NodeTone::Normal
        }
    }

    pub fn related_entity(&self) -> Option<&EntityNode> {
        self.related_entity.as_ref()
    }

    pub fn related_entity_mut(&mut self) -> Option<&mut EntityNode> {
        self.related_entity.as_mut()
    }

    pub fn set_visible(&mut self, value: bool) {
        if value == self.is_visible {
            return;
        }
        self.is_visible = value;
        if !value {
            self.set_selected(false);
        }
    }

    /// A hidden property stays deselected. Otherwise the value is pushed down
    /// to every property of the related entity, which repeats the same rule
    /// for its own children.
    pub fn set_selected(&mut self, value: bool) {
        if value == self.is_selected || (value && !self.is_visible) {
            return;
        }
        self.is_selected = value;
        if let Some(related) = self.related_entity.as_mut() {
            for property in &mut related.properties {
                property.set_selected(value);
            }
        }
    }

    fn project(&self, mut meta: PropertyMetadata) -> Option<PropertyMetadata> {
        let related = self
            .related_entity
            .as_ref()
            .filter(|r| r.has_selection_in_subtree());
        if !self.is_selected && related.is_none() {
            return None;
        }
        if meta.is_single_relation() {
            meta.relation_metadata = related.map(|r| Box::new(r.to_metadata()));
        }
        Some(meta)
    }
}

fn split_path(path: &str) -> (&str, Option<&str>) {
    match path.split_once('.') {
        Some((head, rest)) => (head, Some(rest)),
        None => (path, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{EntityMetadata, PropertyMetadata};
    use pretty_assertions::assert_eq;

    fn address() -> EntityNode {
        let meta = EntityMetadata::new("Address")
            .with_property(PropertyMetadata::simple("City", "string"))
            .with_property(PropertyMetadata::simple("Street", "string"));
        let props = meta
            .properties
            .iter()
            .map(|p| PropertyNode::new(p, true, false))
            .collect();
        EntityNode::new(meta, props)
    }

    fn person() -> EntityNode {
        let meta = EntityMetadata::new("Person")
            .with_base_dto("EntityBaseDTO")
            .with_property(PropertyMetadata::simple("Id", "int").inherited())
            .with_property(PropertyMetadata::simple("Name", "string"))
            .with_property(PropertyMetadata::relation("Address", "Address", "Address"));
        let props = vec![
            PropertyNode::new(&meta.properties[0], true, true),
            PropertyNode::new(&meta.properties[1], true, false),
            PropertyNode::new(&meta.properties[2], true, false).with_related_entity(address()),
        ];
        EntityNode::new(meta, props)
    }

    #[test]
    fn hiding_deselects() {
        let mut node = person();
        let id = node.property_mut("Id").unwrap();
        assert!(id.is_selected());
        id.set_visible(false);
        assert!(!id.is_selected());
        assert!(!id.is_enabled());
    }

    #[test]
    fn hidden_property_cannot_be_selected() {
        let mut node = person();
        let id = node.property_mut("Id").unwrap();
        id.set_visible(false);
        id.set_selected(true);
        assert!(!id.is_selected());
    }

    #[test]
    fn select_cascades_into_related_entity() {
        let mut node = person();
        node.property_mut("Address").unwrap().set_selected(true);
        assert!(node.property("Address.City").unwrap().is_selected());
        assert!(node.property("Address.Street").unwrap().is_selected());

        node.property_mut("Address").unwrap().set_selected(false);
        assert!(!node.property("Address.City").unwrap().is_selected());
    }

    #[test]
    fn reuse_base_mapper_hides_inherited_only() {
        let mut node = person();
        node.allow_base_mapper_reuse("EntityBaseDTO".into(), false);
        node.set_reuse_base_entity_mapper(true);
        assert!(!node.property("Id").unwrap().is_visible());
        assert!(!node.property("Id").unwrap().is_selected());
        assert!(node.property("Name").unwrap().is_visible());

        node.set_reuse_base_entity_mapper(false);
        let id = node.property("Id").unwrap();
        assert!(id.is_visible());
        assert!(!id.is_selected(), "selection is not restored");
    }

    #[test]
    fn property_path_lookup() {
        let node = person();
        assert_eq!(node.property("Address.City").unwrap().name(), "City");
        assert!(node.property("Name.City").is_none());
        assert!(node.property("Missing").is_none());
    }

    #[test]
    fn tone_and_display_name() {
        let node = person();
        let id = node.property("Id").unwrap();
        assert_eq!(id.tone(), NodeTone::Inherited);
        assert_eq!(id.display_name(), "Id (int)");
        assert_eq!(node.property("Name").unwrap().tone(), NodeTone::Normal);
    }

    #[test]
    fn to_metadata_keeps_relation_with_selected_leaf() {
        let mut node = person();
        node.property_mut("Address.City").unwrap().set_selected(true);
        let meta = node.to_metadata();
        assert_eq!(meta.property_names(), vec!["Id", "Address"]);
        let nested = meta.property("Address").unwrap().relation_metadata.as_ref().unwrap();
        assert_eq!(nested.property_names(), vec!["City"]);
        assert_eq!(meta.base_class_dto_name, None);
    }

    #[test]
    fn to_metadata_does_not_touch_original() {
        let mut node = person();
        node.set_dto_name("PersonSummaryDTO");
        let before = node.original_metadata().clone();
        let meta = node.to_metadata();
        assert_eq!(meta.dto_name, "PersonSummaryDTO");
        assert_eq!(node.original_metadata(), &before);
        assert_eq!(node.to_metadata(), meta);
    }
}
