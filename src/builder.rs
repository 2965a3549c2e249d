use tracing::{debug, trace};

use crate::metadata::EntityMetadata;
use crate::selection::{EntityNode, PropertyNode};
use crate::source::EntitySource;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildOptions {
    /// Remaining number of relations that may still be followed.
    pub depth: usize,
    /// Pre-select simple properties when there is no prior selection.
    pub auto_select: bool,
    pub can_select_collections: bool,
    pub can_reuse_base_mapper: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            depth: 3,
            auto_select: true,
            can_select_collections: true,
            can_reuse_base_mapper: false,
        }
    }
}

impl BuildOptions {
    fn for_relation(self) -> Self {
        Self {
            depth: self.depth.saturating_sub(1),
            auto_select: false,
            can_select_collections: false,
            can_reuse_base_mapper: false,
        }
    }
}

/// Parses `entity` (inherited properties included) and builds its selection tree.
pub fn build<S: EntitySource>(
    source: &S,
    entity: &S::Handle,
    options: BuildOptions,
    existing_paths: Option<&[String]>,
) -> EntityNode {
    let metadata = source.parse_entity(entity, true);
    build_from_metadata(source, entity, metadata, options, existing_paths)
}

/// Builds a selection tree for already parsed metadata. Related entities are
/// resolved one at a time, depth first, through `source`.
pub fn build_from_metadata<S: EntitySource>(
    source: &S,
    entity: &S::Handle,
    mut metadata: EntityMetadata,
    options: BuildOptions,
    existing_paths: Option<&[String]>,
) -> EntityNode {
    let mut properties = Vec::with_capacity(metadata.properties.len());

    for index in 0..metadata.properties.len() {
        let prop = &metadata.properties[index];
        let can_select = !prop.is_collection || options.can_select_collections;
        let is_selected = match existing_paths {
            Some(paths) => can_select && paths.iter().any(|p| *p == prop.name),
            None => options.auto_select && prop.is_simple_property,
        };
        let mut node = PropertyNode::new(prop, can_select, is_selected);

        if prop.is_single_relation() {
            if options.depth == 0 {
                trace!(entity = %metadata.name, property = %prop.name, "relation depth exhausted");
            } else {
                let related_name = prop.related_entity_name.as_deref().unwrap_or(prop.type_name.as_str());
                match source.resolve_related_entity(entity, related_name) {
                    Some(related) => {
                        debug!(entity = %metadata.name, property = %prop.name, related = related_name, "following relation");
                        let child_paths = existing_paths
                            .map(|paths| derive_child_paths(paths, &prop.name, &metadata));
                        let child = build(
                            source,
                            &related,
                            options.for_relation(),
                            child_paths.as_deref(),
                        );
                        node = node.with_related_entity(child);
                    }
                    None => {
                        debug!(entity = %metadata.name, property = %prop.name, related = related_name, "related entity not found, treating as plain field");
                        metadata.properties[index].demote();
                    }
                }
            }
        }

        properties.push(node);
    }

    let base_dto_name = metadata
        .base_class_dto_name
        .clone()
        .filter(|name| !name.trim().is_empty());

    let mut node = EntityNode::new(metadata, properties);
    if let Some(base_dto_name) = base_dto_name.filter(|_| options.can_reuse_base_mapper) {
        node.allow_base_mapper_reuse(base_dto_name, existing_paths.is_none());
    }
    node
}

/// Selects the saved paths that belong below `property`: those that start
/// with its name but are not themselves properties of `metadata`, with the
/// name (and a following `.`, if any) stripped.
pub fn derive_child_paths(paths: &[String], property: &str, metadata: &EntityMetadata) -> Vec<String> {
    paths
        .iter()
        .filter(|path| !metadata.has_property(path))
        .filter_map(|path| path.strip_prefix(property))
        .map(|rest| rest.strip_prefix('.').unwrap_or(rest))
        .filter(|rest| !rest.is_empty())
        .map(str::to_string)
        .collect()
}
