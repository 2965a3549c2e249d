use crate::builder::{self, BuildOptions};
use crate::metadata::EntityMetadata;
use crate::selection::EntityNode;
use crate::source::{self, EntitySource, ExistingDto};

/// How many relations deep a picker looks by default.
pub const DEFAULT_DEPTH: usize = 3;

/// One interactive pass over an entity: the selection tree plus the
/// generation toggles that sit next to it.
#[derive(Debug, Clone)]
pub struct SelectorSession {
    root: EntityNode,
    generate_mapper: bool,
    add_data_contract: bool,
}

impl SelectorSession {
    pub fn create<S: EntitySource>(
        source: &S,
        entity: &S::Handle,
        dto_name: &str,
        existing: Option<&dyn ExistingDto>,
    ) -> Self {
        Self::create_with_depth(source, entity, dto_name, existing, DEFAULT_DEPTH)
    }

    pub fn create_with_depth<S: EntitySource>(
        source: &S,
        entity: &S::Handle,
        dto_name: &str,
        existing: Option<&dyn ExistingDto>,
        depth: usize,
    ) -> Self {
        let existing_paths = source::existing_dto_field_paths(existing);
        let options = BuildOptions {
            depth,
            auto_select: true,
            can_select_collections: true,
            can_reuse_base_mapper: true,
        };
        let mut root = builder::build(source, entity, options, existing_paths.as_deref());
        root.set_dto_name(dto_name);

        // An existing DTO that already derives from the base DTO keeps doing so.
        let derived = source::entity_has_base_dto(existing, root.base_entity_dto_name());
        let reuse = root.reuse_base_entity_mapper() || derived;
        root.set_reuse_base_entity_mapper(reuse);

        Self {
            root,
            generate_mapper: true,
            add_data_contract: existing.is_some_and(|dto| dto.has_data_contract()),
        }
    }

    pub fn root(&self) -> &EntityNode {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut EntityNode {
        &mut self.root
    }

    pub fn generate_mapper(&self) -> bool {
        self.generate_mapper
    }

    pub fn set_generate_mapper(&mut self, value: bool) {
        self.generate_mapper = value;
    }

    pub fn add_data_contract(&self) -> bool {
        self.add_data_contract
    }

    pub fn set_add_data_contract(&mut self, value: bool) {
        self.add_data_contract = value;
    }

    pub fn metadata(&self) -> EntityMetadata {
        self.root.to_metadata()
    }
}
