use crate::metadata::EntityMetadata;

/// Where entity descriptions come from. `Handle` identifies one entity
/// definition (a document, a schema entry, ...).
pub trait EntitySource {
    type Handle;

    /// Finds the entity a relation points at, or `None` when it is defined
    /// outside what this source can see.
    fn resolve_related_entity(
        &self,
        current: &Self::Handle,
        related_entity_name: &str,
    ) -> Option<Self::Handle>;

    fn parse_entity(&self, entity: &Self::Handle, include_inherited: bool) -> EntityMetadata;
}

/// A previously generated DTO that a new selection should reproduce.
pub trait ExistingDto {
    /// Field paths in declaration order, either flattened (`AddressCity`) or
    /// dotted (`Address.City`).
    fn field_paths(&self) -> Vec<String>;

    fn base_dto_name(&self) -> Option<&str>;

    fn has_data_contract(&self) -> bool;
}

pub fn existing_dto_field_paths(existing: Option<&dyn ExistingDto>) -> Option<Vec<String>> {
    existing.map(|dto| dto.field_paths())
}

pub fn entity_has_base_dto(existing: Option<&dyn ExistingDto>, base_dto_name: Option<&str>) -> bool {
    match (existing.and_then(|dto| dto.base_dto_name()), base_dto_name) {
        (Some(found), Some(expected)) => found == expected,
        _ => false,
    }
}
