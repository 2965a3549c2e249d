use serde::{Deserialize, Serialize};

/// One field of an entity as discovered by the schema parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyMetadata {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub is_inherited: bool,
    pub is_collection: bool,
    pub is_relation: bool,
    pub is_simple_property: bool,
    pub related_entity_name: Option<String>,
    /// Pruned shape of the related DTO; only set on output for single relations.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub relation_metadata: Option<Box<EntityMetadata>>,
}

impl PropertyMetadata {
    pub fn simple(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            is_inherited: false,
            is_collection: false,
            is_relation: false,
            is_simple_property: true,
            related_entity_name: None,
            relation_metadata: None,
        }
    }

    pub fn relation(
        name: impl Into<String>,
        type_name: impl Into<String>,
        related_entity_name: impl Into<String>,
    ) -> Self {
        Self {
            is_relation: true,
            is_simple_property: false,
            related_entity_name: Some(related_entity_name.into()),
            ..Self::simple(name, type_name)
        }
    }

    pub fn collection(mut self) -> Self {
        self.is_collection = true;
        self
    }

    pub fn inherited(mut self) -> Self {
        self.is_inherited = true;
        self
    }

    pub fn is_single_relation(&self) -> bool {
        self.is_relation && !self.is_collection
    }

    /// Turns an unresolvable relation into a plain field.
    pub fn demote(&mut self) {
        self.is_relation = false;
        self.is_simple_property = true;
        self.related_entity_name = None;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMetadata {
    pub name: String,
    pub dto_name: String,
    pub base_class_dto_name: Option<String>,
    pub properties: Vec<PropertyMetadata>,
}

impl EntityMetadata {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            dto_name: format!("{name}DTO"),
            name,
            base_class_dto_name: None,
            properties: Vec::new(),
        }
    }

    pub fn with_base_dto(mut self, base_dto_name: impl Into<String>) -> Self {
        self.base_class_dto_name = Some(base_dto_name.into());
        self
    }

    pub fn with_property(mut self, property: PropertyMetadata) -> Self {
        self.properties.push(property);
        self
    }

    pub fn property(&self, name: &str) -> Option<&PropertyMetadata> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn has_property(&self, name: &str) -> bool {
        self.property(name).is_some()
    }

    pub fn property_names(&self) -> Vec<&str> {
        self.properties.iter().map(|p| p.name.as_str()).collect()
    }

    /// Dotted paths of the leaf fields, in the form an existing DTO lists them.
    pub fn field_paths(&self) -> Vec<String> {
        let mut paths = Vec::new();
        for prop in &self.properties {
            match prop.relation_metadata.as_deref() {
                Some(nested) if !nested.properties.is_empty() => paths.extend(
                    nested
                        .field_paths()
                        .into_iter()
                        .map(|p| format!("{}.{p}", prop.name)),
                ),
                _ => paths.push(prop.name.clone()),
            }
        }
        paths
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relation_is_not_simple() {
        let p = PropertyMetadata::relation("Address", "Address", "Address");
        assert!(p.is_relation);
        assert!(!p.is_simple_property);
        assert!(p.is_single_relation());
        assert!(!p.clone().collection().is_single_relation());
    }

    #[test]
    fn demote_clears_relation() {
        let mut p = PropertyMetadata::relation("Owner", "Person", "Person");
        p.demote();
        assert!(!p.is_relation);
        assert!(p.is_simple_property);
        assert_eq!(p.related_entity_name, None);
    }

    #[test]
    fn dto_name_defaults_to_suffix() {
        assert_eq!(EntityMetadata::new("Country").dto_name, "CountryDTO");
    }

    #[test]
    fn field_paths_descend_into_relations() {
        let mut address = PropertyMetadata::relation("Address", "Address", "Address");
        address.relation_metadata = Some(Box::new(
            EntityMetadata::new("Address").with_property(PropertyMetadata::simple("City", "string")),
        ));
        let meta = EntityMetadata::new("Person")
            .with_property(PropertyMetadata::simple("Name", "string"))
            .with_property(address);
        assert_eq!(meta.field_paths(), vec!["Name", "Address.City"]);
    }

    #[test]
    fn serializes_type_field_name() {
        let json = serde_json::to_string(&PropertyMetadata::simple("Name", "string")).unwrap();
        assert!(json.contains("\"type\":\"string\""), "got: {json}");
        assert!(!json.contains("relation_metadata"), "got: {json}");
    }
}
