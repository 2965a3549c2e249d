use crate::metadata::{EntityMetadata, PropertyMetadata};
use crate::source::{EntitySource, ExistingDto};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Schema {
    pub entities: Vec<EntityDecl>,
    pub dtos: Vec<DtoDecl>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EntityDecl {
    pub name: String,
    pub base: Option<String>,
    pub attributes: Vec<AttributeDecl>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttributeDecl {
    pub attr_type: String,
    pub name: String,
    pub is_ref: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DtoDecl {
    pub name: String,
    pub base: Option<String>,
    pub fields: Vec<String>,
    pub data_contract: bool,
}

impl AttributeDecl {
    pub fn is_collection(&self) -> bool {
        self.attr_type.ends_with("[]")
    }

    fn to_metadata(&self, inherited: bool) -> PropertyMetadata {
        let prop = if self.is_ref {
            let related = self.attr_type.trim_end_matches("[]");
            PropertyMetadata::relation(&self.name, &self.attr_type, related)
        } else {
            PropertyMetadata::simple(&self.name, &self.attr_type)
        };
        let prop = if self.is_collection() { prop.collection() } else { prop };
        if inherited { prop.inherited() } else { prop }
    }
}

impl Schema {
    pub fn entity(&self, name: &str) -> Option<&EntityDecl> {
        self.entities.iter().find(|e| e.name == name)
    }

    pub fn dto(&self, name: &str) -> Option<&DtoDecl> {
        self.dtos.iter().find(|d| d.name == name)
    }

    /// Base entities of `name`, nearest first. Stops at undeclared bases and cycles.
    fn ancestors<'a>(&'a self, name: &str) -> Vec<&'a EntityDecl> {
        let mut chain: Vec<&EntityDecl> = Vec::new();
        let mut current = self.entity(name).and_then(|e| e.base.as_deref());
        while let Some(base) = current {
            let Some(decl) = self.entity(base) else { break };
            if decl.name == name || chain.iter().any(|e| e.name == decl.name) {
                break;
            }
            chain.push(decl);
            current = decl.base.as_deref();
        }
        chain
    }
}

impl EntitySource for Schema {
    type Handle = String;

    fn resolve_related_entity(&self, _current: &String, related_entity_name: &str) -> Option<String> {
        self.entity(related_entity_name).map(|e| e.name.clone())
    }

    /// Inherited properties come first, outermost base first. An entity
    /// derives from a mapped entity when its base is declared in the schema.
    fn parse_entity(&self, entity: &String, include_inherited: bool) -> EntityMetadata {
        let mut metadata = EntityMetadata::new(entity.as_str());
        let Some(decl) = self.entity(entity) else {
            return metadata;
        };

        if let Some(base) = decl.base.as_deref().filter(|b| self.entity(b).is_some()) {
            metadata = metadata.with_base_dto(format!("{base}DTO"));
        }

        if include_inherited {
            for ancestor in self.ancestors(entity).into_iter().rev() {
                for attr in &ancestor.attributes {
                    metadata.properties.push(attr.to_metadata(true));
                }
            }
        }
        for attr in &decl.attributes {
            metadata.properties.push(attr.to_metadata(false));
        }
        metadata
    }
}

impl ExistingDto for DtoDecl {
    fn field_paths(&self) -> Vec<String> {
        self.fields.clone()
    }

    fn base_dto_name(&self) -> Option<&str> {
        self.base.as_deref()
    }

    fn has_data_contract(&self) -> bool {
        self.data_contract
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn attr(attr_type: &str, name: &str, is_ref: bool) -> AttributeDecl {
        AttributeDecl {
            attr_type: attr_type.into(),
            name: name.into(),
            is_ref,
        }
    }

    fn schema() -> Schema {
        Schema {
            entities: vec![
                EntityDecl {
                    name: "EntityBase".into(),
                    base: None,
                    attributes: vec![attr("int", "Id", false)],
                },
                EntityDecl {
                    name: "Person".into(),
                    base: Some("EntityBase".into()),
                    attributes: vec![
                        attr("string", "Name", false),
                        attr("Order[]", "Orders", true),
                    ],
                },
                EntityDecl {
                    name: "Loop".into(),
                    base: Some("Loop".into()),
                    attributes: vec![],
                },
            ],
            dtos: vec![],
        }
    }

    #[test]
    fn inherited_properties_first() {
        let meta = schema().parse_entity(&"Person".to_string(), true);
        assert_eq!(meta.property_names(), vec!["Id", "Name", "Orders"]);
        assert!(meta.properties[0].is_inherited);
        assert_eq!(meta.base_class_dto_name.as_deref(), Some("EntityBaseDTO"));
    }

    #[test]
    fn without_inherited() {
        let meta = schema().parse_entity(&"Person".to_string(), false);
        assert_eq!(meta.property_names(), vec!["Name", "Orders"]);
    }

    #[test]
    fn collection_relation_attribute() {
        let meta = schema().parse_entity(&"Person".to_string(), true);
        let orders = meta.property("Orders").unwrap();
        assert!(orders.is_collection);
        assert!(orders.is_relation);
        assert_eq!(orders.related_entity_name.as_deref(), Some("Order"));
    }

    #[test]
    fn self_base_does_not_loop() {
        let meta = schema().parse_entity(&"Loop".to_string(), true);
        assert!(meta.properties.is_empty());
    }

    #[test]
    fn unknown_related_entity_does_not_resolve() {
        let s = schema();
        assert_eq!(s.resolve_related_entity(&"Person".into(), "Order"), None);
        assert_eq!(
            s.resolve_related_entity(&"Person".into(), "EntityBase"),
            Some("EntityBase".to_string())
        );
    }
}
