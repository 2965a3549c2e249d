use crate::display_width::{max_width, pad_right};
use crate::metadata::EntityMetadata;
use crate::selection::{EntityNode, PropertyNode};

/// Renders the picker state as a checkbox tree. Hidden properties are left
/// out; `[-]` marks a property that cannot be selected.
pub fn render_tree(node: &EntityNode) -> String {
    let mut lines = vec![format!("{} <- {}", node.dto_name(), node.entity_name())];
    if let Some(base) = node.base_entity_dto_name().filter(|_| node.can_reuse_base_mapper()) {
        let mark = if node.reuse_base_entity_mapper() { "[x]" } else { "[ ]" };
        lines.push(format!("{mark} reuse {base} mapper"));
    }
    render_properties(&mut lines, node, "");
    lines.join("\n")
}

fn render_properties(lines: &mut Vec<String>, node: &EntityNode, prefix: &str) {
    let visible: Vec<&PropertyNode> = node.properties().iter().filter(|p| p.is_visible()).collect();
    let width = max_width(visible.iter().map(|p| p.name()));

    for (i, prop) in visible.iter().enumerate() {
        let last = i + 1 == visible.len();
        let (connector, child_prefix) = if last { ("└── ", "    ") } else { ("├── ", "│   ") };
        let mut line = format!(
            "{prefix}{connector}{} {}  {}",
            marker(prop),
            pad_right(prop.name(), width),
            prop.type_name()
        );
        if prop.is_inherited() {
            line.push_str("  (inherited)");
        }
        lines.push(line);

        if let Some(related) = prop.related_entity() {
            render_properties(lines, related, &format!("{prefix}{child_prefix}"));
        }
    }
}

fn marker(prop: &PropertyNode) -> &'static str {
    if !prop.is_enabled() {
        "[-]"
    } else if prop.is_selected() {
        "[x]"
    } else {
        "[ ]"
    }
}

/// Outline of the DTO described by pruned metadata.
pub fn render_dto(meta: &EntityMetadata, generate_mapper: bool, add_data_contract: bool) -> String {
    let mut lines = Vec::new();
    if add_data_contract {
        lines.push("[DataContract]".to_string());
    }
    match meta.base_class_dto_name.as_deref() {
        Some(base) => lines.push(format!("{} : {base}", meta.dto_name)),
        None => lines.push(meta.dto_name.clone()),
    }
    render_fields(&mut lines, meta, 1);
    lines.push(format!("mapper: {}", if generate_mapper { "yes" } else { "no" }));
    lines.join("\n")
}

fn render_fields(lines: &mut Vec<String>, meta: &EntityMetadata, level: usize) {
    let indent = "  ".repeat(level);
    let width = max_width(meta.properties.iter().map(|p| p.name.as_str()));
    for prop in &meta.properties {
        lines.push(format!("{indent}{} : {}", pad_right(&prop.name, width), prop.type_name));
        if let Some(nested) = prop.relation_metadata.as_deref() {
            render_fields(lines, nested, level + 1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{build_from_metadata, BuildOptions};
    use crate::metadata::PropertyMetadata;
    use crate::source::EntitySource;
    use pretty_assertions::assert_eq;

    struct Flat;

    impl EntitySource for Flat {
        type Handle = ();

        fn resolve_related_entity(&self, _current: &(), _name: &str) -> Option<()> {
            None
        }

        fn parse_entity(&self, _entity: &(), _include_inherited: bool) -> EntityMetadata {
            EntityMetadata::new("Unused")
        }
    }

    fn country() -> EntityNode {
        let meta = EntityMetadata::new("Country")
            .with_property(PropertyMetadata::simple("Name", "string"))
            .with_property(PropertyMetadata::simple("Code", "string"))
            .with_property(PropertyMetadata::relation("Regions", "Region[]", "Region").collection());
        let options = BuildOptions {
            can_select_collections: false,
            ..BuildOptions::default()
        };
        build_from_metadata(&Flat, &(), meta, options, None)
    }

    #[test]
    fn render_flat_tree() {
        let expected = "\
CountryDTO <- Country
├── [x] Name     string
├── [x] Code     string
└── [-] Regions  Region[]";
        assert_eq!(render_tree(&country()), expected);
    }

    #[test]
    fn render_dto_outline() {
        let meta = country().to_metadata();
        let expected = "\
[DataContract]
CountryDTO
  Name : string
  Code : string
mapper: yes";
        assert_eq!(render_dto(&meta, true, true), expected);
    }
}
