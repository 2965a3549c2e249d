pub mod builder;
pub mod display_width;
pub mod metadata;
pub mod render;
pub mod schema_ast;
pub mod schema_parser;
pub mod selection;
pub mod session;
pub mod source;

use session::SelectorSession;
use source::ExistingDto;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Selection tree followed by the DTO outline.
    #[default]
    Tree,
    /// Pruned metadata as JSON, for a code generator.
    Json,
    /// Field paths of the pruned DTO, one per line.
    Paths,
}

/// One non-interactive picker run: which entity, which prior DTO to start
/// from, and which toggles to apply before printing.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub entity: String,
    pub dto_name: Option<String>,
    pub existing_dto: Option<String>,
    pub depth: usize,
    pub select: Vec<String>,
    pub deselect: Vec<String>,
    pub reuse_base_mapper: Option<bool>,
    pub generate_mapper: bool,
    pub add_data_contract: bool,
    pub format: OutputFormat,
}

impl Request {
    pub fn new(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            dto_name: None,
            existing_dto: None,
            depth: session::DEFAULT_DEPTH,
            select: Vec::new(),
            deselect: Vec::new(),
            reuse_base_mapper: None,
            generate_mapper: true,
            add_data_contract: false,
            format: OutputFormat::Tree,
        }
    }
}

pub fn run(schema_text: &str, request: &Request) -> Result<String, String> {
    let schema = schema_parser::parse_schema(schema_text)?;
    if schema.entity(&request.entity).is_none() {
        return Err(format!("unknown entity: {}", request.entity));
    }

    let existing = match request.existing_dto.as_deref() {
        Some(name) => Some(
            schema
                .dto(name)
                .ok_or_else(|| format!("unknown dto: {name}"))? as &dyn ExistingDto,
        ),
        None => None,
    };
    let dto_name = request
        .dto_name
        .clone()
        .or_else(|| request.existing_dto.clone())
        .unwrap_or_else(|| format!("{}DTO", request.entity));

    let mut session = SelectorSession::create_with_depth(
        &schema,
        &request.entity,
        &dto_name,
        existing,
        request.depth,
    );

    let root = session.root_mut();
    if let Some(reuse) = request.reuse_base_mapper {
        if !root.can_reuse_base_mapper() {
            return Err(format!("{} has no base DTO to reuse", request.entity));
        }
        root.set_reuse_base_entity_mapper(reuse);
    }
    for (paths, value) in [(&request.select, true), (&request.deselect, false)] {
        for path in paths {
            let prop = root
                .property_mut(path)
                .ok_or_else(|| format!("unknown property path: {path}"))?;
            // Stands in for a checkbox, so a disabled one cannot be ticked.
            if value && !prop.is_enabled() {
                return Err(format!("property cannot be selected: {path}"));
            }
            prop.set_selected(value);
        }
    }

    session.set_generate_mapper(request.generate_mapper);
    if request.add_data_contract {
        session.set_add_data_contract(true);
    }

    let metadata = session.metadata();
    match request.format {
        OutputFormat::Tree => Ok(format!(
            "{}\n\n{}",
            render::render_tree(session.root()),
            render::render_dto(&metadata, session.generate_mapper(), session.add_data_contract())
        )),
        OutputFormat::Json => serde_json::to_string_pretty(&metadata).map_err(|e| e.to_string()),
        OutputFormat::Paths => Ok(metadata.field_paths().join("\n")),
    }
}
