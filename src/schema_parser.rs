use winnow::prelude::*;
use winnow::ascii::{line_ending, space0, space1, till_line_ending};
use winnow::combinator::{alt, eof, opt, preceded};
use winnow::token::take_while;

use crate::schema_ast::*;

pub fn parse_schema(source: &str) -> Result<Schema, String> {
    let mut input = source;
    schema(&mut input).map_err(|_| {
        let context = failing_line(source, input).trim();
        if context.is_empty() {
            return "syntax error in schema: unexpected end of input".to_string();
        }
        let context_display = if context.chars().count() > 40 {
            format!("{}...", context.chars().take(40).collect::<String>())
        } else {
            context.to_string()
        };
        format!("syntax error in schema: unexpected `{context_display}`")
    })
}

/// The whole line of `source` on which `rest` (a suffix of it) begins.
fn failing_line<'s>(source: &'s str, rest: &str) -> &'s str {
    let offset = source.len() - rest.len();
    let start = source[..offset].rfind('\n').map_or(0, |i| i + 1);
    let end = source[offset..].find('\n').map_or(source.len(), |i| offset + i);
    &source[start..end]
}

/// Blocks are dispatched on their keyword and never backtracked, so a
/// failure leaves `input` on the offending line.
fn schema(input: &mut &str) -> winnow::Result<Schema> {
    let mut schema = Schema::default();
    loop {
        space0.parse_next(input)?;
        if input.is_empty() {
            return Ok(schema);
        }
        if opt(line_ending).parse_next(input)?.is_some() {
            continue;
        }
        if input.starts_with("//") {
            comment_line(input)?;
        } else if input.starts_with("entity") {
            let entity = entity_block(input)?;
            if let Some(existing) = schema.entities.iter_mut().find(|e| e.name == entity.name) {
                *existing = entity;
            } else {
                schema.entities.push(entity);
            }
        } else if input.starts_with("dto") {
            schema.dtos.push(dto_block(input)?);
        } else {
            return Err(winnow::error::ParserError::from_input(input));
        }
    }
}

fn blank_line(input: &mut &str) -> winnow::Result<()> {
    space0.parse_next(input)?;
    line_ending.parse_next(input)?;
    Ok(())
}

fn comment_line(input: &mut &str) -> winnow::Result<()> {
    space0.parse_next(input)?;
    "//".parse_next(input)?;
    till_line_ending.parse_next(input)?;
    opt(line_ending).parse_next(input)?;
    Ok(())
}

/// `<keyword> Name [: Base] {`
fn block_header(mut keyword: &'static str) -> impl FnMut(&mut &str) -> winnow::Result<(String, Option<String>)> {
    move |input: &mut &str| {
        space0.parse_next(input)?;
        keyword.parse_next(input)?;
        space1.parse_next(input)?;
        let name = identifier.parse_next(input)?;
        let base = opt(preceded((space0, ":", space0), identifier)).parse_next(input)?;
        space0.parse_next(input)?;
        "{".parse_next(input)?;
        opt(line_ending).parse_next(input)?;
        Ok((name.to_string(), base.map(str::to_string)))
    }
}

/// Consumes the closing brace if it is next; blank and comment lines are skipped.
fn block_end(input: &mut &str) -> winnow::Result<bool> {
    loop {
        space0.parse_next(input)?;
        if input.starts_with('}') {
            "}".parse_next(input)?;
            space0.parse_next(input)?;
            opt(line_ending).parse_next(input)?;
            return Ok(true);
        }
        if input.is_empty() {
            return Err(winnow::error::ParserError::from_input(input));
        }
        if let Ok(()) = blank_line(input) {
            continue;
        }
        if input.starts_with("//") {
            comment_line(input)?;
            continue;
        }
        return Ok(false);
    }
}

fn entity_block(input: &mut &str) -> winnow::Result<EntityDecl> {
    let (name, base) = block_header("entity").parse_next(input)?;

    let mut attributes = Vec::new();
    while !block_end(input)? {
        attributes.push(entity_attribute.parse_next(input)?);
    }

    Ok(EntityDecl {
        name,
        base,
        attributes,
    })
}

fn entity_attribute(input: &mut &str) -> winnow::Result<AttributeDecl> {
    space0.parse_next(input)?;
    let attr_type = type_name.parse_next(input)?;
    space1.parse_next(input)?;
    let name = identifier.parse_next(input)?;
    let is_ref = opt(preceded(space1, "ref")).parse_next(input)?.is_some();
    space0.parse_next(input)?;
    alt((line_ending.void(), eof.void())).parse_next(input)?;

    Ok(AttributeDecl {
        attr_type: attr_type.to_string(),
        name: name.to_string(),
        is_ref,
    })
}

fn dto_block(input: &mut &str) -> winnow::Result<DtoDecl> {
    let (name, base) = block_header("dto").parse_next(input)?;

    let mut fields = Vec::new();
    let mut data_contract = false;
    while !block_end(input)? {
        if input.starts_with("[DataContract]") {
            "[DataContract]".parse_next(input)?;
            data_contract = true;
        } else {
            let path = field_path.parse_next(input)?;
            fields.push(path.to_string());
        }
        space0.parse_next(input)?;
        alt((line_ending.void(), eof.void())).parse_next(input)?;
    }

    Ok(DtoDecl {
        name,
        base,
        fields,
        data_contract,
    })
}

fn identifier<'s>(input: &mut &'s str) -> winnow::Result<&'s str> {
    take_while(1.., |c: char| c.is_alphanumeric() || c == '_').parse_next(input)
}

fn type_name<'s>(input: &mut &'s str) -> winnow::Result<&'s str> {
    take_while(1.., |c: char| {
        c.is_alphanumeric() || matches!(c, '_' | '<' | '>' | '?' | '.' | '[' | ']' | ',')
    })
    .parse_next(input)
}

fn field_path<'s>(input: &mut &'s str) -> winnow::Result<&'s str> {
    take_while(1.., |c: char| c.is_alphanumeric() || c == '_' || c == '.').parse_next(input)
}
