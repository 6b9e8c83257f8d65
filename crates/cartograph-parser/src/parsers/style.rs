//! The `styles` block: element and relationship styles keyed by tag.

use cartograph_core::{
    color::Color,
    style::{
        Border, ElementStyleProperty, LineStyle, RelationshipStyleProperty, Routing, Shape,
    },
};

use super::{
    Statement, check_tokens, invalid_value, parse_bool, parse_keyword, parse_value,
    require_block, unexpected_statement,
};
use crate::{
    context::{Context, PropertyTarget},
    error::{Diagnostic, ErrorCode, Result},
    interpreter::Interpreter,
    tokens::Tokens,
};

const PERCENTAGE_MAX: u8 = 100;

fn parse_color(tokens: &Tokens, index: usize) -> Result<Color> {
    Color::new(tokens.get_or_empty(index)).map_err(|message| invalid_value(tokens.token(index), message))
}

fn parse_percentage(tokens: &Tokens, index: usize) -> Result<u8> {
    let value: u8 = parse_value(tokens, index, "percentage, expected 0 to 100")?;
    if value > PERCENTAGE_MAX {
        return Err(invalid_value(
            tokens.token(index),
            format!("`{value}` is not a valid percentage, expected 0 to 100"),
        ));
    }
    Ok(value)
}

fn parse_size(tokens: &Tokens, index: usize) -> Result<u32> {
    parse_value(tokens, index, "size, expected a non-negative number")
}

fn unknown_property(tokens: &Tokens, style: &str) -> Diagnostic {
    Diagnostic::warning(format!(
        "`{}` is not a known {style} style property",
        tokens.get_or_empty(0)
    ))
    .with_code(ErrorCode::W001)
    .with_label(tokens.span(0), "ignored")
}

/// Parses one line of an element style.
///
/// Returns `None` for names that are not element style properties.
fn element_style_property(tokens: &Tokens) -> Result<Option<ElementStyleProperty>> {
    let property = match tokens.get_or_empty(0) {
        "shape" => ElementStyleProperty::Shape(parse_keyword::<Shape>(tokens, 1)?),
        "icon" => ElementStyleProperty::Icon(tokens.get_or_empty(1).to_string()),
        "width" => ElementStyleProperty::Width(parse_size(tokens, 1)?),
        "height" => ElementStyleProperty::Height(parse_size(tokens, 1)?),
        "background" => ElementStyleProperty::Background(parse_color(tokens, 1)?),
        "color" | "colour" => ElementStyleProperty::Color(parse_color(tokens, 1)?),
        "stroke" => ElementStyleProperty::Stroke(parse_color(tokens, 1)?),
        "strokeWidth" => ElementStyleProperty::StrokeWidth(parse_size(tokens, 1)?),
        "fontSize" => ElementStyleProperty::FontSize(parse_size(tokens, 1)?),
        "border" => ElementStyleProperty::Border(parse_keyword::<Border>(tokens, 1)?),
        "opacity" => ElementStyleProperty::Opacity(parse_percentage(tokens, 1)?),
        "metadata" => ElementStyleProperty::Metadata(parse_bool(tokens, 1)?),
        "description" => ElementStyleProperty::Description(parse_bool(tokens, 1)?),
        _ => return Ok(None),
    };
    Ok(Some(property))
}

/// Parses one line of a relationship style.
fn relationship_style_property(tokens: &Tokens) -> Result<Option<RelationshipStyleProperty>> {
    let property = match tokens.get_or_empty(0) {
        "thickness" => RelationshipStyleProperty::Thickness(parse_size(tokens, 1)?),
        "color" | "colour" => RelationshipStyleProperty::Color(parse_color(tokens, 1)?),
        "style" => RelationshipStyleProperty::Style(parse_keyword::<LineStyle>(tokens, 1)?),
        "dashed" => RelationshipStyleProperty::Style(if parse_bool(tokens, 1)? {
            LineStyle::Dashed
        } else {
            LineStyle::Solid
        }),
        "routing" => RelationshipStyleProperty::Routing(parse_keyword::<Routing>(tokens, 1)?),
        "fontSize" => RelationshipStyleProperty::FontSize(parse_size(tokens, 1)?),
        "width" => RelationshipStyleProperty::Width(parse_size(tokens, 1)?),
        "position" => RelationshipStyleProperty::Position(parse_percentage(tokens, 1)?),
        "opacity" => RelationshipStyleProperty::Opacity(parse_percentage(tokens, 1)?),
        _ => return Ok(None),
    };
    Ok(Some(property))
}

impl Interpreter<'_> {
    pub(crate) fn parse_styles_statement(&mut self, statement: &Statement) -> Result<Option<Context>> {
        let tokens = &statement.tokens;
        match statement.keyword() {
            "element" => {
                check_tokens(tokens, 1, 1, "element <tag> {")?;
                require_block(statement, "element <tag> {")?;
                let tag = tokens.get_or_empty(1);
                self.builder.element_style_mut(tag);
                Ok(Some(Context::ElementStyle(tag.to_string())))
            }
            "relationship" => {
                check_tokens(tokens, 1, 1, "relationship <tag> {")?;
                require_block(statement, "relationship <tag> {")?;
                let tag = tokens.get_or_empty(1);
                self.builder.relationship_style_mut(tag);
                Ok(Some(Context::RelationshipStyle(tag.to_string())))
            }
            _ => Err(unexpected_statement(statement, Some(&Context::Styles))),
        }
    }

    pub(crate) fn parse_element_style(
        &mut self,
        tag: &str,
        statement: &Statement,
    ) -> Result<Option<Context>> {
        let tokens = &statement.tokens;
        if statement.keyword() == "properties" {
            check_tokens(tokens, 0, 0, "properties {")?;
            require_block(statement, "properties {")?;
            return Ok(Some(Context::Properties(PropertyTarget::ElementStyle(
                tag.to_string(),
            ))));
        }

        check_tokens(tokens, 1, 1, "<name> <value>")?;
        match element_style_property(tokens)? {
            Some(property) => self.builder.element_style_mut(tag).apply(property),
            None => self.warn(unknown_property(tokens, "element"))?,
        }
        Ok(None)
    }

    pub(crate) fn parse_relationship_style(
        &mut self,
        tag: &str,
        statement: &Statement,
    ) -> Result<Option<Context>> {
        let tokens = &statement.tokens;
        if statement.keyword() == "properties" {
            check_tokens(tokens, 0, 0, "properties {")?;
            require_block(statement, "properties {")?;
            return Ok(Some(Context::Properties(
                PropertyTarget::RelationshipStyle(tag.to_string()),
            )));
        }

        check_tokens(tokens, 1, 1, "<name> <value>")?;
        match relationship_style_property(tokens)? {
            Some(property) => self.builder.relationship_style_mut(tag).apply(property),
            None => self.warn(unknown_property(tokens, "relationship"))?,
        }
        Ok(None)
    }
}
