//! The root `workspace` block.

use log::debug;

use super::{Statement, check_tokens, require_block, unexpected_statement};
use crate::{
    context::{Context, PropertyTarget},
    error::{Diagnostic, ErrorCode, Result},
    interpreter::Interpreter,
};

const WORKSPACE_GRAMMAR: &str = "workspace [name] [description] {";

impl Interpreter<'_> {
    /// Parses the first statement of a source, which must open the
    /// workspace.
    pub(crate) fn parse_workspace(&mut self, statement: &Statement) -> Result<Option<Context>> {
        let tokens = &statement.tokens;
        if statement.keyword() != "workspace" {
            return Err(unexpected_statement(statement, None));
        }
        if tokens.is_at(1, "extends") {
            return Err(Diagnostic::error("extending another workspace is not supported")
                .with_code(ErrorCode::E100)
                .with_label(tokens.span_from(1), "not supported"));
        }
        check_tokens(tokens, 0, 2, WORKSPACE_GRAMMAR)?;
        require_block(statement, WORKSPACE_GRAMMAR)?;

        if let Some(name) = tokens.get(1) {
            self.builder.set_name(name);
        }
        if let Some(description) = tokens.get(2) {
            self.builder.set_description(description);
        }
        debug!(name = tokens.get_or_empty(1); "Workspace opened");
        Ok(Some(Context::Workspace))
    }

    pub(crate) fn parse_workspace_statement(
        &mut self,
        statement: &Statement,
    ) -> Result<Option<Context>> {
        let tokens = &statement.tokens;
        match statement.keyword() {
            "name" => {
                check_tokens(tokens, 1, 1, "name <name>")?;
                self.builder.set_name(tokens.get_or_empty(1));
                Ok(None)
            }
            "description" => {
                check_tokens(tokens, 1, 1, "description <description>")?;
                self.builder.set_description(tokens.get_or_empty(1));
                Ok(None)
            }
            "properties" => {
                check_tokens(tokens, 0, 0, "properties {")?;
                require_block(statement, "properties {")?;
                Ok(Some(Context::Properties(PropertyTarget::Workspace)))
            }
            "model" => {
                check_tokens(tokens, 0, 0, "model {")?;
                require_block(statement, "model {")?;
                if self.has_model {
                    return Err(once_only(statement, "model"));
                }
                self.has_model = true;
                Ok(Some(Context::Model))
            }
            "views" => {
                check_tokens(tokens, 0, 0, "views {")?;
                require_block(statement, "views {")?;
                if self.has_views {
                    return Err(once_only(statement, "views"));
                }
                self.has_views = true;
                Ok(Some(Context::Views))
            }
            "configuration" => {
                check_tokens(tokens, 0, 0, "configuration {")?;
                require_block(statement, "configuration {")?;
                Ok(Some(Context::Configuration))
            }
            _ => Err(unexpected_statement(statement, Some(&Context::Workspace))),
        }
    }
}

fn once_only(statement: &Statement, block: &str) -> Diagnostic {
    Diagnostic::error(format!("a workspace may only contain one {block} block"))
        .with_code(ErrorCode::E100)
        .with_label(statement.tokens.span(0), "second block")
}
