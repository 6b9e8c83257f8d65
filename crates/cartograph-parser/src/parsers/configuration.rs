//! The `configuration` block and its `users` block.

use cartograph_core::configuration::{Role, User, Visibility, WorkspaceScope};

use super::{Statement, check_tokens, parse_keyword, require_block, unexpected_statement};
use crate::{context::Context, error::Result, interpreter::Interpreter};

impl Interpreter<'_> {
    pub(crate) fn parse_configuration_statement(
        &mut self,
        statement: &Statement,
    ) -> Result<Option<Context>> {
        let tokens = &statement.tokens;
        match statement.keyword() {
            "scope" => {
                check_tokens(tokens, 1, 1, "scope <landscape|softwaresystem|none>")?;
                let scope = if tokens.get_or_empty(1).eq_ignore_ascii_case("none") {
                    None
                } else {
                    Some(parse_keyword::<WorkspaceScope>(tokens, 1)?)
                };
                self.builder.set_scope(scope);
                Ok(None)
            }
            "visibility" => {
                check_tokens(tokens, 1, 1, "visibility <private|public>")?;
                let visibility: Visibility = parse_keyword(tokens, 1)?;
                self.builder.set_visibility(visibility);
                Ok(None)
            }
            "users" => {
                check_tokens(tokens, 0, 0, "users {")?;
                require_block(statement, "users {")?;
                Ok(Some(Context::Users))
            }
            _ => Err(unexpected_statement(statement, Some(&Context::Configuration))),
        }
    }

    pub(crate) fn parse_user(&mut self, statement: &Statement) -> Result<Option<Context>> {
        let tokens = &statement.tokens;
        check_tokens(tokens, 1, 1, "<username> <read|write>")?;
        let role: Role = parse_keyword(tokens, 1)?;
        self.builder.add_user(User::new(tokens.get_or_empty(0), role));
        Ok(None)
    }
}
