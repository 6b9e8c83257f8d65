//! The `views` block, view declarations and static view bodies.

use cartograph_core::{
    model::ElementId,
    view::{AutoLayout, RankDirection, ViewKind},
};
use log::debug;

use super::{
    Statement, check_tokens, expected, model_error, parse_keyword, parse_value, require_block,
    unexpected_statement,
};
use crate::{
    context::{Context, PropertyTarget},
    error::Result,
    interpreter::{Interpreter, unknown_identifier},
    tokens::Tokens,
};

/// Scope token of dynamic and deployment views meaning "no scope".
const ANY_SCOPE: &str = "*";

/// Token positions of a view declaration.
struct ViewLayout {
    kind: ViewKind,
    grammar: &'static str,
    scope: Option<usize>,
    environment: Option<usize>,
    key: usize,
    title: Option<usize>,
    description: usize,
}

impl ViewLayout {
    fn of(keyword: &str) -> Option<Self> {
        let layout = match keyword {
            "systemLandscape" => ViewLayout {
                kind: ViewKind::SystemLandscape,
                grammar: "systemLandscape [key] [description] {",
                scope: None,
                environment: None,
                key: 1,
                title: None,
                description: 2,
            },
            "systemContext" => ViewLayout::scoped(
                ViewKind::SystemContext,
                "systemContext <software system identifier> [key] [description] {",
            ),
            "container" => ViewLayout::scoped(
                ViewKind::Container,
                "container <software system identifier> [key] [description] {",
            ),
            "component" => ViewLayout::scoped(
                ViewKind::Component,
                "component <container identifier> [key] [description] {",
            ),
            "dynamic" => ViewLayout::scoped(
                ViewKind::Dynamic,
                "dynamic <*|software system identifier|container identifier> [key] [description] {",
            ),
            "deployment" => ViewLayout {
                kind: ViewKind::Deployment,
                grammar: "deployment <*|software system identifier> <environment> [key] [description] {",
                scope: Some(1),
                environment: Some(2),
                key: 3,
                title: None,
                description: 4,
            },
            "custom" => ViewLayout {
                kind: ViewKind::Custom,
                grammar: "custom [key] [title] [description] {",
                scope: None,
                environment: None,
                key: 1,
                title: Some(2),
                description: 3,
            },
            _ => return None,
        };
        Some(layout)
    }

    fn scoped(kind: ViewKind, grammar: &'static str) -> Self {
        ViewLayout {
            kind,
            grammar,
            scope: Some(1),
            environment: None,
            key: 2,
            title: None,
            description: 3,
        }
    }

    fn required(&self) -> usize {
        self.environment.or(self.scope).unwrap_or(0)
    }
}

impl Interpreter<'_> {
    pub(crate) fn parse_views_statement(&mut self, statement: &Statement) -> Result<Option<Context>> {
        let tokens = &statement.tokens;
        if let Some(layout) = ViewLayout::of(statement.keyword()) {
            return self.parse_view(&layout, statement);
        }

        match statement.keyword() {
            "styles" => {
                check_tokens(tokens, 0, 0, "styles {")?;
                require_block(statement, "styles {")?;
                Ok(Some(Context::Styles))
            }
            "theme" => {
                check_tokens(tokens, 1, 1, "theme <url>")?;
                self.add_themes(tokens)?;
                Ok(None)
            }
            "themes" => {
                if !tokens.includes(1) {
                    return Err(expected(tokens, "themes <url> [url...]"));
                }
                self.add_themes(tokens)?;
                Ok(None)
            }
            "properties" => {
                check_tokens(tokens, 0, 0, "properties {")?;
                require_block(statement, "properties {")?;
                Ok(Some(Context::Properties(PropertyTarget::Views)))
            }
            _ => Err(unexpected_statement(statement, Some(&Context::Views))),
        }
    }

    fn add_themes(&mut self, tokens: &Tokens) -> Result<()> {
        for theme in tokens.iter().skip(1) {
            self.builder
                .add_theme(theme.text())
                .map_err(|err| model_error(err, theme.span()))?;
        }
        Ok(())
    }

    fn parse_view(&mut self, layout: &ViewLayout, statement: &Statement) -> Result<Option<Context>> {
        let tokens = &statement.tokens;
        check_tokens(tokens, layout.required(), layout.description, layout.grammar)?;
        require_block(statement, layout.grammar)?;

        let scope = match layout.scope {
            Some(index) => self.resolve_view_scope(tokens, index, layout.kind)?,
            None => None,
        };
        let environment = match layout.environment {
            Some(index) => Some(self.resolve_environment(tokens, index)?),
            None => None,
        };
        let key = tokens.get(layout.key).filter(|k| !k.is_empty());

        let key = self
            .builder
            .add_view(layout.kind, key, scope, environment.as_deref())
            .map_err(|err| model_error(err, tokens.span_from(0)))?;
        if let Some(title) = layout
            .title
            .and_then(|i| tokens.token(i))
            .filter(|t| !t.text().is_empty())
        {
            self.builder
                .set_view_title(&key, title.text())
                .map_err(|err| model_error(err, title.span()))?;
        }
        if let Some(description) = tokens.get(layout.description).filter(|d| !d.is_empty()) {
            self.builder
                .set_view_description(&key, description)
                .map_err(|err| model_error(err, tokens.span(layout.description)))?;
        }

        debug!(key = key.as_str(), kind = layout.kind.keyword(); "View declared");
        Ok(Some(if layout.kind == ViewKind::Dynamic {
            Context::DynamicView(key)
        } else {
            Context::StaticView(key)
        }))
    }

    fn resolve_view_scope(
        &self,
        tokens: &Tokens,
        index: usize,
        kind: ViewKind,
    ) -> Result<Option<ElementId>> {
        let Some(token) = tokens.token(index) else {
            return Err(expected(tokens, "a view scope"));
        };
        if token.is(ANY_SCOPE) && matches!(kind, ViewKind::Dynamic | ViewKind::Deployment) {
            return Ok(None);
        }
        self.resolve_element(token, "element").map(Some)
    }

    fn resolve_environment(&self, tokens: &Tokens, index: usize) -> Result<String> {
        let Some(token) = tokens.token(index) else {
            return Err(expected(tokens, "a deployment environment"));
        };
        self.environments
            .get(token.text())
            .cloned()
            .ok_or_else(|| unknown_identifier(token, "deployment environment"))
    }

    pub(crate) fn parse_static_view_statement(
        &mut self,
        key: &str,
        statement: &Statement,
    ) -> Result<Option<Context>> {
        let tokens = &statement.tokens;
        match statement.keyword() {
            "include" => {
                if !tokens.includes(1) {
                    return Err(expected(tokens, "include <*|identifier|expression> [...]"));
                }
                self.include_expressions(key, &tokens.skip(1))?;
                Ok(None)
            }
            "exclude" => {
                if !tokens.includes(1) {
                    return Err(expected(tokens, "exclude <identifier|expression> [...]"));
                }
                self.exclude_expressions(key, &tokens.skip(1))?;
                Ok(None)
            }
            _ => self.parse_view_setting(key, statement, &Context::StaticView(key.to_string())),
        }
    }

    /// Statements shared by every kind of view body.
    pub(crate) fn parse_view_setting(
        &mut self,
        key: &str,
        statement: &Statement,
        context: &Context,
    ) -> Result<Option<Context>> {
        let tokens = &statement.tokens;
        let span = tokens.span_from(0);
        match statement.keyword() {
            "title" => {
                check_tokens(tokens, 1, 1, "title <title>")?;
                self.builder
                    .set_view_title(key, tokens.get_or_empty(1))
                    .map_err(|err| model_error(err, span))?;
                Ok(None)
            }
            "description" => {
                check_tokens(tokens, 1, 1, "description <description>")?;
                self.builder
                    .set_view_description(key, tokens.get_or_empty(1))
                    .map_err(|err| model_error(err, span))?;
                Ok(None)
            }
            "autoLayout" | "autolayout" => {
                check_tokens(tokens, 0, 3, "autoLayout [tb|bt|lr|rl] [rankSeparation] [nodeSeparation]")?;
                let auto_layout = parse_auto_layout(tokens)?;
                self.builder
                    .set_auto_layout(key, auto_layout)
                    .map_err(|err| model_error(err, span))?;
                Ok(None)
            }
            "properties" => {
                check_tokens(tokens, 0, 0, "properties {")?;
                require_block(statement, "properties {")?;
                Ok(Some(Context::Properties(PropertyTarget::View(key.to_string()))))
            }
            _ => Err(unexpected_statement(statement, Some(context))),
        }
    }
}

fn parse_auto_layout(tokens: &Tokens) -> Result<AutoLayout> {
    let direction = if tokens.includes(1) {
        parse_keyword::<RankDirection>(tokens, 1)?
    } else {
        RankDirection::default()
    };
    let separation = |index: usize| -> Result<u32> {
        if tokens.includes(index) {
            parse_value(tokens, index, "separation, expected a non-negative number")
        } else {
            Ok(AutoLayout::DEFAULT_SEPARATION)
        }
    };
    Ok(AutoLayout::new(direction, separation(2)?, separation(3)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::ErrorCode, lexer::tokenize};

    #[test]
    fn test_parse_auto_layout() {
        let tokens = tokenize("autoLayout lr 150", 0).unwrap();
        let layout = parse_auto_layout(&tokens).unwrap();

        assert_eq!(layout.direction(), RankDirection::LeftRight);
        assert_eq!(layout.rank_separation(), 150);
        assert_eq!(layout.node_separation(), AutoLayout::DEFAULT_SEPARATION);
    }

    #[test]
    fn test_parse_auto_layout_rejects_bad_values() {
        let tokens = tokenize("autoLayout sideways", 0).unwrap();
        assert_eq!(
            parse_auto_layout(&tokens).unwrap_err().code(),
            Some(ErrorCode::E105)
        );

        let tokens = tokenize("autoLayout tb -5", 0).unwrap();
        assert_eq!(
            parse_auto_layout(&tokens).unwrap_err().code(),
            Some(ErrorCode::E105)
        );
    }

    #[test]
    fn test_view_layouts() {
        let deployment = ViewLayout::of("deployment").unwrap();
        assert_eq!(deployment.required(), 2);
        assert_eq!(ViewLayout::of("systemLandscape").unwrap().required(), 0);
        assert!(ViewLayout::of("filtered").is_none());
    }
}
