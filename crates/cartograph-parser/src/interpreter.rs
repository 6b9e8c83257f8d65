//! The statement interpreter.
//!
//! Source is read one logical line at a time. Each line is lexed, has its
//! constants substituted and is dispatched on the innermost open block.
//! Statement parsers mutate the [`WorkspaceBuilder`] and report the block a
//! statement opens, which is pushed onto the context stack. A line holding
//! only `}` pops it.

use std::collections::HashMap;

use cartograph_core::{
    WorkspaceBuilder,
    identifier::IdentifierMode,
    model::{ElementId, RelationshipId},
};
use log::{debug, trace};

use crate::{
    ParseOptions, ParsedWorkspace,
    adr::{DECISION_EXTENSION, read_decision},
    context::{Context, ContextStack},
    error::{Diagnostic, DiagnosticCollector, ErrorCode, ParseError, Result, SourceLine},
    include::{NoIncludes, SourceResolver},
    lexer,
    parsers::{
        Statement, check_tokens, invalid_value, model_error, parse_bool, unexpected_statement,
    },
    registry::{Binding, IdentifierRegistry, RegistryError, ScopeId, is_valid_identifier},
    source::{LogicalLine, logical_lines},
    span::Span,
    tokens::{BLOCK_END_TOKEN, Token, Tokens},
};

static NO_INCLUDES: NoIncludes = NoIncludes;

/// Keyword naming the element whose block is open.
pub(crate) const THIS_KEYWORD: &str = "this";

/// Interprets workspace source into a model.
///
/// # Examples
///
/// ```
/// use cartograph_parser::{Interpreter, ParseOptions};
///
/// let source = r#"
///     workspace {
///         model {
///             user = person "User"
///             system = softwareSystem "Software System"
///             user -> system "Uses"
///         }
///     }
/// "#;
///
/// let parsed = Interpreter::new(ParseOptions::default()).parse(source).unwrap();
/// assert_eq!(parsed.workspace().model().relationships().count(), 1);
/// ```
pub struct Interpreter<'r> {
    pub(crate) builder: WorkspaceBuilder,
    pub(crate) registry: IdentifierRegistry,
    pub(crate) stack: ContextStack,
    collector: DiagnosticCollector,
    pub(crate) options: ParseOptions,
    resolver: &'r dyn SourceResolver,
    constants: HashMap<String, String>,
    /// Deployment environment names, keyed by name and by identifier.
    pub(crate) environments: HashMap<String, String>,
    /// Names of the sources being interpreted, innermost last.
    sources: Vec<Option<String>>,
    current_line: Option<SourceLine>,
    pub(crate) has_model: bool,
    pub(crate) has_views: bool,
    closed: bool,
}

impl<'r> Interpreter<'r> {
    pub fn new(options: ParseOptions) -> Self {
        let mut builder = WorkspaceBuilder::default();
        builder.set_implied_relationships(options.implied_relationships);
        Self::from_builder(builder, options)
    }

    /// Interprets source on top of a pre-populated builder.
    ///
    /// Collaborators that discover elements elsewhere add them to `builder`
    /// and name them with [`Interpreter::bind_external`].
    pub fn from_builder(builder: WorkspaceBuilder, options: ParseOptions) -> Self {
        Self {
            builder,
            registry: IdentifierRegistry::new(options.identifiers),
            stack: ContextStack::default(),
            collector: DiagnosticCollector::new(options.warnings_as_errors),
            options,
            resolver: &NO_INCLUDES,
            constants: HashMap::new(),
            environments: HashMap::new(),
            sources: Vec::new(),
            current_line: None,
            has_model: false,
            has_views: false,
            closed: false,
        }
    }

    /// Uses `resolver` to read the targets of `!include` statements.
    pub fn with_resolver(mut self, resolver: &'r dyn SourceResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Binds a name, such as a fully qualified type name, to an element that
    /// already exists in the builder.
    pub fn bind_external(
        &mut self,
        name: &str,
        element: ElementId,
    ) -> std::result::Result<(), Diagnostic> {
        self.builder
            .element(element)
            .map_err(|err| model_error(err, Span::default()))?;
        self.registry
            .register_external(name, Binding::Element(element))
            .map(|_| ())
            .map_err(|err| registry_error(err, Span::default()))
    }

    /// Interprets `source` and returns the finished workspace.
    pub fn parse(self, source: &str) -> std::result::Result<ParsedWorkspace, ParseError> {
        self.run(source, None)
    }

    /// Interprets `source` read from the file `name`.
    ///
    /// The name labels diagnostics and is handed to the resolver as the
    /// origin of top-level `!include` statements.
    pub fn parse_named(
        self,
        source: &str,
        name: &str,
    ) -> std::result::Result<ParsedWorkspace, ParseError> {
        self.run(source, Some(name))
    }

    fn run(
        mut self,
        source: &str,
        name: Option<&str>,
    ) -> std::result::Result<ParsedWorkspace, ParseError> {
        debug!(
            identifiers:? = self.options.identifiers,
            restricted = self.options.restricted,
            name:? = name;
            "Interpreting workspace source"
        );
        self.sources.push(name.map(str::to_string));
        match self
            .interpret_source(source, name)
            .and_then(|()| self.check_all_closed())
        {
            Ok(()) => Ok(ParsedWorkspace::new(
                self.builder.finish(),
                self.collector.finish(),
            )),
            Err(err) => Err(self.collector.fail(err)),
        }
    }

    fn interpret_source(&mut self, source: &str, file: Option<&str>) -> Result<()> {
        for line in logical_lines(source, file)? {
            let source_line = SourceLine::new(
                file.map(str::to_string),
                line.number,
                line.offset,
                line.text.as_str(),
            );
            self.current_line = Some(source_line.clone());
            self.interpret_line(&line, file)
                .map_err(|diag| diag.with_line(source_line))?;
        }
        Ok(())
    }

    fn interpret_line(&mut self, line: &LogicalLine, file: Option<&str>) -> Result<()> {
        let tokens = lexer::tokenize(&line.text, line.offset)?;
        if tokens.is_empty() {
            return Ok(());
        }
        let mut tokens = self.substitute_constants(tokens)?;

        if self.closed {
            return Err(Diagnostic::error("unexpected content after the workspace block")
                .with_code(ErrorCode::E104)
                .with_label(tokens.span_from(0), "outside the workspace"));
        }
        if tokens.len() == 1 && tokens.is_at(0, BLOCK_END_TOKEN) {
            return self.close_block(&tokens);
        }
        if tokens.get_or_empty(0).starts_with('!') && !tokens.token(0).is_some_and(Token::is_quoted) {
            return self.interpret_directive(&tokens, file);
        }

        let opens_block = tokens.strip_block_start();
        let statement = Statement::new(tokens, opens_block);
        trace!(
            context = self.stack.top().map_or("none", |f| f.context.name()),
            keyword = statement.keyword(),
            line = line.number;
            "Dispatching statement"
        );

        match (self.dispatch(&statement)?, opens_block) {
            (Some(context), true) => {
                self.open_block(context, line.number, statement.span());
                Ok(())
            }
            (_, false) => Ok(()),
            (None, true) => Err(Diagnostic::error("this statement cannot open a block")
                .with_code(ErrorCode::E100)
                .with_label(
                    Span::new(statement.span().end()..statement.span().end()),
                    "unexpected `{`",
                )),
        }
    }

    /// Routes a statement to the grammar of the innermost open block.
    fn dispatch(&mut self, statement: &Statement) -> Result<Option<Context>> {
        let context = self.stack.top().map(|f| f.context.clone());
        if statement.tokens.is_empty() {
            return match context {
                Some(Context::DynamicView(key) | Context::ParallelSequence(key)) => {
                    self.start_parallel_sequence(&key, statement)
                }
                _ => Err(Diagnostic::error("unexpected `{`")
                    .with_code(ErrorCode::E100)
                    .with_help("a block must follow the statement that opens it")),
            };
        }

        match context {
            None => self.parse_workspace(statement),
            Some(Context::Workspace) => self.parse_workspace_statement(statement),
            Some(
                context @ (Context::Model
                | Context::Group { .. }
                | Context::Element(_)
                | Context::DeploymentEnvironment(_)
                | Context::DeploymentNode { .. }),
            ) => self.parse_model_statement(statement, &context),
            Some(Context::Relationship(relationship)) => {
                self.parse_relationship_body(relationship, statement)
            }
            Some(Context::Properties(target)) => self.parse_property(&target, statement),
            Some(Context::Perspectives(item)) => self.parse_perspective(item, statement),
            Some(Context::Views) => self.parse_views_statement(statement),
            Some(Context::StaticView(key)) => self.parse_static_view_statement(&key, statement),
            Some(Context::DynamicView(key) | Context::ParallelSequence(key)) => {
                self.parse_dynamic_view_statement(&key, statement)
            }
            Some(Context::Styles) => self.parse_styles_statement(statement),
            Some(Context::ElementStyle(tag)) => self.parse_element_style(&tag, statement),
            Some(Context::RelationshipStyle(tag)) => {
                self.parse_relationship_style(&tag, statement)
            }
            Some(Context::Configuration) => self.parse_configuration_statement(statement),
            Some(Context::Users) => self.parse_user(statement),
        }
    }

    fn open_block(&mut self, context: Context, line: usize, span: Span) {
        let parent = self.stack.scope();
        let scope = match &context {
            Context::Element(element) | Context::DeploymentNode { element, .. } => {
                self.registry.scope_of(*element, parent)
            }
            _ => parent,
        };
        self.stack.push(context, scope, line, span);
    }

    fn close_block(&mut self, tokens: &Tokens) -> Result<()> {
        let Some(frame) = self.stack.pop() else {
            return Err(Diagnostic::error("unexpected `}` with no open block")
                .with_code(ErrorCode::E104)
                .with_label(tokens.span(0), "nothing to close"));
        };
        match frame.context {
            Context::Workspace => self.closed = true,
            Context::ParallelSequence(key) => {
                let ended = self
                    .builder
                    .end_parallel_sequence(&key)
                    .map_err(|err| model_error(err, tokens.span(0)))?;
                if !ended {
                    return Err(Diagnostic::error("a parallel sequence closed without being opened")
                        .with_code(ErrorCode::E900)
                        .with_label(tokens.span(0), "internal consistency"));
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn check_all_closed(&self) -> Result<()> {
        match self.stack.top() {
            Some(frame) => Err(Diagnostic::error(format!(
                "the {} block opened on line {} is never closed",
                frame.context, frame.line
            ))
            .with_code(ErrorCode::E103)
            .with_label(frame.span, "opened here")
            .with_help("add the missing `}`")),
            None => Ok(()),
        }
    }

    /// Records a warning against the line being interpreted.
    pub(crate) fn warn(&mut self, diagnostic: Diagnostic) -> Result<()> {
        let diagnostic = match &self.current_line {
            Some(line) => diagnostic.with_line(line.clone()),
            None => diagnostic,
        };
        self.collector.warn(diagnostic)
    }

    fn substitute_constants(&mut self, tokens: Tokens) -> Result<Tokens> {
        if !tokens.iter().any(|t| t.text().contains("${")) {
            return Ok(tokens);
        }

        let mut substituted = Vec::with_capacity(tokens.len());
        for token in tokens.iter() {
            let mut text = String::new();
            let mut rest = token.text();
            while let Some(start) = rest.find("${") {
                let Some(end) = rest[start..].find('}') else {
                    break;
                };
                let name = &rest[start + 2..start + end];
                text.push_str(&rest[..start]);
                match self.constants.get(name) {
                    Some(value) => text.push_str(value),
                    None => {
                        text.push_str(&rest[start..=start + end]);
                        self.warn(
                            Diagnostic::warning(format!("the constant `{name}` is not defined"))
                                .with_code(ErrorCode::W003)
                                .with_label(token.span(), "left as written"),
                        )?;
                    }
                }
                rest = &rest[start + end + 1..];
            }
            text.push_str(rest);
            substituted.push(Token::new(text, token.span(), token.is_quoted()));
        }
        Ok(Tokens::new(substituted))
    }

    fn interpret_directive(&mut self, tokens: &Tokens, file: Option<&str>) -> Result<()> {
        let directive = tokens.get_or_empty(0);
        trace!(directive = directive; "Interpreting directive");
        match directive {
            "!const" | "!constant" => {
                check_tokens(tokens, 2, 2, "!const <name> <value>")?;
                let name = tokens.get_or_empty(1);
                if !is_valid_identifier(name) {
                    return Err(invalid_value(
                        tokens.token(1),
                        format!("`{name}` is not a valid constant name"),
                    ));
                }
                self.constants
                    .insert(name.to_string(), tokens.get_or_empty(2).to_string());
                Ok(())
            }
            "!include" => {
                check_tokens(tokens, 1, 1, "!include <file|directory>")?;
                self.include(tokens, file)
            }
            "!adrs" => {
                check_tokens(tokens, 1, 1, "!adrs <directory>")?;
                self.import_decisions(tokens, file)
            }
            "!identifiers" => {
                check_tokens(tokens, 1, 1, "!identifiers <flat|hierarchical>")?;
                self.require_workspace_or_model(tokens)?;
                let mode: IdentifierMode = tokens
                    .get_or_empty(1)
                    .parse()
                    .map_err(|message: String| invalid_value(tokens.token(1), message))?;
                if !self.registry.set_mode(mode) {
                    return Err(invalid_value(
                        tokens.token(1),
                        "the identifier mode cannot change once identifiers have been declared",
                    ));
                }
                debug!(mode:? = mode; "Identifier mode set");
                Ok(())
            }
            "!impliedRelationships" => {
                check_tokens(tokens, 1, 1, "!impliedRelationships <true|false>")?;
                self.require_workspace_or_model(tokens)?;
                let enabled = parse_bool(tokens, 1)?;
                self.builder.set_implied_relationships(enabled);
                Ok(())
            }
            other => Err(Diagnostic::error(format!("unknown directive `{other}`"))
                .with_code(ErrorCode::E100)
                .with_label(tokens.span(0), "not recognised")
                .with_help(
                    "supported directives are !const, !include, !adrs, !identifiers and !impliedRelationships",
                )),
        }
    }

    fn require_workspace_or_model(&self, tokens: &Tokens) -> Result<()> {
        match self.stack.top().map(|f| &f.context) {
            Some(Context::Workspace | Context::Model) => Ok(()),
            other => Err(unexpected_statement(
                &Statement::new(tokens.clone(), false),
                other,
            )),
        }
    }

    fn include(&mut self, tokens: &Tokens, file: Option<&str>) -> Result<()> {
        let path = tokens.get_or_empty(1);
        if self.options.restricted {
            return Err(Diagnostic::error("!include is not permitted in restricted mode")
                .with_code(ErrorCode::E004)
                .with_label(tokens.span_from(0), "include not permitted"));
        }

        let included = self.resolver.resolve(path, file).map_err(|message| {
            Diagnostic::error(message)
                .with_code(ErrorCode::E003)
                .with_label(tokens.span(1), "cannot be read")
        })?;

        for source in included {
            let name = Some(source.name.clone());
            if self.sources.contains(&name) {
                return Err(Diagnostic::error(format!(
                    "`{}` is already being interpreted, includes cannot be cyclic",
                    source.name
                ))
                .with_code(ErrorCode::E004)
                .with_label(tokens.span(1), "include cycle"));
            }

            debug!(name = source.name.as_str(); "Including source");
            self.sources.push(name);
            let result = self.interpret_source(&source.content, Some(&source.name));
            self.sources.pop();
            result?;
        }
        Ok(())
    }

    /// Imports the decision records in a directory into the workspace, or
    /// into the software system, container or component whose block is open.
    fn import_decisions(&mut self, tokens: &Tokens, file: Option<&str>) -> Result<()> {
        let element = match self.stack.top().map(|f| &f.context) {
            Some(Context::Workspace) => None,
            Some(Context::Element(element)) => Some(*element),
            other => {
                return Err(unexpected_statement(
                    &Statement::new(tokens.clone(), false),
                    other,
                ));
            }
        };
        if self.options.restricted {
            return Err(Diagnostic::error("!adrs is not permitted in restricted mode")
                .with_code(ErrorCode::E004)
                .with_label(tokens.span_from(0), "import not permitted"));
        }

        let path = tokens.get_or_empty(1);
        let documents = self
            .resolver
            .resolve_documents(path, file, DECISION_EXTENSION)
            .map_err(|message| {
                Diagnostic::error(message)
                    .with_code(ErrorCode::E003)
                    .with_label(tokens.span(1), "cannot be read")
            })?;

        let decisions = documents
            .iter()
            .map(|document| {
                read_decision(&document.name, &document.content).map_err(|message| {
                    Diagnostic::error(message)
                        .with_code(ErrorCode::E309)
                        .with_label(tokens.span(1), ErrorCode::E309.description())
                })
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(path = path, decisions = decisions.len(); "Importing decisions");
        self.builder
            .add_decisions(element, decisions)
            .map_err(|err| model_error(err, tokens.span_from(0)))
    }

    /// Resolves a token to whatever it is bound to.
    ///
    /// `this` names the element whose block is open.
    pub(crate) fn resolve(&self, token: &Token) -> Option<Binding> {
        if token.is(THIS_KEYWORD) {
            return self.stack.enclosing_element().map(Binding::Element);
        }
        self.registry.resolve(token.text(), self.stack.scope())
    }

    /// Resolves a token that must name an element; `role` describes it in
    /// messages, e.g. "source element".
    pub(crate) fn resolve_element(&self, token: &Token, role: &str) -> Result<ElementId> {
        match self.resolve(token) {
            Some(Binding::Element(element)) => Ok(element),
            Some(Binding::Relationship(_)) => Err(Diagnostic::error(format!(
                "the {role} `{}` is a relationship, not an element",
                token.text()
            ))
            .with_code(ErrorCode::E203)
            .with_label(token.span(), "wrong kind of identifier")),
            None => Err(unknown_identifier(token, role)),
        }
    }

    pub(crate) fn resolve_relationship(&self, token: &Token) -> Result<RelationshipId> {
        match self.resolve(token) {
            Some(Binding::Relationship(relationship)) => Ok(relationship),
            Some(Binding::Element(_)) => Err(Diagnostic::error(format!(
                "`{}` is an element, not a relationship",
                token.text()
            ))
            .with_code(ErrorCode::E203)
            .with_label(token.span(), "wrong kind of identifier")),
            None => Err(unknown_identifier(token, "relationship")),
        }
    }

    /// Binds a declared entity to the identifier it was assigned. Anonymous
    /// elements get a synthesised name; anonymous relationships stay unbound.
    ///
    /// Relationship identifiers always live in the root scope, so they can be
    /// referenced from views in either identifier mode.
    pub(crate) fn bind(&mut self, identifier: Option<&Token>, binding: Binding) -> Result<()> {
        let scope = match binding {
            Binding::Relationship(_) => ScopeId::ROOT,
            Binding::Element(_) => self.stack.scope(),
        };
        match identifier {
            Some(token) if token.is(THIS_KEYWORD) => Err(registry_error(
                RegistryError::Invalid(token.text().to_string()),
                token.span(),
            )),
            Some(token) => self
                .registry
                .register(token.text(), binding, scope)
                .map(|_| ())
                .map_err(|err| registry_error(err, token.span())),
            None => {
                if let Binding::Element(element) = binding {
                    self.registry
                        .register_anonymous(element.index(), binding, scope);
                }
                Ok(())
            }
        }
    }
}

pub(crate) fn unknown_identifier(token: &Token, role: &str) -> Diagnostic {
    Diagnostic::error(format!("the {role} `{}` does not exist", token.text()))
        .with_code(ErrorCode::E200)
        .with_label(token.span(), "unknown identifier")
}

pub(crate) fn registry_error(err: RegistryError, span: Span) -> Diagnostic {
    let code = match err {
        RegistryError::Duplicate(_) => ErrorCode::E201,
        RegistryError::Invalid(_) => ErrorCode::E202,
    };
    Diagnostic::error(err.to_string())
        .with_code(code)
        .with_label(span, code.description())
}
