//! Compile entry points.
//!
//! ```
//! use attr_search::{AttributeRegistry, Filter, search};
//!
//! let registry = AttributeRegistry::builder("User")
//!     .searchable("name", ["first_name", "last_name"])
//!     .build()
//!     .unwrap();
//!
//! let Filter::Where(filter) = search("name:Al", &registry) else {
//!     panic!("expected a constraint");
//! };
//! assert_eq!(filter.sql, "(users.first_name = ? OR users.last_name = ?)");
//! ```

use serde::Deserialize;
use tracing::{debug, trace, warn};

use crate::{
    ast::{Query, RawNode},
    emitter::{Emitter, Placeholder, SqlFilter},
    error::SearchError,
    lexer::Lexer,
    mapping::MappingParser,
    optimizer::optimize,
    parser::{DEFAULT_MAX_DEPTH, Parser},
    registry::Registry,
    resolver::Resolver,
};

/// Outcome of compiling a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// No constraint: the caller returns the unfiltered result set.
    All,
    /// Matches no rows.
    Nothing,
    /// A WHERE fragment with bound parameters.
    Where(SqlFilter),
}

impl Filter {
    /// SQL text usable in a WHERE clause for every variant.
    pub fn sql(&self) -> &str {
        match self {
            Filter::All => "1 = 1",
            Filter::Nothing => "1 = 0",
            Filter::Where(filter) => &filter.sql,
        }
    }

    pub fn params(&self) -> &[crate::value::Value] {
        match self {
            Filter::Where(filter) => &filter.params,
            _ => &[],
        }
    }

    pub fn is_unconstrained(&self) -> bool {
        matches!(self, Filter::All)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompileOptions {
    pub placeholder: Placeholder,
    /// Maximum nesting of groups, negations and mappings.
    pub max_depth: usize,
}

impl Default for CompileOptions {
    fn default() -> Self {
        CompileOptions {
            placeholder: Placeholder::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Runs parse → resolve → optimize → emit with fixed options.
#[derive(Debug, Clone, Copy, Default)]
pub struct Compiler {
    options: CompileOptions,
}

impl Compiler {
    pub fn new(options: CompileOptions) -> Self {
        Compiler { options }
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Parse either query form into a raw tree.
    pub fn parse(&self, query: &Query) -> Result<RawNode, SearchError> {
        let node = match query {
            Query::Text(text) => Parser::new(Lexer::new(text))?
                .with_max_depth(self.options.max_depth)
                .parse()?,
            Query::Mapping(value) => MappingParser::new()
                .with_max_depth(self.options.max_depth)
                .parse(value)?,
        };
        Ok(node)
    }

    /// Compile a query, reporting the precise failure.
    pub fn compile<R: Registry + ?Sized>(
        &self,
        query: impl Into<Query>,
        registry: &R,
    ) -> Result<Filter, SearchError> {
        let query = query.into();
        if query.is_blank() {
            debug!("blank search query; no constraint applied");
            return Ok(Filter::All);
        }
        if !registry.has_attributes() {
            return Err(SearchError::NoSearchableAttributes);
        }

        let raw = self.parse(&query)?;
        trace!(?raw, "parsed search query");

        let resolved = Resolver::new(registry).resolve(&raw)?;
        let optimized = optimize(resolved);
        trace!(?optimized, "optimized search query");

        let filter = if optimized.is_always() {
            Filter::All
        } else if optimized.is_never() {
            Filter::Nothing
        } else {
            Filter::Where(Emitter::new(self.options.placeholder).emit(&optimized))
        };
        debug!(
            sql = filter.sql(),
            params = filter.params().len(),
            "compiled search query"
        );
        Ok(filter)
    }

    /// Compile a query; any runtime query error yields [`Filter::Nothing`].
    pub fn search<R: Registry + ?Sized>(&self, query: impl Into<Query>, registry: &R) -> Filter {
        self.compile(query, registry).unwrap_or_else(|error| {
            warn!(%error, "search query rejected; matching no rows");
            Filter::Nothing
        })
    }
}

/// [`Compiler::compile`] with default options.
pub fn compile<R: Registry + ?Sized>(
    query: impl Into<Query>,
    registry: &R,
) -> Result<Filter, SearchError> {
    Compiler::default().compile(query, registry)
}

/// [`Compiler::search`] with default options.
pub fn search<R: Registry + ?Sized>(query: impl Into<Query>, registry: &R) -> Filter {
    Compiler::default().search(query, registry)
}
