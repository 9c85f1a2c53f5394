//! Parse and compile queries for the command line

use crate::{
    Compiler, CompileOptions, Filter, Placeholder, Query, RawNode, Registry, mapping::parse_mapping,
    parser::parse_string,
};

use super::CliError;

/// Options shared by the check and compile commands
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// The query text (string grammar, or JSON when `mapping` is set)
    pub query: String,
    /// Treat the query as a JSON mapping
    pub mapping: bool,
}

/// Result of a check operation
#[derive(Debug)]
pub enum CheckResult {
    /// Blank query, nothing to parse
    Blank,
    /// Syntax is valid; the raw tree
    Parsed(RawNode),
}

/// Options for the compile command
#[derive(Debug, Clone, Default)]
pub struct CompileCommand {
    pub check: CheckOptions,
    /// Emit `$1`-style placeholders
    pub numbered: bool,
    /// Swallow query errors and return a match-nothing filter
    pub safe: bool,
}

fn to_query(options: &CheckOptions) -> Result<Query, CliError> {
    if options.mapping {
        let value: serde_json::Value = serde_json::from_str(&options.query)?;
        Ok(Query::Mapping(value))
    } else {
        Ok(Query::Text(options.query.clone()))
    }
}

/// Validate query syntax without a registry
pub fn execute_check(options: &CheckOptions) -> Result<CheckResult, CliError> {
    let query = to_query(options)?;
    if query.is_blank() {
        return Ok(CheckResult::Blank);
    }

    let node = match &query {
        Query::Text(text) => parse_string(text)?,
        Query::Mapping(value) => parse_mapping(value)?,
    };
    Ok(CheckResult::Parsed(node))
}

/// Compile a query against a registry
pub fn execute_compile<R: Registry + ?Sized>(
    command: &CompileCommand,
    registry: &R,
) -> Result<Filter, CliError> {
    let query = to_query(&command.check)?;
    let options = CompileOptions {
        placeholder: if command.numbered {
            Placeholder::Numbered
        } else {
            Placeholder::Question
        },
        ..CompileOptions::default()
    };
    let compiler = Compiler::new(options);

    if command.safe {
        Ok(compiler.search(query, registry))
    } else {
        Ok(compiler.compile(query, registry)?)
    }
}
