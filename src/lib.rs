pub mod ast;
pub mod cli;
pub mod emitter;
pub mod error;
pub mod lexer;
pub mod mapping;
pub mod optimizer;
pub mod parser;
pub mod registry;
pub mod resolver;
pub mod search;
pub mod value;

pub use ast::{Column, Operator, Query, RawNode, ResolvedNode, Token};
pub use emitter::{Emitter, Placeholder, SqlFilter, emit};
pub use error::{SearchError, SpecificationError};
pub use lexer::{LexError, Lexer, Position};
pub use mapping::{MappingParser, parse_mapping};
pub use optimizer::optimize;
pub use parser::{ParseError, Parser, parse_string};
pub use registry::{AttributeOptions, AttributeRegistry, PhysicalColumn, Registry, RegistryConfig};
pub use resolver::{Resolver, resolve};
pub use search::{CompileOptions, Compiler, Filter, compile, search};
pub use value::{ColumnType, Literal, Value};
