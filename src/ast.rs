//! # Search Query Language - Abstract Syntax Tree
//!
//! This module defines the trees a search query passes through on its way
//! from caller input to a parameterized SQL filter.
//!
//! ## Architecture Overview
//!
//! - **[tokens]** - Lexical tokens produced by the lexer
//! - **[operators]** - Comparison operators shared by both input forms
//! - **[raw]** - Pre-resolution tree over logical attribute keys
//! - **[resolved]** - Post-resolution tree over physical columns
//! - **[query]** - The two caller input forms (text and mapping)
//!
//! ## Quick Start
//!
//! ```text
//! name:"john" AND (age>30 OR active:true)
//! ```
//!
//! parses to
//!
//! ```text
//! And[ name eq "john", Or[ age gt "30", active eq "true" ] ]
//! ```
//!
//! and, once `name` maps to `users.first_name` and `users.last_name`, resolves to
//!
//! ```text
//! And[ Or[ users.first_name = 'john', users.last_name = 'john' ],
//!      Or[ users.age > 30, users.active = true ] ]
//! ```
//!
//! ## Core Concepts
//!
//! ### Logical keys vs. columns
//!
//! Query authors only ever see logical keys. A key may stand for several
//! columns; a comparison on it matches when any of those columns matches.
//!
//! ### Bare terms
//!
//! A term with no key (`john`) is matched against every default attribute:
//! substring match on text attributes, equality elsewhere.
//!
//! ### Constants
//!
//! There are no boolean literals in the tree. `And[]` is always true and
//! `Or[]` is always false, the identity elements of each connective.
pub mod operators;
pub mod query;
pub mod raw;
pub mod resolved;
pub mod tokens;

pub use operators::Operator;
pub use query::Query;
pub use raw::{Comparison, RawNode};
pub use resolved::{Column, ColumnComparison, ResolvedNode};
pub use tokens::Token;
