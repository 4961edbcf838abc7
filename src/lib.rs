//! Static reflection for PHP source: locate, parse, resolve, materialize.
//!
//! Nothing is ever executed. A [`Reflector`] asks its [`SourceLocator`]
//! chain for the text declaring an [`Identifier`], parses it with the
//! tree-sitter PHP grammars and hands back owned, queryable descriptors.

pub mod config;
pub mod error;
pub mod grammar;
pub mod identifier;
pub mod located;
pub mod locator;
pub mod printer;
pub mod reflection;
pub mod reflector;
pub mod resolver;
pub mod syntax;

pub use error::Error;
pub use identifier::{Identifier, IdentifierKind};
pub use located::{Located, LocatedSource, PotentiallyLocatedSource};
pub use locator::{
    AggregateSourceLocator, ClassLoader, ClassMap, ClassMapSourceLocator, EvaledCodeRegistry,
    EvaledCodeSourceLocator, InternalSourceLocator, Psr4Loader, SingleFileSourceLocator,
    SourceLocator, StringSourceLocator,
};
pub use printer::{PrettyPrinter, StandardPrinter};
pub use reflection::{
    BodySource, ClassKind, Namespace, Reflection, ReflectionClass, ReflectionFunction,
    ReflectionParameter, Visibility,
};
pub use reflector::Reflector;
pub use resolver::Resolver;
