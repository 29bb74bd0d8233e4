//! Target resolver abstraction.
//!
//! Each [`TargetResolver`] answers for a single source of truth. Sources are
//! chained with [`PairResolver`] and [`TripleResolver`] so precedence lives
//! in the order of composition, not in branching.

use crate::descriptor::TargetDescriptor;
use crate::registry::RegistryIndex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedFrom {
    Explicit,
    InvokedName,
    Default,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub descriptor: TargetDescriptor,
    pub source:     ResolvedFrom,
}

pub trait TargetResolver {
    fn resolve(&self, index: &RegistryIndex) -> Option<Resolution>;
}

/// Resolves a single optional lookup key.
#[derive(Debug, Clone)]
pub struct KeyResolver {
    key:    Option<String>,
    source: ResolvedFrom,
}

impl KeyResolver {
    pub fn new(key: Option<String>, source: ResolvedFrom) -> Self {
        Self { key, source }
    }
}

impl TargetResolver for KeyResolver {
    fn resolve(&self, index: &RegistryIndex) -> Option<Resolution> {
        let key = self.key.as_deref()?;
        index.lookup(key).map(|descriptor| Resolution {
            descriptor,
            source: self.source,
        })
    }
}

#[derive(Clone)]
pub struct PairResolver<R1, R2> {
    primary:  R1,
    fallback: R2,
}

impl<R1, R2> PairResolver<R1, R2>
where
    R1: TargetResolver,
    R2: TargetResolver,
{
    pub fn new(primary: R1, fallback: R2) -> Self {
        Self { primary, fallback }
    }
}

impl<R1, R2> TargetResolver for PairResolver<R1, R2>
where
    R1: TargetResolver,
    R2: TargetResolver,
{
    fn resolve(&self, index: &RegistryIndex) -> Option<Resolution> {
        self.primary
            .resolve(index)
            .or_else(|| self.fallback.resolve(index))
    }
}

#[derive(Clone)]
pub struct TripleResolver<R1, R2, R3> {
    first:  R1,
    second: R2,
    third:  R3,
}

impl<R1, R2, R3> TripleResolver<R1, R2, R3>
where
    R1: TargetResolver,
    R2: TargetResolver,
    R3: TargetResolver,
{
    pub fn new(first: R1, second: R2, third: R3) -> Self {
        Self {
            first,
            second,
            third,
        }
    }
}

impl<R1, R2, R3> TargetResolver for TripleResolver<R1, R2, R3>
where
    R1: TargetResolver,
    R2: TargetResolver,
    R3: TargetResolver,
{
    fn resolve(&self, index: &RegistryIndex) -> Option<Resolution> {
        self.first
            .resolve(index)
            .or_else(|| self.second.resolve(index))
            .or_else(|| self.third.resolve(index))
    }
}

/// The lookup keys gathered for one launcher invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolveRequest {
    pub explicit:     Option<String>,
    pub invoked_name: Option<String>,
    pub default:      Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveMode {
    WithDefault,
    /// Only what the invocation itself selects.
    IgnoreDefault,
}

/// Applies the launcher's precedence: explicit, invoked name, default.
///
/// An invoked name found in `reserved` short-circuits to `None` whatever is
/// registered, so a link named after the interpreter acts as the interpreter.
#[derive(Debug, Clone)]
pub struct Resolver<'a> {
    index:    &'a RegistryIndex,
    reserved: Vec<String>,
}

impl<'a> Resolver<'a> {
    pub fn new(index: &'a RegistryIndex, reserved: Vec<String>) -> Self {
        Self { index, reserved }
    }

    pub fn is_reserved(&self, name: Option<&str>) -> bool {
        name.is_some_and(|name| self.reserved.iter().any(|r| r == name))
    }

    pub fn resolve(&self, request: &ResolveRequest, mode: ResolveMode) -> Option<Resolution> {
        if self.is_reserved(request.invoked_name.as_deref()) {
            return None;
        }

        let explicit = KeyResolver::new(request.explicit.clone(), ResolvedFrom::Explicit);
        let invoked = KeyResolver::new(request.invoked_name.clone(), ResolvedFrom::InvokedName);
        match mode {
            ResolveMode::IgnoreDefault => PairResolver::new(explicit, invoked).resolve(self.index),
            ResolveMode::WithDefault => {
                let default = KeyResolver::new(request.default.clone(), ResolvedFrom::Default);
                TripleResolver::new(explicit, invoked, default).resolve(self.index)
            }
        }
    }
}
