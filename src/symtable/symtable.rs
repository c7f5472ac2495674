use std::collections::BTreeMap;
use std::fmt::Display;
use std::io::{self, Write};

use crate::errors::errors::{Diagnostics, SemanticError};
use crate::types::types::TypeSig;
use crate::Location;

/// Index of a scope in the arena. Allocation order makes the index a
/// unique, monotonically increasing id, which the dump and the local
/// identifier mangling both rely on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(pub usize);

impl Display for ScopeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The symbol table of one lexical block.
///
/// `subscopes` serves two purposes: a function or struct name maps to
/// the scope holding its parameters or fields, and a block scope is
/// keyed by its own stringified id so `if`/`while` bodies can be
/// re-entered by the id recorded on the node.
#[derive(Debug)]
pub struct Scope {
    pub id: ScopeId,
    pub parent: Option<ScopeId>,
    mapping: BTreeMap<String, TypeSig>,
    decls: BTreeMap<String, Location>,
    subscopes: BTreeMap<String, ScopeId>,
}

/// Arena of all scopes of a compilation unit. Scopes are created during
/// the build pass and never removed.
#[derive(Debug, Default)]
pub struct ScopeTable {
    scopes: Vec<Scope>,
}

/// The two scope forests of a compilation unit: values/functions rooted
/// at `globals`, struct definitions rooted at `types`. One arena backs
/// both, so scope ids are unique across the whole unit.
#[derive(Debug)]
pub struct Scopes {
    pub table: ScopeTable,
    pub globals: ScopeId,
    pub types: ScopeId,
}

impl ScopeTable {
    pub fn new() -> Self {
        ScopeTable { scopes: Vec::new() }
    }

    pub fn new_root(&mut self) -> ScopeId {
        self.new_scope(None)
    }

    fn new_scope(&mut self, parent: Option<ScopeId>) -> ScopeId {
        let id = ScopeId(self.scopes.len());
        self.scopes.push(Scope {
            id,
            parent,
            mapping: BTreeMap::new(),
            decls: BTreeMap::new(),
            subscopes: BTreeMap::new(),
        });
        log::trace!("created scope {} (parent {:?})", id, parent);
        id
    }

    fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0]
    }

    pub fn parent(&self, id: ScopeId) -> Option<ScopeId> {
        self.scope(id).parent
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Adds a symbol with its type to `scope`.
    pub fn add_symbol(&mut self, scope: ScopeId, name: &str, sig: TypeSig, decl: Location) {
        let scope = &mut self.scopes[scope.0];
        scope.mapping.insert(name.to_string(), sig);
        scope.decls.insert(name.to_string(), decl);
    }

    /// Registers a function (or struct) in `scope` and creates the child
    /// scope that will hold its parameters (or fields), keyed by name so
    /// the definition and its scope can be found from each other.
    pub fn enter_function(
        &mut self,
        scope: ScopeId,
        name: &str,
        sig: TypeSig,
        decl: Location,
    ) -> ScopeId {
        self.add_symbol(scope, name, sig, decl);
        let child = self.new_scope(Some(scope));
        self.scopes[scope.0].subscopes.insert(name.to_string(), child);
        child
    }

    /// Creates an anonymous block scope beneath `scope`, keyed by the
    /// child's own stringified id.
    pub fn enter_block(&mut self, scope: ScopeId) -> ScopeId {
        let child = self.new_scope(Some(scope));
        self.scopes[scope.0]
            .subscopes
            .insert(child.id_key(), child);
        child
    }

    /// Looks `name` up in `scope` and all surrounding scopes. Reports an
    /// unknown-identifier diagnostic and returns the unknown sentinel if
    /// the root is reached without a match.
    pub fn lookup(
        &self,
        scope: ScopeId,
        name: &str,
        location: Location,
        diags: &mut Diagnostics,
    ) -> TypeSig {
        match self.lookup_quiet(scope, name) {
            Some(sig) => sig,
            None => {
                diags.report(
                    SemanticError::UnknownIdentifier {
                        name: name.to_string(),
                    },
                    location,
                );
                TypeSig::Unknown
            }
        }
    }

    /// The code generator's re-lookup: same chain walk, no diagnostic.
    pub fn lookup_quiet(&self, scope: ScopeId, name: &str) -> Option<TypeSig> {
        let mut current = Some(scope);
        while let Some(id) = current {
            if let Some(sig) = self.scope(id).mapping.get(name) {
                return Some(sig.clone());
            }
            current = self.scope(id).parent;
        }
        None
    }

    /// Finds the child scope registered under `name` among the *current*
    /// scope's subscopes (not the parent chain); used to step into a
    /// function's parameter scope or a struct's field scope.
    pub fn function_scope(
        &self,
        scope: ScopeId,
        name: &str,
        location: Location,
        diags: &mut Diagnostics,
    ) -> Option<ScopeId> {
        let found = self.function_scope_quiet(scope, name);
        if found.is_none() {
            diags.report(
                SemanticError::UnknownParameterScope {
                    name: name.to_string(),
                },
                location,
            );
        }
        found
    }

    pub fn function_scope_quiet(&self, scope: ScopeId, name: &str) -> Option<ScopeId> {
        self.scope(scope).subscopes.get(name).copied()
    }

    /// Re-enters the block scope created for an `if`/`while` body during
    /// the build pass, addressed by the id recorded on the node.
    pub fn block_scope(&self, scope: ScopeId, block: ScopeId) -> Option<ScopeId> {
        self.scope(scope).subscopes.get(&block.id_key()).copied()
    }

    /// True if `name` is declared in the root scope of the chain.
    pub fn is_global(&self, scope: ScopeId, name: &str) -> bool {
        let mut id = scope;
        while let Some(parent) = self.scope(id).parent {
            id = parent;
        }
        self.scope(id).mapping.contains_key(name)
    }

    /// True if `name` is declared in some enclosing non-root scope.
    pub fn is_local(&self, scope: ScopeId, name: &str) -> bool {
        let mut current = Some(scope);
        while let Some(id) = current {
            if self.scope(id).mapping.contains_key(name) && self.scope(id).parent.is_some() {
                return true;
            }
            current = self.scope(id).parent;
        }
        false
    }

    /// The scope on the parent chain that declares `name`, used for
    /// local identifier mangling.
    pub fn defining_scope(&self, scope: ScopeId, name: &str) -> Option<ScopeId> {
        let mut current = Some(scope);
        while let Some(id) = current {
            if self.scope(id).mapping.contains_key(name) {
                return Some(id);
            }
            current = self.scope(id).parent;
        }
        None
    }

    /// Walks outwards to find the function whose scope encloses `scope`
    /// and returns its signature.
    pub fn parent_function(&self, scope: ScopeId) -> Option<TypeSig> {
        let mut inner = scope;
        let mut current = self.scope(scope).parent;
        while let Some(id) = current {
            let candidate = self.scope(id);
            for (name, &sub) in &candidate.subscopes {
                if sub == inner && candidate.mapping.contains_key(name) {
                    return Some(candidate.mapping[name].clone());
                }
            }
            inner = id;
            current = candidate.parent;
        }
        None
    }

    /// Symbols of `scope` in sorted order, for the emission passes.
    pub fn symbols(&self, scope: ScopeId) -> impl Iterator<Item = (&String, &TypeSig)> {
        self.scope(scope).mapping.iter()
    }

    /// Dumps `scope` and all its inner scopes as an indented listing of
    /// the form `name (file.line.column) {scopeId} type`. Function and
    /// struct subscopes are listed inline after their symbol, remaining
    /// block subscopes afterwards.
    pub fn dump(&self, out: &mut impl Write, root: ScopeId, depth: usize) -> io::Result<()> {
        let scope = self.scope(root);
        for (name, sig) in &scope.mapping {
            let decl = scope.decls.get(name).copied().unwrap_or(Location::null());
            writeln!(
                out,
                "{:indent$}{} ({}) {{{}}} {}",
                "",
                name,
                decl,
                scope.id,
                sig,
                indent = 3 * depth
            )?;
            if let Some(&sub) = scope.subscopes.get(name) {
                self.dump(out, sub, depth + 1)?;
            }
        }
        for (key, &sub) in &scope.subscopes {
            if !scope.mapping.contains_key(key) {
                self.dump(out, sub, depth + 1)?;
            }
        }
        Ok(())
    }
}

impl ScopeId {
    fn id_key(&self) -> String {
        self.0.to_string()
    }
}
