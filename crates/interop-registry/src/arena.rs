//! DeclArena - the declaration store of a translation unit.
//!
//! Declarations are appended and never reordered; a [`DeclId`] is an index
//! into the arena. Beside the declarations sit their canonical [`TypeHash`]es
//! and a name index from qualified spelling (`ns::Foo`, `ns::Foo<int, 4>`) to
//! id for every type declaration. Functions are stored but not indexed.
//!
//! # Transactions
//!
//! Instantiation may append declarations and complete previously declared
//! specializations in place. [`DeclArena::checkpoint`] opens a transaction;
//! [`DeclArena::rollback`] restores the arena to the checkpoint, and
//! [`DeclArena::commit`] keeps the changes. Transactions nest; the undo log
//! is dropped when the outermost one commits.

use rustc_hash::FxHashMap;

use interop_core::{Decl, DeclId, DeclNames, RecordEntry, SemaError, Span, TypeHash};

/// A point the arena can be rolled back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "a checkpoint must be committed or rolled back"]
pub struct Checkpoint {
    len: usize,
    undo_len: usize,
}

impl Checkpoint {
    /// Number of declarations the arena held when the checkpoint was taken.
    #[inline]
    pub fn decl_count(&self) -> usize {
        self.len
    }
}

#[derive(Debug, Clone)]
enum UndoEntry {
    /// A pre-existing record was replaced; holds its previous state.
    Record { id: DeclId, previous: Box<RecordEntry> },
}

/// Append-only declaration storage with a name index.
#[derive(Debug, Default, Clone)]
pub struct DeclArena {
    decls: Vec<Decl>,
    /// Canonical hash of each declaration, parallel to `decls`.
    hashes: Vec<TypeHash>,
    by_name: FxHashMap<String, DeclId>,
    undo: Vec<UndoEntry>,
    open_transactions: usize,
}

impl DeclArena {
    pub fn new() -> Self {
        Self::default()
    }

    // ==========================================================================
    // Access
    // ==========================================================================

    #[inline]
    pub fn len(&self) -> usize {
        self.decls.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    pub fn get(&self, id: DeclId) -> Option<&Decl> {
        self.decls.get(id.index())
    }

    pub fn record(&self, id: DeclId) -> Option<&RecordEntry> {
        self.get(id).and_then(Decl::as_record)
    }

    /// Look up a type declaration by its qualified spelling.
    pub fn lookup(&self, qualified: &str) -> Option<DeclId> {
        self.by_name.get(qualified).copied()
    }

    pub fn hash_of(&self, id: DeclId) -> Option<TypeHash> {
        self.hashes.get(id.index()).copied()
    }

    /// All declarations with their ids, in arena order.
    pub fn iter(&self) -> impl Iterator<Item = (DeclId, &Decl)> {
        self.decls
            .iter()
            .enumerate()
            .map(|(i, decl)| (DeclId::new(i as u32), decl))
    }

    pub fn records(&self) -> impl Iterator<Item = (DeclId, &RecordEntry)> {
        self.iter()
            .filter_map(|(id, decl)| decl.as_record().map(|record| (id, record)))
    }

    // ==========================================================================
    // Registration
    // ==========================================================================

    /// Append a declaration under `hash`.
    ///
    /// Type declarations are indexed by their qualified name; a second type
    /// with the same name is a redefinition.
    pub fn insert(&mut self, decl: Decl, hash: TypeHash) -> Result<DeclId, SemaError> {
        let id = DeclId::new(self.decls.len() as u32);
        if decl.is_type() {
            let key = decl.name().to_string();
            if self.by_name.contains_key(&key) {
                return Err(SemaError::Redefinition {
                    name: key,
                    span: decl.span(),
                });
            }
            self.by_name.insert(key, id);
        }
        tracing::trace!(%id, kind = decl.kind_name(), name = %decl.name(), "registered declaration");
        self.decls.push(decl);
        self.hashes.push(hash);
        Ok(id)
    }

    /// Replace the record at `id` through `update`, logging its previous
    /// state when a transaction is open.
    pub fn update_record<R>(
        &mut self,
        id: DeclId,
        span: Span,
        update: impl FnOnce(&mut RecordEntry) -> R,
    ) -> Result<R, SemaError> {
        let logging = self.in_transaction();
        let Some(record) = self.decls.get_mut(id.index()).and_then(Decl::as_record_mut) else {
            return Err(SemaError::NotAType {
                name: id.to_string(),
                span,
            });
        };
        if logging {
            self.undo.push(UndoEntry::Record {
                id,
                previous: Box::new(record.clone()),
            });
        }
        Ok(update(record))
    }

    /// Mutable access to a declaration outside any transaction, for filling
    /// in definitions while a unit is being built.
    pub fn get_mut(&mut self, id: DeclId) -> Option<&mut Decl> {
        debug_assert!(!self.in_transaction(), "untracked mutation inside a transaction");
        self.decls.get_mut(id.index())
    }

    // ==========================================================================
    // Transactions
    // ==========================================================================

    pub fn checkpoint(&mut self) -> Checkpoint {
        self.open_transactions += 1;
        Checkpoint {
            len: self.decls.len(),
            undo_len: self.undo.len(),
        }
    }

    pub fn in_transaction(&self) -> bool {
        self.open_transactions > 0
    }

    /// Keep every change made since `checkpoint`.
    pub fn commit(&mut self, checkpoint: Checkpoint) {
        debug_assert!(checkpoint.len <= self.decls.len());
        self.open_transactions = self.open_transactions.saturating_sub(1);
        if self.open_transactions == 0 {
            self.undo.clear();
        }
    }

    /// Undo every change made since `checkpoint`: appended declarations are
    /// removed together with their index entries, replaced records get
    /// their previous state back.
    pub fn rollback(&mut self, checkpoint: Checkpoint) {
        while self.undo.len() > checkpoint.undo_len {
            let Some(entry) = self.undo.pop() else { break };
            match entry {
                UndoEntry::Record { id, previous } => {
                    if let Some(Decl::Record(record)) = self.decls.get_mut(id.index()) {
                        *record = *previous;
                    }
                }
            }
        }

        let removed = self.decls.len().saturating_sub(checkpoint.len);
        self.hashes.truncate(checkpoint.len);
        for decl in self.decls.drain(checkpoint.len..) {
            if decl.is_type() {
                self.by_name.remove(&decl.name().to_string());
            }
        }
        self.open_transactions = self.open_transactions.saturating_sub(1);
        tracing::debug!(removed, len = checkpoint.len, "rolled back declaration arena");
    }
}

impl DeclNames for DeclArena {
    fn decl_name(&self, id: DeclId) -> String {
        self.get(id)
            .map(|decl| decl.name().to_string())
            .unwrap_or_else(|| format!("<invalid {}>", id))
    }

    fn decl_hash(&self, id: DeclId) -> TypeHash {
        self.hash_of(id).unwrap_or(TypeHash::EMPTY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use interop_core::{
        AliasEntry, BuiltinKind, FunctionEntry, QualifiedName, RecordLayout, RecordTag, Ty,
    };
    use pretty_assertions::assert_eq;

    fn record(name: &str) -> Decl {
        Decl::Record(RecordEntry::new(
            QualifiedName::global(name),
            RecordTag::Struct,
            Span::default(),
        ))
    }

    fn insert_record(arena: &mut DeclArena, name: &str) -> DeclId {
        arena
            .insert(record(name), TypeHash::from_name(name))
            .expect("fresh name")
    }

    #[test]
    fn insert_and_lookup() {
        let mut arena = DeclArena::new();
        let foo = insert_record(&mut arena, "Foo");
        let bar = arena
            .insert(
                Decl::Record(RecordEntry::new(
                    QualifiedName::new(vec!["ns".into()], "Bar"),
                    RecordTag::Class,
                    Span::default(),
                )),
                TypeHash::from_name("ns::Bar"),
            )
            .expect("fresh name");

        assert_eq!(arena.len(), 2);
        assert_eq!(arena.lookup("Foo"), Some(foo));
        assert_eq!(arena.lookup("ns::Bar"), Some(bar));
        assert_eq!(arena.lookup("Bar"), None);
        assert_eq!(arena.hash_of(bar), Some(TypeHash::from_name("ns::Bar")));
        assert_eq!(arena.decl_name(bar), "ns::Bar");
    }

    #[test]
    fn redefinition_is_rejected() {
        let mut arena = DeclArena::new();
        insert_record(&mut arena, "Foo");
        let err = arena
            .insert(record("Foo"), TypeHash::from_name("Foo"))
            .unwrap_err();
        assert!(matches!(err, SemaError::Redefinition { ref name, .. } if name == "Foo"));
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn functions_are_not_indexed() {
        let mut arena = DeclArena::new();
        let function = FunctionEntry {
            name: QualifiedName::global("foo"),
            return_type: Ty::Builtin(BuiltinKind::Int),
            params: vec![],
            has_body: true,
            span: Span::default(),
        };
        arena
            .insert(Decl::Function(function.clone()), TypeHash::from_name("foo"))
            .expect("functions never clash");
        arena
            .insert(Decl::Function(function), TypeHash::from_name("foo"))
            .expect("overloads are allowed");
        assert_eq!(arena.lookup("foo"), None);
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn rollback_truncates_and_purges_indexes() {
        let mut arena = DeclArena::new();
        insert_record(&mut arena, "Foo");

        let checkpoint = arena.checkpoint();
        insert_record(&mut arena, "Foo<int>");
        arena
            .insert(
                Decl::Alias(AliasEntry::new(
                    QualifiedName::global("Int"),
                    Ty::Builtin(BuiltinKind::Int),
                    Span::default(),
                )),
                TypeHash::from_name("Int"),
            )
            .expect("fresh name");
        assert_eq!(arena.len(), 3);

        arena.rollback(checkpoint);
        assert_eq!(arena.len(), 1);
        assert_eq!(arena.lookup("Foo<int>"), None);
        assert_eq!(arena.lookup("Int"), None);
        assert_eq!(arena.hash_of(DeclId::new(1)), None);
        assert!(!arena.in_transaction());

        // The freed names can be registered again.
        insert_record(&mut arena, "Foo<int>");
    }

    #[test]
    fn rollback_restores_updated_records() {
        let mut arena = DeclArena::new();
        let foo = insert_record(&mut arena, "Foo");

        let checkpoint = arena.checkpoint();
        arena
            .update_record(foo, Span::default(), |record| {
                record.complete(RecordLayout {
                    size: 4,
                    align: 4,
                    field_offsets: vec![0],
                    has_vtable_pointer: false,
                })
            })
            .expect("record");
        assert!(arena.record(foo).is_some_and(RecordEntry::is_complete));

        arena.rollback(checkpoint);
        assert!(arena.record(foo).is_some_and(|r| !r.is_complete()));
    }

    #[test]
    fn nested_transactions() {
        let mut arena = DeclArena::new();
        let outer = arena.checkpoint();
        insert_record(&mut arena, "A");

        let inner = arena.checkpoint();
        insert_record(&mut arena, "B");
        arena.commit(inner);
        assert!(arena.in_transaction());

        // Rolling back the outer transaction discards the committed inner one.
        arena.rollback(outer);
        assert!(arena.is_empty());
        assert_eq!(arena.lookup("B"), None);
    }

    #[test]
    fn commit_keeps_changes() {
        let mut arena = DeclArena::new();
        let checkpoint = arena.checkpoint();
        let a = insert_record(&mut arena, "A");
        arena
            .update_record(a, Span::default(), |record| record.span = Span::new(1, 1, 1))
            .expect("record");
        arena.commit(checkpoint);

        assert!(!arena.in_transaction());
        assert_eq!(arena.lookup("A"), Some(a));
        assert_eq!(arena.record(a).map(|r| r.span), Some(Span::new(1, 1, 1)));
    }

    #[test]
    fn update_rejects_non_records() {
        let mut arena = DeclArena::new();
        let alias = arena
            .insert(
                Decl::Alias(AliasEntry::new(
                    QualifiedName::global("Int"),
                    Ty::Builtin(BuiltinKind::Int),
                    Span::default(),
                )),
                TypeHash::from_name("Int"),
            )
            .expect("fresh name");
        assert!(arena.update_record(alias, Span::default(), |_| ()).is_err());
    }
}
