// src/ir/types.rs
//
// Interned type system using TypeId handles for O(1) equality and minimal
// allocations. Mirrors of the same type structure always intern to the same
// TypeId, so the wrapper pass can compare actual and formal types directly.

use hashbrown::HashMap;
use smallvec::SmallVec;

use crate::ir::intern::Symbol;

/// Concrete type identity in the TypeArena.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct TypeId(u32);

impl TypeId {
    /// Get the raw index (for debugging/serialization)
    pub fn index(self) -> u32 {
        self.0
    }
}

/// Identity for a nominal type definition (record or class).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeDefId(u32);

impl TypeDefId {
    pub fn index(self) -> u32 {
        self.0
    }
}

/// SmallVec for type children - inline up to 4 (covers most tuples)
pub type TypeIdVec = SmallVec<[TypeId; 4]>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    Bool,
    Int,
    Uint,
    Real,
}

/// Nominal type kind for Record/Class discrimination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NominalKind {
    Record,
    Class,
}

/// Internal representation of interned types.
///
/// Uses TypeId for children instead of recursive references, which keeps
/// the enum Copy-sized and lets SmallVec work.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum InternedType {
    Primitive(PrimitiveType),

    Void,
    Any,
    Str,
    CStr,

    // compile-time tokens threaded through method/default machinery
    MethodToken,
    TypeDefaultToken,
    // tag type for leader/follower iteration tokens
    IterKind,
    // opaque record produced by iterator lowering for a yielded sequence
    IteratorRecord,

    Ref(TypeId),
    Sync(TypeId),
    Single(TypeId),
    Tuple(TypeIdVec),

    // record-wrapped collection types
    Array { elem: TypeId },
    Domain,

    Record(TypeDefId),
    Class(TypeDefId),
}

/// A field of a nominal type.
#[derive(Debug, Clone)]
pub struct FieldDef {
    pub name: Symbol,
    pub ty: TypeId,
}

/// A nominal type definition: fields in declaration order plus an optional
/// dispatch parent (classes only).
#[derive(Debug, Clone)]
pub struct TypeDef {
    pub name: Symbol,
    pub kind: NominalKind,
    pub fields: Vec<FieldDef>,
    pub parent: Option<TypeDefId>,
    /// Record-wrapped nominals behave like arrays/domains for promotion
    /// and constructor wiring (they carry a runtime descriptor record).
    pub record_wrapped: bool,
}

/// Pre-interned builtin types for O(1) access
#[derive(Debug, Clone, Copy)]
pub struct BuiltinTypes {
    pub bool_: TypeId,
    pub int: TypeId,
    pub uint: TypeId,
    pub real: TypeId,
    pub void: TypeId,
    pub any: TypeId,
    pub str_: TypeId,
    pub c_str: TypeId,
    pub method_token: TypeId,
    pub type_default_token: TypeId,
    pub iter_kind: TypeId,
    pub iterator_record: TypeId,
    pub domain: TypeId,
}

/// Per-compilation type arena with automatic interning/deduplication.
pub struct TypeArena {
    /// Interned types, indexed by TypeId
    types: Vec<InternedType>,
    /// Deduplication map - hashbrown for better perf
    intern_map: HashMap<InternedType, TypeId>,
    /// Nominal definitions, indexed by TypeDefId
    defs: Vec<TypeDef>,
    /// Pre-interned builtins for O(1) access
    pub builtins: BuiltinTypes,
}

impl TypeArena {
    pub fn new() -> Self {
        let mut arena = Self {
            types: Vec::new(),
            intern_map: HashMap::new(),
            defs: Vec::new(),
            builtins: BuiltinTypes {
                bool_: TypeId(0),
                int: TypeId(0),
                uint: TypeId(0),
                real: TypeId(0),
                void: TypeId(0),
                any: TypeId(0),
                str_: TypeId(0),
                c_str: TypeId(0),
                method_token: TypeId(0),
                type_default_token: TypeId(0),
                iter_kind: TypeId(0),
                iterator_record: TypeId(0),
                domain: TypeId(0),
            },
        };

        arena.builtins = BuiltinTypes {
            bool_: arena.intern(InternedType::Primitive(PrimitiveType::Bool)),
            int: arena.intern(InternedType::Primitive(PrimitiveType::Int)),
            uint: arena.intern(InternedType::Primitive(PrimitiveType::Uint)),
            real: arena.intern(InternedType::Primitive(PrimitiveType::Real)),
            void: arena.intern(InternedType::Void),
            any: arena.intern(InternedType::Any),
            str_: arena.intern(InternedType::Str),
            c_str: arena.intern(InternedType::CStr),
            method_token: arena.intern(InternedType::MethodToken),
            type_default_token: arena.intern(InternedType::TypeDefaultToken),
            iter_kind: arena.intern(InternedType::IterKind),
            iterator_record: arena.intern(InternedType::IteratorRecord),
            domain: arena.intern(InternedType::Domain),
        };

        arena
    }

    pub fn intern(&mut self, ty: InternedType) -> TypeId {
        if let Some(&id) = self.intern_map.get(&ty) {
            return id;
        }

        let id = TypeId(self.types.len() as u32);
        self.types.push(ty.clone());
        self.intern_map.insert(ty, id);
        id
    }

    pub fn get(&self, id: TypeId) -> &InternedType {
        &self.types[id.0 as usize]
    }

    // ===== Constructors =====

    pub fn make_ref(&mut self, ty: TypeId) -> TypeId {
        // refs of refs collapse
        if self.is_ref(ty) {
            return ty;
        }
        self.intern(InternedType::Ref(ty))
    }

    pub fn sync(&mut self, ty: TypeId) -> TypeId {
        self.intern(InternedType::Sync(ty))
    }

    pub fn single(&mut self, ty: TypeId) -> TypeId {
        self.intern(InternedType::Single(ty))
    }

    pub fn array(&mut self, elem: TypeId) -> TypeId {
        self.intern(InternedType::Array { elem })
    }

    pub fn tuple(&mut self, elems: TypeIdVec) -> TypeId {
        self.intern(InternedType::Tuple(elems))
    }

    /// Declare a new nominal type and intern its handle.
    pub fn declare(
        &mut self,
        name: Symbol,
        kind: NominalKind,
        fields: Vec<FieldDef>,
        parent: Option<TypeDefId>,
        record_wrapped: bool,
    ) -> (TypeDefId, TypeId) {
        let def_id = TypeDefId(self.defs.len() as u32);
        self.defs.push(TypeDef {
            name,
            kind,
            fields,
            parent,
            record_wrapped,
        });
        let ty = match kind {
            NominalKind::Record => self.intern(InternedType::Record(def_id)),
            NominalKind::Class => self.intern(InternedType::Class(def_id)),
        };
        (def_id, ty)
    }

    pub fn def(&self, id: TypeDefId) -> &TypeDef {
        &self.defs[id.0 as usize]
    }

    // ===== Queries =====

    pub fn is_ref(&self, ty: TypeId) -> bool {
        matches!(self.get(ty), InternedType::Ref(_))
    }

    pub fn is_sync(&self, ty: TypeId) -> bool {
        matches!(self.get(ty), InternedType::Sync(_))
    }

    pub fn is_single(&self, ty: TypeId) -> bool {
        matches!(self.get(ty), InternedType::Single(_))
    }

    pub fn is_tuple(&self, ty: TypeId) -> bool {
        matches!(self.get(ty), InternedType::Tuple(_))
    }

    pub fn is_str(&self, ty: TypeId) -> bool {
        matches!(self.get(ty), InternedType::Str)
    }

    pub fn is_c_str(&self, ty: TypeId) -> bool {
        matches!(self.get(ty), InternedType::CStr)
    }

    pub fn is_iterator_record(&self, ty: TypeId) -> bool {
        matches!(self.get(ty), InternedType::IteratorRecord)
    }

    /// Arrays, domains, and record-wrapped nominals carry a runtime
    /// descriptor record and get special treatment in defaults and
    /// promotion.
    pub fn is_record_wrapped(&self, ty: TypeId) -> bool {
        match self.get(ty) {
            InternedType::Array { .. } | InternedType::Domain => true,
            InternedType::Record(def) => self.def(*def).record_wrapped,
            _ => false,
        }
    }

    /// Aggregate types fold blank intent to const-ref; everything else
    /// binds by value.
    pub fn is_aggregate(&self, ty: TypeId) -> bool {
        matches!(
            self.get(ty),
            InternedType::Array { .. }
                | InternedType::Domain
                | InternedType::Record(_)
                | InternedType::Tuple(_)
                | InternedType::Str
                | InternedType::Sync(_)
                | InternedType::Single(_)
        )
    }

    /// Strip one level of reference; identity for non-references.
    pub fn val_type(&self, ty: TypeId) -> TypeId {
        match self.get(ty) {
            InternedType::Ref(inner) => *inner,
            _ => ty,
        }
    }

    /// Element type of a collection (through one reference level).
    pub fn element_type(&self, ty: TypeId) -> Option<TypeId> {
        match self.get(self.val_type(ty)) {
            InternedType::Array { elem } => Some(*elem),
            _ => None,
        }
    }

    /// Find the nominal def behind a record/class type.
    pub fn nominal_def(&self, ty: TypeId) -> Option<TypeDefId> {
        match self.get(self.val_type(ty)) {
            InternedType::Record(def) | InternedType::Class(def) => Some(*def),
            _ => None,
        }
    }

    /// Look up a field by name, walking the parent chain; returns the
    /// defining type together with the field's type. Constructor wiring
    /// only applies when the owner is the constructed type itself.
    pub fn field_owner(&self, def: TypeDefId, name: Symbol) -> Option<(TypeDefId, TypeId)> {
        let mut cur = Some(def);
        while let Some(d) = cur {
            let td = self.def(d);
            if let Some(field) = td.fields.iter().find(|f| f.name == name) {
                return Some((d, field.ty));
            }
            cur = td.parent;
        }
        None
    }

    /// Human-readable type name for diagnostics.
    pub fn describe(&self, ty: TypeId, names: &crate::ir::intern::Interner) -> String {
        match self.get(ty) {
            InternedType::Primitive(PrimitiveType::Bool) => "bool".into(),
            InternedType::Primitive(PrimitiveType::Int) => "int".into(),
            InternedType::Primitive(PrimitiveType::Uint) => "uint".into(),
            InternedType::Primitive(PrimitiveType::Real) => "real".into(),
            InternedType::Void => "void".into(),
            InternedType::Any => "any".into(),
            InternedType::Str => "string".into(),
            InternedType::CStr => "c_string".into(),
            InternedType::MethodToken => "method-token".into(),
            InternedType::TypeDefaultToken => "type-default-token".into(),
            InternedType::IterKind => "iter-kind".into(),
            InternedType::IteratorRecord => "iterator-record".into(),
            InternedType::Ref(inner) => format!("ref({})", self.describe(*inner, names)),
            InternedType::Sync(inner) => format!("sync({})", self.describe(*inner, names)),
            InternedType::Single(inner) => format!("single({})", self.describe(*inner, names)),
            InternedType::Tuple(elems) => {
                let parts: Vec<String> = elems.iter().map(|e| self.describe(*e, names)).collect();
                format!("({})", parts.join(", "))
            }
            InternedType::Array { elem } => format!("[{}]", self.describe(*elem, names)),
            InternedType::Domain => "domain".into(),
            InternedType::Record(def) | InternedType::Class(def) => {
                names.resolve(self.def(*def).name).to_string()
            }
        }
    }

    /// Walk the class dispatch-parent chain from `child` looking for
    /// `parent`.
    pub fn has_dispatch_parent(&self, child: TypeId, parent: TypeId) -> bool {
        let mut cur = match self.get(self.val_type(child)) {
            InternedType::Class(def) => self.def(*def).parent,
            _ => None,
        };
        while let Some(d) = cur {
            let candidate = InternedType::Class(d);
            if let Some(&id) = self.intern_map.get(&candidate) {
                if id == self.val_type(parent) {
                    return true;
                }
            }
            cur = self.def(d).parent;
        }
        false
    }
}

impl Default for TypeArena {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::intern::Interner;

    #[test]
    fn interning_deduplicates() {
        let mut arena = TypeArena::new();
        let int = arena.builtins.int;
        let a = arena.array(int);
        let b = arena.array(int);
        assert_eq!(a, b);

        let real = arena.builtins.real;
        let c = arena.array(real);
        assert_ne!(a, c);
    }

    #[test]
    fn ref_and_val_round_trip() {
        let mut arena = TypeArena::new();
        let int = arena.builtins.int;
        let r = arena.make_ref(int);
        assert!(arena.is_ref(r));
        assert_eq!(arena.val_type(r), int);
        // refs collapse
        assert_eq!(arena.make_ref(r), r);
    }

    #[test]
    fn record_wrapped_classification() {
        let mut arena = TypeArena::new();
        let int = arena.builtins.int;
        let arr = arena.array(int);
        assert!(arena.is_record_wrapped(arr));
        assert!(arena.is_record_wrapped(arena.builtins.domain));
        assert!(!arena.is_record_wrapped(int));
    }

    #[test]
    fn field_owner_walks_parents() {
        let mut arena = TypeArena::new();
        let mut names = Interner::new();
        let int = arena.builtins.int;

        let x = names.intern("x");
        let y = names.intern("y");
        let (base_def, _base_ty) = arena.declare(
            names.intern("Base"),
            NominalKind::Class,
            vec![FieldDef { name: x, ty: int }],
            None,
            false,
        );
        let (child_def, _child_ty) = arena.declare(
            names.intern("Child"),
            NominalKind::Class,
            vec![FieldDef { name: y, ty: int }],
            Some(base_def),
            false,
        );

        let (owner, ty) = arena.field_owner(child_def, x).unwrap();
        assert_eq!(owner, base_def);
        assert_eq!(ty, int);
        let (owner, _) = arena.field_owner(child_def, y).unwrap();
        assert_eq!(owner, child_def);
    }

    #[test]
    fn dispatch_parent_chain() {
        let mut arena = TypeArena::new();
        let mut names = Interner::new();

        let (base_def, base_ty) =
            arena.declare(names.intern("Base"), NominalKind::Class, vec![], None, false);
        let (_mid_def, mid_ty) = arena.declare(
            names.intern("Mid"),
            NominalKind::Class,
            vec![],
            Some(base_def),
            false,
        );

        assert!(arena.has_dispatch_parent(mid_ty, base_ty));
        assert!(!arena.has_dispatch_parent(base_ty, mid_ty));
    }
}
