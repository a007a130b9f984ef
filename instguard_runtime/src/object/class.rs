//! Class object implementation.
//!
//! A `ClassObject` represents a user-defined class. It contains:
//! - The class identity and its qualified name
//! - Direct base classes
//! - Method Resolution Order (ancestors and their identities)
//! - Class attributes (methods, nested classes, class variables)
//! - Flags describing where the class was defined
//!
//! # Architecture
//!
//! ```text
//! ClassObject
//! ├── id: ClassId (unique per class)
//! ├── qualname: QualName (Outer.Inner)
//! ├── bases: SmallVec<Arc<ClassObject>; 2>
//! ├── ancestors: Vec<Arc<ClassObject>> (MRO without the class itself)
//! ├── mro: SmallVec<ClassId; 8> (MRO identities, for subclass checks)
//! ├── flags: ClassFlags
//! └── dict: ClassDict (class attributes)
//! ```
//!
//! Bases and MRO are immutable after construction; only the attribute
//! dictionary may change, under its own lock.

use crate::call::{CallArgs, CallError, CallResult};
use crate::object::instance::Instance;
use crate::object::mro::{ClassError, ClassId, Mro, linearize};
use crate::types::qualname::QualName;
use crate::value::Value;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;

// =============================================================================
// Class Flags
// =============================================================================

bitflags::bitflags! {
    /// Flags describing class capabilities and origin.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ClassFlags: u32 {
        /// Class body was evaluated inside another class body.
        const NESTED = 1 << 0;
        /// Class was defined in a function's local scope.
        const LOCAL = 1 << 1;
        /// Class cannot be subclassed.
        const FINAL = 1 << 2;
    }
}

// =============================================================================
// Class Dictionary
// =============================================================================

/// Class attribute dictionary.
#[derive(Debug, Default)]
pub struct ClassDict {
    attrs: RwLock<FxHashMap<Arc<str>, Value>>,
}

impl ClassDict {
    /// Create a new empty class dict.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get an attribute.
    #[inline]
    pub fn get(&self, name: &str) -> Option<Value> {
        self.attrs.read().get(name).cloned()
    }

    /// Set an attribute.
    #[inline]
    pub fn set(&self, name: Arc<str>, value: Value) {
        self.attrs.write().insert(name, value);
    }

    /// Delete an attribute.
    #[inline]
    pub fn delete(&self, name: &str) -> Option<Value> {
        self.attrs.write().remove(name)
    }

    /// Check if attribute exists.
    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.attrs.read().contains_key(name)
    }

    /// All attribute names, sorted.
    pub fn keys(&self) -> Vec<Arc<str>> {
        let mut keys: Vec<Arc<str>> = self.attrs.read().keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Number of attributes.
    pub fn len(&self) -> usize {
        self.attrs.read().len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.attrs.read().is_empty()
    }
}

/// Inline storage for direct bases; most classes have one or two.
pub type Bases = SmallVec<[Arc<ClassObject>; 2]>;

// =============================================================================
// Class Object
// =============================================================================

/// A user-defined class.
pub struct ClassObject {
    id: ClassId,
    qualname: QualName,
    bases: Bases,
    ancestors: Vec<Arc<ClassObject>>,
    mro: Mro,
    flags: ClassFlags,
    dict: ClassDict,
}

impl ClassObject {
    /// Create a class with the given qualified name and bases.
    ///
    /// Fails if a base is final, a base is repeated, or the bases admit no
    /// consistent MRO.
    pub fn new(
        qualname: QualName,
        bases: &[Arc<ClassObject>],
        flags: ClassFlags,
    ) -> Result<Arc<Self>, ClassError> {
        if let Some(base) = bases.iter().find(|b| b.is_final()) {
            return Err(ClassError::FinalBase {
                name: base.name().to_string(),
            });
        }

        let ancestors = linearize(bases)?;
        let id = ClassId::allocate();

        let mut mro = Mro::with_capacity(ancestors.len() + 1);
        mro.push(id);
        mro.extend(ancestors.iter().map(|c| c.id()));

        Ok(Arc::new(Self {
            id,
            qualname,
            bases: bases.iter().cloned().collect(),
            ancestors,
            mro,
            flags,
            dict: ClassDict::new(),
        }))
    }

    /// Create a top-level class with the given bases.
    pub fn with_bases(name: &str, bases: &[Arc<ClassObject>]) -> Result<Arc<Self>, ClassError> {
        Self::new(QualName::top_level(name), bases, ClassFlags::empty())
    }

    /// Create a top-level class with no bases.
    pub fn new_simple(name: &str) -> Arc<Self> {
        let id = ClassId::allocate();
        let mut mro = Mro::new();
        mro.push(id);

        Arc::new(Self {
            id,
            qualname: QualName::top_level(name),
            bases: SmallVec::new(),
            ancestors: Vec::new(),
            mro,
            flags: ClassFlags::empty(),
            dict: ClassDict::new(),
        })
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Class identity.
    #[inline]
    pub fn id(&self) -> ClassId {
        self.id
    }

    /// Short class name (`__name__`).
    #[inline]
    pub fn name(&self) -> &str {
        self.qualname.name()
    }

    /// Qualified class name (`__qualname__`).
    #[inline]
    pub fn qualname(&self) -> &QualName {
        &self.qualname
    }

    /// Direct bases in declaration order.
    #[inline]
    pub fn bases(&self) -> &[Arc<ClassObject>] {
        &self.bases
    }

    /// Ancestors in MRO order, excluding this class.
    #[inline]
    pub fn ancestors(&self) -> &[Arc<ClassObject>] {
        &self.ancestors
    }

    /// MRO identities, this class first.
    #[inline]
    pub fn mro(&self) -> &[ClassId] {
        &self.mro
    }

    /// Class flags.
    #[inline]
    pub fn flags(&self) -> ClassFlags {
        self.flags
    }

    /// Check if the class is final.
    #[inline]
    pub fn is_final(&self) -> bool {
        self.flags.contains(ClassFlags::FINAL)
    }

    /// Attribute dictionary.
    #[inline]
    pub fn dict(&self) -> &ClassDict {
        &self.dict
    }

    // =========================================================================
    // Attribute Access
    // =========================================================================

    /// Attribute defined directly on this class.
    #[inline]
    pub fn get_own_attr(&self, name: &str) -> Option<Value> {
        self.dict.get(name)
    }

    /// Look up an attribute by walking the MRO.
    pub fn get_attr(&self, name: &str) -> Option<Value> {
        self.dict
            .get(name)
            .or_else(|| self.ancestors.iter().find_map(|c| c.dict.get(name)))
    }

    /// Set a class attribute.
    #[inline]
    pub fn set_attr(&self, name: impl Into<Arc<str>>, value: Value) {
        self.dict.set(name.into(), value);
    }

    /// Delete a class attribute.
    #[inline]
    pub fn del_attr(&self, name: &str) -> Option<Value> {
        self.dict.delete(name)
    }

    /// Check if the attribute is reachable through the MRO.
    pub fn has_attr(&self, name: &str) -> bool {
        self.get_attr(name).is_some()
    }

    // =========================================================================
    // Subtyping
    // =========================================================================

    /// Check if this class is `other` or derives from it.
    #[inline]
    pub fn is_subclass_of(&self, other: &ClassObject) -> bool {
        self.mro.contains(&other.id)
    }

    // =========================================================================
    // Calls
    // =========================================================================

    /// Create an instance with an empty attribute dict.
    pub fn new_instance(self: &Arc<Self>) -> Arc<Instance> {
        Arc::new(Instance::new(self.clone()))
    }

    /// Call an attribute looked up on the class without binding a
    /// receiver, i.e. `Class.attr(*args)`.
    pub fn call_attr(&self, name: &str, args: &CallArgs) -> CallResult<Value> {
        let attr = self.get_attr(name).ok_or_else(|| CallError::AttributeError {
            owner: Arc::from(format!("type object '{}'", self.qualname)),
            attr: Arc::from(name),
        })?;
        call_value(&attr, args)
    }
}

/// Call a value with the given arguments.
///
/// Functions run their body; calling a class creates an instance.
pub(crate) fn call_value(value: &Value, args: &CallArgs) -> CallResult<Value> {
    match value {
        Value::Function(func) => func.call(args),
        Value::Class(class) => Ok(Value::Instance(class.new_instance())),
        other => Err(CallError::NotCallable {
            type_name: Arc::from(other.type_name()),
        }),
    }
}

/// Classes compare by identity.
impl PartialEq for ClassObject {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ClassObject {}

impl fmt::Debug for ClassObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassObject")
            .field("id", &self.id)
            .field("qualname", &self.qualname)
            .field("mro", &self.mro)
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
