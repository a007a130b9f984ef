//! Class identity and C3 method resolution order.
//!
//! The MRO of a class is the class itself followed by the C3 merge of its
//! bases' MROs and the base list:
//!
//! ```text
//! L[C(B1, B2)] = C + merge(L[B1], L[B2], [B1, B2])
//! ```
//!
//! Each step picks the first head that does not appear in the tail of any
//! remaining list; if no such head exists the hierarchy is inconsistent.

use crate::object::class::ClassObject;
use smallvec::SmallVec;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use thiserror::Error;

// =============================================================================
// Class Identity
// =============================================================================

/// Global counter for allocating class identities.
static NEXT_CLASS_ID: AtomicU32 = AtomicU32::new(1);

/// Process-unique identity of a class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(u32);

impl ClassId {
    /// Allocate a fresh identity.
    pub(crate) fn allocate() -> Self {
        Self(NEXT_CLASS_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw identity value.
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }
}

/// Linearized class identities, the class itself first.
///
/// Most hierarchies are shallow, so this rarely spills to the heap.
pub type Mro = SmallVec<[ClassId; 8]>;

// =============================================================================
// Errors
// =============================================================================

/// Errors while creating a class.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassError {
    /// The same base appears twice in the base list.
    #[error("duplicate base class {name}")]
    DuplicateBase { name: String },

    /// C3 merge found no valid head.
    #[error("Cannot create a consistent method resolution order (MRO) for bases {bases}")]
    InconsistentMro { bases: String },

    /// A base class is marked final.
    #[error("type '{name}' is not an acceptable base type")]
    FinalBase { name: String },
}

// =============================================================================
// C3 Linearization
// =============================================================================

/// Compute the ancestors of a new class with the given bases, in MRO
/// order, excluding the class itself.
pub fn linearize(bases: &[Arc<ClassObject>]) -> Result<Vec<Arc<ClassObject>>, ClassError> {
    for (i, base) in bases.iter().enumerate() {
        if bases[..i].iter().any(|b| b.id() == base.id()) {
            return Err(ClassError::DuplicateBase {
                name: base.name().to_string(),
            });
        }
    }

    let mut sequences: Vec<Vec<Arc<ClassObject>>> = bases
        .iter()
        .map(|base| {
            let mut seq = Vec::with_capacity(base.ancestors().len() + 1);
            seq.push(base.clone());
            seq.extend(base.ancestors().iter().cloned());
            seq
        })
        .collect();
    sequences.push(bases.to_vec());

    let mut result = Vec::new();
    loop {
        sequences.retain(|seq| !seq.is_empty());
        if sequences.is_empty() {
            return Ok(result);
        }

        let candidate = sequences
            .iter()
            .map(|seq| &seq[0])
            .find(|head| {
                !sequences
                    .iter()
                    .any(|seq| seq[1..].iter().any(|c| c.id() == head.id()))
            })
            .cloned();

        let Some(next) = candidate else {
            let names: Vec<&str> = bases.iter().map(|b| b.name()).collect();
            return Err(ClassError::InconsistentMro {
                bases: names.join(", "),
            });
        };

        for seq in &mut sequences {
            if seq[0].id() == next.id() {
                seq.remove(0);
            }
        }
        result.push(next);
    }
}
