//! The `Bind` trait: path resolution over a typed field tree.
//!
//! This module provides the core resolution primitive used by the
//! environment source. A key such as `DATABASE_HOST` is consumed segment by
//! segment against a structure's declared source keys until it lands on a
//! leaf, which then coerces the textual value (see [`crate::coerce`]).
//!
//! Structured types obtain an implementation with `#[derive(Bind)]` (from
//! `palimpsest-derive`); leaf scalars are implemented in [`crate::coerce`].

use crate::coerce::CoerceError;

/// Resolve a separator-joined key against this node and assign a value.
///
/// The contract mirrors a recursive descent over the field tree:
///
/// - An **empty key** addresses the node itself: leaves coerce and assign
///   `value`, structured records report an unsupported-type error.
/// - A **non-empty key** is matched against the node's fields in declaration
///   order. An exact source-key match binds that field; a
///   `source_key + sep` prefix recurses into the field with the remaining
///   suffix. The first field that accepts the key wins.
///
/// # Return value
///
/// - `Ok(true)` — the key resolved to a leaf and the value was assigned.
/// - `Ok(false)` — the key does not address anything in this subtree. This
///   is *not* an error; the caller treats the key as "not applicable here".
/// - `Err(_)` — the key resolved to a field but the value could not be
///   coerced, or the addressed node cannot accept text at all.
pub trait Bind {
    /// Resolve `key` (segments joined by `sep`) and assign `value`.
    fn bind_text(&mut self, key: &str, sep: char, value: &str) -> Result<bool, CoerceError>;
}

/// Match `key` against a field's source key.
///
/// Returns `Some("")` on an exact match, `Some(rest)` when `key` starts with
/// `source_key` followed by `sep`, and `None` otherwise.
///
/// This is the single prefix-matching rule shared by every derived
/// implementation; keeping it here means the tie-break semantics live in one
/// place.
pub fn split_key<'a>(key: &'a str, source_key: &str, sep: char) -> Option<&'a str> {
    let rest = key.strip_prefix(source_key)?;
    if rest.is_empty() {
        return Some(rest);
    }
    rest.strip_prefix(sep)
}

/// Optional owned child: the ownership indirection of the field tree.
///
/// Descending through `None` allocates a default instance first, so writes
/// deep inside an optional subtree materialize the whole chain. The
/// allocation is kept when the resolved leaf rejects the value (the caller
/// observed a real resolution), and rolled back only when the key turns out
/// not to address this subtree at all.
impl<T: Bind + Default> Bind for Option<T> {
    fn bind_text(&mut self, key: &str, sep: char, value: &str) -> Result<bool, CoerceError> {
        let was_none = self.is_none();
        let inner = self.get_or_insert_with(T::default);
        match inner.bind_text(key, sep, value) {
            Ok(false) => {
                if was_none {
                    *self = None;
                }
                Ok(false)
            }
            outcome => outcome,
        }
    }
}

impl<T: Bind> Bind for Box<T> {
    fn bind_text(&mut self, key: &str, sep: char, value: &str) -> Result<bool, CoerceError> {
        (**self).bind_text(key, sep, value)
    }
}
