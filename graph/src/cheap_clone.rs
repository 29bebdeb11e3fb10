use slog::Logger;
use std::rc::Rc;
use std::sync::Arc;

/// Things that are fast to clone in the context of an application such as
/// Quire
///
/// The purpose of this API is to reduce the number of calls to .clone()
/// which need to be audited for performance. Types implementing it are
/// reference counted or otherwise trivially copyable, so a `cheap_clone`
/// never copies the dataset or the schema.
pub trait CheapClone: Clone {
    #[inline]
    fn cheap_clone(&self) -> Self {
        self.clone()
    }
}

impl<T: ?Sized> CheapClone for Rc<T> {}
impl<T: ?Sized> CheapClone for Arc<T> {}
impl CheapClone for Logger {}
