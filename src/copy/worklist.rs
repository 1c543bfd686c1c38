use super::ObjectHandle;

/// Objects whose destination slot exists but whose body is still uncopied.
///
/// Processed last-in first-out. Each handle is pushed exactly once per
/// campaign because pushes only happen when a source number is first mapped.
#[derive(Debug, Default)]
pub(crate) struct Worklist {
    pending: Vec<ObjectHandle>,
}

impl Worklist {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, handle: ObjectHandle) {
        self.pending.push(handle);
    }

    pub(crate) fn pop(&mut self) -> Option<ObjectHandle> {
        self.pending.pop()
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.pending.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
