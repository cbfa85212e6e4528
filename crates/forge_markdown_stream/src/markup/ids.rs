use uuid::Uuid;

/// Generates placeholder element ids.
///
/// Each generator owns a random namespace; ids are v5 uuids of the block's
/// ordinal and payload within that namespace. Re-rendering the same prefix
/// with the same generator therefore yields the same ids, while two
/// generators never collide in practice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaceholderIds {
    namespace: Uuid,
}

impl Default for PlaceholderIds {
    fn default() -> Self {
        Self::new(Uuid::new_v4())
    }
}

impl PlaceholderIds {
    pub fn new(namespace: Uuid) -> Self {
        Self { namespace }
    }

    pub fn id(&self, kind: &str, ordinal: usize, payload: &str) -> String {
        let name = format!("{ordinal}:{kind}:{payload}");
        let id = Uuid::new_v5(&self.namespace, name.as_bytes());
        format!("{kind}-{}", id.simple())
    }
}
