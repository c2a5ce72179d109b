//! Diagnostic identity of a document syncer.

use std::fmt;
use target_writer::Namespace;

/// Who a document syncer is: owning table syncer, its own id, and its target.
///
/// Rendered as `tableSyncer[0] documentSyncer[3] ns[db.orders]` in every
/// log line and error the syncer emits.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SyncerIdentity {
    pub table_syncer_id: usize,
    pub id: usize,
    pub ns: Namespace,
}

impl SyncerIdentity {
    pub fn new(table_syncer_id: usize, id: usize, ns: Namespace) -> Self {
        Self {
            table_syncer_id,
            id,
            ns,
        }
    }
}

impl fmt::Display for SyncerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "tableSyncer[{}] documentSyncer[{}] ns[{}]",
            self.table_syncer_id, self.id, self.ns
        )
    }
}
