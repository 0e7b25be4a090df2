//! Record sink that keeps everything in memory.

use crate::domain::{AutoCreationRecord, NodeStakeUpdateRecord, TransferListRecord};
use crate::ports::RecordsHistorian;

/// Appends records to public vectors in arrival order. Used by tests and by
/// deployments that serialize the records elsewhere after each round.
#[derive(Debug, Default)]
pub struct InMemoryHistorian {
    pub transfer_lists: Vec<TransferListRecord>,
    pub node_stake_updates: Vec<NodeStakeUpdateRecord>,
    pub auto_creations: Vec<AutoCreationRecord>,
}

impl RecordsHistorian for InMemoryHistorian {
    fn record_transfer_list(&mut self, record: TransferListRecord) {
        self.transfer_lists.push(record);
    }

    fn record_node_stakes(&mut self, record: NodeStakeUpdateRecord) {
        self.node_stake_updates.push(record);
    }

    fn record_auto_creation(&mut self, record: AutoCreationRecord) {
        self.auto_creations.push(record);
    }
}
