use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone, Default, Serialize)]
pub struct Stats {
    pub searches: usize,
    pub expanded_nodes: usize,
    pub aborted_searches: usize,
    pub time_us: usize,
}

impl Stats {
    pub(crate) fn print(&self) {
        info!(
            "Searches {:?} Aborted {:?} Expanded nodes {:?} Time(microseconds) {:?}",
            self.searches, self.aborted_searches, self.expanded_nodes, self.time_us
        );
    }
}
