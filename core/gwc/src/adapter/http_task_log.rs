//! `/api/task/` `/api/task/self` を読む TaskLog 実装

use common::error::Error;
use common::gateway::GatewayClient;

use crate::domain::{TaskQuery, TaskRecord, TaskScope};
use crate::ports::outbound::TaskLog;

pub struct HttpTaskLog {
    client: GatewayClient,
}

impl HttpTaskLog {
    pub fn new(client: GatewayClient) -> Self {
        Self { client }
    }
}

impl TaskLog for HttpTaskLog {
    fn list(&self, scope: TaskScope, query: &TaskQuery) -> Result<Vec<TaskRecord>, Error> {
        self.client
            .get_data_or_default(scope.path(), &query.to_pairs())
    }
}
