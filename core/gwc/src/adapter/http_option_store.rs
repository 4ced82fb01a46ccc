//! `/api/option/` を読み書きする OptionStore 実装

use common::error::Error;
use common::gateway::GatewayClient;

use crate::domain::OptionEntry;
use crate::ports::outbound::OptionStore;

pub const OPTION_PATH: &str = "/api/option/";

pub struct HttpOptionStore {
    client: GatewayClient,
}

impl HttpOptionStore {
    pub fn new(client: GatewayClient) -> Self {
        Self { client }
    }
}

impl OptionStore for HttpOptionStore {
    fn load_all(&self) -> Result<Vec<OptionEntry>, Error> {
        self.client.get_data_or_default(OPTION_PATH, &[])
    }

    fn put(&self, key: &str, value: &str) -> Result<(), Error> {
        self.client.put_json(OPTION_PATH, &OptionEntry::new(key, value))
    }
}
