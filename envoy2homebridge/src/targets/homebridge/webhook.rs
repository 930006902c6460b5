use crate::{
    error::{BridgeError, Result},
    grid_state::GridState,
    targets::notifier::Notifier,
};

use log::debug;
use reqwest::blocking::{Client, Response};
use serde_derive::Serialize;

/// Body understood by the homebridge-dummy webhook endpoint.
#[derive(Debug, Serialize)]
struct SetCharacteristic<'a> {
    id: &'a str,
    set: &'static str,
    value: bool,
}

pub struct HomebridgeWebhook {
    client: Client,
    url: String,
    accessory_id: String,
}

impl HomebridgeWebhook {
    pub fn new(client: Client, url: &str, accessory_id: &str) -> Self {
        Self {
            client,
            url: url.to_string(),
            accessory_id: accessory_id.to_string(),
        }
    }
}

impl Notifier for HomebridgeWebhook {
    fn notify(&mut self, grid_state: &GridState) -> Result<()> {
        let body = SetCharacteristic {
            id: &self.accessory_id,
            set: "On",
            value: grid_state.is_on(),
        };
        debug!("Posting {body:?} to {}", self.url);

        self.client
            .post(&self.url)
            .json(&body)
            .send()
            .and_then(Response::error_for_status)
            .map_err(|source| BridgeError::Notify {
                url: self.url.clone(),
                source,
            })?;
        Ok(())
    }
}
