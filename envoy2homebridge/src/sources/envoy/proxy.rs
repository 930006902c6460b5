use crate::error::{BridgeError, Result};
use crate::grid_state::GridState;
use crate::sources::grid_source::{GridSource, NetworkState};
use log::{debug, info};
use reqwest::blocking::{Client, Response};
use serde_derive::Deserialize;

/// The subset of the envoyproxy status document we care about.
#[derive(Debug, Deserialize)]
struct EnvoyStatus {
    #[serde(default)]
    grid_state: Option<GridState>,
}

pub struct EnvoyProxy {
    client: Client,
    url: String,
    state: NetworkState,
}

impl EnvoyProxy {
    pub fn new(client: Client, url: &str) -> Self {
        Self {
            client,
            url: url.to_string(),
            state: NetworkState::Unknown,
        }
    }

    pub fn network_state(&self) -> NetworkState {
        self.state
    }

    fn set_state(&mut self, new_state: NetworkState) {
        if self.state != new_state {
            self.state = new_state;
            info!("Envoy proxy is {new_state:?}");
        }
    }
}

impl GridSource for EnvoyProxy {
    fn fetch_grid_state(&mut self) -> Result<Option<GridState>> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .and_then(Response::error_for_status);

        let response = match response {
            Ok(response) => response,
            Err(source) => {
                self.set_state(NetworkState::Offline);
                return Err(BridgeError::Fetch {
                    url: self.url.clone(),
                    source,
                });
            }
        };
        self.set_state(NetworkState::Online);

        let status: EnvoyStatus = response.json().map_err(|source| BridgeError::Parse {
            url: self.url.clone(),
            source,
        })?;
        debug!("envoyproxy reports {status:?}");

        Ok(status.grid_state)
    }
}

#[cfg(test)]
mod test {
    use super::EnvoyProxy;
    use crate::error::BridgeError;
    use crate::grid_state::GridState;
    use crate::sources::grid_source::{GridSource, NetworkState};
    use mockito::Server;
    use reqwest::blocking::Client;
    use serde_json::json;

    fn proxy_for(server: &mockito::ServerGuard) -> EnvoyProxy {
        EnvoyProxy::new(Client::new(), &format!("{}/status", server.url()))
    }

    #[test]
    fn test_reads_grid_state() {
        let mut server = Server::new();
        let mock = server
            .mock("GET", "/status")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({"grid_state": "multimode-ongrid", "soc": 87}).to_string())
            .create();

        let mut proxy = proxy_for(&server);
        let state = proxy.fetch_grid_state().unwrap();

        assert_eq!(state, Some(GridState::from("multimode-ongrid")));
        assert_eq!(proxy.network_state(), NetworkState::Online);
        mock.assert();
    }

    #[test]
    fn test_missing_grid_state_is_none() {
        let mut server = Server::new();
        let mock = server
            .mock("GET", "/status")
            .with_status(200)
            .with_body(json!({"production": 1200}).to_string())
            .create();

        let mut proxy = proxy_for(&server);

        assert_eq!(proxy.fetch_grid_state().unwrap(), None);
        mock.assert();
    }

    #[test]
    fn test_error_status_is_fetch_error() {
        let mut server = Server::new();
        let mock = server.mock("GET", "/status").with_status(502).create();

        let mut proxy = proxy_for(&server);
        let result = proxy.fetch_grid_state();

        assert!(matches!(result, Err(BridgeError::Fetch { .. })));
        assert_eq!(proxy.network_state(), NetworkState::Offline);
        mock.assert();
    }

    #[test]
    fn test_unreachable_host_is_fetch_error() {
        // port 9 (discard) is not expected to be listening on loopback
        let mut proxy = EnvoyProxy::new(Client::new(), "http://127.0.0.1:9/status");

        assert!(matches!(
            proxy.fetch_grid_state(),
            Err(BridgeError::Fetch { .. })
        ));
    }

    #[test]
    fn test_garbage_body_is_parse_error() {
        let mut server = Server::new();
        let mock = server
            .mock("GET", "/status")
            .with_status(200)
            .with_body("<html>not json</html>")
            .create();

        let mut proxy = proxy_for(&server);

        assert!(matches!(
            proxy.fetch_grid_state(),
            Err(BridgeError::Parse { .. })
        ));
        mock.assert();
    }

    #[test]
    fn test_non_string_grid_state_is_parse_error() {
        let mut server = Server::new();
        server
            .mock("GET", "/status")
            .with_status(200)
            .with_body(json!({"grid_state": 1}).to_string())
            .create();

        let mut proxy = proxy_for(&server);

        assert!(matches!(
            proxy.fetch_grid_state(),
            Err(BridgeError::Parse { .. })
        ));
    }
}
