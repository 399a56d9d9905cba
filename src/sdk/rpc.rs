//! Minimal read-only JSON-RPC client for a Solana-compatible node.
//!
//! Only the three account-reading methods the pool loaders need are
//! implemented. Account data is always requested base64-encoded.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use reqwest::Url;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use super::SdkError;
use crate::domain::Pubkey;

/// Commitment level used for every read.
pub const COMMITMENT: &str = "confirmed";

/// An on-chain account as returned by the node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    /// Address of the account.
    pub address: Pubkey,
    /// Owning program.
    pub owner: Pubkey,
    /// Raw account data.
    pub data: Vec<u8>,
}

impl Account {
    /// Fails unless the account is owned by `program`.
    ///
    /// # Errors
    ///
    /// Returns [`SdkError::WrongOwner`] on mismatch.
    pub fn expect_owner(self, program: &Pubkey) -> Result<Self, SdkError> {
        if self.owner == *program {
            Ok(self)
        } else {
            Err(SdkError::WrongOwner {
                account: self.address,
                expected_owner: *program,
            })
        }
    }
}

/// Filter for `getProgramAccounts`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountFilter {
    /// Account data length must equal the value.
    DataSize(usize),
    /// Bytes at `offset` must equal `bytes`.
    Memcmp {
        /// Byte offset into the account data.
        offset: usize,
        /// Expected bytes.
        bytes: Vec<u8>,
    },
}

impl AccountFilter {
    fn to_json(&self) -> Value {
        match self {
            Self::DataSize(size) => json!({ "dataSize": size }),
            Self::Memcmp { offset, bytes } => json!({
                "memcmp": { "offset": offset, "bytes": bs58::encode(bytes).into_string() }
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct WithContext<T> {
    value: T,
}

#[derive(Debug, Deserialize)]
struct UiAccount {
    owner: String,
    data: (String, String),
}

#[derive(Debug, Deserialize)]
struct KeyedUiAccount {
    pubkey: String,
    account: UiAccount,
}

impl UiAccount {
    fn decode(self, address: Pubkey) -> Result<Account, SdkError> {
        let (encoded, encoding) = self.data;
        if encoding != "base64" {
            return Err(SdkError::invalid_data(
                address,
                format!("unexpected encoding {encoding}"),
            ));
        }
        let data = STANDARD
            .decode(encoded)
            .map_err(|e| SdkError::invalid_data(address, format!("base64: {e}")))?;
        Ok(Account {
            address,
            owner: Pubkey::from_base58(&self.owner)?,
            data,
        })
    }
}

/// Read-only connection to a node, built fresh for each request.
#[derive(Debug, Clone)]
pub struct RpcConnection {
    client: reqwest::Client,
    url: Url,
}

impl RpcConnection {
    /// Validates `node_url` and prepares an HTTP client for it. No network
    /// traffic happens until the first call.
    ///
    /// # Errors
    ///
    /// Returns [`SdkError::InvalidNodeUrl`] if the URL does not parse or is
    /// not http(s).
    pub fn new(node_url: &str) -> Result<Self, SdkError> {
        let url = Url::parse(node_url).map_err(|e| SdkError::InvalidNodeUrl {
            url: node_url.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(SdkError::InvalidNodeUrl {
                url: node_url.to_string(),
                reason: format!("unsupported scheme {}", url.scheme()),
            });
        }
        Ok(Self {
            client: reqwest::Client::new(),
            url,
        })
    }

    /// The node endpoint.
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, SdkError> {
        let payload = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });
        tracing::debug!(method, url = %self.url, "rpc call");
        let response: RpcResponse<T> = self
            .client
            .post(self.url.clone())
            .json(&payload)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        if let Some(err) = response.error {
            return Err(SdkError::Rpc {
                code: err.code,
                message: err.message,
            });
        }
        response.result.ok_or_else(|| SdkError::Rpc {
            code: 0,
            message: format!("{method}: response has neither result nor error"),
        })
    }

    /// Fetches one account, `None` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`SdkError`] on transport, RPC or decoding failure.
    pub async fn get_account(&self, address: &Pubkey) -> Result<Option<Account>, SdkError> {
        let params = json!([
            address.to_base58(),
            { "encoding": "base64", "commitment": COMMITMENT }
        ]);
        let result: WithContext<Option<UiAccount>> = self.call("getAccountInfo", params).await?;
        result.value.map(|ui| ui.decode(*address)).transpose()
    }

    /// Fetches an account that must exist.
    ///
    /// # Errors
    ///
    /// Returns [`SdkError::AccountNotFound`] if it is missing.
    pub async fn require_account(&self, address: &Pubkey) -> Result<Account, SdkError> {
        self.get_account(address)
            .await?
            .ok_or(SdkError::AccountNotFound(*address))
    }

    /// Fetches several accounts in one round trip, all of which must exist.
    /// The result is in the same order as `addresses`.
    ///
    /// # Errors
    ///
    /// Returns [`SdkError::AccountNotFound`] for the first missing account.
    pub async fn require_accounts(&self, addresses: &[Pubkey]) -> Result<Vec<Account>, SdkError> {
        let keys: Vec<String> = addresses.iter().map(Pubkey::to_base58).collect();
        let params = json!([keys, { "encoding": "base64", "commitment": COMMITMENT }]);
        let result: WithContext<Vec<Option<UiAccount>>> =
            self.call("getMultipleAccounts", params).await?;
        if result.value.len() != addresses.len() {
            return Err(SdkError::Rpc {
                code: 0,
                message: format!(
                    "getMultipleAccounts returned {} accounts for {} keys",
                    result.value.len(),
                    addresses.len()
                ),
            });
        }
        addresses
            .iter()
            .zip(result.value)
            .map(|(address, ui)| {
                ui.ok_or(SdkError::AccountNotFound(*address))?
                    .decode(*address)
            })
            .collect()
    }

    /// Lists accounts owned by `program` matching every filter.
    ///
    /// # Errors
    ///
    /// Returns [`SdkError`] on transport, RPC or decoding failure.
    pub async fn get_program_accounts(
        &self,
        program: &Pubkey,
        filters: &[AccountFilter],
    ) -> Result<Vec<Account>, SdkError> {
        let filters: Vec<Value> = filters.iter().map(AccountFilter::to_json).collect();
        let params = json!([
            program.to_base58(),
            { "encoding": "base64", "commitment": COMMITMENT, "filters": filters }
        ]);
        let accounts: Vec<KeyedUiAccount> = self.call("getProgramAccounts", params).await?;
        accounts
            .into_iter()
            .map(|keyed| {
                let address = Pubkey::from_base58(&keyed.pubkey)?;
                keyed.account.decode(address)
            })
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn accepts_http_and_https() {
        assert!(RpcConnection::new("http://127.0.0.1:8899").is_ok());
        let Ok(conn) = RpcConnection::new("https://api.mainnet-beta.solana.com") else {
            panic!("valid url");
        };
        assert_eq!(conn.url().host_str(), Some("api.mainnet-beta.solana.com"));
    }

    #[test]
    fn rejects_garbage_and_other_schemes() {
        assert!(matches!(
            RpcConnection::new("not a url"),
            Err(SdkError::InvalidNodeUrl { .. })
        ));
        assert!(matches!(
            RpcConnection::new("ws://127.0.0.1:8900"),
            Err(SdkError::InvalidNodeUrl { .. })
        ));
    }

    #[test]
    fn memcmp_filter_is_base58() {
        let filter = AccountFilter::Memcmp {
            offset: 24,
            bytes: vec![0u8; 32],
        };
        assert_eq!(
            filter.to_json(),
            json!({ "memcmp": { "offset": 24, "bytes": "11111111111111111111111111111111" } })
        );
        assert_eq!(
            AccountFilter::DataSize(10_136).to_json(),
            json!({ "dataSize": 10136 })
        );
    }

    #[test]
    fn decodes_get_account_info_payload() {
        let owner = Pubkey::new([4u8; 32]);
        let raw = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": {
                "context": { "slot": 1 },
                "value": {
                    "owner": owner.to_base58(),
                    "data": [STANDARD.encode([1u8, 2, 3]), "base64"],
                    "lamports": 1,
                    "executable": false,
                    "rentEpoch": 0
                }
            }
        });
        let Ok(parsed) = serde_json::from_value::<RpcResponse<WithContext<Option<UiAccount>>>>(raw)
        else {
            panic!("payload should parse");
        };
        let Some(Some(ui)) = parsed.result.map(|r| r.value) else {
            panic!("account present");
        };
        let Ok(account) = ui.decode(Pubkey::new([5u8; 32])) else {
            panic!("decodes");
        };
        assert_eq!(account.owner, owner);
        assert_eq!(account.data, vec![1, 2, 3]);
    }

    #[test]
    fn expect_owner_rejects_foreign_account() {
        let account = Account {
            address: Pubkey::new([1u8; 32]),
            owner: Pubkey::new([2u8; 32]),
            data: Vec::new(),
        };
        let program = Pubkey::new([3u8; 32]);
        assert!(matches!(
            account.expect_owner(&program),
            Err(SdkError::WrongOwner { .. })
        ));
    }

    /// Serves `body` for every JSON-RPC request on a local port.
    async fn stub_node(body: Value) -> RpcConnection {
        let Ok(listener) = tokio::net::TcpListener::bind("127.0.0.1:0").await else {
            panic!("bind stub node");
        };
        let Ok(addr) = listener.local_addr() else {
            panic!("stub node address");
        };
        let app = axum::Router::new().route(
            "/",
            axum::routing::post(move || {
                let body = body.clone();
                async move { axum::Json(body) }
            }),
        );
        tokio::spawn(async move { axum::serve(listener, app).await });
        let Ok(connection) = RpcConnection::new(&format!("http://{addr}")) else {
            panic!("valid stub url");
        };
        connection
    }

    #[tokio::test]
    async fn error_object_becomes_rpc_error() {
        let connection = stub_node(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": { "code": -32602, "message": "Invalid param: WrongSize" }
        }))
        .await;
        let Err(SdkError::Rpc { code, message }) =
            connection.get_account(&Pubkey::new([1u8; 32])).await
        else {
            panic!("expected rpc error");
        };
        assert_eq!(code, -32602);
        assert_eq!(message, "Invalid param: WrongSize");
    }

    #[tokio::test]
    async fn response_without_result_or_error_is_rejected() {
        let connection = stub_node(json!({ "jsonrpc": "2.0", "id": 1 })).await;
        let Err(SdkError::Rpc { code, message }) =
            connection.get_account(&Pubkey::new([1u8; 32])).await
        else {
            panic!("expected rpc error");
        };
        assert_eq!(code, 0);
        assert!(message.contains("neither result nor error"));
    }

    #[tokio::test]
    async fn missing_account_is_not_found() {
        let connection = stub_node(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": { "context": { "slot": 1 }, "value": null }
        }))
        .await;
        let address = Pubkey::new([1u8; 32]);
        assert!(matches!(connection.get_account(&address).await, Ok(None)));
        assert!(matches!(
            connection.require_account(&address).await,
            Err(SdkError::AccountNotFound(key)) if key == address
        ));
    }

    #[tokio::test]
    async fn multiple_accounts_must_match_requested_count() {
        let connection = stub_node(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": { "context": { "slot": 1 }, "value": [null] }
        }))
        .await;
        let keys = [Pubkey::new([1u8; 32]), Pubkey::new([2u8; 32])];
        let Err(SdkError::Rpc { message, .. }) = connection.require_accounts(&keys).await else {
            panic!("expected count mismatch");
        };
        assert_eq!(message, "getMultipleAccounts returned 1 accounts for 2 keys");
    }

    #[tokio::test]
    async fn multiple_accounts_report_first_missing() {
        let owner = Pubkey::new([4u8; 32]);
        let connection = stub_node(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": {
                "context": { "slot": 1 },
                "value": [
                    { "owner": owner.to_base58(), "data": [STANDARD.encode([7u8]), "base64"] },
                    null
                ]
            }
        }))
        .await;
        let keys = [Pubkey::new([1u8; 32]), Pubkey::new([2u8; 32])];
        assert!(matches!(
            connection.require_accounts(&keys).await,
            Err(SdkError::AccountNotFound(key)) if key == Pubkey::new([2u8; 32])
        ));
    }

    #[tokio::test]
    async fn program_accounts_carry_their_keys() {
        let owner = Pubkey::new([4u8; 32]);
        let listed = Pubkey::new([6u8; 32]);
        let connection = stub_node(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": [{
                "pubkey": listed.to_base58(),
                "account": { "owner": owner.to_base58(), "data": [STANDARD.encode([1u8, 2]), "base64"] }
            }]
        }))
        .await;
        let Ok(accounts) = connection
            .get_program_accounts(&owner, &[AccountFilter::DataSize(2)])
            .await
        else {
            panic!("listing succeeds");
        };
        let Some(account) = accounts.first() else {
            panic!("one account listed");
        };
        assert_eq!(account.address, listed);
        assert_eq!(account.owner, owner);
        assert_eq!(account.data, vec![1, 2]);
    }
}
