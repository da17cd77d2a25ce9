//! Block explorer links

use std::fmt;

use crate::config::Network;

/// Explorer base URL
pub const EXPLORER_BASE_URL: &str = "https://hashscan.io";

/// Kind of ledger entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExplorerKind {
    /// Token or collection
    Token,
    /// Transaction
    Transaction,
    /// Account
    Account,
    /// Audit-log topic
    Topic,
}

impl fmt::Display for ExplorerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = match self {
            ExplorerKind::Token => "token",
            ExplorerKind::Transaction => "transaction",
            ExplorerKind::Account => "account",
            ExplorerKind::Topic => "topic",
        };
        f.write_str(path)
    }
}

/// Explorer page for an entity
pub fn explorer_url(network: Network, kind: ExplorerKind, id: &str) -> String {
    format!("{}/{}/{}/{}", EXPLORER_BASE_URL, network, kind, id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Network::Testnet, ExplorerKind::Token, "0.0.42", "https://hashscan.io/testnet/token/0.0.42")]
    #[case(Network::Mainnet, ExplorerKind::Topic, "0.0.9", "https://hashscan.io/mainnet/topic/0.0.9")]
    #[case(Network::Previewnet, ExplorerKind::Transaction, "0.0.1@1.2", "https://hashscan.io/previewnet/transaction/0.0.1@1.2")]
    #[case(Network::Testnet, ExplorerKind::Account, "0.0.2", "https://hashscan.io/testnet/account/0.0.2")]
    fn test_explorer_url(
        #[case] network: Network,
        #[case] kind: ExplorerKind,
        #[case] id: &str,
        #[case] expected: &str,
    ) {
        assert_eq!(explorer_url(network, kind, id), expected);
    }
}
