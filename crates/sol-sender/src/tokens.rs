//! Networks and well-known token mints.
//!
//! Both tables are compile-time constants and never change at runtime.

use std::fmt;

use chain_sol::NATIVE_MINT;

/// Definition of a Solana cluster the tool can send on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolanaCluster {
    pub name: &'static str,
    pub rpc_url: &'static str,
    /// `cluster` query parameter for the block explorer; `None` on mainnet.
    pub explorer_cluster: Option<&'static str>,
}

pub const DEVNET: SolanaCluster = SolanaCluster {
    name: "devnet",
    rpc_url: "https://api.devnet.solana.com",
    explorer_cluster: Some("devnet"),
};

pub const MAINNET: SolanaCluster = SolanaCluster {
    name: "mainnet",
    rpc_url: "https://api.mainnet-beta.solana.com",
    explorer_cluster: None,
};

const EXPLORER_TX_URL: &str = "https://explorer.solana.com/tx";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Network {
    Devnet,
    Mainnet,
}

impl Network {
    /// In prompt order; devnet first as the safe default.
    pub const ALL: [Network; 2] = [Network::Devnet, Network::Mainnet];

    pub fn cluster(self) -> &'static SolanaCluster {
        match self {
            Network::Devnet => &DEVNET,
            Network::Mainnet => &MAINNET,
        }
    }

    pub fn rpc_url(self) -> &'static str {
        self.cluster().rpc_url
    }

    /// Label shown in the network picker.
    pub fn label(self) -> &'static str {
        match self {
            Network::Devnet => "Devnet (recommended for testing)",
            Network::Mainnet => "Mainnet",
        }
    }

    /// Block explorer link for a transaction signature.
    pub fn explorer_tx_url(self, signature: &str) -> String {
        match self.cluster().explorer_cluster {
            Some(cluster) => format!("{EXPLORER_TX_URL}/{signature}?cluster={cluster}"),
            None => format!("{EXPLORER_TX_URL}/{signature}"),
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.cluster().name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenSymbol {
    Usdc,
    Usdt,
    Sol,
}

impl TokenSymbol {
    /// In picker order.
    pub const ALL: [TokenSymbol; 3] = [TokenSymbol::Usdc, TokenSymbol::Usdt, TokenSymbol::Sol];
}

impl fmt::Display for TokenSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TokenSymbol::Usdc => "USDC",
            TokenSymbol::Usdt => "USDT",
            TokenSymbol::Sol => "SOL",
        })
    }
}

/// A token offered in the "common tokens" picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnownToken {
    pub network: Network,
    pub symbol: TokenSymbol,
    pub mint: &'static str,
}

impl KnownToken {
    pub fn label(&self) -> String {
        format!("{} ({})", self.symbol, self.mint)
    }
}

/// All well-known tokens, grouped by network in picker order.
pub const KNOWN_TOKENS: &[KnownToken] = &[
    KnownToken {
        network: Network::Devnet,
        symbol: TokenSymbol::Usdc,
        mint: "4zMMC9srt5Ri5X14GAgXhaHii3GnPAEERYPJgZJDncDU",
    },
    KnownToken {
        network: Network::Devnet,
        symbol: TokenSymbol::Usdt,
        mint: "EJwZgeZrdC8TXTQbQBoL6bfuAnFUUy1PVCMB4DYPzVaS",
    },
    KnownToken {
        network: Network::Devnet,
        symbol: TokenSymbol::Sol,
        mint: NATIVE_MINT,
    },
    KnownToken {
        network: Network::Mainnet,
        symbol: TokenSymbol::Usdc,
        mint: "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v",
    },
    KnownToken {
        network: Network::Mainnet,
        symbol: TokenSymbol::Usdt,
        mint: "Es9vMFrzaCERmJfrF4H2FYD4KCoNkY11McCe8BenwNYB",
    },
    KnownToken {
        network: Network::Mainnet,
        symbol: TokenSymbol::Sol,
        mint: NATIVE_MINT,
    },
];

/// Tokens offered on `network`, in picker order.
pub fn known_tokens(network: Network) -> impl Iterator<Item = &'static KnownToken> {
    KNOWN_TOKENS.iter().filter(move |t| t.network == network)
}

pub fn known_token(network: Network, symbol: TokenSymbol) -> Option<&'static KnownToken> {
    known_tokens(network).find(|t| t.symbol == symbol)
}

/// Mint address for a (network, symbol) pair.
pub fn known_mint(network: Network, symbol: TokenSymbol) -> Option<&'static str> {
    known_token(network, symbol).map(|t| t.mint)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chain_sol::address::validate_address;

    #[test]
    fn every_known_mint_is_a_valid_address() {
        for token in KNOWN_TOKENS {
            assert!(validate_address(token.mint).is_ok(), "{token:?}");
        }
    }

    #[test]
    fn each_network_offers_usdc_usdt_sol_in_order() {
        for network in Network::ALL {
            let symbols: Vec<TokenSymbol> = known_tokens(network).map(|t| t.symbol).collect();
            assert_eq!(
                symbols,
                vec![TokenSymbol::Usdc, TokenSymbol::Usdt, TokenSymbol::Sol]
            );
        }
    }

    #[test]
    fn every_symbol_is_known_on_every_network() {
        for network in Network::ALL {
            for symbol in TokenSymbol::ALL {
                let token = known_token(network, symbol).unwrap();
                assert_eq!((token.network, token.symbol), (network, symbol));
            }
        }
    }

    #[test]
    fn lookup_by_network_and_symbol() {
        assert_eq!(
            known_mint(Network::Mainnet, TokenSymbol::Usdc),
            Some("EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v")
        );
        assert_eq!(
            known_mint(Network::Devnet, TokenSymbol::Usdt),
            Some("EJwZgeZrdC8TXTQbQBoL6bfuAnFUUy1PVCMB4DYPzVaS")
        );
        assert_eq!(known_mint(Network::Devnet, TokenSymbol::Sol), Some(NATIVE_MINT));
    }

    #[test]
    fn token_label_shows_symbol_and_mint() {
        let sol = known_tokens(Network::Devnet).last().unwrap();
        assert_eq!(
            sol.label(),
            "SOL (So11111111111111111111111111111111111111112)"
        );
    }

    #[test]
    fn explorer_url_per_network() {
        assert_eq!(
            Network::Devnet.explorer_tx_url("abc"),
            "https://explorer.solana.com/tx/abc?cluster=devnet"
        );
        assert_eq!(
            Network::Mainnet.explorer_tx_url("abc"),
            "https://explorer.solana.com/tx/abc"
        );
    }

    #[test]
    fn network_display_and_endpoints() {
        assert_eq!(Network::Devnet.to_string(), "devnet");
        assert_eq!(Network::Mainnet.to_string(), "mainnet");
        assert_eq!(Network::Devnet.rpc_url(), "https://api.devnet.solana.com");
        assert_eq!(Network::Mainnet.rpc_url(), "https://api.mainnet-beta.solana.com");
    }
}
