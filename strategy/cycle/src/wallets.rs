//! Loading signing wallets from a newline-delimited key file.

use std::fmt;
use std::path::{Path, PathBuf};

use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid private key on line {line}")]
    InvalidKey { line: usize },

    #[error("no private keys found")]
    Empty,
}

/// A wallet loaded at startup. Never mutated and never written back.
#[derive(Clone)]
pub struct WalletContext {
    pub signer: PrivateKeySigner,
    pub address: Address,
}

impl WalletContext {
    pub fn new(signer: PrivateKeySigner) -> Self {
        let address = signer.address();
        Self { signer, address }
    }
}

// Keep the key out of logs.
impl fmt::Debug for WalletContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletContext")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

/// Parses one private key per line; blank lines are ignored.
pub fn parse_private_keys(contents: &str) -> Result<Vec<WalletContext>, CredentialError> {
    let mut wallets = Vec::new();
    for (index, line) in contents.lines().enumerate() {
        let key = line.trim();
        if key.is_empty() {
            continue;
        }
        // The whole file is checked before any transaction is sent; one bad key stops the run.
        let signer: PrivateKeySigner = key
            .parse()
            .map_err(|_| CredentialError::InvalidKey { line: index + 1 })?;
        wallets.push(WalletContext::new(signer));
    }
    if wallets.is_empty() {
        return Err(CredentialError::Empty);
    }
    Ok(wallets)
}

/// Reads and parses the key file at `path`.
pub fn load_private_keys(path: impl AsRef<Path>) -> Result<Vec<WalletContext>, CredentialError> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|source| CredentialError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_private_keys(&contents)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Well-known development keys (anvil accounts 0 and 1).
    const KEY_0: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const KEY_1: &str = "59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";

    #[test]
    fn parses_keys_and_skips_blank_lines() {
        let contents = format!("\n{KEY_0}\n   \n  {KEY_1}  \r\n\n");
        let wallets = parse_private_keys(&contents).unwrap();
        assert_eq!(wallets.len(), 2);
        assert_eq!(
            wallets[0].address,
            "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266".parse::<Address>().unwrap()
        );
        assert_eq!(
            wallets[1].address,
            "0x70997970C51812dc3A010C7d01b50e0d17dc79C8".parse::<Address>().unwrap()
        );
    }

    #[test]
    fn empty_input_is_an_error() {
        assert!(matches!(parse_private_keys(""), Err(CredentialError::Empty)));
        assert!(matches!(parse_private_keys("\n \n\t\n"), Err(CredentialError::Empty)));
    }

    #[test]
    fn reports_line_of_bad_key() {
        let contents = format!("{KEY_0}\n\nnot-a-key\n");
        assert!(matches!(
            parse_private_keys(&contents),
            Err(CredentialError::InvalidKey { line: 3 })
        ));
    }

    #[test]
    fn debug_hides_key() {
        let wallets = parse_private_keys(KEY_0).unwrap();
        let rendered = format!("{:?}", wallets[0]);
        assert!(rendered.contains("address"));
        assert!(!rendered.contains("ac0974bec39a17e36ba4a6b4d238ff944bacb478"));
    }

    #[test]
    fn missing_file_is_io_error() {
        assert!(matches!(
            load_private_keys("/nonexistent/keys.txt"),
            Err(CredentialError::Io { .. })
        ));
    }
}
