//! Configuração do servidor via variáveis de ambiente

use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

pub const DEFAULT_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_SEED: u64 = 42;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("ENDERECO_ADDR inválido ({value:?}): {source}")]
    Addr {
        value: String,
        source: std::net::AddrParseError,
    },

    #[error("ENDERECO_SEED inválido ({value:?}): {source}")]
    Seed {
        value: String,
        source: std::num::ParseIntError,
    },

    #[error("ENDERECO_MODEL não pode ser vazio")]
    EmptyModelPath,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    /// Modelo CRFsuite; sem ele `/separate` responde 503.
    pub model: Option<PathBuf>,
    /// Semente usada quando a requisição não traz uma.
    pub seed: u64,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Monta a configuração a partir de uma função de consulta (testável sem tocar no ambiente).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let addr_value = lookup("ENDERECO_ADDR").unwrap_or_else(|| DEFAULT_ADDR.to_string());
        let addr = addr_value
            .trim()
            .parse()
            .map_err(|source| ConfigError::Addr {
                value: addr_value.clone(),
                source,
            })?;

        let seed = match lookup("ENDERECO_SEED") {
            Some(value) => value
                .trim()
                .parse()
                .map_err(|source| ConfigError::Seed { value, source })?,
            None => DEFAULT_SEED,
        };

        let model = match lookup("ENDERECO_MODEL") {
            Some(path) if path.trim().is_empty() => return Err(ConfigError::EmptyModelPath),
            Some(path) => Some(PathBuf::from(path)),
            None => None,
        };

        Ok(Self { addr, model, seed })
    }
}
