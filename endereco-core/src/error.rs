//! # Erros de Configuração
//!
//! Renderização, tokenização, alinhamento e extração de features nunca falham:
//! entradas ruins degradam (campo vazio é pulado, CEP curto é completado com zeros).
//! Os erros abaixo indicam defeito de catálogo ou de configuração e devem ser
//! propagados até quem montou o pipeline.

use thiserror::Error;

use crate::tables::AddressField;

/// Erro de topo do crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Nome de campo desconhecido no formato (ex: "logradoro").
    #[error("campo desconhecido no formato: {0:?}")]
    UnknownField(String),

    /// O campo existe no registro mas não possui código de entidade (ex: `uf`).
    #[error("campo {0:?} não possui código de entidade e não pode ser rotulado")]
    UnlabeledField(AddressField),

    /// Formato sem nenhum campo.
    #[error("formato vazio: é preciso ao menos um campo")]
    EmptyFormat,

    /// Distância de vizinhança zero no extrator de features.
    #[error("distância de vizinhança inválida: {0}")]
    InvalidNeighborDistance(i32),

    /// Tag fora do vocabulário BIO (ex: devolvida por um modelo treinado com outro esquema).
    #[error("tag desconhecida: {0:?}")]
    UnknownLabel(String),

    /// Quantidade de tags diferente da quantidade de tokens.
    #[error("sequências desalinhadas: {tokens} tokens e {tags} tags")]
    LengthMismatch { tokens: usize, tags: usize },

    /// Padrão de abreviação que não compila.
    #[error("padrão inválido: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// Arquivo de modelo lido mas inutilizável.
    #[error("modelo inválido: {0}")]
    Model(String),

    /// Falha de leitura ou de formato do arquivo de modelo.
    #[error("erro de E/S: {0}")]
    Io(#[from] std::io::Error),
}

/// Atalho para `Result` com o erro do crate.
pub type Result<T> = std::result::Result<T, Error>;
