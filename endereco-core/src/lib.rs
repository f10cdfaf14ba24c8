//! # endereco-core: Preparação de Dados para Separação de Endereços Brasileiros
//!
//! Este crate gera dados de treino para um etiquetador sequencial que separa um
//! endereço em texto livre nos seus campos (logradouro, número, complemento,
//! bairro, município e CEP), e aplica um etiquetador já treinado sobre textos novos.
//!
//! ## Arquitetura do Sistema
//!
//! Caminho de treino, a partir de registros estruturados:
//!
//! 1.  **Parâmetros** ([`params`]): sorteio de como o endereço será "sujado"
//!     (abreviações, palavras apagadas, UF colada, formato do CEP, ordem dos campos).
//! 2.  **Geração** ([`generator`]): aplica os parâmetros a um [`AddressRecord`].
//! 3.  **Rotulagem** ([`aligner`]): tokeniza campo a campo e atribui tags BIO.
//! 4.  **Features** ([`features`]): um vetor esparso por token.
//! 5.  **Dataset** ([`dataset`]): repete o processo sobre muitos registros, em
//!     série ou em paralelo, de forma reprodutível a partir de uma semente.
//!
//! Caminho de inferência, a partir de texto livre:
//!
//! 1.  **Tokenização** ([`tokenizer`]) com offsets no texto original.
//! 2.  **Features** ([`features`]), as mesmas do treino.
//! 3.  **Etiquetagem** ([`sequence_tagger`]): um modelo CRFsuite ou qualquer
//!     implementação de [`SequenceTagger`].
//! 4.  **Agrupamento** ([`tagger`]): tags BIO viram trechos por campo.
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use endereco_core::{AddressPipeline, AddressParams, AddressRecord};
//!
//! let record = AddressRecord {
//!     street: "Rua das Flores".to_string(),
//!     number: "123".to_string(),
//!     municipality: "Recife".to_string(),
//!     ..Default::default()
//! };
//!
//! let pipeline = AddressPipeline::default();
//! let output = pipeline.render(&record, &AddressParams::default());
//!
//! assert_eq!(output.text, "RUA DAS FLORES, 123, RECIFE");
//! for (token, tag) in output.tokens.iter().zip(&output.tags) {
//!     println!("{token}\t{tag}");
//! }
//! ```
//!
//! ## Módulos Principais
//!
//! - [`pipeline`]: Orquestrador com eventos observáveis.
//! - [`tables`]: Campos, catálogos de formato e tabela de abreviações.
//! - [`evaluation`]: Relatório de classificação e análise de erros.
//! - [`corpus`]: Registros e endereços anotados para demonstração.

pub mod aligner;
pub mod corpus;
pub mod dataset;
pub mod error;
pub mod evaluation;
pub mod features;
pub mod format;
pub mod generator;
pub mod params;
pub mod pipeline;
pub mod record;
pub mod sequence_tagger;
pub mod tables;
pub mod tagger;
pub mod tokenizer;

pub use aligner::{align, align_transformed, AlignedSequence};
pub use dataset::{DatasetBuilder, TrainingSample};
pub use error::{Error, Result};
pub use features::{FeatureExtractor, FeatureVector};
pub use format::{FormatSpec, PostalFormat};
pub use generator::SyntheticAddressGenerator;
pub use params::{AddressParams, ParameterSampler, SamplerProfile};
pub use pipeline::{AddressPipeline, PipelineEvent, RenderOutput, SeparationOutput};
pub use record::{AddressRecord, TransformedRecord};
pub use sequence_tagger::{CrfsTagger, SequenceTagger};
pub use tables::{AbbreviationTable, AddressField};
pub use tagger::{EntityCode, FieldSpan, Tag};
pub use tokenizer::{tokenize, Token};
