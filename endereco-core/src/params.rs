//! # Sorteio de Parâmetros de Transformação
//!
//! Cada amostra sintética usa um [`AddressParams`] sorteado de um gerador
//! pseudoaleatório **do chamador**. Não existe gerador global: quem quer
//! reprodutibilidade passa um `ChaCha8Rng` semeado.
//!
//! ## Consumo fixo do gerador
//!
//! Toda chamada a [`ParameterSampler::sample`] consome exatamente
//! [`DRAWS_PER_SAMPLE`] números, sempre na mesma ordem, independente dos
//! resultados. Assim duas sequências semeadas igualmente nunca saem de
//! passo, mesmo alternando entre o perfil ruidoso e o sem ruído.
//!
//! | Ordem | Sorteio                                    |
//! |-------|--------------------------------------------|
//! | 1-4   | abreviar? (logradouro, bairro, município, complemento), p=0.2 |
//! | 5-8   | excluir 2ª palavra? (mesma ordem), p=0.1   |
//! | 9     | juntar município e UF?, p=0.1              |
//! | 10    | separador da UF                            |
//! | 11    | texto para número ausente                  |
//! | 12    | separar milhar?, p=0.05                    |
//! | 13    | usar prefixo no número?, p=0.05            |
//! | 14    | qual prefixo                               |
//! | 15    | ordem dos campos                           |
//! | 16    | separador de saída                         |
//! | 17    | formato do CEP                             |

use std::collections::BTreeSet;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::format::{FormatSpec, PostalFormat};
use crate::tables::{
    AddressField, FORMAT_CATALOG, MISSING_NUMBER_PLACEHOLDERS, NUMBER_PREFIXES, OUTPUT_SEPARATORS,
    STATE_MERGE_SEPARATORS,
};

/// Quantidade de números consumidos do gerador por sorteio.
pub const DRAWS_PER_SAMPLE: usize = 17;

const ABBREVIATE_PROB: f64 = 0.2;
const DELETE_WORD_PROB: f64 = 0.1;
const MERGE_STATE_PROB: f64 = 0.1;
const THOUSANDS_PROB: f64 = 0.05;
const PREFIX_PROB: f64 = 0.05;

/// Parâmetros de transformação de um endereço.
///
/// `Default` é o conjunto sem ruído: nada abreviado ou removido, `S/N` para
/// número ausente, CEP sem pontuação, ordem usual com `", "`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AddressParams {
    /// Campos que passam pela tabela de abreviações.
    pub abbreviate_fields: BTreeSet<AddressField>,
    /// Campos que perdem a segunda palavra (quando têm 3 ou mais).
    pub delete_word_fields: BTreeSet<AddressField>,
    /// Cola a UF no município.
    pub merge_state: bool,
    /// Separador entre município e UF.
    pub state_separator: String,
    /// Texto usado quando o número está vazio.
    pub missing_number: String,
    /// Agrupa milhares com vírgula (1234 → 1,234).
    pub thousands_separator: bool,
    /// Prefixo antes do número (ex: "Nº").
    pub number_prefix: Option<String>,
    pub postal_format: PostalFormat,
    /// Ordem dos campos e separador de saída.
    pub format: FormatSpec,
}

impl Default for AddressParams {
    fn default() -> Self {
        Self {
            abbreviate_fields: BTreeSet::new(),
            delete_word_fields: BTreeSet::new(),
            merge_state: false,
            state_separator: " ".to_string(),
            missing_number: "S/N".to_string(),
            thousands_separator: false,
            number_prefix: None,
            postal_format: PostalFormat::Plain,
            format: FormatSpec::default(),
        }
    }
}

/// Perfil de sorteio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SamplerProfile {
    /// Todas as corrupções habilitadas.
    #[default]
    Noisy,
    /// Só a receita de renderização varia (ordem, separador, formato do CEP).
    Noiseless,
}

/// Sorteador de [`AddressParams`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParameterSampler {
    profile: SamplerProfile,
}

impl ParameterSampler {
    pub fn new(profile: SamplerProfile) -> Self {
        Self { profile }
    }

    /// Perfil sem corrupções, com o mesmo consumo do gerador.
    pub fn noiseless() -> Self {
        Self::new(SamplerProfile::Noiseless)
    }

    pub fn profile(&self) -> SamplerProfile {
        self.profile
    }

    /// Sorteia um conjunto de parâmetros.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> AddressParams {
        let abbreviate_fields = draw_fields(rng, ABBREVIATE_PROB);
        let delete_word_fields = draw_fields(rng, DELETE_WORD_PROB);
        let merge_state = rng.gen::<f64>() < MERGE_STATE_PROB;
        let state_separator = choose(rng, STATE_MERGE_SEPARATORS);
        let missing_number = choose(rng, MISSING_NUMBER_PLACEHOLDERS);
        let thousands_separator = rng.gen::<f64>() < THOUSANDS_PROB;
        // O prefixo é sorteado mesmo quando descartado
        let use_prefix = rng.gen::<f64>() < PREFIX_PROB;
        let prefix = choose(rng, NUMBER_PREFIXES);
        let order = FORMAT_CATALOG[pick_index(rng, FORMAT_CATALOG.len())];
        let separator = choose(rng, OUTPUT_SEPARATORS);
        let postal_format = PostalFormat::ALL[pick_index(rng, PostalFormat::ALL.len())];

        let format = FormatSpec::from_catalog(order, separator);

        match self.profile {
            SamplerProfile::Noisy => AddressParams {
                abbreviate_fields,
                delete_word_fields,
                merge_state,
                state_separator: state_separator.to_string(),
                missing_number: missing_number.to_string(),
                thousands_separator,
                number_prefix: use_prefix.then(|| prefix.to_string()),
                postal_format,
                format,
            },
            SamplerProfile::Noiseless => AddressParams {
                postal_format,
                format,
                ..AddressParams::default()
            },
        }
    }
}

fn draw_fields<R: Rng + ?Sized>(rng: &mut R, prob: f64) -> BTreeSet<AddressField> {
    AddressField::CORRUPTIBLE
        .into_iter()
        .filter(|_| rng.gen::<f64>() < prob)
        .collect()
}

/// Índice uniforme em `0..n` a partir de um único `f64`.
///
/// `gen_range` rejeita amostras e pode consumir mais de um número.
fn pick_index<R: Rng + ?Sized>(rng: &mut R, n: usize) -> usize {
    ((rng.gen::<f64>() * n as f64) as usize).min(n - 1)
}

fn choose<'a, R: Rng + ?Sized>(rng: &mut R, options: &[&'a str]) -> &'a str {
    options[pick_index(rng, options.len())]
}
