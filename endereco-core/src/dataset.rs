//! # Montagem do Dataset de Treino
//!
//! Para cada registro: sorteia parâmetros, gera a variação, rotula e extrai
//! features. Dois modos:
//!
//! - [`DatasetBuilder::build`]: sequencial, um único gerador pseudoaleatório
//!   compartilhado, na ordem dos registros.
//! - [`DatasetBuilder::par_build`]: paralelo (rayon). O registro `k` usa o
//!   fluxo `k` de um `ChaCha8Rng` semeado com `seed`, então a saída não depende
//!   da ordem em que as threads executam.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::aligner::align_transformed;
use crate::features::{FeatureExtractor, FeatureVector};
use crate::generator::SyntheticAddressGenerator;
use crate::params::ParameterSampler;
use crate::record::AddressRecord;
use crate::tagger::Tag;

/// Uma sequência de treino: tokens, tags e features paralelos.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSample {
    /// Texto renderizado do endereço.
    pub text: String,
    pub tokens: Vec<String>,
    pub tags: Vec<Tag>,
    pub features: Vec<FeatureVector>,
    /// Categorias para análise de erro (ex: "formato = LOGRADOURO NUMERO").
    pub categories: Vec<String>,
}

impl TrainingSample {
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Combina sorteador, gerador e extrator.
#[derive(Debug, Clone, Default)]
pub struct DatasetBuilder {
    sampler: ParameterSampler,
    generator: SyntheticAddressGenerator,
    extractor: FeatureExtractor,
}

impl DatasetBuilder {
    pub fn new(
        sampler: ParameterSampler,
        generator: SyntheticAddressGenerator,
        extractor: FeatureExtractor,
    ) -> Self {
        Self {
            sampler,
            generator,
            extractor,
        }
    }

    pub fn extractor(&self) -> &FeatureExtractor {
        &self.extractor
    }

    /// Uma amostra a partir de um registro.
    pub fn sample<R: Rng + ?Sized>(&self, record: &AddressRecord, rng: &mut R) -> TrainingSample {
        let params = self.sampler.sample(rng);
        let transformed = self.generator.generate(record, &params);
        let text = transformed.rendered();
        let (tokens, tags) = align_transformed(&transformed).into_parts();
        let features = self.extractor.features(&tokens);
        let categories = vec![
            format!("formato = {}", transformed.format.notation().to_uppercase()),
            format!("separador = {}", transformed.format.separator()),
        ];
        TrainingSample {
            text,
            tokens,
            tags,
            features,
            categories,
        }
    }

    /// Modo sequencial: consome `rng` na ordem dos registros.
    pub fn build<R: Rng + ?Sized>(
        &self,
        records: &[AddressRecord],
        rng: &mut R,
    ) -> Vec<TrainingSample> {
        debug!(records = records.len(), "montando dataset sequencial");
        records.iter().map(|r| self.sample(r, &mut *rng)).collect()
    }

    /// Modo paralelo com um fluxo pseudoaleatório por registro.
    pub fn par_build(&self, records: &[AddressRecord], seed: u64) -> Vec<TrainingSample> {
        debug!(records = records.len(), seed, "montando dataset em paralelo");
        records
            .par_iter()
            .enumerate()
            .map(|(k, record)| {
                let mut rng = record_rng(seed, k);
                self.sample(record, &mut rng)
            })
            .collect()
    }
}

/// Gerador do registro `k` no modo paralelo.
pub fn record_rng(seed: u64, k: usize) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(k as u64);
    rng
}

/// Embaralha e separa as amostras em treino e teste.
///
/// `test_fraction` é limitado a `[0, 1]`; o teste recebe `round(n * fração)` amostras.
pub fn split_train_test<T, R: Rng + ?Sized>(
    mut samples: Vec<T>,
    test_fraction: f64,
    rng: &mut R,
) -> (Vec<T>, Vec<T>) {
    samples.shuffle(rng);
    let fraction = test_fraction.clamp(0.0, 1.0);
    let test_len = (samples.len() as f64 * fraction).round() as usize;
    let test = samples.split_off(samples.len() - test_len);
    (samples, test)
}
