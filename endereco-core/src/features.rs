//! # Engenharia de Features para Endereços
//!
//! Para cada token, extrai um conjunto de features categóricas (binárias) que
//! o etiquetador sequencial usa para decidir a tag BIO.
//!
//! ## Features Implementadas
//!
//! ### Posição
//! - `bias` em todos os tokens
//! - Quarto da sequência em que o token está: `0_pos` … `3_pos`
//! - `BOS` no primeiro token, `EOS` no último
//!
//! ### Forma do token (prefixo `0:`)
//! - Texto normalizado (sem acento, maiúsculo)
//! - Tamanho: `tam:1` … `tam:7+`
//! - Classe: `is_punct`, `is_digit` (+ `digit_len:N`), `is_alpha` (+ `has_digit`)
//!   ou `is_unknown`
//!
//! ### Vizinhança (prefixos `-2`, `-1`, `+1`, `+2`)
//! - As mesmas features de forma para as palavras vizinhas. Pontuação é
//!   pulada: o vizinho `+1` de "RUA" em `RUA , DAS` é "DAS".
//! - `tem_pontuacao:<distância>` quando algum token foi pulado para chegar ao
//!   vizinho.
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use endereco_core::features::FeatureExtractor;
//!
//! let extractor = FeatureExtractor::default();
//! let features = extractor.features(&["RUA", "123", "CENTRO"]);
//! assert!(features[1].contains("0:is_digit"));
//! assert!(features[1].contains("-1:RUA"));
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

use crate::error::{Error, Result};
use crate::tokenizer::{tokenize, Token};

/// Caracteres que marcam um token como pontuação (olhando o primeiro caractere).
pub const PUNCTUATION: &str = ",.;/:?!@#$%¨&*()-+[]{}\"'\\|";

/// Distâncias de vizinhança padrão.
pub const DEFAULT_DISTANCES: [i32; 4] = [-2, -1, 1, 2];

/// Estrutura para representar as características de um token.
///
/// Utilizamos um mapa esparso e ordenado (`BTreeMap<String, f64>`) porque o espaço de features é
/// aberto (ex: "0:PAULISTA", "-1:AV"), mas cada token ativa apenas um pequeno subconjunto.
/// Todas as features produzidas aqui são binárias (valor 1.0). A ordem por nome
/// mantém a serialização idêntica entre execuções.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// O mapa de features ativas. Ex: `{"bias": 1.0, "0:RUA": 1.0}`.
    pub features: BTreeMap<String, f64>,
    /// Referência ao índice do token original na sequência.
    pub token_index: usize,
}

impl FeatureVector {
    pub fn new(token_index: usize) -> Self {
        Self {
            features: BTreeMap::new(),
            token_index,
        }
    }

    /// Adiciona uma feature ao vetor com valor 1.0 (binária) ou customizado.
    pub fn insert(&mut self, key: impl Into<String>, value: f64) {
        self.features.insert(key.into(), value);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.features.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Nomes das features em ordem lexicográfica.
    pub fn names(&self) -> Vec<&str> {
        self.features.keys().map(String::as_str).collect()
    }

    /// Converte para os atributos do CRFsuite, em ordem de nome.
    pub fn to_attributes(&self) -> Vec<crfs::Attribute> {
        self.features
            .iter()
            .map(|(name, value)| crfs::Attribute::new(name.as_str(), *value))
            .collect()
    }
}

/// Remove diacríticos: decomposição NFKD e descarte de tudo que não é ASCII.
///
/// Não muda a caixa: `normalize("ÁbÇ") == "AbC"`.
pub fn normalize(text: &str) -> String {
    text.nfkd().filter(char::is_ascii).collect()
}

/// O primeiro caractere pertence ao conjunto de pontuação.
pub fn is_punctuation(token: &str) -> bool {
    token.chars().next().is_some_and(|c| PUNCTUATION.contains(c))
}

/// Token inteiramente alfanumérico (letras de qualquer alfabeto ou dígitos).
pub fn is_word(token: &str) -> bool {
    !token.is_empty() && token.chars().all(char::is_alphanumeric)
}

/// Features de forma de um token, ainda sem o prefixo de posição relativa.
pub fn token_shape(token: &str) -> Vec<String> {
    let norm = normalize(token).to_uppercase();
    let norm = norm.trim();
    let mut feats = Vec::with_capacity(5);

    if norm.is_empty() {
        // tudo foi removido pela normalização
        feats.push(String::new());
        feats.push(length_bucket("tam", 0));
        feats.push("is_unknown".to_string());
    } else if is_punctuation(norm) {
        let first: String = norm.chars().take(1).collect();
        feats.push(length_bucket("tam", norm.len()));
        feats.push("is_punct".to_string());
        feats.push(first);
    } else if norm.chars().all(|c| c.is_ascii_digit()) {
        let significant = norm.trim_start_matches('0');
        feats.push(length_bucket("tam", norm.len()));
        feats.push("is_digit".to_string());
        feats.push(length_bucket("digit_len", significant.len()));
    } else if norm.chars().all(|c| c.is_ascii_alphanumeric()) {
        feats.push(norm.to_string());
        feats.push(length_bucket("tam", norm.len()));
        feats.push("is_alpha".to_string());
        if norm.chars().any(|c| c.is_ascii_digit()) {
            feats.push("has_digit".to_string());
        }
    } else {
        feats.push(norm.to_string());
        feats.push(length_bucket("tam", norm.len()));
        feats.push("is_unknown".to_string());
    }
    feats
}

fn length_bucket(name: &str, len: usize) -> String {
    if len >= 7 {
        format!("{name}:7+")
    } else {
        format!("{name}:{len}")
    }
}

/// Rótulo de uma distância de vizinhança (`-2`, `+1`...).
fn offset_label(distance: i32) -> String {
    if distance > 0 {
        format!("+{distance}")
    } else {
        distance.to_string()
    }
}

/// Extrator de features com distâncias de vizinhança configuráveis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureExtractor {
    distances: Vec<i32>,
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self {
            distances: DEFAULT_DISTANCES.to_vec(),
        }
    }
}

impl FeatureExtractor {
    /// Cria um extrator. Distância zero é erro de configuração.
    pub fn new(distances: impl IntoIterator<Item = i32>) -> Result<Self> {
        let distances: Vec<i32> = distances.into_iter().collect();
        if distances.contains(&0) {
            return Err(Error::InvalidNeighborDistance(0));
        }
        Ok(Self { distances })
    }

    pub fn distances(&self) -> &[i32] {
        &self.distances
    }

    /// Tokeniza o texto e extrai as features (caminho de inferência).
    pub fn sent_features(&self, text: &str) -> Vec<FeatureVector> {
        self.token_features(&tokenize(text))
    }

    /// Features de uma sequência de [`Token`].
    pub fn token_features(&self, tokens: &[Token]) -> Vec<FeatureVector> {
        let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        self.features(&texts)
    }

    /// Gera um vetor de features para cada token da sequência.
    ///
    /// O índice `i` do retorno corresponde ao token `i` da entrada.
    pub fn features<S: AsRef<str>>(&self, tokens: &[S]) -> Vec<FeatureVector> {
        (0..tokens.len())
            .map(|i| self.features_at(tokens, i))
            .collect()
    }

    fn features_at<S: AsRef<str>>(&self, tokens: &[S], i: usize) -> FeatureVector {
        let mut fv = FeatureVector::new(i);
        let len = tokens.len();

        fv.insert("bias", 1.0);
        fv.insert(format!("{}_pos", i * 4 / len), 1.0);
        for feat in token_shape(tokens[i].as_ref()) {
            fv.insert(format!("0:{feat}"), 1.0);
        }
        if i == 0 {
            fv.insert("BOS", 1.0);
        }
        if i == len - 1 {
            fv.insert("EOS", 1.0);
        }

        for &distance in &self.distances {
            let Some(found) = find_neighbor(tokens, i, distance) else {
                continue;
            };
            let label = offset_label(distance);
            for feat in token_shape(tokens[found].as_ref()) {
                fv.insert(format!("{label}:{feat}"), 1.0);
            }
            if found as isize != i as isize + distance as isize {
                fv.insert(format!("tem_pontuacao:{label}"), 1.0);
            }
        }
        fv
    }
}

/// Salta `|distance|` palavras a partir de `start`, na direção do sinal.
///
/// Cada salto para na próxima palavra alfanumérica; sair da sequência em
/// qualquer salto devolve `None`.
fn find_neighbor<S: AsRef<str>>(tokens: &[S], start: usize, distance: i32) -> Option<usize> {
    let step = distance.signum() as isize;
    let mut cursor = start as isize;
    for _ in 0..distance.unsigned_abs() {
        cursor = next_word(tokens, cursor, step)?;
    }
    Some(cursor as usize)
}

fn next_word<S: AsRef<str>>(tokens: &[S], from: isize, step: isize) -> Option<isize> {
    let mut i = from + step;
    while i >= 0 && (i as usize) < tokens.len() {
        if is_word(tokens[i as usize].as_ref()) {
            return Some(i);
        }
        i += step;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feats(sent: &[&str], i: usize) -> FeatureVector {
        FeatureExtractor::default().features(sent).swap_remove(i)
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("ação"), "acao");
        assert_eq!(normalize("ÁbÇ"), "AbC");
        assert_eq!(normalize("Rua"), "Rua");
    }

    #[test]
    fn test_first_token() {
        let f = feats(&["Rua", "das", "Flores"], 0);
        for name in ["bias", "0_pos", "0:RUA", "0:is_alpha", "BOS", "+1:DAS", "+1:is_alpha"] {
            assert!(f.contains(name), "faltou {name}");
        }
        assert!(!f.contains("EOS"));
    }

    #[test]
    fn test_last_token() {
        let f = feats(&["Rua", "das", "Flores"], 2);
        for name in ["EOS", "-2:RUA", "-2:is_alpha", "-1:DAS", "0:FLORES", "2_pos"] {
            assert!(f.contains(name), "faltou {name}");
        }
        assert!(!f.contains("+1:is_alpha"));
    }

    #[test]
    fn test_digit_token() {
        let f = feats(&["RUA", "123", "CENTRO"], 1);
        assert!(f.contains("0:is_digit"));
        assert!(f.contains("0:digit_len:3"));
        assert!(f.contains("-1:RUA"));
        assert!(f.contains("+1:CENTRO"));
        assert!(!f.contains("0:123"));
    }

    #[test]
    fn test_leading_zeros_ignored_in_digit_len() {
        let shape = token_shape("01311");
        assert!(shape.contains(&"digit_len:4".to_string()));
        assert!(shape.contains(&"tam:5".to_string()));
    }

    #[test]
    fn test_punctuation_token() {
        let f = feats(&["Rua", ",", "Centro"], 1);
        assert!(f.contains("0:,"));
        assert!(f.contains("0:is_punct"));
        assert!(f.contains("-1:RUA"));
        assert!(f.contains("+1:CENTRO"));
    }

    #[test]
    fn test_alphanumeric_token() {
        let f = feats(&["Rua", "A1", "Centro"], 1);
        assert!(f.contains("0:A1"));
        assert!(f.contains("0:is_alpha"));
        assert!(f.contains("0:has_digit"));
    }

    #[test]
    fn test_neighbors_skip_punctuation() {
        let f = feats(&["Rua", ",", "das", "Flores"], 0);
        assert!(f.contains("0:RUA"));
        assert!(f.contains("+1:DAS"));
        assert!(f.contains("+2:FLORES"));
        assert!(f.contains("tem_pontuacao:+1"));
        assert!(f.contains("tem_pontuacao:+2"));
    }

    #[test]
    fn test_successive_punctuation_skipped() {
        let f = feats(&["Rua", ",", ".", "Flores"], 0);
        assert!(f.contains("+1:FLORES"));
        assert!(f.contains("+1:is_alpha"));
        assert!(!f.contains("+2:is_alpha"));
    }

    #[test]
    fn test_skip_marker_backwards() {
        let f = feats(&["Rua", ",", "das", "Flores"], 3);
        assert!(f.contains("-1:DAS"));
        assert!(!f.contains("tem_pontuacao:-1"));
        assert!(f.contains("-2:RUA"));
        assert!(f.contains("tem_pontuacao:-2"));
    }

    #[test]
    fn test_long_word_single_token() {
        let f = feats(&["Inconstitucionalissimamente"], 0);
        assert!(f.contains("0:INCONSTITUCIONALISSIMAMENTE"));
        assert!(f.contains("0:tam:7+"));
        assert!(f.contains("BOS") && f.contains("EOS"));
    }

    #[test]
    fn test_all_punctuation() {
        let f = feats(&[",", ".", ";"], 1);
        assert!(f.contains("0:is_punct"));
        assert!(!f.contains("BOS") && !f.contains("EOS"));
        assert!(!f.names().iter().any(|n| n.starts_with("+1") || n.starts_with("-1")));
    }

    #[test]
    fn test_unknown_shapes() {
        assert!(token_shape("x_y").contains(&"is_unknown".to_string()));
        // "€" não tem decomposição ASCII
        assert!(token_shape("€").contains(&"is_unknown".to_string()));
    }

    #[test]
    fn test_bias_everywhere_and_aligned() {
        let extractor = FeatureExtractor::default();
        let fvs = extractor.features(&["A", "B", "C"]);
        assert_eq!(fvs.len(), 3);
        for (i, fv) in fvs.iter().enumerate() {
            assert!(fv.contains("bias"));
            assert_eq!(fv.token_index, i);
        }
        assert!(extractor.features::<&str>(&[]).is_empty());
    }

    #[test]
    fn test_zero_distance_rejected() {
        assert!(matches!(
            FeatureExtractor::new([-1, 0, 1]),
            Err(Error::InvalidNeighborDistance(0))
        ));
        let wide = FeatureExtractor::new([3]).unwrap();
        let f = wide.features(&["A", "B", "C", "D"]).swap_remove(0);
        assert!(f.contains("+3:D"));
    }

    #[test]
    fn test_sent_features_and_attributes() {
        let extractor = FeatureExtractor::default();
        let fvs = extractor.sent_features("Av. Paulista, 1000");
        assert_eq!(fvs.len(), 5);
        assert!(fvs[0].contains("0:AV"));
        let attrs = fvs[0].to_attributes();
        assert_eq!(attrs.len(), fvs[0].len());
        let names = fvs[0].names();
        assert!(names.windows(2).all(|w| w[0] <= w[1]));
    }
}
