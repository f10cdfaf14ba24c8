//! # Tokenizador de Endereços
//!
//! Divide qualquer texto em tokens atômicos. A gramática é uma única varredura
//! gulosa, da esquerda para a direita, sem sobreposição, que reconhece em ordem
//! de prioridade:
//!
//! 1. uma sequência máxima de dígitos decimais (`01311`);
//! 2. senão, uma sequência máxima de caracteres de palavra: letras (inclusive
//!    acentuadas), dígitos e sublinhado (`SÃO`, `nº`, `A1`);
//! 3. senão, um único caractere que não é espaço nem de palavra (`,`, `-`, `.`).
//!
//! Espaços apenas separam e nunca viram token.
//!
//! A mesma função é usada na rotulagem (campo a campo) e na inferência (texto
//! inteiro), então as fronteiras de token são idênticas nos dois caminhos.
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use endereco_core::tokenizer::{tokenize, token_texts};
//!
//! let tokens = tokenize("CEP: 01311-200");
//! assert_eq!(tokens[2].text, "01311");
//! assert_eq!(token_texts("CEP: 01311-200"), vec!["CEP", ":", "01311", "-", "200"]);
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+|\w+|[^\s\w]").expect("regex do tokenizador inválida"));

/// Um token extraído do texto original.
///
/// Mantém a posição exata no texto de origem (`start` e `end`), o que permite
/// mapear os campos previstos de volta para o endereço digitado.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Token {
    /// O texto do token (ex: "RUA", ",", "01311").
    pub text: String,
    /// Índice de byte inicial no texto original (inclusive).
    pub start: usize,
    /// Índice de byte final no texto original (exclusivo).
    pub end: usize,
    /// Índice sequencial do token na lista (0, 1, 2...).
    pub index: usize,
}

/// Tokeniza um texto.
pub fn tokenize(text: &str) -> Vec<Token> {
    TOKEN_RE
        .find_iter(text)
        .enumerate()
        .map(|(index, m)| Token {
            text: m.as_str().to_string(),
            start: m.start(),
            end: m.end(),
            index,
        })
        .collect()
}

/// Tokeniza e devolve só os textos.
pub fn token_texts(text: &str) -> Vec<String> {
    TOKEN_RE
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Constrói tokens a partir de textos já separados (ex: vindos do alinhador).
///
/// Os offsets são os de `texts.join(" ")`, de modo que continuam coerentes com
/// o texto que seria obtido juntando os tokens por espaço simples.
pub fn tokens_from_texts<S: AsRef<str>>(texts: &[S]) -> Vec<Token> {
    let mut offset = 0;
    texts
        .iter()
        .enumerate()
        .map(|(index, text)| {
            let text = text.as_ref();
            let token = Token {
                text: text.to_string(),
                start: offset,
                end: offset + text.len(),
                index,
            };
            offset += text.len() + 1;
            token
        })
        .collect()
}
