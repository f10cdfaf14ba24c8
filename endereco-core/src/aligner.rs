//! # Rotulador BIO
//!
//! Monta a sequência `(tokens, tags)` de treino a partir de um registro e da
//! receita de renderização, **campo a campo**: cada valor é tokenizado
//! isoladamente e recebe `B-COD` no primeiro token e `I-COD` nos demais. O
//! separador é tokenizado uma vez e entra entre campos com tag `O`.
//!
//! Como o tokenizador nunca junta tokens através de espaço, o resultado é o
//! mesmo que se obteria tokenizando o texto renderizado; a diferença é que aqui
//! as fronteiras entre campos são conhecidas.
//!
//! ## Exemplo
//!
//! Formato `logradouro numero`, separador `", "`:
//!
//! ```text
//! RUA    DAS    FLORES  ,  123
//! B-LOG  I-LOG  I-LOG   O  B-NUM
//! ```

use serde::{Deserialize, Serialize};

use crate::format::FormatSpec;
use crate::record::{AddressRecord, TransformedRecord};
use crate::tagger::Tag;
use crate::tokenizer::token_texts;

/// Tokens e tags paralelos de um endereço rotulado.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignedSequence {
    pub tokens: Vec<String>,
    pub tags: Vec<Tag>,
}

impl AlignedSequence {
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Tags como strings ("B-LOG", "O"...).
    pub fn labels(&self) -> Vec<String> {
        self.tags.iter().map(Tag::label).collect()
    }

    pub fn into_parts(self) -> (Vec<String>, Vec<Tag>) {
        (self.tokens, self.tags)
    }
}

/// Rotula um registro segundo o formato.
///
/// Campos vazios, que não produzem tokens ou sem código de entidade são
/// pulados, e nesse caso também não recebem separador.
pub fn align(record: &AddressRecord, format: &FormatSpec) -> AlignedSequence {
    let separator = token_texts(format.separator());
    let mut out = AlignedSequence::default();

    for field in format.fields() {
        let Some(code) = field.entity_code() else {
            continue;
        };
        let value = record.get(*field);
        if value.is_empty() {
            continue;
        }
        let field_tokens = token_texts(value);
        if field_tokens.is_empty() {
            continue;
        }

        if !out.tokens.is_empty() {
            out.tokens.extend(separator.iter().cloned());
            out.tags.extend(std::iter::repeat(Tag::Outside).take(separator.len()));
        }

        out.tags.push(Tag::Begin(code));
        out.tags
            .extend(std::iter::repeat(Tag::Inside(code)).take(field_tokens.len() - 1));
        out.tokens.extend(field_tokens);
    }
    out
}

/// Rotula um registro já transformado, usando o formato que ele carrega.
pub fn align_transformed(transformed: &TransformedRecord) -> AlignedSequence {
    align(&transformed.record, &transformed.format)
}
