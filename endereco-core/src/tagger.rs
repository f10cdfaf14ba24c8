//! # Esquema de Tags BIO e Códigos de Entidade
//!
//! Define o esquema de anotação **BIO** (Beginning-Inside-Outside) utilizado
//! para rotular os tokens de um endereço.
//!
//! ## Códigos de Entidade
//!
//! | Código | Campo        | Exemplos                    |
//! |--------|--------------|-----------------------------|
//! | LOG    | Logradouro   | RUA DAS FLORES, AV PAULISTA |
//! | NUM    | Número       | 123, S/N, N. 1,000          |
//! | COM    | Complemento  | APTO 5, BL B                |
//! | LOC    | Bairro       | CENTRO, BELA VISTA          |
//! | MUN    | Município    | SAO PAULO, RIO-RJ           |
//! | CEP    | CEP          | 01311-200, 01.311-200       |
//! | O      | Fora         | separadores                 |
//!
//! ## Esquema BIO
//!
//! - `B-COD`: primeiro token de um campo
//! - `I-COD`: tokens seguintes do mesmo campo
//! - `O`: não pertence a nenhum campo

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::tokenizer::Token;

/// Códigos de entidade, um por campo rotulável do endereço.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntityCode {
    /// **Logradouro**: tipo e nome da via.
    Log,
    /// **Número** do imóvel, ou o marcador de sem número.
    Num,
    /// **Complemento**: apartamento, bloco, sala, lote.
    Com,
    /// **Bairro** (localidade).
    Loc,
    /// **Município**, eventualmente colado à UF.
    Mun,
    /// **CEP** em qualquer um dos três formatos.
    Cep,
}

impl EntityCode {
    pub const ALL: [EntityCode; 6] = [
        EntityCode::Log,
        EntityCode::Num,
        EntityCode::Com,
        EntityCode::Loc,
        EntityCode::Mun,
        EntityCode::Cep,
    ];

    /// Nome do código como string (ex: "LOG")
    pub fn name(&self) -> &'static str {
        match self {
            EntityCode::Log => "LOG",
            EntityCode::Num => "NUM",
            EntityCode::Com => "COM",
            EntityCode::Loc => "LOC",
            EntityCode::Mun => "MUN",
            EntityCode::Cep => "CEP",
        }
    }

    /// Tenta parsear a partir de string (ex: "MUN" → Some(Mun))
    pub fn from_name(s: &str) -> Option<Self> {
        EntityCode::ALL.into_iter().find(|c| c.name() == s)
    }
}

impl fmt::Display for EntityCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Tag BIO aplicada a um token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Tag {
    /// **Begin**: início de um campo. Ex: **RUA** (B-LOG) DAS FLORES.
    Begin(EntityCode),
    /// **Inside**: continuação de um campo. Ex: RUA **DAS** (I-LOG) FLORES.
    Inside(EntityCode),
    /// **Outside**: separador ou ruído.
    Outside,
}

impl Tag {
    /// Representação textual da tag (ex: "B-LOG", "I-CEP", "O")
    pub fn label(&self) -> String {
        match self {
            Tag::Begin(code) => format!("B-{}", code.name()),
            Tag::Inside(code) => format!("I-{}", code.name()),
            Tag::Outside => "O".to_string(),
        }
    }

    /// Índice numérico da tag, 0..13.
    pub fn index(&self) -> usize {
        match self {
            Tag::Outside => 0,
            Tag::Begin(code) => 1 + 2 * (*code as usize),
            Tag::Inside(code) => 2 + 2 * (*code as usize),
        }
    }

    /// Número total de tags possíveis
    pub const COUNT: usize = 13;

    /// Todas as tags em ordem de índice (para iteração)
    pub fn all() -> [Tag; 13] {
        let mut tags = [Tag::Outside; 13];
        for code in EntityCode::ALL {
            tags[Tag::Begin(code).index()] = Tag::Begin(code);
            tags[Tag::Inside(code).index()] = Tag::Inside(code);
        }
        tags
    }

    /// Retorna o código desta tag (se for B- ou I-)
    pub fn code(&self) -> Option<EntityCode> {
        match self {
            Tag::Begin(c) | Tag::Inside(c) => Some(*c),
            Tag::Outside => None,
        }
    }

    /// Verifica se a transição tag_prev → next é válida no esquema BIO
    ///
    /// Regras:
    /// - `I-X` só pode seguir `B-X` ou `I-X` (mesmo código)
    /// - `B-X` e `O` podem seguir qualquer tag
    pub fn is_valid_transition(prev: &Tag, next: &Tag) -> bool {
        match next {
            Tag::Inside(code) => match prev {
                Tag::Begin(prev_code) | Tag::Inside(prev_code) => prev_code == code,
                Tag::Outside => false,
            },
            _ => true,
        }
    }

    /// Parseia uma tag a partir de string (ex: "B-LOG" → Begin(Log))
    pub fn from_label(s: &str) -> Option<Self> {
        if s == "O" {
            return Some(Tag::Outside);
        }
        let (prefix, code) = s.split_once('-')?;
        let code = EntityCode::from_name(code)?;
        match prefix {
            "B" => Some(Tag::Begin(code)),
            "I" => Some(Tag::Inside(code)),
            _ => None,
        }
    }

    /// Como [`Tag::from_label`], mas com erro para rótulos fora do vocabulário.
    pub fn parse(s: &str) -> Result<Self> {
        Tag::from_label(s).ok_or_else(|| Error::UnknownLabel(s.to_string()))
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl Serialize for Tag {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.label())
    }
}

impl<'de> Deserialize<'de> for Tag {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Tag::from_label(&s).ok_or_else(|| serde::de::Error::custom(format!("tag desconhecida: {s}")))
    }
}

/// Verifica se uma sequência inteira respeita as transições BIO.
pub fn is_valid_sequence(tags: &[Tag]) -> bool {
    let mut prev = Tag::Outside;
    for tag in tags {
        if !Tag::is_valid_transition(&prev, tag) {
            return false;
        }
        prev = *tag;
    }
    true
}

/// Um campo reconstruído a partir de tags previstas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpan {
    /// Tokens do campo unidos por espaço simples (ex: "SAO PAULO")
    pub text: String,
    pub code: EntityCode,
    /// Índice do primeiro token
    pub start_token: usize,
    /// Índice do último token (inclusivo)
    pub end_token: usize,
    /// Posição de byte inicial no texto original
    pub start: usize,
    /// Posição de byte final no texto original
    pub end: usize,
}

/// Converte uma sequência de tokens rotulados em campos.
///
/// Máquina de estados do BIO:
/// - Inicia um novo campo ao encontrar `B-X`.
/// - Continua enquanto encontrar `I-X` do **mesmo** código.
/// - Finaliza ao encontrar `O`, `B-Y` ou `I-Y`.
///
/// Um `I-X` órfão (sem `B-X` antes) é descartado.
///
/// # Exemplo
/// `[B-LOG, I-LOG, O, B-NUM]` -> `[FieldSpan(LOG), FieldSpan(NUM)]`
pub fn tokens_to_spans(tokens: &[Token], tags: &[Tag]) -> Result<Vec<FieldSpan>> {
    if tokens.len() != tags.len() {
        return Err(Error::LengthMismatch {
            tokens: tokens.len(),
            tags: tags.len(),
        });
    }

    let mut spans = Vec::new();
    let mut i = 0;

    while i < tags.len() {
        if let Tag::Begin(code) = tags[i] {
            let mut j = i + 1;
            while j < tags.len() && tags[j] == Tag::Inside(code) {
                j += 1;
            }

            let text = tokens[i..j]
                .iter()
                .map(|t| t.text.as_str())
                .collect::<Vec<_>>()
                .join(" ");
            spans.push(FieldSpan {
                text,
                code,
                start_token: tokens[i].index,
                end_token: tokens[j - 1].index,
                start: tokens[i].start,
                end: tokens[j - 1].end,
            });

            i = j;
        } else {
            i += 1;
        }
    }

    Ok(spans)
}

/// Agrupa os campos reconstruídos por código de entidade.
///
/// Um mesmo código pode aparecer mais de uma vez (ex: dois trechos de
/// complemento separados por vírgula); cada trecho vira um valor.
pub fn group_fields(tokens: &[Token], tags: &[Tag]) -> Result<BTreeMap<EntityCode, Vec<String>>> {
    let mut groups: BTreeMap<EntityCode, Vec<String>> = BTreeMap::new();
    for span in tokens_to_spans(tokens, tags)? {
        groups.entry(span.code).or_default().push(span.text);
    }
    Ok(groups)
}
