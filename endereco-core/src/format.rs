//! # Receita de Renderização
//!
//! [`FormatSpec`] diz quais campos aparecem no texto, em que ordem, e com qual
//! separador. [`PostalFormat`] diz como o CEP é exibido.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::tables::AddressField;

/// Ordem dos campos + separador.
///
/// Só aceita campos com código de entidade: um formato com `uf` ou com nome
/// desconhecido é defeito de catálogo e falha na construção.
///
/// Em JSON é representado na notação do catálogo:
/// `{"formato": "logradouro numero bairro", "separador": ", "}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawFormatSpec", into = "RawFormatSpec")]
pub struct FormatSpec {
    fields: Vec<AddressField>,
    separator: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawFormatSpec {
    formato: String,
    #[serde(default = "default_separator")]
    separador: String,
}

fn default_separator() -> String {
    ", ".to_string()
}

impl TryFrom<RawFormatSpec> for FormatSpec {
    type Error = Error;

    fn try_from(raw: RawFormatSpec) -> Result<Self> {
        FormatSpec::parse(&raw.formato, &raw.separador)
    }
}

impl From<FormatSpec> for RawFormatSpec {
    fn from(spec: FormatSpec) -> Self {
        RawFormatSpec {
            formato: spec.notation(),
            separador: spec.separator,
        }
    }
}

impl FormatSpec {
    /// Cria um formato validando os campos.
    pub fn new(fields: Vec<AddressField>, separator: impl Into<String>) -> Result<Self> {
        if fields.is_empty() {
            return Err(Error::EmptyFormat);
        }
        if let Some(field) = fields.iter().find(|f| f.entity_code().is_none()) {
            return Err(Error::UnlabeledField(*field));
        }
        Ok(Self {
            fields,
            separator: separator.into(),
        })
    }

    /// Parseia a notação do catálogo: nomes separados por espaço
    /// (ex: `"municipio bairro logradouro numero"`).
    pub fn parse(notation: &str, separator: &str) -> Result<Self> {
        let fields = notation
            .split_whitespace()
            .map(AddressField::from_name)
            .collect::<Result<Vec<_>>>()?;
        FormatSpec::new(fields, separator)
    }

    /// Formato a partir de uma ordem do catálogo estático, sem revalidar.
    pub(crate) fn from_catalog(order: &[AddressField], separator: &str) -> Self {
        Self {
            fields: order.to_vec(),
            separator: separator.to_string(),
        }
    }

    pub fn fields(&self) -> &[AddressField] {
        &self.fields
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }

    /// Notação do catálogo (ex: "logradouro numero complemento").
    pub fn notation(&self) -> String {
        self.fields
            .iter()
            .map(|f| f.name())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Default for FormatSpec {
    fn default() -> Self {
        Self {
            fields: vec![
                AddressField::Street,
                AddressField::Number,
                AddressField::Complement,
                AddressField::Neighborhood,
                AddressField::Municipality,
            ],
            separator: default_separator(),
        }
    }
}

impl fmt::Display for FormatSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{:?}]", self.notation(), self.separator)
    }
}

/// Formato de exibição do CEP (sempre 8 dígitos).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PostalFormat {
    /// `99999-999`
    #[serde(rename = "99999-999")]
    Hyphenated,
    /// `99.999-999`
    #[serde(rename = "99.999-999")]
    Dotted,
    /// `99999999`
    #[default]
    #[serde(rename = "99999999")]
    Plain,
}

impl PostalFormat {
    /// Ordem usada no sorteio.
    pub const ALL: [PostalFormat; 3] = [
        PostalFormat::Hyphenated,
        PostalFormat::Dotted,
        PostalFormat::Plain,
    ];

    pub fn pattern(&self) -> &'static str {
        match self {
            PostalFormat::Hyphenated => "99999-999",
            PostalFormat::Dotted => "99.999-999",
            PostalFormat::Plain => "99999999",
        }
    }

    /// Formata um CEP bruto.
    ///
    /// Só os dígitos ASCII são aproveitados (um CEP já formatado volta ao
    /// formato pedido); o resultado tem sempre 8 dígitos: completa com zeros à
    /// esquerda e descarta o excedente à direita.
    pub fn apply(&self, raw: &str) -> String {
        let digits: String = raw.chars().filter(char::is_ascii_digit).take(8).collect();
        let padded = format!("{digits:0>8}");
        match self {
            PostalFormat::Hyphenated => format!("{}-{}", &padded[..5], &padded[5..]),
            PostalFormat::Dotted => format!("{}.{}-{}", &padded[..2], &padded[2..5], &padded[5..]),
            PostalFormat::Plain => padded,
        }
    }
}
