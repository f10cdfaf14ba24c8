//! # Registros de Endereço
//!
//! [`AddressRecord`] é a linha estruturada de entrada (sete campos texto).
//! [`TransformedRecord`] é o resultado do gerador: um novo registro mais a
//! receita de renderização escolhida.

use serde::{Deserialize, Serialize};

use crate::format::FormatSpec;
use crate::tables::AddressField;

/// Um endereço estruturado.
///
/// Campos ausentes no JSON viram string vazia.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AddressRecord {
    #[serde(rename = "logradouro")]
    pub street: String,
    #[serde(rename = "numero")]
    pub number: String,
    #[serde(rename = "complemento")]
    pub complement: String,
    #[serde(rename = "bairro")]
    pub neighborhood: String,
    #[serde(rename = "municipio")]
    pub municipality: String,
    #[serde(rename = "uf")]
    pub state_code: String,
    #[serde(rename = "cep")]
    pub postal_code: String,
}

impl AddressRecord {
    /// Valor de um campo.
    pub fn get(&self, field: AddressField) -> &str {
        match field {
            AddressField::Street => &self.street,
            AddressField::Number => &self.number,
            AddressField::Complement => &self.complement,
            AddressField::Neighborhood => &self.neighborhood,
            AddressField::Municipality => &self.municipality,
            AddressField::StateCode => &self.state_code,
            AddressField::PostalCode => &self.postal_code,
        }
    }

    /// Novo registro com um campo trocado.
    pub fn with(mut self, field: AddressField, value: impl Into<String>) -> Self {
        let value = value.into();
        match field {
            AddressField::Street => self.street = value,
            AddressField::Number => self.number = value,
            AddressField::Complement => self.complement = value,
            AddressField::Neighborhood => self.neighborhood = value,
            AddressField::Municipality => self.municipality = value,
            AddressField::StateCode => self.state_code = value,
            AddressField::PostalCode => self.postal_code = value,
        }
        self
    }

    /// Novo registro aplicando `f` a todos os campos.
    pub fn map_fields(&self, f: impl Fn(&str) -> String) -> Self {
        Self {
            street: f(&self.street),
            number: f(&self.number),
            complement: f(&self.complement),
            neighborhood: f(&self.neighborhood),
            municipality: f(&self.municipality),
            state_code: f(&self.state_code),
            postal_code: f(&self.postal_code),
        }
    }
}

/// Registro gerado + receita de renderização.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformedRecord {
    pub record: AddressRecord,
    pub format: FormatSpec,
}

impl TransformedRecord {
    /// Texto do endereço renderizado: os campos do formato que têm conteúdo,
    /// na ordem, unidos pelo separador.
    ///
    /// Campos vazios ou só com espaços são omitidos, sem separador extra.
    pub fn rendered(&self) -> String {
        self.format
            .fields()
            .iter()
            .map(|f| self.record.get(*f))
            .filter(|v| !v.trim().is_empty())
            .collect::<Vec<_>>()
            .join(self.format.separator())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_json_uses_portuguese_names() {
        let record: AddressRecord =
            serde_json::from_str(r#"{"logradouro": "Rua A", "cep": "12345678"}"#).unwrap();
        assert_eq!(record.street, "Rua A");
        assert_eq!(record.postal_code, "12345678");
        assert_eq!(record.number, "");
    }

    #[test]
    fn test_with_returns_new_value() {
        let original = AddressRecord::default();
        let changed = original.clone().with(AddressField::Neighborhood, "CENTRO");
        assert_eq!(original.neighborhood, "");
        assert_eq!(changed.get(AddressField::Neighborhood), "CENTRO");
    }

    #[test]
    fn test_rendered_skips_blank_fields() {
        let record = AddressRecord::default()
            .with(AddressField::Street, "RUA A")
            .with(AddressField::Number, "10")
            .with(AddressField::Complement, "  ")
            .with(AddressField::Municipality, "RIO");
        let transformed = TransformedRecord {
            record,
            format: FormatSpec::default(),
        };
        assert_eq!(transformed.rendered(), "RUA A, 10, RIO");
    }
}
