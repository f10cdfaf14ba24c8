//! # Gerador de Endereços Sintéticos
//!
//! Aplica um [`AddressParams`] a um [`AddressRecord`] e devolve um
//! [`TransformedRecord`]: um registro novo, já corrompido como os cadastros
//! reais costumam estar, mais a receita de renderização.
//!
//! A função é pura. Os passos acontecem sempre nesta ordem:
//!
//! 1. Todos os campos em maiúsculas.
//! 2. Logradouro, bairro, município e complemento: abreviação (se sorteada) e
//!    depois exclusão da segunda palavra (se sorteada).
//! 3. Município + UF, se a junção foi sorteada.
//! 4. Número: texto de ausente, separador de milhar, prefixo.
//! 5. CEP no formato sorteado.

use crate::params::AddressParams;
use crate::record::{AddressRecord, TransformedRecord};
use crate::tables::{AbbreviationTable, AddressField};

/// Gerador de variações de um endereço.
#[derive(Debug, Clone)]
pub struct SyntheticAddressGenerator {
    abbreviations: AbbreviationTable,
}

impl Default for SyntheticAddressGenerator {
    fn default() -> Self {
        Self::new(AbbreviationTable::common().clone())
    }
}

impl SyntheticAddressGenerator {
    pub fn new(abbreviations: AbbreviationTable) -> Self {
        Self { abbreviations }
    }

    pub fn abbreviations(&self) -> &AbbreviationTable {
        &self.abbreviations
    }

    /// Gera a variação do registro descrita por `params`.
    pub fn generate(&self, record: &AddressRecord, params: &AddressParams) -> TransformedRecord {
        let mut out = record.map_fields(str::to_uppercase);

        for field in AddressField::CORRUPTIBLE {
            let value = out.get(field);
            if value.is_empty() {
                continue;
            }
            let mut value = value.to_string();
            if params.abbreviate_fields.contains(&field) {
                value = self.abbreviations.abbreviate(&value);
            }
            if params.delete_word_fields.contains(&field) {
                value = delete_second_word(&value);
            }
            out = out.with(field, value);
        }

        if params.merge_state {
            let merged = format!(
                "{}{}{}",
                out.municipality, params.state_separator, out.state_code
            );
            out = out.with(AddressField::Municipality, merged);
        }

        let number = format_number(&out.number, params);
        let postal = params.postal_format.apply(&out.postal_code);
        out = out
            .with(AddressField::Number, number)
            .with(AddressField::PostalCode, postal);

        TransformedRecord {
            record: out,
            format: params.format.clone(),
        }
    }
}

/// Remove a segunda palavra quando há três ou mais.
///
/// O resultado é sempre unido por espaço simples.
pub fn delete_second_word(text: &str) -> String {
    let mut words: Vec<&str> = text.split_whitespace().collect();
    if words.len() >= 3 {
        words.remove(1);
    }
    words.join(" ")
}

/// Agrupa milhares com vírgula ("1234567" → "1,234,567").
///
/// Espera só dígitos ASCII. Zeros à esquerda são descartados, mas "0" continua "0".
pub fn group_thousands(digits: &str) -> String {
    let trimmed = digits.trim_start_matches('0');
    let trimmed = if trimmed.is_empty() { "0" } else { trimmed };
    let len = trimmed.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in trimmed.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Número vazio vira o texto de ausente; só números de dígitos ASCII recebem
/// agrupamento e prefixo.
///
/// Outros dígitos decimais Unicode (ex: "١٢٣") são mantidos como vieram, ainda
/// que o tokenizador os trate como um bloco `\d+`.
fn format_number(number: &str, params: &AddressParams) -> String {
    if number.is_empty() {
        return params.missing_number.clone();
    }
    if !number.chars().all(|c| c.is_ascii_digit()) {
        return number.to_string();
    }
    let mut value = if params.thousands_separator {
        group_thousands(number)
    } else {
        number.to_string()
    };
    if let Some(prefix) = &params.number_prefix {
        value = format!("{prefix} {value}");
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{FormatSpec, PostalFormat};
    use crate::params::ParameterSampler;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn sample_record() -> AddressRecord {
        AddressRecord {
            street: "Rua A".to_string(),
            number: "123".to_string(),
            complement: "Apt 101".to_string(),
            neighborhood: "Centro".to_string(),
            municipality: "Rio de Janeiro".to_string(),
            state_code: "RJ".to_string(),
            postal_code: "20000-000".to_string(),
        }
    }

    #[test]
    fn test_default_params_render() {
        let generator = SyntheticAddressGenerator::default();
        let out = generator.generate(&sample_record(), &AddressParams::default());
        assert_eq!(out.rendered(), "RUA A, 123, APT 101, CENTRO, RIO DE JANEIRO");
        assert_eq!(out.record.postal_code, "20000000");
        assert_eq!(out.record.state_code, "RJ");
    }

    #[test]
    fn test_input_is_not_mutated() {
        let record = sample_record();
        let before = record.clone();
        let params = AddressParams {
            merge_state: true,
            ..AddressParams::default()
        };
        SyntheticAddressGenerator::default().generate(&record, &params);
        assert_eq!(record, before);
    }

    #[test]
    fn test_missing_number_placeholder() {
        let record = AddressRecord {
            number: String::new(),
            ..sample_record()
        };
        let params = AddressParams {
            missing_number: "SEM NUMERO".to_string(),
            number_prefix: Some("Nº".to_string()),
            ..AddressParams::default()
        };
        let out = SyntheticAddressGenerator::default().generate(&record, &params);
        // prefixo não se aplica ao texto de ausente
        assert_eq!(out.record.number, "SEM NUMERO");
    }

    #[test]
    fn test_number_grouping_and_prefix() {
        let record = AddressRecord {
            number: "1234".to_string(),
            ..sample_record()
        };
        let params = AddressParams {
            thousands_separator: true,
            number_prefix: Some("N.".to_string()),
            ..AddressParams::default()
        };
        let out = SyntheticAddressGenerator::default().generate(&record, &params);
        assert_eq!(out.record.number, "N. 1,234");
    }

    #[test]
    fn test_non_numeric_number_untouched() {
        let record = AddressRecord {
            number: "12b".to_string(),
            ..sample_record()
        };
        let params = AddressParams {
            thousands_separator: true,
            number_prefix: Some("NUM".to_string()),
            ..AddressParams::default()
        };
        let out = SyntheticAddressGenerator::default().generate(&record, &params);
        assert_eq!(out.record.number, "12B");
    }

    #[test]
    fn test_non_ascii_digits_untouched() {
        let record = AddressRecord {
            number: "١٢٣٤".to_string(),
            ..sample_record()
        };
        let params = AddressParams {
            thousands_separator: true,
            number_prefix: Some("Nº".to_string()),
            ..AddressParams::default()
        };
        let out = SyntheticAddressGenerator::default().generate(&record, &params);
        assert_eq!(out.record.number, "١٢٣٤");
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands("123"), "123");
        assert_eq!(group_thousands("1234"), "1,234");
        assert_eq!(group_thousands("1234567"), "1,234,567");
        assert_eq!(group_thousands("0012"), "12");
        assert_eq!(group_thousands("000"), "0");
    }

    #[test]
    fn test_merge_state() {
        let params = AddressParams {
            merge_state: true,
            state_separator: " - ".to_string(),
            ..AddressParams::default()
        };
        let out = SyntheticAddressGenerator::default().generate(&sample_record(), &params);
        assert_eq!(out.record.municipality, "RIO DE JANEIRO - RJ");
    }

    #[test]
    fn test_abbreviate_then_delete() {
        let record = AddressRecord {
            street: "Avenida Nossa Senhora de Copacabana".to_string(),
            ..sample_record()
        };
        let params = AddressParams {
            abbreviate_fields: [AddressField::Street].into_iter().collect(),
            delete_word_fields: [AddressField::Street].into_iter().collect(),
            ..AddressParams::default()
        };
        let out = SyntheticAddressGenerator::default().generate(&record, &params);
        // "AV NSA DE COPACABANA" sem a segunda palavra
        assert_eq!(out.record.street, "AV DE COPACABANA");
    }

    #[test]
    fn test_empty_table_disables_abbreviation() {
        let params = AddressParams {
            abbreviate_fields: AddressField::CORRUPTIBLE.into_iter().collect(),
            ..AddressParams::default()
        };
        let generator = SyntheticAddressGenerator::new(AbbreviationTable::empty());
        let out = generator.generate(&sample_record(), &params);
        assert_eq!(out.record.street, "RUA A");
    }

    #[test]
    fn test_delete_second_word() {
        assert_eq!(delete_second_word("RUA DAS FLORES"), "RUA FLORES");
        assert_eq!(delete_second_word("RUA  DAS   FLORES AZUIS"), "RUA FLORES AZUIS");
        assert_eq!(delete_second_word("RUA A"), "RUA A");
        assert_eq!(delete_second_word(""), "");
    }

    #[test]
    fn test_postal_format_applied() {
        let record = AddressRecord {
            postal_code: "1234567".to_string(),
            ..sample_record()
        };
        let params = AddressParams {
            postal_format: PostalFormat::Dotted,
            format: FormatSpec::parse("logradouro cep", " ").unwrap(),
            ..AddressParams::default()
        };
        let out = SyntheticAddressGenerator::default().generate(&record, &params);
        assert_eq!(out.rendered(), "RUA A 01.234-567");
    }

    #[test]
    fn test_same_seed_same_output() {
        let generator = SyntheticAddressGenerator::default();
        let sampler = ParameterSampler::default();
        let mut a = ChaCha8Rng::seed_from_u64(99);
        let mut b = ChaCha8Rng::seed_from_u64(99);
        for _ in 0..30 {
            let x = generator.generate(&sample_record(), &sampler.sample(&mut a));
            let y = generator.generate(&sample_record(), &sampler.sample(&mut b));
            assert_eq!(x, y);
        }
    }
}
