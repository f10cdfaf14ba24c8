//! # Tabelas Estáticas
//!
//! Dados somente-leitura compartilhados por todo o pipeline:
//!
//! - [`AddressField`]: os sete campos de um registro de endereço e o código de
//!   entidade BIO de cada um (quando rotulável).
//! - [`COMMON_ABBREVIATIONS`]: termo canônico → formas abreviadas, **em ordem**.
//!   A ordem importa: uma substituição posterior pode casar com texto inserido
//!   por uma anterior (ex: "NOSSA SENHORA" → "NSA" acontece antes de "SENHOR").
//! - [`AbbreviationTable`]: a mesma tabela com os padrões já compilados.
//! - [`FORMAT_CATALOG`] e demais conjuntos sorteados pelo [`crate::params`].
//!
//! As tabelas compiladas são construídas uma única vez (`Lazy`) e nunca mais
//! alteradas, então podem ser lidas de várias threads sem trava.

use std::fmt;

use once_cell::sync::Lazy;
use regex::{NoExpand, Regex};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::tagger::EntityCode;

/// Campos de um registro de endereço.
///
/// Os nomes textuais (usados no catálogo de formatos e no JSON) seguem a
/// nomenclatura dos cadastros brasileiros.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AddressField {
    #[serde(rename = "logradouro")]
    Street,
    #[serde(rename = "numero")]
    Number,
    #[serde(rename = "complemento")]
    Complement,
    #[serde(rename = "bairro")]
    Neighborhood,
    #[serde(rename = "municipio")]
    Municipality,
    #[serde(rename = "uf")]
    StateCode,
    #[serde(rename = "cep")]
    PostalCode,
}

impl AddressField {
    /// Todos os campos, na ordem do registro.
    pub const ALL: [AddressField; 7] = [
        AddressField::Street,
        AddressField::Number,
        AddressField::Complement,
        AddressField::Neighborhood,
        AddressField::Municipality,
        AddressField::StateCode,
        AddressField::PostalCode,
    ];

    /// Campos sujeitos a abreviação e exclusão de palavra, na ordem em que o
    /// sorteador consome números aleatórios para eles.
    pub const CORRUPTIBLE: [AddressField; 4] = [
        AddressField::Street,
        AddressField::Neighborhood,
        AddressField::Municipality,
        AddressField::Complement,
    ];

    /// Nome textual do campo (ex: "logradouro").
    pub fn name(&self) -> &'static str {
        match self {
            AddressField::Street => "logradouro",
            AddressField::Number => "numero",
            AddressField::Complement => "complemento",
            AddressField::Neighborhood => "bairro",
            AddressField::Municipality => "municipio",
            AddressField::StateCode => "uf",
            AddressField::PostalCode => "cep",
        }
    }

    /// Parseia o nome textual; nomes desconhecidos são erro de configuração.
    pub fn from_name(name: &str) -> Result<Self> {
        AddressField::ALL
            .into_iter()
            .find(|f| f.name() == name)
            .ok_or_else(|| Error::UnknownField(name.to_string()))
    }

    /// Código de entidade BIO do campo. `uf` não é rotulável.
    pub fn entity_code(&self) -> Option<EntityCode> {
        match self {
            AddressField::Street => Some(EntityCode::Log),
            AddressField::Number => Some(EntityCode::Num),
            AddressField::Complement => Some(EntityCode::Com),
            AddressField::Neighborhood => Some(EntityCode::Loc),
            AddressField::Municipality => Some(EntityCode::Mun),
            AddressField::PostalCode => Some(EntityCode::Cep),
            AddressField::StateCode => None,
        }
    }
}

impl fmt::Display for AddressField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

use AddressField as F;

/// Catálogo de ordens de campos sorteadas na geração sintética.
pub const FORMAT_CATALOG: &[&[AddressField]] = &[
    // Ordem usual
    &[F::Street, F::Number, F::Complement],
    &[F::Street, F::Number, F::Complement, F::Neighborhood],
    &[F::Street, F::Number, F::Complement, F::Neighborhood, F::Municipality],
    &[F::Street, F::Number, F::Complement, F::Neighborhood, F::Municipality, F::PostalCode],
    // CEP intercalado
    &[F::Street, F::Number, F::Complement, F::PostalCode, F::Neighborhood, F::Municipality],
    &[F::Street, F::Number, F::Complement, F::Neighborhood, F::PostalCode, F::Municipality],
    // Ordem inversa
    &[F::Municipality, F::Neighborhood, F::Street, F::Number, F::Complement],
    // Bairro antes do número
    &[F::Street, F::Neighborhood, F::Number, F::Complement, F::Municipality],
    &[F::Street, F::Number, F::Neighborhood, F::Complement],
];

/// Separadores entre campos no texto renderizado.
pub const OUTPUT_SEPARATORS: &[&str] = &[", ", " "];

/// Separadores usados ao juntar município e UF.
pub const STATE_MERGE_SEPARATORS: &[&str] = &[" ", "-", " - ", "/"];

/// Textos que substituem um número ausente.
pub const MISSING_NUMBER_PLACEHOLDERS: &[&str] =
    &["", "S/N", "SN", "S N", "SEM NUMERO", "SEM NUM"];

/// Prefixos eventualmente colocados antes do número.
pub const NUMBER_PREFIXES: &[&str] = &["N.", "NUM", "NO", "Nº"];

/// Abreviações comuns em endereços brasileiros.
///
/// Só a primeira forma de cada termo é usada na substituição (determinística);
/// as demais documentam variações reais encontradas nas bases.
pub const COMMON_ABBREVIATIONS: &[(&str, &[&str])] = &[
    ("RUA", &["RU", "R", "R.", "R,", "RUA R", "RUA RU", "RUA R.", "RUA R,"]),
    ("RODOVIA", &["ROD", "RDV", "ROD.", "RDV.", "ROD,", "RDV,", "RUA ROD", "RUA RDV", "RODOVIA ROD", "RODOVIA RDV", "RODOVIA-"]),
    ("AVENIDA", &["AV", "AVE", "AVN", "AVD", "AVDA", "AVI", "AV.", "AV,", "RUA AV", "RUA AVE", "RODOVIA AV", "AVENIDA AV", "AVENIDA-"]),
    ("ESTRADA", &["EST", "ESTR", "ETR", "EST.", "ETR.", "RUA EST", "RODOVIA ESTR", "ESTRADA ESTR", "ESTRADA-"]),
    ("PRACA", &["PCA", "PRC", "PCA.", "PRC.", "RUA PCA", "RUA PRC", "PRACA PCA", "PRACA PRC", "PRACA-"]),
    ("BECO", &["BC", "BEC", "BE", "BE.", "BCO", "BECO", "RUA BECO", "BECO BE", "BECO-"]),
    ("TRAVESSA", &["TV", "TRV", "TRAV", "TRAV.", "RUA TRAV", "RODOVIA TRV", "TRAVESSA TRAV", "TRAVESSA-"]),
    ("PARQUE", &["P", "PQ", "PQU", "PARQ", "PQUE", "PARQUE", "RUA PQ", "RODOVIA PARQUE", "PARQUE PQU", "PARQUE-"]),
    ("ALAMEDA", &["ALA", "AL", "ALA.", "AL.", "RUA ALA", "ALAMEDA ALA", "ALAMEDA-", "RODOVIA ALA"]),
    ("LOTEAMENTO", &["LOT", "LOT.", "RUA LOT", "LOTEAMENTO LOT", "LOTEAMENTO-"]),
    ("LOCALIDADE", &["LOC", "LOC.", "RUA LOC", "LOCALIDADE LOC", "LOCALIDADE-"]),
    ("VILA", &["VL", "VL.", "VILA VILA", "VILA-", "VILA ,"]),
    ("LADEIRA", &["LAD", "LAD.", "LADEIRA LAD", "LADEIRA-"]),
    ("DISTRITO", &["DT", "DISTR", "DISTR.", "DISTRITO DISTRITO", "DISTRITO-"]),
    ("NUCLEO", &["NUC", "NUC.", "NUCLEO NUCLEO", "NUCLEO-"]),
    ("LARGO", &["LRG", "LGO", "LARGO LRG", "LARGO LGO", "LARGO-"]),
    ("AEROPORTO", &["AER", "AERO", "AEROP", "AEROP.", "AEROPORTO AER", "AEROPORTO INTERNACIONAL"]),
    ("CONDOMINIO", &["COND", "COND.", "RODOVIA COND", "CONDOMINIO COND"]),
    ("FAZENDA", &["FAZ", "FAZ.", "FAZEN", "FAZEN.", "FAZENDA FAZ", "FAZENDA-"]),
    ("COLONIA", &["COL", "COL.", "COL AGR", "COLONIA AGR", "COLONIA AGRICOLA"]),
    ("SANTA", &["STA", "STA.", "SA"]),
    ("SANTO", &["STO", "STO.", "S"]),
    ("NOSSA SENHORA", &["NSA", "NS", "NOSSA SRA", "NOSSA SENHORA", "N SRA"]),
    ("SENHOR DO BONFIM", &["SR BONFIM", "SENHOR BONFIM", "SR DO BONFIM"]),
    ("SENHOR", &["SR"]),
    ("NOSSO SENHOR", &["NS"]),
    ("ALMIRANTE", &["ALM", "ALTE", "ALTE."]),
    ("MARECHAL", &["MAL", "MAR."]),
    ("GENERAL", &["GEN", "GAL"]),
    ("SARGENTO", &["SGT", "SGTO", "SARG"]),
    ("PRIMEIRO-SARGENTO", &["1 SARGENTO", "PRIM SARGENTO"]),
    ("SEGUNDO-SARGENTO", &["2 SARGENTO", "SEG SARGENTO"]),
    ("TERCEIRO-SARGENTO", &["3 SARGENTO", "TERC SARGENTO"]),
    ("CORONEL", &["CEL"]),
    ("BRIGADEIRO", &["BRIG"]),
    ("TENENTE", &["TEN"]),
    ("TENENTE-CORONEL", &["TENENTE CORONEL"]),
    ("TENENTE-BRIGADEIRO", &["TENENTE BRIGADEIRO"]),
    ("TENENTE-AVIADOR", &["TENENTE AVIADOR"]),
    ("SUBTENENTE", &["SUB TENENTE"]),
    ("PRIMEIRO-TENENTE", &["1 TENENTE", "PRIM TENENTE"]),
    ("SEGUNDO-TENENTE", &["2 TENENTE", "SEG TENENTE"]),
    ("SOLDADO", &["SOLD"]),
    ("MAJOR", &["MAJ"]),
    ("PROFESSOR", &["PROF"]),
    ("PROFESSORA", &["PROFA"]),
    ("DOUTOR", &["DR"]),
    ("DOUTORA", &["DRA"]),
    ("ENGENHEIRO", &["ENG"]),
    ("ENGENHEIRA", &["ENGA"]),
    ("PADRE", &["PE."]),
    ("MONSENHOR", &["MONS"]),
    ("PRESIDENTE", &["PRES", "PRESID"]),
    ("GOVERNADOR", &["GOV"]),
    ("SENADOR", &["SEN"]),
    ("PREFEITO", &["PREF"]),
    ("DEPUTADO", &["DEP"]),
    ("VEREADOR", &["VER"]),
    ("ESPLANADA DOS MINISTERIOS", &["ESPL MIN", "ESPLANADA MINISTERIOS"]),
    ("MINISTRO", &["MIN", "MIN."]),
    ("JARDIM", &["JD", "JARD", "JAR DIM", "JAR.", "JARDIM"]),
    ("UNIDADE", &["UNID"]),
    ("CONJUNTO", &["CJ", "CONJ"]),
    ("LOTE", &["LT"]),
    ("LOTES", &["LTS"]),
    ("QUADRA", &["QDA"]),
    ("LOJA", &["LJ"]),
    ("LOJAS", &["LJS"]),
    ("APARTAMENTO", &["APTO", "APT"]),
    ("BLOCO", &["BL"]),
    ("SALAS", &["SLS"]),
    ("EDIFICIO", &["EDIF", "EDIF."]),
    ("EDIFICIO EMPRESARIAL", &["EDIF EMP", "ED EMP"]),
    ("KM", &["KM."]),
    ("S/N", &["S N", "S.N", "S. N."]),
    ("ANDAR", &["1. ANDAR", "2 AND", "3. AND"]),
    ("ANDARES", &["2. ANDARES"]),
    ("CAIXA POSTAL", &["CX P", "C.P", "CX POSTAL", "CP POSTAL"]),
    ("DOM", &["D"]),
    ("INFANTE DOM", &["INF DOM", "INF D"]),
    ("GETULIO VARGAS", &["GETULHO VARGAS", "JETULHO VARGAS", "GET VARGAS", "JET VARGAS"]),
    ("JUSCELINO KUBITSCHEK", &["J. K.", "JUSC KUB", "JUSCELINO KUB", "JK"]),
    ("BEIRA MAR", &["BEIRA-MAR"]),
    ("RODOVIA BR-116", &["BR 116", "RODOVIA CENTO DEZESEIS", "RODOVIA CENTO E DEZESEIS"]),
    ("RODOVIA BR-101", &["BR 101", "RODOVIA CENTO E UM"]),
];

static COMMON_TABLE: Lazy<AbbreviationTable> = Lazy::new(|| {
    AbbreviationTable::from_entries(COMMON_ABBREVIATIONS)
        .expect("tabela de abreviações embutida contém padrão inválido")
});

/// Uma entrada compilada: termo canônico, padrão de palavra inteira e forma escolhida.
#[derive(Debug, Clone)]
struct AbbreviationEntry {
    term: String,
    pattern: Regex,
    replacement: String,
}

/// Tabela ordenada de abreviações com os padrões já compilados.
///
/// Cada termo vira `(?i)\bTERMO\b` com o termo escapado (casamento literal).
#[derive(Debug, Clone, Default)]
pub struct AbbreviationTable {
    entries: Vec<AbbreviationEntry>,
}

impl AbbreviationTable {
    /// Compila uma tabela preservando a ordem das entradas.
    /// Termos sem nenhuma forma abreviada são ignorados.
    pub fn from_entries(entries: &[(&str, &[&str])]) -> Result<Self> {
        let mut compiled = Vec::with_capacity(entries.len());
        for (term, forms) in entries {
            let Some(first) = forms.first() else {
                continue;
            };
            let pattern = Regex::new(&format!(r"(?i)\b{}\b", regex::escape(term)))?;
            compiled.push(AbbreviationEntry {
                term: term.to_string(),
                pattern,
                replacement: first.to_string(),
            });
        }
        Ok(Self { entries: compiled })
    }

    /// Tabela embutida com as abreviações comuns.
    pub fn common() -> &'static AbbreviationTable {
        &COMMON_TABLE
    }

    /// Tabela vazia: a abreviação vira identidade.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Termos canônicos na ordem de aplicação.
    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.term.as_str())
    }

    /// Aplica todas as entradas, em ordem, sobre o texto.
    pub fn abbreviate(&self, text: &str) -> String {
        let mut out = text.to_string();
        for entry in &self.entries {
            if entry.pattern.is_match(&out) {
                out = entry
                    .pattern
                    .replace_all(&out, NoExpand(&entry.replacement))
                    .into_owned();
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_names_roundtrip() {
        for field in AddressField::ALL {
            assert_eq!(AddressField::from_name(field.name()).unwrap(), field);
        }
        assert!(matches!(
            AddressField::from_name("logradoro"),
            Err(Error::UnknownField(_))
        ));
    }

    #[test]
    fn test_state_code_is_not_labelable() {
        assert_eq!(AddressField::StateCode.entity_code(), None);
        assert_eq!(AddressField::PostalCode.entity_code(), Some(EntityCode::Cep));
    }

    #[test]
    fn test_catalog_has_only_labelable_fields() {
        assert!(FORMAT_CATALOG.len() >= 9);
        for order in FORMAT_CATALOG {
            assert!(order.iter().all(|f| f.entity_code().is_some()));
        }
    }

    #[test]
    fn test_abbreviate_whole_word_case_insensitive() {
        let table = AbbreviationTable::common();
        assert_eq!(table.abbreviate("RUA DAS FLORES"), "RU DAS FLORES");
        assert_eq!(table.abbreviate("avenida paulista"), "AV paulista");
        // "RUAS" não é a palavra "RUA"
        assert_eq!(table.abbreviate("RUAS"), "RUAS");
    }

    #[test]
    fn test_abbreviate_order_matters() {
        // "NOSSA SENHORA" vem antes de "SENHOR" na tabela
        let table = AbbreviationTable::common();
        assert_eq!(table.abbreviate("NOSSA SENHORA DA PAZ"), "NSA DA PAZ");

        let reversed = AbbreviationTable::from_entries(&[
            ("SENHORA", &["SRA"]),
            ("NOSSA SENHORA", &["NSA"]),
        ])
        .unwrap();
        assert_eq!(reversed.abbreviate("NOSSA SENHORA"), "NOSSA SRA");
    }

    #[test]
    fn test_later_entry_rematches_inserted_text() {
        let table = AbbreviationTable::from_entries(&[
            ("TRAVESSA", &["RUA TRAV"]),
            ("RUA", &["R"]),
        ])
        .unwrap();
        assert_eq!(table.abbreviate("TRAVESSA A"), "R TRAV A");
    }

    #[test]
    fn test_replacement_is_literal() {
        let table = AbbreviationTable::from_entries(&[("KM", &["$1 KM"])]).unwrap();
        assert_eq!(table.abbreviate("KM 10"), "$1 KM 10");
    }

    #[test]
    fn test_empty_table_is_identity() {
        let table = AbbreviationTable::empty();
        assert!(table.is_empty());
        assert_eq!(table.abbreviate("RUA A"), "RUA A");
    }
}
