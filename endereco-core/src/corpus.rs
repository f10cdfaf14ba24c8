//! # Corpus de Endereços Brasileiros
//!
//! Dados embutidos para demonstração e testes:
//!
//! - [`demo_records`]: registros estruturados (como vêm de um cadastro) de
//!   várias regiões, com campos faltando, acentos e abreviações.
//! - [`annotated_addresses`]: endereços em texto livre anotados à mão no
//!   formato BIO, usados para avaliar um etiquetador.
//! - [`demo_texts`]: textos livres para a interface web.

use crate::record::AddressRecord;

/// Um endereço em texto livre anotado no formato BIO.
pub struct AnnotatedAddress {
    /// O texto como foi digitado.
    pub text: &'static str,
    /// Origem do endereço (utilizada para análise de erro por categoria).
    pub source: &'static str,
    /// Pares (token, tag_BIO), na ordem do tokenizador.
    pub annotations: &'static [(&'static str, &'static str)],
}

fn record(
    street: &str,
    number: &str,
    complement: &str,
    neighborhood: &str,
    municipality: &str,
    state_code: &str,
    postal_code: &str,
) -> AddressRecord {
    AddressRecord {
        street: street.to_string(),
        number: number.to_string(),
        complement: complement.to_string(),
        neighborhood: neighborhood.to_string(),
        municipality: municipality.to_string(),
        state_code: state_code.to_string(),
        postal_code: postal_code.to_string(),
    }
}

/// Registros estruturados de exemplo.
pub fn demo_records() -> Vec<AddressRecord> {
    vec![
        record("Rua das Flores", "123", "Apto 5", "Centro", "São Paulo", "SP", "01000-000"),
        record("Avenida Paulista", "1578", "Conjunto 42", "Bela Vista", "São Paulo", "SP", "01310-200"),
        record("Avenida Nossa Senhora de Copacabana", "680", "Loja 3", "Copacabana", "Rio de Janeiro", "RJ", "22050-001"),
        record("Rua Padre Chagas", "", "", "Moinhos de Vento", "Porto Alegre", "RS", "90570080"),
        record("Travessa Dom Pedro II", "45", "Bloco B Apartamento 201", "Centro Histórico", "Salvador", "BA", "40020-000"),
        record("Rodovia BR-101", "12000", "Galpão 7", "Distrito Industrial", "Joinville", "SC", "89219-510"),
        record("Praça da Sé", "10", "", "Sé", "São Paulo", "SP", "1001000"),
        record("Alameda Santos", "2159", "Sala 1201", "Jardim Paulista", "São Paulo", "SP", "01419-002"),
        record("Estrada do Coco", "3000", "Condomínio Encontro das Águas", "Vila de Abrantes", "Camaçari", "BA", "42840-000"),
        record("Rua General Osório", "07", "", "Centro", "Santa Maria", "RS", "97010-000"),
        record("Avenida Getúlio Vargas", "1000", "Edifício Central", "Funcionários", "Belo Horizonte", "MG", "30112-020"),
        record("Quadra 104 Norte", "", "Lote 12", "Plano Diretor Norte", "Palmas", "TO", ""),
    ]
}

/// Endereços em texto livre com anotação BIO.
pub fn annotated_addresses() -> Vec<AnnotatedAddress> {
    vec![
        AnnotatedAddress {
            text: "Rua das Flores, 123, Apto 5, Centro, São Paulo",
            source: "cadastro",
            annotations: &[
                ("Rua", "B-LOG"), ("das", "I-LOG"), ("Flores", "I-LOG"), (",", "O"),
                ("123", "B-NUM"), (",", "O"),
                ("Apto", "B-COM"), ("5", "I-COM"), (",", "O"),
                ("Centro", "B-LOC"), (",", "O"),
                ("São", "B-MUN"), ("Paulo", "I-MUN"),
            ],
        },
        AnnotatedAddress {
            text: "AV PAULISTA 1578 BELA VISTA SAO PAULO 01310-200",
            source: "cnpj",
            annotations: &[
                ("AV", "B-LOG"), ("PAULISTA", "I-LOG"),
                ("1578", "B-NUM"),
                ("BELA", "B-LOC"), ("VISTA", "I-LOC"),
                ("SAO", "B-MUN"), ("PAULO", "I-MUN"),
                ("01310", "B-CEP"), ("-", "I-CEP"), ("200", "I-CEP"),
            ],
        },
        AnnotatedAddress {
            text: "Porto Alegre, Moinhos de Vento, R. Padre Chagas, S/N",
            source: "cadastro",
            annotations: &[
                ("Porto", "B-MUN"), ("Alegre", "I-MUN"), (",", "O"),
                ("Moinhos", "B-LOC"), ("de", "I-LOC"), ("Vento", "I-LOC"), (",", "O"),
                ("R", "B-LOG"), (".", "I-LOG"), ("Padre", "I-LOG"), ("Chagas", "I-LOG"), (",", "O"),
                ("S", "B-NUM"), ("/", "I-NUM"), ("N", "I-NUM"),
            ],
        },
        AnnotatedAddress {
            text: "ROD BR-101 Nº 12,000 GALPAO 7 DISTRITO INDUSTRIAL JOINVILLE-SC",
            source: "cnpj",
            annotations: &[
                ("ROD", "B-LOG"), ("BR", "I-LOG"), ("-", "I-LOG"), ("101", "I-LOG"),
                ("Nº", "B-NUM"), ("12", "I-NUM"), (",", "I-NUM"), ("000", "I-NUM"),
                ("GALPAO", "B-COM"), ("7", "I-COM"),
                ("DISTRITO", "B-LOC"), ("INDUSTRIAL", "I-LOC"),
                ("JOINVILLE", "B-MUN"), ("-", "I-MUN"), ("SC", "I-MUN"),
            ],
        },
    ]
}

/// Textos de demonstração para a interface web
pub fn demo_texts() -> Vec<(&'static str, &'static str)> {
    vec![
        ("Completo", "Rua das Flores, 123, Apto 5, Centro, São Paulo - SP, 01000-000"),
        ("Sem separadores", "AV PAULISTA 1578 CJ 42 BELA VISTA SAO PAULO 01310200"),
        ("Ordem inversa", "Rio de Janeiro, Copacabana, Av. N. Sra. de Copacabana, 680"),
        ("Sem número", "R PADRE CHAGAS S/N MOINHOS DE VENTO PORTO ALEGRE/RS"),
        ("CEP no meio", "Alameda Santos 2159 sala 1201 01.419-002 Jardim Paulista São Paulo"),
        ("Prefixo no número", "TRAVESSA DOM PEDRO II Nº 45 BL B APTO 201 CENTRO HISTORICO SALVADOR"),
    ]
}
