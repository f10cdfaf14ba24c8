use std::sync::Arc;

use endereco_core::corpus::{annotated_addresses, demo_records};
use endereco_core::dataset::record_rng;
use endereco_core::evaluation::{classification_report, most_common_token_errors, sequence_accuracy};
use endereco_core::tagger::{group_fields, is_valid_sequence};
use endereco_core::tokenizer::{token_texts, tokens_from_texts};
use endereco_core::{
    AddressPipeline, DatasetBuilder, EntityCode, FeatureVector, Result, SequenceTagger, Tag,
};

/// Devolve sempre a mesma sequência, independente das features.
struct Replay(Vec<Tag>);

impl SequenceTagger for Replay {
    fn tag(&self, _features: &[FeatureVector]) -> Result<Vec<Tag>> {
        Ok(self.0.clone())
    }
}

#[test]
fn rendered_fields_round_trip_through_span_grouping() {
    let pipeline = AddressPipeline::default();
    for (k, record) in demo_records().iter().enumerate() {
        let output = pipeline.render_sampled(record, &mut record_rng(99, k));
        assert!(is_valid_sequence(&output.tags), "{}", output.text);

        let tokens = tokens_from_texts(&output.tokens);
        let grouped = group_fields(&tokens, &output.tags).unwrap();

        for field in output.params.format.fields() {
            let code = field.entity_code().unwrap();
            let expected = token_texts(output.record.get(*field));
            if expected.is_empty() {
                assert!(!grouped.contains_key(&code));
            } else {
                assert_eq!(grouped[&code], vec![expected.join(" ")], "{}", output.text);
            }
        }
    }
}

#[test]
fn dataset_modes_are_reproducible() {
    let builder = DatasetBuilder::default();
    let records = demo_records();

    let first = builder.par_build(&records, 2024);
    let second = builder.par_build(&records, 2024);
    assert_eq!(first, second);
    assert_eq!(first.len(), records.len());

    let other = builder.par_build(&records, 2025);
    assert_ne!(first, other);
}

#[test]
fn perfect_tagger_scores_one() {
    let samples = DatasetBuilder::default().par_build(&demo_records(), 3);
    let y_true: Vec<Vec<Tag>> = samples.iter().map(|s| s.tags.clone()).collect();

    let report = classification_report(&y_true, &y_true).unwrap();
    assert_eq!(report.accuracy, 1.0);
    assert_eq!(report.get("B-LOG").unwrap().f1, 1.0);
    assert_eq!(sequence_accuracy(&y_true, &y_true).unwrap(), 1.0);
}

#[test]
fn annotated_address_is_separated_and_scored() {
    let address = &annotated_addresses()[1];
    let expected: Vec<Tag> = address
        .annotations
        .iter()
        .map(|(_, tag)| Tag::parse(tag).unwrap())
        .collect();

    let pipeline = AddressPipeline::default().with_tagger(Arc::new(Replay(expected.clone())));
    let output = pipeline.separate(address.text).unwrap();
    assert_eq!(output.fields[&EntityCode::Log], vec!["AV PAULISTA"]);
    assert_eq!(output.fields[&EntityCode::Cep], vec!["01310 - 200"]);
    let cep = output.spans.last().unwrap();
    assert_eq!(&address.text[cep.start..cep.end], "01310-200");

    // um erro proposital: o número previsto como fora de campo
    let mut predicted = expected.clone();
    predicted[2] = Tag::Outside;
    let tokens = vec![token_texts(address.text)];
    let errors =
        most_common_token_errors(&tokens, &[expected.clone()], &[predicted.clone()], 5).unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].0.key, "1578");
    assert_eq!(errors[0].0.expected, Tag::Begin(EntityCode::Num));

    let report = classification_report(&[expected], &[predicted]).unwrap();
    assert_eq!(report.get("B-NUM").unwrap().recall, 0.0);
}
