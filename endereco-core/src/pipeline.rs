//! # Pipeline de Endereços: Orquestrador com Eventos Observáveis
//!
//! Coordena os módulos em dois caminhos e emite eventos em cada passo via um
//! canal Rust (`mpsc`), permitindo que o servidor WebSocket transmita o
//! progresso em tempo real para o cliente.
//!
//! - **Renderização** (treino): registro → parâmetros → variação → tokens e
//!   tags alinhados → features.
//! - **Separação** (inferência): texto → tokens → features → etiquetador →
//!   campos agrupados.

use std::collections::BTreeMap;
use std::sync::mpsc;
use std::sync::Arc;
use std::time::Instant;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::aligner::align_transformed;
use crate::error::{Error, Result};
use crate::features::{FeatureExtractor, FeatureVector};
use crate::generator::SyntheticAddressGenerator;
use crate::params::{AddressParams, ParameterSampler};
use crate::record::AddressRecord;
use crate::sequence_tagger::SequenceTagger;
use crate::tagger::{tokens_to_spans, EntityCode, FieldSpan, Tag};
use crate::tokenizer::{tokenize, Token};

/// Resultado de uma renderização.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderOutput {
    pub params: AddressParams,
    pub record: AddressRecord,
    pub text: String,
    pub tokens: Vec<String>,
    pub tags: Vec<Tag>,
    pub features: Vec<FeatureVector>,
}

/// Resultado de uma separação.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeparationOutput {
    pub tokens: Vec<Token>,
    pub tags: Vec<Tag>,
    pub spans: Vec<FieldSpan>,
    /// Valores por código de entidade, na ordem em que aparecem no texto.
    pub fields: BTreeMap<EntityCode, Vec<String>>,
}

/// Eventos emitidos pelo pipeline durante o processamento.
///
/// Cada variante carrega os dados necessários para renderizar uma etapa da visualização.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum PipelineEvent {
    /// Parâmetros de transformação em uso.
    ParamsSampled { params: AddressParams },
    /// Registro transformado e texto renderizado.
    RecordGenerated { record: AddressRecord, text: String },
    /// Tokens e tags produzidos campo a campo pelo rotulador.
    LabelsAligned { tokens: Vec<String>, tags: Vec<Tag> },
    /// Texto livre tokenizado.
    TokenizationDone { tokens: Vec<Token>, total: usize },
    /// Features de um token, em ordem de nome.
    FeaturesComputed {
        token_index: usize,
        token_text: String,
        features: Vec<String>,
    },
    /// Tag atribuída pelo etiquetador a um token.
    TagAssigned {
        token_index: usize,
        token_text: String,
        tag: Tag,
    },
    /// Renderização concluída.
    RenderDone {
        output: RenderOutput,
        processing_ms: u64,
    },
    /// Separação concluída.
    SeparationDone {
        output: SeparationOutput,
        processing_ms: u64,
    },
    /// Falha: sem etiquetador, ou o etiquetador devolveu algo inválido.
    Error { message: String },
}

/// O pipeline principal.
///
/// # Modos de Uso
/// - **Sync**: `render`, `render_sampled` e `separate` para scripts e chamadas diretas.
/// - **Streaming**: `render_streaming` e `separate_streaming` para UIs reativas (via WebSocket).
#[derive(Clone, Default)]
pub struct AddressPipeline {
    sampler: ParameterSampler,
    generator: SyntheticAddressGenerator,
    extractor: FeatureExtractor,
    tagger: Option<Arc<dyn SequenceTagger>>,
}

impl std::fmt::Debug for AddressPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AddressPipeline")
            .field("sampler", &self.sampler)
            .field("extractor", &self.extractor)
            .field("tagger", &self.tagger.is_some())
            .finish()
    }
}

impl AddressPipeline {
    pub fn new(
        sampler: ParameterSampler,
        generator: SyntheticAddressGenerator,
        extractor: FeatureExtractor,
    ) -> Self {
        Self {
            sampler,
            generator,
            extractor,
            tagger: None,
        }
    }

    /// Acopla um etiquetador treinado, habilitando a separação.
    pub fn with_tagger(mut self, tagger: Arc<dyn SequenceTagger>) -> Self {
        self.tagger = Some(tagger);
        self
    }

    pub fn has_tagger(&self) -> bool {
        self.tagger.is_some()
    }

    pub fn extractor(&self) -> &FeatureExtractor {
        &self.extractor
    }

    pub fn sample_params<R: Rng + ?Sized>(&self, rng: &mut R) -> AddressParams {
        self.sampler.sample(rng)
    }

    /// Renderiza com parâmetros sorteados de `rng`.
    pub fn render_sampled<R: Rng + ?Sized>(&self, record: &AddressRecord, rng: &mut R) -> RenderOutput {
        let params = self.sample_params(rng);
        self.render(record, &params)
    }

    /// Renderiza com parâmetros fixos.
    pub fn render(&self, record: &AddressRecord, params: &AddressParams) -> RenderOutput {
        self.run_render(record, params, &mut |_| {})
    }

    /// Renderiza enviando eventos de progresso.
    ///
    /// # Fluxo de Eventos
    /// 1. `ParamsSampled`
    /// 2. `RecordGenerated`
    /// 3. `LabelsAligned`
    /// 4. `FeaturesComputed` (um por token)
    /// 5. `RenderDone`
    pub fn render_streaming(
        &self,
        record: &AddressRecord,
        params: &AddressParams,
        tx: mpsc::Sender<PipelineEvent>,
    ) {
        let start = Instant::now();
        let output = self.run_render(record, params, &mut |event| {
            let _ = tx.send(event);
        });
        let _ = tx.send(PipelineEvent::RenderDone {
            output,
            processing_ms: start.elapsed().as_millis() as u64,
        });
    }

    fn run_render(
        &self,
        record: &AddressRecord,
        params: &AddressParams,
        emit: &mut dyn FnMut(PipelineEvent),
    ) -> RenderOutput {
        emit(PipelineEvent::ParamsSampled {
            params: params.clone(),
        });

        let transformed = self.generator.generate(record, params);
        let text = transformed.rendered();
        emit(PipelineEvent::RecordGenerated {
            record: transformed.record.clone(),
            text: text.clone(),
        });

        let (tokens, tags) = align_transformed(&transformed).into_parts();
        emit(PipelineEvent::LabelsAligned {
            tokens: tokens.clone(),
            tags: tags.clone(),
        });

        let features = self.extractor.features(&tokens);
        emit_features(&tokens, &features, emit);

        debug!(tokens = tokens.len(), "endereço renderizado");
        RenderOutput {
            params: params.clone(),
            record: transformed.record,
            text,
            tokens,
            tags,
            features,
        }
    }

    /// Separa um texto livre em campos.
    ///
    /// Falha com [`Error::Model`] se nenhum etiquetador foi acoplado.
    pub fn separate(&self, text: &str) -> Result<SeparationOutput> {
        self.run_separate(text, &mut |_| {})
    }

    /// Separa enviando eventos de progresso.
    ///
    /// # Fluxo de Eventos
    /// 1. `TokenizationDone`
    /// 2. `FeaturesComputed` (um por token)
    /// 3. `TagAssigned` (um por token)
    /// 4. `SeparationDone`, ou `Error`
    pub fn separate_streaming(&self, text: &str, tx: mpsc::Sender<PipelineEvent>) {
        let start = Instant::now();
        let result = self.run_separate(text, &mut |event| {
            let _ = tx.send(event);
        });
        let _ = match result {
            Ok(output) => tx.send(PipelineEvent::SeparationDone {
                output,
                processing_ms: start.elapsed().as_millis() as u64,
            }),
            Err(err) => tx.send(PipelineEvent::Error {
                message: err.to_string(),
            }),
        };
    }

    fn run_separate(
        &self,
        text: &str,
        emit: &mut dyn FnMut(PipelineEvent),
    ) -> Result<SeparationOutput> {
        let tagger = self
            .tagger
            .as_ref()
            .ok_or_else(|| Error::Model("nenhum modelo carregado".to_string()))?;

        let tokens = tokenize(text);
        emit(PipelineEvent::TokenizationDone {
            tokens: tokens.clone(),
            total: tokens.len(),
        });

        let features = self.extractor.token_features(&tokens);
        let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        emit_features(&texts, &features, emit);

        let tags = tagger.tag(&features)?;
        if tags.len() != tokens.len() {
            return Err(Error::LengthMismatch {
                tokens: tokens.len(),
                tags: tags.len(),
            });
        }
        for (token, tag) in tokens.iter().zip(&tags) {
            emit(PipelineEvent::TagAssigned {
                token_index: token.index,
                token_text: token.text.clone(),
                tag: *tag,
            });
        }

        let spans = tokens_to_spans(&tokens, &tags)?;
        let mut fields: BTreeMap<EntityCode, Vec<String>> = BTreeMap::new();
        for span in &spans {
            fields.entry(span.code).or_default().push(span.text.clone());
        }
        debug!(tokens = tokens.len(), spans = spans.len(), "endereço separado");

        Ok(SeparationOutput {
            tokens,
            tags,
            spans,
            fields,
        })
    }
}

fn emit_features<S: AsRef<str>>(
    tokens: &[S],
    features: &[FeatureVector],
    emit: &mut dyn FnMut(PipelineEvent),
) {
    for (fv, token) in features.iter().zip(tokens) {
        emit(PipelineEvent::FeaturesComputed {
            token_index: fv.token_index,
            token_text: token.as_ref().to_string(),
            features: fv.names().into_iter().map(str::to_string).collect(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::demo_records;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    /// Etiquetador de teste: números viram NUM, o resto LOG, pontuação O.
    struct ShapeTagger;

    impl SequenceTagger for ShapeTagger {
        fn tag(&self, features: &[FeatureVector]) -> Result<Vec<Tag>> {
            let mut prev = Tag::Outside;
            let tags = features
                .iter()
                .map(|fv| {
                    let code = if fv.contains("0:is_punct") {
                        None
                    } else if fv.contains("0:is_digit") {
                        Some(EntityCode::Num)
                    } else {
                        Some(EntityCode::Log)
                    };
                    let tag = match code {
                        None => Tag::Outside,
                        Some(c) if prev.code() == Some(c) => Tag::Inside(c),
                        Some(c) => Tag::Begin(c),
                    };
                    prev = tag;
                    tag
                })
                .collect();
            Ok(tags)
        }
    }

    struct ShortTagger;

    impl SequenceTagger for ShortTagger {
        fn tag(&self, _features: &[FeatureVector]) -> Result<Vec<Tag>> {
            Ok(vec![Tag::Outside])
        }
    }

    #[test]
    fn test_render_default_params() {
        let pipeline = AddressPipeline::default();
        let output = pipeline.render(&demo_records()[0], &AddressParams::default());
        assert_eq!(output.text, "RUA DAS FLORES, 123, APTO 5, CENTRO, SÃO PAULO");
        assert_eq!(output.tokens.len(), output.tags.len());
        assert_eq!(output.tokens.len(), output.features.len());
    }

    #[test]
    fn test_render_events_streaming() {
        let pipeline = AddressPipeline::default();
        let (tx, rx) = mpsc::channel();
        pipeline.render_streaming(&demo_records()[1], &AddressParams::default(), tx);

        let events: Vec<PipelineEvent> = rx.try_iter().collect();
        assert!(matches!(&events[0], PipelineEvent::ParamsSampled { .. }));
        assert!(matches!(events.last(), Some(PipelineEvent::RenderDone { .. })));
        let features = events
            .iter()
            .filter(|e| matches!(e, PipelineEvent::FeaturesComputed { .. }))
            .count();
        let Some(PipelineEvent::RenderDone { output, .. }) = events.last() else {
            panic!("último evento deve ser RenderDone");
        };
        assert_eq!(features, output.tokens.len());
    }

    #[test]
    fn test_render_sampled_is_deterministic() {
        let pipeline = AddressPipeline::default();
        let record = &demo_records()[2];
        let a = pipeline.render_sampled(record, &mut ChaCha8Rng::seed_from_u64(4));
        let b = pipeline.render_sampled(record, &mut ChaCha8Rng::seed_from_u64(4));
        assert_eq!(a, b);
    }

    #[test]
    fn test_separate_without_model() {
        let pipeline = AddressPipeline::default();
        assert!(!pipeline.has_tagger());
        assert!(matches!(pipeline.separate("RUA A, 10"), Err(Error::Model(_))));

        let (tx, rx) = mpsc::channel();
        pipeline.separate_streaming("RUA A, 10", tx);
        let events: Vec<PipelineEvent> = rx.try_iter().collect();
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], PipelineEvent::Error { .. }));
    }

    #[test]
    fn test_separate_groups_fields() {
        let pipeline = AddressPipeline::default().with_tagger(Arc::new(ShapeTagger));
        let output = pipeline.separate("Rua  Azul, 45").unwrap();
        assert_eq!(output.fields[&EntityCode::Log], vec!["Rua Azul"]);
        assert_eq!(output.fields[&EntityCode::Num], vec!["45"]);
        assert_eq!(output.spans[0].start, 0);
        assert_eq!(output.spans[0].end, "Rua  Azul".len());
    }

    #[test]
    fn test_separate_streaming_events() {
        let pipeline = AddressPipeline::default().with_tagger(Arc::new(ShapeTagger));
        let (tx, rx) = mpsc::channel();
        pipeline.separate_streaming("AV PAULISTA 1578", tx);
        let events: Vec<PipelineEvent> = rx.try_iter().collect();
        assert!(matches!(&events[0], PipelineEvent::TokenizationDone { total: 3, .. }));
        let assigned = events
            .iter()
            .filter(|e| matches!(e, PipelineEvent::TagAssigned { .. }))
            .count();
        assert_eq!(assigned, 3);
        assert!(matches!(events.last(), Some(PipelineEvent::SeparationDone { .. })));
    }

    #[test]
    fn test_separate_rejects_wrong_length() {
        let pipeline = AddressPipeline::default().with_tagger(Arc::new(ShortTagger));
        assert!(matches!(
            pipeline.separate("RUA A 10"),
            Err(Error::LengthMismatch { tokens: 3, tags: 1 })
        ));
    }

    #[test]
    fn test_separate_empty_text() {
        let pipeline = AddressPipeline::default().with_tagger(Arc::new(ShapeTagger));
        let output = pipeline.separate("   ").unwrap();
        assert!(output.tokens.is_empty());
        assert!(output.fields.is_empty());
    }

    #[test]
    fn test_event_json_shape() {
        let event = PipelineEvent::TagAssigned {
            token_index: 0,
            token_text: "RUA".to_string(),
            tag: Tag::Begin(EntityCode::Log),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "TagAssigned");
        assert_eq!(json["data"]["tag"], "B-LOG");
    }
}
