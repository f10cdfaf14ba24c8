//! # Etiquetador Sequencial
//!
//! O treino e a inferência estatística ficam fora deste crate. O pipeline só
//! precisa de algo que receba os vetores de features de uma sequência e devolva
//! uma tag por token: o trait [`SequenceTagger`].
//!
//! [`CrfsTagger`] é a implementação sobre um modelo CRFsuite já treinado
//! (arquivo binário `lCRF`), lido com o crate `crfs`.

use std::path::Path;

use crfs::Model;
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::features::FeatureVector;
use crate::tagger::Tag;

/// Atribui uma tag BIO a cada token, dadas as features da sequência.
pub trait SequenceTagger: Send + Sync {
    /// Devolve exatamente uma tag por vetor de features.
    fn tag(&self, features: &[FeatureVector]) -> Result<Vec<Tag>>;
}

/// Etiquetador sobre um modelo CRFsuite.
///
/// Guarda os bytes do modelo; o `crfs::Model` (que só empresta os bytes) é
/// montado a cada chamada, o que custa apenas a leitura do cabeçalho.
#[derive(Clone)]
pub struct CrfsTagger {
    bytes: Vec<u8>,
    labels: Vec<Tag>,
}

impl std::fmt::Debug for CrfsTagger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrfsTagger")
            .field("size", &self.bytes.len())
            .field("labels", &self.labels)
            .finish()
    }
}

impl CrfsTagger {
    /// Lê o modelo de um arquivo.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        debug!(path = %path.display(), size = bytes.len(), "modelo CRF lido");
        Self::from_bytes(bytes)
    }

    /// Valida o modelo em memória.
    ///
    /// Falha se o formato for inválido, se o modelo não tiver rótulos ou se
    /// algum rótulo estiver fora do vocabulário BIO de endereços.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let model = Model::new(&bytes)?;
        let count = model.num_labels();
        if count == 0 {
            return Err(Error::Model("modelo sem rótulos".to_string()));
        }
        let mut labels = Vec::with_capacity(count as usize);
        for id in 0..count {
            let label = model
                .to_label(id)
                .ok_or_else(|| Error::Model(format!("rótulo {id} ausente")))?;
            labels.push(Tag::parse(label)?);
        }
        debug!(labels = labels.len(), attrs = model.num_attrs(), "modelo CRF carregado");
        drop(model);
        Ok(Self { bytes, labels })
    }

    /// Tags que o modelo conhece.
    pub fn labels(&self) -> &[Tag] {
        &self.labels
    }
}

impl SequenceTagger for CrfsTagger {
    fn tag(&self, features: &[FeatureVector]) -> Result<Vec<Tag>> {
        if features.is_empty() {
            return Ok(Vec::new());
        }
        let model = Model::new(&self.bytes)?;
        let mut tagger = model.tagger()?;
        let xseq: Vec<Vec<crfs::Attribute>> =
            features.iter().map(FeatureVector::to_attributes).collect();
        let predicted = tagger.tag(&xseq)?;
        trace!(tokens = xseq.len(), "sequência etiquetada");

        let tags = predicted
            .iter()
            .map(|label| Tag::parse(label))
            .collect::<Result<Vec<_>>>()?;
        if tags.len() != features.len() {
            return Err(Error::LengthMismatch {
                tokens: features.len(),
                tags: tags.len(),
            });
        }
        Ok(tags)
    }
}
