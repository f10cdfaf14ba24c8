//! # Avaliação do Etiquetador
//!
//! Métricas sobre sequências de tags previstas contra as esperadas:
//!
//! - [`classification_report`]: precisão, revocação, F1 e suporte **por tag**
//!   (avaliação "plana": cada token conta isoladamente), com médias.
//! - [`sequence_accuracy`]: fração de sequências 100% corretas.
//! - `most_common_*_errors`: os erros mais frequentes agrupados por token,
//!   por conjunto de features ou por categoria da amostra.
//!
//! Divisões por zero (tag nunca prevista, por exemplo) valem 0.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::features::FeatureVector;
use crate::tagger::Tag;

/// Métricas de uma tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub label: String,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Relatório por tag mais médias.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    /// Uma linha por tag presente nas esperadas ou nas previstas, em ordem alfabética.
    pub classes: Vec<ClassMetrics>,
    pub accuracy: f64,
    pub macro_avg: ClassMetrics,
    pub weighted_avg: ClassMetrics,
}

impl ClassificationReport {
    pub fn get(&self, label: &str) -> Option<&ClassMetrics> {
        self.classes.iter().find(|c| c.label == label)
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:>14} {:>9} {:>9} {:>9} {:>9}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;
        for c in &self.classes {
            write_row(f, c)?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>14} {:>9} {:>9} {:>9.2} {:>9}",
            "accuracy", "", "", self.accuracy, self.macro_avg.support
        )?;
        write_row(f, &self.macro_avg)?;
        write_row(f, &self.weighted_avg)
    }
}

fn write_row(f: &mut fmt::Formatter<'_>, c: &ClassMetrics) -> fmt::Result {
    writeln!(
        f,
        "{:>14} {:>9.2} {:>9.2} {:>9.2} {:>9}",
        c.label, c.precision, c.recall, c.f1, c.support
    )
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

fn f1(precision: f64, recall: f64) -> f64 {
    if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    }
}

fn check_lengths(y_true: &[Vec<Tag>], y_pred: &[Vec<Tag>]) -> Result<()> {
    if y_true.len() != y_pred.len() {
        return Err(Error::LengthMismatch {
            tokens: y_true.len(),
            tags: y_pred.len(),
        });
    }
    for (t, p) in y_true.iter().zip(y_pred) {
        if t.len() != p.len() {
            return Err(Error::LengthMismatch {
                tokens: t.len(),
                tags: p.len(),
            });
        }
    }
    Ok(())
}

/// Relatório de classificação plano (token a token).
pub fn classification_report(y_true: &[Vec<Tag>], y_pred: &[Vec<Tag>]) -> Result<ClassificationReport> {
    check_lengths(y_true, y_pred)?;

    #[derive(Default)]
    struct Counts {
        true_positive: usize,
        predicted: usize,
        support: usize,
    }

    let mut counts: BTreeMap<String, Counts> = BTreeMap::new();
    let mut correct = 0;
    let mut total = 0;
    for (t_seq, p_seq) in y_true.iter().zip(y_pred) {
        for (t, p) in t_seq.iter().zip(p_seq) {
            total += 1;
            counts.entry(t.label()).or_default().support += 1;
            counts.entry(p.label()).or_default().predicted += 1;
            if t == p {
                correct += 1;
                counts.entry(t.label()).or_default().true_positive += 1;
            }
        }
    }

    let classes: Vec<ClassMetrics> = counts
        .into_iter()
        .map(|(label, c)| {
            let precision = ratio(c.true_positive, c.predicted);
            let recall = ratio(c.true_positive, c.support);
            ClassMetrics {
                label,
                precision,
                recall,
                f1: f1(precision, recall),
                support: c.support,
            }
        })
        .collect();

    let n = classes.len().max(1) as f64;
    let macro_avg = ClassMetrics {
        label: "macro avg".to_string(),
        precision: classes.iter().map(|c| c.precision).sum::<f64>() / n,
        recall: classes.iter().map(|c| c.recall).sum::<f64>() / n,
        f1: classes.iter().map(|c| c.f1).sum::<f64>() / n,
        support: total,
    };
    let weight = |value: fn(&ClassMetrics) -> f64| {
        if total == 0 {
            0.0
        } else {
            classes
                .iter()
                .map(|c| value(c) * c.support as f64)
                .sum::<f64>()
                / total as f64
        }
    };
    let weighted_avg = ClassMetrics {
        label: "weighted avg".to_string(),
        precision: weight(|c| c.precision),
        recall: weight(|c| c.recall),
        f1: weight(|c| c.f1),
        support: total,
    };

    Ok(ClassificationReport {
        accuracy: ratio(correct, total),
        classes,
        macro_avg,
        weighted_avg,
    })
}

/// Fração de sequências em que todas as tags batem.
pub fn sequence_accuracy(y_true: &[Vec<Tag>], y_pred: &[Vec<Tag>]) -> Result<f64> {
    check_lengths(y_true, y_pred)?;
    let hits = y_true.iter().zip(y_pred).filter(|(t, p)| t == p).count();
    Ok(ratio(hits, y_true.len()))
}

/// Um erro agrupado: chave (token, features ou categoria), tag esperada e prevista.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ErrorKey {
    pub key: String,
    pub expected: Tag,
    pub predicted: Tag,
}

/// Par erro + ocorrências.
pub type ErrorCount = (ErrorKey, usize);

fn most_common(counter: HashMap<ErrorKey, usize>, n: usize) -> Vec<ErrorCount> {
    let mut items: Vec<ErrorCount> = counter.into_iter().collect();
    items.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    items.truncate(n);
    items
}

/// Erros mais comuns agrupados pelo texto do token.
pub fn most_common_token_errors(
    tokens: &[Vec<String>],
    y_true: &[Vec<Tag>],
    y_pred: &[Vec<Tag>],
    n: usize,
) -> Result<Vec<ErrorCount>> {
    check_lengths(y_true, y_pred)?;
    let mut counter = HashMap::new();
    for ((toks, t_seq), p_seq) in tokens.iter().zip(y_true).zip(y_pred) {
        for ((tok, t), p) in toks.iter().zip(t_seq).zip(p_seq) {
            if t != p {
                let key = ErrorKey {
                    key: tok.clone(),
                    expected: *t,
                    predicted: *p,
                };
                *counter.entry(key).or_insert(0) += 1;
            }
        }
    }
    Ok(most_common(counter, n))
}

/// Erros mais comuns agrupados pelo conjunto completo de features do token.
pub fn most_common_feature_errors(
    features: &[Vec<FeatureVector>],
    y_true: &[Vec<Tag>],
    y_pred: &[Vec<Tag>],
    n: usize,
) -> Result<Vec<ErrorCount>> {
    check_lengths(y_true, y_pred)?;
    let mut counter = HashMap::new();
    for ((fvs, t_seq), p_seq) in features.iter().zip(y_true).zip(y_pred) {
        for ((fv, t), p) in fvs.iter().zip(t_seq).zip(p_seq) {
            if t != p {
                let key = ErrorKey {
                    key: fv.names().join(" "),
                    expected: *t,
                    predicted: *p,
                };
                *counter.entry(key).or_insert(0) += 1;
            }
        }
    }
    Ok(most_common(counter, n))
}

/// Erros mais comuns por categoria da amostra (formato, separador, origem...).
///
/// Cada par distinto (esperada, prevista) de uma sequência conta uma vez para
/// cada categoria da sequência.
pub fn most_common_category_errors(
    categories: &[Vec<String>],
    y_true: &[Vec<Tag>],
    y_pred: &[Vec<Tag>],
    n: usize,
) -> Result<Vec<ErrorCount>> {
    check_lengths(y_true, y_pred)?;
    let mut counter = HashMap::new();
    for ((cats, t_seq), p_seq) in categories.iter().zip(y_true).zip(y_pred) {
        let diffs: BTreeSet<(Tag, Tag)> = t_seq
            .iter()
            .zip(p_seq)
            .filter(|(t, p)| t != p)
            .map(|(t, p)| (*t, *p))
            .collect();
        for (t, p) in diffs {
            for cat in cats {
                let key = ErrorKey {
                    key: cat.clone(),
                    expected: t,
                    predicted: p,
                };
                *counter.entry(key).or_insert(0) += 1;
            }
        }
    }
    Ok(most_common(counter, n))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(labels: &[&str]) -> Vec<Tag> {
        labels.iter().map(|l| Tag::parse(l).unwrap()).collect()
    }

    #[test]
    fn test_report_hand_computed() {
        let y_true = vec![seq(&["B-LOG", "I-LOG", "O", "B-NUM"])];
        let y_pred = vec![seq(&["B-LOG", "O", "O", "B-NUM"])];
        let report = classification_report(&y_true, &y_pred).unwrap();

        let o = report.get("O").unwrap();
        assert_eq!(o.support, 1);
        assert!((o.precision - 0.5).abs() < 1e-9);
        assert!((o.recall - 1.0).abs() < 1e-9);
        assert!((o.f1 - 2.0 / 3.0).abs() < 1e-9);

        let i_log = report.get("I-LOG").unwrap();
        assert_eq!(i_log.precision, 0.0);
        assert_eq!(i_log.recall, 0.0);
        assert_eq!(i_log.f1, 0.0);

        assert!((report.accuracy - 0.75).abs() < 1e-9);
        assert_eq!(report.macro_avg.support, 4);
        let labels: Vec<&str> = report.classes.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["B-LOG", "B-NUM", "I-LOG", "O"]);
        assert!(report.to_string().contains("weighted avg"));
    }

    #[test]
    fn test_sequence_accuracy() {
        let y_true = vec![seq(&["B-LOG"]), seq(&["B-NUM", "O"])];
        let y_pred = vec![seq(&["B-LOG"]), seq(&["B-NUM", "B-COM"])];
        assert_eq!(sequence_accuracy(&y_true, &y_pred).unwrap(), 0.5);
        assert_eq!(sequence_accuracy(&[], &[]).unwrap(), 0.0);
    }

    #[test]
    fn test_length_mismatch() {
        let y_true = vec![seq(&["B-LOG", "O"])];
        let y_pred = vec![seq(&["B-LOG"])];
        assert!(classification_report(&y_true, &y_pred).is_err());
        assert!(sequence_accuracy(&y_true, &[]).is_err());
    }

    #[test]
    fn test_token_errors_ranked() {
        let tokens = vec![
            vec!["RUA".to_string(), "10".to_string()],
            vec!["RUA".to_string(), "20".to_string()],
        ];
        let y_true = vec![seq(&["B-LOG", "B-NUM"]), seq(&["B-LOG", "B-NUM"])];
        let y_pred = vec![seq(&["B-MUN", "B-NUM"]), seq(&["B-MUN", "B-CEP"])];
        let errors = most_common_token_errors(&tokens, &y_true, &y_pred, 10).unwrap();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].0.key, "RUA");
        assert_eq!(errors[0].1, 2);
        assert_eq!(errors[1].0.key, "20");

        let top = most_common_token_errors(&tokens, &y_true, &y_pred, 1).unwrap();
        assert_eq!(top.len(), 1);
    }

    #[test]
    fn test_category_errors_count_distinct_pairs() {
        let cats = vec![vec!["formato = A".to_string(), "separador = ,".to_string()]];
        let y_true = vec![seq(&["B-LOG", "B-LOG", "B-NUM"])];
        let y_pred = vec![seq(&["O", "O", "B-NUM"])];
        let errors = most_common_category_errors(&cats, &y_true, &y_pred, 10).unwrap();
        // o par (B-LOG, O) aparece duas vezes, mas conta uma por categoria
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|(_, count)| *count == 1));
    }

    #[test]
    fn test_feature_errors_use_sorted_names() {
        let mut fv = FeatureVector::new(0);
        fv.insert("bias", 1.0);
        fv.insert("0:RUA", 1.0);
        let errors = most_common_feature_errors(
            &[vec![fv]],
            &[seq(&["B-LOG"])],
            &[seq(&["O"])],
            5,
        )
        .unwrap();
        assert_eq!(errors[0].0.key, "0:RUA bias");
    }
}
