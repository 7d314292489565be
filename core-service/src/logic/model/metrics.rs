//! Held-out evaluation: accuracy and per-class precision / recall / F1.

use serde::{Deserialize, Serialize};

use super::inference::Label;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub label: String,
    pub precision: f32,
    pub recall: f32,
    pub f1: f32,
    pub support: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub accuracy: f32,
    pub classes: Vec<ClassMetrics>,
    pub macro_avg: ClassMetrics,
    pub weighted_avg: ClassMetrics,
}

pub fn accuracy_score(y_true: &[Label], y_pred: &[Label]) -> f32 {
    if y_true.is_empty() {
        return 0.0;
    }
    y_true
        .iter()
        .zip(y_pred)
        .filter(|(t, p)| t == p)
        .count() as f32
        / y_true.len() as f32
}

fn ratio(num: usize, den: usize) -> f32 {
    if den == 0 {
        0.0
    } else {
        num as f32 / den as f32
    }
}

fn class_metrics(y_true: &[Label], y_pred: &[Label], label: Label) -> ClassMetrics {
    let pairs = || y_true.iter().zip(y_pred);
    let tp = pairs().filter(|(t, p)| **t == label && **p == label).count();
    let predicted = y_pred.iter().filter(|p| **p == label).count();
    let support = y_true.iter().filter(|t| **t == label).count();

    let precision = ratio(tp, predicted);
    let recall = ratio(tp, support);
    let f1 = if precision + recall > 0.0 {
        2.0 * precision * recall / (precision + recall)
    } else {
        0.0
    };

    ClassMetrics {
        label: label.as_str().to_string(),
        precision,
        recall,
        f1,
        support,
    }
}

pub fn classification_report(y_true: &[Label], y_pred: &[Label]) -> ClassificationReport {
    let classes: Vec<ClassMetrics> = [Label::Legitimate, Label::Spam]
        .iter()
        .map(|l| class_metrics(y_true, y_pred, *l))
        .collect();

    let n = classes.len() as f32;
    let total: usize = classes.iter().map(|c| c.support).sum();
    let weight = |c: &ClassMetrics| ratio(c.support, total);

    let macro_avg = ClassMetrics {
        label: "macro avg".to_string(),
        precision: classes.iter().map(|c| c.precision).sum::<f32>() / n,
        recall: classes.iter().map(|c| c.recall).sum::<f32>() / n,
        f1: classes.iter().map(|c| c.f1).sum::<f32>() / n,
        support: total,
    };
    let weighted_avg = ClassMetrics {
        label: "weighted avg".to_string(),
        precision: classes.iter().map(|c| c.precision * weight(c)).sum(),
        recall: classes.iter().map(|c| c.recall * weight(c)).sum(),
        f1: classes.iter().map(|c| c.f1 * weight(c)).sum(),
        support: total,
    };

    ClassificationReport {
        accuracy: accuracy_score(y_true, y_pred),
        classes,
        macro_avg,
        weighted_avg,
    }
}

impl std::fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{:>14} {:>10} {:>10} {:>10} {:>10}", "", "precision", "recall", "f1-score", "support")?;
        writeln!(f)?;
        for c in &self.classes {
            writeln!(f, "{:>14} {:>10.2} {:>10.2} {:>10.2} {:>10}", c.label, c.precision, c.recall, c.f1, c.support)?;
        }
        writeln!(f)?;
        writeln!(f, "{:>14} {:>10} {:>10} {:>10.2} {:>10}", "accuracy", "", "", self.accuracy, self.macro_avg.support)?;
        for c in [&self.macro_avg, &self.weighted_avg] {
            writeln!(f, "{:>14} {:>10.2} {:>10.2} {:>10.2} {:>10}", c.label, c.precision, c.recall, c.f1, c.support)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Label::{Legitimate as L, Spam as S};

    #[test]
    fn test_accuracy() {
        assert_eq!(accuracy_score(&[S, S, L, L], &[S, L, L, L]), 0.75);
        assert_eq!(accuracy_score(&[], &[]), 0.0);
    }

    #[test]
    fn test_per_class_scores() {
        let report = classification_report(&[S, S, L, L], &[S, L, L, L]);
        let spam = &report.classes[1];
        assert_eq!(spam.label, "spam");
        assert_eq!(spam.precision, 1.0);
        assert_eq!(spam.recall, 0.5);
        assert_eq!(spam.support, 2);

        let legit = &report.classes[0];
        assert!((legit.precision - 2.0 / 3.0).abs() < 1e-6);
        assert_eq!(legit.recall, 1.0);
        assert_eq!(report.macro_avg.support, 4);
    }

    #[test]
    fn test_no_predictions_for_class_is_zero() {
        let report = classification_report(&[S, L], &[L, L]);
        assert_eq!(report.classes[1].precision, 0.0);
        assert_eq!(report.classes[1].f1, 0.0);
        assert!(report.to_string().contains("weighted avg"));
    }
}
