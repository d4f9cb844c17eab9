use std::{collections::BTreeMap, fmt::Display, iter::zip};

/// Tag-wise performance values.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct LabelMeasure {
    /// Number of correct predictions.
    pub num_correct: usize,
    /// Number of occurrences of the tag in the reference data.
    pub num_observation: usize,
    /// Number of predictions.
    pub num_prediction: usize,
    pub precision: f64,
    pub recall: f64,
    pub fmeasure: f64,
}

impl LabelMeasure {
    fn update(&mut self) {
        self.precision = 0.0;
        self.recall = 0.0;
        self.fmeasure = 0.0;
        if self.num_prediction > 0 {
            self.precision = self.num_correct as f64 / self.num_prediction as f64;
        }
        if self.num_observation > 0 {
            self.recall = self.num_correct as f64 / self.num_observation as f64;
        }
        if self.precision + self.recall > 0.0 {
            self.fmeasure = self.precision * self.recall * 2.0 / (self.precision + self.recall);
        }
    }
}

/// Accumulates predicted tag sequences against reference ones.
#[derive(Debug, Default)]
pub struct Evaluation {
    tbl: BTreeMap<String, LabelMeasure>,

    /// Number of correctly predicted items.
    item_total_correct: usize,
    /// Total number of items.
    item_total_num: usize,
    item_accuracy: f64,

    /// Number of sentences predicted without a single error.
    inst_total_correct: usize,
    /// Total number of sentences.
    inst_total_num: usize,
    inst_accuracy: f64,

    macro_precision: f64,
    macro_recall: f64,
    macro_fmeasure: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Estimation {
    pub precision: f64,
    pub recall: f64,
    pub fmeasure: f64,
    pub item_accuracy: f64,
    pub inst_accuracy: f64,
}

impl Evaluation {
    /// Compares one sentence position by position. Positions past the end of
    /// the shorter sequence count as wrong.
    pub fn accumulate<R: AsRef<str>, P: AsRef<str>>(&mut self, reference: &[R], prediction: &[P]) {
        let mut matched = 0;
        for (r, p) in zip(reference, prediction) {
            let (r, p) = (r.as_ref(), p.as_ref());
            self.tbl.entry(r.to_string()).or_default().num_observation += 1;
            self.tbl.entry(p.to_string()).or_default().num_prediction += 1;
            if r == p {
                self.tbl.entry(r.to_string()).or_default().num_correct += 1;
                matched += 1;
            }
        }
        for r in reference.iter().skip(prediction.len()) {
            self.tbl.entry(r.as_ref().to_string()).or_default().num_observation += 1;
        }

        let total = reference.len().max(prediction.len());
        self.item_total_correct += matched;
        self.item_total_num += total;
        if matched == total {
            self.inst_total_correct += 1;
        }
        self.inst_total_num += 1;
    }

    /// Number of items tagged wrongly so far.
    pub fn num_incorrect(&self) -> usize {
        self.item_total_num - self.item_total_correct
    }

    pub fn num_correct(&self) -> usize {
        self.item_total_correct
    }

    pub fn label(&self, label: &str) -> Option<&LabelMeasure> {
        self.tbl.get(label)
    }

    pub fn evaluate(&mut self) -> Estimation {
        self.macro_precision = 0.0;
        self.macro_recall = 0.0;
        self.macro_fmeasure = 0.0;
        let mut num_labels = 0;
        for lev in self.tbl.values_mut() {
            lev.update();
            if lev.num_observation == 0 {
                continue;
            }
            self.macro_precision += lev.precision;
            self.macro_recall += lev.recall;
            self.macro_fmeasure += lev.fmeasure;
            num_labels += 1;
        }

        if num_labels > 0 {
            self.macro_precision /= num_labels as f64;
            self.macro_recall /= num_labels as f64;
            self.macro_fmeasure /= num_labels as f64;
        }
        if self.item_total_num > 0 {
            self.item_accuracy = self.item_total_correct as f64 / self.item_total_num as f64;
        }
        if self.inst_total_num > 0 {
            self.inst_accuracy = self.inst_total_correct as f64 / self.inst_total_num as f64;
        }
        Estimation {
            precision: self.macro_precision,
            recall: self.macro_recall,
            fmeasure: self.macro_fmeasure,
            item_accuracy: self.item_accuracy,
            inst_accuracy: self.inst_accuracy,
        }
    }
}

impl Display for Evaluation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Performance by label (#match, #model, #ref) (precision, recall, F1):")?;
        for (label, lev) in &self.tbl {
            if lev.num_observation == 0 {
                writeln!(
                    f,
                    "\t{}: ({}, {}, {}) (******, ******, ******)",
                    label, lev.num_correct, lev.num_prediction, lev.num_observation
                )?;
            } else {
                writeln!(
                    f,
                    "\t{}: ({}, {}, {}) ({:.4}, {:.4}, {:.4})",
                    label,
                    lev.num_correct,
                    lev.num_prediction,
                    lev.num_observation,
                    lev.precision,
                    lev.recall,
                    lev.fmeasure
                )?;
            }
        }
        writeln!(
            f,
            "Macro-average precision, recall, F1: ({:.6}, {:.6}, {:.6})",
            self.macro_precision, self.macro_recall, self.macro_fmeasure
        )?;
        writeln!(
            f,
            "Tagged correctly: {}\tTagged incorrectly: {}",
            self.item_total_correct,
            self.num_incorrect()
        )?;
        writeln!(
            f,
            "Item accuracy: {}/{} => {:.4}",
            self.item_total_correct, self.item_total_num, self.item_accuracy
        )?;
        write!(
            f,
            "Sequence accuracy: {}/{} => {:.4}",
            self.inst_total_correct, self.inst_total_num, self.inst_accuracy
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulate_and_evaluate() {
        let mut evaluation = Evaluation::default();
        evaluation.accumulate(&["DET", "NOUN", "VERB"], &["DET", "NOUN", "VERB"]);
        evaluation.accumulate(&["DET", "NOUN"], &["DET", "VERB"]);
        let est = evaluation.evaluate();

        assert_eq!(evaluation.num_correct(), 4);
        assert_eq!(evaluation.num_incorrect(), 1);
        assert!((est.item_accuracy - 0.8).abs() < 1e-12);
        assert!((est.inst_accuracy - 0.5).abs() < 1e-12);

        let noun = evaluation.label("NOUN").unwrap();
        assert_eq!((noun.num_correct, noun.num_prediction, noun.num_observation), (1, 1, 2));
        assert!((noun.precision - 1.0).abs() < 1e-12);
        assert!((noun.recall - 0.5).abs() < 1e-12);

        let verb = evaluation.label("VERB").unwrap();
        assert!((verb.precision - 0.5).abs() < 1e-12);
        // DET 1.0, NOUN 1.0, VERB 0.5
        assert!((est.precision - 2.5 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn short_prediction_counts_as_wrong() {
        let mut evaluation = Evaluation::default();
        let empty: [&str; 0] = [];
        evaluation.accumulate(&["DET", "NOUN"], &empty);
        let est = evaluation.evaluate();
        assert_eq!(evaluation.num_incorrect(), 2);
        assert_eq!(est.inst_accuracy, 0.0);
        assert_eq!(evaluation.label("DET").unwrap().num_observation, 1);
    }

    #[test]
    fn report() {
        let mut evaluation = Evaluation::default();
        evaluation.accumulate(&["DET", "NOUN"], &["DET", "NOUN"]);
        evaluation.evaluate();
        let report = evaluation.to_string();
        assert!(report.contains("\tDET: (1, 1, 1) (1.0000, 1.0000, 1.0000)"));
        assert!(report.contains("Tagged correctly: 2\tTagged incorrectly: 0"));
        assert!(report.ends_with("Sequence accuracy: 1/1 => 1.0000"));
    }
}
