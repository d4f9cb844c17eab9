use std::{iter::zip, time::Duration};

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use hmm_tagger::{tokenize, Hmm, ModelBuilder};

const TRAIN: [(&str, &str); 4] = [
    ("the dog runs .", "DET NOUN VERB ."),
    ("a big cat sleeps quietly .", "DET ADJ NOUN VERB ADV ."),
    ("dogs chase the cat .", "NOUN VERB DET NOUN ."),
    ("the old man sees a dog .", "DET ADJ NOUN VERB DET NOUN ."),
];

const TEST: [(&str, &str); 3] = [
    ("the old dog chases a cat .", "DET ADJ NOUN VERB DET NOUN ."),
    ("a man sleeps .", "DET NOUN VERB ."),
    ("cats see the big aardvark .", "NOUN VERB DET ADJ NOUN ."),
];

fn model() -> Hmm {
    let mut builder = ModelBuilder::new();
    for (words, tags) in TRAIN {
        let tags: Vec<&str> = tags.split(' ').collect();
        builder
            .ingest_sentence(&tokenize(words), &tags)
            .expect("failed to train");
    }
    builder.finalize()
}

fn predict(model: &Hmm, dataset: &[(Vec<String>, Vec<&str>)]) {
    let tagger = model.tagger();
    for (words, labels) in dataset {
        let pred_labels = tagger.decode(words).expect("failed to tag");
        let mut n = 0;
        for (label, pred) in zip(labels, &pred_labels) {
            if *label != pred.as_str() {
                n += 1;
            }
        }
        black_box(n);
    }
}

fn predict_benchmark(c: &mut Criterion) {
    let model = model();
    let dataset: Vec<(Vec<String>, Vec<&str>)> = TEST
        .iter()
        .cycle()
        .take(1_000)
        .map(|(words, tags)| (tokenize(words), tags.split(' ').collect()))
        .collect();

    c.bench_function("predict", |b| b.iter(|| predict(black_box(&model), black_box(&dataset))));
}

criterion_group! {
    name = benchmarks;
    config = Criterion::default().measurement_time(Duration::from_secs(10));
    targets = predict_benchmark
}

criterion_main!(benchmarks);
