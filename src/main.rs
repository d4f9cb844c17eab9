use std::{
    io::{stdin, BufRead},
    path::{Path, PathBuf},
    time::Instant,
};

use clap::{Args, Parser, Subcommand};
use hmm_tagger::{tokenize, Corpus, Error, Evaluation, Hmm, ModelBuilder, Result, UNSEEN_PENALTY};

/// Train a first-order HMM tagger and tag sentences with it
#[derive(Debug, Parser)]
#[command(version)]
#[command(propagate_version = true)]
struct Argv {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// train a model from a sentence file and a parallel tag file, and store it (MODEL)
    Train {
        /// one sentence per line, words separated by spaces
        #[arg(short, long, value_name = "FILE")]
        sentences: PathBuf,
        /// one tag sequence per line, aligned with the sentence file
        #[arg(short, long, value_name = "FILE")]
        tags: PathBuf,
        /// write the model to a file (MODEL)
        #[arg(short, long, value_name = "MODEL")]
        model: PathBuf,
    },
    /// tag a sentence file and report the performance against its tag file
    Test {
        #[command(flatten)]
        source: ModelSource,
        #[arg(long, value_name = "FILE")]
        test_sentences: PathBuf,
        #[arg(long, value_name = "FILE")]
        test_tags: PathBuf,
        /// suppress tagging results (report only)
        #[arg(short, long)]
        quiet: bool,
    },
    /// tag sentences read from STDIN until EOF or a line reading 'stop'
    Tag {
        #[command(flatten)]
        source: ModelSource,
    },
}

#[derive(Debug, Args)]
struct ModelSource {
    /// read a model from a file (MODEL)
    #[arg(short, long, value_name = "MODEL", conflicts_with = "sentences")]
    model: Option<PathBuf>,
    /// train from this sentence file instead of reading a model
    #[arg(short, long, value_name = "FILE", requires = "tags", required_unless_present = "model")]
    sentences: Option<PathBuf>,
    /// tag file aligned with the training sentences
    #[arg(short, long, value_name = "FILE", requires = "sentences")]
    tags: Option<PathBuf>,
    /// log-score used for words never seen with a tag
    #[arg(short, long, value_name = "SCORE", default_value_t = UNSEEN_PENALTY, allow_hyphen_values = true)]
    unseen_penalty: f64,
}

impl ModelSource {
    fn load(&self) -> Result<Hmm> {
        match (&self.model, &self.sentences, &self.tags) {
            (Some(model), _, _) => {
                log::info!("read model from {:?}", model);
                Hmm::from_path(model)
            }
            (None, Some(sentences), Some(tags)) => train(sentences, tags),
            _ => Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "either a model or training files are required",
            )
            .into()),
        }
    }
}

/// Builds a model, skipping sentences whose words and tags don't align.
fn train(sentences: &Path, tags: &Path) -> Result<Hmm> {
    let begin = Instant::now();
    log::info!("reading corpus from {:?} and {:?}", sentences, tags);
    let corpus = Corpus::from_files(sentences, tags)?;
    log::info!("read {} sentences, {} items", corpus.len(), corpus.total_items());

    let mut builder = ModelBuilder::new();
    for (i, sentence) in corpus.iter().enumerate() {
        if let Err(e) = builder.ingest_sentence(&sentence.words, &sentence.tags) {
            log::warn!("skipping sentence {}: {}", i + 1, e);
        }
    }
    log::info!(
        "trained on {} sentences (tags: {}, words: {}), took: {:?}",
        builder.num_sentences(),
        builder.num_tags(),
        builder.num_words(),
        begin.elapsed()
    );
    Ok(builder.finalize())
}

fn test(model: &Hmm, penalty: f64, corpus: &Corpus, quiet: bool) -> Evaluation {
    let tagger = model.tagger().with_penalty(penalty);
    let mut evaluation = Evaluation::default();
    for (i, sentence) in corpus.iter().enumerate() {
        let prediction = match tagger.decode(&sentence.words) {
            Ok(prediction) => prediction,
            Err(e) => {
                log::warn!("sentence {}: {}", i + 1, e);
                Vec::new()
            }
        };
        evaluation.accumulate(&sentence.tags, &prediction);
        if !quiet {
            println!("\n{}", sentence.words.join(" "));
            println!("=> {}", prediction.join(" "));
        }
    }
    evaluation
}

fn tag_stdin(model: &Hmm, penalty: f64) -> Result<()> {
    let tagger = model.tagger().with_penalty(penalty);
    eprintln!("Enter your sentence (type 'stop' to end reading): ");
    for line in stdin().lock().lines() {
        let line = line?;
        if line.trim() == "stop" {
            break;
        }
        let words = tokenize(&line);
        println!("\n{}", words.join(" "));
        match tagger.decode(&words) {
            Ok(tags) => println!("=> {}", tags.join(" ")),
            Err(e @ Error::DecodeFailure { .. }) => println!("=> {}", e),
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let argv = Argv::parse();
    log::info!("argv: {:?}", argv);
    match argv.command {
        Command::Train {
            sentences,
            tags,
            model,
        } => {
            let hmm = train(&sentences, &tags)?;
            hmm.to_path(&model)?;
            log::info!("write model to {:?}", model);
        }
        Command::Test {
            source,
            test_sentences,
            test_tags,
            quiet,
        } => {
            let hmm = source.load()?;
            let corpus = Corpus::from_files(&test_sentences, &test_tags)?;
            let begin = Instant::now();
            let mut evaluation = test(&hmm, source.unseen_penalty, &corpus, quiet);
            let elapsed = begin.elapsed();
            evaluation.evaluate();
            println!("{}", evaluation);
            println!(
                "Elapsed time: {:?} ({:.1} [instance/sec])",
                elapsed,
                corpus.len() as f64 / elapsed.as_secs_f64()
            );
        }
        Command::Tag { source } => {
            let hmm = source.load()?;
            tag_stdin(&hmm, source.unseen_penalty)?;
        }
    }
    Ok(())
}
