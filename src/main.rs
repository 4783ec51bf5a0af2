use std::{env, error::Error, fs, path::PathBuf, process, sync::Arc, time::Instant};

use rayon::prelude::*;
use tf_idf_pivot::{Dictionary, TfidfConfig, TfidfModel, VocabularyIndex};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: tf-idf-pivot [--scheme CODE] [--pivot-norm] [--slope S] [--pivot P] [--top N] FILE...";

struct Args {
    config: TfidfConfig,
    top: usize,
    files: Vec<PathBuf>,
}

fn parse_args() -> Result<Args, Box<dyn Error>> {
    let mut config = TfidfConfig::new();
    let mut top = 10usize;
    let mut files = Vec::new();
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        let mut value = |name: &str| args.next().ok_or_else(|| format!("{name} needs a value"));
        match arg.as_str() {
            "--scheme" => config = config.with_smartirs(&value("--scheme")?)?,
            "--pivot-norm" => config = config.with_pivot_norm(true),
            "--slope" => config = config.with_slope(value("--slope")?.parse()?),
            "--pivot" => config = config.with_pivot(value("--pivot")?.parse()?),
            "--top" => top = value("--top")?.parse()?,
            "-h" | "--help" => {
                println!("{USAGE}");
                process::exit(0);
            }
            _ => files.push(PathBuf::from(arg)),
        }
    }
    if files.is_empty() {
        return Err(USAGE.into());
    }
    Ok(Args { config, top, files })
}

// lowercase words, anything that is not alphanumeric separates
fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args()?;
    let start = Instant::now();

    let texts: Vec<Vec<String>> = args
        .files
        .par_iter()
        .map(|path| match fs::read_to_string(path) {
            Ok(content) => tokenize(&content),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping unreadable file");
                Vec::new()
            }
        })
        .collect();

    let mut dict = Dictionary::new();
    dict.add_documents(&texts);
    let corpus: Vec<Vec<(u32, f64)>> = texts.par_iter().map(|t| dict.doc2bow(t)).collect();
    info!(
        docs = corpus.len(),
        vocab = dict.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "corpus loaded"
    );

    let dict = Arc::new(dict);
    let mut model = TfidfModel::new(args.config)?.with_vocabulary(dict.clone());
    model.fit(&corpus)?;
    let batch = model.transform_batch(&corpus)?;

    for (i, (path, vec)) in args.files.iter().zip(&batch.vectors).enumerate() {
        let mut weights: Vec<(u32, f64)> = vec.iter().collect();
        weights.sort_by(|a, b| b.1.total_cmp(&a.1));
        match batch.norms.as_ref() {
            Some(norms) => println!("{} (terms={}, pivoted norm={:.4})", path.display(), vec.nnz(), norms[i]),
            None => println!("{} (terms={})", path.display(), vec.nnz()),
        }
        for (id, w) in weights.into_iter().take(args.top) {
            println!("  {:.6}\t{}", w, dict.token_of(id).unwrap_or("?"));
        }
    }
    info!(elapsed_ms = start.elapsed().as_millis() as u64, "done");
    Ok(())
}
