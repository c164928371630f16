use std::env;
use std::fs;
use std::io;
use std::io::Write;
use std::process;

use tracing_subscriber::EnvFilter;

use npchunker::tokenize::tokenize;
use npchunker::{Analysis, Err, Grammar, analyze};

fn usage(prog_name: &str) -> String {
  format!(
    r"Usage: {} [FILE] [options]

Parses the sentence in FILE (or one line read from stdin) and prints every
parse tree with its noun phrase chunks.

Options:
  -h, --help             Print this message
  -g, --grammar GRAMMAR  Use the grammar in GRAMMAR instead of the built-in one
  -c, --chart            Print the parse chart (defaults to not printing)
  -b, --bracketed        Print trees on one line as labelled bracketings",
    prog_name
  )
}

struct Args {
  filename: Option<String>,
  grammar: Option<String>,
  print_chart: bool,
  bracketed: bool,
}

impl Args {
  fn make_error_message(msg: &str, prog_name: impl AsRef<str>) -> String {
    format!("argument error: {}.\n\n{}", msg, usage(prog_name.as_ref()))
  }

  fn parse(v: Vec<String>) -> Result<Self, String> {
    let mut iter = v.into_iter();
    let prog_name = match iter.next() {
      Some(name) => name,
      None => return Err(Self::make_error_message("bad argument vector", "npchunk")),
    };

    let mut filename: Option<String> = None;
    let mut grammar: Option<String> = None;
    let mut print_chart = false;
    let mut bracketed = false;

    while let Some(o) = iter.next() {
      if o == "-h" || o == "--help" {
        println!("{}", usage(&prog_name));
        process::exit(0);
      } else if o == "-c" || o == "--chart" {
        print_chart = true;
      } else if o == "-b" || o == "--bracketed" {
        bracketed = true;
      } else if o == "-g" || o == "--grammar" {
        match iter.next() {
          Some(path) if grammar.is_none() => grammar = Some(path),
          Some(_) => return Err(Self::make_error_message("grammar given twice", prog_name)),
          None => return Err(Self::make_error_message("missing grammar file", prog_name)),
        }
      } else if o.starts_with('-') && o.len() > 1 {
        return Err(Self::make_error_message(&format!("unknown option {}", o), prog_name));
      } else if filename.is_none() {
        filename = Some(o);
      } else {
        return Err(Self::make_error_message("invalid arguments", prog_name));
      }
    }

    Ok(Self {
      filename,
      grammar,
      print_chart,
      bracketed,
    })
  }
}

fn read_sentence(filename: Option<&str>) -> Result<String, Err> {
  if let Some(filename) = filename {
    return fs::read_to_string(filename).map_err(|e| format!("{}: {}", filename, e).into());
  }

  print!("Sentence: ");
  io::stdout().flush()?;
  let mut input = String::new();
  io::stdin().read_line(&mut input)?;
  Ok(input)
}

fn report(g: &Grammar, sentence: &str, opts: &Args) -> i32 {
  if opts.print_chart {
    let tokens = tokenize(sentence);
    let tokens = tokens.iter().map(String::as_str).collect::<Vec<_>>();
    println!("chart:\n{}\n", g.parse_chart(&tokens));
  }

  match analyze(g, sentence) {
    Analysis::EmptyInput => {
      eprintln!("Nothing to parse: the input contains no words.");
      1
    }
    Analysis::NoParse { unknown_words } => {
      println!("Could not parse sentence.");
      if !unknown_words.is_empty() {
        println!("Unknown words: {}", unknown_words.join(", "));
      }
      0
    }
    Analysis::Parsed(parses) => {
      println!(
        "Parsed {} tree{}",
        parses.len(),
        if parses.len() == 1 { "" } else { "s" }
      );
      for parse in parses.iter() {
        if opts.bracketed {
          println!("{}", parse.tree.bracketed());
        } else {
          println!("{}", parse.tree);
        }

        println!("Noun Phrase Chunks");
        for chunk in parse.chunks() {
          println!("{}", chunk);
        }
        println!();
      }
      0
    }
  }
}

fn main() -> Result<(), Err> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
    .with_writer(io::stderr)
    .init();

  let opts = match Args::parse(env::args().collect()) {
    Ok(opts) => opts,
    Err(msg) => {
      eprintln!("{}", msg);
      process::exit(255);
    }
  };

  let loaded = match opts.grammar.as_deref() {
    Some(path) => Grammar::read_from_file(path),
    None => Grammar::builtin(),
  };
  let g = match loaded {
    Ok(g) => g,
    Err(e) => {
      tracing::error!(error = %e, "grammar failed to load");
      eprintln!("grammar error: {}", e);
      process::exit(1);
    }
  };

  let sentence = read_sentence(opts.filename.as_deref())?;
  let code = report(&g, &sentence, &opts);
  if code != 0 {
    process::exit(code);
  }
  Ok(())
}
