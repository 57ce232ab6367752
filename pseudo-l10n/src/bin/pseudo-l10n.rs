use clap::{Arg, Command};
use pseudo_l10n::{Format, Origin, Pipeline, PseudoError, PseudoType, decode_content};
use std::fs;
use std::path::Path;
use tracing::debug;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let matches = Command::new("pseudo-l10n")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Pseudo-translate gettext, Qt, Java properties and Joomla INI files")
        .arg(
            Arg::new("file")
                .help("Localization file to pseudo-translate")
                .required_unless_present("list-types")
                .index(1),
        )
        .arg(
            Arg::new("type")
                .long("type")
                .short('t')
                .help("Pseudo type: XXX, BRACKETS, UNICODE or PLANGUAGE")
                .default_value("UNICODE"),
        )
        .arg(
            Arg::new("format")
                .long("format")
                .short('f')
                .help("File format: PO, QT, PROPERTIES or INI (default: from extension)"),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .short('o')
                .help("Write the result to this file instead of stdout"),
        )
        .arg(
            Arg::new("translation")
                .long("translation")
                .short('l')
                .help("Treat the file as a translation into LANG and transform its translations"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Print {\"content\": ...} instead of the raw file")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("entries")
                .long("entries")
                .help("Print the parsed entries as JSON and exit")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("list-types")
                .long("list-types")
                .help("List the available pseudo types")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Log every pipeline step to stderr")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let default_level = if matches.get_flag("verbose") {
        "debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    if matches.get_flag("list-types") {
        for kind in PseudoType::ALL {
            println!("{:<10} {:<14} {}", kind.name(), kind.example(), kind.description());
        }
        return Ok(());
    }

    let Some(file) = matches.get_one::<String>("file") else {
        return Err("missing input file".into());
    };
    let path = Path::new(file);
    let kind: PseudoType = matches
        .get_one::<String>("type")
        .map(String::as_str)
        .unwrap_or("UNICODE")
        .parse()?;
    let format = match matches.get_one::<String>("format") {
        Some(tag) => tag.parse::<Format>()?,
        None => Format::from_path(path).ok_or_else(|| {
            PseudoError::UnsupportedFormat(
                path.extension()
                    .map(|e| e.to_string_lossy().into_owned())
                    .unwrap_or_else(|| file.clone()),
            )
        })?,
    };
    let origin = match matches.get_one::<String>("translation") {
        Some(language) => Origin::Translation {
            language: language.clone(),
        },
        None => Origin::Source,
    };
    debug!(file = %path.display(), %format, pseudo_type = %kind, "reading input");

    let content = decode_content(format, fs::read(path).map_err(PseudoError::from)?)?;
    let pipeline = Pipeline::default();
    let document = pipeline.parse(format, &content, &origin)?;

    if matches.get_flag("entries") {
        println!("{}", serde_json::to_string_pretty(&document.entries)?);
        return Ok(());
    }

    let output = pipeline.compile_to_string(&document, kind)?;
    let output = if matches.get_flag("json") {
        serde_json::to_string_pretty(&serde_json::json!({ "content": output }))? + "\n"
    } else {
        output
    };

    match matches.get_one::<String>("output") {
        Some(target) => {
            fs::write(target, output).map_err(PseudoError::from)?;
            debug!(target = %target, "wrote output");
        }
        None => print!("{}", output),
    }

    Ok(())
}
