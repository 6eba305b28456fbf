//! carsheet CLI - listing normalization and PDF sheet rendering

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use carsheet::{
    assets, ComposeOptions, FontFace, ListingRecord, LookupStore, PageGeometry, PdfFont,
    PdfRenderer, ProgressSink, RawListing,
};

#[derive(Parser)]
#[command(name = "carsheet")]
#[command(author = "lmh17ever")]
#[command(version)]
#[command(about = "Normalize vehicle listings and render them as PDF sheets", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize a captured listing against the lookup configuration
    Normalize {
        /// Captured listing JSON (raw labels, glyph scalars)
        #[arg(value_name = "RAW")]
        input: PathBuf,

        /// Field dictionary file
        #[arg(long, value_name = "FILE", default_value = "names_translation.json")]
        fields: PathBuf,

        /// Value dictionary file
        #[arg(long, value_name = "FILE", default_value = "values_translation.json")]
        values: PathBuf,

        /// Settings file
        #[arg(long, value_name = "FILE", default_value = "config.json")]
        settings: PathBuf,

        /// Output listing JSON (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Render a normalized listing as a PDF sheet
    Render {
        /// Normalized listing JSON
        #[arg(value_name = "LISTING")]
        input: PathBuf,

        /// Directory with the listing's downloaded images
        /// (defaults to the listing file's directory)
        #[arg(short, long, value_name = "DIR")]
        images: Option<PathBuf>,

        /// TrueType font to embed; without it the built-in Helvetica is
        /// used and non-Latin text degrades
        #[arg(long, value_name = "FILE")]
        font: Option<PathBuf>,

        /// Output PDF path
        #[arg(short, long, value_name = "FILE", default_value = "Auto.pdf")]
        output: PathBuf,
    },

    /// Print a normalized listing as flat text
    Show {
        /// Normalized listing JSON
        #[arg(value_name = "LISTING")]
        input: PathBuf,
    },

    /// Inspect or edit the field dictionary
    Fields {
        /// Field dictionary file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[command(subcommand)]
        action: FieldsAction,
    },

    /// Inspect or edit the settings file
    Config {
        /// Settings file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Set whether empty attribute values are kept as "-"
        #[arg(long, value_name = "BOOL")]
        include_empty: Option<bool>,
    },
}

#[derive(Subcommand)]
enum FieldsAction {
    /// List every field with its enabled state
    List,
    /// Enable one field
    Enable {
        /// Raw label of the field
        label: String,
    },
    /// Disable one field
    Disable {
        /// Raw label of the field
        label: String,
    },
    /// Enable every field
    EnableAll,
    /// Disable every field
    DisableAll,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Normalize {
            input,
            fields,
            values,
            settings,
            output,
        } => cmd_normalize(&input, &fields, &values, &settings, output.as_deref()),
        Commands::Render {
            input,
            images,
            font,
            output,
        } => cmd_render(&input, images.as_deref(), font.as_deref(), &output),
        Commands::Show { input } => cmd_show(&input),
        Commands::Fields { file, action } => cmd_fields(&file, action),
        Commands::Config {
            file,
            include_empty,
        } => cmd_config(&file, include_empty),
    };

    if let Err(e) = result {
        eprintln!("{} {}", "error:".red().bold(), e);
        process::exit(1);
    }
}

fn cmd_normalize(
    input: &Path,
    fields: &Path,
    values: &Path,
    settings: &Path,
    output: Option<&Path>,
) -> carsheet::Result<()> {
    let store = LookupStore::load(fields, values, settings)?;
    let raw: RawListing = serde_json::from_str(&std::fs::read_to_string(input)?)?;
    let record = carsheet::normalize_and_aggregate(&raw, &store)?;

    match output {
        Some(path) => {
            record.save(path)?;
            println!(
                "{} {} attributes, {} images -> {}",
                "normalized:".green().bold(),
                record.attribute_count(),
                record.images.len(),
                path.display()
            );
        }
        None => println!("{}", record.to_json()?),
    }
    Ok(())
}

fn cmd_render(
    input: &Path,
    images_dir: Option<&Path>,
    font: Option<&Path>,
    output: &Path,
) -> carsheet::Result<()> {
    let record = ListingRecord::load(input)?;

    let images_dir = images_dir
        .map(Path::to_path_buf)
        .or_else(|| input.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."));

    let (sink, events) = ProgressSink::channel();
    let images = assets::resolve_dir_with_progress(&images_dir, &sink)?;
    sink.finished();
    log::debug!("resolved {} images in {}", images.len(), images_dir.display());
    for event in events.try_iter() {
        if let Some(message) = event.message() {
            println!("{}", message.dimmed());
        }
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(format!("rendering {}", output.display()));

    let mut out = std::fs::File::create(output)?;
    let pages = match font {
        Some(font_path) => {
            let face = FontFace::from_file(font_path)?;
            let sheet = {
                let metrics = face.metrics()?;
                carsheet::compose_listing(
                    &record,
                    &images,
                    PageGeometry::a4(),
                    &ComposeOptions::default(),
                    &metrics,
                )?
            };
            PdfRenderer::new(PdfFont::Embedded(face))
                .with_title(record.title.clone())
                .write_to(&sheet, &mut out)?
        }
        None => carsheet::render_pdf_builtin(&record, &images, &mut out)?,
    };
    spinner.finish_and_clear();

    println!(
        "{} {} ({} pages, {} images)",
        "created:".green().bold(),
        output.display(),
        pages,
        images.len()
    );
    Ok(())
}

fn cmd_show(input: &Path) -> carsheet::Result<()> {
    let record = ListingRecord::load(input)?;
    println!("{}", record.title.bold());
    if let Some(mileage) = record.mileage {
        println!("Mileage: {} km", (mileage * 10_000.0) as i64);
    }
    if let Some(price) = record.price {
        println!("Price: {}", price);
    }
    if !record.attributes.is_empty() {
        println!("{}", record.attributes_text());
    }
    println!("{} {}", "source:".dimmed(), record.url.dimmed());
    Ok(())
}

fn cmd_fields(file: &Path, action: FieldsAction) -> carsheet::Result<()> {
    let mut store = LookupStore::load_fields(file)?;

    match action {
        FieldsAction::List => {
            let mut entries: Vec<_> = store.iter_fields().collect();
            entries.sort_by(|(a, _), (b, _)| a.cmp(b));
            for (label, entry) in entries {
                let mark = if entry.enabled {
                    "[x]".green()
                } else {
                    "[ ]".dimmed()
                };
                println!("{} {} -> {}", mark, label, entry.display_name);
            }
            return Ok(());
        }
        FieldsAction::Enable { label } => {
            if !store.set_enabled(&label, true) {
                return Err(carsheet::Error::Configuration(format!(
                    "unknown field: {}",
                    label
                )));
            }
        }
        FieldsAction::Disable { label } => {
            if !store.set_enabled(&label, false) {
                return Err(carsheet::Error::Configuration(format!(
                    "unknown field: {}",
                    label
                )));
            }
        }
        FieldsAction::EnableAll => store.set_all_enabled(true),
        FieldsAction::DisableAll => store.set_all_enabled(false),
    }

    store.save_fields(file)?;
    println!("{} {}", "updated:".green().bold(), file.display());
    Ok(())
}

fn cmd_config(file: &Path, include_empty: Option<bool>) -> carsheet::Result<()> {
    match include_empty {
        Some(value) => {
            let mut store = LookupStore::new();
            store.set_include_empty(value);
            store.save_settings(file)?;
            println!(
                "{} include_empty = {}",
                "updated:".green().bold(),
                value
            );
        }
        None => {
            let raw: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(file)?)?;
            let flag = raw
                .get("with_empty_parameters")
                .and_then(|v| v.as_i64())
                .unwrap_or(0);
            println!("include_empty = {}", flag != 0);
        }
    }
    Ok(())
}
